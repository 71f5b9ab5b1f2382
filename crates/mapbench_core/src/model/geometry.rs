//! Planar helpers over the `geo` feature geometries.
//!
//! # Responsibility
//! - Name, bound and hit-test feature geometries for selection.
//! - Provide finiteness checks for coordinates entering the map state.
//!
//! # Invariants
//! - All math is planar; callers are expected to work in a projected system.

use geo::{BoundingRect, Coord, EuclideanDistance, Geometry, Intersects, Point, Rect};

/// GeoJSON type name of `geometry`.
pub fn geometry_kind(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::Line(_) | Geometry::LineString(_) => "LineString",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "Polygon",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
    }
}

pub fn is_finite(coord: Coord) -> bool {
    coord.x.is_finite() && coord.y.is_finite()
}

/// Smallest rectangle covering both inputs.
pub fn merge_extents(a: Rect, b: Rect) -> Rect {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

/// Returns whether `at` hits `geometry` within `tolerance` map units.
///
/// Points and lines hit by distance; polygons hit when `at` is inside the
/// area (holes excluded) or within `tolerance` of a ring. Empty geometries
/// never hit.
pub fn hit_test(geometry: &Geometry, at: Coord, tolerance: f64) -> bool {
    let tolerance = tolerance.max(0.0);
    let Some(bounds) = geometry.bounding_rect() else {
        return false;
    };
    let margin = Coord {
        x: tolerance,
        y: tolerance,
    };
    if !Rect::new(bounds.min() - margin, bounds.max() + margin).intersects(&at) {
        return false;
    }

    let point = Point::from(at);
    match geometry {
        Geometry::Point(target) => point.euclidean_distance(target) <= tolerance,
        Geometry::MultiPoint(targets) => point.euclidean_distance(targets) <= tolerance,
        Geometry::Line(line) => point.euclidean_distance(line) <= tolerance,
        Geometry::LineString(path) => point.euclidean_distance(path) <= tolerance,
        Geometry::MultiLineString(paths) => point.euclidean_distance(paths) <= tolerance,
        Geometry::Polygon(polygon) => {
            polygon.intersects(&point) || point.euclidean_distance(polygon) <= tolerance
        }
        Geometry::MultiPolygon(polygons) => {
            polygons.intersects(&point) || point.euclidean_distance(polygons) <= tolerance
        }
        Geometry::Rect(rect) => hit_test(&Geometry::Polygon(rect.to_polygon()), at, tolerance),
        Geometry::Triangle(triangle) => {
            hit_test(&Geometry::Polygon(triangle.to_polygon()), at, tolerance)
        }
        Geometry::GeometryCollection(collection) => collection
            .iter()
            .any(|member| hit_test(member, at, tolerance)),
    }
}

#[cfg(test)]
mod tests {
    use super::{geometry_kind, hit_test, merge_extents};
    use geo::{coord, line_string, point, polygon, BoundingRect, Geometry, MultiPoint, Rect};

    #[test]
    fn point_hit_respects_tolerance() {
        let target = Geometry::Point(point! { x: 10.0, y: 10.0 });
        assert!(hit_test(&target, coord! { x: 12.0, y: 10.0 }, 2.5));
        assert!(!hit_test(&target, coord! { x: 13.0, y: 10.0 }, 2.5));
    }

    #[test]
    fn polygon_hit_excludes_holes() {
        let square = Geometry::Polygon(polygon!(
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 100.0, y: 0.0),
                (x: 100.0, y: 100.0),
                (x: 0.0, y: 100.0),
            ],
            interiors: [[
                (x: 40.0, y: 40.0),
                (x: 60.0, y: 40.0),
                (x: 60.0, y: 60.0),
                (x: 40.0, y: 60.0),
            ]],
        ));
        assert!(hit_test(&square, coord! { x: 10.0, y: 10.0 }, 0.0));
        assert!(!hit_test(&square, coord! { x: 50.0, y: 50.0 }, 0.0));
        assert!(hit_test(&square, coord! { x: 50.0, y: 40.5 }, 1.0));
        assert_eq!(geometry_kind(&square), "Polygon");
    }

    #[test]
    fn line_hit_uses_segment_distance() {
        let line = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)]);
        assert!(hit_test(&line, coord! { x: 5.0, y: 0.9 }, 1.0));
        assert!(!hit_test(&line, coord! { x: 5.0, y: 1.1 }, 1.0));
        assert!(!hit_test(&line, coord! { x: 11.5, y: 0.0 }, 1.0));
    }

    #[test]
    fn empty_geometries_never_hit() {
        let empty = Geometry::MultiPoint(MultiPoint::<f64>(Vec::new()));
        assert_eq!(empty.bounding_rect(), None);
        assert!(!hit_test(&empty, coord! { x: 0.0, y: 0.0 }, 100.0));
    }

    #[test]
    fn merged_extent_covers_both() {
        let merged = merge_extents(
            Rect::new(coord! { x: -1.0, y: 0.0 }, coord! { x: 1.0, y: 4.0 }),
            Rect::new(coord! { x: 0.0, y: -2.0 }, coord! { x: 3.0, y: 1.0 }),
        );
        assert_eq!(
            merged,
            Rect::new(coord! { x: -1.0, y: -2.0 }, coord! { x: 3.0, y: 4.0 })
        );
    }
}
