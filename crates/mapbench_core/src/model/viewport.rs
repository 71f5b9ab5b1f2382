//! Viewport model: what one map panel currently shows.

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

/// Pixel dimensions of a map panel. Zero means collapsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Center, resolution, rotation and panel size of one map.
///
/// # Invariants
/// - `resolution` is finite and positive (map units per pixel).
/// - `size` is the last measured size of the hosting panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Canonical projection code of `center`.
    pub projection: String,
    pub center: Coord,
    pub resolution: f64,
    /// Radians, counter-clockwise.
    pub rotation: f64,
    pub size: PixelSize,
}

impl Viewport {
    pub fn new(
        projection: impl Into<String>,
        center: Coord,
        resolution: f64,
        size: PixelSize,
    ) -> Self {
        Self {
            projection: projection.into(),
            center,
            resolution,
            rotation: 0.0,
            size,
        }
    }

    /// Visible extent ignoring rotation.
    pub fn extent(&self) -> Rect {
        let half_width = f64::from(self.size.width) * self.resolution / 2.0;
        let half_height = f64::from(self.size.height) * self.resolution / 2.0;
        Rect::new(
            Coord {
                x: self.center.x - half_width,
                y: self.center.y - half_height,
            },
            Coord {
                x: self.center.x + half_width,
                y: self.center.y + half_height,
            },
        )
    }

    pub fn zoom(&self, levels: &ZoomLevels) -> f64 {
        levels.zoom_for_resolution(self.resolution)
    }
}

/// Zoom level <-> resolution mapping for one projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLevels {
    pub max_resolution: f64,
    pub zoom_factor: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl ZoomLevels {
    pub const DEFAULT_MAX_ZOOM: f64 = 28.0;
    const TILE_SIZE: f64 = 256.0;

    /// Levels whose zoom 0 fits the widest side of `extent` into one 256px tile.
    pub fn for_extent(extent: &Rect) -> Self {
        Self {
            max_resolution: extent.width().max(extent.height()) / Self::TILE_SIZE,
            zoom_factor: 2.0,
            min_zoom: 0.0,
            max_zoom: Self::DEFAULT_MAX_ZOOM,
        }
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn resolution_for_zoom(&self, zoom: f64) -> f64 {
        self.max_resolution / self.zoom_factor.powf(self.clamp_zoom(zoom))
    }

    pub fn zoom_for_resolution(&self, resolution: f64) -> f64 {
        let zoom = (self.max_resolution / resolution).ln() / self.zoom_factor.ln();
        self.clamp_zoom(zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::{PixelSize, Viewport, ZoomLevels};
    use geo::{Coord, Rect};

    #[test]
    fn extent_follows_size_and_resolution() {
        let viewport = Viewport::new(
            "EPSG:31370",
            Coord { x: 1000.0, y: 2000.0 },
            2.0,
            PixelSize::new(100, 50),
        );
        assert_eq!(
            viewport.extent(),
            Rect::new(Coord { x: 900.0, y: 1950.0 }, Coord { x: 1100.0, y: 2050.0 })
        );
    }

    #[test]
    fn zoom_and_resolution_are_inverse() {
        let levels = ZoomLevels::for_extent(&Rect::new(
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 256_000.0, y: 100_000.0 },
        ));
        assert_eq!(levels.max_resolution, 1000.0);
        assert!((levels.resolution_for_zoom(3.0) - 125.0).abs() < 1e-9);
        assert!((levels.zoom_for_resolution(125.0) - 3.0).abs() < 1e-9);
        assert_eq!(levels.zoom_for_resolution(1.0e9), 0.0);
    }

    #[test]
    fn empty_size_is_collapsed() {
        assert!(PixelSize::new(0, 20).is_empty());
        assert!(!PixelSize::new(1, 1).is_empty());
    }
}
