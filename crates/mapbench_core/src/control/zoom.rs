//! Zoom buttons and zoom-to-coordinate.

use crate::control::ControlError;
use crate::model::viewport::ZoomLevels;
use crate::projection::{Projection, ProjectionRegistry};
use crate::viewport::ViewportSyncEngine;
use geo::Coord;

/// Steps the primary view through the zoom levels of its projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomControl {
    levels: ZoomLevels,
    /// Levels per button press.
    delta: f64,
}

impl ZoomControl {
    pub fn new(levels: ZoomLevels) -> Self {
        Self { levels, delta: 1.0 }
    }

    /// Derives zoom levels from the validity extent of `projection`.
    pub fn for_projection(projection: &Projection) -> Result<Self, ControlError> {
        projection
            .zoom_levels()
            .map(Self::new)
            .ok_or_else(|| ControlError::MissingZoomLevels(projection.code.clone()))
    }

    pub fn levels(&self) -> &ZoomLevels {
        &self.levels
    }

    /// Returns the new zoom level.
    pub fn zoom_in(&self, sync: &mut ViewportSyncEngine) -> Result<f64, ControlError> {
        sync.zoom_by(self.delta, &self.levels)?;
        Ok(sync.zoom(&self.levels))
    }

    /// Returns the new zoom level.
    pub fn zoom_out(&self, sync: &mut ViewportSyncEngine) -> Result<f64, ControlError> {
        sync.zoom_by(-self.delta, &self.levels)?;
        Ok(sync.zoom(&self.levels))
    }

    /// Centers on `coordinate` given in `code`, optionally at `zoom`.
    pub fn zoom_to(
        &self,
        coordinate: Coord,
        code: &str,
        zoom: Option<f64>,
        registry: &ProjectionRegistry,
        sync: &mut ViewportSyncEngine,
    ) -> Result<Coord, ControlError> {
        let native = registry.transform(coordinate, code, &sync.primary().projection)?;
        match zoom {
            Some(zoom) => {
                let resolution = self.levels.resolution_for_zoom(zoom);
                sync.on_primary_view_changed(native, resolution)?;
            }
            None => sync.recenter(native)?,
        }
        Ok(native)
    }
}

#[cfg(test)]
mod tests {
    use super::ZoomControl;
    use crate::control::ControlError;
    use crate::model::viewport::{PixelSize, Viewport};
    use crate::projection::{
        AxisUnits, NoTransformEngine, ProjectionDefinition, ProjectionRegistry,
    };
    use crate::viewport::ViewportSyncEngine;
    use geo::Coord;

    fn setup() -> (ProjectionRegistry, ViewportSyncEngine, ZoomControl) {
        let registry = ProjectionRegistry::with_defaults(Box::new(NoTransformEngine));
        let zoom = ZoomControl::for_projection(registry.resolve("EPSG:31370").unwrap()).unwrap();
        let resolution = zoom.levels().resolution_for_zoom(10.0);
        let primary = Viewport::new(
            "EPSG:31370",
            Coord { x: 157257.0, y: 172012.0 },
            resolution,
            PixelSize::new(800, 600),
        );
        let sync = ViewportSyncEngine::try_new(Some(primary), PixelSize::new(350, 250), 5.0)
            .unwrap();
        (registry, sync, zoom)
    }

    #[test]
    fn buttons_step_one_level_and_clamp() {
        let (_, mut sync, zoom) = setup();
        assert!((zoom.zoom_in(&mut sync).unwrap() - 11.0).abs() < 1e-9);
        assert!((zoom.zoom_out(&mut sync).unwrap() - 10.0).abs() < 1e-9);

        let levels = *zoom.levels();
        sync.set_zoom(0.0, &levels).unwrap();
        assert!(zoom.zoom_out(&mut sync).unwrap().abs() < 1e-9);
    }

    #[test]
    fn zoom_to_same_projection_recenters_and_keeps_overview_locked() {
        let (registry, mut sync, zoom) = setup();
        let target = Coord { x: 150_000.0, y: 170_000.0 };
        let native = zoom
            .zoom_to(target, "Belgian Lambert 72", Some(12.0), &registry, &mut sync)
            .unwrap();
        assert_eq!(native, target);
        assert_eq!(sync.overview().center, target);
        assert!((sync.zoom(zoom.levels()) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn projection_without_extent_has_no_levels() {
        let mut registry = ProjectionRegistry::new();
        registry
            .register(
                "EPSG:9000",
                ProjectionDefinition::without_transform(AxisUnits::Metre),
            )
            .unwrap();
        let err = ZoomControl::for_projection(registry.resolve("EPSG:9000").unwrap()).unwrap_err();
        assert_eq!(err, ControlError::MissingZoomLevels("EPSG:9000".to_string()));
    }
}
