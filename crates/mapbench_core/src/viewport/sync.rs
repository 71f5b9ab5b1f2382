//! Primary/overview viewport synchronization.
//!
//! # Responsibility
//! - Keep the overview locked to the primary viewport under a fixed
//!   magnification.
//! - Re-measure both panels after a split-pane drag finishes.
//!
//! # Invariants
//! - After every primary change: `overview.center == primary.center` and
//!   `overview.resolution == magnification * primary.resolution`.
//! - Every primary change produces exactly one overview update, in order.
//! - Rejected changes leave both viewports untouched and emit nothing.

use crate::events::{Listeners, SubscriptionId};
use crate::model::geometry::is_finite;
use crate::model::viewport::{PixelSize, Viewport, ZoomLevels};
use crate::viewport::layout::{MapPanel, PanelLayout};
use geo::Coord;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from viewport synchronization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportSyncError {
    /// Magnification is not a finite value above zero.
    InvalidMagnification(f64),
    /// Primary map is absent at construction.
    MapNotReady,
    /// Resolution is not a finite value above zero.
    InvalidResolution(f64),
    /// Center or rotation is not finite.
    InvalidView,
}

impl Display for ViewportSyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMagnification(value) => {
                write!(f, "magnification must be finite and > 0: {value}")
            }
            Self::MapNotReady => write!(f, "primary map is not ready"),
            Self::InvalidResolution(value) => {
                write!(f, "resolution must be finite and > 0: {value}")
            }
            Self::InvalidView => write!(f, "view center and rotation must be finite"),
        }
    }
}

impl Error for ViewportSyncError {}

/// Change notification for map panels.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportEvent {
    PrimaryChanged(Viewport),
    OverviewChanged(Viewport),
    PanelsMeasured {
        primary: PixelSize,
        overview: PixelSize,
    },
}

/// Sole writer of the primary/overview viewport pair.
pub struct ViewportSyncEngine {
    primary: Viewport,
    overview: Viewport,
    magnification: f64,
    listeners: Listeners<ViewportEvent>,
}

impl ViewportSyncEngine {
    /// Derives the overview from `primary`.
    ///
    /// # Errors
    /// - `MapNotReady` when `primary` is `None`.
    /// - `InvalidMagnification` when `magnification` is not finite or `<= 0`.
    /// - `InvalidResolution` / `InvalidView` for an unusable primary view.
    pub fn try_new(
        primary: Option<Viewport>,
        overview_size: PixelSize,
        magnification: f64,
    ) -> Result<Self, ViewportSyncError> {
        let primary = primary.ok_or(ViewportSyncError::MapNotReady)?;
        if !magnification.is_finite() || magnification <= 0.0 {
            return Err(ViewportSyncError::InvalidMagnification(magnification));
        }
        validate_view(primary.center, primary.resolution)?;
        if !primary.rotation.is_finite() {
            return Err(ViewportSyncError::InvalidView);
        }

        let overview = Viewport::new(
            primary.projection.clone(),
            primary.center,
            magnification * primary.resolution,
            overview_size,
        );
        info!(
            "event=viewport_sync_init module=viewport status=ok projection={} magnification={}",
            primary.projection, magnification
        );
        Ok(Self {
            primary,
            overview,
            magnification,
            listeners: Listeners::new(),
        })
    }

    pub fn primary(&self) -> &Viewport {
        &self.primary
    }

    pub fn overview(&self) -> &Viewport {
        &self.overview
    }

    pub fn magnification(&self) -> f64 {
        self.magnification
    }

    /// Current primary zoom level under `levels`.
    pub fn zoom(&self, levels: &ZoomLevels) -> f64 {
        self.primary.zoom(levels)
    }

    pub fn on_changed(&mut self, listener: impl FnMut(&ViewportEvent) + 'static) -> SubscriptionId {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.listeners.unsubscribe(subscription)
    }

    /// Applies one primary view change and updates the overview.
    pub fn on_primary_view_changed(
        &mut self,
        center: Coord,
        resolution: f64,
    ) -> Result<(), ViewportSyncError> {
        validate_view(center, resolution)?;
        self.primary.center = center;
        self.primary.resolution = resolution;
        self.listeners
            .emit(&ViewportEvent::PrimaryChanged(self.primary.clone()));
        self.sync_overview();
        Ok(())
    }

    /// Re-measures both map panels after a split-pane drag finished.
    ///
    /// `pane` names the divider that moved; both panels are measured
    /// regardless because one divider can resize either map.
    pub fn on_panel_resized(&mut self, pane: &str, layout: &dyn PanelLayout) {
        self.primary.size = layout.measure(MapPanel::Primary);
        self.overview.size = layout.measure(MapPanel::Overview);
        debug!(
            "event=panel_resized module=viewport status=ok pane={} primary={}x{} overview={}x{}",
            pane,
            self.primary.size.width,
            self.primary.size.height,
            self.overview.size.width,
            self.overview.size.height
        );
        self.listeners.emit(&ViewportEvent::PanelsMeasured {
            primary: self.primary.size,
            overview: self.overview.size,
        });
        self.sync_overview();
    }

    /// Recenters the primary view keeping its resolution.
    pub fn recenter(&mut self, center: Coord) -> Result<(), ViewportSyncError> {
        self.on_primary_view_changed(center, self.primary.resolution)
    }

    /// Changes the primary zoom by `delta` levels.
    pub fn zoom_by(&mut self, delta: f64, levels: &ZoomLevels) -> Result<(), ViewportSyncError> {
        let zoom = self.zoom(levels) + delta;
        self.set_zoom(zoom, levels)
    }

    /// Sets the primary zoom, clamped to `levels`.
    pub fn set_zoom(&mut self, zoom: f64, levels: &ZoomLevels) -> Result<(), ViewportSyncError> {
        if !zoom.is_finite() {
            return Err(ViewportSyncError::InvalidView);
        }
        let resolution = levels.resolution_for_zoom(zoom);
        self.on_primary_view_changed(self.primary.center, resolution)
    }

    /// Rotates the primary view. The overview stays north-up.
    pub fn set_rotation(&mut self, radians: f64) -> Result<(), ViewportSyncError> {
        if !radians.is_finite() {
            return Err(ViewportSyncError::InvalidView);
        }
        self.primary.rotation = radians;
        self.listeners
            .emit(&ViewportEvent::PrimaryChanged(self.primary.clone()));
        self.sync_overview();
        Ok(())
    }

    fn sync_overview(&mut self) {
        self.overview.center = self.primary.center;
        self.overview.resolution = self.magnification * self.primary.resolution;
        self.listeners
            .emit(&ViewportEvent::OverviewChanged(self.overview.clone()));
    }
}

fn validate_view(center: Coord, resolution: f64) -> Result<(), ViewportSyncError> {
    if !is_finite(center) {
        return Err(ViewportSyncError::InvalidView);
    }
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(ViewportSyncError::InvalidResolution(resolution));
    }
    Ok(())
}
