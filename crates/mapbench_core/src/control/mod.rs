//! Map controls: coordinate readout, zoom and measurement.
//!
//! # Responsibility
//! - Turn control gestures into registry lookups and viewport changes.
//! - Surface projection and viewport failures to the caller unchanged.

pub mod coordinate;
pub mod measure;
pub mod zoom;

pub use coordinate::{CoordinateTransformControl, ProjectionChoice};
pub use measure::{MeasureControl, MeasureError, Measurement};
pub use zoom::ZoomControl;

use crate::projection::ProjectionError;
use crate::viewport::ViewportSyncError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from coordinate and zoom controls.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    /// Projection lookup or transform failure.
    Projection(ProjectionError),
    /// Viewport rejected the resulting view.
    Viewport(ViewportSyncError),
    /// Control was configured without projections.
    EmptyProjectionList,
    /// Projection is registered but not offered by this control.
    ProjectionNotOffered(String),
    /// Projection has no validity extent to derive zoom levels from.
    MissingZoomLevels(String),
    /// Typed coordinate could not be parsed.
    InvalidCoordinateInput(String),
}

impl Display for ControlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Projection(err) => write!(f, "{err}"),
            Self::Viewport(err) => write!(f, "{err}"),
            Self::EmptyProjectionList => write!(f, "control needs at least one projection"),
            Self::ProjectionNotOffered(code) => {
                write!(f, "projection not offered by control: `{code}`")
            }
            Self::MissingZoomLevels(code) => {
                write!(f, "projection has no extent for zoom levels: {code}")
            }
            Self::InvalidCoordinateInput(input) => {
                write!(f, "expected `x, y` coordinate, got `{input}`")
            }
        }
    }
}

impl Error for ControlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Projection(err) => Some(err),
            Self::Viewport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProjectionError> for ControlError {
    fn from(value: ProjectionError) -> Self {
        Self::Projection(value)
    }
}

impl From<ViewportSyncError> for ControlError {
    fn from(value: ViewportSyncError) -> Self {
        Self::Viewport(value)
    }
}
