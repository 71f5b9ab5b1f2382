//! Core domain logic for the map workbench.
//! This crate owns map-state synchronization and feature-query coordination.

pub mod config;
pub mod control;
pub mod events;
pub mod layer;
pub mod logging;
pub mod model;
pub mod projection;
pub mod query;
pub mod viewport;
pub mod workbench;

pub use config::{ConfigError, InitialView, LayerVisibility, WorkbenchConfig};
pub use control::{
    ControlError, CoordinateTransformControl, MeasureControl, MeasureError, Measurement,
    ProjectionChoice, ZoomControl,
};
pub use events::{Listeners, SubscriptionId};
pub use layer::{LayerError, LayerManager, LayerOptions, LayerRow, LayerTreeEvent, NewRasterLayerForm};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use geo::{Coord, Geometry, Rect};
pub use model::feature::{AttributeValue, Feature, FeatureCollection, FeatureId};
pub use model::layer::{FeatureStore, Layer, LayerGroup, LayerId, LayerNode};
pub use model::viewport::{PixelSize, Viewport, ZoomLevels};
pub use projection::{
    NoTransformEngine, Projection, ProjectionDefinition, ProjectionError, ProjectionRegistry,
    TransformEngine,
};
pub use query::{
    Completion, DecodedCollection, FeatureGrid, FeatureQueryBinding, FeatureQueryOptions,
    FeatureQueryService, FeatureRequest, QueryError, QueryEvent, QueryResponse, QueryState,
    QueuedQueryService, RequestId,
};
pub use viewport::{MeasuredPanels, PanelLayout, ViewportEvent, ViewportSyncEngine, ViewportSyncError};
pub use workbench::{Workbench, WorkbenchError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
