//! Feature query coordination for the vector layer and the feature grid.
//!
//! # Responsibility
//! - Describe queries, hand them to the query service and decode answers.
//! - Bind results and selection to one vector layer.

pub mod binding;
pub mod geojson;
pub mod grid;
pub mod options;
pub mod service;

pub use binding::{Completion, FeatureQueryBinding, QueryError, QueryEvent, QueryState};
pub use geojson::{
    decode_feature_collection, decode_geometry, DecodeContext, DecodedCollection, GeoJsonError,
};
pub use grid::{FeatureGrid, FeatureProperties, GridRow, PropertyRow};
pub use options::{FeatureQueryOptions, FeatureRequest, RequestId, DEFAULT_QUERY_URL};
pub use service::{FeatureQueryService, QueryResponse, QueuedQueryService};
