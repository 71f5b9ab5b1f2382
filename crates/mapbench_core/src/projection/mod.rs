//! Projection lookup and coordinate transform dispatch.
//!
//! # Responsibility
//! - Map projection codes and aliases to definitions.
//! - Route coordinate transforms to the configured projection engine.
//!
//! # Invariants
//! - Projection math itself lives behind `TransformEngine`.

pub mod code;
pub mod engine;
pub mod registry;

pub use code::{normalize_code, parse_proj4};
pub use engine::{NoTransformEngine, TransformEngine};
pub use registry::{
    AxisUnits, Projection, ProjectionDefinition, ProjectionError, ProjectionRegistry,
    EPSG_BELGIAN_LAMBERT_72, EPSG_WEB_MERCATOR, EPSG_WGS84,
};
