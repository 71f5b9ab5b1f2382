//! Projection math collaborator contract.
//!
//! The workbench does not implement projection math itself; the hosting
//! mapping engine supplies it through `TransformEngine`.

use crate::projection::registry::Projection;
use geo::Coord;

/// Coordinate transform provider.
pub trait TransformEngine {
    /// Transforms `point` from `from` to `to`.
    ///
    /// Both projections are already resolved and carry a transform path.
    /// Returns a human-readable reason on failure.
    fn transform(
        &self,
        point: Coord,
        from: &Projection,
        to: &Projection,
    ) -> Result<Coord, String>;
}

/// Engine used when the host supplies none. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransformEngine;

impl TransformEngine for NoTransformEngine {
    fn transform(
        &self,
        _point: Coord,
        from: &Projection,
        to: &Projection,
    ) -> Result<Coord, String> {
        Err(format!(
            "no projection math engine configured for {} -> {}",
            from.code, to.code
        ))
    }
}
