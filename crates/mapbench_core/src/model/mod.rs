//! Domain model shared by the workbench components.
//!
//! # Responsibility
//! - Define geometry, feature, viewport and layer-tree data structures.
//! - Keep data invariants next to the types that own them.
//!
//! # Invariants
//! - Model types carry no UI or network concerns.

pub mod feature;
pub mod geometry;
pub mod layer;
pub mod viewport;
