//! Viewport synchronization between the primary and overview maps.

pub mod layout;
pub mod sync;

pub use layout::{MapPanel, MeasuredPanels, PanelLayout};
pub use sync::{ViewportEvent, ViewportSyncEngine, ViewportSyncError};
