//! Layer tree management.

pub mod form;
pub mod manager;

pub use form::{NewRasterLayerForm, DEFAULT_IMAGE_FORMAT};
pub use manager::{
    LayerError, LayerManager, LayerOptions, LayerRow, LayerTreeEvent, ROOT_GROUP_NAME,
};
