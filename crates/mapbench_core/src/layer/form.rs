//! New raster layer form submission.
//!
//! # Responsibility
//! - Validate raw form input from the "new layer" window.
//! - Turn a valid form into a raster service descriptor.

use crate::layer::manager::LayerError;
use crate::model::layer::{LayerId, RasterServiceDescriptor, RasterTiling};
use once_cell::sync::Lazy;
use regex::Regex;

static SERVICE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://[^\s/?#]+[^\s]*$").expect("valid service url regex"));

/// Default image format requested from the raster service.
pub const DEFAULT_IMAGE_FORMAT: &str = "image/png";

/// Raw values submitted by the new raster layer window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRasterLayerForm {
    pub name: String,
    pub url: String,
    /// Comma separated service layer names.
    pub layers: String,
    pub styles: String,
    /// Image format, `image/png` when blank.
    pub format: Option<String>,
    pub tiled: bool,
    pub visible: bool,
    /// Target group, map root when `None`.
    pub parent: Option<LayerId>,
}

impl Default for NewRasterLayerForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            layers: String::new(),
            styles: String::new(),
            format: None,
            tiled: true,
            visible: true,
            parent: None,
        }
    }
}

impl NewRasterLayerForm {
    /// Validates service fields and builds the descriptor.
    ///
    /// The layer name is validated by the layer manager on attach.
    pub fn to_descriptor(&self) -> Result<RasterServiceDescriptor, LayerError> {
        let url = self.url.trim();
        if !SERVICE_URL_RE.is_match(url) {
            return Err(LayerError::InvalidForm(format!(
                "service url must be an absolute http(s) url: `{url}`"
            )));
        }

        let layers = self
            .layers
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>();
        if layers.is_empty() {
            return Err(LayerError::InvalidForm(
                "at least one service layer name is required".to_string(),
            ));
        }

        let format = self
            .format
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_IMAGE_FORMAT);
        let tiling = if self.tiled {
            RasterTiling::Tiled
        } else {
            RasterTiling::Image
        };

        let mut descriptor = RasterServiceDescriptor::new(url, tiling)
            .with_param("LAYERS", layers.join(","))
            .with_param("STYLES", self.styles.trim())
            .with_param("FORMAT", format);
        if self.tiled {
            descriptor = descriptor.with_param("TILED", "true");
        }
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::NewRasterLayerForm;
    use crate::layer::manager::LayerError;
    use crate::model::layer::RasterTiling;

    fn form() -> NewRasterLayerForm {
        NewRasterLayerForm {
            name: "Parcels".to_string(),
            url: " https://geoservices.informatievlaanderen.be/raadpleegdiensten/Adpf/wms ".to_string(),
            layers: "Adpf, ".to_string(),
            ..NewRasterLayerForm::default()
        }
    }

    #[test]
    fn builds_tiled_descriptor_with_defaults() {
        let descriptor = form().to_descriptor().unwrap();
        assert_eq!(descriptor.tiling, RasterTiling::Tiled);
        assert_eq!(descriptor.param("LAYERS"), Some("Adpf"));
        assert_eq!(descriptor.param("STYLES"), Some(""));
        assert_eq!(descriptor.param("FORMAT"), Some("image/png"));
        assert_eq!(descriptor.param("TILED"), Some("true"));
        assert!(descriptor.url.starts_with("https://"));
    }

    #[test]
    fn rejects_relative_url_and_missing_layers() {
        let mut bad_url = form();
        bad_url.url = "geoservices/wms".to_string();
        assert!(matches!(bad_url.to_descriptor(), Err(LayerError::InvalidForm(_))));

        let mut no_layers = form();
        no_layers.layers = " , ".to_string();
        assert!(matches!(no_layers.to_descriptor(), Err(LayerError::InvalidForm(_))));
    }
}
