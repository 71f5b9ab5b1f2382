//! Workbench deployment configuration.
//!
//! # Responsibility
//! - Describe one workbench deployment as a JSON document.
//! - Reject configurations the components would refuse at bootstrap.
//!
//! # Invariants
//! - `WorkbenchConfig::default()` always passes `validate`.
//! - Missing JSON members fall back to the default deployment.

use crate::model::geometry::is_finite;
use crate::model::viewport::PixelSize;
use crate::query::{FeatureQueryOptions, DEFAULT_QUERY_URL};
use geo::Coord;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Errors from loading or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config io error: {err}"),
            Self::Parse(err) => write!(f, "config parse error: {err}"),
            Self::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Initial primary view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialView {
    /// In the map projection.
    pub center: Coord,
    pub zoom: f64,
    /// Radians.
    pub rotation: f64,
}

impl Default for InitialView {
    fn default() -> Self {
        Self {
            center: Coord { x: 157_257.0, y: 172_012.0 },
            zoom: 10.0,
            rotation: 0.0,
        }
    }
}

/// Start-up visibility of the default service layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerVisibility {
    pub parcels: bool,
    pub buildings: bool,
    pub addresses: bool,
    pub wfs_addresses: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            parcels: false,
            buildings: true,
            addresses: false,
            wfs_addresses: true,
        }
    }
}

/// One workbench deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkbenchConfig {
    /// Overview resolution factor.
    pub magnification: f64,
    /// Map projection, code or alias.
    pub map_projection: String,
    /// Projection preselected in the coordinate control.
    pub default_projection: String,
    /// Projections offered by the coordinate control, codes or aliases.
    pub projections: Vec<String>,
    pub initial_view: InitialView,
    pub primary_size: PixelSize,
    pub overview_size: PixelSize,
    pub query_url: String,
    pub query: FeatureQueryOptions,
    pub layers: LayerVisibility,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            magnification: 5.0,
            map_projection: "EPSG:31370".to_string(),
            default_projection: "Belgian Lambert 72".to_string(),
            projections: vec![
                "Belgian Lambert 72".to_string(),
                "WGS84".to_string(),
                "EPSG:4326".to_string(),
            ],
            initial_view: InitialView::default(),
            primary_size: PixelSize::new(1024, 768),
            overview_size: PixelSize::new(256, 192),
            query_url: DEFAULT_QUERY_URL.to_string(),
            query: FeatureQueryOptions::default(),
            layers: LayerVisibility::default(),
        }
    }
}

impl WorkbenchConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.magnification.is_finite() || self.magnification <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "magnification must be finite and > 0, got {}",
                self.magnification
            )));
        }
        if self.query.max_features == 0 {
            return Err(ConfigError::Invalid(
                "query.maxFeatures must be > 0".to_string(),
            ));
        }
        if self.query.feature_types.is_empty() {
            return Err(ConfigError::Invalid(
                "query.featureTypes must not be empty".to_string(),
            ));
        }
        if self.query_url.trim().is_empty() {
            return Err(ConfigError::Invalid("queryUrl must not be blank".to_string()));
        }
        if self.map_projection.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "mapProjection must not be blank".to_string(),
            ));
        }
        let default = self.default_projection.trim();
        if !self
            .projections
            .iter()
            .any(|projection| projection.trim() == default)
        {
            return Err(ConfigError::Invalid(format!(
                "projections must contain the default projection `{default}`"
            )));
        }
        if !is_finite(self.initial_view.center)
            || !self.initial_view.zoom.is_finite()
            || !self.initial_view.rotation.is_finite()
        {
            return Err(ConfigError::Invalid(
                "initialView values must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, WorkbenchConfig};

    #[test]
    fn default_deployment_is_valid() {
        let config = WorkbenchConfig::default();
        config.validate().unwrap();
        assert_eq!(config.magnification, 5.0);
        assert_eq!(config.query.max_features, 200);
        assert!(!config.layers.parcels);
        assert!(config.layers.buildings);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = WorkbenchConfig::from_json(
            r#"{"magnification": 3, "query": {"maxFeatures": 50}}"#,
        )
        .unwrap();
        assert_eq!(config.magnification, 3.0);
        assert_eq!(config.query.max_features, 50);
        assert_eq!(config.query.feature_types, vec!["Adrespos"]);
        assert_eq!(config.default_projection, "Belgian Lambert 72");
    }

    #[test]
    fn rejects_invalid_values() {
        for json in [
            r#"{"magnification": 0}"#,
            r#"{"magnification": -3}"#,
            r#"{"query": {"maxFeatures": 0}}"#,
            r#"{"query": {"featureTypes": []}}"#,
            r#"{"defaultProjection": "EPSG:3857"}"#,
        ] {
            let err = WorkbenchConfig::from_json(json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "json: {json}");
        }
        assert!(matches!(
            WorkbenchConfig::from_json("{not json").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }
}
