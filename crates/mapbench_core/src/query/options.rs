//! Feature query parameters and outgoing requests.

use crate::query::binding::QueryError;
use serde::{Deserialize, Serialize};

/// Identifier of one issued query, increasing per binding.
pub type RequestId = u64;

/// Default query service endpoint.
pub const DEFAULT_QUERY_URL: &str =
    "https://geoservices.informatievlaanderen.be/overdrachtdiensten/Adressen/wfs";

/// Parameters of one feature query.
///
/// # Invariants
/// - `max_features > 0`.
/// - `feature_types` is non-empty and holds no blank names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureQueryOptions {
    /// Coordinate system of the returned geometries.
    pub srs_name: String,
    #[serde(rename = "featureNS")]
    pub feature_ns: String,
    pub feature_prefix: String,
    pub feature_types: Vec<String>,
    pub geometry_name: String,
    pub output_format: String,
    /// Result cap.
    pub max_features: usize,
}

impl Default for FeatureQueryOptions {
    fn default() -> Self {
        Self {
            srs_name: "EPSG:31370".to_string(),
            feature_ns: "informatievlaanderen.be/Adressen".to_string(),
            feature_prefix: "Adressen".to_string(),
            feature_types: vec!["Adrespos".to_string()],
            geometry_name: "adrespositie".to_string(),
            output_format: "application/json".to_string(),
            max_features: 200,
        }
    }
}

impl FeatureQueryOptions {
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.max_features == 0 {
            return Err(QueryError::InvalidOptions(
                "max_features must be > 0".to_string(),
            ));
        }
        if self.feature_types.is_empty() {
            return Err(QueryError::InvalidOptions(
                "feature_types must not be empty".to_string(),
            ));
        }
        if self.feature_types.iter().any(|name| name.trim().is_empty()) {
            return Err(QueryError::InvalidOptions(
                "feature type names must not be blank".to_string(),
            ));
        }
        if self.srs_name.trim().is_empty() {
            return Err(QueryError::InvalidOptions(
                "srs_name must not be blank".to_string(),
            ));
        }
        if self.output_format.trim().is_empty() {
            return Err(QueryError::InvalidOptions(
                "output_format must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Feature type names qualified with the prefix (`Adressen:Adrespos`).
    pub fn qualified_type_names(&self) -> Vec<String> {
        let prefix = self.feature_prefix.trim();
        self.feature_types
            .iter()
            .map(|name| {
                let name = name.trim();
                if prefix.is_empty() || name.contains(':') {
                    name.to_string()
                } else {
                    format!("{prefix}:{name}")
                }
            })
            .collect()
    }
}

/// One request handed to the query service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequest {
    pub id: RequestId,
    pub url: String,
    pub options: FeatureQueryOptions,
}
