//! Feature and feature-collection model.
//!
//! # Responsibility
//! - Define the record shape shared by the vector layer, the grid and the
//!   feature-properties view.
//! - Classify attribute values with an explicit tagged union instead of
//!   runtime type checks.
//!
//! # Invariants
//! - Feature identifiers are unique within one `FeatureCollection`.
//! - Attribute order is preserved as received from the query service.

use crate::model::geometry::{geometry_kind, merge_extents};
use geo::{BoundingRect, Geometry, Rect};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable feature identifier as reported by the query service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(String);

impl FeatureId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FeatureId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FeatureId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Attribute value kinds carried by a feature.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Geometry(Geometry),
}

impl AttributeValue {
    pub fn is_geometry(&self) -> bool {
        matches!(self, Self::Geometry(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Bool, number or text.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Number(_) | Self::Text(_))
    }

    pub fn as_geometry(&self) -> Option<&Geometry> {
        match self {
            Self::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    /// Text used by tabular views. Geometries render as their type name.
    pub fn display_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    value.to_string()
                }
            }
            Self::Text(value) => value.clone(),
            Self::Geometry(geometry) => geometry_kind(geometry).to_string(),
        }
    }
}

/// One geographic record.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: FeatureId,
    attributes: Vec<(String, AttributeValue)>,
    geometry_name: Option<String>,
}

impl Feature {
    pub fn new(id: impl Into<FeatureId>) -> Self {
        Self {
            id: id.into(),
            attributes: Vec::new(),
            geometry_name: None,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style geometry setter.
    pub fn with_geometry(mut self, name: impl Into<String>, geometry: Geometry) -> Self {
        self.set_geometry(name, geometry);
        self
    }

    /// Sets one attribute, replacing an existing value with the same name in place.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Stores `geometry` under `name` and marks it as the default geometry.
    pub fn set_geometry(&mut self, name: impl Into<String>, geometry: Geometry) {
        let name = name.into();
        self.set_attribute(name.clone(), AttributeValue::Geometry(geometry));
        self.geometry_name = Some(name);
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Attributes without geometry values, in received order.
    pub fn displayable_attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes().filter(|(_, value)| !value.is_geometry())
    }

    pub fn geometry_name(&self) -> Option<&str> {
        self.geometry_name.as_deref()
    }

    /// Default geometry, falling back to the first geometry-valued attribute.
    pub fn geometry(&self) -> Option<&Geometry> {
        if let Some(name) = self.geometry_name.as_deref() {
            if let Some(geometry) = self.attribute(name).and_then(AttributeValue::as_geometry) {
                return Some(geometry);
            }
        }
        self.attributes
            .iter()
            .find_map(|(_, value)| value.as_geometry())
    }
}

/// Errors raised when assembling a feature collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureCollectionError {
    DuplicateId(FeatureId),
}

impl Display for FeatureCollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate feature id: {id}"),
        }
    }
}

impl Error for FeatureCollectionError {}

/// Ordered features returned by one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    features: Vec<Feature>,
    total_matched: Option<u64>,
}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a collection, rejecting duplicate identifiers.
    pub fn try_new(features: Vec<Feature>) -> Result<Self, FeatureCollectionError> {
        let mut seen = std::collections::HashSet::with_capacity(features.len());
        for feature in &features {
            if !seen.insert(&feature.id) {
                return Err(FeatureCollectionError::DuplicateId(feature.id.clone()));
            }
        }
        Ok(Self {
            features,
            total_matched: None,
        })
    }

    /// Records the server-side match count when the service reports one.
    pub fn with_total_matched(mut self, total: Option<u64>) -> Self {
        self.total_matched = total;
        self
    }

    pub fn total_matched(&self) -> Option<u64> {
        self.total_matched
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn get(&self, id: &FeatureId) -> Option<&Feature> {
        self.features.iter().find(|feature| &feature.id == id)
    }

    pub fn contains(&self, id: &FeatureId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<FeatureId> {
        self.features.iter().map(|feature| feature.id.clone()).collect()
    }

    /// Combined extent of all feature geometries.
    pub fn extent(&self) -> Option<Rect> {
        self.features
            .iter()
            .filter_map(|feature| feature.geometry().and_then(|geometry| geometry.bounding_rect()))
            .reduce(merge_extents)
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributeValue, Feature, FeatureCollection, FeatureCollectionError, FeatureId};
    use geo::{point, Geometry};

    #[test]
    fn geometry_attributes_are_not_displayable() {
        let feature = Feature::new("Adrespos.1")
            .with_attribute("straatnaam", AttributeValue::Text("Kerkstraat".to_string()))
            .with_geometry(
                "adrespositie",
                Geometry::Point(point! { x: 157257.0, y: 172012.0 }),
            )
            .with_attribute("huisnummer", AttributeValue::Number(12.0));

        let names = feature
            .displayable_attributes()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["straatnaam", "huisnummer"]);
        assert_eq!(feature.geometry_name(), Some("adrespositie"));
        assert!(feature.geometry().is_some());
    }

    #[test]
    fn set_attribute_replaces_in_place() {
        let mut feature = Feature::new("a")
            .with_attribute("first", AttributeValue::Null)
            .with_attribute("second", AttributeValue::Bool(true));
        feature.set_attribute("first", AttributeValue::Text("x".to_string()));

        let attributes = feature.attributes().collect::<Vec<_>>();
        assert_eq!(attributes[0].0, "first");
        assert_eq!(attributes[0].1, &AttributeValue::Text("x".to_string()));
        assert_eq!(attributes.len(), 2);
    }

    #[test]
    fn value_kinds_are_classified() {
        assert!(AttributeValue::Null.is_null());
        assert!(AttributeValue::Number(1.5).is_scalar());
        assert!(!AttributeValue::Null.is_scalar());
        let geometry = AttributeValue::Geometry(Geometry::Point(point! { x: 0.0, y: 0.0 }));
        assert!(geometry.is_geometry());
        assert!(!geometry.is_scalar());
        assert_eq!(AttributeValue::Number(12.0).display_text(), "12");
        assert_eq!(AttributeValue::Number(1.25).display_text(), "1.25");
        assert_eq!(geometry.display_text(), "Point");
    }

    #[test]
    fn collection_rejects_duplicate_ids() {
        let err = FeatureCollection::try_new(vec![Feature::new("a"), Feature::new("a")])
            .expect_err("duplicate ids must be rejected");
        assert_eq!(err, FeatureCollectionError::DuplicateId(FeatureId::new("a")));
    }
}
