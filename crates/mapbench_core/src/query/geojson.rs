//! GeoJSON decoding of query service responses.
//!
//! # Responsibility
//! - Turn a `FeatureCollection` body into the feature model.
//! - Keep property order as received.
//!
//! # Invariants
//! - Features beyond the cap are dropped before they are decoded.
//! - Decoding is all-or-nothing: any malformed kept feature fails the body.
//! - Missing feature ids are synthesized as `<type>.<position>` (1-based),
//!   moving to the next free position when an explicit id already uses it.

use crate::model::feature::{AttributeValue, Feature, FeatureCollection, FeatureId};
use crate::projection::normalize_code;
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Decoding failure with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoJsonError(String);

impl GeoJsonError {
    fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    pub fn reason(&self) -> &str {
        &self.0
    }
}

impl Display for GeoJsonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid geojson: {}", self.0)
    }
}

impl Error for GeoJsonError {}

impl From<serde_json::Error> for GeoJsonError {
    fn from(value: serde_json::Error) -> Self {
        Self::new(value.to_string())
    }
}

/// Decoding inputs taken from the issued query.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    /// Requested coordinate system; a differing `crs` member is rejected.
    pub srs_name: &'a str,
    /// Attribute name used for feature geometries.
    pub geometry_name: &'a str,
    /// Prefix for synthesized ids.
    pub id_prefix: &'a str,
    /// Maximum number of features kept from the body.
    pub max_features: usize,
}

/// Decoded body after the feature cap was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCollection {
    pub collection: FeatureCollection,
    /// Features the body carried beyond the cap.
    pub dropped: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
    #[serde(default)]
    crs: Option<Value>,
    #[serde(default)]
    total_features: Option<Value>,
    #[serde(default)]
    number_matched: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    geometry_name: Option<String>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

/// Decodes a GeoJSON `FeatureCollection` body.
pub fn decode_feature_collection(
    body: &str,
    context: DecodeContext<'_>,
) -> Result<DecodedCollection, GeoJsonError> {
    let raw: RawCollection = serde_json::from_str(body)?;
    if raw.kind != "FeatureCollection" {
        return Err(GeoJsonError::new(format!(
            "expected FeatureCollection, got `{}`",
            raw.kind
        )));
    }
    if let Some(name) = raw.crs.as_ref().and_then(crs_name) {
        let expected = normalize_code(context.srs_name);
        if normalize_code(name) != expected {
            return Err(GeoJsonError::new(format!(
                "response crs `{name}` does not match requested `{expected}`"
            )));
        }
    }

    let total_matched = raw
        .number_matched
        .as_ref()
        .or(raw.total_features.as_ref())
        .and_then(Value::as_u64);

    let mut raw_features = raw.features;
    let dropped = raw_features.len().saturating_sub(context.max_features);
    raw_features.truncate(context.max_features);

    let explicit_ids = raw_features
        .iter()
        .enumerate()
        .map(|(index, feature)| explicit_id(feature.id.as_ref(), index))
        .collect::<Result<Vec<_>, _>>()?;
    let mut taken = explicit_ids.iter().flatten().cloned().collect::<HashSet<_>>();

    let mut features = Vec::with_capacity(raw_features.len());
    for (index, (feature, id)) in raw_features.into_iter().zip(explicit_ids).enumerate() {
        let id = id.unwrap_or_else(|| synthesize_id(context.id_prefix, index, &mut taken));
        features.push(decode_feature(feature, id, index, context)?);
    }

    let collection = FeatureCollection::try_new(features)
        .map_err(|err| GeoJsonError::new(err.to_string()))?
        .with_total_matched(total_matched);
    Ok(DecodedCollection {
        collection,
        dropped,
    })
}

fn explicit_id(value: Option<&Value>, index: usize) -> Result<Option<FeatureId>, GeoJsonError> {
    match value {
        Some(Value::String(value)) if !value.trim().is_empty() => {
            Ok(Some(FeatureId::new(value.as_str())))
        }
        Some(Value::Number(value)) => Ok(Some(FeatureId::new(value.to_string()))),
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(None),
        Some(other) => Err(GeoJsonError::new(format!(
            "feature {index}: unsupported id `{other}`"
        ))),
    }
}

fn synthesize_id(prefix: &str, index: usize, taken: &mut HashSet<FeatureId>) -> FeatureId {
    let mut position = index + 1;
    loop {
        let candidate = FeatureId::new(format!("{prefix}.{position}"));
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        position += 1;
    }
}

fn decode_feature(
    raw: RawFeature,
    id: FeatureId,
    index: usize,
    context: DecodeContext<'_>,
) -> Result<Feature, GeoJsonError> {
    if let Some(kind) = raw.kind.as_deref() {
        if kind != "Feature" {
            return Err(GeoJsonError::new(format!(
                "feature {index}: expected Feature, got `{kind}`"
            )));
        }
    }

    let mut feature = Feature::new(id);
    for (name, value) in raw.properties.unwrap_or_default() {
        feature.set_attribute(name, decode_property(value));
    }

    match raw.geometry {
        None | Some(Value::Null) => {}
        Some(value) => {
            let geometry = decode_geometry(&value)
                .map_err(|err| GeoJsonError::new(format!("feature {index}: {}", err.0)))?;
            let name = raw
                .geometry_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| context.geometry_name.to_string());
            feature.set_geometry(name, geometry);
        }
    }
    Ok(feature)
}

fn decode_property(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(value) => AttributeValue::Bool(value),
        Value::Number(value) => value
            .as_f64()
            .map(AttributeValue::Number)
            .unwrap_or_else(|| AttributeValue::Text(value.to_string())),
        Value::String(value) => AttributeValue::Text(value),
        nested @ (Value::Array(_) | Value::Object(_)) => match decode_geometry(&nested) {
            Ok(geometry) => AttributeValue::Geometry(geometry),
            Err(_) => AttributeValue::Text(nested.to_string()),
        },
    }
}

/// Decodes one GeoJSON geometry object.
pub fn decode_geometry(value: &Value) -> Result<Geometry, GeoJsonError> {
    let object = value
        .as_object()
        .ok_or_else(|| GeoJsonError::new("geometry must be an object"))?;
    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GeoJsonError::new("geometry has no type"))?;
    let coordinates = object
        .get("coordinates")
        .ok_or_else(|| GeoJsonError::new(format!("{kind} has no coordinates")))?;

    match kind {
        "Point" => position(coordinates).map(|coord| Geometry::Point(Point::from(coord))),
        "MultiPoint" => positions(coordinates)
            .map(|coords| Geometry::MultiPoint(coords.into_iter().collect::<MultiPoint>())),
        "LineString" => line_string(coordinates).map(Geometry::LineString),
        "MultiLineString" => nested(coordinates, line_string)
            .map(|paths| Geometry::MultiLineString(MultiLineString::new(paths))),
        "Polygon" => polygon(coordinates).map(Geometry::Polygon),
        "MultiPolygon" => nested(coordinates, polygon)
            .map(|polygons| Geometry::MultiPolygon(MultiPolygon::new(polygons))),
        other => Err(GeoJsonError::new(format!(
            "unsupported geometry type `{other}`"
        ))),
    }
}

/// `[exterior, hole, hole, ...]` rings.
fn polygon(value: &Value) -> Result<Polygon, GeoJsonError> {
    let mut rings = nested(value, line_string)?.into_iter();
    let exterior = rings
        .next()
        .ok_or_else(|| GeoJsonError::new("polygon has no exterior ring"))?;
    Ok(Polygon::new(exterior, rings.collect()))
}

fn line_string(value: &Value) -> Result<LineString, GeoJsonError> {
    positions(value).map(LineString::new)
}

fn crs_name(crs: &Value) -> Option<&str> {
    crs.get("properties")?.get("name")?.as_str()
}

fn position(value: &Value) -> Result<Coord, GeoJsonError> {
    let items = value
        .as_array()
        .ok_or_else(|| GeoJsonError::new("position must be an array"))?;
    match (
        items.first().and_then(Value::as_f64),
        items.get(1).and_then(Value::as_f64),
    ) {
        (Some(x), Some(y)) => Ok(Coord { x, y }),
        _ => Err(GeoJsonError::new("position needs two numbers")),
    }
}

fn positions(value: &Value) -> Result<Vec<Coord>, GeoJsonError> {
    nested(value, position)
}

fn nested<T>(
    value: &Value,
    decode: impl Fn(&Value) -> Result<T, GeoJsonError>,
) -> Result<Vec<T>, GeoJsonError> {
    value
        .as_array()
        .ok_or_else(|| GeoJsonError::new("coordinates must be an array"))?
        .iter()
        .map(decode)
        .collect()
}
