//! Projection code and proj4 definition parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static EPSG_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:epsg:{1,2}|urn:(?:x-)?ogc:def:crs:epsg:(?:[0-9.]*:)?|https?://www\.opengis\.net/gml/srs/epsg\.xml#|https?://www\.opengis\.net/def/crs/epsg/[0-9.]+/)(\d+)$",
    )
    .expect("valid epsg code regex")
});
static PROJ4_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+([A-Za-z_][A-Za-z0-9_]*)(?:=(\S+))?").expect("valid proj4 regex"));

/// Normalizes EPSG codes written as `epsg:n`, OGC URNs or GML URLs to `EPSG:n`.
///
/// Anything else is returned trimmed and otherwise unchanged.
pub fn normalize_code(raw: &str) -> String {
    let trimmed = raw.trim();
    match EPSG_CODE_RE.captures(trimmed) {
        Some(caps) => format!("EPSG:{}", &caps[1]),
        None => trimmed.to_string(),
    }
}

/// Parses `+key=value` / `+flag` tokens of a proj4 definition.
pub fn parse_proj4(definition: &str) -> BTreeMap<String, Option<String>> {
    PROJ4_PARAM_RE
        .captures_iter(definition)
        .map(|caps| {
            (
                caps[1].to_ascii_lowercase(),
                caps.get(2).map(|value| value.as_str().to_string()),
            )
        })
        .collect()
}
