//! Projection registry: code/alias resolution and transform dispatch.
//!
//! # Responsibility
//! - Own the projection definitions known to one workbench.
//! - Resolve human-readable aliases and EPSG spellings to one definition.
//! - Validate transform paths before delegating to the projection engine.
//!
//! # Invariants
//! - Every alias resolves to exactly one canonical projection.
//! - `resolve(resolve(x).code)` returns the same projection as `resolve(x)`.
//! - An alias never shadows a canonical code.

use crate::model::geometry::is_finite;
use crate::model::viewport::ZoomLevels;
use crate::projection::code::{normalize_code, parse_proj4};
use crate::projection::engine::{NoTransformEngine, TransformEngine};
use geo::{Coord, Rect};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Canonical code of Belgian Lambert 72.
pub const EPSG_BELGIAN_LAMBERT_72: &str = "EPSG:31370";
/// Canonical code of WGS84 geographic coordinates.
pub const EPSG_WGS84: &str = "EPSG:4326";
/// Canonical code of spherical Web Mercator.
pub const EPSG_WEB_MERCATOR: &str = "EPSG:3857";

const LAMBERT_72_PROJ4: &str = "+proj=lcc +lat_0=90 +lon_0=4.36748666666667 +lat_1=51.1666672333333 +lat_2=49.8333339 +x_0=150000.013 +y_0=5400088.438 +ellps=intl +towgs84=-106.869,52.2978,-103.724,0.3366,-0.457,1.8422,-1.2747 +units=m +no_defs";
const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs";
const WEB_MERCATOR_PROJ4: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +wktext +no_defs";
const WEB_MERCATOR_HALF_WORLD: f64 = 20_037_508.342_789_244;

/// Errors from projection lookup and transforms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// Code or alias is blank.
    InvalidCode(String),
    /// No projection registered under this code or alias.
    UnknownProjection(String),
    /// Alias would shadow an existing canonical code.
    AliasConflict { alias: String, code: String },
    /// No usable transform path between two projections.
    TransformError {
        from: String,
        to: String,
        reason: String,
    },
}

impl Display for ProjectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCode(value) => write!(f, "invalid projection code: `{value}`"),
            Self::UnknownProjection(value) => write!(f, "unknown projection: `{value}`"),
            Self::AliasConflict { alias, code } => write!(
                f,
                "alias `{alias}` conflicts with registered projection code (target `{code}`)"
            ),
            Self::TransformError { from, to, reason } => {
                write!(f, "cannot transform {from} -> {to}: {reason}")
            }
        }
    }
}

impl Error for ProjectionError {}

/// Axis units of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisUnits {
    Metre,
    Degree,
    Foot,
}

impl AxisUnits {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metre => "m",
            Self::Degree => "degrees",
            Self::Foot => "ft",
        }
    }
}

/// Authority definition of one projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionDefinition {
    pub units: AxisUnits,
    /// proj4-style definition string. `None` means no transform path.
    pub proj4: Option<String>,
    /// Validity extent in projection units.
    pub extent: Option<Rect>,
}

impl ProjectionDefinition {
    /// Builds a definition from a proj4 string, deriving axis units.
    pub fn from_proj4(proj4: impl Into<String>) -> Self {
        let proj4 = proj4.into();
        let params = parse_proj4(&proj4);
        let method = params.get("proj").and_then(|value| value.as_deref());
        let units = if method.is_some_and(is_geographic_method) {
            AxisUnits::Degree
        } else {
            match params.get("units").and_then(|value| value.as_deref()) {
                Some("ft") | Some("us-ft") => AxisUnits::Foot,
                _ => AxisUnits::Metre,
            }
        };
        Self {
            units,
            proj4: Some(proj4),
            extent: None,
        }
    }

    /// Definition without an authority string; lookups work, transforms fail.
    pub fn without_transform(units: AxisUnits) -> Self {
        Self {
            units,
            proj4: None,
            extent: None,
        }
    }

    pub fn with_extent(mut self, extent: Rect) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Parsed proj4 parameters, empty when no definition string exists.
    pub fn params(&self) -> BTreeMap<String, Option<String>> {
        self.proj4.as_deref().map(parse_proj4).unwrap_or_default()
    }

    fn transform_path(&self) -> Result<(), String> {
        if self.proj4.is_none() {
            return Err("projection has no authority definition".to_string());
        }
        let params = self.params();
        let method = params
            .get("proj")
            .and_then(|value| value.as_deref())
            .ok_or_else(|| "definition has no +proj method".to_string())?;

        let has_datum = ["datum", "towgs84", "nadgrids"]
            .iter()
            .any(|key| params.contains_key(*key));
        let wgs84_geographic = is_geographic_method(method)
            && params
                .get("ellps")
                .and_then(|value| value.as_deref())
                .is_some_and(|ellps| ellps.eq_ignore_ascii_case("WGS84"));
        if has_datum || wgs84_geographic {
            Ok(())
        } else {
            Err("missing datum parameters (+datum, +towgs84 or +nadgrids)".to_string())
        }
    }
}

/// One registered projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Canonical code, e.g. `EPSG:31370`.
    pub code: String,
    /// Registered aliases in registration order.
    pub aliases: Vec<String>,
    pub definition: ProjectionDefinition,
}

impl Projection {
    pub fn units(&self) -> AxisUnits {
        self.definition.units
    }

    pub fn is_geographic(&self) -> bool {
        self.definition.units == AxisUnits::Degree
    }

    pub fn extent(&self) -> Option<Rect> {
        self.definition.extent
    }

    /// Zoom levels derived from the validity extent.
    pub fn zoom_levels(&self) -> Option<ZoomLevels> {
        self.definition.extent.as_ref().map(ZoomLevels::for_extent)
    }
}

/// Registry of projections for one workbench.
pub struct ProjectionRegistry {
    projections: BTreeMap<String, Projection>,
    aliases: BTreeMap<String, String>,
    engine: Box<dyn TransformEngine>,
}

impl Default for ProjectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ProjectionRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionRegistry")
            .field("projections", &self.projections.keys().collect::<Vec<_>>())
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl ProjectionRegistry {
    /// Empty registry without projection math.
    pub fn new() -> Self {
        Self::with_engine(Box::new(NoTransformEngine))
    }

    /// Empty registry delegating transforms to `engine`.
    pub fn with_engine(engine: Box<dyn TransformEngine>) -> Self {
        Self {
            projections: BTreeMap::new(),
            aliases: BTreeMap::new(),
            engine,
        }
    }

    /// Registry preloaded with Belgian Lambert 72, WGS84 and Web Mercator.
    pub fn with_defaults(engine: Box<dyn TransformEngine>) -> Self {
        let mut registry = Self::with_engine(engine);
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        let defaults = [
            (
                EPSG_BELGIAN_LAMBERT_72,
                ProjectionDefinition::from_proj4(LAMBERT_72_PROJ4)
                    .with_extent(Rect::new(
                        Coord { x: 14_000.0, y: 20_000.0 },
                        Coord { x: 300_000.0, y: 250_000.0 },
                    )),
                &["Belgian Lambert 72"][..],
            ),
            (
                EPSG_WGS84,
                ProjectionDefinition::from_proj4(WGS84_PROJ4)
                    .with_extent(Rect::new(
                        Coord { x: -180.0, y: -90.0 },
                        Coord { x: 180.0, y: 90.0 },
                    )),
                &["WGS84"][..],
            ),
            (
                EPSG_WEB_MERCATOR,
                ProjectionDefinition::from_proj4(WEB_MERCATOR_PROJ4).with_extent(Rect::new(
                    Coord {
                        x: -WEB_MERCATOR_HALF_WORLD,
                        y: -WEB_MERCATOR_HALF_WORLD,
                    },
                    Coord {
                        x: WEB_MERCATOR_HALF_WORLD,
                        y: WEB_MERCATOR_HALF_WORLD,
                    },
                )),
                &["EPSG:900913", "Web Mercator"][..],
            ),
        ];
        for (code, definition, aliases) in defaults {
            self.projections.insert(
                code.to_string(),
                Projection {
                    code: code.to_string(),
                    aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
                    definition,
                },
            );
            for alias in aliases {
                self.aliases.insert(alias.to_string(), code.to_string());
            }
        }
    }

    /// Adds or overwrites a projection. Existing aliases keep pointing to it.
    pub fn register(
        &mut self,
        code: &str,
        definition: ProjectionDefinition,
    ) -> Result<(), ProjectionError> {
        let code = normalize_code(code);
        if code.is_empty() {
            return Err(ProjectionError::InvalidCode(code));
        }

        if let Some(previous_target) = self.aliases.remove(code.as_str()) {
            if let Some(previous) = self.projections.get_mut(previous_target.as_str()) {
                previous.aliases.retain(|alias| *alias != code);
            }
        }

        let aliases = self
            .projections
            .get(code.as_str())
            .map(|existing| existing.aliases.clone())
            .unwrap_or_default();
        let replaced = self
            .projections
            .insert(
                code.clone(),
                Projection {
                    code: code.clone(),
                    aliases,
                    definition,
                },
            )
            .is_some();
        info!(
            "event=projection_register module=projection status=ok code={} replaced={}",
            code, replaced
        );
        Ok(())
    }

    /// Adds `alias` for the projection resolved from `code`.
    pub fn register_alias(&mut self, alias: &str, code: &str) -> Result<(), ProjectionError> {
        let alias = normalize_code(alias);
        if alias.is_empty() {
            return Err(ProjectionError::InvalidCode(alias));
        }
        let canonical = self.resolve(code)?.code.clone();
        if alias == canonical {
            return Ok(());
        }
        if self.projections.contains_key(alias.as_str()) {
            return Err(ProjectionError::AliasConflict {
                alias,
                code: canonical,
            });
        }

        if let Some(previous_target) = self.aliases.insert(alias.clone(), canonical.clone()) {
            if previous_target != canonical {
                if let Some(previous) = self.projections.get_mut(previous_target.as_str()) {
                    previous.aliases.retain(|existing| *existing != alias);
                }
            }
        }
        if let Some(projection) = self.projections.get_mut(canonical.as_str()) {
            if !projection.aliases.contains(&alias) {
                projection.aliases.push(alias);
            }
        }
        Ok(())
    }

    /// Resolves a code or alias to its canonical projection.
    pub fn resolve(&self, code_or_alias: &str) -> Result<&Projection, ProjectionError> {
        let trimmed = code_or_alias.trim();
        let normalized = normalize_code(trimmed);
        if let Some(projection) = self.projections.get(normalized.as_str()) {
            return Ok(projection);
        }
        self.aliases
            .get(trimmed)
            .or_else(|| self.aliases.get(normalized.as_str()))
            .and_then(|canonical| self.projections.get(canonical.as_str()))
            .ok_or_else(|| ProjectionError::UnknownProjection(trimmed.to_string()))
    }

    pub fn contains(&self, code_or_alias: &str) -> bool {
        self.resolve(code_or_alias).is_ok()
    }

    /// Canonical codes in sorted order.
    pub fn codes(&self) -> Vec<String> {
        self.projections.keys().cloned().collect()
    }

    /// Transforms `point` between two registered projections.
    ///
    /// # Errors
    /// - `UnknownProjection` when either side is not registered.
    /// - `TransformError` when a side lacks a transform path, the input is not
    ///   finite, or the engine fails.
    pub fn transform(
        &self,
        point: Coord,
        from: &str,
        to: &str,
    ) -> Result<Coord, ProjectionError> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        let transform_error = |reason: String| ProjectionError::TransformError {
            from: source.code.clone(),
            to: target.code.clone(),
            reason,
        };

        if !is_finite(point) {
            return Err(transform_error("coordinate is not finite".to_string()));
        }
        if source.code == target.code {
            return Ok(point);
        }
        source.definition.transform_path().map_err(&transform_error)?;
        target.definition.transform_path().map_err(&transform_error)?;

        match self.engine.transform(point, source, target) {
            Ok(result) if is_finite(result) => Ok(result),
            Ok(_) => Err(transform_error("engine returned a non-finite coordinate".to_string())),
            Err(reason) => {
                debug!(
                    "event=projection_transform module=projection status=error from={} to={}",
                    source.code, target.code
                );
                Err(transform_error(reason))
            }
        }
    }
}

fn is_geographic_method(method: &str) -> bool {
    matches!(method, "longlat" | "latlong" | "lonlat" | "latlon")
}
