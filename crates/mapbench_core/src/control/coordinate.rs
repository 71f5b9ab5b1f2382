//! Coordinate readout and typed recentering.
//!
//! # Responsibility
//! - Show the primary center or cursor position in a selectable projection.
//! - Transform typed coordinates back to the map projection and recenter.
//!
//! # Invariants
//! - The selected projection is always one of the offered choices.
//! - Registry failures are returned, never replaced by a fallback value.

use crate::control::ControlError;
use crate::model::geometry::is_finite;
use crate::model::viewport::Viewport;
use crate::projection::{AxisUnits, ProjectionRegistry};
use crate::viewport::ViewportSyncEngine;
use geo::Coord;
use once_cell::sync::Lazy;
use regex::Regex;

static COORDINATE_INPUT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*(?:[,;]\s*|\s+)([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)\s*$")
        .expect("valid coordinate input regex")
});

/// One entry of the projection picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionChoice {
    /// Label as configured, e.g. `Belgian Lambert 72`.
    pub label: String,
    /// Canonical code the label resolves to.
    pub code: String,
    pub units: AxisUnits,
}

/// Coordinate display and input control.
#[derive(Debug, Clone)]
pub struct CoordinateTransformControl {
    choices: Vec<ProjectionChoice>,
    selected: usize,
}

impl CoordinateTransformControl {
    /// Resolves every offered projection and selects `default_code`.
    ///
    /// # Errors
    /// - `EmptyProjectionList` when `projection_codes` is empty.
    /// - `Projection(UnknownProjection)` for an unregistered entry.
    /// - `ProjectionNotOffered` when `default_code` matches no entry.
    pub fn new<I, C>(
        projection_codes: I,
        default_code: &str,
        registry: &ProjectionRegistry,
    ) -> Result<Self, ControlError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let choices = projection_codes
            .into_iter()
            .map(|label| -> Result<ProjectionChoice, ControlError> {
                let label = label.as_ref().trim().to_string();
                let projection = registry.resolve(&label)?;
                Ok(ProjectionChoice {
                    code: projection.code.clone(),
                    units: projection.units(),
                    label,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if choices.is_empty() {
            return Err(ControlError::EmptyProjectionList);
        }

        let mut control = Self {
            choices,
            selected: 0,
        };
        control.select_projection(default_code, registry)?;
        Ok(control)
    }

    pub fn choices(&self) -> &[ProjectionChoice] {
        &self.choices
    }

    pub fn selected(&self) -> &ProjectionChoice {
        &self.choices[self.selected]
    }

    /// Selects the choice whose label matches `code`, or the first choice
    /// resolving to the same canonical projection.
    pub fn select_projection(
        &mut self,
        code: &str,
        registry: &ProjectionRegistry,
    ) -> Result<(), ControlError> {
        let code = code.trim();
        if let Some(index) = self.choices.iter().position(|choice| choice.label == code) {
            self.selected = index;
            return Ok(());
        }
        let canonical = registry.resolve(code)?.code.as_str();
        let index = self
            .choices
            .iter()
            .position(|choice| choice.code == canonical)
            .ok_or_else(|| ControlError::ProjectionNotOffered(code.to_string()))?;
        self.selected = index;
        Ok(())
    }

    /// Primary center expressed in the selected projection.
    pub fn display_center(
        &self,
        viewport: &Viewport,
        registry: &ProjectionRegistry,
    ) -> Result<Coord, ControlError> {
        self.transform_cursor(viewport.center, &viewport.projection, registry)
    }

    /// Cursor position given in `native` expressed in the selected projection.
    pub fn transform_cursor(
        &self,
        coordinate: Coord,
        native: &str,
        registry: &ProjectionRegistry,
    ) -> Result<Coord, ControlError> {
        registry
            .transform(coordinate, native, &self.selected().code)
            .map_err(Into::into)
    }

    /// Recenters the primary map on `coordinate` typed in `input_code`
    /// (selected projection when `None`). Returns the native center.
    pub fn recenter_from_input(
        &self,
        coordinate: Coord,
        input_code: Option<&str>,
        registry: &ProjectionRegistry,
        sync: &mut ViewportSyncEngine,
    ) -> Result<Coord, ControlError> {
        let input_code = input_code.unwrap_or(self.selected().code.as_str());
        let native = registry.transform(coordinate, input_code, &sync.primary().projection)?;
        sync.recenter(native)?;
        Ok(native)
    }

    /// Formats `coordinate` with the precision of the selected units.
    pub fn format_coordinate(&self, coordinate: Coord) -> String {
        format_with_units(coordinate, self.selected().units)
    }

    /// Parses `x, y`, `x; y` or `x y` input.
    pub fn parse_coordinate(input: &str) -> Result<Coord, ControlError> {
        let invalid = || ControlError::InvalidCoordinateInput(input.trim().to_string());
        let caps = COORDINATE_INPUT_RE.captures(input).ok_or_else(invalid)?;
        let x = caps[1].parse::<f64>().map_err(|_| invalid())?;
        let y = caps[2].parse::<f64>().map_err(|_| invalid())?;
        let coordinate = Coord { x, y };
        if !is_finite(coordinate) {
            return Err(invalid());
        }
        Ok(coordinate)
    }
}

/// Two decimals for linear units, six for degrees.
pub fn format_with_units(coordinate: Coord, units: AxisUnits) -> String {
    let precision = match units {
        AxisUnits::Degree => 6,
        AxisUnits::Metre | AxisUnits::Foot => 2,
    };
    format!(
        "{:.precision$}, {:.precision$}",
        coordinate.x,
        coordinate.y,
        precision = precision
    )
}
