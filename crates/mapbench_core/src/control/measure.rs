//! Planar length and area measurement.

use crate::model::geometry::is_finite;
use crate::projection::{AxisUnits, Projection};
use geo::{Area, Coord, EuclideanLength, LineString, Polygon};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from the measure control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasureError {
    /// Planar measurement is meaningless in degrees.
    GeographicUnits(String),
    NonFiniteCoordinate,
}

impl Display for MeasureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GeographicUnits(code) => {
                write!(f, "cannot measure in geographic projection {code}")
            }
            Self::NonFiniteCoordinate => write!(f, "measure vertex must be finite"),
        }
    }
}

impl Error for MeasureError {}

/// Result of the current measure session, in map units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub length: f64,
    /// Closed-polygon area, `None` below three vertices.
    pub area: Option<f64>,
    pub units: AxisUnits,
}

impl Measurement {
    /// `12.34 m` / `1.23 km` style label.
    pub fn length_label(&self) -> String {
        let unit = self.units.as_str();
        if self.units == AxisUnits::Metre && self.length >= 1000.0 {
            format!("{:.2} km", self.length / 1000.0)
        } else {
            format!("{:.2} {unit}", self.length)
        }
    }

    pub fn area_label(&self) -> Option<String> {
        let unit = self.units.as_str();
        self.area.map(|area| {
            if self.units == AxisUnits::Metre && area >= 1_000_000.0 {
                format!("{:.2} km²", area / 1_000_000.0)
            } else {
                format!("{area:.2} {unit}²")
            }
        })
    }
}

/// Measure session over the primary map projection.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureControl {
    units: AxisUnits,
    vertices: Vec<Coord>,
}

impl MeasureControl {
    pub fn new(projection: &Projection) -> Result<Self, MeasureError> {
        if projection.is_geographic() {
            return Err(MeasureError::GeographicUnits(projection.code.clone()));
        }
        Ok(Self {
            units: projection.units(),
            vertices: Vec::new(),
        })
    }

    pub fn add_vertex(&mut self, vertex: Coord) -> Result<Measurement, MeasureError> {
        if !is_finite(vertex) {
            return Err(MeasureError::NonFiniteCoordinate);
        }
        self.vertices.push(vertex);
        Ok(self.measurement())
    }

    /// Drops the last vertex, returning it.
    pub fn undo(&mut self) -> Option<Coord> {
        self.vertices.pop()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[Coord] {
        &self.vertices
    }

    /// Open-path length and, from three vertices on, the area of the
    /// implicitly closed ring.
    pub fn measurement(&self) -> Measurement {
        let path = LineString::from(self.vertices.clone());
        let length = path.euclidean_length();
        let area = (self.vertices.len() >= 3)
            .then(|| Polygon::new(path, Vec::new()).unsigned_area());
        Measurement {
            length,
            area,
            units: self.units,
        }
    }
}
