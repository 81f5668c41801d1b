use itertools::Itertools;
use ndarray::{array, Array1};

use super::CubeError;

const UNKNOWN_NAME: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordKind {
    Dim,
    Aux,
}

/// Points describing one or more dimensions of a cube. Multi-dimensional
/// auxiliary coordinates keep their points flattened in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Coord {
    kind: CoordKind,
    points: Array1<f64>,
    standard_name: Option<String>,
    long_name: Option<String>,
    units: Option<String>,
}

impl Coord {
    /// Dimension coordinates must be strictly monotonic.
    pub fn dim(points: impl Into<Array1<f64>>, standard_name: &str) -> Result<Self, CubeError> {
        let points = points.into();

        if points.is_empty() {
            return Err(CubeError {
                message: format!("dimension coordinate '{}' has no points", standard_name),
            });
        }

        let increasing = points.iter().tuple_windows().all(|(a, b)| a < b);
        let decreasing = points.iter().tuple_windows().all(|(a, b)| a > b);

        if !increasing && !decreasing {
            return Err(CubeError {
                message: format!(
                    "dimension coordinate '{}' is not strictly monotonic",
                    standard_name
                ),
            });
        }

        Ok(Self {
            kind: CoordKind::Dim,
            points,
            standard_name: Some(standard_name.to_string()),
            long_name: None,
            units: None,
        })
    }

    pub fn aux(points: impl Into<Array1<f64>>, long_name: &str) -> Result<Self, CubeError> {
        let points = points.into();

        if points.is_empty() {
            return Err(CubeError {
                message: format!("auxiliary coordinate '{}' has no points", long_name),
            });
        }

        Ok(Self {
            kind: CoordKind::Aux,
            points,
            standard_name: None,
            long_name: Some(long_name.to_string()),
            units: None,
        })
    }

    pub fn scalar(value: f64, long_name: &str) -> Self {
        Self {
            kind: CoordKind::Aux,
            points: array![value],
            standard_name: None,
            long_name: Some(long_name.to_string()),
            units: None,
        }
    }

    pub fn with_standard_name(mut self, standard_name: &str) -> Self {
        self.standard_name = Some(standard_name.to_string());
        self
    }

    pub fn with_long_name(mut self, long_name: &str) -> Self {
        self.long_name = Some(long_name.to_string());
        self
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .unwrap_or(UNKNOWN_NAME)
    }

    pub fn kind(&self) -> CoordKind {
        self.kind
    }

    pub fn points(&self) -> &Array1<f64> {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn standard_name(&self) -> Option<&str> {
        self.standard_name.as_deref()
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }
}
