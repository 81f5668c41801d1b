use std::error::Error;
use std::fmt;

use crate::cube::CubeError;

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateError {
    MissingArgument {
        aggregator: &'static str,
        argument: &'static str,
    },
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    InvalidPercent(f64),
    NoPercentiles,
    DegenerateWeights {
        lane: usize,
    },
    InvalidWeight(f64),
    InvalidAxis {
        axis: usize,
        ndim: usize,
    },
    NoCollapsedCoords,
    UnexpectedResult {
        returned: bool,
    },
    Cube(CubeError),
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AggregateError::MissingArgument {
                aggregator,
                argument,
            } => write!(
                f,
                "{} aggregator requires the mandatory keyword argument '{}'",
                aggregator, argument
            ),
            AggregateError::ShapeMismatch { expected, got } => {
                write!(f, "Shape mismatch: expected {:?}, got {:?}", expected, got)
            }
            AggregateError::InvalidPercent(percent) => {
                write!(f, "Invalid percent: {} (must be in [0, 100])", percent)
            }
            AggregateError::NoPercentiles => write!(f, "At least one percent value is required"),
            AggregateError::DegenerateWeights { lane } => {
                write!(f, "Total weight of lane {} is zero", lane)
            }
            AggregateError::InvalidWeight(weight) => {
                write!(f, "Invalid weight: {} (must be finite and >= 0)", weight)
            }
            AggregateError::InvalidAxis { axis, ndim } => write!(
                f,
                "Axis {} is out of bounds for array with {} dimensions",
                axis, ndim
            ),
            AggregateError::NoCollapsedCoords => {
                write!(f, "At least one collapsed coordinate is required")
            }
            AggregateError::UnexpectedResult { returned } => {
                if *returned {
                    write!(f, "Expected a result paired with its total weight")
                } else {
                    write!(f, "Expected a result without a total weight")
                }
            }
            AggregateError::Cube(error) => write!(f, "{}", error),
        }
    }
}

impl Error for AggregateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AggregateError::Cube(error) => Some(error),
            _ => None,
        }
    }
}

impl From<CubeError> for AggregateError {
    fn from(error: CubeError) -> Self {
        AggregateError::Cube(error)
    }
}
