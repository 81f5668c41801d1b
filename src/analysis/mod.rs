mod aggregator;
mod errors;
mod percentile;

pub use aggregator::*;
pub use errors::*;
pub use percentile::*;

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::cube::Cube;

/// Percentile request: a single value keeps the result shape, a vector adds
/// one dimension with an entry per value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Percent {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Percent {
    pub fn values(&self) -> &[f64] {
        match self {
            Percent::Scalar(value) => std::slice::from_ref(value),
            Percent::Vector(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Percent::Scalar(_))
    }

    pub fn validate(&self) -> Result<(), AggregateError> {
        if self.is_empty() {
            return Err(AggregateError::NoPercentiles);
        }

        match self.values().iter().find(|p| !(0.0..=100.0).contains(*p)) {
            Some(p) => Err(AggregateError::InvalidPercent(*p)),
            None => Ok(()),
        }
    }
}

impl From<f64> for Percent {
    fn from(value: f64) -> Self {
        Percent::Scalar(value)
    }
}

impl From<Vec<f64>> for Percent {
    fn from(values: Vec<f64>) -> Self {
        Percent::Vector(values)
    }
}

impl From<&[f64]> for Percent {
    fn from(values: &[f64]) -> Self {
        Percent::Vector(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Percent {
    fn from(values: [f64; N]) -> Self {
        Percent::Vector(values.to_vec())
    }
}

/// Keyword arguments accepted by the weighted percentile aggregator.
/// `percent` and `weights` are mandatory; they are optional here so a
/// missing one can be reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kwargs {
    #[serde(default)]
    pub percent: Option<Percent>,
    #[serde(default)]
    pub weights: Option<ArrayD<f64>>,
    #[serde(default)]
    pub returned: bool,
}

impl Kwargs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_percent(mut self, percent: impl Into<Percent>) -> Self {
        self.percent = Some(percent.into());
        self
    }

    pub fn with_weights(mut self, weights: ArrayD<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_returned(mut self, returned: bool) -> Self {
        self.returned = returned;
        self
    }
}

/// Raw numeric result of a reduction, optionally paired with the total
/// weight used.
#[derive(Debug, Clone, PartialEq)]
pub enum Reduced<W = ArrayD<f64>> {
    Data(ArrayD<f64>),
    Weighted(ArrayD<f64>, W),
}

impl<W> Reduced<W> {
    pub fn data(&self) -> &ArrayD<f64> {
        match self {
            Reduced::Data(data) | Reduced::Weighted(data, _) => data,
        }
    }

    pub fn total_weights(&self) -> Option<&W> {
        match self {
            Reduced::Data(_) => None,
            Reduced::Weighted(_, total) => Some(total),
        }
    }

    pub fn into_parts(self) -> (ArrayD<f64>, Option<W>) {
        match self {
            Reduced::Data(data) => (data, None),
            Reduced::Weighted(data, total) => (data, Some(total)),
        }
    }
}

/// Labelled result of a reduction, optionally paired with the total
/// weight handed to post-processing.
#[derive(Debug, Clone, PartialEq)]
pub enum Collapsed<W = ArrayD<f64>> {
    Cube(Cube),
    Weighted(Cube, W),
}

impl<W> Collapsed<W> {
    pub fn cube(&self) -> &Cube {
        match self {
            Collapsed::Cube(cube) | Collapsed::Weighted(cube, _) => cube,
        }
    }

    pub fn total_weights(&self) -> Option<&W> {
        match self {
            Collapsed::Cube(_) => None,
            Collapsed::Weighted(_, total) => Some(total),
        }
    }

    pub fn into_parts(self) -> (Cube, Option<W>) {
        match self {
            Collapsed::Cube(cube) => (cube, None),
            Collapsed::Weighted(cube, total) => (cube, Some(total)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn test_percent_validate() {
        assert!(Percent::from(0.0).validate().is_ok());
        assert!(Percent::from([10.0, 50.0, 100.0]).validate().is_ok());

        assert_eq!(
            Percent::from(100.5).validate(),
            Err(AggregateError::InvalidPercent(100.5))
        );
        assert_eq!(
            Percent::from(vec![10.0, -1.0]).validate(),
            Err(AggregateError::InvalidPercent(-1.0))
        );
        assert!(Percent::from(f64::NAN).validate().is_err());
        assert_eq!(
            Percent::Vector(vec![]).validate(),
            Err(AggregateError::NoPercentiles)
        );
    }

    #[test]
    fn test_percent_keeps_order() {
        let percent = Percent::from([90.0, 10.0, 50.0]);

        assert_eq!(percent.values(), &[90.0, 10.0, 50.0]);
        assert_eq!(percent.len(), 3);
        assert!(!percent.is_scalar());
        assert!(Percent::from(50.0).is_scalar());
    }

    #[test]
    fn test_kwargs_from_json() {
        let kwargs: Kwargs = serde_json::from_str(
            r#"{"percent": [10, 50], "weights": {"v": 1, "dim": [2], "data": [1.0, 2.0]}, "returned": true}"#,
        )
        .unwrap();

        assert_eq!(kwargs.percent, Some(Percent::Vector(vec![10.0, 50.0])));
        assert_eq!(
            kwargs.weights,
            Some(ArrayD::from_shape_vec(IxDyn(&[2]), vec![1.0, 2.0]).unwrap())
        );
        assert!(kwargs.returned);

        let kwargs: Kwargs = serde_json::from_str(r#"{"percent": 70}"#).unwrap();
        assert_eq!(kwargs.percent, Some(Percent::Scalar(70.0)));
        assert_eq!(kwargs.weights, None);
        assert!(!kwargs.returned);
    }

    #[test]
    fn test_reduced_into_parts() {
        let data = ArrayD::<f64>::zeros(IxDyn(&[3]));

        let (moved, total) = Reduced::Weighted(data.clone(), 2.0).into_parts();
        assert_eq!(moved, data);
        assert_eq!(total, Some(2.0));

        let reduced: Reduced = Reduced::Data(data);
        assert!(reduced.total_weights().is_none());
    }
}
