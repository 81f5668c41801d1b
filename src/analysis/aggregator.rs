use std::fmt;
use std::iter::once;
use std::sync::Arc;

use log::debug;
use ndarray::{ArrayD, IxDyn};

use super::{weighted_percentile, AggregateError, Collapsed, Kwargs, Percent, Reduced};
use crate::cube::{Coord, Cube, MaskedArray};

const NAME: &str = "weighted_percentile";

pub type CallFunc = Arc<
    dyn Fn(&MaskedArray, usize, &ArrayD<f64>, &Percent, bool) -> Result<Reduced, AggregateError>
        + Send
        + Sync,
>;

/// Deferred counterpart of [`CallFunc`]; materialised results must match
/// the eager ones.
pub type LazyFunc = CallFunc;

/// Maps the units of the input cube to the units of the result.
pub type UnitsFunc = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Aggregator computing weighted percentiles over one dimension of a cube.
///
/// The units and lazy hooks are stored for the framework driving the
/// aggregator and are never invoked here.
#[derive(Clone)]
pub struct WeightedPercentileAggregator {
    call_func: CallFunc,
    units_func: Option<UnitsFunc>,
    lazy_func: Option<LazyFunc>,
}

impl fmt::Debug for WeightedPercentileAggregator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("WeightedPercentileAggregator")
            .field("name", &NAME)
            .field("units_func", &self.units_func.is_some())
            .field("lazy_func", &self.lazy_func.is_some())
            .finish()
    }
}

impl Default for WeightedPercentileAggregator {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl WeightedPercentileAggregator {
    pub fn new(units_func: Option<UnitsFunc>, lazy_func: Option<LazyFunc>) -> Self {
        Self {
            call_func: Arc::new(weighted_percentile),
            units_func,
            lazy_func,
        }
    }

    pub fn with_call_func(mut self, call_func: CallFunc) -> Self {
        self.call_func = call_func;
        self
    }

    pub fn name(&self) -> &'static str {
        NAME
    }

    /// Percentiles are parameterised, so there is no cell method to record.
    pub fn cell_method(&self) -> Option<&str> {
        None
    }

    pub fn call_func(&self) -> &CallFunc {
        &self.call_func
    }

    pub fn units_func(&self) -> Option<&UnitsFunc> {
        self.units_func.as_ref()
    }

    pub fn lazy_func(&self) -> Option<&LazyFunc> {
        self.lazy_func.as_ref()
    }

    pub fn aggregate(
        &self,
        data: &MaskedArray,
        axis: usize,
        kwargs: &Kwargs,
    ) -> Result<Reduced, AggregateError> {
        let (percent, weights) = self.mandatory(kwargs)?;

        debug!(
            "{} over axis {} of {:?} for {:?}",
            NAME,
            axis,
            data.shape(),
            percent.values()
        );

        (self.call_func)(data, axis, weights, percent, kwargs.returned)
    }

    /// Label a raw reduction result using `template`, the cube the result
    /// belongs to, for its coordinates. A vector percent moves the trailing
    /// percentile dimension of `result` to the front.
    pub fn post_process<W>(
        &self,
        template: &Cube,
        result: Reduced<W>,
        collapsed_coords: &[Coord],
        kwargs: &Kwargs,
    ) -> Result<Collapsed<W>, AggregateError> {
        let (percent, _) = self.mandatory(kwargs)?;
        percent.validate()?;

        let collapsed = collapsed_coords
            .first()
            .ok_or(AggregateError::NoCollapsedCoords)?;
        let name = format!("{}_over_{}", NAME, collapsed.name());

        let (data, total) = match (result, kwargs.returned) {
            (Reduced::Data(data), false) => (data, None),
            (Reduced::Weighted(data, total), true) => (data, Some(total)),
            (_, returned) => return Err(AggregateError::UnexpectedResult { returned }),
        };

        let cube = match percent {
            Percent::Scalar(point) => {
                if data.shape() != template.shape() {
                    return Err(AggregateError::ShapeMismatch {
                        expected: template.shape().to_vec(),
                        got: data.shape().to_vec(),
                    });
                }

                let mut cube = template.with_data(data)?;
                cube.add_aux_coord(Coord::scalar(*point, &name), &[])?;
                cube
            }
            Percent::Vector(points) => {
                let expected = template
                    .shape()
                    .iter()
                    .copied()
                    .chain(once(points.len()))
                    .collect::<Vec<_>>();

                if data.shape() != expected.as_slice() {
                    return Err(AggregateError::ShapeMismatch {
                        expected,
                        got: data.shape().to_vec(),
                    });
                }

                // @NOTE: roll the trailing percentile axis to the front
                let last = data.ndim() - 1;
                let order = once(last).chain(0..last).collect::<Vec<_>>();
                let data = data.permuted_axes(IxDyn(&order));

                let mut cube = template.with_leading_dim(data)?;
                cube.add_aux_coord(Coord::aux(points.clone(), &name)?, &[0])?;
                cube
            }
        };

        debug!("attached '{}' to result with shape {:?}", name, cube.shape());

        Ok(match total {
            Some(total) => Collapsed::Weighted(cube, total),
            None => Collapsed::Cube(cube),
        })
    }

    fn mandatory<'a>(
        &self,
        kwargs: &'a Kwargs,
    ) -> Result<(&'a Percent, &'a ArrayD<f64>), AggregateError> {
        let percent = kwargs
            .percent
            .as_ref()
            .ok_or(AggregateError::MissingArgument {
                aggregator: NAME,
                argument: "percent",
            })?;
        let weights = kwargs
            .weights
            .as_ref()
            .ok_or(AggregateError::MissingArgument {
                aggregator: NAME,
                argument: "weights",
            })?;

        Ok((percent, weights))
    }
}
