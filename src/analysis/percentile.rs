use log::debug;
use ndarray::{ArrayD, ArrayView1, Axis, IxDyn};

use super::{AggregateError, Percent, Reduced};
use crate::algorithm::WeightedQuantile;
use crate::cube::MaskedArray;

/// Weighted percentile(s) of `data` along `axis`.
///
/// The result has the shape of `data` without `axis`. A vector `percent`
/// appends one trailing dimension holding a value per requested percentile.
/// Masked entries, NaN values and zero weights take no part in the
/// calculation. With `returned` the result is paired with the total weight
/// used by every lane.
pub fn weighted_percentile(
    data: &MaskedArray,
    axis: usize,
    weights: &ArrayD<f64>,
    percent: &Percent,
    returned: bool,
) -> Result<Reduced, AggregateError> {
    let ndim = data.ndim();
    if axis >= ndim {
        return Err(AggregateError::InvalidAxis { axis, ndim });
    }

    percent.validate()?;

    let weights = weights
        .broadcast(data.shape())
        .ok_or_else(|| AggregateError::ShapeMismatch {
            expected: data.shape().to_vec(),
            got: weights.shape().to_vec(),
        })?;

    if let Some(weight) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(AggregateError::InvalidWeight(*weight));
    }

    debug!(
        "weighted percentile over axis {} of {:?} ({} masked) for {:?}",
        axis,
        data.shape(),
        data.count_masked(),
        percent.values()
    );

    let mut shape = data.shape().to_vec();
    shape.remove(axis);

    let masks: Box<dyn Iterator<Item = Option<ArrayView1<bool>>> + '_> = match data.mask() {
        Some(mask) => Box::new(mask.lanes(Axis(axis)).into_iter().map(Some)),
        None => Box::new(std::iter::repeat(None)),
    };

    let mut values = Vec::with_capacity(shape.iter().product::<usize>() * percent.len());
    let mut totals = Vec::with_capacity(shape.iter().product::<usize>());

    for (lane, ((points, lane_weights), mask)) in data
        .data()
        .lanes(Axis(axis))
        .into_iter()
        .zip(weights.lanes(Axis(axis)))
        .zip(masks)
        .enumerate()
    {
        let samples = points
            .iter()
            .zip(lane_weights.iter())
            .enumerate()
            .filter(|(i, _)| mask.as_ref().map_or(true, |mask| !mask[*i]))
            .map(|(_, (point, weight))| (*point, *weight));

        let quantile =
            WeightedQuantile::new(samples).ok_or(AggregateError::DegenerateWeights { lane })?;

        debug!(
            "lane {}: {} samples, total weight {}",
            lane,
            quantile.len(),
            quantile.total()
        );

        values.extend(percent.values().iter().map(|p| quantile.percentile(*p)));
        totals.push(quantile.total());
    }

    let totals = ArrayD::from_shape_vec(IxDyn(&shape), totals).map_err(|_| {
        AggregateError::ShapeMismatch {
            expected: shape.clone(),
            got: vec![values.len()],
        }
    })?;

    if let Percent::Vector(points) = percent {
        shape.push(points.len());
    }

    let length = values.len();
    let result = ArrayD::from_shape_vec(IxDyn(&shape), values).map_err(|_| {
        AggregateError::ShapeMismatch {
            expected: shape.clone(),
            got: vec![length],
        }
    })?;

    if returned {
        Ok(Reduced::Weighted(result, totals))
    } else {
        Ok(Reduced::Data(result))
    }
}
