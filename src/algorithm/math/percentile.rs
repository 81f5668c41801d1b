use std::cmp::Ordering;

use itertools::Itertools;

/// Sorted, positively weighted sample prepared for percentile queries.
///
/// Each entry sits at the plotting position `(S_i - w_i / 2) / S_n`, where
/// `S_i` is the cumulative weight up to and including entry `i`. Queries
/// between two positions interpolate linearly; queries outside the first or
/// last position clamp to the smallest or largest value.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedQuantile {
    values: Vec<f64>,
    positions: Vec<f64>,
    total: f64,
}

impl WeightedQuantile {
    /// Build from `(value, weight)` pairs. NaN values and entries with zero
    /// weight are ignored; returns `None` when nothing carries weight.
    pub fn new<I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (values, weights): (Vec<f64>, Vec<f64>) = samples
            .into_iter()
            .filter(|(value, weight)| !value.is_nan() && *weight > 0.0)
            .sorted_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
            .unzip();

        let total = weights.iter().sum::<f64>();
        if values.is_empty() || total <= 0.0 {
            return None;
        }

        let positions = weights
            .iter()
            .scan(0.0, |cumulative, weight| {
                *cumulative += weight;
                Some((*cumulative - 0.5 * weight) / total)
            })
            .collect::<Vec<_>>();

        Some(Self {
            values,
            positions,
            total,
        })
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `p` is a percentage in [0, 100]; callers validate the range. A NaN
    /// percentage yields NaN.
    pub fn percentile(&self, p: f64) -> f64 {
        if p.is_nan() {
            return f64::NAN;
        }

        let n = self.values.len();
        if n == 1 {
            return self.values[0];
        }

        let q = p / 100.0;
        if q <= self.positions[0] {
            return self.values[0];
        }
        if q >= self.positions[n - 1] {
            return self.values[n - 1];
        }

        let hi = self.positions.partition_point(|position| *position <= q);
        let lo = hi - 1;
        let w = (q - self.positions[lo]) / (self.positions[hi] - self.positions[lo]);

        // @NOTE: an exact hit must not touch the neighbour, it may be infinite
        if w == 0.0 || self.values[lo] == self.values[hi] {
            return self.values[lo];
        }

        self.values[lo] * (1.0 - w) + self.values[hi] * w
    }
}
