use ndarray::ArrayD;

use super::CubeError;

/// Numeric array with an optional mask of the same shape, `true` marking a
/// missing entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray {
    data: ArrayD<f64>,
    mask: Option<ArrayD<bool>>,
}

impl MaskedArray {
    pub fn new(data: ArrayD<f64>) -> Self {
        Self { data, mask: None }
    }

    pub fn with_mask(data: ArrayD<f64>, mask: ArrayD<bool>) -> Result<Self, CubeError> {
        if data.shape() != mask.shape() {
            return Err(CubeError {
                message: format!(
                    "mask shape {:?} does not match data shape {:?}",
                    mask.shape(),
                    data.shape()
                ),
            });
        }

        Ok(Self {
            data,
            mask: Some(mask),
        })
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn mask(&self) -> Option<&ArrayD<bool>> {
        self.mask.as_ref()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn count_masked(&self) -> usize {
        self.mask
            .as_ref()
            .map(|mask| mask.iter().filter(|masked| **masked).count())
            .unwrap_or(0)
    }
}

impl From<ArrayD<f64>> for MaskedArray {
    fn from(data: ArrayD<f64>) -> Self {
        Self::new(data)
    }
}
