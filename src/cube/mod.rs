mod coords;
mod masked;
mod utilities;

pub use coords::*;
pub use masked::*;
pub use utilities::*;

use std::error::Error;
use std::fmt;

use log::debug;
use ndarray::{ArrayD, IxDyn};

use crate::analysis::{AggregateError, Collapsed, Kwargs, WeightedPercentileAggregator};

#[derive(Debug, Clone, PartialEq)]
pub struct CubeError {
    pub message: String,
}

impl fmt::Display for CubeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CubeError {}

/// Labelled n-dimensional array: data plus the coordinates describing its
/// dimensions. Scalar coordinates are auxiliary coordinates spanning no
/// dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    data: ArrayD<f64>,
    long_name: Option<String>,
    units: Option<String>,
    dim_coords: Vec<(Coord, usize)>,
    aux_coords: Vec<(Coord, Vec<usize>)>,
}

impl Cube {
    pub fn new(data: ArrayD<f64>) -> Self {
        Self {
            data,
            long_name: None,
            units: None,
            dim_coords: Vec::new(),
            aux_coords: Vec::new(),
        }
    }

    pub fn with_long_name(mut self, long_name: &str) -> Self {
        self.long_name = Some(long_name.to_string());
        self
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn into_data(self) -> ArrayD<f64> {
        self.data
    }

    pub fn add_dim_coord(&mut self, coord: Coord, dim: usize) -> Result<(), CubeError> {
        self.ensure_unique_name(&coord)?;

        if coord.kind() != CoordKind::Dim {
            return Err(CubeError {
                message: format!("'{}' is not a dimension coordinate", coord.name()),
            });
        }
        if dim >= self.ndim() {
            return Err(CubeError {
                message: format!(
                    "dimension {} is out of range for a cube with {} dimensions",
                    dim,
                    self.ndim()
                ),
            });
        }
        if self.dim_coords.iter().any(|(_, used)| *used == dim) {
            return Err(CubeError {
                message: format!("dimension {} already has a dimension coordinate", dim),
            });
        }
        if coord.len() != self.shape()[dim] {
            return Err(CubeError {
                message: format!(
                    "coordinate '{}' has {} points but dimension {} has length {}",
                    coord.name(),
                    coord.len(),
                    dim,
                    self.shape()[dim]
                ),
            });
        }

        self.dim_coords.push((coord, dim));
        self.dim_coords.sort_by_key(|(_, dim)| *dim);
        Ok(())
    }

    /// Attach an auxiliary coordinate spanning `dims`; an empty `dims`
    /// attaches a scalar coordinate.
    pub fn add_aux_coord(&mut self, coord: Coord, dims: &[usize]) -> Result<(), CubeError> {
        self.ensure_unique_name(&coord)?;

        for (i, dim) in dims.iter().enumerate() {
            if *dim >= self.ndim() {
                return Err(CubeError {
                    message: format!(
                        "dimension {} is out of range for a cube with {} dimensions",
                        dim,
                        self.ndim()
                    ),
                });
            }
            if dims[..i].contains(dim) {
                return Err(CubeError {
                    message: format!("dimension {} is listed twice", dim),
                });
            }
        }

        let expected = dims.iter().map(|dim| self.shape()[*dim]).product::<usize>();
        if coord.len() != expected {
            return Err(CubeError {
                message: format!(
                    "coordinate '{}' has {} points but dimensions {:?} need {}",
                    coord.name(),
                    coord.len(),
                    dims,
                    expected
                ),
            });
        }

        self.aux_coords.push((coord, dims.to_vec()));
        Ok(())
    }

    pub fn coord(&self, name: &str) -> Result<&Coord, CubeError> {
        self.coords()
            .into_iter()
            .find(|coord| coord.name() == name)
            .ok_or_else(|| CubeError {
                message: format!("coordinate '{}' not found", name),
            })
    }

    /// Dimension coordinates in dimension order, then auxiliary coordinates
    /// in the order they were added.
    pub fn coords(&self) -> Vec<&Coord> {
        self.dim_coords
            .iter()
            .map(|(coord, _)| coord)
            .chain(self.aux_coords.iter().map(|(coord, _)| coord))
            .collect()
    }

    pub fn coord_dims(&self, name: &str) -> Result<Vec<usize>, CubeError> {
        if let Some((_, dim)) = self.dim_coords.iter().find(|(coord, _)| coord.name() == name) {
            return Ok(vec![*dim]);
        }

        self.aux_coords
            .iter()
            .find(|(coord, _)| coord.name() == name)
            .map(|(_, dims)| dims.clone())
            .ok_or_else(|| CubeError {
                message: format!("coordinate '{}' not found", name),
            })
    }

    pub fn remove_coord(&mut self, name: &str) -> Result<Coord, CubeError> {
        if let Some(i) = self.dim_coords.iter().position(|(coord, _)| coord.name() == name) {
            return Ok(self.dim_coords.remove(i).0);
        }
        if let Some(i) = self.aux_coords.iter().position(|(coord, _)| coord.name() == name) {
            return Ok(self.aux_coords.remove(i).0);
        }

        Err(CubeError {
            message: format!("coordinate '{}' not found", name),
        })
    }

    /// Copy of this cube carrying `data`, which must have the same shape.
    pub fn with_data(&self, data: ArrayD<f64>) -> Result<Cube, CubeError> {
        if data.shape() != self.shape() {
            return Err(CubeError {
                message: format!(
                    "data shape {:?} does not match cube shape {:?}",
                    data.shape(),
                    self.shape()
                ),
            });
        }

        Ok(Cube {
            data,
            long_name: self.long_name.clone(),
            units: self.units.clone(),
            dim_coords: self.dim_coords.clone(),
            aux_coords: self.aux_coords.clone(),
        })
    }

    /// Copy of this cube carrying `data`, whose trailing dimensions match
    /// this cube's shape. Every coordinate moves up one dimension.
    pub fn with_leading_dim(&self, data: ArrayD<f64>) -> Result<Cube, CubeError> {
        if data.ndim() != self.ndim() + 1 || &data.shape()[1..] != self.shape() {
            return Err(CubeError {
                message: format!(
                    "data shape {:?} is not a leading extension of cube shape {:?}",
                    data.shape(),
                    self.shape()
                ),
            });
        }

        Ok(Cube {
            data,
            long_name: self.long_name.clone(),
            units: self.units.clone(),
            dim_coords: self
                .dim_coords
                .iter()
                .map(|(coord, dim)| (coord.clone(), dim + 1))
                .collect(),
            aux_coords: self
                .aux_coords
                .iter()
                .map(|(coord, dims)| (coord.clone(), dims.iter().map(|dim| dim + 1).collect()))
                .collect(),
        })
    }

    /// Split off dimension `axis`: returns a cube of the remaining shape
    /// (zero filled) with every coordinate that spans `axis` removed, plus
    /// the removed coordinates.
    pub fn without_dim(&self, axis: usize) -> Result<(Cube, Vec<Coord>), CubeError> {
        if axis >= self.ndim() {
            return Err(CubeError {
                message: format!(
                    "dimension {} is out of range for a cube with {} dimensions",
                    axis,
                    self.ndim()
                ),
            });
        }

        let shift = |dim: usize| if dim > axis { dim - 1 } else { dim };
        let mut shape = self.shape().to_vec();
        let mut removed = Vec::new();
        let mut dim_coords = Vec::new();
        let mut aux_coords = Vec::new();

        shape.remove(axis);

        for (coord, dim) in &self.dim_coords {
            if *dim == axis {
                removed.push(coord.clone());
            } else {
                dim_coords.push((coord.clone(), shift(*dim)));
            }
        }

        for (coord, dims) in &self.aux_coords {
            if dims.contains(&axis) {
                removed.push(coord.clone());
            } else {
                aux_coords.push((coord.clone(), dims.iter().map(|dim| shift(*dim)).collect()));
            }
        }

        Ok((
            Cube {
                data: ArrayD::zeros(IxDyn(&shape)),
                long_name: self.long_name.clone(),
                units: self.units.clone(),
                dim_coords,
                aux_coords,
            },
            removed,
        ))
    }

    /// Reduce this cube over the dimension described by `name` with the
    /// weighted percentile aggregator.
    pub fn collapsed(
        &self,
        name: &str,
        aggregator: &WeightedPercentileAggregator,
        kwargs: &Kwargs,
    ) -> Result<Collapsed, AggregateError> {
        let axis = match self.coord_dims(name)?.as_slice() {
            [axis] => *axis,
            dims => {
                return Err(CubeError {
                    message: format!(
                        "coordinate '{}' spans dimensions {:?}, expected exactly one",
                        name, dims
                    ),
                }
                .into())
            }
        };

        let (template, mut removed) = self.without_dim(axis)?;

        // @NOTE: the requested coordinate names the derived coordinate
        if let Some(i) = removed.iter().position(|coord| coord.name() == name) {
            let coord = removed.remove(i);
            removed.insert(0, coord);
        }

        debug!(
            "collapsing '{}' (dimension {}) of cube with shape {:?}",
            name,
            axis,
            self.shape()
        );

        let result = aggregator.aggregate(&MaskedArray::from(self.data.clone()), axis, kwargs)?;
        aggregator.post_process(&template, result, &removed, kwargs)
    }

    pub(crate) fn promote_scalar_coord(&mut self, name: &str, dim: usize) -> Result<(), CubeError> {
        let length = self.shape().get(dim).copied().ok_or_else(|| CubeError {
            message: format!(
                "dimension {} is out of range for a cube with {} dimensions",
                dim,
                self.ndim()
            ),
        })?;

        let (coord, dims) = self
            .aux_coords
            .iter_mut()
            .find(|(coord, _)| coord.name() == name)
            .ok_or_else(|| CubeError {
                message: format!("scalar coordinate '{}' not found", name),
            })?;

        if !dims.is_empty() || coord.len() != length {
            return Err(CubeError {
                message: format!("coordinate '{}' cannot be promoted to dimension {}", name, dim),
            });
        }

        *dims = vec![dim];
        Ok(())
    }

    fn ensure_unique_name(&self, coord: &Coord) -> Result<(), CubeError> {
        if self.coord(coord.name()).is_ok() {
            return Err(CubeError {
                message: format!("coordinate '{}' already exists", coord.name()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn cube_2d() -> Cube {
        let data = Array::range(0.0, 10.0, 1.0)
            .into_shape_with_order((2, 5))
            .unwrap()
            .into_dyn();
        let mut cube = Cube::new(data);
        cube.add_dim_coord(Coord::dim(vec![0.0, 1.0], "time").unwrap(), 0)
            .unwrap();
        cube.add_dim_coord(Coord::dim(vec![0.0, 1.0, 2.0, 3.0, 4.0], "height").unwrap(), 1)
            .unwrap();
        cube
    }

    #[test]
    fn test_add_coords_checks_lengths() {
        let mut cube = cube_2d();

        assert!(cube
            .add_aux_coord(Coord::aux(vec![1.0, 2.0], "wrong").unwrap(), &[1])
            .is_err());
        assert!(cube
            .add_aux_coord(Coord::aux(vec![1.0; 10], "grid").unwrap(), &[0, 1])
            .is_ok());
        assert!(cube
            .add_aux_coord(Coord::aux(vec![1.0; 4], "twice").unwrap(), &[0, 0])
            .is_err());
        assert!(cube.add_aux_coord(Coord::scalar(3.0, "wibble"), &[]).is_ok());
        assert!(cube.add_aux_coord(Coord::scalar(4.0, "wibble"), &[]).is_err());
        assert!(cube
            .add_dim_coord(Coord::dim(vec![5.0, 6.0], "other").unwrap(), 0)
            .is_err());

        let names = cube.coords().iter().map(|c| c.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["time", "height", "grid", "wibble"]);
    }

    #[test]
    fn test_coord_lookup_and_removal() {
        let mut cube = cube_2d();

        assert_eq!(cube.coord_dims("height").unwrap(), vec![1]);
        assert!(cube.coord("pressure").is_err());

        let removed = cube.remove_coord("time").unwrap();
        assert_eq!(removed.name(), "time");
        assert!(cube.coord("time").is_err());
        assert!(cube.remove_coord("time").is_err());
    }

    #[test]
    fn test_without_dim_shifts_coords() {
        let mut cube = cube_2d();
        cube.add_aux_coord(Coord::aux(vec![9.0, 8.0, 7.0, 6.0, 5.0], "level").unwrap(), &[1])
            .unwrap();

        let (template, removed) = cube.without_dim(0).unwrap();

        assert_eq!(template.shape(), &[5]);
        assert_eq!(template.coord_dims("height").unwrap(), vec![0]);
        assert_eq!(template.coord_dims("level").unwrap(), vec![0]);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name(), "time");
    }

    #[test]
    fn test_with_data_keeps_buffer() {
        let cube = cube_2d();
        let data = ArrayD::<f64>::ones(IxDyn(&[2, 5]));
        let ptr = data.as_ptr();

        let replaced = cube.with_data(data).unwrap();
        assert_eq!(replaced.data().as_ptr(), ptr);
        assert_eq!(replaced.coords(), cube.coords());
        assert!(cube.with_data(ArrayD::zeros(IxDyn(&[5, 2]))).is_err());
    }
}
