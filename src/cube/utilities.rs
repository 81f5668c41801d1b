use ndarray::Axis;

use super::{Cube, CubeError};

/// Insert a new length-1 leading dimension into a copy of `cube`. When
/// `scalar_coord` names a scalar coordinate it is promoted onto the new
/// dimension.
pub fn new_axis(cube: &Cube, scalar_coord: Option<&str>) -> Result<Cube, CubeError> {
    let data = cube.data().clone().insert_axis(Axis(0));
    let mut expanded = cube.with_leading_dim(data)?;

    if let Some(name) = scalar_coord {
        expanded.promote_scalar_coord(name, 0)?;
    }

    Ok(expanded)
}
