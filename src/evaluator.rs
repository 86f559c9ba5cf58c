//! Generic cubic polynomial evaluator.
//!
//! Every curve family in this crate is defined by a 4x4 characteristic
//! matrix; a point on (or derivative of) a segment is the product
//!
//! ```text
//! basis(t, order) * M * P
//! ```
//!
//! where `basis` is the monomial row `[1, t, t^2, t^3]` differentiated
//! `order` times, `M` the characteristic matrix and `P` the 4x3 matrix
//! whose rows are the control points. This is the single routine shared
//! by all families; a family contributes only its matrix and (possibly)
//! a pre-transform of its native control points.

use glam::{Mat4, Vec3, Vec4};

use crate::errors::{Result, SplineError};

/// Monomial basis row of a cubic, differentiated `order` times.
///
/// order 0: `[1, t, t^2, t^3]`
/// order 1: `[0, 1, 2t, 3t^2]`
/// order 2: `[0, 0, 2, 6t]`
/// order 3: `[0, 0, 0, 6]`
///
/// Any higher order is an invalid argument; a cubic basis has no
/// non-zero derivative beyond the third.
pub fn basis_row(t: f32, order: usize) -> Result<Vec4> {
    match order {
        0 => Ok(Vec4::new(1.0, t, t * t, t * t * t)),
        1 => Ok(Vec4::new(0.0, 1.0, 2.0 * t, 3.0 * t * t)),
        2 => Ok(Vec4::new(0.0, 0.0, 2.0, 6.0 * t)),
        3 => Ok(Vec4::new(0.0, 0.0, 0.0, 6.0)),
        n => Err(SplineError::DerivativeOrder(n)),
    }
}

/// Blend weights for the four control points of a window: `basis * M`.
///
/// The characteristic matrices in this crate are stored with
/// [`glam::Mat4::from_cols_array_2d`] over their *row* arrays, i.e. the
/// `Mat4` holds the transpose, so the row-vector product collapses to a
/// plain matrix * vector multiply.
pub fn weights(t: f32, order: usize, matrix: &Mat4) -> Result<Vec4> {
    Ok(*matrix * basis_row(t, order)?)
}

/// Evaluate a point (order 0) or derivative (order 1..=3) of the cubic
/// defined by `matrix` over the four control points.
pub fn evaluate(t: f32, order: usize, matrix: &Mat4, points: [Vec3; 4]) -> Result<Vec3> {
    let w = weights(t, order, matrix)?;
    Ok(points[0] * w.x + points[1] * w.y + points[2] * w.z + points[3] * w.w)
}

/// Same blend applied to four scalars, used for the per-point
/// normal-angle offsets that ride along with the position windows.
pub fn evaluate_scalar(t: f32, order: usize, matrix: &Mat4, values: [f32; 4]) -> Result<f32> {
    let w = weights(t, order, matrix)?;
    Ok(values[0] * w.x + values[1] * w.y + values[2] * w.z + values[3] * w.w)
}
