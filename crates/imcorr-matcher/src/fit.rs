//! Sub-pixel peak refinement by a weighted quadratic surface fit.
//!
//! The 5x5 neighbourhood is fitted with
//! `z = c0 + c1 x + c2 y + c3 x^2 + c4 x y + c5 y^2` where `x` runs along
//! columns and `y` along rows, both in `-2..=2`. The vertex of the fitted
//! surface is the sub-pixel offset of the peak.

use crate::{FitMethod, Rejection};
use nalgebra::{Matrix6, Vector6};

/// Residual degrees of freedom: 25 samples, 6 coefficients.
const DEGREES_OF_FREEDOM: f64 = 19.0;
const MIN_DENOM: f64 = 1e-12;
/// Error reported when no surface is fitted.
pub const UNFITTED_ERROR: f64 = 0.5;

/// Offset of the fitted vertex from the integer peak, in cells, with
/// standard errors and the cross term.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubpixelFit {
    pub dx: f64,
    pub dy: f64,
    pub err_x: f64,
    pub err_y: f64,
    pub err_xy: f64,
}

impl SubpixelFit {
    /// Integer peak without refinement.
    pub fn unfitted() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            err_x: UNFITTED_ERROR,
            err_y: UNFITTED_ERROR,
            err_xy: 0.0,
        }
    }
}

#[inline]
fn basis(x: f64, y: f64) -> Vector6<f64> {
    Vector6::new(1.0, x, y, x * x, x * y, y * y)
}

/// Fitted value and weight of a standardized sample.
#[inline]
fn transform(value: f64, method: FitMethod) -> (f64, f64) {
    let v = value.max(1.0);
    match method {
        FitMethod::EllipticParaboloid | FitMethod::None => (v, 1.0),
        FitMethod::EllipticGaussian => (v.ln(), v * v),
        FitMethod::ReciprocalParaboloid => (1.0 / v, v.powi(4)),
    }
}

/// Inverse of the symmetric positive-definite normal matrix.
///
/// `None` when `b` is not positive definite.
pub fn invert_normal_matrix(b: &Matrix6<f64>) -> Option<Matrix6<f64>> {
    b.cholesky().map(|c| c.inverse())
}

/// Fit the standardized `[row][col]` neighbourhood of a correlation peak.
pub fn fit_peak(neighborhood: &[[f64; 5]; 5], method: FitMethod) -> Result<SubpixelFit, Rejection> {
    if method == FitMethod::None {
        return Ok(SubpixelFit::unfitted());
    }

    let mut samples = [(0.0, 0.0, 0.0, 0.0); 25]; // (x, y, z, w)
    let mut b = Matrix6::<f64>::zeros();
    let mut v = Vector6::<f64>::zeros();
    for (r, row) in neighborhood.iter().enumerate() {
        for (c, &value) in row.iter().enumerate() {
            let x = c as f64 - 2.0;
            let y = r as f64 - 2.0;
            let (z, w) = transform(value, method);
            let t = basis(x, y);
            b += w * t * t.transpose();
            v += (w * z) * t;
            samples[r * 5 + c] = (x, y, z, w);
        }
    }

    let b_inv = invert_normal_matrix(&b).ok_or(Rejection::SingularFit)?;
    let coeffs = b_inv * v;
    let (c1, c2, c3, c4, c5) = (coeffs[1], coeffs[2], coeffs[3], coeffs[4], coeffs[5]);

    let denom = 4.0 * c3 * c5 - c4 * c4;
    if !denom.is_finite() || denom.abs() <= MIN_DENOM {
        return Err(Rejection::SingularFit);
    }
    let ux = (c2 * c4 - 2.0 * c1 * c5) / denom;
    let uy = (c1 * c4 - 2.0 * c2 * c3) / denom;

    let residual: f64 = samples
        .iter()
        .map(|&(x, y, z, w)| {
            let f = coeffs.dot(&basis(x, y));
            w * (f - z) * (f - z)
        })
        .sum();
    let c = residual / DEGREES_OF_FREEDOM;

    let du = Vector6::new(
        0.0,
        -2.0 * c5 / denom,
        c4 / denom,
        -4.0 * c5 * ux / denom,
        (c2 + 2.0 * c4 * ux) / denom,
        (-2.0 * c1 - 4.0 * c3 * ux) / denom,
    );
    let dv = Vector6::new(
        0.0,
        c4 / denom,
        -2.0 * c3 / denom,
        (-2.0 * c2 - 4.0 * c5 * uy) / denom,
        (c1 + 2.0 * c4 * uy) / denom,
        -4.0 * c3 * uy / denom,
    );

    let fit = SubpixelFit {
        dx: ux,
        dy: uy,
        err_x: (c * du.dot(&(b_inv * du))).abs().sqrt(),
        err_y: (c * dv.dot(&(b_inv * dv))).abs().sqrt(),
        err_xy: c * du.dot(&(b_inv * dv)),
    };

    let values = [fit.dx, fit.dy, fit.err_x, fit.err_y, fit.err_xy];
    if values.iter().all(|v| v.is_finite()) {
        Ok(fit)
    } else {
        Err(Rejection::SingularFit)
    }
}
