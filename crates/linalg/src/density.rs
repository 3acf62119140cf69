use linfa::Float;
use ndarray::{ArrayBase, Data, Ix1, Ix2};

/// Bivariate normal density at `(x, y)` given a 2-dim `mean` and a (2, 2) covariance `cov`.
///
/// Uses the analytic determinant and inverse of the 2x2 covariance.
/// A covariance with a non positive determinant has a zero density everywhere.
pub fn gaussian_2d_pdf<F: Float>(
    x: F,
    y: F,
    mean: &ArrayBase<impl Data<Elem = F>, Ix1>,
    cov: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> F {
    debug_assert!(mean.len() == 2 && cov.dim() == (2, 2), "bivariate density expected");
    let (a, b, c, d) = (cov[[0, 0]], cov[[0, 1]], cov[[1, 0]], cov[[1, 1]]);
    let det = a * d - b * c;
    if !(det > F::zero()) {
        return F::zero();
    }
    let dx = x - mean[0];
    let dy = y - mean[1];
    // inverse is [[d, -b], [-c, a]] / det
    let q = (d * dx * dx - (b + c) * dx * dy + a * dy * dy) / det;
    let two_pi = F::cast(2. * std::f64::consts::PI);
    (F::cast(-0.5) * q).exp() / (two_pi * det.sqrt())
}
