//! This library implements conjugate [Bayesian linear regression](https://en.wikipedia.org/wiki/Bayesian_linear_regression)
//! of a scalar output with respect to one scalar input.
//!
//! The model has two weights, intercept and slope, with a gaussian prior and a known
//! observation noise variance. The posterior is computed in closed form with 2x2 matrix
//! operations, it gives predictive means and variances, credible bands, weight samples
//! and density grids in (slope, intercept) weight space for contour plots.
//!
//! BLR methods are implemented by [BayesianLinearRegression] parameterized by [BlrParams].
//!
//! ```
//! use probreg_blr::BayesianLinearRegression;
//! use ndarray::{array, Array};
//!
//! let x = array![-1., 0., 1., 2.];
//! let y = array![0.4, 2.1, 3.4, 5.1];
//!
//! let mut blr = BayesianLinearRegression::<f64>::default();
//! blr.fit(&x, &y).expect("BLR fitted");
//! let grid = blr.posterior_contours(&Array::linspace(0., 3., 30), &Array::linspace(0., 4., 40));
//! assert_eq!(grid.density.dim(), (40, 30));
//!
//! let ols = BayesianLinearRegression::ols_estimate(&x, &y);
//! assert!((ols.slope - 1.54).abs() < 1e-9);
//! ```
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
mod errors;
mod parameters;

pub use algorithm::*;
pub use errors::*;
pub use parameters::*;
