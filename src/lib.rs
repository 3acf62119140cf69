//! `probreg` provides probabilistic regression of a scalar function of one scalar input,
//! meant to drive interactive visualizations of bayesian inference:
//!
//! * [blr]: conjugate bayesian linear regression over intercept and slope,
//! * [gp]: gaussian process regression with pluggable covariance kernels,
//! * [linalg]: the dense linear algebra, sampling and density primitives both models rely on.
//!
//! Both models follow the same lifecycle: they start in a prior only state, `fit` caches
//! the posterior which is then read by `predict`, `credible_band` and sampling methods.
//! Every change of data or hyperparameters recomputes the posterior from scratch.
//! Sampling methods take an explicit random generator, the same seed gives the same draws.
//!
//! # Example
//!
//! ```
//! use probreg::blr::BayesianLinearRegression;
//! use probreg::gp::{GaussianProcess, RbfKernel};
//! use probreg::linalg::{CredibleLevel, Lcg};
//! use ndarray::{array, Array};
//! use ndarray_rand::rand::SeedableRng;
//!
//! let x = array![-2., -1., 0., 1., 2.];
//! let y = array![-1.8, -0.9, 0.1, 1.2, 1.9];
//! let xplot = Array::linspace(-3., 3., 25);
//!
//! let mut blr = BayesianLinearRegression::<f64>::default();
//! blr.fit(&x, &y).expect("BLR fitted");
//! let lines = blr.sample_posterior_lines(&xplot, 3, &mut Lcg::seed_from_u64(7));
//!
//! let mut gp = GaussianProcess::params(RbfKernel::new(1.0, 1.0))
//!     .build()
//!     .expect("GP params");
//! gp.fit(&x, &y).expect("GP fitted");
//! let band = gp.credible_band(&xplot, CredibleLevel::P95).expect("GP band");
//!
//! assert_eq!(lines.dim(), (3, 25));
//! assert_eq!(band.mean.len(), 25);
//! ```
#![warn(missing_docs)]

pub use probreg_blr as blr;
pub use probreg_gp as gp;
pub use probreg_linalg as linalg;
