/*!
This library implements the small dense linear algebra toolbox used by the
probabilistic regression models of `probreg`:

* Gauss-Jordan [matrix inversion](crate::inverse) with partial pivoting,
* [Cholesky factorization](crate::cholesky) with a clamped diagonal,
* triangular solves built upon [linfa-linalg](https://github.com/rust-ml/linfa-linalg),
* [multivariate normal sampling](crate::sample_multivariate_normal) driven by an explicit random generator,
* the closed-form [bivariate normal density](crate::gaussian_2d_pdf) used for parameter space contours.

Matrices are `ndarray` arrays, dense product and transposition are the `ndarray`
ones (`dot()` and `t()`).

Numerical degeneracy never panics: [inverse] falls back to the identity matrix and
[cholesky] clamps the diagonal terms. When the caller wants to know about it,
the `try_` variants ([try_inverse], [try_cholesky]) report the condition as a [LinalgError].

Example:
```
use probreg_linalg::{cholesky, sample_multivariate_normal, Lcg};
use ndarray::{array, Array1};
use ndarray_rand::rand::SeedableRng;

let cov = array![[2.0, 0.5], [0.5, 1.0]];
let l = cholesky(&cov);
assert!((l.dot(&l.t()) - &cov).iter().all(|v: &f64| v.abs() < 1e-10));

// Same seed, same draws
let mean = Array1::zeros(2);
let a = sample_multivariate_normal(&mean, &cov, 3, &mut Lcg::seed_from_u64(42));
let b = sample_multivariate_normal(&mean, &cov, 3, &mut Lcg::seed_from_u64(42));
assert_eq!(a, b);
```
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod density;
mod errors;
mod matrix;
mod prediction;
mod sampling;

pub use density::*;
pub use errors::*;
pub use matrix::*;
pub use prediction::*;
pub use sampling::*;
