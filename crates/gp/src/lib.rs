//! This library implements [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process) regression
//! of a scalar function of one scalar input with pluggable covariance kernels.
//!
//! The model is trained by an exact Cholesky based algorithm which is O(n^3) in processing
//! time and O(n^2) in memory where n is the number of training points. It is meant for
//! small datasets (a few hundreds points) and interactive recomputation: every change of
//! training data or hyperparameters refits from scratch, predictions and samples only
//! read the cached factorization.
//!
//! GP methods are implemented by [GaussianProcess] parameterized by [GpParams].
//!
//! Kernels are implemented in [kernels] module: [RbfKernel], [Matern32Kernel],
//! [PeriodicKernel], [LinearKernel] and [AnyKernel] to select one of them at runtime.
//! Kernel hyperparameters are set by the user, they are not estimated.
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
mod errors;
pub mod kernels;
mod parameters;

pub use algorithm::*;
pub use errors::*;
pub use kernels::{AnyKernel, Kernel, LinearKernel, Matern32Kernel, PeriodicKernel, RbfKernel};
pub use parameters::*;
