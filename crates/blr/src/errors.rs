use thiserror::Error;

/// A result type for bayesian linear regression algorithm
pub type Result<T> = std::result::Result<T, BlrError>;

/// An error when using [`BayesianLinearRegression`](crate::BayesianLinearRegression) algorithm
#[derive(Error, Debug)]
pub enum BlrError {
    /// When linear algebra computation fails
    #[error(transparent)]
    LinalgError(#[from] probreg_linalg::LinalgError),
    /// When a linfa error occurs
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
    /// When error due to a bad value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
}
