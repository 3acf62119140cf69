use thiserror::Error;

/// A result type for linear algebra primitives
pub type Result<T> = std::result::Result<T, LinalgError>;

/// An error raised by the checked (`try_`) linear algebra primitives
#[derive(Error, Debug)]
pub enum LinalgError {
    /// When Gauss-Jordan elimination meets a pivot below tolerance
    #[error("Singular matrix: pivot {pivot} at row {row} is below tolerance")]
    Singular {
        /// Row of the eliminated column
        row: usize,
        /// Absolute value of the best available pivot
        pivot: f64,
    },
    /// When Cholesky decomposition meets a diagonal term below tolerance
    #[error("Matrix not positive definite: diagonal term {value} at row {row}")]
    NotPositiveDefinite {
        /// Row of the failing diagonal term
        row: usize,
        /// Value of the diagonal term before square root
        value: f64,
    },
    /// When operands do not have compatible shapes
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    /// When triangular solve fails
    #[error(transparent)]
    TriangularError(#[from] linfa_linalg::LinalgError),
}
