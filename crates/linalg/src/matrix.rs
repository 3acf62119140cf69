use crate::errors::{LinalgError, Result};
use linfa::Float;
use linfa_linalg::triangular::{SolveTriangular, UPLO};
use log::debug;
use ndarray::{s, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};

/// Pivot absolute value under which a matrix is considered singular
pub const PIVOT_TOLERANCE: f64 = 1e-12;
/// Lower bound of `A[i][i] - sum` before square root in Cholesky decomposition
pub const CHOLESKY_MIN_DIAG: f64 = 1e-10;

fn to_f64<F: Float>(v: F) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

/// Inverse of the square matrix `a` computed with Gauss-Jordan elimination and partial pivoting.
///
/// Returns [LinalgError::Singular] when a pivot absolute value is below [PIVOT_TOLERANCE].
pub fn try_inverse<F: Float>(a: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
    if !a.is_square() {
        return Err(LinalgError::ShapeMismatch(format!(
            "cannot inverse a ({}, {}) matrix",
            a.nrows(),
            a.ncols()
        )));
    }
    let n = a.nrows();
    let tol = F::cast(PIVOT_TOLERANCE);
    let mut m = a.to_owned();
    let mut inv = Array2::<F>::eye(n);

    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot = m[[col, col]].abs();
        for row in (col + 1)..n {
            let v = m[[row, col]].abs();
            if v > pivot {
                pivot = v;
                pivot_row = row;
            }
        }
        // nan pivots are singular as well
        if !(pivot >= tol) {
            return Err(LinalgError::Singular {
                row: col,
                pivot: to_f64(pivot),
            });
        }
        if pivot_row != col {
            for j in 0..n {
                m.swap([col, j], [pivot_row, j]);
                inv.swap([col, j], [pivot_row, j]);
            }
        }

        let p = m[[col, col]];
        m.row_mut(col).mapv_inplace(|v| v / p);
        inv.row_mut(col).mapv_inplace(|v| v / p);

        let m_col = m.row(col).to_owned();
        let inv_col = inv.row(col).to_owned();
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = m[[row, col]];
            if factor != F::zero() {
                m.row_mut(row).scaled_add(-factor, &m_col);
                inv.row_mut(row).scaled_add(-factor, &inv_col);
            }
        }
    }
    Ok(inv)
}

/// Inverse of the square matrix `a`.
///
/// When `a` is singular (see [try_inverse]) the identity matrix is returned.
pub fn inverse<F: Float>(a: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
    debug_assert!(a.is_square(), "inverse expects a square matrix");
    try_inverse(a).unwrap_or_else(|err| {
        debug!("Inversion falls back to identity: {err}");
        Array2::eye(a.nrows())
    })
}

/// Cholesky factor computation, clamped terms are counted
/// unless `strict` where the first one is reported as an error.
fn cholesky_impl<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix2>,
    strict: bool,
) -> Result<(Array2<F>, usize)> {
    if !a.is_square() {
        return Err(LinalgError::ShapeMismatch(format!(
            "cannot factorize a ({}, {}) matrix",
            a.nrows(),
            a.ncols()
        )));
    }
    let n = a.nrows();
    let min_diag = F::cast(CHOLESKY_MIN_DIAG);
    let mut l = Array2::<F>::zeros((n, n));
    let mut n_clamped = 0;

    for i in 0..n {
        for j in 0..=i {
            let sum = l.slice(s![i, ..j]).dot(&l.slice(s![j, ..j]));
            if i == j {
                let mut d = a[[i, i]] - sum;
                if !(d >= min_diag) {
                    if strict {
                        return Err(LinalgError::NotPositiveDefinite {
                            row: i,
                            value: to_f64(d),
                        });
                    }
                    n_clamped += 1;
                    d = min_diag;
                }
                l[[i, i]] = d.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }
    Ok((l, n_clamped))
}

/// Lower triangular `L` such that `L.Lt = a` for a symmetric positive definite matrix `a`.
///
/// Returns [LinalgError::NotPositiveDefinite] instead of clamping (see [cholesky]).
pub fn try_cholesky<F: Float>(a: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
    cholesky_impl(a, true).map(|(l, _)| l)
}

/// Lower triangular `L` such that `L.Lt ~ a`.
///
/// Each diagonal term `a[i][i] - sum` is clamped to [CHOLESKY_MIN_DIAG] before
/// square root so that a non positive definite matrix still gets a finite factor.
pub fn cholesky<F: Float>(a: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
    debug_assert!(a.is_square(), "cholesky expects a square matrix");
    match cholesky_impl(a, false) {
        Ok((l, 0)) => l,
        Ok((l, n_clamped)) => {
            debug!(
                "Cholesky clamped {n_clamped} diagonal term(s) out of {}",
                a.nrows()
            );
            l
        }
        Err(err) => {
            debug!("Cholesky falls back to identity: {err}");
            Array2::eye(a.nrows())
        }
    }
}

/// Cholesky factor of `a + jitter.I`
pub fn cholesky_jittered<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix2>,
    jitter: F,
) -> Array2<F> {
    let mut a = a.to_owned();
    a.diag_mut().mapv_inplace(|v| v + jitter);
    cholesky(&a)
}

/// Solve `L.X = B` where `l` is lower triangular (forward substitution)
pub fn solve_lower_matrix<F: Float>(l: &Array2<F>, b: &Array2<F>) -> Result<Array2<F>> {
    Ok(l.solve_triangular(b, UPLO::Lower)?)
}

/// Solve `L.x = b` where `l` is lower triangular (forward substitution)
pub fn solve_lower<F: Float>(
    l: &Array2<F>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Result<Array1<F>> {
    let b = b.to_owned().insert_axis(Axis(1));
    Ok(solve_lower_matrix(l, &b)?.remove_axis(Axis(1)))
}

/// Solve `Lt.x = b` where `l` is lower triangular (back substitution)
pub fn solve_lower_transposed<F: Float>(
    l: &Array2<F>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> Result<Array1<F>> {
    let b = b.to_owned().insert_axis(Axis(1));
    let x = l.t().solve_triangular(&b, UPLO::Upper)?;
    Ok(x.remove_axis(Axis(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;

    fn random_spd(n: usize, seed: u64) -> Array2<f64> {
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        let b = Array::random_using((n, n), Uniform::new(-1., 1.), &mut rng);
        b.dot(&b.t()) + Array2::<f64>::eye(n) * n as f64
    }

    #[test]
    fn test_inverse() {
        let a = array![[4., 7., 2.], [3., 6., 1.], [2., 5., 3.]];
        let inv = inverse(&a);
        assert_abs_diff_eq!(a.dot(&inv), Array2::eye(3), epsilon = 1e-9);
        assert_abs_diff_eq!(inv.dot(&a), Array2::eye(3), epsilon = 1e-9);
    }

    #[test]
    fn test_inverse_needs_pivoting() {
        // zero on the first diagonal term
        let a = array![[0., 1.], [1., 0.]];
        let inv = try_inverse(&a).expect("invertible");
        assert_abs_diff_eq!(inv, array![[0., 1.], [1., 0.]], epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_random() {
        for seed in 0..5 {
            let a = random_spd(6, seed) - Array2::<f64>::eye(6) * 3.;
            let inv = inverse(&a);
            assert_abs_diff_eq!(a.dot(&inv), Array2::eye(6), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_singular_inverse_fallback() {
        let a = array![[1., 2.], [2., 4.]];
        assert!(matches!(
            try_inverse(&a),
            Err(LinalgError::Singular { row: 1, .. })
        ));
        assert_eq!(inverse(&a), Array2::<f64>::eye(2));
    }

    #[test]
    fn test_cholesky() {
        let a = array![[4., 12., -16.], [12., 37., -43.], [-16., -43., 98.]];
        let l = cholesky(&a);
        let expected = array![[2., 0., 0.], [6., 1., 0.], [-8., 5., 3.]];
        assert_abs_diff_eq!(l, expected, epsilon = 1e-12);
        assert_abs_diff_eq!(try_cholesky(&a).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_cholesky_reconstruction() {
        for (n, seed) in [(2, 1), (5, 2), (20, 3)] {
            let c = random_spd(n, seed);
            let l = cholesky(&c);
            let err = (l.dot(&l.t()) - &c)
                .iter()
                .fold(0., |acc: f64, v| acc.max(v.abs()));
            assert!(err < 1e-6, "reconstruction error {err}");
            // lower triangular
            for i in 0..n {
                for j in (i + 1)..n {
                    assert_eq!(l[[i, j]], 0.);
                }
            }
        }
    }

    #[test]
    fn test_cholesky_clamped() {
        let a = array![[1., 2.], [2., 1.]];
        assert!(matches!(
            try_cholesky(&a),
            Err(LinalgError::NotPositiveDefinite { row: 1, .. })
        ));
        let l = cholesky(&a);
        assert!(l.iter().all(|v: &f64| v.is_finite()));
        assert_abs_diff_eq!(l[[1, 1]], CHOLESKY_MIN_DIAG.sqrt(), epsilon = 1e-15);
    }

    #[test]
    fn test_cholesky_jittered() {
        let a = Array2::<f64>::zeros((3, 3));
        let l = cholesky_jittered(&a, 1e-2);
        assert_abs_diff_eq!(l, Array2::eye(3) * 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_triangular_solves() {
        let c = random_spd(4, 7);
        let l = cholesky(&c);
        let b = array![1., -2., 0.5, 3.];
        let y = solve_lower(&l, &b).unwrap();
        assert_abs_diff_eq!(l.dot(&y), b, epsilon = 1e-9);
        let x = solve_lower_transposed(&l, &y).unwrap();
        assert_abs_diff_eq!(l.t().dot(&x), y, epsilon = 1e-9);
        // both solves together give c^-1.b
        assert_abs_diff_eq!(c.dot(&x), b, epsilon = 1e-9);
    }
}
