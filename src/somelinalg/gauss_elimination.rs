//! Gaussian elimination with partial pivoting, back and forward substitution.
//!
//! # Example
//! ```rust
//! use RustedLinSys::somelinalg::gauss_elimination::{solve_direct, DEFAULT_PIVOT_TOL};
//! use nalgebra::{DMatrix, DVector};
//!
//! let A = DMatrix::from_row_slice(3, 3, &[0.0001, 1.0, 3.0, 2.0, 2.0, -3.0, -5.0, 0.0, 1.0]);
//! let b = DVector::from_vec(vec![1.0, 3.0, 5.0]);
//! let solution = solve_direct(&A, &b, DEFAULT_PIVOT_TOL).unwrap();
//! // the largest entry of the first column became the first pivot
//! assert_eq!(solution.U[(0, 0)], -5.0);
//! let r = &A * &solution.x - &b;
//! assert!(r.amax() < 1e-12);
//! ```
use crate::somelinalg::linear_sys_error::LinSysError;
use crate::somelinalg::linear_system::{check_square, check_system};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};

/// default near-zero threshold for pivots
pub const DEFAULT_PIVOT_TOL: f64 = 1e-12;

/// Result of a direct solve: solution x, upper triangular factor U and the right-hand side c
/// after the same row operations, so that U*x = c
#[derive(Debug, Clone, PartialEq)]
pub struct DirectSolution {
    pub x: DVector<f64>,
    pub U: DMatrix<f64>,
    pub c: DVector<f64>,
    /// number of row interchanges performed
    pub swaps: usize,
}

impl DirectSolution {
    /// det(A) from the pivots of U and the parity of row swaps
    pub fn determinant(&self) -> f64 {
        let det_U: f64 = self.U.diagonal().iter().product();
        if self.swaps % 2 == 0 { det_U } else { -det_U }
    }
}

/// Row at or below `col` holding the largest |U[row][col]|, first occurrence wins
pub(crate) fn pivot_row(U: &DMatrix<f64>, col: usize) -> (usize, f64) {
    let mut p = col;
    let mut max_abs = U[(col, col)].abs();
    for row in col + 1..U.nrows() {
        let candidate = U[(row, col)].abs();
        if candidate > max_abs {
            max_abs = candidate;
            p = row;
        }
    }
    (p, max_abs)
}

/// Forward elimination in place. Returns the number of row swaps.
/// The last diagonal entry is not checked here: that is up to the caller.
pub(crate) fn forward_eliminate<F>(
    U: &mut DMatrix<f64>,
    c: &mut DVector<f64>,
    tol: f64,
    observer: &mut F,
) -> Result<usize, LinSysError>
where
    F: FnMut(usize, &DMatrix<f64>, &DVector<f64>),
{
    let n = U.nrows();
    let mut swaps = 0;
    for i in 0..n.saturating_sub(1) {
        let (p, max_abs) = pivot_row(U, i);
        if !(max_abs >= tol) {
            debug!("no reliable pivot in column {}: |pivot| = {:e}", i, max_abs);
            return Err(LinSysError::SingularMatrix {
                step: i,
                pivot: max_abs,
            });
        }
        if p != i {
            U.swap_rows(i, p);
            c.swap_rows(i, p);
            swaps += 1;
            debug!("step {}: rows {} and {} interchanged", i, i, p);
        }
        let pivot = U[(i, i)];
        for j in i + 1..n {
            let factor = -U[(j, i)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in i + 1..n {
                U[(j, k)] += factor * U[(i, k)];
            }
            U[(j, i)] = 0.0;
            c[j] += factor * c[i];
        }
        observer(i, &*U, &*c);
    }
    Ok(swaps)
}

/// Solves A*x = b by Gaussian elimination with partial pivoting.
/// A and b are not modified. Fails with `DimensionMismatch` for inconsistent shapes and with
/// `SingularMatrix` when no pivot of magnitude >= tol is available.
pub fn solve_direct(
    A: &DMatrix<f64>,
    b: &DVector<f64>,
    tol: f64,
) -> Result<DirectSolution, LinSysError> {
    solve_direct_traced(A, b, tol, |_, _, _| {})
}

/// Same as `solve_direct`, but `observer(step, U, c)` is called after every elimination step.
/// The observer only sees shared references and cannot influence the result.
pub fn solve_direct_traced<F>(
    A: &DMatrix<f64>,
    b: &DVector<f64>,
    tol: f64,
    mut observer: F,
) -> Result<DirectSolution, LinSysError>
where
    F: FnMut(usize, &DMatrix<f64>, &DVector<f64>),
{
    let n = check_system(A, b)?;
    let mut U = A.clone();
    let mut c = b.clone();
    let swaps = forward_eliminate(&mut U, &mut c, tol, &mut observer)?;

    let last_pivot = U[(n - 1, n - 1)];
    if !(last_pivot.abs() >= tol) {
        return Err(LinSysError::SingularMatrix {
            step: n - 1,
            pivot: last_pivot.abs(),
        });
    }
    let x = back_substitute(&U, &c, tol)?;
    info!(
        "direct solve of {}x{} system finished with {} row swaps",
        n, n, swaps
    );
    Ok(DirectSolution { x, U, c, swaps })
}

/// Solves the upper triangular system U*x = c.
/// Only the upper triangle of U is read.
pub fn back_substitute(
    U: &DMatrix<f64>,
    c: &DVector<f64>,
    tol: f64,
) -> Result<DVector<f64>, LinSysError> {
    let n = check_system(U, c)?;
    let mut x = DVector::zeros(n);
    for i in (0..n).rev() {
        let mut s = c[i];
        for j in i + 1..n {
            s -= U[(i, j)] * x[j];
        }
        let diag = U[(i, i)];
        if !(diag.abs() >= tol) {
            return Err(LinSysError::SingularMatrix {
                step: i,
                pivot: diag.abs(),
            });
        }
        x[i] = s / diag;
    }
    Ok(x)
}

/// Solves the lower triangular system L*y = c.
/// Only the lower triangle of L is read.
pub fn forward_substitute(
    L: &DMatrix<f64>,
    c: &DVector<f64>,
    tol: f64,
) -> Result<DVector<f64>, LinSysError> {
    let n = check_system(L, c)?;
    let mut y = DVector::zeros(n);
    for i in 0..n {
        let mut s = c[i];
        for j in 0..i {
            s -= L[(i, j)] * y[j];
        }
        let diag = L[(i, i)];
        if !(diag.abs() >= tol) {
            return Err(LinSysError::SingularMatrix {
                step: i,
                pivot: diag.abs(),
            });
        }
        y[i] = s / diag;
    }
    Ok(y)
}

/// true if every entry below the diagonal is exactly zero
pub fn is_upper_triangular(U: &DMatrix<f64>) -> Result<bool, LinSysError> {
    let n = check_square(U)?;
    Ok((0..n).all(|i| (0..i).all(|j| U[(i, j)] == 0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_relative_eq, relative_eq};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_system(n: usize, seed: u64) -> (DMatrix<f64>, DVector<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let A = DMatrix::from_fn(n, n, |_, _| rng.random_range(-10.0..10.0));
        let b = DVector::from_fn(n, |_, _| rng.random_range(-10.0..10.0));
        (A, b)
    }

    #[test]
    fn test_pivoting_away_from_tiny_entry() {
        let A = DMatrix::from_row_slice(
            3,
            3,
            &[0.0001, 1.0, 3.0, 2.0, 2.0, -3.0, -5.0, 0.0, 1.0],
        );
        let b = DVector::from_vec(vec![1.0, 3.0, 5.0]);
        let res = solve_direct(&A, &b, DEFAULT_PIVOT_TOL).unwrap();
        assert_eq!(res.U[(0, 0)], -5.0);
        assert_eq!(res.swaps, 1);
        assert_relative_eq!(res.U[(1, 1)], 2.0, epsilon = 1e-12);
        assert_relative_eq!(res.U[(2, 2)], 4.30002, epsilon = 1e-12);
        assert_relative_eq!(res.c[2], -1.4999, epsilon = 1e-12);
        let expected = [
            -1.0697624662210874,
            2.0465439695629324,
            -0.34881233110543675,
        ];
        for (xi, ei) in res.x.iter().zip(expected.iter()) {
            assert_relative_eq!(*xi, *ei, epsilon = 1e-12);
        }
        assert_relative_eq!(res.determinant(), 43.0002, epsilon = 1e-10);
        assert!(is_upper_triangular(&res.U).unwrap());
    }

    #[test]
    fn test_inputs_not_mutated() {
        let A = DMatrix::from_row_slice(3, 3, &[2.0, -1.0, -2.0, -4.0, 6.0, 3.0, -4.0, -2.0, 8.0]);
        let b = DVector::from_column_slice(&[1.0, -1.0, 2.0]);
        let A_copy = A.clone();
        let b_copy = b.clone();
        let res = solve_direct(&A, &b, DEFAULT_PIVOT_TOL).unwrap();
        assert_eq!(A, A_copy);
        assert_eq!(b, b_copy);
        // U*x = c holds for the returned artifacts
        let assertion = &res.U * &res.x - &res.c;
        for num in assertion.iter() {
            assert!(relative_eq!(*num, 0.0, epsilon = 1e-12));
        }
        let assertion = &A * &res.x - &b;
        for num in assertion.iter() {
            assert!(relative_eq!(*num, 0.0, epsilon = 1e-12));
        }
    }

    #[test]
    fn test_agrees_with_nalgebra_lu() {
        for seed in 0..10 {
            let (A, b) = random_system(8, seed);
            let res = solve_direct(&A, &b, DEFAULT_PIVOT_TOL).unwrap();
            let x_standard = A.clone().lu().solve(&b).unwrap();
            let assertion = &res.x - x_standard;
            for num in assertion.iter() {
                assert!(relative_eq!(*num, 0.0, epsilon = 1e-8));
            }
        }
    }

    #[test]
    fn test_residual_is_backward_stable() {
        for (n, seed) in [(5, 1), (20, 2), (50, 3)] {
            let (A, b) = random_system(n, seed);
            let res = solve_direct(&A, &b, DEFAULT_PIVOT_TOL).unwrap();
            let r = &A * &res.x - &b;
            let bound = 10.0 * n as f64 * f64::EPSILON * A.norm() * res.x.norm();
            assert!(r.norm() <= bound, "n = {}: |r| = {:e} > {:e}", n, r.norm(), bound);
        }
    }

    #[test]
    fn test_zero_row_is_singular() {
        let A = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 4.0, 5.0, 6.0]);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let err = solve_direct(&A, &b, DEFAULT_PIVOT_TOL).unwrap_err();
        assert!(matches!(err, LinSysError::SingularMatrix { step: 2, .. }));
    }

    #[test]
    fn test_zero_column_is_singular() {
        let A = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 0.0, 2.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        let err = solve_direct(&A, &b, DEFAULT_PIVOT_TOL).unwrap_err();
        assert_eq!(err, LinSysError::SingularMatrix { step: 0, pivot: 0.0 });
        // zero column appearing in the middle of the elimination
        let A = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 1.0, 3.0, 6.0, 2.0]);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let err = solve_direct(&A, &b, DEFAULT_PIVOT_TOL).unwrap_err();
        assert!(matches!(err, LinSysError::SingularMatrix { step: 1, .. }));
    }

    #[test]
    fn test_nearly_singular_depends_on_tolerance() {
        let A = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0 + 1e-9]);
        let b = DVector::from_vec(vec![2.0, 2.0]);
        assert!(solve_direct(&A, &b, 1e-6).is_err());
        let res = solve_direct(&A, &b, 1e-12).unwrap();
        assert_relative_eq!(res.x[0], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_dimension_mismatch() {
        let A = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(matches!(
            solve_direct(&A, &b, DEFAULT_PIVOT_TOL),
            Err(LinSysError::DimensionMismatch { .. })
        ));
        let A = DMatrix::identity(3, 3);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(matches!(
            solve_direct(&A, &b, DEFAULT_PIVOT_TOL),
            Err(LinSysError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_one_by_one() {
        let A = DMatrix::from_element(1, 1, 4.0);
        let b = DVector::from_element(1, 2.0);
        let res = solve_direct(&A, &b, DEFAULT_PIVOT_TOL).unwrap();
        assert_eq!(res.x[0], 0.5);
        let A = DMatrix::from_element(1, 1, 0.0);
        assert!(solve_direct(&A, &b, DEFAULT_PIVOT_TOL).is_err());
    }

    #[test]
    fn test_trace_is_observational() {
        let (A, b) = random_system(6, 7);
        let mut steps = Vec::new();
        let traced = solve_direct_traced(&A, &b, DEFAULT_PIVOT_TOL, |step, U, _c| {
            // column `step` is cleared below the diagonal once the step is done
            for j in step + 1..U.nrows() {
                assert_eq!(U[(j, step)], 0.0);
            }
            steps.push(step);
        })
        .unwrap();
        let plain = solve_direct(&A, &b, DEFAULT_PIVOT_TOL).unwrap();
        assert_eq!(steps, vec![0, 1, 2, 3, 4]);
        assert_eq!(traced, plain);
    }

    #[test]
    fn test_back_substitute() {
        let U = DMatrix::from_row_slice(3, 3, &[2.0, 1.0, -1.0, 0.0, 3.0, 2.0, 0.0, 0.0, 4.0]);
        let c = DVector::from_vec(vec![2.0, 5.0, 4.0]);
        let x = back_substitute(&U, &c, DEFAULT_PIVOT_TOL).unwrap();
        assert_relative_eq!(x[2], 1.0, epsilon = 1e-14);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-14);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-14);

        let U = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 0.0]);
        let c = DVector::from_vec(vec![1.0, 1.0]);
        assert_eq!(
            back_substitute(&U, &c, DEFAULT_PIVOT_TOL),
            Err(LinSysError::SingularMatrix { step: 1, pivot: 0.0 })
        );
    }

    #[test]
    fn test_forward_substitute() {
        let L = DMatrix::from_row_slice(3, 3, &[2.0, 0.0, 0.0, 1.0, 1.0, 0.0, -1.0, 2.0, 4.0]);
        let y_expected = DVector::from_vec(vec![1.0, -2.0, 0.5]);
        let c = &L * &y_expected;
        let y = forward_substitute(&L, &c, DEFAULT_PIVOT_TOL).unwrap();
        for (a, b) in y.iter().zip(y_expected.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-14);
        }
        let L = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 1.0, 1.0]);
        let c = DVector::from_vec(vec![1.0, 1.0]);
        assert!(forward_substitute(&L, &c, DEFAULT_PIVOT_TOL).is_err());
    }

    #[test]
    fn test_pivot_ties_pick_first_row() {
        let U = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, -3.0, 1.0, 0.0, 3.0, 0.0, 1.0]);
        assert_eq!(pivot_row(&U, 0), (1, 3.0));
    }
}
