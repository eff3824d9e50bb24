use crate::somelinalg::gauss_elimination::forward_eliminate;
use crate::somelinalg::linear_sys_error::LinSysError;
use crate::somelinalg::linear_system::check_square;
use log::warn;
use nalgebra::{DMatrix, DVector, stack};

/// pivots below this magnitude make the determinant zero
pub const DETERMINANT_ZERO_TOL: f64 = 1e-15;

/// Determinant via pivoted elimination: product of the pivots, negated for an odd number of
/// row interchanges. Never fails: a near-zero pivot (or a non-square matrix) gives 0.0.
pub fn determinant(A: &DMatrix<f64>) -> f64 {
    let n = match A.shape() {
        (0, 0) => return 1.0,
        (n, m) if n == m => n,
        _ => return 0.0,
    };
    let mut U = A.clone();
    let mut dummy = DVector::zeros(n);
    let mut no_trace = |_: usize, _: &DMatrix<f64>, _: &DVector<f64>| {};
    let swaps = match forward_eliminate(&mut U, &mut dummy, DETERMINANT_ZERO_TOL, &mut no_trace) {
        Ok(swaps) => swaps,
        Err(_) => return 0.0,
    };
    if !(U[(n - 1, n - 1)].abs() >= DETERMINANT_ZERO_TOL) {
        return 0.0;
    }
    let det: f64 = U.diagonal().iter().product();
    if swaps % 2 == 0 { det } else { -det }
}

/// sqrt of the sum of squares of all entries
pub fn frobenius_norm(A: &DMatrix<f64>) -> f64 {
    A.iter().map(|a| a * a).sum::<f64>().sqrt()
}

/// Outcome of the strict diagonal dominance check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominanceReport {
    pub dominant: bool,
    /// first row where |A[i][i]| <= sum of |A[i][j]|, j != i
    pub offending_row: Option<usize>,
}

/// Strict row diagonal dominance: |A[i][i]| > sum_{j != i} |A[i][j]| for every row.
/// A sufficient (not necessary) condition for Jacobi and Gauss-Seidel convergence.
pub fn is_diagonally_dominant(A: &DMatrix<f64>) -> Result<DominanceReport, LinSysError> {
    let n = check_square(A)?;
    for i in 0..n {
        let diag = A[(i, i)].abs();
        let off_diag: f64 = (0..n).filter(|&j| j != i).map(|j| A[(i, j)].abs()).sum();
        if !(diag > off_diag) {
            return Ok(DominanceReport {
                dominant: false,
                offending_row: Some(i),
            });
        }
    }
    Ok(DominanceReport {
        dominant: true,
        offending_row: None,
    })
}

/// |det A| / ||A||_F, a cheap conditioning heuristic (not a condition number):
/// values near zero flag an ill-conditioned matrix
pub fn conditioning_ratio(A: &DMatrix<f64>) -> f64 {
    let norm = frobenius_norm(A);
    if norm == 0.0 {
        return 0.0;
    }
    determinant(A).abs() / norm
}

/// true if `conditioning_ratio(A)` falls below `threshold`, with a warning in the log.
/// A singular matrix always counts as ill-conditioned.
pub fn is_ill_conditioned(A: &DMatrix<f64>, threshold: f64) -> bool {
    let ratio = conditioning_ratio(A);
    let ill = ratio < threshold;
    if ill {
        warn!(
            "Matrix is ill-conditioned: |det|/||A|| = {:e} < {:e}",
            ratio, threshold
        );
    }
    ill
}

/// Ratio of the largest to the smallest singular value (infinite for a singular matrix)
pub fn condition_number(A: &DMatrix<f64>) -> Result<f64, LinSysError> {
    check_square(A)?;
    let singular_values = A.singular_values();
    let max_sigma = singular_values.iter().cloned().fold(0.0, f64::max);
    let min_sigma = singular_values.iter().cloned().fold(f64::INFINITY, f64::min);
    if min_sigma == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(max_sigma / min_sigma)
}

/// Compares the SVD condition number with `threshold`. A system with condition number
/// kappa loses roughly log10(kappa) significant digits in the solution, so for f64 data
/// thresholds around 1e5..1e10 are typical. Non-square matrices are rejected.
pub fn poorly_conditioned(A: &DMatrix<f64>, threshold: f64) -> Result<bool, LinSysError> {
    let condition_number = condition_number(A)?;
    let poorly_conditioned = condition_number > threshold;
    if poorly_conditioned {
        warn!(
            "The system of linear equations is poorly conditioned. Condition number = {:.2}",
            condition_number
        );
    }
    Ok(poorly_conditioned)
}

/// Rouché–Capelli theorem: A*x = b has a solution iff rank(A) == rank([A b]).
/// Ranks are taken relative to the size of A.
pub fn Rouche_Capelli_theorem(A: &DMatrix<f64>, b: &DVector<f64>) -> Result<bool, LinSysError> {
    let n = check_square(A)?;
    if b.len() != n {
        return Err(LinSysError::DimensionMismatch {
            what: "right-hand side length",
            expected: n,
            found: b.len(),
        });
    }
    let Ab: DMatrix<f64> = stack![A, b];
    let eps = 1e-10 * frobenius_norm(&Ab).max(1.0);
    let rank_A = A.rank(eps);
    let rank_Ab = Ab.rank(eps);
    let result = rank_A == rank_Ab;
    if !result {
        warn!(
            "The system has no solution. rank(A) = {} != rank([A b]) = {}",
            rank_A, rank_Ab
        );
    }
    Ok(result)
}
