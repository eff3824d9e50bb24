//! Shared representation of a square linear system A*x = b.
//! Matrices are nalgebra `DMatrix<f64>`, vectors are `DVector<f64>`. Solvers borrow their
//! inputs and work on private clones, so the caller's data is never mutated.
use crate::somelinalg::linear_sys_error::LinSysError;
use nalgebra::{DMatrix, DVector};

/// Checks that A is a non-empty square matrix and returns its dimension
pub fn check_square(A: &DMatrix<f64>) -> Result<usize, LinSysError> {
    let (n, m) = A.shape();
    if n != m {
        return Err(LinSysError::DimensionMismatch {
            what: "matrix columns",
            expected: n,
            found: m,
        });
    }
    if n == 0 {
        return Err(LinSysError::DimensionMismatch {
            what: "matrix dimension",
            expected: 1,
            found: 0,
        });
    }
    Ok(n)
}

/// Checks that A is square and b is conformant with it
pub fn check_system(A: &DMatrix<f64>, b: &DVector<f64>) -> Result<usize, LinSysError> {
    let n = check_square(A)?;
    if b.len() != n {
        return Err(LinSysError::DimensionMismatch {
            what: "right-hand side length",
            expected: n,
            found: b.len(),
        });
    }
    Ok(n)
}

/// Builds a square matrix from a list of rows. Ragged or non-square input is rejected.
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<DMatrix<f64>, LinSysError> {
    let n = rows.len();
    for row in rows {
        if row.len() != n {
            return Err(LinSysError::DimensionMismatch {
                what: "row length",
                expected: n,
                found: row.len(),
            });
        }
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    let A = DMatrix::from_row_slice(n, n, &flat);
    check_square(&A)?;
    Ok(A)
}

/// r = A*x - b
pub fn residual(
    A: &DMatrix<f64>,
    x: &DVector<f64>,
    b: &DVector<f64>,
) -> Result<DVector<f64>, LinSysError> {
    let n = check_system(A, b)?;
    if x.len() != n {
        return Err(LinSysError::DimensionMismatch {
            what: "solution length",
            expected: n,
            found: x.len(),
        });
    }
    Ok(A * x - b)
}

/// max |(A*x - b)_i|, the quick check used to verify a computed solution
pub fn max_residual(
    A: &DMatrix<f64>,
    x: &DVector<f64>,
    b: &DVector<f64>,
) -> Result<f64, LinSysError> {
    let r = residual(A, x, b)?;
    Ok(r.amax())
}

/// A square system A*x = b with validated shapes
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem {
    A: DMatrix<f64>,
    b: DVector<f64>,
}

impl LinearSystem {
    /// Takes ownership of A and b after checking that A is square and non-empty and that
    /// b has one entry per row
    pub fn new(A: DMatrix<f64>, b: DVector<f64>) -> Result<Self, LinSysError> {
        check_system(&A, &b)?;
        Ok(Self { A, b })
    }

    pub fn from_rows(rows: &[Vec<f64>], rhs: &[f64]) -> Result<Self, LinSysError> {
        let A = matrix_from_rows(rows)?;
        Self::new(A, DVector::from_column_slice(rhs))
    }

    pub fn dim(&self) -> usize {
        self.b.len()
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.A
    }

    pub fn rhs(&self) -> &DVector<f64> {
        &self.b
    }

    pub fn residual(&self, x: &DVector<f64>) -> Result<DVector<f64>, LinSysError> {
        residual(&self.A, x, &self.b)
    }

    pub fn max_residual(&self, x: &DVector<f64>) -> Result<f64, LinSysError> {
        max_residual(&self.A, x, &self.b)
    }
}
