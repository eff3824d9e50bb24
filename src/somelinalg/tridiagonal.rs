//! Thomas algorithm for tridiagonal systems.
//!
//! Row i of the system reads  sub[i]*M[i-1] + diag[i]*M[i] + sup[i]*M[i+1] = rhs[i],
//! with sub[0] and sup[n-1] unused. No pivoting is done: the solver relies on diagonal
//! dominance, which holds for the natural cubic spline systems built by
//! [`TridiagonalSystem::natural_spline`]. A zero pivot is a violated precondition and panics.
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Solves a tridiagonal system in O(n). The inputs are not modified.
pub fn solve_tridiagonal(sub: &[f64], diag: &[f64], sup: &[f64], rhs: &[f64]) -> DVector<f64> {
    let n = rhs.len();
    assert!(n > 0, "tridiagonal system must not be empty");
    assert!(
        sub.len() == n && diag.len() == n && sup.len() == n,
        "diagonals must have the same length as the right-hand side ({}): sub {}, diag {}, sup {}",
        n,
        sub.len(),
        diag.len(),
        sup.len()
    );
    let mut b = diag.to_vec();
    let mut d = rhs.to_vec();

    // forward sweep
    for i in 1..n {
        assert!(b[i - 1] != 0.0, "zero pivot in row {} of tridiagonal system", i - 1);
        let w = sub[i] / b[i - 1];
        b[i] -= w * sup[i - 1];
        d[i] -= w * d[i - 1];
    }
    assert!(b[n - 1] != 0.0, "zero pivot in row {} of tridiagonal system", n - 1);

    // backward sweep
    let mut M = DVector::zeros(n);
    M[n - 1] = d[n - 1] / b[n - 1];
    for i in (0..n - 1).rev() {
        M[i] = (d[i] - sup[i] * M[i + 1]) / b[i];
    }
    M
}

/// Three diagonals and a right-hand side of a tridiagonal system
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalSystem {
    pub sub: Vec<f64>,
    pub diag: Vec<f64>,
    pub sup: Vec<f64>,
    pub rhs: Vec<f64>,
}

impl TridiagonalSystem {
    pub fn new(sub: Vec<f64>, diag: Vec<f64>, sup: Vec<f64>, rhs: Vec<f64>) -> Self {
        Self {
            sub,
            diag,
            sup,
            rhs,
        }
    }

    /// System for the second derivatives M of the natural cubic spline through (x[i], y[i]).
    /// First and last rows encode M[0] = M[n-1] = 0.
    pub fn natural_spline(x: &[f64], y: &[f64]) -> Self {
        let n = x.len();
        assert!(n >= 2, "a spline needs at least two nodes, got {}", n);
        assert_eq!(n, y.len(), "x and y must have the same length");
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(
            h.iter().all(|&hi| hi > 0.0),
            "spline nodes must be strictly increasing"
        );

        let mut sub = vec![0.0; n];
        let mut diag = vec![0.0; n];
        let mut sup = vec![0.0; n];
        let mut rhs = vec![0.0; n];
        diag[0] = 1.0;
        diag[n - 1] = 1.0;
        for i in 1..n - 1 {
            sub[i] = h[i - 1];
            diag[i] = 2.0 * (h[i - 1] + h[i]);
            sup[i] = h[i];
            rhs[i] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
        }
        debug!("natural spline system of size {} assembled", n);
        Self::new(sub, diag, sup, rhs)
    }

    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    pub fn solve(&self) -> DVector<f64> {
        solve_tridiagonal(&self.sub, &self.diag, &self.sup, &self.rhs)
    }

    /// dense matrix and right-hand side of the same system
    pub fn to_dense(&self) -> (DMatrix<f64>, DVector<f64>) {
        let n = self.len();
        let mut A = DMatrix::zeros(n, n);
        for i in 0..n {
            A[(i, i)] = self.diag[i];
            if i > 0 {
                A[(i, i - 1)] = self.sub[i];
            }
            if i + 1 < n {
                A[(i, i + 1)] = self.sup[i];
            }
        }
        (A, DVector::from_column_slice(&self.rhs))
    }
}
