use std::fmt;

/// Error types for the linear system solvers.
/// Divergence and exhausted iteration budgets of the iterative solvers are not errors:
/// they are reported through `IterationStatus`.
#[derive(Debug, Clone, PartialEq)]
pub enum LinSysError {
    /// shapes of matrix/vectors are inconsistent
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// pivot magnitude below tolerance at elimination/substitution step `step`
    SingularMatrix { step: usize, pivot: f64 },
    /// SOR relaxation factor outside of (0, 2)
    InvalidRelaxationFactor(f64),
    /// numeric argument of a parameter search out of its admissible range
    InvalidParameter { what: &'static str, value: f64 },
}

impl fmt::Display for LinSysError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinSysError::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "Dimension mismatch: {} expected {}, found {}",
                what, expected, found
            ),
            LinSysError::SingularMatrix { step, pivot } => write!(
                f,
                "Matrix is singular or nearly singular: pivot {:e} at step {}",
                pivot, step
            ),
            LinSysError::InvalidRelaxationFactor(omega) => write!(
                f,
                "Invalid relaxation factor omega = {}, must lie in (0, 2)",
                omega
            ),
            LinSysError::InvalidParameter { what, value } => {
                write!(f, "Invalid parameter: {} = {}", what, value)
            }
        }
    }
}

impl std::error::Error for LinSysError {}
