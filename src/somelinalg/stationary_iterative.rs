//! Stationary iterative solvers for A*x = b: Jacobi, Gauss-Seidel and successive over-relaxation.
//!
//! All three share one driver loop. After every full sweep the error
//! ||x_k - x_{k-1}|| is compared with the tolerance (converged), with the error of the
//! previous sweep (diverged) and the iteration counter with the budget (exhausted).
//! Divergence and exhaustion are ordinary outcomes reported in [`IterationStatus`],
//! the caller gets the last iterate either way.
//!
//! The "error grew, so stop" rule is only applied to Jacobi and Gauss-Seidel.
//! Over-relaxed sweeps oscillate before they settle, so for SOR a growth of more than
//! [`SOR_FLUCTUATION_FACTOR`] times the previous error is only logged. A non-finite
//! iterate ends every method with `Diverged`.
//!
//! # Example
//! ```rust
//! use RustedLinSys::somelinalg::stationary_iterative::{solve_gauss_seidel, IterationStatus};
//! use nalgebra::{DMatrix, DVector};
//!
//! let A = DMatrix::from_row_slice(3, 3, &[4.0, -1.0, 0.0, -1.0, 4.0, -1.0, 0.0, -1.0, 3.0]);
//! let b = DVector::from_vec(vec![15.0, 10.0, 10.0]);
//! let x0 = DVector::zeros(3);
//! let res = solve_gauss_seidel(&A, &b, &x0, 1e-6, 100).unwrap();
//! assert_eq!(res.status, IterationStatus::Converged);
//! assert!((res.x[0] - 5.0).abs() < 1e-5);
//! ```
use crate::somelinalg::linear_sys_diagnostics::{DominanceReport, is_diagonally_dominant};
use crate::somelinalg::linear_sys_error::LinSysError;
use crate::somelinalg::linear_system::check_system;
use log::{debug, info, warn};
use nalgebra::{DMatrix, DVector};
use strum_macros::{Display, EnumIter};

/// SOR error growth beyond this factor of the previous error is logged as suspicious
pub const SOR_FLUCTUATION_FACTOR: f64 = 1.5;

/// Update rule of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum IterativeMethod {
    Jacobi,
    GaussSeidel,
    /// Gauss-Seidel candidate blended with the previous iterate, omega in (0, 2)
    SOR { omega: f64 },
}

impl IterativeMethod {
    /// Rejects a relaxation factor outside of the open interval (0, 2)
    pub fn validate(&self) -> Result<(), LinSysError> {
        if let IterativeMethod::SOR { omega } = *self {
            if !(omega > 0.0 && omega < 2.0) {
                return Err(LinSysError::InvalidRelaxationFactor(omega));
            }
        }
        Ok(())
    }
}

/// Final state of an iterative solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IterationStatus {
    Converged,
    Diverged,
    MaxIterationsReached,
    /// the caller's stop predicate ended the iteration
    Stopped,
}

/// Norm of x_k - x_{k-1} used as the error of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum ErrorNorm {
    #[default]
    Euclidean,
    Max,
}

impl ErrorNorm {
    pub fn measure(&self, x: &DVector<f64>, x_prev: &DVector<f64>) -> f64 {
        let diff = x - x_prev;
        match self {
            ErrorNorm::Euclidean => diff.norm(),
            // amax would drop NaN components
            ErrorNorm::Max => diff.iter().fold(0.0, |acc: f64, d| {
                if d.is_nan() || acc.is_nan() { f64::NAN } else { acc.max(d.abs()) }
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IterativeConfig {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub error_norm: ErrorNorm,
    /// Jacobi/Gauss-Seidel: stop with `Diverged` as soon as the error grows between two
    /// sweeps. SOR: warn when the error grows by more than `SOR_FLUCTUATION_FACTOR`.
    pub divergence_check: bool,
    /// run the (advisory) diagonal dominance check before iterating
    pub check_dominance: bool,
    /// keep (iteration, error) of every sweep
    pub record_history: bool,
}

impl Default for IterativeConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 1000,
            error_norm: ErrorNorm::Euclidean,
            divergence_check: true,
            check_dominance: true,
            record_history: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IterativeSolution {
    pub x: DVector<f64>,
    pub iterations: usize,
    pub error: f64,
    pub status: IterationStatus,
    pub dominance: Option<DominanceReport>,
    pub history: Vec<(usize, f64)>,
}

impl IterativeSolution {
    pub fn is_converged(&self) -> bool {
        self.status == IterationStatus::Converged
    }
}

type StopPredicate<'a> = Box<dyn FnMut(usize, f64) -> bool + 'a>;
type SweepObserver<'a> = Box<dyn FnMut(usize, &DVector<f64>, f64) + 'a>;

/// Configurable driver for the stationary methods
pub struct StationarySolver<'a> {
    method: IterativeMethod,
    config: IterativeConfig,
    stop_predicate: Option<StopPredicate<'a>>,
    observer: Option<SweepObserver<'a>>,
}

impl<'a> StationarySolver<'a> {
    pub fn new(method: IterativeMethod) -> Self {
        Self {
            method,
            config: IterativeConfig::default(),
            stop_predicate: None,
            observer: None,
        }
    }
    ////////////////////////////SETTERS/////////////////////////////////
    pub fn set_config(&mut self, config: IterativeConfig) {
        self.config = config;
    }

    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.config.tolerance = tolerance;
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.config.max_iterations = max_iterations;
    }

    pub fn set_error_norm(&mut self, error_norm: ErrorNorm) {
        self.config.error_norm = error_norm;
    }

    pub fn set_divergence_check(&mut self, divergence_check: bool) {
        self.config.divergence_check = divergence_check;
    }

    pub fn set_check_dominance(&mut self, check_dominance: bool) {
        self.config.check_dominance = check_dominance;
    }

    pub fn set_record_history(&mut self, record_history: bool) {
        self.config.record_history = record_history;
    }

    /// `predicate(iteration, error)` is asked after every sweep that neither converged nor
    /// diverged; returning true ends the solve with `IterationStatus::Stopped`
    pub fn set_stop_predicate<P>(&mut self, predicate: P)
    where
        P: FnMut(usize, f64) -> bool + 'a,
    {
        self.stop_predicate = Some(Box::new(predicate));
    }

    /// `observer(iteration, x, error)` is called after every sweep
    pub fn set_observer<O>(&mut self, observer: O)
    where
        O: FnMut(usize, &DVector<f64>, f64) + 'a,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn method(&self) -> IterativeMethod {
        self.method
    }

    pub fn config(&self) -> &IterativeConfig {
        &self.config
    }
    ////////////////////////////SOLVER/////////////////////////////////
    pub fn solve(
        &mut self,
        A: &DMatrix<f64>,
        b: &DVector<f64>,
        x0: &DVector<f64>,
    ) -> Result<IterativeSolution, LinSysError> {
        self.method.validate()?;
        let n = check_system(A, b)?;
        if x0.len() != n {
            return Err(LinSysError::DimensionMismatch {
                what: "initial guess length",
                expected: n,
                found: x0.len(),
            });
        }

        let dominance = if self.config.check_dominance {
            let report = is_diagonally_dominant(A)?;
            if let Some(row) = report.offending_row {
                warn!(
                    "matrix is not diagonally dominant (row {}), {} may not converge",
                    row, self.method
                );
            }
            Some(report)
        } else {
            None
        };

        let mut x = x0.clone();
        let mut x_prev = x0.clone();
        let mut error = f64::INFINITY;
        let mut previous_error: Option<f64> = None;
        let mut history = Vec::new();
        let mut status = IterationStatus::MaxIterationsReached;
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            x_prev.copy_from(&x);
            sweep(self.method, A, b, &x_prev, &mut x);
            iterations += 1;
            error = self.config.error_norm.measure(&x, &x_prev);
            if self.config.record_history {
                history.push((iterations, error));
            }
            if let Some(observer) = self.observer.as_mut() {
                observer(iterations, &x, error);
            }
            debug!("{} sweep {}: error = {:e}", self.method, iterations, error);

            if !error.is_finite() {
                warn!("{}: non-finite iterate at sweep {}", self.method, iterations);
                status = IterationStatus::Diverged;
                break;
            }
            if error < self.config.tolerance {
                status = IterationStatus::Converged;
                break;
            }
            if let (true, Some(prev)) = (self.config.divergence_check, previous_error) {
                match self.method {
                    IterativeMethod::SOR { .. } => {
                        if error > SOR_FLUCTUATION_FACTOR * prev {
                            warn!(
                                "{} may not be converging: error grew from {:e} to {:e} at sweep {}",
                                self.method, prev, error, iterations
                            );
                        }
                    }
                    IterativeMethod::Jacobi | IterativeMethod::GaussSeidel => {
                        if error > prev {
                            warn!(
                                "{} does not converge: error grew to {:e} at sweep {}",
                                self.method, error, iterations
                            );
                            status = IterationStatus::Diverged;
                            break;
                        }
                    }
                }
            }
            if let Some(stop) = self.stop_predicate.as_mut() {
                if stop(iterations, error) {
                    status = IterationStatus::Stopped;
                    break;
                }
            }
            previous_error = Some(error);
        }

        if status == IterationStatus::MaxIterationsReached {
            warn!(
                "{}: maximum number of iterations ({}) reached, error = {:e}",
                self.method, self.config.max_iterations, error
            );
        } else {
            info!(
                "{} finished with status {} after {} sweeps, error = {:e}",
                self.method, status, iterations, error
            );
        }
        Ok(IterativeSolution {
            x,
            iterations,
            error,
            status,
            dominance,
            history,
        })
    }
}

/// One full sweep. `x` enters equal to `x_prev` and leaves holding the new iterate.
fn sweep(
    method: IterativeMethod,
    A: &DMatrix<f64>,
    b: &DVector<f64>,
    x_prev: &DVector<f64>,
    x: &mut DVector<f64>,
) {
    let n = b.len();
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..n {
            if j == i {
                continue;
            }
            let x_ref = match method {
                IterativeMethod::Jacobi => x_prev[j],
                // x[j] is already updated for j < i
                IterativeMethod::GaussSeidel | IterativeMethod::SOR { .. } => x[j],
            };
            sum += A[(i, j)] * x_ref;
        }
        let candidate = (b[i] - sum) / A[(i, i)];
        x[i] = match method {
            IterativeMethod::SOR { omega } => omega * candidate + (1.0 - omega) * x_prev[i],
            _ => candidate,
        };
    }
}

fn solve_with(
    method: IterativeMethod,
    A: &DMatrix<f64>,
    b: &DVector<f64>,
    x0: &DVector<f64>,
    tolerance: f64,
    max_iterations: usize,
) -> Result<IterativeSolution, LinSysError> {
    let mut solver = StationarySolver::new(method);
    solver.set_tolerance(tolerance);
    solver.set_max_iterations(max_iterations);
    solver.solve(A, b, x0)
}

/// Jacobi iteration with the default configuration (Euclidean error, divergence check
/// and dominance advisory on). Every unknown of a sweep is computed from the previous
/// iterate only.
pub fn solve_jacobi(
    A: &DMatrix<f64>,
    b: &DVector<f64>,
    x0: &DVector<f64>,
    tolerance: f64,
    max_iterations: usize,
) -> Result<IterativeSolution, LinSysError> {
    solve_with(IterativeMethod::Jacobi, A, b, x0, tolerance, max_iterations)
}

/// Gauss-Seidel iteration with the default configuration. Unknowns already updated in
/// the current sweep are used at once, which on diagonally dominant systems needs no
/// more sweeps than Jacobi.
pub fn solve_gauss_seidel(
    A: &DMatrix<f64>,
    b: &DVector<f64>,
    x0: &DVector<f64>,
    tolerance: f64,
    max_iterations: usize,
) -> Result<IterativeSolution, LinSysError> {
    solve_with(IterativeMethod::GaussSeidel, A, b, x0, tolerance, max_iterations)
}

/// Successive over-relaxation: omega < 1 under-relaxes, omega = 1 is Gauss-Seidel.
/// Fails with `InvalidRelaxationFactor` before any work if omega is not in (0, 2)
pub fn solve_sor(
    A: &DMatrix<f64>,
    b: &DVector<f64>,
    x0: &DVector<f64>,
    omega: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<IterativeSolution, LinSysError> {
    solve_with(
        IterativeMethod::SOR { omega },
        A,
        b,
        x0,
        tolerance,
        max_iterations,
    )
}

/// Empirical search for the relaxation factor: runs SOR for omega = omega_min,
/// omega_min + step, ... up to omega_max and returns the omega that converged in the
/// fewest sweeps (the first one on ties). If no candidate converges, 1.0 (Gauss-Seidel)
/// is returned.
pub fn optimal_omega(
    A: &DMatrix<f64>,
    b: &DVector<f64>,
    x0: &DVector<f64>,
    omega_min: f64,
    omega_max: f64,
    step: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<f64, LinSysError> {
    IterativeMethod::SOR { omega: omega_min }.validate()?;
    IterativeMethod::SOR { omega: omega_max }.validate()?;
    if !(step > 0.0) {
        return Err(LinSysError::InvalidParameter {
            what: "omega step",
            value: step,
        });
    }
    if omega_min > omega_max {
        return Err(LinSysError::InvalidParameter {
            what: "omega range",
            value: omega_max - omega_min,
        });
    }

    let mut best: Option<(f64, usize)> = None;
    let mut k = 0;
    loop {
        // offsets from omega_min instead of accumulated steps
        let omega = omega_min + k as f64 * step;
        if omega > omega_max + 1e-12 {
            break;
        }
        let omega = omega.min(omega_max);
        let mut solver = StationarySolver::new(IterativeMethod::SOR { omega });
        solver.set_tolerance(tolerance);
        solver.set_max_iterations(max_iterations);
        solver.set_check_dominance(false);
        let res = solver.solve(A, b, x0)?;
        debug!("omega = {}: {} after {} sweeps", omega, res.status, res.iterations);
        if res.is_converged() && best.is_none_or(|(_, iterations)| res.iterations < iterations) {
            best = Some((omega, res.iterations));
        }
        k += 1;
    }
    match best {
        Some((omega, iterations)) => {
            info!("best relaxation factor {} ({} sweeps)", omega, iterations);
            Ok(omega)
        }
        None => {
            warn!(
                "SOR did not converge for any omega in [{}, {}], falling back to 1.0",
                omega_min, omega_max
            );
            Ok(1.0)
        }
    }
}
