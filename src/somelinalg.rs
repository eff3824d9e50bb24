//! linear algebra core: direct, tridiagonal and stationary iterative solvers for A*x = b
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// error type shared by all solvers
pub mod linear_sys_error;
/// square matrix / conformant vector checks and residuals
pub mod linear_system;
/// Gaussian elimination with partial pivoting, back and forward substitution
pub mod gauss_elimination;
/// Thomas algorithm and natural cubic spline systems
pub mod tridiagonal;
/// diagnostics for linear systems and matrices: determinant, dominance,
/// if it is singular or poorly conditioned
pub mod linear_sys_diagnostics;
/// Jacobi, Gauss-Seidel and SOR iterations
pub mod stationary_iterative;
