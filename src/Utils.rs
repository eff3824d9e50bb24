//! different utility modules used around the solvers
/// logger setup for programs calling the solvers
pub mod logger;
/// pretty printing of systems and iteration histories, csv export
pub mod report;
