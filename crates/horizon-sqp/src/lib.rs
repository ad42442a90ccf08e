//! Multiple-shooting SQP solver for model-predictive control.
//!
//! The solve loop discretizes the horizon on a time grid that honors
//! mode-switch events, warm starts from the previous solution, and then
//! iterates three phases until convergence or the iteration cap:
//!
//! 1. transcribe the nonlinear problem into a linear-quadratic subproblem
//!    around the current iterate (RK4 sensitivity discretization, cost
//!    expansion, constraint projection or pass-through, barrier penalty),
//! 2. solve the structured QP,
//! 3. apply the full update step.
//!
//! Problem definitions (dynamics, costs, constraints) live in
//! [`horizon_ocp`]; this crate adds the solver machinery around them.

pub mod config;
pub mod discretization;
pub mod error;
pub mod grid;
pub mod initialization;
pub mod projection;
pub mod qp;
pub mod solver;
pub mod timing;
pub mod transcription;

pub use config::Settings;
pub use error::{QpError, SolverError};
pub use qp::{ClarabelQpSolver, StructuredQpSolver};
pub use solver::{SolverStage, SqpSolver, SqpSolverBuilder};
pub use transcription::{LqProblem, OcpSize};
