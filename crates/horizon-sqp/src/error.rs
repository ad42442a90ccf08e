//! Solver error types.

use thiserror::Error;

/// Errors raised by the SQP solve loop.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("invalid time window: init_time {init_time} must lie before final_time {final_time}")]
    InvalidTimeWindow { init_time: f64, final_time: f64 },
    #[error("invalid time step: dt must be positive, got {0}")]
    InvalidTimeStep(f64),
    #[error("constraint projection failed: {0}")]
    ProjectionFailed(String),
    #[error("QP subproblem failed")]
    Qp(#[from] QpError),
}

/// Errors raised by the structured QP backend.
#[derive(Debug, Error)]
pub enum QpError {
    #[error("QP subproblem is infeasible")]
    Infeasible,
    #[error("QP solver failure: {0}")]
    SolverFailure(String),
}
