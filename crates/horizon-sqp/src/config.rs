//! Solver settings.

use serde::{Deserialize, Serialize};

/// Tuning knobs of the SQP solve loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Nominal discretization step [s].
    pub dt: f64,
    /// State dimension.
    pub n_state: usize,
    /// Input dimension.
    pub n_input: usize,
    /// Maximum number of SQP iterations per solve.
    pub sqp_iteration: usize,
    /// Convergence threshold on the summed update norms.
    pub delta_tol: f64,
    /// Relaxed-barrier scale; inequality penalties are disabled when zero.
    pub inequality_constraint_mu: f64,
    /// Relaxed-barrier switching threshold.
    pub inequality_constraint_delta: f64,
    /// Eliminate state-input equality constraints by projection instead of
    /// passing them to the QP.
    pub project_state_input_equality_constraints: bool,
    /// Log per-iteration status.
    pub print_solver_status: bool,
    /// Log the benchmark summary when the solver is dropped.
    pub print_solver_statistics: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dt: 0.01,
            n_state: 0,
            n_input: 0,
            sqp_iteration: 10,
            delta_tol: 1e-6,
            inequality_constraint_mu: 0.0,
            inequality_constraint_delta: 1e-6,
            project_state_input_equality_constraints: true,
            print_solver_status: false,
            print_solver_statistics: false,
        }
    }
}
