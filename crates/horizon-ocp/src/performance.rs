//! Performance indices of one solver iterate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar quality measures of a rollout: cost, constraint violations
/// (integral of squared error) and the inequality penalty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceIndex {
    pub merit: f64,
    pub total_cost: f64,
    pub state_eq_constraint_ise: f64,
    pub state_eq_final_constraint_ise: f64,
    pub state_input_eq_constraint_ise: f64,
    pub inequality_constraint_ise: f64,
    pub inequality_constraint_penalty: f64,
}

impl fmt::Display for PerformanceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rollout merit: {}", self.merit)?;
        writeln!(f, "rollout cost:  {}", self.total_cost)?;
        writeln!(
            f,
            "state equality constraints ISE:       {}",
            self.state_eq_constraint_ise
        )?;
        writeln!(
            f,
            "state equality final constraints ISE: {}",
            self.state_eq_final_constraint_ise
        )?;
        writeln!(
            f,
            "state-input equality constraints ISE: {}",
            self.state_input_eq_constraint_ise
        )?;
        writeln!(
            f,
            "inequality constraints ISE:           {}",
            self.inequality_constraint_ise
        )?;
        writeln!(
            f,
            "inequality constraints penalty:       {}",
            self.inequality_constraint_penalty
        )
    }
}
