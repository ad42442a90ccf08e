//! Operating-trajectory provider used to seed inputs on cold starts.

use crate::Vector;

/// Supplies a nominal input for a given time and state. Used to fill
/// input samples that lie beyond any previously computed solution.
pub trait OperatingTrajectoryProvider: Send {
    fn operating_input(&self, time: f64, state: &Vector) -> Vector;
}

/// Provider that always returns the same nominal input.
#[derive(Debug, Clone)]
pub struct FixedOperatingPoint {
    pub input: Vector,
}

impl FixedOperatingPoint {
    pub fn new(input: Vector) -> Self {
        Self { input }
    }
}

impl OperatingTrajectoryProvider for FixedOperatingPoint {
    fn operating_input(&self, _time: f64, _state: &Vector) -> Vector {
        self.input.clone()
    }
}
