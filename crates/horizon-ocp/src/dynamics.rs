//! Continuous-time system dynamics contract.

use crate::approximations::VectorFunctionLinearApproximation;
use crate::Vector;

/// Continuous-time flow map `x_dot = f(t, x, u)` with its linearization.
pub trait SystemDynamics: Send {
    /// Evaluate the flow map.
    fn flow(&self, time: f64, state: &Vector, input: &Vector) -> Vector;

    /// First-order model of the flow map at `(time, state, input)`:
    /// `f` holds the flow value, `dfdx`/`dfdu` the Jacobians.
    fn linear_approximation(
        &self,
        time: f64,
        state: &Vector,
        input: &Vector,
    ) -> VectorFunctionLinearApproximation;
}

/// Linear time-invariant dynamics `x_dot = A x + B u`.
#[derive(Debug, Clone)]
pub struct LinearSystemDynamics {
    pub a: crate::Matrix,
    pub b: crate::Matrix,
}

impl LinearSystemDynamics {
    pub fn new(a: crate::Matrix, b: crate::Matrix) -> Self {
        Self { a, b }
    }
}

impl SystemDynamics for LinearSystemDynamics {
    fn flow(&self, _time: f64, state: &Vector, input: &Vector) -> Vector {
        &self.a * state + &self.b * input
    }

    fn linear_approximation(
        &self,
        time: f64,
        state: &Vector,
        input: &Vector,
    ) -> VectorFunctionLinearApproximation {
        VectorFunctionLinearApproximation {
            dfdx: self.a.clone(),
            dfdu: self.b.clone(),
            f: self.flow(time, state, input),
        }
    }
}
