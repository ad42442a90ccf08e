//! Stage and terminal cost contracts with quadratic reference-tracking
//! implementations.

use crate::approximations::ScalarFunctionQuadraticApproximation;
use crate::{Matrix, Vector};

/// Intermediate (stage) cost rate `l(t, x, u)`.
pub trait CostFunction: Send {
    fn cost(&self, time: f64, state: &Vector, input: &Vector) -> f64;

    /// Second-order model of the cost rate at `(time, state, input)`.
    fn quadratic_approximation(
        &self,
        time: f64,
        state: &Vector,
        input: &Vector,
    ) -> ScalarFunctionQuadraticApproximation;
}

/// Terminal cost `phi(t, x)` evaluated at the horizon end.
pub trait TerminalCostFunction: Send {
    fn cost(&self, time: f64, state: &Vector) -> f64;

    /// Second-order model of the terminal cost. The input-sized blocks of
    /// the returned approximation are empty (zero inputs).
    fn quadratic_approximation(
        &self,
        time: f64,
        state: &Vector,
    ) -> ScalarFunctionQuadraticApproximation;
}

/// Quadratic tracking cost
/// `0.5 (x - x_ref)' Q (x - x_ref) + 0.5 (u - u_ref)' R (u - u_ref)`.
#[derive(Debug, Clone)]
pub struct QuadraticCost {
    pub q: Matrix,
    pub r: Matrix,
    pub state_ref: Vector,
    pub input_ref: Vector,
}

impl QuadraticCost {
    pub fn new(q: Matrix, r: Matrix, state_ref: Vector, input_ref: Vector) -> Self {
        Self { q, r, state_ref, input_ref }
    }
}

impl CostFunction for QuadraticCost {
    fn cost(&self, _time: f64, state: &Vector, input: &Vector) -> f64 {
        let dx = state - &self.state_ref;
        let du = input - &self.input_ref;
        0.5 * (dx.dot(&(&self.q * &dx)) + du.dot(&(&self.r * &du)))
    }

    fn quadratic_approximation(
        &self,
        time: f64,
        state: &Vector,
        input: &Vector,
    ) -> ScalarFunctionQuadraticApproximation {
        let dx = state - &self.state_ref;
        let du = input - &self.input_ref;
        ScalarFunctionQuadraticApproximation {
            dfdxx: self.q.clone(),
            dfdux: Matrix::zeros(input.len(), state.len()),
            dfduu: self.r.clone(),
            dfdx: &self.q * &dx,
            dfdu: &self.r * &du,
            f: self.cost(time, state, input),
        }
    }
}

/// Quadratic terminal cost `0.5 (x - x_ref)' Q_f (x - x_ref)`.
#[derive(Debug, Clone)]
pub struct QuadraticTerminalCost {
    pub q_final: Matrix,
    pub state_ref: Vector,
}

impl QuadraticTerminalCost {
    pub fn new(q_final: Matrix, state_ref: Vector) -> Self {
        Self { q_final, state_ref }
    }
}

impl TerminalCostFunction for QuadraticTerminalCost {
    fn cost(&self, _time: f64, state: &Vector) -> f64 {
        let dx = state - &self.state_ref;
        0.5 * dx.dot(&(&self.q_final * &dx))
    }

    fn quadratic_approximation(
        &self,
        time: f64,
        state: &Vector,
    ) -> ScalarFunctionQuadraticApproximation {
        let dx = state - &self.state_ref;
        ScalarFunctionQuadraticApproximation {
            dfdxx: self.q_final.clone(),
            dfdux: Matrix::zeros(0, state.len()),
            dfduu: Matrix::zeros(0, 0),
            dfdx: &self.q_final * &dx,
            dfdu: Vector::zeros(0),
            f: self.cost(time, state),
        }
    }
}
