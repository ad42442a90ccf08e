//! Path constraint contracts.
//!
//! A constraint collaborator may expose a state-input equality constraint
//! `g(t, x, u) = 0`, an inequality constraint `h(t, x, u) >= 0`, or both.
//! Returning `None` for a part means the problem has no such constraint.

use crate::approximations::{
    VectorFunctionLinearApproximation, VectorFunctionQuadraticApproximation,
};
use crate::{Matrix, Vector};

pub trait ConstraintFunction: Send {
    /// First-order model of the equality constraint `g(t, x, u) = 0`.
    fn state_input_equality_linear_approximation(
        &self,
        time: f64,
        state: &Vector,
        input: &Vector,
    ) -> Option<VectorFunctionLinearApproximation> {
        let _ = (time, state, input);
        None
    }

    /// Second-order model of the inequality constraint `h(t, x, u) >= 0`.
    fn inequality_quadratic_approximation(
        &self,
        time: f64,
        state: &Vector,
        input: &Vector,
    ) -> Option<VectorFunctionQuadraticApproximation> {
        let _ = (time, state, input);
        None
    }
}

/// Affine state-input equality constraint `e + C x + D u = 0`.
#[derive(Debug, Clone)]
pub struct LinearStateInputConstraint {
    pub e: Vector,
    pub c: Matrix,
    pub d: Matrix,
}

impl LinearStateInputConstraint {
    pub fn new(e: Vector, c: Matrix, d: Matrix) -> Self {
        Self { e, c, d }
    }
}

impl ConstraintFunction for LinearStateInputConstraint {
    fn state_input_equality_linear_approximation(
        &self,
        _time: f64,
        state: &Vector,
        input: &Vector,
    ) -> Option<VectorFunctionLinearApproximation> {
        Some(VectorFunctionLinearApproximation {
            dfdx: self.c.clone(),
            dfdu: self.d.clone(),
            f: &self.e + &self.c * state + &self.d * input,
        })
    }
}

/// Affine inequality constraint `h0 + H_x x + H_u u >= 0`.
///
/// The second-order model has zero Hessians; curvature enters only
/// through the penalty that consumes it.
#[derive(Debug, Clone)]
pub struct AffineInequalityConstraint {
    pub h0: Vector,
    pub dhdx: Matrix,
    pub dhdu: Matrix,
}

impl AffineInequalityConstraint {
    pub fn new(h0: Vector, dhdx: Matrix, dhdu: Matrix) -> Self {
        Self { h0, dhdx, dhdu }
    }
}

impl ConstraintFunction for AffineInequalityConstraint {
    fn inequality_quadratic_approximation(
        &self,
        _time: f64,
        state: &Vector,
        input: &Vector,
    ) -> Option<VectorFunctionQuadraticApproximation> {
        let nv = self.h0.len();
        let (nx, nu) = (state.len(), input.len());
        Some(VectorFunctionQuadraticApproximation {
            dfdxx: vec![Matrix::zeros(nx, nx); nv],
            dfdux: vec![Matrix::zeros(nu, nx); nv],
            dfduu: vec![Matrix::zeros(nu, nu); nv],
            dfdx: self.dhdx.clone(),
            dfdu: self.dhdu.clone(),
            f: &self.h0 + &self.dhdx * state + &self.dhdu * input,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_residual_is_affine() {
        // u_0 - u_1 = 0
        let con = LinearStateInputConstraint::new(
            Vector::zeros(1),
            Matrix::zeros(1, 2),
            Matrix::from_row_slice(1, 2, &[1.0, -1.0]),
        );

        let x = Vector::from_vec(vec![3.0, 4.0]);
        let u = Vector::from_vec(vec![2.0, 0.5]);
        let lin = con
            .state_input_equality_linear_approximation(0.0, &x, &u)
            .expect("equality part exists");
        assert_eq!(lin.f[0], 1.5);
        assert!(con.inequality_quadratic_approximation(0.0, &x, &u).is_none());
    }

    #[test]
    fn inequality_value_is_affine() {
        // u >= -1  =>  h = u + 1 >= 0
        let con = AffineInequalityConstraint::new(
            Vector::from_vec(vec![1.0]),
            Matrix::zeros(1, 1),
            Matrix::identity(1, 1),
        );

        let x = Vector::zeros(1);
        let u = Vector::from_vec(vec![-0.25]);
        let quad = con
            .inequality_quadratic_approximation(0.0, &x, &u)
            .expect("inequality part exists");
        assert_eq!(quad.f[0], 0.75);
        assert_eq!(quad.dfdxx.len(), 1);
    }
}
