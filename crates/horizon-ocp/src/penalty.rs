//! Relaxed logarithmic barrier for inequality constraints `h >= 0`.
//!
//! The barrier is `-mu * ln(h)` on `h > delta` and switches to a quadratic
//! extension below, so the penalty stays defined (and twice differentiable)
//! for infeasible iterates.

use crate::approximations::{
    ScalarFunctionQuadraticApproximation, VectorFunctionQuadraticApproximation,
};

#[derive(Debug, Clone, Copy)]
pub struct RelaxedBarrierPenalty {
    mu: f64,
    delta: f64,
}

impl RelaxedBarrierPenalty {
    pub fn new(mu: f64, delta: f64) -> Self {
        Self { mu, delta }
    }

    /// Penalty value for a single constraint entry.
    pub fn value(&self, h: f64) -> f64 {
        if h > self.delta {
            -self.mu * h.ln()
        } else {
            let z = (h - 2.0 * self.delta) / self.delta;
            self.mu * (0.5 * (z * z - 1.0) - self.delta.ln())
        }
    }

    /// First derivative of the penalty with respect to `h`.
    pub fn derivative(&self, h: f64) -> f64 {
        if h > self.delta {
            -self.mu / h
        } else {
            self.mu * (h - 2.0 * self.delta) / (self.delta * self.delta)
        }
    }

    /// Second derivative of the penalty with respect to `h`.
    pub fn second_derivative(&self, h: f64) -> f64 {
        if h > self.delta {
            self.mu / (h * h)
        } else {
            self.mu / (self.delta * self.delta)
        }
    }

    /// Chain the penalty through a second-order constraint model, summing
    /// over the constraint rows:
    /// grad = p'(h_i) dh_i, Hess = p''(h_i) dh_i dh_i' + p'(h_i) d2h_i.
    pub fn cost_quadratic_approximation(
        &self,
        h: &VectorFunctionQuadraticApproximation,
    ) -> ScalarFunctionQuadraticApproximation {
        let nx = h.dfdx.ncols();
        let nu = h.dfdu.ncols();
        let mut penalty = ScalarFunctionQuadraticApproximation::zeros(nx, nu);

        for i in 0..h.f.len() {
            let p = self.value(h.f[i]);
            let dp = self.derivative(h.f[i]);
            let ddp = self.second_derivative(h.f[i]);

            let dhdx = h.dfdx.row(i).transpose();
            let dhdu = h.dfdu.row(i).transpose();

            penalty.f += p;
            penalty.dfdx += dp * &dhdx;
            penalty.dfdu += dp * &dhdu;
            penalty.dfdxx += ddp * &dhdx * dhdx.transpose() + dp * &h.dfdxx[i];
            penalty.dfdux += ddp * &dhdu * dhdx.transpose() + dp * &h.dfdux[i];
            penalty.dfduu += ddp * &dhdu * dhdu.transpose() + dp * &h.dfduu[i];
        }
        penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Matrix, Vector};
    use approx::assert_relative_eq;

    #[test]
    fn barrier_branch_matches_log() {
        let p = RelaxedBarrierPenalty::new(2.0, 1e-2);
        let h = 0.5;
        assert_relative_eq!(p.value(h), -2.0 * h.ln());
        assert_relative_eq!(p.derivative(h), -2.0 / h);
        assert_relative_eq!(p.second_derivative(h), 2.0 / (h * h));
    }

    #[test]
    fn branches_join_continuously_at_delta() {
        let p = RelaxedBarrierPenalty::new(1.5, 0.1);
        let eps = 1e-9;
        assert_relative_eq!(p.value(0.1 + eps), p.value(0.1 - eps), epsilon = 1e-6);
        assert_relative_eq!(
            p.derivative(0.1 + eps),
            p.derivative(0.1 - eps),
            epsilon = 1e-5
        );
    }

    #[test]
    fn quadratic_extension_is_finite_when_infeasible() {
        let p = RelaxedBarrierPenalty::new(1.0, 1e-2);
        assert!(p.value(-3.0).is_finite());
        assert!(p.derivative(-3.0) < 0.0);
        assert!(p.second_derivative(-3.0) > 0.0);
    }

    #[test]
    fn chained_gradient_for_affine_constraint() {
        // h(x, u) = u + 1, single row, zero Hessians.
        let p = RelaxedBarrierPenalty::new(1.0, 1e-3);
        let h = VectorFunctionQuadraticApproximation {
            dfdxx: vec![Matrix::zeros(1, 1)],
            dfdux: vec![Matrix::zeros(1, 1)],
            dfduu: vec![Matrix::zeros(1, 1)],
            dfdx: Matrix::zeros(1, 1),
            dfdu: Matrix::identity(1, 1),
            f: Vector::from_vec(vec![2.0]),
        };
        let cost = p.cost_quadratic_approximation(&h);
        assert_relative_eq!(cost.f, -(2.0f64.ln()));
        assert_relative_eq!(cost.dfdu[0], -0.5);
        assert_relative_eq!(cost.dfduu[(0, 0)], 0.25);
        assert_relative_eq!(cost.dfdx.norm(), 0.0);
    }
}
