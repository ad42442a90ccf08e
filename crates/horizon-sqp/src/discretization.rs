//! Sensitivity discretization of the continuous dynamics over one interval.

use horizon_ocp::{Matrix, SystemDynamics, Vector, VectorFunctionLinearApproximation};

/// Discretize `x_dot = f(t, x, u)` over `[t, t + dt]` with a classical
/// fourth-order Runge-Kutta scheme, propagating the state and input
/// sensitivities through the stages.
///
/// The returned approximation maps `(dx, du)` at the interval start to the
/// predicted state at the interval end:
/// `x_next ~= f + dfdx * dx + dfdu * du`.
pub fn rk4_sensitivity_discretization(
    dynamics: &dyn SystemDynamics,
    t: f64,
    x: &Vector,
    u: &Vector,
    dt: f64,
) -> VectorFunctionLinearApproximation {
    let nx = x.len();
    let half = 0.5 * dt;

    // stage values and their Jacobians at the stage evaluation points
    let s1 = dynamics.linear_approximation(t, x, u);
    let x2 = x + half * &s1.f;
    let s2 = dynamics.linear_approximation(t + half, &x2, u);
    let x3 = x + half * &s2.f;
    let s3 = dynamics.linear_approximation(t + half, &x3, u);
    let x4 = x + dt * &s3.f;
    let s4 = dynamics.linear_approximation(t + dt, &x4, u);

    let identity = Matrix::identity(nx, nx);

    // chain rule through the stage states
    let dk1dx = s1.dfdx;
    let dk1du = s1.dfdu;
    let dk2dx = &s2.dfdx * (&identity + half * &dk1dx);
    let dk2du = &s2.dfdu + half * &s2.dfdx * &dk1du;
    let dk3dx = &s3.dfdx * (&identity + half * &dk2dx);
    let dk3du = &s3.dfdu + half * &s3.dfdx * &dk2du;
    let dk4dx = &s4.dfdx * (&identity + dt * &dk3dx);
    let dk4du = &s4.dfdu + dt * &s4.dfdx * &dk3du;

    let sixth = dt / 6.0;
    VectorFunctionLinearApproximation {
        dfdx: identity + sixth * (dk1dx + 2.0 * dk2dx + 2.0 * dk3dx + dk4dx),
        dfdu: sixth * (dk1du + 2.0 * dk2du + 2.0 * dk3du + dk4du),
        f: x + sixth * (&s1.f + 2.0 * &s2.f + 2.0 * &s3.f + &s4.f),
    }
}
