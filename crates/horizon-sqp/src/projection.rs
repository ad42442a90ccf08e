//! Elimination of state-input equality constraints.
//!
//! For a linearized constraint `C dx + D du + e = 0` with full-row-rank
//! `D`, every feasible input update can be written as
//! `du = Pu * u_tilde + Px * dx + Pe` where `u_tilde` is a free reduced
//! input. The projection is computed from a full-pivot LU factorization of
//! `D`, and the substitution is applied to the discretized dynamics and to
//! the quadratic cost so the QP only sees the reduced inputs.

use horizon_ocp::{
    Matrix, ScalarFunctionQuadraticApproximation, Vector, VectorFunctionLinearApproximation,
};

use crate::error::SolverError;

/// Compute the projection terms from the constraint linearization.
///
/// The result reuses the linear-approximation container: `dfdu` holds
/// `Pu` (`nu x (nu - nc)`), `dfdx` holds `Px` (`nu x nx`) and `f` holds
/// `Pe` (`nu`).
pub fn lu_constraint_projection(
    constraint: &VectorFunctionLinearApproximation,
) -> Result<VectorFunctionLinearApproximation, SolverError> {
    let nc = constraint.f.len();
    let nx = constraint.dfdx.ncols();
    let nu = constraint.dfdu.ncols();

    if nc == 0 {
        return Ok(VectorFunctionLinearApproximation {
            dfdx: Matrix::zeros(nu, nx),
            dfdu: Matrix::identity(nu, nu),
            f: Vector::zeros(nu),
        });
    }
    if nc > nu {
        return Err(SolverError::ProjectionFailed(format!(
            "{nc} equality rows exceed the {nu} available inputs"
        )));
    }

    // P D Q = L U with L unit lower triangular and U upper trapezoidal;
    // full pivoting puts the largest pivot first.
    let lu = constraint.dfdu.clone().full_piv_lu();
    let l = lu.l();
    let u = lu.u();

    let tol = u[(0, 0)].abs() * nu as f64 * f64::EPSILON;
    if (0..nc).any(|i| u[(i, i)].abs() <= tol) {
        return Err(SolverError::ProjectionFailed(
            "equality constraint matrix is rank deficient".to_string(),
        ));
    }

    let u1 = u.columns(0, nc).into_owned();
    let u2 = u.columns(nc, nu - nc).into_owned();

    let mut pc = constraint.dfdx.clone();
    lu.p().permute_rows(&mut pc);
    let mut pe = constraint.f.clone();
    lu.p().permute_rows(&mut pe);

    let singular =
        || SolverError::ProjectionFailed("triangular solve failed".to_string());
    let lc = l.solve_lower_triangular(&pc).ok_or_else(singular)?;
    let le = l.solve_lower_triangular(&pe).ok_or_else(singular)?;
    let w1x = u1.solve_upper_triangular(&lc).ok_or_else(singular)?;
    let w1e = u1.solve_upper_triangular(&le).ok_or_else(singular)?;
    let w1u = u1.solve_upper_triangular(&u2).ok_or_else(singular)?;

    // stack in the pivoted ordering, then undo the column permutation
    let mut px = Matrix::zeros(nu, nx);
    px.rows_mut(0, nc).copy_from(&(-&w1x));
    lu.q().inv_permute_rows(&mut px);

    let mut proj_e = Vector::zeros(nu);
    proj_e.rows_mut(0, nc).copy_from(&(-&w1e));
    lu.q().inv_permute_rows(&mut proj_e);

    let mut pu = Matrix::zeros(nu, nu - nc);
    pu.rows_mut(0, nc).copy_from(&(-&w1u));
    for i in 0..(nu - nc) {
        pu[(nc + i, i)] = 1.0;
    }
    lu.q().inv_permute_rows(&mut pu);

    Ok(VectorFunctionLinearApproximation { dfdx: px, dfdu: pu, f: proj_e })
}

/// Substitute `du = Pu * u_tilde + Px * dx + Pe` into a discretized
/// dynamics step, leaving it a function of `(dx, u_tilde)`.
pub fn change_of_input_variables_dynamics(
    dynamics: &mut VectorFunctionLinearApproximation,
    projection: &VectorFunctionLinearApproximation,
) {
    dynamics.f += &dynamics.dfdu * &projection.f;
    dynamics.dfdx += &dynamics.dfdu * &projection.dfdx;
    dynamics.dfdu = &dynamics.dfdu * &projection.dfdu;
}

/// Substitute `du = Pu * u_tilde + Px * dx + Pe` into a quadratic cost,
/// leaving it a function of `(dx, u_tilde)`.
pub fn change_of_input_variables_cost(
    cost: &mut ScalarFunctionQuadraticApproximation,
    projection: &VectorFunctionLinearApproximation,
) {
    let px = &projection.dfdx;
    let pu = &projection.dfdu;
    let pe = &projection.f;

    let huu_pe = &cost.dfduu * pe;
    let hux_plus_huu_px = &cost.dfdux + &cost.dfduu * px;

    cost.f += cost.dfdu.dot(pe) + 0.5 * pe.dot(&huu_pe);
    cost.dfdx += px.transpose() * &cost.dfdu
        + cost.dfdux.transpose() * pe
        + px.transpose() * &huu_pe;
    cost.dfdxx += px.transpose() * &cost.dfdux
        + cost.dfdux.transpose() * px
        + px.transpose() * &cost.dfduu * px;

    cost.dfdu = pu.transpose() * (&cost.dfdu + huu_pe);
    cost.dfdux = pu.transpose() * hux_plus_huu_px;
    cost.dfduu = pu.transpose() * &cost.dfduu * pu;
}
