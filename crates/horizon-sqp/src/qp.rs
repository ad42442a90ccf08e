//! Structured QP backend.
//!
//! The LQ subproblem is solved over the stacked decision vector
//! `z = [dx_1, ..., dx_N, du_0, ..., du_{N-1}]`. The initial state update
//! `dx_0` is known, so it is folded into the right-hand sides and the
//! stage-0 gradient instead of appearing as a variable. Dynamics gaps and
//! any explicit equality constraint rows live in the zero cone.

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT::ZeroConeT,
};
use horizon_ocp::{
    Matrix, ScalarFunctionQuadraticApproximation, Vector, VectorFunctionLinearApproximation,
};

use crate::error::QpError;
use crate::transcription::OcpSize;

/// Solver for the equality-constrained LQ subproblem of one SQP iteration.
pub trait StructuredQpSolver: Send {
    /// Announce the dimensions of the next subproblem.
    fn resize(&mut self, size: &OcpSize);

    /// Solve for the state and input updates.
    ///
    /// `dynamics[k]` maps `(dx_k, du_k)` to the predicted `dx_{k+1}` with
    /// gap `f`; `cost` carries one stage expansion per interval plus the
    /// terminal one. `constraints`, when given, holds explicit equality
    /// rows per stage (`C dx + D du + e = 0`).
    ///
    /// Returns `num_stages + 1` state updates (the first equals
    /// `delta_x0`) and `num_stages` input updates in the per-stage input
    /// dimension.
    fn solve(
        &mut self,
        delta_x0: &Vector,
        dynamics: &[VectorFunctionLinearApproximation],
        cost: &[ScalarFunctionQuadraticApproximation],
        constraints: Option<&[Option<VectorFunctionLinearApproximation>]>,
    ) -> Result<(Vec<Vector>, Vec<Vector>), QpError>;
}

/// Interior-point backend built on Clarabel.
#[derive(Debug)]
pub struct ClarabelQpSolver {
    size: OcpSize,
    max_iter: u32,
}

impl ClarabelQpSolver {
    pub fn new() -> Self {
        Self { size: OcpSize::default(), max_iter: 200 }
    }
}

impl Default for ClarabelQpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuredQpSolver for ClarabelQpSolver {
    fn resize(&mut self, size: &OcpSize) {
        self.size = size.clone();
    }

    fn solve(
        &mut self,
        delta_x0: &Vector,
        dynamics: &[VectorFunctionLinearApproximation],
        cost: &[ScalarFunctionQuadraticApproximation],
        constraints: Option<&[Option<VectorFunctionLinearApproximation>]>,
    ) -> Result<(Vec<Vector>, Vec<Vector>), QpError> {
        let n = self.size.num_stages;
        let nx = self.size.nx;

        // variable layout
        let n_x_vars = n * nx;
        let mut u_offset = Vec::with_capacity(n);
        let mut n_z = n_x_vars;
        for i in 0..n {
            u_offset.push(n_z);
            n_z += self.size.nu[i];
        }
        let x_offset = |k: usize| (k - 1) * nx; // valid for k >= 1

        // quadratic cost: 0.5 z' P z + q' z
        let mut p = Matrix::zeros(n_z, n_z);
        let mut q = Vector::zeros(n_z);

        for i in 0..n {
            let nu_i = self.size.nu[i];
            let stage = &cost[i];
            p.view_mut((u_offset[i], u_offset[i]), (nu_i, nu_i))
                .copy_from(&stage.dfduu);
            if i == 0 {
                // dx_0 is data: its coupling moves into the gradient
                q.rows_mut(u_offset[i], nu_i)
                    .copy_from(&(&stage.dfdu + &stage.dfdux * delta_x0));
            } else {
                p.view_mut((u_offset[i], x_offset(i)), (nu_i, nx))
                    .copy_from(&stage.dfdux);
                p.view_mut((x_offset(i), u_offset[i]), (nx, nu_i))
                    .copy_from(&stage.dfdux.transpose());
                p.view_mut((x_offset(i), x_offset(i)), (nx, nx))
                    .copy_from(&stage.dfdxx);
                q.rows_mut(u_offset[i], nu_i).copy_from(&stage.dfdu);
                q.rows_mut(x_offset(i), nx).copy_from(&stage.dfdx);
            }
        }
        // dx_N appears only in the terminal expansion
        let terminal = &cost[n];
        p.view_mut((x_offset(n), x_offset(n)), (nx, nx)).copy_from(&terminal.dfdxx);
        q.rows_mut(x_offset(n), nx).copy_from(&terminal.dfdx);

        // equality rows: dynamics gaps first, then explicit constraints
        let n_gen: usize = self.size.ng.iter().sum();
        let n_eq = n * nx + n_gen;
        let mut a = Matrix::zeros(n_eq, n_z);
        let mut b = Vector::zeros(n_eq);

        let mut row = 0;
        for (k, step) in dynamics.iter().enumerate().take(n) {
            let nu_k = self.size.nu[k];
            // A_k dx_k + B_k du_k - dx_{k+1} = -f_k
            a.view_mut((row, x_offset(k + 1)), (nx, nx))
                .copy_from(&(-Matrix::identity(nx, nx)));
            a.view_mut((row, u_offset[k]), (nx, nu_k)).copy_from(&step.dfdu);
            if k == 0 {
                b.rows_mut(row, nx)
                    .copy_from(&(-&step.f - &step.dfdx * delta_x0));
            } else {
                a.view_mut((row, x_offset(k)), (nx, nx)).copy_from(&step.dfdx);
                b.rows_mut(row, nx).copy_from(&(-&step.f));
            }
            row += nx;
        }
        if let Some(constraints) = constraints {
            for (i, stage) in constraints.iter().enumerate().take(n) {
                let Some(g) = stage else { continue };
                let ng_i = self.size.ng[i];
                a.view_mut((row, u_offset[i]), (ng_i, self.size.nu[i]))
                    .copy_from(&g.dfdu);
                if i == 0 {
                    b.rows_mut(row, ng_i)
                        .copy_from(&(-&g.f - &g.dfdx * delta_x0));
                } else {
                    a.view_mut((row, x_offset(i)), (ng_i, nx)).copy_from(&g.dfdx);
                    b.rows_mut(row, ng_i).copy_from(&(-&g.f));
                }
                row += ng_i;
            }
        }
        debug_assert_eq!(row, n_eq);

        // hand off to Clarabel
        let p_csc = dmatrix_to_csc_upper_tri(&p);
        let a_csc = dmatrix_to_csc(&a);
        let q_slice: Vec<f64> = q.iter().copied().collect();
        let b_slice: Vec<f64> = b.iter().copied().collect();
        let cones = vec![ZeroConeT(n_eq)];

        let settings = DefaultSettingsBuilder::default()
            .max_iter(self.max_iter)
            .verbose(false)
            .build()
            .map_err(|e| QpError::SolverFailure(e.to_string()))?;

        let mut solver =
            DefaultSolver::new(&p_csc, &q_slice, &a_csc, &b_slice, &cones, settings)
                .map_err(|e| QpError::SolverFailure(format!("{e:?}")))?;
        solver.solve();

        match solver.solution.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {}
            SolverStatus::PrimalInfeasible
            | SolverStatus::DualInfeasible
            | SolverStatus::AlmostPrimalInfeasible
            | SolverStatus::AlmostDualInfeasible => return Err(QpError::Infeasible),
            status => {
                return Err(QpError::SolverFailure(format!(
                    "unexpected status {status:?}"
                )))
            }
        }

        let sol = &solver.solution.x;
        let mut delta_x = Vec::with_capacity(n + 1);
        delta_x.push(delta_x0.clone());
        for k in 1..=n {
            delta_x.push(Vector::from_iterator(
                nx,
                sol[x_offset(k)..x_offset(k) + nx].iter().copied(),
            ));
        }
        let mut delta_u = Vec::with_capacity(n);
        for i in 0..n {
            let nu_i = self.size.nu[i];
            delta_u.push(Vector::from_iterator(
                nu_i,
                sol[u_offset[i]..u_offset[i] + nu_i].iter().copied(),
            ));
        }
        Ok((delta_x, delta_u))
    }
}

/// Convert a dense matrix to Clarabel's sparse column format.
fn dmatrix_to_csc(m: &Matrix) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for j in 0..ncols {
        for i in 0..nrows {
            let v = m[(i, j)];
            if v.abs() > 1e-15 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }
    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

/// Convert a symmetric dense matrix to sparse upper-triangular form.
fn dmatrix_to_csc_upper_tri(m: &Matrix) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for j in 0..ncols {
        for i in 0..=j.min(nrows.saturating_sub(1)) {
            let v = m[(i, j)];
            if v.abs() > 1e-15 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }
    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}
