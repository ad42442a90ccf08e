//! Linear-quadratic transcription of the nonlinear problem around the
//! current iterate.
//!
//! Each shooting interval contributes a discretized dynamics step, a
//! quadratic cost expansion (with the inequality penalty folded in) and
//! either a projected-away or an explicit equality constraint block. The
//! stage cost is scaled by the interval length last, a forward-Euler
//! quadrature of the continuous cost rate.

use horizon_ocp::{
    ConstraintFunction, CostFunction, PerformanceIndex, RelaxedBarrierPenalty,
    ScalarFunctionQuadraticApproximation, SystemDynamics, TerminalCostFunction, Vector,
    VectorFunctionLinearApproximation,
};

use crate::discretization::rk4_sensitivity_discretization;
use crate::error::SolverError;
use crate::projection::{
    change_of_input_variables_cost, change_of_input_variables_dynamics,
    lu_constraint_projection,
};

/// Dimensions of the transcribed problem: `num_stages` shooting intervals,
/// a fixed state dimension and per-stage input and general-constraint
/// dimensions (projection shrinks the former and zeroes the latter).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcpSize {
    pub num_stages: usize,
    pub nx: usize,
    pub nu: Vec<usize>,
    pub ng: Vec<usize>,
}

/// The linear-quadratic subproblem handed to the QP backend.
///
/// `cost` has one more entry than the others: the terminal expansion.
/// `projections[i]` is `Some` only for stages whose equality constraints
/// were eliminated; it is needed afterwards to recover the full input
/// update from the reduced one.
#[derive(Debug, Default)]
pub struct LqProblem {
    pub dynamics: Vec<VectorFunctionLinearApproximation>,
    pub cost: Vec<ScalarFunctionQuadraticApproximation>,
    pub constraints: Vec<Option<VectorFunctionLinearApproximation>>,
    pub projections: Vec<Option<VectorFunctionLinearApproximation>>,
    pub size: OcpSize,
}

/// Collaborators of one transcription pass.
pub struct TranscriptionProblem<'a> {
    pub dynamics: &'a dyn SystemDynamics,
    pub cost: &'a dyn CostFunction,
    pub terminal_cost: Option<&'a dyn TerminalCostFunction>,
    pub constraints: Option<&'a dyn ConstraintFunction>,
    pub penalty: Option<&'a RelaxedBarrierPenalty>,
    pub project_equalities: bool,
}

/// Build the LQ subproblem around the iterate `(time, states, inputs)`
/// and accumulate the performance index of the iterate.
pub fn setup_lq_problem(
    problem: &TranscriptionProblem<'_>,
    time: &[f64],
    states: &[Vector],
    inputs: &[Vector],
    lq: &mut LqProblem,
) -> Result<PerformanceIndex, SolverError> {
    let num_stages = time.len().saturating_sub(1);
    let nx = states.first().map_or(0, Vector::len);

    lq.dynamics.clear();
    lq.cost.clear();
    lq.constraints.clear();
    lq.projections.clear();
    lq.size = OcpSize {
        num_stages,
        nx,
        nu: Vec::with_capacity(num_stages),
        ng: Vec::with_capacity(num_stages),
    };

    let mut performance = PerformanceIndex::default();

    for i in 0..num_stages {
        let t = time[i];
        let dt = time[i + 1] - time[i];
        let (x, u) = (&states[i], &inputs[i]);
        let n_input = u.len();

        // dynamics step, turned into the multiple-shooting gap
        let mut dynamics = rk4_sensitivity_discretization(problem.dynamics, t, x, u, dt);
        dynamics.f -= &states[i + 1];
        performance.state_eq_constraint_ise += dt * dynamics.f.norm_squared();

        let mut cost = problem.cost.quadratic_approximation(t, x, u);
        performance.total_cost += dt * cost.f;

        // inequality constraints enter the cost through the penalty
        if let (Some(penalty), Some(constraints)) = (problem.penalty, problem.constraints)
        {
            if let Some(h) = constraints.inequality_quadratic_approximation(t, x, u) {
                performance.inequality_constraint_ise +=
                    dt * h.f.iter().map(|&v| v.min(0.0) * v.min(0.0)).sum::<f64>();
                let penalty_cost = penalty.cost_quadratic_approximation(&h);
                performance.inequality_constraint_penalty += dt * penalty_cost.f;
                cost += &penalty_cost;
            }
        }

        // equality constraints: eliminate by projection or hand to the QP
        let mut stage_constraint = None;
        let mut stage_projection = None;
        let mut nu_stage = n_input;
        let mut ng_stage = 0;

        if let Some(constraints) = problem.constraints {
            if let Some(g) = constraints.state_input_equality_linear_approximation(t, x, u)
            {
                let rows = g.f.len();
                if rows > 0 {
                    performance.state_input_eq_constraint_ise += dt * g.f.norm_squared();
                    if problem.project_equalities {
                        let projection = lu_constraint_projection(&g)?;
                        change_of_input_variables_dynamics(&mut dynamics, &projection);
                        change_of_input_variables_cost(&mut cost, &projection);
                        nu_stage = n_input - rows;
                        stage_projection = Some(projection);
                    } else {
                        ng_stage = rows;
                        stage_constraint = Some(g);
                    }
                }
            }
        }

        cost.scale(dt);

        lq.dynamics.push(dynamics);
        lq.cost.push(cost);
        lq.constraints.push(stage_constraint);
        lq.projections.push(stage_projection);
        lq.size.nu.push(nu_stage);
        lq.size.ng.push(ng_stage);
    }

    // terminal cost expansion, not quadrature scaled
    let terminal = match problem.terminal_cost {
        Some(terminal_cost) => {
            let t = time.last().copied().unwrap_or(0.0);
            let x = states.last().cloned().unwrap_or_else(|| Vector::zeros(nx));
            terminal_cost.quadratic_approximation(t, &x)
        }
        None => ScalarFunctionQuadraticApproximation::zeros(nx, 0),
    };
    performance.total_cost += terminal.f;
    lq.cost.push(terminal);

    performance.merit =
        performance.total_cost + performance.inequality_constraint_penalty;
    Ok(performance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use horizon_ocp::{
        LinearStateInputConstraint, LinearSystemDynamics, Matrix, QuadraticCost,
        QuadraticTerminalCost,
    };

    fn two_input_problem() -> (LinearSystemDynamics, QuadraticCost, LinearStateInputConstraint)
    {
        let dynamics = LinearSystemDynamics::new(
            Matrix::zeros(2, 2),
            Matrix::identity(2, 2),
        );
        let cost = QuadraticCost::new(
            Matrix::identity(2, 2),
            Matrix::identity(2, 2),
            Vector::zeros(2),
            Vector::zeros(2),
        );
        // u_0 - u_1 = 0
        let constraint = LinearStateInputConstraint::new(
            Vector::zeros(1),
            Matrix::zeros(1, 2),
            Matrix::from_row_slice(1, 2, &[1.0, -1.0]),
        );
        (dynamics, cost, constraint)
    }

    #[test]
    fn sizes_match_grid_and_projection() {
        let (dynamics, cost, constraint) = two_input_problem();
        let problem = TranscriptionProblem {
            dynamics: &dynamics,
            cost: &cost,
            terminal_cost: None,
            constraints: Some(&constraint),
            penalty: None,
            project_equalities: true,
        };

        let time = [0.0, 0.1, 0.2, 0.3];
        let states = vec![Vector::zeros(2); 4];
        let inputs = vec![Vector::from_vec(vec![1.0, 1.0]); 3];

        let mut lq = LqProblem::default();
        setup_lq_problem(&problem, &time, &states, &inputs, &mut lq).unwrap();

        assert_eq!(lq.size.num_stages, 3);
        assert_eq!(lq.size.nx, 2);
        assert_eq!(lq.size.nu, vec![1, 1, 1]); // one input eliminated
        assert_eq!(lq.size.ng, vec![0, 0, 0]);
        assert_eq!(lq.cost.len(), 4); // stages + terminal
        assert!(lq.projections.iter().all(Option::is_some));
        assert!(lq.constraints.iter().all(Option::is_none));
    }

    #[test]
    fn unprojected_constraints_are_passed_through() {
        let (dynamics, cost, constraint) = two_input_problem();
        let problem = TranscriptionProblem {
            dynamics: &dynamics,
            cost: &cost,
            terminal_cost: None,
            constraints: Some(&constraint),
            penalty: None,
            project_equalities: false,
        };

        let time = [0.0, 0.1, 0.2];
        let states = vec![Vector::zeros(2); 3];
        let inputs = vec![Vector::zeros(2); 2];

        let mut lq = LqProblem::default();
        setup_lq_problem(&problem, &time, &states, &inputs, &mut lq).unwrap();

        assert_eq!(lq.size.nu, vec![2, 2]);
        assert_eq!(lq.size.ng, vec![1, 1]);
        assert!(lq.constraints.iter().all(Option::is_some));
        assert!(lq.projections.iter().all(Option::is_none));
    }

    #[test]
    fn performance_index_tracks_cost_and_gaps() {
        let dynamics =
            LinearSystemDynamics::new(Matrix::zeros(1, 1), Matrix::identity(1, 1));
        let cost = QuadraticCost::new(
            Matrix::identity(1, 1),
            Matrix::identity(1, 1),
            Vector::zeros(1),
            Vector::zeros(1),
        );
        let terminal =
            QuadraticTerminalCost::new(Matrix::identity(1, 1), Vector::zeros(1));
        let problem = TranscriptionProblem {
            dynamics: &dynamics,
            cost: &cost,
            terminal_cost: Some(&terminal),
            constraints: None,
            penalty: None,
            project_equalities: true,
        };

        // stationary iterate at the origin: zero cost, zero gaps
        let time = [0.0, 0.5, 1.0];
        let states = vec![Vector::zeros(1); 3];
        let inputs = vec![Vector::zeros(1); 2];

        let mut lq = LqProblem::default();
        let pi = setup_lq_problem(&problem, &time, &states, &inputs, &mut lq).unwrap();

        assert_relative_eq!(pi.total_cost, 0.0);
        assert_relative_eq!(pi.state_eq_constraint_ise, 0.0);
        assert_relative_eq!(pi.merit, 0.0);

        // an iterate violating the shooting constraint shows up in the ISE
        let states = vec![
            Vector::zeros(1),
            Vector::from_vec(vec![1.0]),
            Vector::from_vec(vec![1.0]),
        ];
        let pi = setup_lq_problem(&problem, &time, &states, &inputs, &mut lq).unwrap();
        assert!(pi.state_eq_constraint_ise > 0.0);
        assert!(pi.total_cost > 0.0);
    }

    #[test]
    fn stage_cost_is_scaled_by_interval_length() {
        let dynamics =
            LinearSystemDynamics::new(Matrix::zeros(1, 1), Matrix::zeros(1, 1));
        let cost = QuadraticCost::new(
            Matrix::identity(1, 1) * 2.0,
            Matrix::zeros(1, 1),
            Vector::zeros(1),
            Vector::zeros(1),
        );
        let problem = TranscriptionProblem {
            dynamics: &dynamics,
            cost: &cost,
            terminal_cost: None,
            constraints: None,
            penalty: None,
            project_equalities: true,
        };

        let time = [0.0, 0.25];
        let states = vec![Vector::from_vec(vec![1.0]); 2];
        let inputs = vec![Vector::zeros(1)];

        let mut lq = LqProblem::default();
        setup_lq_problem(&problem, &time, &states, &inputs, &mut lq).unwrap();

        // Hxx = dt * Q
        assert_relative_eq!(lq.cost[0].dfdxx[(0, 0)], 0.25 * 2.0);
    }
}
