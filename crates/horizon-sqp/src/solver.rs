//! SQP solve loop over a multiple-shooting discretization.

use horizon_ocp::{
    ConstraintFunction, CostFunction, FeedforwardController, ModeSchedule,
    OperatingTrajectoryProvider, PerformanceIndex, PrimalSolution, RelaxedBarrierPenalty,
    SystemDynamics, TerminalCostFunction, Vector,
};
use tracing::info;

use crate::config::Settings;
use crate::error::SolverError;
use crate::grid::time_discretization_with_events;
use crate::initialization::{initialize_input_trajectory, initialize_state_trajectory};
use crate::qp::{ClarabelQpSolver, StructuredQpSolver};
use crate::timing::BenchmarkTimer;
use crate::transcription::{setup_lq_problem, LqProblem, TranscriptionProblem};

/// Sample placed just after each event so integration restarts on the far
/// side of the switch.
const EVENT_DELTA: f64 = 1e-8;

/// Where the solver is in its lifecycle. `ExhaustedIterations` is a valid
/// terminal state: the best iterate so far is still returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStage {
    Idle,
    Building,
    Solving,
    Stepping,
    Converged,
    ExhaustedIterations,
}

/// Multiple-shooting SQP solver.
///
/// Each call to [`run`](SqpSolver::run) discretizes the horizon, warm
/// starts from the previous solution, and iterates
/// transcribe-solve-step until the update norms fall under the tolerance
/// or the iteration cap is hit.
pub struct SqpSolver {
    settings: Settings,
    dynamics: Box<dyn SystemDynamics>,
    cost: Box<dyn CostFunction>,
    terminal_cost: Option<Box<dyn TerminalCostFunction>>,
    constraints: Option<Box<dyn ConstraintFunction>>,
    operating_trajectory: Option<Box<dyn OperatingTrajectoryProvider>>,
    penalty: Option<RelaxedBarrierPenalty>,
    qp_solver: Box<dyn StructuredQpSolver>,
    mode_schedule: ModeSchedule,

    primal_solution: PrimalSolution,
    iteration_performance: Vec<PerformanceIndex>,
    total_num_iterations: usize,
    stage: SolverStage,
    lq: LqProblem,

    linear_quadratic_approximation_timer: BenchmarkTimer,
    solve_qp_timer: BenchmarkTimer,
    compute_controller_timer: BenchmarkTimer,
}

impl SqpSolver {
    /// Solve over `[init_time, final_time]` starting from `init_state`.
    ///
    /// Not converging within the iteration cap is not an error; check
    /// [`stage`](SqpSolver::stage) to distinguish the two outcomes.
    pub fn run(
        &mut self,
        init_time: f64,
        init_state: &Vector,
        final_time: f64,
    ) -> Result<PrimalSolution, SolverError> {
        if self.settings.print_solver_status {
            info!(init_time, final_time, "SQP solver starting");
        }

        let time = time_discretization_with_events(
            init_time,
            final_time,
            self.settings.dt,
            &self.mode_schedule.event_times,
            EVENT_DELTA,
        )?;

        let mut states =
            initialize_state_trajectory(init_state, &time, &self.primal_solution);
        let mut inputs = initialize_input_trajectory(
            &time,
            &states,
            &self.primal_solution,
            self.operating_trajectory.as_deref(),
            self.settings.n_input,
        );

        self.iteration_performance.clear();
        let mut converged = false;

        for iteration in 0..self.settings.sqp_iteration {
            self.stage = SolverStage::Building;
            self.linear_quadratic_approximation_timer.start_timer();
            let problem = TranscriptionProblem {
                dynamics: self.dynamics.as_ref(),
                cost: self.cost.as_ref(),
                terminal_cost: self.terminal_cost.as_deref(),
                constraints: self.constraints.as_deref(),
                penalty: self.penalty.as_ref(),
                project_equalities: self
                    .settings
                    .project_state_input_equality_constraints,
            };
            let performance =
                setup_lq_problem(&problem, &time, &states, &inputs, &mut self.lq)?;
            self.linear_quadratic_approximation_timer.end_timer();
            self.iteration_performance.push(performance);

            self.stage = SolverStage::Solving;
            self.solve_qp_timer.start_timer();
            let (delta_x, delta_u) = self.solve_subproblem(init_state, &states)?;
            self.solve_qp_timer.end_timer();

            self.stage = SolverStage::Stepping;
            let (delta_x_norm, delta_u_norm) =
                take_step(&mut states, &mut inputs, &delta_x, &delta_u);
            self.total_num_iterations += 1;

            if self.settings.print_solver_status {
                info!(
                    iteration,
                    delta_x_norm,
                    delta_u_norm,
                    merit = performance.merit,
                    cost = performance.total_cost,
                    "SQP iteration"
                );
            }

            if delta_x_norm < self.settings.delta_tol
                && delta_u_norm < self.settings.delta_tol
            {
                converged = true;
                break;
            }
        }

        self.stage = if converged {
            SolverStage::Converged
        } else {
            SolverStage::ExhaustedIterations
        };
        if self.settings.print_solver_status {
            info!(stage = ?self.stage, "SQP solver finished");
        }

        self.compute_controller_timer.start_timer();
        self.primal_solution = assemble_primal_solution(
            time,
            states,
            inputs,
            self.mode_schedule.clone(),
        );
        self.compute_controller_timer.end_timer();

        Ok(self.primal_solution.clone())
    }

    /// Solve the transcribed subproblem and map reduced input updates back
    /// through the stored projections.
    fn solve_subproblem(
        &mut self,
        init_state: &Vector,
        states: &[Vector],
    ) -> Result<(Vec<Vector>, Vec<Vector>), SolverError> {
        let delta_x0 = init_state - &states[0];

        self.qp_solver.resize(&self.lq.size);
        let pass_constraints = self.lq.size.ng.iter().any(|&ng| ng > 0);
        let (delta_x, mut delta_u) = self.qp_solver.solve(
            &delta_x0,
            &self.lq.dynamics,
            &self.lq.cost,
            pass_constraints.then_some(self.lq.constraints.as_slice()),
        )?;

        // du = Pu * u_tilde + Px * dx + Pe on projected stages
        for (i, projection) in self.lq.projections.iter().enumerate() {
            if let Some(projection) = projection {
                delta_u[i] = &projection.dfdu * &delta_u[i]
                    + &projection.dfdx * &delta_x[i]
                    + &projection.f;
            }
        }
        Ok((delta_x, delta_u))
    }

    /// Current lifecycle stage.
    pub fn stage(&self) -> SolverStage {
        self.stage
    }

    /// Performance index per iteration of the last run.
    pub fn performance_indices(&self) -> &[PerformanceIndex] {
        &self.iteration_performance
    }

    /// Solution of the last run.
    pub fn primal_solution(&self) -> &PrimalSolution {
        &self.primal_solution
    }

    /// Iterations accumulated over all runs since the last reset.
    pub fn total_num_iterations(&self) -> usize {
        self.total_num_iterations
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the mode schedule used for future runs.
    pub fn set_mode_schedule(&mut self, mode_schedule: ModeSchedule) {
        self.mode_schedule = mode_schedule;
    }

    /// Forget the stored solution, iteration counters and timers.
    pub fn reset(&mut self) {
        self.primal_solution = PrimalSolution::default();
        self.iteration_performance.clear();
        self.total_num_iterations = 0;
        self.stage = SolverStage::Idle;
        self.linear_quadratic_approximation_timer.reset();
        self.solve_qp_timer.reset();
        self.compute_controller_timer.reset();
    }

    /// Human-readable summary of the phase timers, averaged over all
    /// iterations since the last reset.
    pub fn benchmarking_information(&self) -> String {
        let lq = self.linear_quadratic_approximation_timer.average_ms();
        let qp = self.solve_qp_timer.average_ms();
        let controller = self.compute_controller_timer.average_ms();
        let total = (lq + qp + controller).max(f64::MIN_POSITIVE);

        format!(
            "The benchmarking is computed over {} iterations.\n\
             SQP benchmarking           : average time [ms] (% of total runtime)\n\
             \tLQ approximation   : {:.4} [ms] ({:.0}%)\n\
             \tSolve QP           : {:.4} [ms] ({:.0}%)\n\
             \tCompute controller : {:.4} [ms] ({:.0}%)",
            self.total_num_iterations,
            lq,
            lq / total * 100.0,
            qp,
            qp / total * 100.0,
            controller,
            controller / total * 100.0,
        )
    }
}

impl Drop for SqpSolver {
    fn drop(&mut self) {
        if self.settings.print_solver_statistics && self.total_num_iterations > 0 {
            info!("{}", self.benchmarking_information());
        }
    }
}

/// Apply the full update step and report the summed update norms.
// TODO: line search on the merit function instead of a fixed unit step.
fn take_step(
    states: &mut [Vector],
    inputs: &mut [Vector],
    delta_x: &[Vector],
    delta_u: &[Vector],
) -> (f64, f64) {
    let alpha = 1.0;
    let mut delta_x_norm = 0.0;
    for (x, dx) in states.iter_mut().zip(delta_x) {
        delta_x_norm += dx.norm();
        *x += alpha * dx;
    }
    let mut delta_u_norm = 0.0;
    for (u, du) in inputs.iter_mut().zip(delta_u) {
        delta_u_norm += du.norm();
        *u += alpha * du;
    }
    (delta_x_norm, delta_u_norm)
}

/// Pack the iterate into a primal solution. The input sequence has one
/// entry per interval, so the last input is repeated to align it with the
/// state and time trajectories.
fn assemble_primal_solution(
    time: Vec<f64>,
    states: Vec<Vector>,
    mut inputs: Vec<Vector>,
    mode_schedule: ModeSchedule,
) -> PrimalSolution {
    if let Some(last) = inputs.last().cloned() {
        inputs.push(last);
    }
    let controller = FeedforwardController::new(time.clone(), inputs.clone());
    PrimalSolution {
        time_trajectory: time,
        state_trajectory: states,
        input_trajectory: inputs,
        mode_schedule,
        controller,
    }
}

/// Builder for [`SqpSolver`]. Dynamics and cost are mandatory; everything
/// else defaults to absent (and the QP backend to Clarabel).
pub struct SqpSolverBuilder {
    settings: Settings,
    dynamics: Box<dyn SystemDynamics>,
    cost: Box<dyn CostFunction>,
    terminal_cost: Option<Box<dyn TerminalCostFunction>>,
    constraints: Option<Box<dyn ConstraintFunction>>,
    operating_trajectory: Option<Box<dyn OperatingTrajectoryProvider>>,
    qp_solver: Option<Box<dyn StructuredQpSolver>>,
    mode_schedule: ModeSchedule,
}

impl SqpSolverBuilder {
    pub fn new(
        settings: Settings,
        dynamics: Box<dyn SystemDynamics>,
        cost: Box<dyn CostFunction>,
    ) -> Self {
        Self {
            settings,
            dynamics,
            cost,
            terminal_cost: None,
            constraints: None,
            operating_trajectory: None,
            qp_solver: None,
            mode_schedule: ModeSchedule::default(),
        }
    }

    pub fn terminal_cost(mut self, terminal_cost: Box<dyn TerminalCostFunction>) -> Self {
        self.terminal_cost = Some(terminal_cost);
        self
    }

    pub fn constraints(mut self, constraints: Box<dyn ConstraintFunction>) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn operating_trajectory(
        mut self,
        operating_trajectory: Box<dyn OperatingTrajectoryProvider>,
    ) -> Self {
        self.operating_trajectory = Some(operating_trajectory);
        self
    }

    pub fn qp_solver(mut self, qp_solver: Box<dyn StructuredQpSolver>) -> Self {
        self.qp_solver = Some(qp_solver);
        self
    }

    pub fn mode_schedule(mut self, mode_schedule: ModeSchedule) -> Self {
        self.mode_schedule = mode_schedule;
        self
    }

    pub fn build(self) -> SqpSolver {
        let penalty = (self.settings.inequality_constraint_mu > 0.0).then(|| {
            RelaxedBarrierPenalty::new(
                self.settings.inequality_constraint_mu,
                self.settings.inequality_constraint_delta,
            )
        });
        SqpSolver {
            settings: self.settings,
            dynamics: self.dynamics,
            cost: self.cost,
            terminal_cost: self.terminal_cost,
            constraints: self.constraints,
            operating_trajectory: self.operating_trajectory,
            penalty,
            qp_solver: self
                .qp_solver
                .unwrap_or_else(|| Box::new(ClarabelQpSolver::new())),
            mode_schedule: self.mode_schedule,
            primal_solution: PrimalSolution::default(),
            iteration_performance: Vec::new(),
            total_num_iterations: 0,
            stage: SolverStage::Idle,
            lq: LqProblem::default(),
            linear_quadratic_approximation_timer: BenchmarkTimer::new(),
            solve_qp_timer: BenchmarkTimer::new(),
            compute_controller_timer: BenchmarkTimer::new(),
        }
    }
}
