//! Optimal-control data model.
//!
//! This crate holds the problem-side contracts consumed by the solvers:
//! local function approximations, dynamics/cost/constraint traits together
//! with simple linear-quadratic implementations, the relaxed-barrier
//! penalty, and the solution-side policy types (`PrimalSolution`,
//! `FeedforwardController`, `PerformanceIndex`).

pub mod approximations;
pub mod constraint;
pub mod cost;
pub mod dynamics;
pub mod interpolation;
pub mod operating;
pub mod penalty;
pub mod performance;
pub mod policy;

/// Dynamically sized state/input vector. Problem dimensions are runtime
/// configuration, so everything is heap allocated.
pub type Vector = nalgebra::DVector<f64>;
/// Dynamically sized matrix.
pub type Matrix = nalgebra::DMatrix<f64>;

pub use approximations::{
    ScalarFunctionQuadraticApproximation, VectorFunctionLinearApproximation,
    VectorFunctionQuadraticApproximation,
};
pub use constraint::{AffineInequalityConstraint, ConstraintFunction, LinearStateInputConstraint};
pub use cost::{CostFunction, QuadraticCost, QuadraticTerminalCost, TerminalCostFunction};
pub use dynamics::{LinearSystemDynamics, SystemDynamics};
pub use operating::{FixedOperatingPoint, OperatingTrajectoryProvider};
pub use penalty::RelaxedBarrierPenalty;
pub use performance::PerformanceIndex;
pub use policy::{FeedforwardController, ModeSchedule, PrimalSolution};
