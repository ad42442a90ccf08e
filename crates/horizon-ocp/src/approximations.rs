//! Local approximations of vector- and scalar-valued functions of (x, u).
//!
//! These are the currency between the problem definition and the solvers:
//! dynamics and equality constraints are carried as first-order models,
//! costs and penalized inequalities as second-order models.

use std::ops::AddAssign;

use crate::{Matrix, Vector};

/// First-order model of a vector function `f(x, u)`:
/// `f + dfdx * dx + dfdu * du`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFunctionLinearApproximation {
    /// Derivative with respect to the state, one row per output.
    pub dfdx: Matrix,
    /// Derivative with respect to the input.
    pub dfdu: Matrix,
    /// Function value at the linearization point.
    pub f: Vector,
}

impl VectorFunctionLinearApproximation {
    /// All-zero approximation with `nv` outputs, `nx` states and `nu` inputs.
    pub fn zeros(nv: usize, nx: usize, nu: usize) -> Self {
        Self {
            dfdx: Matrix::zeros(nv, nx),
            dfdu: Matrix::zeros(nv, nu),
            f: Vector::zeros(nv),
        }
    }
}

/// Second-order model of a scalar function `f(x, u)`.
///
/// The mixed derivative `dfdux` is stored as d(df/du)/dx, i.e. an
/// `nu x nx` matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarFunctionQuadraticApproximation {
    /// Second derivative with respect to the state (`nx x nx`).
    pub dfdxx: Matrix,
    /// Mixed second derivative (`nu x nx`).
    pub dfdux: Matrix,
    /// Second derivative with respect to the input (`nu x nu`).
    pub dfduu: Matrix,
    /// First derivative with respect to the state.
    pub dfdx: Vector,
    /// First derivative with respect to the input.
    pub dfdu: Vector,
    /// Function value at the expansion point.
    pub f: f64,
}

impl ScalarFunctionQuadraticApproximation {
    /// All-zero approximation for `nx` states and `nu` inputs.
    pub fn zeros(nx: usize, nu: usize) -> Self {
        Self {
            dfdxx: Matrix::zeros(nx, nx),
            dfdux: Matrix::zeros(nu, nx),
            dfduu: Matrix::zeros(nu, nu),
            dfdx: Vector::zeros(nx),
            dfdu: Vector::zeros(nu),
            f: 0.0,
        }
    }

    /// Scale every term in place, e.g. by an integration step length.
    pub fn scale(&mut self, s: f64) {
        self.dfdxx *= s;
        self.dfdux *= s;
        self.dfduu *= s;
        self.dfdx *= s;
        self.dfdu *= s;
        self.f *= s;
    }
}

impl AddAssign<&ScalarFunctionQuadraticApproximation> for ScalarFunctionQuadraticApproximation {
    fn add_assign(&mut self, rhs: &ScalarFunctionQuadraticApproximation) {
        self.dfdxx += &rhs.dfdxx;
        self.dfdux += &rhs.dfdux;
        self.dfduu += &rhs.dfduu;
        self.dfdx += &rhs.dfdx;
        self.dfdu += &rhs.dfdu;
        self.f += rhs.f;
    }
}

/// Second-order model of a vector function, with one Hessian triple per
/// output row. Used for inequality constraints fed through a penalty.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFunctionQuadraticApproximation {
    /// Per-row state Hessians (`nx x nx` each).
    pub dfdxx: Vec<Matrix>,
    /// Per-row mixed Hessians (`nu x nx` each).
    pub dfdux: Vec<Matrix>,
    /// Per-row input Hessians (`nu x nu` each).
    pub dfduu: Vec<Matrix>,
    /// Derivative with respect to the state, one row per output.
    pub dfdx: Matrix,
    /// Derivative with respect to the input.
    pub dfdu: Matrix,
    /// Function value at the expansion point.
    pub f: Vector,
}

impl VectorFunctionQuadraticApproximation {
    /// All-zero approximation with `nv` outputs.
    pub fn zeros(nv: usize, nx: usize, nu: usize) -> Self {
        Self {
            dfdxx: vec![Matrix::zeros(nx, nx); nv],
            dfdux: vec![Matrix::zeros(nu, nx); nv],
            dfduu: vec![Matrix::zeros(nu, nu); nv],
            dfdx: Matrix::zeros(nv, nx),
            dfdu: Matrix::zeros(nv, nu),
            f: Vector::zeros(nv),
        }
    }
}
