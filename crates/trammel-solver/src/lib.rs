//! The constraint solver core: translates entities and constraints into a
//! system of scalar equations over the sketch's parameters, then finds
//! parameter values satisfying them all, or diagnoses the system as
//! inconsistent, redundant, or non-convergent.

pub mod banded;
pub mod diagnose;
pub mod eqgen;
pub mod geometry;
pub mod solver;
pub mod system;

use trammel_expr::ExprRef;
use trammel_types::{HConstraint, HEquation};

pub use solver::{SolveError, SolveOptions, SolveOutcome, SolveStatus, solve};

/// One scalar equation `f(params) = 0`, generated fresh on each solve. The
/// handle is stable across solves for the same owner; `owner` is the
/// constraint whose removal would delete this row (none for the implicit
/// equations an entity carries).
#[derive(Debug, Clone, Copy)]
pub struct Equation {
    pub h: HEquation,
    pub e: ExprRef,
    pub owner: HConstraint,
}
