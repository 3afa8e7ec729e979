//! The solver orchestrator: writes the equation system for one group,
//! marks the dragged parameters, runs the numeric kernel, classifies the
//! outcome, writes results back into the sketch store, and on failure
//! searches for the offending constraints.

use thiserror::Error;
use tracing::debug;

use trammel_expr::ExprArena;
use trammel_types::{ConstraintKind, HConstraint, HGroup, HParam, Param, Sketch};

use crate::diagnose::find_bad_constraints;
use crate::eqgen::{generate_constraint_params, generate_equations, modify_to_satisfy};
use crate::geometry::generate_entity_equations;
use crate::system::System;

#[derive(Debug, Clone, Copy, Default)]
pub struct SolveOptions {
    /// Run the diagnostic search on failure and return the bad-constraint
    /// list. Costs about one rank test per constraint.
    pub calculate_faileds: bool,
    /// After a successful solve, identify which parameters remain free and
    /// mark them in the store. O(n) rank tests.
    pub find_free: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Okay,
    Inconsistent,
    DidntConverge,
    TooManyUnknowns,
    /// More equations than independent ones, but the set is self-consistent
    /// and solved fine.
    RedundantOkay,
    /// Rank-deficient and Newton failed: some subset of the constraints is
    /// unsatisfiable.
    RedundantDidntConverge,
}

impl SolveStatus {
    pub fn is_okay(self) -> bool {
        matches!(self, SolveStatus::Okay | SolveStatus::RedundantOkay)
    }
}

/// Failure half of a solve, for callers that want `Result` semantics over
/// the raw status.
#[derive(Debug, Clone, Error)]
pub enum SolveError {
    #[error("constraints are inconsistent ({} offending identified)", bad.len())]
    Inconsistent { bad: Vec<HConstraint> },
    #[error("did not converge within the iteration cap")]
    DidntConverge,
    #[error("system exceeds the solver's unknown capacity")]
    TooManyUnknowns,
}

#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Unconstrained degrees of freedom (n − rank).
    pub dof: i32,
    /// Constraints to remove to make the system solvable; filled only when
    /// requested and the solve failed.
    pub bad: Vec<HConstraint>,
    pub iterations: usize,
}

impl SolveOutcome {
    pub fn into_result(self) -> Result<Self, SolveError> {
        match self.status {
            SolveStatus::Okay | SolveStatus::RedundantOkay => Ok(self),
            SolveStatus::Inconsistent | SolveStatus::RedundantDidntConverge => {
                Err(SolveError::Inconsistent { bad: self.bad })
            }
            SolveStatus::DidntConverge => Err(SolveError::DidntConverge),
            SolveStatus::TooManyUnknowns => Err(SolveError::TooManyUnknowns),
        }
    }
}

/// Solve one group of the sketch. Parameters of other groups are treated as
/// known; solved values (or the best-effort final iterate, on failure) are
/// written back into the store, and reference dimensions are re-valued
/// either way.
pub fn solve(
    sk: &mut Sketch,
    group: HGroup,
    dragged: &[HParam],
    opts: SolveOptions,
) -> SolveOutcome {
    // Transient solver state from the previous solve must not leak in.
    for p in sk.param.iter_mut() {
        if p.group == group {
            p.known = false;
            p.free = false;
            p.substd = HParam::NONE;
        }
    }

    let group_constraints: Vec<HConstraint> = sk
        .constraint
        .iter()
        .filter(|c| c.group == group)
        .map(|c| c.h)
        .collect();

    // The generate step: auxiliary params for the constraint kinds that
    // need one, before the working list is gathered.
    for &hc in &group_constraints {
        generate_constraint_params(sk, hc);
    }

    let working: Vec<Param> = sk
        .param
        .iter()
        .filter(|p| p.group == group)
        .copied()
        .collect();

    // Equation ordering is part of the contract: entity rows first, then
    // constraint rows, both in creation order, so chain-like sketches stay
    // banded.
    let mut ar = ExprArena::new();
    let mut sys = System::new(working, dragged.to_vec());
    for e in sk.entity.iter() {
        if e.group == group {
            generate_entity_equations(sk, &mut ar, e, &mut sys.eqs);
        }
    }
    for &hc in &group_constraints {
        let c = sk.get_constraint(hc);
        generate_equations(sk, &mut ar, c, &mut sys.eqs, false);
    }
    debug!(
        group = group.0,
        params = sys.params.len(),
        equations = sys.eqs.len(),
        "solving group"
    );

    let r = sys.run(sk, &mut ar, opts.find_free);

    // Best-effort write-back even when the solve failed, so the sketch can
    // be drawn at the last iterate.
    for p in &sys.params {
        let stored = sk.get_param_mut(p.h);
        stored.val = p.val;
        stored.known = p.known;
        stored.free = p.free;
        stored.substd = p.substd;
    }

    let status = if r.too_many_unknowns {
        SolveStatus::TooManyUnknowns
    } else if r.converged {
        if r.rank < r.m {
            SolveStatus::RedundantOkay
        } else {
            SolveStatus::Okay
        }
    } else if r.rank < r.m {
        SolveStatus::RedundantDidntConverge
    } else {
        SolveStatus::DidntConverge
    };

    let bad = if opts.calculate_faileds && !status.is_okay() && status != SolveStatus::TooManyUnknowns
    {
        let newest_first: Vec<HConstraint> =
            group_constraints.iter().rev().copied().collect();
        find_bad_constraints(&r.jacobian, &r.row_owners, &newest_first)
    } else {
        Vec::new()
    };

    // Reference dimensions report whatever the geometry now measures,
    // regardless of how the solve went.
    for &hc in &group_constraints {
        let c = sk.get_constraint(hc);
        if c.reference && c.kind != ConstraintKind::Comment {
            modify_to_satisfy(sk, hc);
        }
    }

    let dof = (r.n as i64 - r.rank as i64).max(0) as i32;
    debug!(?status, dof, iterations = r.iterations, "solve finished");

    SolveOutcome {
        status,
        dof,
        bad,
        iterations: r.iterations,
    }
}
