//! The numeric kernel: trivial-equation substitution, pointer rewriting,
//! Jacobian assembly, rank testing, dragged-parameter pinning, and damped
//! Newton-Raphson iteration.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

use trammel_expr::{ExprArena, ExprRef, ParamBinding, ReferencedParams};
use trammel_types::{HConstraint, HParam, Param, Sketch};

use crate::Equation;
use crate::banded::BandedMatrix;

/// Capacity limit on the unknown count; beyond it the solve is refused.
pub const MAX_UNKNOWNS: usize = 1024;

/// A solve has converged when every residual is below this.
pub const CONVERGE_TOLERANCE: f64 = 1e-10;

/// Newton iteration cap.
pub const MAX_NEWTON_STEPS: usize = 50;

/// A pivot below this magnitude does not count toward the rank.
const RANK_MAG_TOLERANCE: f64 = 1e-4;

/// Smallest damping factor tried before a step is taken as-is.
const MIN_DAMPING: f64 = 1.0 / 1024.0;

/// Working state for one solve: the group's parameters (working copies),
/// the generated equations, and the user's dragged parameter handles.
#[derive(Debug, Default)]
pub struct System {
    /// Working copies of the group's params, sorted by handle.
    pub params: Vec<Param>,
    pub eqs: Vec<Equation>,
    pub dragged: Vec<HParam>,
}

/// What the kernel found out, handed back to the orchestrator for status
/// classification, write-back, and diagnosis.
#[derive(Debug)]
pub struct KernelResult {
    pub converged: bool,
    pub too_many_unknowns: bool,
    pub iterations: usize,
    /// Unknown count after substitution.
    pub n: usize,
    /// Real (non-pin) equation count after substitution.
    pub m: usize,
    /// Numeric rank of the real rows at the final point.
    pub rank: usize,
    /// Numeric Jacobian of the real rows at the final point, for the
    /// diagnostic search.
    pub jacobian: DMatrix<f64>,
    /// Owning constraint per real row (NONE for entity equations).
    pub row_owners: Vec<HConstraint>,
}

struct RewrittenEq {
    e: ExprRef,
    owner: HConstraint,
    /// Sparse Jacobian row: (slot, symbolic partial).
    partials: Vec<(usize, ExprRef)>,
}

impl System {
    pub fn new(params: Vec<Param>, dragged: Vec<HParam>) -> Self {
        debug_assert!(params.windows(2).all(|w| w[0].h < w[1].h));
        Self {
            params,
            eqs: Vec::new(),
            dragged,
        }
    }

    fn find_param(&self, h: HParam) -> Option<usize> {
        self.params.binary_search_by_key(&h, |p| p.h).ok()
    }

    fn is_dragged(&self, h: HParam) -> bool {
        self.dragged.contains(&h)
    }

    /// Follow substitution chains to the surviving representative.
    fn resolve_param(&self, h: HParam) -> HParam {
        let mut h = h;
        while let Some(i) = self.find_param(h) {
            if self.params[i].substd.is_some() {
                h = self.params[i].substd;
            } else {
                break;
            }
        }
        h
    }

    /// Phase A: scan for trivially linear equations and eliminate them.
    ///
    /// `a − b = 0` over two live params merges them (the union-find by
    /// repeated rewrite; a dragged param survives as the representative so
    /// its pin still lands on a live column). `p − c = 0` becomes an
    /// assignment marking `p` known. Identity rows produced along the way
    /// are dropped.
    pub fn solve_by_substitution(&mut self, ar: &mut ExprArena) {
        for eq in &mut self.eqs {
            eq.e = ar.fold_constants(eq.e);
        }

        let mut removed = vec![false; self.eqs.len()];
        let mut substitutions = 0usize;
        let mut assignments = 0usize;

        loop {
            let mut changed = false;

            // Param-equals-param rows merge two columns.
            for i in 0..self.eqs.len() {
                if removed[i] {
                    continue;
                }
                let Some((a, b)) = ar.as_param_difference(self.eqs[i].e) else {
                    continue;
                };
                if a == b {
                    removed[i] = true;
                    changed = true;
                    continue;
                }
                let (Some(ia), Some(ib)) = (self.find_param(a), self.find_param(b)) else {
                    continue;
                };
                if self.params[ia].known || self.params[ib].known {
                    continue;
                }

                let (keep, subst) = if self.is_dragged(b) && !self.is_dragged(a) {
                    (b, a)
                } else {
                    (a, b)
                };
                for (j, eq) in self.eqs.iter().enumerate() {
                    if !removed[j] && j != i {
                        ar.substitute(eq.e, subst, keep);
                    }
                }
                let is = self.find_param(subst).unwrap();
                self.params[is].substd = keep;
                removed[i] = true;
                substitutions += 1;
                changed = true;
            }

            // Rows left referencing a single live parameter become
            // assignments, when the equation is linear in it. Anything
            // nonlinear would need a branch choice and stays for Newton.
            for i in 0..self.eqs.len() {
                if removed[i] {
                    continue;
                }
                let folded = ar.fold_constants(self.eqs[i].e);
                self.eqs[i].e = folded;
                let ReferencedParams::Single(p) =
                    ar.referenced_params(folded, &|h| self.find_param(h).is_some())
                else {
                    continue;
                };
                let Some((ap, v)) = ar.as_param_assignment(folded) else {
                    continue;
                };
                debug_assert_eq!(ap, p);
                let Some(ip) = self.find_param(p) else {
                    continue;
                };
                if self.params[ip].known || self.params[ip].substd.is_some() {
                    continue;
                }
                self.params[ip].val = v;
                self.params[ip].known = true;
                removed[i] = true;
                assignments += 1;
                changed = true;
            }

            if !changed {
                break;
            }
        }

        let mut keep_iter = removed.into_iter();
        self.eqs.retain(|_| !keep_iter.next().unwrap());

        if substitutions + assignments > 0 {
            debug!(
                substitutions,
                assignments,
                remaining = self.eqs.len(),
                "substitution pass"
            );
        }
    }

    /// Phases A and B together: returns the kernel's findings, with solved
    /// values written into the working params.
    pub fn run(&mut self, sk: &Sketch, ar: &mut ExprArena, find_free: bool) -> KernelResult {
        self.solve_by_substitution(ar);

        // Unknowns are the params neither substituted away nor known.
        let unknowns: Vec<usize> = (0..self.params.len())
            .filter(|&i| !self.params[i].known && self.params[i].substd.is_none())
            .collect();
        let n = unknowns.len();
        let m = self.eqs.len();

        if n > MAX_UNKNOWNS {
            return KernelResult {
                converged: false,
                too_many_unknowns: true,
                iterations: 0,
                n,
                m,
                rank: 0,
                jacobian: DMatrix::zeros(0, 0),
                row_owners: Vec::new(),
            };
        }

        // Pointer rewriting: after this pass every leaf is a constant or a
        // slot in the working array, and each iteration evaluates without a
        // single table lookup.
        let slot_of_param: Vec<Option<u32>> = {
            let mut v = vec![None; self.params.len()];
            for (slot, &i) in unknowns.iter().enumerate() {
                v[i] = Some(slot as u32);
            }
            v
        };
        let resolve = |h: HParam| -> ParamBinding {
            match self.find_param(self.resolve_param(h)) {
                Some(i) => match slot_of_param[i] {
                    Some(slot) => ParamBinding::Slot(slot),
                    None => ParamBinding::Known(self.params[i].val),
                },
                // A param from another group is fixed for this solve.
                None => ParamBinding::Known(sk.param_value(h)),
            }
        };

        let slot_handles: Vec<HParam> = unknowns.iter().map(|&i| self.params[i].h).collect();
        let mut rewritten: Vec<RewrittenEq> = Vec::with_capacity(m);
        for eq in &self.eqs {
            let r = ar.rewrite_params(eq.e, &resolve);
            let e = ar.fold_constants(r);

            let sig = ar.params_used(e);
            let mut partials = Vec::new();
            for (slot, &h) in slot_handles.iter().enumerate() {
                if sig & (1u64 << (h.0 % 61)) == 0 {
                    continue;
                }
                let d = ar.partial_wrt(e, h);
                let d = ar.fold_constants(d);
                if ar.as_constant(d) == Some(0.0) {
                    continue;
                }
                partials.push((slot, d));
            }
            rewritten.push(RewrittenEq {
                e,
                owner: eq.owner,
                partials,
            });
        }

        let x0: DVector<f64> =
            DVector::from_iterator(n, unknowns.iter().map(|&i| self.params[i].val));

        // Admit a pin row per dragged param, each only if it is independent
        // of what is already there; dragging a fully constrained point must
        // not wedge the solve.
        let a0 = eval_jacobian(ar, &rewritten, n, &x0, &[]);
        let rank0 = matrix_rank(&a0);
        let pins = self.admit_pins(&slot_handles, &x0, &a0, rank0);
        debug!(m, n, rank0, pins = pins.len(), "system written");

        let (mut converged, mut x, mut iterations) =
            newton_solve(ar, &rewritten, n, &x0, &pins);
        if !converged && !pins.is_empty() {
            // The drag target may be unreachable; give the sketch a chance
            // to solve without it.
            debug!("retrying without dragged pins");
            (converged, x, iterations) = newton_solve(ar, &rewritten, n, &x0, &[]);
        }

        // Write the final iterate back (best effort even on failure), and
        // resolve substituted params from their representatives.
        for (slot, &i) in unknowns.iter().enumerate() {
            self.params[i].val = x[slot];
        }
        for i in 0..self.params.len() {
            if self.params[i].substd.is_some() {
                let rep = self.resolve_param(self.params[i].h);
                if let Some(ri) = self.find_param(rep) {
                    self.params[i].val = self.params[ri].val;
                }
            }
        }

        let jacobian = eval_jacobian(ar, &rewritten, n, &x, &[]);
        let rank = matrix_rank(&jacobian);

        if find_free && converged {
            self.mark_free_params(&unknowns, &jacobian, rank);
        }

        KernelResult {
            converged,
            too_many_unknowns: false,
            iterations,
            n,
            m,
            rank,
            jacobian,
            row_owners: rewritten.iter().map(|r| r.owner).collect(),
        }
    }

    /// One pin row per dragged param, admitted only when it raises the rank.
    fn admit_pins(
        &self,
        slot_handles: &[HParam],
        x0: &DVector<f64>,
        a0: &DMatrix<f64>,
        rank0: usize,
    ) -> Vec<(usize, f64)> {
        let n = slot_handles.len();
        let mut pins: Vec<(usize, f64)> = Vec::new();
        let mut rank = rank0;

        for &h in &self.dragged {
            if h.is_none() {
                continue;
            }
            let rep = self.resolve_param(h);
            let Some(slot) = slot_handles.iter().position(|&s| s == rep) else {
                continue;
            };
            if pins.iter().any(|&(s, _)| s == slot) {
                continue;
            }

            let mut stacked = DMatrix::zeros(a0.nrows() + pins.len() + 1, n);
            stacked.view_mut((0, 0), (a0.nrows(), n)).copy_from(a0);
            for (k, &(s, _)) in pins.iter().enumerate() {
                stacked[(a0.nrows() + k, s)] = 1.0;
            }
            stacked[(a0.nrows() + pins.len(), slot)] = 1.0;

            let new_rank = matrix_rank(&stacked);
            if new_rank > rank {
                rank = new_rank;
                pins.push((slot, x0[slot]));
                trace!(?h, slot, "dragged param pinned");
            } else {
                trace!(?h, slot, "dragged param already determined, not pinned");
            }
        }
        pins
    }

    /// For each unknown, pin it and re-test the rank; the ones whose pin
    /// raises the rank were not determined by the system.
    fn mark_free_params(&mut self, unknowns: &[usize], a: &DMatrix<f64>, rank: usize) {
        let n = unknowns.len();
        for (slot, &i) in unknowns.iter().enumerate() {
            let mut stacked = DMatrix::zeros(a.nrows() + 1, n);
            stacked.view_mut((0, 0), (a.nrows(), n)).copy_from(a);
            stacked[(a.nrows(), slot)] = 1.0;
            if matrix_rank(&stacked) > rank {
                self.params[i].free = true;
            }
        }
    }
}

// ── Numeric evaluation ──────────────────────────────────────────────────

fn eval_residuals(
    ar: &ExprArena,
    eqs: &[RewrittenEq],
    x: &DVector<f64>,
    pins: &[(usize, f64)],
) -> DVector<f64> {
    let slots = x.as_slice();
    let mut f = DVector::zeros(eqs.len() + pins.len());
    for (i, eq) in eqs.iter().enumerate() {
        f[i] = ar.eval_slots(eq.e, slots);
    }
    for (k, &(slot, target)) in pins.iter().enumerate() {
        f[eqs.len() + k] = slots[slot] - target;
    }
    f
}

/// Evaluate the Jacobian; entries outside each equation's recorded sparse
/// row are structurally zero (the Bloom signature already skipped them).
fn eval_jacobian(
    ar: &ExprArena,
    eqs: &[RewrittenEq],
    n: usize,
    x: &DVector<f64>,
    pins: &[(usize, f64)],
) -> DMatrix<f64> {
    let slots = x.as_slice();
    let mut j = DMatrix::zeros(eqs.len() + pins.len(), n);
    for (i, eq) in eqs.iter().enumerate() {
        for &(slot, d) in &eq.partials {
            j[(i, slot)] = ar.eval_slots(d, slots);
        }
    }
    for (k, &(slot, _)) in pins.iter().enumerate() {
        j[(eqs.len() + k, slot)] = 1.0;
    }
    j
}

// ── Newton-Raphson with damping ─────────────────────────────────────────

fn newton_solve(
    ar: &ExprArena,
    eqs: &[RewrittenEq],
    n: usize,
    x0: &DVector<f64>,
    pins: &[(usize, f64)],
) -> (bool, DVector<f64>, usize) {
    let mut x = x0.clone();

    for iter in 0..MAX_NEWTON_STEPS {
        let f = eval_residuals(ar, eqs, &x, pins);
        if f.iter().any(|v| !v.is_finite()) {
            return (false, x, iter);
        }
        let worst = f.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
        if worst < CONVERGE_TOLERANCE {
            trace!(iter, "converged");
            return (true, x, iter);
        }

        let j = eval_jacobian(ar, eqs, n, &x, pins);
        let rhs = -&f;
        let Some(dx) = solve_step(&j, &rhs) else {
            return (false, x, iter);
        };
        if dx.iter().any(|v| !v.is_finite()) {
            return (false, x, iter);
        }

        // Halve the step until the residual norm improves; a step that
        // never improves is taken at the smallest damping and left for the
        // iteration cap to judge.
        let norm0 = f.norm_squared();
        let mut alpha = 1.0;
        loop {
            let xt = &x + &dx * alpha;
            let ft = eval_residuals(ar, eqs, &xt, pins);
            let nt = ft.norm_squared();
            if (nt.is_finite() && nt < norm0) || alpha < MIN_DAMPING {
                x = xt;
                break;
            }
            alpha *= 0.5;
        }
        trace!(iter, worst, alpha, "newton step");
    }

    (false, x, MAX_NEWTON_STEPS)
}

/// Solve `J dx = rhs` for the Newton step. Square systems take the banded
/// path when the profile allows, else dense elimination; rectangular
/// systems go through the normal equations (least-squares for tall,
/// least-norm for wide); and a damped fallback covers the rank-deficient
/// leftovers.
fn solve_step(j: &DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
    let (m, n) = j.shape();

    if m == n {
        if let Some(banded) = BandedMatrix::from_square(j) {
            if let Some(x) = banded.solve(rhs) {
                return Some(x);
            }
        }
        if let Some(x) = solve_dense(j.clone(), rhs.clone()) {
            return Some(x);
        }
    } else if m > n {
        let jt = j.transpose();
        let a = &jt * j;
        let b = &jt * rhs;
        if let Some(x) = solve_dense(a, b) {
            return Some(x);
        }
    } else {
        let a = j * j.transpose();
        if let Some(z) = solve_dense(a, rhs.clone()) {
            return Some(j.transpose() * z);
        }
    }

    // Rank-deficient: damp the normal equations until they go through.
    let jt = j.transpose();
    let a0 = &jt * j;
    let b = &jt * rhs;
    let mut lambda = 1e-8;
    while lambda <= 1e2 {
        let mut a = a0.clone();
        for i in 0..n {
            a[(i, i)] += lambda;
        }
        if let Some(x) = solve_dense(a, b.clone()) {
            return Some(x);
        }
        lambda *= 10.0;
    }
    None
}

/// Gaussian elimination with partial pivoting on the augmented matrix.
/// `None` if singular.
fn solve_dense(mut a: DMatrix<f64>, mut b: DVector<f64>) -> Option<DVector<f64>> {
    let n = a.nrows();
    if a.ncols() != n {
        return None;
    }

    for col in 0..n {
        let mut max_val = a[(col, col)].abs();
        let mut max_row = col;
        for row in (col + 1)..n {
            let v = a[(row, col)].abs();
            if v > max_val {
                max_val = v;
                max_row = row;
            }
        }
        if max_val < 1e-15 {
            return None;
        }
        if max_row != col {
            a.swap_rows(col, max_row);
            b.swap_rows(col, max_row);
        }

        let pivot = a[(col, col)];
        for row in (col + 1)..n {
            let factor = a[(row, col)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                a[(row, j)] -= factor * a[(col, j)];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = DVector::zeros(n);
    for i in (0..n).rev() {
        let mut sum = b[i];
        for j in (i + 1)..n {
            sum -= a[(i, j)] * x[j];
        }
        let diag = a[(i, i)];
        if diag.abs() < 1e-15 {
            return None;
        }
        x[i] = sum / diag;
    }
    Some(x)
}

/// Numeric rank by row-echelon elimination with partial pivoting. A pivot
/// below the magnitude tolerance does not count; the angle constraint's
/// residual gain exists to keep its row above this threshold.
pub fn matrix_rank(a: &DMatrix<f64>) -> usize {
    let (m, n) = a.shape();
    if m == 0 || n == 0 {
        return 0;
    }
    let mut a = a.clone();
    let mut rank = 0;
    let mut row = 0;

    for col in 0..n {
        let mut max_val = 0.0f64;
        let mut max_row = row;
        for r in row..m {
            let v = a[(r, col)].abs();
            if v > max_val {
                max_val = v;
                max_row = r;
            }
        }
        if max_val <= RANK_MAG_TOLERANCE {
            continue;
        }
        a.swap_rows(row, max_row);
        let pivot = a[(row, col)];
        for r in (row + 1)..m {
            let factor = a[(r, col)] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                a[(r, j)] -= factor * a[(row, j)];
            }
        }
        rank += 1;
        row += 1;
        if row == m {
            break;
        }
    }
    rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use trammel_types::HGroup;

    fn param(h: u32, val: f64) -> Param {
        Param::new(HParam(h), HGroup(1), val)
    }

    #[test]
    fn dense_solver_agrees_with_hand_solution() {
        // 2x + y = 5, x + 3y = 7 → x = 8/5, y = 9/5
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![5.0, 7.0]);
        let x = solve_dense(a, b).unwrap();
        assert_relative_eq!(x[0], 1.6, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.8, epsilon = 1e-12);
    }

    #[test]
    fn dense_solver_rejects_singular() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);
        assert!(solve_dense(a, b).is_none());
    }

    #[test]
    fn rank_counts_independent_rows() {
        let a = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
        assert_eq!(matrix_rank(&a), 2);
        assert_eq!(matrix_rank(&DMatrix::<f64>::zeros(3, 3)), 0);
        assert_eq!(matrix_rank(&DMatrix::<f64>::identity(4, 4)), 4);
    }

    #[test]
    fn substitution_merges_params() {
        // p1 - p2 = 0 and p1 - 7 = 0 should leave nothing for Newton.
        let mut ar = ExprArena::new();
        let (h1, h2) = (HParam(1), HParam(2));
        let e1 = {
            let a = ar.param(h1);
            let b = ar.param(h2);
            ar.minus(a, b)
        };
        let e2 = {
            let a = ar.param(h1);
            let c = ar.constant(7.0);
            ar.minus(a, c)
        };

        let mut sys = System::new(vec![param(1, 0.0), param(2, 3.0)], vec![]);
        sys.eqs = vec![
            Equation {
                h: trammel_types::HEquation(1),
                e: e1,
                owner: HConstraint::NONE,
            },
            Equation {
                h: trammel_types::HEquation(2),
                e: e2,
                owner: HConstraint::NONE,
            },
        ];
        sys.solve_by_substitution(&mut ar);
        assert!(sys.eqs.is_empty());
        assert_eq!(sys.params[1].substd, h1);
        assert!(sys.params[0].known);
        assert_relative_eq!(sys.params[0].val, 7.0);
    }

    #[test]
    fn substitution_keeps_the_dragged_param() {
        let mut ar = ExprArena::new();
        let e = {
            let a = ar.param(HParam(1));
            let b = ar.param(HParam(2));
            ar.minus(a, b)
        };
        let mut sys = System::new(vec![param(1, 0.0), param(2, 3.0)], vec![HParam(2)]);
        sys.eqs = vec![Equation {
            h: trammel_types::HEquation(1),
            e,
            owner: HConstraint::NONE,
        }];
        sys.solve_by_substitution(&mut ar);
        // The dragged param 2 survives; param 1 was folded into it.
        assert_eq!(sys.params[0].substd, HParam(2));
        assert!(sys.params[1].substd.is_none());
    }

    #[test]
    fn newton_solves_a_small_nonlinear_system() {
        // x^2 + y^2 = 25, x - y = 1; from (4, 2) converges to (4, 3).
        let mut ar = ExprArena::new();
        let (hx, hy) = (HParam(1), HParam(2));
        let e1 = {
            let x = ar.param(hx);
            let y = ar.param(hy);
            let x2 = ar.square(x);
            let y2 = ar.square(y);
            let s = ar.plus(x2, y2);
            let c = ar.constant(25.0);
            ar.minus(s, c)
        };
        let e2 = {
            let x = ar.param(hx);
            let y = ar.param(hy);
            let d = ar.minus(x, y);
            let c = ar.constant(1.0);
            ar.minus(d, c)
        };

        let sk = Sketch::new();
        let mut sys = System::new(vec![param(1, 4.0), param(2, 2.0)], vec![]);
        sys.eqs = vec![
            Equation {
                h: trammel_types::HEquation(1),
                e: e1,
                owner: HConstraint::NONE,
            },
            Equation {
                h: trammel_types::HEquation(2),
                e: e2,
                owner: HConstraint::NONE,
            },
        ];
        let r = sys.run(&sk, &mut ar, false);
        assert!(r.converged);
        assert_relative_eq!(sys.params[0].val, 4.0, epsilon = 1e-8);
        assert_relative_eq!(sys.params[1].val, 3.0, epsilon = 1e-8);
        assert_eq!(r.rank, 2);
        assert_eq!(r.n, 2);
    }

    #[test]
    fn underdetermined_system_reports_dof_through_rank() {
        // One equation, two unknowns: x + y = 10.
        let mut ar = ExprArena::new();
        let e = {
            let x = ar.param(HParam(1));
            let y = ar.param(HParam(2));
            let s = ar.plus(x, y);
            let c = ar.constant(10.0);
            ar.minus(s, c)
        };
        let sk = Sketch::new();
        let mut sys = System::new(vec![param(1, 1.0), param(2, 2.0)], vec![]);
        sys.eqs = vec![Equation {
            h: trammel_types::HEquation(1),
            e,
            owner: HConstraint::NONE,
        }];
        let r = sys.run(&sk, &mut ar, true);
        assert!(r.converged);
        assert_eq!(r.n - r.rank, 1);
        assert_relative_eq!(sys.params[0].val + sys.params[1].val, 10.0, epsilon = 1e-8);
        // Exactly one direction is free, but pinning either param fixes the
        // system, so both get flagged.
        assert!(sys.params.iter().all(|p| p.free));
    }

    #[test]
    fn dragged_param_sticks() {
        // x - y = 0 is underdetermined; dragging x pins it at its value.
        let mut ar = ExprArena::new();
        let e = {
            let x = ar.param(HParam(1));
            let y = ar.param(HParam(2));
            let d = ar.minus(x, y);
            let c = ar.constant(4.0);
            ar.minus(d, c)
        };
        let sk = Sketch::new();
        let mut sys = System::new(vec![param(1, 9.0), param(2, 1.0)], vec![HParam(1)]);
        sys.eqs = vec![Equation {
            h: trammel_types::HEquation(1),
            e,
            owner: HConstraint::NONE,
        }];
        let r = sys.run(&sk, &mut ar, false);
        assert!(r.converged);
        assert_relative_eq!(sys.params[0].val, 9.0, epsilon = 1e-10);
        assert_relative_eq!(sys.params[1].val, 5.0, epsilon = 1e-8);
    }

    #[test]
    fn empty_system_converges_immediately() {
        let sk = Sketch::new();
        let mut ar = ExprArena::new();
        let mut sys = System::new(vec![param(1, 2.0), param(2, 3.0)], vec![]);
        let r = sys.run(&sk, &mut ar, false);
        assert!(r.converged);
        assert_eq!(r.iterations, 0);
        assert_eq!(r.rank, 0);
        assert_eq!(r.n, 2);
        assert_relative_eq!(sys.params[0].val, 2.0);
    }
}
