//! Expression DAG nodes, bump-allocated in an arena addressed by 32-bit
//! indices. Nodes are immutable after construction except for the in-place
//! handle substitution used by the trivial-equation elimination pass.
//!
//! The arena lives for one solve and is cleared afterwards; nothing outside
//! a solve holds an `ExprRef`.

use trammel_types::HParam;

/// Index of a node in its arena. Only meaningful together with the arena
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprRef(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Sqrt,
    Square,
    Sin,
    Cos,
    Asin,
    Acos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    /// A parameter referenced by handle; evaluation goes through a lookup.
    Param(HParam),
    /// A parameter resolved to an index in the solver's working array;
    /// evaluation is one array load. Keeps the handle so differentiation
    /// still works after the rewrite.
    ParamSlot { slot: u32, h: HParam },
    Const(f64),
    Unary(UnaryOp, ExprRef),
    Binary(BinaryOp, ExprRef, ExprRef),
}

/// How a handle resolves during the pointer-rewriting pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamBinding {
    /// The param is fixed for this solve; fold it to a constant.
    Known(f64),
    /// The param is the slot-th unknown of the working array.
    Slot(u32),
}

/// Result of scanning an expression for parameters present in some list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencedParams {
    None,
    Single(HParam),
    Multiple,
}

#[derive(Debug, Default)]
pub struct ExprArena {
    nodes: Vec<Node>,
}

/// Tolerance for recognizing the constants 0 and 1 during folding.
fn fold_tol(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.001
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n),
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, n: Node) -> ExprRef {
        let at = u32::try_from(self.nodes.len()).expect("expression arena overflow");
        self.nodes.push(n);
        ExprRef(at)
    }

    fn node(&self, e: ExprRef) -> Node {
        self.nodes[e.0 as usize]
    }

    // ── Leaf and operator builders ──────────────────────────────────────

    pub fn constant(&mut self, v: f64) -> ExprRef {
        self.push(Node::Const(v))
    }

    pub fn param(&mut self, h: HParam) -> ExprRef {
        self.push(Node::Param(h))
    }

    pub fn param_slot(&mut self, slot: u32, h: HParam) -> ExprRef {
        self.push(Node::ParamSlot { slot, h })
    }

    pub fn plus(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.push(Node::Binary(BinaryOp::Plus, a, b))
    }

    pub fn minus(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.push(Node::Binary(BinaryOp::Minus, a, b))
    }

    pub fn times(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.push(Node::Binary(BinaryOp::Times, a, b))
    }

    pub fn div(&mut self, a: ExprRef, b: ExprRef) -> ExprRef {
        self.push(Node::Binary(BinaryOp::Div, a, b))
    }

    pub fn negate(&mut self, a: ExprRef) -> ExprRef {
        self.push(Node::Unary(UnaryOp::Negate, a))
    }

    pub fn sqrt(&mut self, a: ExprRef) -> ExprRef {
        self.push(Node::Unary(UnaryOp::Sqrt, a))
    }

    pub fn square(&mut self, a: ExprRef) -> ExprRef {
        self.push(Node::Unary(UnaryOp::Square, a))
    }

    pub fn sin(&mut self, a: ExprRef) -> ExprRef {
        self.push(Node::Unary(UnaryOp::Sin, a))
    }

    pub fn cos(&mut self, a: ExprRef) -> ExprRef {
        self.push(Node::Unary(UnaryOp::Cos, a))
    }

    pub fn asin(&mut self, a: ExprRef) -> ExprRef {
        self.push(Node::Unary(UnaryOp::Asin, a))
    }

    pub fn acos(&mut self, a: ExprRef) -> ExprRef {
        self.push(Node::Unary(UnaryOp::Acos, a))
    }

    // ── Evaluation ──────────────────────────────────────────────────────

    /// Evaluate with parameters looked up by handle. Calling this on a
    /// rewritten DAG (one containing slots) is a programming error.
    pub fn eval_with<F: Fn(HParam) -> f64>(&self, e: ExprRef, lookup: &F) -> f64 {
        match self.node(e) {
            Node::Param(h) => lookup(h),
            Node::ParamSlot { .. } => panic!("slot node evaluated without a working array"),
            Node::Const(v) => v,
            Node::Unary(op, a) => Self::apply_unary(op, self.eval_with(a, lookup)),
            Node::Binary(op, a, b) => {
                Self::apply_binary(op, self.eval_with(a, lookup), self.eval_with(b, lookup))
            }
        }
    }

    /// Evaluate a rewritten DAG against the working parameter array. This is
    /// the hot path of the Newton loop: no lookups, one load per leaf.
    pub fn eval_slots(&self, e: ExprRef, slots: &[f64]) -> f64 {
        match self.node(e) {
            Node::Param(h) => panic!("unresolved param {:?} in rewritten expression", h),
            Node::ParamSlot { slot, .. } => slots[slot as usize],
            Node::Const(v) => v,
            Node::Unary(op, a) => Self::apply_unary(op, self.eval_slots(a, slots)),
            Node::Binary(op, a, b) => {
                Self::apply_binary(op, self.eval_slots(a, slots), self.eval_slots(b, slots))
            }
        }
    }

    fn apply_unary(op: UnaryOp, a: f64) -> f64 {
        match op {
            UnaryOp::Negate => -a,
            UnaryOp::Sqrt => a.sqrt(),
            UnaryOp::Square => a * a,
            UnaryOp::Sin => a.sin(),
            UnaryOp::Cos => a.cos(),
            UnaryOp::Asin => a.asin(),
            UnaryOp::Acos => a.acos(),
        }
    }

    fn apply_binary(op: BinaryOp, a: f64, b: f64) -> f64 {
        match op {
            BinaryOp::Plus => a + b,
            BinaryOp::Minus => a - b,
            BinaryOp::Times => a * b,
            BinaryOp::Div => a / b,
        }
    }

    // ── Symbolic differentiation ────────────────────────────────────────

    /// Partial derivative with respect to `p`, as a new DAG. If the
    /// expression does not contain `p` the result folds to the constant 0.
    pub fn partial_wrt(&mut self, e: ExprRef, p: HParam) -> ExprRef {
        match self.node(e) {
            Node::Param(h) => self.constant(if h == p { 1.0 } else { 0.0 }),
            Node::ParamSlot { h, .. } => self.constant(if h == p { 1.0 } else { 0.0 }),
            Node::Const(_) => self.constant(0.0),

            Node::Binary(BinaryOp::Plus, a, b) => {
                let da = self.partial_wrt(a, p);
                let db = self.partial_wrt(b, p);
                self.plus(da, db)
            }
            Node::Binary(BinaryOp::Minus, a, b) => {
                let da = self.partial_wrt(a, p);
                let db = self.partial_wrt(b, p);
                self.minus(da, db)
            }
            Node::Binary(BinaryOp::Times, a, b) => {
                let da = self.partial_wrt(a, p);
                let db = self.partial_wrt(b, p);
                let adb = self.times(a, db);
                let bda = self.times(b, da);
                self.plus(adb, bda)
            }
            Node::Binary(BinaryOp::Div, a, b) => {
                let da = self.partial_wrt(a, p);
                let db = self.partial_wrt(b, p);
                let dab = self.times(da, b);
                let adb = self.times(a, db);
                let num = self.minus(dab, adb);
                let den = self.square(b);
                self.div(num, den)
            }

            Node::Unary(UnaryOp::Negate, a) => {
                let da = self.partial_wrt(a, p);
                self.negate(da)
            }
            Node::Unary(UnaryOp::Sqrt, a) => {
                let da = self.partial_wrt(a, p);
                let half = self.constant(0.5);
                let ra = self.sqrt(a);
                let coeff = self.div(half, ra);
                self.times(coeff, da)
            }
            Node::Unary(UnaryOp::Square, a) => {
                let da = self.partial_wrt(a, p);
                let two = self.constant(2.0);
                let ta = self.times(two, a);
                self.times(ta, da)
            }
            Node::Unary(UnaryOp::Sin, a) => {
                let da = self.partial_wrt(a, p);
                let ca = self.cos(a);
                self.times(ca, da)
            }
            Node::Unary(UnaryOp::Cos, a) => {
                let da = self.partial_wrt(a, p);
                let sa = self.sin(a);
                let t = self.times(sa, da);
                self.negate(t)
            }
            Node::Unary(UnaryOp::Asin, a) => {
                let da = self.partial_wrt(a, p);
                let one = self.constant(1.0);
                let sq = self.square(a);
                let rad = self.minus(one, sq);
                let root = self.sqrt(rad);
                let one2 = self.constant(1.0);
                let coeff = self.div(one2, root);
                self.times(coeff, da)
            }
            Node::Unary(UnaryOp::Acos, a) => {
                let da = self.partial_wrt(a, p);
                let one = self.constant(1.0);
                let sq = self.square(a);
                let rad = self.minus(one, sq);
                let root = self.sqrt(rad);
                let neg = self.constant(-1.0);
                let coeff = self.div(neg, root);
                self.times(coeff, da)
            }
        }
    }

    // ── Constant folding ────────────────────────────────────────────────

    /// Bottom-up rewrite applying `x+0=x`, `x*1=x`, `x*0=0` and evaluating
    /// any operator whose operands are all constant. Returns a new root; no
    /// surviving internal node has two constant children.
    pub fn fold_constants(&mut self, e: ExprRef) -> ExprRef {
        match self.node(e) {
            Node::Param(_) | Node::ParamSlot { .. } | Node::Const(_) => e,

            Node::Unary(op, a) => {
                let fa = self.fold_constants(a);
                if let Node::Const(v) = self.node(fa) {
                    let r = Self::apply_unary(op, v);
                    return self.constant(r);
                }
                self.push(Node::Unary(op, fa))
            }

            Node::Binary(op, a, b) => {
                let fa = self.fold_constants(a);
                let fb = self.fold_constants(b);
                let (na, nb) = (self.node(fa), self.node(fb));

                if let (Node::Const(va), Node::Const(vb)) = (na, nb) {
                    let r = Self::apply_binary(op, va, vb);
                    return self.constant(r);
                }
                if op == BinaryOp::Plus {
                    if let Node::Const(v) = nb {
                        if fold_tol(v, 0.0) {
                            return fa;
                        }
                    }
                    if let Node::Const(v) = na {
                        if fold_tol(v, 0.0) {
                            return fb;
                        }
                    }
                }
                if op == BinaryOp::Times {
                    if let Node::Const(v) = nb {
                        if fold_tol(v, 1.0) {
                            return fa;
                        }
                        if fold_tol(v, 0.0) {
                            return self.constant(0.0);
                        }
                    }
                    if let Node::Const(v) = na {
                        if fold_tol(v, 1.0) {
                            return fb;
                        }
                        if fold_tol(v, 0.0) {
                            return self.constant(0.0);
                        }
                    }
                }
                self.push(Node::Binary(op, fa, fb))
            }
        }
    }

    // ── Param queries and rewrites ──────────────────────────────────────

    pub fn depends_on(&self, e: ExprRef, p: HParam) -> bool {
        match self.node(e) {
            Node::Param(h) => h == p,
            Node::ParamSlot { h, .. } => h == p,
            Node::Const(_) => false,
            Node::Unary(_, a) => self.depends_on(a, p),
            Node::Binary(_, a, b) => self.depends_on(a, p) || self.depends_on(b, p),
        }
    }

    /// 64-bit Bloom-style signature of the referenced parameters, one bit
    /// per `handle mod 61`. False positives possible, false negatives not;
    /// used to skip Jacobian entries that must be zero.
    pub fn params_used(&self, e: ExprRef) -> u64 {
        match self.node(e) {
            Node::Param(h) => 1u64 << (h.0 % 61),
            Node::ParamSlot { h, .. } => 1u64 << (h.0 % 61),
            Node::Const(_) => 0,
            Node::Unary(_, a) => self.params_used(a),
            Node::Binary(_, a, b) => self.params_used(a) | self.params_used(b),
        }
    }

    pub fn node_count(&self, e: ExprRef) -> usize {
        match self.node(e) {
            Node::Param(_) | Node::ParamSlot { .. } | Node::Const(_) => 1,
            Node::Unary(_, a) => 1 + self.node_count(a),
            Node::Binary(_, a, b) => 1 + self.node_count(a) + self.node_count(b),
        }
    }

    /// Deep-copy, resolving every `Param` node: known params become
    /// constants, unknowns become slot references into the working array.
    /// After this pass each Newton iteration evaluates without any lookup.
    pub fn rewrite_params<F: Fn(HParam) -> ParamBinding>(
        &mut self,
        e: ExprRef,
        resolve: &F,
    ) -> ExprRef {
        match self.node(e) {
            Node::Param(h) => match resolve(h) {
                ParamBinding::Known(v) => self.constant(v),
                ParamBinding::Slot(slot) => self.param_slot(slot, h),
            },
            Node::ParamSlot { .. } => panic!("expression rewritten twice"),
            Node::Const(v) => self.constant(v),
            Node::Unary(op, a) => {
                let ra = self.rewrite_params(a, resolve);
                self.push(Node::Unary(op, ra))
            }
            Node::Binary(op, a, b) => {
                let ra = self.rewrite_params(a, resolve);
                let rb = self.rewrite_params(b, resolve);
                self.push(Node::Binary(op, ra, rb))
            }
        }
    }

    /// In-place handle replacement, used by the trivial-equation elimination
    /// pass. Must run before any pointer rewriting.
    pub fn substitute(&mut self, e: ExprRef, old: HParam, new: HParam) {
        match self.node(e) {
            Node::Param(h) => {
                if h == old {
                    self.nodes[e.0 as usize] = Node::Param(new);
                }
            }
            Node::ParamSlot { .. } => panic!("substitute on a rewritten expression"),
            Node::Const(_) => {}
            Node::Unary(_, a) => self.substitute(a, old, new),
            Node::Binary(_, a, b) => {
                self.substitute(a, old, new);
                self.substitute(b, old, new);
            }
        }
    }

    /// If the expression references exactly one parameter for which
    /// `in_list` holds, return it.
    pub fn referenced_params<F: Fn(HParam) -> bool>(
        &self,
        e: ExprRef,
        in_list: &F,
    ) -> ReferencedParams {
        match self.node(e) {
            Node::Param(h) => {
                if in_list(h) {
                    ReferencedParams::Single(h)
                } else {
                    ReferencedParams::None
                }
            }
            Node::ParamSlot { .. } => panic!("referenced_params on a rewritten expression"),
            Node::Const(_) => ReferencedParams::None,
            Node::Unary(_, a) => self.referenced_params(a, in_list),
            Node::Binary(_, a, b) => {
                let pa = self.referenced_params(a, in_list);
                let pb = self.referenced_params(b, in_list);
                match (pa, pb) {
                    (ReferencedParams::Multiple, _) | (_, ReferencedParams::Multiple) => {
                        ReferencedParams::Multiple
                    }
                    (ReferencedParams::None, x) => x,
                    (x, ReferencedParams::None) => x,
                    (ReferencedParams::Single(a), ReferencedParams::Single(b)) => {
                        if a == b {
                            ReferencedParams::Single(a)
                        } else {
                            ReferencedParams::Multiple
                        }
                    }
                }
            }
        }
    }

    /// Pattern-match `a - b` where both operands are plain param leaves.
    pub fn as_param_difference(&self, e: ExprRef) -> Option<(HParam, HParam)> {
        if let Node::Binary(BinaryOp::Minus, a, b) = self.node(e) {
            if let (Node::Param(pa), Node::Param(pb)) = (self.node(a), self.node(b)) {
                return Some((pa, pb));
            }
        }
        None
    }

    /// Pattern-match the assignment forms `p - c`, `c - p` (yielding the
    /// value that makes the equation hold) and the bare leaf `p` (zero).
    pub fn as_param_assignment(&self, e: ExprRef) -> Option<(HParam, f64)> {
        match self.node(e) {
            Node::Param(p) => Some((p, 0.0)),
            Node::Binary(BinaryOp::Minus, a, b) => match (self.node(a), self.node(b)) {
                (Node::Param(p), Node::Const(c)) => Some((p, c)),
                (Node::Const(c), Node::Param(p)) => Some((p, c)),
                _ => None,
            },
            _ => None,
        }
    }

    /// True when the expression folded away to a constant; returns it.
    pub fn as_constant(&self, e: ExprRef) -> Option<f64> {
        if let Node::Const(v) = self.node(e) {
            Some(v)
        } else {
            None
        }
    }

    // ── Pretty-printing, mostly for debugging ───────────────────────────

    pub fn print(&self, e: ExprRef) -> String {
        let mut s = String::new();
        self.print_into(e, &mut s);
        s
    }

    fn print_into(&self, e: ExprRef, out: &mut String) {
        use std::fmt::Write;
        match self.node(e) {
            Node::Param(h) => {
                let _ = write!(out, "param({:08x})", h.0);
            }
            Node::ParamSlot { slot, h } => {
                let _ = write!(out, "param(s{slot}:{:08x})", h.0);
            }
            Node::Const(v) => {
                let _ = write!(out, "{v:.3}");
            }
            Node::Binary(op, a, b) => {
                let c = match op {
                    BinaryOp::Plus => '+',
                    BinaryOp::Minus => '-',
                    BinaryOp::Times => '*',
                    BinaryOp::Div => '/',
                };
                out.push('(');
                self.print_into(a, out);
                let _ = write!(out, " {c} ");
                self.print_into(b, out);
                out.push(')');
            }
            Node::Unary(op, a) => {
                let name = match op {
                    UnaryOp::Negate => "- ",
                    UnaryOp::Sqrt => "sqrt ",
                    UnaryOp::Square => "square ",
                    UnaryOp::Sin => "sin ",
                    UnaryOp::Cos => "cos ",
                    UnaryOp::Asin => "asin ",
                    UnaryOp::Acos => "acos ",
                };
                out.push('(');
                out.push_str(name);
                self.print_into(a, out);
                out.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lookup(vals: &[(HParam, f64)]) -> impl Fn(HParam) -> f64 + '_ {
        move |h| {
            vals.iter()
                .find(|(p, _)| *p == h)
                .map(|(_, v)| *v)
                .unwrap_or_else(|| panic!("no value for {h:?}"))
        }
    }

    #[test]
    fn eval_basic() {
        let mut ar = ExprArena::new();
        let p = HParam(3);
        let x = ar.param(p);
        let c = ar.constant(2.0);
        let sum = ar.plus(x, c);
        let e = ar.square(sum);
        let vals = [(p, 3.0)];
        assert_relative_eq!(ar.eval_with(e, &lookup(&vals)), 25.0);
    }

    #[test]
    fn partial_of_product() {
        // d/dx (x * x) = 2x
        let mut ar = ExprArena::new();
        let p = HParam(1);
        let x = ar.param(p);
        let e = ar.times(x, x);
        let d = ar.partial_wrt(e, p);
        let vals = [(p, 4.0)];
        assert_relative_eq!(ar.eval_with(d, &lookup(&vals)), 8.0);
    }

    #[test]
    fn partial_of_chain() {
        // d/dx sin(x^2) = cos(x^2) * 2x
        let mut ar = ExprArena::new();
        let p = HParam(1);
        let x = ar.param(p);
        let sq = ar.square(x);
        let e = ar.sin(sq);
        let d = ar.partial_wrt(e, p);
        let xv = 1.5f64;
        let vals = [(p, xv)];
        let expect = (xv * xv).cos() * 2.0 * xv;
        assert_relative_eq!(ar.eval_with(d, &lookup(&vals)), expect, epsilon = 1e-12);
    }

    #[test]
    fn partial_of_quotient_and_sqrt() {
        // f = sqrt(x) / (x + 1); check against a central difference
        let mut ar = ExprArena::new();
        let p = HParam(7);
        let x = ar.param(p);
        let rx = ar.sqrt(x);
        let one = ar.constant(1.0);
        let den = ar.plus(x, one);
        let e = ar.div(rx, den);
        let d = ar.partial_wrt(e, p);

        let f = |v: f64| v.sqrt() / (v + 1.0);
        let h = 1e-6;
        let xv = 2.3;
        let fd = (f(xv + h) - f(xv - h)) / (2.0 * h);
        let vals = [(p, xv)];
        assert_relative_eq!(ar.eval_with(d, &lookup(&vals)), fd, epsilon = 1e-7);
    }

    #[test]
    fn partial_without_dependency_folds_to_zero() {
        let mut ar = ExprArena::new();
        let x = ar.param(HParam(1));
        let c = ar.constant(5.0);
        let e = ar.times(x, c);
        let d = ar.partial_wrt(e, HParam(2));
        let folded = ar.fold_constants(d);
        assert_eq!(ar.as_constant(folded), Some(0.0));
    }

    #[test]
    fn fold_identities() {
        let mut ar = ExprArena::new();
        let p = HParam(1);
        let x = ar.param(p);
        let zero = ar.constant(0.0);
        let one = ar.constant(1.0);

        let e = ar.plus(x, zero);
        assert_eq!(ar.fold_constants(e), x);

        let e = ar.times(one, x);
        assert_eq!(ar.fold_constants(e), x);

        let e = ar.times(x, zero);
        let f = ar.fold_constants(e);
        assert_eq!(ar.as_constant(f), Some(0.0));

        let a = ar.constant(3.0);
        let b = ar.constant(4.0);
        let s = ar.times(a, b);
        let n = ar.sqrt(s);
        let f = ar.fold_constants(n);
        assert_eq!(ar.as_constant(f), Some(12.0f64.sqrt()));
    }

    #[test]
    fn rewrite_then_eval_slots() {
        let mut ar = ExprArena::new();
        let unknown = HParam(1);
        let known = HParam(2);
        let x = ar.param(unknown);
        let k = ar.param(known);
        let e = ar.times(x, k);
        let r = ar.rewrite_params(e, &|h| {
            if h == known {
                ParamBinding::Known(3.0)
            } else {
                ParamBinding::Slot(0)
            }
        });
        assert_relative_eq!(ar.eval_slots(r, &[5.0]), 15.0);
        // The handle survives rewriting, so differentiation still works.
        let d = ar.partial_wrt(r, unknown);
        assert_relative_eq!(ar.eval_slots(d, &[5.0]), 3.0);
    }

    #[test]
    fn params_used_never_misses() {
        let mut ar = ExprArena::new();
        let (a, b) = (HParam(9), HParam(70)); // 70 % 61 == 9: collision is fine
        let xa = ar.param(a);
        let xb = ar.param(b);
        let e = ar.plus(xa, xb);
        let sig = ar.params_used(e);
        assert!(sig & (1 << (a.0 % 61)) != 0);
        assert!(sig & (1 << (b.0 % 61)) != 0);
    }

    #[test]
    fn substitution_and_patterns() {
        let mut ar = ExprArena::new();
        let (a, b) = (HParam(1), HParam(2));
        let xa = ar.param(a);
        let xb = ar.param(b);
        let e = ar.minus(xa, xb);
        assert_eq!(ar.as_param_difference(e), Some((a, b)));

        ar.substitute(e, b, a);
        assert_eq!(ar.as_param_difference(e), Some((a, a)));

        let c = ar.constant(4.0);
        let xa2 = ar.param(a);
        let asn = ar.minus(xa2, c);
        assert_eq!(ar.as_param_assignment(asn), Some((a, 4.0)));
    }

    #[test]
    fn referenced_params_classifies() {
        let mut ar = ExprArena::new();
        let (a, b) = (HParam(1), HParam(2));
        let xa = ar.param(a);
        let xb = ar.param(b);
        let two = ar.constant(2.0);
        let e1 = ar.times(xa, two);
        assert_eq!(
            ar.referenced_params(e1, &|_| true),
            ReferencedParams::Single(a)
        );
        let e2 = ar.plus(xa, xb);
        assert_eq!(ar.referenced_params(e2, &|_| true), ReferencedParams::Multiple);
        assert_eq!(
            ar.referenced_params(e2, &|h| h == b),
            ReferencedParams::Single(b)
        );
        assert_eq!(
            ar.referenced_params(two, &|_| true),
            ReferencedParams::None
        );
    }

    #[test]
    fn print_is_stable() {
        let mut ar = ExprArena::new();
        let x = ar.param(HParam(15));
        let c = ar.constant(2.0);
        let e = ar.times(x, c);
        let s = ar.sqrt(e);
        assert_eq!(ar.print(s), "(sqrt (param(0000000f) * 2.000))");
    }
}
