//! Given a constraint, generate the scalar equations that represent it, as
//! expressions over the sketch's parameters; plus the helpers shared among
//! constraint kinds, the auxiliary-parameter generation step, and the
//! inverse operation that re-values a reference dimension from current
//! geometry.

use std::f64::consts::PI;

use trammel_expr::{ExprArena, ExprRef, ExprVector};
use trammel_types::{
    Constraint, ConstraintKind, EntityKind, HConstraint, HEntity, Param, Sketch, Vector,
};

use crate::Equation;
use crate::geometry::{
    arc_get_angles, circle_get_radius_expr, cubic_get_finish_tangent_exprs,
    cubic_get_start_tangent_exprs, face_get_normal_exprs, face_get_point_exprs, normal_exprs_n,
    normal_exprs_u, normal_exprs_v, normal_get_num, point_get_exprs,
    point_get_exprs_in_workplane, point_get_exprs_in_workplane_uv, point_get_num,
    point_get_num_in_workplane, vector_get_exprs, vector_get_exprs_in_workplane, vector_get_num,
    workplane_get_offset_exprs, workplane_get_plane_exprs,
};

// ── Shared geometric helpers ────────────────────────────────────────────

/// `a − t·b`: zero iff a and b are parallel, with the auxiliary scalar t
/// absorbing the magnitude ratio.
fn vectors_parallel_3d(
    a: ExprVector,
    b: ExprVector,
    t: trammel_types::HParam,
    ar: &mut ExprArena,
) -> ExprVector {
    let te = ar.param(t);
    let tb = b.scaled_by(te, ar);
    a.minus(tb, ar)
}

/// Distance between two points: true 3D distance when free in 3D, else the
/// distance between their projections into the workplane.
fn distance(
    sk: &Sketch,
    ar: &mut ExprArena,
    wrkpl: HEntity,
    hpa: HEntity,
    hpb: HEntity,
) -> ExprRef {
    let pa = sk.get_entity(hpa);
    let pb = sk.get_entity(hpb);
    assert!(
        pa.is_point() && pb.is_point(),
        "expected two points to measure distance between"
    );

    if wrkpl == HEntity::FREE_IN_3D {
        let ea = point_get_exprs(sk, ar, pa);
        let eb = point_get_exprs(sk, ar, pb);
        ea.minus(eb, ar).magnitude(ar)
    } else {
        let (au, av) = point_get_exprs_in_workplane_uv(sk, ar, pa, wrkpl);
        let (bu, bv) = point_get_exprs_in_workplane_uv(sk, ar, pb, wrkpl);
        let du = ar.minus(au, bu);
        let dv = ar.minus(av, bv);
        let du2 = ar.square(du);
        let dv2 = ar.square(dv);
        let s = ar.plus(du2, dv2);
        ar.sqrt(s)
    }
}

/// Distance from a point to a line through two points. Unsigned in 3D
/// (cross-product magnitude over chord length), signed in a workplane.
fn point_line_distance(
    sk: &Sketch,
    ar: &mut ExprArena,
    wrkpl: HEntity,
    hpt: HEntity,
    hln: HEntity,
) -> ExprRef {
    let ln = sk.get_entity(hln);
    let a = sk.get_entity(ln.point[0]);
    let b = sk.get_entity(ln.point[1]);
    let p = sk.get_entity(hpt);

    if wrkpl == HEntity::FREE_IN_3D {
        let ep = point_get_exprs(sk, ar, p);
        let ea = point_get_exprs(sk, ar, a);
        let eb = point_get_exprs(sk, ar, b);
        let eab = ea.minus(eb, ar);
        let m = eab.magnitude(ar);
        let rel = ea.minus(ep, ar);
        let num = eab.cross(rel, ar).magnitude(ar);
        ar.div(num, m)
    } else {
        let (ua, va) = point_get_exprs_in_workplane_uv(sk, ar, a, wrkpl);
        let (ub, vb) = point_get_exprs_in_workplane_uv(sk, ar, b, wrkpl);
        let du = ar.minus(ua, ub);
        let dv = ar.minus(va, vb);

        let (u, v) = point_get_exprs_in_workplane_uv(sk, ar, p, wrkpl);

        let du2 = ar.square(du);
        let dv2 = ar.square(dv);
        let s = ar.plus(du2, dv2);
        let m = ar.sqrt(s);

        let lu = ar.minus(ua, u);
        let lv = ar.minus(va, v);
        let t1 = ar.times(dv, lu);
        let t2 = ar.times(du, lv);
        let proj = ar.minus(t1, t2);
        ar.div(proj, m)
    }
}

/// Signed distance from a point to a workplane, `p·n − d`.
fn point_plane_distance(
    sk: &Sketch,
    ar: &mut ExprArena,
    p: ExprVector,
    hpl: HEntity,
) -> ExprRef {
    let (n, d) = workplane_get_plane_exprs(sk, ar, sk.get_entity(hpl));
    let dot = p.dot(n, ar);
    ar.minus(dot, d)
}

/// Cosine of the angle between two vectors; of their projections when a
/// workplane is given.
fn direction_cosine(
    sk: &Sketch,
    ar: &mut ExprArena,
    wrkpl: HEntity,
    ae: ExprVector,
    be: ExprVector,
) -> ExprRef {
    if wrkpl == HEntity::FREE_IN_3D {
        let ma = ae.magnitude(ar);
        let mb = be.magnitude(ar);
        let mags = ar.times(ma, mb);
        let dot = ae.dot(be, ar);
        ar.div(dot, mags)
    } else {
        let w = sk.get_entity(wrkpl);
        let normal = sk.get_entity(w.normal);
        let u = normal_exprs_u(sk, ar, normal);
        let v = normal_exprs_v(sk, ar, normal);
        let ua = u.dot(ae, ar);
        let va = v.dot(ae, ar);
        let ub = u.dot(be, ar);
        let vb = v.dot(be, ar);
        let ua2 = ar.square(ua);
        let va2 = ar.square(va);
        let sa = ar.plus(ua2, va2);
        let maga = ar.sqrt(sa);
        let ub2 = ar.square(ub);
        let vb2 = ar.square(vb);
        let sb = ar.plus(ub2, vb2);
        let magb = ar.sqrt(sb);
        let uu = ar.times(ua, ub);
        let vv = ar.times(va, vb);
        let dot = ar.plus(uu, vv);
        let mags = ar.times(maga, magb);
        ar.div(dot, mags)
    }
}

/// Embed workplane coordinates (u, v) back into 3D.
fn point_in_three_space(
    sk: &Sketch,
    ar: &mut ExprArena,
    wrkpl: HEntity,
    u: ExprRef,
    v: ExprRef,
) -> ExprVector {
    let w = sk.get_entity(wrkpl);
    let normal = sk.get_entity(w.normal);
    let ub = normal_exprs_u(sk, ar, normal);
    let vb = normal_exprs_v(sk, ar, normal);
    let ob = workplane_get_offset_exprs(sk, ar, w);
    let su = ub.scaled_by(u, ar);
    let sv = vb.scaled_by(v, ar);
    su.plus(sv, ar).plus(ob, ar)
}

// ── Equation assembly ───────────────────────────────────────────────────

fn add_eq(eqs: &mut Vec<Equation>, c: &Constraint, e: ExprRef, index: u32) {
    eqs.push(Equation {
        h: c.h.equation(index),
        e,
        owner: c.h,
    });
}

/// Push a vector equation: x and y always, z only when free in 3D.
fn add_eq_vector(eqs: &mut Vec<Equation>, c: &Constraint, v: ExprVector, base_index: u32) {
    add_eq(eqs, c, v.x, base_index);
    add_eq(eqs, c, v.y, base_index + 1);
    if c.workplane == HEntity::FREE_IN_3D {
        add_eq(eqs, c, v.z, base_index + 2);
    }
}

/// Allocate the auxiliary scalar for the constraint kinds that need one and
/// record its handle in `val_p`. The scalar is seeded from current geometry
/// so the iteration starts near the answer. Re-solves keep the previous
/// value.
pub fn generate_constraint_params(sk: &mut Sketch, hc: HConstraint) {
    let c = sk.get_constraint(hc).clone();

    let needs_aux = match c.kind {
        ConstraintKind::Parallel | ConstraintKind::CubicLineTangent => {
            c.workplane == HEntity::FREE_IN_3D
        }
        ConstraintKind::SameOrientation | ConstraintKind::PtOnLine => true,
        _ => false,
    };
    if !needs_aux {
        sk.get_constraint_mut(hc).val_p = trammel_types::HParam::NONE;
        return;
    }

    let h = c.h.aux_param(0);
    if !sk.param.contains(h.0) {
        let seed = aux_param_seed(sk, &c);
        sk.param.add(Param::new(h, c.group, seed));
    }
    sk.get_constraint_mut(hc).val_p = h;
}

fn aux_param_seed(sk: &Sketch, c: &Constraint) -> f64 {
    let ratio = |a: Vector, b: Vector| {
        let bb = b.dot(b);
        if bb < 1e-12 { 0.0 } else { a.dot(b) / bb }
    };
    match c.kind {
        ConstraintKind::PtOnLine => {
            let ln = sk.get_entity(c.entity_a);
            let a = point_get_num(sk, sk.get_entity(ln.point[0]));
            let b = point_get_num(sk, sk.get_entity(ln.point[1]));
            let p = point_get_num(sk, sk.get_entity(c.pt_a));
            ratio(p - a, b - a)
        }
        ConstraintKind::Parallel => {
            let a = vector_get_num(sk, sk.get_entity(c.entity_a));
            let b = vector_get_num(sk, sk.get_entity(c.entity_b));
            ratio(a, b)
        }
        ConstraintKind::SameOrientation => {
            let an = normal_get_num(sk, sk.get_entity(c.entity_a)).rotation_n();
            let bn = normal_get_num(sk, sk.get_entity(c.entity_b)).rotation_n();
            ratio(an, bn)
        }
        ConstraintKind::CubicLineTangent => {
            let cubic = sk.get_entity(c.entity_a);
            let mut ar = ExprArena::new();
            let t = if c.other {
                cubic_get_finish_tangent_exprs(sk, &mut ar, cubic)
            } else {
                cubic_get_start_tangent_exprs(sk, &mut ar, cubic)
            };
            let a = t.eval_with(&ar, &|h| sk.param_value(h));
            let b = vector_get_num(sk, sk.get_entity(c.entity_b));
            ratio(a, b)
        }
        _ => 0.0,
    }
}

/// Generate this constraint's equations into `eqs`. Reference constraints
/// emit nothing unless `for_reference` is set (the revaluation path).
pub fn generate_equations(
    sk: &Sketch,
    ar: &mut ExprArena,
    c: &Constraint,
    eqs: &mut Vec<Equation>,
    for_reference: bool,
) {
    if c.reference && !for_reference {
        return;
    }

    let ex_a = ar.constant(c.val_a);
    match c.kind {
        ConstraintKind::PtPtDistance => {
            let d = distance(sk, ar, c.workplane, c.pt_a, c.pt_b);
            let eq = ar.minus(d, ex_a);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::ProjPtDistance => {
            let pa = point_get_exprs(sk, ar, sk.get_entity(c.pt_a));
            let pb = point_get_exprs(sk, ar, sk.get_entity(c.pt_b));
            let dp = pb.minus(pa, ar);

            let pp = vector_get_exprs(sk, ar, sk.get_entity(c.entity_a));
            let one = ar.constant(1.0);
            let pp = pp.with_magnitude(one, ar);

            let proj = dp.dot(pp, ar);
            let eq = ar.minus(proj, ex_a);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::PtLineDistance => {
            let d = point_line_distance(sk, ar, c.workplane, c.pt_a, c.entity_a);
            let eq = ar.minus(d, ex_a);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::PtPlaneDistance => {
            let pt = point_get_exprs(sk, ar, sk.get_entity(c.pt_a));
            let d = point_plane_distance(sk, ar, pt, c.entity_a);
            let eq = ar.minus(d, ex_a);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::PtFaceDistance => {
            let pt = point_get_exprs(sk, ar, sk.get_entity(c.pt_a));
            let f = sk.get_entity(c.entity_a);
            let p0 = face_get_point_exprs(sk, ar, f);
            let n = face_get_normal_exprs(sk, ar, f);
            let rel = pt.minus(p0, ar);
            let dot = rel.dot(n, ar);
            let eq = ar.minus(dot, ex_a);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::EqualLengthLines => {
            let a = sk.get_entity(c.entity_a);
            let b = sk.get_entity(c.entity_b);
            let la = distance(sk, ar, c.workplane, a.point[0], a.point[1]);
            let lb = distance(sk, ar, c.workplane, b.point[0], b.point[1]);
            let eq = ar.minus(la, lb);
            add_eq(eqs, c, eq, 0);
        }

        // These work on distance squared, since the pt-line distances are
        // signed and only the magnitude matters.
        ConstraintKind::EqLenPtLineD => {
            let for_len = sk.get_entity(c.entity_a);
            let d1 = distance(sk, ar, c.workplane, for_len.point[0], for_len.point[1]);
            let d2 = point_line_distance(sk, ar, c.workplane, c.pt_a, c.entity_b);
            let d1s = ar.square(d1);
            let d2s = ar.square(d2);
            let eq = ar.minus(d1s, d2s);
            add_eq(eqs, c, eq, 0);
        }
        ConstraintKind::EqPtLnDistances => {
            let d1 = point_line_distance(sk, ar, c.workplane, c.pt_a, c.entity_a);
            let d2 = point_line_distance(sk, ar, c.workplane, c.pt_b, c.entity_b);
            let d1s = ar.square(d1);
            let d2s = ar.square(d2);
            let eq = ar.minus(d1s, d2s);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::LengthRatio => {
            let a = sk.get_entity(c.entity_a);
            let b = sk.get_entity(c.entity_b);
            let la = distance(sk, ar, c.workplane, a.point[0], a.point[1]);
            let lb = distance(sk, ar, c.workplane, b.point[0], b.point[1]);
            let ratio = ar.div(la, lb);
            let eq = ar.minus(ratio, ex_a);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::LengthDifference => {
            let a = sk.get_entity(c.entity_a);
            let b = sk.get_entity(c.entity_b);
            let la = distance(sk, ar, c.workplane, a.point[0], a.point[1]);
            let lb = distance(sk, ar, c.workplane, b.point[0], b.point[1]);
            let diff = ar.minus(la, lb);
            let eq = ar.minus(diff, ex_a);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::Diameter => {
            let circle = sk.get_entity(c.entity_a);
            let r = circle_get_radius_expr(sk, ar, circle);
            let two = ar.constant(2.0);
            let d = ar.times(r, two);
            let eq = ar.minus(d, ex_a);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::EqualRadius => {
            let c1 = sk.get_entity(c.entity_a);
            let c2 = sk.get_entity(c.entity_b);
            let r1 = circle_get_radius_expr(sk, ar, c1);
            let r2 = circle_get_radius_expr(sk, ar, c2);
            let eq = ar.minus(r1, r2);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::EqualLineArcLen => {
            let line = sk.get_entity(c.entity_a);
            let arc = sk.get_entity(c.entity_b);

            let l0 = point_get_exprs(sk, ar, sk.get_entity(line.point[0]));
            let l1 = point_get_exprs(sk, ar, sk.get_entity(line.point[1]));
            let ll = l1.minus(l0, ar).magnitude(ar);

            let ao = point_get_exprs(sk, ar, sk.get_entity(arc.point[0]));
            let as_ = point_get_exprs(sk, ar, sk.get_entity(arc.point[1]));
            let af = point_get_exprs(sk, ar, sk.get_entity(arc.point[2]));

            let aos = as_.minus(ao, ar);
            let aof = af.minus(ao, ar);
            let r = aof.magnitude(ar);

            let n = normal_exprs_n(sk, ar, sk.get_entity(arc.normal));
            let one = ar.constant(1.0);
            let u = aos.with_magnitude(one, ar);
            let v = n.cross(u, ar);
            // In that csys the arc starts at angle zero.
            let fu = aof.dot(u, ar);
            let costheta = ar.div(fu, r);
            let fv = aof.dot(v, ar);
            let sintheta = ar.div(fv, r);

            // Pick the inverse-trig form numerically valid for the current
            // sweep; acos is not invertible across pi, asin not across
            // pi/2, so the choice switches at 3pi/4 and 5pi/4.
            let (_, _, dtheta) = arc_get_angles(sk, arc);
            let theta = if dtheta < 3.0 * PI / 4.0 {
                ar.acos(costheta)
            } else if dtheta < 5.0 * PI / 4.0 {
                let asin = ar.asin(sintheta);
                let pi = ar.constant(PI);
                ar.minus(pi, asin)
            } else {
                let acos = ar.acos(costheta);
                let two_pi = ar.constant(2.0 * PI);
                ar.minus(two_pi, acos)
            };

            let arclen = ar.times(r, theta);
            let eq = ar.minus(arclen, ll);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::PointsCoincident => {
            let a = sk.get_entity(c.pt_a);
            let b = sk.get_entity(c.pt_b);
            if c.workplane == HEntity::FREE_IN_3D {
                let pa = point_get_exprs(sk, ar, a);
                let pb = point_get_exprs(sk, ar, b);
                let eq = pa.minus(pb, ar);
                add_eq(eqs, c, eq.x, 0);
                add_eq(eqs, c, eq.y, 1);
                add_eq(eqs, c, eq.z, 2);
            } else {
                let (au, av) = point_get_exprs_in_workplane_uv(sk, ar, a, c.workplane);
                let (bu, bv) = point_get_exprs_in_workplane_uv(sk, ar, b, c.workplane);
                let equ = ar.minus(au, bu);
                let eqv = ar.minus(av, bv);
                add_eq(eqs, c, equ, 0);
                add_eq(eqs, c, eqv, 1);
            }
        }

        ConstraintKind::PtInPlane => {
            // Works the same whether projected or not.
            let pt = point_get_exprs(sk, ar, sk.get_entity(c.pt_a));
            let eq = point_plane_distance(sk, ar, pt, c.entity_a);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::PtOnFace => {
            // n dot (p - p0) = 0
            let p = point_get_exprs(sk, ar, sk.get_entity(c.pt_a));
            let f = sk.get_entity(c.entity_a);
            let p0 = face_get_point_exprs(sk, ar, f);
            let n = face_get_normal_exprs(sk, ar, f);
            let rel = p.minus(p0, ar);
            let eq = rel.dot(n, ar);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::PtOnLine => {
            let ln = sk.get_entity(c.entity_a);
            let a = sk.get_entity(ln.point[0]);
            let b = sk.get_entity(ln.point[1]);
            let p = sk.get_entity(c.pt_a);

            let ep = point_get_exprs_in_workplane(sk, ar, p, c.workplane);
            let ea = point_get_exprs_in_workplane(sk, ar, a, c.workplane);
            let eb = point_get_exprs_in_workplane(sk, ar, b, c.workplane);

            let t = ar.param(c.val_p);
            let chord = eb.minus(ea, ar);
            let along = chord.scaled_by(t, ar);
            let pt_on_line = ea.plus(along, ar);
            let eq = pt_on_line.minus(ep, ar);
            add_eq_vector(eqs, c, eq, 0);
        }

        ConstraintKind::PtOnCircle => {
            // Constrains the point to the cylinder through the circle.
            let circle = sk.get_entity(c.entity_a);
            let center = point_get_exprs(sk, ar, sk.get_entity(circle.point[0]));
            let pt = point_get_exprs(sk, ar, sk.get_entity(c.pt_a));
            let normal = sk.get_entity(circle.normal);
            let u = normal_exprs_u(sk, ar, normal);
            let v = normal_exprs_v(sk, ar, normal);

            let rel = center.minus(pt, ar);
            let du = rel.dot(u, ar);
            let dv = rel.dot(v, ar);

            let r = circle_get_radius_expr(sk, ar, circle);

            let du2 = ar.square(du);
            let dv2 = ar.square(dv);
            let s = ar.plus(du2, dv2);
            let dist = ar.sqrt(s);
            let eq = ar.minus(dist, r);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::AtMidpoint => {
            if c.workplane == HEntity::FREE_IN_3D {
                let ln = sk.get_entity(c.entity_a);
                let a = point_get_exprs(sk, ar, sk.get_entity(ln.point[0]));
                let b = point_get_exprs(sk, ar, sk.get_entity(ln.point[1]));
                let half = ar.constant(0.5);
                let m = a.plus(b, ar).scaled_by(half, ar);

                if c.pt_a.is_some() {
                    let p = point_get_exprs(sk, ar, sk.get_entity(c.pt_a));
                    let eq = m.minus(p, ar);
                    add_eq(eqs, c, eq.x, 0);
                    add_eq(eqs, c, eq.y, 1);
                    add_eq(eqs, c, eq.z, 2);
                } else {
                    let eq = point_plane_distance(sk, ar, m, c.entity_b);
                    add_eq(eqs, c, eq, 0);
                }
            } else {
                let ln = sk.get_entity(c.entity_a);
                let a = sk.get_entity(ln.point[0]);
                let b = sk.get_entity(ln.point[1]);

                let (au, av) = point_get_exprs_in_workplane_uv(sk, ar, a, c.workplane);
                let (bu, bv) = point_get_exprs_in_workplane_uv(sk, ar, b, c.workplane);
                let half = ar.constant(0.5);
                let su = ar.plus(au, bu);
                let mu = ar.times(half, su);
                let half2 = ar.constant(0.5);
                let sv = ar.plus(av, bv);
                let mv = ar.times(half2, sv);

                if c.pt_a.is_some() {
                    let p = sk.get_entity(c.pt_a);
                    let (pu, pv) = point_get_exprs_in_workplane_uv(sk, ar, p, c.workplane);
                    let equ = ar.minus(pu, mu);
                    let eqv = ar.minus(pv, mv);
                    add_eq(eqs, c, equ, 0);
                    add_eq(eqs, c, eqv, 1);
                } else {
                    let m = point_in_three_space(sk, ar, c.workplane, mu, mv);
                    let eq = point_plane_distance(sk, ar, m, c.entity_b);
                    add_eq(eqs, c, eq, 0);
                }
            }
        }

        ConstraintKind::Symmetric => {
            if c.workplane == HEntity::FREE_IN_3D {
                let plane = c.entity_a;
                let ea = sk.get_entity(c.pt_a);
                let eb = sk.get_entity(c.pt_b);
                let a = point_get_exprs(sk, ar, ea);
                let b = point_get_exprs(sk, ar, eb);

                // The midpoint of the segment between the symmetric points
                // lies on the plane of symmetry.
                let half = ar.constant(0.5);
                let m = a.plus(b, ar).scaled_by(half, ar);
                let eq0 = point_plane_distance(sk, ar, m, plane);
                add_eq(eqs, c, eq0, 0);

                // And projected into the plane of symmetry, the points
                // coincide.
                let (au, av) = point_get_exprs_in_workplane_uv(sk, ar, ea, plane);
                let (bu, bv) = point_get_exprs_in_workplane_uv(sk, ar, eb, plane);
                let equ = ar.minus(au, bu);
                let eqv = ar.minus(av, bv);
                add_eq(eqs, c, equ, 1);
                add_eq(eqs, c, eqv, 2);
            } else {
                let plane = c.entity_a;
                let a = sk.get_entity(c.pt_a);
                let b = sk.get_entity(c.pt_b);

                let (au, av) = point_get_exprs_in_workplane_uv(sk, ar, a, c.workplane);
                let (bu, bv) = point_get_exprs_in_workplane_uv(sk, ar, b, c.workplane);
                let half = ar.constant(0.5);
                let su = ar.plus(au, bu);
                let mu = ar.times(half, su);
                let half2 = ar.constant(0.5);
                let sv = ar.plus(av, bv);
                let mv = ar.times(half2, sv);

                let m = point_in_three_space(sk, ar, c.workplane, mu, mv);
                let eq0 = point_plane_distance(sk, ar, m, plane);
                add_eq(eqs, c, eq0, 0);

                // A vector in the workplane and in the plane of symmetry;
                // the segment between the points is perpendicular to it.
                let w = sk.get_entity(c.workplane);
                let wnormal = sk.get_entity(w.normal);
                let u = normal_exprs_u(sk, ar, wnormal);
                let v = normal_exprs_v(sk, ar, wnormal);

                let pa = point_get_exprs(sk, ar, a);
                let pb = point_get_exprs(sk, ar, b);
                let (n, _d) = workplane_get_plane_exprs(sk, ar, sk.get_entity(plane));
                let uv = u.cross(v, ar);
                let in_plane = n.cross(uv, ar);
                let rel = pa.minus(pb, ar);
                let eq1 = in_plane.dot(rel, ar);
                add_eq(eqs, c, eq1, 1);
            }
        }

        ConstraintKind::SymmetricHoriz | ConstraintKind::SymmetricVert => {
            assert!(
                c.workplane != HEntity::FREE_IN_3D,
                "unexpected horizontal/vertical symmetric constraint in 3d"
            );

            let a = sk.get_entity(c.pt_a);
            let b = sk.get_entity(c.pt_b);
            let (au, av) = point_get_exprs_in_workplane_uv(sk, ar, a, c.workplane);
            let (bu, bv) = point_get_exprs_in_workplane_uv(sk, ar, b, c.workplane);

            if c.kind == ConstraintKind::SymmetricHoriz {
                let eq0 = ar.minus(av, bv);
                let eq1 = ar.plus(au, bu);
                add_eq(eqs, c, eq0, 0);
                add_eq(eqs, c, eq1, 1);
            } else {
                let eq0 = ar.minus(au, bu);
                let eq1 = ar.plus(av, bv);
                add_eq(eqs, c, eq0, 0);
                add_eq(eqs, c, eq1, 1);
            }
        }

        ConstraintKind::SymmetricLine => {
            let pa = sk.get_entity(c.pt_a);
            let pb = sk.get_entity(c.pt_b);

            let (pau, pav) = point_get_exprs_in_workplane_uv(sk, ar, pa, c.workplane);
            let (pbu, pbv) = point_get_exprs_in_workplane_uv(sk, ar, pb, c.workplane);

            let ln = sk.get_entity(c.entity_a);
            let la = sk.get_entity(ln.point[0]);
            let lb = sk.get_entity(ln.point[1]);
            let (lau, lav) = point_get_exprs_in_workplane_uv(sk, ar, la, c.workplane);
            let (lbu, lbv) = point_get_exprs_in_workplane_uv(sk, ar, lb, c.workplane);

            let dpu = ar.minus(pbu, pau);
            let dpv = ar.minus(pbv, pav);
            let dlu = ar.minus(lbu, lau);
            let dlv = ar.minus(lbv, lav);

            // The segment between the points is perpendicular to the line
            // of symmetry.
            let uu = ar.times(dlu, dpu);
            let vv = ar.times(dlv, dpv);
            let eq0 = ar.plus(uu, vv);
            add_eq(eqs, c, eq0, 0);

            // And their signed distances to it sum to zero.
            let au = ar.minus(lau, pau);
            let av = ar.minus(lav, pav);
            let t1 = ar.times(dlv, au);
            let t2 = ar.times(dlu, av);
            let dista = ar.minus(t1, t2);
            let bu = ar.minus(lau, pbu);
            let bv = ar.minus(lav, pbv);
            let t3 = ar.times(dlv, bu);
            let t4 = ar.times(dlu, bv);
            let distb = ar.minus(t3, t4);
            let eq1 = ar.plus(dista, distb);
            add_eq(eqs, c, eq1, 1);
        }

        ConstraintKind::Horizontal | ConstraintKind::Vertical => {
            assert!(
                c.workplane != HEntity::FREE_IN_3D,
                "unexpected horizontal/vertical constraint in 3d"
            );

            let (ha, hb) = if c.entity_a.is_some() {
                let e = sk.get_entity(c.entity_a);
                (e.point[0], e.point[1])
            } else {
                (c.pt_a, c.pt_b)
            };
            let a = sk.get_entity(ha);
            let b = sk.get_entity(hb);

            let (au, av) = point_get_exprs_in_workplane_uv(sk, ar, a, c.workplane);
            let (bu, bv) = point_get_exprs_in_workplane_uv(sk, ar, b, c.workplane);

            let eq = if c.kind == ConstraintKind::Horizontal {
                ar.minus(av, bv)
            } else {
                ar.minus(au, bu)
            };
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::SameOrientation => {
            let a = sk.get_entity(c.entity_a);
            let b = sk.get_entity(c.entity_b);

            let au = normal_exprs_u(sk, ar, a);
            let an = normal_exprs_n(sk, ar, a);
            let bu = normal_exprs_u(sk, ar, b);
            let bv = normal_exprs_v(sk, ar, b);
            let bn = normal_exprs_n(sk, ar, b);

            let eq = vectors_parallel_3d(an, bn, c.val_p, ar);
            add_eq(eqs, c, eq.x, 0);
            add_eq(eqs, c, eq.y, 1);
            add_eq(eqs, c, eq.z, 2);

            // Allow either handedness for the in-plane basis, whichever the
            // current geometry is closer to.
            let d1 = au.dot(bv, ar);
            let d2 = au.dot(bu, ar);
            let lk = |h| sk.param_value(h);
            if ar.eval_with(d1, &lk).abs() < ar.eval_with(d2, &lk).abs() {
                add_eq(eqs, c, d1, 3);
            } else {
                add_eq(eqs, c, d2, 3);
            }
        }

        ConstraintKind::Perpendicular | ConstraintKind::Angle => {
            let a = sk.get_entity(c.entity_a);
            let b = sk.get_entity(c.entity_b);
            let mut ae = vector_get_exprs(sk, ar, a);
            let be = vector_get_exprs(sk, ar, b);
            if c.other {
                let neg = ar.constant(-1.0);
                ae = ae.scaled_by(neg, ar);
            }
            let cosine = direction_cosine(sk, ar, c.workplane, ae, be);

            if c.kind == ConstraintKind::Angle {
                // The direction cosine matches the cosine of the dimension.
                // Near 0 or 180 degrees the difference of cosines goes flat
                // and falsely trips the rank test; the residual is gained up
                // there, and the gain's magnitude feeds the rank threshold.
                let rc = (c.val_a * PI / 180.0).cos();
                let arc = rc.abs();
                let gain = if arc > 0.99 {
                    0.01 / (1.00001 - arc)
                } else {
                    1.0
                };
                let rce = ar.constant(rc);
                let diff = ar.minus(cosine, rce);
                let mult = ar.constant(gain);
                let eq = ar.times(diff, mult);
                add_eq(eqs, c, eq, 0);
            } else {
                // Dot product, and so the cosine, equals zero.
                add_eq(eqs, c, cosine, 0);
            }
        }

        ConstraintKind::EqualAngle => {
            let a = sk.get_entity(c.entity_a);
            let b = sk.get_entity(c.entity_b);
            let cc = sk.get_entity(c.entity_c);
            let d = sk.get_entity(c.entity_d);
            let mut ae = vector_get_exprs(sk, ar, a);
            let be = vector_get_exprs(sk, ar, b);
            let ce = vector_get_exprs(sk, ar, cc);
            let de = vector_get_exprs(sk, ar, d);

            if c.other {
                let neg = ar.constant(-1.0);
                ae = ae.scaled_by(neg, ar);
            }

            let cab = direction_cosine(sk, ar, c.workplane, ae, be);
            let ccd = direction_cosine(sk, ar, c.workplane, ce, de);
            let eq = ar.minus(cab, ccd);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::ArcLineTangent => {
            let arc = sk.get_entity(c.entity_a);
            let line = sk.get_entity(c.entity_b);

            let ac = point_get_exprs(sk, ar, sk.get_entity(arc.point[0]));
            let endpoint = arc.point[if c.other { 2 } else { 1 }];
            let ap = point_get_exprs(sk, ar, sk.get_entity(endpoint));

            let ld = vector_get_exprs(sk, ar, line);

            // The line is perpendicular to the radius at the endpoint.
            let rel = ac.minus(ap, ar);
            let eq = ld.dot(rel, ar);
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::CubicLineTangent => {
            let cubic = sk.get_entity(c.entity_a);
            let line = sk.get_entity(c.entity_b);

            let a = if c.other {
                cubic_get_finish_tangent_exprs(sk, ar, cubic)
            } else {
                cubic_get_start_tangent_exprs(sk, ar, cubic)
            };
            let b = vector_get_exprs(sk, ar, line);

            if c.workplane == HEntity::FREE_IN_3D {
                let eq = vectors_parallel_3d(a, b, c.val_p, ar);
                add_eq_vector(eqs, c, eq, 0);
            } else {
                let w = sk.get_entity(c.workplane);
                let wn = normal_exprs_n(sk, ar, sk.get_entity(w.normal));
                let cr = a.cross(b, ar);
                let eq = cr.dot(wn, ar);
                add_eq(eqs, c, eq, 0);
            }
        }

        ConstraintKind::CurveCurveTangent => {
            let mut parallel = true;
            let mut dir = [None, None];
            for i in 0..2 {
                let e = sk.get_entity(if i == 0 { c.entity_a } else { c.entity_b });
                let oth = if i == 0 { c.other } else { c.other2 };

                dir[i] = Some(match e.kind {
                    EntityKind::ArcOfCircle => {
                        let center = point_get_exprs(sk, ar, sk.get_entity(e.point[0]));
                        let endpoint = point_get_exprs(
                            sk,
                            ar,
                            sk.get_entity(e.point[if oth { 2 } else { 1 }]),
                        );
                        // Center-to-endpoint is the radius: normal to the
                        // tangent, not parallel to it.
                        parallel = !parallel;
                        endpoint.minus(center, ar)
                    }
                    EntityKind::Cubic => {
                        if oth {
                            cubic_get_finish_tangent_exprs(sk, ar, e)
                        } else {
                            cubic_get_start_tangent_exprs(sk, ar, e)
                        }
                    }
                    _ => panic!("unexpected entity types for curve-curve tangency"),
                });
            }
            let d0 = dir[0].unwrap();
            let d1 = dir[1].unwrap();
            let eq = if parallel {
                let w = sk.get_entity(c.workplane);
                let wn = normal_exprs_n(sk, ar, sk.get_entity(w.normal));
                let cr = d0.cross(d1, ar);
                cr.dot(wn, ar)
            } else {
                d0.dot(d1, ar)
            };
            add_eq(eqs, c, eq, 0);
        }

        ConstraintKind::Parallel => {
            let ea = sk.get_entity(c.entity_a);
            let eb = sk.get_entity(c.entity_b);
            let a = vector_get_exprs_in_workplane(sk, ar, ea, c.workplane);
            let b = vector_get_exprs_in_workplane(sk, ar, eb, c.workplane);

            if c.workplane == HEntity::FREE_IN_3D {
                let eq = vectors_parallel_3d(a, b, c.val_p, ar);
                add_eq_vector(eqs, c, eq, 0);
            } else {
                // Written in the workplane csys the normal is (0, 0, 1), so
                // only the z term of the cross product survives; write the
                // pseudo-scalar product directly.
                let t1 = ar.times(a.x, b.y);
                let t2 = ar.times(a.y, b.x);
                let eq = ar.minus(t1, t2);
                add_eq(eqs, c, eq, 0);
            }
        }

        ConstraintKind::WhereDragged => {
            let ep = sk.get_entity(c.pt_a);
            if c.workplane == HEntity::FREE_IN_3D {
                let ev = point_get_exprs(sk, ar, ep);
                let v = point_get_num(sk, ep);
                let cx = ar.constant(v.x);
                let cy = ar.constant(v.y);
                let cz = ar.constant(v.z);
                let eqx = ar.minus(ev.x, cx);
                let eqy = ar.minus(ev.y, cy);
                let eqz = ar.minus(ev.z, cz);
                add_eq(eqs, c, eqx, 0);
                add_eq(eqs, c, eqy, 1);
                add_eq(eqs, c, eqz, 2);
            } else {
                let (u, v) = point_get_exprs_in_workplane_uv(sk, ar, ep, c.workplane);
                let cur = point_get_num_in_workplane(sk, ep, c.workplane);
                let ecu = ar.constant(cur.u);
                let ecv = ar.constant(cur.v);
                let equ = ar.minus(u, ecu);
                let eqv = ar.minus(v, ecv);
                add_eq(eqs, c, equ, 0);
                add_eq(eqs, c, eqv, 1);
            }
        }

        ConstraintKind::Comment => {}
    }
}

/// The inverse of equation generation: compute what `val_a` (or the
/// auxiliary scalar) would have to be for the residual to vanish at the
/// current parameter values, and store it. This is how reference dimensions
/// display live values.
pub fn modify_to_satisfy(sk: &mut Sketch, hc: HConstraint) {
    let c = sk.get_constraint(hc).clone();
    match c.kind {
        ConstraintKind::Angle => {
            let mut a = vector_get_num(sk, sk.get_entity(c.entity_a));
            let b = vector_get_num(sk, sk.get_entity(c.entity_b));
            if c.other {
                a = -a;
            }
            let (a, b) = if c.workplane != HEntity::FREE_IN_3D {
                (
                    project_vector_into(sk, a, c.workplane),
                    project_vector_into(sk, b, c.workplane),
                )
            } else {
                (a, b)
            };
            let cosine = a.dot(b) / (a.magnitude() * b.magnitude());
            sk.get_constraint_mut(hc).val_a = cosine.acos() * 180.0 / PI;
        }
        ConstraintKind::PtOnLine => {
            let ln = sk.get_entity(c.entity_a);
            let mut ar = ExprArena::new();
            let ea = point_get_exprs_in_workplane(
                sk,
                &mut ar,
                sk.get_entity(ln.point[0]),
                c.workplane,
            );
            let eb = point_get_exprs_in_workplane(
                sk,
                &mut ar,
                sk.get_entity(ln.point[1]),
                c.workplane,
            );
            let ep =
                point_get_exprs_in_workplane(sk, &mut ar, sk.get_entity(c.pt_a), c.workplane);
            let lk = |h| sk.param_value(h);
            let a = ea.eval_with(&ar, &lk);
            let b = eb.eval_with(&ar, &lk);
            let p = ep.eval_with(&ar, &lk);
            let ba = b - a;
            let t = ba.dot(p - a) / ba.dot(ba);
            sk.get_param_mut(c.val_p).val = t;
        }
        _ => {
            // Single-equation dimensions are written f(...) − valA = 0, so
            // the current residual is exactly the correction to apply.
            let mut ar = ExprArena::new();
            let mut eqs = Vec::new();
            generate_equations(sk, &mut ar, &c, &mut eqs, true);
            assert!(
                eqs.len() == 1,
                "expected constraint to generate a single equation"
            );
            let r = ar.eval_with(eqs[0].e, &|h| sk.param_value(h));
            sk.get_constraint_mut(hc).val_a += r;
        }
    }
}

/// Project a direction vector into a workplane (numerically): keep only its
/// components along the plane's U and V basis.
fn project_vector_into(sk: &Sketch, v: Vector, wrkpl: HEntity) -> Vector {
    let w = sk.get_entity(wrkpl);
    let q = normal_get_num(sk, sk.get_entity(w.normal));
    let u = q.rotation_u();
    let vv = q.rotation_v();
    u.scaled_by(v.dot(u)) + vv.scaled_by(v.dot(vv))
}
