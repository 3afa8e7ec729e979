//! Expression emitters for entities: the point/normal/vector forms each
//! entity kind exposes, in 3D and projected-into-workplane variants, plus
//! the numeric (current-value) getters the branch-selection logic needs.
//!
//! Passing an entity of the wrong kind to any of these is a programming
//! error and panics.

use trammel_expr::{ExprArena, ExprQuaternion, ExprRef, ExprVector};
use trammel_types::{Entity, EntityKind, HEntity, Point2d, Quaternion, Sketch, Vector};

use crate::Equation;

/// Position of a point entity as three scalar expressions in the base csys.
pub fn point_get_exprs(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprVector {
    match e.kind {
        EntityKind::PointIn3d => {
            ExprVector::from_params(e.param[0], e.param[1], e.param[2], ar)
        }
        EntityKind::PointIn2d => {
            let wp = sk.get_entity(e.workplane);
            let origin = workplane_get_offset_exprs(sk, ar, wp);
            let normal = sk.get_entity(wp.normal);
            let q = normal_get_exprs(sk, ar, normal);
            let u = q.rotation_u(ar);
            let v = q.rotation_v(ar);
            let pu = ar.param(e.param[0]);
            let pv = ar.param(e.param[1]);
            let su = u.scaled_by(pu, ar);
            let sv = v.scaled_by(pv, ar);
            origin.plus(su, ar).plus(sv, ar)
        }
        EntityKind::PointNTrans => {
            let base = ExprVector::from_num(e.num_point, ar);
            let trans = ExprVector::from_params(e.param[0], e.param[1], e.param[2], ar);
            let times = ar.constant(e.times_applied as f64);
            let shift = trans.scaled_by(times, ar);
            base.plus(shift, ar)
        }
        EntityKind::PointNRotTrans => {
            let base = ExprVector::from_num(e.num_point, ar);
            let q = ExprQuaternion::from_params(
                e.param[3], e.param[4], e.param[5], e.param[6], ar,
            );
            let rotated = q.rotate(base, ar);
            let trans = ExprVector::from_params(e.param[0], e.param[1], e.param[2], ar);
            rotated.plus(trans, ar)
        }
        EntityKind::PointNCopy => ExprVector::from_num(e.num_point, ar),
        EntityKind::PointNRotAa => {
            let center = ExprVector::from_params(e.param[0], e.param[1], e.param[2], ar);
            let q = axis_angle_quaternion_exprs(e, 3, ar);
            let base = ExprVector::from_num(e.num_point, ar);
            let rel = base.minus(center, ar);
            let rot = q.rotate(rel, ar);
            rot.plus(center, ar)
        }
        EntityKind::PointNRotAxisTrans => {
            // Like the rotate-about-axis form, but also translated along the
            // rotation axis (a helix step).
            let center = ExprVector::from_params(e.param[0], e.param[1], e.param[2], ar);
            let q = axis_angle_quaternion_exprs(e, 3, ar);
            let base = ExprVector::from_num(e.num_point, ar);
            let rel = base.minus(center, ar);
            let rot = q.rotate(rel, ar);
            let on_axis = rot.plus(center, ar);

            let axis = ExprVector::from_params(e.param[4], e.param[5], e.param[6], ar);
            let dist = ar.param(e.param[7]);
            let times = ar.constant(e.times_applied as f64);
            let step = ar.times(dist, times);
            let shift = axis.scaled_by(step, ar);
            on_axis.plus(shift, ar)
        }
        _ => panic!("entity {:?} is not a point", e.kind),
    }
}

/// The axis-angle quaternion of a rotation transform entity: `param[p0]` is
/// the per-step angle (applied `times_applied` times), `param[p0+1..p0+3]`
/// the unit axis.
fn axis_angle_quaternion_exprs(e: &Entity, p0: usize, ar: &mut ExprArena) -> ExprQuaternion {
    let theta0 = ar.param(e.param[p0]);
    let times = ar.constant(e.times_applied as f64);
    let theta = ar.times(times, theta0);
    let half = ar.constant(0.5);
    let th2 = ar.times(theta, half);
    let w = ar.cos(th2);
    let s = ar.sin(th2);
    let ax = ar.param(e.param[p0 + 1]);
    let ay = ar.param(e.param[p0 + 2]);
    let az = ar.param(e.param[p0 + 3]);
    ExprQuaternion {
        w,
        vx: ar.times(ax, s),
        vy: ar.times(ay, s),
        vz: ar.times(az, s),
    }
}

/// (u, v) coordinates of a point projected into a workplane. A 2D point
/// asked about its own workplane answers with its own params; everything
/// else is projected through the plane's basis.
pub fn point_get_exprs_in_workplane_uv(
    sk: &Sketch,
    ar: &mut ExprArena,
    e: &Entity,
    wrkpl: HEntity,
) -> (ExprRef, ExprRef) {
    if e.kind == EntityKind::PointIn2d && e.workplane == wrkpl {
        return (ar.param(e.param[0]), ar.param(e.param[1]));
    }

    let ev = point_get_exprs(sk, ar, e);
    let w = sk.get_entity(wrkpl);
    let origin = workplane_get_offset_exprs(sk, ar, w);
    let normal = sk.get_entity(w.normal);
    let q = normal_get_exprs(sk, ar, normal);
    let u = q.rotation_u(ar);
    let v = q.rotation_v(ar);
    let rel = ev.minus(origin, ar);
    (rel.dot(u, ar), rel.dot(v, ar))
}

/// Point expressions in the csys a constraint works in: the 3D components
/// when free in 3D, else `(u, v, 0)` in the workplane basis.
pub fn point_get_exprs_in_workplane(
    sk: &Sketch,
    ar: &mut ExprArena,
    e: &Entity,
    wrkpl: HEntity,
) -> ExprVector {
    if wrkpl == HEntity::FREE_IN_3D {
        point_get_exprs(sk, ar, e)
    } else {
        let (u, v) = point_get_exprs_in_workplane_uv(sk, ar, e, wrkpl);
        let zero = ar.constant(0.0);
        ExprVector::from_refs(u, v, zero)
    }
}

/// Orientation quaternion of a normal entity.
pub fn normal_get_exprs(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprQuaternion {
    match e.kind {
        EntityKind::NormalIn3d => {
            ExprQuaternion::from_params(e.param[0], e.param[1], e.param[2], e.param[3], ar)
        }
        EntityKind::NormalIn2d => {
            // A 2D normal is its workplane's normal.
            let wp = sk.get_entity(e.workplane);
            let n = sk.get_entity(wp.normal);
            normal_get_exprs(sk, ar, n)
        }
        EntityKind::NormalNCopy => ExprQuaternion::from_num(e.num_normal, ar),
        EntityKind::NormalNRot => {
            let q = ExprQuaternion::from_params(e.param[0], e.param[1], e.param[2], e.param[3], ar);
            let base = ExprQuaternion::from_num(e.num_normal, ar);
            q.times(base, ar)
        }
        EntityKind::NormalNRotAa => {
            let q = axis_angle_quaternion_exprs(e, 0, ar);
            let base = ExprQuaternion::from_num(e.num_normal, ar);
            q.times(base, ar)
        }
        _ => panic!("entity {:?} is not a normal", e.kind),
    }
}

pub fn normal_exprs_u(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprVector {
    let q = normal_get_exprs(sk, ar, e);
    q.rotation_u(ar)
}

pub fn normal_exprs_v(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprVector {
    let q = normal_get_exprs(sk, ar, e);
    q.rotation_v(ar)
}

pub fn normal_exprs_n(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprVector {
    let q = normal_get_exprs(sk, ar, e);
    q.rotation_n(ar)
}

/// Origin of a workplane.
pub fn workplane_get_offset_exprs(sk: &Sketch, ar: &mut ExprArena, wp: &Entity) -> ExprVector {
    assert!(wp.is_workplane(), "entity {:?} is not a workplane", wp.kind);
    let origin = sk.get_entity(wp.point[0]);
    point_get_exprs(sk, ar, origin)
}

/// The workplane as `n·p = d`: returns (n, d).
pub fn workplane_get_plane_exprs(
    sk: &Sketch,
    ar: &mut ExprArena,
    wp: &Entity,
) -> (ExprVector, ExprRef) {
    assert!(wp.is_workplane(), "entity {:?} is not a workplane", wp.kind);
    let normal = sk.get_entity(wp.normal);
    let n = normal_exprs_n(sk, ar, normal);
    let origin = workplane_get_offset_exprs(sk, ar, wp);
    let d = origin.dot(n, ar);
    (n, d)
}

/// Direction vector of an entity that has one: a line's chord, a normal's
/// N vector.
pub fn vector_get_exprs(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprVector {
    match e.kind {
        EntityKind::LineSegment => {
            let a = sk.get_entity(e.point[0]);
            let b = sk.get_entity(e.point[1]);
            let ea = point_get_exprs(sk, ar, a);
            let eb = point_get_exprs(sk, ar, b);
            ea.minus(eb, ar)
        }
        _ if e.is_normal() => normal_exprs_n(sk, ar, e),
        _ => panic!("entity {:?} has no vector form", e.kind),
    }
}

/// Direction vector projected into a workplane's basis: `(d·U, d·V, 0)`,
/// or the plain 3D vector when free in 3D.
pub fn vector_get_exprs_in_workplane(
    sk: &Sketch,
    ar: &mut ExprArena,
    e: &Entity,
    wrkpl: HEntity,
) -> ExprVector {
    let d = vector_get_exprs(sk, ar, e);
    if wrkpl == HEntity::FREE_IN_3D {
        return d;
    }
    let w = sk.get_entity(wrkpl);
    let normal = sk.get_entity(w.normal);
    let q = normal_get_exprs(sk, ar, normal);
    let u = q.rotation_u(ar);
    let v = q.rotation_v(ar);
    let zero = ar.constant(0.0);
    ExprVector::from_refs(d.dot(u, ar), d.dot(v, ar), zero)
}

/// Radius of a circle or arc. A circle's radius is its distance entity; an
/// arc's is the distance from its center to its start point.
pub fn circle_get_radius_expr(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprRef {
    match e.kind {
        EntityKind::Circle => {
            let d = sk.get_entity(e.distance);
            distance_get_expr(sk, ar, d)
        }
        EntityKind::ArcOfCircle => {
            let c = sk.get_entity(e.point[0]);
            let s = sk.get_entity(e.point[1]);
            let ec = point_get_exprs(sk, ar, c);
            let es = point_get_exprs(sk, ar, s);
            es.minus(ec, ar).magnitude(ar)
        }
        _ => panic!("entity {:?} has no radius", e.kind),
    }
}

pub fn distance_get_expr(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprRef {
    match e.kind {
        EntityKind::Distance => ar.param(e.param[0]),
        EntityKind::DistanceNCopy => ar.constant(e.num_distance),
        _ => panic!("entity {:?} is not a distance", e.kind),
    }
}

/// Tangent direction at a cubic's start: into the curve, from the second
/// control point toward the first.
pub fn cubic_get_start_tangent_exprs(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprVector {
    assert!(
        matches!(e.kind, EntityKind::Cubic | EntityKind::CubicPeriodic),
        "entity {:?} is not a cubic",
        e.kind
    );
    let on = sk.get_entity(e.point[0]);
    let off = sk.get_entity(e.point[1]);
    let eon = point_get_exprs(sk, ar, on);
    let eoff = point_get_exprs(sk, ar, off);
    eon.minus(eoff, ar)
}

pub fn cubic_get_finish_tangent_exprs(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprVector {
    assert!(
        matches!(e.kind, EntityKind::Cubic | EntityKind::CubicPeriodic),
        "entity {:?} is not a cubic",
        e.kind
    );
    let on = sk.get_entity(e.point[3]);
    let off = sk.get_entity(e.point[2]);
    let eon = point_get_exprs(sk, ar, on);
    let eoff = point_get_exprs(sk, ar, off);
    eon.minus(eoff, ar)
}

/// A point on a face entity.
pub fn face_get_point_exprs(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprVector {
    match e.kind {
        EntityKind::FaceNormalPt => {
            let p = sk.get_entity(e.point[0]);
            point_get_exprs(sk, ar, p)
        }
        EntityKind::FaceNTrans => {
            let base = ExprVector::from_num(e.num_point, ar);
            let trans = ExprVector::from_params(e.param[0], e.param[1], e.param[2], ar);
            let times = ar.constant(e.times_applied as f64);
            let shift = trans.scaled_by(times, ar);
            base.plus(shift, ar)
        }
        EntityKind::FaceNRotTrans => {
            let base = ExprVector::from_num(e.num_point, ar);
            let q = ExprQuaternion::from_params(
                e.param[3], e.param[4], e.param[5], e.param[6], ar,
            );
            let rotated = q.rotate(base, ar);
            let trans = ExprVector::from_params(e.param[0], e.param[1], e.param[2], ar);
            rotated.plus(trans, ar)
        }
        _ => panic!("entity {:?} is not a face", e.kind),
    }
}

/// The (unit) normal of a face entity.
pub fn face_get_normal_exprs(sk: &Sketch, ar: &mut ExprArena, e: &Entity) -> ExprVector {
    let n = Vector::new(e.num_normal.vx, e.num_normal.vy, e.num_normal.vz).with_magnitude(1.0);
    match e.kind {
        EntityKind::FaceNormalPt | EntityKind::FaceNTrans => ExprVector::from_num(n, ar),
        EntityKind::FaceNRotTrans => {
            let base = ExprVector::from_num(n, ar);
            let q = ExprQuaternion::from_params(
                e.param[3], e.param[4], e.param[5], e.param[6], ar,
            );
            q.rotate(base, ar)
        }
        _ => panic!("entity {:?} is not a face", e.kind),
    }
}

// ── Numeric (current-value) getters ─────────────────────────────────────

pub fn point_get_num(sk: &Sketch, e: &Entity) -> Vector {
    let mut ar = ExprArena::new();
    let v = point_get_exprs(sk, &mut ar, e);
    v.eval_with(&ar, &|h| sk.param_value(h))
}

pub fn normal_get_num(sk: &Sketch, e: &Entity) -> Quaternion {
    let mut ar = ExprArena::new();
    let q = normal_get_exprs(sk, &mut ar, e);
    let lk = |h| sk.param_value(h);
    Quaternion::new(
        ar.eval_with(q.w, &lk),
        ar.eval_with(q.vx, &lk),
        ar.eval_with(q.vy, &lk),
        ar.eval_with(q.vz, &lk),
    )
}

/// Current (u, v) of a point as seen from a workplane.
pub fn point_get_num_in_workplane(sk: &Sketch, e: &Entity, wrkpl: HEntity) -> Point2d {
    let mut ar = ExprArena::new();
    let (u, v) = point_get_exprs_in_workplane_uv(sk, &mut ar, e, wrkpl);
    let lk = |h| sk.param_value(h);
    Point2d::new(ar.eval_with(u, &lk), ar.eval_with(v, &lk))
}

pub fn vector_get_num(sk: &Sketch, e: &Entity) -> Vector {
    let mut ar = ExprArena::new();
    let v = vector_get_exprs(sk, &mut ar, e);
    v.eval_with(&ar, &|h| sk.param_value(h))
}

/// Start angle, finish angle, and sweep of an arc, measured in its normal's
/// (U, V) basis about the center. The sweep is normalized to [0, 2π).
pub fn arc_get_angles(sk: &Sketch, arc: &Entity) -> (f64, f64, f64) {
    assert!(
        arc.kind == EntityKind::ArcOfCircle,
        "entity {:?} is not an arc",
        arc.kind
    );
    let q = normal_get_num(sk, sk.get_entity(arc.normal));
    let u = q.rotation_u();
    let v = q.rotation_v();

    let c = point_get_num(sk, sk.get_entity(arc.point[0]));
    let s = point_get_num(sk, sk.get_entity(arc.point[1]));
    let f = point_get_num(sk, sk.get_entity(arc.point[2]));

    let thetas = (s - c).dot(v).atan2((s - c).dot(u));
    let thetaf = (f - c).dot(v).atan2((f - c).dot(u));
    let mut dtheta = thetaf - thetas;
    while dtheta < 0.0 {
        dtheta += 2.0 * std::f64::consts::PI;
    }
    while dtheta >= 2.0 * std::f64::consts::PI {
        dtheta -= 2.0 * std::f64::consts::PI;
    }
    (thetas, thetaf, dtheta)
}

// ── Implicit equations entities carry ───────────────────────────────────

/// The equations an entity imposes on its own parameters: a 3D normal's
/// quaternion stays unit, an arc's start and finish stay equidistant from
/// its center. Emitted before any constraint equations.
pub fn generate_entity_equations(
    sk: &Sketch,
    ar: &mut ExprArena,
    e: &Entity,
    eqs: &mut Vec<Equation>,
) {
    match e.kind {
        EntityKind::NormalIn3d => {
            let q = normal_get_exprs(sk, ar, e);
            let m = q.magnitude(ar);
            let one = ar.constant(1.0);
            let eq = ar.minus(m, one);
            eqs.push(Equation {
                h: e.h.equation(0),
                e: eq,
                owner: trammel_types::HConstraint::NONE,
            });
        }
        EntityKind::ArcOfCircle => {
            let c = sk.get_entity(e.point[0]);
            let s = sk.get_entity(e.point[1]);
            let f = sk.get_entity(e.point[2]);
            let ec = point_get_exprs(sk, ar, c);
            let es = point_get_exprs(sk, ar, s);
            let ef = point_get_exprs(sk, ar, f);
            let rs = es.minus(ec, ar).magnitude(ar);
            let rf = ef.minus(ec, ar).magnitude(ar);
            let eq = ar.minus(rs, rf);
            eqs.push(Equation {
                h: e.h.equation(0),
                e: eq,
                owner: trammel_types::HConstraint::NONE,
            });
        }
        _ => {}
    }
}
