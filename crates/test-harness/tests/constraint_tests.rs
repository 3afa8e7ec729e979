//! Per-constraint solve behavior: each test builds the smallest sketch
//! that exercises one constraint kind, with fixed geometry parked in group
//! 1 (known during the group-2 solve).

use test_harness::{Harness, assert_near};
use trammel_solver::SolveOptions;
use trammel_types::{ConstraintKind, Quaternion, Vector};

#[test]
fn horizontal_point_pair() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let p1 = h.point_2d(2, wp, 0.0, 2.0);
    let p2 = h.point_2d(2, wp, 8.0, 6.0);
    h.constrain(2, ConstraintKind::Horizontal, |c| {
        c.workplane = wp;
        c.pt_a = p1;
        c.pt_b = p2;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);
    let (_, v1) = h.point_uv(p1);
    let (_, v2) = h.point_uv(p2);
    assert_near(v1, v2, 1e-9, "points level");
    assert_eq!(out.dof, 3);
}

#[test]
fn coincident_points_in_3d() {
    let mut h = Harness::new();
    let p1 = h.point_3d(1, 5.0, 3.0, 1.0);
    let p2 = h.point_3d(1, 8.0, 7.0, -2.0);
    h.constrain(1, ConstraintKind::PointsCoincident, |c| {
        c.pt_a = p1;
        c.pt_b = p2;
    });

    let out = h.solve_default(1);
    assert!(out.status.is_okay());
    assert_near(h.distance_between(p1, p2), 0.0, 1e-9, "points coincide");
    assert_eq!(out.dof, 3);
}

#[test]
fn midpoint_of_a_line() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let a = h.point_2d(1, wp, 0.0, 0.0);
    let b = h.point_2d(1, wp, 10.0, 6.0);
    let line = h.line(1, wp, a, b);
    let m = h.point_2d(2, wp, 1.0, 1.0);
    h.constrain(2, ConstraintKind::AtMidpoint, |c| {
        c.workplane = wp;
        c.entity_a = line;
        c.pt_a = m;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    let (u, v) = h.point_uv(m);
    assert_near(u, 5.0, 1e-6, "midpoint u");
    assert_near(v, 3.0, 1e-6, "midpoint v");
}

#[test]
fn symmetric_about_horizontal() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let pa = h.point_2d(2, wp, 2.0, 3.0);
    let pb = h.point_2d(2, wp, 6.0, 3.5);
    h.constrain(2, ConstraintKind::SymmetricHoriz, |c| {
        c.workplane = wp;
        c.pt_a = pa;
        c.pt_b = pb;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    let (ua, va) = h.point_uv(pa);
    let (ub, vb) = h.point_uv(pb);
    assert_near(va, vb, 1e-8, "same v");
    assert_near(ua, -ub, 1e-8, "mirrored u");
}

#[test]
fn symmetric_about_a_line() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    // Axis: the vertical line u = 5, fixed.
    let a1 = h.point_2d(1, wp, 5.0, 0.0);
    let a2 = h.point_2d(1, wp, 5.0, 10.0);
    let axis = h.line(1, wp, a1, a2);

    let pa = h.point_2d(2, wp, 2.0, 3.0);
    let pb = h.point_2d(2, wp, 6.5, 3.2);
    h.constrain(2, ConstraintKind::SymmetricLine, |c| {
        c.workplane = wp;
        c.pt_a = pa;
        c.pt_b = pb;
        c.entity_a = axis;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    let (ua, va) = h.point_uv(pa);
    let (ub, vb) = h.point_uv(pb);
    assert_near(ua + ub, 10.0, 1e-6, "mirrored about u = 5");
    assert_near(va, vb, 1e-6, "same v");
}

#[test]
fn parallel_lines_in_a_workplane() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let a1 = h.point_2d(1, wp, 0.0, 0.0);
    let a2 = h.point_2d(1, wp, 10.0, 0.0);
    let la = h.line(1, wp, a1, a2);

    let b1 = h.point_2d(2, wp, 0.0, 5.0);
    let b2 = h.point_2d(2, wp, 7.0, 8.0);
    let lb = h.line(2, wp, b1, b2);
    h.constrain(2, ConstraintKind::Parallel, |c| {
        c.workplane = wp;
        c.entity_a = la;
        c.entity_b = lb;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    let (u1, v1) = h.point_uv(b1);
    let (u2, v2) = h.point_uv(b2);
    let cross = (u2 - u1) * 0.0 - (v2 - v1) * 10.0;
    assert_near(cross, 0.0, 1e-6, "lines parallel");
}

#[test]
fn parallel_lines_free_in_3d_use_the_auxiliary_scalar() {
    let mut h = Harness::new();
    let a1 = h.point_3d(1, 0.0, 0.0, 0.0);
    let a2 = h.point_3d(1, 4.0, 2.0, 1.0);
    let la = h.line(1, trammel_types::HEntity::FREE_IN_3D, a1, a2);

    let b1 = h.point_3d(1, 1.0, 1.0, 5.0);
    let b2 = h.point_3d(2, 6.0, 2.0, 6.5);
    let lb = h.line(2, trammel_types::HEntity::FREE_IN_3D, b1, b2);
    h.constrain(2, ConstraintKind::Parallel, |c| {
        c.entity_a = la;
        c.entity_b = lb;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);
    let va = h.point3(a1) - h.point3(a2);
    let vb = h.point3(b1) - h.point3(b2);
    assert_near(va.cross(vb).magnitude(), 0.0, 1e-6, "directions parallel");
    // Three equations, one auxiliary unknown, three point coords.
    assert_eq!(out.dof, 1);
}

#[test]
fn perpendicular_lines() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let a1 = h.point_2d(1, wp, 0.0, 0.0);
    let a2 = h.point_2d(1, wp, 10.0, 0.0);
    let la = h.line(1, wp, a1, a2);

    let b1 = h.point_2d(1, wp, 0.0, 0.0);
    let b2 = h.point_2d(2, wp, 3.0, 5.0);
    let lb = h.line(2, wp, b1, b2);
    h.constrain(2, ConstraintKind::Perpendicular, |c| {
        c.workplane = wp;
        c.entity_a = la;
        c.entity_b = lb;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    let (u2, _) = h.point_uv(b2);
    assert_near(u2, 0.0, 1e-6, "second line vertical");
}

#[test]
fn angle_between_lines() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let a1 = h.point_2d(1, wp, 0.0, 0.0);
    let a2 = h.point_2d(1, wp, 10.0, 0.0);
    let la = h.line(1, wp, a1, a2);

    let b1 = h.point_2d(1, wp, 0.0, 0.0);
    let b2 = h.point_2d(2, wp, 5.0, 8.0);
    let lb = h.line(2, wp, b1, b2);
    h.constrain(2, ConstraintKind::Angle, |c| {
        c.workplane = wp;
        c.entity_a = la;
        c.entity_b = lb;
        c.val_a = 45.0;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);
    let va = h.point3(a1) - h.point3(a2);
    let vb = h.point3(b1) - h.point3(b2);
    let cosine = va.dot(vb) / (va.magnitude() * vb.magnitude());
    assert_near(cosine, (45.0f64).to_radians().cos(), 1e-6, "45 degree angle");
}

#[test]
fn equal_length_and_ratio_and_difference() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let a1 = h.point_2d(1, wp, 0.0, 0.0);
    let a2 = h.point_2d(1, wp, 10.0, 0.0);
    let la = h.line(1, wp, a1, a2);

    // Equal length.
    let b1 = h.point_2d(1, wp, 0.0, 5.0);
    let b2 = h.point_2d(2, wp, 3.0, 5.0);
    let lb = h.line(2, wp, b1, b2);
    h.constrain(2, ConstraintKind::EqualLengthLines, |c| {
        c.workplane = wp;
        c.entity_a = la;
        c.entity_b = lb;
    });
    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    assert_near(h.distance_between(b1, b2), 10.0, 1e-6, "equal length");

    // Ratio: la / lc = 2.5.
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let a1 = h.point_2d(1, wp, 0.0, 0.0);
    let a2 = h.point_2d(1, wp, 10.0, 0.0);
    let la = h.line(1, wp, a1, a2);
    let c1 = h.point_2d(1, wp, 0.0, 5.0);
    let c2 = h.point_2d(2, wp, 3.0, 5.0);
    let lc = h.line(2, wp, c1, c2);
    h.constrain(2, ConstraintKind::LengthRatio, |c| {
        c.workplane = wp;
        c.entity_a = la;
        c.entity_b = lc;
        c.val_a = 2.5;
    });
    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    assert_near(h.distance_between(c1, c2), 4.0, 1e-6, "length ratio");

    // Difference: la − ld = 4.
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let a1 = h.point_2d(1, wp, 0.0, 0.0);
    let a2 = h.point_2d(1, wp, 10.0, 0.0);
    let la = h.line(1, wp, a1, a2);
    let d1 = h.point_2d(1, wp, 0.0, 5.0);
    let d2 = h.point_2d(2, wp, 3.0, 5.0);
    let ld = h.line(2, wp, d1, d2);
    h.constrain(2, ConstraintKind::LengthDifference, |c| {
        c.workplane = wp;
        c.entity_a = la;
        c.entity_b = ld;
        c.val_a = 4.0;
    });
    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    assert_near(h.distance_between(d1, d2), 6.0, 1e-6, "length difference");
}

#[test]
fn point_on_line_with_auxiliary_t() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let a = h.point_2d(1, wp, 0.0, 0.0);
    let b = h.point_2d(1, wp, 10.0, 0.0);
    let line = h.line(1, wp, a, b);
    let p = h.point_2d(2, wp, 5.0, 3.0);
    h.constrain(2, ConstraintKind::PtOnLine, |c| {
        c.workplane = wp;
        c.pt_a = p;
        c.entity_a = line;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);
    let (_, v) = h.point_uv(p);
    assert_near(v, 0.0, 1e-6, "point dropped onto the line");
    assert_eq!(out.dof, 1);
}

#[test]
fn point_on_circle() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let n2 = h.normal_2d(1, wp);
    let center = h.point_2d(1, wp, 0.0, 0.0);
    let rdist = h.distance(1, wp, 5.0);
    let circle = h.circle(1, wp, center, n2, rdist);

    let p = h.point_2d(2, wp, 3.0, 1.0);
    h.constrain(2, ConstraintKind::PtOnCircle, |c| {
        c.workplane = wp;
        c.pt_a = p;
        c.entity_a = circle;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    assert_near(h.distance_between(p, center), 5.0, 1e-6, "point on circle");
}

#[test]
fn arc_line_tangent_at_start() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let n2 = h.normal_2d(1, wp);
    // Quarter arc about the origin, fixed.
    let center = h.point_2d(1, wp, 0.0, 0.0);
    let start = h.point_2d(1, wp, 10.0, 0.0);
    let end = h.point_2d(1, wp, 0.0, 10.0);
    let arc = h.arc(1, wp, n2, center, start, end);

    // A line out of the arc's start point, free to swing.
    let tip = h.point_2d(2, wp, 12.0, 8.0);
    let line = h.line(2, wp, start, tip);
    h.constrain(2, ConstraintKind::PtPtDistance, |c| {
        c.workplane = wp;
        c.pt_a = start;
        c.pt_b = tip;
        c.val_a = 8.0;
    });
    h.constrain(2, ConstraintKind::ArcLineTangent, |c| {
        c.workplane = wp;
        c.entity_a = arc;
        c.entity_b = line;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);
    // Tangent at the start point of a circle about the origin through
    // (10, 0) is vertical.
    let (u, _v) = h.point_uv(tip);
    assert_near(u, 10.0, 1e-6, "line tangent to arc");
    assert_near(h.distance_between(start, tip), 8.0, 1e-6, "line length kept");
}

#[test]
fn where_dragged_pins_a_point() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let p = h.point_2d(2, wp, 4.0, 7.0);
    let q = h.point_2d(2, wp, 0.0, 0.0);
    h.constrain(2, ConstraintKind::WhereDragged, |c| {
        c.workplane = wp;
        c.pt_a = p;
    });
    h.constrain(2, ConstraintKind::PtPtDistance, |c| {
        c.workplane = wp;
        c.pt_a = p;
        c.pt_b = q;
        c.val_a = 2.0;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    let (u, v) = h.point_uv(p);
    assert_near(u, 4.0, 1e-9, "pinned u");
    assert_near(v, 7.0, 1e-9, "pinned v");
    assert_near(h.distance_between(p, q), 2.0, 1e-6, "other point came in");
}

#[test]
fn projected_point_distance() {
    let mut h = Harness::new();
    let l0 = h.point_3d(1, 0.0, 0.0, 0.0);
    let l1 = h.point_3d(1, 10.0, 0.0, 0.0);
    let dir = h.line(1, trammel_types::HEntity::FREE_IN_3D, l0, l1);

    let a = h.point_3d(2, 1.0, 2.0, 3.0);
    let b = h.point_3d(2, 4.0, 5.0, 6.0);
    h.constrain(2, ConstraintKind::ProjPtDistance, |c| {
        c.pt_a = a;
        c.pt_b = b;
        c.entity_a = dir;
        c.val_a = 12.0;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    // The direction vector of the line runs from point 0 to point 1
    // negated, so the projection comes out as ax − bx.
    let (pa, pb) = (h.point3(a), h.point3(b));
    assert_near(pa.x - pb.x, 12.0, 1e-6, "projected distance");
}

#[test]
fn point_in_plane() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let p = h.point_3d(2, 3.0, 4.0, 7.0);
    h.constrain(2, ConstraintKind::PtInPlane, |c| {
        c.pt_a = p;
        c.entity_a = wp;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    let pos = h.point3(p);
    assert_near(pos.z, 0.0, 1e-6, "point in plane");
    assert_near(pos.x, 3.0, 1e-6, "x untouched");
}

#[test]
fn equal_angle_between_two_pairs() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let o = h.point_2d(1, wp, 0.0, 0.0);
    let ax = h.point_2d(1, wp, 10.0, 0.0);
    let a30 = h.point_2d(1, wp, 8.66, 5.0);
    let la = h.line(1, wp, o, ax);
    let lb = h.line(1, wp, o, a30);

    let cx = h.point_2d(1, wp, 10.0, 2.0);
    let lc = h.line(1, wp, o, cx);
    let dtip = h.point_2d(2, wp, 6.0, 6.0);
    let ldd = h.line(2, wp, o, dtip);

    h.constrain(2, ConstraintKind::EqualAngle, |c| {
        c.workplane = wp;
        c.entity_a = la;
        c.entity_b = lb;
        c.entity_c = lc;
        c.entity_d = ldd;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);

    let cos = |p: trammel_types::HEntity, q: trammel_types::HEntity| {
        let vp = h.point3(o) - h.point3(p);
        let vq = h.point3(o) - h.point3(q);
        vp.dot(vq) / (vp.magnitude() * vq.magnitude())
    };
    assert_near(cos(ax, a30), cos(cx, dtip), 1e-6, "angles equal");
}

#[test]
fn same_orientation_aligns_normals() {
    let mut h = Harness::new();
    let qa = Quaternion::from_axis_angle(Vector::new(0.0, 1.0, 0.3), 0.6);
    let na = h.normal_3d(1, qa);
    let qb = Quaternion::from_axis_angle(Vector::new(0.1, 1.0, 0.2), 0.4);
    let nb = h.normal_3d(2, qb);

    h.constrain(2, ConstraintKind::SameOrientation, |c| {
        c.entity_a = na;
        c.entity_b = nb;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);

    let a = trammel_solver::geometry::normal_get_num(&h.sk, h.sk.get_entity(na));
    let b = trammel_solver::geometry::normal_get_num(&h.sk, h.sk.get_entity(nb));
    assert_near(
        a.rotation_n().cross(b.rotation_n()).magnitude(),
        0.0,
        1e-6,
        "normals parallel",
    );
    assert_near(b.magnitude(), 1.0, 1e-6, "quaternion stayed unit");
}

#[test]
fn cubic_line_tangent_in_workplane() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let p0 = h.point_2d(1, wp, 0.0, 0.0);
    let p1 = h.point_2d(1, wp, 3.0, 1.0);
    let p2 = h.point_2d(1, wp, 6.0, 2.0);
    let p3 = h.point_2d(1, wp, 9.0, 0.0);
    let cubic = h.cubic(1, wp, p0, p1, p2, p3);

    let tip = h.point_2d(2, wp, 5.0, 0.0);
    let line = h.line(2, wp, p0, tip);
    h.constrain(2, ConstraintKind::CubicLineTangent, |c| {
        c.workplane = wp;
        c.entity_a = cubic;
        c.entity_b = line;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);
    // The start tangent runs along (3, 1); the line must too.
    let (u, v) = h.point_uv(tip);
    assert_near(u * 1.0 - v * 3.0, 0.0, 1e-6, "line along start tangent");
}

#[test]
fn reference_diameter_reports_without_constraining() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let n2 = h.normal_2d(1, wp);
    let center = h.point_2d(1, wp, 0.0, 0.0);
    let rdist = h.distance(1, wp, 30.0);
    let circle = h.circle(1, wp, center, n2, rdist);

    // A free point so group 2 has something to solve.
    let _p = h.point_2d(2, wp, 1.0, 1.0);
    let dim = h.constrain(2, ConstraintKind::Diameter, |c| {
        c.workplane = wp;
        c.entity_a = circle;
        c.val_a = 0.0;
        c.reference = true;
    });

    let out = h.solve(
        2,
        &[],
        SolveOptions {
            calculate_faileds: false,
            find_free: true,
        },
    );
    assert!(out.status.is_okay());
    // The reference dimension took no degrees of freedom...
    assert_eq!(out.dof, 2);
    // ...but was revalued to the measured diameter.
    assert_near(h.sk.get_constraint(dim).val_a, 60.0, 1e-9, "reference value");
}

#[test]
fn equal_line_and_arc_length() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let n2 = h.normal_2d(1, wp);
    // Quarter arc of radius 10, fixed: arc length 5 pi.
    let center = h.point_2d(1, wp, 0.0, 0.0);
    let start = h.point_2d(1, wp, 10.0, 0.0);
    let end = h.point_2d(1, wp, 0.0, 10.0);
    let arc = h.arc(1, wp, n2, center, start, end);

    let l0 = h.point_2d(1, wp, 0.0, -20.0);
    let l1 = h.point_2d(2, wp, 16.0, -20.0);
    let line = h.line(2, wp, l0, l1);
    h.constrain(2, ConstraintKind::Horizontal, |c| {
        c.workplane = wp;
        c.entity_a = line;
    });
    h.constrain(2, ConstraintKind::EqualLineArcLen, |c| {
        c.workplane = wp;
        c.entity_a = line;
        c.entity_b = arc;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);
    assert_near(
        h.distance_between(l0, l1),
        5.0 * std::f64::consts::PI,
        1e-6,
        "line matches quarter-arc length",
    );
}

#[test]
fn symmetric_about_a_plane_in_3d() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let pa = h.point_3d(2, 1.0, 2.0, 3.0);
    let pb = h.point_3d(2, 4.0, 5.0, -7.0);
    h.constrain(2, ConstraintKind::Symmetric, |c| {
        c.pt_a = pa;
        c.pt_b = pb;
        c.entity_a = wp;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);
    let (a, b) = (h.point3(pa), h.point3(pb));
    assert_near(a.x, b.x, 1e-6, "x matched through the plane");
    assert_near(a.y, b.y, 1e-6, "y matched through the plane");
    assert_near(a.z, -b.z, 1e-6, "z mirrored");
}

#[test]
fn curve_curve_tangent_between_arcs() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let n2 = h.normal_2d(1, wp);
    // A fixed quarter arc ending at (0, 10).
    let c1 = h.point_2d(1, wp, 0.0, 0.0);
    let s1 = h.point_2d(1, wp, 10.0, 0.0);
    let e1 = h.point_2d(1, wp, 0.0, 10.0);
    let arc1 = h.arc(1, wp, n2, c1, s1, e1);

    // A second arc starting at the same point, its center free to move.
    let c2 = h.point_2d(2, wp, 1.5, 15.0);
    let s2 = h.point_2d(1, wp, 0.0, 10.0);
    let e2 = h.point_2d(2, wp, 5.0, 15.0);
    let arc2 = h.arc(2, wp, n2, c2, s2, e2);

    h.constrain(2, ConstraintKind::CurveCurveTangent, |c| {
        c.workplane = wp;
        c.entity_a = arc1;
        c.entity_b = arc2;
        c.other = true; // tangency at arc1's finish
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);
    // Tangency of two circles means the centers and the shared point are
    // collinear.
    let (ca, p, cb) = (h.point3(c1), h.point3(s2), h.point3(c2));
    let r1 = p - ca;
    let r2 = p - cb;
    assert_near(r1.cross(r2).magnitude(), 0.0, 1e-6, "centers collinear");
}

#[test]
fn equal_length_and_point_line_distance() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let a1 = h.point_2d(1, wp, 0.0, 0.0);
    let a2 = h.point_2d(1, wp, 8.0, 0.0);
    let la = h.line(1, wp, a1, a2);

    let p = h.point_2d(2, wp, 3.0, 4.0);
    h.constrain(2, ConstraintKind::EqLenPtLineD, |c| {
        c.workplane = wp;
        c.entity_a = la;
        c.pt_a = p;
        c.entity_b = la;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);
    let (_, v) = h.point_uv(p);
    assert_near(v.abs(), 8.0, 1e-6, "distance equals the line's length");
}

#[test]
fn point_on_face() {
    let mut h = Harness::new();
    let anchor = h.point_3d(1, 0.0, 0.0, 4.0);
    let face = h.face_normal_pt(1, anchor, Vector::new(0.0, 0.0, 1.0));

    let p = h.point_3d(2, 1.0, 2.0, 9.0);
    h.constrain(2, ConstraintKind::PtOnFace, |c| {
        c.pt_a = p;
        c.entity_a = face;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay(), "status {:?}", out.status);
    let pos = h.point3(p);
    assert_near(pos.z, 4.0, 1e-6, "point dropped onto the face");
    assert_near(pos.x, 1.0, 1e-6, "x untouched");
}

#[test]
fn equal_point_line_distances() {
    let mut h = Harness::new();
    let wp = h.xy_workplane(1);
    let a1 = h.point_2d(1, wp, 0.0, 0.0);
    let a2 = h.point_2d(1, wp, 10.0, 0.0);
    let la = h.line(1, wp, a1, a2);

    let pa = h.point_2d(1, wp, 3.0, 4.0);
    let pb = h.point_2d(2, wp, 6.0, 7.0);
    h.constrain(2, ConstraintKind::EqPtLnDistances, |c| {
        c.workplane = wp;
        c.pt_a = pa;
        c.entity_a = la;
        c.pt_b = pb;
        c.entity_b = la;
    });

    let out = h.solve_default(2);
    assert!(out.status.is_okay());
    let (_, vb) = h.point_uv(pb);
    assert_near(vb.abs(), 4.0, 1e-6, "distances to the line match");
}
