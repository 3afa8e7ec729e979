//! The stable C surface: plain-old-data mirrors of the sketch model, the
//! bit-exact entity/constraint/result codes, and `Slvs_Solve`, which reads
//! the caller's arrays in place and writes solved values back. This is the
//! layer external language bindings consume.

#![allow(non_snake_case, non_camel_case_types)]

use trammel_solver::{SolveOptions, SolveStatus, solve};
use trammel_types::{
    Constraint, ConstraintKind, Entity, EntityKind, HConstraint, HEntity, HGroup, HParam, Param,
    Quaternion, Sketch, Vector,
};

pub type Slvs_hParam = u32;
pub type Slvs_hEntity = u32;
pub type Slvs_hConstraint = u32;
pub type Slvs_hGroup = u32;

/// Pass instead of a workplane handle for "not projected into a workplane".
pub const SLVS_FREE_IN_3D: u32 = 0;

pub const SLVS_E_POINT_IN_3D: i32 = 50000;
pub const SLVS_E_POINT_IN_2D: i32 = 50001;
pub const SLVS_E_NORMAL_IN_3D: i32 = 60000;
pub const SLVS_E_NORMAL_IN_2D: i32 = 60001;
pub const SLVS_E_DISTANCE: i32 = 70000;
pub const SLVS_E_WORKPLANE: i32 = 80000;
pub const SLVS_E_LINE_SEGMENT: i32 = 80001;
pub const SLVS_E_CUBIC: i32 = 80002;
pub const SLVS_E_CIRCLE: i32 = 80003;
pub const SLVS_E_ARC_OF_CIRCLE: i32 = 80004;

pub const SLVS_C_POINTS_COINCIDENT: i32 = 100000;
pub const SLVS_C_PT_PT_DISTANCE: i32 = 100001;
pub const SLVS_C_PT_PLANE_DISTANCE: i32 = 100002;
pub const SLVS_C_PT_LINE_DISTANCE: i32 = 100003;
pub const SLVS_C_PT_FACE_DISTANCE: i32 = 100004;
pub const SLVS_C_PT_IN_PLANE: i32 = 100005;
pub const SLVS_C_PT_ON_LINE: i32 = 100006;
pub const SLVS_C_PT_ON_FACE: i32 = 100007;
pub const SLVS_C_EQUAL_LENGTH_LINES: i32 = 100008;
pub const SLVS_C_LENGTH_RATIO: i32 = 100009;
pub const SLVS_C_EQ_LEN_PT_LINE_D: i32 = 100010;
pub const SLVS_C_EQ_PT_LN_DISTANCES: i32 = 100011;
pub const SLVS_C_EQUAL_ANGLE: i32 = 100012;
pub const SLVS_C_EQUAL_LINE_ARC_LEN: i32 = 100013;
pub const SLVS_C_SYMMETRIC: i32 = 100014;
pub const SLVS_C_SYMMETRIC_HORIZ: i32 = 100015;
pub const SLVS_C_SYMMETRIC_VERT: i32 = 100016;
pub const SLVS_C_SYMMETRIC_LINE: i32 = 100017;
pub const SLVS_C_AT_MIDPOINT: i32 = 100018;
pub const SLVS_C_HORIZONTAL: i32 = 100019;
pub const SLVS_C_VERTICAL: i32 = 100020;
pub const SLVS_C_DIAMETER: i32 = 100021;
pub const SLVS_C_PT_ON_CIRCLE: i32 = 100022;
pub const SLVS_C_SAME_ORIENTATION: i32 = 100023;
pub const SLVS_C_ANGLE: i32 = 100024;
pub const SLVS_C_PARALLEL: i32 = 100025;
pub const SLVS_C_PERPENDICULAR: i32 = 100026;
pub const SLVS_C_ARC_LINE_TANGENT: i32 = 100027;
pub const SLVS_C_CUBIC_LINE_TANGENT: i32 = 100028;
pub const SLVS_C_EQUAL_RADIUS: i32 = 100029;
pub const SLVS_C_PROJ_PT_DISTANCE: i32 = 100030;
pub const SLVS_C_WHERE_DRAGGED: i32 = 100031;
pub const SLVS_C_CURVE_CURVE_TANGENT: i32 = 100032;
pub const SLVS_C_LENGTH_DIFFERENCE: i32 = 100033;

pub const SLVS_RESULT_OKAY: i32 = 0;
pub const SLVS_RESULT_INCONSISTENT: i32 = 1;
pub const SLVS_RESULT_DIDNT_CONVERGE: i32 = 2;
pub const SLVS_RESULT_TOO_MANY_UNKNOWNS: i32 = 3;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Slvs_Param {
    pub h: Slvs_hParam,
    pub group: Slvs_hGroup,
    pub val: f64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Slvs_Entity {
    pub h: Slvs_hEntity,
    pub group: Slvs_hGroup,
    pub type_: i32,
    pub wrkpl: Slvs_hEntity,
    pub point: [Slvs_hEntity; 4],
    pub normal: Slvs_hEntity,
    pub distance: Slvs_hEntity,
    pub param: [Slvs_hParam; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Slvs_Constraint {
    pub h: Slvs_hConstraint,
    pub group: Slvs_hGroup,
    pub type_: i32,
    pub wrkpl: Slvs_hEntity,
    pub valA: f64,
    pub ptA: Slvs_hEntity,
    pub ptB: Slvs_hEntity,
    pub entityA: Slvs_hEntity,
    pub entityB: Slvs_hEntity,
    pub entityC: Slvs_hEntity,
    pub entityD: Slvs_hEntity,
    pub other: i32,
    pub other2: i32,
}

#[repr(C)]
#[derive(Debug)]
pub struct Slvs_System {
    pub param: *mut Slvs_Param,
    pub params: i32,
    pub entity: *mut Slvs_Entity,
    pub entities: i32,
    pub constraint: *mut Slvs_Constraint,
    pub constraints: i32,

    pub dragged: [Slvs_hParam; 4],

    pub calculateFaileds: i32,

    pub failed: *mut Slvs_hConstraint,
    pub faileds: i32,

    pub dof: i32,
    pub result: i32,
}

fn entity_kind_from_code(code: i32) -> EntityKind {
    match code {
        SLVS_E_POINT_IN_3D => EntityKind::PointIn3d,
        SLVS_E_POINT_IN_2D => EntityKind::PointIn2d,
        SLVS_E_NORMAL_IN_3D => EntityKind::NormalIn3d,
        SLVS_E_NORMAL_IN_2D => EntityKind::NormalIn2d,
        SLVS_E_DISTANCE => EntityKind::Distance,
        SLVS_E_WORKPLANE => EntityKind::Workplane,
        SLVS_E_LINE_SEGMENT => EntityKind::LineSegment,
        SLVS_E_CUBIC => EntityKind::Cubic,
        SLVS_E_CIRCLE => EntityKind::Circle,
        SLVS_E_ARC_OF_CIRCLE => EntityKind::ArcOfCircle,
        _ => panic!("unrecognized entity type {code}"),
    }
}

fn constraint_kind_from_code(code: i32) -> ConstraintKind {
    match code {
        SLVS_C_POINTS_COINCIDENT => ConstraintKind::PointsCoincident,
        SLVS_C_PT_PT_DISTANCE => ConstraintKind::PtPtDistance,
        SLVS_C_PT_PLANE_DISTANCE => ConstraintKind::PtPlaneDistance,
        SLVS_C_PT_LINE_DISTANCE => ConstraintKind::PtLineDistance,
        SLVS_C_PT_FACE_DISTANCE => ConstraintKind::PtFaceDistance,
        SLVS_C_PT_IN_PLANE => ConstraintKind::PtInPlane,
        SLVS_C_PT_ON_LINE => ConstraintKind::PtOnLine,
        SLVS_C_PT_ON_FACE => ConstraintKind::PtOnFace,
        SLVS_C_EQUAL_LENGTH_LINES => ConstraintKind::EqualLengthLines,
        SLVS_C_LENGTH_RATIO => ConstraintKind::LengthRatio,
        SLVS_C_EQ_LEN_PT_LINE_D => ConstraintKind::EqLenPtLineD,
        SLVS_C_EQ_PT_LN_DISTANCES => ConstraintKind::EqPtLnDistances,
        SLVS_C_EQUAL_ANGLE => ConstraintKind::EqualAngle,
        SLVS_C_EQUAL_LINE_ARC_LEN => ConstraintKind::EqualLineArcLen,
        SLVS_C_SYMMETRIC => ConstraintKind::Symmetric,
        SLVS_C_SYMMETRIC_HORIZ => ConstraintKind::SymmetricHoriz,
        SLVS_C_SYMMETRIC_VERT => ConstraintKind::SymmetricVert,
        SLVS_C_SYMMETRIC_LINE => ConstraintKind::SymmetricLine,
        SLVS_C_AT_MIDPOINT => ConstraintKind::AtMidpoint,
        SLVS_C_HORIZONTAL => ConstraintKind::Horizontal,
        SLVS_C_VERTICAL => ConstraintKind::Vertical,
        SLVS_C_DIAMETER => ConstraintKind::Diameter,
        SLVS_C_PT_ON_CIRCLE => ConstraintKind::PtOnCircle,
        SLVS_C_SAME_ORIENTATION => ConstraintKind::SameOrientation,
        SLVS_C_ANGLE => ConstraintKind::Angle,
        SLVS_C_PARALLEL => ConstraintKind::Parallel,
        SLVS_C_PERPENDICULAR => ConstraintKind::Perpendicular,
        SLVS_C_ARC_LINE_TANGENT => ConstraintKind::ArcLineTangent,
        SLVS_C_CUBIC_LINE_TANGENT => ConstraintKind::CubicLineTangent,
        SLVS_C_EQUAL_RADIUS => ConstraintKind::EqualRadius,
        SLVS_C_PROJ_PT_DISTANCE => ConstraintKind::ProjPtDistance,
        SLVS_C_WHERE_DRAGGED => ConstraintKind::WhereDragged,
        SLVS_C_CURVE_CURVE_TANGENT => ConstraintKind::CurveCurveTangent,
        SLVS_C_LENGTH_DIFFERENCE => ConstraintKind::LengthDifference,
        _ => panic!("unrecognized constraint type {code}"),
    }
}

fn status_to_result(status: SolveStatus) -> i32 {
    match status {
        SolveStatus::Okay | SolveStatus::RedundantOkay => SLVS_RESULT_OKAY,
        SolveStatus::Inconsistent | SolveStatus::RedundantDidntConverge => {
            SLVS_RESULT_INCONSISTENT
        }
        SolveStatus::DidntConverge => SLVS_RESULT_DIDNT_CONVERGE,
        SolveStatus::TooManyUnknowns => SLVS_RESULT_TOO_MANY_UNKNOWNS,
    }
}

/// Build the native sketch from the wire arrays. Shared by `Slvs_Solve`
/// and the Rust-side tests.
pub fn sketch_from_system(
    params: &[Slvs_Param],
    entities: &[Slvs_Entity],
    constraints: &[Slvs_Constraint],
) -> Sketch {
    let mut sk = Sketch::new();
    for p in params {
        sk.param.add(Param::new(HParam(p.h), HGroup(p.group), p.val));
    }
    for e in entities {
        let mut ne = Entity::new(HEntity(e.h), HGroup(e.group), entity_kind_from_code(e.type_));
        ne.workplane = HEntity(e.wrkpl);
        for i in 0..4 {
            ne.point[i] = HEntity(e.point[i]);
            ne.param[i] = HParam(e.param[i]);
        }
        ne.normal = HEntity(e.normal);
        ne.distance = HEntity(e.distance);
        sk.entity.add(ne);
    }
    for c in constraints {
        let mut nc = Constraint::new(
            HConstraint(c.h),
            HGroup(c.group),
            constraint_kind_from_code(c.type_),
        );
        nc.workplane = HEntity(c.wrkpl);
        nc.val_a = c.valA;
        nc.pt_a = HEntity(c.ptA);
        nc.pt_b = HEntity(c.ptB);
        nc.entity_a = HEntity(c.entityA);
        nc.entity_b = HEntity(c.entityB);
        nc.entity_c = HEntity(c.entityC);
        nc.entity_d = HEntity(c.entityD);
        nc.other = c.other != 0;
        nc.other2 = c.other2 != 0;
        sk.constraint.add(nc);
    }
    sk
}

/// Solve the system for one group, in place: `param[i].val` receives the
/// solved values, `result`/`dof` the outcome, and when `calculateFaileds`
/// is set, up to `faileds` offending constraint handles land in `failed[]`.
///
/// # Safety
///
/// The array pointers must be valid for the lengths given, and `failed`
/// (when `calculateFaileds` is set) writable for `faileds` elements.
#[no_mangle]
pub unsafe extern "C" fn Slvs_Solve(sys: *mut Slvs_System, hg: Slvs_hGroup) {
    let sys = unsafe { &mut *sys };
    let params =
        unsafe { std::slice::from_raw_parts_mut(sys.param, sys.params.max(0) as usize) };
    let entities =
        unsafe { std::slice::from_raw_parts(sys.entity, sys.entities.max(0) as usize) };
    let constraints =
        unsafe { std::slice::from_raw_parts(sys.constraint, sys.constraints.max(0) as usize) };

    let mut sk = sketch_from_system(params, entities, constraints);

    let dragged: Vec<HParam> = sys
        .dragged
        .iter()
        .filter(|&&h| h != 0)
        .map(|&h| HParam(h))
        .collect();

    let opts = SolveOptions {
        calculate_faileds: sys.calculateFaileds != 0,
        find_free: false,
    };
    let outcome = solve(&mut sk, HGroup(hg), &dragged, opts);

    for p in params.iter_mut() {
        p.val = sk.param_value(HParam(p.h));
    }

    if sys.calculateFaileds != 0 && !sys.failed.is_null() {
        let capacity = sys.faileds.max(0) as usize;
        let failed = unsafe { std::slice::from_raw_parts_mut(sys.failed, capacity) };
        let count = outcome.bad.len().min(capacity);
        for (slot, &hc) in failed.iter_mut().zip(outcome.bad.iter()) {
            *slot = hc.0;
        }
        sys.faileds = count as i32;
    } else {
        sys.faileds = 0;
    }

    sys.dof = outcome.dof;
    sys.result = status_to_result(outcome.status);
}

// ── Quaternion helpers: pure functions, no sketch store involved ────────

/// # Safety
/// The output pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn Slvs_QuaternionU(
    qw: f64,
    qx: f64,
    qy: f64,
    qz: f64,
    x: *mut f64,
    y: *mut f64,
    z: *mut f64,
) {
    let u = Quaternion::new(qw, qx, qy, qz).rotation_u();
    unsafe {
        *x = u.x;
        *y = u.y;
        *z = u.z;
    }
}

/// # Safety
/// The output pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn Slvs_QuaternionV(
    qw: f64,
    qx: f64,
    qy: f64,
    qz: f64,
    x: *mut f64,
    y: *mut f64,
    z: *mut f64,
) {
    let v = Quaternion::new(qw, qx, qy, qz).rotation_v();
    unsafe {
        *x = v.x;
        *y = v.y;
        *z = v.z;
    }
}

/// # Safety
/// The output pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn Slvs_QuaternionN(
    qw: f64,
    qx: f64,
    qy: f64,
    qz: f64,
    x: *mut f64,
    y: *mut f64,
    z: *mut f64,
) {
    let n = Quaternion::new(qw, qx, qy, qz).rotation_n();
    unsafe {
        *x = n.x;
        *y = n.y;
        *z = n.z;
    }
}

/// # Safety
/// The output pointers must be valid.
#[no_mangle]
pub unsafe extern "C" fn Slvs_MakeQuaternion(
    ux: f64,
    uy: f64,
    uz: f64,
    vx: f64,
    vy: f64,
    vz: f64,
    qw: *mut f64,
    qx: *mut f64,
    qy: *mut f64,
    qz: *mut f64,
) {
    let q = Quaternion::from_basis(Vector::new(ux, uy, uz), Vector::new(vx, vy, vz));
    unsafe {
        *qw = q.w;
        *qx = q.vx;
        *qy = q.vy;
        *qz = q.vz;
    }
}

// ── Convenience constructors, mirrored from the C header ────────────────

pub fn Slvs_MakeParam(h: Slvs_hParam, group: Slvs_hGroup, val: f64) -> Slvs_Param {
    Slvs_Param { h, group, val }
}

pub fn Slvs_MakePoint2d(
    h: Slvs_hEntity,
    group: Slvs_hGroup,
    wrkpl: Slvs_hEntity,
    u: Slvs_hParam,
    v: Slvs_hParam,
) -> Slvs_Entity {
    Slvs_Entity {
        h,
        group,
        type_: SLVS_E_POINT_IN_2D,
        wrkpl,
        param: [u, v, 0, 0],
        ..Default::default()
    }
}

pub fn Slvs_MakePoint3d(
    h: Slvs_hEntity,
    group: Slvs_hGroup,
    x: Slvs_hParam,
    y: Slvs_hParam,
    z: Slvs_hParam,
) -> Slvs_Entity {
    Slvs_Entity {
        h,
        group,
        type_: SLVS_E_POINT_IN_3D,
        wrkpl: SLVS_FREE_IN_3D,
        param: [x, y, z, 0],
        ..Default::default()
    }
}

pub fn Slvs_MakeNormal3d(
    h: Slvs_hEntity,
    group: Slvs_hGroup,
    qw: Slvs_hParam,
    qx: Slvs_hParam,
    qy: Slvs_hParam,
    qz: Slvs_hParam,
) -> Slvs_Entity {
    Slvs_Entity {
        h,
        group,
        type_: SLVS_E_NORMAL_IN_3D,
        wrkpl: SLVS_FREE_IN_3D,
        param: [qw, qx, qy, qz],
        ..Default::default()
    }
}

pub fn Slvs_MakeNormal2d(h: Slvs_hEntity, group: Slvs_hGroup, wrkpl: Slvs_hEntity) -> Slvs_Entity {
    Slvs_Entity {
        h,
        group,
        type_: SLVS_E_NORMAL_IN_2D,
        wrkpl,
        ..Default::default()
    }
}

pub fn Slvs_MakeDistance(
    h: Slvs_hEntity,
    group: Slvs_hGroup,
    wrkpl: Slvs_hEntity,
    d: Slvs_hParam,
) -> Slvs_Entity {
    Slvs_Entity {
        h,
        group,
        type_: SLVS_E_DISTANCE,
        wrkpl,
        param: [d, 0, 0, 0],
        ..Default::default()
    }
}

pub fn Slvs_MakeLineSegment(
    h: Slvs_hEntity,
    group: Slvs_hGroup,
    wrkpl: Slvs_hEntity,
    ptA: Slvs_hEntity,
    ptB: Slvs_hEntity,
) -> Slvs_Entity {
    Slvs_Entity {
        h,
        group,
        type_: SLVS_E_LINE_SEGMENT,
        wrkpl,
        point: [ptA, ptB, 0, 0],
        ..Default::default()
    }
}

pub fn Slvs_MakeCubic(
    h: Slvs_hEntity,
    group: Slvs_hGroup,
    wrkpl: Slvs_hEntity,
    pt0: Slvs_hEntity,
    pt1: Slvs_hEntity,
    pt2: Slvs_hEntity,
    pt3: Slvs_hEntity,
) -> Slvs_Entity {
    Slvs_Entity {
        h,
        group,
        type_: SLVS_E_CUBIC,
        wrkpl,
        point: [pt0, pt1, pt2, pt3],
        ..Default::default()
    }
}

pub fn Slvs_MakeArcOfCircle(
    h: Slvs_hEntity,
    group: Slvs_hGroup,
    wrkpl: Slvs_hEntity,
    normal: Slvs_hEntity,
    center: Slvs_hEntity,
    start: Slvs_hEntity,
    end: Slvs_hEntity,
) -> Slvs_Entity {
    Slvs_Entity {
        h,
        group,
        type_: SLVS_E_ARC_OF_CIRCLE,
        wrkpl,
        normal,
        point: [center, start, end, 0],
        ..Default::default()
    }
}

pub fn Slvs_MakeCircle(
    h: Slvs_hEntity,
    group: Slvs_hGroup,
    wrkpl: Slvs_hEntity,
    center: Slvs_hEntity,
    normal: Slvs_hEntity,
    radius: Slvs_hEntity,
) -> Slvs_Entity {
    Slvs_Entity {
        h,
        group,
        type_: SLVS_E_CIRCLE,
        wrkpl,
        normal,
        distance: radius,
        point: [center, 0, 0, 0],
        ..Default::default()
    }
}

pub fn Slvs_MakeWorkplane(
    h: Slvs_hEntity,
    group: Slvs_hGroup,
    origin: Slvs_hEntity,
    normal: Slvs_hEntity,
) -> Slvs_Entity {
    Slvs_Entity {
        h,
        group,
        type_: SLVS_E_WORKPLANE,
        wrkpl: SLVS_FREE_IN_3D,
        normal,
        point: [origin, 0, 0, 0],
        ..Default::default()
    }
}

#[allow(clippy::too_many_arguments)]
pub fn Slvs_MakeConstraint(
    h: Slvs_hConstraint,
    group: Slvs_hGroup,
    type_: i32,
    wrkpl: Slvs_hEntity,
    valA: f64,
    ptA: Slvs_hEntity,
    ptB: Slvs_hEntity,
    entityA: Slvs_hEntity,
    entityB: Slvs_hEntity,
) -> Slvs_Constraint {
    Slvs_Constraint {
        h,
        group,
        type_,
        wrkpl,
        valA,
        ptA,
        ptB,
        entityA,
        entityB,
        ..Default::default()
    }
}
