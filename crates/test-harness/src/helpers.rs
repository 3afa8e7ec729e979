//! A small builder over the sketch store: hands out sequential handles,
//! creates entities with their params, and runs solves.

use trammel_solver::{SolveOptions, SolveOutcome, solve};
use trammel_types::{
    Constraint, ConstraintKind, Entity, EntityKind, HConstraint, HEntity, HGroup, HParam, Param,
    Quaternion, Sketch, Vector,
};

#[derive(Debug, Default)]
pub struct Harness {
    pub sk: Sketch,
    next_param: u32,
    next_entity: u32,
    next_constraint: u32,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(&mut self, group: u32, val: f64) -> HParam {
        self.next_param += 1;
        let h = HParam(self.next_param);
        self.sk.param.add(Param::new(h, HGroup(group), val));
        h
    }

    fn entity(&mut self, group: u32, kind: EntityKind) -> Entity {
        self.next_entity += 1;
        Entity::new(HEntity(self.next_entity), HGroup(group), kind)
    }

    pub fn point_3d(&mut self, group: u32, x: f64, y: f64, z: f64) -> HEntity {
        let px = self.param(group, x);
        let py = self.param(group, y);
        let pz = self.param(group, z);
        let mut e = self.entity(group, EntityKind::PointIn3d);
        e.param[0] = px;
        e.param[1] = py;
        e.param[2] = pz;
        let h = e.h;
        self.sk.entity.add(e);
        h
    }

    pub fn point_2d(&mut self, group: u32, wrkpl: HEntity, u: f64, v: f64) -> HEntity {
        let pu = self.param(group, u);
        let pv = self.param(group, v);
        let mut e = self.entity(group, EntityKind::PointIn2d);
        e.workplane = wrkpl;
        e.param[0] = pu;
        e.param[1] = pv;
        let h = e.h;
        self.sk.entity.add(e);
        h
    }

    pub fn normal_3d(&mut self, group: u32, q: Quaternion) -> HEntity {
        let pw = self.param(group, q.w);
        let px = self.param(group, q.vx);
        let py = self.param(group, q.vy);
        let pz = self.param(group, q.vz);
        let mut e = self.entity(group, EntityKind::NormalIn3d);
        e.param[0] = pw;
        e.param[1] = px;
        e.param[2] = py;
        e.param[3] = pz;
        let h = e.h;
        self.sk.entity.add(e);
        h
    }

    pub fn normal_2d(&mut self, group: u32, wrkpl: HEntity) -> HEntity {
        let mut e = self.entity(group, EntityKind::NormalIn2d);
        e.workplane = wrkpl;
        let h = e.h;
        self.sk.entity.add(e);
        h
    }

    pub fn distance(&mut self, group: u32, wrkpl: HEntity, d: f64) -> HEntity {
        let pd = self.param(group, d);
        let mut e = self.entity(group, EntityKind::Distance);
        e.workplane = wrkpl;
        e.param[0] = pd;
        let h = e.h;
        self.sk.entity.add(e);
        h
    }

    pub fn workplane(&mut self, group: u32, origin: HEntity, normal: HEntity) -> HEntity {
        let mut e = self.entity(group, EntityKind::Workplane);
        e.point[0] = origin;
        e.normal = normal;
        let h = e.h;
        self.sk.entity.add(e);
        h
    }

    /// The canonical fixture: an XY workplane in its own group, so its
    /// params are known during later solves.
    pub fn xy_workplane(&mut self, group: u32) -> HEntity {
        let origin = self.point_3d(group, 0.0, 0.0, 0.0);
        let normal = self.normal_3d(group, Quaternion::IDENTITY);
        self.workplane(group, origin, normal)
    }

    pub fn line(&mut self, group: u32, wrkpl: HEntity, a: HEntity, b: HEntity) -> HEntity {
        let mut e = self.entity(group, EntityKind::LineSegment);
        e.workplane = wrkpl;
        e.point[0] = a;
        e.point[1] = b;
        let h = e.h;
        self.sk.entity.add(e);
        h
    }

    pub fn cubic(
        &mut self,
        group: u32,
        wrkpl: HEntity,
        p0: HEntity,
        p1: HEntity,
        p2: HEntity,
        p3: HEntity,
    ) -> HEntity {
        let mut e = self.entity(group, EntityKind::Cubic);
        e.workplane = wrkpl;
        e.point = [p0, p1, p2, p3];
        let h = e.h;
        self.sk.entity.add(e);
        h
    }

    pub fn circle(
        &mut self,
        group: u32,
        wrkpl: HEntity,
        center: HEntity,
        normal: HEntity,
        radius: HEntity,
    ) -> HEntity {
        let mut e = self.entity(group, EntityKind::Circle);
        e.workplane = wrkpl;
        e.point[0] = center;
        e.normal = normal;
        e.distance = radius;
        let h = e.h;
        self.sk.entity.add(e);
        h
    }

    pub fn arc(
        &mut self,
        group: u32,
        wrkpl: HEntity,
        normal: HEntity,
        center: HEntity,
        start: HEntity,
        end: HEntity,
    ) -> HEntity {
        let mut e = self.entity(group, EntityKind::ArcOfCircle);
        e.workplane = wrkpl;
        e.normal = normal;
        e.point[0] = center;
        e.point[1] = start;
        e.point[2] = end;
        let h = e.h;
        self.sk.entity.add(e);
        h
    }

    /// A planar face through `point` with the given (numeric) normal.
    pub fn face_normal_pt(&mut self, group: u32, point: HEntity, normal: Vector) -> HEntity {
        let mut e = self.entity(group, EntityKind::FaceNormalPt);
        e.point[0] = point;
        e.num_normal = Quaternion::new(0.0, normal.x, normal.y, normal.z);
        let h = e.h;
        self.sk.entity.add(e);
        h
    }

    /// Add a constraint, assigning it the next handle; the closure fills in
    /// the slots the kind uses.
    pub fn constrain(
        &mut self,
        group: u32,
        kind: ConstraintKind,
        build: impl FnOnce(&mut Constraint),
    ) -> HConstraint {
        self.next_constraint += 1;
        let h = HConstraint(self.next_constraint);
        let mut c = Constraint::new(h, HGroup(group), kind);
        build(&mut c);
        self.sk.constraint.add(c);
        h
    }

    pub fn solve(&mut self, group: u32, dragged: &[HParam], opts: SolveOptions) -> SolveOutcome {
        solve(&mut self.sk, HGroup(group), dragged, opts)
    }

    pub fn solve_default(&mut self, group: u32) -> SolveOutcome {
        self.solve(group, &[], SolveOptions::default())
    }

    // ── Readback ────────────────────────────────────────────────────────

    pub fn pval(&self, h: HParam) -> f64 {
        self.sk.param_value(h)
    }

    /// 3D position of a point entity.
    pub fn point3(&self, e: HEntity) -> Vector {
        trammel_solver::geometry::point_get_num(&self.sk, self.sk.get_entity(e))
    }

    /// (u, v) of a 2D point, straight from its params.
    pub fn point_uv(&self, e: HEntity) -> (f64, f64) {
        let ent = self.sk.get_entity(e);
        assert!(ent.is_point_2d(), "entity is not a 2d point");
        (self.pval(ent.param[0]), self.pval(ent.param[1]))
    }

    /// Param handles of a point entity, for drag lists.
    pub fn point_params(&self, e: HEntity) -> Vec<HParam> {
        self.sk.get_entity(e).own_params().to_vec()
    }

    pub fn distance_between(&self, a: HEntity, b: HEntity) -> f64 {
        (self.point3(a) - self.point3(b)).magnitude()
    }

    /// Drop a constraint from the sketch.
    pub fn remove_constraint(&mut self, h: HConstraint) {
        self.sk.constraint.tag(h.0, 1);
        self.sk.constraint.remove_tagged();
    }
}
