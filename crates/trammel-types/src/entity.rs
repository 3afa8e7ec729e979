//! Geometric entities. All variants share one field layout, interpreted per
//! kind; the predicates below are how the rest of the solver asks what a
//! handle may be used as.
//!
//! The derived (`*NTrans`, `*NRot*`, `*NCopy`) variants are produced by
//! step-and-repeat/extrude style group transforms: they carry a numeric
//! snapshot of their source plus the owning group's transform parameters,
//! applied `times_applied` times. They own no parameters themselves.

use serde::{Deserialize, Serialize};

use crate::handle::{HEntity, HGroup, HParam};
use crate::quaternion::Quaternion;
use crate::table::Record;
use crate::vector::Vector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    PointIn3d,
    PointIn2d,
    PointNTrans,
    PointNRotTrans,
    PointNCopy,
    PointNRotAa,
    PointNRotAxisTrans,

    NormalIn3d,
    NormalIn2d,
    NormalNCopy,
    NormalNRot,
    NormalNRotAa,

    Distance,
    DistanceNCopy,

    Workplane,
    LineSegment,
    Cubic,
    CubicPeriodic,
    Circle,
    ArcOfCircle,

    FaceNormalPt,
    FaceNTrans,
    FaceNRotTrans,

    TtfText,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub h: HEntity,
    pub group: HGroup,
    pub kind: EntityKind,

    /// The workplane this entity lives in, or `FREE_IN_3D`.
    pub workplane: HEntity,
    pub point: [HEntity; 4],
    pub normal: HEntity,
    pub distance: HEntity,

    /// Own (or, for derived variants, group-transform) parameters. The C
    /// surface only carries the first four; the rot-trans variants use up
    /// to eight internally.
    pub param: [HParam; 8],

    /// Numeric snapshots for the derived variants.
    pub num_point: Vector,
    pub num_normal: Quaternion,
    pub num_distance: f64,
    pub times_applied: i32,
}

impl Entity {
    pub fn new(h: HEntity, group: HGroup, kind: EntityKind) -> Self {
        Self {
            h,
            group,
            kind,
            workplane: HEntity::FREE_IN_3D,
            point: [HEntity::NONE; 4],
            normal: HEntity::NONE,
            distance: HEntity::NONE,
            param: [HParam::NONE; 8],
            num_point: Vector::ZERO,
            num_normal: Quaternion::IDENTITY,
            num_distance: 0.0,
            times_applied: 1,
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::PointIn3d
                | EntityKind::PointIn2d
                | EntityKind::PointNTrans
                | EntityKind::PointNRotTrans
                | EntityKind::PointNCopy
                | EntityKind::PointNRotAa
                | EntityKind::PointNRotAxisTrans
        )
    }

    pub fn is_point_2d(&self) -> bool {
        self.kind == EntityKind::PointIn2d
    }

    pub fn is_normal(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::NormalIn3d
                | EntityKind::NormalIn2d
                | EntityKind::NormalNCopy
                | EntityKind::NormalNRot
                | EntityKind::NormalNRotAa
        )
    }

    pub fn is_distance(&self) -> bool {
        matches!(self.kind, EntityKind::Distance | EntityKind::DistanceNCopy)
    }

    pub fn is_workplane(&self) -> bool {
        self.kind == EntityKind::Workplane
    }

    /// Entities with a natural direction vector.
    pub fn has_vector(&self) -> bool {
        matches!(self.kind, EntityKind::LineSegment) || self.is_normal()
    }

    pub fn has_endpoints(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::LineSegment
                | EntityKind::Cubic
                | EntityKind::ArcOfCircle
        )
    }

    /// Circles and arcs: anything with a radius.
    pub fn is_circle(&self) -> bool {
        matches!(self.kind, EntityKind::Circle | EntityKind::ArcOfCircle)
    }

    pub fn is_face(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::FaceNormalPt | EntityKind::FaceNTrans | EntityKind::FaceNRotTrans
        )
    }

    pub fn is_in_workplane(&self) -> bool {
        self.workplane.is_some()
    }

    /// Handles of the parameters this entity owns outright, in order. The
    /// derived variants return nothing: their params belong to the group
    /// transform that produced them.
    pub fn own_params(&self) -> &[HParam] {
        match self.kind {
            EntityKind::PointIn3d => &self.param[0..3],
            EntityKind::PointIn2d => &self.param[0..2],
            EntityKind::NormalIn3d => &self.param[0..4],
            EntityKind::Distance => &self.param[0..1],
            _ => &[],
        }
    }
}

impl Record for Entity {
    fn id(&self) -> u32 {
        self.h.0
    }
    fn set_id(&mut self, id: u32) {
        self.h = HEntity(id);
    }
}
