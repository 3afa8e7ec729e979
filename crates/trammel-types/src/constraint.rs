//! Constraints: predicates over entities that the solver must make true.

use serde::{Deserialize, Serialize};

use crate::handle::{HConstraint, HEntity, HGroup, HParam};
use crate::table::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintKind {
    PointsCoincident,
    PtPtDistance,
    PtPlaneDistance,
    PtLineDistance,
    PtFaceDistance,
    PtInPlane,
    PtOnLine,
    PtOnFace,
    EqualLengthLines,
    LengthRatio,
    EqLenPtLineD,
    EqPtLnDistances,
    EqualAngle,
    EqualLineArcLen,
    Symmetric,
    SymmetricHoriz,
    SymmetricVert,
    SymmetricLine,
    AtMidpoint,
    Horizontal,
    Vertical,
    Diameter,
    PtOnCircle,
    SameOrientation,
    Angle,
    Parallel,
    Perpendicular,
    ArcLineTangent,
    CubicLineTangent,
    EqualRadius,
    ProjPtDistance,
    WhereDragged,
    CurveCurveTangent,
    LengthDifference,
    Comment,
}

impl ConstraintKind {
    /// Kinds that carry a displayed dimension value in `val_a`.
    pub fn has_label(self) -> bool {
        matches!(
            self,
            ConstraintKind::PtLineDistance
                | ConstraintKind::PtPlaneDistance
                | ConstraintKind::PtFaceDistance
                | ConstraintKind::PtPtDistance
                | ConstraintKind::ProjPtDistance
                | ConstraintKind::Diameter
                | ConstraintKind::LengthRatio
                | ConstraintKind::LengthDifference
                | ConstraintKind::Angle
                | ConstraintKind::Comment
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    pub h: HConstraint,
    pub group: HGroup,
    pub kind: ConstraintKind,

    /// Workplane to project into, or `FREE_IN_3D`.
    pub workplane: HEntity,

    /// The dimension value, for kinds that have one.
    pub val_a: f64,
    pub pt_a: HEntity,
    pub pt_b: HEntity,
    pub entity_a: HEntity,
    pub entity_b: HEntity,
    pub entity_c: HEntity,
    pub entity_d: HEntity,

    /// Solution-branch selectors; flipping one mirrors the choice between
    /// two equally valid configurations (reflex angle, tangent endpoint).
    pub other: bool,
    pub other2: bool,

    /// A reference constraint only reports the current value; it emits no
    /// equations during a normal solve.
    pub reference: bool,

    /// Handle of the auxiliary scalar some kinds own (point-on-line's t,
    /// the parallel family's scale); assigned during param generation.
    pub val_p: HParam,
}

impl Constraint {
    pub fn new(h: HConstraint, group: HGroup, kind: ConstraintKind) -> Self {
        Self {
            h,
            group,
            kind,
            workplane: HEntity::FREE_IN_3D,
            val_a: 0.0,
            pt_a: HEntity::NONE,
            pt_b: HEntity::NONE,
            entity_a: HEntity::NONE,
            entity_b: HEntity::NONE,
            entity_c: HEntity::NONE,
            entity_d: HEntity::NONE,
            other: false,
            other2: false,
            reference: false,
            val_p: HParam::NONE,
        }
    }
}

impl Record for Constraint {
    fn id(&self) -> u32 {
        self.h.0
    }
    fn set_id(&mut self, id: u32) {
        self.h = HConstraint(id);
    }
}
