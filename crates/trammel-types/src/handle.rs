//! Opaque 32-bit handles. Handle 0 is reserved as "none"; for the workplane
//! slot of an entity or constraint it doubles as "free in 3d" (not projected
//! into any workplane).

use serde::{Deserialize, Serialize};

macro_rules! handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
            Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl $name {
            pub const NONE: Self = Self(0);

            pub fn is_none(self) -> bool {
                self.0 == 0
            }

            pub fn is_some(self) -> bool {
                self.0 != 0
            }
        }

        impl From<$name> for u32 {
            fn from(h: $name) -> u32 {
                h.0
            }
        }
    };
}

handle!(
    /// A single scalar degree of freedom.
    HParam
);
handle!(
    /// A geometric entity (point, line, workplane, ...).
    HEntity
);
handle!(
    /// A constraint between entities.
    HConstraint
);
handle!(
    /// A solve group; only one group's parameters are unknowns at a time.
    HGroup
);
handle!(
    /// One scalar equation, generated fresh each solve but with a handle
    /// stable across solves for the same owner.
    HEquation
);

impl HEntity {
    /// Sentinel for "not projected into any workplane".
    pub const FREE_IN_3D: Self = Self(0);

    /// Equation handle for this entity's index-th implicit equation. The top
    /// bit keeps entity-owned equations out of the constraint-owned range.
    pub fn equation(self, index: u32) -> HEquation {
        HEquation(0x8000_0000 | self.0.wrapping_shl(16) | index)
    }
}

impl HConstraint {
    /// Equation handle for this constraint's index-th emitted equation.
    pub fn equation(self, index: u32) -> HEquation {
        HEquation(self.0.wrapping_shl(16) | index)
    }

    /// Handle for an auxiliary parameter owned by this constraint (the scalar
    /// t of point-on-line and the parallel family). Lives in a reserved
    /// region so it can never collide with caller-assigned param handles.
    pub fn aux_param(self, index: u32) -> HParam {
        HParam(0x4000_0000 | self.0.wrapping_shl(3) | index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_zero() {
        assert!(HParam::NONE.is_none());
        assert!(HEntity(7).is_some());
        assert_eq!(HEntity::FREE_IN_3D, HEntity::NONE);
    }

    #[test]
    fn equation_handles_are_stable_and_distinct() {
        let c = HConstraint(5);
        assert_eq!(c.equation(0), c.equation(0));
        assert_ne!(c.equation(0), c.equation(1));
        assert_ne!(c.equation(0), HConstraint(6).equation(0));
        // Entity-owned equations never collide with constraint-owned ones.
        assert_ne!(HEntity(5).equation(0), c.equation(0));
    }

    #[test]
    fn aux_params_stay_out_of_user_range() {
        let p = HConstraint(40).aux_param(0);
        assert!(p.0 & 0x4000_0000 != 0);
        assert_ne!(p, HConstraint(40).aux_param(1));
    }
}
