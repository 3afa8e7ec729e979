pub mod constraint;
pub mod entity;
pub mod handle;
pub mod param;
pub mod quaternion;
pub mod sketch;
pub mod table;
pub mod vector;

pub use constraint::{Constraint, ConstraintKind};
pub use entity::{Entity, EntityKind};
pub use handle::{HConstraint, HEntity, HEquation, HGroup, HParam};
pub use param::Param;
pub use quaternion::Quaternion;
pub use sketch::Sketch;
pub use table::{Record, Table};
pub use vector::{Point2d, Vector};
