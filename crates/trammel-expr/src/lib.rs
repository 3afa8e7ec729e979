//! The symbolic algebra engine used to write constraint equations: an
//! arena-allocated expression DAG with evaluation, partial differentiation,
//! constant folding, and an infix parser for user-entered dimensions.

pub mod arena;
pub mod parser;
pub mod vector;

pub use arena::{BinaryOp, ExprArena, ExprRef, ParamBinding, ReferencedParams, UnaryOp};
pub use parser::{ParseError, parse_expression};
pub use vector::{ExprQuaternion, ExprVector};
