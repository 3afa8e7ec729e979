//! Scenario-building helpers and assertion utilities for exercising the
//! solver end to end.

pub mod assertions;
pub mod helpers;

pub use assertions::*;
pub use helpers::*;
