//! Parameters: the scalar unknowns of a solve.

use serde::{Deserialize, Serialize};

use crate::handle::{HGroup, HParam};
use crate::table::Record;

/// A single `f64` degree of freedom, owned by exactly one entity or
/// constraint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Param {
    pub h: HParam,
    pub group: HGroup,
    pub val: f64,
    /// The numeric kernel has fixed this parameter for the current solve.
    pub known: bool,
    /// The diagnostic layer has identified this parameter as an unconstrained
    /// degree of freedom.
    pub free: bool,
    /// When the substitution pass has folded this parameter into another,
    /// the handle of the surviving representative.
    pub substd: HParam,
}

impl Param {
    pub fn new(h: HParam, group: HGroup, val: f64) -> Self {
        Self {
            h,
            group,
            val,
            known: false,
            free: false,
            substd: HParam::NONE,
        }
    }
}

impl Record for Param {
    fn id(&self) -> u32 {
        self.h.0
    }
    fn set_id(&mut self, id: u32) {
        self.h = HParam(id);
    }
}
