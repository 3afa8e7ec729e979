//! The sketch store: the tables of params, entities and constraints for one
//! document. Scoped to a value and passed explicitly; the solver takes
//! logical ownership for the duration of a solve.

use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::entity::Entity;
use crate::handle::{HConstraint, HEntity, HParam};
use crate::param::Param;
use crate::table::Table;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sketch {
    pub param: Table<Param>,
    pub entity: Table<Entity>,
    pub constraint: Table<Constraint>,
}

impl Sketch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_param(&self, h: HParam) -> &Param {
        self.param.get(h.0)
    }

    pub fn get_param_mut(&mut self, h: HParam) -> &mut Param {
        self.param.get_mut(h.0)
    }

    pub fn get_entity(&self, h: HEntity) -> &Entity {
        self.entity.get(h.0)
    }

    pub fn get_constraint(&self, h: HConstraint) -> &Constraint {
        self.constraint.get(h.0)
    }

    pub fn get_constraint_mut(&mut self, h: HConstraint) -> &mut Constraint {
        self.constraint.get_mut(h.0)
    }

    /// Current value of a parameter.
    pub fn param_value(&self, h: HParam) -> f64 {
        self.get_param(h).val
    }

    pub fn clear(&mut self) {
        self.param.clear();
        self.entity.clear();
        self.constraint.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::handle::HGroup;

    #[test]
    fn store_round_trips_through_json() {
        let mut sk = Sketch::new();
        sk.param.add(Param::new(HParam(1), HGroup(1), 2.5));
        sk.entity
            .add(Entity::new(HEntity(1), HGroup(1), EntityKind::PointIn3d));

        let text = serde_json::to_string(&sk).unwrap();
        let back: Sketch = serde_json::from_str(&text).unwrap();
        assert_eq!(back.param_value(HParam(1)), 2.5);
        assert_eq!(back.get_entity(HEntity(1)).kind, EntityKind::PointIn3d);
    }
}
