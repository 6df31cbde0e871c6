use std::collections::BTreeMap;

use objectron_core::game_trait::{HazardId, ItemId};
use objectron_core::geometry::Coordinate;
use serde::{Deserialize, Serialize};

use crate::turn::TurnEvent;

/// A barrier between two generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceField {
    id: HazardId,
    generators: [ItemId; 2],
    cells: Vec<Coordinate>,
    active: bool,
}

impl ForceField {
    pub fn id(&self) -> HazardId {
        self.id
    }

    pub fn generators(&self) -> [ItemId; 2] {
        self.generators
    }

    /// Spanned cells from one generator to the other, both included.
    pub fn cells(&self) -> &[Coordinate] {
        &self.cells
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn uses_generator(&self, generator: ItemId) -> bool {
        self.generators.contains(&generator)
    }
}

/// Cells covered by a field between generators at `a` and `b`.
pub fn span(a: Coordinate, b: Coordinate) -> Vec<Coordinate> {
    let mut cells = vec![a];
    cells.extend(a.cells_between(b));
    cells.push(b);
    cells
}

/// Every force field on the board and the shared flip clock.
///
/// Fields do not count actions individually: one counter advances on every
/// action by any player and all fields flip together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceFields {
    fields: BTreeMap<HazardId, ForceField>,
    next_id: HazardId,
    actions_elapsed: u32,
    flip_every: u32,
}

impl ForceFields {
    pub fn new(flip_every: u32) -> Self {
        Self {
            fields: BTreeMap::new(),
            next_id: 1,
            actions_elapsed: 0,
            flip_every: flip_every.max(1),
        }
    }

    /// Register a new, active field.
    pub fn create(&mut self, generators: [ItemId; 2], cells: Vec<Coordinate>) -> HazardId {
        let id = self.next_id;
        self.next_id += 1;
        self.fields.insert(
            id,
            ForceField {
                id,
                generators,
                cells,
                active: true,
            },
        );
        id
    }

    pub fn get(&self, id: HazardId) -> Option<&ForceField> {
        self.fields.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForceField> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn exists_between(&self, a: ItemId, b: ItemId) -> bool {
        self.fields
            .values()
            .any(|f| f.uses_generator(a) && f.uses_generator(b))
    }

    /// Remove and return every field powered by `generator`.
    pub fn remove_for_generator(&mut self, generator: ItemId) -> Vec<ForceField> {
        let ids: Vec<HazardId> = self
            .fields
            .values()
            .filter(|f| f.uses_generator(generator))
            .map(ForceField::id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.fields.remove(&id))
            .collect()
    }

    /// Advance the shared clock. Returns the fields that flipped; each
    /// call is one elapsed action, so callers must not repeat it.
    pub fn on_turn_event(&mut self, event: TurnEvent) -> Vec<&ForceField> {
        if event != TurnEvent::EndAction {
            return Vec::new();
        }
        self.actions_elapsed += 1;
        if self.actions_elapsed % self.flip_every != 0 {
            return Vec::new();
        }
        for field in self.fields.values_mut() {
            field.active = !field.active;
        }
        self.fields.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_includes_generators() {
        assert_eq!(
            span(Coordinate::new(0, 0), Coordinate::new(0, 3)),
            vec![
                Coordinate::new(0, 0),
                Coordinate::new(0, 1),
                Coordinate::new(0, 2),
                Coordinate::new(0, 3),
            ]
        );
    }

    #[test]
    fn flips_every_two_actions_globally() {
        let mut fields = ForceFields::new(2);
        let id = fields.create([1, 2], span(Coordinate::new(0, 0), Coordinate::new(2, 0)));
        assert!(fields.get(id).unwrap().is_active());

        assert!(fields.on_turn_event(TurnEvent::EndAction).is_empty());
        assert_eq!(fields.on_turn_event(TurnEvent::EndAction).len(), 1);
        assert!(!fields.get(id).unwrap().is_active());

        // Turn ends do not count as actions.
        assert!(fields.on_turn_event(TurnEvent::EndTurn).is_empty());
        assert!(fields.on_turn_event(TurnEvent::EndAction).is_empty());
        fields.on_turn_event(TurnEvent::EndAction);
        assert!(fields.get(id).unwrap().is_active());
    }

    #[test]
    fn removing_a_generator_dissolves_its_fields() {
        let mut fields = ForceFields::new(2);
        fields.create([1, 2], vec![]);
        fields.create([2, 3], vec![]);
        fields.create([3, 4], vec![]);
        assert!(fields.exists_between(2, 1));
        let removed = fields.remove_for_generator(2);
        assert_eq!(removed.len(), 2);
        assert_eq!(fields.len(), 1);
        assert!(!fields.exists_between(1, 2));
    }
}
