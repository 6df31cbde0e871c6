//! A single board location and the hazard layers stacked on it.
//!
//! A [`Cell`] is a base behavior (wall or square) plus an ordered list of
//! [`Decoration`] layers. Each operation walks the layers first; a layer either
//! overrides the operation or falls through, and whatever falls through all
//! layers is answered by the base.

use std::collections::BTreeSet;

use objectron_core::game_trait::{HazardId, ItemId, PlayerId};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::items::ItemKind;

static NO_ITEMS: BTreeSet<ItemId> = BTreeSet::new();

/// A hazard layer over a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decoration {
    /// Part of a force field. Blocks players and disks while active.
    ForceField { field: HazardId, active: bool },
    /// Without power. Does not restrict admission.
    PowerFailure { failure: HazardId },
}

/// Occupant and item state of a walkable cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Square {
    player: Option<PlayerId>,
    items: BTreeSet<ItemId>,
    light_trail: bool,
}

/// The undecorated behavior of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellBase {
    Wall,
    Square(Square),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    base: CellBase,
    layers: Vec<Decoration>,
}

impl Cell {
    pub fn square() -> Self {
        Self {
            base: CellBase::Square(Square::default()),
            layers: Vec::new(),
        }
    }

    pub fn wall() -> Self {
        Self {
            base: CellBase::Wall,
            layers: Vec::new(),
        }
    }

    pub fn is_wall(&self) -> bool {
        matches!(self.base, CellBase::Wall)
    }

    pub fn player(&self) -> Option<PlayerId> {
        match &self.base {
            CellBase::Square(square) => square.player,
            CellBase::Wall => None,
        }
    }

    pub fn has_player(&self) -> bool {
        self.player().is_some()
    }

    pub fn items(&self) -> &BTreeSet<ItemId> {
        match &self.base {
            CellBase::Square(square) => &square.items,
            CellBase::Wall => &NO_ITEMS,
        }
    }

    pub fn has_light_trail(&self) -> bool {
        match &self.base {
            CellBase::Square(square) => square.light_trail,
            CellBase::Wall => false,
        }
    }

    /// Mark the cell as part of a light trail. No-op on walls.
    pub fn place_light_trail(&mut self) {
        if let CellBase::Square(square) = &mut self.base {
            square.light_trail = true;
        }
    }

    pub fn clear_light_trail(&mut self) {
        if let CellBase::Square(square) = &mut self.base {
            square.light_trail = false;
        }
    }

    // ----------------------------------------------------------------
    // Players
    // ----------------------------------------------------------------

    /// Whether `player` may enter this cell.
    pub fn check_add_player(&self, player: PlayerId) -> Result<(), GameError> {
        for layer in &self.layers {
            if let Decoration::ForceField { active: true, .. } = layer {
                return Err(GameError::illegal("an active force field blocks this cell"));
            }
        }
        match &self.base {
            CellBase::Wall => Err(GameError::invalid("a player cannot stand on a wall")),
            CellBase::Square(square) => match square.player {
                Some(other) if other == player => {
                    Err(GameError::invalid(format!("player {player} is already here")))
                },
                Some(other) => Err(GameError::illegal(format!("cell is occupied by player {other}"))),
                None if square.light_trail => {
                    Err(GameError::illegal("a light trail covers this cell"))
                },
                None => Ok(()),
            },
        }
    }

    pub fn add_player(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.check_add_player(player)?;
        if let CellBase::Square(square) = &mut self.base {
            square.player = Some(player);
        }
        Ok(())
    }

    /// Place a player ignoring light trails and layers. Only for board setup.
    pub(crate) fn seat_player(&mut self, player: PlayerId) -> Result<(), GameError> {
        match &mut self.base {
            CellBase::Square(square) if square.player.is_none() => {
                square.player = Some(player);
                Ok(())
            },
            CellBase::Square(_) => Err(GameError::illegal("cell is already occupied")),
            CellBase::Wall => Err(GameError::invalid("a player cannot stand on a wall")),
        }
    }

    /// Whether `player` may leave this cell.
    pub fn check_remove_player(&self, player: PlayerId) -> Result<(), GameError> {
        for layer in &self.layers {
            if let Decoration::ForceField { active: true, .. } = layer {
                return Err(GameError::illegal(
                    "an active force field holds the player in place",
                ));
            }
        }
        if self.player() != Some(player) {
            return Err(GameError::invalid(format!("player {player} is not on this cell")));
        }
        Ok(())
    }

    pub fn remove_player(&mut self, player: PlayerId) -> Result<(), GameError> {
        self.check_remove_player(player)?;
        if let CellBase::Square(square) = &mut self.base {
            square.player = None;
        }
        Ok(())
    }

    // ----------------------------------------------------------------
    // Items
    // ----------------------------------------------------------------

    /// Whether an item of `kind` may be put on this cell.
    pub fn check_add_item(&self, item: ItemId, kind: ItemKind) -> Result<(), GameError> {
        for layer in &self.layers {
            if let Decoration::ForceField { active: true, .. } = layer
                && kind.is_identity_disk()
            {
                return Err(GameError::illegal("an active force field destroys identity disks"));
            }
        }
        match &self.base {
            CellBase::Wall => Err(GameError::unsupported("items cannot be placed on a wall")),
            CellBase::Square(square) if square.items.contains(&item) => {
                Err(GameError::invalid(format!("item {item} is already on this cell")))
            },
            CellBase::Square(_) => Ok(()),
        }
    }

    pub fn add_item(&mut self, item: ItemId, kind: ItemKind) -> Result<(), GameError> {
        self.check_add_item(item, kind)?;
        if let CellBase::Square(square) = &mut self.base {
            square.items.insert(item);
        }
        Ok(())
    }

    pub fn remove_item(&mut self, item: ItemId) -> Result<(), GameError> {
        match &mut self.base {
            CellBase::Square(square) if square.items.contains(&item) => {
                square.items.remove(&item);
                Ok(())
            },
            _ => Err(GameError::invalid(format!("item {item} is not on this cell"))),
        }
    }

    // ----------------------------------------------------------------
    // Decorations
    // ----------------------------------------------------------------

    pub fn decorate(&mut self, layer: Decoration) {
        self.layers.push(layer);
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.layers
    }

    pub fn remove_force_field(&mut self, id: HazardId) {
        self.layers
            .retain(|layer| !matches!(layer, Decoration::ForceField { field, .. } if *field == id));
    }

    pub fn remove_power_failure(&mut self, id: HazardId) {
        self.layers.retain(
            |layer| !matches!(layer, Decoration::PowerFailure { failure } if *failure == id),
        );
    }

    /// Propagate a force field flip into this cell's layer.
    pub fn set_force_field_active(&mut self, id: HazardId, now_active: bool) {
        for layer in &mut self.layers {
            if let Decoration::ForceField { field, active } = layer
                && *field == id
            {
                *active = now_active;
            }
        }
    }

    pub fn is_power_failed(&self) -> bool {
        self.layers
            .iter()
            .any(|layer| matches!(layer, Decoration::PowerFailure { .. }))
    }

    pub fn has_active_force_field(&self) -> bool {
        self.layers
            .iter()
            .any(|layer| matches!(layer, Decoration::ForceField { active: true, .. }))
    }

    pub fn has_force_field(&self) -> bool {
        self.layers
            .iter()
            .any(|layer| matches!(layer, Decoration::ForceField { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(active: bool) -> Decoration {
        Decoration::ForceField { field: 1, active }
    }

    #[test]
    fn square_holds_one_player() {
        let mut cell = Cell::square();
        cell.add_player(1).unwrap();
        assert!(matches!(cell.add_player(2), Err(GameError::IllegalState(_))));
        assert_eq!(cell.player(), Some(1));
        cell.remove_player(1).unwrap();
        cell.add_player(2).unwrap();
        assert_eq!(cell.player(), Some(2));
    }

    #[test]
    fn removing_absent_player_is_invalid() {
        let mut cell = Cell::square();
        assert!(matches!(
            cell.remove_player(1),
            Err(GameError::InvalidArgument(_))
        ));
    }

    #[test]
    fn item_is_removed_once() {
        let mut cell = Cell::square();
        cell.add_item(4, ItemKind::LightGrenade).unwrap();
        cell.remove_item(4).unwrap();
        assert!(cell.items().is_empty());
        assert!(matches!(cell.remove_item(4), Err(GameError::InvalidArgument(_))));
        assert!(Cell::wall().remove_item(4).is_err());
    }

    #[test]
    fn light_trail_blocks_entry() {
        let mut cell = Cell::square();
        cell.place_light_trail();
        assert!(cell.add_player(1).is_err());
        cell.clear_light_trail();
        assert!(cell.add_player(1).is_ok());
    }

    #[test]
    fn wall_rejects_everything() {
        let mut wall = Cell::wall();
        assert!(matches!(wall.add_player(1), Err(GameError::InvalidArgument(_))));
        assert!(matches!(
            wall.add_item(1, ItemKind::LightGrenade),
            Err(GameError::Unsupported(_))
        ));
        wall.place_light_trail();
        assert!(!wall.has_light_trail());
        assert!(!wall.has_player());
        assert!(wall.items().is_empty());
    }

    #[test]
    fn active_force_field_blocks_players_and_disks() {
        let mut cell = Cell::square();
        cell.decorate(field(true));
        assert!(matches!(cell.add_player(1), Err(GameError::IllegalState(_))));
        assert!(matches!(
            cell.add_item(1, ItemKind::ChargedIdentityDisk),
            Err(GameError::IllegalState(_))
        ));
        assert!(cell.add_item(2, ItemKind::LightGrenade).is_ok());
    }

    #[test]
    fn inactive_force_field_forwards() {
        let mut cell = Cell::square();
        cell.decorate(field(false));
        cell.add_player(1).unwrap();
        cell.add_item(5, ItemKind::UnchargedIdentityDisk).unwrap();
        cell.set_force_field_active(1, true);
        assert!(matches!(
            cell.remove_player(1),
            Err(GameError::IllegalState(_))
        ));
        cell.set_force_field_active(1, false);
        cell.remove_player(1).unwrap();
    }

    #[test]
    fn undecorating_restores_plain_cell() {
        let mut cell = Cell::square();
        cell.decorate(Decoration::PowerFailure { failure: 9 });
        cell.decorate(field(true));
        assert!(cell.is_power_failed());
        cell.remove_force_field(1);
        assert!(!cell.has_force_field());
        assert!(cell.is_power_failed());
        cell.add_player(3).unwrap();
        cell.remove_power_failure(9);
        assert_eq!(cell, {
            let mut plain = Cell::square();
            plain.add_player(3).unwrap();
            plain
        });
    }

    #[test]
    fn power_failure_does_not_restrict_admission() {
        let mut cell = Cell::square();
        cell.decorate(Decoration::PowerFailure { failure: 1 });
        cell.add_player(1).unwrap();
        cell.add_item(1, ItemKind::ChargedIdentityDisk).unwrap();
    }
}
