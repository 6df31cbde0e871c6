use objectron_core::game_trait::{DefeatReason, ItemId, PlayerId};
use objectron_core::geometry::Coordinate;
use objectron_core::player::Player;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::light_trail::LightTrail;

/// How a new turn starts for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStart {
    /// The player may act with this many actions.
    Play(i32),
    /// Carried-over penalties consume the whole turn.
    Skipped,
}

/// Per-game state of a seated player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    profile: Player,
    position: Coordinate,
    starting_position: Option<Coordinate>,
    inventory: Vec<ItemId>,
    inventory_capacity: usize,
    remaining_actions: i32,
    moved_this_turn: bool,
    light_trail: LightTrail,
    defeated: Option<DefeatReason>,
}

impl PlayerState {
    pub fn new(
        profile: Player,
        start: Coordinate,
        inventory_capacity: usize,
        trail_length: usize,
    ) -> Self {
        Self {
            profile,
            position: start,
            starting_position: Some(start),
            inventory: Vec::new(),
            inventory_capacity,
            remaining_actions: 0,
            moved_this_turn: false,
            light_trail: LightTrail::new(trail_length),
            defeated: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.profile.id
    }

    pub fn profile(&self) -> &Player {
        &self.profile
    }

    pub fn position(&self) -> Coordinate {
        self.position
    }

    pub(crate) fn set_position(&mut self, at: Coordinate) {
        self.position = at;
    }

    pub fn starting_position(&self) -> Option<Coordinate> {
        self.starting_position
    }

    /// Set the starting position. Immutable once set.
    pub fn set_starting_position(&mut self, at: Coordinate) -> Result<(), GameError> {
        if self.starting_position.is_some() {
            return Err(GameError::illegal("starting position is already set"));
        }
        self.starting_position = Some(at);
        Ok(())
    }

    // ----------------------------------------------------------------
    // Inventory
    // ----------------------------------------------------------------

    pub fn inventory(&self) -> &[ItemId] {
        &self.inventory
    }

    pub fn has_item(&self, item: ItemId) -> bool {
        self.inventory.contains(&item)
    }

    pub fn check_can_carry(&self, item: ItemId) -> Result<(), GameError> {
        if self.has_item(item) {
            return Err(GameError::invalid(format!("item {item} is already carried")));
        }
        if self.inventory.len() >= self.inventory_capacity {
            return Err(GameError::illegal(format!(
                "inventory is full ({}/{})",
                self.inventory.len(),
                self.inventory_capacity
            )));
        }
        Ok(())
    }

    pub(crate) fn store(&mut self, item: ItemId) -> Result<(), GameError> {
        self.check_can_carry(item)?;
        self.inventory.push(item);
        Ok(())
    }

    pub(crate) fn take(&mut self, item: ItemId) -> Result<(), GameError> {
        let index = self
            .inventory
            .iter()
            .position(|&i| i == item)
            .ok_or_else(|| GameError::invalid(format!("item {item} is not in the inventory")))?;
        self.inventory.remove(index);
        Ok(())
    }

    // ----------------------------------------------------------------
    // Actions
    // ----------------------------------------------------------------

    pub fn remaining_actions(&self) -> i32 {
        self.remaining_actions
    }

    pub fn has_actions(&self) -> bool {
        self.remaining_actions > 0
    }

    pub fn moved_this_turn(&self) -> bool {
        self.moved_this_turn
    }

    pub(crate) fn spend_action(&mut self) {
        self.remaining_actions -= 1;
    }

    pub(crate) fn record_move(&mut self) {
        self.moved_this_turn = true;
    }

    /// Lose `count` actions. The balance may go negative; the deficit is
    /// taken from the following turns.
    pub(crate) fn skip_actions(&mut self, count: u8) {
        self.remaining_actions -= i32::from(count);
    }

    /// Lose whatever is left of the current turn, without carrying a deficit.
    pub(crate) fn lose_remaining_actions(&mut self) {
        self.remaining_actions = self.remaining_actions.min(0);
    }

    /// Grant a new turn's actions. Unused actions do not carry over, a
    /// deficit does: a player owing more than a full turn skips it.
    pub(crate) fn begin_turn(&mut self, actions_per_turn: u8) -> TurnStart {
        self.moved_this_turn = false;
        self.remaining_actions = self.remaining_actions.min(0) + i32::from(actions_per_turn);
        if self.remaining_actions > 0 {
            TurnStart::Play(self.remaining_actions)
        } else {
            TurnStart::Skipped
        }
    }

    // ----------------------------------------------------------------
    // Light trail & defeat
    // ----------------------------------------------------------------

    pub fn light_trail(&self) -> &LightTrail {
        &self.light_trail
    }

    pub(crate) fn light_trail_mut(&mut self) -> &mut LightTrail {
        &mut self.light_trail
    }

    pub fn defeated(&self) -> Option<DefeatReason> {
        self.defeated
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated.is_some()
    }

    pub(crate) fn defeat(&mut self, reason: DefeatReason) -> bool {
        if self.defeated.is_some() {
            return false;
        }
        self.defeated = Some(reason);
        true
    }
}
