use serde::{Deserialize, Serialize};

use crate::game_trait::ItemId;
use crate::geometry::Direction;

/// Commands an input controller may submit for the current player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Step onto the neighboring cell in the given direction.
    Move(Direction),
    /// Pick up an item lying on the player's cell.
    PickUp(ItemId),
    /// Use an item from the inventory. Identity disks need a direction.
    UseItem {
        item: ItemId,
        direction: Option<Direction>,
    },
    /// Hand the turn to the next player.
    EndTurn,
}

impl Command {
    /// Whether executing this command consumes an action.
    pub const fn is_action(&self) -> bool {
        !matches!(self, Command::EndTurn)
    }
}
