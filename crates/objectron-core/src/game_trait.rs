use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::geometry::Coordinate;

/// Unique identifier for a player in the game.
pub type PlayerId = u64;

/// Unique identifier for an item on the board or in an inventory.
pub type ItemId = u64;

/// Unique identifier for a force field or power failure.
pub type HazardId = u64;

/// Core trait implemented by a turn-based Objectron ruleset.
///
/// Input controllers translate user intent into [`Command`] values; the game
/// validates and applies them synchronously and reports what happened as a
/// list of [`GameEvent`]s. A failed command leaves the game untouched.
pub trait TurnBasedGame {
    /// Failure reported for rejected commands.
    type Error: std::error::Error;

    /// Game metadata for a selection screen.
    fn metadata(&self) -> GameMetadata;

    /// The player whose turn it is, `None` once the game is over.
    fn current_player(&self) -> Option<PlayerId>;

    /// Execute one command on behalf of `player_id`.
    fn execute(&mut self, player_id: PlayerId, command: Command)
    -> Result<Vec<GameEvent>, Self::Error>;

    /// Serialize a read-only snapshot of the board for presentation layers.
    fn serialize_state(&self) -> Vec<u8>;

    /// Number of actions a player gets at the start of an unpenalized turn.
    fn actions_per_turn(&self) -> u8 {
        3
    }

    /// Whether a player has won.
    fn is_game_over(&self) -> bool;

    /// Winner of the game, if decided.
    fn winner(&self) -> Option<PlayerId>;

    /// One entry per seated player.
    fn standings(&self) -> Vec<PlayerStanding>;
}

/// Game metadata for a selection screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub min_players: u8,
    pub max_players: u8,
}

/// Why a player lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefeatReason {
    /// Forced onto a cell covered by a light trail.
    LightTrail,
    /// Caught inside a force field when it switched on.
    ForceField,
    /// Started a turn with no cell to move to.
    Trapped,
    /// Ended a turn without moving.
    DidNotMove,
}

/// Severity of a power failure; lower levels decay faster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerFailureLevel {
    Primary,
    Secondary,
    Tertiary,
}

/// Events emitted while executing commands and advancing the turn clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerMoved {
        player_id: PlayerId,
        from: Coordinate,
        to: Coordinate,
    },
    PlayerTeleported {
        player_id: PlayerId,
        from: Coordinate,
        to: Coordinate,
    },
    ItemPickedUp {
        player_id: PlayerId,
        item_id: ItemId,
    },
    ItemPlaced {
        player_id: PlayerId,
        item_id: ItemId,
        at: Coordinate,
    },
    GrenadeExploded {
        item_id: ItemId,
        at: Coordinate,
        victim: PlayerId,
        actions_lost: u8,
    },
    DiskLanded {
        item_id: ItemId,
        at: Coordinate,
    },
    DiskHit {
        item_id: ItemId,
        victim: PlayerId,
        actions_lost: u8,
    },
    DiskDestroyed {
        item_id: ItemId,
        at: Coordinate,
    },
    ForceFieldCreated {
        field_id: HazardId,
        cells: Vec<Coordinate>,
    },
    ForceFieldToggled {
        field_id: HazardId,
        active: bool,
    },
    ForceFieldRemoved {
        field_id: HazardId,
    },
    PowerFailureStarted {
        failure_id: HazardId,
        at: Coordinate,
        level: PowerFailureLevel,
    },
    PowerFailureEnded {
        failure_id: HazardId,
        at: Coordinate,
    },
    TurnStarted {
        player_id: PlayerId,
        actions: i32,
    },
    TurnSkipped {
        player_id: PlayerId,
    },
    TurnEnded {
        player_id: PlayerId,
    },
    PlayerDefeated {
        player_id: PlayerId,
        reason: DefeatReason,
    },
    GameWon {
        player_id: PlayerId,
    },
}

/// Standing of a seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub player_id: PlayerId,
    pub defeated: Option<DefeatReason>,
    pub winner: bool,
}
