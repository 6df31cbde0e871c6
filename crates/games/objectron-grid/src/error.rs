//! Error types for commands and board construction.
//!
//! [`GameError`] covers everything a command can be rejected for; none of its
//! variants leave partial state behind. [`BoardError`] reports structural
//! problems found while building a board, which must be rejected outright.

use objectron_core::game_trait::PlayerId;
use objectron_core::geometry::Coordinate;
use thiserror::Error;

/// Reasons an operation on the board is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// A precondition on the arguments does not hold.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not allowed in the current state.
    #[error("illegal action: {0}")]
    IllegalState(String),

    /// The target does not support the operation at all.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A player acted while it was someone else's turn.
    #[error("it is not player {player}'s turn")]
    NotYourTurn { player: PlayerId },

    /// The game already has a winner.
    #[error("the game is over")]
    GameOver,
}

impl GameError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn illegal(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}

/// Structural problems that make a board unplayable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("the board has no squares")]
    EmptyBoard,

    #[error("cell {0} was added twice")]
    DuplicateCell(Coordinate),

    #[error("no square at {0}")]
    UnknownCell(Coordinate),

    #[error("wall at {0} overlaps another wall")]
    WallOverlap(Coordinate),

    #[error("wall from {from} to {to} is not horizontal or vertical")]
    MisalignedWall { from: Coordinate, to: Coordinate },

    #[error("expected {expected} starting positions, found {found}")]
    StartingPositionCount { expected: usize, found: usize },

    #[error("starting position {0} is used twice")]
    DuplicateStartingPosition(Coordinate),

    #[error("starting position {0} is not on a square")]
    StartingPositionOnWall(Coordinate),

    #[error("expected {expected} players, found {found}")]
    PlayerCount { expected: usize, found: usize },

    #[error("square {unreachable} cannot be reached from the rest of the board")]
    Disconnected { unreachable: Coordinate },

    #[error("teleporter at {from} points to {to}, which holds no teleporter")]
    DanglingTeleporter { from: Coordinate, to: Coordinate },

    #[error("cannot place item at {at}: {reason}")]
    ItemPlacement { at: Coordinate, reason: GameError },
}
