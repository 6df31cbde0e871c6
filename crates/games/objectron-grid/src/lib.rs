pub mod board;
pub mod builder;
pub mod capability;
pub mod cell;
pub mod config;
pub mod effect;
pub mod error;
pub mod force_field;
pub mod grid;
pub mod items;
pub mod light_trail;
pub mod outcome;
pub mod player;
pub mod power_failure;
pub mod render;
pub mod turn;

use objectron_core::command::Command;
use objectron_core::game_trait::{
    GameEvent, GameMetadata, PlayerId, PlayerStanding, TurnBasedGame,
};
use objectron_core::geometry::Coordinate;
use objectron_core::player::Player;

use board::Board;
use builder::BoardBuilder;
use config::ObjectronConfig;
use error::{BoardError, GameError};

/// A game of Objectron on a grid board.
#[derive(Debug, Clone)]
pub struct ObjectronGame {
    board: Board,
}

impl ObjectronGame {
    /// The standard 10x10 board for `players`, configured from
    /// [`ObjectronConfig::load`].
    pub fn standard(players: &[Player]) -> Result<Self, BoardError> {
        Self::standard_with_config(players, ObjectronConfig::load())
    }

    pub fn standard_with_config(
        players: &[Player],
        config: ObjectronConfig,
    ) -> Result<Self, BoardError> {
        BoardBuilder::standard(config).build(players)
    }

    pub(crate) fn from_board(board: Board) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &ObjectronConfig {
        self.board.config()
    }

    /// Cut the power at `at` outside the regular turn clock.
    pub fn place_power_failure(&mut self, at: Coordinate) -> Result<Vec<GameEvent>, GameError> {
        self.board.place_power_failure(at)
    }
}

impl TurnBasedGame for ObjectronGame {
    type Error = GameError;

    fn metadata(&self) -> GameMetadata {
        // A board seats exactly as many players as it has starting positions.
        let seats = u8::try_from(self.config().player_count).unwrap_or(u8::MAX);
        GameMetadata {
            name: "Objectron".to_string(),
            description: "Move, leave light trails and outmaneuver your opponent to reach their start."
                .to_string(),
            min_players: seats,
            max_players: seats,
        }
    }

    fn current_player(&self) -> Option<PlayerId> {
        self.board.current_player()
    }

    fn execute(
        &mut self,
        player_id: PlayerId,
        command: Command,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.board.execute(player_id, command).inspect_err(|e| {
            tracing::debug!(player_id, ?command, error = %e, "Rejected command");
        })
    }

    fn serialize_state(&self) -> Vec<u8> {
        rmp_serde::to_vec(&self.board.snapshot()).expect("board snapshot serialization must succeed")
    }

    fn actions_per_turn(&self) -> u8 {
        self.config().actions_per_turn
    }

    fn is_game_over(&self) -> bool {
        self.board.is_game_over()
    }

    fn winner(&self) -> Option<PlayerId> {
        self.board.winner()
    }

    fn standings(&self) -> Vec<PlayerStanding> {
        outcome::standings(self.board.players(), self.board.outcome())
    }
}
