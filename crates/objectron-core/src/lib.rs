pub mod command;
pub mod game_trait;
pub mod geometry;
pub mod player;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::command::Command;
    use crate::game_trait::{GameEvent, PlayerId, TurnBasedGame};
    use crate::player::Player;

    /// Create `n` test players with sequential IDs starting at 1.
    pub fn make_players(n: usize) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(i as PlayerId + 1, format!("Player{}", i + 1), i))
            .collect()
    }

    /// Execute commands for the current player in order, stopping at the first
    /// failure. Returns all accumulated events.
    pub fn run_commands<G: TurnBasedGame>(game: &mut G, commands: &[Command]) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for &command in commands {
            let Some(player) = game.current_player() else {
                break;
            };
            match game.execute(player, command) {
                Ok(events) => all_events.extend(events),
                Err(_) => break,
            }
        }
        all_events
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // These functions form a generic test suite that every TurnBasedGame
    // implementation must pass. Game crates call them from their own
    // #[cfg(test)] modules with a concrete game instance and valid input.

    /// The current player must be one of the seated players.
    pub fn contract_current_player_is_seated<G: TurnBasedGame>(game: &G) {
        let current = game
            .current_player()
            .expect("a fresh game must have a current player");
        assert!(
            game.standings().iter().any(|s| s.player_id == current),
            "current player {current} is not seated"
        );
    }

    /// A command from a player whose turn it is not must fail without touching state.
    pub fn contract_rejects_waiting_player<G: TurnBasedGame>(game: &mut G, command: Command) {
        let current = game.current_player().expect("game must be running");
        let waiting = game
            .standings()
            .iter()
            .map(|s| s.player_id)
            .find(|&id| id != current)
            .expect("contract needs at least two players");
        let before = game.serialize_state();
        assert!(
            game.execute(waiting, command).is_err(),
            "waiting player {waiting} must not be able to act"
        );
        assert_eq!(
            before,
            game.serialize_state(),
            "rejected command must not change state"
        );
    }

    /// A failing command must leave the serialized state byte-identical.
    pub fn contract_failed_command_leaves_state_unchanged<G: TurnBasedGame>(
        game: &mut G,
        invalid: Command,
    ) {
        let player = game.current_player().expect("game must be running");
        let before = game.serialize_state();
        assert!(
            game.execute(player, invalid).is_err(),
            "{invalid:?} was expected to fail"
        );
        assert_eq!(
            before,
            game.serialize_state(),
            "failed command must not change state"
        );
    }

    /// A valid action must change the serialized state.
    pub fn contract_valid_command_changes_state<G: TurnBasedGame>(game: &mut G, valid: Command) {
        let player = game.current_player().expect("game must be running");
        let before = game.serialize_state();
        game.execute(player, valid)
            .unwrap_or_else(|e| panic!("{valid:?} was expected to succeed: {e}"));
        assert_ne!(
            before,
            game.serialize_state(),
            "State must change after a valid command"
        );
    }

    /// Ending one turn per seated player must bring the turn back to the
    /// player who started. `prepare` performs whatever a player must do
    /// before ending a turn legally (e.g. move once).
    pub fn contract_turns_rotate_round_robin<G, F>(game: &mut G, mut prepare: F)
    where
        G: TurnBasedGame,
        F: FnMut(&mut G, PlayerId),
    {
        let first = game.current_player().expect("game must be running");
        let seats = game.standings().len();
        for _ in 0..seats {
            let player = game.current_player().expect("game must keep running");
            prepare(game, player);
            if game.current_player() == Some(player) {
                game.execute(player, Command::EndTurn)
                    .unwrap_or_else(|e| panic!("end turn failed: {e}"));
            }
            assert_ne!(
                game.current_player(),
                Some(player),
                "turn must pass to another player"
            );
        }
        assert_eq!(
            game.current_player(),
            Some(first),
            "after one turn per player the first player must be current again"
        );
    }

    /// standings() must return an entry for each seated player.
    pub fn contract_standings_complete<G: TurnBasedGame>(game: &G, expected_players: usize) {
        let standings = game.standings();
        assert_eq!(
            standings.len(),
            expected_players,
            "standings must have one entry per seated player"
        );
        assert!(
            standings.iter().filter(|s| s.winner).count() <= 1,
            "at most one winner"
        );
    }
}
