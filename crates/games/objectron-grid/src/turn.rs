use objectron_core::game_trait::PlayerId;
use serde::{Deserialize, Serialize};

use crate::error::{BoardError, GameError};
use crate::player::PlayerState;

/// Ticks of the shared turn clock that transient hazards listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnEvent {
    /// Some player completed an action.
    EndAction,
    /// Some player's turn ended.
    EndTurn,
}

/// Fixed, ordered seating with a round-robin current-player pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDatabase {
    players: Vec<PlayerState>,
    current: usize,
}

impl PlayerDatabase {
    /// Seat exactly `expected` players; `starting` is the index of the first
    /// player to act.
    pub fn new(
        players: Vec<PlayerState>,
        expected: usize,
        starting: usize,
    ) -> Result<Self, BoardError> {
        if players.len() != expected || expected == 0 {
            return Err(BoardError::PlayerCount {
                expected,
                found: players.len(),
            });
        }
        Ok(Self {
            current: starting % players.len(),
            players,
        })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &PlayerState {
        &self.players[self.current]
    }

    pub fn current_id(&self) -> PlayerId {
        self.current().id()
    }

    pub fn get(&self, id: PlayerId) -> Result<&PlayerState, GameError> {
        self.players
            .iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| GameError::invalid(format!("no player with id {id}")))
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Result<&mut PlayerState, GameError> {
        self.players
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| GameError::invalid(format!("no player with id {id}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerState> {
        self.players.iter()
    }

    #[cfg(test)]
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlayerState> {
        self.players.iter_mut()
    }

    /// A player reports that its turn is over. The pointer advances only if
    /// that player is the current one, so a second report for the same turn
    /// is ignored. Returns whether the pointer moved.
    pub fn notify_turn_end(&mut self, player: PlayerId) -> bool {
        if self.current_id() != player {
            tracing::debug!(player, current = self.current_id(), "Ignored stale turn-end notice");
            return false;
        }
        self.current = (self.current + 1) % self.players.len();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use objectron_core::geometry::Coordinate;
    use objectron_core::test_helpers::make_players;

    fn database(n: usize, starting: usize) -> PlayerDatabase {
        let players = make_players(n)
            .into_iter()
            .enumerate()
            .map(|(i, p)| PlayerState::new(p, Coordinate::new(i as i32, 0), 6, 3))
            .collect();
        PlayerDatabase::new(players, n, starting).unwrap()
    }

    #[test]
    fn wrong_player_count_is_rejected() {
        let players = make_players(3)
            .into_iter()
            .map(|p| PlayerState::new(p, Coordinate::new(0, 0), 6, 3))
            .collect();
        assert_eq!(
            PlayerDatabase::new(players, 2, 0).unwrap_err(),
            BoardError::PlayerCount {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn duplicate_notice_advances_once() {
        let mut db = database(2, 0);
        assert!(db.notify_turn_end(1));
        assert!(!db.notify_turn_end(1));
        assert_eq!(db.current_id(), 2);
    }

    #[test]
    fn unknown_player_lookup_fails() {
        let db = database(2, 0);
        assert!(matches!(db.get(9), Err(GameError::InvalidArgument(_))));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn k_notices_return_to_start(k in 1usize..6, start in 0usize..6) {
                let mut db = database(k, start);
                let first = db.current_index();
                for _ in 0..k {
                    let current = db.current_id();
                    prop_assert!(db.notify_turn_end(current));
                }
                prop_assert_eq!(db.current_index(), first);
            }
        }
    }
}
