use objectron_core::game_trait::{PlayerId, PlayerStanding};
use serde::{Deserialize, Serialize};

use crate::turn::PlayerDatabase;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won(PlayerId),
    /// Every player was defeated at once.
    Draw,
}

impl Outcome {
    pub fn winner(self) -> Option<PlayerId> {
        match self {
            Outcome::Won(player) => Some(player),
            Outcome::Draw => None,
        }
    }
}

/// Whether `mover` stands on the starting position of another player.
pub fn reached_opponent_start(players: &PlayerDatabase, mover: PlayerId) -> bool {
    let Ok(state) = players.get(mover) else {
        return false;
    };
    if state.is_defeated() {
        return false;
    }
    let position = state.position();
    players
        .iter()
        .filter(|p| p.id() != mover)
        .any(|p| p.starting_position() == Some(position))
}

/// Decide the game once at most one player is left standing.
pub fn last_standing(players: &PlayerDatabase) -> Option<Outcome> {
    let mut standing = players.iter().filter(|p| !p.is_defeated());
    match (standing.next(), standing.next()) {
        (None, _) => Some(Outcome::Draw),
        (Some(last), None) if players.len() > 1 => Some(Outcome::Won(last.id())),
        _ => None,
    }
}

/// One entry per seated player, in seating order.
pub fn standings(players: &PlayerDatabase, outcome: Option<Outcome>) -> Vec<PlayerStanding> {
    let winner = outcome.and_then(Outcome::winner);
    players
        .iter()
        .map(|p| PlayerStanding {
            player_id: p.id(),
            defeated: p.defeated(),
            winner: winner == Some(p.id()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerState;
    use objectron_core::game_trait::DefeatReason;
    use objectron_core::geometry::Coordinate;
    use objectron_core::test_helpers::make_players;

    fn database(n: usize) -> PlayerDatabase {
        let players = make_players(n)
            .into_iter()
            .enumerate()
            .map(|(i, p)| PlayerState::new(p, Coordinate::new(i as i32, 0), 6, 3))
            .collect();
        PlayerDatabase::new(players, n, 0).unwrap()
    }

    #[test]
    fn game_goes_on_while_two_stand() {
        let mut db = database(3);
        assert_eq!(last_standing(&db), None);
        db.get_mut(1).unwrap().defeat(DefeatReason::Trapped);
        assert_eq!(last_standing(&db), None);
        db.get_mut(3).unwrap().defeat(DefeatReason::DidNotMove);
        assert_eq!(last_standing(&db), Some(Outcome::Won(2)));
    }

    #[test]
    fn everyone_defeated_is_a_draw() {
        let mut db = database(2);
        for p in db.iter_mut() {
            p.defeat(DefeatReason::ForceField);
        }
        assert_eq!(last_standing(&db), Some(Outcome::Draw));
        assert!(standings(&db, Some(Outcome::Draw)).iter().all(|s| !s.winner));
    }

    #[test]
    fn opponent_start_counts_own_start_does_not() {
        let mut db = database(2);
        assert!(!reached_opponent_start(&db, 1));
        db.get_mut(1).unwrap().set_position(Coordinate::new(1, 0));
        assert!(reached_opponent_start(&db, 1));
    }

    #[test]
    fn standings_mark_the_winner() {
        let db = database(2);
        let table = standings(&db, Some(Outcome::Won(2)));
        assert_eq!(table.len(), 2);
        assert!(!table[0].winner);
        assert!(table[1].winner);
    }
}
