//! Read-only views of a board for presentation layers: one character per
//! cell for text front ends, and a serializable snapshot for everything else.

use objectron_core::game_trait::{DefeatReason, ItemId, PlayerId};
use objectron_core::geometry::Coordinate;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cell::Cell;
use crate::force_field::ForceField;
use crate::items::{Item, ItemKind, Placement};
use crate::power_failure::PowerFailure;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub at: Coordinate,
    pub wall: bool,
    pub player: Option<PlayerId>,
    pub items: Vec<ItemId>,
    pub light_trail: bool,
    /// `Some(active)` when a force field covers the cell.
    pub force_field: Option<bool>,
    pub power_failure: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub position: Coordinate,
    pub starting_position: Option<Coordinate>,
    pub remaining_actions: i32,
    pub inventory: Vec<ItemId>,
    pub light_trail: Vec<Coordinate>,
    pub defeated: Option<DefeatReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub kind: ItemKind,
    pub placement: Placement,
    pub item: Item,
}

/// Everything a presentation layer needs to draw the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub cells: Vec<CellView>,
    pub players: Vec<PlayerView>,
    pub items: Vec<ItemView>,
    pub force_fields: Vec<ForceField>,
    pub power_failures: Vec<PowerFailure>,
    pub current_player: Option<PlayerId>,
    pub winner: Option<PlayerId>,
    pub game_over: bool,
}

impl Board {
    /// Character shown for the cell at `at`: `#` wall, the player's seat
    /// number, the first item's symbol, `*` light trail, `=` / `:` active /
    /// inactive force field, `~` no power, `.` empty square and a blank
    /// outside the board.
    pub fn cell_symbol(&self, at: Coordinate) -> char {
        let Ok(cell) = self.grid().cell(at) else {
            return ' ';
        };
        if cell.is_wall() {
            return '#';
        }
        if let Some(player) = cell.player() {
            let seat = self.players().iter().position(|p| p.id() == player);
            return seat
                .and_then(|s| char::from_digit(s as u32 + 1, 10))
                .unwrap_or('@');
        }
        if let Some(kind) = cell.items().iter().find_map(|&id| self.items().kind(id)) {
            return kind.symbol();
        }
        if cell.has_light_trail() {
            '*'
        } else if cell.has_active_force_field() {
            '='
        } else if cell.has_force_field() {
            ':'
        } else if cell.is_power_failed() {
            '~'
        } else {
            '.'
        }
    }

    /// The board as text, one line per row from the smallest `y` down.
    pub fn render_ascii(&self) -> String {
        let Some((min, max)) = self.grid().bounds() else {
            return String::new();
        };
        let mut out = String::new();
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                out.push(self.cell_symbol(Coordinate::new(x, y)));
            }
            out.push('\n');
        }
        out
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let cells = self
            .grid()
            .iter()
            .map(|container| cell_view(container.coordinate(), container.cell()))
            .collect();
        let players = self
            .players()
            .iter()
            .map(|p| PlayerView {
                id: p.id(),
                name: p.profile().display_name.clone(),
                position: p.position(),
                starting_position: p.starting_position(),
                remaining_actions: p.remaining_actions(),
                inventory: p.inventory().to_vec(),
                light_trail: p.light_trail().cells().collect(),
                defeated: p.defeated(),
            })
            .collect();
        let items = self
            .items()
            .iter()
            .map(|(id, entry)| ItemView {
                id,
                kind: entry.item.kind(),
                placement: entry.placement,
                item: entry.item.clone(),
            })
            .collect();
        BoardSnapshot {
            cells,
            players,
            items,
            force_fields: self.force_fields().iter().cloned().collect(),
            power_failures: self.power_failures().iter().cloned().collect(),
            current_player: self.current_player(),
            winner: self.winner(),
            game_over: self.is_game_over(),
        }
    }
}

fn cell_view(at: Coordinate, cell: &Cell) -> CellView {
    CellView {
        at,
        wall: cell.is_wall(),
        player: cell.player(),
        items: cell.items().iter().copied().collect(),
        light_trail: cell.has_light_trail(),
        force_field: cell
            .has_force_field()
            .then(|| cell.has_active_force_field()),
        power_failure: cell.is_power_failed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BoardBuilder;
    use crate::config::ObjectronConfig;
    use objectron_core::command::Command;
    use objectron_core::geometry::Direction;
    use objectron_core::test_helpers::make_players;

    fn board() -> Board {
        let mut builder = BoardBuilder::new(ObjectronConfig::default().without_random_failures());
        builder.add_rectangle(4, 3).unwrap();
        builder.add_wall(Coordinate::new(2, 1)).unwrap();
        builder
            .add_player_starting_position(Coordinate::new(0, 0))
            .add_player_starting_position(Coordinate::new(3, 2))
            .place_light_grenade(Coordinate::new(3, 0))
            .place_force_field_generator(Coordinate::new(0, 2));
        builder.build_board(&make_players(2)).unwrap()
    }

    #[test]
    fn ascii_shows_every_layer() {
        let mut board = board();
        assert_eq!(board.render_ascii(), "1..L\n..#.\nG..2\n");

        board.execute(1, Command::Move(Direction::East)).unwrap();
        board.place_power_failure(Coordinate::new(3, 1)).unwrap();
        let ascii = board.render_ascii();
        assert_eq!(&ascii[0..2], "*1");
        assert_eq!(board.cell_symbol(Coordinate::new(2, 1)), '#');
        assert_eq!(board.cell_symbol(Coordinate::new(9, 9)), ' ');
    }

    #[test]
    fn power_failure_symbol() {
        let mut board = board();
        board.place_power_failure(Coordinate::new(1, 1)).unwrap();
        assert_eq!(board.cell_symbol(Coordinate::new(1, 1)), '~');
    }

    #[test]
    fn snapshot_reflects_the_board() {
        let board = board();
        let snapshot = board.snapshot();
        assert_eq!(snapshot.cells.len(), 12);
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.players[0].remaining_actions, 3);
        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.items[0].kind, ItemKind::LightGrenade);
        assert_eq!(snapshot.current_player, Some(1));
        assert!(!snapshot.game_over);
        assert!(snapshot.cells.iter().any(|c| c.wall));
    }

    #[test]
    fn snapshot_survives_msgpack() {
        let snapshot = board().snapshot();
        let bytes = rmp_serde::to_vec(&snapshot).unwrap();
        let decoded: BoardSnapshot = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
