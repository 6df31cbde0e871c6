use std::collections::{BTreeMap, BTreeSet};

use objectron_core::game_trait::ItemId;
use objectron_core::geometry::Coordinate;
use objectron_core::player::Player;

use crate::ObjectronGame;
use crate::board::Board;
use crate::cell::Cell;
use crate::config::ObjectronConfig;
use crate::error::BoardError;
use crate::grid::Grid;
use crate::items::disk::IdentityDisk;
use crate::items::grenade::LightGrenade;
use crate::items::teleporter::Teleporter;
use crate::items::{Item, ItemStore, Placement};
use crate::player::PlayerState;
use crate::turn::PlayerDatabase;

/// Side length of the standard board.
const STANDARD_SIZE: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terrain {
    Square,
    Wall,
}

#[derive(Debug, Clone, Copy)]
enum PendingItem {
    LightGrenade,
    IdentityDisk { charged: bool },
    ForceFieldGenerator,
    Teleporter { destination: Coordinate },
}

/// Collects the layout of a board and validates it as a whole in
/// [`BoardBuilder::build`]. Item ids follow placement order, starting at 1.
#[derive(Debug, Clone)]
pub struct BoardBuilder {
    config: ObjectronConfig,
    terrain: BTreeMap<Coordinate, Terrain>,
    items: Vec<(Coordinate, PendingItem)>,
    starts: Vec<Coordinate>,
}

impl BoardBuilder {
    pub fn new(config: ObjectronConfig) -> Self {
        Self {
            config,
            terrain: BTreeMap::new(),
            items: Vec::new(),
            starts: Vec::new(),
        }
    }

    /// 10x10 squares with starting positions in the bottom-left and
    /// top-right corners.
    pub fn standard(config: ObjectronConfig) -> Self {
        let mut builder = Self::new(config);
        for y in 0..STANDARD_SIZE {
            for x in 0..STANDARD_SIZE {
                builder.terrain.insert(Coordinate::new(x, y), Terrain::Square);
            }
        }
        builder
            .add_player_starting_position(Coordinate::new(0, STANDARD_SIZE - 1))
            .add_player_starting_position(Coordinate::new(STANDARD_SIZE - 1, 0));
        builder
    }

    pub fn config(&self) -> &ObjectronConfig {
        &self.config
    }

    pub fn add_square(&mut self, at: Coordinate) -> Result<&mut Self, BoardError> {
        if self.terrain.contains_key(&at) {
            return Err(BoardError::DuplicateCell(at));
        }
        self.terrain.insert(at, Terrain::Square);
        Ok(self)
    }

    /// Add a wall, turning an existing square into one.
    pub fn add_wall(&mut self, at: Coordinate) -> Result<&mut Self, BoardError> {
        if self.terrain.insert(at, Terrain::Wall) == Some(Terrain::Wall) {
            return Err(BoardError::WallOverlap(at));
        }
        Ok(self)
    }

    /// Add a horizontal or vertical wall from `from` to `to`, both included.
    pub fn add_wall_segment(
        &mut self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<&mut Self, BoardError> {
        if from.x != to.x && from.y != to.y {
            return Err(BoardError::MisalignedWall { from, to });
        }
        let cells: Vec<Coordinate> = std::iter::once(from)
            .chain(from.cells_between(to))
            .chain((from != to).then_some(to))
            .collect();
        if let Some(&overlap) = cells
            .iter()
            .find(|at| self.terrain.get(at) == Some(&Terrain::Wall))
        {
            return Err(BoardError::WallOverlap(overlap));
        }
        for at in cells {
            self.terrain.insert(at, Terrain::Wall);
        }
        Ok(self)
    }

    /// Add `width` x `height` squares with the top-left corner at the origin.
    pub fn add_rectangle(&mut self, width: i32, height: i32) -> Result<&mut Self, BoardError> {
        for y in 0..height {
            for x in 0..width {
                self.add_square(Coordinate::new(x, y))?;
            }
        }
        Ok(self)
    }

    pub fn place_light_grenade(&mut self, at: Coordinate) -> &mut Self {
        self.items.push((at, PendingItem::LightGrenade));
        self
    }

    pub fn place_charged_identity_disc(&mut self, at: Coordinate) -> &mut Self {
        self.items.push((at, PendingItem::IdentityDisk { charged: true }));
        self
    }

    pub fn place_uncharged_identity_disc(&mut self, at: Coordinate) -> &mut Self {
        self.items.push((at, PendingItem::IdentityDisk { charged: false }));
        self
    }

    pub fn place_force_field_generator(&mut self, at: Coordinate) -> &mut Self {
        self.items.push((at, PendingItem::ForceFieldGenerator));
        self
    }

    /// Place a teleporter leading to the teleporter placed on `destination`.
    pub fn place_teleporter(&mut self, at: Coordinate, destination: Coordinate) -> &mut Self {
        self.items.push((at, PendingItem::Teleporter { destination }));
        self
    }

    /// Starting positions are handed to players in seating order.
    pub fn add_player_starting_position(&mut self, at: Coordinate) -> &mut Self {
        self.starts.push(at);
        self
    }

    /// Validate the layout, seat `players` and start the first turn.
    pub fn build(&self, players: &[Player]) -> Result<ObjectronGame, BoardError> {
        self.build_board(players).map(ObjectronGame::from_board)
    }

    pub fn build_board(&self, players: &[Player]) -> Result<Board, BoardError> {
        if !self.terrain.values().any(|&t| t == Terrain::Square) {
            return Err(BoardError::EmptyBoard);
        }
        self.validate_starts()?;

        let mut grid = Grid::new();
        for (&at, &terrain) in &self.terrain {
            let cell = match terrain {
                Terrain::Square => Cell::square(),
                Terrain::Wall => Cell::wall(),
            };
            grid.insert(at, cell)?;
        }
        grid.link_neighbors();
        if let Some(&first) = self.starts.first()
            && let Some(unreachable) = grid.first_unreachable_square(first)
        {
            return Err(BoardError::Disconnected { unreachable });
        }

        let items = self.place_items(&mut grid)?;
        if players.len() != self.config.player_count {
            return Err(BoardError::PlayerCount {
                expected: self.config.player_count,
                found: players.len(),
            });
        }

        let seated = players
            .iter()
            .zip(&self.starts)
            .map(|(profile, &start)| {
                PlayerState::new(
                    profile.clone(),
                    start,
                    self.config.inventory_capacity,
                    self.config.light_trail_length,
                )
            })
            .collect();
        let database = PlayerDatabase::new(seated, self.config.player_count, 0)?;
        for state in database.iter() {
            let start = state.position();
            grid.cell_mut(start)
                .and_then(|cell| cell.seat_player(state.id()))
                .map_err(|_| BoardError::DuplicateStartingPosition(start))?;
        }

        tracing::info!(
            cells = grid.len(),
            items = self.items.len(),
            players = database.len(),
            "Board built"
        );
        let mut board = Board::new(grid, items, database, self.config.clone());
        board.start();
        Ok(board)
    }

    fn validate_starts(&self) -> Result<(), BoardError> {
        if self.starts.len() != self.config.player_count {
            return Err(BoardError::StartingPositionCount {
                expected: self.config.player_count,
                found: self.starts.len(),
            });
        }
        let mut seen = BTreeSet::new();
        for &at in &self.starts {
            if !seen.insert(at) {
                return Err(BoardError::DuplicateStartingPosition(at));
            }
            match self.terrain.get(&at) {
                Some(Terrain::Square) => {},
                Some(Terrain::Wall) => return Err(BoardError::StartingPositionOnWall(at)),
                None => return Err(BoardError::UnknownCell(at)),
            }
        }
        Ok(())
    }

    fn place_items(&self, grid: &mut Grid) -> Result<ItemStore, BoardError> {
        let mut store = ItemStore::new();
        for (index, &(at, pending)) in self.items.iter().enumerate() {
            let item = match pending {
                PendingItem::LightGrenade => Item::LightGrenade(LightGrenade::new()),
                PendingItem::IdentityDisk { charged } => {
                    Item::IdentityDisk(IdentityDisk::new(charged))
                },
                PendingItem::ForceFieldGenerator => Item::ForceFieldGenerator,
                PendingItem::Teleporter { destination } => {
                    let target = self.teleporter_at(destination).filter(|&t| t != index);
                    let Some(target) = target else {
                        return Err(BoardError::DanglingTeleporter {
                            from: at,
                            to: destination,
                        });
                    };
                    Item::Teleporter(Teleporter::new(Some(item_id(target))))
                },
            };
            let kind = item.kind();
            let id = store.insert(item, Placement::Cell(at));
            grid.cell_mut(at)
                .and_then(|cell| cell.add_item(id, kind))
                .map_err(|reason| BoardError::ItemPlacement { at, reason })?;
        }
        Ok(store)
    }

    /// Index of the first teleporter placed on `at`.
    fn teleporter_at(&self, at: Coordinate) -> Option<usize> {
        self.items
            .iter()
            .position(|&(c, p)| c == at && matches!(p, PendingItem::Teleporter { .. }))
    }
}

/// Id the store hands out to the item placed at `index`.
fn item_id(index: usize) -> ItemId {
    index as ItemId + 1
}
