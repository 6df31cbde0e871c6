use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use objectron_core::game_trait::{ItemId, PlayerId};
use objectron_core::geometry::{Coordinate, Direction};

use crate::cell::Cell;
use crate::error::{BoardError, GameError};

/// Graph node: a cell plus its fixed neighbor links.
///
/// Links are coordinates of other containers owned by the same [`Grid`]. The
/// cell can gain or lose decoration layers without the links changing.
#[derive(Debug, Clone)]
pub struct CellContainer {
    coordinate: Coordinate,
    cell: Cell,
    neighbors: BTreeMap<Direction, Coordinate>,
}

impl CellContainer {
    fn new(coordinate: Coordinate, cell: Cell) -> Self {
        Self {
            coordinate,
            cell,
            neighbors: BTreeMap::new(),
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn cell(&self) -> &Cell {
        &self.cell
    }

    pub fn cell_mut(&mut self) -> &mut Cell {
        &mut self.cell
    }

    pub fn neighbor(&self, direction: Direction) -> Option<Coordinate> {
        self.neighbors.get(&direction).copied()
    }

    pub fn neighbors(&self) -> impl Iterator<Item = (Direction, Coordinate)> + '_ {
        self.neighbors.iter().map(|(&d, &c)| (d, c))
    }
}

/// Mapping from coordinates to cell containers.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    containers: HashMap<Coordinate, CellContainer>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell. Links are created by [`Grid::link_neighbors`].
    pub(crate) fn insert(&mut self, at: Coordinate, cell: Cell) -> Result<(), BoardError> {
        if self.containers.contains_key(&at) {
            return Err(BoardError::DuplicateCell(at));
        }
        self.containers.insert(at, CellContainer::new(at, cell));
        Ok(())
    }

    /// Link every pair of adjacent containers in both directions.
    pub(crate) fn link_neighbors(&mut self) {
        let coordinates: Vec<Coordinate> = self.containers.keys().copied().collect();
        for at in coordinates {
            let links: BTreeMap<Direction, Coordinate> = Direction::ALL
                .into_iter()
                .map(|d| (d, at.step(d)))
                .filter(|(_, n)| self.containers.contains_key(n))
                .collect();
            if let Some(container) = self.containers.get_mut(&at) {
                container.neighbors = links;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    pub fn contains(&self, at: Coordinate) -> bool {
        self.containers.contains_key(&at)
    }

    pub fn container(&self, at: Coordinate) -> Option<&CellContainer> {
        self.containers.get(&at)
    }

    pub fn cell(&self, at: Coordinate) -> Result<&Cell, GameError> {
        self.containers
            .get(&at)
            .map(CellContainer::cell)
            .ok_or_else(|| GameError::invalid(format!("no cell at {at}")))
    }

    pub fn cell_mut(&mut self, at: Coordinate) -> Result<&mut Cell, GameError> {
        self.containers
            .get_mut(&at)
            .map(CellContainer::cell_mut)
            .ok_or_else(|| GameError::invalid(format!("no cell at {at}")))
    }

    pub fn neighbor(&self, at: Coordinate, direction: Direction) -> Option<Coordinate> {
        self.containers.get(&at)?.neighbor(direction)
    }

    pub fn get_player_at(&self, at: Coordinate) -> Option<PlayerId> {
        self.containers.get(&at)?.cell.player()
    }

    pub fn get_items_at(&self, at: Coordinate) -> Vec<ItemId> {
        self.containers
            .get(&at)
            .map(|c| c.cell.items().iter().copied().collect())
            .unwrap_or_default()
    }

    /// Move a player between two cells. Both sides are checked before either
    /// is touched, so a failure leaves both cells unchanged.
    pub fn relocate_player(
        &mut self,
        player: PlayerId,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<(), GameError> {
        self.cell(from)?.check_remove_player(player)?;
        self.cell(to)?.check_add_player(player)?;
        self.cell_mut(from)?.remove_player(player)?;
        self.cell_mut(to)?.add_player(player)
    }

    /// All coordinates in row-major order (by `y`, then `x`).
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut coordinates: Vec<Coordinate> = self.containers.keys().copied().collect();
        coordinates.sort_by_key(|c| (c.y, c.x));
        coordinates
    }

    /// Containers in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &CellContainer> {
        self.coordinates()
            .into_iter()
            .filter_map(|at| self.containers.get(&at))
    }

    /// Non-wall coordinates in row-major order.
    pub fn squares(&self) -> Vec<Coordinate> {
        self.coordinates()
            .into_iter()
            .filter(|&at| self.containers.get(&at).is_some_and(|c| !c.cell.is_wall()))
            .collect()
    }

    /// Smallest rectangle `(min, max)` covering every cell.
    pub fn bounds(&self) -> Option<(Coordinate, Coordinate)> {
        let mut keys = self.containers.keys();
        let first = *keys.next()?;
        Some(keys.fold((first, first), |(lo, hi), c| {
            (
                Coordinate::new(lo.x.min(c.x), lo.y.min(c.y)),
                Coordinate::new(hi.x.max(c.x), hi.y.max(c.y)),
            )
        }))
    }

    /// First square not reachable from `start` through non-wall links.
    pub(crate) fn first_unreachable_square(&self, start: Coordinate) -> Option<Coordinate> {
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(at) = queue.pop_front() {
            let Some(container) = self.containers.get(&at) else {
                continue;
            };
            for (_, next) in container.neighbors() {
                let walkable = self.containers.get(&next).is_some_and(|c| !c.cell.is_wall());
                if walkable && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        self.squares().into_iter().find(|at| !seen.contains(at))
    }
}
