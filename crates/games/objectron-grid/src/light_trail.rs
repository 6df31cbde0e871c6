use std::collections::VecDeque;

use objectron_core::geometry::Coordinate;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// The cells a player left most recently, oldest first. Every tracked cell
/// carries the light-trail flag; evicted cells lose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightTrail {
    cells: VecDeque<Coordinate>,
    capacity: usize,
}

impl LightTrail {
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Track `cell`, evicting the oldest cell first when full.
    pub fn extend(&mut self, cell: Coordinate, grid: &mut Grid) {
        if self.capacity == 0 {
            return;
        }
        while self.cells.len() >= self.capacity {
            self.fade(grid);
        }
        if let Ok(target) = grid.cell_mut(cell) {
            target.place_light_trail();
        }
        self.cells.push_back(cell);
    }

    /// Drop the oldest cell without adding one.
    pub fn fade(&mut self, grid: &mut Grid) {
        if let Some(oldest) = self.cells.pop_front()
            && let Ok(cell) = grid.cell_mut(oldest)
        {
            cell.clear_light_trail();
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.cells.iter().copied()
    }

    pub fn contains(&self, cell: Coordinate) -> bool {
        self.cells.contains(&cell)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
