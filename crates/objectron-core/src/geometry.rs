use std::fmt;

use serde::{Deserialize, Serialize};

/// Compass direction on the board. `North` points toward decreasing `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All directions, clockwise starting at `North`.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Unit offset `(dx, dy)` of one step in this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NorthEast | Direction::SouthEast | Direction::SouthWest | Direction::NorthWest
        )
    }

    /// Next direction in clockwise order (45 degrees).
    pub fn clockwise(self) -> Direction {
        let index = Direction::ALL
            .iter()
            .position(|&d| d == self)
            .unwrap_or_default();
        Direction::ALL[(index + 1) % Direction::ALL.len()]
    }

    /// The two orthogonal components of a diagonal direction, `None` for
    /// orthogonal directions.
    pub const fn components(self) -> Option<(Direction, Direction)> {
        match self {
            Direction::NorthEast => Some((Direction::North, Direction::East)),
            Direction::SouthEast => Some((Direction::South, Direction::East)),
            Direction::SouthWest => Some((Direction::South, Direction::West)),
            Direction::NorthWest => Some((Direction::North, Direction::West)),
            _ => None,
        }
    }
}

/// Immutable position of a cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate one step away in `direction`.
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Number of king moves between two coordinates.
    pub fn chebyshev_distance(self, other: Coordinate) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }

    /// Direction of the straight line (orthogonal or diagonal) leading from
    /// `self` to `other`, or `None` if the two are not aligned or equal.
    pub fn direction_to(self, other: Coordinate) -> Option<Direction> {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        if (dx, dy) == (0, 0) || (dx != 0 && dy != 0 && dx.abs() != dy.abs()) {
            return None;
        }
        let unit = (dx.signum(), dy.signum());
        Direction::ALL.into_iter().find(|d| d.offset() == unit)
    }

    /// Cells strictly between `self` and `other` on their straight line.
    /// Empty when the two are not aligned.
    pub fn cells_between(self, other: Coordinate) -> Vec<Coordinate> {
        let Some(direction) = self.direction_to(other) else {
            return Vec::new();
        };
        let mut cells = Vec::new();
        let mut cursor = self.step(direction);
        while cursor != other {
            cells.push(cursor);
            cursor = cursor.step(direction);
        }
        cells
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
