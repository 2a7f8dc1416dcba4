//! Active-cell navigation, clamped to the grid.

use ledgergrid_engine::engine::{Address, GridBounds};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

/// The active cell. Moves never leave the grid and never wrap.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Selection {
    current: Address,
    bounds: GridBounds,
}

impl Selection {
    pub fn new(bounds: GridBounds) -> Self {
        Selection {
            current: Address::new(1, 1),
            bounds,
        }
    }

    pub fn current(&self) -> Address {
        self.current
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Jump to `addr`, clamped into the grid.
    pub fn move_to(&mut self, addr: Address) -> Address {
        self.current = self.bounds.clamp(addr);
        self.current
    }

    pub fn move_direction(&mut self, direction: Direction) -> Address {
        let (dr, dc) = direction.delta();
        if let Some(next) = self.current.offset(dr, dc) {
            self.current = self.bounds.clamp(next);
        }
        self.current
    }

    /// Enter commits move down a row.
    pub fn advance_after_commit(&mut self) -> Address {
        self.move_direction(Direction::Down)
    }

    /// Tab commits move right a column.
    pub fn advance_after_tab(&mut self) -> Address {
        self.move_direction(Direction::Right)
    }

    pub fn set_bounds(&mut self, bounds: GridBounds) {
        self.bounds = bounds;
        self.current = bounds.clamp(self.current);
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::new(GridBounds::default())
    }
}
