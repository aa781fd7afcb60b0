use clap::ValueEnum;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// What happens when the head leaves the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum BoundaryPolicy {
    /// Re-enter at the opposite edge.
    #[default]
    Wrap,
    /// Leaving the grid is a wall collision.
    Collide,
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPolicy::Wrap => write!(f, "wrap"),
            BoundaryPolicy::Collide => write!(f, "collide"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: u16,
    pub y: u16,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellDelta {
    pub x: i32,
    pub y: i32,
}

impl From<Direction> for CellDelta {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => CellDelta { x: 0, y: -1 },
            Direction::Down => CellDelta { x: 0, y: 1 },
            Direction::Left => CellDelta { x: -1, y: 0 },
            Direction::Right => CellDelta { x: 1, y: 0 },
        }
    }
}

impl Cell {
    pub fn new(x: u16, y: u16) -> Self {
        Cell { x, y }
    }

    /// Row-major index into a `grid_size * grid_size` array.
    pub fn index(&self, grid_size: u16) -> usize {
        self.y as usize * grid_size as usize + self.x as usize
    }

    pub fn wrapped_add(&self, delta: CellDelta, grid_size: u16) -> Cell {
        let size = grid_size as i32;
        let new_x = (self.x as i32 + delta.x).rem_euclid(size) as u16;
        let new_y = (self.y as i32 + delta.y).rem_euclid(size) as u16;
        Cell { x: new_x, y: new_y }
    }

    /// `None` when the result falls outside the grid.
    pub fn checked_add(&self, delta: CellDelta, grid_size: u16) -> Option<Cell> {
        let size = grid_size as i32;
        let new_x = self.x as i32 + delta.x;
        let new_y = self.y as i32 + delta.y;
        if (0..size).contains(&new_x) && (0..size).contains(&new_y) {
            Some(Cell {
                x: new_x as u16,
                y: new_y as u16,
            })
        } else {
            None
        }
    }

    /// One step in `direction`. `None` means the step hit a wall.
    pub fn step(&self, direction: Direction, grid_size: u16, policy: BoundaryPolicy) -> Option<Cell> {
        match policy {
            BoundaryPolicy::Wrap => Some(self.wrapped_add(direction.into(), grid_size)),
            BoundaryPolicy::Collide => self.checked_add(direction.into(), grid_size),
        }
    }
}

/// Every cell of the grid in row-major order.
pub fn all_cells(grid_size: u16) -> impl Iterator<Item = Cell> {
    (0..grid_size).flat_map(move |y| (0..grid_size).map(move |x| Cell { x, y }))
}
