//! # Game Module
//!
//! Core game state, world representation, entities and the turn engine.
//!
//! This module contains the fundamental building blocks of Delve:
//! - Tile grids, levels and fog of war
//! - The closed set of entity variants and their capabilities
//! - Action resolution and round-robin turn scheduling
//! - The immutable [`GameState`] aggregate and its snapshots

pub mod actions;
pub mod autoexplore;
pub mod entities;
pub mod policy;
pub mod session;
pub mod state;
pub mod turns;
pub mod visibility;
pub mod world;

pub use actions::*;
pub use autoexplore::*;
pub use entities::*;
pub use policy::*;
pub use session::*;
pub use state::*;
pub use turns::*;
pub use world::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate on a level's grid.
///
/// # Examples
///
/// ```
/// use delve::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.adjacent_positions();
/// assert_eq!(adjacent.len(), 8); // All 8 surrounding positions
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Squared Euclidean distance, exact in integer arithmetic.
    pub fn distance_squared(self, other: Position) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Returns all 8 adjacent positions (including diagonals).
    pub fn adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x - 1, self.y - 1), // NW
            Position::new(self.x, self.y - 1),     // N
            Position::new(self.x + 1, self.y - 1), // NE
            Position::new(self.x - 1, self.y),     // W
            Position::new(self.x + 1, self.y),     // E
            Position::new(self.x - 1, self.y + 1), // SW
            Position::new(self.x, self.y + 1),     // S
            Position::new(self.x + 1, self.y + 1), // SE
        ]
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }

    /// Returns the 4 diagonal positions.
    pub fn diagonal_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x - 1, self.y - 1),
            Position::new(self.x + 1, self.y - 1),
            Position::new(self.x - 1, self.y + 1),
            Position::new(self.x + 1, self.y + 1),
        ]
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Directions for movement.
///
/// Commands coming from collaborators use screen terms, so `up`, `down`,
/// `left` and `right` are accepted as aliases of the compass names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "up")]
    North,
    #[serde(alias = "down")]
    South,
    #[serde(alias = "right")]
    East,
    #[serde(alias = "left")]
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Direction {
    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
            Direction::Northeast => Position::new(1, -1),
            Direction::Northwest => Position::new(-1, -1),
            Direction::Southeast => Position::new(1, 1),
            Direction::Southwest => Position::new(-1, 1),
        }
    }

    /// Converts a position delta to a direction.
    ///
    /// Returns None if the delta doesn't correspond to a valid direction.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (1, -1) => Some(Direction::Northeast),
            (-1, -1) => Some(Direction::Northwest),
            (1, 1) => Some(Direction::Southeast),
            (-1, 1) => Some(Direction::Southwest),
            _ => None,
        }
    }

    /// Returns only the 4 cardinal directions, in up/down/left/right order.
    pub const fn cardinal() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_manhattan_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.manhattan_distance(pos2), 7);
        assert_eq!(pos1.distance_squared(pos2), 25);
    }

    #[test]
    fn test_position_adjacent() {
        let pos = Position::new(5, 5);
        let adjacent = pos.adjacent_positions();
        assert_eq!(adjacent.len(), 8);
        assert!(adjacent.contains(&Position::new(4, 4)));
        assert!(adjacent.contains(&Position::new(6, 6)));
        assert!(!adjacent.contains(&pos));
    }

    #[test]
    fn test_position_cardinal_and_diagonal() {
        let pos = Position::new(5, 5);
        let cardinal = pos.cardinal_adjacent_positions();
        let diagonal = pos.diagonal_positions();
        assert_eq!(cardinal.len(), 4);
        assert_eq!(diagonal.len(), 4);
        assert!(cardinal.contains(&Position::new(5, 4)));
        assert!(!cardinal.contains(&Position::new(4, 4)));
        assert!(diagonal.iter().all(|p| !cardinal.contains(p)));
    }

    #[test]
    fn test_position_arithmetic() {
        let pos1 = Position::new(5, 10);
        let pos2 = Position::new(3, 2);
        assert_eq!(pos1 + pos2, Position::new(8, 12));
        assert_eq!(pos1 - pos2, Position::new(2, 8));
    }

    #[test]
    fn test_direction_round_trip_delta() {
        for direction in Direction::cardinal() {
            assert_eq!(Direction::from_delta(direction.to_delta()), Some(direction));
        }
        assert_eq!(Direction::from_delta(Position::new(2, 0)), None);
    }

    #[test]
    fn test_direction_screen_aliases() {
        let up: Direction = serde_json::from_str("\"up\"").unwrap();
        let left: Direction = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(up, Direction::North);
        assert_eq!(left, Direction::West);
    }
}
