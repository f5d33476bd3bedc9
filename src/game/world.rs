//! # World Module
//!
//! Tile grids, levels and the lazy flood fill used by the generator.
//!
//! A [`Map`] is a fixed-size grid of [`Tile`]s plus a colour palette. Each
//! [`Level`] holds its map behind an `Arc`; code that needs to change tiles
//! clones the map first so earlier game-state snapshots never observe the
//! mutation.

use crate::game::{EntityId, Position};
use crate::utils::for_each_in_rect;
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Identifier of a dungeon level. Level ids are also their depth.
pub type LevelId = u32;

/// The kinds of terrain a grid cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TileType {
    /// Nothing at all; the value of a freshly allocated grid
    Empty,
    /// Solid rock; `color` indexes the owning map's palette
    Wall { color: u8 },
    /// Open ground
    Dirt,
    /// Open ground grown over with grass
    Grass,
    /// Shallow water, walkable
    Water,
    /// Laid floor, used where a corridor bridges water
    PavedFloor,
    /// Stairs to the next depth
    Downstairs,
    /// Stairs to the previous depth
    Upstairs,
    /// Cleared floor around a staircase
    DecorativeSpace,
}

impl TileType {
    /// A freshly formed wall.
    pub const fn wall() -> Self {
        TileType::Wall { color: 0 }
    }

    /// Whether this tile is a wall of any colour.
    pub fn is_wall(self) -> bool {
        matches!(self, TileType::Wall { .. })
    }

    /// Whether this tile is plain open ground.
    pub fn is_dirt(self) -> bool {
        self == TileType::Dirt
    }

    /// Whether entities may be spawned on this tile at world build.
    pub fn is_spawnable(self) -> bool {
        matches!(
            self,
            TileType::Dirt | TileType::Grass | TileType::PavedFloor | TileType::DecorativeSpace
        )
    }
}

/// A single grid cell: terrain plus fog-of-war bits.
///
/// `visible` implies `explored`; the mutators keep it that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub tile_type: TileType,
    explored: bool,
    visible: bool,
}

impl Tile {
    /// Creates an unexplored tile of the given type.
    pub const fn new(tile_type: TileType) -> Self {
        Self {
            tile_type,
            explored: false,
            visible: false,
        }
    }

    /// Whether the tile has ever been seen.
    pub fn is_explored(&self) -> bool {
        self.explored
    }

    /// Whether the tile is currently seen.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Sets the visibility; becoming visible also marks the tile explored.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if visible {
            self.explored = true;
        }
    }
}

/// An RGB colour in a map palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Wall colours from freshly formed rock to the oldest surviving rock.
pub const DEFAULT_PALETTE: [Color; 6] = [
    Color::rgb(0x8a, 0x7f, 0x72),
    Color::rgb(0x7a, 0x6e, 0x61),
    Color::rgb(0x6a, 0x5d, 0x50),
    Color::rgb(0x5a, 0x4d, 0x41),
    Color::rgb(0x4a, 0x3e, 0x33),
    Color::rgb(0x3b, 0x30, 0x27),
];

/// A fixed-size rectangular grid of tiles.
///
/// # Examples
///
/// ```
/// use delve::{Map, Position, TileType};
///
/// let mut map = Map::new(10, 8, TileType::Dirt);
/// map.outline_with_walls(None, None);
///
/// assert!(map.is_obstructed(Position::new(0, 3)));
/// assert!(map.is_obstructed(Position::new(-1, 3))); // out of bounds
/// assert!(!map.is_obstructed(Position::new(4, 4)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    width: u32,
    height: u32,
    tiles: Vec<Vec<Tile>>,
    palette: Vec<Color>,
}

impl Map {
    /// Creates a map filled with `fill` using the default palette.
    pub fn new(width: u32, height: u32, fill: TileType) -> Self {
        Self::with_palette(width, height, fill, DEFAULT_PALETTE.to_vec())
    }

    /// Creates a map filled with `fill` using the given palette.
    pub fn with_palette(width: u32, height: u32, fill: TileType, palette: Vec<Color>) -> Self {
        Self {
            width,
            height,
            tiles: vec![vec![Tile::new(fill); width as usize]; height as usize],
            palette,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    /// Highest palette index a wall can carry.
    pub fn max_wall_color(&self) -> u8 {
        self.palette.len().saturating_sub(1).min(u8::MAX as usize) as u8
    }

    /// Checks if a position lies inside the grid.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Returns the tile at `pos`, or `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        Some(&self.tiles[pos.y as usize][pos.x as usize])
    }

    /// Returns the tile at `pos` mutably, or `None` when out of bounds.
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        Some(&mut self.tiles[pos.y as usize][pos.x as usize])
    }

    /// Returns the terrain at `pos`, or `None` when out of bounds.
    pub fn tile_type(&self, pos: Position) -> Option<TileType> {
        self.get(pos).map(|tile| tile.tile_type)
    }

    /// Replaces the terrain at `pos`, keeping its fog-of-war bits.
    pub fn set(&mut self, pos: Position, tile_type: TileType) -> DelveResult<()> {
        let tile = self
            .get_mut(pos)
            .ok_or(DelveError::InvalidPosition(pos))?;
        tile.tile_type = tile_type;
        Ok(())
    }

    /// Whether `pos` holds a wall. Out-of-bounds cells are not walls.
    pub fn is_wall(&self, pos: Position) -> bool {
        self.tile_type(pos).is_some_and(TileType::is_wall)
    }

    /// True iff `pos` is a wall or lies outside the grid.
    pub fn is_obstructed(&self, pos: Position) -> bool {
        self.tile_type(pos).map_or(true, TileType::is_wall)
    }

    /// Force-sets the border of a rectangle to walls.
    ///
    /// Defaults to the full extent of the map.
    pub fn outline_with_walls(
        &mut self,
        top_left: Option<Position>,
        bottom_right: Option<Position>,
    ) {
        let top_left = top_left.unwrap_or_default();
        let bottom_right = bottom_right.unwrap_or(Position::new(
            self.width as i32 - 1,
            self.height as i32 - 1,
        ));

        for_each_in_rect(top_left, bottom_right, |pos| {
            let on_border = pos.x == top_left.x
                || pos.x == bottom_right.x
                || pos.y == top_left.y
                || pos.y == bottom_right.y;
            if on_border {
                if let Some(tile) = self.get_mut(pos) {
                    tile.tile_type = TileType::wall();
                }
            }
        });
    }

    /// In-bounds von Neumann neighbours of `pos`.
    pub fn neighborhood4(&self, pos: Position) -> Vec<Position> {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(|&p| self.is_valid_position(p))
            .collect()
    }

    /// In-bounds Moore neighbours of `pos`.
    pub fn neighborhood8(&self, pos: Position) -> Vec<Position> {
        pos.adjacent_positions()
            .into_iter()
            .filter(|&p| self.is_valid_position(p))
            .collect()
    }

    /// Counts Moore neighbours that are walls.
    pub fn count_wall_neighbors8(&self, pos: Position) -> usize {
        self.neighborhood8(pos)
            .into_iter()
            .filter(|&p| self.is_wall(p))
            .count()
    }

    /// Counts von Neumann neighbours that are walls.
    pub fn count_wall_neighbors4(&self, pos: Position) -> usize {
        self.neighborhood4(pos)
            .into_iter()
            .filter(|&p| self.is_wall(p))
            .count()
    }

    /// All positions of the grid, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| Position::new(x, y)))
    }

    /// Iterates over every tile of the grid, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter().flat_map(|row| row.iter())
    }

    /// Lazily visits the 4-connected region of cells reachable from `start`
    /// whose tiles satisfy `predicate`.
    ///
    /// The iterator is finite and visits every cell at most once. To start
    /// over, call `flood_fill` again.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Map, Position, TileType};
    ///
    /// let mut map = Map::new(5, 5, TileType::Dirt);
    /// map.outline_with_walls(None, None);
    ///
    /// let region: Vec<_> = map
    ///     .flood_fill(Position::new(2, 2), |tile| tile.tile_type == TileType::Dirt)
    ///     .collect();
    /// assert_eq!(region.len(), 9);
    /// ```
    pub fn flood_fill<F>(&self, start: Position, predicate: F) -> FloodFill<'_, F>
    where
        F: Fn(&Tile) -> bool,
    {
        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        if self.get(start).is_some_and(|tile| predicate(tile)) {
            visited.insert(start);
            queue.push_back(start);
        }
        FloodFill {
            map: self,
            predicate,
            queue,
            visited,
        }
    }
}

/// Breadth-first flood fill over a [`Map`]; see [`Map::flood_fill`].
pub struct FloodFill<'a, F> {
    map: &'a Map,
    predicate: F,
    queue: VecDeque<Position>,
    visited: HashSet<Position>,
}

impl<F> Iterator for FloodFill<'_, F>
where
    F: Fn(&Tile) -> bool,
{
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        let current = self.queue.pop_front()?;
        for neighbor in self.map.neighborhood4(current) {
            if self.visited.contains(&neighbor) {
                continue;
            }
            if self
                .map
                .get(neighbor)
                .is_some_and(|tile| (self.predicate)(tile))
            {
                self.visited.insert(neighbor);
                self.queue.push_back(neighbor);
            }
        }
        Some(current)
    }
}

/// One dungeon floor: a map plus the ids of the entities resting on it.
///
/// The level does not own its entities; ids are resolved through the game
/// state's entity mapping. List order is deterministic iteration order, and
/// the front is the most recent arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub map: Arc<Map>,
    pub entities: Vec<EntityId>,
    pub upstairs: Position,
    pub downstairs: Position,
}

impl Level {
    /// Creates a level with no resident entities.
    pub fn new(id: LevelId, map: Map, upstairs: Position, downstairs: Position) -> Self {
        Self {
            id,
            map: Arc::new(map),
            entities: Vec::new(),
            upstairs,
            downstairs,
        }
    }

    /// Checks whether an entity id rests on this level.
    pub fn contains_entity(&self, entity_id: &EntityId) -> bool {
        self.entities.contains(entity_id)
    }

    /// Appends an entity id to the resident list.
    pub fn add_entity(&mut self, entity_id: EntityId) {
        if !self.contains_entity(&entity_id) {
            self.entities.push(entity_id);
        }
    }

    /// Puts an entity id at the front of the resident list.
    pub fn add_entity_front(&mut self, entity_id: EntityId) {
        self.remove_entity(&entity_id);
        self.entities.insert(0, entity_id);
    }

    /// Removes an entity id from the resident list.
    pub fn remove_entity(&mut self, entity_id: &EntityId) {
        self.entities.retain(|id| id != entity_id);
    }

    /// Whether the two staircases are joined by a 4-connected path of
    /// non-wall cells.
    pub fn stairs_connected(&self) -> bool {
        let map = &self.map;
        pathfinding::prelude::bfs(
            &self.upstairs,
            |&pos| {
                map.neighborhood4(pos)
                    .into_iter()
                    .filter(|&p| !map.is_wall(p))
                    .collect::<Vec<_>>()
            },
            |&pos| pos == self.downstairs,
        )
        .is_some()
    }
}
