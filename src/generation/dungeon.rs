//! # Cave Generation
//!
//! Cellular-automaton cave levels with water, grass and a guaranteed walkable
//! route between the two staircases.
//!
//! The generator runs a fixed pipeline over a fresh [`Map`]:
//! 1. Fill with dirt
//! 2. Carve with a life-like ruleset from the catalog
//! 3. Prune walls that touch no other wall orthogonally
//! 4. Outline the border with walls
//! 5. Flood a pond from a random dirt cell
//! 6. Place and stamp both staircases
//! 7. Carve a winding corridor from the upstairs to the downstairs
//! 8. Grow grass in wall-heavy nooks
//! 9. Re-outline and re-stamp the staircases

use crate::config;
use crate::game::{Level, LevelId, Map, Position, TileType};
use crate::generation::{GenerationConfig, Generator, Ruleset};
use crate::utils::{for_each_in_rect, rasterize_line};
use crate::{DelveError, DelveResult};
use log::debug;
use rand::{rngs::StdRng, Rng};

/// Minimum number of random corridor bends.
const MIN_SEGMENTS: usize = 3;

/// Probability that the corridor gains another bend while its waypoint
/// count is even.
const EXTRA_SEGMENT_CHANCE: f64 = 0.8;

/// Generator for one cave level.
#[derive(Debug, Clone)]
pub struct CaveGenerator {
    /// Id of the generated level
    pub level_id: LevelId,
    /// Where the upstairs must be; a random inset cell when `None`
    pub upstairs: Option<Position>,
}

impl CaveGenerator {
    /// Creates a generator for the surface level.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{CaveGenerator, GenerationConfig, Generator};
    /// use delve::generation::utils::create_rng;
    ///
    /// let config = GenerationConfig::for_testing(3);
    /// let level = CaveGenerator::new(0).generate(&config, &mut create_rng(&config)).unwrap();
    /// assert!(level.stairs_connected());
    /// ```
    pub fn new(level_id: LevelId) -> Self {
        Self {
            level_id,
            upstairs: None,
        }
    }

    /// Creates a generator whose upstairs sits exactly at `upstairs`.
    pub fn below(level_id: LevelId, upstairs: Position) -> Self {
        Self {
            level_id,
            upstairs: Some(upstairs),
        }
    }

    fn carve_cellular_automaton(
        &self,
        map: &mut Map,
        ruleset: &Ruleset,
        rng: &mut StdRng,
    ) -> DelveResult<()> {
        debug!(
            "level {}: carving with {} over {} steps",
            self.level_id, ruleset.name, ruleset.steps
        );
        let positions: Vec<Position> = map.positions().collect();
        for &pos in &positions {
            if rng.gen_bool(ruleset.wall_probability) {
                map.set(pos, TileType::wall())?;
            }
        }

        let oldest = map.max_wall_color();
        for _ in 0..ruleset.steps {
            let previous = map.clone();
            for &pos in &positions {
                let current = previous.tile_type(pos);
                let was_wall = current.is_some_and(TileType::is_wall);
                let next = ruleset.next_is_wall(was_wall, previous.count_wall_neighbors8(pos));
                let tile = match (current, next) {
                    (Some(TileType::Wall { color }), true) => TileType::Wall {
                        color: color.saturating_add(1).min(oldest),
                    },
                    (_, true) => TileType::wall(),
                    (_, false) => TileType::Dirt,
                };
                map.set(pos, tile)?;
            }
        }
        Ok(())
    }

    fn place_water(
        &self,
        map: &mut Map,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<()> {
        let Some(source) = (0..config.max_placement_attempts)
            .map(|_| random_cell(map, 1, rng))
            .find(|&pos| map.tile_type(pos) == Some(TileType::Dirt))
        else {
            debug!("level {}: no dirt for a pond", self.level_id);
            return Ok(());
        };

        let pond: Vec<Position> = map
            .flood_fill(source, |tile| tile.tile_type == TileType::Dirt)
            .take(config::WATER_CELL_CAP)
            .collect();
        debug!("level {}: {} water cells", self.level_id, pond.len());
        for pos in pond {
            map.set(pos, TileType::Water)?;
        }
        Ok(())
    }

    fn place_downstairs(
        &self,
        map: &Map,
        upstairs: Position,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<Position> {
        (0..config.max_placement_attempts)
            .map(|_| random_cell(map, config::STAIRS_INSET, rng))
            .find(|pos| (pos.x - upstairs.x).abs() > 2 || (pos.y - upstairs.y).abs() > 2)
            .ok_or_else(|| {
                DelveError::GenerationFailed(format!(
                    "level {}: no downstairs spot away from {upstairs:?}",
                    self.level_id
                ))
            })
    }

    /// Builds the corridor polyline: alternating x/y bends from the
    /// upstairs, then a waypoint level with the downstairs, then the
    /// downstairs itself.
    ///
    /// Past the minimum, another bend is added with probability 0.8 while
    /// the polyline holds an even number of points.
    fn plan_corridor(
        &self,
        map: &Map,
        upstairs: Position,
        downstairs: Position,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<Vec<Position>> {
        let mut waypoints = vec![upstairs];
        let mut segments = 0;
        while segments < MIN_SEGMENTS
            || (waypoints.len() % 2 == 0 && rng.gen_bool(EXTRA_SEGMENT_CHANCE))
        {
            let previous = waypoints[waypoints.len() - 1];
            let vary_x = segments % 2 == 0;
            let next = (0..config.max_placement_attempts)
                .map(|_| {
                    let sample = random_cell(map, 1, rng);
                    if vary_x {
                        Position::new(sample.x, previous.y)
                    } else {
                        Position::new(previous.x, sample.y)
                    }
                })
                .find(|pos| (pos.x - previous.x).abs() >= 2 || (pos.y - previous.y).abs() >= 2)
                .ok_or_else(|| {
                    DelveError::GenerationFailed(format!(
                        "level {}: no corridor waypoint after {previous:?}",
                        self.level_id
                    ))
                })?;
            waypoints.push(next);
            segments += 1;
        }

        let last = waypoints[waypoints.len() - 1];
        waypoints.push(Position::new(last.x, downstairs.y));
        waypoints.push(downstairs);
        debug!("level {}: {} corridor waypoints", self.level_id, waypoints.len());
        Ok(waypoints)
    }

    fn carve_corridor(&self, map: &mut Map, waypoints: &[Position]) -> DelveResult<()> {
        for pair in waypoints.windows(2) {
            for pos in rasterize_line(pair[0], pair[1]) {
                let blocked = match map.tile_type(pos) {
                    Some(tile) => tile.is_wall() || tile == TileType::Water,
                    None => false,
                };
                if blocked {
                    map.set(pos, corridor_floor(map, pos))?;
                }
            }
        }
        Ok(())
    }

    fn place_grass(&self, map: &mut Map) -> DelveResult<()> {
        let seeds: Vec<Position> = map
            .positions()
            .filter(|&pos| {
                map.tile_type(pos) == Some(TileType::Dirt)
                    && map.count_wall_neighbors8(pos) >= config::GRASS_SEED_WALL_COUNT
            })
            .collect();

        for seed in seeds {
            let patch: Vec<Position> = map
                .flood_fill(seed, |tile| tile.tile_type == TileType::Dirt)
                .take(config::GRASS_CLUSTER_SIZE)
                .collect();
            for pos in patch {
                map.set(pos, TileType::Grass)?;
            }
        }
        Ok(())
    }
}

/// Turns every wall with no orthogonal wall neighbour into dirt.
///
/// Such walls only touch other walls diagonally (or nothing at all) and read
/// as clutter. The sweep is computed from one snapshot, so removing a wall
/// never exposes another one in the same pass.
pub fn remove_diagonal_only_walls(map: &mut Map) {
    let lonely: Vec<Position> = map
        .positions()
        .filter(|&pos| map.is_wall(pos) && map.count_wall_neighbors4(pos) == 0)
        .collect();
    for pos in lonely {
        if let Some(tile) = map.get_mut(pos) {
            tile.tile_type = TileType::Dirt;
        }
    }
}

/// Clears the 3x3 area around `center` and puts the staircase in the middle.
pub fn stamp_stairs(map: &mut Map, center: Position, stairs: TileType) {
    let offset = Position::new(1, 1);
    for_each_in_rect(center - offset, center + offset, |pos| {
        if let Some(tile) = map.get_mut(pos) {
            tile.tile_type = TileType::DecorativeSpace;
        }
    });
    if let Some(tile) = map.get_mut(center) {
        tile.tile_type = stairs;
    }
}

/// Paved floor where water dominates the orthogonal neighbourhood, dirt
/// elsewhere.
fn corridor_floor(map: &Map, pos: Position) -> TileType {
    let neighbors = map.neighborhood4(pos);
    let water = neighbors
        .iter()
        .filter(|&&p| map.tile_type(p) == Some(TileType::Water))
        .count();
    if water * 2 > neighbors.len() {
        TileType::PavedFloor
    } else {
        TileType::Dirt
    }
}

/// Uniform cell at least `inset` away from every border.
fn random_cell(map: &Map, inset: i32, rng: &mut StdRng) -> Position {
    let max_x = (map.width() as i32 - inset).max(inset + 1);
    let max_y = (map.height() as i32 - inset).max(inset + 1);
    Position::new(rng.gen_range(inset..max_x), rng.gen_range(inset..max_y))
}

impl Generator<Level> for CaveGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<Level> {
        config.validate()?;
        let mut map = Map::new(config.width, config.height, TileType::Dirt);

        let ruleset = match config.ruleset {
            Some(name) => Ruleset::by_name(name),
            None => Ruleset::random(rng),
        };
        self.carve_cellular_automaton(&mut map, ruleset, rng)?;
        remove_diagonal_only_walls(&mut map);
        map.outline_with_walls(None, None);
        self.place_water(&mut map, config, rng)?;

        let upstairs = match self.upstairs {
            Some(pos) => pos,
            None => random_cell(&map, config::STAIRS_INSET, rng),
        };
        if !map.is_valid_position(upstairs) {
            return Err(DelveError::GenerationFailed(format!(
                "level {}: upstairs {upstairs:?} lies outside the map",
                self.level_id
            )));
        }
        let downstairs = self.place_downstairs(&map, upstairs, config, rng)?;
        stamp_stairs(&mut map, downstairs, TileType::Downstairs);
        stamp_stairs(&mut map, upstairs, TileType::Upstairs);

        let waypoints = self.plan_corridor(&map, upstairs, downstairs, config, rng)?;
        self.carve_corridor(&mut map, &waypoints)?;
        self.place_grass(&mut map)?;

        map.outline_with_walls(None, None);
        map.set(downstairs, TileType::Downstairs)?;
        map.set(upstairs, TileType::Upstairs)?;

        let level = Level::new(self.level_id, map, upstairs, downstairs);
        self.validate(&level, config)?;
        Ok(level)
    }

    fn validate(&self, level: &Level, config: &GenerationConfig) -> DelveResult<()> {
        let map = &level.map;
        if map.width() != config.width || map.height() != config.height {
            return Err(DelveError::GenerationFailed(format!(
                "level {} has size {}x{}",
                level.id,
                map.width(),
                map.height()
            )));
        }
        let open_border = map.positions().find(|pos| {
            let on_border = pos.x == 0
                || pos.y == 0
                || pos.x == map.width() as i32 - 1
                || pos.y == map.height() as i32 - 1;
            on_border && !map.is_wall(*pos)
        });
        if let Some(pos) = open_border {
            return Err(DelveError::GenerationFailed(format!(
                "level {} has an open border at {pos:?}",
                level.id
            )));
        }
        if !level.stairs_connected() {
            return Err(DelveError::GenerationFailed(format!(
                "level {}: staircases are not connected",
                level.id
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "CaveGenerator"
    }
}
