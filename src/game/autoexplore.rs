//! # Autoexplore Module
//!
//! Automatic play for the headless host and for soak tests: descend to the
//! deepest level, pick up what lies underfoot, eat when hungry, and climb
//! back out once the ring is in hand.

use crate::config;
use crate::game::{Action, Command, Direction, Entity, EntityId, GameState, Position, TileType};
use crate::{DelveError, DelveResult};
use pathfinding::prelude::astar;

/// Satiation below which a held fruit gets eaten.
const HUNGER_THRESHOLD: f64 = 0.5;

/// Autoexplore state and functionality.
#[derive(Debug, Clone, Default)]
pub struct AutoexploreState {
    /// Whether autoexplore is currently enabled
    pub enabled: bool,
    /// Where the last planned path led
    pub target: Option<Position>,
}

impl AutoexploreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles autoexplore on/off.
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.target = None;
        }
        self.enabled
    }

    /// Gets the next user command, or `None` when disabled or the game is
    /// over.
    ///
    /// When nothing sensible can be done (no path to the goal, for
    /// instance while a creature blocks a corridor) the user stays.
    pub fn next_command(&mut self, state: &GameState) -> DelveResult<Option<Command>> {
        if !self.enabled || state.is_terminal() {
            return Ok(None);
        }

        let user = state
            .user()
            .ok_or_else(|| DelveError::InvalidState("No user found".to_string()))?;
        let level = state.current_level()?;
        let position = user.position;
        let ring_id = EntityId::new(config::WINNING_RING_ID);
        let has_ring = user.inventory.contains(&ring_id);

        if let Some(fruit) = user.inventory.items().iter().find(|id| {
            state
                .entity(id)
                .is_some_and(|item| matches!(item.as_ref(), Entity::Fruit(_)))
        }) {
            if user.satiation < HUNGER_THRESHOLD {
                return Ok(Some(Command::user(Action::UseItem {
                    item_id: fruit.clone(),
                })));
            }
        }

        if !user.inventory.is_full() {
            if let Some(item) = state
                .entities_at(level.id, position)
                .into_iter()
                .find(|entity| entity.is_item())
            {
                return Ok(Some(Command::user(Action::PickUpItem {
                    item_id: item.id().clone(),
                })));
            }
        }

        let ring_here = state
            .entity(&ring_id)
            .filter(|_| state.level_of(&ring_id) == Some(level.id))
            .map(|ring| ring.position());
        let tile = level.map.tile_type(position);
        if has_ring && tile == Some(TileType::Upstairs) {
            return Ok(Some(Command::user(Action::GoUpstairs)));
        }
        if !has_ring && ring_here.is_none() && tile == Some(TileType::Downstairs) {
            return Ok(Some(Command::user(Action::GoDownstairs)));
        }

        let goal = match ring_here {
            _ if has_ring => level.upstairs,
            Some(ring) => ring,
            None => level.downstairs,
        };
        self.target = Some(goal);

        let step = self
            .find_path(state, position, goal)?
            .and_then(|path| path.get(1).copied())
            .and_then(|next| Direction::from_delta(next - position));
        Ok(Some(Command::user(match step {
            Some(direction) => Action::Move { direction },
            None => Action::Stay,
        })))
    }

    /// Uses A* pathfinding to find a path between two positions on the
    /// user's level, avoiding walls and creatures. The path includes both
    /// endpoints.
    pub fn find_path(
        &self,
        state: &GameState,
        start: Position,
        goal: Position,
    ) -> DelveResult<Option<Vec<Position>>> {
        let level = state.current_level()?;
        let passable = |pos: Position| {
            !level.map.is_obstructed(pos)
                && (pos == goal
                    || state
                        .entities_at(level.id, pos)
                        .iter()
                        .all(|entity| entity.is_item()))
        };

        let path = astar(
            &start,
            |&pos| {
                pos.adjacent_positions()
                    .into_iter()
                    .filter(|&next| passable(next))
                    .map(|next| (next, 1u32))
                    .collect::<Vec<_>>()
            },
            |&pos| chebyshev(pos, goal),
            |&pos| pos == goal,
        );
        Ok(path.map(|(path, _cost)| path))
    }
}

fn chebyshev(a: Position, b: Position) -> u32 {
    (a.x - b.x).unsigned_abs().max((a.y - b.y).unsigned_abs())
}
