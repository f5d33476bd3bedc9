//! # World Population
//!
//! Builds the starting [`GameState`]: every level of the cave, the user on
//! the surface upstairs, wandering mercuries, fruit trees, loose fruit, and
//! the ring waiting on the deepest level.

use crate::config;
use crate::game::{
    Entity, EntityId, GameState, Level, Npc, Position, Prop, TurnOrder, UserCharacter,
};
use crate::generation::{CaveGenerator, GenerationConfig, Generator};
use crate::{DelveError, DelveResult};
use log::{debug, info};
use rand::{rngs::StdRng, Rng};
use std::collections::HashSet;
use std::sync::Arc;

/// Generates all levels, places every entity and opens the user's eyes.
///
/// Level *n + 1* starts its upstairs where level *n* put its downstairs, so
/// taking the stairs never moves an entity sideways.
pub fn build_initial_state(
    config: &GenerationConfig,
    rng: &mut StdRng,
) -> DelveResult<Arc<GameState>> {
    config.validate()?;

    let mut levels: Vec<Level> = Vec::with_capacity(config.level_count);
    for index in 0..config.level_count {
        let level_id = index as u32;
        let generator = match levels.last() {
            Some(above) => CaveGenerator::below(level_id, above.downstairs),
            None => CaveGenerator::new(level_id),
        };
        debug!("generating level {level_id} with {}", generator.generator_type());
        levels.push(generator.generate(config, rng)?);
    }

    let mut entities: Vec<Entity> = Vec::new();
    let mut actors = vec![EntityId::user()];
    let deepest = levels.len() - 1;

    for (depth, level) in levels.iter_mut().enumerate() {
        let mut placer = Placer::new(level, config.max_placement_attempts);

        if depth == 0 {
            let start = level.upstairs;
            placer.claim(start);
            entities.push(UserCharacter::new("Adventurer".to_string(), start).into());
            level.add_entity(EntityId::user());

            let axe = Prop::new(EntityId::random(rng), placer.spot(level, rng)?);
            let house = Prop::new(EntityId::random(rng), placer.spot(level, rng)?);
            place(level, &mut entities, Entity::Axe(axe));
            place(level, &mut entities, Entity::House(house));
        }

        for _ in 0..config.npcs_per_level {
            let npc = Npc::mercury(EntityId::random(rng), placer.spot(level, rng)?);
            actors.push(npc.id.clone());
            place(level, &mut entities, npc.into());
        }
        for _ in 0..config.trees_per_level {
            let tree = Prop::new(EntityId::random(rng), placer.spot(level, rng)?);
            actors.push(tree.id.clone());
            place(level, &mut entities, Entity::Tree(tree));
        }
        for _ in 0..config.fruit_per_level {
            let fruit = Prop::new(EntityId::random(rng), placer.spot(level, rng)?);
            place(level, &mut entities, Entity::Fruit(fruit));
        }

        if depth == deepest {
            let ring = Prop::new(
                EntityId::new(config::WINNING_RING_ID),
                placer.spot(level, rng)?,
            );
            place(level, &mut entities, Entity::Ring(ring));
        }
    }

    if let Some(surface) = levels.first_mut() {
        let start = surface.upstairs;
        Arc::make_mut(&mut surface.map).grant_vision(start, config::VISION_RADIUS);
    }

    let level_order = levels.iter().map(|level| level.id).collect();
    let state = GameState::new(entities, levels, level_order, TurnOrder::new(actors))?;
    info!(
        "built {} levels holding {} entities from seed {}",
        state.levels.len(),
        state.entities.len(),
        config.seed
    );
    Ok(Arc::new(state))
}

fn place(level: &mut Level, entities: &mut Vec<Entity>, entity: Entity) {
    level.add_entity(entity.id().clone());
    entities.push(entity);
}

/// Hands out distinct spawnable cells of one level.
struct Placer {
    taken: HashSet<Position>,
    attempts: u32,
}

impl Placer {
    fn new(level: &Level, attempts: u32) -> Self {
        Self {
            taken: HashSet::from([level.upstairs, level.downstairs]),
            attempts,
        }
    }

    fn claim(&mut self, pos: Position) {
        self.taken.insert(pos);
    }

    fn spot(&mut self, level: &Level, rng: &mut StdRng) -> DelveResult<Position> {
        let map = &level.map;
        for _ in 0..self.attempts {
            let pos = Position::new(
                rng.gen_range(0..map.width() as i32),
                rng.gen_range(0..map.height() as i32),
            );
            let spawnable = map.tile_type(pos).is_some_and(|tile| tile.is_spawnable());
            if spawnable && self.taken.insert(pos) {
                return Ok(pos);
            }
        }
        Err(DelveError::GenerationFailed(format!(
            "level {}: no free spawn spot left",
            level.id
        )))
    }
}
