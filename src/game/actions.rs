//! # Actions Module
//!
//! Command objects and the pure resolver that applies them to a state.
//!
//! [`resolve`] never mutates its input. A rule violation (walking into a
//! wall, using stairs that are not there, picking up an item that is not
//! underfoot) returns the input `Arc` itself, so callers detect success with
//! `Arc::ptr_eq`. Errors are reserved for broken engine invariants.

use crate::config;
use crate::game::{Direction, Entity, EntityId, GameState, Prop, Screen, TileType};
use crate::{DelveError, DelveResult};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything an actor can attempt on its turn.
///
/// Serialized with a kebab-case `type` tag, e.g.
/// `{"type": "move", "direction": "up"}` or
/// `{"type": "pick-up-item", "item_id": "f1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    Move { direction: Direction },
    Stay,
    GoDownstairs,
    GoUpstairs,
    PickUpItem { item_id: EntityId },
    DropItem { item_id: EntityId },
    UseItem { item_id: EntityId },
    CreateFruit,
}

/// An action attributed to the actor performing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub actor: EntityId,
    pub action: Action,
}

impl Command {
    pub fn new(actor: EntityId, action: Action) -> Self {
        Self { actor, action }
    }

    /// A command for the user, the only actor collaborators may drive.
    pub fn user(action: Action) -> Self {
        Self::new(EntityId::user(), action)
    }

    /// Parses a command payload.
    ///
    /// Unknown action types or missing fields are errors, never ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Action, Command, Direction};
    ///
    /// let command = Command::from_json(
    ///     r#"{"actor": "0", "action": {"type": "move", "direction": "left"}}"#,
    /// ).unwrap();
    /// assert_eq!(command.action, Action::Move { direction: Direction::West });
    ///
    /// assert!(Command::from_json(r#"{"actor": "0", "action": {"type": "fly"}}"#).is_err());
    /// ```
    pub fn from_json(payload: &str) -> DelveResult<Self> {
        serde_json::from_str(payload).map_err(DelveError::from)
    }
}

/// Applies one action for one actor.
///
/// Returns the input `Arc` unchanged when the action breaks a game rule, a
/// new state otherwise. `Stay` always yields a new state, which marks the
/// turn as consumed.
pub fn resolve<R: Rng + ?Sized>(
    state: &Arc<GameState>,
    actor_id: &EntityId,
    action: &Action,
    rng: &mut R,
) -> DelveResult<Arc<GameState>> {
    let actor = state.actor(actor_id)?;

    match action {
        Action::Move { direction } => move_actor(state, actor, *direction),
        Action::Stay => Ok(Arc::new(GameState::clone(state))),
        Action::GoDownstairs => use_stairs(state, actor, TileType::Downstairs, 1),
        Action::GoUpstairs => use_stairs(state, actor, TileType::Upstairs, -1),
        Action::PickUpItem { item_id } => pick_up_item(state, actor, item_id),
        Action::DropItem { item_id } => drop_item(state, actor, item_id),
        Action::UseItem { item_id } => use_item(state, actor, item_id),
        Action::CreateFruit => create_fruit(state, actor, rng),
    }
}

/// Moves an entity one level up or down the level order.
///
/// Out-of-range moves do nothing, except that the user leaving the surface
/// level while carrying the winning ring wins the game. Otherwise the
/// entity leaves its level's list, the destination map is cloned with a
/// vision circle granted at the entity's position, and the entity id is put
/// at the front of the destination list.
pub fn change_level(
    state: &Arc<GameState>,
    entity_id: &EntityId,
    delta: i32,
) -> DelveResult<Arc<GameState>> {
    let entity = state.require_entity(entity_id)?;
    let source_id = resting_level(state, entity_id)?;
    let depth = state
        .depth_of(source_id)
        .ok_or_else(|| DelveError::InvalidState(format!("level {source_id} is not ordered")))?;
    let target = depth as i64 + i64::from(delta);

    if target < 0 || target >= state.level_order.len() as i64 {
        if depth == 0 && delta < 0 && carries_winning_ring(entity) {
            info!("{entity_id} left the caves with the ring");
            let mut next = GameState::clone(state);
            next.screen = Screen::UserWon;
            return Ok(Arc::new(next));
        }
        return Ok(Arc::clone(state));
    }

    let destination_id = state.level_order[target as usize];
    let position = entity.position();
    debug!("{entity_id} moves from level {source_id} to level {destination_id}");

    let mut next = GameState::clone(state);
    next.update_level(source_id, |level| {
        level.remove_entity(entity_id);
        Arc::make_mut(&mut level.map).revoke_vision(position, config::VISION_RADIUS);
    });
    next.update_level(destination_id, |level| {
        Arc::make_mut(&mut level.map).grant_vision(position, config::VISION_RADIUS);
        level.add_entity_front(entity_id.clone());
    });
    Ok(Arc::new(next))
}

fn carries_winning_ring(entity: &Entity) -> bool {
    entity.as_user().is_some_and(|user| {
        user.inventory
            .contains(&EntityId::new(config::WINNING_RING_ID))
    })
}

fn resting_level(state: &GameState, entity_id: &EntityId) -> DelveResult<u32> {
    state
        .level_of(entity_id)
        .ok_or_else(|| DelveError::InvalidState(format!("{entity_id} rests on no level")))
}

fn move_actor(
    state: &Arc<GameState>,
    actor: &Entity,
    direction: Direction,
) -> DelveResult<Arc<GameState>> {
    let level_id = resting_level(state, actor.id())?;
    let level = state.level(level_id)?;
    let from = actor.position();
    let to = from + direction.to_delta();

    if level.map.is_obstructed(to) {
        return Ok(Arc::clone(state));
    }
    if state
        .entities_at(level_id, to)
        .iter()
        .any(|entity| !entity.is_item())
    {
        return Ok(Arc::clone(state));
    }

    let mut next = GameState::clone(state);
    let mut moved = actor.clone();
    moved.set_position(to);
    next.put_entity(moved);

    if actor.id().is_user() {
        next.update_level(level_id, |level| {
            Arc::make_mut(&mut level.map).shift_vision(from, to, config::VISION_RADIUS);
        });
    }

    Ok(Arc::new(next))
}

fn use_stairs(
    state: &Arc<GameState>,
    actor: &Entity,
    stairs: TileType,
    delta: i32,
) -> DelveResult<Arc<GameState>> {
    let level = state.level(resting_level(state, actor.id())?)?;
    if level.map.tile_type(actor.position()) != Some(stairs) {
        return Ok(Arc::clone(state));
    }
    change_level(state, actor.id(), delta)
}

fn pick_up_item(
    state: &Arc<GameState>,
    actor: &Entity,
    item_id: &EntityId,
) -> DelveResult<Arc<GameState>> {
    let Some(item) = state.entity(item_id) else {
        return Ok(Arc::clone(state));
    };
    let holds_room = actor.inventory().is_some_and(|inventory| !inventory.is_full());
    if !item.is_item() || !holds_room || item.position() != actor.position() {
        return Ok(Arc::clone(state));
    }

    let level_id = resting_level(state, actor.id())?;
    if state.level_of(item_id) != Some(level_id) {
        return Ok(Arc::clone(state));
    }

    let mut next = GameState::clone(state);
    let mut holder = actor.clone();
    if let Some(inventory) = holder.inventory_mut() {
        inventory.add(item_id.clone());
    }
    next.put_entity(holder);
    next.update_level(level_id, |level| level.remove_entity(item_id));
    Ok(Arc::new(next))
}

fn drop_item(
    state: &Arc<GameState>,
    actor: &Entity,
    item_id: &EntityId,
) -> DelveResult<Arc<GameState>> {
    if !actor
        .inventory()
        .is_some_and(|inventory| inventory.contains(item_id))
    {
        return Ok(Arc::clone(state));
    }

    let level_id = resting_level(state, actor.id())?;
    let mut item = Entity::clone(state.require_entity(item_id)?);
    item.set_position(actor.position());

    let mut holder = actor.clone();
    if let Some(inventory) = holder.inventory_mut() {
        inventory.remove(item_id);
    }

    let mut next = GameState::clone(state);
    next.put_entity(holder);
    next.put_entity(item);
    next.update_level(level_id, |level| level.add_entity(item_id.clone()));
    Ok(Arc::new(next))
}

fn use_item(
    state: &Arc<GameState>,
    actor: &Entity,
    item_id: &EntityId,
) -> DelveResult<Arc<GameState>> {
    let is_fruit = state
        .entity(item_id)
        .is_some_and(|item| matches!(item.as_ref(), Entity::Fruit(_)));
    let is_held = actor
        .inventory()
        .is_some_and(|inventory| inventory.contains(item_id));
    if !is_fruit || !is_held {
        return Ok(Arc::clone(state));
    }

    let mut eater = actor.clone();
    if let Some(inventory) = eater.inventory_mut() {
        inventory.remove(item_id);
    }
    if let Some(user) = eater.as_user_mut() {
        user.satiation = 1.0;
    }

    let mut next = GameState::clone(state);
    next.delete_entity(item_id);
    next.put_entity(eater);
    Ok(Arc::new(next))
}

fn create_fruit<R: Rng + ?Sized>(
    state: &Arc<GameState>,
    actor: &Entity,
    rng: &mut R,
) -> DelveResult<Arc<GameState>> {
    let level_id = resting_level(state, actor.id())?;
    let level = state.level(level_id)?;
    let spots: Vec<_> = actor
        .position()
        .diagonal_positions()
        .into_iter()
        .filter(|&pos| !level.map.is_obstructed(pos))
        .collect();
    if spots.is_empty() {
        return Ok(Arc::clone(state));
    }

    let spot = spots[rng.gen_range(0..spots.len())];
    let fruit_id = EntityId::random(rng);
    debug!("{} drops fruit {fruit_id} at {spot:?}", actor.id());

    let mut next = GameState::clone(state);
    next.put_entity(Entity::Fruit(Prop::new(fruit_id.clone(), spot)));
    next.update_level(level_id, |level| level.add_entity(fruit_id));
    Ok(Arc::new(next))
}
