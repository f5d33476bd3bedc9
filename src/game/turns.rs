//! # Turn Engine
//!
//! Round-robin scheduling and the per-turn lifecycle.
//!
//! The user acts only through [`dispatch`]. A successful user command ends
//! the user's turn: the queue rotates, hunger ticks, and every other actor
//! then acts in queue order until the user is back at the front.

use crate::config;
use crate::game::{decide_next_action, resolve, Command, EntityId, GameState, Screen};
use crate::{DelveError, DelveResult};
use log::{debug, info, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Queue of actor ids; the front actor moves next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnOrder(VecDeque<EntityId>);

impl TurnOrder {
    pub fn new(ids: impl IntoIterator<Item = EntityId>) -> Self {
        Self(ids.into_iter().collect())
    }

    /// The actor whose turn it is.
    pub fn front(&self) -> Option<&EntityId> {
        self.0.front()
    }

    /// Moves the front actor to the back.
    pub fn rotate(&mut self) {
        if let Some(id) = self.0.pop_front() {
            self.0.push_back(id);
        }
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityId> + '_ {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Applies one user command and runs the world until the user's next turn.
///
/// Terminal states and rejected commands return the input `Arc` unchanged.
///
/// # Errors
///
/// Fails with [`DelveError::InvariantViolation`] when the command names an
/// actor other than the user, or when the state breaks an engine invariant
/// while the other actors take their turns.
pub fn dispatch<R: Rng + ?Sized>(
    state: &Arc<GameState>,
    command: &Command,
    rng: &mut R,
) -> DelveResult<Arc<GameState>> {
    if state.is_terminal() {
        return Ok(Arc::clone(state));
    }
    if !command.actor.is_user() {
        return Err(DelveError::InvariantViolation(format!(
            "commands are only accepted for the user, got {}",
            command.actor
        )));
    }

    let ready = if state.turn_order.front() == Some(&command.actor) {
        Arc::clone(state)
    } else {
        advance_actors(Arc::clone(state), rng)?
    };
    if ready.is_terminal() {
        return Ok(ready);
    }

    let next = resolve(&ready, &command.actor, &command.action, rng)?;
    if Arc::ptr_eq(&next, &ready) {
        trace!("rejected {:?}", command.action);
        return Ok(next);
    }
    if next.is_terminal() {
        return Ok(next);
    }

    let next = end_user_turn(&next)?;
    if next.is_terminal() {
        return Ok(next);
    }
    advance_actors(next, rng)
}

/// Rotates the user to the back of the queue and applies hunger.
///
/// Satiation drops by a fixed step and never goes below zero. A starving
/// user loses health every turn, and a user with no health left ends the
/// game.
fn end_user_turn(state: &Arc<GameState>) -> DelveResult<Arc<GameState>> {
    let mut next = GameState::clone(state);
    next.turn_order.rotate();

    let mut user = next.require_entity(&EntityId::user())?.as_ref().clone();
    let died = match user.as_user_mut() {
        Some(character) => {
            character.satiation = (character.satiation - config::SATIATION_DECAY).max(0.0);
            if character.satiation <= 0.0 {
                character.health.damage(config::STARVATION_DAMAGE);
                debug!("starving, health {}", character.health.current);
            }
            character.health.is_depleted()
        }
        None => {
            return Err(DelveError::InvariantViolation(
                "reserved user id is not a user".to_string(),
            ))
        }
    };
    next.put_entity(user);

    if died {
        info!("the user died");
        next.screen = Screen::UserDied;
    }
    Ok(Arc::new(next))
}

/// Lets every non-user actor at the front of the queue act, rotating after
/// each, until the user is at the front again.
pub fn advance_actors<R: Rng + ?Sized>(
    state: Arc<GameState>,
    rng: &mut R,
) -> DelveResult<Arc<GameState>> {
    let user_id = EntityId::user();
    if !state.turn_order.contains(&user_id) {
        return Err(DelveError::InvariantViolation(
            "the user is missing from the turn order".to_string(),
        ));
    }

    let mut state = state;
    while let Some(actor_id) = state.turn_order.front().cloned() {
        if actor_id == user_id || state.is_terminal() {
            break;
        }
        let action = decide_next_action(&state, &actor_id, rng)?;
        trace!("{actor_id} takes {action:?}");
        let acted = resolve(&state, &actor_id, &action, rng)?;

        let mut next = GameState::clone(&acted);
        next.turn_order.rotate();
        state = Arc::new(next);
    }
    Ok(state)
}
