//! Behavior of the computer-controlled actors.

use crate::config;
use crate::game::{Action, Direction, Entity, EntityId, GameState};
use crate::{DelveError, DelveResult};
use rand::Rng;

/// Chooses the next action of a non-user actor.
///
/// A mercury wanders: it stays or steps in one of the four cardinal
/// directions, all five equally likely. A tree occasionally drops a fruit.
///
/// # Errors
///
/// The user's actions only come from commands, so asking for one is an
/// invariant violation, as is asking for a non-actor.
pub fn decide_next_action<R: Rng + ?Sized>(
    state: &GameState,
    actor_id: &EntityId,
    rng: &mut R,
) -> DelveResult<Action> {
    match state.actor(actor_id)?.as_ref() {
        Entity::Npc(_) => {
            let choice = rng.gen_range(0..=Direction::cardinal().len());
            Ok(match Direction::cardinal().get(choice) {
                Some(&direction) => Action::Move { direction },
                None => Action::Stay,
            })
        }
        Entity::Tree(_) => {
            if rng.gen_bool(config::FRUIT_DROP_CHANCE) {
                Ok(Action::CreateFruit)
            } else {
                Ok(Action::Stay)
            }
        }
        Entity::User(_) => Err(DelveError::InvariantViolation(
            "the user's actions come from commands".to_string(),
        )),
        entity @ (Entity::Ring(_) | Entity::Fruit(_) | Entity::Axe(_) | Entity::House(_)) => {
            Err(DelveError::InvariantViolation(format!(
                "{:?} {actor_id} has no behavior",
                entity.kind()
            )))
        }
    }
}
