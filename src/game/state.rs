//! # Game State Module
//!
//! The immutable aggregate every transition works on.
//!
//! A [`GameState`] is only ever handed out behind an `Arc`. Transitions
//! either return that same `Arc` (nothing happened) or build a new state in
//! which only the changed entries were replaced: the entity and level
//! mappings are `Arc`-shared maps of `Arc`-shared values, so copying a state
//! copies pointers, and `Arc::make_mut` copies a mapping only when a
//! previous snapshot still holds it.

use crate::game::{Entity, EntityId, Level, LevelId, Position, TurnOrder, UserCharacter};
use crate::{DelveError, DelveResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Coarse game phase. Both non-`Play` screens are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Screen {
    Play,
    UserDied,
    UserWon,
}

impl Screen {
    pub fn is_terminal(self) -> bool {
        self != Screen::Play
    }
}

/// Entity id → entity, shared per entry.
pub type EntityMap = BTreeMap<EntityId, Arc<Entity>>;

/// Level id → level, shared per entry.
pub type LevelMap = BTreeMap<LevelId, Arc<Level>>;

/// Root aggregate of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// All entities in the game, indexed by ID
    pub entities: Arc<EntityMap>,
    /// All levels, indexed by ID
    pub levels: Arc<LevelMap>,
    /// Level ids from the surface down
    pub level_order: Arc<Vec<LevelId>>,
    /// Round-robin actor queue
    pub turn_order: TurnOrder,
    /// Current game phase
    pub screen: Screen,
}

/// Read-only view of a state for rendering collaborators.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub entities: Arc<EntityMap>,
    pub levels: Arc<LevelMap>,
    pub level_order: Arc<Vec<LevelId>>,
    pub turn_order: TurnOrder,
    pub screen: Screen,
}

impl Snapshot {
    /// Serializes the view as JSON.
    pub fn to_json(&self) -> DelveResult<String> {
        serde_json::to_string(self).map_err(DelveError::from)
    }
}

impl GameState {
    /// Assembles a state from its parts and checks its invariants.
    ///
    /// Levels are ordered by `level_order`; every id there must have a level.
    pub fn new(
        entities: Vec<Entity>,
        levels: Vec<Level>,
        level_order: Vec<LevelId>,
        turn_order: TurnOrder,
    ) -> DelveResult<Self> {
        let state = Self {
            entities: Arc::new(
                entities
                    .into_iter()
                    .map(|entity| (entity.id().clone(), Arc::new(entity)))
                    .collect(),
            ),
            levels: Arc::new(
                levels
                    .into_iter()
                    .map(|level| (level.id, Arc::new(level)))
                    .collect(),
            ),
            level_order: Arc::new(level_order),
            turn_order,
            screen: Screen::Play,
        };
        state.validate()?;
        Ok(state)
    }

    /// Checks the structural invariants of the aggregate.
    ///
    /// - id `"0"` exists and is the user, and no other entity is a user
    /// - every turn-order id resolves to an actor
    /// - every level in the order exists and lists only known entities
    pub fn validate(&self) -> DelveResult<()> {
        match self.entities.get(&EntityId::user()).map(|e| e.as_ref()) {
            Some(Entity::User(_)) => {}
            Some(other) => {
                return Err(DelveError::InvariantViolation(format!(
                    "reserved user id is held by a {:?}",
                    other.kind()
                )))
            }
            None => {
                return Err(DelveError::InvariantViolation(
                    "no user entity".to_string(),
                ))
            }
        }

        if let Some((id, _)) = self
            .entities
            .iter()
            .find(|(id, entity)| !id.is_user() && entity.as_user().is_some())
        {
            return Err(DelveError::InvariantViolation(format!(
                "entity {id} is a second user"
            )));
        }

        for id in self.turn_order.iter() {
            self.actor(id)?;
        }

        for level_id in self.level_order.iter() {
            let level = self.level(*level_id)?;
            if let Some(missing) = level
                .entities
                .iter()
                .find(|id| !self.entities.contains_key(*id))
            {
                return Err(DelveError::InvariantViolation(format!(
                    "level {level_id} lists unknown entity {missing}"
                )));
            }
        }

        Ok(())
    }

    /// Returns a read-only view that shares all data with this state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entities: Arc::clone(&self.entities),
            levels: Arc::clone(&self.levels),
            level_order: Arc::clone(&self.level_order),
            turn_order: self.turn_order.clone(),
            screen: self.screen,
        }
    }

    /// Gets an entity by id.
    pub fn entity(&self, entity_id: &EntityId) -> Option<&Arc<Entity>> {
        self.entities.get(entity_id)
    }

    /// Gets an entity that must exist.
    pub fn require_entity(&self, entity_id: &EntityId) -> DelveResult<&Arc<Entity>> {
        self.entity(entity_id)
            .ok_or_else(|| DelveError::InvalidState(format!("unknown entity {entity_id}")))
    }

    /// Gets an entity that must exist and must be an actor.
    pub fn actor(&self, entity_id: &EntityId) -> DelveResult<&Arc<Entity>> {
        let entity = self.entity(entity_id).ok_or_else(|| {
            DelveError::InvariantViolation(format!("turn order references unknown id {entity_id}"))
        })?;
        if !entity.is_actor() {
            return Err(DelveError::InvariantViolation(format!(
                "turn order references non-actor {entity_id} ({:?})",
                entity.kind()
            )));
        }
        Ok(entity)
    }

    /// Gets the user character.
    pub fn user(&self) -> Option<&UserCharacter> {
        self.entity(&EntityId::user()).and_then(|e| e.as_user())
    }

    /// Gets a level that must exist.
    pub fn level(&self, level_id: LevelId) -> DelveResult<&Arc<Level>> {
        self.levels
            .get(&level_id)
            .ok_or_else(|| DelveError::InvalidState(format!("unknown level {level_id}")))
    }

    /// Finds the level whose resident list holds `entity_id`.
    ///
    /// Held items rest on no level and return `None`.
    pub fn level_of(&self, entity_id: &EntityId) -> Option<LevelId> {
        self.level_order.iter().copied().find(|level_id| {
            self.levels
                .get(level_id)
                .is_some_and(|level| level.contains_entity(entity_id))
        })
    }

    /// The level the user is on.
    pub fn current_level(&self) -> DelveResult<&Arc<Level>> {
        let level_id = self
            .level_of(&EntityId::user())
            .ok_or_else(|| DelveError::InvalidState("user rests on no level".to_string()))?;
        self.level(level_id)
    }

    /// Depth index of a level within `level_order`.
    pub fn depth_of(&self, level_id: LevelId) -> Option<usize> {
        self.level_order.iter().position(|id| *id == level_id)
    }

    /// Entities resting at `pos` on a level, in the level's list order.
    pub fn entities_at(&self, level_id: LevelId, pos: Position) -> Vec<&Arc<Entity>> {
        self.levels
            .get(&level_id)
            .map(|level| {
                level
                    .entities
                    .iter()
                    .filter_map(|id| self.entities.get(id))
                    .filter(|entity| entity.position() == pos)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_terminal(&self) -> bool {
        self.screen.is_terminal()
    }

    /// Replaces (or inserts) one entity, sharing every other entry.
    pub fn put_entity(&mut self, entity: Entity) {
        Arc::make_mut(&mut self.entities).insert(entity.id().clone(), Arc::new(entity));
    }

    /// Deletes an entity from the mapping and from every level list.
    pub fn delete_entity(&mut self, entity_id: &EntityId) {
        Arc::make_mut(&mut self.entities).remove(entity_id);
        if let Some(level_id) = self.level_of(entity_id) {
            self.update_level(level_id, |level| level.remove_entity(entity_id));
        }
    }

    /// Replaces one level, sharing every other entry.
    pub fn put_level(&mut self, level: Level) {
        Arc::make_mut(&mut self.levels).insert(level.id, Arc::new(level));
    }

    /// Applies `f` to a copy of a level and stores the copy.
    ///
    /// The copy shares the level's map; `f` must clone the map itself
    /// (`Arc::make_mut`) before touching tiles.
    pub fn update_level<F>(&mut self, level_id: LevelId, f: F)
    where
        F: FnOnce(&mut Level),
    {
        if let Some(level) = self.levels.get(&level_id) {
            let mut level = Level::clone(level);
            f(&mut level);
            self.put_level(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Map, Prop, TileType};

    fn small_state() -> GameState {
        let mut level = Level::new(
            0,
            Map::new(8, 8, TileType::Dirt),
            Position::new(1, 1),
            Position::new(6, 6),
        );
        level.add_entity(EntityId::user());
        level.add_entity(EntityId::from("f1"));
        let user = UserCharacter::new("Tester".to_string(), Position::new(2, 2));
        let fruit = Entity::Fruit(Prop::new(EntityId::from("f1"), Position::new(3, 3)));
        GameState::new(
            vec![user.into(), fruit],
            vec![level],
            vec![0],
            TurnOrder::new([EntityId::user()]),
        )
        .unwrap()
    }

    #[test]
    fn test_state_creation() {
        let state = small_state();
        assert_eq!(state.screen, Screen::Play);
        assert!(state.user().is_some());
        assert_eq!(state.level_of(&EntityId::from("f1")), Some(0));
        assert_eq!(state.current_level().unwrap().id, 0);
    }

    #[test]
    fn test_missing_user_is_invariant_violation() {
        let level = Level::new(0, Map::new(4, 4, TileType::Dirt), Position::new(1, 1), Position::new(2, 2));
        let result = GameState::new(vec![], vec![level], vec![0], TurnOrder::default());
        assert!(matches!(result, Err(DelveError::InvariantViolation(_))));
    }

    #[test]
    fn test_non_actor_in_turn_order_is_rejected() {
        let mut state = small_state();
        state.turn_order = TurnOrder::new([EntityId::user(), EntityId::from("f1")]);
        assert!(matches!(
            state.validate(),
            Err(DelveError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_put_entity_shares_untouched_entries() {
        let before = small_state();
        let mut after = before.clone();
        let mut user = Entity::clone(before.entity(&EntityId::user()).unwrap());
        user.set_position(Position::new(4, 4));
        after.put_entity(user);

        assert!(!Arc::ptr_eq(&before.entities, &after.entities));
        let fruit = EntityId::from("f1");
        assert!(Arc::ptr_eq(
            before.entity(&fruit).unwrap(),
            after.entity(&fruit).unwrap()
        ));
        assert!(Arc::ptr_eq(&before.levels, &after.levels));
        assert_eq!(before.user().unwrap().position, Position::new(2, 2));
    }

    #[test]
    fn test_delete_entity_removes_from_level() {
        let mut state = small_state();
        state.delete_entity(&EntityId::from("f1"));
        assert!(state.entity(&EntityId::from("f1")).is_none());
        assert!(!state.level(0).unwrap().contains_entity(&EntityId::from("f1")));
    }

    #[test]
    fn test_entities_at_position() {
        let state = small_state();
        let found = state.entities_at(0, Position::new(3, 3));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id().as_str(), "f1");
        assert!(state.entities_at(0, Position::new(5, 5)).is_empty());
    }

    #[test]
    fn test_snapshot_shares_data_and_serializes() {
        let state = small_state();
        let snapshot = state.snapshot();
        assert!(Arc::ptr_eq(&snapshot.entities, &state.entities));
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"screen\":\"PLAY\""));
    }
}
