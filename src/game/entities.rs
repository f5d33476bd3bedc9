//! # Entities Module
//!
//! The closed set of entity variants and their structural capabilities.
//!
//! Every entity is one variant of [`Entity`]. Whether it acts, carries
//! things or can be hurt is decided purely by its [`EntityKind`] tag, so a
//! `match` on the tag is all the "type inspection" the engine ever does.

use crate::config;
use crate::game::Position;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for game entities.
///
/// The user always carries the reserved id `"0"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved id of the player-controlled user.
    pub fn user() -> Self {
        Self::new(config::USER_ID)
    }

    /// Creates a new unique id from the game's random source.
    ///
    /// The id is a v4 UUID built from RNG bytes, so a seeded game
    /// reproduces the same ids.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let uuid = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
        Self(uuid.to_string())
    }

    pub fn is_user(&self) -> bool {
        self.0 == config::USER_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Variant tag of an [`Entity`], carrying the capability predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    User,
    Npc,
    Tree,
    Ring,
    Fruit,
    Axe,
    House,
}

impl EntityKind {
    /// Items can be picked up and are never part of the turn order.
    pub const fn is_item(self) -> bool {
        matches!(self, EntityKind::Ring | EntityKind::Fruit | EntityKind::Axe)
    }

    /// Actors take turns.
    pub const fn is_actor(self) -> bool {
        matches!(self, EntityKind::User | EntityKind::Npc | EntityKind::Tree)
    }

    pub const fn has_health(self) -> bool {
        matches!(self, EntityKind::User | EntityKind::Npc)
    }

    pub const fn has_inventory(self) -> bool {
        matches!(self, EntityKind::User | EntityKind::Npc)
    }
}

/// Current and maximum hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Health {
    /// Full health with the given maximum.
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Subtracts damage, stopping at zero.
    pub fn damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }
}

/// Ordered list of held item ids with a fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<EntityId>,
    capacity: usize,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    pub fn items(&self) -> &[EntityId] {
        &self.items
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, item_id: &EntityId) -> bool {
        self.items.contains(item_id)
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Appends an item; returns false when the inventory is full.
    pub fn add(&mut self, item_id: EntityId) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item_id);
        true
    }

    /// Removes an item; returns false when it was not held.
    pub fn remove(&mut self, item_id: &EntityId) -> bool {
        let before = self.items.len();
        self.items.retain(|id| id != item_id);
        self.items.len() != before
    }
}

/// The player-controlled character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCharacter {
    pub id: EntityId,
    pub position: Position,
    pub name: String,
    pub health: Health,
    pub inventory: Inventory,
    /// 1.0 is fully fed, 0.0 is starving
    pub satiation: f64,
    pub temperature: f64,
}

impl UserCharacter {
    /// Creates the user at full health and fully fed.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Position, UserCharacter};
    ///
    /// let user = UserCharacter::new("Hero".to_string(), Position::new(5, 5));
    /// assert!(user.id.is_user());
    /// assert_eq!(user.satiation, 1.0);
    /// ```
    pub fn new(name: String, position: Position) -> Self {
        Self {
            id: EntityId::user(),
            position,
            name,
            health: Health::full(config::DEFAULT_USER_HEALTH),
            inventory: Inventory::new(config::INVENTORY_CAPACITY),
            satiation: 1.0,
            temperature: config::DEFAULT_USER_TEMPERATURE,
        }
    }
}

/// A wandering non-player creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: EntityId,
    pub position: Position,
    pub species: String,
    pub health: Health,
    pub inventory: Inventory,
}

impl Npc {
    /// Creates a mercury, the only species that roams the caves.
    pub fn mercury(id: EntityId, position: Position) -> Self {
        Self {
            id,
            position,
            species: "mercury".to_string(),
            health: Health::full(config::DEFAULT_NPC_HEALTH),
            inventory: Inventory::new(config::INVENTORY_CAPACITY),
        }
    }
}

/// Anything that only has an identity and a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prop {
    pub id: EntityId,
    pub position: Position,
}

impl Prop {
    pub fn new(id: EntityId, position: Position) -> Self {
        Self { id, position }
    }
}

/// A game entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Entity {
    User(UserCharacter),
    Npc(Npc),
    Tree(Prop),
    Ring(Prop),
    Fruit(Prop),
    Axe(Prop),
    House(Prop),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::User(_) => EntityKind::User,
            Entity::Npc(_) => EntityKind::Npc,
            Entity::Tree(_) => EntityKind::Tree,
            Entity::Ring(_) => EntityKind::Ring,
            Entity::Fruit(_) => EntityKind::Fruit,
            Entity::Axe(_) => EntityKind::Axe,
            Entity::House(_) => EntityKind::House,
        }
    }

    pub fn id(&self) -> &EntityId {
        match self {
            Entity::User(user) => &user.id,
            Entity::Npc(npc) => &npc.id,
            Entity::Tree(prop)
            | Entity::Ring(prop)
            | Entity::Fruit(prop)
            | Entity::Axe(prop)
            | Entity::House(prop) => &prop.id,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Entity::User(user) => user.position,
            Entity::Npc(npc) => npc.position,
            Entity::Tree(prop)
            | Entity::Ring(prop)
            | Entity::Fruit(prop)
            | Entity::Axe(prop)
            | Entity::House(prop) => prop.position,
        }
    }

    pub fn set_position(&mut self, position: Position) {
        match self {
            Entity::User(user) => user.position = position,
            Entity::Npc(npc) => npc.position = position,
            Entity::Tree(prop)
            | Entity::Ring(prop)
            | Entity::Fruit(prop)
            | Entity::Axe(prop)
            | Entity::House(prop) => prop.position = position,
        }
    }

    pub fn health(&self) -> Option<&Health> {
        match self {
            Entity::User(user) => Some(&user.health),
            Entity::Npc(npc) => Some(&npc.health),
            _ => None,
        }
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        match self {
            Entity::User(user) => Some(&user.inventory),
            Entity::Npc(npc) => Some(&npc.inventory),
            _ => None,
        }
    }

    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        match self {
            Entity::User(user) => Some(&mut user.inventory),
            Entity::Npc(npc) => Some(&mut npc.inventory),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&UserCharacter> {
        match self {
            Entity::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn as_user_mut(&mut self) -> Option<&mut UserCharacter> {
        match self {
            Entity::User(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_item(&self) -> bool {
        self.kind().is_item()
    }

    pub fn is_actor(&self) -> bool {
        self.kind().is_actor()
    }
}

impl From<UserCharacter> for Entity {
    fn from(user: UserCharacter) -> Self {
        Entity::User(user)
    }
}

impl From<Npc> for Entity {
    fn from(npc: Npc) -> Self {
        Entity::Npc(npc)
    }
}
