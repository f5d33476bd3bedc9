//! # Delve
//!
//! The simulation core of a turn-based cave crawler.
//!
//! ## Architecture Overview
//!
//! Delve is split into three hard pieces of engineering and the plumbing
//! that connects them:
//!
//! - **Generation System**: cellular-automaton cave carving, water and grass
//!   features, and guaranteed stair connectivity
//! - **Visibility**: radius-bounded line-of-sight vision with permanent
//!   fog-of-war memory
//! - **Turn Engine**: a round-robin actor queue and a pure action resolver
//!   over an immutable, structurally shared [`GameState`]
//!
//! ## Driving the core
//!
//! Hosts build a world once with [`build_initial_state`] and then feed
//! [`Command`]s through [`dispatch`]. A rejected command hands back the very
//! same `Arc`, so success is detected with [`std::sync::Arc::ptr_eq`]:
//!
//! ```
//! use delve::{build_initial_state, dispatch, Action, Command, GenerationConfig};
//! use delve::generation::utils::create_rng;
//! use std::sync::Arc;
//!
//! let config = GenerationConfig::for_testing(7);
//! let mut rng = create_rng(&config);
//! let state = build_initial_state(&config, &mut rng).unwrap();
//!
//! let next = dispatch(&state, &Command::user(Action::Stay), &mut rng).unwrap();
//! assert!(!Arc::ptr_eq(&state, &next));
//! ```

pub mod game;
pub mod generation;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use utils::*;

// Explicit re-exports for commonly used types
pub use game::{
    // From actions
    resolve,
    Action,
    Command,
    // From entities
    Entity,
    EntityId,
    EntityKind,
    // From state
    GameState,
    Screen,
    Snapshot,
    // From turns
    dispatch,
    TurnOrder,
    // From world
    Level,
    LevelId,
    Map,
    Position,
    Tile,
    TileType,
};

pub use generation::{build_initial_state, CaveGenerator, GenerationConfig, Generator, Ruleset};

/// Core error type for the Delve engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is missing something it must contain
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// An engine invariant was broken; the operation was aborted
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A position outside the map was written to
    #[error("Position {0:?} is outside the map")]
    InvalidPosition(Position),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default cave width in tiles
    pub const DEFAULT_MAP_WIDTH: u32 = 60;

    /// Default cave height in tiles
    pub const DEFAULT_MAP_HEIGHT: u32 = 30;

    /// Default number of dungeon depths
    pub const DEFAULT_LEVEL_COUNT: usize = 4;

    /// Radius of the user's vision circle
    pub const VISION_RADIUS: i32 = 7;

    /// Satiation lost per user turn
    pub const SATIATION_DECAY: f64 = 0.001;

    /// Damage taken per turn while starving
    pub const STARVATION_DAMAGE: u32 = 1;

    /// Starting (and maximum) user health
    pub const DEFAULT_USER_HEALTH: u32 = 10;

    /// Starting (and maximum) health of a mercury
    pub const DEFAULT_NPC_HEALTH: u32 = 3;

    /// Starting user body temperature
    pub const DEFAULT_USER_TEMPERATURE: f64 = 37.0;

    /// Items an inventory can hold
    pub const INVENTORY_CAPACITY: usize = 10;

    /// Chance per turn that a tree drops a fruit
    pub const FRUIT_DROP_CHANCE: f64 = 0.02;

    /// Upper bound on cells turned into water per level
    pub const WATER_CELL_CAP: usize = 300;

    /// Cells converted to grass around each grass seed
    pub const GRASS_CLUSTER_SIZE: usize = 9;

    /// Wall neighbours a dirt cell needs to seed grass
    pub const GRASS_SEED_WALL_COUNT: usize = 5;

    /// Minimum distance of the downstairs from the map border
    pub const STAIRS_INSET: i32 = 3;

    /// Bound for every rejection-sampling loop in the generator
    pub const MAX_SAMPLING_ATTEMPTS: u32 = 10_000;

    /// Identifier of the user entity
    pub const USER_ID: &str = "0";

    /// Identifier of the ring that wins the game when carried out of level 0
    pub const WINNING_RING_ID: &str = "ring-of-ascent";
}
