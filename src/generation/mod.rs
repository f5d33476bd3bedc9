//! # Generation Module
//!
//! Procedural content generation: cave levels and the initial world.
//!
//! Every generator draws from one caller-owned [`StdRng`], so a world is a
//! pure function of its [`GenerationConfig`] seed.

pub mod dungeon;
pub mod populate;
pub mod rules;

pub use dungeon::*;
pub use populate::*;
pub use rules::*;

use crate::config;
use crate::{DelveError, DelveResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Smallest grid side the stair inset and waypoint search can work with.
pub const MIN_MAP_SIDE: u32 = 4 * config::STAIRS_INSET as u32;

/// Configuration for procedural generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width of every level
    pub width: u32,
    /// Map height of every level
    pub height: u32,
    /// Number of levels from the surface down
    pub level_count: usize,
    /// Mercuries placed on each level
    pub npcs_per_level: usize,
    /// Trees placed on each level
    pub trees_per_level: usize,
    /// Fruit placed on each level
    pub fruit_per_level: usize,
    /// Forces one ruleset for every level instead of a random pick
    pub ruleset: Option<RulesetName>,
    /// Bound for every rejection-sampling loop
    pub max_placement_attempts: u32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(12345);
    /// assert_eq!(config.seed, 12345);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: config::DEFAULT_MAP_WIDTH,
            height: config::DEFAULT_MAP_HEIGHT,
            level_count: config::DEFAULT_LEVEL_COUNT,
            npcs_per_level: 3,
            trees_per_level: 4,
            fruit_per_level: 3,
            ruleset: None,
            max_placement_attempts: config::MAX_SAMPLING_ATTEMPTS,
        }
    }

    /// Creates a configuration for testing with smaller, simpler worlds.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            width: 30,
            height: 20,
            level_count: 2,
            npcs_per_level: 1,
            trees_per_level: 1,
            fruit_per_level: 1,
            ruleset: Some(RulesetName::Caves),
            max_placement_attempts: config::MAX_SAMPLING_ATTEMPTS,
        }
    }

    /// Rejects configurations the generator cannot satisfy.
    pub fn validate(&self) -> DelveResult<()> {
        if self.width < MIN_MAP_SIDE || self.height < MIN_MAP_SIDE {
            return Err(DelveError::GenerationFailed(format!(
                "map {}x{} is smaller than {MIN_MAP_SIDE}x{MIN_MAP_SIDE}",
                self.width, self.height
            )));
        }
        if self.level_count == 0 {
            return Err(DelveError::GenerationFailed(
                "at least one level is required".to_string(),
            ));
        }
        if self.max_placement_attempts == 0 {
            return Err(DelveError::GenerationFailed(
                "max_placement_attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// A seed taken from the wall clock, for hosts that were given none.
    pub fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(42)
    }
}
