//! # Cellular Automaton Rulesets
//!
//! The fixed catalog of life-like rules used to carve caves.
//!
//! A rule is written `B<birth>/S<survive>`: a dirt cell whose count of wall
//! Moore neighbours is in the birth set becomes a wall, a wall whose count
//! is in the survive set stays one. Anything else becomes (or stays) dirt.

use crate::DelveError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Names of the catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RulesetName {
    Caves,
    Coral,
    DayAndNight,
    Diamoeba,
    DenseMaze,
    Maze,
    WalledCities,
    Chaotic,
}

impl RulesetName {
    pub const ALL: [RulesetName; 8] = [
        RulesetName::Caves,
        RulesetName::Coral,
        RulesetName::DayAndNight,
        RulesetName::Diamoeba,
        RulesetName::DenseMaze,
        RulesetName::Maze,
        RulesetName::WalledCities,
        RulesetName::Chaotic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RulesetName::Caves => "caves",
            RulesetName::Coral => "coral",
            RulesetName::DayAndNight => "day-and-night",
            RulesetName::Diamoeba => "diamoeba",
            RulesetName::DenseMaze => "dense-maze",
            RulesetName::Maze => "maze",
            RulesetName::WalledCities => "walled-cities",
            RulesetName::Chaotic => "chaotic",
        }
    }
}

impl fmt::Display for RulesetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RulesetName {
    type Err = DelveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RulesetName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| DelveError::GenerationFailed(format!("unknown ruleset {s:?}")))
    }
}

/// A set of neighbour counts in `0..=8`, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborSet(u16);

impl NeighborSet {
    pub const fn from_counts(counts: &[u8]) -> Self {
        let mut mask = 0u16;
        let mut i = 0;
        while i < counts.len() {
            mask |= 1 << counts[i];
            i += 1;
        }
        Self(mask)
    }

    pub fn contains(self, count: usize) -> bool {
        count <= 8 && self.0 & (1 << count) != 0
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ruleset {
    pub name: RulesetName,
    pub birth: NeighborSet,
    pub survive: NeighborSet,
    /// Chance that a cell starts out as a wall
    pub wall_probability: f64,
    /// Number of generations to run
    pub steps: u32,
}

impl Ruleset {
    const fn new(
        name: RulesetName,
        birth: &[u8],
        survive: &[u8],
        wall_probability: f64,
        steps: u32,
    ) -> Self {
        Self {
            name,
            birth: NeighborSet::from_counts(birth),
            survive: NeighborSet::from_counts(survive),
            wall_probability,
            steps,
        }
    }

    /// Looks up a catalog entry by name.
    pub fn by_name(name: RulesetName) -> &'static Ruleset {
        // catalog order matches RulesetName::ALL
        &CATALOG[name as usize]
    }

    /// Picks a catalog entry uniformly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> &'static Ruleset {
        &CATALOG[rng.gen_range(0..CATALOG.len())]
    }

    /// Next generation of one cell.
    pub fn next_is_wall(&self, is_wall: bool, wall_neighbors: usize) -> bool {
        if is_wall {
            self.survive.contains(wall_neighbors)
        } else {
            self.birth.contains(wall_neighbors)
        }
    }
}

pub static CATALOG: [Ruleset; 8] = [
    Ruleset::new(RulesetName::Caves, &[5, 6, 7, 8], &[4, 5, 6, 7, 8], 0.45, 5),
    Ruleset::new(RulesetName::Coral, &[3], &[4, 5, 6, 7, 8], 0.2, 8),
    Ruleset::new(RulesetName::DayAndNight, &[3, 6, 7, 8], &[3, 4, 6, 7, 8], 0.4, 20),
    Ruleset::new(RulesetName::Diamoeba, &[3, 5, 6, 7, 8], &[5, 6, 7, 8], 0.4, 30),
    Ruleset::new(RulesetName::DenseMaze, &[3], &[1, 2, 3, 4], 0.2, 30),
    Ruleset::new(RulesetName::Maze, &[3], &[1, 2, 3, 4, 5], 0.15, 40),
    Ruleset::new(RulesetName::WalledCities, &[4, 5, 6, 7, 8], &[2, 3, 4, 5], 0.35, 15),
    Ruleset::new(RulesetName::Chaotic, &[1, 3, 5, 7], &[1, 3, 5, 7], 0.15, 1),
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_catalog_is_indexed_by_name() {
        for name in RulesetName::ALL {
            assert_eq!(Ruleset::by_name(name).name, name);
        }
    }

    #[test]
    fn test_catalog_parameters_in_range() {
        for ruleset in CATALOG.iter() {
            assert!((0.15..=0.45).contains(&ruleset.wall_probability));
            assert!((1..=100).contains(&ruleset.steps));
        }
    }

    #[test]
    fn test_dense_maze_transitions() {
        let rule = Ruleset::by_name(RulesetName::DenseMaze);
        assert!(rule.next_is_wall(false, 3));
        assert!(!rule.next_is_wall(false, 2));
        assert!(rule.next_is_wall(true, 1));
        assert!(!rule.next_is_wall(true, 5));
        assert!(!rule.next_is_wall(true, 0));
    }

    #[test]
    fn test_neighbor_set_bounds() {
        let set = NeighborSet::from_counts(&[0, 8]);
        assert!(set.contains(0) && set.contains(8));
        assert!(!set.contains(4));
        assert!(!set.contains(9));
    }

    #[test]
    fn test_names_parse() {
        for name in RulesetName::ALL {
            assert_eq!(name.as_str().parse::<RulesetName>().unwrap(), name);
        }
        assert!("life".parse::<RulesetName>().is_err());
    }

    #[test]
    fn test_random_pick_is_seeded() {
        let a = Ruleset::random(&mut StdRng::seed_from_u64(4)).name;
        let b = Ruleset::random(&mut StdRng::seed_from_u64(4)).name;
        assert_eq!(a, b);
    }
}
