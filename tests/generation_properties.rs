//! Property tests for cave generation and vision.

use delve::generation::utils::create_rng;
use delve::generation::{remove_diagonal_only_walls, RulesetName};
use delve::{rasterize_line, CaveGenerator, GenerationConfig, Generator, Map, Position, TileType};
use proptest::prelude::*;

fn ruleset() -> impl Strategy<Value = RulesetName> {
    prop::sample::select(RulesetName::ALL.to_vec())
}

fn on_border(map: &Map, pos: Position) -> bool {
    pos.x == 0 || pos.y == 0 || pos.x == map.width() as i32 - 1 || pos.y == map.height() as i32 - 1
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_borders_are_walls_and_stairs_connect(seed in any::<u64>(), name in ruleset()) {
        let mut config = GenerationConfig::for_testing(seed);
        config.ruleset = Some(name);
        let level = CaveGenerator::new(0).generate(&config, &mut create_rng(&config)).unwrap();

        for pos in level.map.positions().filter(|&p| on_border(&level.map, p)) {
            prop_assert!(level.map.is_wall(pos));
        }
        prop_assert!(level.stairs_connected());
    }

    #[test]
    fn test_same_seed_same_tiles(seed in any::<u64>()) {
        let config = GenerationConfig::for_testing(seed);
        let first = CaveGenerator::new(0).generate(&config, &mut create_rng(&config)).unwrap();
        let second = CaveGenerator::new(0).generate(&config, &mut create_rng(&config)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_vision_never_crosses_walls(seed in any::<u64>(), radius in 1i32..10) {
        let config = GenerationConfig::for_testing(seed);
        let level = CaveGenerator::new(0).generate(&config, &mut create_rng(&config)).unwrap();
        let center = level.upstairs;
        let mut map = (*level.map).clone();
        map.grant_vision(center, radius);

        for pos in map.positions() {
            if !map.get(pos).unwrap().is_visible() {
                continue;
            }
            prop_assert!(pos.distance_squared(center) < radius * radius);
            let between_walls = rasterize_line(center, pos)
                .into_iter()
                .take_while(|&p| p != pos)
                .any(|p| map.is_wall(p));
            prop_assert!(!between_walls, "{:?} seen through a wall", pos);
        }

        let explored_before: Vec<bool> = map.tiles().map(|t| t.is_explored()).collect();
        map.revoke_vision(center, radius);
        let explored_after: Vec<bool> = map.tiles().map(|t| t.is_explored()).collect();
        prop_assert_eq!(explored_before, explored_after);
        prop_assert!(map.tiles().all(|t| !t.is_visible() || t.is_explored()));
    }
}

#[test]
fn test_lone_wall_in_dirt_is_pruned() {
    let mut map = Map::new(5, 5, TileType::Dirt);
    map.set(Position::new(2, 2), TileType::wall()).unwrap();
    remove_diagonal_only_walls(&mut map);
    assert!(map.tiles().all(|tile| tile.tile_type == TileType::Dirt));
}
