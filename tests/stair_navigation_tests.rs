//! Integration tests for stair navigation between generated levels.

use delve::generation::utils::create_rng;
use delve::{
    build_initial_state, config, dispatch, Action, Command, Entity, EntityId, GameState,
    GenerationConfig, Position, Screen, TileType,
};
use rand::rngs::StdRng;
use std::sync::Arc;

fn world(seed: u64) -> (Arc<GameState>, StdRng) {
    let config = GenerationConfig::for_testing(seed);
    let mut rng = create_rng(&config);
    let state = build_initial_state(&config, &mut rng).expect("world generation failed");
    (state, rng)
}

/// Puts the user somewhere else on its current level, moving its vision
/// along.
fn teleport_user(state: &Arc<GameState>, to: Position) -> Arc<GameState> {
    let mut next = GameState::clone(state);
    let mut user = Entity::clone(next.entity(&EntityId::user()).unwrap());
    let from = user.position();
    user.set_position(to);
    next.put_entity(user);

    let level_id = next.level_of(&EntityId::user()).unwrap();
    next.update_level(level_id, |level| {
        Arc::make_mut(&mut level.map).shift_vision(from, to, config::VISION_RADIUS);
    });
    Arc::new(next)
}

/// Test stair navigation between the surface and the level below.
#[test]
fn test_going_down_keeps_coordinates() {
    let (state, mut rng) = world(98765);
    let surface = state.level(state.level_order[0]).unwrap();
    let below_id = state.level_order[1];
    let stairs = surface.downstairs;

    let on_stairs = teleport_user(&state, stairs);
    let below = dispatch(&on_stairs, &Command::user(Action::GoDownstairs), &mut rng).unwrap();

    assert_eq!(below.level_of(&EntityId::user()), Some(below_id));
    let level = below.level(below_id).unwrap();
    assert_eq!(level.entities.first(), Some(&EntityId::user()));
    assert_eq!(below.user().unwrap().position, stairs);
    assert_eq!(level.map.tile_type(stairs), Some(TileType::Upstairs));
    assert!(level.map.get(stairs).unwrap().is_visible());

    // leaving revokes the surface vision around the stairs
    let left = below.level(state.level_order[0]).unwrap();
    assert!(!left.map.get(stairs).unwrap().is_visible());
    assert!(left.map.get(stairs).unwrap().is_explored());
}

/// Test that stairs are aligned across every level.
#[test]
fn test_complete_stair_alignment() {
    let (state, _) = world(54321);
    assert_eq!(state.level_order.len(), 2);
    for pair in state.level_order.windows(2) {
        let above = state.level(pair[0]).unwrap();
        let below = state.level(pair[1]).unwrap();
        assert_eq!(above.downstairs, below.upstairs);
        assert!(above.stairs_connected() && below.stairs_connected());
    }
}

#[test]
fn test_round_trip_returns_to_surface() {
    let (state, mut rng) = world(777);
    let surface_id = state.level_order[0];
    let stairs = state.level(surface_id).unwrap().downstairs;

    let down = dispatch(
        &teleport_user(&state, stairs),
        &Command::user(Action::GoDownstairs),
        &mut rng,
    )
    .unwrap();
    let up = dispatch(&down, &Command::user(Action::GoUpstairs), &mut rng).unwrap();

    assert_eq!(up.level_of(&EntityId::user()), Some(surface_id));
    assert_eq!(up.user().unwrap().position, stairs);
}

#[test]
fn test_stairs_elsewhere_do_nothing() {
    let (state, mut rng) = world(4242);
    // the user starts on the surface upstairs
    let down = dispatch(&state, &Command::user(Action::GoDownstairs), &mut rng).unwrap();
    assert!(Arc::ptr_eq(&state, &down));

    let up = dispatch(&state, &Command::user(Action::GoUpstairs), &mut rng).unwrap();
    assert!(Arc::ptr_eq(&state, &up));
    assert_eq!(up.screen, Screen::Play);
}

#[test]
fn test_climbing_out_with_ring_wins() {
    let (state, mut rng) = world(31337);
    let ring_id = EntityId::new(config::WINNING_RING_ID);

    let mut carrying = GameState::clone(&state);
    let ring_level = carrying.level_of(&ring_id).unwrap();
    carrying.update_level(ring_level, |level| level.remove_entity(&ring_id));
    let mut user = Entity::clone(carrying.entity(&EntityId::user()).unwrap());
    user.inventory_mut().unwrap().add(ring_id);
    carrying.put_entity(user);
    let carrying = Arc::new(carrying);

    let won = dispatch(&carrying, &Command::user(Action::GoUpstairs), &mut rng).unwrap();
    assert_eq!(won.screen, Screen::UserWon);

    let after = dispatch(&won, &Command::user(Action::Stay), &mut rng).unwrap();
    assert!(Arc::ptr_eq(&won, &after));
}
