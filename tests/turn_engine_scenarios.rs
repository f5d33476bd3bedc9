//! Integration tests for the turn engine's per-turn lifecycle.

use delve::{
    dispatch, Action, Command, Direction, DelveResult, Entity, EntityId, GameState, Level, Map,
    Npc, Position, Screen, TileType, TurnOrder, UserCharacter,
};
use delve::game::Prop;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;

/// A walled 12x12 room: the user at (5, 5) standing on fruit "f1", a wall
/// at (5, 4), and a mercury in the far corner.
fn room_state(satiation: f64, health: u32) -> Arc<GameState> {
    let mut map = Map::new(12, 12, TileType::Dirt);
    map.outline_with_walls(None, None);
    map.set(Position::new(5, 4), TileType::wall()).unwrap();

    let mut level = Level::new(0, map, Position::new(2, 2), Position::new(9, 9));
    for id in ["0", "f1", "m1"] {
        level.add_entity(EntityId::from(id));
    }

    let mut user = UserCharacter::new("Tester".to_string(), Position::new(5, 5));
    user.satiation = satiation;
    user.health.current = health;

    let state = GameState::new(
        vec![
            user.into(),
            Entity::Fruit(Prop::new(EntityId::from("f1"), Position::new(5, 5))),
            Npc::mercury(EntityId::from("m1"), Position::new(9, 2)).into(),
        ],
        vec![level],
        vec![0],
        TurnOrder::new([EntityId::user(), EntityId::from("m1")]),
    )
    .unwrap();
    Arc::new(state)
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(2024)
}

#[test]
fn test_pick_up_fruit_underfoot() -> DelveResult<()> {
    let state = room_state(1.0, 10);
    let command = Command::user(Action::PickUpItem {
        item_id: EntityId::from("f1"),
    });
    let next = dispatch(&state, &command, &mut rng())?;

    let user = next.user().unwrap();
    assert!(user.inventory.contains(&EntityId::from("f1")));
    assert!(!next.level(0)?.contains_entity(&EntityId::from("f1")));
    Ok(())
}

#[test]
fn test_move_into_wall_is_same_state() -> DelveResult<()> {
    let state = room_state(1.0, 10);
    let command = Command::user(Action::Move {
        direction: Direction::North,
    });
    let next = dispatch(&state, &command, &mut rng())?;
    assert!(Arc::ptr_eq(&state, &next));
    Ok(())
}

#[test]
fn test_successful_turn_rotates_back_to_user() -> DelveResult<()> {
    let state = room_state(1.0, 10);
    let next = dispatch(&state, &Command::user(Action::Stay), &mut rng())?;
    assert_eq!(next.turn_order.front(), Some(&EntityId::user()));
    assert_eq!(next.turn_order.len(), 2);
    let satiation = next.user().unwrap().satiation;
    assert!((satiation - 0.999).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_starvation_clamps_and_hurts() -> DelveResult<()> {
    let state = room_state(0.0009, 10);
    let command = Command::user(Action::Move {
        direction: Direction::South,
    });
    let next = dispatch(&state, &command, &mut rng())?;

    let user = next.user().unwrap();
    assert_eq!(user.satiation, 0.0);
    assert_eq!(user.health.current, 9);
    assert_eq!(next.screen, Screen::Play);
    Ok(())
}

#[test]
fn test_death_is_terminal() -> DelveResult<()> {
    let state = room_state(0.0009, 1);
    let command = Command::user(Action::Move {
        direction: Direction::South,
    });
    let dead = dispatch(&state, &command, &mut rng())?;
    assert_eq!(dead.screen, Screen::UserDied);
    assert_eq!(dead.user().unwrap().health.current, 0);

    for action in [
        Action::Stay,
        Action::Move { direction: Direction::East },
        Action::PickUpItem { item_id: EntityId::from("f1") },
    ] {
        let after = dispatch(&dead, &Command::user(action), &mut rng())?;
        assert!(Arc::ptr_eq(&dead, &after));
    }
    Ok(())
}

#[test]
fn test_eating_resets_satiation() -> DelveResult<()> {
    let state = room_state(0.3, 10);
    let mut rng = rng();
    let held = dispatch(
        &state,
        &Command::user(Action::PickUpItem { item_id: EntityId::from("f1") }),
        &mut rng,
    )?;
    let fed = dispatch(
        &held,
        &Command::user(Action::UseItem { item_id: EntityId::from("f1") }),
        &mut rng,
    )?;

    // the reset happens before the turn's hunger tick
    let satiation = fed.user().unwrap().satiation;
    assert!((satiation - 0.999).abs() < 1e-9);
    assert!(fed.entity(&EntityId::from("f1")).is_none());
    Ok(())
}

#[test]
fn test_commands_for_other_actors_are_rejected() {
    let state = room_state(1.0, 10);
    let command = Command::new(EntityId::from("m1"), Action::Stay);
    assert!(dispatch(&state, &command, &mut rng()).is_err());
}

#[test]
fn test_command_payloads_parse() -> DelveResult<()> {
    let state = room_state(1.0, 10);
    let command = Command::from_json(
        r#"{"actor": "0", "action": {"type": "pick-up-item", "item_id": "f1"}}"#,
    )?;
    let next = dispatch(&state, &command, &mut rng())?;
    assert!(next.user().unwrap().inventory.contains(&EntityId::from("f1")));

    assert!(Command::from_json(r#"{"actor": "0", "action": {"type": "teleport"}}"#).is_err());
    Ok(())
}
