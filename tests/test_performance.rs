//! Performance tests for world building and the turn engine.

use delve::generation::utils::create_rng;
use delve::{build_initial_state, dispatch, Action, Command, DelveResult, GenerationConfig};
use std::sync::Arc;
use std::time::Instant;

#[test]
fn test_world_build_performance() -> DelveResult<()> {
    let config = GenerationConfig::new(12345);

    let start = Instant::now();
    let state = build_initial_state(&config, &mut create_rng(&config))?;
    let elapsed = start.elapsed();

    println!("Built {} levels in {:?}", state.levels.len(), elapsed);
    assert!(elapsed.as_secs() < 10, "world build took {elapsed:?}");
    Ok(())
}

#[test]
fn test_turn_throughput() -> DelveResult<()> {
    let config = GenerationConfig::new(777);
    let mut rng = create_rng(&config);
    let mut state = build_initial_state(&config, &mut rng)?;

    let iterations = 500;
    let start = Instant::now();
    for _ in 0..iterations {
        state = dispatch(&state, &Command::user(Action::Stay), &mut rng)?;
    }
    let elapsed = start.elapsed();

    println!("Average turn time: {:?}", elapsed / iterations);
    assert!(elapsed.as_secs() < 10, "{iterations} turns took {elapsed:?}");
    Ok(())
}

#[test]
fn test_turns_share_untouched_levels() -> DelveResult<()> {
    let config = GenerationConfig::new(4);
    let mut rng = create_rng(&config);
    let state = build_initial_state(&config, &mut rng)?;
    let next = dispatch(&state, &Command::user(Action::Stay), &mut rng)?;

    // staying touches no map, so every map allocation is reused
    for level_id in state.level_order.iter() {
        assert!(Arc::ptr_eq(
            &state.level(*level_id)?.map,
            &next.level(*level_id)?.map
        ));
    }
    Ok(())
}
