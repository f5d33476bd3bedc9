//! # Delve Headless Host
//!
//! Builds a world, lets autoexplore play it for a number of turns, and
//! reports how it went.

use clap::Parser;
use delve::generation::utils::{clock_seed, create_rng};
use delve::generation::RulesetName;
use delve::{build_initial_state, DelveResult, GameState, GenerationConfig, Session};
use log::{info, warn};

/// Command line arguments for the Delve host.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Headless runner for the Delve cave-crawler simulation core")]
#[command(version)]
struct Args {
    /// Random seed for world generation (defaults to the clock)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of levels from the surface down
    #[arg(long, default_value_t = delve::config::DEFAULT_LEVEL_COUNT)]
    levels: usize,

    /// Map width in tiles
    #[arg(long, default_value_t = delve::config::DEFAULT_MAP_WIDTH)]
    width: u32,

    /// Map height in tiles
    #[arg(long, default_value_t = delve::config::DEFAULT_MAP_HEIGHT)]
    height: u32,

    /// Force one cellular-automaton ruleset for every level
    #[arg(long)]
    ruleset: Option<RulesetName>,

    /// Maximum number of user turns to autoplay
    #[arg(short, long, default_value_t = 500)]
    turns: u64,

    /// Print the final snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> DelveResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);
    info!("Starting Delve v{}", delve::VERSION);

    let seed = args.seed.unwrap_or_else(clock_seed);
    let config = GenerationConfig {
        width: args.width,
        height: args.height,
        level_count: args.levels,
        ruleset: args.ruleset,
        ..GenerationConfig::new(seed)
    };

    let mut rng = create_rng(&config);
    let state = build_initial_state(&config, &mut rng)?;
    let mut session = Session::new(state, rng);

    session.autoplay(args.turns)?;
    if !session.state().is_terminal() {
        warn!("stopped after {} turns without an ending", session.turns());
    }

    if args.json {
        println!("{}", session.snapshot().to_json()?);
    } else {
        print_summary(seed, session.turns(), session.state());
    }
    Ok(())
}

/// Initializes env_logger at the given level; `RUST_LOG` wins when set.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_target(false)
        .init();
}

fn print_summary(seed: u64, turns: u64, state: &GameState) {
    println!("seed:    {seed}");
    println!("turns:   {turns}");
    println!("screen:  {:?}", state.screen);
    if let Some(user) = state.user() {
        let depth = state
            .level_of(&user.id)
            .and_then(|level_id| state.depth_of(level_id))
            .map_or_else(|| "?".to_string(), |depth| depth.to_string());
        println!("depth:   {depth}");
        println!("health:  {}/{}", user.health.current, user.health.max);
        println!("fed:     {:.3}", user.satiation);
        println!("carried: {}", user.inventory.items().len());
    }
}
