use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use eatman::constants::{DEFAULT_COLS, DEFAULT_FILL_RATIO, DEFAULT_MAX_ATTEMPTS, DEFAULT_ROWS};
use eatman::formatter::TickFormatter;
use eatman::game::components::GameStage;
use eatman::game::Game;
use eatman::map::generator::{GeneratorConfig, MazeGenerator};
use eatman::map::LevelData;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thousands::Separable;
use tracing::{info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Simulated time between ticks.
const TICK: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "eatman")]
#[command(about = "Generate a maze and run a headless chase on it")]
struct Args {
    /// Maze height; odd, at least 13
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Maze width; odd, at least 13
    #[arg(long, default_value_t = DEFAULT_COLS)]
    cols: usize,

    /// Target share of wall links to build, within (0, 1)
    #[arg(long, default_value_t = DEFAULT_FILL_RATIO)]
    fill_ratio: f64,

    /// Seed for generation and play; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Load this level file instead of generating one
    #[arg(long)]
    level: Option<PathBuf>,

    /// Ticks to simulate with the player on autopilot (0 = none)
    #[arg(long, default_value_t = 0)]
    ticks: u64,

    /// Print the level text to stdout
    #[arg(long)]
    print: bool,
}

fn init_tracing() -> Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).event_format(TickFormatter))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(ErrorLayer::default());
    tracing::subscriber::set_global_default(subscriber).context("Could not set the tracing subscriber")
}

fn load_level(args: &Args, seed: u64) -> Result<LevelData> {
    if let Some(path) = &args.level {
        let level = LevelData::load(path).with_context(|| format!("Could not load level file {}", path.display()))?;
        info!(path = %path.display(), rows = level.grid.rows(), cols = level.grid.cols(), "Level loaded");
        return Ok(level);
    }

    let generator = MazeGenerator::new(GeneratorConfig {
        rows: args.rows,
        cols: args.cols,
        fill_ratio: args.fill_ratio,
        max_attempts: DEFAULT_MAX_ATTEMPTS,
    })
    .context("Invalid generator settings")?;
    generator
        .generate(&mut SmallRng::seed_from_u64(seed))
        .context("Maze generation failed")
}

fn simulate(level: LevelData, seed: u64, ticks: u64) {
    let mut game = Game::new(level, seed);
    game.set_autopilot(true);

    let mut now = Duration::ZERO;
    for _ in 0..ticks {
        now += TICK;
        if game.tick(now) != GameStage::Playing {
            break;
        }
    }

    let clock = game.clock();
    match game.stage() {
        GameStage::GameOver => warn!(ticks = clock.ticks, "Player ran out of lives"),
        stage => info!(ticks = clock.ticks, stage = ?stage, "Simulation finished"),
    }
    info!(
        score = %game.score().separate_with_commas(),
        lives = game.lives(),
        beans_left = game.grid().bean_count(),
        "Final state"
    );
}

pub fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, "Starting");

    let level = load_level(&args, seed)?;
    if args.print {
        print!("{}", level.to_level_text());
    }
    if args.ticks > 0 {
        simulate(level, seed, args.ticks);
    }
    Ok(())
}
