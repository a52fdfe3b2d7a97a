//! Glade Player - Headless world runner
//!
//! Usage:
//!   glade-player [--config <glade.toml>] [--frames <n>] [--seed <n>] [--no-audio]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glade_player::rand::ScatterRng;
use glade_player::{App, EngineConfig, World};

#[derive(Parser)]
#[command(name = "glade-player")]
#[command(about = "Glade player - generate the world and run it headless")]
struct Args {
    /// Path to config file
    #[arg(long, default_value = "glade.toml")]
    config: PathBuf,

    /// Frames to run
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Override the world seed
    #[arg(long)]
    seed: Option<u32>,

    /// Override the assets directory
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Run without an audio device
    #[arg(long)]
    no_audio: bool,

    /// Time frames with the wall clock instead of a fixed 60 Hz step
    #[arg(long)]
    wall_clock: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mut config = EngineConfig::load(&args.config)
        .with_context(|| format!("Failed to load config '{}'", args.config.display()))?;
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if let Some(assets) = args.assets {
        config.world.assets = assets;
    }

    let mut rng = ScatterRng::new(config.world.seed);
    let mut app = App::new(
        &config,
        |gpu| World::load(gpu, &config, &mut rng),
        !args.no_audio,
        args.wall_clock,
    )
    .context("Failed to build the world")?;

    let summary = app.run(args.frames).context("Frame loop failed")?;
    println!(
        "{} frames, {} entity draws, player moved {:.1} units",
        summary.frames, summary.entity_draws, summary.player_distance
    );
    Ok(())
}
