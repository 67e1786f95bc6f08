mod config;
mod food;
mod game;
mod grid;
mod session;
mod snake;
mod term;
mod tick;

use std::{fs::File, path::Path, sync::Mutex};

use anyhow::Context;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Args, Config};
use session::SessionExit;

pub type TermInt = u16;
pub type Coords = (u16, u16);

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = Config::from(&args);
    config.validate().context("Invalid configuration")?;

    let seed = config.seed.unwrap_or_else(rand::random);
    info!(seed, ?config, "starting");

    let mut game = game::SnakeGame::new(config, StdRng::seed_from_u64(seed))?;
    game.initialize()?;

    // The terminal must come back even when a session fails
    let result = run(&mut game);
    game.shutdown()?;
    result
}

fn run(game: &mut game::SnakeGame) -> anyhow::Result<()> {
    loop {
        if game.play()? == SessionExit::Closed {
            info!("closed by the player");
            return Ok(());
        }
    }
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Error creating log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
