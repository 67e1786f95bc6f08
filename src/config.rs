//! Session configuration and the command line that fills it in.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::snake::Direction;
use crate::{Coords, TermInt};

/// Cell count of each side of the default board
pub const DEFAULT_GRID_SIDE: TermInt = 25;
/// Largest accepted side; the board has to fit terminal coordinates
pub const MAX_GRID_SIDE: TermInt = 1000;
pub const DEFAULT_SNAKE_LENGTH: usize = 5;
pub const DEFAULT_START_DELAY_MS: u64 = 1000;
pub const DEFAULT_INTERVAL_MS: u64 = 250;
pub const DEFAULT_FLOOR_MS: u64 = 100;
pub const DEFAULT_DECREMENT_MS: u64 = 1;
pub const DEFAULT_FOOD_CAPACITY: usize = 2;
/// Food spawns with probability 1/N on every step
pub const DEFAULT_SPAWN_ODDS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid must be at least 1x1, got {0}x{1}")]
    EmptyGrid(TermInt, TermInt),

    #[error("grid {0}x{1} is larger than {max}x{max}", max = MAX_GRID_SIDE)]
    GridTooLarge(TermInt, TermInt),

    #[error("start position ({0}, {1}) lies outside the {2}x{3} grid")]
    StartOutOfBounds(TermInt, TermInt, TermInt, TermInt),

    #[error("initial snake length must be at least 1")]
    ZeroLength,

    #[error("food capacity must be at least 1")]
    ZeroFoodCapacity,

    #[error("spawn odds must be at least 1 (food spawns with probability 1/N)")]
    ZeroSpawnOdds,

    #[error("floor interval must be longer than zero")]
    ZeroFloorInterval,

    #[error("floor interval ({floor:?}) is longer than the initial interval ({initial:?})")]
    FloorAboveInitial { floor: Duration, initial: Duration },
}

/// Everything fixed at session start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub width: TermInt,
    pub height: TermInt,
    pub start: Coords,
    pub initial_length: usize,
    pub initial_direction: Direction,
    pub start_delay: Duration,
    pub initial_interval: Duration,
    pub floor_interval: Duration,
    pub interval_decrement: Duration,
    pub food_capacity: usize,
    pub spawn_odds: u32,
    /// Render frame cap, 0 means unlimited
    pub max_fps: u32,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: DEFAULT_GRID_SIDE,
            height: DEFAULT_GRID_SIDE,
            start: (DEFAULT_GRID_SIDE / 2, DEFAULT_GRID_SIDE / 2),
            initial_length: DEFAULT_SNAKE_LENGTH,
            initial_direction: Direction::Left,
            start_delay: Duration::from_millis(DEFAULT_START_DELAY_MS),
            initial_interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            floor_interval: Duration::from_millis(DEFAULT_FLOOR_MS),
            interval_decrement: Duration::from_millis(DEFAULT_DECREMENT_MS),
            food_capacity: DEFAULT_FOOD_CAPACITY,
            spawn_odds: DEFAULT_SPAWN_ODDS,
            max_fps: 0,
            seed: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid(self.width, self.height));
        }
        if self.width > MAX_GRID_SIDE || self.height > MAX_GRID_SIDE {
            return Err(ConfigError::GridTooLarge(self.width, self.height));
        }
        if self.start.0 >= self.width || self.start.1 >= self.height {
            let (x, y) = self.start;
            return Err(ConfigError::StartOutOfBounds(x, y, self.width, self.height));
        }
        if self.initial_length == 0 {
            return Err(ConfigError::ZeroLength);
        }
        if self.food_capacity == 0 {
            return Err(ConfigError::ZeroFoodCapacity);
        }
        if self.spawn_odds == 0 {
            return Err(ConfigError::ZeroSpawnOdds);
        }
        if self.floor_interval.is_zero() {
            return Err(ConfigError::ZeroFloorInterval);
        }
        if self.floor_interval > self.initial_interval {
            return Err(ConfigError::FloorAboveInitial {
                floor: self.floor_interval,
                initial: self.initial_interval,
            });
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
    Stopped,
}

impl From<Heading> for Direction {
    fn from(heading: Heading) -> Self {
        match heading {
            Heading::Up => Direction::Up,
            Heading::Down => Direction::Down,
            Heading::Left => Direction::Left,
            Heading::Right => Direction::Right,
            Heading::Stopped => Direction::Stopped,
        }
    }
}

/// Snake on a wraparound grid
#[derive(Parser, Debug)]
#[command(name = "torus_snake")]
#[command(about = "Terminal snake on a wraparound grid")]
pub struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = DEFAULT_GRID_SIDE)]
    pub width: TermInt,

    /// Grid height in cells
    #[arg(long, default_value_t = DEFAULT_GRID_SIDE)]
    pub height: TermInt,

    /// Head start column (defaults to the middle of the grid)
    #[arg(long)]
    pub start_x: Option<TermInt>,

    /// Head start row (defaults to the middle of the grid)
    #[arg(long)]
    pub start_y: Option<TermInt>,

    /// Initial snake length, head included
    #[arg(long, default_value_t = DEFAULT_SNAKE_LENGTH)]
    pub length: usize,

    /// Initial heading
    #[arg(long, value_enum, default_value_t = Heading::Left)]
    pub heading: Heading,

    /// Pause before the snake starts moving
    #[arg(long, default_value_t = DEFAULT_START_DELAY_MS)]
    pub start_delay_ms: u64,

    /// Initial time between steps
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Shortest time between steps the speed ramp can reach
    #[arg(long, default_value_t = DEFAULT_FLOOR_MS)]
    pub floor_ms: u64,

    /// How much the step interval shrinks after every step
    #[arg(long, default_value_t = DEFAULT_DECREMENT_MS)]
    pub decrement_ms: u64,

    /// Maximum number of food items on the board
    #[arg(long, default_value_t = DEFAULT_FOOD_CAPACITY)]
    pub food: usize,

    /// Food spawns with probability 1/N per step
    #[arg(long, default_value_t = DEFAULT_SPAWN_ODDS)]
    pub spawn_odds: u32,

    /// Frame rate cap (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_fps: u32,

    /// Seed for the random generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write logs to this file (the terminal is busy with the game)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Config {
            width: args.width,
            height: args.height,
            start: (
                args.start_x.unwrap_or(args.width / 2),
                args.start_y.unwrap_or(args.height / 2),
            ),
            initial_length: args.length,
            initial_direction: args.heading.into(),
            start_delay: Duration::from_millis(args.start_delay_ms),
            initial_interval: Duration::from_millis(args.interval_ms),
            floor_interval: Duration::from_millis(args.floor_ms),
            interval_decrement: Duration::from_millis(args.decrement_ms),
            food_capacity: args.food,
            spawn_odds: args.spawn_odds,
            max_fps: args.max_fps,
            seed: args.seed,
        }
    }
}
