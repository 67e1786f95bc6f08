use std::time::{Duration, Instant};

use crate::config::Config;
use crate::food::FoodManager;
use crate::grid::{Cell, Grid};
use crate::snake::{Direction, MoveResult, Snake};
use crate::tick::TickController;
use crate::{Coords, TermInt};

use rand::Rng;
use tracing::{info, trace};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    /// Waiting out the start delay
    Idle,
    Running,
    GameOver,
}

/// What the surrounding application should do once a session ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionExit {
    Continue,
    Closed,
}

/// Everything a renderer needs, by value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub width: TermInt,
    pub height: TermInt,
    pub head: Coords,
    pub body: Vec<Coords>,
    pub food: Vec<Coords>,
    pub direction: Direction,
    pub state: GameState,
    pub interval: Duration,
}

impl Snapshot {
    pub fn length(&self) -> usize {
        self.body.len() + 1
    }
}

/// One game, from the first frame until the snake bites itself.
pub struct GameSession {
    grid: Grid,
    snake: Snake,
    food: FoodManager,
    ticks: TickController,
    spawn_odds: u32,
    state: GameState,
    steps: u64,
}

impl GameSession {
    pub fn new(config: &Config, now: Instant) -> Self {
        let mut grid = Grid::new(config.width, config.height);
        let mut snake = Snake::new(config.start, config.initial_length, &mut grid);
        snake.set_direction(config.initial_direction);

        let food = FoodManager::new(config.food_capacity);

        info!(
            width = config.width,
            height = config.height,
            length = snake.len(),
            food_capacity = food.capacity(),
            "new session"
        );

        GameSession {
            grid,
            snake,
            food,
            ticks: TickController::new(config, now),
            spawn_odds: config.spawn_odds,
            state: GameState::Idle,
            steps: 0,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn set_direction(&mut self, direction: Direction) {
        if self.state != GameState::GameOver {
            self.snake.set_direction(direction);
        }
    }

    /// Runs every step that is due at `now` and returns the resulting state.
    pub fn update<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) -> GameState {
        if self.state == GameState::GameOver {
            return self.state;
        }

        if self.state == GameState::Idle && self.ticks.started(now) {
            self.state = GameState::Running;
        }

        while self.ticks.next_step(now) {
            if self.step(rng) == MoveResult::Collision {
                self.state = GameState::GameOver;
                break;
            }
            self.ticks.accelerate();
        }

        self.state
    }

    /// A single simulation step: food roll, then the snake.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> MoveResult {
        self.food.try_spawn(&mut self.grid, self.spawn_odds, rng);

        let result = self.snake.move_step(&mut self.grid);
        self.steps += 1;

        match result {
            MoveResult::Ate => {
                let head = self.snake.head();
                assert!(self.food.consume(head), "food cell at {:?} has no active slot", head);
                info!(x = head.0, y = head.1, length = self.snake.len(), "food eaten");
            }
            MoveResult::Collision => {
                info!(steps = self.steps, length = self.snake.len(), "snake hit itself");
            }
            MoveResult::Moved => trace!(head = ?self.snake.head(), "moved"),
        }

        debug_assert_eq!(self.grid.count(Cell::Head), 1);
        debug_assert_eq!(self.grid.count(Cell::Segment), self.snake.len() - 1);

        result
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            head: self.snake.head(),
            body: self.snake.body().iter().copied().collect(),
            food: self.food.active().collect(),
            direction: self.snake.get_direction(),
            state: self.state,
            interval: self.ticks.interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn no_food() -> Config {
        Config { spawn_odds: u32::MAX, ..Config::default() }
    }

    fn assert_in_sync(session: &GameSession) {
        let grid = &session.grid;
        assert_eq!(grid.count(Cell::Head), 1);
        assert_eq!(grid.count(Cell::Segment), session.snake.len() - 1);
        assert_eq!(grid.count(Cell::Food), session.food.active_count());
        for pos in session.food.active() {
            assert_eq!(grid.get(pos), Cell::Food);
        }
    }

    #[test]
    fn idle_until_the_delay_is_over() {
        let t0 = Instant::now();
        let mut rng = StdRng::seed_from_u64(0);
        let mut session = GameSession::new(&no_food(), t0);

        assert_eq!(session.update(t0 + ms(500), &mut rng), GameState::Idle);
        assert_eq!(session.snapshot().head, (12, 12));

        assert_eq!(session.update(t0 + ms(1000), &mut rng), GameState::Running);
        assert_eq!(session.snapshot().head, (11, 12));
        assert_eq!(session.steps(), 1);
    }

    #[test]
    fn twenty_steps_on_the_default_board() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut session = GameSession::new(&no_food(), Instant::now());

        for _ in 0..20 {
            assert_eq!(session.step(&mut rng), MoveResult::Moved);
            assert_in_sync(&session);
        }

        let snapshot = session.snapshot();
        assert_eq!(snapshot.head, (17, 12));
        assert_eq!(snapshot.length(), 5);
    }

    #[test]
    fn speed_ramps_with_every_step() {
        let t0 = Instant::now();
        let mut rng = StdRng::seed_from_u64(0);
        let mut session = GameSession::new(&no_food(), t0);

        // Delay step at 1000, then 1249 and 1497 as the interval shrinks
        session.update(t0 + ms(1740), &mut rng);
        assert_eq!(session.steps(), 3);
        assert_eq!(session.snapshot().interval, ms(247));
    }

    #[test]
    fn eating_frees_the_slot_and_grows() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut session = GameSession::new(&no_food(), Instant::now());
        session.food.place(&mut session.grid, (11, 12));

        assert_eq!(session.step(&mut rng), MoveResult::Ate);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.length(), 6);
        assert!(snapshot.food.is_empty());
        assert_eq!(snapshot.body.last(), Some(&(16, 12)));
        assert_in_sync(&session);
    }

    #[test]
    fn collision_ends_the_session() {
        let t0 = Instant::now();
        let mut rng = StdRng::seed_from_u64(0);
        let config = Config {
            width: 3,
            height: 3,
            start: (0, 1),
            initial_length: 3,
            ..no_food()
        };
        let mut session = GameSession::new(&config, t0);

        assert_eq!(session.update(t0 + ms(5000), &mut rng), GameState::GameOver);
        assert_eq!(session.steps(), 1);

        let before = session.snapshot();
        session.set_direction(Direction::Up);
        assert_eq!(session.update(t0 + ms(9000), &mut rng), GameState::GameOver);
        assert_eq!(session.state(), GameState::GameOver);
        assert_eq!(session.snapshot(), before);
        assert_eq!(before.direction, Direction::Left);
    }

    #[test]
    fn reversal_is_ignored() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut session = GameSession::new(&no_food(), Instant::now());

        session.set_direction(Direction::Right);
        assert_eq!(session.step(&mut rng), MoveResult::Moved);
        assert_eq!(session.snapshot().head, (11, 12));
    }

    #[test]
    fn long_random_walk_keeps_grid_and_snake_in_sync() {
        let mut rng = StdRng::seed_from_u64(2024);
        let config = Config {
            width: 12,
            height: 9,
            start: (3, 4),
            spawn_odds: 2,
            ..Config::default()
        };
        let mut session = GameSession::new(&config, Instant::now());
        let turns = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];

        for i in 0..2000 {
            if i % 7 == 0 {
                session.set_direction(turns[rng.gen_range(0..turns.len())]);
            }

            let before = session.snapshot();
            match session.step(&mut rng) {
                MoveResult::Collision => {
                    assert_eq!(session.snapshot().body, before.body);
                    assert_eq!(session.snapshot().head, before.head);
                    break;
                }
                MoveResult::Ate => {
                    let after = session.snapshot();
                    assert_eq!(after.length(), before.length() + 1);
                    assert_eq!(after.body.last(), before.body.last());
                }
                MoveResult::Moved => {
                    assert_eq!(session.snapshot().length(), before.length());
                }
            }
            assert_in_sync(&session);
            assert!(session.food.active_count() <= config.food_capacity);
        }
    }
}
