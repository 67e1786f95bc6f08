use std::{thread::sleep, time::{Duration, Instant}};

use crate::config::Config;
use crate::grid::Cell;
use crate::session::{GameSession, GameState, SessionExit, Snapshot};
use crate::snake::Direction::{self, *};
use crate::term::{Glyph, TermManager};
use crate::tick::FrameCounter;
use crate::{Coords, TermInt};

use anyhow::{bail, Context};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;
use rand::{rngs::StdRng, Rng};
use tracing::{debug, info};

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHARS: [char; 2] = ['(', ')'];

const HEAD_COLOR: Color = Color::White;
const FOOD_COLOR: Color = Color::Red;
const BORDER_COLOR: Color = Color::DarkGrey;

/// Terminal columns per grid cell, so cells come out roughly square
const CELL_COLS: TermInt = 2;

pub struct SnakeGame {
    config: Config,
    term: TermManager,
    rng: StdRng,
    frames: FrameCounter,
}

impl SnakeGame {
    pub fn new(config: Config, rng: StdRng) -> anyhow::Result<Self> {
        let term = TermManager::new().context("Error reading terminal size")?;
        Ok(SnakeGame { config, term, rng, frames: FrameCounter::new(Instant::now()) })
    }

    pub fn initialize(&mut self) -> anyhow::Result<()> {
        let (w, h) = self.term.get_terminal_size();
        let (need_w, need_h) = required_size(&self.config);

        if w < need_w || h < need_h {
            bail!(
                "terminal is {}x{} but a {}x{} grid needs {}x{}",
                w,
                h,
                self.config.width,
                self.config.height,
                need_w,
                need_h
            );
        }

        self.term.setup().context("Error setting up the terminal")?;
        Ok(())
    }

    /// Plays one session to the end.
    pub fn play(&mut self) -> anyhow::Result<SessionExit> {
        let mut session = GameSession::new(&self.config, Instant::now());
        let body_color = random_body_color(&mut self.rng);

        loop {
            let frame_start = Instant::now();
            let events = self.term.read_events_queue()?;

            for ev in &events {
                match ev {
                    Event::Key(key_ev) if is_quit(key_ev) => return Ok(SessionExit::Closed),
                    Event::Resize(w, h) => self.term.resize(*w, *h)?,
                    _ => {}
                }
            }

            if let Some(dir) = frame_intent(&events) {
                session.set_direction(dir);
            }

            let state = session.update(Instant::now(), &mut self.rng);

            let snapshot = session.snapshot();
            self.render(&snapshot, body_color)?;

            if state == GameState::GameOver {
                info!(length = snapshot.length(), steps = session.steps(), "game over, restarting");
                return Ok(SessionExit::Continue);
            }

            if let Some(fps) = self.frames.frame(Instant::now()) {
                debug!(fps, "frame rate");
            }

            if let Some(budget) = frame_budget(self.config.max_fps) {
                let elapsed = frame_start.elapsed();
                if elapsed < budget {
                    sleep(budget - elapsed);
                }
            }
        }
    }

    pub fn shutdown(&mut self) -> anyhow::Result<()> {
        self.term.restore().context("Error restoring the terminal")?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn render(&mut self, snapshot: &Snapshot, body_color: Color) -> anyhow::Result<()> {
        let origin = board_origin(self.term.get_terminal_size(), snapshot);

        self.term.clear_buffer();
        let board_size = (snapshot.width * CELL_COLS, snapshot.height);
        self.term.draw_borders(origin, board_size, BORDER_COLOR);

        let cells = snapshot.food.iter().map(|pos| (*pos, Cell::Food))
            .chain(snapshot.body.iter().map(|pos| (*pos, Cell::Segment)))
            .chain(std::iter::once((snapshot.head, Cell::Head)));

        for (pos, cell) in cells {
            let screen_pos = (origin.0 + pos.0 * CELL_COLS, origin.1 + pos.1);
            for (i, glyph) in cell_glyphs(cell, snapshot.direction, body_color).iter().enumerate() {
                self.term.print_at((screen_pos.0 + i as TermInt, screen_pos.1), *glyph);
            }
        }

        let status = format!(
            "Length: {}  Step: {} ms  FPS: {}",
            snapshot.length(),
            snapshot.interval.as_millis(),
            self.frames.fps()
        );
        self.term.print_str((origin.0, origin.1 + snapshot.height + 1), &status, None);

        if snapshot.state == GameState::Idle {
            self.term.show_message(&[
                "Get ready!",
                "",
                "Arrow keys or WASD to move",
                "Esc or CTRL+C to quit",
            ]);
        }

        self.term.flush()?;
        Ok(())
    }
}

/// Maps a cell of the board to the terminal columns that show it.
fn cell_glyphs(cell: Cell, heading: Direction, body_color: Color) -> [Glyph; CELL_COLS as usize] {
    match cell {
        Cell::Empty => [Glyph::BLANK; 2],
        Cell::Head => [Glyph::colored(head_char(heading), HEAD_COLOR); 2],
        Cell::Segment => [Glyph::colored(SNAKE_BODY_CHAR, body_color); 2],
        Cell::Food => [
            Glyph::colored(FOOD_CHARS[0], FOOD_COLOR),
            Glyph::colored(FOOD_CHARS[1], FOOD_COLOR),
        ],
    }
}

fn head_char(heading: Direction) -> char {
    match heading {
        Up => '^',
        Down => 'v',
        Left => '<',
        Right => '>',
        Stopped => '@',
    }
}

/// A fresh colour per session; the lowest channel values are skipped so the
/// body stays visible on dark terminals.
fn random_body_color(rng: &mut StdRng) -> Color {
    Color::Rgb {
        r: rng.gen_range(64..=255),
        g: rng.gen_range(64..=255),
        b: rng.gen_range(64..=255),
    }
}

fn required_size(config: &Config) -> Coords {
    // Borders on every side, plus the status line
    (config.width.saturating_mul(CELL_COLS).saturating_add(2), config.height.saturating_add(3))
}

/// First inner cell of the board, centred in the terminal.
fn board_origin(term_size: Coords, snapshot: &Snapshot) -> Coords {
    let board_w = snapshot.width * CELL_COLS + 2;
    let board_h = snapshot.height + 3;
    (
        term_size.0.saturating_sub(board_w) / 2 + 1,
        term_size.1.saturating_sub(board_h) / 2 + 1,
    )
}

fn frame_budget(max_fps: u32) -> Option<Duration> {
    if max_fps == 0 {
        None
    } else {
        Some(Duration::from_secs(1) / max_fps)
    }
}

fn key_direction(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Char('w') | KeyCode::Up => Some(Up),
        KeyCode::Char('a') | KeyCode::Left => Some(Left),
        KeyCode::Char('s') | KeyCode::Down => Some(Down),
        KeyCode::Char('d') | KeyCode::Right => Some(Right),
        _ => None,
    }
}

/// Direction to apply this frame. Only the last directional key counts.
fn frame_intent(events: &[Event]) -> Option<Direction> {
    events
        .iter()
        .filter_map(|ev| match ev {
            Event::Key(KeyEvent { code, .. }) => key_direction(*code),
            _ => None,
        })
        .last()
}

fn is_quit(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
        || matches!(ev.code, KeyCode::Esc | KeyCode::Char('q'))
}
