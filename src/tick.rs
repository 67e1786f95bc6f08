use std::cmp::max;
use std::time::{Duration, Instant};

use crate::config::Config;

use tracing::debug;

/// Fixed-rate simulation clock, independent of how often frames are drawn.
///
/// Nothing steps until the start delay is over. From then on one step is
/// due every `interval`, and a frame that arrives late gets every step it
/// missed. The interval shrinks by `decrement` after each step and never
/// drops below `floor`.
pub struct TickController {
    session_start: Instant,
    start_delay: Duration,
    last_tick: Option<Instant>,
    interval: Duration,
    floor: Duration,
    decrement: Duration,
}

impl TickController {
    pub fn new(config: &Config, now: Instant) -> Self {
        TickController {
            session_start: now,
            start_delay: config.start_delay,
            last_tick: None,
            interval: config.initial_interval,
            floor: config.floor_interval,
            decrement: config.interval_decrement,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn started(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.session_start) >= self.start_delay
    }

    /// Returns true when one more step is due at `now`. Call it in a loop
    /// until it returns false to catch up on missed steps.
    pub fn next_step(&mut self, now: Instant) -> bool {
        let last = match self.last_tick {
            Some(last) => last,
            None => {
                if !self.started(now) {
                    return false;
                }
                // First step fires the moment the delay is over
                self.last_tick = Some(self.session_start + self.start_delay);
                return true;
            }
        };

        if now.saturating_duration_since(last) >= self.interval {
            self.last_tick = Some(last + self.interval);
            true
        } else {
            false
        }
    }

    pub fn accelerate(&mut self) {
        if self.interval == self.floor {
            return;
        }

        self.interval = max(self.floor, self.interval.saturating_sub(self.decrement));
        if self.interval == self.floor {
            debug!(interval_ms = self.interval.as_millis() as u64, "speed ramp reached its floor");
        }
    }
}

/// Counts rendered frames over one-second windows.
pub struct FrameCounter {
    window_start: Instant,
    frames: u32,
    fps: u32,
}

impl FrameCounter {
    pub fn new(now: Instant) -> Self {
        FrameCounter { window_start: now, frames: 0, fps: 0 }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Records a frame, returning the new rate whenever a window closes.
    pub fn frame(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;

        if now.saturating_duration_since(self.window_start) >= Duration::from_secs(1) {
            self.fps = self.frames;
            self.frames = 0;
            self.window_start = now;
            Some(self.fps)
        } else {
            None
        }
    }
}
