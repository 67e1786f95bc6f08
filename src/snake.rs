use std::collections::VecDeque;

use crate::grid::{Cell, Grid};
use crate::{Coords, TermInt};
use Direction::*;
use MoveResult::*;

use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Stopped,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
            Stopped => (0, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
            Stopped => Stopped,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved,
    Ate,
    Collision,
}

pub struct Snake {
    head: Coords,
    // Index 0 is the segment right behind the head
    body: VecDeque<Coords>,
    direction: Direction,
}

impl Snake {
    /// Places the head at `pos` and lays the rest of the body out towards +x.
    /// A body that would run past the right edge is cut short instead of
    /// wrapping around.
    pub fn new(pos: Coords, size: usize, grid: &mut Grid) -> Self {
        grid.set(pos, Cell::Head);

        let body: VecDeque<Coords> = (1..size.max(1))
            .map(|i| pos.0 as usize + i)
            .take_while(|x| *x < grid.width() as usize)
            .map(|x| (x as TermInt, pos.1))
            .collect();

        for seg in &body {
            grid.set(*seg, Cell::Segment);
        }

        if body.len() + 1 < size {
            debug!(
                requested = size,
                placed = body.len() + 1,
                "initial snake clamped to grid edge"
            );
        }

        Snake { head: pos, body, direction: Stopped }
    }

    pub fn head(&self) -> Coords {
        self.head
    }

    pub fn body(&self) -> &VecDeque<Coords> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len() + 1
    }

    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, new_direction: Direction) {
        if new_direction != self.direction.opposite() {
            self.direction = new_direction;
        }
    }

    pub fn move_step(&mut self, grid: &mut Grid) -> MoveResult {
        let (dx, dy) = self.direction.delta();
        let new_head = grid.wrap(self.head.0 as i32 + dx, self.head.1 as i32 + dy);

        match grid.get(new_head) {
            Cell::Segment => Collision,
            Cell::Food => {
                self.shift(new_head, true, grid);
                Ate
            }
            Cell::Empty => {
                self.shift(new_head, false, grid);
                Moved
            }
            // Standing still, or a one-cell-wide axis
            Cell::Head => Moved,
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn shift(&mut self, new_head: Coords, grow: bool, grid: &mut Grid) {
        let old_head = self.head;

        if self.body.is_empty() && !grow {
            grid.set(old_head, Cell::Empty);
        } else {
            // The old head becomes the first segment; everything behind it keeps
            // its position except the tail, which is either dropped or kept as
            // the new segment when growing.
            self.body.push_front(old_head);
            grid.set(old_head, Cell::Segment);

            if !grow {
                if let Some(old_tail) = self.body.pop_back() {
                    grid.set(old_tail, Cell::Empty);
                }
            }
        }

        self.head = new_head;
        grid.set(new_head, Cell::Head);
    }
}
