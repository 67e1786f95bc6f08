use crate::{Coords, TermInt};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Head,
    Segment,
    Food,
}

/// Authoritative cell map of the board. The snake and the food pool write
/// into it, but neither owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: TermInt,
    height: TermInt,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: TermInt, height: TermInt) -> Self {
        assert!(width > 0 && height > 0, "grid must have at least one cell");
        let cells = vec![Cell::Empty; width as usize * height as usize];
        Grid { width, height, cells }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, pos: Coords) -> Cell {
        self.cells[self.index(pos)]
    }

    pub fn set(&mut self, pos: Coords, cell: Cell) {
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }

    /// Maps an unbounded coordinate back onto the torus, per axis.
    pub fn wrap(&self, x: i32, y: i32) -> Coords {
        (
            x.rem_euclid(self.width as i32) as TermInt,
            y.rem_euclid(self.height as i32) as TermInt,
        )
    }

    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|c| **c == cell).count()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: Coords) -> usize {
        assert!(
            pos.0 < self.width && pos.1 < self.height,
            "position {:?} outside {}x{} grid",
            pos,
            self.width,
            self.height
        );
        self.width as usize * pos.1 as usize + pos.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_empty() {
        let grid = Grid::new(7, 3);
        assert_eq!(grid.area(), 21);
        assert_eq!(grid.count(Cell::Empty), 21);
    }

    #[test]
    fn set_then_get() {
        let mut grid = Grid::new(4, 4);
        grid.set((3, 1), Cell::Food);
        assert_eq!(grid.get((3, 1)), Cell::Food);
        assert_eq!(grid.get((1, 3)), Cell::Empty);
    }

    #[test]
    fn wrap_handles_both_axes_at_once() {
        let grid = Grid::new(25, 20);
        assert_eq!(grid.wrap(-1, -1), (24, 19));
        assert_eq!(grid.wrap(25, 20), (0, 0));
        assert_eq!(grid.wrap(12 - 20, 12), (17, 12));
        assert_eq!(grid.wrap(-51, 47), (24, 7));
    }

    #[test]
    fn wrap_is_idempotent_and_in_range() {
        let grid = Grid::new(9, 5);
        for x in -30..30 {
            for y in -30..30 {
                let once = grid.wrap(x, y);
                assert!(once.0 < 9 && once.1 < 5);
                assert_eq!(grid.wrap(once.0 as i32, once.1 as i32), once);
            }
        }
    }

    #[test]
    #[should_panic]
    fn out_of_range_access_panics() {
        let grid = Grid::new(4, 4);
        grid.get((4, 0));
    }
}
