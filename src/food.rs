use crate::grid::{Cell, Grid};
use crate::Coords;

use rand::Rng;
use tracing::debug;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct FoodSlot {
    pos: Coords,
    active: bool,
}

/// Fixed pool of food slots that are switched on and off rather than
/// allocated per spawn.
pub struct FoodManager {
    slots: Vec<FoodSlot>,
}

impl FoodManager {
    pub fn new(capacity: usize) -> Self {
        let slots = vec![FoodSlot { pos: (0, 0), active: false }; capacity];
        FoodManager { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active(&self) -> impl Iterator<Item = Coords> + '_ {
        self.slots.iter().filter(|s| s.active).map(|s| s.pos)
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Spawns one food with probability `1 / probability` on a random empty
    /// cell. Gives up quietly when every slot is in use or no empty cell turns
    /// up within `width * height` picks.
    pub fn try_spawn<R: Rng + ?Sized>(
        &mut self,
        grid: &mut Grid,
        probability: u32,
        rng: &mut R,
    ) -> Option<Coords> {
        let slot = self.slots.iter_mut().find(|s| !s.active)?;

        if rng.gen_range(0..probability.max(1)) != 0 {
            return None;
        }

        for _ in 0..grid.area() {
            let pos = (rng.gen_range(0..grid.width()), rng.gen_range(0..grid.height()));

            if grid.get(pos) == Cell::Empty {
                grid.set(pos, Cell::Food);
                *slot = FoodSlot { pos, active: true };
                debug!(x = pos.0, y = pos.1, "food spawned");
                return Some(pos);
            }
        }

        debug!(attempts = grid.area(), "no empty cell found for food");
        None
    }

    #[cfg(test)]
    pub fn place(&mut self, grid: &mut Grid, pos: Coords) {
        let slot = self.slots.iter_mut().find(|s| !s.active).expect("no free food slot");
        *slot = FoodSlot { pos, active: true };
        grid.set(pos, Cell::Food);
    }

    /// Frees the slot holding `pos`. The grid cell is the caller's business,
    /// it has normally been overwritten by the snake's head already.
    pub fn consume(&mut self, pos: Coords) -> bool {
        match self.slots.iter_mut().find(|s| s.active && s.pos == pos) {
            Some(slot) => {
                slot.active = false;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn certain_spawn_lands_on_an_empty_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = Grid::new(10, 10);
        grid.set((0, 0), Cell::Head);
        let mut food = FoodManager::new(2);

        let pos = food.try_spawn(&mut grid, 1, &mut rng).unwrap();

        assert_ne!(pos, (0, 0));
        assert_eq!(grid.get(pos), Cell::Food);
        assert_eq!(food.active().collect::<Vec<_>>(), vec![pos]);
    }

    #[test]
    fn full_pool_is_a_no_op() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = Grid::new(25, 25);
        let mut food = FoodManager::new(2);

        assert!(food.try_spawn(&mut grid, 1, &mut rng).is_some());
        assert!(food.try_spawn(&mut grid, 1, &mut rng).is_some());
        assert_eq!(food.try_spawn(&mut grid, 1, &mut rng), None);

        assert_eq!(food.active_count(), 2);
        assert_eq!(grid.count(Cell::Food), 2);
    }

    #[test]
    fn full_board_starves_silently() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = Grid::new(4, 4);
        for x in 0..4 {
            for y in 0..4 {
                grid.set((x, y), Cell::Segment);
            }
        }
        let mut food = FoodManager::new(2);

        assert_eq!(food.try_spawn(&mut grid, 1, &mut rng), None);
        assert_eq!(food.active_count(), 0);
        assert_eq!(grid.count(Cell::Food), 0);
    }

    #[test]
    fn spawn_rate_follows_the_denominator() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut grid = Grid::new(200, 200);
        let mut food = FoodManager::new(5000);

        let spawned = (0..5000)
            .filter(|_| food.try_spawn(&mut grid, 10, &mut rng).is_some())
            .count();

        assert!((350..650).contains(&spawned), "spawned {}", spawned);
        assert_eq!(food.active_count(), spawned);
    }

    #[test]
    fn consume_frees_the_slot_for_reuse() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut grid = Grid::new(6, 6);
        let mut food = FoodManager::new(1);

        let pos = food.try_spawn(&mut grid, 1, &mut rng).unwrap();
        assert_eq!(food.try_spawn(&mut grid, 1, &mut rng), None);

        grid.set(pos, Cell::Head);
        assert!(food.consume(pos));
        assert!(!food.consume(pos));
        assert_eq!(food.active_count(), 0);

        assert!(food.try_spawn(&mut grid, 1, &mut rng).is_some());
        assert_eq!(food.capacity(), 1);
    }
}
