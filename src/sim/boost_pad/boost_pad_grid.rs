use glam::{USizeVec2, Vec2};

use crate::{
    BoostPad, BoostPadConfig, Car, CarState, MutatorConfig, consts::boost_pads, math::Vec3,
};

#[derive(Debug, Clone, Default)]
struct GridCell {
    pub pad_indices: Vec<usize>,
}

/// All boost pads of an arena, bucketed into a coarse 2D grid so a car only
/// tests the few pads near it
#[derive(Debug, Clone)]
pub(crate) struct BoostPadGrid {
    cells: Box<[GridCell; BoostPadGrid::CELL_AMOUNT]>,
    all_pads: Vec<BoostPad>,
    max_pad_z: f32,
    /// Some pad sticks out of the grid, every car tests every pad
    linear_scan: bool,
    /// (pad index, car order) pairs, reused between ticks
    candidates: Vec<(usize, usize)>,
}

impl BoostPadGrid {
    const GRID_EXTENT: Vec2 = Vec2::new(4096.0, 5120.0);
    const GRID_SIZE: Vec2 = Vec2::new(Self::GRID_EXTENT.x * 2.0, Self::GRID_EXTENT.y * 2.0);
    const CELL_COUNTS: USizeVec2 = USizeVec2::new(8, 10);
    const CELL_AMOUNT: usize = Self::CELL_COUNTS.x * Self::CELL_COUNTS.y;
    const CELL_SIZE: Vec2 = Vec2::new(
        Self::GRID_SIZE.x / Self::CELL_COUNTS.x as f32,
        Self::GRID_SIZE.y / Self::CELL_COUNTS.y as f32,
    );

    #[must_use]
    pub fn new(pad_configs: &[BoostPadConfig]) -> Self {
        const BOOST_PAD_MAX_RAD: f32 = boost_pads::CYL_RAD_BIG.max(boost_pads::CYL_RAD_SMALL);

        let mut cells: Box<[GridCell; Self::CELL_AMOUNT]> =
            Box::new(std::array::from_fn(|_| GridCell::default()));
        let mut all_pads = Vec::with_capacity(pad_configs.len());
        let mut linear_scan = false;

        for (pad_idx, pad_config) in pad_configs.iter().enumerate() {
            all_pads.push(BoostPad::new(*pad_config));

            let pad_pos_2d = pad_config.pos.truncate();
            let (pad_aabb_min, pad_aabb_max) = (
                pad_pos_2d - BOOST_PAD_MAX_RAD,
                pad_pos_2d + BOOST_PAD_MAX_RAD,
            );

            if pad_aabb_min.cmplt(-Self::GRID_EXTENT).any()
                || pad_aabb_max.cmpgt(Self::GRID_EXTENT).any()
            {
                log::debug!(
                    "Boost pad at {} reaches outside of the pad grid, using a linear scan",
                    pad_config.pos
                );
                linear_scan = true;
            }

            for (cell_idx, cell) in cells.iter_mut().enumerate() {
                let (cell_aabb_min, cell_aabb_max) = Self::calc_cell_aabb_2d(cell_idx);
                if pad_aabb_min.cmple(cell_aabb_max).all()
                    && pad_aabb_max.cmpge(cell_aabb_min).all()
                {
                    cell.pad_indices.push(pad_idx);
                }
            }
        }

        let max_pad_z = pad_configs
            .iter()
            .map(|config| config.pos.z)
            .fold(f32::NEG_INFINITY, f32::max);

        Self {
            cells,
            all_pads,
            max_pad_z,
            linear_scan,
            candidates: Vec::new(),
        }
    }

    fn calc_cell_idx(pos: Vec3) -> Option<usize> {
        let pos_2d = pos.truncate();
        let idx_2d = ((pos_2d + Self::GRID_EXTENT) / Self::CELL_SIZE).floor();
        if idx_2d.x < 0.0 || idx_2d.y < 0.0 {
            return None;
        }

        let idx_2d_u = idx_2d.as_usizevec2();
        if idx_2d_u.x >= Self::CELL_COUNTS.x || idx_2d_u.y >= Self::CELL_COUNTS.y {
            return None;
        }

        Some(idx_2d_u.x + (idx_2d_u.y * Self::CELL_COUNTS.x))
    }

    fn calc_cell_aabb_2d(cell_idx: usize) -> (Vec2, Vec2) {
        let idx_2d = USizeVec2::new(
            cell_idx % Self::CELL_COUNTS.x,
            cell_idx / Self::CELL_COUNTS.x,
        );
        let offset = idx_2d.as_vec2() * Self::CELL_SIZE;
        let start_pos_2d = offset - Self::GRID_EXTENT;
        (start_pos_2d, start_pos_2d + Self::CELL_SIZE)
    }

    #[must_use]
    pub fn pads(&self) -> &[BoostPad] {
        &self.all_pads
    }

    #[must_use]
    pub fn pads_mut(&mut self) -> &mut [BoostPad] {
        &mut self.all_pads
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.all_pads.len()
    }

    pub fn reset(&mut self) {
        for pad in &mut self.all_pads {
            pad.state = crate::BoostPadState::DEFAULT;
        }
    }

    pub fn update_cooldowns(&mut self, tick_time: f32) {
        for pad in &mut self.all_pads {
            pad.update_cooldown(tick_time);
        }
    }

    /// Pickups for one tick.
    ///
    /// Every active pad goes to the first eligible car in ascending id order,
    /// `cars` must already be sorted that way.
    pub fn give_boost(&mut self, cars: &mut [Car], mutator_config: &MutatorConfig) {
        let mut candidates = std::mem::take(&mut self.candidates);
        candidates.clear();

        for (car_order, car) in cars.iter().enumerate() {
            self.collect_candidates(car_order, &car.state, mutator_config, &mut candidates);
        }

        // pad index first, then car order
        candidates.sort_unstable();

        for &(pad_idx, car_order) in &candidates {
            let pad = &mut self.all_pads[pad_idx];
            let car = &mut cars[car_order];
            if !pad.is_available() || car.state.boost >= mutator_config.car_max_boost_amount {
                continue;
            }

            car.state.boost = pad.pick_up(car.id, car.state.boost, mutator_config);
            log::trace!("Car {} picked up boost pad {pad_idx}", car.id);
        }

        self.candidates = candidates;
    }

    fn collect_candidates(
        &self,
        car_order: usize,
        car_state: &CarState,
        mutator_config: &MutatorConfig,
        out: &mut Vec<(usize, usize)>,
    ) {
        if car_state.is_demoed || car_state.boost >= mutator_config.car_max_boost_amount {
            return;
        }

        if car_state.pos.z > self.max_pad_z + boost_pads::CYL_HEIGHT {
            // Can't possibly overlap with a boost pad
            return;
        }

        let cell_idx = if self.linear_scan {
            None
        } else {
            Self::calc_cell_idx(car_state.pos)
        };

        let mut push_if_overlapping = |pad_idx: usize| {
            let pad = &self.all_pads[pad_idx];
            if pad.is_available() && pad.is_overlapping(car_state.pos) {
                out.push((pad_idx, car_order));
            }
        };

        match cell_idx {
            Some(cell_idx) => self.cells[cell_idx]
                .pad_indices
                .iter()
                .copied()
                .for_each(&mut push_if_overlapping),
            None => (0..self.all_pads.len()).for_each(push_if_overlapping),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CarConfig, GameMode, Team, consts, physics::PhysicsWorld};

    fn soccar_grid() -> BoostPadGrid {
        let configs = consts::boost_pads::get_locations(GameMode::Soccar)
            .into_iter()
            .map(|(pos, is_big)| BoostPadConfig::new(pos, is_big))
            .collect::<Vec<_>>();
        BoostPadGrid::new(&configs)
    }

    #[test]
    fn soccar_pads_fit_the_grid() {
        let grid = soccar_grid();
        assert_eq!(grid.len(), 34);
        assert!(!grid.linear_scan);
        assert_eq!(grid.max_pad_z, 73.0);
    }

    #[test]
    fn every_pad_is_reachable_from_its_own_cell() {
        let grid = soccar_grid();
        for (idx, pad) in grid.pads().iter().enumerate() {
            let cell_idx = BoostPadGrid::calc_cell_idx(pad.config.pos).unwrap();
            assert!(grid.cells[cell_idx].pad_indices.contains(&idx));
        }
    }

    #[test]
    fn cell_index_bounds() {
        assert_eq!(BoostPadGrid::calc_cell_idx(Vec3::new(-4096.0, -5120.0, 0.0)), Some(0));
        assert_eq!(BoostPadGrid::calc_cell_idx(Vec3::new(4095.0, 5119.0, 0.0)), Some(79));
        assert_eq!(BoostPadGrid::calc_cell_idx(Vec3::new(0.0, 5300.0, 0.0)), None);
        assert_eq!(BoostPadGrid::calc_cell_idx(Vec3::new(-4100.0, 0.0, 0.0)), None);
    }

    fn make_cars(world: &mut PhysicsWorld, positions: &[Vec3], boost: f32) -> Vec<Car> {
        let mutator_config = MutatorConfig::default();
        positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| {
                let mut car = Car::new(
                    i as u64 + 1,
                    Team::Blue,
                    world,
                    &mutator_config,
                    CarConfig::OCTANE,
                );
                car.state.pos = pos;
                car.state.boost = boost;
                car
            })
            .collect()
    }

    #[test]
    fn pad_outside_grid_falls_back_to_scan() {
        let configs = [BoostPadConfig::new(Vec3::new(0.0, 6000.0, 70.0), false)];
        let mut grid = BoostPadGrid::new(&configs);
        assert!(grid.linear_scan);

        let mut world = PhysicsWorld::new(GameMode::TheVoid, Vec3::ZERO);
        let mut cars = make_cars(&mut world, &[Vec3::new(0.0, 6000.0, 17.0)], 0.0);

        grid.give_boost(&mut cars, &MutatorConfig::default());
        assert_eq!(cars[0].state.boost, 12.0);
        assert_eq!(grid.pads()[0].state.cur_locked_car_id, 1);
    }

    #[test]
    fn lowest_id_wins_a_shared_pad() {
        let mut grid = soccar_grid();
        let mut world = PhysicsWorld::new(GameMode::TheVoid, Vec3::ZERO);
        let pad_pos = Vec3::new(-3584.0, 0.0, 17.0);
        let mut cars = make_cars(&mut world, &[pad_pos, pad_pos + Vec3::X * 10.0], 20.0);

        grid.give_boost(&mut cars, &MutatorConfig::default());
        assert_eq!(cars[0].state.boost, 100.0);
        assert_eq!(cars[1].state.boost, 20.0);
        assert_eq!(grid.pads()[0].state.cur_locked_car_id, 1);
        assert!(!grid.pads()[0].state.is_active);
    }

    #[test]
    fn full_car_takes_nothing() {
        let mut grid = soccar_grid();
        let mut world = PhysicsWorld::new(GameMode::TheVoid, Vec3::ZERO);
        let mut cars = make_cars(&mut world, &[Vec3::new(-3584.0, 0.0, 17.0)], 100.0);

        grid.give_boost(&mut cars, &MutatorConfig::default());
        assert!(grid.pads()[0].state.is_active);
    }
}
