use crate::{Arena, ArenaError, CarConfig, CarControls, CarState, Result, Team};

impl Arena {
    #[must_use]
    pub fn num_cars(&self) -> usize {
        self.objects.cars.len()
    }

    /// Ids of every car, ascending
    #[must_use]
    pub fn get_cars(&self) -> Vec<u64> {
        self.objects.cars.iter().map(|car| car.id).collect()
    }

    pub fn get_car(&self, id: u64) -> Result<CarState> {
        self.objects.car(id).map(|car| *car.get_state())
    }

    pub fn get_car_config(&self, id: u64) -> Result<CarConfig> {
        self.objects.car(id).map(|car| *car.config())
    }

    pub fn get_car_team(&self, id: u64) -> Result<Team> {
        self.objects.car(id).map(|car| car.team)
    }

    /// Checks a state coming from outside the arena, returning the one to apply
    pub(crate) fn validate_car_state(&self, id: u64, state: &CarState) -> Result<CarState> {
        if !state.is_finite() {
            return Err(ArenaError::NonFinite("car state"));
        }

        let mut state = *state;
        state.phys.rot_mat = Self::fix_rotation(state.rot_mat, &format!("car {id}"))?;
        state.controls = state.controls.clamp();

        let max_boost = self.objects.mutator_config.car_max_boost_amount;
        if !(0.0..=max_boost).contains(&state.boost) {
            log::warn!("Boost {} of car {id} clamped to 0..={max_boost}", state.boost);
            state.boost = state.boost.clamp(0.0, max_boost);
        }

        Ok(state)
    }

    /// Overwrites the full state of a car
    pub fn set_car(&mut self, id: u64, state: CarState) -> Result<()> {
        let car_idx = self.objects.car_idx(id)?;
        let state = self.validate_car_state(id, &state)?;

        let car = &mut self.objects.cars[car_idx];
        car.set_state(&mut self.world.bodies_mut()[car.rigid_body_idx], &state);
        Ok(())
    }

    /// Controls are kept until they are replaced
    pub fn set_car_controls(&mut self, id: u64, controls: CarControls) -> Result<()> {
        let car_idx = self.objects.car_idx(id)?;
        if !controls.is_finite() {
            return Err(ArenaError::NonFinite("car controls"));
        }

        self.objects.cars[car_idx].set_controls(controls);
        Ok(())
    }

    /// Sets the controls of several cars, nothing is applied unless every entry is valid
    pub fn set_all_controls(&mut self, controls: &[(u64, CarControls)]) -> Result<()> {
        let mut resolved = Vec::with_capacity(controls.len());
        for &(id, car_controls) in controls {
            let car_idx = self.objects.car_idx(id)?;
            if !car_controls.is_finite() {
                return Err(ArenaError::NonFinite("car controls"));
            }

            resolved.push((car_idx, car_controls));
        }

        for (car_idx, car_controls) in resolved {
            self.objects.cars[car_idx].set_controls(car_controls);
        }

        Ok(())
    }
}
