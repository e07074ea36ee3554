use crate::{
    interfaces::{
        AttitudeSource, Clock, InertialNav, ProximityConsumer, RangefinderDriver,
        TerrainOffsetConsumer,
    },
    params::RangefinderParams,
    rangefinder::{Orientation, RangefinderReading, RangefinderState},
    utils::tilt_correction_factor,
};

/// Runs the downward and upward rangefinders once per control cycle.
///
/// Call order within a cycle: [`RangefinderFusion::read`], then
/// [`RangefinderFusion::update_terrain_offset`], then let consumers query.
pub struct RangefinderFusion<D, A, N, C> {
    driver: D,
    ahrs: A,
    inertial_nav: N,
    clock: C,
    params: RangefinderParams,
    down: RangefinderState,
    up: RangefinderState,
}

impl<D, A, N, C> RangefinderFusion<D, A, N, C>
where
    D: RangefinderDriver,
    A: AttitudeSource,
    N: InertialNav,
    C: Clock,
{
    pub fn new(driver: D, ahrs: A, inertial_nav: N, clock: C, params: RangefinderParams) -> Self {
        let (down_present, up_present) = if params.enabled {
            (
                driver.has_orientation(Orientation::Down),
                driver.has_orientation(Orientation::Up),
            )
        } else {
            log_info!("rangefinder support disabled by configuration");
            (false, false)
        };
        log_info!("rangefinders: downward={}, upward={}", down_present, up_present);

        Self {
            down: RangefinderState::new(Orientation::Down, down_present, params.filter_cutoff_hz),
            up: RangefinderState::new(Orientation::Up, up_present, params.filter_cutoff_hz),
            driver,
            ahrs,
            inertial_nav,
            clock,
            params,
        }
    }

    /// Pull this cycle's ranges and fold them into both orientations. The
    /// downward altitude is forwarded to `proximity` when one is supplied.
    /// Consumers are lent per cycle rather than held by the orchestrator.
    pub fn read(&mut self, mut proximity: Option<&mut dyn ProximityConsumer>) {
        if !self.params.enabled {
            self.down.set_disabled();
            self.up.set_disabled();
            return;
        }

        self.driver.update();

        let tilt_factor = tilt_correction_factor(self.ahrs.tilt_cos(), &self.params);
        let inertial_alt_cm = self.inertial_nav.position_z_up_cm();
        let now_ms = self.clock.now_ms();

        for state in [&mut self.down, &mut self.up] {
            let orientation = state.orientation();
            let reading = RangefinderReading::from_driver(&self.driver, orientation);
            let outcome =
                state.update(&reading, inertial_alt_cm, tilt_factor, now_ms, &self.params);

            if orientation == Orientation::Down && (state.alt_healthy() || outcome.timed_out) {
                if let Some(proximity) = proximity.as_deref_mut() {
                    proximity.set_rangefinder_alt(
                        state.enabled(),
                        state.alt_healthy(),
                        state.alt_cm_filt(),
                    );
                }
            }
        }
    }

    /// Smooth both terrain offsets by `dt_s` and publish the downward one to
    /// navigation. `circle_nav` only treats the rangefinder as enabled while
    /// `wp_nav` is using it. Both consumers are lent for this call only.
    pub fn update_terrain_offset(
        &mut self,
        dt_s: f32,
        wp_nav: &mut dyn TerrainOffsetConsumer,
        circle_nav: Option<&mut dyn TerrainOffsetConsumer>,
    ) {
        let time_constant_s = self.params.terrain_time_constant_s;
        self.down.update_terrain_offset(dt_s, time_constant_s);
        self.up.update_terrain_offset(dt_s, time_constant_s);

        let now_ms = self.clock.now_ms();
        if !self.down.terrain_offset_publishable(now_ms, self.params.timeout_ms) {
            return;
        }

        let enabled = self.down.enabled();
        let healthy = self.down.alt_healthy();
        let offset_cm = self.down.terrain_offset_cm();
        wp_nav.set_rangefinder_terrain_offset(enabled, healthy, offset_cm);
        if let Some(circle_nav) = circle_nav {
            circle_nav.set_rangefinder_terrain_offset(
                enabled && wp_nav.rangefinder_used(),
                healthy,
                offset_cm,
            );
        }
    }

    pub fn rangefinder_alt_ok(&self) -> bool {
        self.down.is_usable()
    }

    pub fn rangefinder_up_ok(&self) -> bool {
        self.up.is_usable()
    }

    /// Downward height above ground, interpolated with the inertial altitude
    /// change since the last reading.
    pub fn height_interpolated_cm(&self) -> Option<i32> {
        self.down.height_interpolated_cm(self.inertial_nav.position_z_up_cm())
    }

    pub fn state(&self, orientation: Orientation) -> &RangefinderState {
        match orientation {
            Orientation::Down => &self.down,
            Orientation::Up => &self.up,
        }
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn inertial_nav_mut(&mut self) -> &mut N {
        &mut self.inertial_nav
    }

    pub fn ahrs_mut(&mut self) -> &mut A {
        &mut self.ahrs
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
