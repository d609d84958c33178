use crate::core::material_properties::MaterialProperties;
use crate::core::pipework::PipeGeometry;
use crate::core::solar_panel::PanelState;
use crate::input::FluidInput;

/// Temperature of a perfectly and instantaneously mixed body of fluid, in deg C
///
/// Arguments:
/// * `incoming_mass` - mass of fluid entering, in kg
/// * `incoming_temp` - temperature of the fluid entering, in deg C
/// * `resident_mass` - mass of fluid already present, in kg
/// * `resident_temp` - temperature of the fluid already present, in deg C
pub fn perfect_mixing_temperature(
    incoming_mass: f64,
    incoming_temp: f64,
    resident_mass: f64,
    resident_temp: f64,
) -> f64 {
    (incoming_mass * incoming_temp + resident_mass * resident_temp)
        / (incoming_mass + resident_mass)
}

/// The fluid circulating between the panel and the storage tank.
///
/// Pipe geometry is copied from the panel when the loop is created and is not kept in sync
/// with it afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidLoopState {
    panel_outlet_temperature: f64, // = tank inlet, in deg C
    tank_outlet_temperature: f64,  // = panel inlet, in deg C
    contents: MaterialProperties,
    velocity: f64,                  // in m/s
    heat_transfer_coefficient: f64, // fluid-pipe, in W/(m2.K)
    tank_volume: f64,               // in m3
    alpha: f64,                     // decay constant along the pipe, in 1/m
    pipe: PipeGeometry,
}

impl FluidLoopState {
    /// Arguments:
    /// * `input` - fluid properties, tank volume and starting temperatures
    /// * `panel` - the panel the fluid runs through, whose pipe geometry is copied
    pub fn new(input: &FluidInput, panel: &PanelState) -> Self {
        let pipe = panel.pipe();
        let alpha = (4. * input.heat_transfer_coefficient)
            / (input.specific_heat_capacity * input.density * input.velocity * pipe.diameter());

        Self {
            panel_outlet_temperature: input.initial_panel_outlet_temperature,
            tank_outlet_temperature: input.initial_tank_outlet_temperature,
            contents: MaterialProperties::new(input.density, input.specific_heat_capacity),
            velocity: input.velocity,
            heat_transfer_coefficient: input.heat_transfer_coefficient,
            tank_volume: input.tank_volume,
            alpha,
            pipe,
        }
    }

    pub fn panel_outlet_temperature(&self) -> f64 {
        self.panel_outlet_temperature
    }

    pub fn tank_outlet_temperature(&self) -> f64 {
        self.tank_outlet_temperature
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn heat_transfer_coefficient(&self) -> f64 {
        self.heat_transfer_coefficient
    }

    pub fn pipe(&self) -> PipeGeometry {
        self.pipe
    }

    pub fn contents(&self) -> MaterialProperties {
        self.contents
    }

    /// Mass of fluid delivered into the tank in one timestep, in kg
    pub fn mass_delivered(&self, timestep: f64) -> f64 {
        self.contents
            .mass(self.pipe.cross_sectional_area() * self.velocity * timestep)
    }

    /// Mass of fluid resident in the tank, in kg
    pub fn tank_mass(&self) -> f64 {
        self.contents.mass(self.tank_volume)
    }

    /// Returns the fluid loop at the end of a timestep.
    ///
    /// In one timestep a pocket of fluid travels through the pipes and leaves the panel warmer,
    /// then is mixed into the tank, raising the tank temperature. The panel outlet temperature
    /// follows the steady-state exponential profile along the pipe, recomputed each step from
    /// the tank outlet temperature at the start of the step.
    ///
    /// Arguments:
    /// * `pipe_temperature` - panel/pipe temperature already updated for this timestep, in deg C
    /// * `timestep` - timestep duration, in seconds
    pub fn update(&self, pipe_temperature: f64, timestep: f64) -> Self {
        let panel_outlet_temperature = pipe_temperature
            + ((self.tank_outlet_temperature - pipe_temperature)
                * (-self.alpha * self.pipe.length()).exp());

        let tank_outlet_temperature = perfect_mixing_temperature(
            self.mass_delivered(timestep),
            panel_outlet_temperature,
            self.tank_mass(),
            self.tank_outlet_temperature,
        );

        Self {
            panel_outlet_temperature,
            tank_outlet_temperature,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SolarPanelInput;
    use approx::assert_relative_eq;
    use itertools::iproduct;
    use rstest::*;

    #[fixture]
    fn panel() -> PanelState {
        PanelState::from(&SolarPanelInput::default())
    }

    #[fixture]
    fn fluid(panel: PanelState) -> FluidLoopState {
        FluidLoopState::new(&FluidInput::default(), &panel)
    }

    #[rstest]
    fn should_derive_alpha_from_fluid_and_pipe(fluid: FluidLoopState) {
        // 4 * 300 / (4180 * 1000 * 0.05 * 0.025)
        assert_relative_eq!(fluid.alpha(), 0.22966507177033493, max_relative = 1e-14);
    }

    #[rstest]
    fn should_calc_masses(fluid: FluidLoopState) {
        assert_relative_eq!(
            fluid.mass_delivered(1.),
            0.024543692606170262,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            fluid.mass_delivered(10.),
            0.24543692606170262,
            max_relative = 1e-12
        );
        assert_eq!(fluid.tank_mass(), 2000.);
    }

    #[rstest]
    fn should_start_from_configured_temperatures(panel: PanelState) {
        let fluid = FluidLoopState::new(
            &FluidInput {
                initial_panel_outlet_temperature: 31.,
                initial_tank_outlet_temperature: 19.,
                ..Default::default()
            },
            &panel,
        );

        assert_eq!(fluid.panel_outlet_temperature(), 31.);
        assert_eq!(fluid.tank_outlet_temperature(), 19.);
    }

    #[rstest]
    fn should_apply_one_update_from_reference_state(fluid: FluidLoopState) {
        let updated = fluid.update(25.002136752136753, 1.);

        assert_relative_eq!(
            updated.panel_outlet_temperature(),
            25.001459043874824,
            max_relative = 1e-14
        );
        assert_relative_eq!(
            updated.tank_outlet_temperature(),
            25.000000017904945,
            max_relative = 1e-14
        );
        // the snapshot that was updated is unchanged
        assert_eq!(fluid.tank_outlet_temperature(), 25.);
    }

    #[rstest]
    fn should_use_previous_tank_outlet_as_panel_inlet(panel: PanelState) {
        let fluid = FluidLoopState::new(
            &FluidInput {
                initial_panel_outlet_temperature: 90.,
                initial_tank_outlet_temperature: 20.,
                ..Default::default()
            },
            &panel,
        );
        let decay = (-fluid.alpha() * 5.).exp();

        let updated = fluid.update(40., 1.);

        assert_relative_eq!(
            updated.panel_outlet_temperature(),
            40. + (20. - 40.) * decay,
            max_relative = 1e-14
        );
    }

    #[rstest]
    fn should_reach_pipe_temperature_with_no_flow(panel: PanelState) {
        let fluid = FluidLoopState::new(
            &FluidInput {
                velocity: 0.,
                ..Default::default()
            },
            &panel,
        );

        let updated = fluid.update(60., 1.);

        assert_eq!(fluid.alpha(), f64::INFINITY);
        assert_eq!(updated.panel_outlet_temperature(), 60.);
        // nothing is delivered into the tank
        assert_eq!(updated.tank_outlet_temperature(), 25.);
    }

    #[rstest]
    fn should_take_panel_outlet_temperature_with_no_tank(panel: PanelState) {
        let fluid = FluidLoopState::new(
            &FluidInput {
                tank_volume: 0.,
                ..Default::default()
            },
            &panel,
        );

        let updated = fluid.update(60., 1.);

        assert_relative_eq!(
            updated.tank_outlet_temperature(),
            updated.panel_outlet_temperature(),
            max_relative = 1e-14
        );
    }

    #[rstest]
    fn should_snapshot_pipe_geometry_from_panel() {
        let panel = PanelState::from(&SolarPanelInput {
            pipe_length: 8.,
            pipe_diameter: 0.02,
            ..Default::default()
        });
        let fluid = FluidLoopState::new(&FluidInput::default(), &panel);

        assert_eq!(fluid.pipe(), PipeGeometry::new(8., 0.02));
        assert_eq!(fluid.update(40., 1.).pipe(), panel.pipe());
    }

    #[rstest]
    #[case(0., 40., 2000., 25.)]
    #[case(0.0245, 40., 2000., 25.)]
    #[case(5., -10., 0., 30.)]
    #[case(1e-9, 1e6, 1e9, -50.)]
    #[case(3., 20., 3., 20.)]
    fn should_mix_to_convex_combination(
        #[case] incoming_mass: f64,
        #[case] incoming_temp: f64,
        #[case] resident_mass: f64,
        #[case] resident_temp: f64,
    ) {
        let mixed =
            perfect_mixing_temperature(incoming_mass, incoming_temp, resident_mass, resident_temp);

        assert!(mixed >= incoming_temp.min(resident_temp));
        assert!(mixed <= incoming_temp.max(resident_temp));
    }

    #[rstest]
    fn should_keep_tank_between_previous_and_panel_outlet_every_step(panel: PanelState) {
        for (velocity, tank_volume, pipe_temperature) in
            iproduct!([0.01, 0.05, 1.], [0., 0.1, 2.], [-5., 25., 95.])
        {
            let fluid = FluidLoopState::new(
                &FluidInput {
                    velocity,
                    tank_volume,
                    ..Default::default()
                },
                &panel,
            );

            let updated = fluid.update(pipe_temperature, 1.);

            let low = fluid
                .tank_outlet_temperature()
                .min(updated.panel_outlet_temperature());
            let high = fluid
                .tank_outlet_temperature()
                .max(updated.panel_outlet_temperature());
            assert!(
                (low - 1e-12..=high + 1e-12).contains(&updated.tank_outlet_temperature()),
                "tank outlet temperature {} outside [{low}, {high}] for velocity {velocity}, tank volume {tank_volume}",
                updated.tank_outlet_temperature()
            );
        }
    }
}
