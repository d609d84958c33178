use crate::core::common::StepContext;
use crate::core::material_properties::{MaterialProperties, PANEL_METAL_DENSITY};
use crate::core::pipework::PipeGeometry;
use crate::core::solar_radiation::incident_flux;
use crate::core::units::celsius_to_kelvin;
use crate::input::{RadiationGain, SolarPanelInput};

/// Fraction of the radiative loss that is additionally lost by convection. This is an arbitrary
/// simplification that avoids modelling free convection (Grashof, Nusselt numbers etc.).
const CONVECTION_LOSS_FRACTION: f64 = 0.2;

/// A solar panel, treated as a solid block of metal with a pipe running through it. The inner
/// wall of the pipe is the same material as the block, so the panel and pipe share a single
/// temperature.
///
/// This is an immutable snapshot: `update` returns the panel state at the end of a timestep and
/// leaves `self` untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelState {
    temperature: f64,        // in deg C
    transfer_efficiency: f64, // fraction of incident radiation transferred to the pipes
    emissivity: f64,
    pipe: PipeGeometry,
    area: f64,      // area exposed to the sun, in m2
    thickness: f64, // in m
    material: MaterialProperties,
}

impl From<&SolarPanelInput> for PanelState {
    fn from(input: &SolarPanelInput) -> Self {
        Self::new(
            input.initial_temperature,
            input.transfer_efficiency,
            input.emissivity,
            PipeGeometry::new(input.pipe_length, input.pipe_diameter),
            input.panel_area,
            input.panel_thickness,
            input.specific_heat_capacity,
        )
    }
}

impl PanelState {
    /// Arguments:
    /// * `temperature` - starting temperature of the panel/pipe, in deg C
    /// * `transfer_efficiency` - how well the panel transfers heat to the pipes
    /// * `emissivity` - panel emissivity in radiation
    /// * `pipe` - geometry of the pipe running through the panel
    /// * `area` - panel area exposed to the sun, in m2
    /// * `thickness` - panel thickness, in m
    /// * `specific_heat_capacity` - specific heat capacity of the panel, in J/(kg.K)
    pub fn new(
        temperature: f64,
        transfer_efficiency: f64,
        emissivity: f64,
        pipe: PipeGeometry,
        area: f64,
        thickness: f64,
        specific_heat_capacity: f64,
    ) -> Self {
        Self {
            temperature,
            transfer_efficiency,
            emissivity,
            pipe,
            area,
            thickness,
            material: MaterialProperties::new(PANEL_METAL_DENSITY, specific_heat_capacity),
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn pipe(&self) -> PipeGeometry {
        self.pipe
    }

    /// Mass of the metal block, in kg
    pub fn panel_mass(&self) -> f64 {
        self.material.mass(self.thickness * self.area)
    }

    /// Energy absorbed from the sun and passed on to the pipes this timestep, in J
    pub fn radiation_in(&self, context: &StepContext) -> f64 {
        let absorbed_power = incident_flux(
            context.peak_solar_radiation,
            context.elapsed,
            context.diurnal_cycle,
        ) * self.transfer_efficiency
            * self.area;

        match context.radiation_gain {
            RadiationGain::PerStep => absorbed_power,
            RadiationGain::ScaledByTimestep => absorbed_power * context.timestep,
        }
    }

    /// Net energy radiated to the surroundings this timestep, in J
    pub fn radiation_loss(&self, context: &StepContext) -> f64 {
        context.sigma
            * self.area
            * self.emissivity
            * (celsius_to_kelvin(self.temperature).powi(4)
                - celsius_to_kelvin(context.ambient_temperature).powi(4))
            * context.timestep
    }

    /// Returns the panel at the end of the timestep described by `context`.
    ///
    /// In one timestep the panel receives solar radiation and transfers some of it to the pipes
    /// instantaneously, while losing heat to the surroundings by radiation and convection. What
    /// is left over changes the temperature of the panel/pipe.
    pub fn update(&self, context: &StepContext) -> Self {
        let radiation_in = self.radiation_in(context);

        let radiation_loss = self.radiation_loss(context);
        let convection_loss = CONVECTION_LOSS_FRACTION * radiation_loss;
        let panel_available_heat = radiation_in - (radiation_loss + convection_loss);

        let heat_capacity = self.material.heat_capacity(self.panel_mass());

        Self {
            temperature: self.temperature + (panel_available_heat / heat_capacity),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ExternalConditionsInput;
    use crate::simulation_time::SimulationTime;
    use approx::assert_relative_eq;
    use rstest::*;

    #[fixture]
    fn panel() -> PanelState {
        PanelState::from(&SolarPanelInput::default())
    }

    #[fixture]
    fn external_conditions() -> ExternalConditionsInput {
        ExternalConditionsInput::default()
    }

    fn contexts(
        simulation_time: SimulationTime,
        external_conditions: ExternalConditionsInput,
        radiation_gain: RadiationGain,
    ) -> impl Iterator<Item = StepContext> {
        simulation_time
            .iter()
            .map(move |t_it| StepContext::new(&t_it, &external_conditions, radiation_gain))
    }

    #[rstest]
    fn should_have_correct_panel_mass(panel: PanelState) {
        assert_relative_eq!(panel.panel_mass(), 468., max_relative = 1e-12);
    }

    #[rstest]
    fn should_apply_one_update_from_reference_state(
        panel: PanelState,
        external_conditions: ExternalConditionsInput,
    ) {
        let context = contexts(
            SimulationTime::new(1., 1),
            external_conditions,
            RadiationGain::PerStep,
        )
        .next()
        .unwrap();

        // panel starts at ambient so there are no losses: 25 + 500 / (500 * 468)
        assert_relative_eq!(
            panel.update(&context).temperature(),
            25.002136752136753,
            max_relative = 1e-14
        );
        // the snapshot that was updated is unchanged
        assert_eq!(panel.temperature(), 25.);
    }

    #[rstest]
    fn should_lose_heat_by_radiation_and_convection(external_conditions: ExternalConditionsInput) {
        let panel = PanelState::from(&SolarPanelInput {
            initial_temperature: 75.,
            ..Default::default()
        });
        let context = StepContext {
            peak_solar_radiation: 0.,
            ..contexts(
                SimulationTime::new(10., 1),
                external_conditions,
                RadiationGain::PerStep,
            )
            .next()
            .unwrap()
        };

        let radiation_loss = 5.67e-8 * 0.4 * (348_f64.powi(4) - 298_f64.powi(4)) * 10.;
        assert_relative_eq!(
            panel.radiation_loss(&context),
            radiation_loss,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            panel.update(&context).temperature(),
            75. - 1.2 * radiation_loss / (500. * 468.),
            max_relative = 1e-12
        );
    }

    #[rstest]
    fn should_not_scale_radiation_gain_by_timestep_per_step(
        panel: PanelState,
        external_conditions: ExternalConditionsInput,
    ) {
        let context = contexts(
            SimulationTime::new(60., 1),
            external_conditions,
            RadiationGain::PerStep,
        )
        .next()
        .unwrap();

        assert_eq!(panel.radiation_in(&context), 500.);
    }

    #[rstest]
    fn should_scale_radiation_gain_by_timestep_when_requested(
        panel: PanelState,
        external_conditions: ExternalConditionsInput,
    ) {
        let context = contexts(
            SimulationTime::new(60., 1),
            external_conditions,
            RadiationGain::ScaledByTimestep,
        )
        .next()
        .unwrap();

        assert_eq!(panel.radiation_in(&context), 30_000.);
        assert_relative_eq!(
            panel.update(&context).temperature(),
            25. + 30_000. / (500. * 468.),
            max_relative = 1e-14
        );
    }

    #[rstest]
    fn should_never_cool_without_emissivity(external_conditions: ExternalConditionsInput) {
        let mut panel = PanelState::from(&SolarPanelInput {
            emissivity: 0.,
            ..Default::default()
        });

        for context in contexts(
            SimulationTime::new(1., 5_000),
            external_conditions,
            RadiationGain::PerStep,
        ) {
            let next = panel.update(&context);
            assert!(next.temperature() >= panel.temperature());
            panel = next;
        }
        assert!(panel.temperature() > 25.);
    }

    #[rstest]
    fn should_never_cool_without_emissivity_over_a_day(
        external_conditions: ExternalConditionsInput,
    ) {
        let mut panel = PanelState::from(&SolarPanelInput {
            emissivity: 0.,
            ..Default::default()
        });
        let external_conditions = ExternalConditionsInput {
            diurnal_cycle: true,
            ..external_conditions
        };

        for context in contexts(
            SimulationTime::new(600., 144),
            external_conditions,
            RadiationGain::PerStep,
        ) {
            let next = panel.update(&context);
            assert!(next.temperature() >= panel.temperature());
            panel = next;
        }
    }

    #[rstest]
    fn should_decay_monotonically_towards_ambient_without_sun(
        external_conditions: ExternalConditionsInput,
    ) {
        let mut panel = PanelState::from(&SolarPanelInput {
            initial_temperature: 80.,
            ..Default::default()
        });
        let external_conditions = ExternalConditionsInput {
            peak_solar_radiation: 0.,
            ..external_conditions
        };

        for context in contexts(
            SimulationTime::new(1., 20_000),
            external_conditions,
            RadiationGain::PerStep,
        ) {
            let next = panel.update(&context);
            assert!(next.temperature() <= panel.temperature());
            assert!(next.temperature() >= external_conditions.ambient_temperature);
            panel = next;
        }
        assert!(panel.temperature() < 80.);
    }

    #[rstest]
    fn should_stay_at_ambient_without_sun(external_conditions: ExternalConditionsInput) {
        let panel = PanelState::from(&SolarPanelInput::default());
        let context = StepContext {
            peak_solar_radiation: 0.,
            ..contexts(
                SimulationTime::new(1., 1),
                external_conditions,
                RadiationGain::PerStep,
            )
            .next()
            .unwrap()
        };

        assert_eq!(panel.update(&context).temperature(), 25.);
    }
}
