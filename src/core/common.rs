// location for defining common types passed across the core submodules

use crate::core::units::STEFAN_BOLTZMANN_CONSTANT;
use crate::input::{ExternalConditionsInput, RadiationGain};
use crate::simulation_time::SimulationTimeIteration;

/// Everything a component needs to know about the current timestep, passed explicitly into
/// each update rather than read from shared state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepContext {
    /// Time elapsed since the start of the run (sunrise), in seconds
    pub elapsed: f64,
    /// Timestep duration, in seconds
    pub timestep: f64,
    /// Ambient temperature, in deg C
    pub ambient_temperature: f64,
    /// Peak incident solar radiation, in W/m2
    pub peak_solar_radiation: f64,
    pub diurnal_cycle: bool,
    /// Stefan-Boltzmann constant, in W / (m^2 K^4)
    pub sigma: f64,
    pub radiation_gain: RadiationGain,
}

impl StepContext {
    pub fn new(
        simtime: &SimulationTimeIteration,
        external_conditions: &ExternalConditionsInput,
        radiation_gain: RadiationGain,
    ) -> Self {
        Self {
            elapsed: simtime.time,
            timestep: simtime.timestep,
            ambient_temperature: external_conditions.ambient_temperature,
            peak_solar_radiation: external_conditions.peak_solar_radiation,
            diurnal_cycle: external_conditions.diurnal_cycle,
            sigma: STEFAN_BOLTZMANN_CONSTANT,
            radiation_gain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_carry_step_and_external_conditions() {
        let simtime = SimulationTimeIteration {
            index: 3,
            time: 180.,
            timestep: 60.,
        };
        let external_conditions = ExternalConditionsInput {
            ambient_temperature: 12.,
            peak_solar_radiation: 750.,
            diurnal_cycle: true,
        };

        assert_eq!(
            StepContext::new(&simtime, &external_conditions, RadiationGain::PerStep),
            StepContext {
                elapsed: 180.,
                timestep: 60.,
                ambient_temperature: 12.,
                peak_solar_radiation: 750.,
                diurnal_cycle: true,
                sigma: 5.67e-8,
                radiation_gain: RadiationGain::PerStep,
            }
        );
    }
}
