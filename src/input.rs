use crate::core::material_properties::{PANEL_METAL, WATER};
use crate::simulation_time::SimulationTime;
use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use std::io::{BufReader, Read};

pub fn ingest_for_processing(json: impl Read) -> Result<InputForProcessing, anyhow::Error> {
    InputForProcessing::init_with_json(json)
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(rename_all = "PascalCase", default, deny_unknown_fields)]
pub struct Input {
    #[validate]
    pub simulation_time: SimulationTime,
    #[validate]
    pub external_conditions: ExternalConditionsInput,
    #[validate]
    pub solar_panel: SolarPanelInput,
    #[validate]
    pub fluid: FluidInput,
    pub radiation_gain: RadiationGain,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct ExternalConditionsInput {
    /// Ambient air temperature, in deg C
    #[serde(alias = "T_amb")]
    #[validate(minimum = -273.)]
    pub ambient_temperature: f64,
    /// Peak solar radiation incident on the panel, in W/m2
    #[serde(alias = "solar_rad")]
    #[validate(minimum = 0.)]
    pub peak_solar_radiation: f64,
    /// Whether to model sunrise and sunset
    #[serde(alias = "cycle")]
    pub diurnal_cycle: bool,
}

impl Default for ExternalConditionsInput {
    fn default() -> Self {
        Self {
            ambient_temperature: 25.,
            // source: typical clear-sky irradiance at the surface
            peak_solar_radiation: 1000.,
            diurnal_cycle: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct SolarPanelInput {
    /// Starting temperature of the panel and its embedded pipe, in deg C
    #[serde(alias = "T")]
    #[validate(minimum = -273.)]
    pub initial_temperature: f64,
    /// How well the panel transfers absorbed radiation to the pipes (0 to 1)
    #[serde(alias = "effi")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub transfer_efficiency: f64,
    /// Panel emissivity (0 to 1)
    #[serde(alias = "emmi")]
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub emissivity: f64,
    /// Length of pipe running through the panel, in m
    #[serde(alias = "pipe_len")]
    #[validate(minimum = 0.)]
    pub pipe_length: f64,
    /// Internal pipe diameter, in m
    #[serde(alias = "pipe_dia")]
    #[validate(exclusive_minimum = 0.)]
    pub pipe_diameter: f64,
    /// Panel area exposed to the sun, in m2
    #[validate(exclusive_minimum = 0.)]
    pub panel_area: f64,
    /// Thickness of the panel, in m
    #[validate(exclusive_minimum = 0.)]
    pub panel_thickness: f64,
    /// Specific heat capacity of the panel, in J/(kg.K)
    #[serde(alias = "C")]
    #[validate(exclusive_minimum = 0.)]
    pub specific_heat_capacity: f64,
}

impl Default for SolarPanelInput {
    fn default() -> Self {
        Self {
            initial_temperature: 25.,
            transfer_efficiency: 0.5,
            emissivity: 0.4,
            pipe_length: 5.,
            pipe_diameter: 0.025,
            panel_area: 1.,
            panel_thickness: 0.06,
            specific_heat_capacity: PANEL_METAL.specific_heat_capacity(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct FluidInput {
    /// Volume of the storage tank (and the fluid it holds), in m3
    #[validate(minimum = 0.)]
    pub tank_volume: f64,
    /// Starting fluid temperature at the panel outlet (= tank inlet), in deg C
    #[serde(alias = "T_panel_out")]
    #[validate(minimum = -273.)]
    pub initial_panel_outlet_temperature: f64,
    /// Starting fluid temperature at the tank outlet (= panel inlet), in deg C
    #[serde(alias = "T_tank_out")]
    #[validate(minimum = -273.)]
    pub initial_tank_outlet_temperature: f64,
    /// Specific heat capacity of the fluid, in J/(kg.K)
    #[serde(alias = "C")]
    #[validate(exclusive_minimum = 0.)]
    pub specific_heat_capacity: f64,
    /// Fluid density, in kg/m3
    #[serde(alias = "rho")]
    #[validate(exclusive_minimum = 0.)]
    pub density: f64,
    /// Fluid velocity around the circuit, in m/s
    #[validate(minimum = 0.)]
    pub velocity: f64,
    /// Effective fluid-pipe heat transfer coefficient, in W/(m2.K)
    #[serde(alias = "ht_coeff")]
    #[validate(exclusive_minimum = 0.)]
    pub heat_transfer_coefficient: f64,
}

impl Default for FluidInput {
    fn default() -> Self {
        Self {
            tank_volume: 2.,
            initial_panel_outlet_temperature: 25.,
            initial_tank_outlet_temperature: 25.,
            specific_heat_capacity: WATER.specific_heat_capacity(),
            density: WATER.density(),
            velocity: 0.05,
            heat_transfer_coefficient: 300.,
        }
    }
}

/// How radiation absorbed by the panel is turned into energy for a timestep.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, strum::Display)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub enum RadiationGain {
    /// Absorbed power is applied as the energy gained in each step, regardless of the step
    /// length (radiative and convective losses are still scaled by the step length).
    #[default]
    PerStep,
    /// Absorbed power is multiplied by the step length, consistent with the loss terms.
    ScaledByTimestep,
}

impl Input {
    /// Checks field ranges and the combinations of values the model cannot evaluate.
    pub fn check(&self) -> anyhow::Result<()> {
        self.validate()
            .map_err(|errors| anyhow!("Input failed validation: {errors}"))?;

        let non_finite_field = [
            ("SimulationTime.step", self.simulation_time.step()),
            (
                "ExternalConditions.ambient_temperature",
                self.external_conditions.ambient_temperature,
            ),
            (
                "ExternalConditions.peak_solar_radiation",
                self.external_conditions.peak_solar_radiation,
            ),
            (
                "SolarPanel.initial_temperature",
                self.solar_panel.initial_temperature,
            ),
            (
                "SolarPanel.transfer_efficiency",
                self.solar_panel.transfer_efficiency,
            ),
            ("SolarPanel.emissivity", self.solar_panel.emissivity),
            ("SolarPanel.pipe_length", self.solar_panel.pipe_length),
            ("SolarPanel.pipe_diameter", self.solar_panel.pipe_diameter),
            ("SolarPanel.panel_area", self.solar_panel.panel_area),
            ("SolarPanel.panel_thickness", self.solar_panel.panel_thickness),
            (
                "SolarPanel.specific_heat_capacity",
                self.solar_panel.specific_heat_capacity,
            ),
            ("Fluid.tank_volume", self.fluid.tank_volume),
            (
                "Fluid.initial_panel_outlet_temperature",
                self.fluid.initial_panel_outlet_temperature,
            ),
            (
                "Fluid.initial_tank_outlet_temperature",
                self.fluid.initial_tank_outlet_temperature,
            ),
            (
                "Fluid.specific_heat_capacity",
                self.fluid.specific_heat_capacity,
            ),
            ("Fluid.density", self.fluid.density),
            ("Fluid.velocity", self.fluid.velocity),
            (
                "Fluid.heat_transfer_coefficient",
                self.fluid.heat_transfer_coefficient,
            ),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite());
        if let Some((field, value)) = non_finite_field {
            bail!("{field} must be a finite number, but was {value}");
        }

        // with no flow and no tank there is no fluid mass to mix
        if self.fluid.tank_volume == 0. && self.fluid.velocity == 0. {
            bail!("Fluid.tank_volume and Fluid.velocity cannot both be zero");
        }

        // zero flow makes the pipe decay constant infinite, which is undefined over a zero length
        if self.fluid.velocity == 0. && self.solar_panel.pipe_length == 0. {
            bail!("SolarPanel.pipe_length must be greater than zero when Fluid.velocity is zero");
        }

        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct InputForProcessing {
    input: Input,
}

impl InputForProcessing {
    pub fn init_with_json(json: impl Read) -> Result<Self, anyhow::Error> {
        let reader = BufReader::new(json);

        let input: Input = serde_json::from_reader(reader)?;

        Ok(Self { input })
    }

    pub fn finalize(self) -> Input {
        self.input
    }

    pub fn set_steps(&mut self, steps: usize) -> &Self {
        self.input.simulation_time.set_steps(steps);
        self
    }

    pub fn set_timestep(&mut self, step: f64) -> &Self {
        self.input.simulation_time.set_step(step);
        self
    }

    pub fn set_diurnal_cycle(&mut self, diurnal_cycle: bool) -> &Self {
        self.input.external_conditions.diurnal_cycle = diurnal_cycle;
        self
    }

    pub fn set_radiation_gain(&mut self, radiation_gain: RadiationGain) -> &Self {
        self.input.radiation_gain = radiation_gain;
        self
    }

    pub fn simulation_time(&self) -> SimulationTime {
        self.input.simulation_time
    }
}
