use crate::core::common::StepContext;
use crate::core::fluid_loop::FluidLoopState;
use crate::core::solar_panel::PanelState;
use crate::core::units::seconds_to_hours;
use crate::input::{ExternalConditionsInput, Input, RadiationGain};
use crate::simulation_time::{SimulationTime, SimulationTimeIteration};
use anyhow::bail;
use itertools::izip;
use tracing::{debug, info, instrument, warn};

/// Results beyond this many steps are grown as the run goes rather than reserved up front.
const MAX_PREALLOCATED_STEPS: usize = 1 << 20;

/// Where the driver is in its single pass through the simulation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum RunState {
    Initialized,
    Running,
    Completed,
}

/// Temperatures recorded at the end of one timestep, in deg C
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepTemperatures {
    pub pipe: f64,
    pub panel_outlet: f64,
    pub tank_outlet: f64,
}

impl StepTemperatures {
    fn is_finite(&self) -> bool {
        self.pipe.is_finite() && self.panel_outlet.is_finite() && self.tank_outlet.is_finite()
    }
}

/// Time series produced by a run, index-aligned with the elapsed time of each step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunResults {
    /// Elapsed time at each step, in seconds
    pub timestep_array: Vec<f64>,
    pub pipe_temperatures: Vec<f64>,
    pub panel_outlet_temperatures: Vec<f64>,
    pub tank_outlet_temperatures: Vec<f64>,
}

impl RunResults {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            timestep_array: Vec::with_capacity(capacity),
            pipe_temperatures: Vec::with_capacity(capacity),
            panel_outlet_temperatures: Vec::with_capacity(capacity),
            tank_outlet_temperatures: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, elapsed: f64, temperatures: StepTemperatures) {
        self.timestep_array.push(elapsed);
        self.pipe_temperatures.push(temperatures.pipe);
        self.panel_outlet_temperatures.push(temperatures.panel_outlet);
        self.tank_outlet_temperatures.push(temperatures.tank_outlet);
    }

    pub fn len(&self) -> usize {
        self.timestep_array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestep_array.is_empty()
    }

    /// Elapsed time at each step, in hours
    pub fn time_in_hours(&self) -> Vec<f64> {
        self.timestep_array
            .iter()
            .map(|&seconds| seconds_to_hours(seconds))
            .collect()
    }

    /// Temperatures recorded at each step
    pub fn iter(&self) -> impl Iterator<Item = StepTemperatures> + '_ {
        izip!(
            &self.pipe_temperatures,
            &self.panel_outlet_temperatures,
            &self.tank_outlet_temperatures
        )
        .map(|(&pipe, &panel_outlet, &tank_outlet)| StepTemperatures {
            pipe,
            panel_outlet,
            tank_outlet,
        })
    }

    /// Number of NaN or infinite values across all three temperature series
    pub fn non_finite_count(&self) -> usize {
        [
            &self.pipe_temperatures,
            &self.panel_outlet_temperatures,
            &self.tank_outlet_temperatures,
        ]
        .into_iter()
        .flatten()
        .filter(|temp| !temp.is_finite())
        .count()
    }
}

/// The assembled model: one panel and the fluid loop running through it, stepped together
/// through the simulation time.
#[derive(Debug)]
pub struct Corpus {
    simulation_time: SimulationTime,
    external_conditions: ExternalConditionsInput,
    radiation_gain: RadiationGain,
    initial_panel: PanelState,
    initial_fluid: FluidLoopState,
    panel: PanelState,
    fluid: FluidLoopState,
    state: RunState,
}

impl Corpus {
    pub fn from_inputs(input: &Input) -> anyhow::Result<Self> {
        input.check()?;

        let panel = PanelState::from(&input.solar_panel);
        let fluid = FluidLoopState::new(&input.fluid, &panel);

        debug!(
            panel_mass = panel.panel_mass(),
            alpha = fluid.alpha(),
            heat_transfer_coefficient = fluid.heat_transfer_coefficient(),
            tank_mass = fluid.tank_mass(),
            "built solar panel and fluid loop"
        );

        Ok(Self {
            simulation_time: input.simulation_time,
            external_conditions: input.external_conditions,
            radiation_gain: input.radiation_gain,
            initial_panel: panel,
            initial_fluid: fluid,
            panel,
            fluid,
            state: RunState::Initialized,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn fluid(&self) -> &FluidLoopState {
        &self.fluid
    }

    pub fn initial_panel(&self) -> &PanelState {
        &self.initial_panel
    }

    pub fn initial_fluid(&self) -> &FluidLoopState {
        &self.initial_fluid
    }

    /// Advances the panel and then the fluid loop by one timestep. The fluid loop consumes the
    /// panel temperature produced in the same step.
    fn step(&mut self, simtime: &SimulationTimeIteration) -> StepTemperatures {
        let context = StepContext::new(simtime, &self.external_conditions, self.radiation_gain);

        self.panel = self.panel.update(&context);
        self.fluid = self
            .fluid
            .update(self.panel.temperature(), context.timestep);

        StepTemperatures {
            pipe: self.panel.temperature(),
            panel_outlet: self.fluid.panel_outlet_temperature(),
            tank_outlet: self.fluid.tank_outlet_temperature(),
        }
    }

    /// Runs every timestep in order and returns the recorded time series. A corpus can only be
    /// run once.
    #[instrument(skip_all)]
    pub fn run(&mut self) -> anyhow::Result<RunResults> {
        if self.state != RunState::Initialized {
            bail!("Simulation cannot be run from state {}", self.state);
        }

        self.state = RunState::Running;
        info!(
            steps = self.simulation_time.total_steps(),
            timestep = self.simulation_time.step(),
            duration = self.simulation_time.total_duration(),
            diurnal_cycle = self.external_conditions.diurnal_cycle,
            radiation_gain = %self.radiation_gain,
            "starting simulation"
        );

        let mut results = RunResults::with_capacity(
            self.simulation_time
                .total_steps()
                .min(MAX_PREALLOCATED_STEPS),
        );
        let mut reported_non_finite = false;

        for t_it in self.simulation_time.iter() {
            let temperatures = self.step(&t_it);

            if !reported_non_finite && !temperatures.is_finite() {
                warn!(
                    step = t_it.index,
                    elapsed = t_it.time,
                    "non-finite temperature produced; later values will be recorded as they are"
                );
                reported_non_finite = true;
            }

            results.push(t_it.time, temperatures);
        }

        self.state = RunState::Completed;
        info!(
            steps = results.len(),
            final_tank_outlet_temperature = self.fluid.tank_outlet_temperature(),
            "simulation completed"
        );

        Ok(results)
    }
}
