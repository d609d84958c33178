use crate::core::units::seconds_to_hours;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

pub(crate) const DEFAULT_TIMESTEP: f64 = 1.;
pub(crate) const DEFAULT_STEPS: usize = 500_000;

/// Fixed-step simulation clock. Time is measured in seconds elapsed since the start of the run
/// (which, when the diurnal cycle is enabled, is sunrise).
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize, Validate)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[serde(default, deny_unknown_fields)]
pub struct SimulationTime {
    /// Timestep duration, in seconds
    #[serde(alias = "dt")]
    #[validate(exclusive_minimum = 0.)]
    step: f64,
    /// Number of timesteps to simulate
    #[validate(maximum = 10_000_000)]
    steps: usize,
}

impl Default for SimulationTime {
    fn default() -> Self {
        Self {
            step: DEFAULT_TIMESTEP,
            steps: DEFAULT_STEPS,
        }
    }
}

impl SimulationTime {
    pub fn new(step: f64, steps: usize) -> Self {
        Self { step, steps }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn total_steps(&self) -> usize {
        self.steps
    }

    /// Simulated time horizon, in seconds
    pub fn total_duration(&self) -> f64 {
        self.steps as f64 * self.step
    }

    pub(crate) fn set_step(&mut self, step: f64) {
        self.step = step;
    }

    pub(crate) fn set_steps(&mut self, steps: usize) {
        self.steps = steps;
    }

    pub fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator::from(*self)
    }
}

#[derive(Clone, Debug)]
pub struct SimulationTimeIterator {
    current_index: usize,
    simulation_time: SimulationTime,
}

impl SimulationTimeIterator {
    fn from(simulation_time: SimulationTime) -> Self {
        SimulationTimeIterator {
            current_index: 0,
            simulation_time,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationTimeIteration {
    pub index: usize,
    /// Elapsed time at the start of this step, in seconds
    pub time: f64,
    pub timestep: f64,
}

impl SimulationTimeIteration {
    pub fn time_in_hours(&self) -> f64 {
        seconds_to_hours(self.time)
    }
}

impl Iterator for SimulationTimeIterator {
    type Item = SimulationTimeIteration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.simulation_time.steps {
            return None;
        }

        let index = self.current_index;
        self.current_index += 1;

        // elapsed time is index * step, never accumulated
        Some(SimulationTimeIteration {
            index,
            time: index as f64 * self.simulation_time.step,
            timestep: self.simulation_time.step,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.simulation_time.steps - self.current_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SimulationTimeIterator {}
