//! A simple statistics module summarising the temperature series produced by a run.
use crate::core::fluid_loop::FluidLoopState;
use crate::core::units::{joules_to_kwh, seconds_to_hours};
use crate::corpus::RunResults;
use statrs::statistics::{Data, OrderStatistics, Statistics};

pub fn percentile(numbers: &[f64], percentile: usize) -> f64 {
    let mut data = Data::new(numbers.to_vec());

    data.percentile(percentile)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub last: f64,
    /// Elapsed time at which the maximum was first reached, in hours
    pub time_of_max_in_hours: f64,
}

impl SeriesSummary {
    /// Returns `None` for an empty series.
    pub fn from_series(series: &[f64], timestep_array: &[f64]) -> Option<Self> {
        let last = *series.last()?;

        let (max_idx, max) = series.iter().copied().enumerate().fold(
            (0, f64::NEG_INFINITY),
            |(max_idx, max), (idx, value)| {
                if value > max {
                    (idx, value)
                } else {
                    (max_idx, max)
                }
            },
        );

        Some(Self {
            min: series.min(),
            max: series.max(),
            mean: series.mean(),
            // order statistics are undefined once a series has gone non-finite
            median: if series.iter().any(|value| !value.is_finite()) {
                f64::NAN
            } else {
                percentile(series, 50)
            },
            last,
            time_of_max_in_hours: if max.is_finite() {
                seconds_to_hours(timestep_array[max_idx])
            } else {
                f64::NAN
            },
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResultsSummary {
    pub pipe: Option<SeriesSummary>,
    pub panel_outlet: Option<SeriesSummary>,
    pub tank_outlet: Option<SeriesSummary>,
    /// Heat stored in the tank over the run, in kWh
    pub tank_energy_gained: f64,
    pub non_finite_count: usize,
}

impl ResultsSummary {
    /// Arguments:
    /// * `results` - time series from a completed run
    /// * `initial_fluid` - the fluid loop as it was before the first step
    pub fn new(results: &RunResults, initial_fluid: &FluidLoopState) -> Self {
        let summarise =
            |series: &[f64]| SeriesSummary::from_series(series, &results.timestep_array);

        let tank_energy_gained = match results.tank_outlet_temperatures.last() {
            Some(final_temp) => joules_to_kwh(
                initial_fluid
                    .contents()
                    .heat_capacity(initial_fluid.tank_mass())
                    * (final_temp - initial_fluid.tank_outlet_temperature()),
            ),
            None => 0.,
        };

        Self {
            pipe: summarise(&results.pipe_temperatures),
            panel_outlet: summarise(&results.panel_outlet_temperatures),
            tank_outlet: summarise(&results.tank_outlet_temperatures),
            tank_energy_gained,
            non_finite_count: results.non_finite_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::solar_panel::PanelState;
    use crate::input::{FluidInput, SolarPanelInput};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn numbers() -> [f64; 10] {
        [9.0, 3.0, 3.0, 4.0, 5.0, 4.9, 8.0, 3.3, 2.0, 0.1]
    }

    #[fixture]
    fn initial_fluid() -> FluidLoopState {
        FluidLoopState::new(
            &FluidInput::default(),
            &PanelState::from(&SolarPanelInput::default()),
        )
    }

    #[rstest]
    fn test_percentile(numbers: [f64; 10]) {
        assert_relative_eq!(percentile(&numbers, 50), 3.65, max_relative = 1e-2);
    }

    #[rstest]
    fn should_summarise_series(numbers: [f64; 10]) {
        let timestep_array = (0..10).map(|i| i as f64 * 1800.).collect::<Vec<_>>();

        let summary = SeriesSummary::from_series(&numbers, &timestep_array).unwrap();

        assert_eq!(summary.min, 0.1);
        assert_eq!(summary.max, 9.0);
        assert_relative_eq!(summary.mean, 4.23, max_relative = 1e-12);
        assert_eq!(summary.last, 0.1);
        assert_eq!(summary.time_of_max_in_hours, 0.);
    }

    #[rstest]
    fn should_summarise_series_containing_nan() {
        let series = [25., f64::NAN, f64::NEG_INFINITY, 30.];
        let timestep_array = [0., 3600., 7200., 10800.];

        let summary = SeriesSummary::from_series(&series, &timestep_array).unwrap();

        assert!(summary.median.is_nan());
        assert_eq!(summary.last, 30.);
        assert_eq!(summary.time_of_max_in_hours, 3.);
    }

    #[rstest]
    fn should_summarise_diverged_series() {
        let series = [f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];

        let summary = SeriesSummary::from_series(&series, &[0., 1., 2.]).unwrap();

        assert!(summary.median.is_nan());
        assert_eq!(summary.last, f64::NEG_INFINITY);
        assert!(summary.time_of_max_in_hours.is_nan());
    }

    #[rstest]
    fn should_not_summarise_empty_series() {
        assert_eq!(SeriesSummary::from_series(&[], &[]), None);
    }

    #[rstest]
    fn should_calc_tank_energy_gained(initial_fluid: FluidLoopState) {
        let results = RunResults {
            timestep_array: vec![0., 3600.],
            pipe_temperatures: vec![40., 50.],
            panel_outlet_temperatures: vec![35., 45.],
            tank_outlet_temperatures: vec![25.5, 26.],
        };

        let summary = ResultsSummary::new(&results, &initial_fluid);

        // 2000 kg * 4180 J/(kg.K) * 1 K
        assert_relative_eq!(
            summary.tank_energy_gained,
            8_360_000. / 3_600_000.,
            max_relative = 1e-12
        );
        assert_eq!(summary.tank_outlet.unwrap().time_of_max_in_hours, 1.);
        assert_eq!(summary.non_finite_count, 0);
    }

    #[rstest]
    fn should_summarise_empty_results(initial_fluid: FluidLoopState) {
        let summary = ResultsSummary::new(&RunResults::default(), &initial_fluid);

        assert_eq!(summary.pipe, None);
        assert_eq!(summary.tank_energy_gained, 0.);
    }
}
