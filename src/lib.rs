pub mod core;
pub mod corpus;
pub mod errors;
pub mod input;
pub mod output;
pub mod simulation_time;
pub mod statistics;

use crate::corpus::{Corpus, RunResults};
use crate::errors::{PostprocessingError, SwhCoreError, SwhError};
use crate::input::{ingest_for_processing, Input, InputForProcessing};
use crate::output::Output;
use crate::statistics::{ResultsSummary, SeriesSummary};
use bitflags::bitflags;
use csv::WriterBuilder;
use indexmap::IndexMap;
use std::any::Any;
use std::io::{Read, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::LazyLock;
use tracing::{debug, info};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct ProjectFlags: u32 {
        /// Only ingest the input and write it back out once overrides are applied, without
        /// running the simulation.
        const PREPROCESS_ONLY = 0b1;
        /// Also write a summary of each temperature series.
        const SUMMARY_OUTPUT = 0b10;
    }
}

#[derive(Debug)]
pub struct CalculationResultsWithContext {
    pub input: Input,
    pub results: RunResults,
    pub summary: ResultsSummary,
}

pub fn run_project(
    input: impl Read,
    output: impl Output,
    flags: &ProjectFlags,
) -> Result<Option<CalculationResultsWithContext>, SwhError> {
    run_project_with_overrides(input, output, flags, |_| {})
}

/// As `run_project`, with a hook for adjusting the ingested input (e.g. from command line
/// arguments) before it is validated.
pub fn run_project_with_overrides(
    input: impl Read,
    output: impl Output,
    flags: &ProjectFlags,
    overrides: impl FnOnce(&mut InputForProcessing),
) -> Result<Option<CalculationResultsWithContext>, SwhError> {
    let run = || -> Result<Option<CalculationResultsWithContext>, SwhError> {
        let mut input_for_processing = ingest_for_processing(input)?;
        overrides(&mut input_for_processing);
        let input = input_for_processing.finalize();

        if flags.contains(ProjectFlags::PREPROCESS_ONLY) {
            input.check()?;
            write_preproc_file(&input, &output, "preproc", "json")
                .map_err(|e| SwhError::ErrorInPostprocessing(PostprocessingError::new(e)))?;
            return Ok(None);
        }

        // validates the input
        let mut corpus = Corpus::from_inputs(&input)?;

        let results = corpus
            .run()
            .map_err(|e| SwhError::FailureInCalculation(SwhCoreError::new(e)))?;
        let summary = ResultsSummary::new(&results, corpus.initial_fluid());

        if !output.is_noop() {
            write_core_output_file(&output, &results)
                .map_err(|e| SwhError::ErrorInPostprocessing(PostprocessingError::new(e)))?;

            if flags.contains(ProjectFlags::SUMMARY_OUTPUT) {
                write_summary_output_file(&output, &summary)
                    .map_err(|e| SwhError::ErrorInPostprocessing(PostprocessingError::new(e)))?;
            }
        }

        Ok(Some(CalculationResultsWithContext {
            input,
            results,
            summary,
        }))
    };

    catch_unwind(AssertUnwindSafe(run))
        .unwrap_or_else(|panic| Err(SwhError::PanicInCalculation(panic_message(panic.as_ref()))))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Headings of the per-timestep results file, with their units.
pub static RESULTS_COLUMNS: LazyLock<IndexMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        IndexMap::from([
            ("Timestep", "[count]"),
            ("Time", "[s]"),
            ("Time in hours", "[hours]"),
            ("Pipe temp", "[deg C]"),
            ("Panel outlet temp", "[deg C]"),
            ("Tank outlet temp", "[deg C]"),
        ])
    });

fn write_preproc_file(
    input: &Input,
    output: &impl Output,
    location_key: &str,
    file_extension: &str,
) -> anyhow::Result<()> {
    let mut writer = output.writer_for_location_key(location_key, file_extension)?;
    serde_json::to_writer_pretty(&mut writer, input)?;
    writer.flush()?;

    Ok(())
}

fn write_core_output_file(output: &impl Output, results: &RunResults) -> anyhow::Result<()> {
    let output_key = "results";
    info!("writing out to {output_key}");
    let writer = output.writer_for_location_key(output_key, "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record(RESULTS_COLUMNS.keys())?;
    writer.write_record(RESULTS_COLUMNS.values())?;

    for (t_idx, (elapsed, hours, temperatures)) in results
        .timestep_array
        .iter()
        .zip(results.time_in_hours())
        .zip(results.iter())
        .map(|((elapsed, hours), temperatures)| (elapsed, hours, temperatures))
        .enumerate()
    {
        writer.write_record([
            t_idx.to_string(),
            elapsed.to_string(),
            hours.to_string(),
            temperatures.pipe.to_string(),
            temperatures.panel_outlet.to_string(),
            temperatures.tank_outlet.to_string(),
        ])?;
    }

    debug!("flushing out CSV");
    writer.flush()?;

    Ok(())
}

fn write_summary_output_file(
    output: &impl Output,
    summary: &ResultsSummary,
) -> anyhow::Result<()> {
    let output_key = "results_summary";
    info!("writing out to {output_key}");
    let writer = output.writer_for_location_key(output_key, "csv")?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record(["Series", "Min", "Max", "Mean", "Median", "Final", "Time of max"])?;
    writer.write_record(["", "[deg C]", "[deg C]", "[deg C]", "[deg C]", "[deg C]", "[hours]"])?;

    for (name, series) in [
        ("Pipe temp", summary.pipe),
        ("Panel outlet temp", summary.panel_outlet),
        ("Tank outlet temp", summary.tank_outlet),
    ] {
        let mut row = vec![name.to_string()];
        match series {
            Some(SeriesSummary {
                min,
                max,
                mean,
                median,
                last,
                time_of_max_in_hours,
            }) => row.extend(
                [min, max, mean, median, last, time_of_max_in_hours].map(|val| val.to_string()),
            ),
            // edge case - a zero-step run has nothing to summarise
            None => row.resize(7, String::new()),
        }
        writer.write_record(&row)?;
    }

    writer.write_record([
        "Tank energy gained".to_string(),
        summary.tank_energy_gained.to_string(),
        "[kWh]".to_string(),
    ])?;
    writer.write_record([
        "Non-finite values".to_string(),
        summary.non_finite_count.to_string(),
        "[count]".to_string(),
    ])?;

    debug!("flushing out CSV");
    writer.flush()?;

    Ok(())
}
