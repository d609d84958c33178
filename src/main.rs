extern crate swh;

use clap::Parser;
use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use swh::input::RadiationGain;
use swh::output::FileOutput;
use swh::{run_project_with_overrides, CalculationResultsWithContext, ProjectFlags};
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct SwhArgs {
    input_file: String,
    #[arg(long, help = "Number of timesteps to simulate, overriding the input file")]
    steps: Option<usize>,
    #[arg(long, help = "Timestep duration in seconds, overriding the input file")]
    timestep: Option<f64>,
    #[arg(long, default_value_t = false, help = "Model sunrise and sunset")]
    diurnal_cycle: bool,
    #[arg(
        long,
        default_value_t = false,
        help = "Scale the radiation absorbed by the panel by the timestep duration"
    )]
    scaled_radiation_gain: bool,
    #[arg(
        long,
        short,
        default_value_t = false,
        help = "Run preprocessing step only"
    )]
    preprocess_only: bool,
    #[arg(
        long,
        default_value_t = false,
        help = "Also write a summary of each temperature series"
    )]
    summary: bool,
    #[arg(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
}

fn main() -> anyhow::Result<()> {
    let args = SwhArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(tracing::Level::INFO);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)?;

    let input_file = args.input_file.as_str();
    let input_file_ext = Path::new(input_file).extension().and_then(OsStr::to_str);
    let input_file_stem = match input_file_ext {
        Some(ext) => &input_file[..(input_file.len() - ext.len() - 1)],
        None => input_file,
    };
    let input_file_stem = PathBuf::from(input_file_stem);
    let input_file_name = input_file_stem
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("swh");

    let mut output_path = PathBuf::new();
    output_path.push(format!("{}__results", input_file_stem.display()));
    fs::create_dir_all(&output_path)?;
    let file_output = FileOutput::new(output_path.clone(), format!("{input_file_name}__{{}}.{{}}"));

    let project_flags = (&args).into();

    let response = run_project_with_overrides(
        BufReader::new(File::open(Path::new(input_file))?),
        &file_output,
        &project_flags,
        |input| {
            if let Some(steps) = args.steps {
                input.set_steps(steps);
            }
            if let Some(timestep) = args.timestep {
                input.set_timestep(timestep);
            }
            if args.diurnal_cycle {
                input.set_diurnal_cycle(true);
            }
            if args.scaled_radiation_gain {
                input.set_radiation_gain(RadiationGain::ScaledByTimestep);
            }
        },
    )?;

    if let Some(CalculationResultsWithContext { summary, .. }) = response {
        info!(
            tank_energy_gained_kwh = summary.tank_energy_gained,
            non_finite_values = summary.non_finite_count,
            "results written to {}",
            output_path.display()
        );
    }

    Ok(())
}

impl From<&SwhArgs> for ProjectFlags {
    fn from(args: &SwhArgs) -> Self {
        let mut flags = ProjectFlags::empty();
        if args.preprocess_only {
            flags.insert(ProjectFlags::PREPROCESS_ONLY);
        }
        if args.summary {
            flags.insert(ProjectFlags::SUMMARY_OUTPUT);
        }

        flags
    }
}
