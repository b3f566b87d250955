pub mod config;
pub mod convergence;
pub mod error;
pub mod examples;
pub mod fv_core;
pub mod output;
pub mod time_integrator;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use examples::{conv_sine_power, sine_power, sine_sum, travelling_jump, RunOptions};
use fv_core::{condition::BoundaryPolicy, initial::TestCase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BoundaryArg {
    Periodic,
    ZeroGradient,
}

/// Compares the upstream, Lax-Wendroff and Zalesak flux-corrected transport
/// schemes for 1-D advection (Durran, figure 5.10).
#[derive(Parser, Debug)]
#[command(name = "fct_transport", version)]
struct Cli {
    /// Test case: a = travelling jump, b = sum of two sines, c = sine power
    #[arg(value_enum, ignore_case = true)]
    case: TestCase,

    /// Directory for the PNG plot
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Also write the final fields as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = BoundaryArg::Periodic)]
    boundary: BoundaryArg,

    /// Run the sine power grid-refinement study and write its errors as CSV
    #[arg(long)]
    convergence: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let opts = RunOptions {
        output_dir: cli.output_dir,
        csv_path: cli.csv,
        boundary: match cli.boundary {
            BoundaryArg::Periodic => None,
            BoundaryArg::ZeroGradient => Some(BoundaryPolicy::ZeroGradient),
        },
        show_progress: !cli.quiet,
    };

    match cli.case {
        TestCase::TravellingJump => travelling_jump(&opts)?,
        TestCase::SineSum => sine_sum(&opts)?,
        TestCase::SinePower => sine_power(&opts)?,
    }

    if let Some(path) = cli.convergence {
        conv_sine_power(&path)?;
    }

    Ok(())
}
