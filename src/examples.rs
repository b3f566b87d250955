use std::error::Error;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::SimulationConfig;
use crate::convergence::{convergence_sine_power, write_convergence};
use crate::fv_core::{condition::BoundaryPolicy, initial::TestCase};
use crate::output::{
    export::write_comparison,
    plot::{file_name, plot_comparison, PlotConfig},
};
use crate::time_integrator::solver::Simulation;

/// Output and boundary choices shared by the case drivers.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub output_dir: PathBuf,
    pub csv_path: Option<PathBuf>,
    /// Replaces the default periodic boundary.
    pub boundary: Option<BoundaryPolicy>,
    pub show_progress: bool,
}

fn run_case(case: TestCase, opts: &RunOptions) -> Result<(), Box<dyn Error>> {
    let mut config = SimulationConfig::durran(case);
    if let Some(boundary) = opts.boundary {
        config = config.with_boundary(boundary);
    }

    let result = Simulation::new(config)?.run(opts.show_progress)?;

    let png_path = opts.output_dir.join(file_name(case));
    plot_comparison(&result, &png_path, &PlotConfig::for_case(case, config.dx))?;
    info!(path = %png_path.display(), "plot written");

    if let Some(csv_path) = &opts.csv_path {
        write_comparison(&result, csv_path)?;
        info!(path = %csv_path.display(), "fields written");
    }

    Ok(())
}

pub fn travelling_jump(opts: &RunOptions) -> Result<(), Box<dyn Error>> {
    run_case(TestCase::TravellingJump, opts)
}

pub fn sine_sum(opts: &RunOptions) -> Result<(), Box<dyn Error>> {
    run_case(TestCase::SineSum, opts)
}

pub fn sine_power(opts: &RunOptions) -> Result<(), Box<dyn Error>> {
    run_case(TestCase::SinePower, opts)
}

pub fn conv_sine_power(csv_path: &Path) -> Result<(), Box<dyn Error>> {
    let mu = 0.5;
    let c = 0.3;
    let meshes = [32, 64, 128, 256];

    let rows = convergence_sine_power(mu, c, &meshes)?;
    write_convergence(&rows, csv_path)?;
    info!(path = %csv_path.display(), "convergence table written");

    Ok(())
}
