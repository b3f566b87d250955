extern crate nalgebra as na;

use std::f64::consts::PI;
use std::path::Path;

use csv::Writer;
use serde::Serialize;
use tracing::info;

use crate::config::SimulationConfig;
use crate::error::FctResult;
use crate::fv_core::{
    condition::{BCEnforcer, BoundaryPolicy},
    initial::TestCase,
};
use crate::time_integrator::solver::Simulation;

#[derive(Serialize, Debug, Clone, Copy)]
pub struct RowData {
    pub mesh: usize,
    pub err_upstream: f64,
    pub err_lax_wendroff: f64,
    pub err_fct: f64,
}

fn calc_err(u_aprox: &na::DVector<f64>, u_exact: &na::DVector<f64>, active: usize, dx: f64) -> f64 {
    let mut err = 0.0;
    for i in 0..active {
        err += dx * (u_aprox[i] - u_exact[i]).abs();
    }
    err
}

/// L1 errors of all schemes for sin^6 on one period [0, pi], where the
/// periodic boundary is exact.
pub fn convergence_sine_power(mu: f64, c: f64, meshes: &[usize]) -> FctResult<Vec<RowData>> {
    let mut rows = Vec::with_capacity(meshes.len());

    for &n in meshes {
        let config = SimulationConfig {
            case: TestCase::SinePower,
            mu,
            c,
            dx: PI / n as f64,
            x_min: 0.0,
            x_max: PI,
            boundary: BoundaryPolicy::Periodic { period: n },
        };
        let result = Simulation::new(config)?.run(false)?;
        let active = config.boundary.active_nodes(result.x.len());

        let row = RowData {
            mesh: n,
            err_upstream: calc_err(&result.upstream, &result.exact, active, config.dx),
            err_lax_wendroff: calc_err(&result.lax_wendroff, &result.exact, active, config.dx),
            err_fct: calc_err(&result.fct, &result.exact, active, config.dx),
        };
        info!(
            mesh = n,
            err_upstream = row.err_upstream,
            err_lax_wendroff = row.err_lax_wendroff,
            err_fct = row.err_fct,
            "convergence level done"
        );
        rows.push(row);
    }

    Ok(rows)
}

pub fn write_convergence<P: AsRef<Path>>(rows: &[RowData], csv_path: P) -> FctResult<()> {
    let mut wtr = Writer::from_path(csv_path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
