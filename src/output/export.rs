use std::path::Path;

use csv::Writer;
use serde::Serialize;

use crate::error::FctResult;
use crate::time_integrator::solver::ComparisonResult;

#[derive(Serialize)]
struct RowData {
    x: f64,
    u_exact: f64,
    u_upstream: f64,
    u_lax_wendroff: f64,
    u_fct: f64,
}

/// Writes the final fields of every scheme, one grid node per row.
pub fn write_comparison<P: AsRef<Path>>(result: &ComparisonResult, csv_path: P) -> FctResult<()> {
    let mut wtr = Writer::from_path(csv_path)?;

    for (i, &x) in result.x.iter().enumerate() {
        let row = RowData {
            x,
            u_exact: result.exact[i],
            u_upstream: result.upstream[i],
            u_lax_wendroff: result.lax_wendroff[i],
            u_fct: result.fct[i],
        };
        wtr.serialize(row)?;
    }
    wtr.flush()?;

    Ok(())
}
