extern crate nalgebra as na;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::FctResult;
use crate::fv_core::{
    condition::{initialize_mesh, BCEnforcer},
    flux::{DonorCellFlux, LaxWendroffFlux},
    initial::{ExactSolution, TestCase},
    mesh::{Mesh, Mesh1d},
};
use crate::time_integrator::{
    fct::{FctIntegrator, FctStage},
    schemes::{LaxWendroffIntegrator, TimeIntegrator, UpstreamIntegrator},
};

/// Fields of all schemes at the final time.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub case: TestCase,
    pub time: f64,
    pub steps: usize,
    pub dx: f64,
    pub x: Vec<f64>,
    pub exact: na::DVector<f64>,
    pub upstream: na::DVector<f64>,
    pub lax_wendroff: na::DVector<f64>,
    pub fct: na::DVector<f64>,
}

/// Advances the upstream, Lax-Wendroff and FCT schemes side by side from
/// the exact initial profile.
pub struct Simulation {
    config: SimulationConfig,
    mesh: Mesh1d,
    exact: ExactSolution,
    fct: FctIntegrator<DonorCellFlux, LaxWendroffFlux>,
    time: f64,
    steps: usize,
    u_exact: na::DVector<f64>,
    u_up: na::DVector<f64>,
    u_lw: na::DVector<f64>,
    u_fct: na::DVector<f64>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> FctResult<Self> {
        config.validate()?;

        let mesh = config.mesh();
        let exact = ExactSolution::new(config.case, config.c, config.dx);
        let u_exact = initialize_mesh(&mesh, &exact, &config.boundary);

        Ok(Simulation {
            config,
            mesh,
            exact,
            fct: FctIntegrator::zalesak(),
            time: 0.0,
            steps: 0,
            u_up: u_exact.clone(),
            u_lw: u_exact.clone(),
            u_fct: u_exact.clone(),
            u_exact,
        })
    }

    /// One time step of every scheme; returns the FCT intermediates.
    pub fn step(&mut self) -> FctStage {
        let SimulationConfig { c, dx, .. } = self.config;
        let dt = self.config.dt();
        let bc: &dyn BCEnforcer = &self.config.boundary;

        self.time += dt;
        self.steps += 1;
        self.u_exact = self.exact.evaluate(&self.mesh, self.time);

        self.u_up = UpstreamIntegrator.update(&self.u_up, dx, dt, c, bc);
        self.u_lw = LaxWendroffIntegrator.update(&self.u_lw, dx, dt, c, bc);

        let stage = self.fct.stage(&self.u_fct, dx, dt, c, bc);
        self.u_fct = stage.u_new.clone();

        let active = bc.active_nodes(self.u_fct.len());
        let r_min = stage
            .r_plus
            .rows(0, active)
            .iter()
            .chain(stage.r_minus.rows(0, active).iter())
            .copied()
            .fold(f64::INFINITY, f64::min);
        let antiflux_max = stage
            .antiflux_plus
            .rows(0, active)
            .iter()
            .chain(stage.antiflux_minus.rows(0, active).iter())
            .fold(0.0, |acc: f64, a| acc.max(a.abs()));
        let (td_min, td_max) = extrema(&stage.u_td);
        debug!(
            step = self.steps,
            time = self.time,
            cosmetic_zeroed = stage.cosmetic_zeroed,
            antiflux_max,
            td_min,
            td_max,
            r_min,
            "fct step"
        );

        stage
    }

    /// Steps until the time passes the case's limit.
    pub fn run(mut self, show_progress: bool) -> FctResult<ComparisonResult> {
        let time_limit = self.config.time_limit();
        info!(
            case = self.config.case.name(),
            mu = self.config.mu,
            c = self.config.c,
            dx = self.config.dx,
            dt = self.config.dt(),
            intervals = self.mesh.get_num_intervals(),
            boundary = self.config.boundary.name(),
            time_limit,
            "starting comparison run"
        );

        let pb = if show_progress {
            ProgressBar::new(100)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}% (eta: {eta}) {msg}",
                )?
                .progress_chars("█░"),
        );

        let initial_mass = self.mass(&self.u_fct);

        while self.time <= time_limit {
            self.step();
            let fraction = (self.time / time_limit).min(1.0);
            pb.set_position((fraction * 100.0) as u64);
        }
        pb.finish_with_message("Simulation complete");

        for (name, u) in [
            (UpstreamIntegrator.name(), &self.u_up),
            (LaxWendroffIntegrator.name(), &self.u_lw),
            (self.fct.name(), &self.u_fct),
        ] {
            let (lo, hi) = extrema(u);
            if !(lo.is_finite() && hi.is_finite()) {
                warn!(scheme = name, "non-finite values in final field");
            }
            info!(scheme = name, min = lo, max = hi, mass = self.mass(u), "final field");
        }
        info!(
            steps = self.steps,
            time = self.time,
            mass_drift = self.mass(&self.u_fct) - initial_mass,
            "comparison run complete"
        );

        Ok(ComparisonResult {
            case: self.config.case,
            time: self.time,
            steps: self.steps,
            dx: self.config.dx,
            x: self.mesh.grid_points().to_vec(),
            exact: self.u_exact,
            upstream: self.u_up,
            lax_wendroff: self.u_lw,
            fct: self.u_fct,
        })
    }

    /// Discrete integral over the nodes the scheme advances.
    pub fn mass(&self, u: &na::DVector<f64>) -> f64 {
        let active = self.config.boundary.active_nodes(u.len());
        u.iter().take(active).sum::<f64>() * self.config.dx
    }
}

fn extrema(u: &na::DVector<f64>) -> (f64, f64) {
    u.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fv_core::condition::BoundaryPolicy;

    #[test]
    fn uniform_field_stays_one() {
        let config = SimulationConfig::durran(TestCase::TravellingJump);
        let mut sim = Simulation::new(config).unwrap();
        sim.u_up = na::DVector::from_element(351, 1.0);
        sim.u_lw = sim.u_up.clone();
        sim.u_fct = sim.u_up.clone();

        let stage = sim.step();
        assert!(stage.antiflux_plus.iter().all(|&a| a == 0.0));
        assert!(stage.antiflux_minus.iter().all(|&a| a == 0.0));
        assert!(sim.u_fct.iter().all(|&v| (v - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn first_step_on_jump() {
        let config = SimulationConfig::durran(TestCase::TravellingJump);
        let mut sim = Simulation::new(config).unwrap();
        sim.step();

        assert!(sim.u_up.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(sim
            .u_fct
            .iter()
            .all(|&v| v >= -1e-12 && v <= 1.0 + 1e-12));
        let (lo, hi) = extrema(&sim.u_lw);
        assert!(hi > 1.0 || lo < 0.0);
    }

    #[test]
    fn jump_run_keeps_fct_bounded_and_ratios_in_range() {
        let config = SimulationConfig::durran(TestCase::TravellingJump);
        let mut sim = Simulation::new(config).unwrap();
        let initial_mass = sim.mass(&sim.u_fct);
        let time_limit = config.time_limit();

        while sim.time <= time_limit {
            let stage = sim.step();
            assert!(stage
                .r_plus
                .iter()
                .chain(stage.r_minus.iter())
                .all(|&r| (0.0..=1.0).contains(&r)));
            assert!(sim
                .u_fct
                .iter()
                .all(|&v| v >= -1e-12 && v <= 1.0 + 1e-12));
        }

        assert!((sim.mass(&sim.u_fct) - initial_mass).abs() < 1e-10);
        let (lo, hi) = extrema(&sim.u_lw);
        assert!(hi > 1.0 + 1e-3 || lo < -1e-3);
    }

    #[test]
    fn run_stops_after_time_limit() {
        let config = SimulationConfig::durran(TestCase::SineSum);
        let result = Simulation::new(config).unwrap().run(false).unwrap();
        assert!(result.time > config.time_limit());
        assert!(result.time - config.dt() <= config.time_limit() + 1e-12);
        assert_eq!(result.x.len(), 351);
        assert_eq!(result.fct.len(), 351);

        let mesh = config.mesh();
        let exact = ExactSolution::new(config.case, config.c, config.dx).evaluate(&mesh, result.time);
        assert_eq!(result.exact, exact);
    }

    #[test]
    fn zero_gradient_run_completes() {
        let config = SimulationConfig::durran(TestCase::SinePower)
            .with_boundary(BoundaryPolicy::ZeroGradient);
        let result = Simulation::new(config).unwrap().run(false).unwrap();
        assert!(result.fct.iter().all(|v| v.is_finite()));
        assert!(result.fct.iter().all(|&v| v >= -1e-12 && v <= 1.0 + 1e-12));
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = SimulationConfig::durran(TestCase::SinePower);
        config.mu = 1.5;
        assert!(Simulation::new(config).is_err());
    }
}
