use crate::error::{FctError, FctResult};
use crate::fv_core::{condition::BoundaryPolicy, initial::TestCase, mesh::Mesh1d};

/// Parameters of one comparison run. Built once at startup and only read
/// afterwards.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub case: TestCase,
    /// Courant number c dt / dx.
    pub mu: f64,
    /// Advection speed.
    pub c: f64,
    pub dx: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub boundary: BoundaryPolicy,
}

impl SimulationConfig {
    /// Setup of Durran's figure 5.10: mu = 0.5, c = 0.3 m/s, dx = 0.02 m on
    /// [-3, 4] with periodic boundaries.
    pub fn durran(case: TestCase) -> Self {
        let x_min = -3.0;
        let x_max = 4.0;
        let dx = 0.02;
        SimulationConfig {
            case,
            mu: 0.5,
            c: 0.3,
            dx,
            x_min,
            x_max,
            boundary: BoundaryPolicy::Periodic {
                period: intervals(x_min, x_max, dx),
            },
        }
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn num_intervals(&self) -> usize {
        intervals(self.x_min, self.x_max, self.dx)
    }

    pub fn dt(&self) -> f64 {
        self.mu * self.dx / self.c
    }

    pub fn time_limit(&self) -> f64 {
        self.case.time_limit(self.dt())
    }

    pub fn mesh(&self) -> Mesh1d {
        Mesh1d::new(self.x_min, self.x_max, self.num_intervals())
    }

    pub fn validate(&self) -> FctResult<()> {
        if !(self.mu > 0.0 && self.mu <= 1.0) {
            return Err(FctError::InvalidConfig(format!(
                "Courant number mu = {} must lie in (0, 1]",
                self.mu
            )));
        }
        if !(self.c > 0.0) {
            return Err(FctError::InvalidConfig(format!(
                "advection speed c = {} must be positive",
                self.c
            )));
        }
        if !(self.dx > 0.0) {
            return Err(FctError::InvalidConfig(format!(
                "grid spacing dx = {} must be positive",
                self.dx
            )));
        }
        if !(self.x_max > self.x_min) {
            return Err(FctError::InvalidConfig(format!(
                "empty domain [{}, {}]",
                self.x_min, self.x_max
            )));
        }
        let n = self.num_intervals();
        if n < 3 {
            return Err(FctError::InvalidConfig(format!(
                "{n} intervals are too few for the FCT stencil"
            )));
        }
        if let BoundaryPolicy::Periodic { period } = self.boundary {
            if period != n {
                return Err(FctError::InvalidConfig(format!(
                    "periodic boundary period {period} does not match {n} grid intervals"
                )));
            }
        }
        Ok(())
    }
}

fn intervals(x_min: f64, x_max: f64, dx: f64) -> usize {
    ((x_max - x_min) / dx).round() as usize
}
