extern crate nalgebra as na;

use std::f64::consts::PI;

use clap::ValueEnum;

use crate::fv_core::{condition::InitialCondition, mesh::Mesh};

/// The three comparison problems of Durran, section 5.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestCase {
    /// Step of height one travelling to the right.
    #[value(name = "a")]
    TravellingJump,
    /// Sum of sine waves with wavelengths 7.5 dx and 10 dx.
    #[value(name = "b")]
    SineSum,
    /// sin^6, smooth but sharply peaked.
    #[value(name = "c")]
    SinePower,
}

impl TestCase {
    /// Stopping time of the run; the sine sum only runs for 24 steps.
    pub fn time_limit(&self, dt: f64) -> f64 {
        match self {
            TestCase::TravellingJump => 1.8,
            TestCase::SineSum => 24.0 * dt,
            TestCase::SinePower => 1.8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TestCase::TravellingJump => "travelling jump",
            TestCase::SineSum => "sine sum",
            TestCase::SinePower => "sine power",
        }
    }
}

/// Analytic solution of `u_t + c u_x = 0` for one of the test cases.
#[derive(Debug, Clone, Copy)]
pub struct ExactSolution {
    pub case: TestCase,
    pub c: f64,
    pub dx: f64,
}

impl ExactSolution {
    pub fn new(case: TestCase, c: f64, dx: f64) -> Self {
        ExactSolution { case, c, dx }
    }

    pub fn profile(&self, x: f64, t: f64) -> f64 {
        let shifted = x - self.c * t;
        match self.case {
            TestCase::TravellingJump => {
                if x < self.c * t {
                    1.0
                } else {
                    0.0
                }
            }
            TestCase::SineSum => {
                (2.0 * PI / (7.5 * self.dx) * shifted).sin()
                    + (2.0 * PI / (10.0 * self.dx) * shifted).sin()
            }
            TestCase::SinePower => shifted.sin().powi(6),
        }
    }

    pub fn evaluate(&self, mesh: &dyn Mesh, t: f64) -> na::DVector<f64> {
        na::DVector::from_iterator(
            mesh.get_length(),
            mesh.grid_points().iter().map(|&x| self.profile(x, t)),
        )
    }
}

impl InitialCondition for ExactSolution {
    fn compute(&self, mesh: &dyn Mesh) -> na::DVector<f64> {
        self.evaluate(mesh, 0.0)
    }
}
