extern crate nalgebra as na;

use crate::fv_core::condition::BCEnforcer;

//TRAITS
pub trait TimeIntegrator {
    fn name(&self) -> &'static str;

    fn update(
        &self,
        u: &na::DVector<f64>,
        dx: f64,
        dt: f64,
        c: f64,
        bc: &dyn BCEnforcer,
    ) -> na::DVector<f64>;
}

//STRUCTS
pub struct UpstreamIntegrator;
pub struct LaxWendroffIntegrator;

//IMPLEMENTATIONS
impl TimeIntegrator for UpstreamIntegrator {
    fn name(&self) -> &'static str {
        "upstream"
    }

    fn update(
        &self,
        u: &na::DVector<f64>,
        dx: f64,
        dt: f64,
        c: f64,
        bc: &dyn BCEnforcer,
    ) -> na::DVector<f64> {
        let size = u.len();
        let mu = c * dt / dx;
        let mut u_new = u.clone();

        for j in 0..bc.active_nodes(size) {
            let jm = bc.neighbour(j, -1, size);
            u_new[j] = u[j] - mu * (u[j] - u[jm]);
        }
        bc.enforce(&mut u_new);

        u_new
    }
}

impl TimeIntegrator for LaxWendroffIntegrator {
    fn name(&self) -> &'static str {
        "Lax-Wendroff"
    }

    fn update(
        &self,
        u: &na::DVector<f64>,
        dx: f64,
        dt: f64,
        c: f64,
        bc: &dyn BCEnforcer,
    ) -> na::DVector<f64> {
        let size = u.len();
        let mu = c * dt / dx;
        let mut u_new = u.clone();

        for j in 0..bc.active_nodes(size) {
            let jm = bc.neighbour(j, -1, size);
            let jp = bc.neighbour(j, 1, size);
            u_new[j] = u[j] - 0.5 * mu * (u[jp] - u[jm])
                + 0.5 * mu * mu * (u[jp] - 2.0 * u[j] + u[jm]);
        }
        bc.enforce(&mut u_new);

        u_new
    }
}
