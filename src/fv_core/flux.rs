extern crate nalgebra as na;

use crate::fv_core::condition::BCEnforcer;

pub trait FluxFunction {
    /// Numerical flux through the face between `u_left` and `u_right`.
    fn face_flux(&self, u_left: f64, u_right: f64, c: f64, dx: f64, dt: f64) -> f64;

    /// Fluxes through the j+1/2 and j-1/2 faces of every active node.
    fn num_flux(
        &self,
        u: &na::DVector<f64>,
        c: f64,
        dx: f64,
        dt: f64,
        bc: &dyn BCEnforcer,
    ) -> (na::DVector<f64>, na::DVector<f64>) {
        let size = u.len();
        let mut flux_plus = na::DVector::zeros(size);
        let mut flux_minus = na::DVector::zeros(size);

        for j in 0..bc.active_nodes(size) {
            let jm = bc.neighbour(j, -1, size);
            let jp = bc.neighbour(j, 1, size);
            flux_plus[j] = self.face_flux(u[j], u[jp], c, dx, dt);
            flux_minus[j] = self.face_flux(u[jm], u[j], c, dx, dt);
        }

        (flux_plus, flux_minus)
    }
}

/// First-order donor-cell flux; monotone for Courant numbers up to one.
pub struct DonorCellFlux;

/// Second-order Lax-Wendroff flux.
pub struct LaxWendroffFlux;

impl FluxFunction for DonorCellFlux {
    fn face_flux(&self, u_left: f64, u_right: f64, c: f64, _dx: f64, _dt: f64) -> f64 {
        0.5 * c * (u_left + u_right) - 0.5 * c.abs() * (u_right - u_left)
    }
}

impl FluxFunction for LaxWendroffFlux {
    fn face_flux(&self, u_left: f64, u_right: f64, c: f64, dx: f64, dt: f64) -> f64 {
        0.5 * c * (u_left + u_right) - 0.5 * c * c * (dt / dx) * (u_right - u_left)
    }
}
