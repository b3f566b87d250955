//! Flux-corrected transport with the Zalesak corrector (Durran, section 5.4.2).
//!
//! A step runs as separate full-grid stages:
//!
//! 1. low/high order face fluxes, antidiffusive fluxes and the transported
//!    and diffused field `u_td`,
//! 2. the cosmetic pre-limiting of the antidiffusive fluxes,
//! 3. the permissible bounds and the limiter ratios `R+`/`R-`,
//! 4. the limited antidiffusion.
//!
//! Every stage needs the previous one finished on the whole grid, so the
//! stages are never fused.

extern crate nalgebra as na;

use crate::fv_core::{
    condition::BCEnforcer,
    flux::{DonorCellFlux, FluxFunction, LaxWendroffFlux},
};
use crate::time_integrator::schemes::TimeIntegrator;

//STRUCTS
pub struct FctIntegrator<L: FluxFunction, H: FluxFunction> {
    pub low: L,
    pub high: H,
}

/// Every intermediate array of one FCT step.
#[derive(Debug, Clone)]
pub struct FctStage {
    /// Antidiffusive fluxes after the cosmetic correction.
    pub antiflux_plus: na::DVector<f64>,
    pub antiflux_minus: na::DVector<f64>,
    pub u_td: na::DVector<f64>,
    pub r_plus: na::DVector<f64>,
    pub r_minus: na::DVector<f64>,
    pub u_new: na::DVector<f64>,
    /// Number of face fluxes zeroed by the cosmetic correction.
    pub cosmetic_zeroed: usize,
}

impl FctIntegrator<DonorCellFlux, LaxWendroffFlux> {
    /// Donor-cell low order flux with a Lax-Wendroff high order flux.
    pub fn zalesak() -> Self {
        FctIntegrator {
            low: DonorCellFlux,
            high: LaxWendroffFlux,
        }
    }
}

impl<L: FluxFunction, H: FluxFunction> FctIntegrator<L, H> {
    pub fn stage(
        &self,
        u: &na::DVector<f64>,
        dx: f64,
        dt: f64,
        c: f64,
        bc: &dyn BCEnforcer,
    ) -> FctStage {
        let (low_flux_plus, low_flux_minus) = self.low.num_flux(u, c, dx, dt, bc);
        let (high_flux_plus, high_flux_minus) = self.high.num_flux(u, c, dx, dt, bc);

        let raw_plus = &high_flux_plus - &low_flux_plus;
        let raw_minus = &high_flux_minus - &low_flux_minus;

        let u_td = transported_diffused(u, &low_flux_plus, &low_flux_minus, dx, dt, bc);

        let (antiflux_plus, antiflux_minus) =
            cosmetic_correction(&raw_plus, &raw_minus, &u_td, bc);
        let cosmetic_zeroed = count_zeroed(&raw_plus, &antiflux_plus)
            + count_zeroed(&raw_minus, &antiflux_minus);

        let (r_plus, r_minus) =
            limiter_ratios(u, &u_td, &antiflux_plus, &antiflux_minus, dx, dt, bc);

        let u_new = apply_correction(
            &u_td,
            &antiflux_plus,
            &antiflux_minus,
            &r_plus,
            &r_minus,
            dx,
            dt,
            bc,
        );

        FctStage {
            antiflux_plus,
            antiflux_minus,
            u_td,
            r_plus,
            r_minus,
            u_new,
            cosmetic_zeroed,
        }
    }
}

impl<L: FluxFunction, H: FluxFunction> TimeIntegrator for FctIntegrator<L, H> {
    fn name(&self) -> &'static str {
        "FCT"
    }

    fn update(
        &self,
        u: &na::DVector<f64>,
        dx: f64,
        dt: f64,
        c: f64,
        bc: &dyn BCEnforcer,
    ) -> na::DVector<f64> {
        self.stage(u, dx, dt, c, bc).u_new
    }
}

//HELPERS
fn count_zeroed(raw: &na::DVector<f64>, corrected: &na::DVector<f64>) -> usize {
    raw.iter()
        .zip(corrected.iter())
        .filter(|(&r, &c)| r != 0.0 && c == 0.0)
        .count()
}

/// Monotone provisional update using the low order fluxes only.
pub fn transported_diffused(
    u: &na::DVector<f64>,
    low_flux_plus: &na::DVector<f64>,
    low_flux_minus: &na::DVector<f64>,
    dx: f64,
    dt: f64,
    bc: &dyn BCEnforcer,
) -> na::DVector<f64> {
    let mut u_td = u.clone();
    for j in 0..bc.active_nodes(u.len()) {
        u_td[j] = u[j] - (dt / dx) * (low_flux_plus[j] - low_flux_minus[j]);
    }
    bc.enforce(&mut u_td);
    u_td
}

/// Cosmetic pre-limiting: an antidiffusive flux that runs against the
/// `u_td` gradient across its own face is zeroed when it also runs against
/// the gradient across either neighbouring face.
pub fn cosmetic_correction(
    antiflux_plus: &na::DVector<f64>,
    antiflux_minus: &na::DVector<f64>,
    u_td: &na::DVector<f64>,
    bc: &dyn BCEnforcer,
) -> (na::DVector<f64>, na::DVector<f64>) {
    let size = u_td.len();
    let mut plus = antiflux_plus.clone();
    let mut minus = antiflux_minus.clone();

    for j in 0..bc.active_nodes(size) {
        let jm2 = bc.neighbour(j, -2, size);
        let jm = bc.neighbour(j, -1, size);
        let jp = bc.neighbour(j, 1, size);
        let jp2 = bc.neighbour(j, 2, size);

        let a = antiflux_plus[j];
        let across = a * (u_td[jp] - u_td[j]);
        let ahead = a * (u_td[jp2] - u_td[jp]);
        let behind = a * (u_td[j] - u_td[jm]);
        if across < 0.0 && (ahead < 0.0 || behind < 0.0) {
            plus[j] = 0.0;
        }

        let a = antiflux_minus[j];
        let across = a * (u_td[j] - u_td[jm]);
        let ahead = a * (u_td[jp] - u_td[j]);
        let behind = a * (u_td[jm] - u_td[jm2]);
        if across < 0.0 && (ahead < 0.0 || behind < 0.0) {
            minus[j] = 0.0;
        }
    }

    (plus, minus)
}

/// Fraction of the incoming (`R+`) and outgoing (`R-`) antidiffusive flux
/// each node can take without leaving the range of `u` and `u_td` over its
/// three-point stencil. Both ratios lie in [0, 1].
pub fn limiter_ratios(
    u: &na::DVector<f64>,
    u_td: &na::DVector<f64>,
    antiflux_plus: &na::DVector<f64>,
    antiflux_minus: &na::DVector<f64>,
    dx: f64,
    dt: f64,
    bc: &dyn BCEnforcer,
) -> (na::DVector<f64>, na::DVector<f64>) {
    let size = u.len();
    let mut r_plus = na::DVector::zeros(size);
    let mut r_minus = na::DVector::zeros(size);

    for j in 0..bc.active_nodes(size) {
        let jm = bc.neighbour(j, -1, size);
        let jp = bc.neighbour(j, 1, size);

        let stencil = [u[jm], u[j], u[jp], u_td[jm], u_td[j], u_td[jp]];
        let u_max = stencil.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let u_min = stencil.iter().copied().fold(f64::INFINITY, f64::min);

        let p_plus = antiflux_minus[j].max(0.0) - antiflux_plus[j].min(0.0);
        let q_plus = (u_max - u_td[j]) * (dx / dt);
        r_plus[j] = if p_plus > 0.0 {
            (q_plus / p_plus).min(1.0)
        } else {
            0.0
        };

        let p_minus = antiflux_plus[j].max(0.0) - antiflux_minus[j].min(0.0);
        let q_minus = (u_td[j] - u_min) * (dx / dt);
        r_minus[j] = if p_minus > 0.0 {
            (q_minus / p_minus).min(1.0)
        } else {
            0.0
        };
    }

    (r_plus, r_minus)
}

/// Scales each face flux by the more restrictive ratio of the node it
/// leaves and the node it enters, then adds it to `u_td`.
pub fn apply_correction(
    u_td: &na::DVector<f64>,
    antiflux_plus: &na::DVector<f64>,
    antiflux_minus: &na::DVector<f64>,
    r_plus: &na::DVector<f64>,
    r_minus: &na::DVector<f64>,
    dx: f64,
    dt: f64,
    bc: &dyn BCEnforcer,
) -> na::DVector<f64> {
    let size = u_td.len();
    let mut u_new = u_td.clone();

    for j in 0..bc.active_nodes(size) {
        let jm = bc.neighbour(j, -1, size);
        let jp = bc.neighbour(j, 1, size);

        let cor_plus = if antiflux_plus[j] >= 0.0 {
            r_plus[jp].min(r_minus[j])
        } else {
            r_plus[j].min(r_minus[jp])
        };

        let cor_minus = if antiflux_minus[j] >= 0.0 {
            r_plus[j].min(r_minus[jm])
        } else {
            r_plus[jm].min(r_minus[j])
        };

        u_new[j] = u_td[j]
            - (dt / dx) * (cor_plus * antiflux_plus[j] - cor_minus * antiflux_minus[j]);
    }
    bc.enforce(&mut u_new);

    u_new
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fv_core::condition::BoundaryPolicy;
    use proptest::prelude::*;

    const C: f64 = 0.3;
    const DX: f64 = 0.02;

    fn dt() -> f64 {
        0.5 * DX / C
    }

    fn periodic_field(values: &[f64]) -> na::DVector<f64> {
        let mut u = values.to_vec();
        u.push(values[0]);
        na::DVector::from_vec(u)
    }

    fn step_field(n: usize) -> na::DVector<f64> {
        na::DVector::from_iterator(n + 1, (0..=n).map(|j| if j < n / 2 { 1.0 } else { 0.0 }))
    }

    #[test]
    fn uniform_field_has_no_antidiffusion() {
        // x in [-3, 4] with dx = 0.02
        let bc = BoundaryPolicy::Periodic { period: 350 };
        let u = na::DVector::from_element(351, 1.0);
        let stage = FctIntegrator::zalesak().stage(&u, DX, dt(), C, &bc);

        assert!(stage.antiflux_plus.iter().all(|&a| a == 0.0));
        assert!(stage.antiflux_minus.iter().all(|&a| a == 0.0));
        assert!(stage.u_new.iter().all(|&v| (v - 1.0).abs() < f64::EPSILON));
    }

    #[test]
    fn zero_antiflux_returns_u_td_exactly() {
        let bc = BoundaryPolicy::Periodic { period: 6 };
        let u = periodic_field(&[0.0, 0.2, 1.0, 0.7, 0.1, 0.0]);
        let u_td = periodic_field(&[0.1, 0.3, 0.8, 0.6, 0.2, 0.05]);
        let zero = na::DVector::zeros(7);

        let (plus, minus) = cosmetic_correction(&zero, &zero, &u_td, &bc);
        let (r_plus, r_minus) = limiter_ratios(&u, &u_td, &plus, &minus, DX, dt(), &bc);
        let u_new = apply_correction(&u_td, &plus, &minus, &r_plus, &r_minus, DX, dt(), &bc);

        for (a, b) in u_new.iter().zip(u_td.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        // nothing to limit, so every ratio collapses to zero
        assert!(r_plus.iter().chain(r_minus.iter()).all(|&r| r == 0.0));
    }

    #[test]
    fn step_stays_within_initial_range() {
        let bc = BoundaryPolicy::Periodic { period: 60 };
        let fct = FctIntegrator::zalesak();
        let mut u = step_field(60);
        for _ in 0..40 {
            u = fct.update(&u, DX, dt(), C, &bc);
            assert!(u.iter().all(|&v| v >= -1e-12 && v <= 1.0 + 1e-12));
        }
    }

    #[test]
    fn fct_is_sharper_than_upstream() {
        use crate::time_integrator::schemes::UpstreamIntegrator;

        let bc = BoundaryPolicy::Periodic { period: 80 };
        let fct = FctIntegrator::zalesak();
        let mut u_fct = step_field(80);
        let mut u_up = step_field(80);
        for _ in 0..20 {
            u_fct = fct.update(&u_fct, DX, dt(), C, &bc);
            u_up = UpstreamIntegrator.update(&u_up, DX, dt(), C, &bc);
        }
        let smeared = |u: &na::DVector<f64>| u.iter().filter(|&&v| v > 0.05 && v < 0.95).count();
        assert!(smeared(&u_fct) < smeared(&u_up));
    }

    #[test]
    fn cosmetic_correction_removes_ripple_flux() {
        let bc = BoundaryPolicy::Periodic { period: 6 };
        // local maximum at node 2
        let u_td = periodic_field(&[0.0, 0.5, 1.0, 0.5, 0.0, 0.0]);
        let mut plus = na::DVector::zeros(7);
        plus[0] = -0.1;
        plus[1] = 0.1;
        plus[2] = 0.1;
        // the same faces seen from the node on their right
        let mut minus = na::DVector::zeros(7);
        minus[1] = -0.1;
        minus[2] = 0.1;
        minus[3] = 0.1;

        let (plus_c, minus_c) = cosmetic_correction(&plus, &minus, &u_td, &bc);
        assert_eq!(plus_c[0], 0.0);
        assert_eq!(plus_c[1], 0.1);
        assert_eq!(plus_c[2], 0.0);
        assert_eq!(minus_c[1], 0.0);
        assert_eq!(minus_c[2], 0.1);
        assert_eq!(minus_c[3], 0.0);
    }

    #[test]
    fn cosmetic_correction_keeps_isolated_counter_gradient_flux() {
        let bc = BoundaryPolicy::Periodic { period: 6 };
        let u_td = periodic_field(&[0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        let mut plus = na::DVector::zeros(7);
        plus[1] = 0.1;
        let mut minus = na::DVector::zeros(7);
        minus[2] = 0.1;

        let (plus_c, minus_c) = cosmetic_correction(&plus, &minus, &u_td, &bc);
        assert_eq!(plus_c[1], 0.1);
        assert_eq!(minus_c[2], 0.1);
    }

    #[test]
    #[should_panic(expected = "periodic boundary with period 10")]
    fn stage_rejects_field_shorter_than_period() {
        let bc = BoundaryPolicy::Periodic { period: 10 };
        let u = na::DVector::from_element(6, 1.0);
        FctIntegrator::zalesak().stage(&u, DX, dt(), C, &bc);
    }

    #[test]
    fn stage_fluxes_are_consistent() {
        let bc = BoundaryPolicy::Periodic { period: 6 };
        let u = periodic_field(&[0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
        let stage = FctIntegrator::zalesak().stage(&u, DX, dt(), C, &bc);
        let (low_plus, low_minus) = DonorCellFlux.num_flux(&u, C, DX, dt(), &bc);
        let (high_plus, high_minus) = LaxWendroffFlux.num_flux(&u, C, DX, dt(), &bc);
        let mut zeroed = 0;
        for j in 0..6 {
            let raw = high_plus[j] - low_plus[j];
            let kept = stage.antiflux_plus[j];
            assert!(kept == raw || kept == 0.0);
            if raw != 0.0 && kept == 0.0 {
                zeroed += 1;
            }
            let raw = high_minus[j] - low_minus[j];
            let kept = stage.antiflux_minus[j];
            assert!(kept == raw || kept == 0.0);
            if raw != 0.0 && kept == 0.0 {
                zeroed += 1;
            }
        }
        assert_eq!(zeroed, stage.cosmetic_zeroed);
        assert_eq!(stage.u_new[6], stage.u_new[0]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64, .. ProptestConfig::default()
        })]

        #[test]
        fn ratios_stay_in_unit_interval(values in prop::collection::vec(-2.0f64..2.0, 5..40)) {
            let n = values.len();
            let bc = BoundaryPolicy::Periodic { period: n };
            let u = periodic_field(&values);
            let stage = FctIntegrator::zalesak().stage(&u, DX, dt(), C, &bc);
            for j in 0..n {
                prop_assert!((0.0..=1.0).contains(&stage.r_plus[j]));
                prop_assert!((0.0..=1.0).contains(&stage.r_minus[j]));
            }
        }

        #[test]
        fn periodic_step_conserves_mass(values in prop::collection::vec(-2.0f64..2.0, 5..40)) {
            let n = values.len();
            let bc = BoundaryPolicy::Periodic { period: n };
            let u = periodic_field(&values);
            let stage = FctIntegrator::zalesak().stage(&u, DX, dt(), C, &bc);
            let before: f64 = u.iter().take(n).sum::<f64>() * DX;
            let after_td: f64 = stage.u_td.iter().take(n).sum::<f64>() * DX;
            let after: f64 = stage.u_new.iter().take(n).sum::<f64>() * DX;
            prop_assert!((before - after_td).abs() < 1e-12);
            prop_assert!((before - after).abs() < 1e-12);
        }

        #[test]
        fn update_respects_local_bounds(values in prop::collection::vec(-2.0f64..2.0, 5..40)) {
            let n = values.len();
            let size = n + 1;
            let bc = BoundaryPolicy::Periodic { period: n };
            let u = periodic_field(&values);
            let stage = FctIntegrator::zalesak().stage(&u, DX, dt(), C, &bc);
            for j in 0..n {
                let jm = bc.neighbour(j, -1, size);
                let jp = bc.neighbour(j, 1, size);
                let stencil = [u[jm], u[j], u[jp], stage.u_td[jm], stage.u_td[j], stage.u_td[jp]];
                let hi = stencil.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let lo = stencil.iter().copied().fold(f64::INFINITY, f64::min);
                prop_assert!(stage.u_new[j] <= hi + 1e-12);
                prop_assert!(stage.u_new[j] >= lo - 1e-12);
            }
        }
    }
}
