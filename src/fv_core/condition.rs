extern crate nalgebra as na;

use crate::fv_core::mesh::Mesh;

//traits
pub trait InitialCondition {
    fn compute(&self, mesh: &dyn Mesh) -> na::DVector<f64>;
}

/// Resolves stencil indices at the grid edges. Fields passed to a scheme
/// must be long enough for the policy: a periodic policy needs more stored
/// nodes than its period.
pub trait BCEnforcer {
    /// Storage index of node `j + offset`.
    fn neighbour(&self, j: usize, offset: isize, len: usize) -> usize;

    /// Nodes `0..active_nodes(len)` are advanced by a scheme; the rest are
    /// filled in by `enforce`.
    fn active_nodes(&self, len: usize) -> usize;

    fn enforce(&self, u: &mut na::DVector<f64>);
}

/// How out-of-range stencil indices are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Indices are taken modulo `period`; node `period` duplicates node 0.
    Periodic { period: usize },
    /// Indices are clamped to the grid, so the edge values extend outward.
    ZeroGradient,
}

impl BoundaryPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            BoundaryPolicy::Periodic { .. } => "periodic",
            BoundaryPolicy::ZeroGradient => "zero-gradient",
        }
    }
}

//implementation for boundary
impl BCEnforcer for BoundaryPolicy {
    fn neighbour(&self, j: usize, offset: isize, len: usize) -> usize {
        let k = j as isize + offset;
        match *self {
            BoundaryPolicy::Periodic { period } => {
                debug_assert!(period < len, "periodic boundary with period {period} needs more than {len} nodes");
                k.rem_euclid(period as isize) as usize
            }
            BoundaryPolicy::ZeroGradient => k.clamp(0, len as isize - 1) as usize,
        }
    }

    fn active_nodes(&self, len: usize) -> usize {
        match *self {
            BoundaryPolicy::Periodic { period } => {
                debug_assert!(period < len, "periodic boundary with period {period} needs more than {len} nodes");
                period.min(len)
            }
            BoundaryPolicy::ZeroGradient => len,
        }
    }

    fn enforce(&self, u: &mut na::DVector<f64>) {
        if let BoundaryPolicy::Periodic { period } = *self {
            for k in period..u.len() {
                u[k] = u[k - period];
            }
        }
    }
}

pub fn initialize_mesh<I, B>(mesh: &dyn Mesh, init: &I, bc: &B) -> na::DVector<f64>
where
    I: InitialCondition,
    B: BCEnforcer,
{
    let mut u = init.compute(mesh);
    bc.enforce(&mut u);
    u
}
