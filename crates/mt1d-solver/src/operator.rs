//! The forward-operator seam consumed by inversion drivers and the
//! verification harness.

use crate::error::Result;
use crate::simulation::Simulation;

/// A differentiable map from model space to data space.
///
/// `jtvec` must be the adjoint of `jvec`:
/// `w · jvec(m, v) = v · jtvec(m, w)` for all `m`, `v`, `w`.
pub trait ForwardOperator: Sync {
    /// Model-space dimension.
    fn n_model(&self) -> usize;

    /// Data-space dimension.
    fn n_data(&self) -> usize;

    /// Predicted data at `m`.
    fn dpred(&self, m: &[f64]) -> Result<Vec<f64>>;

    /// Jacobian applied to model-space `v`.
    fn jvec(&self, m: &[f64], v: &[f64]) -> Result<Vec<f64>>;

    /// Jacobian transpose applied to data-space `w`.
    fn jtvec(&self, m: &[f64], w: &[f64]) -> Result<Vec<f64>>;
}

impl ForwardOperator for Simulation<'_> {
    fn n_model(&self) -> usize {
        Simulation::n_model(self)
    }

    fn n_data(&self) -> usize {
        Simulation::n_data(self)
    }

    fn dpred(&self, m: &[f64]) -> Result<Vec<f64>> {
        Simulation::dpred(self, m, None)
    }

    fn jvec(&self, m: &[f64], v: &[f64]) -> Result<Vec<f64>> {
        Simulation::jvec(self, m, v, None)
    }

    fn jtvec(&self, m: &[f64], w: &[f64]) -> Result<Vec<f64>> {
        Simulation::jtvec(self, m, w, None)
    }
}
