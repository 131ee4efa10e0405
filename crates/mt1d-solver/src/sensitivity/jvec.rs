//! Directional derivative of the predicted data (`Jvec`).

use mt1d_core::{Mapping, Mesh, Survey};
use num_complex::Complex64 as C64;

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::fields::Fields;
use crate::forward::DataPlan;
use crate::parallel::map_frequencies;
use crate::simulation::Simulation;

use super::check_differentiable;
use super::linearize::{g_apply, linearize_impedance};

/// `J dσ` for a conductivity perturbation `dsigma`, in data order.
pub(crate) fn apply_jvec(
    plan: &DataPlan,
    fields: &Fields,
    dsigma: &[f64],
    config: &SimulationConfig,
) -> Result<Vec<f64>> {
    check_differentiable(fields)?;
    let map = fields.node_map();

    let per_frequency = map_frequencies(config, plan.frequencies().len(), |fi| {
        let rhs = g_apply(fields, fi, dsigma)?;
        let field = fields.at(fi)?;
        let du = field.factorization().solve(&rhs)?;

        // de = -A⁻¹ G dσ on the unknowns, zero on prescribed nodes.
        let de: Vec<C64> = (0..map.n_nodes())
            .map(|k| map.unknown(k).map_or(C64::new(0.0, 0.0), |u| -du[u]))
            .collect();

        plan.data_at(fi)
            .iter()
            .map(|&k| {
                let d = plan.data()[k];
                let lin = linearize_impedance(fields, fi, d.node)?;
                let dz = lin.apply(d.node, &de, dsigma);
                let (gx, gy) = d.component.gradient(lin.z.re, lin.z.im, field.frequency());
                Ok((k, gx * dz.re + gy * dz.im))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let mut out = vec![0.0; plan.n_data()];
    for (k, value) in per_frequency.into_iter().flatten() {
        out[k] = value;
    }
    Ok(out)
}

/// Directional derivative of `dpred` at `model` along `direction`.
pub fn jvec(
    mesh: &Mesh,
    survey: &Survey,
    mapping: &Mapping,
    model: &[f64],
    direction: &[f64],
    config: &SimulationConfig,
) -> Result<Vec<f64>> {
    Simulation::new(mesh, survey, mapping, config.clone())?.jvec(model, direction, None)
}
