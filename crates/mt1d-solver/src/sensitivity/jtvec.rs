//! Adjoint action of the sensitivity (`Jtvec`).

use mt1d_core::{Mapping, Mesh, Survey};
use num_complex::Complex64 as C64;

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::fields::Fields;
use crate::forward::DataPlan;
use crate::parallel::map_frequencies;
use crate::simulation::Simulation;

use super::check_differentiable;
use super::linearize::{g_transpose_apply, linearize_impedance};

const ZERO: C64 = C64::new(0.0, 0.0);

/// `Jᵀ w` with respect to conductivity, one entry per cell.
///
/// Per frequency, the data weights are spread onto the field unknowns
/// (`a`) and the receiver cells (`c`); then `λ = A⁻ᵀ a` and the cell result
/// is `Re(c - Gᵀ λ)`. Frequencies are summed in ascending order.
pub(crate) fn apply_jtvec(
    plan: &DataPlan,
    fields: &Fields,
    weights: &[f64],
    config: &SimulationConfig,
) -> Result<Vec<f64>> {
    check_differentiable(fields)?;
    let map = fields.node_map();
    let n_cells = fields.widths().len();

    let per_frequency = map_frequencies(config, plan.frequencies().len(), |fi| {
        let field = fields.at(fi)?;
        let mut a = vec![ZERO; map.n_unknowns()];
        let mut c = vec![ZERO; n_cells];

        for &k in plan.data_at(fi) {
            let d = plan.data()[k];
            let lin = linearize_impedance(fields, fi, d.node)?;
            let (gx, gy) = d.component.gradient(lin.z.re, lin.z.im, field.frequency());
            let coeff = weights[k] * C64::new(gx, -gy);
            if let Some(u) = map.unknown(d.node) {
                a[u] += coeff * lin.de_top;
            }
            if let Some(u) = map.unknown(d.node + 1) {
                a[u] += coeff * lin.de_bottom;
            }
            c[d.node] += coeff * lin.dsigma;
        }

        let lambda = field.factorization().solve_transpose(&a)?;
        let gt = g_transpose_apply(fields, fi, &lambda)?;
        Ok(c.iter().zip(&gt).map(|(c, g)| (c - g).re).collect::<Vec<f64>>())
    })?;

    let mut out = vec![0.0; n_cells];
    for contribution in &per_frequency {
        for (o, x) in out.iter_mut().zip(contribution) {
            *o += x;
        }
    }
    Ok(out)
}

/// Adjoint of [`jvec`](super::jvec) at `model`, applied to data-space `weights`.
pub fn jtvec(
    mesh: &Mesh,
    survey: &Survey,
    mapping: &Mapping,
    model: &[f64],
    weights: &[f64],
    config: &SimulationConfig,
) -> Result<Vec<f64>> {
    Simulation::new(mesh, survey, mapping, config.clone())?.jtvec(model, weights, None)
}
