//! Linearizations shared by `Jvec` and `Jtvec`.

use num_complex::Complex64 as C64;

use crate::assembly::{self, iwmu};
use crate::config::BottomBoundary;
use crate::error::{Error, Result};
use crate::fields::{Fields, impedance_from_flux};

const ZERO: C64 = C64::new(0.0, 0.0);

/// First-order model of the impedance at a node `j`:
/// `dZ = de_top·dE_j + de_bottom·dE_{j+1} + dsigma·dσ_j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpedanceLinearization {
    pub z: C64,
    pub de_top: C64,
    pub de_bottom: C64,
    pub dsigma: C64,
}

impl ImpedanceLinearization {
    /// `dZ` for node-field perturbation `de` and cell perturbation `dsigma`.
    pub fn apply(&self, node: usize, de: &[C64], dsigma: &[f64]) -> C64 {
        self.de_top * de[node] + self.de_bottom * de[node + 1] + self.dsigma * dsigma[node]
    }
}

/// Linearize `Z = iωμ₀ E_j / F_j` at frequency `index` and node `node`.
pub fn linearize_impedance(
    fields: &Fields,
    index: usize,
    node: usize,
) -> Result<ImpedanceLinearization> {
    let f = fields.at(index)?;
    let flux = fields.flux_at(index, node)?;
    let (h, sigma) = (fields.widths()[node], fields.sigma()[node]);
    let e = f.e_field();
    let z = impedance_from_flux(f, node, h, flux)?;

    let (series, shunt) = assembly::cell_admittances(f.omega(), sigma, h);
    let (dflux_dsigma, _) = assembly::cell_rows(f.omega(), h, e[node], e[node + 1]);
    let ratio = z / flux;
    Ok(ImpedanceLinearization {
        z,
        de_top: iwmu(f.omega()) / flux - ratio * (series + shunt),
        de_bottom: ratio * series,
        dsigma: -ratio * dflux_dsigma,
    })
}

/// `G dσ` at frequency `index`, over the system's unknowns.
pub fn g_apply(fields: &Fields, index: usize, dsigma: &[f64]) -> Result<Vec<C64>> {
    let f = fields.at(index)?;
    let map = fields.node_map();
    let e = f.e_field();
    let widths = fields.widths();
    check_len(widths.len(), dsigma.len())?;

    let mut out = vec![ZERO; map.n_unknowns()];
    for (i, (&h, &ds)) in widths.iter().zip(dsigma).enumerate() {
        let (top, bottom) = assembly::cell_rows(f.omega(), h, e[i], e[i + 1]);
        if let Some(u) = map.unknown(i) {
            out[u] += top * ds;
        }
        if let Some(u) = map.unknown(i + 1) {
            out[u] += bottom * ds;
        }
    }
    if let Some((u, coeff)) = bottom_row(fields, f.omega(), e) {
        out[u] += coeff * dsigma[widths.len() - 1];
    }
    Ok(out)
}

/// `Gᵀ λ` at frequency `index`, one entry per cell.
pub fn g_transpose_apply(fields: &Fields, index: usize, lambda: &[C64]) -> Result<Vec<C64>> {
    let f = fields.at(index)?;
    let map = fields.node_map();
    let e = f.e_field();
    let widths = fields.widths();
    check_len(map.n_unknowns(), lambda.len())?;

    let mut out: Vec<C64> = widths
        .iter()
        .enumerate()
        .map(|(i, &h)| {
            let (top, bottom) = assembly::cell_rows(f.omega(), h, e[i], e[i + 1]);
            let mut g = ZERO;
            if let Some(u) = map.unknown(i) {
                g += top * lambda[u];
            }
            if let Some(u) = map.unknown(i + 1) {
                g += bottom * lambda[u];
            }
            g
        })
        .collect();
    if let Some((u, coeff)) = bottom_row(fields, f.omega(), e) {
        out[widths.len() - 1] += coeff * lambda[u];
    }
    Ok(out)
}

/// Contribution of the half-space admittance to `G`: the row of the bottom
/// unknown and `E_N ∂k_b/∂σ_last`.
fn bottom_row(fields: &Fields, omega: f64, e: &[C64]) -> Option<(usize, C64)> {
    if fields.boundary() != BottomBoundary::HalfSpace {
        return None;
    }
    let n = fields.widths().len();
    let u = fields.node_map().unknown(n)?;
    let dk = assembly::bottom_admittance_derivative(omega, fields.sigma()[n - 1]);
    Some((u, e[n] * dk))
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionMismatch { expected, actual });
    }
    Ok(())
}
