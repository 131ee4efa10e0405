//! Solved field profiles for one conductivity model.
//!
//! A [`Fields`] holds, for every survey frequency, the electric field at all
//! mesh nodes together with the factorized system that produced it, so the
//! sensitivity solves can reuse the factors for `A⁻¹` and `A⁻ᵀ`.

use mt1d_core::{Mesh, angular_frequency, skin_depth};
use num_complex::Complex64 as C64;

use crate::assembly::{self, NodeMap, iwmu};
use crate::config::{BottomBoundary, SimulationConfig};
use crate::error::{Error, Result};
use crate::linear::Factorization;
use crate::parallel::map_frequencies;

/// Fluxes below this fraction of `|E|/h` are treated as zero.
const FLUX_TOLERANCE: f64 = 1e-10;

/// Field solution at a single frequency.
#[derive(Debug, Clone)]
pub struct FrequencyField {
    frequency: f64,
    omega: f64,
    /// `E` at every mesh node; `field[0] = 1`.
    field: Vec<C64>,
    factorization: Factorization,
}

impl FrequencyField {
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Electric field at every mesh node, surface first.
    pub fn e_field(&self) -> &[C64] {
        &self.field
    }

    pub fn factorization(&self) -> &Factorization {
        &self.factorization
    }
}

/// Fields for every frequency of a survey, computed for one model.
#[derive(Debug, Clone)]
pub struct Fields {
    widths: Vec<f64>,
    sigma: Vec<f64>,
    boundary: BottomBoundary,
    frequencies: Vec<FrequencyField>,
}

impl Fields {
    /// Assemble and solve the system at each frequency.
    pub fn compute(
        mesh: &Mesh,
        sigma: &[f64],
        frequencies: &[f64],
        config: &SimulationConfig,
    ) -> Result<Self> {
        let widths = mesh.widths();
        if sigma.len() != widths.len() {
            return Err(Error::DimensionMismatch {
                expected: widths.len(),
                actual: sigma.len(),
            });
        }
        assembly::check_conductivity(sigma)?;
        warn_unresolved(mesh, sigma, frequencies);

        let map = NodeMap::new(widths.len(), config.bottom_boundary);
        let solved = map_frequencies(config, frequencies.len(), |i| {
            solve_frequency(widths, sigma, frequencies[i], map, config)
        })?;

        Ok(Self {
            widths: widths.to_vec(),
            sigma: sigma.to_vec(),
            boundary: config.bottom_boundary,
            frequencies: solved,
        })
    }

    /// Conductivity the fields were computed for.
    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn boundary(&self) -> BottomBoundary {
        self.boundary
    }

    pub fn node_map(&self) -> NodeMap {
        NodeMap::new(self.widths.len(), self.boundary)
    }

    pub fn n_frequencies(&self) -> usize {
        self.frequencies.len()
    }

    pub fn frequencies(&self) -> impl Iterator<Item = f64> + '_ {
        self.frequencies.iter().map(|f| f.frequency)
    }

    pub fn get(&self, index: usize) -> Option<&FrequencyField> {
        self.frequencies.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrequencyField> {
        self.frequencies.iter()
    }

    /// Downward flux `-E'` at `node`, from the cell below it.
    pub fn flux_at(&self, index: usize, node: usize) -> Result<C64> {
        let f = self.at(index)?;
        self.check_node(node)?;
        Ok(assembly::cell_flux(
            f.omega,
            self.sigma[node],
            self.widths[node],
            f.field[node],
            f.field[node + 1],
        ))
    }

    /// Magnetic field `H = -E'/(iωμ₀)` at every node above the bottom.
    pub fn h_field(&self, index: usize) -> Result<Vec<C64>> {
        let f = self.at(index)?;
        (0..self.widths.len())
            .map(|node| Ok(self.flux_at(index, node)? / iwmu(f.omega)))
            .collect()
    }

    /// Impedance `Z = E/H` at `node`.
    pub fn impedance_at(&self, index: usize, node: usize) -> Result<C64> {
        let f = self.at(index)?;
        let flux = self.flux_at(index, node)?;
        impedance_from_flux(f, node, self.widths[node], flux)
    }

    /// Field at frequency index `index`.
    pub fn at(&self, index: usize) -> Result<&FrequencyField> {
        self.frequencies.get(index).ok_or_else(|| {
            Error::InvalidConfiguration(format!(
                "frequency index {} out of range ({} frequencies)",
                index,
                self.frequencies.len()
            ))
        })
    }

    fn check_node(&self, node: usize) -> Result<()> {
        if node >= self.widths.len() {
            return Err(Error::InvalidConfiguration(format!(
                "node {} has no cell below it (mesh has {} cells)",
                node,
                self.widths.len()
            )));
        }
        Ok(())
    }
}

/// `Z = iωμ₀ E / F` at `node`, whose cell below has width `h`. A vanishing
/// flux means the system has no usable impedance at this frequency.
pub(crate) fn impedance_from_flux(
    field: &FrequencyField,
    node: usize,
    h: f64,
    flux: C64,
) -> Result<C64> {
    let e = field.field[node];
    let z = iwmu(field.omega) * e / flux;
    if flux.norm() <= FLUX_TOLERANCE * e.norm() / h || !z.is_finite() {
        return Err(Error::SingularSystem {
            frequency: field.frequency,
        });
    }
    Ok(z)
}

fn solve_frequency(
    widths: &[f64],
    sigma: &[f64],
    frequency: f64,
    map: NodeMap,
    config: &SimulationConfig,
) -> Result<FrequencyField> {
    let omega = angular_frequency(frequency);
    let system = assembly::assemble(widths, sigma, omega, config.bottom_boundary)?;
    let singular = |e: Error| match e {
        Error::SingularMatrix => Error::SingularSystem { frequency },
        other => other,
    };
    let factorization = system.factorize(config.solver).map_err(singular)?;
    let x = factorization.solve(system.rhs()).map_err(singular)?;

    let field: Vec<C64> = (0..map.n_nodes())
        .map(|k| match map.unknown(k) {
            Some(u) => x[u],
            None if k == 0 => C64::new(1.0, 0.0),
            None => C64::new(0.0, 0.0),
        })
        .collect();
    if field.iter().any(|e| !e.is_finite()) {
        return Err(Error::SingularSystem { frequency });
    }

    log::debug!(
        "solved {} unknowns at {:.4e} Hz ({})",
        map.n_unknowns(),
        frequency,
        config.solver
    );

    Ok(FrequencyField {
        frequency,
        omega,
        field,
        factorization,
    })
}

fn warn_unresolved(mesh: &Mesh, sigma: &[f64], frequencies: &[f64]) {
    let fmax = frequencies.iter().copied().fold(0.0_f64, f64::max);
    let (Some(&h0), Some(&s0)) = (mesh.widths().first(), sigma.first()) else {
        return;
    };
    if fmax > 0.0 && s0 > 0.0 {
        let delta = skin_depth(fmax, s0);
        if h0 > delta {
            log::warn!(
                "surface cell ({:.3e} m) is thicker than the skin depth ({:.3e} m) at {:.3e} Hz",
                h0,
                delta,
                fmax
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt1d_core::{MeshParams, logspace};

    fn halfspace_fields(config: &SimulationConfig) -> (Mesh, Fields) {
        let freqs = logspace(1e-2, 1e2, 5).unwrap();
        let mesh = MeshParams::new(0.01, freqs.clone()).build().unwrap();
        let sigma = vec![0.01; mesh.n_cells()];
        let fields = Fields::compute(&mesh, &sigma, &freqs, config).unwrap();
        (mesh, fields)
    }

    #[test]
    fn test_surface_value_and_decay() {
        let (mesh, fields) = halfspace_fields(&SimulationConfig::default());
        assert_eq!(fields.n_frequencies(), 5);
        for f in fields.iter() {
            let e = f.e_field();
            assert_eq!(e.len(), mesh.n_nodes());
            assert_eq!(e[0], C64::new(1.0, 0.0));
            assert!(e[e.len() - 1].norm() < e[0].norm());
        }
    }

    #[test]
    fn test_halfspace_impedance() {
        let (_, fields) = halfspace_fields(&SimulationConfig::default());
        for (i, f) in fields.iter().enumerate() {
            let z = fields.impedance_at(i, 0).unwrap();
            let exact = (iwmu(f.omega()) / 0.01).sqrt();
            let err = (z - exact).norm() / exact.norm();
            assert!(err < 0.01, "f = {}: rel err {}", f.frequency(), err);
        }
    }

    #[test]
    fn test_h_field_matches_impedance() {
        let (_, fields) = halfspace_fields(&SimulationConfig::default());
        let h = fields.h_field(2).unwrap();
        let f = fields.get(2).unwrap();
        let z = fields.impedance_at(2, 0).unwrap();
        assert!((f.e_field()[0] / h[0] - z).norm() < 1e-12 * z.norm());
    }

    #[test]
    fn test_dirichlet_bottom_is_zero() {
        let config = SimulationConfig::default().with_bottom_boundary(BottomBoundary::Dirichlet);
        let (_, fields) = halfspace_fields(&config);
        for f in fields.iter() {
            assert_eq!(f.e_field()[f.e_field().len() - 1], C64::new(0.0, 0.0));
        }
    }

    #[test]
    fn test_zero_conductivity_is_singular() {
        let mesh = Mesh::from_widths(vec![10.0; 4]).unwrap();
        let fields =
            Fields::compute(&mesh, &[0.0; 4], &[1.0], &SimulationConfig::default()).unwrap();
        assert!(matches!(
            fields.impedance_at(0, 0),
            Err(Error::SingularSystem { .. })
        ));
    }

    #[test]
    fn test_node_out_of_range() {
        let (mesh, fields) = halfspace_fields(&SimulationConfig::default());
        assert!(fields.impedance_at(0, mesh.n_cells()).is_err());
        assert!(fields.impedance_at(99, 0).is_err());
    }

    #[test]
    fn test_frequency_index_out_of_range() {
        let (_, fields) = halfspace_fields(&SimulationConfig::default());
        let n = fields.n_frequencies();
        assert!(fields.at(n - 1).is_ok());
        match fields.at(n) {
            Err(Error::InvalidConfiguration(msg)) => {
                assert!(msg.contains(&format!("index {}", n)), "{}", msg)
            }
            other => panic!("expected InvalidConfiguration, got {:?}", other.map(|_| ())),
        }
    }
}
