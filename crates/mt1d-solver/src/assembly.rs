//! Per-frequency assembly of the discretized 1D MT equation.
//!
//! Linear elements for `E` on the mesh nodes solve `-E'' + iωμ₀σE = 0`.
//! With `s = iωμ₀σh`, cell `i` stamps a ladder section:
//! series admittance `1/h - s/6` between nodes `i` and `i+1`, and shunt
//! admittance `s/2` from each node to ground. Node 0 is driven at `E = 1`.

use mt1d_core::MU_0;
use num_complex::Complex64 as C64;

use crate::config::BottomBoundary;
use crate::error::{Error, Result};
use crate::ladder::LadderSystem;

const ONE: C64 = C64::new(1.0, 0.0);

/// Mapping from mesh nodes to unknowns of the per-frequency system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeMap {
    n_cells: usize,
    boundary: BottomBoundary,
}

impl NodeMap {
    pub fn new(n_cells: usize, boundary: BottomBoundary) -> Self {
        Self { n_cells, boundary }
    }

    pub fn n_nodes(&self) -> usize {
        self.n_cells + 1
    }

    pub fn n_unknowns(&self) -> usize {
        match self.boundary {
            BottomBoundary::HalfSpace => self.n_cells,
            BottomBoundary::Dirichlet => self.n_cells - 1,
        }
    }

    /// Unknown index of mesh node `k`, or `None` if its value is prescribed.
    pub fn unknown(&self, k: usize) -> Option<usize> {
        if k == 0 || (k == self.n_cells && self.boundary == BottomBoundary::Dirichlet) {
            None
        } else {
            Some(k - 1)
        }
    }
}

/// `iωμ₀`
pub fn iwmu(omega: f64) -> C64 {
    C64::new(0.0, omega * MU_0)
}

/// Series and shunt admittances of a cell.
pub fn cell_admittances(omega: f64, sigma: f64, h: f64) -> (C64, C64) {
    let s = iwmu(omega) * sigma * h;
    (1.0 / h - s / 6.0, s / 2.0)
}

/// Outgoing-wave admittance `k_b = √(iωμ₀σ)` at the bottom node.
pub fn bottom_admittance(omega: f64, sigma: f64) -> C64 {
    (iwmu(omega) * sigma).sqrt()
}

/// Downward flux `-E'` at the top node of a cell, from the cell's own
/// stamp. This is the ladder current entering the cell.
pub fn cell_flux(omega: f64, sigma: f64, h: f64, e_top: C64, e_bottom: C64) -> C64 {
    let (series, shunt) = cell_admittances(omega, sigma, h);
    series * (e_top - e_bottom) + shunt * e_top
}

/// Derivatives of a cell's residual rows with respect to its conductivity:
/// `(∂r_top/∂σ, ∂r_bottom/∂σ)` at the field values `e_top`, `e_bottom`.
pub fn cell_rows(omega: f64, h: f64, e_top: C64, e_bottom: C64) -> (C64, C64) {
    let a = iwmu(omega) * h;
    (
        a * (e_top / 3.0 + e_bottom / 6.0),
        a * (e_top / 6.0 + e_bottom / 3.0),
    )
}

/// `∂k_b/∂σ` for the half-space bottom admittance.
pub fn bottom_admittance_derivative(omega: f64, sigma: f64) -> C64 {
    iwmu(omega) / (2.0 * bottom_admittance(omega, sigma))
}

/// Reject conductivities the discretization cannot represent.
pub fn check_conductivity(sigma: &[f64]) -> Result<()> {
    match sigma.iter().position(|s| !(s.is_finite() && *s >= 0.0)) {
        Some(index) => Err(Error::NonPhysicalConductivity {
            index,
            value: sigma[index],
        }),
        None => Ok(()),
    }
}

/// Assemble the system for one angular frequency.
pub fn assemble(
    widths: &[f64],
    sigma: &[f64],
    omega: f64,
    boundary: BottomBoundary,
) -> Result<LadderSystem> {
    if sigma.len() != widths.len() {
        return Err(Error::DimensionMismatch {
            expected: widths.len(),
            actual: sigma.len(),
        });
    }
    check_conductivity(sigma)?;
    if widths.is_empty() {
        return Err(Error::InvalidConfiguration("mesh has no cells".into()));
    }

    let map = NodeMap::new(widths.len(), boundary);
    let mut system = LadderSystem::new(map.n_unknowns());

    for (i, (&h, &s)) in widths.iter().zip(sigma).enumerate() {
        let (series, shunt) = cell_admittances(omega, s, h);
        let (top, bottom) = (map.unknown(i), map.unknown(i + 1));
        match (i, bottom) {
            (0, Some(b)) => system.stamp_driven_admittance(b, series, ONE),
            _ => system.stamp_admittance(top, bottom, series),
        }
        system.stamp_admittance(top, None, shunt);
        system.stamp_admittance(bottom, None, shunt);
    }

    if boundary == BottomBoundary::HalfSpace {
        let n = widths.len();
        system.stamp_admittance(map.unknown(n), None, bottom_admittance(omega, sigma[n - 1]));
    }

    Ok(system)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverStrategy;

    #[test]
    fn test_node_map() {
        let hs = NodeMap::new(3, BottomBoundary::HalfSpace);
        assert_eq!(hs.n_unknowns(), 3);
        assert_eq!(hs.unknown(0), None);
        assert_eq!(hs.unknown(3), Some(2));

        let dir = NodeMap::new(3, BottomBoundary::Dirichlet);
        assert_eq!(dir.n_unknowns(), 2);
        assert_eq!(dir.unknown(2), Some(1));
        assert_eq!(dir.unknown(3), None);
    }

    #[test]
    fn test_assembled_matrix_is_symmetric() {
        let widths = [10.0, 20.0, 40.0, 80.0];
        let sigma = [0.1, 0.01, 1.0, 0.05];
        let sys = assemble(&widths, &sigma, 10.0, BottomBoundary::HalfSpace).unwrap();
        let m = sys.to_dense_matrix();
        assert_eq!(m.nrows(), 4);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(m[(i, j)], m[(j, i)]);
            }
        }
        // Only node 1 sees the driven surface node.
        let (series, _) = cell_admittances(10.0, 0.1, 10.0);
        assert_eq!(sys.rhs()[0], series);
        assert_eq!(sys.rhs()[1], C64::new(0.0, 0.0));
    }

    #[test]
    fn test_zero_frequency_is_linear_profile() {
        // At ω = 0 with E(L) = 0 the field decays linearly from the surface.
        let widths = [1.0, 1.0, 2.0];
        let sys = assemble(&widths, &[1.0; 3], 0.0, BottomBoundary::Dirichlet).unwrap();
        let x = sys
            .factorize(SolverStrategy::Tridiagonal)
            .unwrap()
            .solve(sys.rhs())
            .unwrap();
        assert!((x[0] - C64::new(0.75, 0.0)).norm() < 1e-14);
        assert!((x[1] - C64::new(0.5, 0.0)).norm() < 1e-14);
    }

    #[test]
    fn test_rejects_bad_conductivity() {
        let err = assemble(&[1.0, 1.0], &[0.1, -1.0], 1.0, BottomBoundary::HalfSpace);
        assert!(matches!(
            err,
            Err(Error::NonPhysicalConductivity { index: 1, .. })
        ));
        let err = assemble(&[1.0, 1.0], &[0.1, f64::NAN], 1.0, BottomBoundary::HalfSpace);
        assert!(matches!(err, Err(Error::NonPhysicalConductivity { .. })));
        let err = assemble(&[1.0, 1.0], &[0.1], 1.0, BottomBoundary::HalfSpace);
        assert!(matches!(err, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_cell_rows_match_admittance_derivative() {
        let (omega, h, s) = (3.0, 25.0, 0.2);
        let (et, eb) = (C64::new(0.9, -0.1), C64::new(0.4, 0.3));
        let ds = 1e-6;
        let flux = |sig| cell_flux(omega, sig, h, et, eb);
        let fd = (flux(s + ds) - flux(s - ds)) / (2.0 * ds);
        let (top, _) = cell_rows(omega, h, et, eb);
        assert!((top - fd).norm() < 1e-8 * top.norm().max(1.0));
    }
}
