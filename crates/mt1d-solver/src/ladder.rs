//! Stamped tridiagonal system for a chain of nodes.
//!
//! The discretized 1D equation has the structure of an RC-like ladder:
//! each cell contributes a series admittance between neighbouring nodes and
//! a shunt admittance from each node to ground. Unknowns are indexed
//! `0..size`; `None` denotes a node whose value is fixed to zero (ground).

use num_complex::Complex64 as C64;

use crate::config::SolverStrategy;
use crate::error::Result;
use crate::linear::Factorization;

const ZERO: C64 = C64::new(0.0, 0.0);

/// Complex tridiagonal system `A x = b` built by stamping admittances.
#[derive(Debug, Clone)]
pub struct LadderSystem {
    /// Sub-diagonal, `lower[i] = A[i+1][i]`.
    lower: Vec<C64>,
    diag: Vec<C64>,
    /// Super-diagonal, `upper[i] = A[i][i+1]`.
    upper: Vec<C64>,
    rhs: Vec<C64>,
}

impl LadderSystem {
    pub fn new(size: usize) -> Self {
        let off = size.saturating_sub(1);
        Self {
            lower: vec![ZERO; off],
            diag: vec![ZERO; size],
            upper: vec![ZERO; off],
            rhs: vec![ZERO; size],
        }
    }

    pub fn size(&self) -> usize {
        self.diag.len()
    }

    pub fn diag(&self) -> &[C64] {
        &self.diag
    }

    pub fn rhs(&self) -> &[C64] {
        &self.rhs
    }

    /// Stamp an admittance `y` between two nodes.
    ///
    /// Both nodes, when present, must be adjacent (`|i - j| = 1`):
    ///   A[i,i] += y,  A[j,j] += y
    ///   A[i,j] -= y,  A[j,i] -= y
    pub fn stamp_admittance(&mut self, node_i: Option<usize>, node_j: Option<usize>, y: C64) {
        if let Some(i) = node_i {
            self.diag[i] += y;
        }
        if let Some(j) = node_j {
            self.diag[j] += y;
        }
        if let (Some(i), Some(j)) = (node_i, node_j) {
            debug_assert_eq!(i.abs_diff(j), 1, "ladder stamps couple neighbours only");
            let k = i.min(j);
            self.lower[k] -= y;
            self.upper[k] -= y;
        }
    }

    /// Stamp an admittance `y` from `node` to a driven node held at `drive`.
    ///
    /// The driven node is eliminated: its coupling moves to the RHS.
    pub fn stamp_driven_admittance(&mut self, node: usize, y: C64, drive: C64) {
        self.diag[node] += y;
        self.rhs[node] += y * drive;
    }

    /// Dense copy of the matrix, for inspection and the dense solver path.
    /// Factorize the matrix with the given strategy.
    pub fn factorize(&self, strategy: SolverStrategy) -> Result<Factorization> {
        Factorization::new(strategy, &self.lower, &self.diag, &self.upper)
    }
}

#[cfg(test)]
impl LadderSystem {
    /// Dense copy of the matrix.
    pub(crate) fn to_dense_matrix(&self) -> nalgebra::DMatrix<C64> {
        let n = self.size();
        let mut matrix = nalgebra::DMatrix::from_element(n, n, ZERO);
        for i in 0..n {
            matrix[(i, i)] = self.diag[i];
            if i + 1 < n {
                matrix[(i + 1, i)] = self.lower[i];
                matrix[(i, i + 1)] = self.upper[i];
            }
        }
        matrix
    }
}
