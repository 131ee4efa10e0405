//! Linear system solvers.
//!
//! The per-frequency MT system is complex, symmetric, and tridiagonal. It is
//! factorized once and the factors serve both the forward solve `A x = b` and
//! the transposed solve `Aᵀ x = b` used by the adjoint.

use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};
use num_complex::Complex64 as C64;

use crate::config::SolverStrategy;
use crate::error::{Error, Result};

/// Pivots smaller than this fraction of the largest matrix entry are
/// treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-14;

/// Solve a complex linear system Ax = b using LU decomposition.
pub fn solve_complex(a: &DMatrix<C64>, b: &DVector<C64>) -> Result<DVector<C64>> {
    if a.nrows() != a.ncols() {
        return Err(Error::DimensionMismatch {
            expected: a.nrows(),
            actual: a.ncols(),
        });
    }
    if a.nrows() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.nrows(),
            actual: b.len(),
        });
    }

    a.clone().lu().solve(b).ok_or(Error::SingularMatrix)
}

/// LU factors of a tridiagonal matrix without pivoting.
///
/// `A = L U` with `L` unit lower bidiagonal (sub-diagonal `multipliers`) and
/// `U` upper bidiagonal (diagonal `pivots`, super-diagonal `upper`).
#[derive(Debug, Clone)]
pub struct TridiagonalLu {
    multipliers: Vec<C64>,
    pivots: Vec<C64>,
    upper: Vec<C64>,
}

impl TridiagonalLu {
    /// Factorize the matrix with sub-diagonal `lower[i] = A[i+1][i]`,
    /// diagonal `diag`, and super-diagonal `upper[i] = A[i][i+1]`.
    pub fn factorize(lower: &[C64], diag: &[C64], upper: &[C64]) -> Result<Self> {
        let n = diag.len();
        let off = n.saturating_sub(1);
        if lower.len() != off {
            return Err(Error::DimensionMismatch {
                expected: off,
                actual: lower.len(),
            });
        }
        if upper.len() != off {
            return Err(Error::DimensionMismatch {
                expected: off,
                actual: upper.len(),
            });
        }

        let scale = diag
            .iter()
            .chain(lower)
            .chain(upper)
            .map(|x| x.norm())
            .fold(0.0_f64, f64::max);
        let check = |pivot: C64| {
            let size = pivot.norm();
            if !size.is_finite() || size <= PIVOT_TOLERANCE * scale {
                Err(Error::SingularMatrix)
            } else {
                Ok(pivot)
            }
        };

        let mut multipliers = Vec::with_capacity(n);
        let mut pivots = Vec::with_capacity(n);
        if n > 0 {
            multipliers.push(C64::new(0.0, 0.0));
            pivots.push(check(diag[0])?);
        }
        for i in 1..n {
            let l = lower[i - 1] / pivots[i - 1];
            multipliers.push(l);
            pivots.push(check(diag[i] - l * upper[i - 1])?);
        }

        Ok(Self {
            multipliers,
            pivots,
            upper: upper.to_vec(),
        })
    }

    pub fn dim(&self) -> usize {
        self.pivots.len()
    }

    /// Solve `A x = rhs`.
    pub fn solve(&self, rhs: &[C64]) -> Result<Vec<C64>> {
        self.check_rhs(rhs)?;
        let n = self.dim();
        let mut x = rhs.to_vec();
        // L y = b
        for i in 1..n {
            let prev = x[i - 1];
            x[i] -= self.multipliers[i] * prev;
        }
        // U x = y
        for i in (0..n).rev() {
            if i + 1 < n {
                let next = x[i + 1];
                x[i] -= self.upper[i] * next;
            }
            x[i] /= self.pivots[i];
        }
        Ok(x)
    }

    /// Solve `Aᵀ x = rhs` (plain transpose, no conjugation).
    pub fn solve_transpose(&self, rhs: &[C64]) -> Result<Vec<C64>> {
        self.check_rhs(rhs)?;
        let n = self.dim();
        let mut x = rhs.to_vec();
        // Uᵀ z = b
        for i in 0..n {
            if i > 0 {
                let prev = x[i - 1];
                x[i] -= self.upper[i - 1] * prev;
            }
            x[i] /= self.pivots[i];
        }
        // Lᵀ x = z
        for i in (0..n.saturating_sub(1)).rev() {
            let next = x[i + 1];
            x[i] -= self.multipliers[i + 1] * next;
        }
        Ok(x)
    }

    fn check_rhs(&self, rhs: &[C64]) -> Result<()> {
        if rhs.len() != self.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: rhs.len(),
            });
        }
        Ok(())
    }
}

/// Dense LU factors of a matrix and of its transpose.
#[derive(Debug, Clone)]
pub struct DenseLu {
    dim: usize,
    lu: LU<C64, Dyn, Dyn>,
    lu_transpose: LU<C64, Dyn, Dyn>,
}

impl DenseLu {
    pub fn factorize(matrix: &DMatrix<C64>) -> Result<Self> {
        if matrix.nrows() != matrix.ncols() {
            return Err(Error::DimensionMismatch {
                expected: matrix.nrows(),
                actual: matrix.ncols(),
            });
        }
        let lu = matrix.clone().lu();
        if !lu.is_invertible() {
            return Err(Error::SingularMatrix);
        }
        let lu_transpose = matrix.transpose().lu();
        Ok(Self {
            dim: matrix.nrows(),
            lu,
            lu_transpose,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn solve(&self, rhs: &[C64]) -> Result<Vec<C64>> {
        self.apply(&self.lu, rhs)
    }

    pub fn solve_transpose(&self, rhs: &[C64]) -> Result<Vec<C64>> {
        self.apply(&self.lu_transpose, rhs)
    }

    fn apply(&self, lu: &LU<C64, Dyn, Dyn>, rhs: &[C64]) -> Result<Vec<C64>> {
        if rhs.len() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: rhs.len(),
            });
        }
        let b = DVector::from_column_slice(rhs);
        let x = lu.solve(&b).ok_or(Error::SingularMatrix)?;
        Ok(x.iter().copied().collect())
    }
}

/// A factorized per-frequency system, reusable for forward and transposed
/// solves.
#[derive(Debug, Clone)]
pub enum Factorization {
    Tridiagonal(TridiagonalLu),
    Dense(DenseLu),
}

impl Factorization {
    /// Factorize the tridiagonal matrix with the given strategy.
    pub fn new(
        strategy: SolverStrategy,
        lower: &[C64],
        diag: &[C64],
        upper: &[C64],
    ) -> Result<Self> {
        match strategy {
            SolverStrategy::Tridiagonal => {
                TridiagonalLu::factorize(lower, diag, upper).map(Factorization::Tridiagonal)
            }
            SolverStrategy::DenseLu => {
                let n = diag.len();
                let mut matrix = DMatrix::from_element(n, n, C64::new(0.0, 0.0));
                for i in 0..n {
                    matrix[(i, i)] = diag[i];
                    if i + 1 < n {
                        matrix[(i + 1, i)] = lower[i];
                        matrix[(i, i + 1)] = upper[i];
                    }
                }
                DenseLu::factorize(&matrix).map(Factorization::Dense)
            }
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            Factorization::Tridiagonal(lu) => lu.dim(),
            Factorization::Dense(lu) => lu.dim(),
        }
    }

    pub fn solve(&self, rhs: &[C64]) -> Result<Vec<C64>> {
        match self {
            Factorization::Tridiagonal(lu) => lu.solve(rhs),
            Factorization::Dense(lu) => lu.solve(rhs),
        }
    }

    pub fn solve_transpose(&self, rhs: &[C64]) -> Result<Vec<C64>> {
        match self {
            Factorization::Tridiagonal(lu) => lu.solve_transpose(rhs),
            Factorization::Dense(lu) => lu.solve_transpose(rhs),
        }
    }
}
