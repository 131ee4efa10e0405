//! Dot-product test of the adjoint identity `w·(J v) = v·(Jᵀ w)`.

use mt1d_solver::ForwardOperator;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::random::{dot, norm, random_vector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjointTestConfig {
    /// Accepted mismatch, scaled by `max(1, ‖w‖‖v‖)`.
    pub tolerance: f64,
    /// Seed for the model-space vector; the data-space vector uses `seed + 1`.
    pub seed: u64,
}

impl Default for AdjointTestConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            seed: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjointTestResult {
    /// `w·(J v)`
    pub lhs: f64,
    /// `v·(Jᵀ w)`
    pub rhs: f64,
    pub difference: f64,
    pub threshold: f64,
    pub passed: bool,
}

impl AdjointTestResult {
    pub fn to_text(&self) -> String {
        format!(
            "Adjoint test: {}\n  w.Jv    = {:.15e}\n  v.JTw   = {:.15e}\n  |diff|  = {:.3e} (threshold {:.3e})\n",
            if self.passed { "PASS" } else { "FAIL" },
            self.lhs,
            self.rhs,
            self.difference,
            self.threshold
        )
    }
}

/// Adjoint test at `m` with seeded random vectors.
pub fn adjoint_test(
    op: &dyn ForwardOperator,
    m: &[f64],
    config: &AdjointTestConfig,
) -> Result<AdjointTestResult> {
    let v = random_vector(op.n_model(), config.seed);
    let w = random_vector(op.n_data(), config.seed.wrapping_add(1));
    adjoint_test_with(op, m, &v, &w, config.tolerance)
}

/// Adjoint test at `m` for the given model-space `v` and data-space `w`.
pub fn adjoint_test_with(
    op: &dyn ForwardOperator,
    m: &[f64],
    v: &[f64],
    w: &[f64],
    tolerance: f64,
) -> Result<AdjointTestResult> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(Error::InvalidConfiguration(format!(
            "adjoint tolerance must be positive, got {}",
            tolerance
        )));
    }
    let jv = op.jvec(m, v)?;
    let jtw = op.jtvec(m, w)?;
    let lhs = dot(w, &jv);
    let rhs = dot(v, &jtw);
    let difference = (lhs - rhs).abs();
    let threshold = tolerance * (norm(w) * norm(v)).max(1.0);
    log::debug!(
        "adjoint test: w.Jv = {:.6e}, v.JTw = {:.6e}, diff = {:.3e}",
        lhs,
        rhs,
        difference
    );
    Ok(AdjointTestResult {
        lhs,
        rhs,
        difference,
        threshold,
        passed: difference < threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `d = A m` with `m` ignored by the derivative.
    struct Dense {
        a: Vec<Vec<f64>>,
        transpose_bug: bool,
    }

    impl ForwardOperator for Dense {
        fn n_model(&self) -> usize {
            self.a[0].len()
        }

        fn n_data(&self) -> usize {
            self.a.len()
        }

        fn dpred(&self, m: &[f64]) -> mt1d_solver::Result<Vec<f64>> {
            self.jvec(m, m)
        }

        fn jvec(&self, _m: &[f64], v: &[f64]) -> mt1d_solver::Result<Vec<f64>> {
            Ok(self.a.iter().map(|row| dot(row, v)).collect())
        }

        fn jtvec(&self, _m: &[f64], w: &[f64]) -> mt1d_solver::Result<Vec<f64>> {
            let mut out: Vec<f64> = (0..self.n_model())
                .map(|j| self.a.iter().zip(w).map(|(row, wi)| row[j] * wi).sum())
                .collect();
            if self.transpose_bug {
                out[0] += 0.5;
            }
            Ok(out)
        }
    }

    fn dense(transpose_bug: bool) -> Dense {
        Dense {
            a: vec![vec![1.0, 2.0, -1.0], vec![0.5, 0.0, 3.0]],
            transpose_bug,
        }
    }

    #[test]
    fn test_consistent_pair_passes() {
        let result = adjoint_test(&dense(false), &[0.0; 3], &AdjointTestConfig::default()).unwrap();
        assert!(result.passed, "{}", result.to_text());
    }

    #[test]
    fn test_broken_pair_fails() {
        let result = adjoint_test_with(
            &dense(true),
            &[0.0; 3],
            &[1.0, 0.0, 0.0],
            &[1.0, 1.0],
            1e-10,
        )
        .unwrap();
        assert!(!result.passed);
        assert!((result.difference - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        assert!(adjoint_test_with(&dense(false), &[0.0; 3], &[1.0; 3], &[1.0; 2], 0.0).is_err());
    }
}
