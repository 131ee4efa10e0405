//! Tolerances for comparing simulated and analytic impedances.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpedanceTolerances {
    /// Relative tolerance on the complex impedance (fraction of `|Z|`).
    pub relative: f64,
    /// Relative tolerance on apparent resistivity (fraction).
    pub app_res_rel: f64,
    /// Phase tolerance (degrees).
    pub phase_deg: f64,
}

impl Default for ImpedanceTolerances {
    fn default() -> Self {
        Self {
            relative: 0.01,
            app_res_rel: 0.02,
            phase_deg: 1.0,
        }
    }
}

impl ImpedanceTolerances {
    pub fn with_relative(mut self, relative: f64) -> Self {
        self.relative = relative;
        self
    }

    pub fn with_app_res_rel(mut self, app_res_rel: f64) -> Self {
        self.app_res_rel = app_res_rel;
        self
    }

    pub fn with_phase_deg(mut self, phase_deg: f64) -> Self {
        self.phase_deg = phase_deg;
        self
    }
}

/// Relative error of `actual` against `expected`; infinite when only
/// `expected` vanishes.
pub fn relative_error(expected: f64, actual: f64) -> f64 {
    if expected.abs() < 1e-15 {
        if actual.abs() < 1e-15 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

/// Phase difference in degrees, wrapped into [0°, 180°].
pub fn phase_difference(expected: f64, actual: f64) -> f64 {
    let d = (actual - expected).rem_euclid(360.0);
    d.min(360.0 - d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_error() {
        assert_eq!(relative_error(2.0, 3.0), 0.5);
        assert_eq!(relative_error(0.0, 0.0), 0.0);
        assert!(relative_error(0.0, 1.0).is_infinite());
    }

    #[test]
    fn test_phase_wraps() {
        assert!((phase_difference(179.0, -179.0) - 2.0).abs() < 1e-12);
        assert!((phase_difference(45.0, 44.0) - 1.0).abs() < 1e-12);
    }
}
