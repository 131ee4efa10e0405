//! Comparison and verification reports.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::adjoint::AdjointTestResult;
use crate::derivative::OrderTestResult;
use crate::error::Result;

/// Comparison result for one quantity across all frequencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentComparison {
    /// Quantity name, e.g. "Z" or "phase".
    pub name: String,
    pub passed: bool,
    /// Largest error over the sweep, in the units of `tolerance`.
    pub max_error: f64,
    pub tolerance: f64,
    pub worst_point: Option<WorstPointInfo>,
}

/// Information about the worst deviation point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorstPointInfo {
    /// Frequency (Hz).
    pub frequency: f64,
    pub expected: f64,
    pub actual: f64,
    pub error: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub n_frequencies: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// What was compared against what.
    pub label: String,
    pub passed: bool,
    pub comparisons: Vec<ComponentComparison>,
    pub summary: ComparisonSummary,
}

impl ComparisonReport {
    pub fn new(label: &str, n_frequencies: usize) -> Self {
        Self {
            label: label.to_string(),
            passed: true,
            comparisons: Vec::new(),
            summary: ComparisonSummary {
                n_frequencies,
                ..Default::default()
            },
        }
    }

    pub fn add_comparison(&mut self, comp: ComponentComparison) {
        if comp.passed {
            self.summary.passed += 1;
        } else {
            self.passed = false;
            self.summary.failed += 1;
        }
        self.summary.total += 1;
        self.comparisons.push(comp);
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Comparison Report: {}\n", self.label));
        out.push_str(&format!("Status: {}\n", status(self.passed)));
        out.push_str(&format!(
            "Quantities: {}/{} passed over {} frequencies\n",
            self.summary.passed, self.summary.total, self.summary.n_frequencies
        ));
        for comp in &self.comparisons {
            out.push_str(&format!(
                "  {}: {} (max error {:.3e}, tolerance {:.3e})\n",
                comp.name,
                status(comp.passed),
                comp.max_error,
                comp.tolerance
            ));
            if let Some(ref worst) = comp.worst_point {
                out.push_str(&format!(
                    "    Worst at: {:.6e} Hz (expected={:.6e}, actual={:.6e}, error={:.3e})\n",
                    worst.frequency, worst.expected, worst.actual, worst.error
                ));
            }
        }
        out
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Everything a verification run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impedance: Option<ComparisonReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderTestResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjoint: Option<AdjointTestResult>,
}

impl VerificationReport {
    /// True when every check that was run passed.
    pub fn passed(&self) -> bool {
        self.impedance.as_ref().is_none_or(|r| r.passed)
            && self.order.as_ref().is_none_or(|r| r.passed)
            && self.adjoint.as_ref().is_none_or(|r| r.passed)
    }

    pub fn to_text(&self) -> String {
        let mut sections = Vec::new();
        if let Some(r) = &self.impedance {
            sections.push(r.to_text());
        }
        if let Some(r) = &self.order {
            sections.push(r.to_text());
        }
        if let Some(r) = &self.adjoint {
            sections.push(r.to_text());
        }
        sections.push(format!("Overall: {}\n", status(self.passed())));
        sections.join("\n")
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON form of the report to `path`.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn status(passed: bool) -> &'static str {
    if passed { "PASS" } else { "FAIL" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(name: &str, passed: bool) -> ComponentComparison {
        ComponentComparison {
            name: name.to_string(),
            passed,
            max_error: 0.5,
            tolerance: 0.1,
            worst_point: Some(WorstPointInfo {
                frequency: 10.0,
                expected: 1.0,
                actual: 1.5,
                error: 0.5,
            }),
        }
    }

    #[test]
    fn test_failure_propagates() {
        let mut report = ComparisonReport::new("test", 3);
        report.add_comparison(comparison("Z", true));
        report.add_comparison(comparison("phase", false));
        assert!(!report.passed);
        assert_eq!(report.summary.failed, 1);
        assert!(report.to_text().contains("phase: FAIL"));

        let verification = VerificationReport {
            impedance: Some(report),
            ..Default::default()
        };
        assert!(!verification.passed());
        assert!(verification.to_text().contains("Overall: FAIL"));
    }

    #[test]
    fn test_json_round_trip() {
        let mut report = ComparisonReport::new("test", 1);
        report.add_comparison(comparison("Z", true));
        let json = report.to_json().unwrap();
        let back: ComparisonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary.total, 1);
        assert_eq!(back.comparisons[0].name, "Z");
    }

    #[test]
    fn test_empty_verification_passes() {
        assert!(VerificationReport::default().passed());
    }
}
