//! Simulated impedances against the layered-earth recursion.

use mt1d_core::LayeredEarth;
use mt1d_solver::Fields;
use num_complex::Complex64 as C64;

use super::report::{ComparisonReport, ComponentComparison, WorstPointInfo};
use super::tolerances::{ImpedanceTolerances, phase_difference, relative_error};
use crate::analytic::{apparent_resistivity, layered_impedance, phase_degrees};
use crate::error::{Error, Result};

/// Compare `actual[i]` against `expected[i]` at `frequencies[i]` for the
/// complex impedance, apparent resistivity, and phase.
pub fn compare_impedances(
    label: &str,
    frequencies: &[f64],
    expected: &[C64],
    actual: &[C64],
    tol: &ImpedanceTolerances,
) -> Result<ComparisonReport> {
    for len in [expected.len(), actual.len()] {
        if len != frequencies.len() {
            return Err(Error::DimensionMismatch {
                expected: frequencies.len(),
                actual: len,
            });
        }
    }

    let points = || frequencies.iter().zip(expected.iter().zip(actual));
    let mut report = ComparisonReport::new(label, frequencies.len());
    report.add_comparison(worst_of(
        "Z",
        tol.relative,
        points().map(|(&f, (&e, &a))| (f, e.norm(), a.norm(), (a - e).norm() / e.norm())),
    ));
    report.add_comparison(worst_of(
        "app_res",
        tol.app_res_rel,
        points().map(|(&f, (&e, &a))| {
            let (re, ra) = (apparent_resistivity(e, f), apparent_resistivity(a, f));
            (f, re, ra, relative_error(re, ra))
        }),
    ));
    report.add_comparison(worst_of(
        "phase",
        tol.phase_deg,
        points().map(|(&f, (&e, &a))| {
            let (pe, pa) = (phase_degrees(e), phase_degrees(a));
            (f, pe, pa, phase_difference(pe, pa))
        }),
    ));
    Ok(report)
}

/// Surface impedances in `fields` against the recursion for `model`.
pub fn compare_surface_impedance(
    fields: &Fields,
    model: &LayeredEarth,
    tol: &ImpedanceTolerances,
) -> Result<ComparisonReport> {
    let frequencies: Vec<f64> = fields.frequencies().collect();
    let expected = frequencies
        .iter()
        .map(|&f| layered_impedance(f, model))
        .collect::<Result<Vec<_>>>()?;
    let actual = (0..frequencies.len())
        .map(|i| fields.impedance_at(i, 0))
        .collect::<mt1d_solver::Result<Vec<_>>>()?;
    compare_impedances(
        "surface impedance vs layered recursion",
        &frequencies,
        &expected,
        &actual,
        tol,
    )
}

/// Fold `(frequency, expected, actual, error)` points into one comparison.
fn worst_of(
    name: &str,
    tolerance: f64,
    points: impl Iterator<Item = (f64, f64, f64, f64)>,
) -> ComponentComparison {
    let mut worst: Option<WorstPointInfo> = None;
    let mut passed = true;
    for (frequency, expected, actual, error) in points {
        // NaN errors fail.
        if !(error <= tolerance) {
            passed = false;
        }
        if worst.as_ref().is_none_or(|w| !(error <= w.error)) {
            worst = Some(WorstPointInfo {
                frequency,
                expected,
                actual,
                error,
            });
        }
    }
    ComponentComparison {
        name: name.to_string(),
        passed,
        max_error: worst.as_ref().map_or(0.0, |w| w.error),
        tolerance,
        worst_point: worst,
    }
}
