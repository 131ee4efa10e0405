//! Tables and JSON for predicted data.

use mt1d_core::{Component, Datum, LayeredEarth, Survey};
use mt1d_validate::{VerificationReport, apparent_resistivity, layered_impedance, phase_degrees};
use serde::Serialize;

/// One predicted datum, next to the analytic value where one exists.
#[derive(Debug, Clone, Serialize)]
pub struct DataRow {
    pub frequency: f64,
    pub depth: f64,
    pub component: Component,
    pub predicted: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytic: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    pub data: Vec<DataRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationReport>,
}

/// Pair `predicted` with the survey data; surface data also get the
/// layered-earth value.
pub fn data_rows(survey: &Survey, predicted: &[f64], model: &LayeredEarth) -> Vec<DataRow> {
    survey
        .data()
        .iter()
        .zip(predicted)
        .map(|(datum, &value)| DataRow {
            frequency: datum.frequency,
            depth: datum.location,
            component: datum.component,
            predicted: value,
            analytic: analytic_value(datum, model),
        })
        .collect()
}

fn analytic_value(datum: &Datum, model: &LayeredEarth) -> Option<f64> {
    if datum.location != 0.0 {
        return None;
    }
    let z = layered_impedance(datum.frequency, model).ok()?;
    Some(match datum.component {
        Component::Real => z.re,
        Component::Imag => z.im,
        Component::AppRes => apparent_resistivity(z, datum.frequency),
        Component::Phase => phase_degrees(z),
    })
}

pub fn print_table(rows: &[DataRow]) {
    println!(
        "{:>14}{:>12}{:>10}{:>16}{:>16}{:>12}",
        "Freq(Hz)", "Depth(m)", "Comp", "Predicted", "Analytic", "RelErr"
    );
    println!("{}", "-".repeat(80));
    for row in rows {
        let (analytic, error) = match row.analytic {
            Some(a) => (
                format!("{:>16.6e}", a),
                format!("{:>12.2e}", relative_difference(a, row.predicted)),
            ),
            None => (format!("{:>16}", "-"), format!("{:>12}", "-")),
        };
        println!(
            "{:>14.4e}{:>12.1}{:>10}{:>16.6e}{}{}",
            row.frequency,
            row.depth,
            row.component.name(),
            row.predicted,
            analytic,
            error
        );
    }
    println!();
    println!("{} data.", rows.len());
}

fn relative_difference(expected: f64, actual: f64) -> f64 {
    if expected == 0.0 {
        (actual - expected).abs()
    } else {
        ((actual - expected) / expected).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt1d_core::{ComponentRequest, Receiver};

    #[test]
    fn test_only_surface_data_get_analytic_values() {
        let surface = Receiver::with_request(0.0, ComponentRequest::AppResPhase, vec![1.0]).unwrap();
        let buried = Receiver::with_request(50.0, ComponentRequest::Real, vec![1.0]).unwrap();
        let survey = Survey::from_receivers(vec![surface, buried]).unwrap();
        let model = LayeredEarth::half_space(0.01);

        let rows = data_rows(&survey, &[100.0, 45.0, 1e-3], &model);
        assert_eq!(rows.len(), 3);
        assert!((rows[0].analytic.unwrap() - 100.0).abs() < 1e-9);
        assert!((rows[1].analytic.unwrap() - 45.0).abs() < 1e-9);
        assert!(rows[2].analytic.is_none());
    }
}
