//! Predicted data (`dpred`).
//!
//! The survey is resolved once against the mesh into a [`DataPlan`]: every
//! datum is tied to a unique-frequency index, the mesh node of its receiver,
//! and the component it reports. Prediction then reads the impedance at that
//! node from the solved [`Fields`].

use mt1d_core::{Component, Mapping, Mesh, Survey};

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::fields::Fields;
use crate::simulation::Simulation;

/// Where one datum comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedDatum {
    /// Index into [`DataPlan::frequencies`].
    pub frequency: usize,
    /// Mesh node of the receiver.
    pub node: usize,
    pub component: Component,
}

/// The survey's data vector resolved against a mesh.
#[derive(Debug, Clone)]
pub struct DataPlan {
    frequencies: Vec<f64>,
    data: Vec<PlannedDatum>,
    /// Datum indices grouped by frequency index.
    by_frequency: Vec<Vec<usize>>,
}

impl DataPlan {
    pub fn new(mesh: &Mesh, survey: &Survey) -> Result<Self> {
        let frequencies = survey.frequencies();
        let mut data = Vec::with_capacity(survey.n_data());
        let mut by_frequency = vec![Vec::new(); frequencies.len()];

        for datum in survey.data() {
            let node = receiver_node(mesh, datum.location)?;
            let frequency = frequencies
                .binary_search_by(|f| f.total_cmp(&datum.frequency))
                .map_err(|_| {
                    Error::InvalidConfiguration(format!(
                        "frequency {} Hz missing from the survey",
                        datum.frequency
                    ))
                })?;
            by_frequency[frequency].push(data.len());
            data.push(PlannedDatum {
                frequency,
                node,
                component: datum.component,
            });
        }

        Ok(Self {
            frequencies,
            data,
            by_frequency,
        })
    }

    pub fn n_data(&self) -> usize {
        self.data.len()
    }

    /// Distinct survey frequencies, ascending.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn data(&self) -> &[PlannedDatum] {
        &self.data
    }

    /// Indices of the data observed at frequency index `index`.
    pub fn data_at(&self, index: usize) -> &[usize] {
        &self.by_frequency[index]
    }
}

/// Mesh node for a receiver depth. The receiver needs a cell below it.
fn receiver_node(mesh: &Mesh, depth: f64) -> Result<usize> {
    match mesh.node_at(depth) {
        Some(node) if node < mesh.n_cells() => Ok(node),
        Some(_) => Err(Error::InvalidConfiguration(format!(
            "receiver at {} m sits on the bottom of the mesh",
            depth
        ))),
        None => Err(Error::InvalidConfiguration(format!(
            "receiver depth {} m does not coincide with a mesh node",
            depth
        ))),
    }
}

/// Reduce solved fields to the data vector.
pub(crate) fn predict(plan: &DataPlan, fields: &Fields) -> Result<Vec<f64>> {
    plan.data
        .iter()
        .map(|d| {
            let z = fields.impedance_at(d.frequency, d.node)?;
            Ok(d.component.evaluate(z.re, z.im, plan.frequencies[d.frequency]))
        })
        .collect()
}

/// Predicted data for `model` in survey order.
pub fn dpred(
    mesh: &Mesh,
    survey: &Survey,
    mapping: &Mapping,
    model: &[f64],
    config: &SimulationConfig,
) -> Result<Vec<f64>> {
    Simulation::new(mesh, survey, mapping, config.clone())?.dpred(model, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt1d_core::{Receiver, Source};

    fn mesh() -> Mesh {
        Mesh::from_widths(vec![10.0, 10.0, 20.0, 40.0]).unwrap()
    }

    #[test]
    fn test_plan_groups_by_frequency() {
        let rx0 = Receiver::surface_impedance(vec![10.0, 1.0]).unwrap();
        let rx1 = Receiver::new(20.0, vec![Component::Phase], vec![1.0]).unwrap();
        let survey = Survey::new(vec![Source::new(vec![rx0, rx1])]).unwrap();
        let plan = DataPlan::new(&mesh(), &survey).unwrap();

        assert_eq!(plan.n_data(), 5);
        assert_eq!(plan.frequencies(), &[1.0, 10.0]);
        assert_eq!(plan.data_at(0), &[2, 3, 4]);
        assert_eq!(plan.data_at(1), &[0, 1]);
        assert_eq!(plan.data()[4].node, 2);
        assert_eq!(plan.data()[4].component, Component::Phase);
    }

    #[test]
    fn test_receiver_must_sit_on_a_node() {
        let rx = Receiver::new(15.0, vec![Component::Real], vec![1.0]).unwrap();
        let survey = Survey::from_receivers(vec![rx]).unwrap();
        assert!(matches!(
            DataPlan::new(&mesh(), &survey),
            Err(Error::InvalidConfiguration(_))
        ));

        let rx = Receiver::new(80.0, vec![Component::Real], vec![1.0]).unwrap();
        let survey = Survey::from_receivers(vec![rx]).unwrap();
        assert!(DataPlan::new(&mesh(), &survey).is_err());
    }
}
