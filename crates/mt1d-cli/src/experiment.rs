//! JSON description of a modeling run.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use mt1d_core::{
    ComponentRequest, FrequencySweep, LayeredEarth, Mapping, Mesh, MeshParams, Receiver, Survey,
    skin_depth,
};
use mt1d_solver::SimulationConfig;
use serde::{Deserialize, Serialize};

/// One receiver of the experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Depth (m); must coincide with a mesh node.
    #[serde(default)]
    pub depth: f64,
    pub request: ComponentRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub model: LayeredEarth,
    pub frequencies: FrequencySweep,
    /// Explicit mesh parameters. When absent the mesh is graded for the
    /// most conductive unit and extended below the layer stack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshParams>,
    pub receivers: Vec<ReceiverConfig>,
    pub mapping: Mapping,
    pub simulation: SimulationConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            model: LayeredEarth::half_space(0.01),
            frequencies: FrequencySweep::LogCount {
                fmin: 1e-3,
                fmax: 1e3,
                count: 25,
            },
            mesh: None,
            receivers: vec![ReceiverConfig {
                depth: 0.0,
                request: ComponentRequest::AppResPhase,
            }],
            mapping: Mapping::Exp,
            simulation: SimulationConfig::default(),
        }
    }
}

impl ExperimentConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Mesh parameters for `frequencies`.
    pub fn mesh_params(&self, frequencies: &[f64]) -> MeshParams {
        if let Some(params) = &self.mesh {
            let mut params = params.clone();
            if params.frequencies.is_empty() {
                params.frequencies = frequencies.to_vec();
            }
            return params;
        }

        let sigma_max = self
            .model
            .layers
            .iter()
            .map(|l| l.conductivity)
            .fold(self.model.basement, f64::max);
        let fmin = frequencies.iter().copied().fold(f64::INFINITY, f64::min);
        let stack: f64 = self.model.layers.iter().map(|l| l.thickness).sum();
        let core_depth = (1.2 * stack).max(skin_depth(fmin, sigma_max));
        MeshParams::new(sigma_max, frequencies.to_vec()).with_core_depth(core_depth)
    }

    pub fn build(&self) -> Result<Experiment> {
        let frequencies = self
            .frequencies
            .generate()
            .context("Invalid frequency sweep")?;
        if frequencies.is_empty() {
            bail!("frequency sweep is empty");
        }
        let mesh = self
            .mesh_params(&frequencies)
            .build()
            .context("Failed to build mesh")?;
        let receivers = self
            .receivers
            .iter()
            .map(|rx| Receiver::with_request(rx.depth, rx.request, frequencies.clone()))
            .collect::<mt1d_core::Result<Vec<_>>>()
            .context("Invalid receiver")?;
        let survey = Survey::from_receivers(receivers).context("Invalid survey")?;
        let sigma = self
            .model
            .conductivity_on(&mesh)
            .context("Invalid layered model")?;
        let model = self
            .mapping
            .inverse(&sigma)
            .context("Model is outside the mapping's range")?;

        log::info!(
            "experiment: {} frequencies, {} cells ({} core), depth {:.1} m",
            frequencies.len(),
            mesh.n_cells(),
            mesh.n_core(),
            mesh.depth()
        );
        Ok(Experiment {
            frequencies,
            mesh,
            survey,
            model,
        })
    }
}

/// Everything derived from an [`ExperimentConfig`].
#[derive(Debug, Clone)]
pub struct Experiment {
    pub frequencies: Vec<f64>,
    pub mesh: Mesh,
    pub survey: Survey,
    /// Inversion model reproducing the layered conductivity.
    pub model: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt1d_core::Layer;

    #[test]
    fn test_default_round_trips_through_json() {
        let config = ExperimentConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: ExperimentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "model": { "layers": [], "basement": 0.1 } }"#;
        let config: ExperimentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.model.basement, 0.1);
        assert_eq!(config.mapping, Mapping::Exp);
        assert_eq!(config.receivers.len(), 1);
    }

    #[test]
    fn test_build_default() {
        let experiment = ExperimentConfig::default().build().unwrap();
        assert_eq!(experiment.frequencies.len(), 25);
        assert_eq!(experiment.model.len(), experiment.mesh.n_cells());
        assert_eq!(experiment.survey.n_data(), 50);
    }

    #[test]
    fn test_mesh_extends_below_layers() {
        let config = ExperimentConfig {
            model: LayeredEarth::new(
                vec![Layer {
                    thickness: 5000.0,
                    conductivity: 1.0,
                }],
                0.01,
            )
            .unwrap(),
            ..Default::default()
        };
        let experiment = config.build().unwrap();
        assert!(experiment.mesh.depth() > 5000.0);
    }
}
