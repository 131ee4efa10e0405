//! Layered-earth conductivity models.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mesh::Mesh;

/// A horizontal layer of uniform conductivity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer thickness (m).
    pub thickness: f64,
    /// Layer conductivity (S/m).
    pub conductivity: f64,
}

/// Stack of layers ordered **surface → depth**, over a basement half-space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayeredEarth {
    pub layers: Vec<Layer>,
    /// Conductivity below the last layer (S/m).
    pub basement: f64,
}

impl LayeredEarth {
    /// A homogeneous half-space.
    pub fn half_space(conductivity: f64) -> Self {
        Self {
            layers: Vec::new(),
            basement: conductivity,
        }
    }

    pub fn new(layers: Vec<Layer>, basement: f64) -> Result<Self> {
        let model = Self { layers, basement };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        for (i, layer) in self.layers.iter().enumerate() {
            if !(layer.thickness.is_finite() && layer.thickness > 0.0) {
                return Err(Error::InvalidConfiguration(format!(
                    "layer {} has non-positive thickness {}",
                    i, layer.thickness
                )));
            }
            if !(layer.conductivity.is_finite() && layer.conductivity >= 0.0) {
                return Err(Error::InvalidConfiguration(format!(
                    "layer {} has invalid conductivity {}",
                    i, layer.conductivity
                )));
            }
        }
        if !(self.basement.is_finite() && self.basement > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "basement conductivity must be positive, got {}",
                self.basement
            )));
        }
        Ok(())
    }

    /// Conductivity at a depth (m); layer tops are inclusive.
    pub fn conductivity_at(&self, depth: f64) -> f64 {
        let mut top = 0.0;
        for layer in &self.layers {
            if depth < top + layer.thickness {
                return layer.conductivity;
            }
            top += layer.thickness;
        }
        self.basement
    }

    /// Sample the model at every cell center of `mesh`.
    pub fn conductivity_on(&self, mesh: &Mesh) -> Result<Vec<f64>> {
        self.validate()?;
        Ok(mesh
            .cell_centers()
            .into_iter()
            .map(|z| self.conductivity_at(z))
            .collect())
    }
}
