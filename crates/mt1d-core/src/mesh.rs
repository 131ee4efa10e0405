//! Graded and padded 1D depth mesh.
//!
//! Depth `z` is positive downward and the surface sits at `z = 0`. A mesh of
//! `n` cells has `n + 1` nodes; node `0` is the surface and node `n` the
//! bottom of the padding. Cells are split into a *core* region, sized to
//! resolve the shallowest skin depth, followed by a *padding* region of
//! geometrically expanding cells reaching many skin depths below the
//! deepest-penetrating frequency.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::units::skin_depth;

/// Spacing law for the core region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreGrading {
    /// Constant cell thickness throughout the core.
    Uniform,
    /// Cells keep the surface thickness down to the shallowest skin depth,
    /// then grow by `growth` per cell (capped by the maximum core cell
    /// thickness), giving log-spaced cell boundaries.
    Logarithmic { growth: f64 },
}

impl Default for CoreGrading {
    fn default() -> Self {
        CoreGrading::Logarithmic { growth: 1.1 }
    }
}

/// Mesh grading parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    /// Representative background conductivity (S/m) used for skin depths.
    pub background_conductivity: f64,
    /// Frequencies (Hz) the mesh must support.
    pub frequencies: Vec<f64>,
    /// Minimum number of cells across the shallowest skin depth.
    pub cells_per_skin_depth: f64,
    /// Depth of the mesh bottom, in skin depths of the lowest frequency.
    pub padding_skin_depths: f64,
    /// Upper bound on core cell thickness (m).
    pub max_core_cell_thickness: Option<f64>,
    /// Depth extent of the core (m). Defaults to one skin depth at the
    /// lowest frequency.
    pub core_depth: Option<f64>,
    /// Spacing law inside the core.
    pub core_grading: CoreGrading,
    /// Thickness ratio between successive padding cells (> 1).
    pub padding_growth: f64,
    /// Refuse to build meshes with more cells than this.
    pub max_cells: usize,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            background_conductivity: 0.01,
            frequencies: Vec::new(),
            cells_per_skin_depth: 10.0,
            padding_skin_depths: 3.0,
            max_core_cell_thickness: None,
            core_depth: None,
            core_grading: CoreGrading::default(),
            padding_growth: 1.3,
            max_cells: 100_000,
        }
    }
}

impl MeshParams {
    /// Parameters for a background conductivity and frequency set, other
    /// settings at their defaults.
    pub fn new(background_conductivity: f64, frequencies: Vec<f64>) -> Self {
        Self {
            background_conductivity,
            frequencies,
            ..Default::default()
        }
    }

    pub fn with_cells_per_skin_depth(mut self, cells: f64) -> Self {
        self.cells_per_skin_depth = cells;
        self
    }

    pub fn with_padding_skin_depths(mut self, skin_depths: f64) -> Self {
        self.padding_skin_depths = skin_depths;
        self
    }

    pub fn with_max_core_cell_thickness(mut self, thickness: f64) -> Self {
        self.max_core_cell_thickness = Some(thickness);
        self
    }

    pub fn with_core_depth(mut self, depth: f64) -> Self {
        self.core_depth = Some(depth);
        self
    }

    pub fn with_core_grading(mut self, grading: CoreGrading) -> Self {
        self.core_grading = grading;
        self
    }

    pub fn with_padding_growth(mut self, growth: f64) -> Self {
        self.padding_growth = growth;
        self
    }

    /// Build the mesh described by these parameters.
    pub fn build(&self) -> Result<Mesh> {
        self.validate()?;

        let (fmin, fmax) = self
            .frequencies
            .iter()
            .fold((f64::INFINITY, 0.0_f64), |(lo, hi), &f| (lo.min(f), hi.max(f)));
        let shallowest = skin_depth(fmax, self.background_conductivity);
        let deepest = skin_depth(fmin, self.background_conductivity);

        let mut h0 = shallowest / self.cells_per_skin_depth;
        if let Some(max_h) = self.max_core_cell_thickness {
            h0 = h0.min(max_h);
        }
        let h_cap = self.max_core_cell_thickness.unwrap_or(f64::INFINITY).max(h0);
        // The core always spans the shallowest skin depth.
        let core_depth = self.core_depth.unwrap_or(deepest).max(shallowest);
        let bottom = (self.padding_skin_depths * deepest).max(core_depth);

        if !(h0.is_finite() && h0 > 0.0 && bottom.is_finite()) {
            return Err(Error::InvalidConfiguration(format!(
                "grading yields no finite cell size (smallest cell {} m, bottom {} m)",
                h0, bottom
            )));
        }

        let mut widths = Vec::new();
        let mut depth = 0.0;
        match self.core_grading {
            CoreGrading::Uniform => {
                let count = (core_depth / h0).ceil().max(1.0);
                if count > self.max_cells as f64 {
                    return Err(self.too_many_cells(count));
                }
                widths.resize(count as usize, h0);
                depth = h0 * count;
            }
            CoreGrading::Logarithmic { growth } => {
                let mut h = h0;
                loop {
                    widths.push(h);
                    depth += h;
                    if depth >= core_depth {
                        break;
                    }
                    if widths.len() >= self.max_cells {
                        return Err(self.too_many_cells(widths.len() as f64 + 1.0));
                    }
                    if depth >= shallowest {
                        h = (h * growth).min(h_cap);
                    }
                }
            }
        }
        let n_core = widths.len();

        let mut h = widths[n_core - 1] * self.padding_growth;
        loop {
            widths.push(h);
            depth += h;
            if depth >= bottom {
                break;
            }
            if widths.len() >= self.max_cells {
                return Err(self.too_many_cells(widths.len() as f64 + 1.0));
            }
            h *= self.padding_growth;
        }

        let mesh = Mesh::with_core(widths, n_core)?;
        log::debug!(
            "built mesh: {} core + {} padding cells, h_min = {:.3e} m, depth = {:.3e} m \
             (skin depths {:.3e}..{:.3e} m)",
            mesh.n_core(),
            mesh.n_padding(),
            h0,
            mesh.depth(),
            shallowest,
            deepest
        );
        Ok(mesh)
    }

    fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidConfiguration(msg));

        if !(self.background_conductivity.is_finite() && self.background_conductivity > 0.0) {
            return invalid(format!(
                "background conductivity must be positive, got {}",
                self.background_conductivity
            ));
        }
        if self.frequencies.is_empty() {
            return invalid("mesh needs at least one frequency".into());
        }
        if let Some(&f) = self.frequencies.iter().find(|f| !(f.is_finite() && **f > 0.0)) {
            return invalid(format!("frequencies must be positive, got {}", f));
        }
        if !(self.cells_per_skin_depth.is_finite() && self.cells_per_skin_depth >= 1.0) {
            return invalid(format!(
                "cells per skin depth must be at least 1, got {}",
                self.cells_per_skin_depth
            ));
        }
        if !(self.padding_skin_depths.is_finite() && self.padding_skin_depths > 0.0) {
            return invalid(format!(
                "padding skin depths must be positive, got {}",
                self.padding_skin_depths
            ));
        }
        if let Some(h) = self.max_core_cell_thickness
            && !(h.is_finite() && h > 0.0)
        {
            return invalid(format!("maximum core cell thickness must be positive, got {}", h));
        }
        if let Some(d) = self.core_depth
            && !(d.is_finite() && d > 0.0)
        {
            return invalid(format!("core depth must be positive, got {}", d));
        }
        if let CoreGrading::Logarithmic { growth } = self.core_grading
            && !(growth.is_finite() && growth >= 1.0)
        {
            return invalid(format!("core growth factor must be >= 1, got {}", growth));
        }
        if !(self.padding_growth.is_finite() && self.padding_growth > 1.0) {
            return invalid(format!(
                "padding growth factor must be > 1, got {}",
                self.padding_growth
            ));
        }
        if self.max_cells < 2 {
            return invalid("a mesh needs room for at least one core and one padding cell".into());
        }
        Ok(())
    }

    fn too_many_cells(&self, count: f64) -> Error {
        Error::InvalidConfiguration(format!(
            "grading requires {} cells, more than the limit of {}",
            count, self.max_cells
        ))
    }
}

/// A 1D depth mesh. Immutable once built.
///
/// Serialized as its widths and core count; deserializing goes through
/// [`Mesh::with_core`], so node depths are always recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MeshRecord", into = "MeshRecord")]
pub struct Mesh {
    widths: Vec<f64>,
    nodes: Vec<f64>,
    n_core: usize,
}

/// Serialized form of a [`Mesh`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MeshRecord {
    widths: Vec<f64>,
    /// Defaults to every cell.
    #[serde(default)]
    n_core: Option<usize>,
}

impl TryFrom<MeshRecord> for Mesh {
    type Error = Error;

    fn try_from(record: MeshRecord) -> Result<Self> {
        let n_core = record.n_core.unwrap_or(record.widths.len());
        Mesh::with_core(record.widths, n_core)
    }
}

impl From<Mesh> for MeshRecord {
    fn from(mesh: Mesh) -> Self {
        Self {
            widths: mesh.widths,
            n_core: Some(mesh.n_core),
        }
    }
}

impl Mesh {
    /// Mesh from explicit cell widths (top to bottom), all treated as core.
    pub fn from_widths(widths: Vec<f64>) -> Result<Self> {
        let n = widths.len();
        Self::with_core(widths, n)
    }

    /// Mesh from explicit cell widths where the first `n_core` cells form the
    /// core and the remainder the padding.
    pub fn with_core(widths: Vec<f64>, n_core: usize) -> Result<Self> {
        if widths.is_empty() {
            return Err(Error::InvalidConfiguration("mesh has no cells".into()));
        }
        if n_core == 0 || n_core > widths.len() {
            return Err(Error::InvalidConfiguration(format!(
                "core cell count {} outside 1..={}",
                n_core,
                widths.len()
            )));
        }
        if let Some((i, w)) = widths
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w > 0.0))
        {
            return Err(Error::InvalidConfiguration(format!(
                "cell {} has non-positive width {}",
                i, w
            )));
        }

        let mut nodes = Vec::with_capacity(widths.len() + 1);
        nodes.push(0.0);
        let mut z = 0.0;
        for w in &widths {
            z += w;
            nodes.push(z);
        }

        Ok(Self {
            widths,
            nodes,
            n_core,
        })
    }

    /// Number of cells.
    pub fn n_cells(&self) -> usize {
        self.widths.len()
    }

    /// Number of nodes (`n_cells + 1`).
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_core(&self) -> usize {
        self.n_core
    }

    pub fn n_padding(&self) -> usize {
        self.widths.len() - self.n_core
    }

    /// Cell thicknesses (m), top to bottom.
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Node depths (m), strictly increasing from `0`.
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Depth of each cell midpoint.
    pub fn cell_centers(&self) -> Vec<f64> {
        self.nodes.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// Total mesh depth (m).
    pub fn depth(&self) -> f64 {
        self.nodes[self.nodes.len() - 1]
    }

    /// Index of the node at `depth`, if one lies within a small relative
    /// tolerance of it.
    pub fn node_at(&self, depth: f64) -> Option<usize> {
        let tol = 1e-9 * self.depth();
        let idx = self.nodes.partition_point(|&z| z < depth - tol);
        (idx < self.nodes.len() && (self.nodes[idx] - depth).abs() <= tol).then_some(idx)
    }
}
