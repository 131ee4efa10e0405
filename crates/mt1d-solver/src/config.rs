//! Simulation configuration.

use serde::{Deserialize, Serialize};

/// Condition applied at the bottom node of the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottomBoundary {
    /// Outgoing plane wave into a half-space with the conductivity of the
    /// last cell: `dE/dz = -k E`, `k = √(iωμ₀σ)`.
    #[default]
    HalfSpace,
    /// `E = 0` (perfect conductor at depth).
    Dirichlet,
}

impl BottomBoundary {
    pub fn name(&self) -> &'static str {
        match self {
            Self::HalfSpace => "half-space",
            Self::Dirichlet => "dirichlet",
        }
    }
}

impl std::fmt::Display for BottomBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Linear solver used for the per-frequency systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum SolverStrategy {
    /// Tridiagonal LU (Thomas algorithm), O(n) per solve.
    #[default]
    Tridiagonal,
    /// Dense LU with partial pivoting. Reference path for small meshes.
    DenseLu,
}

impl SolverStrategy {
    /// Parse from string (for CLI).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "tridiagonal" | "thomas" => Some(Self::Tridiagonal),
            "dense" | "lu" => Some(Self::DenseLu),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Tridiagonal => "tridiagonal",
            Self::DenseLu => "dense (LU)",
        }
    }
}

impl std::fmt::Display for SolverStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Options for `dpred`, `jvec`, and `jtvec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub bottom_boundary: BottomBoundary,
    pub solver: SolverStrategy,
    /// Solve frequencies on the rayon pool.
    pub parallel: bool,
    /// Below this many frequencies the solves run sequentially.
    pub min_frequencies_for_parallel: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            bottom_boundary: BottomBoundary::HalfSpace,
            solver: SolverStrategy::Tridiagonal,
            parallel: true,
            min_frequencies_for_parallel: 8,
        }
    }
}

impl SimulationConfig {
    pub fn with_bottom_boundary(mut self, boundary: BottomBoundary) -> Self {
        self.bottom_boundary = boundary;
        self
    }

    pub fn with_solver(mut self, solver: SolverStrategy) -> Self {
        self.solver = solver;
        self
    }

    /// Run every frequency on the calling thread.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}
