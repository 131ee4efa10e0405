//! # mt1d
//!
//! One-dimensional magnetotelluric (MT) forward modeling with analytic
//! sensitivities.
//!
//! mt1d provides:
//! - A graded, padded depth mesh built from skin depths
//! - Per-frequency finite-element solves of the 1D diffusion equation
//! - Predicted impedance data (`dpred`), with apparent resistivity and phase
//! - `Jvec` and its exact adjoint `Jtvec`, without forming the Jacobian
//! - Differentiable property mappings (identity, exp, log, chains)
//! - Order and adjoint tests, plus analytic layered-earth references
//!
//! ## Quick Start
//!
//! ```rust
//! use mt1d::prelude::*;
//!
//! let freqs = logspace(1e-2, 1e2, 9).unwrap();
//! let mesh = MeshParams::new(0.01, freqs.clone()).build().unwrap();
//! let survey = Survey::from_receivers(vec![
//!     Receiver::with_request(0.0, ComponentRequest::AppResPhase, freqs).unwrap(),
//! ])
//! .unwrap();
//! let mapping = Mapping::Exp;
//! let model = vec![(0.01_f64).ln(); mesh.n_cells()];
//!
//! let sim = Simulation::new(&mesh, &survey, &mapping, SimulationConfig::default()).unwrap();
//! let data = sim.dpred(&model, None).unwrap();
//! assert_eq!(data.len(), 18);
//! ```

pub use mt1d_core as core;
pub use mt1d_solver as solver;
pub use mt1d_validate as validate;

pub use mt1d_core::{
    Component, ComponentRequest, Error as CoreError, FrequencySweep, Layer, LayeredEarth, MU_0,
    Mapping, Mesh, MeshParams, Receiver, Source, Survey, angular_frequency, logspace, skin_depth,
};

pub use mt1d_solver::{
    BottomBoundary, Error as SolverError, Fields, ForwardOperator, Simulation, SimulationConfig,
    SolverStrategy, dpred, jtvec, jvec,
};

pub use mt1d_validate::{
    AdjointTestConfig, AdjointTestResult, Error as ValidationError, ImpedanceTolerances,
    OrderTestConfig, OrderTestResult, VerificationReport, adjoint_test, check_jvec,
    compare_surface_impedance, halfspace_impedance, layered_impedance,
};

/// Re-export of num_complex's Complex type.
pub use num_complex::Complex;

/// Prelude module containing commonly used types and traits.
///
/// ```rust
/// use mt1d::prelude::*;
/// ```
pub mod prelude {
    // Model setup
    pub use crate::{
        ComponentRequest, FrequencySweep, Layer, LayeredEarth, Mapping, Mesh, MeshParams,
        Receiver, Survey, logspace,
    };

    // Simulation
    pub use crate::{BottomBoundary, Fields, ForwardOperator, Simulation, SimulationConfig};

    // Verification
    pub use crate::{AdjointTestConfig, OrderTestConfig, adjoint_test, check_jvec};

    pub use crate::Complex;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_runs_a_halfspace() {
        let freqs = logspace(1.0, 10.0, 2).unwrap();
        let mesh = MeshParams::new(0.1, freqs.clone()).build().unwrap();
        let survey = Survey::from_receivers(vec![
            Receiver::with_request(0.0, ComponentRequest::AppResPhase, freqs).unwrap(),
        ])
        .unwrap();
        let mapping = Mapping::Identity;
        let sim = Simulation::new(&mesh, &survey, &mapping, SimulationConfig::default()).unwrap();
        let data = sim.dpred(&vec![0.1; mesh.n_cells()], None).unwrap();
        for pair in data.chunks(2) {
            assert!((pair[0] - 10.0).abs() < 0.2, "rho_a = {}", pair[0]);
            assert!((pair[1] - 45.0).abs() < 1.0, "phase = {}", pair[1]);
        }
    }
}
