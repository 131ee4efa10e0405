//! Forward simulation and sensitivities for 1D magnetotellurics.
//!
//! This crate provides:
//! - Complex tridiagonal and dense LU solvers with transposed solves
//! - Ladder-style assembly of the per-frequency finite-element system
//! - Per-frequency field solutions and surface impedance (`dpred`)
//! - Analytic sensitivities `Jvec` and their exact adjoint `Jtvec`
//! - Frequency-parallel execution on the rayon pool

pub mod assembly;
pub mod config;
pub mod error;
pub mod fields;
pub mod forward;
pub mod ladder;
pub mod linear;
pub mod operator;
pub mod parallel;
pub mod sensitivity;
pub mod simulation;

pub use config::{BottomBoundary, SimulationConfig, SolverStrategy};
pub use error::{Error, Result};
pub use fields::{Fields, FrequencyField};
pub use forward::{DataPlan, PlannedDatum, dpred};
pub use ladder::LadderSystem;
pub use linear::{DenseLu, Factorization, TridiagonalLu, solve_complex};
pub use operator::ForwardOperator;
pub use sensitivity::{ImpedanceLinearization, jtvec, jvec, linearize_impedance};
pub use simulation::Simulation;
