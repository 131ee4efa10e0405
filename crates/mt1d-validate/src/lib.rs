//! Verification harness for the 1D MT simulator.
//!
//! This crate provides:
//! - The Taylor-series order test for `Jvec`
//! - The dot-product adjoint test for the `Jvec`/`Jtvec` pair
//! - Analytic half-space and layered-earth impedances
//! - Comparison of simulated impedances against those references, with
//!   text and JSON reports

pub mod adjoint;
pub mod analytic;
pub mod compare;
pub mod derivative;
pub mod error;
pub mod random;

pub use adjoint::{AdjointTestConfig, AdjointTestResult, adjoint_test, adjoint_test_with};
pub use analytic::{apparent_resistivity, halfspace_impedance, layered_impedance, phase_degrees};
pub use compare::{
    ComparisonReport, ImpedanceTolerances, VerificationReport, compare_impedances,
    compare_surface_impedance,
};
pub use derivative::{OrderStep, OrderTestConfig, OrderTestResult, check_derivative, check_jvec};
pub use error::{Error, Result};
pub use random::random_vector;
