//! Comparison of simulated impedances with analytic references.

pub mod impedance;
pub mod report;
pub mod tolerances;

pub use impedance::{compare_impedances, compare_surface_impedance};
pub use report::{
    ComparisonReport, ComparisonSummary, ComponentComparison, VerificationReport, WorstPointInfo,
};
pub use tolerances::{ImpedanceTolerances, phase_difference, relative_error};
