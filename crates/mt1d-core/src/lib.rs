//! Core data model for one-dimensional magnetotelluric (MT) modeling.
//!
//! This crate provides the pieces that are fixed for the duration of an
//! experiment:
//! - Physical constants and unit helpers (`μ₀`, skin depth)
//! - Frequency sweeps
//! - The graded/padded 1D depth mesh and its builder
//! - Layered-earth models projected onto a mesh
//! - Survey, source, and receiver descriptors (which define data ordering)
//! - Differentiable property mappings from inversion model to conductivity

pub mod error;
pub mod frequency;
pub mod mapping;
pub mod mesh;
pub mod model;
pub mod survey;
pub mod units;

pub use error::{Error, Result};
pub use frequency::{FrequencySweep, logspace};
pub use mapping::Mapping;
pub use mesh::{CoreGrading, Mesh, MeshParams};
pub use model::{Layer, LayeredEarth};
pub use survey::{Component, ComponentRequest, Datum, Receiver, Source, Survey};
pub use units::{MU_0, angular_frequency, skin_depth};
