//! Analytic sensitivities of the predicted data.
//!
//! Differentiating `A(σ) e = b(σ)` gives `A de = -G dσ` with
//! `G = ∂(A e - b)/∂σ`. `Jvec` solves with the factorized `A`; `Jtvec`
//! solves with `Aᵀ` and applies `Gᵀ`. Both use the same per-cell
//! coefficients and the same linearization of the receiver impedance, so
//! `w · Jvec(m, v) = v · Jtvec(m, w)` up to round-off.
//!
//! The mapping derivative is chained on the model side: `Jvec` applies
//! `M'(m)` to the direction first, `Jtvec` applies `M'(m)ᵀ` last.

mod jtvec;
mod jvec;
mod linearize;

pub use jtvec::jtvec;
pub use jvec::jvec;
pub use linearize::{ImpedanceLinearization, g_apply, g_transpose_apply, linearize_impedance};

pub(crate) use jtvec::apply_jtvec;
pub(crate) use jvec::apply_jvec;

use crate::config::BottomBoundary;
use crate::error::{Error, Result};
use crate::fields::Fields;

/// The half-space bottom admittance `√(iωμ₀σ)` has no derivative at `σ = 0`.
pub(crate) fn check_differentiable(fields: &Fields) -> Result<()> {
    if fields.boundary() == BottomBoundary::HalfSpace {
        let last = fields.sigma().len() - 1;
        let value = fields.sigma()[last];
        if value <= 0.0 {
            return Err(Error::NonPhysicalConductivity { index: last, value });
        }
    }
    Ok(())
}
