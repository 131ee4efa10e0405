//! Differentiable maps from inversion-model space to physical conductivity.
//!
//! A [`Mapping`] exposes its forward evaluation together with the action of
//! its derivative and of the derivative's adjoint, so sensitivities can be
//! chained through it in both directions without materializing a matrix.
//!
//! All variants act elementwise and preserve length.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "maps", rename_all = "snake_case")]
pub enum Mapping {
    /// `σ = m`
    Identity,
    /// `σ = exp(m)`; the usual log-conductivity parameterization.
    Exp,
    /// `σ = ln(m)`, defined for `m > 0`.
    Log,
    /// Composition `maps[0] ∘ maps[1] ∘ … ∘ maps[n-1]`; the last map is
    /// applied to the model first.
    Chain(Vec<Mapping>),
}

impl Mapping {
    pub fn chain(maps: Vec<Mapping>) -> Self {
        Mapping::Chain(maps)
    }

    /// Evaluate the map.
    pub fn forward(&self, m: &[f64]) -> Result<Vec<f64>> {
        match self {
            Mapping::Identity => Ok(m.to_vec()),
            Mapping::Exp => Ok(m.iter().map(|x| x.exp()).collect()),
            Mapping::Log => {
                check_positive(m)?;
                Ok(m.iter().map(|x| x.ln()).collect())
            }
            Mapping::Chain(maps) => maps
                .iter()
                .rev()
                .try_fold(m.to_vec(), |x, map| map.forward(&x)),
        }
    }

    /// Invert the map: the model whose image is `p`.
    pub fn inverse(&self, p: &[f64]) -> Result<Vec<f64>> {
        match self {
            Mapping::Identity => Ok(p.to_vec()),
            Mapping::Exp => {
                check_positive(p)?;
                Ok(p.iter().map(|x| x.ln()).collect())
            }
            Mapping::Log => Ok(p.iter().map(|x| x.exp()).collect()),
            Mapping::Chain(maps) => maps
                .iter()
                .try_fold(p.to_vec(), |x, map| map.inverse(&x)),
        }
    }

    /// Apply the derivative at `m` to a model-space direction `v`.
    pub fn deriv_apply(&self, m: &[f64], v: &[f64]) -> Result<Vec<f64>> {
        check_len(m, v)?;
        match self {
            Mapping::Chain(maps) => {
                let inputs = stage_inputs(maps, m)?;
                maps.iter()
                    .zip(&inputs)
                    .rev()
                    .try_fold(v.to_vec(), |dv, (map, x)| map.deriv_apply(x, &dv))
            }
            _ => {
                let diag = self.diagonal(m)?;
                Ok(diag.iter().zip(v).map(|(d, x)| d * x).collect())
            }
        }
    }

    /// Apply the adjoint (transpose) of the derivative at `m` to `w`.
    pub fn deriv_adjoint_apply(&self, m: &[f64], w: &[f64]) -> Result<Vec<f64>> {
        check_len(m, w)?;
        match self {
            Mapping::Chain(maps) => {
                let inputs = stage_inputs(maps, m)?;
                maps.iter()
                    .zip(&inputs)
                    .try_fold(w.to_vec(), |dw, (map, x)| map.deriv_adjoint_apply(x, &dw))
            }
            // Elementwise maps have diagonal, hence self-adjoint, derivatives.
            _ => self.deriv_apply(m, w),
        }
    }

    fn diagonal(&self, m: &[f64]) -> Result<Vec<f64>> {
        match self {
            Mapping::Identity => Ok(vec![1.0; m.len()]),
            Mapping::Exp => Ok(m.iter().map(|x| x.exp()).collect()),
            Mapping::Log => {
                check_positive(m)?;
                Ok(m.iter().map(|x| 1.0 / x).collect())
            }
            Mapping::Chain(_) => unreachable!("chains are not elementwise leaves"),
        }
    }
}

/// Input seen by each map of a chain: `inputs[i]` is the argument of `maps[i]`.
fn stage_inputs(maps: &[Mapping], m: &[f64]) -> Result<Vec<Vec<f64>>> {
    let mut inputs = vec![Vec::new(); maps.len()];
    let mut x = m.to_vec();
    for (i, map) in maps.iter().enumerate().rev() {
        let next = map.forward(&x)?;
        inputs[i] = std::mem::replace(&mut x, next);
    }
    Ok(inputs)
}

fn check_len(m: &[f64], v: &[f64]) -> Result<()> {
    if m.len() != v.len() {
        return Err(Error::DimensionMismatch {
            expected: m.len(),
            actual: v.len(),
        });
    }
    Ok(())
}

fn check_positive(x: &[f64]) -> Result<()> {
    match x.iter().position(|v| !(*v > 0.0)) {
        Some(index) => Err(Error::MappingDomain {
            index,
            value: x[index],
        }),
        None => Ok(()),
    }
}
