//! Frequency sweeps for MT soundings.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a set of survey frequencies is generated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrequencySweep {
    /// `count` linearly spaced frequencies including both endpoints.
    Linear { fmin: f64, fmax: f64, count: usize },
    /// Logarithmic spacing with `per_decade` points per decade.
    Decade { fmin: f64, fmax: f64, per_decade: usize },
    /// `count` logarithmically spaced frequencies including both endpoints.
    LogCount { fmin: f64, fmax: f64, count: usize },
}

impl FrequencySweep {
    /// Generate the frequencies of this sweep, ascending.
    pub fn generate(&self) -> Result<Vec<f64>> {
        match *self {
            FrequencySweep::Linear { fmin, fmax, count } => {
                check_range(fmin, fmax)?;
                if count <= 1 {
                    return Ok(vec![fmin]);
                }
                let step = (fmax - fmin) / (count as f64 - 1.0);
                Ok((0..count).map(|i| fmin + step * i as f64).collect())
            }
            FrequencySweep::Decade {
                fmin,
                fmax,
                per_decade,
            } => {
                check_range(fmin, fmax)?;
                if per_decade == 0 {
                    return Err(Error::InvalidConfiguration(
                        "decade sweep needs at least one point per decade".into(),
                    ));
                }
                let decades = (fmax / fmin).log10();
                let total = (per_decade as f64 * decades).ceil() as usize + 1;
                Ok((0..total)
                    .map(|i| fmin * 10.0_f64.powf(i as f64 / per_decade as f64))
                    .filter(|&f| f <= fmax * (1.0 + 1e-9))
                    .collect())
            }
            FrequencySweep::LogCount { fmin, fmax, count } => logspace(fmin, fmax, count),
        }
    }
}

/// `count` logarithmically spaced values from `fmin` to `fmax` inclusive.
pub fn logspace(fmin: f64, fmax: f64, count: usize) -> Result<Vec<f64>> {
    check_range(fmin, fmax)?;
    match count {
        0 => Err(Error::InvalidConfiguration(
            "frequency sweep must contain at least one point".into(),
        )),
        1 => Ok(vec![fmin]),
        _ => {
            let (lo, hi) = (fmin.log10(), fmax.log10());
            let step = (hi - lo) / (count as f64 - 1.0);
            Ok((0..count)
                .map(|i| {
                    if i == count - 1 {
                        fmax
                    } else {
                        10.0_f64.powf(lo + step * i as f64)
                    }
                })
                .collect())
        }
    }
}

fn check_range(fmin: f64, fmax: f64) -> Result<()> {
    if !(fmin.is_finite() && fmax.is_finite()) || fmin <= 0.0 || fmax < fmin {
        return Err(Error::InvalidConfiguration(format!(
            "invalid frequency range [{}, {}] Hz",
            fmin, fmax
        )));
    }
    Ok(())
}
