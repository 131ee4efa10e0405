//! Closed-form 1D MT impedances.
//!
//! Time convention `e^{iωt}`, so a homogeneous half-space has
//! `Z = sqrt(iωμ₀/σ)` with a phase of 45°.

use mt1d_core::{LayeredEarth, MU_0, angular_frequency};
use num_complex::Complex64 as C64;

use crate::error::{Error, Result};

/// Above this `Re(k h)` a layer hides everything below it.
const TANH_SATURATION: f64 = 20.0;

/// Surface impedance of a half-space of conductivity `sigma` (S/m).
pub fn halfspace_impedance(frequency: f64, sigma: f64) -> Result<C64> {
    if !(frequency > 0.0 && sigma > 0.0) {
        return Err(Error::InvalidConfiguration(format!(
            "half-space impedance needs positive frequency and conductivity, got {} Hz, {} S/m",
            frequency, sigma
        )));
    }
    Ok((iwmu(frequency) / sigma).sqrt())
}

/// Surface impedance of `model`, by the layer recursion from the basement up.
///
/// A layer of zero conductivity adds `iωμ₀h` to the impedance below it.
pub fn layered_impedance(frequency: f64, model: &LayeredEarth) -> Result<C64> {
    let mut z = halfspace_impedance(frequency, model.basement)?;
    let iwm = iwmu(frequency);
    for layer in model.layers.iter().rev() {
        if !(layer.conductivity >= 0.0 && layer.thickness > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "layer with thickness {} m and conductivity {} S/m",
                layer.thickness, layer.conductivity
            )));
        }
        if layer.conductivity == 0.0 {
            z += iwm * layer.thickness;
            continue;
        }
        let k = (iwm * layer.conductivity).sqrt();
        let intrinsic = iwm / k;
        let t = stable_tanh(k * layer.thickness);
        z = intrinsic * (z + intrinsic * t) / (intrinsic + z * t);
    }
    Ok(z)
}

/// Apparent resistivity `|Z|²/(ωμ₀)` (Ω·m).
pub fn apparent_resistivity(z: C64, frequency: f64) -> f64 {
    z.norm_sqr() / (angular_frequency(frequency) * MU_0)
}

/// Impedance phase in degrees, in (-180°, 180°].
pub fn phase_degrees(z: C64) -> f64 {
    z.im.atan2(z.re).to_degrees()
}

fn iwmu(frequency: f64) -> C64 {
    C64::new(0.0, angular_frequency(frequency) * MU_0)
}

fn stable_tanh(x: C64) -> C64 {
    if x.re > TANH_SATURATION {
        C64::new(1.0, 0.0)
    } else {
        x.tanh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt1d_core::Layer;

    #[test]
    fn test_halfspace_resistivity_and_phase() {
        for f in [1e-3, 1.0, 1e3] {
            let z = halfspace_impedance(f, 0.02).unwrap();
            assert!((apparent_resistivity(z, f) - 50.0).abs() < 1e-9);
            assert!((phase_degrees(z) - 45.0).abs() < 1e-9);
        }
        assert!(halfspace_impedance(1.0, 0.0).is_err());
    }

    #[test]
    fn test_uniform_layers_reduce_to_halfspace() {
        let model = LayeredEarth::new(
            vec![
                Layer {
                    thickness: 100.0,
                    conductivity: 0.1,
                },
                Layer {
                    thickness: 300.0,
                    conductivity: 0.1,
                },
            ],
            0.1,
        )
        .unwrap();
        let z = layered_impedance(10.0, &model).unwrap();
        let exact = halfspace_impedance(10.0, 0.1).unwrap();
        assert!((z - exact).norm() < 1e-12 * exact.norm());
    }

    #[test]
    fn test_thick_top_layer_hides_basement() {
        let model = LayeredEarth::new(
            vec![Layer {
                thickness: 1e5,
                conductivity: 1.0,
            }],
            1e-4,
        )
        .unwrap();
        let z = layered_impedance(100.0, &model).unwrap();
        let exact = halfspace_impedance(100.0, 1.0).unwrap();
        assert!(z.is_finite());
        assert!((z - exact).norm() < 1e-9 * exact.norm());
    }

    #[test]
    fn test_resistive_layer_adds_inductive_term() {
        let model = LayeredEarth::new(
            vec![Layer {
                thickness: 50.0,
                conductivity: 0.0,
            }],
            0.5,
        )
        .unwrap();
        let below = halfspace_impedance(1.0, 0.5).unwrap();
        let z = layered_impedance(1.0, &model).unwrap();
        assert!((z - below - iwmu(1.0) * 50.0).norm() < 1e-15);
    }

    #[test]
    fn test_conductive_cover_seen_at_high_frequency() {
        // A conductive layer over a resistor: high frequencies see the layer.
        let model = LayeredEarth::new(
            vec![Layer {
                thickness: 200.0,
                conductivity: 1.0,
            }],
            0.001,
        )
        .unwrap();
        let high = layered_impedance(1e3, &model).unwrap();
        let low = layered_impedance(1e-4, &model).unwrap();
        assert!((apparent_resistivity(high, 1e3) - 1.0).abs() < 0.01);
        assert!(apparent_resistivity(low, 1e-4) > 10.0);
    }
}
