//! Physical constants and unit helpers.

use std::f64::consts::PI;

/// Magnetic permeability of free space (H/m).
pub const MU_0: f64 = 4.0e-7 * PI;

/// Angular frequency ω = 2πf (rad/s) for a frequency in Hz.
#[inline]
pub fn angular_frequency(frequency: f64) -> f64 {
    2.0 * PI * frequency
}

/// Electromagnetic skin depth δ = √(2 / (ωμ₀σ)) in metres.
///
/// Returns `f64::INFINITY` for zero conductivity and NaN for negative inputs.
#[inline]
pub fn skin_depth(frequency: f64, conductivity: f64) -> f64 {
    (2.0 / (angular_frequency(frequency) * MU_0 * conductivity)).sqrt()
}

/// Format a value with an SI prefix and unit, e.g. `1.5 km` or `10 mHz`.
pub fn format_si(value: f64, unit: &str) -> String {
    const PREFIXES: [(f64, &str); 9] = [
        (1e12, "T"),
        (1e9, "G"),
        (1e6, "M"),
        (1e3, "k"),
        (1.0, ""),
        (1e-3, "m"),
        (1e-6, "u"),
        (1e-9, "n"),
        (1e-12, "p"),
    ];

    if value == 0.0 || !value.is_finite() {
        return format!("{} {}", value, unit);
    }

    let magnitude = value.abs();
    let (scale, prefix) = PREFIXES
        .iter()
        .copied()
        .find(|(scale, _)| magnitude >= *scale)
        .unwrap_or((1e-12, "p"));

    let scaled = value / scale;
    let text = format!("{:.3}", scaled);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}{}", text, prefix, unit)
}
