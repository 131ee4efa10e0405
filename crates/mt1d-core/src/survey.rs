//! Survey, source, and receiver descriptors.
//!
//! A survey is an ordered list of sources, each holding receivers. The data
//! vector is the concatenation, in (source, receiver, frequency, component)
//! order, of every receiver's requested outputs. The plane-wave source has no
//! physics of its own; it only groups receivers.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::units::{MU_0, angular_frequency};

/// A scalar reduction of the complex surface impedance `Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Re(Z) in ohms.
    Real,
    /// Im(Z) in ohms.
    Imag,
    /// Apparent resistivity |Z|²/(ωμ₀) in ohm-metres.
    AppRes,
    /// atan2(Im Z, Re Z) in degrees, in (-180°, 180°].
    Phase,
}

impl Component {
    /// Evaluate this component for impedance `z` at `frequency` (Hz).
    pub fn evaluate(&self, z_re: f64, z_im: f64, frequency: f64) -> f64 {
        match self {
            Component::Real => z_re,
            Component::Imag => z_im,
            Component::AppRes => {
                (z_re * z_re + z_im * z_im) / (angular_frequency(frequency) * MU_0)
            }
            Component::Phase => z_im.atan2(z_re) * 180.0 / PI,
        }
    }

    /// Partial derivatives `(∂d/∂Re Z, ∂d/∂Im Z)` of this component.
    pub fn gradient(&self, z_re: f64, z_im: f64, frequency: f64) -> (f64, f64) {
        match self {
            Component::Real => (1.0, 0.0),
            Component::Imag => (0.0, 1.0),
            Component::AppRes => {
                let scale = 2.0 / (angular_frequency(frequency) * MU_0);
                (scale * z_re, scale * z_im)
            }
            Component::Phase => {
                let norm_sqr = z_re * z_re + z_im * z_im;
                let deg = 180.0 / PI;
                (-deg * z_im / norm_sqr, deg * z_re / norm_sqr)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Component::Real => "real",
            Component::Imag => "imag",
            Component::AppRes => "app_res",
            Component::Phase => "phase",
        }
    }
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Shorthand for requesting one or more components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentRequest {
    Real,
    Imag,
    AppRes,
    Phase,
    /// Real and imaginary impedance.
    Both,
    /// Apparent resistivity and phase.
    AppResPhase,
}

impl ComponentRequest {
    /// The components this request expands to, in data order.
    pub fn components(&self) -> Vec<Component> {
        match self {
            ComponentRequest::Real => vec![Component::Real],
            ComponentRequest::Imag => vec![Component::Imag],
            ComponentRequest::AppRes => vec![Component::AppRes],
            ComponentRequest::Phase => vec![Component::Phase],
            ComponentRequest::Both => vec![Component::Real, Component::Imag],
            ComponentRequest::AppResPhase => vec![Component::AppRes, Component::Phase],
        }
    }
}

/// A receiver: a depth, the components it reports, and its frequencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ReceiverRecord")]
pub struct Receiver {
    /// Depth below the surface (m); `0` is the surface.
    pub location: f64,
    pub components: Vec<Component>,
    /// Frequencies (Hz) in data order.
    pub frequencies: Vec<f64>,
}

#[derive(Deserialize)]
struct ReceiverRecord {
    location: f64,
    components: Vec<Component>,
    frequencies: Vec<f64>,
}

impl TryFrom<ReceiverRecord> for Receiver {
    type Error = Error;

    fn try_from(record: ReceiverRecord) -> Result<Self> {
        Receiver::new(record.location, record.components, record.frequencies)
    }
}

impl Receiver {
    pub fn new(location: f64, components: Vec<Component>, frequencies: Vec<f64>) -> Result<Self> {
        let rx = Self {
            location,
            components,
            frequencies,
        };
        rx.validate()?;
        Ok(rx)
    }

    /// Receiver expanding a [`ComponentRequest`].
    pub fn with_request(
        location: f64,
        request: ComponentRequest,
        frequencies: Vec<f64>,
    ) -> Result<Self> {
        Self::new(location, request.components(), frequencies)
    }

    /// Surface receiver reporting real and imaginary impedance.
    pub fn surface_impedance(frequencies: Vec<f64>) -> Result<Self> {
        Self::with_request(0.0, ComponentRequest::Both, frequencies)
    }

    /// Number of data this receiver contributes.
    pub fn n_data(&self) -> usize {
        self.components.len() * self.frequencies.len()
    }

    fn validate(&self) -> Result<()> {
        if !(self.location.is_finite() && self.location >= 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "receiver depth must be non-negative, got {}",
                self.location
            )));
        }
        if self.components.is_empty() {
            return Err(Error::InvalidConfiguration(
                "receiver requests no components".into(),
            ));
        }
        if self.frequencies.is_empty() {
            return Err(Error::InvalidConfiguration(
                "receiver has no frequencies".into(),
            ));
        }
        if let Some(&f) = self.frequencies.iter().find(|f| !(f.is_finite() && **f > 0.0)) {
            return Err(Error::InvalidConfiguration(format!(
                "receiver frequencies must be positive, got {}",
                f
            )));
        }
        for (i, f) in self.frequencies.iter().enumerate() {
            if self.frequencies[..i].contains(f) {
                return Err(Error::InvalidConfiguration(format!(
                    "receiver lists frequency {} Hz twice",
                    f
                )));
            }
        }
        for (i, c) in self.components.iter().enumerate() {
            if self.components[..i].contains(c) {
                return Err(Error::InvalidConfiguration(format!(
                    "receiver lists component {} twice",
                    c
                )));
            }
        }
        Ok(())
    }
}

/// A plane-wave source grouping receivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Nominal source location; carries no physics in 1D MT.
    #[serde(default)]
    pub location: f64,
    pub receivers: Vec<Receiver>,
}

impl Source {
    pub fn new(receivers: Vec<Receiver>) -> Self {
        Self {
            location: 0.0,
            receivers,
        }
    }
}

/// One entry of the data vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    pub source: usize,
    pub receiver: usize,
    pub frequency: f64,
    pub location: f64,
    pub component: Component,
}

/// Full survey definition. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SurveyRecord")]
pub struct Survey {
    sources: Vec<Source>,
}

#[derive(Deserialize)]
struct SurveyRecord {
    sources: Vec<Source>,
}

impl TryFrom<SurveyRecord> for Survey {
    type Error = Error;

    fn try_from(record: SurveyRecord) -> Result<Self> {
        Survey::new(record.sources)
    }
}

impl Survey {
    pub fn new(sources: Vec<Source>) -> Result<Self> {
        if sources.iter().all(|s| s.receivers.is_empty()) {
            return Err(Error::InvalidConfiguration(
                "survey has no receivers".into(),
            ));
        }
        for rx in sources.iter().flat_map(|s| &s.receivers) {
            rx.validate()?;
        }
        Ok(Self { sources })
    }

    /// Survey with a single source holding `receivers`.
    pub fn from_receivers(receivers: Vec<Receiver>) -> Result<Self> {
        Self::new(vec![Source::new(receivers)])
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Total number of data.
    pub fn n_data(&self) -> usize {
        self.receivers().map(|(_, _, rx)| rx.n_data()).sum()
    }

    /// Iterate `(source index, receiver index, receiver)`.
    pub fn receivers(&self) -> impl Iterator<Item = (usize, usize, &Receiver)> {
        self.sources.iter().enumerate().flat_map(|(si, src)| {
            src.receivers
                .iter()
                .enumerate()
                .map(move |(ri, rx)| (si, ri, rx))
        })
    }

    /// Descriptors for every datum, in data-vector order.
    pub fn data(&self) -> Vec<Datum> {
        let mut data = Vec::with_capacity(self.n_data());
        for (source, receiver, rx) in self.receivers() {
            for &frequency in &rx.frequencies {
                for &component in &rx.components {
                    data.push(Datum {
                        source,
                        receiver,
                        frequency,
                        location: rx.location,
                        component,
                    });
                }
            }
        }
        data
    }

    /// Distinct frequencies across all receivers, ascending.
    pub fn frequencies(&self) -> Vec<f64> {
        let mut freqs: Vec<f64> = self
            .receivers()
            .flat_map(|(_, _, rx)| rx.frequencies.iter().copied())
            .collect();
        freqs.sort_by(f64::total_cmp);
        freqs.dedup();
        freqs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_ordering() {
        let rx_a = Receiver::surface_impedance(vec![10.0, 1.0]).unwrap();
        let rx_b = Receiver::new(0.0, vec![Component::Phase], vec![5.0]).unwrap();
        let survey = Survey::new(vec![Source::new(vec![rx_a]), Source::new(vec![rx_b])]).unwrap();

        assert_eq!(survey.n_data(), 5);
        let data = survey.data();
        let order: Vec<(usize, f64, Component)> = data
            .iter()
            .map(|d| (d.source, d.frequency, d.component))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, 10.0, Component::Real),
                (0, 10.0, Component::Imag),
                (0, 1.0, Component::Real),
                (0, 1.0, Component::Imag),
                (1, 5.0, Component::Phase),
            ]
        );
        assert_eq!(survey.frequencies(), vec![1.0, 5.0, 10.0]);
    }

    #[test]
    fn test_component_values() {
        // Z = 1 + 1i at f such that ωμ₀ = 1
        let f = 1.0 / (2.0 * PI * MU_0);
        assert!((Component::AppRes.evaluate(1.0, 1.0, f) - 2.0).abs() < 1e-12);
        assert!((Component::Phase.evaluate(1.0, 1.0, f) - 45.0).abs() < 1e-12);
        assert!((Component::Phase.evaluate(-1.0, 0.0, f) - 180.0).abs() < 1e-12);
        assert_eq!(Component::Real.evaluate(3.0, 4.0, f), 3.0);
        assert_eq!(Component::Imag.evaluate(3.0, 4.0, f), 4.0);
    }

    #[test]
    fn test_component_gradients_match_differences() {
        let (x, y, f) = (0.3, 0.2, 7.0);
        let h = 1e-7;
        for c in [
            Component::Real,
            Component::Imag,
            Component::AppRes,
            Component::Phase,
        ] {
            let (gx, gy) = c.gradient(x, y, f);
            let fd_x = (c.evaluate(x + h, y, f) - c.evaluate(x - h, y, f)) / (2.0 * h);
            let fd_y = (c.evaluate(x, y + h, f) - c.evaluate(x, y - h, f)) / (2.0 * h);
            let scale = 1.0 + gx.abs() + gy.abs();
            assert!((gx - fd_x).abs() < 1e-6 * scale, "{}: {} vs {}", c, gx, fd_x);
            assert!((gy - fd_y).abs() < 1e-6 * scale, "{}: {} vs {}", c, gy, fd_y);
        }
    }

    #[test]
    fn test_requests_expand() {
        assert_eq!(
            ComponentRequest::Both.components(),
            vec![Component::Real, Component::Imag]
        );
        assert_eq!(
            ComponentRequest::AppResPhase.components(),
            vec![Component::AppRes, Component::Phase]
        );
    }

    #[test]
    fn test_invalid_receivers() {
        assert!(Receiver::new(-1.0, vec![Component::Real], vec![1.0]).is_err());
        assert!(Receiver::new(0.0, vec![], vec![1.0]).is_err());
        assert!(Receiver::new(0.0, vec![Component::Real], vec![]).is_err());
        assert!(Receiver::new(0.0, vec![Component::Real], vec![0.0]).is_err());
        assert!(Receiver::new(0.0, vec![Component::Real], vec![1.0, 1.0]).is_err());
        assert!(Survey::new(vec![Source::new(vec![])]).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let survey: Survey = serde_json::from_str(
            r#"{"sources":[{"receivers":[
                {"location":0.0,"components":["real","imag"],"frequencies":[1.0,10.0]}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(survey.n_data(), 4);

        for frequencies in ["[-1.0]", "[0.0]", "[]", "[1.0,1.0]"] {
            let json = format!(
                r#"{{"sources":[{{"receivers":[
                    {{"location":0.0,"components":["real"],"frequencies":{}}}
                ]}}]}}"#,
                frequencies
            );
            assert!(serde_json::from_str::<Survey>(&json).is_err(), "{}", frequencies);
        }
        assert!(serde_json::from_str::<Survey>(r#"{"sources":[]}"#).is_err());
        assert!(
            serde_json::from_str::<Receiver>(
                r#"{"location":-5.0,"components":["phase"],"frequencies":[1.0]}"#
            )
            .is_err()
        );
    }
}
