//! A mesh, survey, and mapping viewed together as one forward problem.
//!
//! [`Simulation`] only borrows its inputs; it holds no model-dependent
//! state. Each call takes the model explicitly and may be handed the
//! [`Fields`] of an earlier call with the same model to skip the solves.

use std::borrow::Cow;

use mt1d_core::{Mapping, Mesh, Survey};

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::fields::Fields;
use crate::forward::{DataPlan, predict};
use crate::sensitivity::{apply_jtvec, apply_jvec};

#[derive(Debug, Clone)]
pub struct Simulation<'a> {
    mesh: &'a Mesh,
    survey: &'a Survey,
    mapping: &'a Mapping,
    config: SimulationConfig,
    plan: DataPlan,
}

impl<'a> Simulation<'a> {
    /// Resolve `survey` against `mesh`. Fails if a receiver is not on a node.
    pub fn new(
        mesh: &'a Mesh,
        survey: &'a Survey,
        mapping: &'a Mapping,
        config: SimulationConfig,
    ) -> Result<Self> {
        let plan = DataPlan::new(mesh, survey)?;
        log::debug!(
            "simulation: {} cells, {} frequencies, {} data, {} bottom, {} solver",
            mesh.n_cells(),
            plan.frequencies().len(),
            plan.n_data(),
            config.bottom_boundary,
            config.solver
        );
        Ok(Self {
            mesh,
            survey,
            mapping,
            config,
            plan,
        })
    }

    pub fn mesh(&self) -> &Mesh {
        self.mesh
    }

    pub fn survey(&self) -> &Survey {
        self.survey
    }

    pub fn mapping(&self) -> &Mapping {
        self.mapping
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn plan(&self) -> &DataPlan {
        &self.plan
    }

    /// Length of the model vector (one value per cell).
    pub fn n_model(&self) -> usize {
        self.mesh.n_cells()
    }

    /// Length of the data vector.
    pub fn n_data(&self) -> usize {
        self.plan.n_data()
    }

    /// Conductivity for `model`.
    pub fn conductivity(&self, model: &[f64]) -> Result<Vec<f64>> {
        check_len(self.n_model(), model.len())?;
        Ok(self.mapping.forward(model)?)
    }

    /// Solve the fields for `model` at every survey frequency.
    pub fn fields(&self, model: &[f64]) -> Result<Fields> {
        let sigma = self.conductivity(model)?;
        Fields::compute(self.mesh, &sigma, self.plan.frequencies(), &self.config)
    }

    /// Predicted data for `model`, in survey order.
    pub fn dpred(&self, model: &[f64], fields: Option<&Fields>) -> Result<Vec<f64>> {
        let sigma = self.conductivity(model)?;
        let fields = self.resolve(&sigma, fields)?;
        predict(&self.plan, &fields)
    }

    /// `J v`: the change in predicted data along model direction `v`.
    pub fn jvec(&self, model: &[f64], v: &[f64], fields: Option<&Fields>) -> Result<Vec<f64>> {
        check_len(self.n_model(), v.len())?;
        let sigma = self.conductivity(model)?;
        let dsigma = self.mapping.deriv_apply(model, v)?;
        let fields = self.resolve(&sigma, fields)?;
        apply_jvec(&self.plan, &fields, &dsigma, &self.config)
    }

    /// `Jᵀ w`: the adjoint of [`jvec`](Self::jvec) applied to data vector `w`.
    pub fn jtvec(&self, model: &[f64], w: &[f64], fields: Option<&Fields>) -> Result<Vec<f64>> {
        check_len(self.n_data(), w.len())?;
        let sigma = self.conductivity(model)?;
        let fields = self.resolve(&sigma, fields)?;
        let jt_sigma = apply_jtvec(&self.plan, &fields, w, &self.config)?;
        Ok(self.mapping.deriv_adjoint_apply(model, &jt_sigma)?)
    }

    /// Reuse `cached` if it was computed for `sigma` on this survey,
    /// otherwise solve.
    fn resolve<'f>(&self, sigma: &[f64], cached: Option<&'f Fields>) -> Result<Cow<'f, Fields>> {
        match cached {
            Some(fields) => {
                let same_frequencies = fields.n_frequencies() == self.plan.frequencies().len()
                    && fields.frequencies().zip(self.plan.frequencies()).all(|(a, b)| a == *b);
                if fields.sigma() != sigma
                    || fields.widths() != self.mesh.widths()
                    || fields.boundary() != self.config.bottom_boundary
                    || !same_frequencies
                {
                    return Err(Error::InvalidConfiguration(
                        "fields were computed for a different model or survey".into(),
                    ));
                }
                Ok(Cow::Borrowed(fields))
            }
            None => Ok(Cow::Owned(Fields::compute(
                self.mesh,
                sigma,
                self.plan.frequencies(),
                &self.config,
            )?)),
        }
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt1d_core::Receiver;

    fn setup() -> (Mesh, Survey) {
        let mesh = Mesh::from_widths(vec![25.0, 25.0, 50.0, 100.0, 200.0]).unwrap();
        let rx = Receiver::surface_impedance(vec![1.0, 10.0]).unwrap();
        (mesh, Survey::from_receivers(vec![rx]).unwrap())
    }

    #[test]
    fn test_sizes() {
        let (mesh, survey) = setup();
        let mapping = Mapping::Exp;
        let sim = Simulation::new(&mesh, &survey, &mapping, SimulationConfig::default()).unwrap();
        assert_eq!(sim.n_model(), 5);
        assert_eq!(sim.n_data(), 4);
    }

    #[test]
    fn test_cached_fields_give_same_data() {
        let (mesh, survey) = setup();
        let mapping = Mapping::Exp;
        let sim = Simulation::new(&mesh, &survey, &mapping, SimulationConfig::default()).unwrap();
        let m = vec![(0.05_f64).ln(); 5];

        let fields = sim.fields(&m).unwrap();
        let cached = sim.dpred(&m, Some(&fields)).unwrap();
        let fresh = sim.dpred(&m, None).unwrap();
        assert_eq!(cached, fresh);
    }

    #[test]
    fn test_stale_fields_rejected() {
        let (mesh, survey) = setup();
        let mapping = Mapping::Identity;
        let sim = Simulation::new(&mesh, &survey, &mapping, SimulationConfig::default()).unwrap();
        let fields = sim.fields(&[0.1; 5]).unwrap();
        assert!(matches!(
            sim.dpred(&[0.2; 5], Some(&fields)),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_dimension_contract() {
        let (mesh, survey) = setup();
        let mapping = Mapping::Identity;
        let sim = Simulation::new(&mesh, &survey, &mapping, SimulationConfig::default()).unwrap();
        let m = [0.1; 5];
        assert!(matches!(
            sim.jvec(&m, &[1.0; 4], None),
            Err(Error::DimensionMismatch {
                expected: 5,
                actual: 4
            })
        ));
        assert!(matches!(
            sim.jtvec(&m, &[1.0; 5], None),
            Err(Error::DimensionMismatch {
                expected: 4,
                actual: 5
            })
        ));
        assert!(matches!(
            sim.dpred(&[0.1; 3], None),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_mapping_domain_error_propagates() {
        let (mesh, survey) = setup();
        let mapping = Mapping::Log;
        let sim = Simulation::new(&mesh, &survey, &mapping, SimulationConfig::default()).unwrap();
        assert!(matches!(
            sim.dpred(&[1.0, 2.0, -1.0, 3.0, 4.0], None),
            Err(Error::Core(mt1d_core::Error::MappingDomain { index: 2, .. }))
        ));
    }
}
