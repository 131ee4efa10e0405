//! Verification of the simulator against the layered-earth recursion and
//! its own derivative contracts.

use mt1d_core::{
    ComponentRequest, Layer, LayeredEarth, Mapping, Mesh, MeshParams, Receiver, Survey, logspace,
};
use mt1d_solver::{BottomBoundary, Fields, Simulation, SimulationConfig};
use mt1d_validate::{
    AdjointTestConfig, ImpedanceTolerances, OrderTestConfig, VerificationReport, adjoint_test,
    check_jvec, compare_surface_impedance,
};

fn layered_model() -> LayeredEarth {
    LayeredEarth::new(
        vec![
            Layer {
                thickness: 200.0,
                conductivity: 0.01,
            },
            Layer {
                thickness: 400.0,
                conductivity: 0.5,
            },
            Layer {
                thickness: 1000.0,
                conductivity: 0.002,
            },
        ],
        0.05,
    )
    .unwrap()
}

/// Interfaces at 200, 600, and 1600 m fall on nodes.
fn layered_mesh() -> Mesh {
    let mut widths = vec![20.0; 10];
    widths.extend(vec![25.0; 16]);
    widths.extend(vec![100.0; 10]);
    let mut h = 100.0;
    for _ in 0..14 {
        h *= 1.3;
        widths.push(h);
    }
    Mesh::with_core(widths, 36).unwrap()
}

fn frequencies() -> Vec<f64> {
    logspace(1e-2, 1e2, 9).unwrap()
}

fn survey() -> Survey {
    let surface = Receiver::with_request(0.0, ComponentRequest::Both, frequencies()).unwrap();
    let buried =
        Receiver::with_request(200.0, ComponentRequest::AppResPhase, frequencies()).unwrap();
    Survey::from_receivers(vec![surface, buried]).unwrap()
}

#[test]
fn test_layered_surface_impedance_matches_recursion() {
    let mesh = layered_mesh();
    let model = layered_model();
    let sigma = model.conductivity_on(&mesh).unwrap();
    let fields = Fields::compute(&mesh, &sigma, &frequencies(), &SimulationConfig::default())
        .unwrap();

    let report =
        compare_surface_impedance(&fields, &model, &ImpedanceTolerances::default()).unwrap();
    assert!(report.passed, "{}", report.to_text());
    assert_eq!(report.summary.n_frequencies, 9);
}

#[test]
fn test_halfspace_from_built_mesh_matches_recursion() {
    let freqs = logspace(1e-3, 1e2, 16).unwrap();
    let mesh = MeshParams::new(0.01, freqs.clone()).build().unwrap();
    let model = LayeredEarth::half_space(0.01);
    let sigma = model.conductivity_on(&mesh).unwrap();
    for boundary in [BottomBoundary::HalfSpace, BottomBoundary::Dirichlet] {
        let config = SimulationConfig::default().with_bottom_boundary(boundary);
        let fields = Fields::compute(&mesh, &sigma, &freqs, &config).unwrap();
        let report =
            compare_surface_impedance(&fields, &model, &ImpedanceTolerances::default()).unwrap();
        assert!(report.passed, "{}: {}", boundary, report.to_text());
    }
}

#[test]
fn test_jvec_is_second_order_accurate() {
    let mesh = layered_mesh();
    let survey = survey();
    let mapping = Mapping::Exp;
    let sigma = layered_model().conductivity_on(&mesh).unwrap();
    let m = mapping.inverse(&sigma).unwrap();
    let sim = Simulation::new(&mesh, &survey, &mapping, SimulationConfig::default()).unwrap();

    for seed in [1, 2, 3] {
        let config = OrderTestConfig::default().with_seed(seed);
        let result = check_jvec(&sim, &m, None, &config).unwrap();
        assert!(result.passed, "seed {}:\n{}", seed, result.to_text());
        assert!(!result.exact);
    }
}

#[test]
fn test_adjoint_identity_through_mappings() {
    let mesh = layered_mesh();
    let survey = survey();
    let sigma = layered_model().conductivity_on(&mesh).unwrap();

    let maps = [
        Mapping::Identity,
        Mapping::Exp,
        Mapping::chain(vec![Mapping::Exp, Mapping::Identity]),
    ];
    for mapping in &maps {
        let m = mapping.inverse(&sigma).unwrap();
        for boundary in [BottomBoundary::HalfSpace, BottomBoundary::Dirichlet] {
            let config = SimulationConfig::default().with_bottom_boundary(boundary);
            let sim = Simulation::new(&mesh, &survey, mapping, config).unwrap();
            let result = adjoint_test(&sim, &m, &AdjointTestConfig::default()).unwrap();
            assert!(
                result.passed,
                "{:?}, {}:\n{}",
                mapping,
                boundary,
                result.to_text()
            );
        }
    }
}

#[test]
fn test_verification_report_serializes() {
    let mesh = layered_mesh();
    let survey = survey();
    let mapping = Mapping::Exp;
    let model = layered_model();
    let sigma = model.conductivity_on(&mesh).unwrap();
    let m = mapping.inverse(&sigma).unwrap();
    let sim = Simulation::new(&mesh, &survey, &mapping, SimulationConfig::default()).unwrap();
    let fields = sim.fields(&m).unwrap();

    let report = VerificationReport {
        impedance: Some(
            compare_surface_impedance(&fields, &model, &ImpedanceTolerances::default()).unwrap(),
        ),
        order: Some(check_jvec(&sim, &m, None, &OrderTestConfig::default()).unwrap()),
        adjoint: Some(adjoint_test(&sim, &m, &AdjointTestConfig::default()).unwrap()),
    };
    assert!(report.passed(), "{}", report.to_text());

    let json = report.to_json().unwrap();
    let back: VerificationReport = serde_json::from_str(&json).unwrap();
    assert!(back.passed());
}
