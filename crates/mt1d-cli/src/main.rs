//! mt1d command-line interface.

mod experiment;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use mt1d_core::units::format_si;
use mt1d_core::{FrequencySweep, LayeredEarth};
use mt1d_solver::{BottomBoundary, Simulation, SolverStrategy};
use mt1d_validate::{
    AdjointTestConfig, ImpedanceTolerances, OrderTestConfig, VerificationReport, adjoint_test,
    check_jvec, compare_surface_impedance,
};

use crate::experiment::ExperimentConfig;
use crate::output::{RunOutput, data_rows, print_table};

#[derive(Parser)]
#[command(name = "mt1d")]
#[command(about = "One-dimensional magnetotelluric forward modeling", long_about = None)]
#[command(version)]
struct Cli {
    /// Experiment description (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Replace the model with a half-space of this conductivity (S/m)
    #[arg(long)]
    sigma: Option<f64>,

    /// Lowest frequency (Hz)
    #[arg(long)]
    fmin: Option<f64>,

    /// Highest frequency (Hz)
    #[arg(long)]
    fmax: Option<f64>,

    /// Number of log-spaced frequencies
    #[arg(long)]
    nfreq: Option<usize>,

    /// Linear solver: tridiagonal or dense
    #[arg(long)]
    solver: Option<String>,

    /// Use a zero-field bottom boundary instead of the half-space condition
    #[arg(long)]
    dirichlet: bool,

    /// Solve all frequencies on one thread
    #[arg(long)]
    sequential: bool,

    /// Run the analytic comparison, order test, and adjoint test
    #[arg(long)]
    check: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Print the effective experiment config as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = effective_config(&cli)?;
    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    run(&cli, &config)
}

/// Config file (or defaults) with command-line overrides applied.
fn effective_config(cli: &Cli) -> Result<ExperimentConfig> {
    let mut config = match &cli.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };

    if let Some(sigma) = cli.sigma {
        config.model = LayeredEarth::half_space(sigma);
    }
    if cli.fmin.is_some() || cli.fmax.is_some() || cli.nfreq.is_some() {
        let (fmin, fmax, count) = sweep_bounds(&config.frequencies);
        config.frequencies = FrequencySweep::LogCount {
            fmin: cli.fmin.unwrap_or(fmin),
            fmax: cli.fmax.unwrap_or(fmax),
            count: cli.nfreq.unwrap_or(count),
        };
    }
    if let Some(name) = &cli.solver {
        let Some(solver) = SolverStrategy::from_name(name) else {
            bail!("unknown solver '{}' (expected tridiagonal or dense)", name);
        };
        config.simulation.solver = solver;
    }
    if cli.dirichlet {
        config.simulation.bottom_boundary = BottomBoundary::Dirichlet;
    }
    if cli.sequential {
        config.simulation.parallel = false;
    }
    Ok(config)
}

fn sweep_bounds(sweep: &FrequencySweep) -> (f64, f64, usize) {
    match *sweep {
        FrequencySweep::Linear { fmin, fmax, count }
        | FrequencySweep::LogCount { fmin, fmax, count } => (fmin, fmax, count),
        FrequencySweep::Decade {
            fmin,
            fmax,
            per_decade,
        } => {
            let count = (per_decade as f64 * (fmax / fmin).log10()).ceil() as usize + 1;
            (fmin, fmax, count)
        }
    }
}

fn run(cli: &Cli, config: &ExperimentConfig) -> Result<()> {
    let experiment = config.build()?;
    let sim = Simulation::new(
        &experiment.mesh,
        &experiment.survey,
        &config.mapping,
        config.simulation.clone(),
    )
    .context("Failed to set up simulation")?;

    if cli.verbose && !cli.json {
        println!(
            "Mesh: {} cells ({} core, {} padding), depth {}",
            experiment.mesh.n_cells(),
            experiment.mesh.n_core(),
            experiment.mesh.n_padding(),
            format_si(experiment.mesh.depth(), "m")
        );
        println!(
            "Frequencies: {} ({} .. {})",
            experiment.frequencies.len(),
            format_si(experiment.frequencies[0], "Hz"),
            format_si(experiment.frequencies[experiment.frequencies.len() - 1], "Hz")
        );
        println!(
            "Solver: {}, bottom boundary: {}",
            config.simulation.solver, config.simulation.bottom_boundary
        );
        println!();
    }

    let fields = sim
        .fields(&experiment.model)
        .context("Forward solve failed")?;
    let predicted = sim
        .dpred(&experiment.model, Some(&fields))
        .context("Failed to predict data")?;
    let rows = data_rows(&experiment.survey, &predicted, &config.model);

    let verification = if cli.check {
        log::info!("running verification");
        Some(VerificationReport {
            impedance: Some(compare_surface_impedance(
                &fields,
                &config.model,
                &ImpedanceTolerances::default(),
            )?),
            order: Some(check_jvec(
                &sim,
                &experiment.model,
                None,
                &OrderTestConfig::default(),
            )?),
            adjoint: Some(adjoint_test(
                &sim,
                &experiment.model,
                &AdjointTestConfig::default(),
            )?),
        })
    } else {
        None
    };

    let passed = verification.as_ref().is_none_or(|v| v.passed());
    if cli.json {
        let out = RunOutput {
            data: rows,
            verification,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_table(&rows);
        if let Some(report) = &verification {
            println!();
            print!("{}", report.to_text());
        }
    }

    if !passed {
        bail!("verification failed");
    }
    Ok(())
}
