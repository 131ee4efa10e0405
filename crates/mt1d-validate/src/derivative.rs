//! Taylor-series order test for derivative operators.
//!
//! For a base point `m`, direction `v`, and a shrinking sequence of steps
//! `h`, the zeroth-order remainder `‖f(m + hv) - f(m)‖` must shrink like
//! `h` and the first-order remainder `‖f(m + hv) - f(m) - h J v‖` like `h²`
//! when `J v` is the true directional derivative.

use mt1d_solver::ForwardOperator;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::random::{norm, random_vector};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderTestConfig {
    /// First step size.
    pub initial_step: f64,
    /// Ratio between consecutive steps, in (0, 1).
    pub step_factor: f64,
    pub num_steps: usize,
    /// Expected convergence order of the first-order remainder.
    pub expected_order: f64,
    /// Accepted deviation of a measured order from `expected_order`.
    pub tolerance: f64,
    /// Consecutive in-band orders required to pass.
    pub min_passing: usize,
    /// Final measured orders that must all be in band. Orders taken where
    /// either remainder sits at round-off are skipped.
    pub trailing_steps: usize,
    /// Seed for the random direction when none is supplied.
    pub seed: u64,
}

impl Default for OrderTestConfig {
    fn default() -> Self {
        Self {
            initial_step: 0.1,
            step_factor: 0.5,
            num_steps: 8,
            expected_order: 2.0,
            tolerance: 0.2,
            min_passing: 3,
            trailing_steps: 2,
            seed: 1,
        }
    }
}

impl OrderTestConfig {
    pub fn with_steps(mut self, initial_step: f64, step_factor: f64, num_steps: usize) -> Self {
        self.initial_step = initial_step;
        self.step_factor = step_factor;
        self.num_steps = num_steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "initial step must be positive, got {}",
                self.initial_step
            )));
        }
        if !(self.step_factor > 0.0 && self.step_factor < 1.0) {
            return Err(Error::InvalidConfiguration(format!(
                "step factor must lie in (0, 1), got {}",
                self.step_factor
            )));
        }
        if self.num_steps < 2 || self.min_passing == 0 {
            return Err(Error::InvalidConfiguration(
                "order test needs at least two steps and one passing order".into(),
            ));
        }
        Ok(())
    }
}

/// Remainders at one step size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStep {
    pub step: f64,
    /// `‖f(m + hv) - f(m)‖`
    pub zeroth_error: f64,
    /// `‖f(m + hv) - f(m) - h J v‖`
    pub first_error: f64,
    /// Measured order of `zeroth_error` against the previous step.
    pub zeroth_order: Option<f64>,
    /// Measured order of `first_error` against the previous step.
    pub first_order: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTestResult {
    pub steps: Vec<OrderStep>,
    pub expected_order: f64,
    /// Longest run of consecutive first-order orders within tolerance.
    pub longest_run: usize,
    /// The last `trailing_steps` orders above round-off are within tolerance.
    pub trailing_in_band: bool,
    /// The first-order remainder reached round-off at every step, as for a
    /// linear function.
    pub exact: bool,
    pub passed: bool,
}

impl OrderTestResult {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Order test: {} (expected order {:.1}, best run {})\n",
            if self.passed { "PASS" } else { "FAIL" },
            self.expected_order,
            self.longest_run
        ));
        out.push_str("  step          |f1-f0|       order   |f1-f0-hJv|   order\n");
        for s in &self.steps {
            out.push_str(&format!(
                "  {:<12.4e}  {:<12.4e}  {:<6}  {:<12.4e}  {}\n",
                s.step,
                s.zeroth_error,
                fmt_order(s.zeroth_order),
                s.first_error,
                fmt_order(s.first_order)
            ));
        }
        out
    }
}

fn fmt_order(order: Option<f64>) -> String {
    order.map_or_else(|| "-".to_string(), |o| format!("{:.3}", o))
}

/// Order test for arbitrary `f` and directional derivative `jv = J(m) v`.
pub fn check_derivative<F>(
    f: F,
    m: &[f64],
    v: &[f64],
    jv: &[f64],
    config: &OrderTestConfig,
) -> Result<OrderTestResult>
where
    F: Fn(&[f64]) -> Result<Vec<f64>>,
{
    config.validate()?;
    if m.len() != v.len() {
        return Err(Error::DimensionMismatch {
            expected: m.len(),
            actual: v.len(),
        });
    }
    let f0 = f(m)?;
    if f0.len() != jv.len() {
        return Err(Error::DimensionMismatch {
            expected: f0.len(),
            actual: jv.len(),
        });
    }
    let floor = 100.0 * f64::EPSILON * norm(&f0).max(f64::MIN_POSITIVE);

    let rate = (1.0 / config.step_factor).ln();
    let order = |prev: f64, cur: f64| {
        (prev > 0.0 && cur > 0.0 && prev.is_finite() && cur.is_finite())
            .then(|| (prev / cur).ln() / rate)
    };

    let mut steps: Vec<OrderStep> = Vec::with_capacity(config.num_steps);
    let mut h = config.initial_step;
    for _ in 0..config.num_steps {
        let shifted: Vec<f64> = m.iter().zip(v).map(|(x, d)| x + h * d).collect();
        let f1 = f(&shifted)?;
        let zeroth: Vec<f64> = f1.iter().zip(&f0).map(|(a, b)| a - b).collect();
        let first: Vec<f64> = zeroth.iter().zip(jv).map(|(d, j)| d - h * j).collect();
        let (zeroth_error, first_error) = (norm(&zeroth), norm(&first));

        let (zeroth_order, first_order) = match steps.last() {
            Some(prev) => (
                order(prev.zeroth_error, zeroth_error),
                order(prev.first_error, first_error),
            ),
            None => (None, None),
        };
        log::debug!(
            "h = {:.3e}: |f1-f0| = {:.3e}, |f1-f0-hJv| = {:.3e}",
            h,
            zeroth_error,
            first_error
        );
        steps.push(OrderStep {
            step: h,
            zeroth_error,
            first_error,
            zeroth_order,
            first_order,
        });
        h *= config.step_factor;
    }

    let in_band = |o: f64| (o - config.expected_order).abs() <= config.tolerance;

    let mut longest_run = 0;
    let mut run = 0;
    for s in &steps {
        match s.first_order {
            Some(o) if in_band(o) => {
                run += 1;
                longest_run = longest_run.max(run);
            }
            _ => run = 0,
        }
    }
    let measured: Vec<f64> = steps
        .windows(2)
        .filter(|w| w[0].first_error > floor && w[1].first_error > floor)
        .filter_map(|w| w[1].first_order)
        .collect();
    let trailing = config.trailing_steps.min(measured.len());
    let trailing_in_band = measured[measured.len() - trailing..]
        .iter()
        .all(|&o| in_band(o));
    let exact = steps.iter().all(|s| s.first_error <= floor);

    Ok(OrderTestResult {
        steps,
        expected_order: config.expected_order,
        longest_run,
        trailing_in_band,
        exact,
        passed: exact || (longest_run >= config.min_passing && trailing_in_band),
    })
}

/// Order test of `op.jvec` at `m` along `v`, or along a seeded random
/// direction when `v` is `None`.
pub fn check_jvec(
    op: &dyn ForwardOperator,
    m: &[f64],
    v: Option<&[f64]>,
    config: &OrderTestConfig,
) -> Result<OrderTestResult> {
    let drawn;
    let v = match v {
        Some(v) => v,
        None => {
            drawn = random_vector(op.n_model(), config.seed);
            &drawn
        }
    };
    let jv = op.jvec(m, v)?;
    check_derivative(|x| Ok(op.dpred(x)?), m, v, &jv, config)
}
