//! Frequency-parallel execution using rayon.
//!
//! Each frequency's system is independent, so per-frequency work is mapped
//! over the rayon pool and collected in frequency order. Reductions across
//! frequencies are done afterwards by the caller, sequentially, so results
//! do not depend on scheduling.

use rayon::prelude::*;

use crate::config::SimulationConfig;
use crate::error::Result;

/// Whether `count` frequencies should be solved on the rayon pool.
pub fn use_parallel(config: &SimulationConfig, count: usize) -> bool {
    config.parallel
        && count >= config.min_frequencies_for_parallel
        && rayon::current_num_threads() > 1
}

/// Evaluate `f(0..count)`, in parallel when the config allows, returning
/// results in index order. The first error aborts the whole map.
pub fn map_frequencies<T, F>(config: &SimulationConfig, count: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    if use_parallel(config, count) {
        (0..count).into_par_iter().map(f).collect()
    } else {
        (0..count).map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_order_is_preserved() {
        let config = SimulationConfig {
            min_frequencies_for_parallel: 1,
            ..Default::default()
        };
        let out = map_frequencies(&config, 100, |i| Ok(i * 2)).unwrap();
        assert_eq!(out, (0..100).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_error_aborts() {
        let config = SimulationConfig::default().sequential();
        let out: Result<Vec<usize>> = map_frequencies(&config, 5, |i| {
            if i == 3 {
                Err(Error::SingularSystem { frequency: 3.0 })
            } else {
                Ok(i)
            }
        });
        assert!(matches!(out, Err(Error::SingularSystem { .. })));
    }

    #[test]
    fn test_threshold() {
        let config = SimulationConfig::default();
        assert!(!use_parallel(&config, config.min_frequencies_for_parallel - 1));
        assert!(!use_parallel(&config.clone().sequential(), 1000));
    }
}
