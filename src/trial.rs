//! Repeated independent trials and their point-wise statistics.
use serde::{Deserialize, Serialize};

use crate::config::SORNConfig;
use crate::error::SORNError;
use crate::network::{run_trial, TrialResult};

/// Number of standard deviations from the mean of a two-sided 95% normal confidence interval.
pub const Z_SCORE_95: f64 = 1.96;

/// Point-wise statistics of several time series of the same length.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AveragedSeries {
    pub mean: Vec<f64>,
    /// Population standard deviation.
    pub std: Vec<f64>,
    /// Lower bound of the 95% confidence band.
    pub lower: Vec<f64>,
    /// Upper bound of the 95% confidence band.
    pub upper: Vec<f64>,
}

impl AveragedSeries {
    /// Returns the number of points of the series.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Returns `true` if the series has no point.
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// Run `num_trials` independent trials of the configured network. Trial `k` uses the seed
/// `config.seed + k`, so that every trial is reproducible on its own.
/// The function returns an error if no trial is requested or if a trial fails.
pub fn run_trials(config: &SORNConfig, num_trials: usize) -> Result<Vec<TrialResult>, SORNError> {
    if num_trials == 0 {
        return Err(SORNError::InvalidParameter(
            "the number of trials must be positive".to_string(),
        ));
    }

    (0..num_trials)
        .map(|k| {
            let trial_config = SORNConfig {
                seed: config.seed.wrapping_add(k as u64),
                ..config.clone()
            };
            log::info!(
                "Trial {}/{} (seed: {})",
                k + 1,
                num_trials,
                trial_config.seed
            );
            run_trial(&trial_config)
        })
        .collect()
}

/// Compute the point-wise mean, standard deviation and 95% confidence band of several series.
/// The function returns an error if there is no series or if the series have different lengths.
pub fn average_trials(series: &[Vec<f64>]) -> Result<AveragedSeries, SORNError> {
    let first = series.first().ok_or_else(|| {
        SORNError::InvalidParameter("No trials to average".to_string())
    })?;
    let len = first.len();
    if let Some(other) = series.iter().find(|s| s.len() != len) {
        return Err(SORNError::IncompatibleTrials(format!(
            "cannot average series of lengths {} and {}",
            len,
            other.len()
        )));
    }

    let num_series = series.len() as f64;
    let mut averaged = AveragedSeries {
        mean: Vec::with_capacity(len),
        std: Vec::with_capacity(len),
        lower: Vec::with_capacity(len),
        upper: Vec::with_capacity(len),
    };
    for t in 0..len {
        let mean = series.iter().map(|s| s[t]).sum::<f64>() / num_series;
        let variance = series.iter().map(|s| (s[t] - mean).powi(2)).sum::<f64>() / num_series;
        let std = variance.sqrt();
        averaged.mean.push(mean);
        averaged.std.push(std);
        averaged.lower.push(mean - Z_SCORE_95 * std);
        averaged.upper.push(mean + Z_SCORE_95 * std);
    }
    Ok(averaged)
}

/// Average the firing rate series of several trials.
pub fn average_firing_rates(results: &[TrialResult]) -> Result<AveragedSeries, SORNError> {
    let series = results
        .iter()
        .map(|result| result.fired.firing_rates())
        .collect::<Vec<Vec<f64>>>();
    average_trials(&series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_trials() {
        let series = vec![vec![0.0, 1.0, 0.5], vec![1.0, 1.0, 0.25]];
        let averaged = average_trials(&series).unwrap();
        assert_eq!(averaged.len(), 3);
        assert_eq!(averaged.mean, vec![0.5, 1.0, 0.375]);
        assert_eq!(averaged.std, vec![0.5, 0.0, 0.125]);
        assert!((averaged.lower[0] - (0.5 - 0.98)).abs() < 1e-12);
        assert!((averaged.upper[0] - (0.5 + 0.98)).abs() < 1e-12);
        assert_eq!(averaged.lower[1], 1.0);
        assert_eq!(averaged.upper[1], 1.0);
    }

    #[test]
    fn test_average_single_trial() {
        let averaged = average_trials(&[vec![0.25, 0.75]]).unwrap();
        assert_eq!(averaged.mean, vec![0.25, 0.75]);
        assert_eq!(averaged.std, vec![0.0, 0.0]);
        assert_eq!(averaged.lower, averaged.mean);
        assert_eq!(averaged.upper, averaged.mean);
    }

    #[test]
    fn test_average_trials_errors() {
        assert_eq!(
            average_trials(&[]),
            Err(SORNError::InvalidParameter(
                "No trials to average".to_string()
            ))
        );
        assert!(matches!(
            average_trials(&[vec![0.0, 1.0], vec![0.0]]),
            Err(SORNError::IncompatibleTrials(_))
        ));
    }

    #[test]
    fn test_run_trials() {
        let config = SORNConfig {
            num_neurons: 6,
            duration: 15,
            seed: 10,
            ..SORNConfig::default()
        };
        let results = run_trials(&config, 3).unwrap();
        assert_eq!(results.len(), 3);

        // Trial k is the single trial of seed + k
        for (k, result) in results.iter().enumerate() {
            let single = run_trial(&SORNConfig {
                seed: 10 + k as u64,
                ..config.clone()
            })
            .unwrap();
            assert_eq!(result, &single);
        }

        let averaged = average_firing_rates(&results).unwrap();
        assert_eq!(averaged.len(), 15);
        assert!(averaged.mean.iter().all(|&m| (0.0..=1.0).contains(&m)));
        assert!(averaged
            .lower
            .iter()
            .zip(&averaged.upper)
            .all(|(l, u)| l <= u));

        assert!(matches!(
            run_trials(&config, 0),
            Err(SORNError::InvalidParameter(_))
        ));
    }
}
