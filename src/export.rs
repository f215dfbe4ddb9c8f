//! Serialization of simulation results for external analysis tools.
//!
//! A [`SimulationRecord`] stores the firing history and the weight history as flat column-major
//! arrays along with their dimensions, the layout expected by matrix-oriented environments.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::SORNError;
use crate::network::TrialResult;
use crate::trial::AveragedSeries;

/// The flattened results of a single trial.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub num_neurons: usize,
    pub duration: usize,
    /// The 0/1 firing matrix of shape `fired_dims = [duration, num_neurons]`, column-major.
    pub fired: Vec<f64>,
    pub fired_dims: [usize; 2],
    /// The weight tensor of shape `weights_dims = [duration, num_neurons, num_neurons]`,
    /// column-major. Empty, with dimensions `[0, 0, 0]`, if the weights were not recorded.
    pub weights: Vec<f64>,
    pub weights_dims: [usize; 3],
    /// The firing rate series averaged over trials, if any.
    pub averaged_firing_rates: Option<AveragedSeries>,
}

impl SimulationRecord {
    /// Flatten the results of a trial.
    pub fn from_trial(result: &TrialResult) -> Self {
        let num_neurons = result.fired.num_neurons();
        let duration = result.fired.len();
        let (weights, weights_dims) = match &result.weights {
            Some(weights) => (weights.to_column_major(), weights.dims()),
            None => (vec![], [0, 0, 0]),
        };

        SimulationRecord {
            num_neurons,
            duration,
            fired: result.fired.to_column_major(),
            fired_dims: [duration, num_neurons],
            weights,
            weights_dims,
            averaged_firing_rates: None,
        }
    }

    /// Attach the firing rate series averaged over several trials.
    pub fn with_averaged_firing_rates(mut self, averaged: AveragedSeries) -> Self {
        self.averaged_firing_rates = Some(averaged);
        self
    }

    /// Returns whether neuron `i` fired at step `t`, if in range.
    pub fn fired_at(&self, t: usize, i: usize) -> Option<bool> {
        if t >= self.duration || i >= self.num_neurons {
            return None;
        }
        self.fired.get(i * self.duration + t).map(|&f| f > 0.5)
    }

    /// Returns the weight from neuron `j` into neuron `i` at step `t`, if recorded.
    pub fn weight_at(&self, t: usize, i: usize, j: usize) -> Option<f64> {
        let [len, n, _] = self.weights_dims;
        if t >= len || i >= n || j >= n {
            return None;
        }
        self.weights.get((j * n + i) * len + t).copied()
    }

    /// Save the record to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SORNError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| SORNError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|e| SORNError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| SORNError::IOError(e.to_string()))?;
        log::info!("Simulation record saved to {}", path.display());
        Ok(())
    }

    /// Load a record from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SORNError> {
        let file = File::open(path).map_err(|e| SORNError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SORNError::IOError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{FiringHistory, WeightHistory};

    fn sample_result(record_weights: bool) -> TrialResult {
        let mut fired = FiringHistory::new(2);
        fired.push(vec![true, false]).unwrap();
        fired.push(vec![false, true]).unwrap();
        fired.push(vec![true, true]).unwrap();

        let weights = match record_weights {
            true => {
                let mut weights = WeightHistory::new(2);
                weights.push(vec![vec![0.0, 0.5], vec![0.25, 0.0]]).unwrap();
                weights.push(vec![vec![0.0, 0.75], vec![0.125, 0.0]]).unwrap();
                weights.push(vec![vec![0.0, 1.0], vec![0.0625, 0.0]]).unwrap();
                Some(weights)
            }
            false => None,
        };
        TrialResult { fired, weights }
    }

    #[test]
    fn test_record_from_trial() {
        let record = SimulationRecord::from_trial(&sample_result(true));
        assert_eq!(record.fired_dims, [3, 2]);
        assert_eq!(record.fired, vec![1.0, 0.0, 1.0, 0.0, 1.0, 1.0]);
        assert_eq!(record.weights_dims, [3, 2, 2]);
        assert_eq!(
            record.weights,
            vec![0.0, 0.0, 0.0, 0.25, 0.125, 0.0625, 0.5, 0.75, 1.0, 0.0, 0.0, 0.0]
        );

        assert_eq!(record.fired_at(1, 1), Some(true));
        assert_eq!(record.fired_at(1, 0), Some(false));
        assert_eq!(record.fired_at(3, 0), None);
        assert_eq!(record.weight_at(1, 0, 1), Some(0.75));
        assert_eq!(record.weight_at(2, 1, 0), Some(0.0625));
        assert_eq!(record.weight_at(0, 2, 0), None);
    }

    #[test]
    fn test_record_without_weights() {
        let record = SimulationRecord::from_trial(&sample_result(false));
        assert!(record.weights.is_empty());
        assert_eq!(record.weights_dims, [0, 0, 0]);
        assert_eq!(record.weight_at(0, 0, 1), None);
    }

    #[test]
    fn test_save_load_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");

        let averaged = AveragedSeries {
            mean: vec![0.5, 0.5, 1.0],
            std: vec![0.0; 3],
            lower: vec![0.5, 0.5, 1.0],
            upper: vec![0.5, 0.5, 1.0],
        };
        let record =
            SimulationRecord::from_trial(&sample_result(true)).with_averaged_firing_rates(averaged);
        record.save_to(&path).unwrap();
        assert_eq!(SimulationRecord::load_from(&path), Ok(record));

        assert!(matches!(
            SimulationRecord::load_from(dir.path().join("missing.json")),
            Err(SORNError::IOError(_))
        ));
    }
}
