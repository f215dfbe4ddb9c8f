//! Time-indexed records of a simulation run.
//!
//! - [`FiringHistory`]: the boolean table `fired[t][i]`, consulted by the update rules.
//! - [`WeightHistory`]: the tensor `weights[t][i][j]` (weight from neuron `j` into neuron `i`),
//!   recorded for export only.
//!
//! Both tables are append-only. When a flat layout is needed, they are flattened in column-major
//! order: time varies fastest, then the receiving neuron, then the sending neuron.
use serde::{Deserialize, Serialize};

use crate::error::SORNError;

/// The firing pattern of every neuron at every simulated step.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct FiringHistory {
    num_neurons: usize,
    fired: Vec<Vec<bool>>,
}

impl FiringHistory {
    /// Create an empty history for a network of the given size.
    pub fn new(num_neurons: usize) -> Self {
        FiringHistory {
            num_neurons,
            fired: vec![],
        }
    }

    /// Create an empty history with room for the given number of steps.
    pub fn with_capacity(num_neurons: usize, duration: usize) -> Self {
        FiringHistory {
            num_neurons,
            fired: Vec::with_capacity(duration),
        }
    }

    /// Append the firing pattern of the next step.
    /// The function returns an error if the row does not have one entry per neuron.
    pub fn push(&mut self, row: Vec<bool>) -> Result<(), SORNError> {
        if row.len() != self.num_neurons {
            return Err(SORNError::InvalidOperation(format!(
                "a firing row must have {} entries (got {})",
                self.num_neurons,
                row.len()
            )));
        }
        self.fired.push(row);
        Ok(())
    }

    /// Returns the number of neurons.
    pub fn num_neurons(&self) -> usize {
        self.num_neurons
    }

    /// Returns the number of recorded steps.
    pub fn len(&self) -> usize {
        self.fired.len()
    }

    /// Returns `true` if no step has been recorded.
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }

    /// Returns the firing pattern at step `t`, if recorded.
    pub fn row(&self, t: usize) -> Option<&[bool]> {
        self.fired.get(t).map(|row| &row[..])
    }

    /// Returns whether neuron `i` fired at step `t`. Unrecorded entries read as `false`.
    pub fn fired(&self, t: usize, i: usize) -> bool {
        self.fired
            .get(t)
            .and_then(|row| row.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// Returns the recorded rows.
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.fired
    }

    /// Returns the fraction of neurons firing at each recorded step.
    pub fn firing_rates(&self) -> Vec<f64> {
        self.fired
            .iter()
            .map(|row| match self.num_neurons {
                0 => 0.0,
                n => row.iter().filter(|&&f| f).count() as f64 / n as f64,
            })
            .collect()
    }

    /// Returns the number of spikes emitted by each neuron over the recorded steps.
    pub fn spike_counts(&self) -> Vec<usize> {
        (0..self.num_neurons)
            .map(|i| {
                self.fired
                    .iter()
                    .filter(|row| row.get(i).copied().unwrap_or(false))
                    .count()
            })
            .collect()
    }

    /// Returns the history as a 0/1 matrix of shape `[len, num_neurons]` in column-major order,
    /// i.e., the entry for step `t` and neuron `i` is at index `i * len + t`.
    pub fn to_column_major(&self) -> Vec<f64> {
        let fired = &self.fired;
        (0..self.num_neurons)
            .flat_map(move |i| {
                fired.iter().map(move |row| match row.get(i) {
                    Some(true) => 1.0,
                    _ => 0.0,
                })
            })
            .collect()
    }
}

/// Snapshots of the weight matrix, one per recorded step.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct WeightHistory {
    num_neurons: usize,
    weights: Vec<Vec<Vec<f64>>>,
}

impl WeightHistory {
    /// Create an empty weight history for a network of the given size.
    pub fn new(num_neurons: usize) -> Self {
        WeightHistory {
            num_neurons,
            weights: vec![],
        }
    }

    /// Append a snapshot of the weight matrix (one row of input weights per neuron).
    /// The function returns an error if the snapshot is not a square matrix of the network size.
    pub fn push(&mut self, snapshot: Vec<Vec<f64>>) -> Result<(), SORNError> {
        if snapshot.len() != self.num_neurons
            || snapshot.iter().any(|row| row.len() != self.num_neurons)
        {
            return Err(SORNError::InvalidOperation(format!(
                "a weight snapshot must be a {}x{} matrix",
                self.num_neurons, self.num_neurons
            )));
        }
        self.weights.push(snapshot);
        Ok(())
    }

    /// Returns the number of recorded snapshots.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns `true` if no snapshot has been recorded.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Returns the snapshot of step `t`, if recorded.
    pub fn snapshot(&self, t: usize) -> Option<&Vec<Vec<f64>>> {
        self.weights.get(t)
    }

    /// Returns the weight from neuron `j` into neuron `i` at step `t`, if recorded.
    pub fn weight(&self, t: usize, i: usize, j: usize) -> Option<f64> {
        self.weights
            .get(t)
            .and_then(|snapshot| snapshot.get(i))
            .and_then(|row| row.get(j))
            .copied()
    }

    /// Returns the shape `[len, num_neurons, num_neurons]` of the tensor.
    pub fn dims(&self) -> [usize; 3] {
        [self.weights.len(), self.num_neurons, self.num_neurons]
    }

    /// Returns the tensor in column-major order, i.e., the entry `weights[t][i][j]` is at index
    /// `(j * num_neurons + i) * len + t`.
    pub fn to_column_major(&self) -> Vec<f64> {
        let n = self.num_neurons;
        let weights = &self.weights;
        (0..n)
            .flat_map(move |j| (0..n).map(move |i| (i, j)))
            .flat_map(move |(i, j)| weights.iter().map(move |snapshot| snapshot[i][j]))
            .collect()
    }
}
