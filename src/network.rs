//! Network of neurons and the synchronized time-step loop.
//!
//! A simulation goes through the states `Uninitialized -> Running { t } -> Completed`. At each
//! transition `t -> t + 1`, the network
//!
//! 1. lets every neuron decide, in index order, whether it fires given the firing pattern at step `t`,
//! 2. records the complete firing pattern of step `t + 1`,
//! 3. applies the plasticity rules to every neuron, in index order,
//! 4. optionally records a snapshot of the weights.
//!
//! No weight or threshold is mutated before all the firing decisions of the step are known.
//!
//! # Example
//!
//! ```rust
//! use rusty_sorn::config::SORNConfig;
//! use rusty_sorn::network::run_trial;
//!
//! let config = SORNConfig {
//!     num_neurons: 20,
//!     duration: 50,
//!     seed: 42,
//!     ..SORNConfig::default()
//! };
//! let result = run_trial(&config).unwrap();
//! assert_eq!(result.fired.len(), 50);
//! assert!(result.weights.is_none());
//! ```
use log;
use serde::{Deserialize, Serialize};

use crate::config::SORNConfig;
use crate::error::SORNError;
use crate::history::{FiringHistory, WeightHistory};
use crate::neuron::Neuron;
use crate::random::RandomSource;

/// Probability for a neuron to fire at the initial step.
pub const INITIAL_FIRING_PROBABILITY: f64 = 0.5;

/// The state of a simulation.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum SimulationState {
    /// The neurons are built but the initial firing pattern is not set.
    Uninitialized,
    /// Steps `0..=t` are recorded.
    Running { t: usize },
    /// All the steps are recorded.
    Completed,
}

/// The outcome of a simulation run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TrialResult {
    /// The firing pattern at every step.
    pub fired: FiringHistory,
    /// The weight matrix at every step, if recorded.
    pub weights: Option<WeightHistory>,
}

/// A self-organizing recurrent network of excitatory neurons.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Network {
    config: SORNConfig,
    neurons: Vec<Neuron>,
    fired: FiringHistory,
    weights: Option<WeightHistory>,
    state: SimulationState,
}

impl Network {
    /// Create a network of randomly initialized neurons, each drawing from its own stream of the
    /// configured seed. The function returns an error if the configuration is invalid.
    pub fn rand(config: SORNConfig) -> Result<Self, SORNError> {
        config.validate()?;
        let neurons = (0..config.num_neurons)
            .map(|id| Neuron::rand(id, config.num_neurons, &config.init, config.seed))
            .collect::<Result<Vec<Neuron>, SORNError>>()?;
        log::info!(
            "Network with {} neurons built (duration: {}, seed: {})",
            config.num_neurons,
            config.duration,
            config.seed
        );
        Self::new_from(config, neurons)
    }

    /// Create a network from the provided neurons.
    /// The function returns an error if the configuration is invalid, or if the neurons are not
    /// indexed by their id or do not have one input weight per neuron of the network.
    pub fn new_from(config: SORNConfig, neurons: Vec<Neuron>) -> Result<Self, SORNError> {
        config.validate()?;
        if neurons.len() != config.num_neurons {
            return Err(SORNError::InvalidParameter(format!(
                "expected {} neurons (got {})",
                config.num_neurons,
                neurons.len()
            )));
        }
        for (id, neuron) in neurons.iter().enumerate() {
            if neuron.id() != id {
                return Err(SORNError::InvalidParameter(format!(
                    "neuron {} is at position {}",
                    neuron.id(),
                    id
                )));
            }
            if neuron.weights_in().len() != config.num_neurons {
                return Err(SORNError::InvalidParameter(format!(
                    "neuron {} has {} input weights instead of {}",
                    id,
                    neuron.weights_in().len(),
                    config.num_neurons
                )));
            }
        }

        let fired = FiringHistory::with_capacity(config.num_neurons, config.duration);
        let weights = match config.record_weights {
            true => Some(WeightHistory::new(config.num_neurons)),
            false => None,
        };

        Ok(Network {
            config,
            neurons,
            fired,
            weights,
            state: SimulationState::Uninitialized,
        })
    }

    /// Returns the configuration of the network.
    pub fn config(&self) -> &SORNConfig {
        &self.config
    }

    /// Returns the state of the simulation.
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Returns the number of neurons in the network.
    pub fn num_neurons(&self) -> usize {
        self.neurons.len()
    }

    /// Returns the neurons of the network.
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Returns a specific neuron of the network, if any.
    pub fn neuron(&self, id: usize) -> Option<&Neuron> {
        self.neurons.get(id)
    }

    /// Returns the firing history recorded so far.
    pub fn fired(&self) -> &FiringHistory {
        &self.fired
    }

    /// Returns the weight history recorded so far, if enabled.
    pub fn weights(&self) -> Option<&WeightHistory> {
        self.weights.as_ref()
    }

    /// Returns the current weight matrix, one row of input weights per neuron.
    pub fn weight_matrix(&self) -> Vec<Vec<f64>> {
        self.neurons
            .iter()
            .map(|neuron| neuron.weights_in().to_vec())
            .collect()
    }

    /// Initialize the simulation: every neuron fires at the initial step independently with
    /// probability 1/2, drawn from the network stream of the configured seed.
    pub fn init(&mut self) -> Result<(), SORNError> {
        let mut rng = RandomSource::for_network(self.config.seed);
        let initial_firing = (0..self.num_neurons())
            .map(|_| rng.bernoulli(INITIAL_FIRING_PROBABILITY))
            .collect();
        self.init_with(initial_firing)
    }

    /// Initialize the simulation with the provided firing pattern at the initial step.
    /// The function returns an error if the simulation is already initialized or if the pattern
    /// does not have one entry per neuron.
    pub fn init_with(&mut self, initial_firing: Vec<bool>) -> Result<(), SORNError> {
        if self.state != SimulationState::Uninitialized {
            return Err(SORNError::InvalidOperation(
                "the simulation is already initialized".to_string(),
            ));
        }
        self.fired.push(initial_firing)?;
        self.record_weights()?;

        self.state = match self.config.duration {
            1 => SimulationState::Completed,
            _ => SimulationState::Running { t: 0 },
        };
        Ok(())
    }

    fn record_weights(&mut self) -> Result<(), SORNError> {
        if self.weights.is_some() {
            let snapshot = self.weight_matrix();
            if let Some(weights) = self.weights.as_mut() {
                weights.push(snapshot)?;
            }
        }
        Ok(())
    }

    /// Advance the simulation by one step.
    /// The function returns an error if the simulation is not running, or if a plasticity rule fails.
    pub fn step(&mut self) -> Result<(), SORNError> {
        let t = match self.state {
            SimulationState::Running { t } => t,
            SimulationState::Uninitialized => {
                return Err(SORNError::InvalidOperation(
                    "the simulation is not initialized".to_string(),
                ))
            }
            SimulationState::Completed => {
                return Err(SORNError::InvalidOperation(
                    "the simulation is already completed".to_string(),
                ))
            }
        };

        // 1. All the firing decisions, based on the previous step only
        let fired_prev = self.fired.row(t).ok_or_else(|| {
            SORNError::InvalidOperation(format!("no firing pattern recorded at step {}", t))
        })?;
        let fired_next = self
            .neurons
            .iter_mut()
            .map(|neuron| neuron.should_fire(fired_prev))
            .collect::<Vec<bool>>();
        log::trace!(
            "Step {}: {} neurons fired",
            t + 1,
            fired_next.iter().filter(|&&f| f).count()
        );
        self.fired.push(fired_next)?;

        // 2. The plasticity rules, once the new firing pattern is complete
        for neuron in self.neurons.iter_mut() {
            neuron.apply_plasticity(&self.fired, t + 1, &self.config.plasticity)?;
        }
        self.record_weights()?;

        self.state = match t + 2 < self.config.duration {
            true => SimulationState::Running { t: t + 1 },
            false => SimulationState::Completed,
        };
        Ok(())
    }

    /// Run the simulation to completion, initializing it first if necessary, and return the
    /// recorded histories.
    pub fn run(mut self) -> Result<TrialResult, SORNError> {
        if self.state == SimulationState::Uninitialized {
            self.init()?;
        }
        log::info!("Starting simulation...");

        let log_interval = (self.config.duration / 10).max(1);
        while let SimulationState::Running { t } = self.state {
            self.step()?;
            if (t + 1) % log_interval == 0 {
                let rate = self.fired.firing_rates().last().copied().unwrap_or(0.0);
                log::debug!(
                    "Simulation progress: step {}/{} (firing fraction: {:.3})",
                    t + 1,
                    self.config.duration - 1,
                    rate
                );
            }
        }

        log::info!("Simulation completed successfully!");
        Ok(TrialResult {
            fired: self.fired,
            weights: self.weights,
        })
    }
}

/// Build a random network from the configuration and run it to completion.
pub fn run_trial(config: &SORNConfig) -> Result<TrialResult, SORNError> {
    Network::rand(config.clone())?.run()
}
