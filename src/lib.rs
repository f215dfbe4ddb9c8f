//! This crate provides tools for simulating self-organizing recurrent networks (SORNs) in Rust.
//!
//! A SORN is a recurrent network of binary excitatory neurons evolving in discrete time. At each
//! step, every neuron fires if the weighted count of its inputs that fired at the previous step,
//! perturbed by Gaussian noise, exceeds its threshold. The network then adapts its own weights and
//! thresholds through four local plasticity rules: spike-timing-dependent plasticity, synaptic
//! normalization onto an L1 ball, intrinsic plasticity and structural plasticity.
//!
//! # Running a Trial
//!
//! ```rust
//! use rusty_sorn::config::SORNConfig;
//! use rusty_sorn::network::run_trial;
//!
//! let config = SORNConfig {
//!     num_neurons: 50,
//!     duration: 40,
//!     seed: 7,
//!     record_weights: true,
//!     ..SORNConfig::default()
//! };
//! let result = run_trial(&config).unwrap();
//!
//! assert_eq!(result.fired.len(), 40);
//! assert_eq!(result.weights.unwrap().dims(), [40, 50, 50]);
//! ```
//!
//! # Averaging Trials
//!
//! ```rust
//! use rusty_sorn::config::SORNConfig;
//! use rusty_sorn::trial::{average_firing_rates, run_trials};
//!
//! let config = SORNConfig {
//!     num_neurons: 20,
//!     duration: 30,
//!     ..SORNConfig::default()
//! };
//! let results = run_trials(&config, 4).unwrap();
//! let averaged = average_firing_rates(&results).unwrap();
//!
//! assert_eq!(averaged.len(), 30);
//! ```
//!
//! # Stepping a Network by Hand
//!
//! ```rust
//! use rusty_sorn::config::SORNConfig;
//! use rusty_sorn::network::{Network, SimulationState};
//!
//! let mut network = Network::rand(SORNConfig { num_neurons: 10, duration: 3, ..SORNConfig::default() }).unwrap();
//! network.init_with(vec![true; 10]).unwrap();
//! network.step().unwrap();
//! network.step().unwrap();
//!
//! assert_eq!(network.state(), SimulationState::Completed);
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod network;
pub mod neuron;
pub mod projection;
pub mod random;
pub mod trial;
