//! Simulation parameters.
//!
//! All tunable constants of the network live in [`SORNConfig`]. The defaults reproduce the reference
//! network: 200 excitatory neurons simulated for 100 steps, single-step STDP, soft-thresholding
//! normalization and the literal structural plasticity rule.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::SORNError;

/// Learning rate of the excitatory STDP rule.
pub const ETA_STDP: f64 = 0.004;
/// Learning rate of the intrinsic plasticity rule.
pub const ETA_IP: f64 = 0.01;
/// Average firing rate targeted by intrinsic plasticity.
pub const TARGET_FIRING_RATE: f64 = 0.1;
/// Radius of the L1 ball onto which the input weights are normalized.
pub const TARGET_L1_NORM: f64 = 0.1;
/// Probability constant of the structural plasticity rule.
pub const STRUCTURAL_CONNECTION_PROBABILITY: f64 = 0.1;
/// Weight given to a newly grown connection.
pub const NEW_STRUCTURAL_CONNECTION_WEIGHT: f64 = 0.001;
/// Upper bound of the initial input weights.
pub const MAX_INITIAL_WEIGHT: f64 = 1.0;
/// Upper bound of the initial firing thresholds.
pub const MAX_INITIAL_THRESHOLD: f64 = 1.0;
/// Range of the firing noise variance.
pub const SIGMA_SQ_RANGE: (f64, f64) = (0.01, 0.05);
/// Number of past steps considered by the windowed STDP rule.
pub const MEMORY: usize = 1;
/// Decay of the STDP step size per additional step of delay.
pub const DECAY_RATE: f64 = 0.5;

/// The window over which spike pairs are correlated by STDP.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum StdpWindow {
    /// Only the immediately preceding step is considered.
    Immediate,
    /// Steps `t - 1, ..., t - memory` are considered, the step size decaying geometrically with the delay.
    Windowed { memory: usize, decay_rate: f64 },
}

impl StdpWindow {
    /// Returns the number of past steps considered by the rule.
    pub fn memory(&self) -> usize {
        match self {
            StdpWindow::Immediate => 1,
            StdpWindow::Windowed { memory, .. } => *memory,
        }
    }

    /// Returns the multiplicative factor applied to the step size for a delay `d >= 1`.
    pub fn scale(&self, d: usize) -> f64 {
        match self {
            StdpWindow::Immediate => 1.0,
            StdpWindow::Windowed { decay_rate, .. } => decay_rate.powi(d as i32 - 1),
        }
    }
}

/// The method used to keep the input weights on the L1 ball.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum NormalizationMethod {
    /// Euclidean projection onto the L1 ball (soft-thresholding).
    Projection,
    /// Linear rescaling of the weights to sum to the target norm.
    Linear,
}

impl NormalizationMethod {
    /// Returns the normalization method from a string.
    pub fn from_str(s: &str) -> Result<Self, SORNError> {
        match s {
            "projection" => Ok(NormalizationMethod::Projection),
            "linear" => Ok(NormalizationMethod::Linear),
            _ => Err(SORNError::NotImplemented(format!(
                "normalization method '{}'",
                s
            ))),
        }
    }
}

/// The condition under which a pruned connection grows back.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum StructuralRule {
    /// Grow when a uniform draw exceeds the connection probability, i.e., with probability `1 - p`.
    /// This is the behavior of the reference simulations, kept for parity.
    Literal,
    /// Grow with probability `p`.
    Corrected,
}

/// Parameters of the random initialization of the neurons.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    pub max_initial_weight: f64,
    pub sigma_sq_range: (f64, f64),
    pub max_initial_threshold: f64,
}

impl Default for InitConfig {
    fn default() -> Self {
        InitConfig {
            max_initial_weight: MAX_INITIAL_WEIGHT,
            sigma_sq_range: SIGMA_SQ_RANGE,
            max_initial_threshold: MAX_INITIAL_THRESHOLD,
        }
    }
}

/// Parameters of the plasticity rules applied after each step.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PlasticityConfig {
    pub eta_stdp: f64,
    pub eta_ip: f64,
    pub target_firing_rate: f64,
    pub target_l1_norm: f64,
    pub structural_connection_probability: f64,
    pub new_structural_connection_weight: f64,
    pub stdp_window: StdpWindow,
    pub normalization: NormalizationMethod,
    pub structural_rule: StructuralRule,
}

impl Default for PlasticityConfig {
    fn default() -> Self {
        PlasticityConfig {
            eta_stdp: ETA_STDP,
            eta_ip: ETA_IP,
            target_firing_rate: TARGET_FIRING_RATE,
            target_l1_norm: TARGET_L1_NORM,
            structural_connection_probability: STRUCTURAL_CONNECTION_PROBABILITY,
            new_structural_connection_weight: NEW_STRUCTURAL_CONNECTION_WEIGHT,
            stdp_window: StdpWindow::Immediate,
            normalization: NormalizationMethod::Projection,
            structural_rule: StructuralRule::Literal,
        }
    }
}

/// The full configuration of a simulation run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SORNConfig {
    /// Number of neurons in the network.
    pub num_neurons: usize,
    /// Number of time steps, including the initial one.
    pub duration: usize,
    /// Root seed from which every random stream is derived.
    pub seed: u64,
    /// Whether to snapshot the weight matrix after each step.
    pub record_weights: bool,
    pub init: InitConfig,
    pub plasticity: PlasticityConfig,
}

impl Default for SORNConfig {
    fn default() -> Self {
        SORNConfig {
            num_neurons: 200,
            duration: 100,
            seed: 0,
            record_weights: false,
            init: InitConfig::default(),
            plasticity: PlasticityConfig::default(),
        }
    }
}

fn check_finite(name: &str, value: f64) -> Result<(), SORNError> {
    if !value.is_finite() {
        return Err(SORNError::InvalidParameter(format!(
            "{} must be finite (got {})",
            name, value
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> Result<(), SORNError> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(SORNError::InvalidParameter(format!(
            "{} must be non-negative (got {})",
            name, value
        )));
    }
    Ok(())
}

fn check_probability(name: &str, value: f64) -> Result<(), SORNError> {
    check_non_negative(name, value)?;
    if value > 1.0 {
        return Err(SORNError::InvalidParameter(format!(
            "{} must be in [0, 1] (got {})",
            name, value
        )));
    }
    Ok(())
}

impl InitConfig {
    /// Returns an error if the initialization parameters are invalid.
    pub fn validate(&self) -> Result<(), SORNError> {
        check_non_negative("max_initial_weight", self.max_initial_weight)?;
        check_finite("max_initial_threshold", self.max_initial_threshold)?;
        let (min_sq, max_sq) = self.sigma_sq_range;
        check_non_negative("minimum noise variance", min_sq)?;
        check_non_negative("maximum noise variance", max_sq)?;
        if min_sq > max_sq {
            return Err(SORNError::InvalidParameter(format!(
                "invalid noise variance range ({}, {})",
                min_sq, max_sq
            )));
        }
        Ok(())
    }
}

impl PlasticityConfig {
    /// Returns an error if the plasticity parameters are invalid.
    pub fn validate(&self) -> Result<(), SORNError> {
        check_non_negative("eta_stdp", self.eta_stdp)?;
        check_non_negative("eta_ip", self.eta_ip)?;
        check_probability("target_firing_rate", self.target_firing_rate)?;
        check_non_negative("target_l1_norm", self.target_l1_norm)?;
        check_probability(
            "structural_connection_probability",
            self.structural_connection_probability,
        )?;
        check_non_negative(
            "new_structural_connection_weight",
            self.new_structural_connection_weight,
        )?;
        if let StdpWindow::Windowed { memory, decay_rate } = self.stdp_window {
            if memory == 0 {
                return Err(SORNError::InvalidParameter(
                    "STDP memory must be at least one step".to_string(),
                ));
            }
            check_non_negative("decay_rate", decay_rate)?;
        }
        Ok(())
    }
}

impl SORNConfig {
    /// Returns an error if the configuration cannot describe a simulation run.
    pub fn validate(&self) -> Result<(), SORNError> {
        if self.num_neurons == 0 {
            return Err(SORNError::InvalidParameter(
                "the network must contain at least one neuron".to_string(),
            ));
        }
        if self.duration == 0 {
            return Err(SORNError::InvalidParameter(
                "the duration must be at least one step".to_string(),
            ));
        }
        self.init.validate()?;
        self.plasticity.validate()
    }

    /// Save the configuration to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SORNError> {
        let file = File::create(path).map_err(|e| SORNError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| SORNError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| SORNError::IOError(e.to_string()))
    }

    /// Load a configuration from a file. The loaded configuration is validated.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SORNError> {
        let file = File::open(path).map_err(|e| SORNError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        let config: SORNConfig =
            serde_json::from_reader(reader).map_err(|e| SORNError::IOError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
