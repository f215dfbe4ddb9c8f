//! This module provides the `Neuron` structure which composes the `Network` structure.
//!
//! A neuron is a binary threshold unit: at each step it fires if the weighted count of the neurons
//! that fired at the previous step, perturbed by Gaussian noise, exceeds its firing threshold.
//! After every step, its input weights and threshold are adapted by four local rules, applied in
//! this order by [`Neuron::apply_plasticity`]:
//!
//! 1. excitatory spike-timing-dependent plasticity ([`Neuron::excitatory_stdp`]),
//! 2. synaptic normalization ([`Neuron::synaptic_normalization`]),
//! 3. intrinsic plasticity ([`Neuron::intrinsic_plasticity`]),
//! 4. structural plasticity ([`Neuron::structural_plasticity`]).
//!
//! The weight of a neuron onto itself is zero and is never modified.
use derivative::Derivative;
use serde::Serialize;

use crate::config::{
    InitConfig, NormalizationMethod, PlasticityConfig, StdpWindow, StructuralRule,
};
use crate::error::SORNError;
use crate::history::FiringHistory;
use crate::projection::{normalize_l1_linear, project_l1};
use crate::random::RandomSource;

/// Represents an excitatory binary neuron.
#[derive(Derivative, Clone, Serialize)]
#[derivative(Debug, PartialEq)]
pub struct Neuron {
    // The neuron ID, also its index in the network.
    id: usize,
    // The weights of the inputs from every neuron of the network.
    weights_in: Vec<f64>,
    // The firing threshold.
    threshold: f64,
    // The standard deviation of the firing noise.
    sigma: f64,
    /// The random number generator.
    #[serde(skip)]
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    rng: RandomSource,
}

impl Neuron {
    /// Create a neuron with random input weights, threshold and noise level, drawn from its own
    /// random stream in this order.
    /// The function returns an error if the id does not fit in the network.
    pub fn rand(
        id: usize,
        num_neurons: usize,
        init: &InitConfig,
        seed: u64,
    ) -> Result<Self, SORNError> {
        if id >= num_neurons {
            return Err(SORNError::InvalidParameter(format!(
                "neuron id {} out of bounds for a network of {} neurons",
                id, num_neurons
            )));
        }

        let mut rng = RandomSource::for_neuron(seed, id);
        let weights_in = (0..num_neurons)
            .map(|j| match j == id {
                true => 0.0,
                false => rng.uniform(0.0, init.max_initial_weight),
            })
            .collect();
        let threshold = rng.uniform(0.0, init.max_initial_threshold);
        let (min_sq, max_sq) = init.sigma_sq_range;
        let sigma = rng.uniform(min_sq, max_sq).sqrt();

        Ok(Neuron {
            id,
            weights_in,
            threshold,
            sigma,
            rng,
        })
    }

    /// Create a neuron with the provided input weights, threshold and noise level.
    /// The self weight is forced to zero.
    /// The function returns an error if the id does not index the weights, or if a weight or the
    /// noise level is negative or not finite.
    pub fn new_from(
        id: usize,
        mut weights_in: Vec<f64>,
        threshold: f64,
        sigma: f64,
        seed: u64,
    ) -> Result<Self, SORNError> {
        if id >= weights_in.len() {
            return Err(SORNError::InvalidParameter(format!(
                "neuron id {} out of bounds for {} input weights",
                id,
                weights_in.len()
            )));
        }
        if weights_in.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SORNError::InvalidParameter(
                "input weights must be non-negative and finite".to_string(),
            ));
        }
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(SORNError::InvalidParameter(format!(
                "noise level must be non-negative and finite (got {})",
                sigma
            )));
        }
        if !threshold.is_finite() {
            return Err(SORNError::InvalidParameter(format!(
                "threshold must be finite (got {})",
                threshold
            )));
        }
        weights_in[id] = 0.0;

        Ok(Neuron {
            id,
            weights_in,
            threshold,
            sigma,
            rng: RandomSource::for_neuron(seed, id),
        })
    }

    /// Returns the neuron ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the input weights of the neuron.
    pub fn weights_in(&self) -> &[f64] {
        &self.weights_in
    }

    /// Returns the weight of the input from the given neuron.
    pub fn weight_in(&self, source_id: usize) -> Option<f64> {
        self.weights_in.get(source_id).copied()
    }

    /// Returns the firing threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the standard deviation of the firing noise.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Decide whether the neuron fires, given the firing pattern of the whole network at the
    /// previous step. Consumes exactly one Gaussian draw and leaves the weights and threshold as is.
    pub fn should_fire(&mut self, fired_prev: &[bool]) -> bool {
        debug_assert_eq!(fired_prev.len(), self.weights_in.len());
        let weighted_sum: f64 = fired_prev
            .iter()
            .zip(self.weights_in.iter())
            .filter(|(fired, _)| **fired)
            .map(|(_, &w)| w)
            .sum();
        let noise = self.sigma * self.rng.gaussian();
        weighted_sum + noise > self.threshold
    }

    /// Single-step STDP between two consecutive firing patterns, with step size `eta`.
    ///
    /// For every other neuron `j`, the input from `j` is potentiated if `j` fired before this
    /// neuron, and depressed (down to zero) if this neuron fired before `j`.
    pub fn stdp_pair(&mut self, fired_prev: &[bool], fired_now: &[bool], eta: f64) {
        let id = self.id;
        for (j, w) in self.weights_in.iter_mut().enumerate() {
            if j == id {
                continue;
            }
            if fired_prev[j] && fired_now[id] {
                *w += eta;
            }
            if fired_prev[id] && fired_now[j] {
                *w = (*w - eta).max(0.0);
            }
        }
    }

    /// Excitatory STDP at step `now` over the provided window.
    ///
    /// For each delay `d` in `1..=memory` such that step `now - d` exists, the single-step rule is
    /// applied between steps `now - d` and `now` with step size `eta * decay_rate^(d - 1)`.
    pub fn excitatory_stdp(
        &mut self,
        history: &FiringHistory,
        now: usize,
        eta: f64,
        window: &StdpWindow,
    ) {
        let fired_now = match history.row(now) {
            Some(row) => row,
            None => return,
        };
        for d in 1..=window.memory().min(now) {
            if let Some(fired_prev) = history.row(now - d) {
                self.stdp_pair(fired_prev, fired_now, eta * window.scale(d));
            }
        }
    }

    /// Bring the input weights back onto the L1 ball of radius `target_l1_norm`.
    /// The function returns an error if the target norm is negative.
    pub fn synaptic_normalization(
        &mut self,
        target_l1_norm: f64,
        method: NormalizationMethod,
    ) -> Result<(), SORNError> {
        match method {
            NormalizationMethod::Projection => project_l1(&mut self.weights_in, target_l1_norm),
            NormalizationMethod::Linear => {
                normalize_l1_linear(&mut self.weights_in, target_l1_norm)
            }
        }
    }

    /// Homeostatic adaptation of the threshold: raised by `eta_ip * (1 - target_firing_rate)` after
    /// firing, lowered by `eta_ip * target_firing_rate` otherwise.
    pub fn intrinsic_plasticity(&mut self, fired: bool, eta_ip: f64, target_firing_rate: f64) {
        if fired {
            self.threshold += eta_ip * (1.0 - target_firing_rate);
        } else {
            self.threshold -= eta_ip * target_firing_rate;
        }
    }

    /// Regrow pruned connections: every zero input weight (other than the self weight) draws a
    /// uniform sample and, depending on the rule, is set to `new_weight`.
    pub fn structural_plasticity(&mut self, probability: f64, new_weight: f64, rule: StructuralRule) {
        let id = self.id;
        for (j, w) in self.weights_in.iter_mut().enumerate() {
            if j == id || w.abs() >= f64::EPSILON {
                continue;
            }
            let u = self.rng.uniform(0.0, 1.0);
            let grow = match rule {
                StructuralRule::Literal => u > probability,
                StructuralRule::Corrected => u < probability,
            };
            if grow {
                *w = new_weight;
            }
        }
    }

    /// Apply the four plasticity rules at step `now`, in order.
    /// The function returns an error if the normalization fails.
    pub fn apply_plasticity(
        &mut self,
        history: &FiringHistory,
        now: usize,
        params: &PlasticityConfig,
    ) -> Result<(), SORNError> {
        self.excitatory_stdp(history, now, params.eta_stdp, &params.stdp_window);
        self.synaptic_normalization(params.target_l1_norm, params.normalization)?;
        self.intrinsic_plasticity(
            history.fired(now, self.id),
            params.eta_ip,
            params.target_firing_rate,
        );
        self.structural_plasticity(
            params.structural_connection_probability,
            params.new_structural_connection_weight,
            params.structural_rule,
        );
        Ok(())
    }
}
