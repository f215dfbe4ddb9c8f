use rusty_sorn::config::{
    NormalizationMethod, PlasticityConfig, SORNConfig, StdpWindow, StructuralRule,
};
use rusty_sorn::error::SORNError;
use rusty_sorn::network::{Network, SimulationState};
use rusty_sorn::neuron::Neuron;

const SEED: u64 = 42;

fn pinned_config(structural_rule: StructuralRule) -> SORNConfig {
    SORNConfig {
        num_neurons: 4,
        duration: 5,
        seed: SEED,
        record_weights: true,
        plasticity: PlasticityConfig {
            eta_stdp: 0.125,
            eta_ip: 0.25,
            target_firing_rate: 0.25,
            target_l1_norm: 1.0,
            // With p = 1, the literal rule never grows a connection and the corrected rule always does
            structural_connection_probability: 1.0,
            new_structural_connection_weight: 0.001,
            stdp_window: StdpWindow::Immediate,
            normalization: NormalizationMethod::Projection,
            structural_rule,
        },
        ..SORNConfig::default()
    }
}

fn pinned_network(structural_rule: StructuralRule) -> Network {
    let weights = vec![
        vec![0.0, 0.5, 0.25, 0.75],
        vec![0.375, 0.0, 0.5, 0.125],
        vec![0.625, 0.25, 0.0, 0.5],
        vec![0.125, 0.75, 0.375, 0.0],
    ];
    let thresholds = vec![0.5, 0.4375, 0.625, 0.3125];
    let neurons = weights
        .into_iter()
        .zip(thresholds)
        .enumerate()
        .map(|(id, (weights_in, threshold))| {
            Neuron::new_from(id, weights_in, threshold, 0.0, SEED).unwrap()
        })
        .collect();
    let mut network = Network::new_from(pinned_config(structural_rule), neurons).unwrap();
    network.init_with(vec![true, false, true, false]).unwrap();
    network
}

const PINNED_FIRED: [[bool; 4]; 5] = [
    [true, false, true, false],
    [false, true, false, true],
    [true, false, false, true],
    [false, false, true, false],
    [false, true, false, false],
];

#[test]
fn test_pinned_trace_literal() {
    let network = pinned_network(StructuralRule::Literal);
    let result = network.run().unwrap();

    assert_eq!(result.fired.len(), 5);
    for (t, expected) in PINNED_FIRED.iter().enumerate() {
        assert_eq!(result.fired.row(t), Some(&expected[..]));
    }

    let weights = result.weights.unwrap();
    assert_eq!(weights.dims(), [5, 4, 4]);
    assert_eq!(
        weights.snapshot(0),
        Some(&vec![
            vec![0.0, 0.5, 0.25, 0.75],
            vec![0.375, 0.0, 0.5, 0.125],
            vec![0.625, 0.25, 0.0, 0.5],
            vec![0.125, 0.75, 0.375, 0.0],
        ])
    );
    assert_eq!(
        weights.snapshot(1),
        Some(&vec![
            vec![0.0, 0.2916666666666667, 0.16666666666666669, 0.5416666666666666],
            vec![0.4166666666666667, 0.0, 0.5416666666666666, 0.04166666666666667],
            vec![0.5833333333333334, 0.08333333333333334, 0.0, 0.3333333333333333],
            vec![0.08333333333333334, 0.5833333333333334, 0.33333333333333337, 0.0],
        ])
    );
    assert_eq!(
        weights.snapshot(4),
        Some(&vec![
            vec![0.0, 0.33333333333333337, 0.0, 0.5833333333333333],
            vec![0.2916666666666667, 0.0, 0.6666666666666666, 0.0],
            vec![0.625, 0.0, 0.0, 0.375],
            vec![0.0, 0.6875, 0.1875, 0.0],
        ])
    );
}

#[test]
fn test_pinned_trace_corrected() {
    let mut network = pinned_network(StructuralRule::Corrected);
    while network.state() != SimulationState::Completed {
        network.step().unwrap();
    }

    for (t, expected) in PINNED_FIRED.iter().enumerate() {
        assert_eq!(network.fired().row(t), Some(&expected[..]));
    }
    // Every pruned connection grows back at the end of each step
    assert_eq!(
        network.weight_matrix(),
        vec![
            vec![0.0, 0.33333333333333337, 0.001, 0.5833333333333333],
            vec![0.2916666666666667, 0.0, 0.6666666666666666, 0.001],
            vec![0.625, 0.001, 0.0, 0.375],
            vec![0.001, 0.6875, 0.1875, 0.0],
        ]
    );
    let thresholds = network
        .neurons()
        .iter()
        .map(|neuron| neuron.threshold())
        .collect::<Vec<f64>>();
    assert_eq!(thresholds, vec![0.5, 0.6875, 0.625, 0.5625]);
}

#[test]
fn test_single_neuron() {
    let config = SORNConfig {
        num_neurons: 1,
        duration: 7,
        plasticity: PlasticityConfig {
            eta_ip: 0.25,
            target_firing_rate: 0.25,
            ..PlasticityConfig::default()
        },
        ..SORNConfig::default()
    };
    let neuron = Neuron::new_from(0, vec![0.0], 0.0, 0.0, SEED).unwrap();
    let mut network = Network::new_from(config, vec![neuron]).unwrap();
    network.init_with(vec![true]).unwrap();
    let result = network.run().unwrap();

    // Without any input, the neuron fires as soon as its threshold becomes negative
    let fired = result
        .fired
        .rows()
        .iter()
        .map(|row| row[0])
        .collect::<Vec<bool>>();
    assert_eq!(fired, vec![true, false, true, false, false, false, true]);
}

#[test]
fn test_single_random_neuron() {
    let config = SORNConfig {
        num_neurons: 1,
        duration: 50,
        seed: SEED,
        record_weights: true,
        ..SORNConfig::default()
    };
    let result = Network::rand(config).unwrap().run().unwrap();
    let weights = result.weights.unwrap();
    assert_eq!(weights.dims(), [50, 1, 1]);
    assert!((0..50).all(|t| weights.weight(t, 0, 0) == Some(0.0)));
}

#[test]
fn test_single_step_duration() {
    let config = SORNConfig {
        num_neurons: 5,
        duration: 1,
        seed: SEED,
        record_weights: true,
        ..SORNConfig::default()
    };
    let network = Network::rand(config).unwrap();
    let initial_weights = network.weight_matrix();
    let result = network.run().unwrap();

    assert_eq!(result.fired.len(), 1);
    let weights = result.weights.unwrap();
    assert_eq!(weights.len(), 1);
    assert_eq!(weights.snapshot(0), Some(&initial_weights));
}

#[test]
fn test_invalid_config_fails_fast() {
    let mut config = SORNConfig::default();
    config.plasticity.target_l1_norm = -0.1;
    assert!(matches!(
        Network::rand(config),
        Err(SORNError::InvalidParameter(_))
    ));

    let config = SORNConfig {
        num_neurons: 0,
        ..SORNConfig::default()
    };
    assert!(matches!(
        Network::new_from(config, vec![]),
        Err(SORNError::InvalidParameter(_))
    ));
}
