use clap::Parser;
use log;
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;

use rusty_sorn::config::{NormalizationMethod, SORNConfig, StdpWindow, StructuralRule};
use rusty_sorn::error::SORNError;
use rusty_sorn::export::SimulationRecord;
use rusty_sorn::trial::{average_firing_rates, run_trials};

#[derive(Parser, Debug)]
struct Args {
    /// The root seed, trial k uses seed + k
    #[arg(long, default_value = "0")]
    seed: u64,
    /// The number of neurons
    #[arg(short = 'N', long)]
    num_neurons: Option<usize>,
    /// The number of time steps, including the initial one
    #[arg(short = 'T', long)]
    duration: Option<usize>,
    /// The L1 norm of the input weights of every neuron
    #[arg(long)]
    target_l1_norm: Option<f64>,
    /// The number of independent trials
    #[arg(long, default_value = "1")]
    num_trials: usize,
    /// Record the weight matrix at every step
    #[arg(long)]
    record_weights: bool,
    /// The normalization method, must be one of: projection, linear
    #[arg(long)]
    normalization: Option<String>,
    /// Grow pruned connections with probability p instead of 1 - p
    #[arg(long)]
    corrected_structural: bool,
    /// The number of past steps considered by STDP
    #[arg(long)]
    memory: Option<usize>,
    /// The decay of the STDP step size per step of delay
    #[arg(long, default_value = "0.5")]
    decay_rate: f64,
    /// A JSON configuration file, overridden by the other arguments
    #[arg(long)]
    config: Option<PathBuf>,
    /// The directory of the exported results
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> Result<SORNConfig, SORNError> {
        let mut config = match &self.config {
            Some(path) => SORNConfig::load_from(path)?,
            None => SORNConfig::default(),
        };
        config.seed = self.seed;
        config.record_weights |= self.record_weights;
        if let Some(num_neurons) = self.num_neurons {
            config.num_neurons = num_neurons;
        }
        if let Some(duration) = self.duration {
            config.duration = duration;
        }
        if let Some(target_l1_norm) = self.target_l1_norm {
            config.plasticity.target_l1_norm = target_l1_norm;
        }
        if let Some(normalization) = &self.normalization {
            config.plasticity.normalization = NormalizationMethod::from_str(normalization)?;
        }
        if self.corrected_structural {
            config.plasticity.structural_rule = StructuralRule::Corrected;
        }
        if let Some(memory) = self.memory {
            config.plasticity.stdp_window = StdpWindow::Windowed {
                memory,
                decay_rate: self.decay_rate,
            };
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(log_path: &str, verbose: bool) -> Result<(), SORNError> {
    let level = match verbose {
        true => LevelFilter::Debug,
        false => LevelFilter::Info,
    };

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build();
    let logfile = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{l} - {m}\n")))
        .build(log_path)
        .map_err(|e| SORNError::IOError(e.to_string()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("logfile", Box::new(logfile)))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("logfile")
                .build(level),
        )
        .map_err(|e| SORNError::IOError(e.to_string()))?;

    log4rs::init_config(config).map_err(|e| SORNError::IOError(e.to_string()))?;
    Ok(())
}

fn main() -> Result<(), SORNError> {
    let args = Args::parse();

    let mut hasher = Sha256::new();
    hasher.update(format!("{:?}", args));
    let hash = hasher.finalize();
    let log_path = format!("log/{:x}.log", hash);
    let record_path = args.output_dir.join(format!("{:x}.json", hash));
    let config_path = args.output_dir.join(format!("{:x}.config.json", hash));

    init_logging(&log_path, args.verbose)?;
    log::info!("{:?}", args);

    let config = args.to_config()?;

    let results = run_trials(&config, args.num_trials)?;
    log::info!("Simulation of {} trial(s): done!", results.len());

    let averaged = average_firing_rates(&results)?;
    for (t, (mean, (lower, upper))) in averaged
        .mean
        .iter()
        .zip(averaged.lower.iter().zip(averaged.upper.iter()))
        .enumerate()
    {
        log::info!(
            "Step {}: firing rate is {:.3} (95% band [{:.3}, {:.3}])",
            t,
            mean,
            lower,
            upper
        );
    }

    fs::create_dir_all(&args.output_dir).map_err(|e| SORNError::IOError(e.to_string()))?;
    config.save_to(&config_path)?;
    match results.first() {
        Some(first) => {
            SimulationRecord::from_trial(first)
                .with_averaged_firing_rates(averaged)
                .save_to(&record_path)?;
            log::info!("Export: done! Saved to {}", record_path.display());
        }
        None => log::warn!("No trial to export"),
    }

    Ok(())
}
