//! Analysis of the timescales of single cells: are slow timescales present in the spike probabilities?
//!
//! The spike probabilities are down-sampled to a coarser time step, both resolutions are turned into spike trains,
//! and the irregularity of the down-sampled spike trains is measured with the coefficient of variation of their
//! inter-spike intervals, to be compared with the chance level (a coefficient of 1).
//!
//! # Examples
//!
//! ```rust
//! use nalgebra::DMatrix;
//! use spike_timescales::analysis::{run, AnalysisConfig};
//! use spike_timescales::spike_train::SpikeThreshold;
//!
//! let spike_probs = DMatrix::from_fn(10, 1000, |cell, t| if (t + cell) % 7 == 0 { 0.8 } else { 0.01 });
//! let config = AnalysisConfig {
//!     seed: 42,
//!     dt: 0.1,
//!     down_sample_timescale: 0.5,
//!     spike_threshold: SpikeThreshold::Random,
//! };
//!
//! let analysis = run(&spike_probs, &config).unwrap();
//! assert_eq!(analysis.down_sample_factor, 5);
//! assert_eq!(analysis.spike_train_down_sampled.num_time_points(), 200);
//! assert_eq!(analysis.report().cvs.len(), 10);
//! ```
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::DMatrix;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::TimescaleError;
use crate::metrics::{cell_inter_spike_intervals, coefficient_of_variation, PopulationSummary};
use crate::munging::{down_sample_factor, down_sample_spike_probs, down_sampled_times, time_vector};
use crate::spike_train::{SpikeThreshold, SpikeTrain};

/// The parameters of the analysis.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// The seed of the random number generator (only used with a random spike threshold).
    pub seed: u64,
    /// The time step of the spike probabilities, in seconds.
    pub dt: f64,
    /// The time step after down-sampling, in seconds.
    pub down_sample_timescale: f64,
    /// The rule turning spike probabilities into spikes.
    pub spike_threshold: SpikeThreshold,
}

impl AnalysisConfig {
    /// Save the configuration to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), TimescaleError> {
        let file = File::create(path).map_err(|e| TimescaleError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| TimescaleError::IOError(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| TimescaleError::IOError(e.to_string()))
    }

    /// Load a configuration from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, TimescaleError> {
        let file = File::open(path).map_err(|e| TimescaleError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| TimescaleError::IOError(e.to_string()))
    }
}

/// All the intermediate results of the analysis, e.g., for plotting.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The number of original time points merged into one.
    pub down_sample_factor: usize,
    /// The time of every original time point.
    pub times: Vec<f64>,
    /// The time of every down-sampled time point.
    pub times_down_sampled: Vec<f64>,
    pub spike_probs_down_sampled: DMatrix<f64>,
    /// The first original time point of every down-sampled time point.
    pub t_starts: Vec<usize>,
    /// The (excluded) last original time point of every down-sampled time point.
    pub t_ends: Vec<usize>,
    pub spike_train: SpikeTrain,
    pub spike_train_down_sampled: SpikeTrain,
    /// The inter-spike intervals of every cell, in the down-sampled spike trains.
    pub intervals: Vec<Vec<f64>>,
    /// The coefficient of variation of the inter-spike intervals of every cell.
    pub cvs: Vec<Option<f64>>,
    pub summary: PopulationSummary,
}

/// The outcome of the analysis, without the (large) intermediate results.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub down_sample_factor: usize,
    pub num_cells: usize,
    pub num_time_points: usize,
    pub num_time_points_down_sampled: usize,
    pub num_spikes: usize,
    pub num_spikes_down_sampled: usize,
    /// The coefficient of variation of every cell, `None` if undefined.
    pub cvs: Vec<Option<f64>>,
    pub summary: PopulationSummary,
}

impl Analysis {
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            down_sample_factor: self.down_sample_factor,
            num_cells: self.spike_train.num_cells(),
            num_time_points: self.spike_train.num_time_points(),
            num_time_points_down_sampled: self.spike_train_down_sampled.num_time_points(),
            num_spikes: self.spike_train.num_spikes(),
            num_spikes_down_sampled: self.spike_train_down_sampled.num_spikes(),
            cvs: self.cvs.clone(),
            summary: self.summary.clone(),
        }
    }
}

/// Run the analysis on the spike probabilities (rows are cells, columns are time points).
///
/// The random number generator is seeded once, before the spike trains are derived. With a random threshold,
/// the original and down-sampled spike trains therefore use independent random numbers.
pub fn run(spike_probs: &DMatrix<f64>, config: &AnalysisConfig) -> Result<Analysis, TimescaleError> {
    let rng = ChaCha8Rng::seed_from_u64(config.seed);

    let down_sample_factor = down_sample_factor(config.down_sample_timescale, config.dt)?;
    log::debug!("Down-sampling factor: {}", down_sample_factor);

    let (spike_probs_down_sampled, t_starts, t_ends) =
        down_sample_spike_probs(spike_probs, down_sample_factor)?;
    log::info!("Down-sampling: done!");

    let mut threshold = config.spike_threshold.with_rng(rng)?;
    let spike_train = threshold.to_spike_train(spike_probs)?;
    let spike_train_down_sampled = threshold.to_spike_train(&spike_probs_down_sampled)?;
    log::info!(
        "Spike trains: done! {} spikes originally and {} after down-sampling",
        spike_train.num_spikes(),
        spike_train_down_sampled.num_spikes()
    );

    let times = time_vector(spike_probs.ncols(), config.dt);
    let times_down_sampled = down_sampled_times(&t_starts, &t_ends, config.dt)?;

    let intervals = cell_inter_spike_intervals(
        &spike_train_down_sampled,
        config.dt * down_sample_factor as f64,
    )?;
    let cvs: Vec<Option<f64>> = intervals
        .iter()
        .map(|intervals| coefficient_of_variation(intervals))
        .collect();
    let summary = PopulationSummary::from_values(&cvs);

    log::info!("Mean coefficient of variation: {:?}", summary.mean);
    log::info!("Std coefficient of variation: {:?}", summary.std);
    log::info!("Sem coefficient of variation: {:?}", summary.sem);

    Ok(Analysis {
        down_sample_factor,
        times,
        times_down_sampled,
        spike_probs_down_sampled,
        t_starts,
        t_ends,
        spike_train,
        spike_train_down_sampled,
        intervals,
        cvs,
        summary,
    })
}
