//! Module implementing the concept of a (binned) spike train, derived from spike probabilities.
//!
//! # Examples
//!
//! ```rust
//! use nalgebra::DMatrix;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use spike_timescales::spike_train::Threshold;
//!
//! let spike_probs = DMatrix::from_row_slice(2, 4, &[
//!     0.0, 0.6, 0.2, 1.0,
//!     0.5, 0.1, 0.0, 0.4,
//! ]);
//!
//! // Spikes are the entries reaching a fixed threshold
//! let mut threshold: Threshold<StdRng> = Threshold::fixed(0.5).unwrap();
//! let spike_train = threshold.to_spike_train(&spike_probs).unwrap();
//! assert_eq!(spike_train.spike_indices(0).unwrap(), vec![1, 3]);
//! assert_eq!(spike_train.spike_indices(1).unwrap(), vec![0]);
//!
//! // Or a Monte-Carlo realization of the spiking process
//! let mut threshold = Threshold::Chance(StdRng::seed_from_u64(42));
//! let spike_train = threshold.to_spike_train(&spike_probs).unwrap();
//! assert_eq!(spike_train.num_cells(), 2);
//! assert_eq!(spike_train.num_time_points(), 4);
//! ```
use std::str::FromStr;

use derivative::Derivative;
use itertools::Itertools;
use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::error::TimescaleError;

/// The rule turning spike probabilities into spikes.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub enum Threshold<R: Rng> {
    /// There is a spike wherever the probability reaches the threshold.
    Fixed(f64),
    /// There is a spike wherever the probability exceeds a uniform random number in [0, 1),
    /// drawn independently for every cell and time point.
    /// Reproducibility is left to the caller, who seeds the generator.
    Chance(#[derivative(Debug = "ignore")] R),
}

impl<R: Rng> Threshold<R> {
    /// Create a fixed threshold.
    /// Returns an error if the threshold is not in [0, 1].
    pub fn fixed(threshold: f64) -> Result<Self, TimescaleError> {
        check_threshold(threshold)?;
        Ok(Threshold::Fixed(threshold))
    }

    /// Derive the spike train from the spike probabilities (rows are cells, columns are time points).
    ///
    /// In chance mode, the random numbers are consumed row after row, so that every call draws fresh numbers.
    /// Returns an error if the threshold is not in [0, 1] or if any probability is NaN.
    pub fn to_spike_train(
        &mut self,
        spike_probs: &DMatrix<f64>,
    ) -> Result<SpikeTrain, TimescaleError> {
        if let Some((cell, t)) = (0..spike_probs.nrows())
            .cartesian_product(0..spike_probs.ncols())
            .find(|&(cell, t)| spike_probs[(cell, t)].is_nan())
        {
            return Err(TimescaleError::InvalidArgument(format!(
                "The spike probability of cell {} at time point {} is NaN.",
                cell, t
            )));
        }

        let (num_cells, num_time_points) = spike_probs.shape();
        let spikes = match self {
            Threshold::Fixed(threshold) => {
                check_threshold(*threshold)?;
                spike_probs.map(|p| p >= *threshold)
            }
            Threshold::Chance(rng) => {
                let uniform = Uniform::new(0.0, 1.0);
                DMatrix::from_row_iterator(
                    num_cells,
                    num_time_points,
                    (0..num_cells)
                        .cartesian_product(0..num_time_points)
                        .map(|(cell, t)| spike_probs[(cell, t)] > uniform.sample(&mut *rng)),
                )
            }
        };

        Ok(SpikeTrain { spikes })
    }
}

fn check_threshold(threshold: f64) -> Result<(), TimescaleError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(TimescaleError::InvalidArgument(format!(
            "The spike threshold must be in [0, 1] (got {}).",
            threshold
        )));
    }
    Ok(())
}

/// The configurable counterpart of [`Threshold`], without any random number generator attached.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpikeThreshold {
    /// A fixed threshold in [0, 1].
    Fixed(f64),
    /// A random threshold for every cell and time point.
    Random,
}

impl SpikeThreshold {
    /// Attach a random number generator, which is only used in the random mode.
    /// Returns an error if the fixed threshold is not in [0, 1].
    pub fn with_rng<R: Rng>(self, rng: R) -> Result<Threshold<R>, TimescaleError> {
        match self {
            SpikeThreshold::Fixed(threshold) => Threshold::fixed(threshold),
            SpikeThreshold::Random => Ok(Threshold::Chance(rng)),
        }
    }
}

impl FromStr for SpikeThreshold {
    type Err = TimescaleError;

    /// Parse either `random` or a number in [0, 1].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("random") {
            return Ok(SpikeThreshold::Random);
        }

        let threshold = s.parse::<f64>().map_err(|_| {
            TimescaleError::InvalidArgument(format!(
                "The spike threshold must be 'random' or a number (got '{}').",
                s
            ))
        })?;
        check_threshold(threshold)?;
        Ok(SpikeThreshold::Fixed(threshold))
    }
}

/// Represents the spike trains of a population of cells, on a regular time grid.
#[derive(Debug, PartialEq, Clone)]
pub struct SpikeTrain {
    /// Rows are cells and columns are time points.
    spikes: DMatrix<bool>,
}

impl SpikeTrain {
    /// Create a spike train from a matrix of spike indicators.
    pub fn new(spikes: DMatrix<bool>) -> Self {
        SpikeTrain { spikes }
    }

    /// Returns the matrix of spike indicators.
    pub fn spikes(&self) -> &DMatrix<bool> {
        &self.spikes
    }

    pub fn num_cells(&self) -> usize {
        self.spikes.nrows()
    }

    pub fn num_time_points(&self) -> usize {
        self.spikes.ncols()
    }

    /// Returns the total number of spikes.
    pub fn num_spikes(&self) -> usize {
        self.spikes.iter().filter(|&&spike| spike).count()
    }

    /// Returns the number of spikes of each cell.
    pub fn spike_counts(&self) -> Vec<usize> {
        self.spikes
            .row_iter()
            .map(|row| row.iter().filter(|&&spike| spike).count())
            .collect()
    }

    /// Returns the spike indicators of a cell.
    pub fn cell(&self, cell: usize) -> Result<Vec<bool>, TimescaleError> {
        self.check_cell(cell)?;
        Ok(self.spikes.row(cell).iter().cloned().collect())
    }

    /// Returns the (sorted) time indices at which a cell spikes.
    pub fn spike_indices(&self, cell: usize) -> Result<Vec<usize>, TimescaleError> {
        self.check_cell(cell)?;
        Ok(self
            .spikes
            .row(cell)
            .iter()
            .positions(|&spike| spike)
            .collect())
    }

    /// Returns the times at which a cell spikes, given the time of every time point.
    pub fn spike_times(&self, cell: usize, times: &[f64]) -> Result<Vec<f64>, TimescaleError> {
        if times.len() != self.num_time_points() {
            return Err(TimescaleError::OutOfBounds(format!(
                "Got {} times for a spike train with {} time points.",
                times.len(),
                self.num_time_points()
            )));
        }
        Ok(self
            .spike_indices(cell)?
            .into_iter()
            .map(|t| times[t])
            .collect())
    }

    fn check_cell(&self, cell: usize) -> Result<(), TimescaleError> {
        if cell >= self.num_cells() {
            return Err(TimescaleError::OutOfBounds(format!(
                "Cell {} not found among {} cells.",
                cell,
                self.num_cells()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    const SEED: u64 = 42;

    fn spike_probs() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            3,
            5,
            &[
                0.0, 0.3, 0.5, 0.7, 1.0, //
                0.5, 0.5, 0.0, 0.0, 0.49, //
                0.2, 0.0, 0.0, 0.0, 0.0,
            ],
        )
    }

    #[test]
    fn test_fixed_threshold() {
        let mut threshold: Threshold<StdRng> = Threshold::fixed(0.5).unwrap();
        let spike_train = threshold.to_spike_train(&spike_probs()).unwrap();

        assert_eq!(
            spike_train.spikes(),
            &DMatrix::from_row_slice(
                3,
                5,
                &[
                    false, false, true, true, true, //
                    true, true, false, false, false, //
                    false, false, false, false, false,
                ]
            )
        );
        assert_eq!(spike_train.num_spikes(), 5);
        assert_eq!(spike_train.spike_counts(), vec![3, 2, 0]);

        // a null threshold makes every time point a spike
        let mut threshold: Threshold<StdRng> = Threshold::fixed(0.0).unwrap();
        let spike_train = threshold.to_spike_train(&spike_probs()).unwrap();
        assert_eq!(spike_train.num_spikes(), 15);
    }

    #[test]
    fn test_invalid_threshold() {
        assert!(matches!(
            Threshold::<StdRng>::fixed(1.5),
            Err(TimescaleError::InvalidArgument(_))
        ));
        assert!(matches!(
            Threshold::<StdRng>::fixed(f64::NAN),
            Err(TimescaleError::InvalidArgument(_))
        ));

        let mut threshold: Threshold<StdRng> = Threshold::Fixed(-0.1);
        assert!(matches!(
            threshold.to_spike_train(&spike_probs()),
            Err(TimescaleError::InvalidArgument(_))
        ));

        let mut spike_probs = spike_probs();
        spike_probs[(2, 3)] = f64::NAN;
        let mut threshold = Threshold::Chance(StdRng::seed_from_u64(SEED));
        assert!(matches!(
            threshold.to_spike_train(&spike_probs),
            Err(TimescaleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_chance_threshold() {
        let mut threshold = Threshold::Chance(StdRng::seed_from_u64(SEED));
        let spike_train = threshold.to_spike_train(&spike_probs()).unwrap();

        // impossible events never happen, certain events always do
        assert!(!spike_train.spikes()[(0, 0)]);
        assert!(spike_train.spikes()[(0, 4)]);
        assert!(!spike_train.spikes()[(2, 1)]);

        // the same seed gives the same realization
        let mut other = Threshold::Chance(StdRng::seed_from_u64(SEED));
        assert_eq!(other.to_spike_train(&spike_probs()).unwrap(), spike_train);
    }

    #[test]
    fn test_chance_threshold_rate() {
        let spike_probs = DMatrix::from_element(50, 400, 0.3);
        let mut threshold = Threshold::Chance(StdRng::seed_from_u64(SEED));

        let first = threshold.to_spike_train(&spike_probs).unwrap();
        let rate = first.num_spikes() as f64 / 20_000.0;
        assert!((rate - 0.3).abs() < 0.02);

        // consecutive calls draw fresh random numbers
        let second = threshold.to_spike_train(&spike_probs).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_degenerate_spike_probs() {
        let mut threshold = Threshold::Chance(StdRng::seed_from_u64(SEED));
        let spike_train = threshold.to_spike_train(&DMatrix::zeros(3, 0)).unwrap();
        assert_eq!(spike_train.num_cells(), 3);
        assert_eq!(spike_train.num_time_points(), 0);
        assert_eq!(spike_train.spike_counts(), vec![0, 0, 0]);
    }

    #[test]
    fn test_spike_train_accessors() {
        let mut threshold: Threshold<StdRng> = Threshold::fixed(0.5).unwrap();
        let spike_train = threshold.to_spike_train(&spike_probs()).unwrap();

        assert_eq!(
            spike_train.cell(1).unwrap(),
            vec![true, true, false, false, false]
        );
        assert_eq!(spike_train.spike_indices(0).unwrap(), vec![2, 3, 4]);
        assert_eq!(spike_train.spike_indices(2).unwrap(), Vec::<usize>::new());
        assert_eq!(
            spike_train
                .spike_times(0, &[0.0, 0.5, 1.0, 1.5, 2.0])
                .unwrap(),
            vec![1.0, 1.5, 2.0]
        );

        assert!(matches!(
            spike_train.cell(3),
            Err(TimescaleError::OutOfBounds(_))
        ));
        assert!(matches!(
            spike_train.spike_indices(7),
            Err(TimescaleError::OutOfBounds(_))
        ));
        assert!(matches!(
            spike_train.spike_times(0, &[0.0, 0.5]),
            Err(TimescaleError::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_spike_threshold_from_str() {
        assert_eq!("random".parse::<SpikeThreshold>(), Ok(SpikeThreshold::Random));
        assert_eq!(" Random ".parse::<SpikeThreshold>(), Ok(SpikeThreshold::Random));
        assert_eq!("0.25".parse::<SpikeThreshold>(), Ok(SpikeThreshold::Fixed(0.25)));
        assert!(matches!(
            "1.25".parse::<SpikeThreshold>(),
            Err(TimescaleError::InvalidArgument(_))
        ));
        assert!(matches!(
            "often".parse::<SpikeThreshold>(),
            Err(TimescaleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_spike_threshold_with_rng() {
        let threshold = SpikeThreshold::Fixed(0.4)
            .with_rng(StdRng::seed_from_u64(SEED))
            .unwrap();
        assert!(matches!(threshold, Threshold::Fixed(t) if t == 0.4));

        let threshold = SpikeThreshold::Random
            .with_rng(StdRng::seed_from_u64(SEED))
            .unwrap();
        assert!(matches!(threshold, Threshold::Chance(_)));

        assert!(matches!(
            SpikeThreshold::Fixed(2.0).with_rng(StdRng::seed_from_u64(SEED)),
            Err(TimescaleError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_spike_threshold_serde() {
        assert_eq!(
            serde_json::to_string(&SpikeThreshold::Random).unwrap(),
            "\"random\""
        );
        assert_eq!(
            serde_json::to_string(&SpikeThreshold::Fixed(0.5)).unwrap(),
            "{\"fixed\":0.5}"
        );
        assert_eq!(
            serde_json::from_str::<SpikeThreshold>("{\"fixed\":0.1}").unwrap(),
            SpikeThreshold::Fixed(0.1)
        );
    }
}
