//! This crate provides tools for analyzing the timescales of spike probabilities extracted from calcium imaging data.
//!
//! # Down-sampling Spike Probabilities
//!
//! ```rust
//! use nalgebra::DMatrix;
//! use spike_timescales::munging::down_sample_spike_probs;
//!
//! // One cell, eight time points
//! let spike_probs = DMatrix::from_row_slice(1, 8, &[0.0, 0.0, 0.0, 0.1, 0.0, 0.0, 0.2, 0.3]);
//!
//! // Probability of at least one spike in every 4 consecutive time points
//! let (down_sampled, t_starts, t_ends) = down_sample_spike_probs(&spike_probs, 4).unwrap();
//!
//! assert!((down_sampled[(0, 0)] - 0.1).abs() < 1e-12);
//! assert!((down_sampled[(0, 1)] - 0.44).abs() < 1e-12);
//! assert_eq!(t_starts, vec![0, 4]);
//! assert_eq!(t_ends, vec![4, 8]);
//! ```
//!
//! # Deriving Spike Trains
//!
//! ```rust
//! use nalgebra::DMatrix;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use spike_timescales::spike_train::Threshold;
//!
//! let spike_probs = DMatrix::from_row_slice(1, 4, &[0.1, 0.9, 0.0, 1.0]);
//!
//! // Spikes at random, with the given probabilities
//! let mut rng = StdRng::seed_from_u64(42);
//! let spike_train = Threshold::Chance(&mut rng).to_spike_train(&spike_probs).unwrap();
//!
//! assert!(spike_train.spikes()[(0, 3)]);
//! assert!(!spike_train.spikes()[(0, 2)]);
//! ```
//!
//! # Measuring Irregularity
//!
//! ```rust
//! use nalgebra::DMatrix;
//! use spike_timescales::metrics::interval_variation;
//! use spike_timescales::spike_train::SpikeTrain;
//!
//! let spike_train = SpikeTrain::new(DMatrix::from_row_slice(2, 6, &[
//!     true, false, true, false, true, false,
//!     false, true, false, false, false, false,
//! ]));
//!
//! let (cvs, summary) = interval_variation(&spike_train, 0.1).unwrap();
//!
//! // Perfectly regular spiking for the first cell, too few spikes for the second
//! assert!(cvs[0].unwrap().abs() < 1e-12);
//! assert_eq!(cvs[1], None);
//! assert_eq!(summary.num_valid, 1);
//! ```

pub mod analysis;
pub mod data_io;
pub mod error;
pub mod metrics;
pub mod munging;
pub mod spike_train;
