//! Module for munging spike probabilities, i.e., checking, building and down-sampling them.
//!
//! Spike probabilities are stored in a dense matrix whose rows are cells and whose columns are time points,
//! sampled at a fixed time step `dt`.
//!
//! # Examples
//!
//! ```rust
//! use approx::assert_relative_eq;
//! use nalgebra::DMatrix;
//! use spike_timescales::munging::down_sample_spike_probs;
//!
//! // Two cells, five time points
//! let spike_probs = DMatrix::from_row_slice(2, 5, &[
//!     0.5, 0.5, 0.0, 0.0, 1.0,
//!     0.1, 0.0, 0.2, 0.2, 0.0,
//! ]);
//!
//! // Merge every pair of time points (the last time point is dropped)
//! let (down_sampled, t_starts, t_ends) = down_sample_spike_probs(&spike_probs, 2).unwrap();
//!
//! assert_eq!(down_sampled.shape(), (2, 2));
//! assert_relative_eq!(down_sampled[(0, 0)], 0.75, epsilon = 1e-12);
//! assert_relative_eq!(down_sampled[(1, 1)], 0.36, epsilon = 1e-12);
//! assert_eq!(t_starts, vec![0, 2]);
//! assert_eq!(t_ends, vec![2, 4]);
//! ```
use itertools::Itertools;
use nalgebra::DMatrix;

use crate::error::TimescaleError;

/// Check that the matrix holds valid spike probabilities.
/// Returns an error if the matrix is empty or if any entry is outside [0, 1] (including NaN).
pub fn check_spike_probs(spike_probs: &DMatrix<f64>) -> Result<(), TimescaleError> {
    if spike_probs.is_empty() {
        return Err(TimescaleError::InvalidArgument(format!(
            "The spike probabilities must cover at least one cell and one time point (got shape {:?}).",
            spike_probs.shape()
        )));
    }

    if let Some((cell, t)) = (0..spike_probs.nrows())
        .cartesian_product(0..spike_probs.ncols())
        .find(|&(cell, t)| !(0.0..=1.0).contains(&spike_probs[(cell, t)]))
    {
        return Err(TimescaleError::InvalidArgument(format!(
            "The spike probability of cell {} at time point {} is {}, which is not in [0, 1].",
            cell,
            t,
            spike_probs[(cell, t)]
        )));
    }

    Ok(())
}

/// Build a matrix from its rows.
/// Returns an error if there are no rows, no columns, or if the rows have different lengths.
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<DMatrix<f64>, TimescaleError> {
    let num_cols = match rows.first() {
        Some(row) if !row.is_empty() => row.len(),
        _ => {
            return Err(TimescaleError::InvalidArgument(
                "Cannot build a matrix without any row or column.".to_string(),
            ))
        }
    };

    if let Some((i, row)) = rows.iter().find_position(|row| row.len() != num_cols) {
        return Err(TimescaleError::ShapeMismatch(format!(
            "Row {} has {} values, but the first row has {}.",
            i,
            row.len(),
            num_cols
        )));
    }

    Ok(DMatrix::from_row_iterator(
        rows.len(),
        num_cols,
        rows.iter().flatten().cloned(),
    ))
}

/// Down-sample time-series of spike probabilities by the given factor.
///
/// Every `down_sample_factor` consecutive time points are merged into one, where the new probability is the
/// probability that the cell spiked at least once in the bin, assuming independent spikes, i.e.,
/// `1 - prod(1 - p)`. Trailing time points which do not fill a complete bin are dropped.
///
/// Returns the down-sampled probabilities, together with the (original) start and end indices of each bin.
/// Returns an error if the factor is zero or if the spike probabilities are invalid.
pub fn down_sample_spike_probs(
    spike_probs: &DMatrix<f64>,
    down_sample_factor: usize,
) -> Result<(DMatrix<f64>, Vec<usize>, Vec<usize>), TimescaleError> {
    if down_sample_factor == 0 {
        return Err(TimescaleError::InvalidArgument(
            "The down-sampling factor must be positive.".to_string(),
        ));
    }
    check_spike_probs(spike_probs)?;

    let num_cells = spike_probs.nrows();
    let num_time_points_down_sampled = spike_probs.ncols() / down_sample_factor;

    let t_starts: Vec<usize> = (0..num_time_points_down_sampled)
        .map(|t| t * down_sample_factor)
        .collect();
    let t_ends: Vec<usize> = t_starts
        .iter()
        .map(|t_start| t_start + down_sample_factor)
        .collect();

    let spike_probs_down_sampled =
        DMatrix::from_fn(num_cells, num_time_points_down_sampled, |cell, t| {
            1.0 - (t_starts[t]..t_ends[t])
                .map(|t_orig| 1.0 - spike_probs[(cell, t_orig)])
                .product::<f64>()
        });

    log::debug!(
        "Down-sampled spike probabilities from {:?} to {:?} (factor {})",
        spike_probs.shape(),
        spike_probs_down_sampled.shape(),
        down_sample_factor
    );

    Ok((spike_probs_down_sampled, t_starts, t_ends))
}

/// Returns the number of time steps of length `dt` in the given timescale, rounded to the nearest integer
/// (ties to even).
/// Returns an error if one of the parameters is not a positive number or if the timescale is shorter than half a time step.
pub fn down_sample_factor(timescale: f64, dt: f64) -> Result<usize, TimescaleError> {
    if !(dt > 0.0 && dt.is_finite()) {
        return Err(TimescaleError::InvalidArgument(format!(
            "The time step must be a positive number (got {}).",
            dt
        )));
    }
    if !(timescale > 0.0 && timescale.is_finite()) {
        return Err(TimescaleError::InvalidArgument(format!(
            "The down-sampling timescale must be a positive number (got {}).",
            timescale
        )));
    }

    let factor = (timescale / dt).round_ties_even() as usize;
    if factor == 0 {
        return Err(TimescaleError::InvalidArgument(format!(
            "The down-sampling timescale {} is too short for a time step of {}.",
            timescale, dt
        )));
    }
    Ok(factor)
}

/// Returns the times of the original time points.
pub fn time_vector(num_time_points: usize, dt: f64) -> Vec<f64> {
    (0..num_time_points).map(|t| t as f64 * dt).collect()
}

/// Returns the times of the down-sampled time points.
/// Each bin is assigned the time of the original time point at its center, rounded to even.
pub fn down_sampled_times(
    t_starts: &[usize],
    t_ends: &[usize],
    dt: f64,
) -> Result<Vec<f64>, TimescaleError> {
    if t_starts.len() != t_ends.len() {
        return Err(TimescaleError::ShapeMismatch(format!(
            "There are {} bin starts but {} bin ends.",
            t_starts.len(),
            t_ends.len()
        )));
    }

    Ok(t_starts
        .iter()
        .zip(t_ends.iter())
        .map(|(&t_start, &t_end)| ((t_start + t_end) as f64 / 2.0).round_ties_even() * dt)
        .collect())
}
