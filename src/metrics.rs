//! Inter-spike interval metrics, for single cells and for populations of cells.
//!
//! # Examples
//!
//! ```rust
//! use approx::assert_relative_eq;
//! use spike_timescales::metrics::{coefficient_of_variation, inter_spike_intervals};
//!
//! let intervals = inter_spike_intervals(&[false, true, false, false, true, true], 0.5).unwrap();
//! assert_eq!(intervals, vec![1.5, 0.5]);
//!
//! let cv = coefficient_of_variation(&intervals).unwrap();
//! assert_relative_eq!(cv, 0.5, epsilon = 1e-12);
//! ```
use itertools::Itertools;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::TimescaleError;
use crate::spike_train::SpikeTrain;

/// Returns the inter-spike intervals of a single spike train, i.e., the time elapsed between consecutive spikes.
/// A spike train with less than two spikes has no interval.
/// Returns an error if the time step is not a positive number.
pub fn inter_spike_intervals(spike_train: &[bool], dt: f64) -> Result<Vec<f64>, TimescaleError> {
    if !(dt > 0.0 && dt.is_finite()) {
        return Err(TimescaleError::InvalidArgument(format!(
            "The time step must be a positive number (got {}).",
            dt
        )));
    }

    Ok(spike_train
        .iter()
        .positions(|&spike| spike)
        .tuple_windows()
        .map(|(t1, t2)| (t2 - t1) as f64 * dt)
        .collect())
}

/// Returns the coefficient of variation of the intervals, i.e., their (population) standard deviation over their mean.
/// The coefficient is undefined, i.e., `None`, for less than two intervals or for a null mean.
pub fn coefficient_of_variation(intervals: &[f64]) -> Option<f64> {
    if intervals.len() < 2 {
        return None;
    }

    let intervals = DVector::from_column_slice(intervals);
    let mean = intervals.mean();
    if mean == 0.0 {
        return None;
    }
    Some(intervals.variance().sqrt() / mean)
}

/// Summary statistics of a quantity measured on a population of cells.
/// Undefined values are ignored, and every statistic is `None` if it cannot be computed from the remaining ones.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PopulationSummary {
    /// The number of cells in the population.
    pub num_cells: usize,
    /// The number of cells with a defined value.
    pub num_valid: usize,
    /// The mean over the defined values.
    pub mean: Option<f64>,
    /// The (population) standard deviation over the defined values.
    pub std: Option<f64>,
    /// The standard error of the mean over the defined values (based on the sample standard deviation).
    pub sem: Option<f64>,
}

impl PopulationSummary {
    /// Summarize the per-cell values, where `None` (or NaN) marks an undefined value.
    pub fn from_values(values: &[Option<f64>]) -> Self {
        let valid: Vec<f64> = values
            .iter()
            .flatten()
            .cloned()
            .filter(|value| !value.is_nan())
            .collect();
        let num_valid = valid.len();
        let valid = DVector::from_vec(valid);

        let (mean, std, sem) = match num_valid {
            0 => (None, None, None),
            1 => (Some(valid.mean()), Some(0.0), None),
            n => {
                let variance = valid.variance();
                let sample_variance = variance * n as f64 / (n - 1) as f64;
                (
                    Some(valid.mean()),
                    Some(variance.sqrt()),
                    Some((sample_variance / n as f64).sqrt()),
                )
            }
        };

        PopulationSummary {
            num_cells: values.len(),
            num_valid,
            mean,
            std,
            sem,
        }
    }
}

/// Returns the inter-spike intervals of every cell.
pub fn cell_inter_spike_intervals(
    spike_train: &SpikeTrain,
    dt: f64,
) -> Result<Vec<Vec<f64>>, TimescaleError> {
    (0..spike_train.num_cells())
        .map(|cell| inter_spike_intervals(&spike_train.cell(cell)?, dt))
        .collect()
}

/// Returns the coefficient of variation of the inter-spike intervals of every cell.
pub fn cell_coefficients_of_variation(
    spike_train: &SpikeTrain,
    dt: f64,
) -> Result<Vec<Option<f64>>, TimescaleError> {
    Ok(cell_inter_spike_intervals(spike_train, dt)?
        .iter()
        .map(|intervals| coefficient_of_variation(intervals))
        .collect())
}

/// Returns the coefficient of variation of the inter-spike intervals of every cell, together with their summary over the population.
pub fn interval_variation(
    spike_train: &SpikeTrain,
    dt: f64,
) -> Result<(Vec<Option<f64>>, PopulationSummary), TimescaleError> {
    let cvs = cell_coefficients_of_variation(spike_train, dt)?;
    let summary = PopulationSummary::from_values(&cvs);

    log::info!(
        "Coefficient of variation defined for {} out of {} cells",
        summary.num_valid,
        summary.num_cells
    );

    Ok((cvs, summary))
}
