//! Loading of imaging data from whitespace-delimited text files.
//!
//! Every non-empty line of a file is a row of the matrix, with values separated by whitespace.
//! Anything following a `#` is a comment.
use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::DMatrix;

use crate::error::TimescaleError;
use crate::munging::{check_spike_probs, matrix_from_rows};

/// Load a matrix from a text file.
/// Returns an error if the file cannot be read, if a value is not a number, or if the rows have different lengths.
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<DMatrix<f64>, TimescaleError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| TimescaleError::IOError(format!("{}: {}", path.display(), e)))?;

    let mut rows = vec![];
    for (i, line) in content.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((data, _)) => data,
            None => line,
        };
        if line.trim().is_empty() {
            continue;
        }

        let row = line
            .split_whitespace()
            .map(|value| {
                value.parse::<f64>().map_err(|_| {
                    TimescaleError::InvalidArgument(format!(
                        "{}: invalid number '{}' on line {}",
                        path.display(),
                        value,
                        i + 1
                    ))
                })
            })
            .collect::<Result<Vec<f64>, TimescaleError>>()?;
        rows.push(row);
    }

    let matrix = matrix_from_rows(&rows)?;
    log::debug!("Loaded a {:?} matrix from {}", matrix.shape(), path.display());
    Ok(matrix)
}

/// Loads the data files of a recording directory.
#[derive(Debug, PartialEq, Clone)]
pub struct DataLoader {
    data_dir: PathBuf,
}

impl DataLoader {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        DataLoader {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the spike probabilities (e.g., obtained with Foopsi); rows are cells, columns are time points.
    pub fn spike_probs(&self, filename: &str) -> Result<DMatrix<f64>, TimescaleError> {
        let spike_probs = load_matrix(self.data_dir.join(filename))?;
        check_spike_probs(&spike_probs)?;
        Ok(spike_probs)
    }

    /// Returns the DF/F traces; rows are cells, columns are time points.
    pub fn dfof(&self, filename: &str) -> Result<DMatrix<f64>, TimescaleError> {
        load_matrix(self.data_dir.join(filename))
    }

    /// Returns the cell center coordinates, one (x, y) row per cell.
    pub fn coords(&self, filename: &str) -> Result<DMatrix<f64>, TimescaleError> {
        let coords = load_matrix(self.data_dir.join(filename))?;
        if coords.ncols() != 2 {
            return Err(TimescaleError::ShapeMismatch(format!(
                "Cell coordinates must have 2 columns (got {}).",
                coords.ncols()
            )));
        }
        Ok(coords)
    }
}
