//! Error taxonomy for a gridded fire-danger run
//!
//! Fatal conditions are variants of [`GridError`]; any of them aborts the run
//! before an output file is written. Recoverable per-cell exclusions are plain
//! values ([`UnknownFuelModel`]) collected during indexing and surfaced in the
//! run report instead.

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Fatal error raised while configuring, reading, simulating or persisting a run
#[derive(Debug, Error)]
pub enum GridError {
    /// Inputs cannot be coupled: dimension mismatch, non-integer day ratio,
    /// missing required field, invalid run parameters.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failure reading a named field or file from an input collaborator
    #[error("failed to read '{field}': {reason}")]
    Read { field: String, reason: String },

    /// Failure writing a named field or file to the output collaborator
    #[error("failed to write '{field}': {reason}")]
    Write { field: String, reason: String },
}

impl GridError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn read(field: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Read {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(field: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Write {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn read_file(path: &Path, reason: impl fmt::Display) -> Self {
        Self::read(path.display().to_string(), reason)
    }

    pub(crate) fn write_file(path: &Path, reason: impl fmt::Display) -> Self {
        Self::write(path.display().to_string(), reason)
    }
}

/// A burnable cell dropped from the active set because its fuel-model code is
/// not in the configured table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownFuelModel {
    /// Flat grid index (`row * cols + col`) of the excluded cell
    pub flat_index: usize,
    /// Fuel-model code found in the site table
    pub code: i32,
}

impl fmt::Display for UnknownFuelModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cell {} has unrecognized fuel model code {}; excluded from simulation",
            self.flat_index, self.code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_names_field() {
        let err = GridError::read("MaxTemp", "expected 6 values, found 4");
        assert_eq!(
            err.to_string(),
            "failed to read 'MaxTemp': expected 6 values, found 4"
        );
    }

    #[test]
    fn test_unknown_fuel_model_message() {
        let warning = UnknownFuelModel {
            flat_index: 7,
            code: 99,
        };
        let text = warning.to_string();
        assert!(text.contains("cell 7"));
        assert!(text.contains("99"));
    }
}
