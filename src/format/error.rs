//! Error types for hotspot format operations.

use thiserror::Error;

/// Errors that abort a whole import or export.
///
/// A single malformed row is not an error; it is skipped and reported as a
/// [`crate::format::FormatWarning`] on the import result.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Flushing the encoded output failed
    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Input is structurally unusable (empty, wrong top-level shape)
    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    /// Required CSV column is missing from the header
    #[error("Invalid format: missing required column '{column}'")]
    MissingColumn {
        /// Canonical name of the missing column
        column: String,
    },

    /// Input parsed but contained no usable rows
    #[error("No valid rows found ({skipped} skipped)")]
    NoValidRows {
        /// Number of rows that were rejected
        skipped: usize,
    },
}

impl FormatError {
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Structural problems with the input (bad header, missing columns, empty input).
    pub fn is_invalid_format(&self) -> bool {
        matches!(self, Self::InvalidFormat { .. } | Self::MissingColumn { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_is_invalid_format() {
        let err = FormatError::missing_column("x");
        assert!(err.is_invalid_format());
        assert_eq!(
            err.to_string(),
            "Invalid format: missing required column 'x'"
        );
    }

    #[test]
    fn test_no_valid_rows_is_not_invalid_format() {
        let err = FormatError::NoValidRows { skipped: 3 };
        assert!(!err.is_invalid_format());
        assert_eq!(err.to_string(), "No valid rows found (3 skipped)");
    }
}
