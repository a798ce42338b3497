use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Errors raised while turning a file into a [`crate::data::model::SalesDataset`].
///
/// All kinds are fatal: the dashboard has nothing to show without its data.
#[derive(Debug, Error)]
pub enum DataError {
    /// The file is missing, unreadable, or not parseable in its format at all.
    #[error("data unavailable at '{}': {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    /// An expected column is absent, or a cell has the wrong type.
    #[error("schema mismatch in column '{column}': {detail}")]
    SchemaMismatch { column: String, detail: String },

    /// The validated rows could not be laid out as a table.
    #[error("cannot build the sales table: {0}")]
    Frame(#[from] PolarsError),
}

impl DataError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DataError::DataUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn schema(column: impl Into<String>, detail: impl Into<String>) -> Self {
        DataError::SchemaMismatch {
            column: column.into(),
            detail: detail.into(),
        }
    }
}
