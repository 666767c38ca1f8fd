//! Error types for Dagtable.
//!
//! All errors in Dagtable are represented by the `DagTableError` enum.
//! The variants mirror the failure kinds of the load protocol: the first two
//! are fatal and reject the whole load, `ProgressQuery` is non-fatal and is
//! contained inside the overlay pass.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Dagtable operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum DagTableError {
    /// The parent dag could not be refreshed (fatal, rejects the load).
    #[error("parent refresh failed: {0}")]
    ParentRefresh(String),

    /// The primary vertex fetch failed (fatal, rejects the load).
    #[error("primary fetch failed: {0}")]
    PrimaryFetch(String),

    /// The progress query failed (non-fatal, contained in the overlay pass).
    #[error("progress query failed: {0}")]
    ProgressQuery(String),

    /// Storage operation errors.
    #[error("{0}")]
    Store(String),

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors.
    #[error("{0}")]
    Convert(String),
}

impl From<DagTableError> for String {
    fn from(val: DagTableError) -> Self {
        val.to_string()
    }
}

impl From<serde_json::Error> for DagTableError {
    fn from(error: serde_json::Error) -> Self {
        DagTableError::Convert(error.to_string())
    }
}

impl DagTableError {
    /// Whether this error rejects the load future rather than being
    /// swallowed by the overlay pass.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DagTableError::ProgressQuery(_))
    }
}
