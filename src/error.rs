// In: src/error.rs

//! This module defines the single, unified error type for the genealogy library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Only two conditions are meant to reach a presentation layer as "errors":
//! `MissingData` (halt the session) and `MissingAuxData` (degrade to a
//! genealogy-only session). Per-file read failures never become errors; they are
//! collected as [`FileReadWarning`]s by the loader.

use std::path::PathBuf;

use thiserror::Error;

use crate::loader::FileReadWarning;

#[derive(Error, Debug)]
pub enum GenealogyError {
    // =========================================================================
    // === High-Level, Semantic Errors
    // =========================================================================
    /// The genealogy source is unusable: no directory, no candidate files, or
    /// every candidate file failed to read. The warnings collected before the
    /// failure are carried along so the caller can still display them.
    #[error("Genealogy data unavailable at '{}': {reason}", .path.display())]
    MissingData {
        path: PathBuf,
        reason: String,
        warnings: Vec<FileReadWarning>,
    },

    /// The work-order side table is unusable. Non-fatal for a session.
    #[error("Work-order index unavailable at '{}': {reason}", .path.display())]
    MissingAuxData { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Table schema error: {0}")]
    Schema(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the spreadsheet reader.
    #[error("Spreadsheet read failed: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// An error originating from the Arrow library (kernels, CSV reader).
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically while reading a config file.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl GenealogyError {
    /// Returns `true` for conditions that should end a session rather than be
    /// shown as a notice.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, GenealogyError::MissingAuxData { .. })
    }
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

#[cfg(feature = "python")]
impl From<GenealogyError> for pyo3::PyErr {
    fn from(err: GenealogyError) -> pyo3::PyErr {
        match err {
            GenealogyError::MissingData { .. } | GenealogyError::MissingAuxData { .. } => {
                pyo3::exceptions::PyFileNotFoundError::new_err(err.to_string())
            }
            other => pyo3::exceptions::PyValueError::new_err(other.to_string()),
        }
    }
}
