//! Error taxonomy for loading, aggregating, and rendering benchmark results.
//!
//! Per-file failures ([`PlotError::Io`], [`PlotError::Parse`],
//! [`PlotError::Schema`]) are recoverable: the merge step records them as
//! [`crate::merge::FileError`] diagnostics and moves on to sibling files.
//! [`PlotError::Configuration`] and [`PlotError::NoData`] terminate a run
//! before any output is written.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the plotting pipeline.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Path missing or unreadable.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Content is not in the expected tabular shape.
    #[error("parse error in {}: {message}", path.display())]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A required column is absent from an otherwise readable file.
    #[error("missing column '{column}' in {}", path.display())]
    Schema {
        /// Offending path.
        path: PathBuf,
        /// Exact name of the missing column.
        column: String,
    },

    /// Contradictory or incomplete user input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The run produced no usable records.
    #[error("no valid data: {0}")]
    NoData(String),

    /// The drawing backend or output file failed.
    #[error("render error: {0}")]
    Render(String),
}

impl PlotError {
    /// Build an [`PlotError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a [`PlotError::Parse`] for `path`.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error only affects a single input file.
    ///
    /// File-local errors are collected as diagnostics; everything else aborts
    /// the run.
    pub fn is_file_local(&self) -> bool {
        matches!(
            self,
            PlotError::Io { .. } | PlotError::Parse { .. } | PlotError::Schema { .. }
        )
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PlotError>;
