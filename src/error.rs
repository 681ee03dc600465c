//! Error types for catscatter.
//!
//! Every failure is fatal to a run: nothing here is retried or recovered
//! locally. Variants are grouped by where they originate (data, parameters,
//! rendering) so callers can match on the class of problem.

use thiserror::Error;

/// The main error type for catscatter operations.
#[derive(Error, Debug)]
pub enum PlotError {
    // ---------------------------------------------------------------------
    // Data errors
    // ---------------------------------------------------------------------
    /// Remote resource could not be fetched
    #[error("Failed to fetch '{url}': {message}")]
    Fetch { url: String, message: String },

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Failed to parse '{value}' as number in column '{column}' at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Input must contain at least one data row")]
    EmptyTable,

    #[error("Column '{0}' has no finite values")]
    NoFiniteValues(String),

    // ---------------------------------------------------------------------
    // Parameter errors
    // ---------------------------------------------------------------------
    /// Parallel plot inputs disagree on their length
    #[error("Shape mismatch: '{name}' has length {actual}, expected {expected}")]
    ShapeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid series {start}/{stop}/{step}: {message}")]
    InvalidSeries {
        start: f64,
        stop: f64,
        step: f64,
        message: String,
    },

    #[error("Invalid spacing: {0}")]
    InvalidSpacing(String),

    #[error("Unknown palette: {0}")]
    UnknownPalette(String),

    /// A color value has no bin in the colormap
    #[error("Value {0} is outside the colormap domain")]
    UnmappedValue(f64),

    #[error("Colormap has {bins} bins but the category codes span 0..{categories}")]
    CategoryDomain { bins: usize, categories: usize },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid argument: {param} - {message}")]
    InvalidArgument { param: String, message: String },

    /// Frame, projection or style string could not be parsed
    #[error("Parse error in {what} '{input}'")]
    Parse { what: &'static str, input: String },

    // ---------------------------------------------------------------------
    // Rendering errors
    // ---------------------------------------------------------------------
    #[error("Cannot finalize a figure with no drawing operations")]
    EmptyCanvas,

    #[error("Figure has already been finalized")]
    SessionFinalized,

    #[error("No region set: call basemap before plotting")]
    NoRegion,

    #[error("Drawing backend error: {0}")]
    Backend(String),

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

impl PlotError {
    pub(crate) fn invalid_argument(param: &str, message: impl Into<String>) -> Self {
        PlotError::InvalidArgument {
            param: param.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn parse(what: &'static str, input: &str) -> Self {
        PlotError::Parse {
            what,
            input: input.to_string(),
        }
    }
}

/// Convenience type alias for Results with PlotError
pub type Result<T> = std::result::Result<T, PlotError>;
