// src/engine/error.rs

use thiserror::Error;

/// Whole-call failures. Per-row problems (zero or missing denominators)
/// are encoded as missing output values instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("column '{column}' not found (available: {})", available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("window {window} is invalid for a table of {rows} rows (expected 1..={rows})")]
    InvalidWindow { window: i128, rows: usize },

    #[error("column '{column}' must be numeric, got {dtype}")]
    NonNumericColumn { column: String, dtype: &'static str },

    #[error("column '{column}' length {len} != expected {expected}")]
    LengthMismatch {
        column: String,
        len: usize,
        expected: usize,
    },

    #[error("column '{column}' already exists")]
    DuplicateColumn { column: String },

    #[error("series has no non-missing values")]
    EmptySeries,

    #[error("percentile {percentile} outside [0, 100]")]
    InvalidPercentile { percentile: f64 },

    #[error("invalid rolling options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
