// src/lib.rs

pub mod engine;

#[cfg(feature = "python")]
mod python;

pub use engine::{
    compute, compute_many, compute_with,
    error::{EngineError, Result},
    options::{ReturnConvention, RollingOptions},
    table::{Column, ColumnData, Table},
    valid_returns,
};

/// Same as [`compute`]: `table` plus one rolling-return column.
pub fn calculate_rolling_returns(table: &Table, column_name: &str, window: usize) -> Result<Table> {
    engine::compute(table, column_name, window)
}

#[cfg(feature = "python")]
#[pyo3::pymodule]
fn rollingwins(py: pyo3::Python<'_>, m: &pyo3::types::PyModule) -> pyo3::PyResult<()> {
    python::register(py, m)
}
