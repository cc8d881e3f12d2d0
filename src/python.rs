// src/python.rs

use numpy::PyReadonlyArray1;
use pyo3::create_exception;
use pyo3::exceptions::{PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyList};

use crate::engine::{
    self,
    allocation::{self, DEFAULT_RISK_FREE_RATE},
    error::EngineError,
    metrics::summarize,
    options::{ReturnConvention, RollingOptions},
    prepare_inputs::prepare_series,
    table::{Column, ColumnData, Table},
};

create_exception!(
    rollingwins,
    RollingWinsError,
    PyValueError,
    "Base exception for rollingwins."
);
create_exception!(
    rollingwins,
    ColumnNotFoundError,
    RollingWinsError,
    "Raised when the requested column is absent from the table."
);
create_exception!(
    rollingwins,
    InvalidWindowError,
    RollingWinsError,
    "Raised when the window is < 1 or larger than the row count."
);

impl From<EngineError> for PyErr {
    fn from(err: EngineError) -> PyErr {
        let msg = err.to_string();
        match err {
            EngineError::ColumnNotFound { .. } => ColumnNotFoundError::new_err(msg),
            EngineError::InvalidWindow { .. } => InvalidWindowError::new_err(msg),
            _ => RollingWinsError::new_err(msg),
        }
    }
}

fn contains_bool(obj: &PyAny) -> bool {
    obj.iter()
        .map(|items| items.flatten().any(|v| v.downcast::<PyBool>().is_ok()))
        .unwrap_or(false)
}

/// numpy float/int arrays first, then plain sequences (None = missing).
/// Booleans are rejected rather than read as 0/1.
fn extract_column(name: &str, obj: &PyAny) -> PyResult<Column> {
    if let Ok(arr) = obj.extract::<PyReadonlyArray1<f64>>() {
        return Ok(Column::from_array(name, arr.as_array()));
    }
    if let Ok(arr) = obj.extract::<PyReadonlyArray1<i64>>() {
        let values = arr.as_array().iter().copied().map(Some).collect();
        return Ok(Column::int(name, values));
    }
    if contains_bool(obj) {
        return Err(PyTypeError::new_err(format!(
            "column '{}' holds booleans, expected numbers or strings",
            name
        )));
    }
    if let Ok(values) = obj.extract::<Vec<Option<i64>>>() {
        return Ok(Column::int(name, values));
    }
    if let Ok(values) = obj.extract::<Vec<Option<f64>>>() {
        let values = values.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect();
        return Ok(Column::float(name, values));
    }
    if let Ok(values) = obj.extract::<Vec<Option<String>>>() {
        return Ok(Column::utf8(name, values));
    }
    Err(PyTypeError::new_err(format!(
        "unsupported type for column '{}': {}",
        name,
        obj.get_type().name()?
    )))
}

fn table_from_dict(dict: &PyDict) -> PyResult<Table> {
    let mut columns = Vec::with_capacity(dict.len());
    for (key, value) in dict.iter() {
        let name: String = key.extract()?;
        columns.push(extract_column(&name, value)?);
    }
    Ok(Table::new(columns)?)
}

fn table_to_dict<'py>(py: Python<'py>, table: &Table) -> PyResult<&'py PyDict> {
    let out = PyDict::new(py);
    for column in table.columns() {
        match column.data() {
            ColumnData::Float64(v) => {
                let values = v.iter().map(|x| x.filter(|f| !f.is_nan()));
                out.set_item(column.name(), PyList::new(py, values))?
            }
            ColumnData::Int64(v) => out.set_item(column.name(), PyList::new(py, v))?,
            ColumnData::Utf8(v) => out.set_item(column.name(), PyList::new(py, v))?,
        }
    }
    Ok(out)
}

fn parse_convention(name: &str) -> PyResult<ReturnConvention> {
    ReturnConvention::parse(name).ok_or_else(|| {
        RollingWinsError::new_err(format!(
            "unknown return convention '{}' (expected 'simple' or 'log')",
            name
        ))
    })
}

/// A dict of columns is read as a table; anything else as a single series.
fn extract_series(obj: &PyAny) -> PyResult<Vec<Option<f64>>> {
    let column = match obj.downcast::<PyDict>() {
        Ok(dict) => {
            let (key, value) = dict
                .iter()
                .next()
                .ok_or_else(|| RollingWinsError::new_err("returns table has no columns"))?;
            extract_column(&key.extract::<String>()?, value)?
        }
        Err(_) => extract_column("returns", obj)?,
    };
    Ok(prepare_series(&column)?)
}

#[pyfunction]
#[pyo3(signature = (table, column, window, convention = "simple", output_name = None))]
pub fn calculate_rolling_returns_df(
    py: Python<'_>,
    table: &PyDict,
    column: &str,
    window: i64,
    convention: &str,
    output_name: Option<String>,
) -> PyResult<PyObject> {
    let input = table_from_dict(table)?;
    let mut options = RollingOptions::new(window).with_convention(parse_convention(convention)?);
    options.output_name = output_name;

    let out = engine::compute_with(&input, column, &options)?;
    Ok(table_to_dict(py, &out)?.into())
}

#[pyfunction]
#[pyo3(signature = (table, column, windows, convention = "simple"))]
pub fn calculate_rolling_returns_many(
    py: Python<'_>,
    table: &PyDict,
    column: &str,
    windows: Vec<i64>,
    convention: &str,
) -> PyResult<PyObject> {
    let input = table_from_dict(table)?;
    let convention = parse_convention(convention)?;
    let out = py.allow_threads(|| engine::compute_many(&input, column, &windows, convention))?;
    Ok(table_to_dict(py, &out)?.into())
}

#[pyfunction]
pub fn summarize_returns(py: Python<'_>, values: &PyAny) -> PyResult<PyObject> {
    let s = summarize(&extract_series(values)?);
    let d = PyDict::new(py);
    d.set_item("count",      s.count)?;
    d.set_item("missing",    s.missing)?;
    d.set_item("mean",       s.mean)?;
    d.set_item("volatility", s.volatility)?;
    d.set_item("min",        s.min)?;
    d.set_item("max",        s.max)?;
    Ok(d.into())
}

#[pyfunction]
#[pyo3(signature = (returns, months, tolerance_pct, var_percentile, risk_free_rate = DEFAULT_RISK_FREE_RATE))]
pub fn compute_optimal_allocation(
    py: Python<'_>,
    returns: &PyAny,
    months: usize,
    tolerance_pct: f64,
    var_percentile: f64,
    risk_free_rate: f64,
) -> PyResult<PyObject> {
    let series = extract_series(returns)?;
    let a = allocation::compute_optimal_allocation(
        &series,
        months,
        tolerance_pct,
        var_percentile,
        risk_free_rate,
    )?;
    let d = PyDict::new(py);
    d.set_item("percentile",                    a.percentile)?;
    d.set_item("market_weight",                 a.market_weight)?;
    d.set_item("risk_free_weight",              a.risk_free_weight)?;
    d.set_item("expected_return_at_percentile", a.expected_return_at_percentile)?;
    Ok(d.into())
}

#[pyfunction]
pub fn months_to_trading_days(months: usize) -> usize {
    allocation::months_to_trading_days(months)
}

pub fn register(py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(calculate_rolling_returns_df, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_rolling_returns_many, m)?)?;
    m.add_function(wrap_pyfunction!(summarize_returns, m)?)?;
    m.add_function(wrap_pyfunction!(compute_optimal_allocation, m)?)?;
    m.add_function(wrap_pyfunction!(months_to_trading_days, m)?)?;
    m.add("RollingWinsError",    py.get_type::<RollingWinsError>())?;
    m.add("ColumnNotFoundError", py.get_type::<ColumnNotFoundError>())?;
    m.add("InvalidWindowError",  py.get_type::<InvalidWindowError>())?;
    m.add("TRADING_DAYS_PER_MONTH", allocation::TRADING_DAYS_PER_MONTH)?;
    Ok(())
}
