// src/engine/table.rs

use ndarray::ArrayView1;

use crate::engine::error::{EngineError, Result};

/// Typed storage for one column. `None` is the missing-value marker.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Float64(Vec<Option<f64>>),
    Int64(Vec<Option<i64>>),
    Utf8(Vec<Option<String>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float64(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> &'static str {
        match self {
            ColumnData::Float64(_) => "f64",
            ColumnData::Int64(_) => "i64",
            ColumnData::Utf8(_) => "str",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self { name: name.into(), data }
    }

    pub fn float(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self::new(name, ColumnData::Float64(values))
    }

    /// Dense float column; every value is present.
    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Self {
        Self::float(name, values.iter().copied().map(Some).collect())
    }

    /// Build from a contiguous array where NaN marks a missing value,
    /// the convention used by numpy float arrays.
    pub fn from_array(name: impl Into<String>, values: ArrayView1<'_, f64>) -> Self {
        let data = values
            .iter()
            .map(|&v| if v.is_nan() { None } else { Some(v) })
            .collect();
        Self::float(name, data)
    }

    pub fn int(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::new(name, ColumnData::Int64(values))
    }

    pub fn utf8(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self::new(name, ColumnData::Utf8(values))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Ordered set of equally long, uniquely named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

/// Ensure `column.len() == expected`, otherwise `LengthMismatch`.
fn validate_length(column: &Column, expected: usize) -> Result<()> {
    if column.len() != expected {
        Err(EngineError::LengthMismatch {
            column: column.name().to_string(),
            len: column.len(),
            expected,
        })
    } else {
        Ok(())
    }
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut table = Table {
            columns: Vec::with_capacity(columns.len()),
        };
        for column in columns {
            table.push(column)?;
        }
        Ok(table)
    }

    fn push(&mut self, column: Column) -> Result<()> {
        if let Some(first) = self.columns.first() {
            validate_length(&column, first.len())?;
        }
        if self.contains(column.name()) {
            return Err(EngineError::DuplicateColumn {
                column: column.name().to_string(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name() == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| EngineError::ColumnNotFound {
                column: name.to_string(),
                available: self.column_names().map(str::to_string).collect(),
            })
    }

    /// Copy of `self` with `new_columns` appended in order. `self` is untouched.
    pub fn with_columns(&self, new_columns: Vec<Column>) -> Result<Table> {
        let mut out = self.clone();
        for column in new_columns {
            out.push(column)?;
        }
        Ok(out)
    }

    pub fn with_column(&self, column: Column) -> Result<Table> {
        self.with_columns(vec![column])
    }
}
