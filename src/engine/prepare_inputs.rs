// src/engine/prepare_inputs.rs

use crate::engine::error::{EngineError, Result};
use crate::engine::table::{Column, ColumnData};

/// Read a numeric column as `f64`. Integers are promoted, NaN becomes missing.
pub fn prepare_series(column: &Column) -> Result<Vec<Option<f64>>> {
    match column.data() {
        ColumnData::Float64(values) => Ok(values
            .iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect()),
        ColumnData::Int64(values) => Ok(values.iter().map(|v| v.map(|x| x as f64)).collect()),
        other => Err(EngineError::NonNumericColumn {
            column: column.name().to_string(),
            dtype: other.dtype(),
        }),
    }
}

/// Check `window` against the row count before any computation runs.
pub fn validate_window(window: i64, rows: usize) -> Result<usize> {
    match usize::try_from(window) {
        Ok(w) if w >= 1 && w <= rows => Ok(w),
        _ => Err(EngineError::InvalidWindow {
            window: window.into(),
            rows,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_column_is_promoted() {
        let column = Column::int("volume", vec![Some(3), None, Some(-1)]);
        assert_eq!(
            prepare_series(&column).unwrap(),
            vec![Some(3.0), None, Some(-1.0)]
        );
    }

    #[test]
    fn test_nan_is_missing() {
        let column = Column::float("close", vec![Some(1.0), Some(f64::NAN)]);
        assert_eq!(prepare_series(&column).unwrap(), vec![Some(1.0), None]);
    }

    #[test]
    fn test_text_column_is_rejected() {
        let column = Column::utf8("date", vec![Some("2020-01-01".into())]);
        let err = prepare_series(&column).unwrap_err();
        assert!(matches!(err, EngineError::NonNumericColumn { dtype: "str", .. }));
    }

    #[test]
    fn test_window_bounds() {
        assert_eq!(validate_window(1, 4).unwrap(), 1);
        assert_eq!(validate_window(4, 4).unwrap(), 4);
        for bad in [0, -3, 5] {
            assert!(matches!(
                validate_window(bad, 4),
                Err(EngineError::InvalidWindow { rows: 4, .. })
            ));
        }
        assert!(validate_window(1, 0).is_err());
    }
}
