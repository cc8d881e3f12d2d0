// src/engine/mod.rs

pub mod allocation;
pub mod error;
pub mod metrics;
pub mod options;
pub mod prepare_inputs;
pub mod rolling;
pub mod table;

use rayon::prelude::*;
use tracing::debug;

use crate::engine::{
    error::{EngineError, Result},
    options::{default_output_name, ReturnConvention, RollingOptions},
    prepare_inputs::{prepare_series, validate_window},
    rolling::rolling_returns,
    table::{Column, Table},
};

/// Append `{column_name}_rolling_return_{window}` to a copy of `table`.
pub fn compute(table: &Table, column_name: &str, window: usize) -> Result<Table> {
    match i64::try_from(window) {
        Ok(w) => compute_with(table, column_name, &RollingOptions::new(w)),
        Err(_) => {
            prepare_series(table.column(column_name)?)?;
            Err(EngineError::InvalidWindow {
                window: window as i128,
                rows: table.num_rows(),
            })
        }
    }
}

fn ensure_absent(table: &Table, name: &str) -> Result<()> {
    if table.contains(name) {
        Err(EngineError::DuplicateColumn {
            column: name.to_string(),
        })
    } else {
        Ok(())
    }
}

pub fn compute_with(table: &Table, column_name: &str, options: &RollingOptions) -> Result<Table> {
    // 1) Resolve & validate; nothing is computed on failure
    let series = prepare_series(table.column(column_name)?)?;
    let window = validate_window(options.window, table.num_rows())?;
    let name = options.output_name_for(column_name);
    ensure_absent(table, &name)?;

    debug!(
        column = column_name,
        window,
        rows = series.len(),
        convention = ?options.convention,
        output = %name,
        "computing rolling returns"
    );

    // 2) Kernel
    let returns = rolling_returns(&series, window, options.convention);

    // 3) New table = input columns + result
    table.with_column(Column::float(name, returns))
}

/// Several windows over the same column, computed in parallel and appended
/// in the order given. Any invalid window fails the whole call.
pub fn compute_many(
    table: &Table,
    column_name: &str,
    windows: &[i64],
    convention: ReturnConvention,
) -> Result<Table> {
    let series = prepare_series(table.column(column_name)?)?;
    let rows = table.num_rows();
    let validated = windows
        .iter()
        .map(|&w| validate_window(w, rows))
        .collect::<Result<Vec<usize>>>()?;

    let mut names: Vec<String> = Vec::with_capacity(validated.len());
    for &window in &validated {
        let name = default_output_name(column_name, window as i64);
        ensure_absent(table, &name)?;
        if names.contains(&name) {
            return Err(EngineError::DuplicateColumn { column: name });
        }
        names.push(name);
    }

    debug!(column = column_name, ?windows, rows, "computing rolling returns for several windows");

    let columns: Vec<Column> = validated
        .par_iter()
        .zip(names.into_par_iter())
        .map(|(&window, name)| Column::float(name, rolling_returns(&series, window, convention)))
        .collect();

    table.with_columns(columns)
}

/// Non-missing values of a numeric column, in row order.
pub fn valid_returns(table: &Table, column_name: &str) -> Result<Vec<f64>> {
    let series = prepare_series(table.column(column_name)?)?;
    Ok(series.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::table::ColumnData;

    fn prices() -> Table {
        Table::new(vec![
            Column::utf8(
                "date",
                ["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"]
                    .iter()
                    .map(|d| Some(d.to_string()))
                    .collect(),
            ),
            Column::from_values("price", &[100.0, 110.0, 121.0, 108.9]),
        ])
        .unwrap()
    }

    fn floats(table: &Table, name: &str) -> Vec<Option<f64>> {
        match table.column(name).unwrap().data() {
            ColumnData::Float64(v) => v.clone(),
            other => panic!("unexpected dtype {}", other.dtype()),
        }
    }

    #[test]
    fn test_compute_appends_named_column() {
        let input = prices();
        let out = compute(&input, "price", 2).unwrap();

        assert_eq!(out.num_rows(), 4);
        assert_eq!(
            out.column_names().collect::<Vec<_>>(),
            vec!["date", "price", "price_rolling_return_2"]
        );
        assert_eq!(&out.columns()[..2], input.columns());

        let r = floats(&out, "price_rolling_return_2");
        assert_eq!(r[0], None);
        for (got, want) in r[1..].iter().zip([0.10, 0.10, -0.10]) {
            assert!((got.unwrap() - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_compute_is_deterministic() {
        let input = prices();
        let a = compute(&input, "price", 3).unwrap();
        let b = compute(&input, "price", 3).unwrap();
        let bits = |t: &Table| {
            floats(t, "price_rolling_return_3")
                .iter()
                .map(|v| v.map(f64::to_bits))
                .collect::<Vec<_>>()
        };
        assert_eq!(bits(&a), bits(&b));
    }

    #[test]
    fn test_errors() {
        let input = prices();
        assert!(matches!(
            compute(&input, "nonexistent", 3),
            Err(EngineError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            compute(&input, "price", 0),
            Err(EngineError::InvalidWindow { window: 0, rows: 4 })
        ));
        assert!(matches!(
            compute(&input, "price", 5),
            Err(EngineError::InvalidWindow { window: 5, rows: 4 })
        ));
        assert!(matches!(
            compute(&input, "date", 2),
            Err(EngineError::NonNumericColumn { .. })
        ));
    }

    #[test]
    fn test_rerun_on_output_collides() {
        let once = compute(&prices(), "price", 2).unwrap();
        assert!(matches!(
            compute(&once, "price", 2),
            Err(EngineError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_oversized_window_reports_value_passed() {
        let err = compute(&prices(), "price", usize::MAX).unwrap_err();
        match err {
            EngineError::InvalidWindow { window, rows } => {
                assert_eq!(window, usize::MAX as i128);
                assert_eq!(rows, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            compute(&prices(), "missing", usize::MAX),
            Err(EngineError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_output_name_collision_is_rejected_up_front() {
        let input = prices();
        let opts = RollingOptions::new(2).with_output_name("date");
        assert!(matches!(
            compute_with(&input, "price", &opts),
            Err(EngineError::DuplicateColumn { column }) if column == "date"
        ));
        let once = compute(&input, "price", 3).unwrap();
        assert!(matches!(
            compute_many(&once, "price", &[2, 3], ReturnConvention::Simple),
            Err(EngineError::DuplicateColumn { column }) if column == "price_rolling_return_3"
        ));
        assert_eq!(input, prices());
    }

    #[test]
    fn test_compute_with_options() {
        let opts = RollingOptions::new(2)
            .with_convention(ReturnConvention::Log)
            .with_output_name("log_r");
        let out = compute_with(&prices(), "price", &opts).unwrap();
        let r = floats(&out, "log_r");
        assert!((r[1].unwrap() - 1.1_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_compute_many_matches_single() {
        let input = prices();
        let many = compute_many(&input, "price", &[1, 2, 4], ReturnConvention::Simple).unwrap();
        assert_eq!(many.num_columns(), 5);
        for w in [1usize, 2, 4] {
            let single = compute(&input, "price", w).unwrap();
            let name = format!("price_rolling_return_{}", w);
            assert_eq!(floats(&many, &name), floats(&single, &name));
        }
    }

    #[test]
    fn test_compute_many_all_or_nothing() {
        let input = prices();
        assert!(matches!(
            compute_many(&input, "price", &[2, 9], ReturnConvention::Simple),
            Err(EngineError::InvalidWindow { window: 9, .. })
        ));
        assert!(matches!(
            compute_many(&input, "price", &[2, 2], ReturnConvention::Simple),
            Err(EngineError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_valid_returns_drops_prefix() {
        let out = compute(&prices(), "price", 3).unwrap();
        let v = valid_returns(&out, "price_rolling_return_3").unwrap();
        assert_eq!(v.len(), 2);
        assert!((v[0] - 0.21).abs() < 1e-12);
    }
}
