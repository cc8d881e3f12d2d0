// src/engine/rolling.rs

use crate::engine::options::ReturnConvention;

/// Single left-to-right pass. Row `i` compares `values[i]` with
/// `values[i - window + 1]`; the first `window - 1` rows have no lookback.
/// `window` must already be validated against `values.len()`.
pub fn rolling_returns(
    values: &[Option<f64>],
    window: usize,
    convention: ReturnConvention,
) -> Vec<Option<f64>> {
    let lag = window.saturating_sub(1);
    let mut out = Vec::with_capacity(values.len());

    for (i, &end) in values.iter().enumerate() {
        if i < lag {
            out.push(None);
            continue;
        }
        let r = match (values[i - lag], end) {
            (Some(start), Some(end)) => convention.apply(start, end),
            _ => None,
        };
        out.push(r);
    }

    out
}
