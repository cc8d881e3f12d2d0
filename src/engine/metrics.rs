// src/engine/metrics.rs

use ndarray::Array1;
use serde::Serialize;

use crate::engine::error::{EngineError, Result};

/// Distribution of a rolling-return series, missing rows excluded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSummary {
    pub count:      usize,
    pub missing:    usize,
    pub mean:       f64,
    pub volatility: f64, // sample std (n - 1)
    pub min:        Option<f64>,
    pub max:        Option<f64>,
}

pub fn summarize(returns: &[Option<f64>]) -> ReturnSummary {
    let values: Array1<f64> = returns.iter().flatten().copied().collect();
    let count = values.len();

    let mean = values.mean().unwrap_or(0.0);
    let volatility = if count > 1 { values.std(1.0) } else { 0.0 };
    let min = values.iter().copied().reduce(f64::min);
    let max = values.iter().copied().reduce(f64::max);

    ReturnSummary {
        count,
        missing: returns.len() - count,
        mean,
        volatility,
        min,
        max,
    }
}

/// Linear interpolation between closest ranks, `p` in percent.
pub fn percentile(values: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&p) {
        return Err(EngineError::InvalidPercentile { percentile: p });
    }
    if values.is_empty() {
        return Err(EngineError::EmptySeries);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}
