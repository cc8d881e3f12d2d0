// src/engine/allocation.rs

use serde::Serialize;

use crate::engine::error::Result;
use crate::engine::metrics::percentile;

pub const TRADING_DAYS_PER_MONTH: usize = 21;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.03;

pub fn months_to_trading_days(months: usize) -> usize {
    months * TRADING_DAYS_PER_MONTH
}

/// Split between the market and a risk-free asset so that the return at
/// `percentile` of the historical distribution does not fall below the
/// caller's tolerance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketAllocation {
    pub percentile:                    f64,
    pub market_weight:                 f64,
    pub risk_free_weight:              f64,
    pub expected_return_at_percentile: f64,
}

/// `returns` are decimal rolling-period returns; missing rows are ignored.
/// `tolerance` is the largest acceptable loss over the period (e.g. -0.10).
/// `risk_free_rate` is annualized and compounded over `months`.
pub fn compute_optimal_allocation(
    returns: &[Option<f64>],
    months: usize,
    tolerance: f64,
    var_percentile: f64,
    risk_free_rate: f64,
) -> Result<MarketAllocation> {
    let observed: Vec<f64> = returns.iter().flatten().copied().collect();
    let market_at_pct = percentile(&observed, var_percentile)?;

    let rf_over_period = (1.0 + risk_free_rate).powf(months as f64 / 12.0) - 1.0;

    let denominator = market_at_pct - rf_over_period;
    let w = if denominator == 0.0 {
        0.0
    } else {
        (tolerance - rf_over_period) / denominator
    };

    // no leverage, no shorting
    let market_weight = w.clamp(0.0, 1.0);
    let risk_free_weight = 1.0 - market_weight;

    tracing::debug!(
        months,
        var_percentile,
        market_at_pct,
        market_weight,
        "computed allocation"
    );

    Ok(MarketAllocation {
        percentile: var_percentile,
        market_weight,
        risk_free_weight,
        expected_return_at_percentile: market_weight * market_at_pct
            + risk_free_weight * rf_over_period,
    })
}
