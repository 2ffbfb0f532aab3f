//! Risk metrics from fund and benchmark monthly returns.
//!
//! Every function here has an explicit fallback for thin or degenerate input
//! so that a single short-history fund never produces `NaN` in the scored
//! table:
//!
//! | metric         | fallback                                     |
//! |----------------|----------------------------------------------|
//! | Sharpe         | `0.0` below 12 months or with zero volatility |
//! | beta           | `1.0` below 12 aligned months or zero variance |
//! | capture ratios | `1.0` when no up (down) benchmark months exist |

use navrank_traits::{
    MonthlyReturnSeries,
    stats::{MIN_STD_THRESHOLD, mean, sample_covariance, sample_std},
};
use serde::{Deserialize, Serialize};

/// Fewest monthly observations (or aligned pairs) needed for Sharpe and beta.
pub const MIN_MONTHLY_POINTS: usize = 12;

/// Beta assumed when it cannot be estimated.
pub const NEUTRAL_BETA: f64 = 1.0;

/// Capture ratio assumed when a market direction never occurs.
pub const NEUTRAL_CAPTURE: f64 = 1.0;

/// Annualized Sharpe ratio of a monthly return series.
///
/// Annual return is `(1 + mean)^12 - 1`, annual volatility is the sample
/// standard deviation scaled by `sqrt(12)`.
pub fn sharpe(returns: &MonthlyReturnSeries, risk_free_rate: f64) -> f64 {
    sharpe_with_min(returns, risk_free_rate, MIN_MONTHLY_POINTS)
}

fn sharpe_with_min(returns: &MonthlyReturnSeries, risk_free_rate: f64, min_points: usize) -> f64 {
    if returns.len() < min_points.max(2) {
        return 0.0;
    }
    let values = returns.values();
    let (Some(m), Some(s)) = (mean(&values), sample_std(&values)) else {
        return 0.0;
    };

    let annual_return = (1.0 + m).powi(12) - 1.0;
    let annual_std = s * 12f64.sqrt();
    if annual_std < MIN_STD_THRESHOLD {
        return 0.0;
    }
    (annual_return - risk_free_rate) / annual_std
}

/// Beta of `fund` against `benchmark` over their common months.
pub fn beta(fund: &MonthlyReturnSeries, benchmark: &MonthlyReturnSeries) -> f64 {
    beta_with_min(fund, benchmark, MIN_MONTHLY_POINTS)
}

fn beta_with_min(fund: &MonthlyReturnSeries, benchmark: &MonthlyReturnSeries, min_points: usize) -> f64 {
    let pairs = fund.align(benchmark);
    if pairs.len() < min_points.max(2) {
        return NEUTRAL_BETA;
    }
    match sample_covariance(&pairs) {
        Some((cov, var)) if var > MIN_STD_THRESHOLD => cov / var,
        _ => NEUTRAL_BETA,
    }
}

/// Upside and downside capture ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureRatios {
    /// Fund mean over benchmark mean in months the benchmark rose.
    pub upside: f64,
    /// Fund mean over benchmark mean in months the benchmark fell.
    pub downside: f64,
}

impl Default for CaptureRatios {
    fn default() -> Self {
        Self {
            upside: NEUTRAL_CAPTURE,
            downside: NEUTRAL_CAPTURE,
        }
    }
}

/// Capture ratios of `fund` against `benchmark` over their common months.
pub fn capture_ratios(fund: &MonthlyReturnSeries, benchmark: &MonthlyReturnSeries) -> CaptureRatios {
    let pairs = fund.align(benchmark);
    CaptureRatios {
        upside: conditional_capture(&pairs, |b| b > 0.0),
        downside: conditional_capture(&pairs, |b| b < 0.0),
    }
}

fn conditional_capture(pairs: &[(f64, f64)], keep: impl Fn(f64) -> bool) -> f64 {
    let (fund, bench): (Vec<f64>, Vec<f64>) = pairs.iter().copied().filter(|&(_, b)| keep(b)).unzip();
    match (mean(&fund), mean(&bench)) {
        (Some(f), Some(b)) if b.abs() > MIN_STD_THRESHOLD => f / b,
        _ => NEUTRAL_CAPTURE,
    }
}

/// Closeness of beta to the market, `max(0, 1 - |beta - 1|)`.
pub fn beta_stability(beta: f64) -> f64 {
    (1.0 - (beta - 1.0).abs()).max(0.0)
}

/// All risk metrics of one fund against one benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Annualized Sharpe ratio.
    pub sharpe: f64,
    /// Beta versus the benchmark.
    pub beta: f64,
    /// Beta stability in [0, 1].
    pub beta_stability: f64,
    /// Capture ratios versus the benchmark.
    pub capture: CaptureRatios,
}

/// Parameters of [`RiskProfile::calculate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Annual risk-free rate as a fraction, e.g. `0.065`.
    pub risk_free_rate: f64,
    /// Fewest monthly points (aligned pairs for beta) before falling back.
    pub min_monthly_points: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.065,
            min_monthly_points: MIN_MONTHLY_POINTS,
        }
    }
}

impl RiskProfile {
    /// Compute every risk metric of `fund` against `benchmark`.
    pub fn calculate(
        fund: &MonthlyReturnSeries,
        benchmark: &MonthlyReturnSeries,
        config: &RiskConfig,
    ) -> Self {
        let beta = beta_with_min(fund, benchmark, config.min_monthly_points);
        Self {
            sharpe: sharpe_with_min(fund, config.risk_free_rate, config.min_monthly_points),
            beta,
            beta_stability: beta_stability(beta),
            capture: capture_ratios(fund, benchmark),
        }
    }
}
