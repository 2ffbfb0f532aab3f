//! Per-fund metric evaluation.
//!
//! [`FundEvaluator`] bundles the return, risk and benchmark calculators into a
//! single call producing one [`MetricRow`]. It holds the run's benchmark and
//! its monthly returns, computed once and shared read-only by every fund.

use std::sync::Arc;

use navrank_traits::{
    FundMetadata, MetricRow, MonthlyReturnSeries, NavRankError, PriceSeries, Result, SchemeRef,
};
use serde::{Deserialize, Serialize};

use crate::{
    benchmark::outperformance_fraction,
    returns::{monthly_returns, rolling_returns},
    risk::{MIN_MONTHLY_POINTS, RiskConfig, RiskProfile},
};

/// Configuration for [`FundEvaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Rolling CAGR window length in years.
    pub rolling_window_years: u32,
    /// Annual risk-free rate as a fraction.
    pub risk_free_rate: f64,
    /// Fewest monthly returns a fund needs to be evaluated at all; also the
    /// Sharpe and beta threshold.
    pub min_monthly_points: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            rolling_window_years: 3,
            risk_free_rate: 0.065,
            min_monthly_points: MIN_MONTHLY_POINTS,
        }
    }
}

impl EvaluatorConfig {
    fn risk(&self) -> RiskConfig {
        RiskConfig {
            risk_free_rate: self.risk_free_rate,
            min_monthly_points: self.min_monthly_points,
        }
    }
}

/// Evaluates sanitized fund series against one shared benchmark.
#[derive(Debug, Clone)]
pub struct FundEvaluator {
    benchmark: Arc<PriceSeries>,
    benchmark_monthly: MonthlyReturnSeries,
    config: EvaluatorConfig,
}

impl FundEvaluator {
    /// Create an evaluator for a run against `benchmark`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use navrank_eval::{EvaluatorConfig, FundEvaluator};
    ///
    /// let evaluator = FundEvaluator::new(Arc::new(benchmark), EvaluatorConfig::default());
    /// let row = evaluator.evaluate(&scheme, &series, &metadata)?;
    /// ```
    pub fn new(benchmark: Arc<PriceSeries>, config: EvaluatorConfig) -> Self {
        let benchmark_monthly = monthly_returns(&benchmark);
        Self {
            benchmark,
            benchmark_monthly,
            config,
        }
    }

    /// The shared benchmark series.
    pub fn benchmark(&self) -> &PriceSeries {
        &self.benchmark
    }

    /// The evaluator configuration.
    pub const fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Compute every raw metric of one fund.
    ///
    /// Degenerate numerics resolve to the fallback values of the individual
    /// calculators; only a too-short monthly history is an error.
    ///
    /// # Errors
    ///
    /// Returns [`NavRankError::InsufficientData`] when the series yields fewer
    /// than `min_monthly_points` monthly returns.
    pub fn evaluate(
        &self,
        scheme: &SchemeRef,
        series: &PriceSeries,
        metadata: &FundMetadata,
    ) -> Result<MetricRow> {
        let monthly = monthly_returns(series);
        if monthly.len() < self.config.min_monthly_points {
            return Err(NavRankError::InsufficientData(format!(
                "{} monthly returns, need {}",
                monthly.len(),
                self.config.min_monthly_points
            )));
        }

        let window = self.config.rolling_window_years;
        let rolling = rolling_returns(series, window);
        let risk = RiskProfile::calculate(&monthly, &self.benchmark_monthly, &self.config.risk());
        let outperformance = outperformance_fraction(series, &self.benchmark, window);

        let info = series.metadata();
        Ok(MetricRow {
            code: scheme.code.clone(),
            name: scheme.name.clone(),
            isin: info.isin_growth.clone().unwrap_or_default(),
            category: info.scheme_category.clone().unwrap_or_default(),
            fund_manager: metadata.manager.clone().unwrap_or_default(),
            rating: metadata.rating.clone().unwrap_or_default(),
            mean_rolling_return: rolling.mean,
            rolling_std: rolling.std,
            consistency: rolling.consistency,
            sharpe: risk.sharpe,
            beta: risk.beta,
            beta_stability: risk.beta_stability,
            upside_capture: risk.capture.upside,
            downside_capture: risk.capture.downside,
            benchmark_outperformance: outperformance,
            expense_ratio: metadata.expense_ratio_or_default(),
            aum: metadata.aum_or_default(),
        })
    }
}
