//! Fund evaluation metrics for navrank.
//!
//! This crate turns raw NAV histories into per-fund metric rows:
//! - Sanitation of raw `(date, price)` observations
//! - Monthly returns and rolling CAGR consistency
//! - Sharpe ratio, beta, beta stability and capture ratios
//! - Rolling-window outperformance against a benchmark
//! - Single-period (lump-sum) annualized returns
//!
//! # Example
//!
//! ```rust,ignore
//! use navrank_eval::{EvaluatorConfig, FundEvaluator, SanitizerConfig, TimeSeriesSanitizer};
//!
//! let sanitizer = TimeSeriesSanitizer::new(as_of, SanitizerConfig::default());
//! let series = sanitizer.sanitize(&code, history).ok_or("not enough data")?;
//!
//! let evaluator = FundEvaluator::new(benchmark, EvaluatorConfig::default());
//! let row = evaluator.evaluate(&scheme, &series, &metadata);
//! ```

pub mod benchmark;
pub mod evaluator;
pub mod lumpsum;
pub mod returns;
pub mod risk;
pub mod sanitize;

// Re-export main types
pub use benchmark::{NEUTRAL_OUTPERFORMANCE, outperformance_fraction};
pub use evaluator::{EvaluatorConfig, FundEvaluator};
pub use lumpsum::{DEFAULT_STALENESS_DAYS, LumpsumReturn, is_stale};
pub use returns::{
    MIN_WINDOW_DAYS, RollingReturns, consistency_score, monthly_returns, rolling_cagr_samples,
    rolling_returns,
};
pub use risk::{
    CaptureRatios, MIN_MONTHLY_POINTS, RiskConfig, RiskProfile, beta, beta_stability,
    capture_ratios, sharpe,
};
pub use sanitize::{
    MIN_ROLLING_POINTS, SanitizerConfig, TimeSeriesSanitizer, parse_nav_date, parse_price,
};
