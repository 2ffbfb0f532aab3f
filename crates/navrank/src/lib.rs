#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/navrank/navrank/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # navrank
//!
//! Umbrella crate re-exporting every navrank sub-crate.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use navrank::prelude::*;
//! use navrank::mfapi::{HttpConfig, MfApiClient};
//!
//! # async fn example() -> navrank::Result<()> {
//! let config = Arc::new(EngineConfig::load(None)?);
//! let client = Arc::new(MfApiClient::from_env(HttpConfig::default())?);
//! let registry = BenchmarkRegistry::from_path("benchmark_map.json".as_ref())?;
//!
//! let pipeline = BatchScoringPipeline::new(client.clone(), client, config)
//!     .with_registry(registry);
//! let as_of = chrono::Local::now().date_naive();
//! let run = pipeline
//!     .run(&ScreenRequest::new("Equity Scheme - Large Cap Fund", as_of))
//!     .await?;
//!
//! for row in run.table.top(10) {
//!     println!("{:>3} {:<60} {:.3}", row.rank, row.metrics.name, row.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Data types, errors and provider traits
//! - [`eval`] - Per-fund metric calculators
//! - [`combine`] - Normalization and weighted ranking
//! - [`mfapi`] - HTTP adapters
//! - [`pipeline`] - Configuration and batch pipelines
//!
//! ## Metrics
//!
//! | Metric | Direction | Default weight |
//! |--------|-----------|----------------|
//! | Rolling-return consistency | higher is better | 0.25 |
//! | Sharpe ratio | higher is better | 0.20 |
//! | Upside capture | higher is better | 0.15 |
//! | Downside capture | lower is better | 0.15 |
//! | Benchmark outperformance | higher is better | 0.10 |
//! | Beta stability | higher is better | 0.05 |
//! | Expense ratio | lower is better | 0.10 |

/// Version information for the navrank crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Data types, errors and collaborator traits.
pub mod traits {
    pub use navrank_traits::*;
}

pub use navrank_traits::{NavRankError, Result};
pub use navrank_traits::{
    Date, MetricRow, PriceSeries, SchemeCode, SchemeRef, ScoredRow, ScoredTable,
};
pub use navrank_traits::{PriceHistoryProvider, SchemeDirectory, SupplementaryMetadataProvider};

// ============================================================================
// Metric Calculators
// ============================================================================

/// Per-fund metric calculators.
///
/// - **TimeSeriesSanitizer**: parses and windows raw NAV histories
/// - **Rolling returns**: CAGR samples over rolling multi-year windows
/// - **RiskProfile**: Sharpe, beta, beta stability and capture ratios
/// - **Benchmark comparison**: share of windows beating the benchmark
/// - **FundEvaluator**: all of the above for one fund
///
/// ## Consistency
///
/// ```text
/// consistency = clamp(1 - std / mean, 0, 1)   if mean > 0
///             = 0                             otherwise
/// ```
pub mod eval {
    pub use navrank_eval::*;
}

// ============================================================================
// Scoring
// ============================================================================

/// Cross-sectional normalization and weighted ranking.
///
/// # Example
///
/// ```ignore
/// use navrank::combine::{ScoreWeights, Scorer, WeightedScorer};
///
/// let scorer = WeightedScorer::with_weights(ScoreWeights::default());
/// let table = scorer.score(rows)?;
/// ```
pub mod combine {
    pub use navrank_combine::*;
}

pub use navrank_combine::{ScoreWeights, Scorer, WeightedScorer};

// ============================================================================
// Data Providers
// ============================================================================

/// MFAPI and Kuvera HTTP clients.
///
/// ## Setup
///
/// No API key is needed. Set `NAVRANK_API_BASE_URL` to use a mirror.
pub mod mfapi {
    pub use navrank_mfapi::*;
}

// ============================================================================
// Pipelines
// ============================================================================

/// Engine configuration and the concurrent pipelines.
pub mod pipeline {
    pub use navrank_pipeline::*;
}

pub use navrank_pipeline::{
    BatchScoringPipeline, BenchmarkRegistry, EngineConfig, LumpsumXirrPipeline, ScreenRequest,
};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use navrank::prelude::*;
/// ```
pub mod prelude {
    pub use crate::traits::*;
    pub use crate::{
        BatchScoringPipeline, BenchmarkRegistry, EngineConfig, LumpsumXirrPipeline,
        ScoreWeights, Scorer, ScreenRequest, WeightedScorer,
    };
}

// ============================================================================
// Tests
// ============================================================================
