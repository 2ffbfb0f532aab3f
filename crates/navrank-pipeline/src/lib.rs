//! Batch pipelines for the navrank fund scoring engine.
//!
//! This crate wires the metric calculators and the scorer to the provider
//! traits:
//! - [`BatchScoringPipeline`]: rolling-metric screening of one category
//!   against its benchmark, ranked by weighted composite score
//! - [`LumpsumXirrPipeline`]: one annualized return per scheme over the
//!   whole universe, with category-grouped views
//!
//! Both fan per-fund work out over a bounded worker pool. A fund that cannot
//! be evaluated becomes a [`FundOutcome::Rejected`] entry in the
//! [`RunSummary`]; only universe and benchmark failures abort a run.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use navrank_pipeline::{BatchScoringPipeline, EngineConfig, ScreenRequest};
//!
//! let config = Arc::new(EngineConfig::load(None)?);
//! let pipeline = BatchScoringPipeline::new(directory, prices, config)
//!     .with_registry(registry);
//! let run = pipeline
//!     .run(&ScreenRequest::new("Equity Scheme - Large Cap Fund", as_of))
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod batch;
pub mod config;
pub mod grouping;
pub mod lumpsum;
pub mod outcome;
pub mod pool;
pub mod registry;
pub mod universe;

#[cfg(test)]
mod testing;

// Re-export key types
pub use batch::{BatchScoringPipeline, ScoringRun, ScreenRequest};
pub use config::{ApiConfig, ConcurrencyConfig, EngineConfig, ScanConfig, ScreenConfig};
pub use grouping::{CategoryGroup, group_top_overall, group_top_per_category, rank_by_xirr};
pub use lumpsum::{LumpsumRow, LumpsumRun, LumpsumXirrPipeline, sort_by_code};
pub use outcome::{FundOutcome, RejectReason, RunSummary};
pub use registry::{BenchmarkRegistry, CategoryFamily};
