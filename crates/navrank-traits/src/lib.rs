#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/navrank/navrank/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and collaborator traits for the navrank fund scoring engine.
//!
//! This crate provides the foundational abstractions shared by the metric
//! calculators, the score normalizer and the batch pipelines.

/// The version of the navrank-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod provider;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{NavRankError, Result};
pub use provider::{
    NoSupplementaryMetadata, PriceHistoryProvider, SchemeDirectory, SupplementaryMetadataProvider,
};
pub use types::{
    Date, DateRange, FundMetadata, MetricRow, MonthlyReturn, MonthlyReturnSeries,
    NormalizedMetrics, PriceHistory, PricePoint, PriceSeries, RawPricePoint, SchemeCode,
    SchemeMetadata, SchemeRef, ScoredRow, ScoredTable,
};
