//! Cross-sectional scoring for navrank.
//!
//! This crate turns a batch of per-fund metric rows into a ranked table. Each
//! metric column is min-max normalized across the batch (inverted where a
//! lower raw value is better) and the normalized columns are combined with a
//! fixed weight table.
//!
//! # Examples
//!
//! ```rust,ignore
//! use navrank_combine::{ScoreWeights, Scorer, WeightedScorer};
//!
//! let scorer = WeightedScorer::with_weights(ScoreWeights::default());
//! let table = scorer.score(rows)?;
//! let best = &table.rows()[0];
//! ```

mod normalize;
mod scorer;
mod weights;

// Re-export main types
pub use normalize::{MetricColumn, NEUTRAL_SCORE, normalize};
pub use scorer::{Scorer, WeightedScorer, WeightedScorerConfig};
pub use weights::{ScoreWeights, WEIGHT_SUM_TOLERANCE};
