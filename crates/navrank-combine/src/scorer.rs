//! Weighted composite scoring and ranking.

use std::cmp::Ordering;

use ndarray::Array1;
use navrank_traits::{MetricRow, NormalizedMetrics, Result, ScoredRow, ScoredTable};
use serde::{Deserialize, Serialize};

use crate::{normalize::MetricColumn, weights::ScoreWeights};

/// Turns a batch of metric rows into a ranked table.
///
/// Scoring is a batch operation: every row of a run must be present, since
/// normalization bounds depend on the whole cross-section. Implementations
/// must be thread-safe (Send + Sync).
pub trait Scorer: Send + Sync {
    /// Normalize, score and rank `rows`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scorer's configuration is invalid.
    fn score(&self, rows: Vec<MetricRow>) -> Result<ScoredTable>;

    /// Name of this scoring strategy.
    fn name(&self) -> &str;
}

/// Configuration for [`WeightedScorer`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightedScorerConfig {
    /// Weight table applied to the normalized metrics
    pub weights: ScoreWeights,
}

/// Min-max normalizes each metric and ranks by the weighted sum.
///
/// Ranking is by composite score descending with scheme code ascending as
/// the explicit tie-break, so the result never depends on input order.
///
/// # Examples
///
/// ```rust,ignore
/// use navrank_combine::{Scorer, WeightedScorer};
///
/// let table = WeightedScorer::default().score(rows)?;
/// for row in table.top(10) {
///     println!("{} {} {:.3}", row.rank, row.metrics.name, row.score);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct WeightedScorer {
    config: WeightedScorerConfig,
}

impl WeightedScorer {
    /// Create a new scorer with the given configuration.
    pub const fn new(config: WeightedScorerConfig) -> Self {
        Self { config }
    }

    /// Create a scorer from a weight table.
    pub const fn with_weights(weights: ScoreWeights) -> Self {
        Self::new(WeightedScorerConfig { weights })
    }

    /// The weight table in use.
    pub const fn weights(&self) -> &ScoreWeights {
        &self.config.weights
    }

    fn columns(&self, rows: &[MetricRow]) -> [MetricColumn; 7] {
        let column = |name: &'static str, invert: bool, f: fn(&MetricRow) -> f64| MetricColumn {
            name,
            values: rows.iter().map(f).collect::<Array1<f64>>(),
            invert,
        };
        [
            column("consistency", false, |r| r.consistency),
            column("sharpe", false, |r| r.sharpe),
            column("upside_capture", false, |r| r.upside_capture),
            column("downside_capture", true, |r| r.downside_capture),
            column("benchmark_outperformance", false, |r| r.benchmark_outperformance),
            column("beta_stability", false, |r| r.beta_stability),
            column("expense_ratio", true, |r| r.expense_ratio),
        ]
    }
}

impl Scorer for WeightedScorer {
    fn score(&self, rows: Vec<MetricRow>) -> Result<ScoredTable> {
        self.config.weights.validate()?;
        if rows.is_empty() {
            return Ok(ScoredTable::default());
        }

        let normalized: Vec<Array1<f64>> =
            self.columns(&rows).iter().map(MetricColumn::normalized).collect();

        let mut composite = Array1::<f64>::zeros(rows.len());
        for ((_, weight, _), column) in self.config.weights.entries().iter().zip(&normalized) {
            composite.scaled_add(*weight, column);
        }

        let mut scored: Vec<ScoredRow> = rows
            .into_iter()
            .enumerate()
            .map(|(i, metrics)| ScoredRow {
                rank: 0,
                metrics,
                normalized: NormalizedMetrics {
                    consistency: normalized[0][i],
                    sharpe: normalized[1][i],
                    upside_capture: normalized[2][i],
                    downside_capture: normalized[3][i],
                    benchmark_outperformance: normalized[4][i],
                    beta_stability: normalized[5][i],
                    expense_ratio: normalized[6][i],
                },
                score: composite[i],
            })
            .collect();

        scored.sort_by(rank_order);
        for (i, row) in scored.iter_mut().enumerate() {
            row.rank = i + 1;
        }
        Ok(ScoredTable::new(scored))
    }

    fn name(&self) -> &str {
        "weighted"
    }
}

/// Score descending, then scheme code ascending.
fn rank_order(a: &ScoredRow, b: &ScoredRow) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.metrics.code.cmp(&b.metrics.code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(code: &str, consistency: f64, sharpe: f64, expense: f64) -> MetricRow {
        MetricRow {
            code: code.into(),
            name: format!("Fund {code}"),
            isin: String::new(),
            category: "Equity Scheme - Flexi Cap Fund".to_string(),
            fund_manager: String::new(),
            rating: String::new(),
            mean_rolling_return: 0.1,
            rolling_std: 0.02,
            consistency,
            sharpe,
            beta: 1.0,
            beta_stability: 1.0,
            upside_capture: 1.0,
            downside_capture: 1.0,
            benchmark_outperformance: 0.5,
            expense_ratio: expense,
            aum: 0.0,
        }
    }

    #[test]
    fn test_single_row_is_neutral() {
        let table = WeightedScorer::default().score(vec![row("1", 0.9, 1.2, 0.5)]).unwrap();
        assert_eq!(table.len(), 1);
        let scored = &table.rows()[0];
        assert_eq!(scored.rank, 1);
        assert_relative_eq!(scored.score, 0.5, epsilon = 1e-12);
        assert_relative_eq!(scored.normalized.sharpe, 0.5);
    }

    #[test]
    fn test_empty_batch() {
        assert!(WeightedScorer::default().score(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_ranking_and_inversion() {
        let rows = vec![
            row("a", 0.2, 0.5, 1.5),
            row("b", 0.9, 1.5, 0.5),
            row("c", 0.5, 1.0, 1.0),
        ];
        let table = WeightedScorer::default().score(rows).unwrap();
        let codes: Vec<&str> = table.rows().iter().map(|r| r.metrics.code.as_str()).collect();
        assert_eq!(codes, vec!["b", "c", "a"]);

        let best = &table.rows()[0];
        assert_relative_eq!(best.normalized.consistency, 1.0);
        assert_relative_eq!(best.normalized.expense_ratio, 1.0);
        // constant columns contribute 0.5 each: 0.15 + 0.15 + 0.10 + 0.05
        assert_relative_eq!(best.score, 0.25 + 0.20 + 0.10 + 0.5 * 0.45, epsilon = 1e-12);

        let ranks: Vec<usize> = table.rows().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        for r in table.rows() {
            assert!((0.0..=1.0).contains(&r.score));
        }
    }

    #[test]
    fn test_ties_break_on_scheme_code() {
        let rows = vec![
            row("300", 0.5, 1.0, 1.0),
            row("100", 0.5, 1.0, 1.0),
            row("200", 0.5, 1.0, 1.0),
        ];
        let table = WeightedScorer::default().score(rows).unwrap();
        let codes: Vec<&str> = table.rows().iter().map(|r| r.metrics.code.as_str()).collect();
        assert_eq!(codes, vec!["100", "200", "300"]);
    }

    #[test]
    fn test_invalid_weights_error() {
        let scorer = WeightedScorer::with_weights(ScoreWeights {
            consistency: 0.9,
            ..Default::default()
        });
        assert!(scorer.score(vec![row("1", 0.5, 1.0, 1.0)]).is_err());
        assert_eq!(scorer.name(), "weighted");
    }
}
