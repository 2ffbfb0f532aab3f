//! Composite score weight table.

use navrank_traits::{NavRankError, Result};
use serde::{Deserialize, Serialize};

/// Tolerance on the sum of the weights.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weights of the normalized sub-metrics in the composite score.
///
/// The defaults sum to exactly 1.0. AUM has no weight; it is carried for
/// display only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Rolling-return consistency
    pub consistency: f64,
    /// Sharpe ratio
    pub sharpe: f64,
    /// Upside capture
    pub upside_capture: f64,
    /// Downside capture (inverted)
    pub downside_capture: f64,
    /// Benchmark outperformance fraction
    pub benchmark_outperformance: f64,
    /// Beta stability
    pub beta_stability: f64,
    /// Expense ratio (inverted)
    pub expense_ratio: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            consistency: 0.25,
            sharpe: 0.20,
            upside_capture: 0.15,
            downside_capture: 0.15,
            benchmark_outperformance: 0.10,
            beta_stability: 0.05,
            expense_ratio: 0.10,
        }
    }
}

impl ScoreWeights {
    /// `(metric, weight, inverted)` triples in table order.
    pub const fn entries(&self) -> [(&'static str, f64, bool); 7] {
        [
            ("consistency", self.consistency, false),
            ("sharpe", self.sharpe, false),
            ("upside_capture", self.upside_capture, false),
            ("downside_capture", self.downside_capture, true),
            ("benchmark_outperformance", self.benchmark_outperformance, false),
            ("beta_stability", self.beta_stability, false),
            ("expense_ratio", self.expense_ratio, true),
        ]
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.entries().iter().map(|(_, w, _)| w).sum()
    }

    /// Check that every weight is finite and non-negative and that they sum to 1.
    ///
    /// # Errors
    ///
    /// Returns [`NavRankError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        for (name, weight, _) in self.entries() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(NavRankError::Config(format!(
                    "weight '{name}' must be a non-negative number, got {weight}"
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(NavRankError::Config(format!(
                "score weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}
