//! Common types used throughout navrank.
//!
//! This module defines the price-series data model consumed by the metric
//! functions, the per-fund [`MetricRow`] they produce, and the cross-sectional
//! [`ScoredTable`] built once every row of a run has been collected.

use derive_more::{Display, From};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::Result;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// Identifier of a mutual-fund scheme (or of a benchmark instrument).
///
/// Ordering is lexicographic on the underlying string and is used as the
/// explicit secondary ranking key.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SchemeCode(String);

impl SchemeCode {
    /// Creates a scheme code from anything string-like.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SchemeCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl AsRef<str> for SchemeCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One entry of the scheme universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeRef {
    /// Scheme identifier.
    pub code: SchemeCode,
    /// Display name as published by the directory.
    pub name: String,
}

impl SchemeRef {
    /// Creates a new scheme reference.
    pub fn new(code: impl Into<SchemeCode>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Inclusive calendar date range used to narrow a history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the range.
    pub start: Date,
    /// Last day of the range.
    pub end: Date,
}

/// An unparsed observation exactly as an upstream provider returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPricePoint {
    /// Day-first date string, e.g. `"31-12-2024"`.
    pub date: String,
    /// Price string, e.g. `"104.2231"`.
    pub price: String,
}

impl RawPricePoint {
    /// Creates a raw observation.
    pub fn new(date: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            price: price.into(),
        }
    }
}

/// Descriptive scheme metadata published alongside a NAV history.
///
/// Every field is optional; adapters map whatever the upstream returned into
/// this struct so metric code never deals with loose dictionaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeMetadata {
    /// Asset management company.
    pub fund_house: Option<String>,
    /// Scheme type, e.g. "Open Ended Schemes".
    pub scheme_type: Option<String>,
    /// Scheme category, e.g. "Equity Scheme - Large Cap Fund".
    pub scheme_category: Option<String>,
    /// Scheme name as carried in the history payload.
    pub scheme_name: Option<String>,
    /// ISIN of the growth option.
    pub isin_growth: Option<String>,
    /// ISIN of the dividend-reinvestment option.
    pub isin_div_reinvestment: Option<String>,
}

/// A raw NAV history: metadata plus unparsed observations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistory {
    /// Scheme metadata.
    pub metadata: SchemeMetadata,
    /// Observations in upstream order (often newest first).
    pub points: Vec<RawPricePoint>,
}

/// Supplementary per-fund metadata (expense ratio, AUM, ...).
///
/// All fields are best-effort; use the `*_or_default` accessors in metric code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundMetadata {
    /// Total expense ratio in percent.
    pub expense_ratio: Option<f64>,
    /// Assets under management.
    pub aum: Option<f64>,
    /// Fund manager name(s).
    pub manager: Option<String>,
    /// Credit/analyst rating.
    pub rating: Option<String>,
}

impl FundMetadata {
    /// Expense ratio, `0.0` when unknown.
    #[must_use]
    pub fn expense_ratio_or_default(&self) -> f64 {
        self.expense_ratio.filter(|v| v.is_finite()).unwrap_or(0.0)
    }

    /// AUM, `0.0` when unknown.
    #[must_use]
    pub fn aum_or_default(&self) -> f64 {
        self.aum.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// A single validated price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date.
    pub date: Date,
    /// Strictly positive price.
    pub price: f64,
}

impl PricePoint {
    /// Creates a price point.
    pub const fn new(date: Date, price: f64) -> Self {
        Self { date, price }
    }
}

/// A chronologically ordered price series for one instrument.
///
/// Construct through the sanitizer in `navrank-eval`, or with [`PriceSeries::new`]
/// when the points are already clean and sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    id: SchemeCode,
    metadata: SchemeMetadata,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Creates a series from points sorted ascending by date.
    pub fn new(id: impl Into<SchemeCode>, metadata: SchemeMetadata, points: Vec<PricePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].date <= w[1].date));
        Self {
            id: id.into(),
            metadata,
            points,
        }
    }

    /// Instrument identifier.
    pub const fn id(&self) -> &SchemeCode {
        &self.id
    }

    /// Metadata carried over from the raw history.
    pub const fn metadata(&self) -> &SchemeMetadata {
        &self.metadata
    }

    /// The observations, oldest first.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Oldest observation.
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Most recent observation.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Index of the first observation dated on or after `date`, if any.
    pub fn first_index_on_or_after(&self, date: Date) -> Option<usize> {
        let idx = self.points.partition_point(|p| p.date < date);
        (idx < self.points.len()).then_some(idx)
    }
}

/// One monthly simple return stamped with its calendar month-end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    /// Last calendar day of the month.
    pub month_end: Date,
    /// Fractional return versus the previous month.
    pub value: f64,
}

/// Month-ordered simple returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyReturnSeries(Vec<MonthlyReturn>);

impl MonthlyReturnSeries {
    /// Wraps month-ordered returns.
    pub fn new(returns: Vec<MonthlyReturn>) -> Self {
        debug_assert!(returns.windows(2).all(|w| w[0].month_end < w[1].month_end));
        Self(returns)
    }

    /// Number of monthly returns.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no returns.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the returns in month order.
    pub fn iter(&self) -> std::slice::Iter<'_, MonthlyReturn> {
        self.0.iter()
    }

    /// The bare return values in month order.
    pub fn values(&self) -> Vec<f64> {
        self.0.iter().map(|r| r.value).collect()
    }

    /// Inner join with `other` on month-end date, yielding `(self, other)` pairs.
    pub fn align(&self, other: &Self) -> Vec<(f64, f64)> {
        let mut out = Vec::with_capacity(self.len().min(other.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            let (a, b) = (&self.0[i], &other.0[j]);
            match a.month_end.cmp(&b.month_end) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push((a.value, b.value));
                    i += 1;
                    j += 1;
                }
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a MonthlyReturnSeries {
    type Item = &'a MonthlyReturn;
    type IntoIter = std::slice::Iter<'a, MonthlyReturn>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Raw metrics for one fund in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    /// Scheme identifier.
    pub code: SchemeCode,
    /// Scheme name.
    pub name: String,
    /// Growth-option ISIN (empty when unknown).
    pub isin: String,
    /// Scheme category.
    pub category: String,
    /// Fund manager (empty when unknown).
    pub fund_manager: String,
    /// Rating (empty when unknown).
    pub rating: String,
    /// Mean of rolling CAGR samples.
    pub mean_rolling_return: f64,
    /// Population standard deviation of rolling CAGR samples.
    pub rolling_std: f64,
    /// Rolling-return consistency in [0, 1].
    pub consistency: f64,
    /// Annualized Sharpe ratio.
    pub sharpe: f64,
    /// Beta versus the run benchmark.
    pub beta: f64,
    /// Penalty-adjusted closeness of beta to 1, in [0, 1].
    pub beta_stability: f64,
    /// Upside capture ratio.
    pub upside_capture: f64,
    /// Downside capture ratio.
    pub downside_capture: f64,
    /// Fraction of rolling windows beating the benchmark.
    pub benchmark_outperformance: f64,
    /// Total expense ratio in percent.
    pub expense_ratio: f64,
    /// Assets under management (display only).
    pub aum: f64,
}

/// Min-max normalized sub-metrics of a scored row, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMetrics {
    /// Normalized consistency.
    pub consistency: f64,
    /// Normalized Sharpe ratio.
    pub sharpe: f64,
    /// Normalized upside capture.
    pub upside_capture: f64,
    /// Inverted normalized downside capture.
    pub downside_capture: f64,
    /// Normalized benchmark outperformance.
    pub benchmark_outperformance: f64,
    /// Normalized beta stability.
    pub beta_stability: f64,
    /// Inverted normalized expense ratio.
    pub expense_ratio: f64,
}

/// A [`MetricRow`] with its normalized columns, composite score and rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    /// 1-based rank, best first.
    pub rank: usize,
    /// Raw metrics.
    pub metrics: MetricRow,
    /// Normalized sub-metrics.
    pub normalized: NormalizedMetrics,
    /// Weighted composite score.
    pub score: f64,
}

/// The ranked cross-sectional result of a scoring run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredTable {
    rows: Vec<ScoredRow>,
}

impl ScoredTable {
    /// Wraps rows that are already ranked.
    pub fn new(rows: Vec<ScoredRow>) -> Self {
        Self { rows }
    }

    /// Ranked rows, best first.
    pub fn rows(&self) -> &[ScoredRow] {
        &self.rows
    }

    /// Number of scored funds.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `n` best rows.
    pub fn top(&self, n: usize) -> &[ScoredRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Consumes the table and returns its rows.
    pub fn into_rows(self) -> Vec<ScoredRow> {
        self.rows
    }

    /// Flattens the table into a Polars DataFrame, one row per fund.
    ///
    /// # Errors
    ///
    /// Returns an error if the DataFrame cannot be assembled.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let rows = self.rows.as_slice();
        let col_f64 = |f: fn(&ScoredRow) -> f64| rows.iter().map(f).collect::<Vec<f64>>();

        let df = df!(
            "rank" => rows.iter().map(|r| r.rank as u32).collect::<Vec<u32>>(),
            "scheme_code" => str_column(rows, |r| r.metrics.code.as_str()),
            "scheme_name" => str_column(rows, |r| r.metrics.name.as_str()),
            "isin" => str_column(rows, |r| r.metrics.isin.as_str()),
            "category" => str_column(rows, |r| r.metrics.category.as_str()),
            "fund_manager" => str_column(rows, |r| r.metrics.fund_manager.as_str()),
            "rating" => str_column(rows, |r| r.metrics.rating.as_str()),
            "mean_rolling_return" => col_f64(|r| r.metrics.mean_rolling_return),
            "rolling_std" => col_f64(|r| r.metrics.rolling_std),
            "consistency" => col_f64(|r| r.metrics.consistency),
            "sharpe" => col_f64(|r| r.metrics.sharpe),
            "beta" => col_f64(|r| r.metrics.beta),
            "beta_stability" => col_f64(|r| r.metrics.beta_stability),
            "upside_capture" => col_f64(|r| r.metrics.upside_capture),
            "downside_capture" => col_f64(|r| r.metrics.downside_capture),
            "benchmark_outperformance" => col_f64(|r| r.metrics.benchmark_outperformance),
            "expense_ratio" => col_f64(|r| r.metrics.expense_ratio),
            "aum" => col_f64(|r| r.metrics.aum),
            "n_consistency" => col_f64(|r| r.normalized.consistency),
            "n_sharpe" => col_f64(|r| r.normalized.sharpe),
            "n_upside" => col_f64(|r| r.normalized.upside_capture),
            "n_downside" => col_f64(|r| r.normalized.downside_capture),
            "n_benchmark" => col_f64(|r| r.normalized.benchmark_outperformance),
            "n_beta" => col_f64(|r| r.normalized.beta_stability),
            "n_expense" => col_f64(|r| r.normalized.expense_ratio),
            "score" => col_f64(|r| r.score),
        )?;
        Ok(df)
    }
}

fn str_column<'a>(rows: &'a [ScoredRow], f: impl Fn(&'a ScoredRow) -> &'a str) -> Vec<&'a str> {
    rows.iter().map(f).collect()
}
