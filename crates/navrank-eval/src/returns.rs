//! Monthly and rolling-window return calculations.
//!
//! Monthly returns sample the last observation of every calendar month and take
//! simple returns between consecutive sampled months. Rolling returns scan every
//! observation as a window start and annualize the move to the first observation
//! on or after `start + window_years` calendar years.

use chrono::{Datelike, Months};
use navrank_traits::{
    Date, MonthlyReturn, MonthlyReturnSeries, PriceSeries,
    stats::{annualized_return, mean, population_std},
};
use serde::{Deserialize, Serialize};

/// Windows spanning fewer calendar days than this are skipped.
pub const MIN_WINDOW_DAYS: i64 = 300;

/// Summary of the rolling CAGR samples of one series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingReturns {
    /// Annualized return of every accepted window, in scan order.
    pub samples: Vec<f64>,
    /// Mean of `samples`, `0.0` when there are none.
    pub mean: f64,
    /// Population standard deviation of `samples`, `0.0` when there are none.
    pub std: f64,
    /// Consistency score in [0, 1].
    pub consistency: f64,
}

impl RollingReturns {
    /// Summarize a set of rolling CAGR samples.
    pub fn from_samples(samples: Vec<f64>) -> Self {
        let (mean, std) = match (mean(&samples), population_std(&samples)) {
            (Some(m), Some(s)) => (m, s),
            _ => return Self::default(),
        };
        Self {
            consistency: consistency_score(mean, std),
            samples,
            mean,
            std,
        }
    }

    /// Number of accepted windows.
    pub fn window_count(&self) -> usize {
        self.samples.len()
    }
}

/// Rolling-return consistency, clipped to [0, 1].
///
/// `1 - std / mean` for a positive mean; a non-positive mean scores 0 so a
/// steadily losing fund is never rewarded for steadiness.
pub fn consistency_score(mean: f64, std: f64) -> f64 {
    if mean > 0.0 {
        (1.0 - std / mean).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// End date of a window that starts at `start` and spans `years` calendar years.
///
/// Feb 29 rolls back to Feb 28 in non-leap target years.
pub fn window_end(start: Date, years: u32) -> Option<Date> {
    start.checked_add_months(Months::new(years.saturating_mul(12)))
}

/// Last calendar day of the month containing `date`.
pub fn month_end(date: Date) -> Date {
    let next_month = if date.month() == 12 {
        Date::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        Date::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    next_month
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

/// Simple returns between consecutive month-end samples.
///
/// Each month is represented by its last observation. The first month has no
/// predecessor and produces no return.
pub fn monthly_returns(series: &PriceSeries) -> MonthlyReturnSeries {
    let mut month_closes: Vec<(Date, f64)> = Vec::new();
    for point in series.points() {
        let key = month_end(point.date);
        match month_closes.last_mut() {
            Some((last_key, price)) if *last_key == key => *price = point.price,
            _ => month_closes.push((key, point.price)),
        }
    }

    let returns = month_closes
        .windows(2)
        .map(|w| MonthlyReturn {
            month_end: w[1].0,
            value: w[1].1 / w[0].1 - 1.0,
        })
        .filter(|r| r.value.is_finite())
        .collect();
    MonthlyReturnSeries::new(returns)
}

/// Annualized returns of every rolling window of `window_years` years.
///
/// Scanning stops at the first start whose window end lies beyond the last
/// observation, since every later start would too.
pub fn rolling_cagr_samples(series: &PriceSeries, window_years: u32) -> Vec<f64> {
    let points = series.points();
    let mut samples = Vec::new();

    for start in points {
        let Some(end_date) = window_end(start.date, window_years) else {
            break;
        };
        let Some(end_idx) = series.first_index_on_or_after(end_date) else {
            break;
        };
        let end = &points[end_idx];
        let elapsed = (end.date - start.date).num_days();
        if elapsed < MIN_WINDOW_DAYS {
            continue;
        }
        let cagr = annualized_return(start.price, end.price, elapsed);
        if cagr.is_finite() {
            samples.push(cagr);
        }
    }

    samples
}

/// Rolling CAGR samples of `series` together with their summary statistics.
pub fn rolling_returns(series: &PriceSeries, window_years: u32) -> RollingReturns {
    RollingReturns::from_samples(rolling_cagr_samples(series, window_years))
}
