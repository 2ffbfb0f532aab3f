//! NAV history sanitation.
//!
//! Turns the raw `(date, price)` strings of a provider payload into a clean,
//! chronologically ordered [`PriceSeries`] restricted to a lookback window.
//! Malformed rows are dropped silently; the caller decides whether the
//! surviving length is enough.

use chrono::Duration;
use navrank_traits::{Date, PriceHistory, PricePoint, PriceSeries, RawPricePoint, SchemeCode};
use serde::{Deserialize, Serialize};

/// Minimum number of points for rolling-metric evaluation.
pub const MIN_ROLLING_POINTS: usize = 60;

/// Day-first formats tried in order, with ISO as a last resort.
const DATE_FORMATS: [&str; 4] = ["%d-%m-%Y", "%d/%m/%Y", "%d-%b-%Y", "%Y-%m-%d"];

/// Configuration for [`TimeSeriesSanitizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizerConfig {
    /// Length of the lookback window in years (365 days each).
    pub lookback_years: u32,
    /// Fewest surviving points for the series to be usable.
    pub min_points: usize,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            lookback_years: 5,
            min_points: MIN_ROLLING_POINTS,
        }
    }
}

/// Cleans raw price histories relative to a fixed as-of date.
#[derive(Debug, Clone, Copy)]
pub struct TimeSeriesSanitizer {
    as_of: Date,
    config: SanitizerConfig,
}

impl TimeSeriesSanitizer {
    /// Create a sanitizer anchored at `as_of`.
    pub const fn new(as_of: Date, config: SanitizerConfig) -> Self {
        Self { as_of, config }
    }

    /// The as-of date.
    pub const fn as_of(&self) -> Date {
        self.as_of
    }

    /// First date inside the lookback window.
    pub fn window_start(&self) -> Date {
        self.as_of - Duration::days(365 * i64::from(self.config.lookback_years))
    }

    /// Parse, filter and sort the observations of one history.
    ///
    /// Returns `None` (the empty sentinel) when fewer than `min_points`
    /// valid points remain, or when nothing remains at all.
    pub fn sanitize(&self, id: &SchemeCode, history: PriceHistory) -> Option<PriceSeries> {
        let points = self.clean_points(&history.points);
        if points.is_empty() || points.len() < self.config.min_points {
            return None;
        }
        Some(PriceSeries::new(id.clone(), history.metadata, points))
    }

    /// The valid, in-window points of `raw`, oldest first.
    pub fn clean_points(&self, raw: &[RawPricePoint]) -> Vec<PricePoint> {
        let start = self.window_start();
        let mut points: Vec<PricePoint> = raw
            .iter()
            .filter_map(|p| {
                let date = parse_nav_date(&p.date)?;
                let price = parse_price(&p.price)?;
                Some(PricePoint::new(date, price))
            })
            .filter(|p| p.price > 0.0)
            .filter(|p| p.date >= start && p.date <= self.as_of)
            .collect();
        // stable: duplicate dates keep upstream order
        points.sort_by_key(|p| p.date);
        points
    }
}

/// Parse a day-first NAV date such as `"31-12-2024"`.
pub fn parse_nav_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| Date::parse_from_str(raw, fmt).ok())
}

/// Coerce a price string to a finite number.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
