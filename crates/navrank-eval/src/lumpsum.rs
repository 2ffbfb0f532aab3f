//! Single-period annualized (lump-sum XIRR) returns.

use chrono::Duration;
use navrank_traits::{Date, PricePoint, PriceSeries, stats::annualized_return};
use serde::{Deserialize, Serialize};

/// Default tolerance, in days, between the as-of date and the latest price.
pub const DEFAULT_STALENESS_DAYS: i64 = 5;

/// Annualized return between the first and last observation of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumpsumReturn {
    /// Oldest observation used.
    pub start: PricePoint,
    /// Most recent observation used.
    pub end: PricePoint,
    /// Calendar days between the two.
    pub elapsed_days: i64,
    /// `(end / start)^(365.25 / elapsed_days) - 1`.
    pub annualized: f64,
}

impl LumpsumReturn {
    /// Compute the lump-sum return of `series`.
    ///
    /// Returns `None` for an empty series, a degenerate window
    /// (`elapsed_days <= 0`) or a non-finite result.
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        let (start, end) = (*series.first()?, *series.last()?);
        let elapsed_days = (end.date - start.date).num_days();
        if elapsed_days <= 0 {
            return None;
        }
        let annualized = annualized_return(start.price, end.price, elapsed_days);
        annualized.is_finite().then_some(Self {
            start,
            end,
            elapsed_days,
            annualized,
        })
    }
}

/// Whether a series whose newest point is `latest` is too old at `as_of`.
pub fn is_stale(latest: Date, as_of: Date, staleness_days: i64) -> bool {
    latest < as_of - Duration::days(staleness_days)
}
