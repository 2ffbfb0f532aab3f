//! Rolling-window comparison of a fund against its benchmark.

use navrank_traits::{PriceSeries, stats::annualized_return};

use crate::returns::{MIN_WINDOW_DAYS, window_end};

/// Outperformance fraction reported when no window qualifies.
pub const NEUTRAL_OUTPERFORMANCE: f64 = 0.5;

/// Fraction of rolling windows in which the fund's CAGR beat the benchmark's.
///
/// Windows start at every fund observation. For each start the window end is
/// the first fund observation on or after `start + window_years`; the
/// benchmark is priced at its first observation on or after each of those two
/// dates. Both CAGRs annualize over the fund's elapsed days. The scan stops as
/// soon as either series runs out of data.
pub fn outperformance_fraction(
    fund: &PriceSeries,
    benchmark: &PriceSeries,
    window_years: u32,
) -> f64 {
    let points = fund.points();
    let bench = benchmark.points();
    let (mut wins, mut total) = (0usize, 0usize);

    for start in points {
        let Some(end_date) = window_end(start.date, window_years) else {
            break;
        };
        let Some(end_idx) = fund.first_index_on_or_after(end_date) else {
            break;
        };
        let end = &points[end_idx];

        let (Some(b_start), Some(b_end)) = (
            benchmark.first_index_on_or_after(start.date),
            benchmark.first_index_on_or_after(end.date),
        ) else {
            break;
        };

        let elapsed = (end.date - start.date).num_days();
        if elapsed < MIN_WINDOW_DAYS {
            continue;
        }

        let fund_cagr = annualized_return(start.price, end.price, elapsed);
        let bench_cagr = annualized_return(bench[b_start].price, bench[b_end].price, elapsed);
        if !fund_cagr.is_finite() || !bench_cagr.is_finite() {
            continue;
        }

        total += 1;
        if fund_cagr > bench_cagr {
            wins += 1;
        }
    }

    if total == 0 {
        return NEUTRAL_OUTPERFORMANCE;
    }
    wins as f64 / total as f64
}
