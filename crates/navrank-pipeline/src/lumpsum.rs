//! Lump-sum XIRR scan over the whole scheme universe.
//!
//! Every scheme's NAV over the last year (by default) is reduced to one
//! annualized return between its first and last observation.

use std::{sync::Arc, time::Duration};

use navrank_eval::{LumpsumReturn, TimeSeriesSanitizer, is_stale};
use navrank_traits::{
    Date, DateRange, PriceHistoryProvider, Result, SchemeCode, SchemeDirectory, SchemeRef,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    outcome::{FundOutcome, RejectReason, RunSummary},
    pool::{run_bounded, with_timeout},
    universe::fetch_universe,
};

/// One scheme's lump-sum return with its identifying metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpsumRow {
    /// Scheme code.
    pub code: SchemeCode,
    /// Scheme name.
    pub name: String,
    /// Annualized return between the two NAVs.
    pub xirr: f64,
    /// Asset management company.
    pub fund_house: Option<String>,
    /// Scheme type.
    pub scheme_type: Option<String>,
    /// Scheme category.
    pub scheme_category: Option<String>,
    /// ISIN of the growth option.
    pub isin_growth: Option<String>,
    /// ISIN of the dividend-reinvestment option.
    pub isin_div_reinvestment: Option<String>,
    /// Most recent NAV in the window.
    pub latest_nav: f64,
    /// Date of `latest_nav`.
    pub latest_nav_date: Date,
    /// Oldest NAV in the window.
    pub prev_year_nav: f64,
    /// Date of `prev_year_nav`.
    pub prev_year_nav_date: Date,
}

/// Result of a lump-sum scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LumpsumRun {
    /// Rows in universe order.
    pub rows: Vec<LumpsumRow>,
    /// What happened to every scheme.
    pub summary: RunSummary,
}

/// Concurrent lump-sum scan.
pub struct LumpsumXirrPipeline {
    directory: Arc<dyn SchemeDirectory>,
    prices: Arc<dyn PriceHistoryProvider>,
    config: Arc<EngineConfig>,
}

impl std::fmt::Debug for LumpsumXirrPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LumpsumXirrPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LumpsumXirrPipeline {
    /// Create a scan pipeline.
    pub const fn new(
        directory: Arc<dyn SchemeDirectory>,
        prices: Arc<dyn PriceHistoryProvider>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            directory,
            prices,
            config,
        }
    }

    /// Scan the universe, honoring `scan.scheme_limit`.
    ///
    /// # Errors
    ///
    /// Returns [`navrank_traits::NavRankError::Upstream`] if the scheme list
    /// cannot be fetched.
    pub async fn run(&self, as_of: Date) -> Result<LumpsumRun> {
        let mut schemes =
            fetch_universe(self.directory.as_ref(), self.config.concurrency.page_size).await?;
        if let Some(limit) = self.config.scan.scheme_limit {
            schemes.truncate(limit);
        }
        Ok(self.run_schemes(as_of, schemes).await)
    }

    /// Scan an explicit scheme list.
    pub async fn run_schemes(&self, as_of: Date, schemes: Vec<SchemeRef>) -> LumpsumRun {
        let sanitizer = TimeSeriesSanitizer::new(as_of, self.config.scan.sanitizer());
        let ctx = Arc::new(ScanContext {
            prices: self.prices.clone(),
            range: DateRange {
                start: sanitizer.window_start(),
                end: as_of,
            },
            sanitizer,
            staleness_days: self.config.staleness_days,
            timeout: self.config.concurrency.request_timeout(),
        });

        info!(schemes = schemes.len(), %as_of, "Starting lump-sum scan");
        let outcomes = run_bounded(schemes, self.config.concurrency.workers, |scheme| {
            let ctx = ctx.clone();
            async move { ctx.evaluate(scheme).await }
        })
        .await;

        let mut run = LumpsumRun::default();
        for outcome in outcomes {
            run.summary.record(&outcome);
            match outcome {
                FundOutcome::Scored(row) => run.rows.push(row),
                FundOutcome::Rejected {
                    code,
                    reason,
                    detail,
                } => debug!(code = %code, reason = %reason, detail = %detail, "Skipped scheme"),
            }
        }
        info!(
            scored = run.summary.scored,
            rejected = run.summary.rejected,
            "Lump-sum scan complete"
        );
        run
    }
}

struct ScanContext {
    prices: Arc<dyn PriceHistoryProvider>,
    sanitizer: TimeSeriesSanitizer,
    range: DateRange,
    staleness_days: i64,
    timeout: Duration,
}

impl ScanContext {
    async fn evaluate(&self, scheme: SchemeRef) -> FundOutcome<LumpsumRow> {
        let code = &scheme.code;
        let history = match with_timeout(
            self.timeout,
            "NAV history",
            self.prices.get_history(code, Some(self.range)),
        )
        .await
        {
            Ok(Some(history)) => history,
            Ok(None) => return FundOutcome::rejected(code, RejectReason::NoData, "no history"),
            Err(e) => return FundOutcome::rejected(code, RejectReason::FetchFailed, e.to_string()),
        };

        let Some(series) = self.sanitizer.sanitize(code, history) else {
            return FundOutcome::rejected(code, RejectReason::NoData, "no valid points in window");
        };
        let Some(ret) = LumpsumReturn::from_series(&series) else {
            return FundOutcome::rejected(
                code,
                RejectReason::DegenerateWindow,
                "first and last NAV share a date",
            );
        };
        if is_stale(ret.end.date, self.sanitizer.as_of(), self.staleness_days) {
            return FundOutcome::rejected(
                code,
                RejectReason::Stale,
                format!("latest NAV {}", ret.end.date),
            );
        }

        let meta = series.metadata().clone();
        let name = if scheme.name.trim().is_empty() {
            meta.scheme_name.clone().unwrap_or_default()
        } else {
            scheme.name.clone()
        };
        FundOutcome::Scored(LumpsumRow {
            code: code.clone(),
            name,
            xirr: ret.annualized,
            fund_house: meta.fund_house,
            scheme_type: meta.scheme_type,
            scheme_category: meta.scheme_category,
            isin_growth: meta.isin_growth,
            isin_div_reinvestment: meta.isin_div_reinvestment,
            latest_nav: ret.end.price,
            latest_nav_date: ret.end.date,
            prev_year_nav: ret.start.price,
            prev_year_nav_date: ret.start.date,
        })
    }
}

/// Sort rows by scheme code.
///
/// Codes compare as strings, the same order used to break ranking ties.
pub fn sort_by_code(rows: &mut [LumpsumRow]) {
    rows.sort_by(|a, b| a.code.cmp(&b.code));
}
