//! Rolling-metric screening of one category against its benchmark.
//!
//! A run resolves and fetches the benchmark first, lists the universe, keeps
//! direct-growth candidates, evaluates them on a bounded worker pool and
//! finally normalizes and ranks the surviving rows in one batch.

use std::{sync::Arc, time::Duration};

use navrank_combine::{Scorer, WeightedScorer};
use navrank_eval::{FundEvaluator, TimeSeriesSanitizer, is_stale};
use navrank_traits::{
    Date, DateRange, FundMetadata, MetricRow, NavRankError, NoSupplementaryMetadata,
    PriceHistoryProvider, PriceSeries, Result, SchemeCode, SchemeDirectory, SchemeRef,
    ScoredTable, SupplementaryMetadataProvider,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    outcome::{FundOutcome, RejectReason, RunSummary},
    pool::{run_bounded, with_timeout},
    registry::BenchmarkRegistry,
    universe::{fetch_universe, screen_candidates},
};

/// What to screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRequest {
    /// Exact scheme category, e.g. `"Equity Scheme - Large Cap Fund"`.
    pub category: String,
    /// Evaluation date.
    pub as_of: Date,
    /// Benchmark scheme used instead of the registry entry.
    pub benchmark_override: Option<SchemeCode>,
}

impl ScreenRequest {
    /// Screen `category` as of `as_of` with the registry benchmark.
    pub fn new(category: impl Into<String>, as_of: Date) -> Self {
        Self {
            category: category.into(),
            as_of,
            benchmark_override: None,
        }
    }
}

/// Result of a screening run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRun {
    /// Ranked funds.
    pub table: ScoredTable,
    /// What happened to every candidate.
    pub summary: RunSummary,
    /// Benchmark scheme the run was measured against.
    pub benchmark: SchemeCode,
}

/// Concurrent screener over a scheme universe.
pub struct BatchScoringPipeline {
    directory: Arc<dyn SchemeDirectory>,
    prices: Arc<dyn PriceHistoryProvider>,
    metadata: Arc<dyn SupplementaryMetadataProvider>,
    registry: BenchmarkRegistry,
    scorer: Arc<dyn Scorer>,
    config: Arc<EngineConfig>,
}

impl std::fmt::Debug for BatchScoringPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScoringPipeline")
            .field("registry", &self.registry)
            .field("scorer", &self.scorer.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BatchScoringPipeline {
    /// Create a pipeline with no supplementary metadata, an empty benchmark
    /// registry and a [`WeightedScorer`] using the configured weights.
    pub fn new(
        directory: Arc<dyn SchemeDirectory>,
        prices: Arc<dyn PriceHistoryProvider>,
        config: Arc<EngineConfig>,
    ) -> Self {
        let scorer = Arc::new(WeightedScorer::with_weights(config.weights));
        Self {
            directory,
            prices,
            metadata: Arc::new(NoSupplementaryMetadata),
            registry: BenchmarkRegistry::new(),
            scorer,
            config,
        }
    }

    /// Use `metadata` for expense ratio, AUM, manager and rating.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Arc<dyn SupplementaryMetadataProvider>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Use `registry` to resolve benchmarks.
    #[must_use]
    pub fn with_registry(mut self, registry: BenchmarkRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the scoring strategy.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Screen the whole universe.
    ///
    /// # Errors
    ///
    /// Returns [`NavRankError::BenchmarkUnavailable`] or
    /// [`NavRankError::Upstream`]; per-fund failures only show in the summary.
    pub async fn run(&self, request: &ScreenRequest) -> Result<ScoringRun> {
        let benchmark = self.load_benchmark(request).await?;

        let universe =
            fetch_universe(self.directory.as_ref(), self.config.concurrency.page_size).await?;
        let candidates = screen_candidates(&universe, self.config.screen.candidate_cap());
        info!(
            universe = universe.len(),
            candidates = candidates.len(),
            "Screened direct-growth candidates"
        );

        self.score(request, benchmark, candidates).await
    }

    /// Screen an explicit candidate list, skipping the universe listing.
    ///
    /// # Errors
    ///
    /// Returns [`NavRankError::BenchmarkUnavailable`] if the benchmark cannot
    /// be resolved.
    pub async fn run_candidates(
        &self,
        request: &ScreenRequest,
        candidates: Vec<SchemeRef>,
    ) -> Result<ScoringRun> {
        let benchmark = self.load_benchmark(request).await?;
        self.score(request, benchmark, candidates).await
    }

    async fn load_benchmark(&self, request: &ScreenRequest) -> Result<PriceSeries> {
        let code = match &request.benchmark_override {
            Some(code) => code.clone(),
            None => self.registry.resolve(&request.category).cloned().ok_or_else(|| {
                NavRankError::BenchmarkUnavailable(format!(
                    "no benchmark mapped for {:?} and no default",
                    request.category
                ))
            })?,
        };

        let sanitizer = TimeSeriesSanitizer::new(request.as_of, self.config.screen.sanitizer());
        let range = DateRange {
            start: sanitizer.window_start(),
            end: request.as_of,
        };
        let history = with_timeout(
            self.config.concurrency.request_timeout(),
            "benchmark history",
            self.prices.get_history(&code, Some(range)),
        )
        .await
        .map_err(|e| NavRankError::BenchmarkUnavailable(format!("{code}: {e}")))?
        .ok_or_else(|| NavRankError::BenchmarkUnavailable(format!("{code}: no history")))?;

        let series = sanitizer.sanitize(&code, history).ok_or_else(|| {
            NavRankError::BenchmarkUnavailable(format!(
                "{code}: fewer than {} valid points in window",
                self.config.screen.min_history_points
            ))
        })?;
        info!(benchmark = %code, points = series.len(), "Loaded benchmark");
        Ok(series)
    }

    async fn score(
        &self,
        request: &ScreenRequest,
        benchmark: PriceSeries,
        candidates: Vec<SchemeRef>,
    ) -> Result<ScoringRun> {
        let benchmark_code = benchmark.id().clone();
        let sanitizer = TimeSeriesSanitizer::new(request.as_of, self.config.screen.sanitizer());
        let ctx = Arc::new(FundContext {
            prices: self.prices.clone(),
            metadata: self.metadata.clone(),
            evaluator: FundEvaluator::new(Arc::new(benchmark), self.config.screen.evaluator()),
            range: DateRange {
                start: sanitizer.window_start(),
                end: request.as_of,
            },
            sanitizer,
            category: request.category.trim().to_string(),
            min_points: self.config.screen.min_history_points,
            staleness_days: self.config.staleness_days,
            timeout: self.config.concurrency.request_timeout(),
        });

        info!(
            category = %request.category,
            as_of = %request.as_of,
            candidates = candidates.len(),
            workers = self.config.concurrency.workers,
            "Starting screen"
        );
        let outcomes = run_bounded(candidates, self.config.concurrency.workers, |scheme| {
            let ctx = ctx.clone();
            async move { ctx.evaluate(scheme).await }
        })
        .await;

        let mut summary = RunSummary::default();
        let mut rows = Vec::new();
        for outcome in outcomes {
            summary.record(&outcome);
            match outcome {
                FundOutcome::Scored(row) => rows.push(row),
                FundOutcome::Rejected {
                    code,
                    reason,
                    detail,
                } => debug!(code = %code, reason = %reason, detail = %detail, "Rejected fund"),
            }
        }

        let limit = self.config.screen.fund_limit;
        if rows.len() > limit {
            summary.capped = rows.len() - limit;
            rows.truncate(limit);
        }

        let table = self.scorer.score(rows)?;
        info!(
            scored = summary.scored,
            rejected = summary.rejected,
            capped = summary.capped,
            ranked = table.len(),
            "Screen complete"
        );
        Ok(ScoringRun {
            table,
            summary,
            benchmark: benchmark_code,
        })
    }
}

/// Read-only state shared by every fund task of one run.
struct FundContext {
    prices: Arc<dyn PriceHistoryProvider>,
    metadata: Arc<dyn SupplementaryMetadataProvider>,
    evaluator: FundEvaluator,
    sanitizer: TimeSeriesSanitizer,
    range: DateRange,
    category: String,
    min_points: usize,
    staleness_days: i64,
    timeout: Duration,
}

impl FundContext {
    async fn evaluate(&self, scheme: SchemeRef) -> FundOutcome<MetricRow> {
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

        let category = history
            .metadata
            .scheme_category
            .as_deref()
            .unwrap_or_default()
            .trim();
        if category != self.category {
            return FundOutcome::rejected(
                code,
                RejectReason::CategoryMismatch,
                format!("category {category:?}"),
            );
        }

        let points = self.sanitizer.clean_points(&history.points);
        let Some(latest) = points.last().map(|p| p.date) else {
            return FundOutcome::rejected(code, RejectReason::NoData, "no valid points in window");
        };
        if points.len() < self.min_points {
            return FundOutcome::rejected(
                code,
                RejectReason::InsufficientHistory,
                format!("{} points, need {}", points.len(), self.min_points),
            );
        }
        if is_stale(latest, self.sanitizer.as_of(), self.staleness_days) {
            return FundOutcome::rejected(code, RejectReason::Stale, format!("latest NAV {latest}"));
        }

        let series = PriceSeries::new(code.clone(), history.metadata, points);
        let metadata = self.supplementary(&series).await;
        match self.evaluator.evaluate(&scheme, &series, &metadata) {
            Ok(row) => FundOutcome::Scored(row),
            Err(e) => FundOutcome::rejected(code, RejectReason::InsufficientHistory, e.to_string()),
        }
    }

    async fn supplementary(&self, series: &PriceSeries) -> FundMetadata {
        let isin = series.metadata().isin_growth.as_deref().unwrap_or_default();
        if isin.is_empty() {
            return FundMetadata::default();
        }
        with_timeout(self.timeout, "metadata", self.metadata.get_metadata(isin))
            .await
            .unwrap_or_else(|e| {
                debug!(code = %series.id(), error = %e, "Metadata unavailable, using defaults");
                FundMetadata::default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn as_of() -> Date {
        date(2024, 6, 28)
    }

    fn config() -> Arc<EngineConfig> {
        let mut config = EngineConfig::default();
        config.concurrency.workers = 4;
        config.concurrency.request_timeout_secs = 1;
        Arc::new(config)
    }

    fn registry() -> BenchmarkRegistry {
        let mut registry = BenchmarkRegistry::new();
        registry.insert("default", "bench");
        registry
    }

    fn good(growth: f64) -> Behavior {
        Behavior::History(weekly_history(LARGE_CAP, as_of(), 110, 100.0, growth))
    }

    fn direct(code: &str) -> SchemeRef {
        SchemeRef::new(code, format!("Fund {code} - Direct Plan - Growth"))
    }

    fn pipeline(directory: Vec<SchemeRef>, prices: FakePrices) -> BatchScoringPipeline {
        BatchScoringPipeline::new(
            Arc::new(FakeDirectory(directory)),
            Arc::new(prices.with("bench", good(0.002))),
            config(),
        )
        .with_registry(registry())
    }

    #[tokio::test]
    async fn test_fetch_errors_become_rejections() {
        let mut prices = FakePrices::default();
        let mut schemes = Vec::new();
        for i in 0..10 {
            let code = format!("{}", 100 + i);
            prices = if i % 3 == 1 {
                prices.with(&code, Behavior::Fail)
            } else {
                prices.with(&code, good(0.001 + 0.0002 * f64::from(i)))
            };
            schemes.push(direct(&code));
        }

        let run = pipeline(schemes, prices)
            .run(&ScreenRequest::new(LARGE_CAP, as_of()))
            .await
            .unwrap();

        assert_eq!(run.table.len(), 7);
        assert_eq!(run.summary.considered, 10);
        assert_eq!(run.summary.scored, 7);
        assert_eq!(run.summary.rejections(RejectReason::FetchFailed), 3);
        assert_eq!(run.benchmark.as_str(), "bench");
        let ranks: Vec<usize> = run.table.rows().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, (1..=7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_short_history_is_rejected() {
        let prices = FakePrices::default().with("201", good(0.002)).with(
            "202",
            Behavior::History(weekly_history(LARGE_CAP, as_of(), 40, 10.0, 0.003)),
        );
        let run = pipeline(vec![direct("201"), direct("202")], prices)
            .run(&ScreenRequest::new(LARGE_CAP, as_of()))
            .await
            .unwrap();

        assert_eq!(run.table.len(), 1);
        assert_eq!(run.table.rows()[0].metrics.code.as_str(), "201");
        assert_eq!(run.summary.rejections(RejectReason::InsufficientHistory), 1);
    }

    #[tokio::test]
    async fn test_rejection_reasons() {
        let stale_end = as_of() - chrono::Duration::days(30);
        let prices = FakePrices::default()
            .with("1", good(0.002))
            .with(
                "2",
                Behavior::History(weekly_history(
                    "Debt Scheme - Liquid Fund",
                    as_of(),
                    110,
                    10.0,
                    0.001,
                )),
            )
            .with(
                "3",
                Behavior::History(weekly_history(LARGE_CAP, stale_end, 110, 10.0, 0.001)),
            )
            .with("4", Behavior::Missing)
            .with("5", Behavior::Panic)
            .with("6", Behavior::Hang);
        let schemes = (1..=6).map(|i| direct(&i.to_string())).collect();

        let run = pipeline(schemes, prices)
            .run(&ScreenRequest::new(LARGE_CAP, as_of()))
            .await
            .unwrap();

        assert_eq!(run.summary.scored, 1);
        assert_eq!(run.summary.rejections(RejectReason::CategoryMismatch), 1);
        assert_eq!(run.summary.rejections(RejectReason::Stale), 1);
        assert_eq!(run.summary.rejections(RejectReason::NoData), 1);
        assert_eq!(run.summary.rejections(RejectReason::TaskFailed), 1);
        assert_eq!(run.summary.rejections(RejectReason::FetchFailed), 1);
    }

    #[tokio::test]
    async fn test_candidate_filter_and_cap() {
        let mut config = EngineConfig::default();
        config.screen.fund_limit = 2;
        config.screen.overfetch_factor = 2;
        let mut prices = FakePrices::default().with("bench", good(0.002));
        let mut schemes = vec![SchemeRef::new("99", "Fund 99 - Regular Plan - Growth")];
        for i in 1..=6 {
            let code = i.to_string();
            prices = prices.with(&code, good(0.001 * f64::from(i)));
            schemes.push(direct(&code));
        }
        let run = BatchScoringPipeline::new(
            Arc::new(FakeDirectory(schemes)),
            Arc::new(prices),
            Arc::new(config),
        )
        .with_registry(registry())
        .run(&ScreenRequest::new(LARGE_CAP, as_of()))
        .await
        .unwrap();

        // 4 candidates (regular plan skipped), first 2 scored kept
        assert_eq!(run.summary.considered, 4);
        assert_eq!(run.summary.capped, 2);
        let mut codes: Vec<&str> = run.table.rows().iter().map(|r| r.metrics.code.as_str()).collect();
        codes.sort_unstable();
        assert_eq!(codes, ["1", "2"]);
    }

    #[tokio::test]
    async fn test_runs_are_idempotent() {
        let mut prices = FakePrices::default();
        let mut schemes = Vec::new();
        for i in 0..8 {
            let code = format!("30{i}");
            // pairs of identical funds force the code tie-break
            prices = prices.with(&code, good(0.001 + 0.0005 * f64::from(i / 2)));
            schemes.push(direct(&code));
        }
        let pipeline = pipeline(schemes, prices);
        let request = ScreenRequest::new(LARGE_CAP, as_of());

        let first = pipeline.run(&request).await.unwrap();
        let second = pipeline.run(&request).await.unwrap();
        assert_eq!(first.table, second.table);

        let rows = first.table.rows();
        for pair in rows.windows(2) {
            assert!(pair[0].score >= pair[1].score);
            if pair[0].score == pair[1].score {
                assert!(pair[0].metrics.code < pair[1].metrics.code);
            }
        }
    }

    #[tokio::test]
    async fn test_long_history_scores_rolling_metrics() {
        // ~4.4 years of weekly data: room for many 3-year windows inside the 5-year lookback
        const WEEKS: usize = 230;
        let long = |growth: f64| {
            Behavior::History(weekly_history(LARGE_CAP, as_of(), WEEKS, 100.0, growth))
        };
        let regime_change = weekly_history_with(LARGE_CAP, as_of(), WEEKS, 100.0, |week| {
            if week < WEEKS / 2 { 0.004 } else { 0.0 }
        });
        let prices = FakePrices::default()
            .with("bench", long(0.002))
            .with("1", long(0.003))
            .with("2", long(0.001))
            .with("3", Behavior::History(regime_change));
        let run = BatchScoringPipeline::new(
            Arc::new(FakeDirectory(vec![direct("1"), direct("2"), direct("3")])),
            Arc::new(prices),
            config(),
        )
        .with_registry(registry())
        .run(&ScreenRequest::new(LARGE_CAP, as_of()))
        .await
        .unwrap();

        assert_eq!(run.table.len(), 3);
        let metrics = |code: &str| {
            run.table
                .rows()
                .iter()
                .find(|r| r.metrics.code.as_str() == code)
                .map(|r| r.metrics.clone())
                .unwrap()
        };

        let steady_winner = metrics("1");
        assert!(steady_winner.consistency > 0.99);
        assert_eq!(steady_winner.benchmark_outperformance, 1.0);
        assert!(steady_winner.mean_rolling_return > 0.15);

        let steady_loser = metrics("2");
        assert!(steady_loser.consistency > 0.99);
        assert_eq!(steady_loser.benchmark_outperformance, 0.0);

        let switcher = metrics("3");
        assert!(switcher.consistency > 0.0 && switcher.consistency < 1.0);
        assert!(switcher.rolling_std > 0.0);
        assert!(
            switcher.benchmark_outperformance > 0.0 && switcher.benchmark_outperformance < 1.0
        );

        assert_eq!(run.table.rows()[0].metrics.code.as_str(), "1");
    }

    #[tokio::test]
    async fn test_metadata_flows_into_rows() {
        let prices = FakePrices::default().with("1", good(0.002));
        let meta = FundMetadata {
            expense_ratio: Some(0.62),
            aum: Some(1200.0),
            manager: Some("A. Manager".into()),
            rating: None,
        };
        let run = pipeline(vec![direct("1")], prices)
            .with_metadata(Arc::new(FixedMetadata(meta)))
            .run(&ScreenRequest::new(LARGE_CAP, as_of()))
            .await
            .unwrap();
        let row = &run.table.rows()[0].metrics;
        assert_eq!(row.expense_ratio, 0.62);
        assert_eq!(row.aum, 1200.0);
        assert_eq!(row.fund_manager, "A. Manager");
        assert_eq!(row.rating, "");
    }

    #[tokio::test]
    async fn test_benchmark_unavailable() {
        let prices = FakePrices::default().with("1", good(0.002));
        let pipeline = BatchScoringPipeline::new(
            Arc::new(FakeDirectory(vec![direct("1")])),
            Arc::new(prices),
            config(),
        );
        let request = ScreenRequest::new(LARGE_CAP, as_of());

        // no mapping at all
        let err = pipeline.run(&request).await.unwrap_err();
        assert!(matches!(err, NavRankError::BenchmarkUnavailable(_)));

        // mapped, but the benchmark has no data
        let mut registry = BenchmarkRegistry::new();
        registry.insert(LARGE_CAP, "missing");
        let err = pipeline.with_registry(registry).run(&request).await.unwrap_err();
        assert!(matches!(err, NavRankError::BenchmarkUnavailable(_)));
    }

    #[tokio::test]
    async fn test_benchmark_override_and_upstream_failure() {
        let prices = FakePrices::default().with("alt", good(0.001)).with("1", good(0.002));
        let pipeline = BatchScoringPipeline::new(
            Arc::new(DownDirectory),
            Arc::new(prices),
            config(),
        );
        let mut request = ScreenRequest::new(LARGE_CAP, as_of());
        request.benchmark_override = Some("alt".into());

        let err = pipeline.run(&request).await.unwrap_err();
        assert!(matches!(err, NavRankError::Upstream(_)));

        let run = pipeline.run_candidates(&request, vec![direct("1")]).await.unwrap();
        assert_eq!(run.benchmark.as_str(), "alt");
        assert_eq!(run.table.len(), 1);
    }
}
