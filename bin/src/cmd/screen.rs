//! Screen command implementation.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use clap::Args;
use navrank_pipeline::{
    BatchScoringPipeline, BenchmarkRegistry, EngineConfig, RejectReason, RunSummary, ScoringRun,
    ScreenRequest,
};
use navrank_traits::SchemeCode;
use serde_json::json;
use tracing::info;

use crate::{data, export};

/// Benchmark map looked up in the working directory when none is configured.
const DEFAULT_BENCHMARK_MAP: &str = "benchmark_map.json";

/// Arguments of `navrank screen`.
#[derive(Debug, Args)]
pub(crate) struct ScreenArgs {
    /// Exact scheme category, e.g. "Equity Scheme - Large Cap Fund"
    #[arg(long)]
    pub(crate) category: String,

    /// NAV lookback in years
    #[arg(long)]
    pub(crate) lookback: Option<u32>,

    /// Rolling CAGR window in years
    #[arg(long)]
    pub(crate) rolling_window: Option<u32>,

    /// Annual risk-free rate in percent
    #[arg(long)]
    pub(crate) risk_free_rate: Option<f64>,

    /// Rows to print
    #[arg(short = 'n', long)]
    pub(crate) top_n: Option<usize>,

    /// Most funds entering the ranking
    #[arg(long)]
    pub(crate) fund_limit: Option<usize>,

    /// Funds evaluated in parallel
    #[arg(short, long)]
    pub(crate) workers: Option<usize>,

    /// Evaluation date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub(crate) as_of: Option<String>,

    /// Benchmark scheme code, overriding the benchmark map
    #[arg(short, long)]
    pub(crate) benchmark: Option<String>,

    /// Category to benchmark JSON map
    #[arg(long)]
    pub(crate) benchmark_map: Option<PathBuf>,

    /// Write the full ranked table as CSV
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,

    /// Write the full ranked table and run summary as JSON
    #[arg(long)]
    pub(crate) json: Option<PathBuf>,
}

impl ScreenArgs {
    fn apply(&self, config: &mut EngineConfig) {
        if let Some(years) = self.lookback {
            config.screen.lookback_years = years;
        }
        if let Some(years) = self.rolling_window {
            config.screen.rolling_window_years = years;
        }
        if let Some(pct) = self.risk_free_rate {
            config.screen.risk_free_rate = pct / 100.0;
        }
        if let Some(n) = self.top_n {
            config.screen.top_n = n;
        }
        if let Some(limit) = self.fund_limit {
            config.screen.fund_limit = limit;
        }
        if let Some(workers) = self.workers {
            config.concurrency.workers = workers;
        }
        if let Some(path) = &self.benchmark_map {
            config.benchmark_map = Some(path.clone());
        }
    }
}

/// Rank the funds of one category.
pub(crate) async fn run_screen(mut config: EngineConfig, args: ScreenArgs) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;
    let as_of = data::resolve_as_of(args.as_of.as_deref())?;
    let registry = load_registry(&config)?;
    let config = Arc::new(config);

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                      Fund Screener                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Category:       {}", args.category);
    println!("As of:          {as_of}");
    println!(
        "Lookback:       {} years (rolling window {} years)",
        config.screen.lookback_years, config.screen.rolling_window_years
    );
    println!("Risk-free rate: {:.2}%", config.screen.risk_free_rate * 100.0);
    println!();

    let mfapi = data::mfapi_client(&config)?;
    let kuvera = data::metadata_client(&config)?;
    let pipeline = BatchScoringPipeline::new(mfapi.clone(), mfapi, config.clone())
        .with_metadata(kuvera)
        .with_registry(registry);

    let mut request = ScreenRequest::new(args.category.as_str(), as_of);
    request.benchmark_override = args.benchmark.as_deref().map(SchemeCode::new);

    let run = pipeline.run(&request).await?;

    print_table(&run, config.screen.top_n);
    print_summary(&run.summary);

    if let Some(path) = &args.csv {
        export::write_csv(&run.table, path)?;
        info!(path = %path.display(), "Wrote CSV");
    }
    if let Some(path) = &args.json {
        let doc = json!({
            "category": request.category,
            "as_of": as_of,
            "benchmark": run.benchmark,
            "summary": run.summary,
            "rows": run.table.rows(),
        });
        export::write_json(&doc, path)?;
        info!(path = %path.display(), "Wrote JSON");
    }

    Ok(())
}

/// The configured benchmark map, `./benchmark_map.json`, or an empty registry.
fn load_registry(config: &EngineConfig) -> Result<BenchmarkRegistry> {
    if let Some(path) = &config.benchmark_map {
        return Ok(BenchmarkRegistry::from_path(path)?);
    }
    let fallback = Path::new(DEFAULT_BENCHMARK_MAP);
    if fallback.exists() {
        return Ok(BenchmarkRegistry::from_path(fallback)?);
    }
    Ok(BenchmarkRegistry::new())
}

fn print_table(run: &ScoringRun, top_n: usize) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("TOP {} (benchmark {})", top_n.min(run.table.len()), run.benchmark);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    if run.table.is_empty() {
        println!("No fund qualified.\n");
        return;
    }

    println!(
        "{:>4} {:<8} {:<44} {:>7} {:>7} {:>6} {:>6} {:>6} {:>6} {:>7}",
        "Rank", "Code", "Scheme", "Score", "Cons", "Sharpe", "Up", "Down", "Beta", "TER"
    );
    println!("{}", "─".repeat(104));
    for row in run.table.top(top_n) {
        let m = &row.metrics;
        println!(
            "{:>4} {:<8} {:<44} {:>7.3} {:>7.3} {:>6.2} {:>6.2} {:>6.2} {:>6.2} {:>7.2}",
            row.rank,
            m.code.as_str(),
            truncate(&m.name, 44),
            row.score,
            m.consistency,
            m.sharpe,
            m.upside_capture,
            m.downside_capture,
            m.beta,
            m.expense_ratio,
        );
    }
    println!();
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Considered {} | scored {} | rejected {} | capped {}",
        summary.considered, summary.scored, summary.rejected, summary.capped
    );
    for (reason, count) in &summary.by_reason {
        println!("  {:<22} {count}", reason_label(*reason));
    }
    println!();
}

const fn reason_label(reason: RejectReason) -> &'static str {
    match reason {
        RejectReason::NoData => "no data",
        RejectReason::InsufficientHistory => "insufficient history",
        RejectReason::CategoryMismatch => "other category",
        RejectReason::Stale => "stale NAV",
        RejectReason::DegenerateWindow => "degenerate window",
        RejectReason::FetchFailed => "fetch failed",
        RejectReason::TaskFailed => "task failed",
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ScreenArgs {
        ScreenArgs {
            category: "Equity Scheme - Large Cap Fund".into(),
            lookback: Some(7),
            rolling_window: None,
            risk_free_rate: Some(6.5),
            top_n: None,
            fund_limit: Some(30),
            workers: Some(10),
            as_of: None,
            benchmark: None,
            benchmark_map: Some(PathBuf::from("map.json")),
            csv: None,
            json: None,
        }
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = EngineConfig::default();
        args().apply(&mut config);
        assert_eq!(config.screen.lookback_years, 7);
        assert_eq!(config.screen.rolling_window_years, 3);
        assert!((config.screen.risk_free_rate - 0.065).abs() < 1e-12);
        assert_eq!(config.screen.fund_limit, 30);
        assert_eq!(config.concurrency.workers, 10);
        assert_eq!(config.benchmark_map, Some(PathBuf::from("map.json")));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
