//! Scan command implementation.

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Args;
use navrank_pipeline::{
    CategoryGroup, EngineConfig, LumpsumXirrPipeline, group_top_overall, group_top_per_category,
    sort_by_code,
};
use tracing::info;

use crate::{data, export};

/// Arguments of `navrank scan`.
#[derive(Debug, Args)]
pub(crate) struct ScanArgs {
    /// Process only the first N schemes of the universe
    #[arg(short, long)]
    pub(crate) limit: Option<usize>,

    /// Schemes fetched in parallel
    #[arg(short, long)]
    pub(crate) workers: Option<usize>,

    /// Evaluation date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub(crate) as_of: Option<String>,

    /// Directory for the JSON chunks and grouped reports
    #[arg(short, long, default_value = ".")]
    pub(crate) out_dir: PathBuf,

    /// Groups to print per view
    #[arg(long, default_value_t = 5)]
    pub(crate) show: usize,
}

impl ScanArgs {
    fn apply(&self, config: &mut EngineConfig) {
        if let Some(limit) = self.limit {
            config.scan.scheme_limit = Some(limit);
        }
        if let Some(workers) = self.workers {
            config.concurrency.workers = workers;
        }
    }
}

/// Compute lump-sum XIRR for the universe and persist the results.
pub(crate) async fn run_scan(mut config: EngineConfig, args: ScanArgs) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;
    let as_of = data::resolve_as_of(args.as_of.as_deref())?;
    let config = Arc::new(config);

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Lump-sum XIRR Scan                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("As of:    {as_of}");
    println!("Lookback: {} year(s)", config.scan.lookback_years);
    match config.scan.scheme_limit {
        Some(limit) => println!("Limit:    first {limit} schemes"),
        None => println!("Limit:    none"),
    }
    println!();

    let mfapi = data::mfapi_client(&config)?;
    let pipeline = LumpsumXirrPipeline::new(mfapi.clone(), mfapi, config.clone());
    let mut run = pipeline.run(as_of).await?;

    println!(
        "Considered {} | computed {} | skipped {}",
        run.summary.considered, run.summary.scored, run.summary.rejected
    );
    for (reason, count) in &run.summary.by_reason {
        println!("  {:<22} {count}", reason.to_string());
    }
    println!();

    let per_category = group_top_per_category(&run.rows, config.scan.group_top_n);
    let overall = group_top_overall(&run.rows, config.scan.overall_top_n);

    sort_by_code(&mut run.rows);
    let chunks = export::write_chunks(&run.rows, config.scan.chunk_size, &args.out_dir)?;
    export::write_json(&per_category, &args.out_dir.join("top_per_category.json"))?;
    export::write_json(&overall, &args.out_dir.join("top_overall.json"))?;
    info!(
        chunks = chunks.len(),
        rows = run.rows.len(),
        dir = %args.out_dir.display(),
        "Persisted scan results"
    );

    print_groups(
        &format!("TOP {} PER CATEGORY", config.scan.group_top_n),
        &per_category,
        args.show,
    );
    print_groups(
        &format!("TOP {} OVERALL", config.scan.overall_top_n),
        &overall,
        args.show,
    );

    for path in &chunks {
        println!("Wrote {}", path.display());
    }
    println!();
    Ok(())
}

fn print_groups(title: &str, groups: &[CategoryGroup], show: usize) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{title}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    for group in groups.iter().take(show) {
        println!(
            "{} [{}] ({} funds)",
            group.title,
            group.family.description(),
            group.rows.len()
        );
        println!("{}", "─".repeat(60));
        for row in group.rows.iter().take(3) {
            println!("  {:<8} {:<40} {:>8.2}%", row.code.as_str(), row.name, row.xirr * 100.0);
        }
        println!();
    }
    if groups.len() > show {
        println!("... {} more categories in the JSON report\n", groups.len() - show);
    }
}
