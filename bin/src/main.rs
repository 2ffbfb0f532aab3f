//! navrank CLI binary.
//!
//! Provides command-line access to the fund screener and the lump-sum scan.

mod cmd;
mod data;
mod export;

use std::{path::PathBuf, process};

use anyhow::Result;
use clap::{Parser, Subcommand};
use navrank_pipeline::EngineConfig;
use tracing_subscriber::EnvFilter;

use crate::cmd::{scan::ScanArgs, screen::ScreenArgs};

#[derive(Parser)]
#[command(name = "navrank")]
#[command(about = "Mutual fund screening and ranking on NAV history", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (JSON). Defaults to ./navrank.json when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the funds of one category against its benchmark
    Screen(ScreenArgs),

    /// Compute lump-sum XIRR for every scheme and persist the rows
    Scan(ScanArgs),

    /// Show the composite score weights
    Weights,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Screen(args) => cmd::screen::run_screen(config, args).await?,
        Commands::Scan(args) => cmd::scan::run_scan(config, args).await?,
        Commands::Weights => cmd::weights::show_weights(&config),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_screen() {
        let cli = Cli::try_parse_from([
            "navrank",
            "screen",
            "--category",
            "Equity Scheme - Large Cap Fund",
            "--risk-free-rate",
            "7",
            "--top-n",
            "5",
        ])
        .unwrap();
        match cli.command {
            Commands::Screen(args) => {
                assert_eq!(args.category, "Equity Scheme - Large Cap Fund");
                assert_eq!(args.risk_free_rate, Some(7.0));
                assert_eq!(args.top_n, Some(5));
                assert!(args.csv.is_none());
            }
            _ => panic!("expected screen"),
        }
    }

    #[test]
    fn test_parse_scan_with_global_config() {
        let cli =
            Cli::try_parse_from(["navrank", "scan", "--limit", "100", "-c", "cfg.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        match cli.command {
            Commands::Scan(args) => assert_eq!(args.limit, Some(100)),
            _ => panic!("expected scan"),
        }
    }
}
