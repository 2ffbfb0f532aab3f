//! Engine configuration.
//!
//! [`EngineConfig`] is built once at start-up and passed by `Arc` into the
//! pipelines. Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. a JSON file (`navrank.json` in the working directory, or an explicit path)
//! 3. `NAVRANK_CONFIG_JSON`, a whole JSON document merged over the file
//! 4. individual variables: `NAVRANK_SCHEME_LIMIT`, `NAVRANK_WORKERS`,
//!    `NAVRANK_API_BASE_URL`
//!
//! Command-line flags are applied on top by the binary.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use navrank_combine::ScoreWeights;
use navrank_eval::{
    DEFAULT_STALENESS_DAYS, EvaluatorConfig, MIN_MONTHLY_POINTS, MIN_ROLLING_POINTS,
    SanitizerConfig,
};
use navrank_traits::{NavRankError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "navrank.json";

/// Whole-document JSON override.
pub const CONFIG_JSON_ENV: &str = "NAVRANK_CONFIG_JSON";

/// Scheme limit override for the lump-sum scan.
pub const SCHEME_LIMIT_ENV: &str = "NAVRANK_SCHEME_LIMIT";

/// Worker pool width override.
pub const WORKERS_ENV: &str = "NAVRANK_WORKERS";

/// MFAPI base URL override.
pub const API_BASE_URL_ENV: &str = "NAVRANK_API_BASE_URL";

/// Settings of the rolling-metric screener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// NAV lookback in years.
    pub lookback_years: u32,
    /// Rolling CAGR window in years.
    pub rolling_window_years: u32,
    /// Annual risk-free rate as a fraction.
    pub risk_free_rate: f64,
    /// Fewest sanitized NAV points per fund (and for the benchmark).
    pub min_history_points: usize,
    /// Fewest monthly returns per fund.
    pub min_monthly_points: usize,
    /// Most funds entering normalization.
    pub fund_limit: usize,
    /// Candidates fetched per requested fund, to absorb category filtering.
    pub overfetch_factor: usize,
    /// Rows shown by the CLI.
    pub top_n: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            lookback_years: 5,
            rolling_window_years: 3,
            risk_free_rate: 0.065,
            min_history_points: MIN_ROLLING_POINTS,
            min_monthly_points: MIN_MONTHLY_POINTS,
            fund_limit: 50,
            overfetch_factor: 10,
            top_n: 10,
        }
    }
}

impl ScreenConfig {
    /// Sanitizer settings for fund and benchmark histories.
    pub const fn sanitizer(&self) -> SanitizerConfig {
        SanitizerConfig {
            lookback_years: self.lookback_years,
            min_points: self.min_history_points,
        }
    }

    /// Evaluator settings.
    pub const fn evaluator(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            rolling_window_years: self.rolling_window_years,
            risk_free_rate: self.risk_free_rate,
            min_monthly_points: self.min_monthly_points,
        }
    }

    /// Size of the candidate list handed to the worker pool.
    pub const fn candidate_cap(&self) -> usize {
        self.fund_limit.saturating_mul(self.overfetch_factor)
    }
}

/// Settings of the lump-sum scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// NAV lookback in years.
    pub lookback_years: u32,
    /// Process only the first N schemes of the universe.
    pub scheme_limit: Option<usize>,
    /// Rows kept per category group.
    pub group_top_n: usize,
    /// Rows kept in the overall ranking.
    pub overall_top_n: usize,
    /// Rows per persisted JSON chunk.
    pub chunk_size: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback_years: 1,
            scheme_limit: None,
            group_top_n: 20,
            overall_top_n: 200,
            chunk_size: 5000,
        }
    }
}

impl ScanConfig {
    /// Sanitizer settings: any single valid point is kept.
    pub const fn sanitizer(&self) -> SanitizerConfig {
        SanitizerConfig {
            lookback_years: self.lookback_years,
            min_points: 1,
        }
    }
}

/// Worker pool and request settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcurrencyConfig {
    /// Funds evaluated in parallel.
    pub workers: usize,
    /// Per provider call timeout in seconds.
    pub request_timeout_secs: u64,
    /// Scheme directory page size.
    pub page_size: usize,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            workers: 25,
            request_timeout_secs: 30,
            page_size: 1000,
        }
    }
}

impl ConcurrencyConfig {
    /// Per provider call timeout.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Upstream API endpoints and retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// MFAPI base URL.
    pub base_url: String,
    /// Supplementary metadata base URL.
    pub metadata_base_url: String,
    /// Retries for transient HTTP failures.
    pub retries: u32,
    /// Initial retry backoff in milliseconds.
    pub backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mfapi.in".to_string(),
            metadata_base_url: "https://mf.captnemo.in/kuvera".to_string(),
            retries: 3,
            backoff_ms: 500,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Screener settings.
    pub screen: ScreenConfig,
    /// Lump-sum scan settings.
    pub scan: ScanConfig,
    /// Worker pool settings.
    pub concurrency: ConcurrencyConfig,
    /// Upstream API settings.
    pub api: ApiConfig,
    /// Reject funds whose latest NAV is older than this many days.
    pub staleness_days: i64,
    /// Composite score weights.
    pub weights: ScoreWeights,
    /// Category to benchmark mapping file.
    pub benchmark_map: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen: ScreenConfig::default(),
            scan: ScanConfig::default(),
            concurrency: ConcurrencyConfig::default(),
            api: ApiConfig::default(),
            staleness_days: DEFAULT_STALENESS_DAYS,
            weights: ScoreWeights::default(),
            benchmark_map: None,
        }
    }
}

impl EngineConfig {
    /// Load defaults, the config file, then environment overrides.
    ///
    /// An explicit `path` must exist; the default `navrank.json` is optional.
    /// A `.env` file is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns [`NavRankError::Config`] for unreadable or invalid sources.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let mut doc = serde_json::to_value(Self::default()).map_err(config_err)?;

        let file = match path {
            Some(p) => Some(std::fs::read_to_string(p).map_err(|e| {
                NavRankError::Config(format!("cannot read {}: {e}", p.display()))
            })?),
            None => std::fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
        };
        if let Some(text) = file {
            merge_json(&mut doc, serde_json::from_str(&text).map_err(config_err)?);
        }
        if let Ok(text) = std::env::var(CONFIG_JSON_ENV) {
            merge_json(&mut doc, serde_json::from_str(&text).map_err(config_err)?);
        }

        let mut config: Self = serde_json::from_value(doc).map_err(config_err)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`NavRankError::Config`] if the document is invalid.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let mut doc = serde_json::to_value(Self::default()).map_err(config_err)?;
        merge_json(&mut doc, serde_json::from_str(text).map_err(config_err)?);
        let config: Self = serde_json::from_value(doc).map_err(config_err)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the individual environment overrides through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`NavRankError::Config`] if a numeric variable does not parse.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(SCHEME_LIMIT_ENV).filter(|v| !v.trim().is_empty()) {
            self.scan.scheme_limit = Some(parse_env(SCHEME_LIMIT_ENV, &raw)?);
        }
        if let Some(raw) = lookup(WORKERS_ENV).filter(|v| !v.trim().is_empty()) {
            self.concurrency.workers = parse_env(WORKERS_ENV, &raw)?;
        }
        if let Some(url) = lookup(API_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        Ok(())
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`NavRankError::Config`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if self.concurrency.workers == 0 {
            return Err(NavRankError::Config("workers must be at least 1".into()));
        }
        if self.concurrency.page_size == 0 {
            return Err(NavRankError::Config("page_size must be at least 1".into()));
        }
        if self.screen.lookback_years == 0 || self.scan.lookback_years == 0 {
            return Err(NavRankError::Config("lookback_years must be at least 1".into()));
        }
        if self.screen.rolling_window_years == 0 {
            return Err(NavRankError::Config(
                "rolling_window_years must be at least 1".into(),
            ));
        }
        if !self.screen.risk_free_rate.is_finite() {
            return Err(NavRankError::Config("risk_free_rate must be finite".into()));
        }
        if self.staleness_days < 0 {
            return Err(NavRankError::Config("staleness_days must not be negative".into()));
        }
        if self.scan.chunk_size == 0 {
            return Err(NavRankError::Config("chunk_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Recursively merge `overlay` into `base`; objects merge, everything else replaces.
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| NavRankError::Config(format!("{key}={raw:?} is not a valid number")))
}

fn config_err(err: serde_json::Error) -> NavRankError {
    NavRankError::Config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.concurrency.workers, 25);
        assert_eq!(config.staleness_days, 5);
        assert_eq!(config.screen.candidate_cap(), 500);
        assert_eq!(config.screen.sanitizer().min_points, 60);
        assert_eq!(config.scan.sanitizer().min_points, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_nested_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{"screen": {"fund_limit": 20}, "concurrency": {"workers": 8}}"#,
        )
        .unwrap();
        assert_eq!(config.screen.fund_limit, 20);
        assert_eq!(config.screen.lookback_years, 5);
        assert_eq!(config.concurrency.workers, 8);
        assert_eq!(config.concurrency.page_size, 1000);
    }

    #[test]
    fn test_invalid_documents() {
        assert!(EngineConfig::from_json_str(r#"{"concurrency": {"workers": 0}}"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{"weights": {"sharpe": 0.9}}"#).is_err());
        assert!(EngineConfig::from_json_str("{oops").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (SCHEME_LIMIT_ENV, "300"),
            (WORKERS_ENV, " 12 "),
            (API_BASE_URL_ENV, "http://localhost:8080"),
        ]
        .into_iter()
        .collect();
        let mut config = EngineConfig::default();
        config
            .apply_env(|k| vars.get(k).map(|v| (*v).to_string()))
            .unwrap();
        assert_eq!(config.scan.scheme_limit, Some(300));
        assert_eq!(config.concurrency.workers, 12);
        assert_eq!(config.api.base_url, "http://localhost:8080");

        let mut config = EngineConfig::default();
        let err = config.apply_env(|k| (k == WORKERS_ENV).then(|| "many".to_string()));
        assert!(matches!(err, Err(NavRankError::Config(_))));
    }

    #[test]
    fn test_merge_json() {
        let mut base = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 3});
        merge_json(&mut base, serde_json::json!({"a": {"y": 5}, "c": 4}));
        assert_eq!(base, serde_json::json!({"a": {"x": 1, "y": 5}, "b": 3, "c": 4}));
    }
}
