//! Client construction and argument helpers for the navrank CLI.

use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDate};
use navrank_mfapi::{HttpConfig, KuveraClient, MfApiClient};
use navrank_pipeline::EngineConfig;
use navrank_traits::NavRankError;

/// HTTP settings derived from the engine configuration.
///
/// The idle pool matches the worker count so every worker can keep a
/// connection alive.
pub(crate) fn http_config(config: &EngineConfig) -> HttpConfig {
    HttpConfig {
        timeout: config.concurrency.request_timeout(),
        retries: config.api.retries,
        backoff: Duration::from_millis(config.api.backoff_ms),
        pool_size: config.concurrency.workers,
    }
}

/// MFAPI client for listings and NAV histories.
pub(crate) fn mfapi_client(config: &EngineConfig) -> anyhow::Result<Arc<MfApiClient>> {
    Ok(Arc::new(MfApiClient::new(
        config.api.base_url.as_str(),
        http_config(config),
    )?))
}

/// Kuvera client for expense ratio, AUM, manager and rating.
pub(crate) fn metadata_client(config: &EngineConfig) -> anyhow::Result<Arc<KuveraClient>> {
    Ok(Arc::new(KuveraClient::new(
        config.api.metadata_base_url.as_str(),
        http_config(config),
    )?))
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate, NavRankError> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|e| NavRankError::InvalidDate(format!("{date_str:?}: {e}")))
}

/// The `--as-of` date, or today in local time.
pub(crate) fn resolve_as_of(arg: Option<&str>) -> Result<NaiveDate, NavRankError> {
    arg.map_or_else(|| Ok(Local::now().date_naive()), parse_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(matches!(parse_date("15-01-2024"), Err(NavRankError::InvalidDate(_))));
        assert!(parse_date("invalid").is_err());
    }

    #[test]
    fn test_resolve_as_of() {
        assert_eq!(
            resolve_as_of(Some("2024-06-28")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
        );
        assert!(resolve_as_of(None).is_ok());
    }

    #[test]
    fn test_http_config_follows_engine_config() {
        let mut config = EngineConfig::default();
        config.concurrency.workers = 8;
        config.api.backoff_ms = 250;
        let http = http_config(&config);
        assert_eq!(http.pool_size, 8);
        assert_eq!(http.backoff, Duration::from_millis(250));
        assert_eq!(http.timeout, Duration::from_secs(30));
        assert_eq!(http.retries, 3);
    }
}
