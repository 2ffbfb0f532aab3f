//! MFAPI client implementation.

use async_trait::async_trait;
use navrank_traits::{
    DateRange, PriceHistory, PriceHistoryProvider, SchemeCode, SchemeDirectory, SchemeRef,
};
use std::env;

use crate::{
    Result,
    http::{HttpConfig, HttpFetcher},
    types::{NavHistoryResponse, SchemeListEntry},
};

/// Base URL of the public MFAPI service.
pub const MFAPI_BASE_URL: &str = "https://api.mfapi.in";

/// Environment variable overriding the MFAPI base URL.
pub const BASE_URL_ENV: &str = "NAVRANK_API_BASE_URL";

/// Client for the MFAPI scheme listing and NAV history endpoints.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct MfApiClient {
    http: HttpFetcher,
    base_url: String,
}

impl MfApiClient {
    /// Create a client against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend).
    pub fn new(base_url: impl Into<String>, config: HttpConfig) -> Result<Self> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from `NAVRANK_API_BASE_URL`, falling back to the public
    /// service.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_env(config: HttpConfig) -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = env::var(BASE_URL_ENV).unwrap_or_else(|_| MFAPI_BASE_URL.to_string());
        Self::new(base_url, config)
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The connection and retry settings.
    pub const fn http_config(&self) -> &HttpConfig {
        self.http.config()
    }

    fn schemes_url(&self, offset: usize, limit: usize) -> String {
        format!("{}/mf?limit={limit}&offset={offset}", self.base_url)
    }

    fn history_url(&self, code: &SchemeCode, range: Option<DateRange>) -> String {
        match range {
            Some(r) => format!(
                "{}/mf/{code}?startDate={}&endDate={}",
                self.base_url,
                r.start.format("%Y-%m-%d"),
                r.end.format("%Y-%m-%d"),
            ),
            None => format!("{}/mf/{code}", self.base_url),
        }
    }

    /// Fetch one page of the scheme listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries.
    pub async fn scheme_page(&self, offset: usize, limit: usize) -> Result<Vec<SchemeRef>> {
        let entries: Option<Vec<SchemeListEntry>> =
            self.http.get_json(&self.schemes_url(offset, limit)).await?;
        Ok(entries
            .unwrap_or_default()
            .into_iter()
            .map(SchemeRef::from)
            .collect())
    }

    /// Fetch the NAV history of one scheme, optionally for a date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries or the body is malformed.
    pub async fn nav_history(
        &self,
        code: &SchemeCode,
        range: Option<DateRange>,
    ) -> Result<Option<PriceHistory>> {
        let body: Option<NavHistoryResponse> =
            self.http.get_json(&self.history_url(code, range)).await?;
        Ok(body.and_then(NavHistoryResponse::into_history))
    }
}

#[async_trait]
impl SchemeDirectory for MfApiClient {
    async fn list_schemes(&self, offset: usize, limit: usize) -> navrank_traits::Result<Vec<SchemeRef>> {
        Ok(self.scheme_page(offset, limit).await?)
    }
}

#[async_trait]
impl PriceHistoryProvider for MfApiClient {
    async fn get_history(
        &self,
        code: &SchemeCode,
        range: Option<DateRange>,
    ) -> navrank_traits::Result<Option<PriceHistory>> {
        Ok(self.nav_history(code, range).await?)
    }
}
