//! Kuvera-style supplementary metadata client.

use async_trait::async_trait;
use navrank_traits::{FundMetadata, SupplementaryMetadataProvider};
use serde_json::{Map, Value};

use crate::{
    Result,
    http::{HttpConfig, HttpFetcher},
};

/// Base URL of the public Kuvera metadata mirror.
pub const KUVERA_BASE_URL: &str = "https://mf.captnemo.in/kuvera";

/// Looks up expense ratio, AUM, manager and rating by ISIN.
#[derive(Debug, Clone)]
pub struct KuveraClient {
    http: HttpFetcher,
    base_url: String,
}

impl KuveraClient {
    /// Create a client against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, config: HttpConfig) -> Result<Self> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the metadata for `isin`. Unknown ISINs yield defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after retries.
    pub async fn fund_metadata(&self, isin: &str) -> Result<FundMetadata> {
        let isin = isin.trim();
        if isin.is_empty() {
            return Ok(FundMetadata::default());
        }
        let body: Option<Value> = self.http.get_json(&format!("{}/{isin}", self.base_url)).await?;
        Ok(body.as_ref().map(metadata_from_value).unwrap_or_default())
    }
}

#[async_trait]
impl SupplementaryMetadataProvider for KuveraClient {
    async fn get_metadata(&self, isin: &str) -> navrank_traits::Result<FundMetadata> {
        Ok(self.fund_metadata(isin).await?)
    }
}

/// Map a Kuvera body (an object, or an array whose first element is one).
///
/// Keys match case-insensitively; numbers may arrive as JSON numbers or
/// numeric strings.
pub fn metadata_from_value(value: &Value) -> FundMetadata {
    let object = match value {
        Value::Array(items) => items.first().and_then(Value::as_object),
        Value::Object(map) => Some(map),
        _ => None,
    };
    let Some(object) = object else {
        return FundMetadata::default();
    };

    FundMetadata {
        expense_ratio: lookup(object, &["expense_ratio", "ter"]).and_then(as_number),
        aum: lookup(object, &["aum"]).and_then(as_number),
        manager: lookup(object, &["fund_manager", "manager"]).and_then(as_text),
        rating: lookup(object, &["crisil_rating", "rating"]).and_then(as_text),
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| {
        object
            .iter()
            .find(|(k, v)| k.eq_ignore_ascii_case(key) && !v.is_null())
            .map(|(_, v)| v)
    })
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_array_body() {
        let body = json!([{
            "Expense_Ratio": "0.54",
            "AUM": 35210.7,
            "fund_manager": "Shreyash Devalkar",
            "crisil_rating": ""
        }]);
        let meta = metadata_from_value(&body);
        assert_eq!(meta.expense_ratio, Some(0.54));
        assert_eq!(meta.aum, Some(35210.7));
        assert_eq!(meta.manager.as_deref(), Some("Shreyash Devalkar"));
        assert!(meta.rating.is_none());
    }

    #[test]
    fn test_object_body_and_missing_fields() {
        let body = json!({"expense_ratio": null, "aum": "n/a", "rating": "5"});
        let meta = metadata_from_value(&body);
        assert!(meta.expense_ratio.is_none());
        assert!(meta.aum.is_none());
        assert_eq!(meta.rating.as_deref(), Some("5"));
        assert_eq!(meta.expense_ratio_or_default(), 0.0);
    }

    #[test]
    fn test_unusable_bodies() {
        assert_eq!(metadata_from_value(&json!([])), FundMetadata::default());
        assert_eq!(metadata_from_value(&json!("oops")), FundMetadata::default());
    }

    #[tokio::test]
    async fn test_empty_isin_skips_request() {
        let client = KuveraClient::new("http://127.0.0.1:9", HttpConfig::default()).unwrap();
        let meta = client.fund_metadata("  ").await.unwrap();
        assert_eq!(meta, FundMetadata::default());
    }
}
