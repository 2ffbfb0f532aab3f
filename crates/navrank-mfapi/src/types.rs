//! Wire types for MFAPI responses.

use navrank_traits::{PriceHistory, RawPricePoint, SchemeMetadata, SchemeRef};
use serde::{Deserialize, Deserializer, Serialize};

/// One entry of the `/mf` scheme listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeListEntry {
    /// Scheme code; MFAPI sends a number, mirrors sometimes a string.
    #[serde(deserialize_with = "string_or_number")]
    pub scheme_code: String,
    /// Scheme name.
    #[serde(default)]
    pub scheme_name: String,
}

impl From<SchemeListEntry> for SchemeRef {
    fn from(entry: SchemeListEntry) -> Self {
        Self::new(entry.scheme_code, entry.scheme_name)
    }
}

/// Scheme metadata block of a `/mf/{code}` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavMeta {
    /// Asset management company.
    #[serde(default)]
    pub fund_house: Option<String>,
    /// Scheme type.
    #[serde(default)]
    pub scheme_type: Option<String>,
    /// Scheme category.
    #[serde(default)]
    pub scheme_category: Option<String>,
    /// Scheme name.
    #[serde(default)]
    pub scheme_name: Option<String>,
    /// Growth-option ISIN.
    #[serde(default)]
    pub isin_growth: Option<String>,
    /// Dividend-reinvestment ISIN.
    #[serde(default)]
    pub isin_div_reinvestment: Option<String>,
}

impl From<NavMeta> for SchemeMetadata {
    fn from(meta: NavMeta) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            fund_house: clean(meta.fund_house),
            scheme_type: clean(meta.scheme_type),
            scheme_category: clean(meta.scheme_category),
            scheme_name: clean(meta.scheme_name),
            isin_growth: clean(meta.isin_growth),
            isin_div_reinvestment: clean(meta.isin_div_reinvestment),
        }
    }
}

/// A single `{date, nav}` observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavEntry {
    /// Day-first date string.
    pub date: String,
    /// NAV as sent (string or number).
    #[serde(deserialize_with = "string_or_number")]
    pub nav: String,
}

/// Body of a `/mf/{code}` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavHistoryResponse {
    /// Scheme metadata.
    #[serde(default)]
    pub meta: Option<NavMeta>,
    /// Observations, newest first.
    #[serde(default)]
    pub data: Vec<NavEntry>,
    /// Upstream status marker, e.g. `"SUCCESS"`.
    #[serde(default)]
    pub status: Option<String>,
}

impl NavHistoryResponse {
    /// Convert to the engine's raw history, `None` when there are no observations.
    pub fn into_history(self) -> Option<PriceHistory> {
        if self.data.is_empty() {
            return None;
        }
        Some(PriceHistory {
            metadata: self.meta.map(SchemeMetadata::from).unwrap_or_default(),
            points: self
                .data
                .into_iter()
                .map(|e| RawPricePoint::new(e.date, e.nav))
                .collect(),
        })
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Str(s) => s,
        Repr::Int(i) => i.to_string(),
        Repr::Float(f) => f.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_list_numeric_codes() {
        let body = r#"[{"schemeCode": 100027, "schemeName": "Grindlays Super Saver"},
                       {"schemeCode": "119551", "schemeName": "Aditya Birla Direct Growth"}]"#;
        let entries: Vec<SchemeListEntry> = serde_json::from_str(body).unwrap();
        let refs: Vec<SchemeRef> = entries.into_iter().map(SchemeRef::from).collect();
        assert_eq!(refs[0].code.as_str(), "100027");
        assert_eq!(refs[1].code.as_str(), "119551");
        assert_eq!(refs[1].name, "Aditya Birla Direct Growth");
    }

    #[test]
    fn test_nav_history_conversion() {
        let body = r#"{
            "meta": {
                "fund_house": "Axis Mutual Fund",
                "scheme_category": "Equity Scheme - Large Cap Fund",
                "scheme_code": 120465,
                "isin_growth": "INF846K01DP8",
                "isin_div_reinvestment": null
            },
            "data": [
                {"date": "02-01-2024", "nav": "52.10"},
                {"date": "01-01-2024", "nav": 51.9}
            ],
            "status": "SUCCESS"
        }"#;
        let resp: NavHistoryResponse = serde_json::from_str(body).unwrap();
        let history = resp.into_history().unwrap();
        assert_eq!(
            history.metadata.scheme_category.as_deref(),
            Some("Equity Scheme - Large Cap Fund")
        );
        assert_eq!(history.metadata.isin_growth.as_deref(), Some("INF846K01DP8"));
        assert!(history.metadata.isin_div_reinvestment.is_none());
        assert_eq!(history.points.len(), 2);
        assert_eq!(history.points[1].price, "51.9");
    }

    #[test]
    fn test_empty_data_is_no_history() {
        let resp: NavHistoryResponse =
            serde_json::from_str(r#"{"meta": {}, "data": [], "status": "SUCCESS"}"#).unwrap();
        assert!(resp.into_history().is_none());
        let resp: NavHistoryResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.into_history().is_none());
    }
}
