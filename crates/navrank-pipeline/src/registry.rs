//! Category classification and benchmark lookup.
//!
//! [`CategoryFamily`] buckets the free-text MFAPI categories for report
//! grouping. [`BenchmarkRegistry`] maps a requested category to the scheme
//! code whose NAV history serves as the run's benchmark.

use std::{collections::BTreeMap, path::Path};

use navrank_traits::{NavRankError, Result, SchemeCode};
use serde::{Deserialize, Serialize};

/// Key consulted when a category has no explicit benchmark.
pub const DEFAULT_BENCHMARK_KEY: &str = "default";

/// Broad asset family of a scheme category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryFamily {
    /// Equity schemes
    Equity,
    /// Hybrid and balanced schemes
    Hybrid,
    /// Debt, liquid and money-market schemes
    Debt,
    /// Everything else (index funds, FoFs, solution oriented ...)
    Other,
}

impl CategoryFamily {
    /// Classify a category string such as `"Equity Scheme - Large Cap Fund"`.
    ///
    /// Only the leading word counts: "Hybrid Scheme - Equity Savings" is
    /// hybrid, and fund-of-funds under "Other Scheme" stay other.
    #[must_use]
    pub fn classify(category: &str) -> Self {
        let lower = category.trim_start().to_ascii_lowercase();
        if lower.starts_with("equity") {
            Self::Equity
        } else if lower.starts_with("hybrid") {
            Self::Hybrid
        } else if lower.starts_with("debt") {
            Self::Debt
        } else {
            Self::Other
        }
    }

    /// Get a human-readable description of the family.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Equity => "Equity schemes",
            Self::Hybrid => "Hybrid schemes",
            Self::Debt => "Debt schemes",
            Self::Other => "Other schemes",
        }
    }
}

/// Category to benchmark scheme mapping.
///
/// Loaded from a JSON object such as
///
/// ```json
/// { "Equity Scheme - Large Cap Fund": "120716", "default": "120716" }
/// ```
///
/// Codes may be written as strings or numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchmarkRegistry {
    entries: BTreeMap<String, SchemeCode>,
}

impl BenchmarkRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Parse a JSON mapping.
    ///
    /// # Errors
    ///
    /// Returns [`NavRankError::Config`] if the document is not an object of
    /// string or integer codes.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(text)
            .map_err(|e| NavRankError::Config(format!("invalid benchmark map: {e}")))?;
        let mut registry = Self::new();
        for (category, value) in raw {
            let code = match value {
                serde_json::Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                serde_json::Value::Number(n) if n.is_u64() => n.to_string(),
                other => {
                    return Err(NavRankError::Config(format!(
                        "benchmark for {category:?} must be a scheme code, got {other}"
                    )));
                }
            };
            registry.insert(category, code);
        }
        Ok(registry)
    }

    /// Read and parse a JSON mapping file.
    ///
    /// # Errors
    ///
    /// Returns [`NavRankError::Config`] if the file is unreadable or invalid.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            NavRankError::Config(format!("cannot read benchmark map {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Map `category` to `code`, replacing any previous entry.
    pub fn insert(&mut self, category: impl Into<String>, code: impl Into<SchemeCode>) {
        self.entries.insert(category.into(), code.into());
    }

    /// Benchmark for `category`, falling back to the `"default"` entry.
    pub fn resolve(&self, category: &str) -> Option<&SchemeCode> {
        self.entries
            .get(category)
            .or_else(|| self.entries.get(DEFAULT_BENCHMARK_KEY))
    }

    /// Number of mapped categories, including `"default"`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            CategoryFamily::classify("Equity Scheme - Large Cap Fund"),
            CategoryFamily::Equity
        );
        assert_eq!(
            CategoryFamily::classify("Hybrid Scheme - Aggressive Hybrid Fund"),
            CategoryFamily::Hybrid
        );
        assert_eq!(CategoryFamily::classify("Debt Scheme - Liquid Fund"), CategoryFamily::Debt);
        assert_eq!(CategoryFamily::classify("Other Scheme - Index Funds"), CategoryFamily::Other);
        assert_eq!(CategoryFamily::classify(""), CategoryFamily::Other);
        assert!(CategoryFamily::Equity < CategoryFamily::Hybrid);
        assert!(CategoryFamily::Debt < CategoryFamily::Other);
    }

    #[test]
    fn test_description() {
        assert_eq!(CategoryFamily::Hybrid.description(), "Hybrid schemes");
        assert_eq!(CategoryFamily::Other.description(), "Other schemes");
    }

    #[test]
    fn test_classify_uses_leading_family_only() {
        assert_eq!(
            CategoryFamily::classify("Hybrid Scheme - Equity Savings"),
            CategoryFamily::Hybrid
        );
        assert_eq!(
            CategoryFamily::classify("Other Scheme - FoF Domestic (Debt oriented)"),
            CategoryFamily::Other
        );
        assert_eq!(
            CategoryFamily::classify("Solution Oriented Scheme - Retirement Fund (Equity)"),
            CategoryFamily::Other
        );
    }

    #[test]
    fn test_resolve_with_default() {
        let registry = BenchmarkRegistry::from_json_str(
            r#"{"Equity Scheme - Large Cap Fund": "120716", "default": 118989}"#,
        )
        .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.resolve("Equity Scheme - Large Cap Fund").unwrap().as_str(),
            "120716"
        );
        assert_eq!(registry.resolve("Debt Scheme - Gilt Fund").unwrap().as_str(), "118989");
    }

    #[test]
    fn test_resolve_without_default() {
        let mut registry = BenchmarkRegistry::new();
        registry.insert("Equity Scheme - Mid Cap Fund", "147622");
        assert!(registry.resolve("Equity Scheme - Small Cap Fund").is_none());
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_rejects_bad_codes() {
        assert!(BenchmarkRegistry::from_json_str(r#"{"a": null}"#).is_err());
        assert!(BenchmarkRegistry::from_json_str(r#"{"a": ""}"#).is_err());
        assert!(BenchmarkRegistry::from_json_str("[1, 2]").is_err());
    }
}
