//! In-memory providers for pipeline tests.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::Duration as Days;
use navrank_traits::{
    Date, DateRange, FundMetadata, NavRankError, PriceHistory, PriceHistoryProvider,
    RawPricePoint, Result, SchemeCode, SchemeDirectory, SchemeMetadata, SchemeRef,
    SupplementaryMetadataProvider,
};

pub(crate) const LARGE_CAP: &str = "Equity Scheme - Large Cap Fund";

pub(crate) fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) struct FakeDirectory(pub(crate) Vec<SchemeRef>);

#[async_trait]
impl SchemeDirectory for FakeDirectory {
    async fn list_schemes(&self, offset: usize, limit: usize) -> Result<Vec<SchemeRef>> {
        Ok(self.0.iter().skip(offset).take(limit).cloned().collect())
    }
}

pub(crate) struct DownDirectory;

#[async_trait]
impl SchemeDirectory for DownDirectory {
    async fn list_schemes(&self, _offset: usize, _limit: usize) -> Result<Vec<SchemeRef>> {
        Err(NavRankError::DataFetch("HTTP 503".into()))
    }
}

pub(crate) enum Behavior {
    History(PriceHistory),
    Missing,
    Fail,
    Panic,
    Hang,
}

#[derive(Default)]
pub(crate) struct FakePrices(pub(crate) HashMap<SchemeCode, Behavior>);

impl FakePrices {
    pub(crate) fn with(mut self, code: &str, behavior: Behavior) -> Self {
        self.0.insert(code.into(), behavior);
        self
    }
}

#[async_trait]
impl PriceHistoryProvider for FakePrices {
    async fn get_history(
        &self,
        code: &SchemeCode,
        _range: Option<DateRange>,
    ) -> Result<Option<PriceHistory>> {
        match self.0.get(code) {
            Some(Behavior::History(h)) => Ok(Some(h.clone())),
            Some(Behavior::Missing) | None => Ok(None),
            Some(Behavior::Fail) => Err(NavRankError::DataFetch(format!("HTTP 500 for {code}"))),
            Some(Behavior::Panic) => panic!("provider blew up on {code}"),
            Some(Behavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

pub(crate) struct FixedMetadata(pub(crate) FundMetadata);

#[async_trait]
impl SupplementaryMetadataProvider for FixedMetadata {
    async fn get_metadata(&self, _isin: &str) -> Result<FundMetadata> {
        Ok(self.0.clone())
    }
}

/// Weekly NAVs ending at `end`, newest first like the MFAPI payload.
pub(crate) fn weekly_history(
    category: &str,
    end: Date,
    points: usize,
    start_price: f64,
    weekly_growth: f64,
) -> PriceHistory {
    weekly_history_with(category, end, points, start_price, |_| weekly_growth)
}

/// Like [`weekly_history`], with the growth of week `i` (oldest is 0) given by `growth`.
pub(crate) fn weekly_history_with(
    category: &str,
    end: Date,
    points: usize,
    start_price: f64,
    growth: impl Fn(usize) -> f64,
) -> PriceHistory {
    let mut raw = Vec::with_capacity(points);
    let mut price = start_price;
    for i in 0..points {
        if i > 0 {
            price *= 1.0 + growth(i);
        }
        let weeks_back = (points - 1 - i) as i64;
        let day = end - Days::days(7 * weeks_back);
        raw.push(RawPricePoint::new(
            day.format("%d-%m-%Y").to_string(),
            format!("{price:.4}"),
        ));
    }
    raw.reverse();
    PriceHistory {
        metadata: SchemeMetadata {
            fund_house: Some("Example AMC".into()),
            scheme_type: Some("Open Ended Schemes".into()),
            scheme_category: Some(category.into()),
            isin_growth: Some("INF000K01AA0".into()),
            ..Default::default()
        },
        points: raw,
    }
}
