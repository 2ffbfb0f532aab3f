//! Per-fund outcomes and run accounting.

use std::collections::BTreeMap;

use derive_more::Display;
use navrank_traits::SchemeCode;
use serde::{Deserialize, Serialize};

/// Why a fund was left out of a run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The provider had no history, or nothing survived sanitation.
    #[display("no_data")]
    NoData,
    /// Too few NAV points or monthly returns.
    #[display("insufficient_history")]
    InsufficientHistory,
    /// The scheme's category differs from the requested one.
    #[display("category_mismatch")]
    CategoryMismatch,
    /// The latest NAV is older than the staleness tolerance.
    #[display("stale")]
    Stale,
    /// First and last observation share a date.
    #[display("degenerate_window")]
    DegenerateWindow,
    /// The history request failed or timed out.
    #[display("fetch_failed")]
    FetchFailed,
    /// The worker task panicked or could not start.
    #[display("task_failed")]
    TaskFailed,
}

/// Result of processing one fund.
#[derive(Debug, Clone, PartialEq)]
pub enum FundOutcome<T> {
    /// The fund produced a value.
    Scored(T),
    /// The fund was skipped.
    Rejected {
        /// Scheme code.
        code: SchemeCode,
        /// Classification.
        reason: RejectReason,
        /// Human-readable context.
        detail: String,
    },
}

impl<T> FundOutcome<T> {
    /// Build a rejection.
    pub fn rejected(code: &SchemeCode, reason: RejectReason, detail: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.clone(),
            reason,
            detail: detail.into(),
        }
    }

    /// The rejection reason, if any.
    pub const fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Scored(_) => None,
            Self::Rejected { reason, .. } => Some(*reason),
        }
    }
}

/// Counts of what happened to every fund considered in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Funds submitted to the worker pool.
    pub considered: usize,
    /// Funds that produced a value.
    pub scored: usize,
    /// Funds skipped for any reason.
    pub rejected: usize,
    /// Rejections by reason.
    pub by_reason: BTreeMap<RejectReason, usize>,
    /// Scored funds dropped by the fund limit.
    pub capped: usize,
}

impl RunSummary {
    /// Account for one outcome.
    pub fn record<T>(&mut self, outcome: &FundOutcome<T>) {
        self.considered += 1;
        match outcome.reason() {
            None => self.scored += 1,
            Some(reason) => {
                self.rejected += 1;
                *self.by_reason.entry(reason).or_default() += 1;
            }
        }
    }

    /// Rejections recorded for `reason`.
    pub fn rejections(&self, reason: RejectReason) -> usize {
        self.by_reason.get(&reason).copied().unwrap_or_default()
    }
}
