//! Category-grouped views of lump-sum results.

use std::{cmp::Ordering, collections::BTreeMap};

use serde::Serialize;

use crate::{lumpsum::LumpsumRow, registry::CategoryFamily};

/// Title used for rows without a category.
pub const UNCATEGORIZED: &str = "General";

/// Rows sharing one scheme category, best XIRR first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    /// Category title.
    pub title: String,
    /// Broad family of the category.
    pub family: CategoryFamily,
    /// Member rows.
    pub rows: Vec<LumpsumRow>,
}

/// Rows sorted by XIRR descending, ties by scheme code ascending.
pub fn rank_by_xirr(rows: &[LumpsumRow]) -> Vec<LumpsumRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(by_xirr);
    ranked
}

/// The best `top_n` rows of every category.
pub fn group_top_per_category(rows: &[LumpsumRow], top_n: usize) -> Vec<CategoryGroup> {
    let mut groups = group(rank_by_xirr(rows));
    for g in &mut groups {
        g.rows.truncate(top_n);
    }
    groups
}

/// The best `top_n` rows overall, grouped by category.
pub fn group_top_overall(rows: &[LumpsumRow], top_n: usize) -> Vec<CategoryGroup> {
    let mut ranked = rank_by_xirr(rows);
    ranked.truncate(top_n);
    group(ranked)
}

fn by_xirr(a: &LumpsumRow, b: &LumpsumRow) -> Ordering {
    b.xirr.total_cmp(&a.xirr).then_with(|| a.code.cmp(&b.code))
}

fn category_title(row: &LumpsumRow) -> String {
    row.scheme_category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNCATEGORIZED)
        .to_string()
}

/// Bucket already-ranked rows, ordering groups by family then title.
fn group(ranked: Vec<LumpsumRow>) -> Vec<CategoryGroup> {
    let mut buckets: BTreeMap<(CategoryFamily, String), Vec<LumpsumRow>> = BTreeMap::new();
    for row in ranked {
        let title = category_title(&row);
        buckets
            .entry((CategoryFamily::classify(&title), title))
            .or_default()
            .push(row);
    }
    buckets
        .into_iter()
        .map(|((family, title), rows)| CategoryGroup {
            title,
            family,
            rows,
        })
        .collect()
}
