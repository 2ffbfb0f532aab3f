//! Scheme universe listing and candidate screening.

use navrank_traits::{NavRankError, Result, SchemeDirectory, SchemeRef};
use tracing::debug;

/// Walk the directory page by page until a short page.
///
/// # Errors
///
/// Returns [`NavRankError::Upstream`] if any page fails; a partial universe is
/// never returned.
pub async fn fetch_universe(
    directory: &dyn SchemeDirectory,
    page_size: usize,
) -> Result<Vec<SchemeRef>> {
    let page_size = page_size.max(1);
    let mut schemes = Vec::new();
    let mut offset = 0;
    loop {
        let page = directory
            .list_schemes(offset, page_size)
            .await
            .map_err(|e| NavRankError::Upstream(format!("scheme list at offset {offset}: {e}")))?;
        let fetched = page.len();
        schemes.extend(page);
        debug!(offset, fetched, total = schemes.len(), "Fetched scheme page");
        if fetched < page_size {
            break;
        }
        offset += fetched;
    }
    Ok(schemes)
}

/// Whether a scheme name denotes a direct-plan growth option.
///
/// Dividend and IDCW variants are excluded even when they mention growth.
pub fn is_direct_growth(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("direct")
        && lower.contains("growth")
        && !lower.contains("idcw")
        && !lower.contains("dividend")
}

/// Direct-growth schemes of `universe`, at most `cap` of them, in listing order.
pub fn screen_candidates(universe: &[SchemeRef], cap: usize) -> Vec<SchemeRef> {
    universe
        .iter()
        .filter(|s| is_direct_growth(&s.name))
        .take(cap)
        .cloned()
        .collect()
}
