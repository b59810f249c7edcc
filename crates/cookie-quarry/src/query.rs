//! The query coordinator: one or many cookie specs against a selected
//! strategy, with a global limit and an optional expiry filter.

use tracing::debug;

use crate::strategy::Strategy;
use crate::types::{CookieQuery, CookieSpec, ExportedCookie, QueryOptions};
use crate::util::time::now_seconds;

/// Resolves every spec, in order, against the strategy selected by
/// `options.browser` (all browsers when unset). Always returns a list;
/// store-level trouble degrades to partial or empty results.
pub async fn query_cookies(specs: &[CookieSpec], options: &QueryOptions) -> Vec<ExportedCookie> {
    let strategy = Strategy::for_browser(options.browser.as_deref());
    query_with_strategy(specs, options, &strategy).await
}

/// Same as [`query_cookies`] but against a caller-supplied strategy.
pub async fn query_with_strategy(
    specs: &[CookieSpec],
    options: &QueryOptions,
    strategy: &Strategy,
) -> Vec<ExportedCookie> {
    if specs.is_empty() {
        return Vec::new();
    }

    let now = now_seconds();
    let mut results = Vec::new();
    for spec in specs {
        let query = CookieQuery {
            store: options.store.clone(),
            force: options.force,
            ..CookieQuery::from_spec(spec)
        };
        let batch = strategy.query_cookies(&query).await;
        debug!(
            name = %spec.name,
            domain = %spec.domain,
            count = batch.len(),
            "spec resolved"
        );

        for cookie in batch {
            if options.remove_expired && cookie.is_expired_at(now) {
                continue;
            }
            results.push(cookie);
            if let Some(limit) = options.limit {
                if results.len() >= limit {
                    return results;
                }
            }
        }
    }
    results
}
