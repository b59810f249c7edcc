//! The uniform `query_cookies` operation over browser-specific
//! strategies. The abstraction is a tagged variant: a concrete family
//! strategy, or a composite fanning out over a list of them.

mod chromium;
mod composite;
mod firefox;
mod mock;
mod safari;

pub use chromium::ChromiumStrategy;
pub use composite::{CompositeStrategy, DEFAULT_CHILD_TIMEOUT};
pub use firefox::FirefoxStrategy;
pub use mock::MockStrategy;
pub use safari::SafariStrategy;

use std::path::PathBuf;

use futures::future::BoxFuture;
use tracing::warn;

use crate::chromium::variants::ChromiumVariant;
use crate::locate::{find_stores, DEFAULT_MAX_DEPTH};
use crate::types::{CookieQuery, ExportedCookie};

#[derive(Debug)]
pub enum Strategy {
    Chromium(ChromiumStrategy),
    Firefox(FirefoxStrategy),
    Safari(SafariStrategy),
    Mock(MockStrategy),
    Composite(CompositeStrategy),
}

impl Strategy {
    /// Runs one query against this strategy. Never fails: store- and
    /// record-level problems are logged and skipped.
    ///
    /// Boxed so the composite arm can dispatch back into this type.
    pub fn query_cookies<'a>(
        &'a self,
        query: &'a CookieQuery,
    ) -> BoxFuture<'a, Vec<ExportedCookie>> {
        match self {
            Strategy::Chromium(s) => Box::pin(s.query_cookies(query)),
            Strategy::Firefox(s) => Box::pin(s.query_cookies(query)),
            Strategy::Safari(s) => Box::pin(s.query_cookies(query)),
            Strategy::Mock(s) => Box::pin(s.query_cookies(query)),
            Strategy::Composite(s) => Box::pin(s.query_cookies(query)),
        }
    }

    /// Strategy factory. A recognized case-insensitive token selects
    /// one browser; no token or an unknown one selects a composite of
    /// every supported browser in deterministic order. Each call
    /// returns a fresh instance.
    pub fn for_browser(selector: Option<&str>) -> Strategy {
        if let Some(token) = selector {
            let token = token.trim();
            if !token.is_empty() {
                if let Some(variant) = ChromiumVariant::from_token(token) {
                    return Strategy::Chromium(ChromiumStrategy::new(variant));
                }
                match token.to_lowercase().as_str() {
                    "firefox" => return Strategy::Firefox(FirefoxStrategy::new()),
                    "safari" => return Strategy::Safari(SafariStrategy::new()),
                    other => {
                        warn!(selector = other, "unknown browser selector, querying all browsers")
                    }
                }
            }
        }
        Strategy::Composite(CompositeStrategy::all())
    }
}

/// A `store` override narrows the query to a single user-supplied
/// file; otherwise stores are discovered under the strategy's roots.
pub(crate) fn resolve_stores(
    store_override: &Option<PathBuf>,
    roots: &[PathBuf],
    store_name: &str,
) -> Vec<PathBuf> {
    match store_override {
        Some(path) if path.is_file() => vec![path.clone()],
        Some(path) => {
            warn!(store = %path.display(), "store override is not a readable file");
            Vec::new()
        }
        None => find_stores(roots, store_name, DEFAULT_MAX_DEPTH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_selects_single_browsers() {
        assert!(matches!(
            Strategy::for_browser(Some("chrome")),
            Strategy::Chromium(ref s) if s.variant == ChromiumVariant::Chrome
        ));
        assert!(matches!(
            Strategy::for_browser(Some("Opera GX")),
            Strategy::Chromium(ref s) if s.variant == ChromiumVariant::OperaGx
        ));
        assert!(matches!(
            Strategy::for_browser(Some("FIREFOX")),
            Strategy::Firefox(_)
        ));
        assert!(matches!(
            Strategy::for_browser(Some("safari")),
            Strategy::Safari(_)
        ));
    }

    #[test]
    fn factory_defaults_to_composite_of_all() {
        for selector in [None, Some("netscape"), Some("")] {
            match Strategy::for_browser(selector) {
                Strategy::Composite(composite) => {
                    // Seven Chromium variants plus Firefox and Safari.
                    assert_eq!(composite.children().len(), 9);
                }
                other => panic!("expected composite for {selector:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn store_override_must_be_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("Cookies");
        std::fs::write(&file, b"").unwrap();

        let found = resolve_stores(&Some(file.clone()), &[], "Cookies");
        assert_eq!(found, vec![file]);

        let found = resolve_stores(&Some(dir.path().join("missing")), &[], "Cookies");
        assert!(found.is_empty());
    }
}
