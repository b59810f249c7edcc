//! Strategy for Firefox profiles. Values in `moz_cookies` are stored
//! in the clear, so `decrypted` is recorded as `false` by convention.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::sqlite::{read_firefox_rows, FirefoxRow};
use crate::types::{BrowserTag, CookieMeta, CookieQuery, ExportedCookie, Expiry};
use crate::util::matching::{
    domain_matches, sql_domain_pattern, sql_name_pattern, strip_leading_dot,
};

const STORE_NAME: &str = "cookies.sqlite";

#[derive(Debug, Clone)]
pub struct FirefoxStrategy {
    pub roots: Vec<PathBuf>,
}

impl Default for FirefoxStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl FirefoxStrategy {
    pub fn new() -> Self {
        Self {
            roots: default_roots(),
        }
    }

    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub async fn query_cookies(&self, query: &CookieQuery) -> Vec<ExportedCookie> {
        let stores = super::resolve_stores(&query.store, &self.roots, STORE_NAME);
        if stores.is_empty() {
            debug!("no Firefox cookie stores found");
            return Vec::new();
        }

        let name_like = sql_name_pattern(&query.name);
        let host_like = sql_domain_pattern(&query.domain);

        let reads = stores.into_iter().map(|store| {
            let name_like = name_like.clone();
            let host_like = host_like.clone();
            let force = query.force;
            async move {
                let db = store.clone();
                let rows = tokio::task::spawn_blocking(move || {
                    read_firefox_rows(&db, &name_like, &host_like, force)
                })
                .await;
                (store, rows)
            }
        });

        let mut cookies = Vec::new();
        for (store, outcome) in join_all(reads).await {
            let rows = match outcome {
                Ok(Ok(rows)) => rows,
                Ok(Err(err)) => {
                    warn!(store = %store.display(), %err, "skipping store");
                    continue;
                }
                Err(err) => {
                    warn!(store = %store.display(), %err, "store read task failed");
                    continue;
                }
            };
            for row in rows {
                if let Some(cookie) = export_row(row, &store, &query.domain) {
                    cookies.push(cookie);
                }
            }
        }
        cookies
    }
}

fn export_row(row: FirefoxRow, store: &Path, query_domain: &str) -> Option<ExportedCookie> {
    if row.name.is_empty() {
        return None;
    }
    let domain = strip_leading_dot(&row.host);
    if domain.is_empty() {
        return None;
    }
    if !domain_matches(query_domain, &row.host) {
        return None;
    }

    let mut meta = CookieMeta::new(store, BrowserTag::Firefox);
    meta.secure = row.is_secure;
    meta.http_only = row.is_http_only;
    meta.path = if row.path.is_empty() {
        "/".to_string()
    } else {
        row.path
    };
    // creationTime is microseconds since the Unix epoch.
    meta.creation = (row.creation_time > 0).then(|| row.creation_time / 1000);

    Some(ExportedCookie {
        name: row.name,
        domain: domain.to_string(),
        value: row.value,
        expiry: Expiry::from_epoch_seconds(row.expiry),
        meta,
    })
}

fn default_roots() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    if cfg!(target_os = "macos") {
        vec![home.join("Library/Application Support/Firefox/Profiles")]
    } else if cfg!(target_os = "windows") {
        std::env::var_os("APPDATA")
            .map(|appdata| vec![PathBuf::from(appdata).join("Mozilla/Firefox/Profiles")])
            .unwrap_or_default()
    } else {
        vec![home.join(".mozilla/firefox")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::testdb::{create_firefox_store, insert_firefox_cookie};

    fn query(name: &str, domain: &str) -> CookieQuery {
        CookieQuery {
            name: name.to_string(),
            domain: domain.to_string(),
            store: None,
            force: false,
        }
    }

    #[tokio::test]
    async fn missing_roots_yield_empty() {
        let strategy = FirefoxStrategy::with_roots(vec![PathBuf::from("/nonexistent/ff")]);
        assert!(strategy.query_cookies(&query("%", "%")).await.is_empty());
    }

    #[tokio::test]
    async fn reads_profile_stores_with_plaintext_values() {
        let dir = tempfile::tempdir().unwrap();
        let profile = dir.path().join("abcd1234.default-release");
        std::fs::create_dir_all(&profile).unwrap();
        let conn = create_firefox_store(&profile.join(STORE_NAME));
        insert_firefox_cookie(&conn, ".example.com", "sid", "abc", 1_900_000_000);
        insert_firefox_cookie(&conn, "other.org", "sid", "zzz", 0);
        drop(conn);

        let strategy = FirefoxStrategy::with_roots(vec![dir.path().to_path_buf()]);
        let cookies = strategy.query_cookies(&query("sid", "example.com")).await;

        assert_eq!(cookies.len(), 1);
        let c = &cookies[0];
        assert_eq!(c.name, "sid");
        assert_eq!(c.domain, "example.com");
        assert_eq!(c.value, "abc");
        assert_eq!(c.expiry, Some(Expiry::At(1_900_000_000)));
        assert_eq!(c.meta.browser, BrowserTag::Firefox);
        assert!(!c.meta.decrypted);
        assert_eq!(c.meta.file, profile.join(STORE_NAME));
    }

    #[tokio::test]
    async fn session_cookies_map_to_never() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join(STORE_NAME);
        let conn = create_firefox_store(&store);
        insert_firefox_cookie(&conn, "a.test", "session", "x", 0);
        drop(conn);

        let strategy = FirefoxStrategy::with_roots(vec![]);
        let mut q = query("%", "%");
        q.store = Some(store);
        let cookies = strategy.query_cookies(&q).await;
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].expiry, Some(Expiry::Never));
    }
}
