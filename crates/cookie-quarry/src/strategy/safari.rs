//! Strategy for Safari. Each `Cookies.binarycookies` file is read
//! whole and pushed through the binary decoder; name and domain
//! matching happen in memory with the same semantics the SQL-backed
//! strategies get from LIKE.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::safari::decode_binary_cookies;
use crate::types::{BrowserTag, CookieMeta, CookieQuery, ExportedCookie, Expiry, RawCookie};
use crate::util::hex;
use crate::util::matching::{domain_matches, name_matches};

const STORE_NAME: &str = "Cookies.binarycookies";

#[derive(Debug, Clone)]
pub struct SafariStrategy {
    pub roots: Vec<PathBuf>,
}

impl Default for SafariStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl SafariStrategy {
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
            debug!("no Safari cookie stores found");
            return Vec::new();
        }

        let reads = stores.into_iter().map(|store| async move {
            let data = tokio::fs::read(&store).await;
            (store, data)
        });

        let mut cookies = Vec::new();
        for (store, data) in join_all(reads).await {
            let data = match data {
                Ok(data) => data,
                Err(err) => {
                    warn!(store = %store.display(), %err, "skipping unreadable store");
                    continue;
                }
            };
            let decoded = match decode_binary_cookies(&data) {
                Ok(decoded) => decoded,
                Err(err) => {
                    warn!(store = %store.display(), %err, "skipping undecodable store");
                    continue;
                }
            };
            for raw in decoded {
                if let Some(cookie) = export_raw(raw, &store, query) {
                    cookies.push(cookie);
                }
            }
        }
        cookies
    }
}

fn export_raw(raw: RawCookie, store: &Path, query: &CookieQuery) -> Option<ExportedCookie> {
    if raw.name.is_empty() {
        return None;
    }
    if !name_matches(&query.name, &raw.name) {
        return None;
    }
    if !domain_matches(&query.domain, &raw.domain) {
        return None;
    }
    let domain = raw.normalized_domain().to_string();
    if domain.is_empty() {
        return None;
    }

    // Values are bytes until this boundary; non-UTF-8 payloads are
    // preserved hex-rendered.
    let value = match String::from_utf8(raw.value.clone()) {
        Ok(value) => value,
        Err(_) => {
            warn!(name = %raw.name, "cookie value is not UTF-8, emitting hex");
            hex::encode(&raw.value)
        }
    };

    let mut meta = CookieMeta::new(store, BrowserTag::Safari);
    meta.secure = raw.flags.secure;
    meta.http_only = raw.flags.http_only;
    meta.path = raw.path;
    meta.version = raw.version;
    meta.port = raw.port;
    meta.comment = raw.comment;
    meta.comment_url = raw.comment_url;
    meta.creation = (raw.creation > 0).then(|| raw.creation * 1000);

    Some(ExportedCookie {
        name: raw.name,
        domain,
        value,
        expiry: Expiry::from_epoch_seconds(raw.expiry),
        meta,
    })
}

fn default_roots() -> Vec<PathBuf> {
    if !cfg!(target_os = "macos") {
        return Vec::new();
    }
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };
    vec![
        home.join("Library/Containers/com.apple.Safari/Data/Library/Cookies"),
        home.join("Library/Cookies"),
    ]
}
