//! Strategy for the Chromium family. Each discovered store is read on
//! the blocking pool and its rows pushed through the decryption
//! pipeline; the keychain is consulted once per query.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::chromium::crypto::{self, DecryptOutcome};
use crate::chromium::keychain;
use crate::chromium::variants::ChromiumVariant;
use crate::sqlite::{read_chromium_rows, ChromiumRow};
use crate::types::{BrowserTag, CookieMeta, CookieQuery, ExportedCookie, Expiry};
use crate::util::matching::{
    domain_matches, sql_domain_pattern, sql_name_pattern, strip_leading_dot,
};
use crate::util::time::{chromium_epoch_to_unix_millis, chromium_epoch_to_unix_seconds};

#[derive(Debug, Clone)]
pub struct ChromiumStrategy {
    pub variant: ChromiumVariant,
    pub roots: Vec<PathBuf>,
    /// Overrides the keychain lookup when set; callers that already
    /// hold the Safe Storage password (or tests) inject it here.
    pub master_secret: Option<String>,
}

impl ChromiumStrategy {
    pub fn new(variant: ChromiumVariant) -> Self {
        Self {
            roots: variant.roots(),
            variant,
            master_secret: None,
        }
    }

    pub fn with_roots(variant: ChromiumVariant, roots: Vec<PathBuf>) -> Self {
        Self {
            variant,
            roots,
            master_secret: None,
        }
    }

    pub fn with_master_secret(mut self, secret: impl Into<String>) -> Self {
        self.master_secret = Some(secret.into());
        self
    }

    pub async fn query_cookies(&self, query: &CookieQuery) -> Vec<ExportedCookie> {
        let stores = super::resolve_stores(&query.store, &self.roots, "Cookies");
        if stores.is_empty() {
            debug!(variant = %self.variant, "no cookie stores found");
            return Vec::new();
        }

        let master = match &self.master_secret {
            Some(secret) => secret.clone(),
            None => keychain::get_generic_password(self.variant.keychain_service()).await,
        };
        let key = crypto::derive_key(&master);
        let name_like = sql_name_pattern(&query.name);
        let host_like = sql_domain_pattern(&query.domain);

        let reads = stores.into_iter().map(|store| {
            let name_like = name_like.clone();
            let host_like = host_like.clone();
            let force = query.force;
            async move {
                let db = store.clone();
                let rows = tokio::task::spawn_blocking(move || {
                    read_chromium_rows(&db, &name_like, &host_like, force)
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
                if let Some(cookie) = export_row(row, &key, &store, &query.domain) {
                    cookies.push(cookie);
                }
            }
        }
        cookies
    }
}

fn export_row(
    row: ChromiumRow,
    key: &[u8; 16],
    store: &Path,
    query_domain: &str,
) -> Option<ExportedCookie> {
    if row.name.is_empty() {
        return None;
    }
    let domain = strip_leading_dot(&row.host_key);
    if domain.is_empty() {
        return None;
    }
    if !domain_matches(query_domain, &row.host_key) {
        return None;
    }

    // A version-prefixed blob goes through the decryption pipeline;
    // without the prefix the plaintext column is authoritative.
    let outcome = if crypto::has_version_prefix(&row.encrypted_value) {
        crypto::decrypt_encrypted_value(&row.encrypted_value, key)
    } else {
        DecryptOutcome {
            value: row.value,
            decrypted: false,
        }
    };

    let mut meta = CookieMeta::new(store, BrowserTag::Chrome);
    meta.decrypted = outcome.decrypted;
    meta.secure = row.is_secure;
    meta.http_only = row.is_http_only;
    meta.path = if row.path.is_empty() {
        "/".to_string()
    } else {
        row.path
    };
    meta.creation =
        (row.creation_utc > 0).then(|| chromium_epoch_to_unix_millis(row.creation_utc));

    Some(ExportedCookie {
        name: row.name,
        domain: domain.to_string(),
        value: outcome.value,
        expiry: Expiry::from_epoch_seconds(chromium_epoch_to_unix_seconds(row.expires_utc)),
        meta,
    })
}
