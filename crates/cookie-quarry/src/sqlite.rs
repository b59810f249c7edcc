//! Read-only adapters over the two SQLite cookie schemas. A store held
//! under an exclusive lock by a running browser surfaces as
//! [`LockError`]; with `force` the file is copied to a scratch
//! directory (sidecars included) and reread there.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

use crate::error::{LockError, StoreError};

const CHROMIUM_SQL: &str = "SELECT host_key, name, encrypted_value, value, path, expires_utc, \
     is_secure, is_httponly, creation_utc \
     FROM cookies WHERE name LIKE ?1 AND host_key LIKE ?2";

const FIREFOX_SQL: &str = "SELECT host, name, value, path, expiry, isSecure, isHttpOnly, creationTime \
     FROM moz_cookies WHERE name LIKE ?1 AND host LIKE ?2";

/// One row of the Chromium `cookies` table. `expires_utc` and
/// `creation_utc` are microseconds since 1601-01-01.
#[derive(Debug, Clone)]
pub struct ChromiumRow {
    pub host_key: String,
    pub name: String,
    pub encrypted_value: Vec<u8>,
    pub value: String,
    pub path: String,
    pub expires_utc: i64,
    pub is_secure: bool,
    pub is_http_only: bool,
    pub creation_utc: i64,
}

/// One row of the Firefox `moz_cookies` table. `expiry` is Unix
/// seconds; `creation_time` is microseconds since the Unix epoch.
#[derive(Debug, Clone)]
pub struct FirefoxRow {
    pub host: String,
    pub name: String,
    pub value: String,
    pub path: String,
    pub expiry: i64,
    pub is_secure: bool,
    pub is_http_only: bool,
    pub creation_time: i64,
}

pub fn read_chromium_rows(
    path: &Path,
    name_like: &str,
    host_like: &str,
    force: bool,
) -> Result<Vec<ChromiumRow>, StoreError> {
    read_with_lock_fallback(path, force, |db| query_chromium(db, name_like, host_like))
}

pub fn read_firefox_rows(
    path: &Path,
    name_like: &str,
    host_like: &str,
    force: bool,
) -> Result<Vec<FirefoxRow>, StoreError> {
    read_with_lock_fallback(path, force, |db| query_firefox(db, name_like, host_like))
}

fn read_with_lock_fallback<T>(
    path: &Path,
    force: bool,
    query: impl Fn(&Path) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    match query(path) {
        Err(StoreError::Sqlite(err)) if is_locked(&err) => {
            if !force {
                return Err(LockError {
                    path: path.to_path_buf(),
                }
                .into());
            }
            debug!(path = %path.display(), "store locked, rereading from a scratch copy");
            let scratch = tempfile::Builder::new().prefix("cookie-quarry-").tempdir()?;
            let copy = scratch
                .path()
                .join(path.file_name().unwrap_or_else(|| OsStr::new("Cookies")));
            std::fs::copy(path, &copy)?;
            copy_sidecar(path, &copy, "-wal");
            copy_sidecar(path, &copy, "-shm");
            query(&copy)
        }
        other => other,
    }
}

fn is_locked(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            )
    )
}

fn copy_sidecar(source: &Path, target: &Path, suffix: &str) {
    let sidecar = PathBuf::from(format!("{}{suffix}", source.to_string_lossy()));
    let copy = PathBuf::from(format!("{}{suffix}", target.to_string_lossy()));
    if sidecar.exists() {
        let _ = std::fs::copy(&sidecar, &copy);
    }
}

fn open_read_only(path: &Path) -> Result<Connection, StoreError> {
    Ok(Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?)
}

fn query_chromium(
    path: &Path,
    name_like: &str,
    host_like: &str,
) -> Result<Vec<ChromiumRow>, StoreError> {
    let conn = open_read_only(path)?;
    let mut stmt = conn.prepare(CHROMIUM_SQL)?;
    let rows = stmt.query_map(rusqlite::params![name_like, host_like], |row| {
        Ok(ChromiumRow {
            host_key: row.get(0)?,
            name: row.get(1)?,
            encrypted_value: row.get::<_, Option<Vec<u8>>>(2)?.unwrap_or_default(),
            value: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            path: row.get(4)?,
            expires_utc: row.get(5)?,
            is_secure: row.get::<_, i64>(6)? != 0,
            is_http_only: row.get::<_, i64>(7)? != 0,
            creation_utc: row.get::<_, Option<i64>>(8)?.unwrap_or(0),
        })
    })?;
    Ok(collect_rows(rows))
}

fn query_firefox(
    path: &Path,
    name_like: &str,
    host_like: &str,
) -> Result<Vec<FirefoxRow>, StoreError> {
    let conn = open_read_only(path)?;
    let mut stmt = conn.prepare(FIREFOX_SQL)?;
    let rows = stmt.query_map(rusqlite::params![name_like, host_like], |row| {
        Ok(FirefoxRow {
            host: row.get(0)?,
            name: row.get(1)?,
            value: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            path: row.get(3)?,
            expiry: row.get(4)?,
            is_secure: row.get::<_, i64>(5)? != 0,
            is_http_only: row.get::<_, i64>(6)? != 0,
            creation_time: row.get::<_, Option<i64>>(7)?.unwrap_or(0),
        })
    })?;
    Ok(collect_rows(rows))
}

/// Rows that fail to read individually are skipped with a warning; the
/// remainder of the store is still returned.
fn collect_rows<T>(rows: impl Iterator<Item = Result<T, rusqlite::Error>>) -> Vec<T> {
    let mut out = Vec::new();
    for row in rows {
        match row {
            Ok(row) => out.push(row),
            Err(err) => warn!(%err, "skipping unreadable cookie row"),
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod testdb {
    //! SQLite fixture builders shared with the strategy tests.

    use std::path::Path;

    use rusqlite::Connection;

    pub fn create_chromium_store(path: &Path) -> Connection {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE cookies (
                host_key TEXT NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL DEFAULT '',
                encrypted_value BLOB NOT NULL DEFAULT x'',
                path TEXT NOT NULL DEFAULT '/',
                expires_utc INTEGER NOT NULL DEFAULT 0,
                is_secure INTEGER NOT NULL DEFAULT 0,
                is_httponly INTEGER NOT NULL DEFAULT 0,
                creation_utc INTEGER NOT NULL DEFAULT 0
            );",
        )
        .unwrap();
        conn
    }

    #[allow(clippy::too_many_arguments)]
    pub fn insert_chromium_cookie(
        conn: &Connection,
        host_key: &str,
        name: &str,
        value: &str,
        encrypted_value: &[u8],
        expires_utc: i64,
        is_secure: bool,
        is_http_only: bool,
    ) {
        conn.execute(
            "INSERT INTO cookies (host_key, name, value, encrypted_value, path, expires_utc, \
             is_secure, is_httponly, creation_utc) VALUES (?1, ?2, ?3, ?4, '/', ?5, ?6, ?7, 0)",
            rusqlite::params![
                host_key,
                name,
                value,
                encrypted_value,
                expires_utc,
                is_secure as i64,
                is_http_only as i64
            ],
        )
        .unwrap();
    }

    pub fn create_firefox_store(path: &Path) -> Connection {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE moz_cookies (
                host TEXT NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL DEFAULT '',
                path TEXT NOT NULL DEFAULT '/',
                expiry INTEGER NOT NULL DEFAULT 0,
                isSecure INTEGER NOT NULL DEFAULT 0,
                isHttpOnly INTEGER NOT NULL DEFAULT 0,
                creationTime INTEGER NOT NULL DEFAULT 0
            );",
        )
        .unwrap();
        conn
    }

    pub fn insert_firefox_cookie(
        conn: &Connection,
        host: &str,
        name: &str,
        value: &str,
        expiry: i64,
    ) {
        conn.execute(
            "INSERT INTO moz_cookies (host, name, value, path, expiry, isSecure, isHttpOnly, \
             creationTime) VALUES (?1, ?2, ?3, '/', ?4, 0, 0, 0)",
            rusqlite::params![host, name, value, expiry],
        )
        .unwrap();
    }
}
