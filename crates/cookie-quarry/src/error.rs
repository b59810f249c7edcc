use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while decoding a binary cookie container.
///
/// Page- and record-level instances are recovered by the decoder; a bad
/// magic or a file shorter than the fixed header is fatal for that file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("read past end of buffer at offset {offset}")]
    OutOfBounds { offset: usize },

    #[error("not a binary cookies file (bad magic)")]
    BadMagic,

    #[error("file truncated: {0}")]
    Truncated(&'static str),

    #[error("invalid page: {0}")]
    InvalidPage(&'static str),

    #[error("invalid cookie record: {0}")]
    InvalidRecord(&'static str),

    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 { offset: usize },
}

/// A cookie store is exclusively locked by another process, typically
/// the running browser that owns it.
#[derive(Debug, Error)]
#[error("cookie store locked by another process: {}", path.display())]
pub struct LockError {
    pub path: PathBuf,
}

/// Failure to decrypt a Chromium `encrypted_value` blob. Recovered
/// locally by emitting the ciphertext hex-rendered with
/// `decrypted = false`.
#[derive(Debug, Error)]
pub enum DecryptError {
    #[error("ciphertext length {len} is not a multiple of the AES block size")]
    NotBlockAligned { len: usize },

    #[error("AES-128-CBC decryption failed")]
    Cipher,

    #[error("decrypted value is not valid UTF-8")]
    NotUtf8,
}

/// Store-level failure while opening or querying an SQLite cookie
/// database. Never escapes the owning strategy.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Locked(#[from] LockError),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
