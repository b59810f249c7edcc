use std::path::PathBuf;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Coarse provenance tag carried on every exported cookie. All Chromium
/// family variants report as `Chrome`; mock records report as
/// `Internal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserTag {
    Chrome,
    Firefox,
    Safari,
    Internal,
    Unknown,
}

impl std::fmt::Display for BrowserTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chrome => write!(f, "chrome"),
            Self::Firefox => write!(f, "firefox"),
            Self::Safari => write!(f, "safari"),
            Self::Internal => write!(f, "internal"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The query input: a name pattern and a domain pattern. `%` or `*`
/// means wildcard; empty strings coerce to wildcard at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieSpec {
    pub name: String,
    pub domain: String,
}

impl CookieSpec {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: coerce_wildcard(name.into()),
            domain: coerce_wildcard(domain.into()),
        }
    }
}

fn coerce_wildcard(field: String) -> String {
    if field.trim().is_empty() {
        "%".to_string()
    } else {
        field
    }
}

/// Per-record attribute bits as stored by Safari. `0x8` and `0x10` are
/// reserved and only surface in diagnostic dumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieFlags {
    pub secure: bool,
    pub http_only: bool,
    pub reserved_8: bool,
    pub reserved_10: bool,
}

impl CookieFlags {
    pub const SECURE: u32 = 0x1;
    pub const HTTP_ONLY: u32 = 0x4;
    pub const RESERVED_8: u32 = 0x8;
    pub const RESERVED_10: u32 = 0x10;

    pub fn from_bits(bits: u32) -> Self {
        Self {
            secure: bits & Self::SECURE != 0,
            http_only: bits & Self::HTTP_ONLY != 0,
            reserved_8: bits & Self::RESERVED_8 != 0,
            reserved_10: bits & Self::RESERVED_10 != 0,
        }
    }

    pub fn bits(&self) -> u32 {
        let mut bits = 0;
        if self.secure {
            bits |= Self::SECURE;
        }
        if self.http_only {
            bits |= Self::HTTP_ONLY;
        }
        if self.reserved_8 {
            bits |= Self::RESERVED_8;
        }
        if self.reserved_10 {
            bits |= Self::RESERVED_10;
        }
        bits
    }
}

/// A raw cookie as read from a store, before output transformation.
/// `value` stays bytes until the export boundary.
///
/// `expiry` and `creation` are Unix seconds. An `expiry` of 0 means
/// "session cookie"; negative means no expiry was recorded. A
/// `creation` of 0 means "not recorded".
#[derive(Debug, Clone, PartialEq)]
pub struct RawCookie {
    pub name: String,
    pub value: Vec<u8>,
    pub domain: String,
    pub path: String,
    pub expiry: i64,
    pub creation: i64,
    pub flags: CookieFlags,
    pub version: Option<u32>,
    pub port: Option<u16>,
    pub comment: Option<String>,
    pub comment_url: Option<String>,
}

impl RawCookie {
    /// Stored domain with any leading dot stripped, the form used in
    /// `ExportedCookie.domain`.
    pub fn normalized_domain(&self) -> &str {
        self.domain.strip_prefix('.').unwrap_or(&self.domain)
    }
}

/// Expiry of an exported cookie: a point in time, or the sentinel for
/// cookies that never expire (session cookies map here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    At(i64),
}

impl Expiry {
    /// Maps a raw epoch-seconds expiry: 0 is the "never" sentinel,
    /// positive is a point in time, negative means no expiry was
    /// recorded at all.
    pub fn from_epoch_seconds(secs: i64) -> Option<Self> {
        match secs {
            0 => Some(Self::Never),
            s if s > 0 => Some(Self::At(s)),
            _ => None,
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self, Self::At(t) if *t < now)
    }
}

impl Serialize for Expiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Never => serializer.serialize_str("never"),
            Self::At(t) => serializer.serialize_i64(*t),
        }
    }
}

impl<'de> Deserialize<'de> for Expiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExpiryVisitor;

        impl<'de> Visitor<'de> for ExpiryVisitor {
            type Value = Expiry;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("\"never\" or an epoch-seconds integer")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Expiry, E> {
                Ok(Expiry::At(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Expiry, E> {
                Ok(Expiry::At(v as i64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Expiry, E> {
                if v == "never" {
                    Ok(Expiry::Never)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(ExpiryVisitor)
    }
}

/// Provenance and attribute record attached to every exported cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookieMeta {
    pub file: PathBuf,
    pub browser: BrowserTag,
    /// `false` means the stored value was copied verbatim, either
    /// because no decryption was required or because decryption failed.
    pub decrypted: bool,
    pub secure: bool,
    #[serde(rename = "httpOnly")]
    pub http_only: bool,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "commentURL", skip_serializing_if = "Option::is_none")]
    pub comment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Creation timestamp in milliseconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation: Option<i64>,
}

impl CookieMeta {
    pub fn new(file: impl Into<PathBuf>, browser: BrowserTag) -> Self {
        Self {
            file: file.into(),
            browser,
            decrypted: false,
            secure: false,
            http_only: false,
            path: "/".to_string(),
            version: None,
            comment: None,
            comment_url: None,
            port: None,
            creation: None,
        }
    }
}

/// The coordinator's output record. `name` and `domain` are non-empty;
/// `value` is always text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedCookie {
    pub name: String,
    pub domain: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<Expiry>,
    pub meta: CookieMeta,
}

impl ExportedCookie {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiry.map_or(false, |e| e.is_expired_at(now))
    }
}

/// One strategy invocation: patterns plus per-call store override and
/// lock policy.
#[derive(Debug, Clone)]
pub struct CookieQuery {
    pub name: String,
    pub domain: String,
    pub store: Option<PathBuf>,
    pub force: bool,
}

impl CookieQuery {
    pub fn from_spec(spec: &CookieSpec) -> Self {
        Self {
            name: spec.name.clone(),
            domain: spec.domain.clone(),
            store: None,
            force: false,
        }
    }
}

/// Coordinator options.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub limit: Option<usize>,
    pub remove_expired: bool,
    pub store: Option<PathBuf>,
    pub force: bool,
    /// Case-insensitive browser selector; `None` or an unknown token
    /// queries all supported browsers.
    pub browser: Option<String>,
}
