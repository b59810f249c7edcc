//! Epoch conversions for the three timestamp bases found in browser
//! cookie stores.

use tracing::warn;

/// Seconds between 2001-01-01 (Mac epoch) and 1970-01-01 (Unix epoch).
pub const MAC_EPOCH_OFFSET_SECONDS: i64 = 978_307_200;

/// Seconds between 1601-01-01 (Chromium/Windows epoch) and 1970-01-01.
pub const WINDOWS_EPOCH_OFFSET_SECONDS: i64 = 11_644_473_600;

/// Largest plausible Mac-epoch timestamp; anything above is corrupted.
pub const MAX_MAC_TIMESTAMP_SECONDS: i64 = 1_000_000_000;

pub fn now_seconds() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Converts a Mac-epoch double (seconds since 2001-01-01) to Unix
/// seconds. A stored 0 is preserved as the session-cookie marker.
/// Values outside `[0, 10^9]` are corrupted and substitute 0.
pub fn mac_epoch_to_unix(raw: f64) -> i64 {
    let secs = raw as i64;
    if secs == 0 {
        return 0;
    }
    if !(0..=MAX_MAC_TIMESTAMP_SECONDS).contains(&secs) {
        warn!(raw = secs, "timestamp outside the accepted range, substituting 0");
        return 0;
    }
    secs + MAC_EPOCH_OFFSET_SECONDS
}

/// Chromium `expires_utc`/`creation_utc` (microseconds since
/// 1601-01-01) to Unix seconds. 0 stays 0 (session cookie).
pub fn chromium_epoch_to_unix_seconds(micros: i64) -> i64 {
    if micros <= 0 {
        return 0;
    }
    micros / 1_000_000 - WINDOWS_EPOCH_OFFSET_SECONDS
}

/// Chromium microseconds since 1601-01-01 to Unix milliseconds,
/// `floor(micros / 1000) - 11_644_473_600_000`.
pub fn chromium_epoch_to_unix_millis(micros: i64) -> i64 {
    if micros <= 0 {
        return 0;
    }
    micros / 1000 - WINDOWS_EPOCH_OFFSET_SECONDS * 1000
}
