use std::fmt::Write;

/// Lowercase hex rendering, used for values that failed to decrypt or
/// decode as UTF-8.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}
