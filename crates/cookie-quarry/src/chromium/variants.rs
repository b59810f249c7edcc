//! The Chromium browser family: per-variant keychain service names and
//! per-user profile roots.

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromiumVariant {
    Chrome,
    Chromium,
    Edge,
    Arc,
    Opera,
    OperaGx,
    Brave,
}

impl ChromiumVariant {
    /// Deterministic fan-out order for the all-browsers composite.
    pub const ALL: [ChromiumVariant; 7] = [
        ChromiumVariant::Chrome,
        ChromiumVariant::Chromium,
        ChromiumVariant::Edge,
        ChromiumVariant::Arc,
        ChromiumVariant::Opera,
        ChromiumVariant::OperaGx,
        ChromiumVariant::Brave,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Chromium => "chromium",
            Self::Edge => "edge",
            Self::Arc => "arc",
            Self::Opera => "opera",
            Self::OperaGx => "opera-gx",
            Self::Brave => "brave",
        }
    }

    pub fn keychain_service(self) -> &'static str {
        match self {
            Self::Chrome => "Chrome Safe Storage",
            Self::Chromium => "Chromium Safe Storage",
            Self::Edge => "Microsoft Edge Safe Storage",
            Self::Arc => "Arc Safe Storage",
            Self::Opera => "Opera Safe Storage",
            Self::OperaGx => "Opera GX Safe Storage",
            Self::Brave => "Brave Safe Storage",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "chrome" => Some(Self::Chrome),
            "chromium" => Some(Self::Chromium),
            "edge" => Some(Self::Edge),
            "arc" => Some(Self::Arc),
            "opera" => Some(Self::Opera),
            "opera-gx" | "operagx" | "opera gx" => Some(Self::OperaGx),
            "brave" => Some(Self::Brave),
            _ => None,
        }
    }

    /// Per-user profile roots for this variant on the current platform.
    /// Missing homes yield an empty list, never an error.
    #[cfg(target_os = "macos")]
    pub fn roots(self) -> Vec<PathBuf> {
        let Some(home) = dirs::home_dir() else {
            return Vec::new();
        };
        let support = home.join("Library/Application Support");
        match self {
            Self::Chrome => vec![support.join("Google/Chrome")],
            Self::Chromium => vec![support.join("Chromium")],
            Self::Edge => vec![support.join("Microsoft Edge")],
            Self::Arc => vec![support.join("Arc/User Data")],
            Self::Opera => vec![support.join("com.operasoftware.Opera")],
            Self::OperaGx => vec![support.join("com.operasoftware.OperaGX")],
            Self::Brave => vec![support.join("BraveSoftware/Brave-Browser")],
        }
    }

    #[cfg(not(target_os = "macos"))]
    pub fn roots(self) -> Vec<PathBuf> {
        let Some(config) = config_home() else {
            return Vec::new();
        };
        match self {
            Self::Chrome => vec![config.join("google-chrome")],
            Self::Chromium => vec![config.join("chromium")],
            Self::Edge => vec![config.join("microsoft-edge")],
            Self::Arc => Vec::new(),
            Self::Opera => vec![config.join("opera")],
            Self::OperaGx => Vec::new(),
            Self::Brave => vec![config.join("BraveSoftware/Brave-Browser")],
        }
    }
}

#[cfg(not(target_os = "macos"))]
fn config_home() -> Option<PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
}

impl std::fmt::Display for ChromiumVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_labels() {
        for variant in ChromiumVariant::ALL {
            assert_eq!(ChromiumVariant::from_token(variant.label()), Some(variant));
        }
    }

    #[test]
    fn token_aliases_and_case() {
        assert_eq!(
            ChromiumVariant::from_token("Opera GX"),
            Some(ChromiumVariant::OperaGx)
        );
        assert_eq!(
            ChromiumVariant::from_token("OPERAGX"),
            Some(ChromiumVariant::OperaGx)
        );
        assert_eq!(ChromiumVariant::from_token("  Chrome "), Some(ChromiumVariant::Chrome));
        assert_eq!(ChromiumVariant::from_token("netscape"), None);
    }

    #[test]
    fn keychain_services_match_vendors() {
        assert_eq!(
            ChromiumVariant::Edge.keychain_service(),
            "Microsoft Edge Safe Storage"
        );
        assert_eq!(
            ChromiumVariant::OperaGx.keychain_service(),
            "Opera GX Safe Storage"
        );
    }
}
