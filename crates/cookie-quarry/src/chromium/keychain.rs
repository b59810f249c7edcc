//! Master-secret lookup in the OS keychain. Fail-soft by contract:
//! every failure path returns an empty secret and the pipeline falls
//! back to the unencrypted `value` column or hex rendering.

use std::time::Duration;

pub const KEYCHAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[cfg(target_os = "macos")]
pub async fn get_generic_password(service: &str) -> String {
    use tracing::warn;

    use crate::util::exec::capture_stdout;

    let lookup = capture_stdout(
        "security",
        &["find-generic-password", "-w", "-s", service],
        KEYCHAIN_TIMEOUT,
    )
    .await;

    match lookup {
        Ok(stdout) => stdout.trim().to_string(),
        Err(err) => {
            warn!(service, %err, "keychain lookup failed, continuing without master secret");
            String::new()
        }
    }
}

#[cfg(not(target_os = "macos"))]
pub async fn get_generic_password(service: &str) -> String {
    tracing::debug!(service, "no OS keychain accessor on this platform");
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_entry_fails_soft() {
        // Whatever the platform, a nonsense service name must come
        // back as the empty string rather than an error.
        let secret = get_generic_password("No Such Browser Safe Storage").await;
        assert_eq!(secret, "");
    }
}
