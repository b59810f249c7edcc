use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

/// Failure modes of a helper-binary invocation. Callers in this crate
/// treat all of them as soft failures, so the variants exist mostly to
/// make the log lines tell the three cases apart.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} exited with status {status}: {stderr}")]
    Failed {
        program: String,
        status: i32,
        stderr: String,
    },
}

/// Runs a helper binary under a wall-clock bound and returns its
/// stdout. Anything but a clean zero exit within the deadline is an
/// [`ExecError`].
pub async fn capture_stdout(
    program: &str,
    args: &[&str],
    timeout: Duration,
) -> Result<String, ExecError> {
    let run = Command::new(program).args(args).output();

    let output = match tokio::time::timeout(timeout, run).await {
        Ok(Ok(output)) => output,
        Ok(Err(source)) => {
            return Err(ExecError::Spawn {
                program: program.to_string(),
                source,
            })
        }
        Err(_) => {
            return Err(ExecError::TimedOut {
                program: program.to_string(),
                timeout,
            })
        }
    };

    if !output.status.success() {
        return Err(ExecError::Failed {
            program: program.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_of_a_clean_exit() {
        let out = capture_stdout("echo", &["crumbs"], Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.trim(), "crumbs");
    }

    #[tokio::test]
    async fn nonzero_exit_reports_status() {
        match capture_stdout("false", &[], Duration::from_secs(5)).await {
            Err(ExecError::Failed { status, .. }) => assert_ne!(status, 0),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_binary_reports_spawn_failure() {
        let result =
            capture_stdout("cookie-quarry-no-such-binary", &[], Duration::from_secs(5)).await;
        assert!(matches!(result, Err(ExecError::Spawn { .. })));
    }

    #[tokio::test]
    async fn deadline_overrun_reports_timeout() {
        let result = capture_stdout("sleep", &["5"], Duration::from_millis(50)).await;
        assert!(matches!(result, Err(ExecError::TimedOut { .. })));
    }
}
