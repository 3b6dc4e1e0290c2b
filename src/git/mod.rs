//! Materializes remote repositories with the `git` binary

use crate::pipeline::DiscoveryError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Default ceiling for a shallow clone
pub const DEFAULT_CLONE_TIMEOUT: Duration = Duration::from_secs(300);

/// Fresh, not yet existing directory under the system temp dir
pub fn clone_destination() -> PathBuf {
    std::env::temp_dir().join(format!("logicmapper-{}", uuid::Uuid::new_v4()))
}

/// Shallow, single-branch clone of `url` into `destination`
///
/// The clone is killed when `timeout` elapses. The destination is left on
/// disk in every case; callers own its cleanup.
pub async fn shallow_clone(
    url: &str,
    destination: &Path,
    timeout: Duration,
) -> Result<(), DiscoveryError> {
    info!(url, dest = %destination.display(), "Cloning repository");

    let child = Command::new("git")
        .args(["clone", "--depth", "1", "--single-branch", url])
        .arg(destination)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(DiscoveryError::GitUnavailable)?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(DiscoveryError::GitUnavailable)?,
        Err(_) => {
            return Err(DiscoveryError::CloneTimeout {
                url: url.to_string(),
                seconds: timeout.as_secs(),
            })
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(DiscoveryError::CloneFailed {
            url: url.to_string(),
            stderr,
        });
    }

    debug!(url, "Clone complete");
    Ok(())
}
