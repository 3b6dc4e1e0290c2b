use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures while materializing or enumerating the input location
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("git clone of {url} failed: {stderr}")]
    CloneFailed { url: String, stderr: String },

    #[error("git clone of {url} timed out after {seconds}s")]
    CloneTimeout { url: String, seconds: u64 },

    #[error("Failed to run git: {0}")]
    GitUnavailable(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum StateError {
    #[error("State file IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("State serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
