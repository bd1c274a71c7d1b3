pub mod fetch;
pub mod print;
pub mod system;

use async_trait::async_trait;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum LaunchError {
    #[error("failed to start opener {program}: {source}")]
    Spawn { program: String, source: std::io::Error },

    #[error("opener {program} exited with {status}")]
    OpenerFailed { program: String, status: std::process::ExitStatus },

    #[error("download request failed: {0}")]
    Http(String),

    #[error("download returned http status {0}")]
    Status(u16),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Handed to an external browsing context.
    Opened,
    /// Fetched to the given local path.
    Saved(PathBuf),
    Printed,
}

/// Opens a download reference. The form never fetches the report itself.
#[async_trait]
pub trait DownloadLauncher: Send + Sync {
    fn name(&self) -> &'static str;
    async fn open(&self, url: &str) -> Result<LaunchOutcome, LaunchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherKind {
    System,
    Fetch,
    Print,
    None,
}

impl LauncherKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "system" | "browser" => Some(Self::System),
            "fetch" | "save" => Some(Self::Fetch),
            "print" => Some(Self::Print),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}
