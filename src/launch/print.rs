use crate::launch::{DownloadLauncher, LaunchError, LaunchOutcome};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

/// Writes the download reference to stdout for the user to open.
pub struct PrintLauncher;

impl PrintLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DownloadLauncher for PrintLauncher {
    fn name(&self) -> &'static str {
        "print"
    }

    async fn open(&self, url: &str) -> Result<LaunchOutcome, LaunchError> {
        let mut out = tokio::io::stdout();
        out.write_all(format!("{url}\n").as_bytes()).await?;
        out.flush().await?;
        Ok(LaunchOutcome::Printed)
    }
}
