use crate::launch::{DownloadLauncher, LaunchError, LaunchOutcome};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Opens the reference in the platform's default browser.
pub struct SystemLauncher {
    program: String,
    prefix_args: Vec<String>,
}

impl SystemLauncher {
    pub fn new() -> Self {
        let (program, prefix_args) = Self::platform_opener();
        Self { program, prefix_args }
    }

    /// Uses a specific opener binary, e.g. `firefox` or a test double.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self { program: program.into(), prefix_args: vec![] }
    }

    fn platform_opener() -> (String, Vec<String>) {
        if cfg!(target_os = "windows") {
            // the empty string is the window title `start` expects first
            ("cmd".to_string(), vec!["/C".into(), "start".into(), "".into()])
        } else if cfg!(target_os = "macos") {
            ("open".to_string(), vec![])
        } else {
            ("xdg-open".to_string(), vec![])
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

#[async_trait]
impl DownloadLauncher for SystemLauncher {
    fn name(&self) -> &'static str {
        "system"
    }

    async fn open(&self, url: &str) -> Result<LaunchOutcome, LaunchError> {
        debug!(program = %self.program, %url, "spawning opener");
        let status = Command::new(&self.program)
            .args(&self.prefix_args)
            .arg(url)
            .status()
            .await
            .map_err(|source| LaunchError::Spawn { program: self.program.clone(), source })?;

        if !status.success() {
            return Err(LaunchError::OpenerFailed { program: self.program.clone(), status });
        }
        Ok(LaunchOutcome::Opened)
    }
}
