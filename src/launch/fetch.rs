use crate::launch::{DownloadLauncher, LaunchError, LaunchOutcome};
use crate::transport::{http::HttpTransport, TransportOptions};
use async_trait::async_trait;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::HeaderMap;
use sanitize_filename::sanitize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;
use url::Url;

/// Streams the report straight into a local directory.
pub struct FetchLauncher {
    client: reqwest::Client,
    headers: HeaderMap,
    out_dir: PathBuf,
    show_progress: bool,
}

impl FetchLauncher {
    pub fn new(out_dir: PathBuf, options: &TransportOptions) -> Result<Self, LaunchError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| LaunchError::Http(e.to_string()))?;
        let headers = HttpTransport::build_headers(options).map_err(|e| LaunchError::Http(e.to_string()))?;
        Ok(Self { client, headers, out_dir, show_progress: true })
    }

    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn target_path(&self, url: &str) -> PathBuf {
        self.out_dir.join(file_name_for(url))
    }

    fn progress_bar(&self, total: Option<u64>, name: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = match total {
            Some(t) => {
                let pb = ProgressBar::new(t);
                if let Ok(sty) = ProgressStyle::with_template(
                    "{prefix} {bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, eta {eta})",
                ) {
                    pb.set_style(sty);
                }
                pb
            }
            None => ProgressBar::new_spinner(),
        };
        pb.set_prefix(format!("[{name}]"));
        pb
    }
}

/// Last path segment of the reference, sanitized for the local filesystem.
fn file_name_for(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|s| s.last().map(|s| s.to_string()))
        })
        .filter(|s| !s.is_empty())
        .map(sanitize)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "report.xlsx".to_string())
}

#[async_trait]
impl DownloadLauncher for FetchLauncher {
    fn name(&self) -> &'static str {
        "fetch"
    }

    async fn open(&self, url: &str) -> Result<LaunchOutcome, LaunchError> {
        tokio::fs::create_dir_all(&self.out_dir).await?;

        let resp = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| LaunchError::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(LaunchError::Status(resp.status().as_u16()));
        }

        let target = self.target_path(url);
        let partial = target.with_extension(match target.extension() {
            Some(ext) => format!("{}.part", ext.to_string_lossy()),
            None => "part".to_string(),
        });
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let pb = self.progress_bar(resp.content_length(), &name);
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut stream = resp.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(&partial).await;
                    pb.abandon();
                    return Err(LaunchError::Http(e.to_string()));
                }
            };
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            pb.set_position(written);
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&partial, &target).await?;
        pb.finish_and_clear();
        info!(path = %target.display(), bytes = written, "report saved");
        Ok(LaunchOutcome::Saved(target))
    }
}
