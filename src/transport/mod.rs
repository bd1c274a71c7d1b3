pub mod cli;
pub mod http;

use crate::config::ApiConfig;
use crate::form::model::DetectRequest;
use async_trait::async_trait;
use std::collections::HashMap;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Non-2xx response. `message` is the body's `error` field when present.
    #[error("server rejected request ({status}){}", rejected_suffix(.message))]
    Rejected { status: u16, message: Option<String> },

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    Decode(String),

    #[error("response is missing filename")]
    MissingFilename,

    #[error("invalid transport option: {0}")]
    InvalidOption(String),
}

fn rejected_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Successful outcome of a detection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedReport {
    pub filename: String,
}

#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    /// `None` lets a request run until the transport reports completion or failure.
    pub timeout_secs: Option<u64>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("dupe-refiner/{}", env!("CARGO_PKG_VERSION")),
            headers: HashMap::new(),
            timeout_secs: None,
        }
    }
}

/// Submits a detection request and parses the reply. One call, one request.
#[async_trait]
pub trait DetectTransport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn detect_duplicates(
        &self,
        api: &ApiConfig,
        request: &DetectRequest,
    ) -> Result<DetectedReport, TransportError>;
}
