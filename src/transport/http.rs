use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::form::model::{DetectRequest, DetectResponse};
use crate::transport::{DetectTransport, DetectedReport, TransportError, TransportOptions};

/// reqwest-backed transport for `POST {base}/detect-duplicates`.
pub struct HttpTransport {
    client: reqwest::Client,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(options: &TransportOptions) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            headers: Self::build_headers(options)?,
            timeout: options.timeout_secs.map(Duration::from_secs),
        })
    }

    pub(crate) fn build_headers(options: &TransportOptions) -> Result<HeaderMap, TransportError> {
        let mut h = HeaderMap::new();
        h.insert(
            USER_AGENT,
            HeaderValue::from_str(&options.user_agent)
                .map_err(|e| TransportError::InvalidOption(format!("user agent: {e}")))?,
        );
        for (k, v) in &options.headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .map_err(|e| TransportError::InvalidOption(format!("header name {k}: {e}")))?;
            let value = HeaderValue::from_str(v)
                .map_err(|e| TransportError::InvalidOption(format!("header value for {k}: {e}")))?;
            h.insert(name, value);
        }
        Ok(h)
    }

    fn interpret(status: reqwest::StatusCode, body: &[u8]) -> Result<DetectedReport, TransportError> {
        if status.is_success() {
            let parsed: DetectResponse = serde_json::from_slice(body)
                .map_err(|e| TransportError::Decode(format!("invalid response body: {e}")))?;
            return match parsed.filename {
                Some(filename) if !filename.is_empty() => Ok(DetectedReport { filename }),
                _ => Err(TransportError::MissingFilename),
            };
        }

        // 4xx and 5xx are treated alike; only the `error` field matters.
        let message = serde_json::from_slice::<DetectResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .filter(|m| !m.is_empty());
        Err(TransportError::Rejected { status: status.as_u16(), message })
    }
}

#[async_trait]
impl DetectTransport for HttpTransport {
    fn name(&self) -> &'static str {
        "http-transport"
    }

    async fn detect_duplicates(
        &self,
        api: &ApiConfig,
        request: &DetectRequest,
    ) -> Result<DetectedReport, TransportError> {
        let url = api.detect_url();
        debug!(%url, "posting detection request");

        let mut req = self.client.post(&url).headers(self.headers.clone()).json(request);
        if let Some(t) = self.timeout {
            req = req.timeout(t);
        }

        let resp = req.send().await.map_err(|e| TransportError::Network(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let result = Self::interpret(status, &body);
        if let Err(e) = &result {
            warn!(%url, status = status.as_u16(), error = %e, "detection request failed");
        }
        result
    }
}
