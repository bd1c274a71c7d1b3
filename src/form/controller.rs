use crate::config::ApiConfig;
use crate::form::events::FormEvent;
use crate::form::model::{DetectRequest, OrganizationId, ProcessingStatus, SubmissionId};
use crate::i18n::{Messages, EN};
use crate::launch::{DownloadLauncher, LaunchError, LaunchOutcome};
use crate::transport::{DetectTransport, TransportError};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Point-in-time copy of everything the view needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSnapshot {
    pub input: String,
    pub in_flight: bool,
    pub status: Option<ProcessingStatus>,
    pub download_url: Option<String>,
}

impl FormSnapshot {
    pub fn can_download(&self) -> bool {
        matches!(self.status, Some(ProcessingStatus::Completed { .. })) && self.download_url.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyInput,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was sent and the state is unchanged.
    Rejected { reason: RejectReason, message: String },
    Completed { submission_id: SubmissionId, filename: String, download_url: String },
    Failed { submission_id: SubmissionId, message: String },
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Completed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Launched(LaunchOutcome),
    /// No completed report; no navigation happened.
    NotReady,
}

/// The status-driven submission form.
///
/// Cloning yields another handle onto the same form. State is only mutated by
/// `set_input`, `submit` and `download`; the lock is never held across the
/// network call.
#[derive(Clone)]
pub struct SubmissionForm {
    api: ApiConfig,
    transport: Arc<dyn DetectTransport>,
    launcher: Arc<dyn DownloadLauncher>,
    messages: &'static Messages,
    event_tx: broadcast::Sender<FormEvent>,
    state: Arc<Mutex<FormSnapshot>>,
}

impl SubmissionForm {
    pub fn new(
        api: ApiConfig,
        transport: Arc<dyn DetectTransport>,
        launcher: Arc<dyn DownloadLauncher>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            api,
            transport,
            launcher,
            messages: &EN,
            event_tx,
            state: Arc::new(Mutex::new(FormSnapshot::default())),
        }
    }

    pub fn with_messages(mut self, messages: &'static Messages) -> Self {
        self.messages = messages;
        self
    }

    pub fn messages(&self) -> &'static Messages {
        self.messages
    }

    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.event_tx.subscribe()
    }

    pub async fn snapshot(&self) -> FormSnapshot {
        self.state.lock().await.clone()
    }

    /// Updates the input field. Returns `false` while a submission is in
    /// flight, since the field is disabled then.
    pub async fn set_input(&self, value: impl Into<String>) -> bool {
        let mut st = self.state.lock().await;
        if st.in_flight {
            return false;
        }
        st.input = value.into();
        true
    }

    /// `set_input` followed by `submit`.
    pub async fn submit_input(&self, value: impl Into<String>) -> SubmitOutcome {
        if !self.set_input(value).await {
            return self.reject(RejectReason::InFlight, self.messages.busy_rejected);
        }
        self.submit().await
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (submission_id, org) = {
            let mut st = self.state.lock().await;
            if st.in_flight {
                drop(st);
                return self.reject(RejectReason::InFlight, self.messages.busy_rejected);
            }
            let org = match OrganizationId::parse(&st.input) {
                Some(org) => org,
                None => {
                    drop(st);
                    return self.reject(RejectReason::EmptyInput, self.messages.empty_input_alert);
                }
            };

            st.in_flight = true;
            st.status = Some(ProcessingStatus::Processing {
                progress: self.messages.progress_analyzing.to_string(),
            });
            st.download_url = None;
            (Uuid::new_v4(), org)
        };

        info!(%submission_id, organization_id = %org, transport = self.transport.name(), "submission started");
        let _ = self.event_tx.send(FormEvent::SubmissionStarted {
            submission_id,
            organization_id: org.clone(),
        });
        let _ = self.event_tx.send(FormEvent::InFlightChanged { in_flight: true });
        let _ = self.event_tx.send(FormEvent::StatusChanged {
            submission_id,
            status: ProcessingStatus::Processing { progress: self.messages.progress_analyzing.to_string() },
        });

        let request = DetectRequest::new(&org);
        let result = self.transport.detect_duplicates(&self.api, &request).await;

        let (status, download_url, outcome) = match result {
            Ok(report) => {
                let url = self.api.download_url(&report.filename);
                info!(%submission_id, filename = %report.filename, "submission completed");
                (
                    ProcessingStatus::Completed {
                        progress: self.messages.progress_complete.to_string(),
                        filename: report.filename.clone(),
                    },
                    Some(url.clone()),
                    SubmitOutcome::Completed { submission_id, filename: report.filename, download_url: url },
                )
            }
            Err(e) => {
                let message = self.failure_message(&e);
                error!(%submission_id, error = %e, "submission failed");
                (
                    ProcessingStatus::Error { error: message.clone() },
                    None,
                    SubmitOutcome::Failed { submission_id, message },
                )
            }
        };

        {
            let mut st = self.state.lock().await;
            st.status = Some(status.clone());
            st.download_url = download_url.clone();
            st.in_flight = false;
        }

        let _ = self.event_tx.send(FormEvent::StatusChanged { submission_id, status });
        if let Some(url) = download_url {
            let _ = self.event_tx.send(FormEvent::DownloadReady { submission_id, url });
        }
        let _ = self.event_tx.send(FormEvent::InFlightChanged { in_flight: false });

        outcome
    }

    /// Opens the download reference through the launcher. A no-op unless the
    /// current status is completed with a reference.
    pub async fn download(&self) -> Result<DownloadOutcome, LaunchError> {
        let url = {
            let st = self.state.lock().await;
            if !st.can_download() {
                None
            } else {
                st.download_url.clone()
            }
        };

        let Some(url) = url else {
            let _ = self.event_tx.send(FormEvent::Info {
                scope: "download".to_string(),
                message: self.messages.nothing_to_download.to_string(),
            });
            return Ok(DownloadOutcome::NotReady);
        };

        match self.launcher.open(&url).await {
            Ok(outcome) => {
                info!(%url, launcher = self.launcher.name(), "download opened");
                let _ = self.event_tx.send(FormEvent::DownloadOpened { url });
                Ok(DownloadOutcome::Launched(outcome))
            }
            Err(e) => {
                warn!(%url, launcher = self.launcher.name(), error = %e, "download launcher failed");
                Err(e)
            }
        }
    }

    fn reject(&self, reason: RejectReason, message: &str) -> SubmitOutcome {
        warn!(?reason, "submission rejected");
        if reason == RejectReason::EmptyInput {
            let _ = self.event_tx.send(FormEvent::Alert { message: message.to_string() });
        }
        SubmitOutcome::Rejected { reason, message: message.to_string() }
    }

    fn failure_message(&self, e: &TransportError) -> String {
        match e {
            TransportError::Rejected { message: Some(m), .. } => m.clone(),
            TransportError::Rejected { message: None, .. } => self.messages.failed_to_start.to_string(),
            other => {
                let text = other.to_string();
                if text.trim().is_empty() {
                    self.messages.unknown_error.to_string()
                } else {
                    text
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::model::StatusKind;
    use crate::transport::DetectedReport;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct ScriptedTransport {
        reply: Result<DetectedReport, TransportError>,
        requests: std::sync::Mutex<Vec<DetectRequest>>,
    }

    impl ScriptedTransport {
        fn new(reply: Result<DetectedReport, TransportError>) -> Arc<Self> {
            Arc::new(Self { reply, requests: std::sync::Mutex::new(vec![]) })
        }

        fn requests(&self) -> Vec<DetectRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DetectTransport for ScriptedTransport {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn detect_duplicates(
            &self,
            _api: &ApiConfig,
            request: &DetectRequest,
        ) -> Result<DetectedReport, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    /// Holds every request until `release` is notified.
    struct GatedTransport {
        gate: Notify,
        entered: Notify,
    }

    #[async_trait]
    impl DetectTransport for GatedTransport {
        fn name(&self) -> &'static str {
            "gated"
        }

        async fn detect_duplicates(
            &self,
            _api: &ApiConfig,
            _request: &DetectRequest,
        ) -> Result<DetectedReport, TransportError> {
            self.entered.notify_one();
            self.gate.notified().await;
            Ok(DetectedReport { filename: "late.xlsx".into() })
        }
    }

    #[derive(Default)]
    struct RecordingLauncher {
        opened: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DownloadLauncher for RecordingLauncher {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn open(&self, url: &str) -> Result<LaunchOutcome, LaunchError> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(LaunchOutcome::Opened)
        }
    }

    fn api() -> ApiConfig {
        ApiConfig::new("https://api.example.com").unwrap()
    }

    fn form_with(
        transport: Arc<dyn DetectTransport>,
    ) -> (SubmissionForm, Arc<RecordingLauncher>) {
        let launcher = Arc::new(RecordingLauncher::default());
        (SubmissionForm::new(api(), transport, launcher.clone()), launcher)
    }

    #[tokio::test]
    async fn completed_submission_builds_download_reference() {
        let transport = ScriptedTransport::new(Ok(DetectedReport { filename: "report123.xlsx".into() }));
        let (form, _) = form_with(transport.clone());

        let outcome = form.submit_input("  867850976 ").await;
        assert!(outcome.is_success());

        let reqs = transport.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].organization_id, "867850976");

        let snap = form.snapshot().await;
        assert!(!snap.in_flight);
        assert_eq!(
            snap.status,
            Some(ProcessingStatus::Completed {
                progress: "Analysis complete!".into(),
                filename: "report123.xlsx".into(),
            })
        );
        assert_eq!(
            snap.download_url.as_deref(),
            Some("https://api.example.com/download/report123.xlsx")
        );
    }

    #[tokio::test]
    async fn server_error_message_is_surfaced_verbatim() {
        let transport = ScriptedTransport::new(Err(TransportError::Rejected {
            status: 404,
            message: Some("Organization not found".into()),
        }));
        let (form, _) = form_with(transport);

        let outcome = form.submit_input("missing-org").await;
        assert!(matches!(outcome, SubmitOutcome::Failed { ref message, .. } if message == "Organization not found"));

        let snap = form.snapshot().await;
        assert_eq!(snap.status.as_ref().map(|s| s.kind()), Some(StatusKind::Error));
        assert_eq!(snap.status.as_ref().and_then(|s| s.error()), Some("Organization not found"));
        assert_eq!(snap.download_url, None);
        assert!(!snap.in_flight);
    }

    #[tokio::test]
    async fn failure_messages_fall_back() {
        let cases = [
            (TransportError::Rejected { status: 500, message: None }, "Failed to start processing"),
            (TransportError::Network("connection refused".into()), "connection refused"),
            (TransportError::Network(String::new()), "Unknown error"),
            (TransportError::Decode("  ".into()), "Unknown error"),
        ];
        for (err, expected) in cases {
            let (form, _) = form_with(ScriptedTransport::new(Err(err)));
            form.submit_input("42").await;
            let snap = form.snapshot().await;
            assert_eq!(snap.status.as_ref().and_then(|s| s.error()), Some(expected));
        }
    }

    #[tokio::test]
    async fn empty_input_alerts_without_request_or_state_change() {
        let transport = ScriptedTransport::new(Ok(DetectedReport { filename: "a.xlsx".into() }));
        let (form, _) = form_with(transport.clone());
        form.submit_input("42").await;
        let before = form.snapshot().await;

        let mut rx = form.subscribe();
        let outcome = form.submit_input("   ").await;
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                reason: RejectReason::EmptyInput,
                message: "Please enter an organization ID".into(),
            }
        );
        assert_eq!(transport.requests().len(), 1);

        let after = form.snapshot().await;
        assert_eq!(after.status, before.status);
        assert_eq!(after.download_url, before.download_url);
        assert!(matches!(rx.try_recv(), Ok(FormEvent::Alert { .. })));
    }

    #[tokio::test]
    async fn processing_is_visible_before_resolution_and_blocks_resubmit() {
        let transport = Arc::new(GatedTransport { gate: Notify::new(), entered: Notify::new() });
        let (form, _) = form_with(transport.clone());
        form.set_input("42").await;

        let runner = form.clone();
        let task = tokio::spawn(async move { runner.submit().await });
        transport.entered.notified().await;

        let snap = form.snapshot().await;
        assert!(snap.in_flight);
        assert_eq!(snap.status.as_ref().map(|s| s.kind()), Some(StatusKind::Processing));
        assert_eq!(snap.status.as_ref().and_then(|s| s.progress()), Some("Analyzing duplicates..."));
        assert_eq!(snap.download_url, None);

        assert!(!form.set_input("43").await);
        assert!(matches!(
            form.submit().await,
            SubmitOutcome::Rejected { reason: RejectReason::InFlight, .. }
        ));

        transport.gate.notify_one();
        let outcome = task.await.unwrap();
        assert!(outcome.is_success());
        let snap = form.snapshot().await;
        assert!(!snap.in_flight);
        assert_eq!(snap.input, "42");
    }

    #[tokio::test]
    async fn new_submission_clears_previous_reference() {
        let ok = ScriptedTransport::new(Ok(DetectedReport { filename: "first.xlsx".into() }));
        let launcher = Arc::new(RecordingLauncher::default());
        let form = SubmissionForm::new(api(), ok, launcher.clone());
        form.submit_input("1").await;
        assert!(form.snapshot().await.can_download());

        let failing: Arc<dyn DetectTransport> =
            ScriptedTransport::new(Err(TransportError::Network("timed out".into())));
        let form2 = SubmissionForm { transport: failing, ..form.clone() };
        form2.submit_input("2").await;

        let snap = form.snapshot().await;
        assert_eq!(snap.download_url, None);
        assert!(!snap.can_download());
        assert_eq!(form.download().await.unwrap(), DownloadOutcome::NotReady);
        assert!(launcher.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn download_opens_reference_only_when_completed() {
        let transport = ScriptedTransport::new(Ok(DetectedReport { filename: "report123.xlsx".into() }));
        let (form, launcher) = form_with(transport);

        assert_eq!(form.download().await.unwrap(), DownloadOutcome::NotReady);
        assert!(launcher.opened.lock().unwrap().is_empty());

        form.submit_input("42").await;
        let mut rx = form.subscribe();
        assert_eq!(
            form.download().await.unwrap(),
            DownloadOutcome::Launched(LaunchOutcome::Opened)
        );
        assert_eq!(
            launcher.opened.lock().unwrap().as_slice(),
            ["https://api.example.com/download/report123.xlsx".to_string()]
        );
        assert!(matches!(rx.try_recv(), Ok(FormEvent::DownloadOpened { .. })));
    }

    #[tokio::test]
    async fn events_trace_the_state_machine() {
        let transport = ScriptedTransport::new(Ok(DetectedReport { filename: "r.xlsx".into() }));
        let (form, _) = form_with(transport);
        let mut rx = form.subscribe();
        form.submit_input("42").await;

        let mut kinds = vec![];
        while let Ok(evt) = rx.try_recv() {
            kinds.push(match evt {
                FormEvent::SubmissionStarted { .. } => "started".to_string(),
                FormEvent::InFlightChanged { in_flight } => format!("in_flight={in_flight}"),
                FormEvent::StatusChanged { status, .. } => status.kind().as_str().to_string(),
                FormEvent::DownloadReady { .. } => "ready".to_string(),
                other => format!("{other:?}"),
            });
        }
        assert_eq!(
            kinds,
            ["started", "in_flight=true", "processing", "completed", "ready", "in_flight=false"]
        );
    }

    #[tokio::test]
    async fn localized_messages_flow_into_status() {
        let transport = ScriptedTransport::new(Ok(DetectedReport { filename: "r.xlsx".into() }));
        let launcher = Arc::new(RecordingLauncher::default());
        let form = SubmissionForm::new(api(), transport, launcher).with_messages(&crate::i18n::ZH);
        form.submit_input("42").await;
        let snap = form.snapshot().await;
        assert_eq!(snap.status.as_ref().and_then(|s| s.progress()), Some("分析完成！"));
    }
}
