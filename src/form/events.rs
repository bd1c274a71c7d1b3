use crate::form::model::{OrganizationId, ProcessingStatus, SubmissionId};

#[derive(Debug, Clone)]
pub enum FormEvent {
    SubmissionStarted { submission_id: SubmissionId, organization_id: OrganizationId },
    StatusChanged { submission_id: SubmissionId, status: ProcessingStatus },
    InFlightChanged { in_flight: bool },
    DownloadReady { submission_id: SubmissionId, url: String },
    DownloadOpened { url: String },
    /// Blocking alert for the user; state is unchanged.
    Alert { message: String },
    Info { scope: String, message: String },
}
