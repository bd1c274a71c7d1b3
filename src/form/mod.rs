pub mod controller;
pub mod events;
pub mod model;
pub mod render;

pub use controller::{DownloadOutcome, FormSnapshot, RejectReason, SubmissionForm, SubmitOutcome};
pub use events::FormEvent;
pub use model::{OrganizationId, ProcessingStatus, StatusKind};
