use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type SubmissionId = Uuid;

/// Trimmed, non-empty organization identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrganizationId(String);

impl OrganizationId {
    /// Returns `None` when the input is empty or whitespace only.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Processing,
    Completed,
    Error,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Processing => "processing",
            StatusKind::Completed => "completed",
            StatusKind::Error => "error",
        }
    }
}

/// State of the current submission. At most one is held by a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProcessingStatus {
    Processing { progress: String },
    Completed { progress: String, filename: String },
    Error { error: String },
}

impl ProcessingStatus {
    pub fn kind(&self) -> StatusKind {
        match self {
            ProcessingStatus::Processing { .. } => StatusKind::Processing,
            ProcessingStatus::Completed { .. } => StatusKind::Completed,
            ProcessingStatus::Error { .. } => StatusKind::Error,
        }
    }

    pub fn progress(&self) -> Option<&str> {
        match self {
            ProcessingStatus::Processing { progress } | ProcessingStatus::Completed { progress, .. } => {
                Some(progress)
            }
            ProcessingStatus::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ProcessingStatus::Error { error } => Some(error),
            _ => None,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            ProcessingStatus::Completed { filename, .. } => Some(filename),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProcessingStatus::Processing { .. })
    }
}

/// Body of `POST /detect-duplicates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectRequest {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
}

impl DetectRequest {
    pub fn new(org: &OrganizationId) -> Self {
        Self { organization_id: org.as_str().to_string() }
    }
}

/// Body returned by `POST /detect-duplicates`, for both success and failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectResponse {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organization_id_is_trimmed() {
        assert_eq!(OrganizationId::parse("  867850976\n").unwrap().as_str(), "867850976");
        assert!(OrganizationId::parse("").is_none());
        assert!(OrganizationId::parse(" \t ").is_none());
    }

    #[test]
    fn status_accessors_follow_variant() {
        let p = ProcessingStatus::Processing { progress: "Analyzing duplicates...".into() };
        assert_eq!(p.kind(), StatusKind::Processing);
        assert_eq!(p.progress(), Some("Analyzing duplicates..."));
        assert_eq!(p.error(), None);
        assert!(!p.is_terminal());

        let c = ProcessingStatus::Completed { progress: "done".into(), filename: "r.xlsx".into() };
        assert_eq!(c.filename(), Some("r.xlsx"));
        assert_eq!(c.error(), None);

        let e = ProcessingStatus::Error { error: "boom".into() };
        assert_eq!(e.kind(), StatusKind::Error);
        assert_eq!(e.progress(), None);
        assert_eq!(e.error(), Some("boom"));
        assert!(e.is_terminal());
    }

    #[test]
    fn status_serializes_with_tag() {
        let e = ProcessingStatus::Error { error: "Organization not found".into() };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v, serde_json::json!({"status": "error", "error": "Organization not found"}));
    }

    #[test]
    fn request_uses_camel_case_key() {
        let org = OrganizationId::parse(" 42 ").unwrap();
        let body = serde_json::to_string(&DetectRequest::new(&org)).unwrap();
        assert_eq!(body, r#"{"organizationId":"42"}"#);
    }

    #[test]
    fn response_ignores_unknown_fields() {
        let r: DetectResponse =
            serde_json::from_str(r#"{"filename":"a.xlsx","rows":12}"#).unwrap();
        assert_eq!(r.filename.as_deref(), Some("a.xlsx"));
        assert_eq!(r.error, None);
    }
}
