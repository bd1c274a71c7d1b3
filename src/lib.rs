//! Terminal front-end for a remote duplicate-item detection service.
//!
//! A [`form::SubmissionForm`] collects an organization id, asks the service to
//! run a detection job through a [`transport::DetectTransport`], tracks the
//! processing status and hands the resulting report to a
//! [`launch::DownloadLauncher`].

pub mod config;
pub mod form;
pub mod i18n;
pub mod launch;
pub mod transport;
