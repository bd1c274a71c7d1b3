use crate::form::controller::FormSnapshot;
use crate::form::model::ProcessingStatus;
use crate::i18n::Messages;

/// Enabled/disabled state and labels of the form controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlsView {
    pub input_disabled: bool,
    pub submit_disabled: bool,
    pub submit_label: &'static str,
}

pub fn controls(snapshot: &FormSnapshot, msgs: &Messages) -> ControlsView {
    ControlsView {
        input_disabled: snapshot.in_flight,
        submit_disabled: snapshot.in_flight,
        submit_label: if snapshot.in_flight { msgs.submit_busy } else { msgs.submit_idle },
    }
}

pub fn status_title(status: &ProcessingStatus, msgs: &Messages) -> &'static str {
    match status {
        ProcessingStatus::Processing { .. } => msgs.title_processing,
        ProcessingStatus::Completed { .. } => msgs.title_completed,
        ProcessingStatus::Error { .. } => msgs.title_error,
    }
}

/// Lines of the status card; empty while idle.
pub fn status_card(snapshot: &FormSnapshot, msgs: &Messages) -> Vec<String> {
    let Some(status) = &snapshot.status else {
        return vec![];
    };

    let mut lines = vec![status_title(status, msgs).to_string()];
    if let Some(p) = status.progress() {
        lines.push(p.to_string());
    }
    if let Some(e) = status.error() {
        lines.push(e.to_string());
    }
    if snapshot.can_download() {
        lines.push(msgs.download_ready.to_string());
        lines.push(msgs.download_action.to_string());
    }
    lines
}

/// Full text view: header, input line, submit control, status card.
pub fn render(snapshot: &FormSnapshot, msgs: &Messages) -> String {
    let c = controls(snapshot, msgs);
    let mut out = String::new();
    out.push_str(msgs.heading);
    out.push('\n');
    out.push_str(msgs.intro);
    out.push_str("\n\n");

    let input = if snapshot.input.is_empty() { msgs.input_placeholder } else { snapshot.input.as_str() };
    out.push_str(&format!("{} {}{}\n", msgs.input_label, input, if c.input_disabled { " (locked)" } else { "" }));
    out.push_str(&format!("[ {} ]\n", c.submit_label));

    let card = status_card(snapshot, msgs);
    if !card.is_empty() {
        out.push('\n');
        for line in card {
            out.push_str("  ");
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}
