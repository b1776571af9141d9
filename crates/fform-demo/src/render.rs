#![forbid(unsafe_code)]

//! Plain-text rendering of form snapshots.

use std::io::Write;

use fform::{FieldValue, FormRenderer, FormSnapshot};

use crate::screen::PASSWORD;

/// One line per snapshot: state, values and the first error of each field.
///
/// Passwords are masked.
#[must_use]
pub fn render_snapshot(snapshot: &FormSnapshot) -> String {
    let mut line = format!("[{}]", snapshot.state);
    if snapshot.submitting {
        line.push_str(" (busy)");
    }
    for (name, value) in snapshot.values.iter() {
        let shown = match value {
            FieldValue::Text(text) if name == PASSWORD => {
                format!("{:?}", "•".repeat(text.chars().count()))
            }
            FieldValue::Text(text) => format!("{text:?}"),
            other => other.to_string(),
        };
        line.push_str(&format!(" {name}={shown}"));
    }
    for field in snapshot.field_errors.fields() {
        if let Some(message) = snapshot.first_message(field) {
            line.push_str(&format!(" | {message}"));
        }
    }
    line
}

/// Writes [`render_snapshot`] lines to a writer.
#[derive(Debug)]
pub struct TextRenderer<W> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FormRenderer for TextRenderer<W> {
    fn render(&mut self, snapshot: &FormSnapshot) {
        if let Err(err) = writeln!(self.out, "{}", render_snapshot(snapshot)) {
            tracing::warn!(error = %err, "failed to write form snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fform::{FieldValues, SubmissionState, ValidationError, ValidationErrors};

    fn snapshot(state: SubmissionState) -> FormSnapshot {
        FormSnapshot {
            values: FieldValues::new()
                .with("phone", "555")
                .with("password", "secret")
                .with("withRefresh", true),
            state,
            submitting: state.is_busy(),
            field_errors: ValidationErrors::new(),
            last_error: None,
            submit_count: 0,
            dirty: false,
        }
    }

    #[test]
    fn masks_password() {
        let line = render_snapshot(&snapshot(SubmissionState::Idle));
        assert_eq!(
            line,
            r#"[idle] phone="555" password="••••••" withRefresh=true"#
        );
    }

    #[test]
    fn busy_and_errors_are_shown() {
        let mut snap = snapshot(SubmissionState::Submitting);
        snap.field_errors.push(
            "phone",
            ValidationError::new("required", "{label} is required").with_param("label", "Phone"),
        );
        let line = render_snapshot(&snap);
        assert!(line.starts_with("[submitting] (busy)"));
        assert!(line.ends_with("| Phone is required"));
    }

    #[test]
    fn writer_receives_lines() {
        let mut renderer = TextRenderer::new(Vec::new());
        renderer.render(&snapshot(SubmissionState::Idle));
        renderer.render(&snapshot(SubmissionState::Validating));
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 2);
    }
}
