//! Fire-and-forget progress notifications.
//!
//! The host shows these next to the pending assistant reply. Emission is
//! best-effort: sinks must not block, and the absence of a sink is legal.

use serde::Serialize;

/// A single progress notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEvent {
    pub description: String,
    pub done: bool,
}

impl StatusEvent {
    pub fn progress(description: impl Into<String>) -> Self {
        Self { description: description.into(), done: false }
    }

    pub fn done(description: impl Into<String>) -> Self {
        Self { description: description.into(), done: true }
    }

    /// Wire frame of the event as the host expects it.
    pub fn frame(&self) -> StatusFrame<'_> {
        StatusFrame { kind: "status", data: self }
    }
}

/// Wire shape of a status notification.
#[derive(Debug, Serialize)]
pub struct StatusFrame<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: &'a StatusEvent,
}

/// Sink for status events, implemented by the host.
pub trait StatusSink: Send + Sync {
    fn status(&self, event: StatusEvent);
}

/// Emit a status event if a sink is attached.
pub fn emit(sink: Option<&dyn StatusSink>, description: impl Into<String>, done: bool) {
    if let Some(sink) = sink {
        let event = if done {
            StatusEvent::done(description)
        } else {
            StatusEvent::progress(description)
        };
        tracing::debug!("status: {} (done: {})", event.description, event.done);
        sink.status(event);
    }
}
