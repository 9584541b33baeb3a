//! Progress reporting for generation runs.
//!
//! A run reports an ordered series of [`ProgressEvent`]s and, if it fails,
//! exactly one error. Where those go is up to the [`ProgressSink`].

use std::io::Write;
use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Checkpoints of a generation run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Start,
    Dsl,
    Sql,
    Api,
    Ui,
    Deploy,
    Complete,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::Start,
        Step::Dsl,
        Step::Sql,
        Step::Api,
        Step::Ui,
        Step::Deploy,
        Step::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Start => "start",
            Step::Dsl => "dsl",
            Step::Sql => "sql",
            Step::Api => "api",
            Step::Ui => "ui",
            Step::Deploy => "deploy",
            Step::Complete => "complete",
        }
    }

    pub fn percent(&self) -> u8 {
        match self {
            Step::Start => 0,
            Step::Dsl => 20,
            Step::Sql => 40,
            Step::Api => 60,
            Step::Ui => 80,
            Step::Deploy => 90,
            Step::Complete => 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: Step,
    pub message: String,
    pub percent: u8,
}

impl ProgressEvent {
    pub fn new(step: Step, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
            percent: step.percent(),
        }
    }
}

/// Everything a sink can receive, as one value. Serialized with an `event` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum SinkEvent {
    Progress(ProgressEvent),
    Error { message: String },
}

pub trait ProgressSink {
    fn progress(&mut self, event: &ProgressEvent);
    fn error(&mut self, message: &str);
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn progress(&mut self, event: &ProgressEvent) {
        (**self).progress(event)
    }

    fn error(&mut self, message: &str) {
        (**self).error(message)
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for Box<S> {
    fn progress(&mut self, event: &ProgressEvent) {
        (**self).progress(event)
    }

    fn error(&mut self, message: &str) {
        (**self).error(message)
    }
}

/// Prints `[DSL] message (20%)` to stdout, errors to stderr.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn progress(&mut self, event: &ProgressEvent) {
        println!(
            "[{}] {} ({}%)",
            event.step.as_str().to_uppercase(),
            event.message,
            event.percent
        );
    }

    fn error(&mut self, message: &str) {
        eprintln!("[ERROR] {message}");
    }
}

/// Forwards events over a channel, e.g. to a push-notification transport
/// running on another thread. A dropped receiver is logged once.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<SinkEvent>,
    disconnected: bool,
}

impl ChannelSink {
    pub fn new(tx: Sender<SinkEvent>) -> Self {
        Self {
            tx,
            disconnected: false,
        }
    }

    fn send(&mut self, event: SinkEvent) {
        if self.tx.send(event).is_err() && !self.disconnected {
            warn!("progress receiver dropped, further events are discarded");
            self.disconnected = true;
        }
    }
}

impl ProgressSink for ChannelSink {
    fn progress(&mut self, event: &ProgressEvent) {
        self.send(SinkEvent::Progress(event.clone()));
    }

    fn error(&mut self, message: &str) {
        self.send(SinkEvent::Error {
            message: message.to_string(),
        });
    }
}

/// One JSON object per line:
/// `{"event":"progress","step":"sql","message":"...","percent":40}`.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &SinkEvent) {
        let result = serde_json::to_writer(&mut self.out, event)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!(error = %e, "failed to write progress event");
        }
    }
}

impl<W: Write> ProgressSink for JsonLinesSink<W> {
    fn progress(&mut self, event: &ProgressEvent) {
        self.emit(&SinkEvent::Progress(event.clone()));
    }

    fn error(&mut self, message: &str) {
        self.emit(&SinkEvent::Error {
            message: message.to_string(),
        });
    }
}
