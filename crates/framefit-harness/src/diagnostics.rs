#![forbid(unsafe_code)]

//! Capture `tracing` events emitted while a closure runs.
//!
//! ```
//! use framefit_harness::diagnostics::capture;
//!
//! let (_, events) = capture(|| tracing::warn!(mode = "portrait", "unknown mode"));
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].message, "unknown mode");
//! assert_eq!(events[0].field("mode"), Some("portrait"));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One captured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl Diagnostic {
    /// Value of a structured field, rendered as text.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Default)]
struct DiagnosticVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for DiagnosticVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_owned();
        } else {
            self.fields.push((field.name().to_owned(), value.to_owned()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let rendered = format!("{value:?}");
        if field.name() == "message" {
            self.message = rendered;
        } else {
            self.fields.push((field.name().to_owned(), rendered));
        }
    }
}

struct CaptureLayer {
    events: Arc<Mutex<Vec<Diagnostic>>>,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = DiagnosticVisitor::default();
        event.record(&mut visitor);
        let diagnostic = Diagnostic {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        };
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic);
    }
}

/// Run `f` with a capturing subscriber installed for the current thread.
pub fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<Diagnostic>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(CaptureLayer {
        events: Arc::clone(&events),
    });
    let result = tracing::subscriber::with_default(subscriber, f);
    let captured = events
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    (result, captured)
}

/// Events at exactly `level`.
#[must_use]
pub fn at_level(events: &[Diagnostic], level: Level) -> Vec<&Diagnostic> {
    events.iter().filter(|event| event.level == level).collect()
}
