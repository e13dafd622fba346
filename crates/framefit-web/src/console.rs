#![forbid(unsafe_code)]

//! `tracing` output routed to the browser console.
//!
//! [`MakeConsoleWriter`] plugs into `tracing_subscriber::fmt` and hands each
//! formatted record to a [`ConsoleSink`] together with the console method
//! matching the record's level. On wasm the sink is the real `console`
//! object; native tests supply a recording sink.

use std::io;
use std::str::FromStr;

use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Level used when no directive (or an invalid one) is given.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;

/// Browser console method a record is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleMethod {
    Debug,
    Info,
    Warn,
    Error,
}

impl ConsoleMethod {
    /// Map a `tracing` level. `TRACE` shares `console.debug`.
    #[must_use]
    pub fn for_level(level: Level) -> Self {
        match level {
            Level::TRACE | Level::DEBUG => Self::Debug,
            Level::INFO => Self::Info,
            Level::WARN => Self::Warn,
            Level::ERROR => Self::Error,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Receives one formatted record.
pub type ConsoleSink = fn(ConsoleMethod, &str);

/// Parse a level directive such as `"debug"` or `"WARN"`.
///
/// Returns `Err` with the rejected input so the caller can report it after
/// logging is installed.
pub fn parse_level(directive: Option<&str>) -> Result<LevelFilter, String> {
    match directive.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(DEFAULT_LEVEL),
        Some(directive) => LevelFilter::from_str(directive).map_err(|_| directive.to_owned()),
    }
}

/// Buffers one record and flushes it to the sink on drop.
pub struct ConsoleWriter {
    method: ConsoleMethod,
    sink: ConsoleSink,
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buffer);
        (self.sink)(self.method, text.trim_end());
    }
}

/// `MakeWriter` that picks the console method from each record's level.
#[derive(Debug, Clone, Copy)]
pub struct MakeConsoleWriter {
    sink: ConsoleSink,
}

impl MakeConsoleWriter {
    #[must_use]
    pub const fn new(sink: ConsoleSink) -> Self {
        Self { sink }
    }

    /// Writer backed by the global `console` object.
    #[cfg(target_arch = "wasm32")]
    #[must_use]
    pub const fn browser() -> Self {
        Self::new(browser_sink)
    }

    fn writer(&self, method: ConsoleMethod) -> ConsoleWriter {
        ConsoleWriter {
            method,
            sink: self.sink,
            buffer: Vec::new(),
        }
    }
}

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer(ConsoleMethod::Info)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.writer(ConsoleMethod::for_level(*meta.level()))
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_sink(method: ConsoleMethod, text: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let text = JsValue::from_str(text);
    match method {
        ConsoleMethod::Debug => console::debug_1(&text),
        ConsoleMethod::Info => console::info_1(&text),
        ConsoleMethod::Warn => console::warn_1(&text),
        ConsoleMethod::Error => console::error_1(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    thread_local! {
        static LINES: RefCell<Vec<(ConsoleMethod, String)>> = const { RefCell::new(Vec::new()) };
    }

    fn record(method: ConsoleMethod, text: &str) {
        LINES.with(|lines| lines.borrow_mut().push((method, text.to_owned())));
    }

    fn take_lines() -> Vec<(ConsoleMethod, String)> {
        LINES.with(|lines| std::mem::take(&mut *lines.borrow_mut()))
    }

    #[test]
    fn levels_map_to_console_methods() {
        assert_eq!(ConsoleMethod::for_level(Level::TRACE), ConsoleMethod::Debug);
        assert_eq!(ConsoleMethod::for_level(Level::DEBUG), ConsoleMethod::Debug);
        assert_eq!(ConsoleMethod::for_level(Level::INFO), ConsoleMethod::Info);
        assert_eq!(ConsoleMethod::for_level(Level::WARN), ConsoleMethod::Warn);
        assert_eq!(ConsoleMethod::for_level(Level::ERROR), ConsoleMethod::Error);
        assert_eq!(ConsoleMethod::Warn.name(), "warn");
    }

    #[test]
    fn parse_level_accepts_names_and_defaults() {
        assert_eq!(parse_level(None), Ok(DEFAULT_LEVEL));
        assert_eq!(parse_level(Some("  ")), Ok(DEFAULT_LEVEL));
        assert_eq!(parse_level(Some("debug")), Ok(LevelFilter::DEBUG));
        assert_eq!(parse_level(Some("WARN")), Ok(LevelFilter::WARN));
        assert_eq!(parse_level(Some("off")), Ok(LevelFilter::OFF));
        assert_eq!(parse_level(Some("loud")), Err("loud".to_owned()));
    }

    #[test]
    fn fmt_records_are_routed_by_level() {
        take_lines();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(MakeConsoleWriter::new(record))
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_max_level(LevelFilter::DEBUG)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(mode = "portrait", "unknown sizing mode");
            tracing::debug!(height = 720.0, "applied panel height");
            tracing::trace!("filtered out");
        });

        let lines = take_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].0, ConsoleMethod::Warn);
        assert!(lines[0].1.contains("unknown sizing mode"));
        assert!(lines[0].1.contains("mode=\"portrait\""));
        assert_eq!(lines[1].0, ConsoleMethod::Debug);
        assert!(lines[1].1.contains("height=720.0"));
        assert!(!lines[1].1.ends_with('\n'));
    }

    #[test]
    fn empty_writer_emits_nothing() {
        take_lines();
        drop(MakeConsoleWriter::new(record).make_writer());
        assert!(take_lines().is_empty());
    }
}
