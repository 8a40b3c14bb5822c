// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Loggers and event builders.
//!
//! A [`Logger`] owns a sink plus a set of fields attached to everything it
//! writes. Adding fields produces a new logger and never touches the one it
//! was derived from, so a logger can be shared freely between threads.
//!
//! Each severity method returns an [`Event`]. Fields are chained onto the
//! event and [`Event::msg`] or [`Event::send`] writes it:
//!
//! ```ignore
//! logger.info().field("user", "alice").field("attempts", 3).msg("login");
//! ```

use crate::config::Termination;
use crate::level::Level;
use crate::sink::{Caller, Field, Record, Sink};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Key of the field carrying an error description
pub const ERROR_KEY: &str = "error";

/// A sink decorated with fixed fields and a minimum level.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Sink>,
    fields: Arc<[Field]>,
    min_level: Level,
    caller: bool,
    timestamp: bool,
    termination: Termination,
}

impl Logger {
    /// Create a logger with no fields that writes every level.
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Logger {
            sink,
            fields: Arc::from(Vec::new()),
            min_level: Level::Debug,
            caller: false,
            timestamp: true,
            termination: Termination::Terminate,
        }
    }

    /// Set the minimum level
    pub fn with_min_level(mut self, min_level: Level) -> Self {
        self.min_level = min_level;
        self
    }

    /// Enable or disable call site capture
    pub fn with_caller(mut self, caller: bool) -> Self {
        self.caller = caller;
        self
    }

    /// Enable or disable timestamps
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the `fatal`/`panic` behavior
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Derive a logger carrying one more field.
    pub fn with_field<V: Serialize>(&self, key: impl Into<Cow<'static, str>>, value: V) -> Logger {
        self.with_fields([(key.into(), to_value(value))])
    }

    /// Derive a logger carrying additional fields.
    pub fn with_fields<I>(&self, fields: I) -> Logger
    where
        I: IntoIterator<Item = Field>,
    {
        let fields: Vec<Field> = self.fields.iter().cloned().chain(fields).collect();
        Logger {
            sink: Arc::clone(&self.sink),
            fields: Arc::from(fields),
            min_level: self.min_level,
            caller: self.caller,
            timestamp: self.timestamp,
            termination: self.termination,
        }
    }

    /// Fields attached to every record
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Value of a fixed field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Minimum level written by this logger
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// Behavior after `fatal`/`panic` events
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Whether an event at `level` would be written
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// The underlying sink
    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    /// Start an event at `level`, recording the caller's location.
    #[track_caller]
    pub fn event(&self, level: Level) -> Event {
        // Closures are not `#[track_caller]`; resolve the location here.
        let location = Location::caller();
        let caller = self.caller.then(|| Caller::from(location));
        self.event_at(level, caller)
    }

    /// Start an event at `level` with an explicit call site.
    ///
    /// The call site is dropped if caller capture is disabled.
    pub fn event_at(&self, level: Level, caller: Option<Caller>) -> Event {
        if !self.enabled(level) {
            return Event::disabled();
        }
        Event {
            inner: Some(Box::new(EventInner {
                logger: self.clone(),
                level,
                caller: caller.filter(|_| self.caller),
                fields: Vec::new(),
            })),
        }
    }

    /// Start a `debug` event
    #[track_caller]
    pub fn debug(&self) -> Event {
        self.event(Level::Debug)
    }

    /// Start an `info` event
    #[track_caller]
    pub fn info(&self) -> Event {
        self.event(Level::Info)
    }

    /// Start a `warn` event
    #[track_caller]
    pub fn warn(&self) -> Event {
        self.event(Level::Warn)
    }

    /// Start an `error` event
    #[track_caller]
    pub fn error(&self) -> Event {
        self.event(Level::Error)
    }

    /// Start a `fatal` event. Writing it exits the process unless the
    /// logger uses [`Termination::LogOnly`].
    #[track_caller]
    pub fn fatal(&self) -> Event {
        self.event(Level::Fatal)
    }

    /// Start a `panic` event. Writing it panics unless the logger uses
    /// [`Termination::LogOnly`].
    #[track_caller]
    pub fn panic(&self) -> Event {
        self.event(Level::Panic)
    }

    /// Start an `error` event carrying `err` in the `error` field.
    ///
    /// Without a cause this is a plain `error` event.
    #[track_caller]
    pub fn err<E>(&self, err: Option<&E>) -> Event
    where
        E: fmt::Display + ?Sized,
    {
        let event = self.error();
        match err {
            Some(err) => event.err(err),
            None => event,
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("fields", &self.fields)
            .field("min_level", &self.min_level)
            .field("caller", &self.caller)
            .field("timestamp", &self.timestamp)
            .field("termination", &self.termination)
            .finish_non_exhaustive()
    }
}

fn to_value<V: Serialize>(value: V) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| Value::String(e.to_string()))
}

struct EventInner {
    logger: Logger,
    level: Level,
    caller: Option<Caller>,
    fields: Vec<Field>,
}

/// A log event under construction.
///
/// An event below the logger's minimum level carries no state, and every
/// method on it returns immediately.
#[must_use = "an event is not written until `msg` or `send` is called"]
pub struct Event {
    inner: Option<Box<EventInner>>,
}

impl Event {
    /// An event that writes nothing
    pub fn disabled() -> Self {
        Event { inner: None }
    }

    /// Whether this event will be written
    pub fn enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Severity, or `None` for a disabled event
    pub fn level(&self) -> Option<Level> {
        self.inner.as_ref().map(|inner| inner.level)
    }

    /// Add a field. Values are serialized with `serde`.
    pub fn field<V: Serialize>(mut self, key: impl Into<Cow<'static, str>>, value: V) -> Self {
        if let Some(inner) = self.inner.as_mut() {
            inner.fields.push((key.into(), to_value(value)));
        }
        self
    }

    /// Add a field rendered through `Display`.
    pub fn display(mut self, key: impl Into<Cow<'static, str>>, value: impl fmt::Display) -> Self {
        if let Some(inner) = self.inner.as_mut() {
            inner.fields.push((key.into(), Value::String(value.to_string())));
        }
        self
    }

    /// Add the `error` field.
    pub fn err<E: fmt::Display + ?Sized>(self, err: &E) -> Self {
        self.display(ERROR_KEY, err)
    }

    /// Write the event with a message.
    pub fn msg(self, message: impl fmt::Display) {
        if self.inner.is_some() {
            self.emit(Some(message.to_string()));
        }
    }

    /// Write the event without a message.
    pub fn send(self) {
        self.emit(None);
    }

    fn emit(self, message: Option<String>) {
        let Some(inner) = self.inner else {
            return;
        };
        let logger = &inner.logger;
        let record = Record {
            level: inner.level,
            time: logger.timestamp.then(Utc::now),
            caller: inner.caller,
            context: &logger.fields,
            fields: &inner.fields,
            message: message.as_deref(),
        };

        if let Err(e) = logger.sink.write(&record) {
            eprintln!("failed to write log record: {e}");
        }

        if logger.termination == Termination::Terminate {
            match inner.level {
                Level::Fatal => {
                    let _ = logger.sink.flush();
                    std::process::exit(1);
                }
                Level::Panic => panic!("{}", message.unwrap_or_default()),
                _ => {}
            }
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => f
                .debug_struct("Event")
                .field("level", &inner.level)
                .field("caller", &inner.caller)
                .field("fields", &inner.fields)
                .finish(),
            None => f.write_str("Event(disabled)"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use serde_json::json;
    use std::io;

    fn memory_logger(min_level: Level) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let logger = Logger::new(Arc::new(sink.clone()))
            .with_min_level(min_level)
            .with_termination(Termination::LogOnly);
        (logger, sink)
    }

    #[test]
    fn test_threshold_for_every_level() {
        for min_level in Level::ALL {
            let (logger, sink) = memory_logger(min_level);
            for level in Level::ALL {
                logger.event(level).msg("probe");
            }
            let written: Vec<Level> = sink.records().iter().map(|r| r.level).collect();
            let expected: Vec<Level> = Level::ALL.into_iter().filter(|l| *l >= min_level).collect();
            assert_eq!(written, expected, "min level {min_level}");
        }
    }

    #[test]
    fn test_disabled_event_holds_nothing() {
        let (logger, sink) = memory_logger(Level::Warn);
        let event = logger.info().field("user", "alice");
        assert!(!event.enabled());
        assert_eq!(event.level(), None);
        event.msg("ignored");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_fields_and_message() {
        let (logger, sink) = memory_logger(Level::Debug);
        logger
            .info()
            .field("user", "alice")
            .field("attempts", 3)
            .field("tags", vec!["a", "b"])
            .msg("login");

        let record = &sink.records()[0];
        assert_eq!(record.level, Level::Info);
        assert_eq!(record.message.as_deref(), Some("login"));
        assert_eq!(record.get("user"), Some(&json!("alice")));
        assert_eq!(record.get("attempts"), Some(&json!(3)));
        assert_eq!(record.get("tags"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn test_send_without_message() {
        let (logger, sink) = memory_logger(Level::Debug);
        logger.warn().field("disk", "full").send();
        let record = &sink.records()[0];
        assert_eq!(record.message, None);
        assert_eq!(record.get_str("disk"), Some("full"));
    }

    #[test]
    fn test_with_field_leaves_parent_untouched() {
        let (base, sink) = memory_logger(Level::Debug);
        let derived = base.with_field("request_id", "abc123");

        assert!(base.field("request_id").is_none());
        assert_eq!(derived.field("request_id"), Some(&json!("abc123")));

        base.info().msg("from base");
        derived.info().msg("from derived");

        let records = sink.records();
        assert!(!records[0].has("request_id"));
        assert_eq!(records[1].get_str("request_id"), Some("abc123"));
    }

    #[test]
    fn test_err_with_and_without_cause() {
        let (logger, sink) = memory_logger(Level::Debug);
        let cause = io::Error::new(io::ErrorKind::NotFound, "config missing");

        logger.err(Some(&cause)).msg("load failed");
        logger.err(None::<&io::Error>).msg("load failed");

        let records = sink.records();
        assert_eq!(records[0].level, Level::Error);
        assert_eq!(records[0].get_str(ERROR_KEY), Some("config missing"));
        assert_eq!(records[1].level, Level::Error);
        assert!(!records[1].has(ERROR_KEY));
    }

    #[test]
    fn test_caller_capture() {
        let sink = MemorySink::new();
        let logger = Logger::new(Arc::new(sink.clone())).with_caller(true);
        let line = line!() + 1;
        logger.info().msg("here");

        let caller = sink.records()[0].caller.unwrap();
        assert!(caller.file.ends_with("logger.rs"));
        assert_eq!(caller.line, line);
    }

    #[test]
    fn test_caller_disabled() {
        let (logger, sink) = memory_logger(Level::Debug);
        logger
            .event_at(Level::Info, Some(Caller { file: "x.rs", line: 1 }))
            .send();
        assert_eq!(sink.records()[0].caller, None);
    }

    #[test]
    fn test_timestamp_toggle() {
        let (logger, sink) = memory_logger(Level::Debug);
        logger.info().send();
        logger.with_timestamp(false).info().send();
        let records = sink.records();
        assert!(records[0].time.is_some());
        assert!(records[1].time.is_none());
    }

    #[test]
    fn test_log_only_fatal_returns() {
        let (logger, sink) = memory_logger(Level::Debug);
        logger.fatal().msg("disk gone");
        logger.panic().msg("invariant broken");
        let levels: Vec<Level> = sink.records().iter().map(|r| r.level).collect();
        assert_eq!(levels, [Level::Fatal, Level::Panic]);
    }

    #[test]
    #[should_panic(expected = "invariant broken")]
    fn test_panic_event_panics_after_write() {
        let sink = MemorySink::new();
        let logger = Logger::new(Arc::new(sink.clone()));
        logger.panic().msg("invariant broken");
    }

    #[test]
    fn test_disabled_panic_does_not_panic() {
        let sink = MemorySink::new();
        let logger = Logger::new(Arc::new(sink.clone())).with_min_level(Level::Panic);
        logger.fatal().msg("ignored");
        assert!(sink.is_empty());
    }
}
