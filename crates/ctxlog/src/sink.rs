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
//! Output sinks.
//!
//! A [`Sink`] receives finished [`Record`]s and writes them somewhere. Three
//! implementations are provided:
//!
//! - [`JsonSink`]: one JSON object per line, for log aggregation
//! - [`ConsoleSink`]: human-readable single-line output with optional colors
//! - [`MemorySink`]: keeps records in memory so they can be inspected
//!
//! Every sink serializes concurrent writes so that two records never
//! interleave within a line.

use crate::level::Level;
use chrono::{DateTime, SecondsFormat, Utc};
use console::Style;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A key/value pair attached to a record.
pub type Field = (Cow<'static, str>, Value);

/// Source location of the code that built an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Source file path
    pub file: &'static str,
    /// Line number within `file`
    pub line: u32,
}

impl From<&'static Location<'static>> for Caller {
    fn from(location: &'static Location<'static>) -> Self {
        Caller {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A finished log event as handed to a [`Sink`].
///
/// `context` holds the logger's fixed fields (host, app, request id, ...)
/// and `fields` the ones added to this particular event.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// Event severity
    pub level: Level,
    /// Emission time, if timestamps are enabled
    pub time: Option<DateTime<Utc>>,
    /// Call site, if caller capture is enabled
    pub caller: Option<Caller>,
    /// Fields inherited from the logger
    pub context: &'a [Field],
    /// Fields added to the event
    pub fields: &'a [Field],
    /// Optional message
    pub message: Option<&'a str>,
}

impl<'a> Record<'a> {
    /// Iterate over logger fields followed by event fields.
    pub fn iter_fields(&self) -> impl DoubleEndedIterator<Item = &'a Field> {
        let (context, fields) = (self.context, self.fields);
        context.iter().chain(fields.iter())
    }

    /// Look up a field by key. The most recently added value wins.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.iter_fields()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("level", self.level.as_str())?;
        if let Some(time) = &self.time {
            map.serialize_entry("time", &format_time(time))?;
        }
        if let Some(caller) = &self.caller {
            map.serialize_entry("caller", &caller.to_string())?;
        }
        for (key, value) in self.iter_fields() {
            map.serialize_entry(key.as_ref(), value)?;
        }
        if let Some(message) = self.message {
            map.serialize_entry("message", message)?;
        }
        map.end()
    }
}

/// Destination for finished records.
pub trait Sink: Send + Sync {
    /// Write one record. Must not interleave with concurrent writes.
    fn write(&self, record: &Record<'_>) -> io::Result<()>;

    /// Flush buffered output.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

type SharedWriter = Mutex<Box<dyn Write + Send>>;

/// Writes each record as a single JSON line.
pub struct JsonSink {
    out: SharedWriter,
}

impl JsonSink {
    /// Create a sink writing to `writer`
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        JsonSink {
            out: Mutex::new(Box::new(writer)),
        }
    }

    /// Sink on standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Sink on standard error
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl Sink for JsonSink {
    fn write(&self, record: &Record<'_>) -> io::Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        lock(&self.out).write_all(&line)
    }

    fn flush(&self) -> io::Result<()> {
        lock(&self.out).flush()
    }
}

impl fmt::Debug for JsonSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSink").finish_non_exhaustive()
    }
}

/// Human-readable output for local development.
///
/// Lines look like `2026-01-02T03:04:05Z INF src/main.rs:10 > started host=web-1`.
pub struct ConsoleSink {
    out: SharedWriter,
    color: bool,
}

impl ConsoleSink {
    /// Create a sink writing to `writer`, with or without ANSI colors
    pub fn new<W: Write + Send + 'static>(writer: W, color: bool) -> Self {
        ConsoleSink {
            out: Mutex::new(Box::new(writer)),
            color,
        }
    }

    /// Sink on standard output
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }

    /// Sink on standard error
    pub fn stderr(color: bool) -> Self {
        Self::new(io::stderr(), color)
    }

    fn style(&self, style: Style) -> Style {
        style.force_styling(self.color)
    }

    fn level_style(&self, level: Level) -> Style {
        let style = match level {
            Level::Debug => Style::new().yellow(),
            Level::Info => Style::new().green(),
            Level::Warn => Style::new().red(),
            Level::Error | Level::Fatal | Level::Panic => Style::new().red().bold(),
        };
        self.style(style)
    }

    /// Render a record as one line, without the trailing newline.
    pub fn render(&self, record: &Record<'_>) -> String {
        let mut parts = Vec::new();

        if let Some(time) = &record.time {
            parts.push(self.style(Style::new().dim()).apply_to(format_time(time)).to_string());
        }
        parts.push(
            self.level_style(record.level)
                .apply_to(record.level.abbreviation())
                .to_string(),
        );
        if let Some(caller) = &record.caller {
            parts.push(format!(
                "{} {}",
                self.style(Style::new().bold()).apply_to(caller),
                self.style(Style::new().cyan()).apply_to(">")
            ));
        }
        if let Some(message) = record.message {
            parts.push(message.to_string());
        }

        for (key, value) in record.iter_fields() {
            let key_style = if key == "error" {
                Style::new().red()
            } else {
                Style::new().cyan()
            };
            parts.push(format!(
                "{}{}",
                self.style(key_style).apply_to(format!("{key}=")),
                render_value(value)
            ));
        }

        parts.join(" ")
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) if !s.is_empty() && !s.contains(|c: char| c.is_whitespace() || c == '=' || c == '"') => {
            s.clone()
        }
        other => other.to_string(),
    }
}

impl Sink for ConsoleSink {
    fn write(&self, record: &Record<'_>) -> io::Result<()> {
        let mut line = self.render(record);
        line.push('\n');
        lock(&self.out).write_all(line.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        lock(&self.out).flush()
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

/// An owned copy of a record, as kept by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecord {
    /// Event severity
    pub level: Level,
    /// Emission time
    pub time: Option<DateTime<Utc>>,
    /// Call site
    pub caller: Option<Caller>,
    /// Logger fields followed by event fields
    pub fields: Vec<(String, Value)>,
    /// Message, if one was given
    pub message: Option<String>,
}

impl CapturedRecord {
    /// Look up a field by key. The most recently added value wins.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Look up a string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Whether a field with this key is present.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of fields with this key.
    pub fn count(&self, key: &str) -> usize {
        self.fields.iter().filter(|(k, _)| k == key).count()
    }
}

impl From<&Record<'_>> for CapturedRecord {
    fn from(record: &Record<'_>) -> Self {
        CapturedRecord {
            level: record.level,
            time: record.time,
            caller: record.caller,
            fields: record
                .iter_fields()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            message: record.message.map(str::to_string),
        }
    }
}

/// Keeps every record in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything written so far
    pub fn records(&self) -> Vec<CapturedRecord> {
        lock(&self.records).clone()
    }

    /// Number of records written
    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }

    /// Drop all captured records
    pub fn clear(&self) {
        lock(&self.records).clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, record: &Record<'_>) -> io::Result<()> {
        lock(&self.records).push(CapturedRecord::from(record));
        Ok(())
    }
}
