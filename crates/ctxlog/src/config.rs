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
//! Configuration for the process logger.
//!
//! The logger is configured once at startup from three environment
//! variables:
//!
//! - `LOG_LEVEL`: minimum severity (`debug`, `info`, `warn`, `error`, `fatal`, `panic`)
//! - `DEBUG`: boolean; when true forces `debug` level and console output
//! - `APP_NAME`: optional value for the `app` field
//!
//! Nothing here is fatal. Malformed input is reported and replaced by a
//! default so that a misconfigured environment never prevents startup.

use crate::level::Level;
use crate::logger::Logger;
use crate::sink::{ConsoleSink, JsonSink, Sink};
use serde_json::Value;
use std::borrow::Cow;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Environment variable holding the minimum level
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
/// Environment variable holding the debug flag
pub const DEBUG_ENV: &str = "DEBUG";
/// Environment variable holding the application name
pub const APP_NAME_ENV: &str = "APP_NAME";

/// Hostname used when it cannot be resolved
pub const UNKNOWN_HOST: &str = "unknown";

/// Toolchain the crate was built for, written as the `rust_version` field.
pub const RUNTIME_VERSION: &str = concat!("rust-", env!("CARGO_PKG_RUST_VERSION"));

/// Errors that can occur while configuring or installing the logger
#[derive(Error, Debug)]
pub enum LogError {
    /// A level name that is not one of the six levels
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    /// A boolean variable that does not parse
    #[error("Invalid boolean for {variable}: {value:?}. Expected one of: true, false, 1, 0, yes, no, on, off")]
    InvalidBool {
        /// Variable name
        variable: String,
        /// Raw value
        value: String,
    },

    /// A second attempt to install the process logger
    #[error("Process logger is already initialized")]
    AlreadyInitialized,

    /// A global `tracing` subscriber was already set
    #[error("Failed to install tracing bridge: {0}")]
    TracingInit(String),

    /// Output could not be written
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// How records are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// One JSON object per line
    #[default]
    Json,

    /// Human-readable console lines
    Console,
}

/// Stream the built-in sinks write to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOutput {
    /// Write to standard output
    #[default]
    Stdout,

    /// Write to standard error
    Stderr,
}

/// What happens after a `fatal` or `panic` event is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Termination {
    /// `fatal` exits the process with status 1, `panic` panics
    #[default]
    Terminate,

    /// Write the record and return normally
    LogOnly,
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Output format
    pub output_mode: OutputMode,

    /// Events below this level are dropped
    pub min_level: Level,

    /// Value of the `host` field
    pub hostname: String,

    /// Value of the `rust_version` field
    pub runtime_version: String,

    /// Value of the `app` field, omitted when `None`
    pub app_name: Option<String>,

    /// Whether to record the call site of each event
    pub caller: bool,

    /// Whether to record the emission time of each event
    pub timestamp: bool,

    /// Whether console output uses ANSI colors
    pub use_color: bool,

    /// Output stream for the built-in sinks
    pub output: LogOutput,

    /// Behavior after `fatal`/`panic` events
    pub termination: Termination,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_mode: OutputMode::Json,
            min_level: Level::Info,
            hostname: resolve_hostname(),
            runtime_version: RUNTIME_VERSION.to_string(),
            app_name: None,
            caller: true,
            timestamp: true,
            use_color: console::colors_enabled(),
            output: LogOutput::Stdout,
            termination: Termination::Terminate,
        }
    }
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the configuration from the process environment.
    ///
    /// Problems with the environment are printed to stderr and replaced by
    /// defaults.
    pub fn from_env() -> Self {
        let (config, diagnostics) = Self::resolve(|name| std::env::var(name).ok());
        for diagnostic in diagnostics {
            eprintln!("error while parsing logger environment: {diagnostic}");
        }
        config
    }

    /// Resolve the configuration through an arbitrary variable lookup.
    ///
    /// Returns the configuration together with every non-fatal problem that
    /// was found. A truthy `DEBUG` takes precedence over `LOG_LEVEL`.
    pub fn resolve<F>(lookup: F) -> (Self, Vec<LogError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).unwrap_or_default();
        let mut diagnostics = Vec::new();
        let mut config = Config::default();

        let debug = var(DEBUG_ENV);
        let is_debug = if debug.is_empty() {
            false
        } else {
            parse_bool(DEBUG_ENV, &debug).unwrap_or_else(|e| {
                diagnostics.push(e);
                false
            })
        };

        if is_debug {
            config.min_level = Level::Debug;
            config.output_mode = OutputMode::Console;
        } else {
            let level = var(LOG_LEVEL_ENV);
            if !level.is_empty() {
                config.min_level = level.parse().unwrap_or_else(|e| {
                    diagnostics.push(e);
                    Level::Info
                });
            }
        }

        let app_name = var(APP_NAME_ENV);
        if !app_name.is_empty() {
            config.app_name = Some(app_name);
        }

        (config, diagnostics)
    }

    /// Set the output mode
    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }

    /// Set the minimum level
    pub fn with_min_level(mut self, min_level: Level) -> Self {
        self.min_level = min_level;
        self
    }

    /// Override the resolved hostname
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Set the application name
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        let app_name = app_name.into();
        self.app_name = (!app_name.is_empty()).then_some(app_name);
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

    /// Enable or disable console colors
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Set the output stream
    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Set the `fatal`/`panic` behavior
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Fields attached to every record: `rust_version`, `host`, and `app`
    /// when an application name is set.
    pub fn fixed_fields(&self) -> Vec<(Cow<'static, str>, Value)> {
        let mut fields = vec![
            (
                Cow::Borrowed("rust_version"),
                Value::String(self.runtime_version.clone()),
            ),
            (Cow::Borrowed("host"), Value::String(self.hostname.clone())),
        ];
        if let Some(app_name) = &self.app_name {
            fields.push((Cow::Borrowed("app"), Value::String(app_name.clone())));
        }
        fields
    }

    /// Build the base logger on the sink matching `output_mode` and `output`.
    pub fn build(&self) -> Logger {
        let sink: Arc<dyn Sink> = match (self.output_mode, self.output) {
            (OutputMode::Json, LogOutput::Stdout) => Arc::new(JsonSink::stdout()),
            (OutputMode::Json, LogOutput::Stderr) => Arc::new(JsonSink::stderr()),
            (OutputMode::Console, LogOutput::Stdout) => Arc::new(ConsoleSink::stdout(self.use_color)),
            (OutputMode::Console, LogOutput::Stderr) => Arc::new(ConsoleSink::stderr(self.use_color)),
        };
        self.build_with_sink(sink)
    }

    /// Build the base logger on an explicit sink.
    pub fn build_with_sink(&self, sink: Arc<dyn Sink>) -> Logger {
        Logger::new(sink)
            .with_min_level(self.min_level)
            .with_caller(self.caller)
            .with_timestamp(self.timestamp)
            .with_termination(self.termination)
            .with_fields(self.fixed_fields())
    }
}

/// Parse a boolean environment value.
///
/// Accepts `1`, `t`, `true` and `0`, `f`, `false` in lower, upper or title
/// case. Surrounding whitespace is not stripped.
fn parse_bool(variable: &str, value: &str) -> Result<bool, LogError> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(LogError::InvalidBool {
            variable: variable.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Hostname reported by the kernel, or [`UNKNOWN_HOST`] if it is empty or
/// not valid UTF-8.
pub fn resolve_hostname() -> String {
    gethostname::gethostname()
        .into_string()
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}
