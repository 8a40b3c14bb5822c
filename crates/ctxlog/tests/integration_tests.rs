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
//! Integration tests for configuration and logger construction
//!
//! Tests that read the real process environment are serialized because the
//! environment is shared by every test thread.
//!
//! NOTE: The process logger is installed in tests/global_state.rs, which runs
//! in its own process.

#![allow(clippy::unwrap_used)]

use ctxlog::{
    bind, Config, Context, JsonSink, Level, LogOutput, Logger, MemorySink, OutputMode, Termination,
    REQUEST_ID_KEY,
};
use serial_test::serial;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

struct EnvGuard(Vec<&'static str>);

impl EnvGuard {
    fn set(vars: &[(&'static str, &str)]) -> Self {
        for name in ["LOG_LEVEL", "DEBUG", "APP_NAME"] {
            std::env::remove_var(name);
        }
        for (name, value) in vars {
            std::env::set_var(name, value);
        }
        EnvGuard(vars.iter().map(|(name, _)| *name).collect())
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for name in &self.0 {
            std::env::remove_var(name);
        }
    }
}

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Buffer {
    fn lines(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

#[test]
fn test_config_builder_chaining() {
    let config = Config::new()
        .with_output_mode(OutputMode::Console)
        .with_min_level(Level::Warn)
        .with_hostname("web-1")
        .with_app_name("svc1")
        .with_timestamp(false)
        .with_caller(false)
        .with_color(false)
        .with_output(LogOutput::Stderr)
        .with_termination(Termination::LogOnly);

    assert_eq!(config.output_mode, OutputMode::Console);
    assert_eq!(config.min_level, Level::Warn);
    assert_eq!(config.hostname, "web-1");
    assert_eq!(config.app_name.as_deref(), Some("svc1"));
    assert!(!config.timestamp);
    assert!(!config.caller);
    assert!(!config.use_color);
    assert_eq!(config.output, LogOutput::Stderr);
    assert_eq!(config.termination, Termination::LogOnly);
}

#[test]
#[serial]
fn test_log_level_from_environment() {
    let _env = EnvGuard::set(&[("LOG_LEVEL", "warn")]);
    let config = Config::from_env();
    assert_eq!(config.min_level, Level::Warn);
    assert_eq!(config.output_mode, OutputMode::Json);
}

#[test]
#[serial]
fn test_debug_flag_overrides_environment_level() {
    let _env = EnvGuard::set(&[("LOG_LEVEL", "error"), ("DEBUG", "true")]);
    let config = Config::from_env();
    assert_eq!(config.min_level, Level::Debug);
    assert_eq!(config.output_mode, OutputMode::Console);
}

#[test]
#[serial]
fn test_malformed_environment_degrades_to_defaults() {
    let _env = EnvGuard::set(&[("LOG_LEVEL", "chatty"), ("DEBUG", "sometimes")]);
    let config = Config::from_env();
    assert_eq!(config.min_level, Level::Info);
    assert_eq!(config.output_mode, OutputMode::Json);
}

#[test]
#[serial]
fn test_app_name_from_environment() {
    let _env = EnvGuard::set(&[("APP_NAME", "svc1")]);
    let sink = MemorySink::new();
    let logger = Config::from_env().build_with_sink(Arc::new(sink.clone()));
    logger.info().msg("hello");
    assert_eq!(sink.records()[0].get_str("app"), Some("svc1"));

    drop(_env);
    let _env = EnvGuard::set(&[]);
    let sink = MemorySink::new();
    let logger = Config::from_env().build_with_sink(Arc::new(sink.clone()));
    logger.info().msg("hello");
    assert!(!sink.records()[0].has("app"));
}

#[test]
fn test_json_output_end_to_end() {
    let buffer = Buffer::default();
    let base = Config::new()
        .with_hostname("web-1")
        .with_app_name("svc1")
        .with_min_level(Level::Info)
        .build_with_sink(Arc::new(JsonSink::new(buffer.clone())));
    let ctx = Context::new().with_request_id("abc123");

    bind(Some(&ctx), &base)
        .info()
        .field("status", 200)
        .msg("request finished");
    bind(Some(&ctx), &base).debug().msg("not written");

    let lines = buffer.lines();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert_eq!(line["level"], "info");
    assert_eq!(line["host"], "web-1");
    assert_eq!(line["app"], "svc1");
    assert_eq!(line[REQUEST_ID_KEY], "abc123");
    assert_eq!(line["status"], 200);
    assert_eq!(line["message"], "request finished");
    assert!(line["rust_version"].as_str().unwrap().starts_with("rust-"));
    assert!(line["time"].is_string());
    assert!(line["caller"].as_str().unwrap().contains("integration_tests.rs"));
}

#[test]
fn test_logger_without_config_writes_everything() {
    let sink = MemorySink::new();
    let logger = Logger::new(Arc::new(sink.clone())).with_termination(Termination::LogOnly);
    for level in Level::ALL {
        logger.event(level).send();
    }
    assert_eq!(sink.len(), Level::ALL.len());
}
