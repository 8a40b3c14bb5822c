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
//! Basic logging example demonstrating the environment configuration.
//!
//! Run with: LOG_LEVEL=debug APP_NAME=demo cargo run --example basic_logging
//! or:       DEBUG=true cargo run --example basic_logging

use ctxlog::Context;
use std::io;

fn main() -> anyhow::Result<()> {
    ctxlog::init()?;

    ctxlog::info(None).msg("Application started");

    // Simulate some operations with different log levels
    ctxlog::debug(None).msg("This is a debug message");
    ctxlog::info(None).msg("This is an info message");
    ctxlog::warn(None).msg("This is a warning message");

    // Structured logging with fields and a request id
    let ctx = Context::new().with_request_id("abc123");
    ctxlog::info(&ctx)
        .field("duration_ms", 42)
        .field("path", "/orders")
        .msg("Processing request");

    let result = load_settings("/path/to/settings.toml");
    if let Err(e) = &result {
        ctxlog::error_with_cause(&ctx, Some(e)).msg("Settings not loaded");
    }

    ctxlog::log_info!(&ctx, "Request complete" => { "status" => 200 });

    ctxlog::debug(None).msg("Application shutting down");

    Ok(())
}

fn load_settings(path: &str) -> io::Result<String> {
    std::fs::read_to_string(path)
}
