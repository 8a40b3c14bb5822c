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
//! ctxlog
//!
//! Process-wide structured logging with request correlation.
//!
//! # Features
//!
//! - **Environment configuration**: `LOG_LEVEL`, `DEBUG` and `APP_NAME` are read once at startup
//! - **Fixed fields**: every record carries `host`, `rust_version` and, when set, `app`
//! - **Request correlation**: a request id stored in a [`Context`] is attached as `request_id`
//! - **Two output modes**: JSON lines for machines, colored console lines for people
//! - **`tracing` bridge**: events from `tracing` macros share the same output
//!
//! # Example
//!
//! ```ignore
//! use ctxlog::Context;
//!
//! fn main() {
//!     ctxlog::init().ok();
//!
//!     let ctx = Context::new().with_request_id("abc123");
//!     ctxlog::info(&ctx).field("path", "/orders").msg("request received");
//!
//!     if let Err(e) = std::fs::read("missing.toml") {
//!         ctxlog::error_with_cause(&ctx, Some(&e)).msg("config not loaded");
//!     }
//! }
//! ```

pub mod config;
pub mod context;
pub mod facade;
pub mod initialization;
pub mod layer;
pub mod level;
pub mod logger;
pub mod macros;
pub mod sink;

pub use config::{Config, LogError, LogOutput, OutputMode, Termination};
pub use context::{bind, Context, REQUEST_ID_KEY};
pub use facade::{debug, error, error_with_cause, fatal, info, panic, warn};
pub use initialization::{get, init, init_with_config, init_with_logger, is_initialized, min_level, snapshot};
pub use layer::{init_tracing_bridge, FacadeLayer};
pub use level::Level;
pub use logger::{Event, Logger, ERROR_KEY};
pub use sink::{CapturedRecord, Caller, ConsoleSink, Field, JsonSink, MemorySink, Record, Sink};
