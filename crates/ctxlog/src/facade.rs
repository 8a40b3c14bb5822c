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
//! Logging entry points.
//!
//! Each function takes the caller's context (or `None`) and returns an
//! [`Event`] on the process logger, carrying the context's request id when
//! there is one.
//!
//! ```ignore
//! let ctx = Context::new().with_request_id("abc123");
//! ctxlog::info(&ctx).field("path", "/orders").msg("request received");
//! ctxlog::warn(None).msg("no request in flight");
//! ```

use crate::context::{bind, Context};
use crate::initialization;
use crate::level::Level;
use crate::logger::{Event, Logger};
use std::fmt;

#[track_caller]
fn event_for(base: &Logger, ctx: Option<&Context>, level: Level) -> Event {
    if !base.enabled(level) {
        return Event::disabled();
    }
    bind(ctx, base).event(level)
}

/// Start a `debug` event
#[track_caller]
pub fn debug<'a>(ctx: impl Into<Option<&'a Context>>) -> Event {
    event_for(initialization::get(), ctx.into(), Level::Debug)
}

/// Start an `info` event
#[track_caller]
pub fn info<'a>(ctx: impl Into<Option<&'a Context>>) -> Event {
    event_for(initialization::get(), ctx.into(), Level::Info)
}

/// Start a `warn` event
#[track_caller]
pub fn warn<'a>(ctx: impl Into<Option<&'a Context>>) -> Event {
    event_for(initialization::get(), ctx.into(), Level::Warn)
}

/// Start an `error` event
#[track_caller]
pub fn error<'a>(ctx: impl Into<Option<&'a Context>>) -> Event {
    event_for(initialization::get(), ctx.into(), Level::Error)
}

/// Start a `fatal` event. Writing it exits the process unless the logger
/// was configured with [`crate::Termination::LogOnly`].
#[track_caller]
pub fn fatal<'a>(ctx: impl Into<Option<&'a Context>>) -> Event {
    event_for(initialization::get(), ctx.into(), Level::Fatal)
}

/// Start a `panic` event. Writing it panics unless the logger was
/// configured with [`crate::Termination::LogOnly`].
#[track_caller]
pub fn panic<'a>(ctx: impl Into<Option<&'a Context>>) -> Event {
    event_for(initialization::get(), ctx.into(), Level::Panic)
}

/// Start an `error` event with the `error` field set from `err`.
///
/// `None` gives a plain `error` event.
#[track_caller]
pub fn error_with_cause<'a, E>(ctx: impl Into<Option<&'a Context>>, err: Option<&E>) -> Event
where
    E: fmt::Display + ?Sized,
{
    let event = error(ctx);
    match err {
        Some(err) => event.err(err),
        None => event,
    }
}
