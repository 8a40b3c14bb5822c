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
//! Bridge from `tracing` into the process logger.
//!
//! Libraries that log through `tracing` macros end up in the same output,
//! with the same fixed fields, as code using this crate directly. The
//! request id comes from the ambient [`Context`] set up with
//! [`Context::scope`].

use crate::config::LogError;
use crate::context::{bind, Context};
use crate::initialization;
use crate::level::Level;
use crate::logger::Logger;
use crate::sink::{Caller, Field};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use tracing::field::{Field as TracingField, Visit};
use tracing::Subscriber;
use tracing_subscriber::layer::{self, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// `tracing` layer writing every event through a [`Logger`].
#[derive(Debug, Clone)]
pub struct FacadeLayer {
    logger: Logger,
}

impl FacadeLayer {
    /// Layer writing through `logger`
    pub fn new(logger: Logger) -> Self {
        FacadeLayer { logger }
    }

    /// Layer writing through the process logger
    pub fn from_global() -> Self {
        Self::new(initialization::snapshot())
    }
}

impl<S: Subscriber> Layer<S> for FacadeLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: layer::Context<'_, S>) {
        let metadata = event.metadata();
        let level = Level::from(*metadata.level());
        if !self.logger.enabled(level) {
            return;
        }

        let logger = match Context::current() {
            Some(ctx) => bind(Some(&ctx), &self.logger),
            None => self.logger.clone(),
        };
        let caller = metadata
            .file()
            .zip(metadata.line())
            .map(|(file, line)| Caller { file, line });

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut out = logger
            .event_at(level, caller)
            .field("target", metadata.target());
        for (key, value) in visitor.fields {
            out = out.field(key, value);
        }
        match visitor.message {
            Some(message) => out.msg(message),
            None => out.send(),
        }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<Field>,
}

impl FieldVisitor {
    fn push(&mut self, field: &TracingField, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.push((Cow::Borrowed(field.name()), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &TracingField, value: &str) {
        self.push(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &TracingField, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &TracingField, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &TracingField, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &TracingField, value: bool) {
        self.push(field, Value::from(value));
    }

    fn record_error(&mut self, field: &TracingField, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &TracingField, value: &dyn fmt::Debug) {
        self.push(field, Value::from(format!("{value:?}")));
    }
}

/// Route all `tracing` events through the process logger.
///
/// `RUST_LOG` narrows what reaches the layer; without it the process
/// logger's minimum level applies.
pub fn init_tracing_bridge() -> Result<(), LogError> {
    let logger = initialization::snapshot();
    let env_filter = EnvFilter::builder()
        .with_default_directive(logger.min_level().as_level_filter().into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(FacadeLayer::new(logger))
        .try_init()
        .map_err(|e| LogError::TracingInit(e.to_string()))
}
