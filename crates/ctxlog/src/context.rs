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
//! Request-scoped execution context.
//!
//! A [`Context`] carries values down a call chain, most importantly the
//! request id that [`bind`] attaches to log records. Contexts are immutable:
//! [`Context::with_value`] returns a new context that shadows the key.

use crate::logger::Logger;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Context key and field name of the request correlation id
pub const REQUEST_ID_KEY: &str = "request_id";

tokio::task_local! {
    static CURRENT: Context;
}

struct Entry {
    key: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

/// Immutable key/value carrier passed along a request.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

impl Context {
    /// An empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a context where `key` maps to `value`.
    pub fn with_value<T>(&self, key: &'static str, value: T) -> Context
    where
        T: Any + Send + Sync,
    {
        Context {
            head: Some(Arc::new(Entry {
                key,
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Look up `key` as a `T`.
    ///
    /// Returns `None` if the key is missing or holds a different type.
    pub fn value<T: Any>(&self, key: &str) -> Option<&T> {
        let mut entry = self.head.as_deref();
        while let Some(current) = entry {
            if current.key == key {
                return current.value.downcast_ref::<T>();
            }
            entry = current.parent.as_deref();
        }
        None
    }

    /// Return a context carrying a request id
    pub fn with_request_id(&self, request_id: impl Into<String>) -> Context {
        self.with_value(REQUEST_ID_KEY, request_id.into())
    }

    /// The request id, if one is set and non-empty.
    ///
    /// Both `String` and `&'static str` values are accepted; anything else
    /// counts as absent.
    pub fn request_id(&self) -> Option<&str> {
        self.value::<String>(REQUEST_ID_KEY)
            .map(String::as_str)
            .or_else(|| self.value::<&'static str>(REQUEST_ID_KEY).copied())
            .filter(|id| !id.is_empty())
    }

    /// Run `future` with this context installed as the ambient context.
    pub async fn scope<F: Future>(self, future: F) -> F::Output {
        CURRENT.scope(self, future).await
    }

    /// Run `f` with this context installed as the ambient context.
    pub fn sync_scope<R>(self, f: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(self, f)
    }

    /// The ambient context, if called inside [`Context::scope`] or
    /// [`Context::sync_scope`].
    pub fn current() -> Option<Context> {
        CURRENT.try_with(Context::clone).ok()
    }

    fn keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        let mut entry = self.head.as_deref();
        while let Some(current) = entry {
            keys.push(current.key);
            entry = current.parent.as_deref();
        }
        keys
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("keys", &self.keys())
            .field("request_id", &self.request_id())
            .finish()
    }
}

/// Derive the logger for a call made with `ctx`.
///
/// With a request id in the context, the result is `base` plus a
/// `request_id` field; otherwise it is a clone of `base`. `base` is never
/// modified.
pub fn bind(ctx: Option<&Context>, base: &Logger) -> Logger {
    match ctx.and_then(Context::request_id) {
        Some(request_id) => base.with_field(REQUEST_ID_KEY, request_id.to_string()),
        None => base.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn base_logger() -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        (Logger::new(Arc::new(sink.clone())), sink)
    }

    #[test]
    fn test_value_lookup_and_shadowing() {
        let ctx = Context::new().with_value("tenant", 7u32);
        let shadowed = ctx.with_value("tenant", 9u32);

        assert_eq!(ctx.value::<u32>("tenant"), Some(&7));
        assert_eq!(shadowed.value::<u32>("tenant"), Some(&9));
        assert_eq!(ctx.value::<u32>("missing"), None);
    }

    #[test]
    fn test_type_mismatch_is_absent() {
        let ctx = Context::new().with_value(REQUEST_ID_KEY, 42u64);
        assert_eq!(ctx.value::<String>(REQUEST_ID_KEY), None);
        assert_eq!(ctx.request_id(), None);
    }

    #[test]
    fn test_request_id_forms() {
        assert_eq!(Context::new().with_request_id("abc123").request_id(), Some("abc123"));
        assert_eq!(
            Context::new().with_value(REQUEST_ID_KEY, "static-id").request_id(),
            Some("static-id")
        );
        assert_eq!(Context::new().with_request_id("").request_id(), None);
        assert_eq!(Context::new().request_id(), None);
    }

    #[test]
    fn test_bind_attaches_request_id() {
        let (base, sink) = base_logger();
        let ctx = Context::new().with_request_id("abc123");

        bind(Some(&ctx), &base).info().msg("with id");

        assert_eq!(sink.records()[0].get_str(REQUEST_ID_KEY), Some("abc123"));
        assert!(base.field(REQUEST_ID_KEY).is_none());
    }

    #[test]
    fn test_bind_without_id_or_context() {
        let (base, sink) = base_logger();

        bind(None, &base).info().msg("no context");
        bind(Some(&Context::new()), &base).info().msg("empty context");
        bind(Some(&Context::new().with_value(REQUEST_ID_KEY, 1i32)), &base)
            .info()
            .msg("wrong type");

        assert_eq!(sink.len(), 3);
        assert!(sink.records().iter().all(|r| !r.has(REQUEST_ID_KEY)));
    }

    #[test]
    fn test_repeated_binds_do_not_accumulate() {
        let (base, sink) = base_logger();
        for id in ["first", "second", "third"] {
            let ctx = Context::new().with_request_id(id);
            bind(Some(&ctx), &base).info().send();
        }

        for (record, id) in sink.records().iter().zip(["first", "second", "third"]) {
            assert_eq!(record.count(REQUEST_ID_KEY), 1);
            assert_eq!(record.get_str(REQUEST_ID_KEY), Some(id));
        }
    }

    #[test]
    fn test_sync_scope_sets_current() {
        assert!(Context::current().is_none());
        let ctx = Context::new().with_request_id("scoped");
        let seen = ctx.sync_scope(|| Context::current().and_then(|c| c.request_id().map(str::to_string)));
        assert_eq!(seen.as_deref(), Some("scoped"));
        assert!(Context::current().is_none());
    }

    #[test]
    fn test_async_scope_sets_current() {
        let ctx = Context::new().with_request_id("async-scoped");
        let seen = tokio_test::block_on(ctx.scope(async {
            Context::current().and_then(|c| c.request_id().map(str::to_string))
        }));
        assert_eq!(seen.as_deref(), Some("async-scoped"));
    }
}
