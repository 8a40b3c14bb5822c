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
//! Convenience macros for structured logging.
//!
//! These wrap the facade functions so a message and its fields fit on one
//! call.

/// Log an info message with structured fields
///
/// # Example
///
/// ```ignore
/// log_info!(&ctx, "Processing file" => {
///     "path" => "/path/to/file",
///     "size" => 1024,
/// });
/// ```
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $msg:expr) => {
        $crate::info($ctx).msg($msg)
    };
    ($ctx:expr, $msg:expr => { $($key:expr => $value:expr),* $(,)? }) => {
        $crate::info($ctx)$(.field($key, $value))*.msg($msg)
    };
}

/// Log a debug message with structured fields
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $msg:expr) => {
        $crate::debug($ctx).msg($msg)
    };
    ($ctx:expr, $msg:expr => { $($key:expr => $value:expr),* $(,)? }) => {
        $crate::debug($ctx)$(.field($key, $value))*.msg($msg)
    };
}

/// Log a warning message with structured fields
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $msg:expr) => {
        $crate::warn($ctx).msg($msg)
    };
    ($ctx:expr, $msg:expr => { $($key:expr => $value:expr),* $(,)? }) => {
        $crate::warn($ctx)$(.field($key, $value))*.msg($msg)
    };
}

/// Log an error message with structured fields
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $msg:expr) => {
        $crate::error($ctx).msg($msg)
    };
    ($ctx:expr, $msg:expr => { $($key:expr => $value:expr),* $(,)? }) => {
        $crate::error($ctx)$(.field($key, $value))*.msg($msg)
    };
}
