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
//! Process logger installation.
//!
//! The process has exactly one base logger. It is installed once, either
//! explicitly through one of the `init*` functions or implicitly from the
//! environment on the first call to [`get`], and never changes afterwards.

use crate::config::{Config, LogError};
use crate::level::Level;
use crate::logger::Logger;
use std::sync::OnceLock;

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Install the base logger resolved from the environment.
///
/// # Example
///
/// ```ignore
/// fn main() {
///     ctxlog::init().ok();
///     ctxlog::info(None).msg("Application started");
/// }
/// ```
pub fn init() -> Result<&'static Logger, LogError> {
    init_with_config(Config::from_env())
}

/// Install the base logger built from `config`.
///
/// # Example
///
/// ```ignore
/// use ctxlog::{Config, Level, OutputMode};
///
/// let config = Config::new()
///     .with_output_mode(OutputMode::Console)
///     .with_min_level(Level::Debug)
///     .with_app_name("billing");
///
/// ctxlog::init_with_config(config).unwrap();
/// ```
pub fn init_with_config(config: Config) -> Result<&'static Logger, LogError> {
    init_with_logger(config.build())
}

/// Install an already built base logger.
///
/// Fails with [`LogError::AlreadyInitialized`] if a logger is installed,
/// including one installed implicitly by [`get`].
pub fn init_with_logger(logger: Logger) -> Result<&'static Logger, LogError> {
    let mut installed = false;
    let current = LOGGER.get_or_init(|| {
        installed = true;
        logger
    });

    if !installed {
        return Err(LogError::AlreadyInitialized);
    }

    tracing::debug!(
        min_level = %current.min_level(),
        fields = current.fields().len(),
        "process logger installed"
    );
    Ok(current)
}

/// The base logger, installing the environment configuration if nothing
/// has been installed yet.
pub fn get() -> &'static Logger {
    LOGGER.get_or_init(|| Config::from_env().build())
}

/// A handle on the base logger for code that has no request context.
pub fn snapshot() -> Logger {
    get().clone()
}

/// Whether a base logger has been installed
pub fn is_initialized() -> bool {
    LOGGER.get().is_some()
}

/// Process-wide minimum level
pub fn min_level() -> Level {
    get().min_level()
}
