//! User-facing notifications.
//!
//! Adapters report outcomes through a [`Notifier`] handed to them by
//! the caller instead of reaching for a global toast function.

use std::fmt;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// The operation succeeded.
    Success,
    /// The operation failed and was abandoned.
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Sink for short messages meant for the user.
pub trait Notifier {
    /// Show `message`.
    fn notify(&self, level: Level, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, level: Level, message: &str) {
        (**self).notify(level, message);
    }
}

/// Writes notifications to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: Level, message: &str) {
        match level {
            Level::Success => log::info!("{message}"),
            Level::Error => log::error!("{message}"),
        }
    }
}
