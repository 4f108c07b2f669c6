//! Reporting sink for warnings and errors.
//!
//! The core never prints. It hands a severity and a message to [`report`],
//! which forwards them to the [`log`] facade under the `grt_core` target.
//! Whatever logger the application installs (console, UI overlay, file)
//! decides how the message is rendered.

use crate::error::GrtError;
use core::fmt::Display;

const TARGET: &str = "grt_core";

/// How serious a reported condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    fn level(self) -> log::Level {
        match self {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

/// Hands a message to the logging collaborator.
pub fn report(severity: Severity, message: impl Display) {
    log::log!(target: TARGET, severity.level(), "{message}");
}

/// Reports `err` at error severity and returns it, for `return Err(fail(..))`.
pub(crate) fn fail(err: GrtError) -> GrtError {
    report(Severity::Error, &err);
    err
}

pub(crate) fn warn(message: impl Display) {
    report(Severity::Warning, message);
}
