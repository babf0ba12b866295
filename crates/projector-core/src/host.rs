use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Services the embedding application provides besides drawing.
pub trait Environment {
    /// Surfaces a user-visible notification.
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Environment that only logs.
#[derive(Default)]
pub struct LogEnvironment;

impl Environment for LogEnvironment {
    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => log::info!("{message}"),
            Severity::Warning => log::warn!("{message}"),
            Severity::Error => log::error!("{message}"),
        }
    }
}
