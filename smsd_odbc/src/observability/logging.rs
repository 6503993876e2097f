use crate::error::OdbcError;
use log::Level;
use std::sync::{Arc, Mutex};

pub const LOG_TARGET: &str = "smsd_odbc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Info,
}

impl Severity {
    pub fn level(self) -> Level {
        match self {
            Severity::Error => Level::Error,
            Severity::Info => Level::Info,
        }
    }
}

/// Destination for backend log lines. The daemon plugs its own logger in
/// here; [`LogFacadeSink`] is used when nothing else is configured.
pub trait LogSink: Send + Sync {
    fn log(&self, severity: Severity, message: &str);
}

/// Forwards every line to the `log` facade under [`LOG_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacadeSink;

impl LogSink for LogFacadeSink {
    fn log(&self, severity: Severity, message: &str) {
        log::log!(target: LOG_TARGET, severity.level(), "{}", message);
    }
}

/// Keeps log lines in memory. Handy for asserting on diagnostics.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Severity, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(_) => Vec::new(),
        }
    }

    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(Severity::Error)
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl LogSink for MemorySink {
    fn log(&self, severity: Severity, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((severity, message.to_string()));
        }
    }
}

/// Formats backend events and ODBC diagnostics onto a [`LogSink`].
#[derive(Clone)]
pub struct DiagnosticLogger {
    sink: Arc<dyn LogSink>,
}

impl DiagnosticLogger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub fn error(&self, message: &str) {
        self.sink.log(Severity::Error, message);
    }

    pub fn info(&self, message: &str) {
        self.sink.log(Severity::Info, message);
    }

    /// Logs `context` followed by one line per diagnostic record, formatted
    /// `state:record:native:message`. Errors without records are logged as a
    /// single line after the context.
    pub fn log_failure(&self, context: &str, error: &OdbcError) {
        self.error(&format!("{}, ODBC diagnostics:", context));

        let records = error.diagnostics();
        if records.is_empty() {
            self.error(&error.to_string());
            return;
        }
        for record in records {
            self.error(&record.to_string());
        }
    }
}

impl Default for DiagnosticLogger {
    fn default() -> Self {
        Self::new(Arc::new(LogFacadeSink))
    }
}
