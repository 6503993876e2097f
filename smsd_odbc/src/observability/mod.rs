pub mod logging;

pub use logging::{DiagnosticLogger, LogFacadeSink, LogSink, MemorySink, Severity, LOG_TARGET};
