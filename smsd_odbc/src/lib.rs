pub mod backend;
pub mod config;
pub mod engine;
mod error;
pub mod observability;
pub mod protocol;
pub mod security;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use backend::{quote_string, string_to_bool, OdbcBackend, RowStatus, SqlBackend};
pub use config::BackendConfig;
pub use engine::{
    Connector, OdbcConnector, OdbcEnvironment, OdbcSession, QueryResult, RowSource, Session,
};
pub use error::{DiagnosticRecord, ErrorCategory, OdbcError, Result};
pub use observability::{DiagnosticLogger, LogFacadeSink, LogSink, MemorySink, Severity};
pub use security::Secret;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_starts_disconnected() {
        let backend = OdbcBackend::new();
        assert!(!backend.is_connected());
    }

    #[test]
    fn test_query_without_connection() {
        let backend = OdbcBackend::new().with_log_sink(std::sync::Arc::new(MemorySink::new()));
        match backend.query("SELECT 1") {
            Err(OdbcError::NotConnected) => (),
            _ => panic!("Expected NotConnected error"),
        };
    }

    #[test]
    fn test_connection_empty_host() {
        let mut backend = OdbcBackend::new().with_log_sink(std::sync::Arc::new(MemorySink::new()));
        let result = backend.connect(&BackendConfig::new("", "user1", "pw1"));
        match result {
            Err(OdbcError::EmptyDataSourceName) => (),
            _ => panic!("Expected EmptyDataSourceName error"),
        }
    }
}
