use crate::config::BackendConfig;
use crate::engine::statement::QueryResult;
use crate::error::Result;

/// An open connection the backend can run statements on. Dropping it
/// disconnects and frees the connection handle.
pub trait Session {
    /// Runs `sql`. The result borrows the session, so it cannot outlive the
    /// connection its cursor lives on.
    fn execute(&self, sql: &str) -> Result<QueryResult<'_>>;

    /// True when the driver reports the link as lost.
    fn is_dead(&self) -> bool;
}

/// Opens sessions against a data source.
pub trait Connector {
    type Session: Session;

    fn connect(&self, config: &BackendConfig) -> Result<Self::Session>;
}
