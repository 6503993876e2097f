pub mod odbc;
pub mod text;

use crate::config::BackendConfig;
use crate::engine::QueryResult;
use crate::error::Result;
use chrono::{DateTime, Local};

pub use odbc::{OdbcBackend, IDENTITY_QUERY};
pub use text::{quote_string, string_to_bool};

/// Outcome of a successful fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// A row was fetched and its fields can be read.
    Available,
    /// The result set has no more rows.
    Exhausted,
}

/// Operations a generic SQL dispatcher drives on a storage backend.
///
/// Field indices are zero-based. Accessors read the row made current by the
/// last successful [`next_row`](SqlBackend::next_row).
pub trait SqlBackend {
    fn connect(&mut self, config: &BackendConfig) -> Result<()>;

    /// Executes `sql`. Rows are fetched one at a time by `next_row` while the
    /// result stays open.
    fn query(&self, sql: &str) -> Result<QueryResult<'_>>;

    /// Disconnects. A no-op on a backend that is not connected.
    fn free(&mut self);

    fn free_result(&self, result: QueryResult<'_>);

    fn next_row(&self, result: &mut QueryResult<'_>) -> Result<RowStatus>;

    /// Id generated by the last insert on this connection, 0 when unknown.
    fn seq_id(&self, sequence_hint: &str) -> u64;

    /// Rows changed by the statement behind `result`, 0 when unknown. The
    /// driver is asked at call time, with the statement still open.
    fn affected_rows(&self, result: &mut QueryResult<'_>) -> u64;

    /// `Ok(None)` for SQL NULL.
    fn get_string(&self, result: &QueryResult<'_>, field: usize) -> Result<Option<String>>;

    fn get_number(&self, result: &QueryResult<'_>, field: usize) -> Result<i64>;

    fn get_date(&self, result: &QueryResult<'_>, field: usize) -> Result<DateTime<Local>>;

    /// `false` for NULL and for values that are neither numeric nor a
    /// recognised boolean string.
    fn get_bool(&self, result: &QueryResult<'_>, field: usize) -> bool;

    fn quote_string(&self, text: &str) -> String;
}
