use odbc_api::handles::{DiagnosticStream, Diagnostics, Record as OdbcRecord};
use std::fmt;
use thiserror::Error;

/// Stage of the call sequence a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Environment or statement handle could not be allocated
    Allocation,
    /// Connect/authentication failure or a lost link (SQLSTATE class 08)
    Connection,
    /// Statement rejected by the data source
    Execution,
    /// Cursor failed while rows were being fetched
    Fetch,
    /// Field is NULL, out of range, or cannot be represented as requested
    Conversion,
}

/// One diagnostic record attached to a failed ODBC call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub state: [u8; 5],
    pub record_number: i16,
    pub native_code: i32,
    pub message: String,
}

impl DiagnosticRecord {
    pub fn new(state: [u8; 5], record_number: i16, native_code: i32, message: String) -> Self {
        Self {
            state,
            record_number,
            native_code,
            message,
        }
    }

    pub fn state_str(&self) -> String {
        String::from_utf8_lossy(&self.state).into_owned()
    }

    /// True for SQLSTATE class 08 (connection exception).
    pub fn is_connection_state(&self) -> bool {
        self.state[0] == b'0' && self.state[1] == b'8'
    }

    fn from_odbc_record(record: &OdbcRecord, record_number: i16) -> Self {
        Self::new(
            record.state.0,
            record_number,
            record.native_error,
            odbc_api::handles::slice_to_cow_utf8(&record.message).into_owned(),
        )
    }
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.state_str(),
            self.record_number,
            self.native_code,
            self.message
        )
    }
}

fn summarize(records: &[DiagnosticRecord]) -> String {
    match records.first() {
        Some(first) if records.len() > 1 => {
            format!("{} (+{} more)", first, records.len() - 1)
        }
        Some(first) => first.to_string(),
        None => "no diagnostics".to_string(),
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OdbcError {
    #[error("{function} failed: {}", summarize(.records))]
    Diagnostics {
        function: &'static str,
        records: Vec<DiagnosticRecord>,
    },

    #[error("ODBC error: {0}")]
    OdbcApi(String),

    #[error("Handle allocation failed: {0}")]
    Allocation(String),

    #[error("Data source name is empty")]
    EmptyDataSourceName,

    #[error("Backend is not connected")]
    NotConnected,

    #[error("No current row, call next_row first")]
    NoCurrentRow,

    #[error("Field {field} out of range, result has {columns} columns")]
    FieldOutOfRange { field: usize, columns: usize },

    #[error("Field {field} is NULL")]
    NullValue { field: usize },

    #[error("Field {field}: cannot convert {found} to {expected}")]
    Conversion {
        field: usize,
        expected: &'static str,
        found: String,
    },

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<odbc_api::Error> for OdbcError {
    fn from(err: odbc_api::Error) -> Self {
        if let Some(structured) = try_extract_diagnostics(&err) {
            return structured;
        }
        OdbcError::OdbcApi(err.to_string())
    }
}

fn try_extract_diagnostics(err: &odbc_api::Error) -> Option<OdbcError> {
    use odbc_api::Error as OdbcErr;
    let (function, record) = match err {
        OdbcErr::Diagnostics { record, function } => (*function, record),
        OdbcErr::UnsupportedOdbcApiVersion(record) => ("SQLSetEnvAttr", record),
        OdbcErr::UnableToRepresentNull(record) => ("SQLGetData", record),
        _ => return None,
    };
    Some(OdbcError::Diagnostics {
        function,
        records: vec![DiagnosticRecord::from_odbc_record(record, 1)],
    })
}

impl OdbcError {
    pub fn diagnostics(&self) -> &[DiagnosticRecord] {
        match self {
            OdbcError::Diagnostics { records, .. } => records,
            _ => &[],
        }
    }

    pub fn sqlstate(&self) -> [u8; 5] {
        self.diagnostics()
            .first()
            .map(|record| record.state)
            .unwrap_or([0u8; 5])
    }

    pub fn native_code(&self) -> i32 {
        self.diagnostics()
            .first()
            .map(|record| record.native_code)
            .unwrap_or(0)
    }

    pub fn message(&self) -> String {
        match self.diagnostics().first() {
            Some(record) => record.message.clone(),
            None => self.to_string(),
        }
    }

    /// Converts `err` and, for a diagnostics error, replaces the single record
    /// odbc-api kept with every record still attached to `handle`. Must be
    /// called before anything else touches the handle.
    pub fn with_handle_records(
        err: odbc_api::Error,
        handle: &(impl Diagnostics + ?Sized),
    ) -> Self {
        let mut converted = OdbcError::from(err);
        if let OdbcError::Diagnostics { records, .. } = &mut converted {
            let all = collect_records(handle);
            if !all.is_empty() {
                *records = all;
            }
        }
        converted
    }

    /// Returns true if this is a connection-related error
    pub fn is_connection_error(&self) -> bool {
        match self {
            OdbcError::EmptyDataSourceName | OdbcError::NotConnected => true,
            OdbcError::Diagnostics {
                function, records, ..
            } => {
                function.starts_with("SQLConnect")
                    || function.starts_with("SQLDriverConnect")
                    || records.iter().any(DiagnosticRecord::is_connection_state)
            }
            _ => false,
        }
    }

    /// Returns true if the error is transient and the dispatcher may retry
    pub fn is_retryable(&self) -> bool {
        self.diagnostics()
            .iter()
            .any(DiagnosticRecord::is_connection_state)
    }

    pub fn error_category(&self) -> ErrorCategory {
        if self.is_connection_error() {
            return ErrorCategory::Connection;
        }
        match self {
            OdbcError::Allocation(_) => ErrorCategory::Allocation,
            OdbcError::Diagnostics { function, .. } => {
                if function.starts_with("SQLAllocHandle") || function.starts_with("SQLSetEnvAttr") {
                    ErrorCategory::Allocation
                } else if function.starts_with("SQLFetch") || function.starts_with("SQLGetData") {
                    ErrorCategory::Fetch
                } else {
                    ErrorCategory::Execution
                }
            }
            OdbcError::NoCurrentRow
            | OdbcError::FieldOutOfRange { .. }
            | OdbcError::NullValue { .. }
            | OdbcError::Conversion { .. } => ErrorCategory::Conversion,
            _ => ErrorCategory::Execution,
        }
    }
}

/// Reads diagnostic records 1.. from `handle` until the driver reports no more.
pub fn collect_records(handle: &(impl Diagnostics + ?Sized)) -> Vec<DiagnosticRecord> {
    let mut stream = DiagnosticStream::new(handle);
    let mut records = Vec::new();
    let mut record_number: i16 = 0;
    while let Some(record) = stream.next() {
        record_number += 1;
        records.push(DiagnosticRecord::from_odbc_record(record, record_number));
    }
    records
}

pub type Result<T> = std::result::Result<T, OdbcError>;
