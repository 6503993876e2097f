use super::text::{quote_string, string_to_bool};
use super::{RowStatus, SqlBackend};
use crate::config::BackendConfig;
use crate::engine::{Connector, OdbcConnector, QueryResult, Session};
use crate::error::{OdbcError, Result};
use crate::observability::{DiagnosticLogger, LogSink};
use crate::protocol::{CellValue, FieldBuffers, SqlTimestamp};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::cell::{RefCell, RefMut};
use std::sync::Arc;

/// Statement run by [`SqlBackend::seq_id`]. The sequence hint is not used.
pub const IDENTITY_QUERY: &str = "SELECT @@IDENTITY";

const TEXT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const TEXT_DATE_FORMAT: &str = "%Y-%m-%d";

/// ODBC implementation of [`SqlBackend`].
///
/// Owns at most one connection and the per-field buffers rows are read
/// through. Every failure is logged through the configured [`LogSink`]
/// before it is returned.
pub struct OdbcBackend<C: Connector = OdbcConnector> {
    connector: C,
    session: Option<C::Session>,
    buffers: RefCell<FieldBuffers>,
    logger: DiagnosticLogger,
    parse_bool: fn(&str) -> Option<bool>,
}

impl OdbcBackend<OdbcConnector> {
    pub fn new() -> Self {
        Self::with_connector(OdbcConnector)
    }
}

impl Default for OdbcBackend<OdbcConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> OdbcBackend<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector,
            session: None,
            buffers: RefCell::new(FieldBuffers::new()),
            logger: DiagnosticLogger::default(),
            parse_bool: string_to_bool,
        }
    }

    pub fn with_log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.logger = DiagnosticLogger::new(sink);
        self
    }

    /// Replaces the parser `get_bool` falls back to for text fields.
    pub fn with_bool_parser(mut self, parse_bool: fn(&str) -> Option<bool>) -> Self {
        self.parse_bool = parse_bool;
        self
    }

    /// True while a connection is held and the driver has not reported it
    /// as lost.
    pub fn is_connected(&self) -> bool {
        self.session
            .as_ref()
            .map(|session| !session.is_dead())
            .unwrap_or(false)
    }

    fn session(&self) -> Result<&C::Session> {
        self.session.as_ref().ok_or(OdbcError::NotConnected)
    }

    fn buffers(&self) -> Result<RefMut<'_, FieldBuffers>> {
        self.buffers
            .try_borrow_mut()
            .map_err(|_| OdbcError::InternalError("field buffers already in use".to_string()))
    }

    fn report_field_error(&self, context: &str, field: usize, err: &OdbcError) {
        match err {
            OdbcError::FieldOutOfRange { .. } => {
                self.logger
                    .error(&format!("Field {} returning NULL, too many fields!", field));
            }
            other => self.logger.log_failure(context, other),
        }
    }

    fn read_identity(&self) -> Result<i64> {
        let mut result = self.session()?.execute(IDENTITY_QUERY)?;
        if !result.advance(&mut *self.buffers()?)? {
            return Err(OdbcError::InternalError(format!(
                "{} returned no rows",
                IDENTITY_QUERY
            )));
        }
        lookup(&result, 0).and_then(|cell| number_of(cell, 0))
    }
}

impl<C: Connector> SqlBackend for OdbcBackend<C> {
    fn connect(&mut self, config: &BackendConfig) -> Result<()> {
        self.free();

        match self.connector.connect(config) {
            Ok(session) => {
                self.session = Some(session);
                self.logger
                    .info(&format!("Connected to ODBC data source {}", config.host));
                Ok(())
            }
            Err(err) => {
                self.logger.log_failure("SQLConnect failed", &err);
                Err(err)
            }
        }
    }

    fn query(&self, sql: &str) -> Result<QueryResult<'_>> {
        self.session()
            .and_then(|session| session.execute(sql))
            .map_err(|err| {
                self.logger.log_failure("SQLExecDirect failed", &err);
                err
            })
    }

    fn free(&mut self) {
        self.session = None;
        self.buffers.get_mut().clear();
    }

    fn free_result(&self, result: QueryResult<'_>) {
        drop(result);
    }

    fn next_row(&self, result: &mut QueryResult<'_>) -> Result<RowStatus> {
        let advanced = self
            .buffers()
            .and_then(|mut buffers| result.advance(&mut buffers));
        match advanced {
            Ok(true) => Ok(RowStatus::Available),
            Ok(false) => Ok(RowStatus::Exhausted),
            Err(err) => {
                self.logger.log_failure("SQLFetch failed", &err);
                Err(err)
            }
        }
    }

    fn seq_id(&self, _sequence_hint: &str) -> u64 {
        match self.read_identity() {
            Ok(id) => match u64::try_from(id) {
                Ok(id) => id,
                Err(_) => {
                    self.logger
                        .error(&format!("{} returned negative id {}", IDENTITY_QUERY, id));
                    0
                }
            },
            Err(err) => {
                self.logger.log_failure("Fetching last insert id failed", &err);
                0
            }
        }
    }

    fn affected_rows(&self, result: &mut QueryResult<'_>) -> u64 {
        match result.row_count() {
            Ok(Some(count)) => count as u64,
            Ok(None) => 0,
            Err(err) => {
                self.logger.log_failure("SQLRowCount failed", &err);
                0
            }
        }
    }

    fn get_string(&self, result: &QueryResult<'_>, field: usize) -> Result<Option<String>> {
        let value = lookup(result, field)
            .and_then(|cell| string_of(cell, field))
            .map_err(|err| {
                self.report_field_error("SQLGetData(string) failed", field, &err);
                err
            })?;

        match &value {
            Some(text) => self
                .logger
                .info(&format!("Field {} returning string \"{}\"", field, text)),
            None => self.logger.info(&format!("Field {} returning NULL", field)),
        }
        Ok(value)
    }

    fn get_number(&self, result: &QueryResult<'_>, field: usize) -> Result<i64> {
        lookup(result, field)
            .and_then(|cell| number_of(cell, field))
            .map_err(|err| {
                self.report_field_error("SQLGetData(long) failed", field, &err);
                err
            })
    }

    fn get_date(&self, result: &QueryResult<'_>, field: usize) -> Result<DateTime<Local>> {
        lookup(result, field)
            .and_then(|cell| date_of(cell, field))
            .map_err(|err| {
                self.report_field_error("SQLGetData(timestamp) failed", field, &err);
                err
            })
    }

    fn get_bool(&self, result: &QueryResult<'_>, field: usize) -> bool {
        if let Ok(number) = lookup(result, field).and_then(|cell| number_of(cell, field)) {
            return number != 0;
        }
        match self.get_string(result, field) {
            Ok(Some(text)) => (self.parse_bool)(&text).unwrap_or(false),
            _ => false,
        }
    }

    fn quote_string(&self, text: &str) -> String {
        quote_string(text)
    }
}

fn lookup<'r>(result: &'r QueryResult<'_>, field: usize) -> Result<&'r CellValue> {
    match result.cell(field)? {
        CellValue::Unreadable(err) => Err(err.clone()),
        cell => Ok(cell),
    }
}

// Text fields are read as SQL_C_CHAR; anything that is not UTF-8 is refused.
fn utf8_of(bytes: &[u8], field: usize) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|err| OdbcError::Conversion {
        field,
        expected: "UTF-8 text",
        found: format!(
            "{} bytes, invalid at offset {}",
            bytes.len(),
            err.valid_up_to()
        ),
    })
}

fn number_of(cell: &CellValue, field: usize) -> Result<i64> {
    match cell {
        CellValue::Integer(value) => Ok(*value),
        CellValue::Text(bytes) => {
            let text = utf8_of(bytes, field)?;
            parse_number(text).ok_or_else(|| OdbcError::Conversion {
                field,
                expected: "integer",
                found: format!("{:?}", text),
            })
        }
        CellValue::Timestamp(ts) => Err(OdbcError::Conversion {
            field,
            expected: "integer",
            found: format!("timestamp {}", ts),
        }),
        CellValue::Null => Err(OdbcError::NullValue { field }),
        CellValue::Unreadable(err) => Err(err.clone()),
    }
}

// Decimal text is truncated toward zero.
fn parse_number(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    let value = text.parse::<f64>().ok()?.trunc();
    if value.is_finite() && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn date_of(cell: &CellValue, field: usize) -> Result<DateTime<Local>> {
    let naive = match cell {
        CellValue::Timestamp(ts) => naive_from_timestamp(ts).ok_or_else(|| OdbcError::Conversion {
            field,
            expected: "timestamp",
            found: ts.to_string(),
        })?,
        CellValue::Text(bytes) => {
            let text = utf8_of(bytes, field)?;
            parse_naive(text).ok_or_else(|| OdbcError::Conversion {
                field,
                expected: "timestamp",
                found: format!("{:?}", text),
            })?
        }
        CellValue::Integer(value) => {
            return Err(OdbcError::Conversion {
                field,
                expected: "timestamp",
                found: format!("integer {}", value),
            })
        }
        CellValue::Null => return Err(OdbcError::NullValue { field }),
        CellValue::Unreadable(err) => return Err(err.clone()),
    };

    // Nonexistent wall-clock times (DST gap) have no earliest instant.
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| OdbcError::Conversion {
            field,
            expected: "local time",
            found: naive.to_string(),
        })
}

fn naive_from_timestamp(ts: &SqlTimestamp) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(ts.year.into(), ts.month.into(), ts.day.into())?.and_hms_nano_opt(
        ts.hour.into(),
        ts.minute.into(),
        ts.second.into(),
        ts.fraction,
    )
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, TEXT_TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, TEXT_DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn string_of(cell: &CellValue, field: usize) -> Result<Option<String>> {
    match cell {
        CellValue::Null => Ok(None),
        CellValue::Integer(value) => Ok(Some(value.to_string())),
        CellValue::Timestamp(ts) => Ok(Some(ts.to_string())),
        CellValue::Text(bytes) => utf8_of(bytes, field).map(|text| Some(text.to_string())),
        CellValue::Unreadable(err) => Err(err.clone()),
    }
}
