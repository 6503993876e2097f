use crate::config::BackendConfig;
use crate::engine::{Connector, QueryResult, RowSource, Session};
use crate::error::{DiagnosticRecord, OdbcError, Result};
use crate::protocol::{CellValue, ColumnMetadata, FieldBuffers, OdbcType};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Row source double: hands out queued rows one fetch at a time, then an
/// optional fetch error, then end of data.
pub struct ScriptedRows {
    columns: Vec<ColumnMetadata>,
    rows: VecDeque<Vec<CellValue>>,
    fetch_error: Option<OdbcError>,
    row_count: Result<Option<usize>>,
    fetches: Rc<Cell<usize>>,
    row_count_calls: Rc<Cell<usize>>,
}

impl ScriptedRows {
    pub fn new(columns: &[(&str, OdbcType)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(name, odbc_type)| ColumnMetadata {
                    name: (*name).to_string(),
                    odbc_type: *odbc_type,
                })
                .collect(),
            rows: VecDeque::new(),
            fetch_error: None,
            row_count: Ok(None),
            fetches: Rc::new(Cell::new(0)),
            row_count_calls: Rc::new(Cell::new(0)),
        }
    }

    /// Statement without a result set (INSERT, UPDATE, DDL).
    pub fn without_result_set(row_count: Result<Option<usize>>) -> Self {
        Self::new(&[]).with_row_count(row_count)
    }

    pub fn row(mut self, cells: Vec<CellValue>) -> Self {
        self.rows.push_back(cells);
        self
    }

    /// Fails the fetch that follows the queued rows.
    pub fn fail_with(mut self, error: OdbcError) -> Self {
        self.fetch_error = Some(error);
        self
    }

    pub fn with_row_count(mut self, row_count: Result<Option<usize>>) -> Self {
        self.row_count = row_count;
        self
    }

    /// Number of `fetch_row` calls so far, end of data included.
    pub fn fetch_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.fetches)
    }

    /// Number of `row_count` calls so far.
    pub fn row_count_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.row_count_calls)
    }
}

impl RowSource for ScriptedRows {
    fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    fn fetch_row(&mut self, buffers: &mut FieldBuffers) -> Result<Option<Vec<CellValue>>> {
        self.fetches.set(self.fetches.get() + 1);
        let Some(row) = self.rows.pop_front() else {
            return match self.fetch_error.take() {
                Some(err) => Err(err),
                None => Ok(None),
            };
        };
        // Go through the buffers the way the driver path does.
        for (idx, cell) in row.iter().enumerate() {
            if let CellValue::Text(bytes) = cell {
                let slot = buffers.slot(idx);
                slot.clear();
                slot.extend_from_slice(bytes);
            }
        }
        Ok(Some(row))
    }

    fn row_count(&mut self) -> Result<Option<usize>> {
        self.row_count_calls.set(self.row_count_calls.get() + 1);
        self.row_count.clone()
    }
}

#[derive(Default)]
struct Script {
    connect_error: Option<OdbcError>,
    responses: VecDeque<Result<ScriptedRows>>,
    executed: Vec<String>,
    hosts: Vec<String>,
    dead: bool,
}

/// Connector double that replays queued results instead of talking to a
/// driver. Clones share the same script, so a test keeps one handle to queue
/// responses and inspect what the backend executed.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    script: Rc<RefCell<Script>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_connect(&self, error: OdbcError) {
        self.script.borrow_mut().connect_error = Some(error);
    }

    /// Queues the outcome of the next `execute`. Once the queue is empty,
    /// statements succeed without a result set.
    pub fn push_result(&self, result: Result<ScriptedRows>) {
        self.script.borrow_mut().responses.push_back(result);
    }

    pub fn push_rows(&self, columns: &[(&str, OdbcType)], rows: Vec<Vec<CellValue>>) {
        let scripted = rows
            .into_iter()
            .fold(ScriptedRows::new(columns), ScriptedRows::row);
        self.push_result(Ok(scripted));
    }

    pub fn set_dead(&self, dead: bool) {
        self.script.borrow_mut().dead = dead;
    }

    pub fn executed(&self) -> Vec<String> {
        self.script.borrow().executed.clone()
    }

    /// Data source names of every successful connect, oldest first.
    pub fn hosts(&self) -> Vec<String> {
        self.script.borrow().hosts.clone()
    }
}

impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    fn connect(&self, config: &BackendConfig) -> Result<ScriptedSession> {
        config.validate()?;
        let mut script = self.script.borrow_mut();
        if let Some(err) = script.connect_error.clone() {
            return Err(err);
        }
        script.hosts.push(config.host.clone());
        Ok(ScriptedSession {
            script: Rc::clone(&self.script),
        })
    }
}

pub struct ScriptedSession {
    script: Rc<RefCell<Script>>,
}

impl Session for ScriptedSession {
    fn execute(&self, sql: &str) -> Result<QueryResult<'_>> {
        let mut script = self.script.borrow_mut();
        script.executed.push(sql.to_string());
        let rows = script
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(ScriptedRows::without_result_set(Ok(None))))?;
        Ok(QueryResult::new(rows))
    }

    fn is_dead(&self) -> bool {
        self.script.borrow().dead
    }
}

/// Single-record diagnostics error, as the driver would report it.
pub fn diagnostics(function: &'static str, state: &[u8; 5], native_code: i32, message: &str) -> OdbcError {
    OdbcError::Diagnostics {
        function,
        records: vec![DiagnosticRecord::new(
            *state,
            1,
            native_code,
            message.to_string(),
        )],
    }
}

pub fn text(value: &str) -> CellValue {
    CellValue::Text(value.as_bytes().to_vec())
}
