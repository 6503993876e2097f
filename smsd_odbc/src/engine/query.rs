use crate::engine::cell_reader::read_cell;
use crate::engine::statement::{QueryResult, RowSource};
use crate::error::{OdbcError, Result};
use crate::protocol::{CellValue, ColumnMetadata, FetchKind, FieldBuffers, OdbcType};
use odbc_api::handles::{AsStatementRef, Statement, StatementImpl};
use odbc_api::{Connection, Cursor, CursorImpl, Preallocated, ResultSetMetadata};

enum Executed<'c> {
    /// Statement produced a result set; the cursor stays open until drop.
    Cursor(CursorImpl<StatementImpl<'c>>),
    /// INSERT, UPDATE, DDL and friends.
    NoResultSet(Preallocated<StatementImpl<'c>>),
}

/// Rows of a statement executed with SQLExecDirect, fetched on demand.
pub struct OdbcRows<'c> {
    executed: Executed<'c>,
    columns: Vec<ColumnMetadata>,
    kinds: Vec<FetchKind>,
}

/// Executes `sql` once with SQLExecDirect on a fresh statement handle. No
/// parameters are bound; the caller quotes values. The returned result keeps
/// the statement (and its cursor) open until it is dropped.
pub fn execute_direct<'c>(conn: &'c Connection<'_>, sql: &str) -> Result<QueryResult<'c>> {
    let mut statement = conn.preallocate().map_err(|e| match OdbcError::from(e) {
        err @ OdbcError::Diagnostics { .. } => err,
        other => OdbcError::Allocation(other.to_string()),
    })?;

    // into_stmt releases the borrowed cursor without SQLCloseCursor.
    let executed = statement
        .execute(sql, ())
        .map(|cursor| cursor.map(CursorImpl::into_stmt).is_some());
    let has_result_set = match executed {
        Ok(has_result_set) => has_result_set,
        Err(err) => return Err(OdbcError::with_handle_records(err, &statement.as_stmt_ref())),
    };

    if !has_result_set {
        return Ok(QueryResult::new(OdbcRows {
            executed: Executed::NoResultSet(statement),
            columns: Vec::new(),
            kinds: Vec::new(),
        }));
    }

    // SAFETY: execute found a result set and left the handle in cursor state;
    // the cursor taken from it above was released without closing.
    let mut cursor = unsafe { CursorImpl::new(statement.into_handle()) };
    let (columns, kinds) = match describe_columns(&mut cursor) {
        Ok(described) => described,
        Err(err) => return Err(OdbcError::with_handle_records(err, &cursor.as_stmt_ref())),
    };

    Ok(QueryResult::new(OdbcRows {
        executed: Executed::Cursor(cursor),
        columns,
        kinds,
    }))
}

fn describe_columns(
    cursor: &mut CursorImpl<StatementImpl<'_>>,
) -> std::result::Result<(Vec<ColumnMetadata>, Vec<FetchKind>), odbc_api::Error> {
    let cols_i16 = cursor.num_result_cols()?;
    let cols_u16 = u16::try_from(cols_i16).unwrap_or(0);

    let mut columns = Vec::with_capacity(cols_u16.into());
    let mut kinds = Vec::with_capacity(cols_u16.into());
    for col_idx in 1..=cols_u16 {
        let name = cursor.col_name(col_idx)?;
        let odbc_type = OdbcType::from_data_type(&cursor.col_data_type(col_idx)?);
        kinds.push(odbc_type.fetch_kind());
        columns.push(ColumnMetadata { name, odbc_type });
    }
    Ok((columns, kinds))
}

// SQLFetch, then SQLGetData for every field of the row.
fn fetch_next(
    cursor: &mut CursorImpl<StatementImpl<'_>>,
    kinds: &[FetchKind],
    buffers: &mut FieldBuffers,
) -> std::result::Result<Option<Vec<CellValue>>, odbc_api::Error> {
    let Some(mut row) = cursor.next_row()? else {
        return Ok(None);
    };

    let mut cells = Vec::with_capacity(kinds.len());
    for (col_idx, (&kind, column_number)) in kinds.iter().zip(1u16..).enumerate() {
        cells.push(read_cell(&mut row, column_number, kind, buffers.slot(col_idx)));
    }
    Ok(Some(cells))
}

impl RowSource for OdbcRows<'_> {
    fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    fn fetch_row(&mut self, buffers: &mut FieldBuffers) -> Result<Option<Vec<CellValue>>> {
        let cursor = match &mut self.executed {
            Executed::Cursor(cursor) => cursor,
            Executed::NoResultSet(_) => return Ok(None),
        };
        let fetched = fetch_next(cursor, &self.kinds, buffers);
        fetched.map_err(|err| OdbcError::with_handle_records(err, &cursor.as_stmt_ref()))
    }

    fn row_count(&mut self) -> Result<Option<usize>> {
        match &mut self.executed {
            Executed::NoResultSet(statement) => match statement.row_count() {
                Ok(count) => Ok(count),
                Err(err) => Err(OdbcError::with_handle_records(err, &statement.as_stmt_ref())),
            },
            Executed::Cursor(cursor) => {
                let mut stmt = cursor.as_stmt_ref();
                let counted = stmt.row_count().into_result(&stmt);
                match counted {
                    // -1: the driver has no count for this statement
                    Ok(count) => Ok(usize::try_from(count).ok()),
                    Err(err) => Err(OdbcError::with_handle_records(err, &stmt)),
                }
            }
        }
    }
}
