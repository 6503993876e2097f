use crate::error::{OdbcError, Result};
use crate::protocol::{CellValue, FetchKind, SqlTimestamp};
use odbc_api::{sys::Timestamp, CursorRow, Nullable};

/// Reads one field of the current row. A failed SQLGetData does not abort
/// the row; the error is kept in the cell and surfaces when the field is read.
pub fn read_cell(
    row: &mut CursorRow<'_>,
    column_number: u16,
    kind: FetchKind,
    scratch: &mut Vec<u8>,
) -> CellValue {
    let read = match kind {
        FetchKind::Integer => read_integer(row, column_number),
        FetchKind::Timestamp => read_timestamp(row, column_number),
        FetchKind::Text => read_text(row, column_number, scratch),
    };
    read.unwrap_or_else(CellValue::Unreadable)
}

fn read_integer(row: &mut CursorRow<'_>, column_number: u16) -> Result<CellValue> {
    let mut value = Nullable::<i64>::null();
    row.get_data(column_number, &mut value)
        .map_err(OdbcError::from)?;

    Ok(value.into_opt().map_or(CellValue::Null, CellValue::Integer))
}

fn read_timestamp(row: &mut CursorRow<'_>, column_number: u16) -> Result<CellValue> {
    let mut value = Nullable::<Timestamp>::null();
    row.get_data(column_number, &mut value)
        .map_err(OdbcError::from)?;

    Ok(value
        .into_opt()
        .map_or(CellValue::Null, |ts| CellValue::Timestamp(SqlTimestamp::from(ts))))
}

// get_text asks for the length with an empty buffer first and grows `scratch`
// to fit before fetching the bytes.
fn read_text(
    row: &mut CursorRow<'_>,
    column_number: u16,
    scratch: &mut Vec<u8>,
) -> Result<CellValue> {
    let has_value = row
        .get_text(column_number, scratch)
        .map_err(OdbcError::from)?;

    if has_value {
        Ok(CellValue::Text(scratch.clone()))
    } else {
        Ok(CellValue::Null)
    }
}
