use crate::error::{OdbcError, Result};
use crate::protocol::{CellValue, ColumnMetadata, FieldBuffers};

/// Produces the rows of one executed statement, one fetch at a time.
pub trait RowSource {
    fn columns(&self) -> &[ColumnMetadata];

    /// Fetches the next row, reading every field through `buffers`.
    /// `Ok(None)` once the result set is exhausted.
    fn fetch_row(&mut self, buffers: &mut FieldBuffers) -> Result<Option<Vec<CellValue>>>;

    /// SQLRowCount of the statement. `Ok(None)` when the driver has no count.
    fn row_count(&mut self) -> Result<Option<usize>>;
}

/// Handle on one executed statement. It borrows the connection it was run
/// on and keeps the statement (and its open cursor, if any) until dropped.
pub struct QueryResult<'c> {
    source: Box<dyn RowSource + 'c>,
    current: Option<Vec<CellValue>>,
    exhausted: bool,
}

impl<'c> QueryResult<'c> {
    pub fn new(source: impl RowSource + 'c) -> Self {
        Self {
            source: Box::new(source),
            current: None,
            exhausted: false,
        }
    }

    pub fn column_count(&self) -> usize {
        self.source.columns().len()
    }

    pub fn column_name(&self, field: usize) -> Option<&str> {
        self.source
            .columns()
            .get(field)
            .map(|column| column.name.as_str())
    }

    /// Moves the cursor one row forward. `Ok(false)` once the rows are
    /// exhausted; the source is not fetched from again after that.
    pub fn advance(&mut self, buffers: &mut FieldBuffers) -> Result<bool> {
        self.current = None;
        if self.exhausted {
            return Ok(false);
        }
        match self.source.fetch_row(buffers)? {
            Some(row) => {
                self.current = Some(row);
                Ok(true)
            }
            None => {
                self.exhausted = true;
                Ok(false)
            }
        }
    }

    pub fn cell(&self, field: usize) -> Result<&CellValue> {
        let columns = self.column_count();
        if field >= columns {
            return Err(OdbcError::FieldOutOfRange { field, columns });
        }
        let row = self.current.as_ref().ok_or(OdbcError::NoCurrentRow)?;
        row.get(field).ok_or(OdbcError::FieldOutOfRange {
            field,
            columns: row.len(),
        })
    }

    pub fn row_count(&mut self) -> Result<Option<usize>> {
        self.source.row_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::OdbcType;
    use crate::test_helpers::{diagnostics, ScriptedRows};

    fn two_rows() -> ScriptedRows {
        ScriptedRows::new(&[("id", OdbcType::Integer)])
            .row(vec![CellValue::Integer(1)])
            .row(vec![CellValue::Integer(2)])
    }

    #[test]
    fn test_advance_walks_rows_then_exhausts() {
        let mut buffers = FieldBuffers::new();
        let mut result = QueryResult::new(two_rows());

        assert_eq!(result.advance(&mut buffers), Ok(true));
        assert_eq!(result.cell(0), Ok(&CellValue::Integer(1)));
        assert_eq!(result.advance(&mut buffers), Ok(true));
        assert_eq!(result.cell(0), Ok(&CellValue::Integer(2)));
        assert_eq!(result.advance(&mut buffers), Ok(false));
        assert_eq!(result.advance(&mut buffers), Ok(false));
        assert_eq!(result.cell(0), Err(OdbcError::NoCurrentRow));
    }

    #[test]
    fn test_rows_are_fetched_one_at_a_time() {
        let mut buffers = FieldBuffers::new();
        let rows = two_rows();
        let fetches = rows.fetch_counter();
        let mut result = QueryResult::new(rows);
        assert_eq!(fetches.get(), 0);

        result.advance(&mut buffers).unwrap();
        assert_eq!(fetches.get(), 1);
        result.advance(&mut buffers).unwrap();
        assert_eq!(fetches.get(), 2);
    }

    #[test]
    fn test_no_fetch_after_exhaustion() {
        let mut buffers = FieldBuffers::new();
        let rows = ScriptedRows::new(&[("id", OdbcType::Integer)]);
        let fetches = rows.fetch_counter();
        let mut result = QueryResult::new(rows);

        assert_eq!(result.advance(&mut buffers), Ok(false));
        assert_eq!(result.advance(&mut buffers), Ok(false));
        assert_eq!(fetches.get(), 1);
    }

    #[test]
    fn test_fetch_error_after_rows() {
        let mut buffers = FieldBuffers::new();
        let err = diagnostics("SQLFetch", b"HY000", 0, "broken");
        let mut result = QueryResult::new(two_rows().fail_with(err.clone()));

        assert_eq!(result.advance(&mut buffers), Ok(true));
        assert_eq!(result.advance(&mut buffers), Ok(true));
        assert_eq!(result.advance(&mut buffers), Err(err));
        assert_eq!(result.cell(0), Err(OdbcError::NoCurrentRow));
    }

    #[test]
    fn test_cell_before_first_row() {
        let result = QueryResult::new(two_rows());
        assert_eq!(result.cell(0), Err(OdbcError::NoCurrentRow));
    }

    #[test]
    fn test_cell_out_of_range_checked_first() {
        let result = QueryResult::new(two_rows());
        assert_eq!(
            result.cell(5),
            Err(OdbcError::FieldOutOfRange {
                field: 5,
                columns: 1
            })
        );
    }

    #[test]
    fn test_row_count_asked_from_source() {
        let mut result = QueryResult::new(ScriptedRows::without_result_set(Ok(Some(3))));
        assert_eq!(result.column_count(), 0);
        assert_eq!(result.row_count(), Ok(Some(3)));
    }

    #[test]
    fn test_column_name() {
        let result = QueryResult::new(two_rows());
        assert_eq!(result.column_name(0), Some("id"));
        assert_eq!(result.column_name(1), None);
    }
}
