pub mod row_buffer;
pub mod types;

pub use row_buffer::{CellValue, ColumnMetadata, FieldBuffers, SqlTimestamp};
pub use types::{FetchKind, OdbcType};
