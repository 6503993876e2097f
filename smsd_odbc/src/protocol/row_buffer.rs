use crate::error::OdbcError;
use crate::protocol::types::OdbcType;
use std::fmt;

/// Timestamp as delivered by SQL_C_TYPE_TIMESTAMP, no zone attached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SqlTimestamp {
    pub year: i16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    /// Nanoseconds
    pub fraction: u32,
}

impl From<odbc_api::sys::Timestamp> for SqlTimestamp {
    fn from(ts: odbc_api::sys::Timestamp) -> Self {
        Self {
            year: ts.year,
            month: ts.month,
            day: ts.day,
            hour: ts.hour,
            minute: ts.minute,
            second: ts.second,
            fraction: ts.fraction,
        }
    }
}

impl fmt::Display for SqlTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.fraction != 0 {
            let digits = format!("{:09}", self.fraction);
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

/// One fetched field of a row.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Timestamp(SqlTimestamp),
    Text(Vec<u8>),
    /// SQLGetData failed for this field; reported when the field is read.
    Unreadable(OdbcError),
}

#[derive(Debug, Clone)]
pub struct ColumnMetadata {
    pub name: String,
    pub odbc_type: OdbcType,
}

/// Scratch text buffers indexed by field position, owned by the backend for
/// the life of its connection. A buffer is created the first time its field
/// is read and then reused (and grown) for every later row and query.
#[derive(Debug, Default)]
pub struct FieldBuffers {
    buffers: Vec<Vec<u8>>,
}

impl FieldBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&mut self, field: usize) -> &mut Vec<u8> {
        if field >= self.buffers.len() {
            self.buffers.resize_with(field + 1, Vec::new);
        }
        &mut self.buffers[field]
    }

    pub fn clear(&mut self) {
        self.buffers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_buffers_grow_on_demand() {
        let mut buffers = FieldBuffers::new();
        buffers.slot(3).extend_from_slice(b"abc");
        assert!(buffers.slot(0).is_empty());
        assert_eq!(buffers.slot(3).as_slice(), b"abc");

        buffers.clear();
        assert!(buffers.slot(3).is_empty());
    }

    #[test]
    fn test_field_buffer_is_reused_for_same_field() {
        let mut buffers = FieldBuffers::new();
        buffers.slot(1).reserve(64);
        let capacity = buffers.slot(1).capacity();
        buffers.slot(1).clear();
        assert_eq!(buffers.slot(1).capacity(), capacity);
    }

    #[test]
    fn test_timestamp_display() {
        let ts = SqlTimestamp {
            year: 2024,
            month: 3,
            day: 9,
            hour: 7,
            minute: 5,
            second: 1,
            fraction: 0,
        };
        assert_eq!(ts.to_string(), "2024-03-09 07:05:01");
    }

    #[test]
    fn test_timestamp_display_keeps_fraction() {
        let mut ts = SqlTimestamp {
            year: 2024,
            month: 5,
            day: 17,
            hour: 8,
            minute: 0,
            second: 9,
            fraction: 123_000_000,
        };
        assert_eq!(ts.to_string(), "2024-05-17 08:00:09.123");

        ts.fraction = 5;
        assert_eq!(ts.to_string(), "2024-05-17 08:00:09.000000005");
    }

    #[test]
    fn test_timestamp_from_sys() {
        let sys = odbc_api::sys::Timestamp {
            year: 2011,
            month: 12,
            day: 31,
            hour: 23,
            minute: 59,
            second: 58,
            fraction: 500,
        };
        let ts = SqlTimestamp::from(sys);
        assert_eq!(ts.year, 2011);
        assert_eq!(ts.second, 58);
        assert_eq!(ts.fraction, 500);
    }
}
