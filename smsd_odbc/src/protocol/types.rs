use odbc_api::DataType;

#[repr(u16)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OdbcType {
    Varchar = 1,
    Integer = 2,
    BigInt = 3,
    Decimal = 4,
    Date = 5,
    Timestamp = 6,
    Binary = 7,
}

/// How a column is pulled out of the driver with SQLGetData.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchKind {
    /// SQL_C_SBIGINT
    Integer,
    /// SQL_C_TYPE_TIMESTAMP
    Timestamp,
    /// SQL_C_CHAR, length asked for first
    Text,
}

impl OdbcType {
    pub fn from_data_type(data_type: &DataType) -> Self {
        match data_type {
            DataType::Integer | DataType::SmallInt | DataType::TinyInt | DataType::Bit => {
                Self::Integer
            }
            DataType::BigInt => Self::BigInt,
            DataType::Numeric { .. } | DataType::Decimal { .. } => Self::Decimal,
            DataType::Date => Self::Date,
            DataType::Timestamp { .. } => Self::Timestamp,
            DataType::Binary { .. }
            | DataType::Varbinary { .. }
            | DataType::LongVarbinary { .. } => Self::Binary,
            _ => Self::Varchar,
        }
    }

    /// Decimals and binaries go through the driver's text conversion so no
    /// precision is lost; the accessors parse the text when asked for numbers.
    pub fn fetch_kind(self) -> FetchKind {
        match self {
            Self::Integer | Self::BigInt => FetchKind::Integer,
            Self::Date | Self::Timestamp => FetchKind::Timestamp,
            Self::Varchar | Self::Decimal | Self::Binary => FetchKind::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZero;

    #[test]
    fn test_odbc_type_repr_values() {
        assert_eq!(OdbcType::Varchar as u16, 1);
        assert_eq!(OdbcType::Integer as u16, 2);
        assert_eq!(OdbcType::BigInt as u16, 3);
        assert_eq!(OdbcType::Decimal as u16, 4);
        assert_eq!(OdbcType::Date as u16, 5);
        assert_eq!(OdbcType::Timestamp as u16, 6);
        assert_eq!(OdbcType::Binary as u16, 7);
    }

    #[test]
    fn test_from_data_type_integer_variants() {
        assert_eq!(OdbcType::from_data_type(&DataType::Integer), OdbcType::Integer);
        assert_eq!(OdbcType::from_data_type(&DataType::SmallInt), OdbcType::Integer);
        assert_eq!(OdbcType::from_data_type(&DataType::TinyInt), OdbcType::Integer);
        assert_eq!(OdbcType::from_data_type(&DataType::Bit), OdbcType::Integer);
        assert_eq!(OdbcType::from_data_type(&DataType::BigInt), OdbcType::BigInt);
    }

    #[test]
    fn test_from_data_type_decimal_variants() {
        assert_eq!(
            OdbcType::from_data_type(&DataType::Numeric {
                precision: 10,
                scale: 2
            }),
            OdbcType::Decimal
        );
        assert_eq!(
            OdbcType::from_data_type(&DataType::Decimal {
                precision: 10,
                scale: 2
            }),
            OdbcType::Decimal
        );
    }

    #[test]
    fn test_from_data_type_temporal() {
        assert_eq!(OdbcType::from_data_type(&DataType::Date), OdbcType::Date);
        assert_eq!(
            OdbcType::from_data_type(&DataType::Timestamp { precision: 3 }),
            OdbcType::Timestamp
        );
    }

    #[test]
    fn test_from_data_type_binary_variants() {
        assert_eq!(
            OdbcType::from_data_type(&DataType::Binary {
                length: NonZero::new(10)
            }),
            OdbcType::Binary
        );
        assert_eq!(
            OdbcType::from_data_type(&DataType::LongVarbinary {
                length: NonZero::new(1000)
            }),
            OdbcType::Binary
        );
    }

    #[test]
    fn test_from_data_type_text_defaults_to_varchar() {
        assert_eq!(
            OdbcType::from_data_type(&DataType::Varchar {
                length: NonZero::new(100)
            }),
            OdbcType::Varchar
        );
        assert_eq!(
            OdbcType::from_data_type(&DataType::Char {
                length: NonZero::new(10)
            }),
            OdbcType::Varchar
        );
    }

    #[test]
    fn test_fetch_kind() {
        assert_eq!(OdbcType::Integer.fetch_kind(), FetchKind::Integer);
        assert_eq!(OdbcType::BigInt.fetch_kind(), FetchKind::Integer);
        assert_eq!(OdbcType::Date.fetch_kind(), FetchKind::Timestamp);
        assert_eq!(OdbcType::Timestamp.fetch_kind(), FetchKind::Timestamp);
        assert_eq!(OdbcType::Decimal.fetch_kind(), FetchKind::Text);
        assert_eq!(OdbcType::Binary.fetch_kind(), FetchKind::Text);
        assert_eq!(OdbcType::Varchar.fetch_kind(), FetchKind::Text);
    }
}
