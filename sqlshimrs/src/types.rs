//! The fixed type universe every expression is resolved against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SqlshimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Char,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
    Date,
    Time,
    Timestamp,
}

impl DataType {
    pub const ALL: [DataType; 14] = [
        DataType::String,
        DataType::Char,
        DataType::Boolean,
        DataType::Byte,
        DataType::Short,
        DataType::Integer,
        DataType::Long,
        DataType::BigInteger,
        DataType::Float,
        DataType::Double,
        DataType::BigDecimal,
        DataType::Date,
        DataType::Time,
        DataType::Timestamp,
    ];

    pub const NUMERIC: [DataType; 8] = [
        DataType::Byte,
        DataType::Short,
        DataType::Integer,
        DataType::Long,
        DataType::BigInteger,
        DataType::Float,
        DataType::Double,
        DataType::BigDecimal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Char => "char",
            DataType::Boolean => "boolean",
            DataType::Byte => "byte",
            DataType::Short => "short",
            DataType::Integer => "integer",
            DataType::Long => "long",
            DataType::BigInteger => "biginteger",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::BigDecimal => "bigdecimal",
            DataType::Date => "date",
            DataType::Time => "time",
            DataType::Timestamp => "timestamp",
        }
    }

    /// Position in the numeric widening order, `None` for non-numeric types.
    pub fn numeric_rank(&self) -> Option<u8> {
        match self {
            DataType::Byte => Some(0),
            DataType::Short => Some(1),
            DataType::Integer => Some(2),
            DataType::Long => Some(3),
            DataType::BigInteger => Some(4),
            DataType::Float => Some(5),
            DataType::Double => Some(6),
            DataType::BigDecimal => Some(7),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            DataType::Byte
                | DataType::Short
                | DataType::Integer
                | DataType::Long
                | DataType::BigInteger
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Date | DataType::Time | DataType::Timestamp)
    }

    pub fn is_character(&self) -> bool {
        matches!(self, DataType::String | DataType::Char)
    }

    /// Conversions the target database performs on its own, so no explicit
    /// conversion needs to be rendered.
    pub fn is_implicit_widening(from: DataType, to: DataType) -> bool {
        match (from.numeric_rank(), to.numeric_rank()) {
            (Some(f), Some(t)) => t > f,
            _ => from == DataType::Char && to == DataType::String,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = SqlshimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.trim().to_ascii_lowercase().as_str() {
            "string" | "varchar" => DataType::String,
            "char" | "character" => DataType::Char,
            "boolean" | "bit" => DataType::Boolean,
            "byte" | "tinyint" => DataType::Byte,
            "short" | "smallint" => DataType::Short,
            "integer" | "int" => DataType::Integer,
            "long" | "bigint" => DataType::Long,
            "biginteger" => DataType::BigInteger,
            "float" | "real" => DataType::Float,
            "double" => DataType::Double,
            "bigdecimal" | "decimal" => DataType::BigDecimal,
            "date" => DataType::Date,
            "time" => DataType::Time,
            "timestamp" => DataType::Timestamp,
            other => {
                return Err(SqlshimError::InvalidCommand(format!(
                    "unknown type name '{other}'"
                )))
            }
        };
        Ok(ty)
    }
}
