use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::SqlshimError;
use crate::types::DataType;

/// Literal payload. Arbitrary-precision numbers keep their decimal text form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    String(String),
    Boolean(bool),
    Integer(i64),
    Decimal(Decimal),
    Float(f64),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

/// Exact numeric text, `[+-]digits[.digits][E[+-]digits]`. Checked on
/// construction and on deserialization, so it is always safe to inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Decimal(String);

impl Decimal {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_decimal_text(text: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((whole, fraction)) => digits(whole) && digits(fraction),
        None => digits(mantissa),
    };
    let exponent_ok = exponent
        .map_or(true, |exponent| digits(exponent.strip_prefix(['+', '-']).unwrap_or(exponent)));
    mantissa_ok && exponent_ok
}

impl TryFrom<String> for Decimal {
    type Error = SqlshimError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        if is_decimal_text(&text) {
            Ok(Decimal(text))
        } else {
            Err(SqlshimError::InvalidCommand(format!(
                "'{text}' is not a decimal number"
            )))
        }
    }
}

impl FromStr for Decimal {
    type Err = SqlshimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::try_from(s.to_string())
    }
}

impl From<Decimal> for String {
    fn from(decimal: Decimal) -> Self {
        decimal.0
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub value: Value,
    #[serde(rename = "type")]
    pub ty: DataType,
    /// Whether the literal may be replaced by a bind placeholder.
    #[serde(default = "bind_eligible_default")]
    pub bind_eligible: bool,
}

fn bind_eligible_default() -> bool {
    true
}

impl Literal {
    pub fn new(value: Value, ty: DataType) -> Self {
        Self {
            value,
            ty,
            bind_eligible: true,
        }
    }

    /// A literal that is always rendered inline, even with bind variables on.
    pub fn inline(value: Value, ty: DataType) -> Self {
        Self {
            value,
            ty,
            bind_eligible: false,
        }
    }

    pub fn null(ty: DataType) -> Self {
        Self::new(Value::Null, ty)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Value::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match &self.value {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

pub(crate) fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_time(time: &NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// `yyyy-mm-dd hh:mm:ss.f` with the fraction trimmed of trailing zeros but
/// never empty.
pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    let nanos = ts.nanosecond() % 1_000_000_000;
    let fraction = if nanos == 0 {
        "0".to_string()
    } else {
        let digits = format!("{nanos:09}");
        digits.trim_end_matches('0').to_string()
    };
    format!("{}.{fraction}", ts.format("%Y-%m-%d %H:%M:%S"))
}

pub(crate) fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}
