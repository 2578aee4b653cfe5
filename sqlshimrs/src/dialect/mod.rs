//! SQL dialects.
//!
//! A dialect supplies the static tables a translator is built from (capabilities,
//! function modifiers, conversion rules) plus the small syntax differences the
//! renderer asks about: literals, identifier quoting, set operator keywords.
//! Vendor dialects live in their own file behind a feature flag.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::ast::{
    format_date, format_float, format_time, format_timestamp, quote_string, SetOperator, Value,
};
use crate::capabilities::{Capabilities, Version};
use crate::conversion::ConversionMatrix;
use crate::error::{Result, SqlshimError};
use crate::modifiers::FunctionModifierRegistry;

mod ansi;
pub use ansi::AnsiDialect;

#[cfg(feature = "oracle")]
mod oracle;
#[cfg(feature = "oracle")]
pub use oracle::OracleDialect;

#[cfg(feature = "sybase")]
mod sybase;
#[cfg(feature = "sybase")]
pub use sybase::SybaseDialect;

pub trait Dialect: Send + Sync + fmt::Debug {
    fn kind(&self) -> DialectKind;

    /// Database version the dialect tables were resolved for.
    fn version(&self) -> Version;

    fn quote_ident(&self, ident: &str) -> String {
        if is_simple_identifier(ident) {
            ident.to_string()
        } else {
            format!("\"{}\"", ident.replace('"', "\"\""))
        }
    }

    fn placeholder(&self, _idx: usize) -> String {
        "?".to_string()
    }

    fn capabilities(&self) -> Capabilities;

    fn register_modifiers(&self, registry: &mut FunctionModifierRegistry);

    fn register_conversions(&self, matrix: &mut ConversionMatrix);

    /// Keyword for a set operator, `None` when the database lacks it.
    fn set_operator_keyword(&self, op: SetOperator, all: bool) -> Option<&'static str> {
        match (op, all) {
            (SetOperator::Union, false) => Some("UNION"),
            (SetOperator::Union, true) => Some("UNION ALL"),
            (SetOperator::Except, false) => Some("EXCEPT"),
            (SetOperator::Except, true) => Some("EXCEPT ALL"),
            (SetOperator::Intersect, false) => Some("INTERSECT"),
            (SetOperator::Intersect, true) => Some("INTERSECT ALL"),
        }
    }

    /// Table to select from when a query has no FROM clause.
    fn dummy_table(&self) -> Option<&'static str> {
        None
    }

    fn render_batch(&self, statements: &[String]) -> String {
        statements.join("; ")
    }

    fn render_boolean(&self, value: bool) -> String {
        if value { "1" } else { "0" }.to_string()
    }

    fn render_date(&self, date: &NaiveDate) -> String {
        format!("DATE '{}'", format_date(date))
    }

    fn render_time(&self, time: &NaiveTime) -> String {
        format!("TIME '{}'", format_time(time))
    }

    fn render_timestamp(&self, ts: &NaiveDateTime) -> String {
        format!("TIMESTAMP '{}'", format_timestamp(ts))
    }

    /// Inline SQL for a literal value already shifted to the database zone.
    fn render_value(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::String(s) => quote_string(s),
            Value::Boolean(b) => self.render_boolean(*b),
            Value::Integer(i) => i.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Float(v) => format_float(*v),
            Value::Date(d) => self.render_date(d),
            Value::Time(t) => self.render_time(t),
            Value::Timestamp(ts) => self.render_timestamp(ts),
        }
    }
}

/// Letters, digits and underscores, not starting with a digit.
pub fn is_simple_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Oracle,
    Sybase,
    Ansi,
}

impl DialectKind {
    pub fn name(&self) -> &'static str {
        match self {
            DialectKind::Oracle => "oracle",
            DialectKind::Sybase => "sybase",
            DialectKind::Ansi => "ansi",
        }
    }

    pub fn default_version(&self) -> Version {
        match self {
            DialectKind::Oracle => Version::new(11, 0, 0),
            DialectKind::Sybase => Version::new(15, 0, 2),
            DialectKind::Ansi => Version::new(2008, 0, 0),
        }
    }

    /// Builds the dialect for `version`, or for its default version.
    pub fn create(&self, version: Option<Version>) -> Result<Box<dyn Dialect>> {
        let version = version.unwrap_or_else(|| self.default_version());
        match self {
            #[cfg(feature = "oracle")]
            DialectKind::Oracle => Ok(Box::new(OracleDialect::new(version))),
            #[cfg(feature = "sybase")]
            DialectKind::Sybase => Ok(Box::new(SybaseDialect::new(version))),
            DialectKind::Ansi => Ok(Box::new(AnsiDialect::new(version))),
            #[allow(unreachable_patterns)]
            other => Err(SqlshimError::Config(format!(
                "dialect '{}' is not compiled in; enable the `{}` feature",
                other.name(),
                other.name()
            ))),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialectKind {
    type Err = SqlshimError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oracle" => Ok(DialectKind::Oracle),
            "sybase" | "ase" => Ok(DialectKind::Sybase),
            "ansi" | "sql" => Ok(DialectKind::Ansi),
            other => Err(SqlshimError::Config(format!("unknown dialect '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_identifiers_stay_bare() {
        let dialect = AnsiDialect::new(Version::new(2008, 0, 0));
        assert_eq!(dialect.quote_ident("stringnum"), "stringnum");
        assert_eq!(dialect.quote_ident("_x1"), "_x1");
        assert_eq!(dialect.quote_ident("order items"), "\"order items\"");
        assert_eq!(dialect.quote_ident("1st"), "\"1st\"");
        assert_eq!(dialect.quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn dialect_names_parse() {
        assert_eq!("Oracle".parse::<DialectKind>().unwrap(), DialectKind::Oracle);
        assert_eq!("ase".parse::<DialectKind>().unwrap(), DialectKind::Sybase);
        assert!("db2".parse::<DialectKind>().is_err());
    }

    #[test]
    fn create_uses_default_version() {
        let dialect = DialectKind::Ansi.create(None).unwrap();
        assert_eq!(dialect.kind(), DialectKind::Ansi);
        assert_eq!(dialect.version(), Version::new(2008, 0, 0));
    }
}
