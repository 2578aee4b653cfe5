//! Rendering visitor: walks a command and produces dialect SQL.
//!
//! One renderer is created per translation. It reads the translator's
//! immutable tables and owns the bind values collected along the way. Text is
//! produced strictly left to right so bind values line up with placeholders.

mod criteria;
mod expression;
mod query;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::ast::{Command, Value};
use crate::dialect::Dialect;
use crate::error::{Result, SqlshimError};
use crate::translator::Translator;
use crate::types::DataType;

/// A literal lifted out of the SQL text into a positional parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindValue {
    pub value: Value,
    #[serde(rename = "type")]
    pub ty: DataType,
}

pub struct SqlRenderer<'t> {
    translator: &'t Translator,
    binds: Vec<BindValue>,
}

impl<'t> SqlRenderer<'t> {
    pub fn new(translator: &'t Translator) -> Self {
        Self {
            translator,
            binds: Vec::new(),
        }
    }

    pub fn render_command(&mut self, command: &Command) -> Result<String> {
        self.command(command)
    }

    /// Bind values in placeholder order.
    pub fn into_bind_values(self) -> Vec<BindValue> {
        self.binds
    }

    fn dialect(&self) -> &dyn Dialect {
        self.translator.dialect()
    }

    /// Marks the current bind position; pair with [`Self::repeat_binds`].
    fn bind_mark(&self) -> usize {
        self.binds.len()
    }

    /// Appends the binds captured since `mark` again, `times` more times.
    /// Used when one rendered piece of SQL is emitted several times.
    fn repeat_binds(&mut self, mark: usize, times: usize) {
        if times == 0 || mark >= self.binds.len() {
            return;
        }
        let captured: Vec<BindValue> = self.binds[mark..].to_vec();
        for _ in 0..times {
            self.binds.extend(captured.iter().cloned());
        }
    }

    /// Quotes every dot-separated part of a possibly qualified name.
    fn quote_path(&self, path: &str) -> String {
        path.split('.')
            .map(|part| self.dialect().quote_ident(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Temporal literals are given in UTC; the database expects its own zone.
    fn shift_to_database_zone(&self, value: &Value) -> Result<Value> {
        let seconds = self.translator.database_time_zone().local_minus_utc();
        if seconds == 0 {
            return Ok(value.clone());
        }
        let delta = Duration::seconds(i64::from(seconds));
        Ok(match value {
            Value::Timestamp(ts) => {
                let shifted = ts.checked_add_signed(delta).ok_or_else(|| {
                    SqlshimError::InvalidCommand(format!(
                        "timestamp {ts} is out of range in the database time zone"
                    ))
                })?;
                Value::Timestamp(shifted)
            }
            Value::Time(time) => Value::Time(time.overflowing_add_signed(delta).0),
            other => other.clone(),
        })
    }
}
