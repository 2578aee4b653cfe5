//! What a target database can do natively, resolved once per translator.
//!
//! Dialects fill a [`Capabilities`] for a parsed [`Version`]; the renderer only
//! ever reads it.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ast::SetOperator;
use crate::error::SqlshimError;

/// Dotted database version, compared component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = SqlshimError;

    /// Accepts `15`, `15.5`, `15.0.2` and vendor suffixes such as `11g`
    /// (anything after the leading digits of a component is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = [0u32; 3];
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SqlshimError::Config("empty database version".to_string()));
        }
        for (idx, component) in trimmed.split('.').enumerate() {
            if idx >= parts.len() {
                break;
            }
            let digits: String = component.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return Err(SqlshimError::Config(format!(
                    "invalid database version '{s}'"
                )));
            }
            parts[idx] = digits
                .parse()
                .map_err(|e| SqlshimError::Config(format!("invalid database version '{s}': {e}")))?;
        }
        Ok(Version::new(parts[0], parts[1], parts[2]))
    }
}

/// Pseudo-column used to emulate row limits with nested subqueries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PseudoColumn {
    /// Oracle `ROWNUM`.
    Rownum,
    /// `ROW_NUMBER() OVER (...)`.
    RowNumber,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagingStrategy {
    /// `SELECT TOP n`, no offset.
    Top,
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`.
    OffsetFetch,
    /// Nested subqueries over a pseudo-column.
    Emulated(PseudoColumn),
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct Capabilities {
    pub paging: PagingStrategy,
    pub supports_except: bool,
    pub supports_intersect: bool,
    /// `EXCEPT ALL` / `INTERSECT ALL`; `UNION ALL` is assumed everywhere.
    pub supports_set_all_variants: bool,
    /// Native `NULLS FIRST` / `NULLS LAST`.
    pub supports_null_ordering: bool,
    /// Predicates can be used as values in a select list.
    pub supports_boolean_expressions: bool,
    /// The native concatenation yields NULL when an operand is NULL.
    pub concat_propagates_null: bool,
    pub max_in_criteria_size: Option<usize>,
    /// Lower-cased names of functions rendered as plain calls.
    pub native_functions: HashSet<String>,
    /// Lower-cased aggregate names.
    pub aggregate_functions: HashSet<String>,
}

/// Aggregates every supported database has.
pub const STANDARD_AGGREGATES: [&str; 5] = ["count", "sum", "avg", "min", "max"];

impl Capabilities {
    pub fn supports_function(&self, name: &str) -> bool {
        self.native_functions.contains(&name.to_ascii_lowercase())
    }

    pub fn supports_aggregate(&self, name: &str) -> bool {
        self.aggregate_functions.contains(&name.to_ascii_lowercase())
    }

    /// Whether `op` (with `ALL` when `all` is set) can be expressed at all.
    pub fn supports_set_operator(&self, op: SetOperator, all: bool) -> bool {
        let supported = match op {
            SetOperator::Union => return true,
            SetOperator::Except => self.supports_except,
            SetOperator::Intersect => self.supports_intersect,
        };
        supported && (!all || self.supports_set_all_variants)
    }

    pub fn supports_row_limit(&self) -> bool {
        !matches!(self.paging, PagingStrategy::Unsupported)
    }

    pub fn supports_row_offset(&self) -> bool {
        matches!(
            self.paging,
            PagingStrategy::OffsetFetch | PagingStrategy::Emulated(_)
        )
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            paging: PagingStrategy::Unsupported,
            supports_except: true,
            supports_intersect: true,
            supports_set_all_variants: true,
            supports_null_ordering: true,
            supports_boolean_expressions: true,
            concat_propagates_null: true,
            max_in_criteria_size: None,
            native_functions: HashSet::new(),
            aggregate_functions: STANDARD_AGGREGATES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_compare_component_wise() {
        let v: Version = "15.0.2".parse().unwrap();
        assert_eq!(v, Version::new(15, 0, 2));
        assert!(v > Version::new(15, 0, 1));
        assert!(v < Version::new(15, 5, 0));
        assert_eq!("11g".parse::<Version>().unwrap(), Version::new(11, 0, 0));
        assert!("".parse::<Version>().is_err());
        assert!("abc".parse::<Version>().is_err());
    }

    #[test]
    fn paging_strategy_drives_limit_support() {
        let mut caps = Capabilities::default();
        assert!(!caps.supports_row_limit());
        caps.paging = PagingStrategy::Top;
        assert!(caps.supports_row_limit());
        assert!(!caps.supports_row_offset());
        caps.paging = PagingStrategy::Emulated(PseudoColumn::Rownum);
        assert!(caps.supports_row_offset());
    }

    #[test]
    fn set_operator_support_follows_flags() {
        let mut caps = Capabilities::default();
        assert!(caps.supports_set_operator(SetOperator::Except, true));
        caps.supports_set_all_variants = false;
        assert!(caps.supports_set_operator(SetOperator::Intersect, false));
        assert!(!caps.supports_set_operator(SetOperator::Intersect, true));
        assert!(caps.supports_set_operator(SetOperator::Union, true));
        caps.supports_except = false;
        assert!(!caps.supports_set_operator(SetOperator::Except, false));
    }

    #[test]
    fn aggregates_are_matched_case_insensitively() {
        let caps = Capabilities::default();
        assert!(caps.supports_aggregate("COUNT"));
        assert!(!caps.supports_aggregate("median"));
    }
}
