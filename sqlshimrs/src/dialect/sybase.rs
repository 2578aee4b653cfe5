//! Sybase ASE dialect.
//!
//! `TOP n` arrives with 15.0.2 and `BIGDATETIME` with 15.5. Older servers have
//! no row limit at all.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;

use crate::ast::{format_date, format_time, format_timestamp, Expression, Function, SetOperator};
use crate::capabilities::{Capabilities, PagingStrategy, Version};
use crate::conversion::{narrowing_sources, ConversionMatrix, CHARACTER};
use crate::error::Result;
use crate::modifiers::{
    check_arity, keyword, AliasModifier, CoalescingConcatModifier, ConcatStyle,
    DatePartModifier, FunctionModifierRegistry, InfixModifier, LocateModifier, LocateStyle,
    StrictConcatModifier,
};
use crate::types::DataType;

use super::{Dialect, DialectKind};

pub(crate) const TOP_VERSION: Version = Version::new(15, 0, 2);
pub(crate) const BIGDATETIME_VERSION: Version = Version::new(15, 5, 0);
pub(crate) const BIGINT_VERSION: Version = Version::new(15, 0, 0);

static NATIVE_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abs", "acos", "ascii", "asin", "atan", "atn2", "ceiling", "char", "char_length",
        "charindex", "coalesce", "cos", "cot", "datalength", "dateadd", "datediff",
        "datename", "datepart", "exp", "floor", "getdate", "isnull", "left", "log", "log10",
        "lower", "ltrim", "nullif", "power", "replicate", "reverse", "right", "round",
        "rtrim", "sign", "sin", "space", "sqrt", "str_replace", "substring", "tan", "upper",
    ]
    .into_iter()
    .collect()
});

static AGGREGATE_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "count", "count_big", "sum", "avg", "min", "max", "stddev", "stddev_pop",
        "stddev_samp", "variance", "var_pop", "var_samp",
    ]
    .into_iter()
    .collect()
});

const DATE_PARTS: [(&str, &str); 9] = [
    ("dayofmonth", "dd"),
    ("dayofweek", "dw"),
    ("dayofyear", "dy"),
    ("quarter", "qq"),
    ("week", "wk"),
    ("hour", "hh"),
    ("minute", "mi"),
    ("second", "ss"),
    ("year", "yy"),
];

#[derive(Debug, Clone, Copy)]
pub struct SybaseDialect {
    version: Version,
}

impl SybaseDialect {
    pub fn new(version: Version) -> Self {
        Self { version }
    }

    fn has_bigdatetime(&self) -> bool {
        self.version >= BIGDATETIME_VERSION
    }

    fn datetime_type(&self) -> &'static str {
        if self.has_bigdatetime() {
            "bigdatetime"
        } else {
            "datetime"
        }
    }
}

/// `substring(x, start)` as `substring(x, start, char_length(x))`.
fn substring(function: &Function) -> Result<Expression> {
    check_arity(function, 2..=3)?;
    if function.args.len() == 3 {
        return Ok(Expression::Function(function.clone()));
    }
    let length = Expression::function(
        "char_length",
        vec![function.args[0].clone()],
        DataType::Integer,
    );
    let mut args = function.args.clone();
    args.push(length);
    Ok(Expression::function(&function.name, args, function.ty))
}

fn getdate(function: &Function) -> Result<Expression> {
    check_arity(function, 0..=0)?;
    Ok(keyword("getdate()", function.ty))
}

fn current_bigdatetime(function: &Function) -> Result<Expression> {
    check_arity(function, 0..=0)?;
    Ok(keyword("current_bigdatetime()", function.ty))
}

fn current_date(function: &Function) -> Result<Expression> {
    check_arity(function, 0..=0)?;
    Ok(keyword("current_date()", function.ty))
}

fn current_time(function: &Function) -> Result<Expression> {
    check_arity(function, 0..=0)?;
    Ok(keyword("current_time()", function.ty))
}

impl Dialect for SybaseDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Sybase
    }

    fn version(&self) -> Version {
        self.version
    }

    fn capabilities(&self) -> Capabilities {
        let paging = if self.version >= TOP_VERSION {
            PagingStrategy::Top
        } else {
            PagingStrategy::Unsupported
        };
        Capabilities {
            paging,
            supports_except: false,
            supports_intersect: false,
            supports_set_all_variants: false,
            supports_null_ordering: false,
            supports_boolean_expressions: false,
            concat_propagates_null: false,
            max_in_criteria_size: Some(250),
            native_functions: NATIVE_FUNCTIONS.iter().map(|f| f.to_string()).collect(),
            aggregate_functions: AGGREGATE_FUNCTIONS.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn register_modifiers(&self, registry: &mut FunctionModifierRegistry) {
        for (name, target) in [
            ("lcase", "lower"),
            ("ucase", "upper"),
            ("ifnull", "isnull"),
            ("nvl", "isnull"),
            ("length", "char_length"),
            ("atan2", "atn2"),
            ("chr", "char"),
            ("replace", "str_replace"),
        ] {
            registry.register(name, AliasModifier::new(target));
        }
        registry.register("mod", InfixModifier::new("%"));
        for (name, part) in DATE_PARTS {
            registry.register(name, DatePartModifier::new("datepart", part));
        }
        registry.register("month", DatePartModifier::new("datepart", "mm"));
        registry.register("monthname", DatePartModifier::new("datename", "mm"));
        registry.register("dayname", DatePartModifier::new("datename", "dw"));
        registry.register(
            "locate",
            LocateModifier::new("charindex", LocateStyle::SubstringFirst),
        );
        registry.register("substring", substring);
        registry.register("now", getdate);
        registry.register("curdate", current_date);
        registry.register("curtime", current_time);

        let guard_nulls = !self.capabilities().concat_propagates_null;
        let strict = StrictConcatModifier::new(ConcatStyle::Operator("+"), guard_nulls);
        registry.register("concat", strict.clone());
        registry.register("||", strict);
        registry.register(
            "concat2",
            CoalescingConcatModifier::new(ConcatStyle::Operator("+"), None),
        );

        if self.has_bigdatetime() {
            registry.register("now", current_bigdatetime);
        }
    }

    fn register_conversions(&self, matrix: &mut ConversionMatrix) {
        use DataType::*;

        let long_type = if self.version >= BIGINT_VERSION {
            "bigint"
        } else {
            "numeric(19,0)"
        };
        let numeric_types = [
            (Byte, "tinyint"),
            (Short, "smallint"),
            (Integer, "int"),
            (Long, long_type),
            (BigInteger, "numeric(38,0)"),
            (Float, "real"),
            (Double, "double precision"),
            (BigDecimal, "numeric(38,19)"),
        ];
        for (target, sql_type) in numeric_types {
            let convert = format!("convert({sql_type}, {{}})");
            matrix.add_from(&CHARACTER, target, &convert);
            matrix.add_from(&narrowing_sources(target), target, &convert);
            matrix.add(Boolean, target, &convert);
        }

        matrix.add_from(&DataType::NUMERIC, String, "convert(varchar(40), {})");
        matrix.add(
            Boolean,
            String,
            "CASE WHEN {} = 0 THEN 'false' WHEN {} IS NOT NULL THEN 'true' END",
        );
        matrix.add(Date, String, "convert(varchar(10), {}, 23)");
        matrix.add(Time, String, "convert(varchar(8), {}, 108)");
        matrix.add(Timestamp, String, "convert(varchar(26), {}, 140)");
        matrix.add(String, Char, "convert(char(1), {})");

        matrix.add_from(
            &CHARACTER,
            Boolean,
            "CASE WHEN {} IN ('false', '0') THEN 0 WHEN {} IS NOT NULL THEN 1 END",
        );
        matrix.add_from(
            &DataType::NUMERIC,
            Boolean,
            "CASE WHEN {} = 0 THEN 0 WHEN {} IS NOT NULL THEN 1 END",
        );

        let datetime = self.datetime_type();
        matrix.add_from(&CHARACTER, Date, "convert(date, {}, 23)");
        matrix.add_from(&CHARACTER, Time, "convert(time, {}, 108)");
        matrix.add_from(
            &CHARACTER,
            Timestamp,
            &format!("convert({datetime}, {{}}, 140)"),
        );
        matrix.add(Date, Timestamp, &format!("convert({datetime}, {{}})"));
        matrix.add(
            Time,
            Timestamp,
            &format!("convert({datetime}, '1970-01-01 ' + convert(varchar(8), {{}}, 108))"),
        );
        matrix.add(Timestamp, Date, "convert(date, {})");
        matrix.add(Timestamp, Time, "convert(time, {})");
    }

    fn set_operator_keyword(&self, op: SetOperator, all: bool) -> Option<&'static str> {
        match (op, all) {
            (SetOperator::Union, false) => Some("UNION"),
            (SetOperator::Union, true) => Some("UNION ALL"),
            _ => None,
        }
    }

    fn render_batch(&self, statements: &[String]) -> String {
        statements.join("\n")
    }

    fn render_date(&self, date: &NaiveDate) -> String {
        format!("CAST('{}' AS DATE)", format_date(date))
    }

    fn render_time(&self, time: &NaiveTime) -> String {
        format!("CAST('1970-01-01 {}' AS DATETIME)", format_time(time))
    }

    fn render_timestamp(&self, ts: &NaiveDateTime) -> String {
        let ty = if self.has_bigdatetime() {
            "BIGDATETIME"
        } else {
            "DATETIME"
        };
        format!("CAST('{}' AS {ty})", format_timestamp(ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Value;

    #[test]
    fn top_requires_15_0_2() {
        let old = SybaseDialect::new(Version::new(12, 5, 0)).capabilities();
        assert_eq!(old.paging, PagingStrategy::Unsupported);
        let current = SybaseDialect::new(TOP_VERSION).capabilities();
        assert_eq!(current.paging, PagingStrategy::Top);
        assert!(!current.supports_except);
        assert_eq!(current.max_in_criteria_size, Some(250));
    }

    #[test]
    fn timestamps_widen_to_bigdatetime_on_15_5() {
        let ts = NaiveDate::from_ymd_opt(2002, 12, 31)
            .unwrap()
            .and_hms_opt(13, 59, 59)
            .unwrap();
        assert_eq!(
            SybaseDialect::new(TOP_VERSION).render_value(&Value::Timestamp(ts)),
            "CAST('2002-12-31 13:59:59.0' AS DATETIME)"
        );
        assert_eq!(
            SybaseDialect::new(BIGDATETIME_VERSION).render_value(&Value::Timestamp(ts)),
            "CAST('2002-12-31 13:59:59.0' AS BIGDATETIME)"
        );
        assert_eq!(
            SybaseDialect::new(TOP_VERSION).render_value(&Value::Time(ts.time())),
            "CAST('1970-01-01 13:59:59' AS DATETIME)"
        );
    }

    #[test]
    fn now_is_overridden_for_bigdatetime_servers() {
        let now = Function::new("now", vec![], DataType::Timestamp);
        let mut registry = FunctionModifierRegistry::new();
        SybaseDialect::new(BIGDATETIME_VERSION).register_modifiers(&mut registry);
        let rewritten = registry.lookup("now").unwrap().modify(&now).unwrap();
        assert_eq!(rewritten.to_string(), "current_bigdatetime()");

        let mut registry = FunctionModifierRegistry::new();
        SybaseDialect::new(TOP_VERSION).register_modifiers(&mut registry);
        let rewritten = registry.lookup("now").unwrap().modify(&now).unwrap();
        assert_eq!(rewritten.to_string(), "getdate()");
    }

    #[test]
    fn two_argument_substring_gains_a_length() {
        let f = Function::new(
            "substring",
            vec![
                Expression::column("t", "s", DataType::String),
                Expression::integer(2),
            ],
            DataType::String,
        );
        assert_eq!(
            substring(&f).unwrap().to_string(),
            "substring(t.s, 2, char_length(t.s))"
        );
    }

    #[test]
    fn long_conversion_depends_on_version() {
        let mut matrix = ConversionMatrix::new();
        SybaseDialect::new(Version::new(12, 5, 0)).register_conversions(&mut matrix);
        assert_eq!(
            matrix
                .lookup(DataType::String, DataType::Long)
                .unwrap()
                .render("x"),
            "convert(numeric(19,0), x)"
        );
        let mut matrix = ConversionMatrix::new();
        SybaseDialect::new(TOP_VERSION).register_conversions(&mut matrix);
        assert_eq!(
            matrix
                .lookup(DataType::String, DataType::Long)
                .unwrap()
                .render("x"),
            "convert(bigint, x)"
        );
    }
}
