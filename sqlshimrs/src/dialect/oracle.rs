//! Oracle dialect.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;

use crate::ast::{format_date, format_time, format_timestamp, Expression, Function, SetOperator};
use crate::capabilities::{Capabilities, PagingStrategy, PseudoColumn, Version};
use crate::conversion::{narrowing_sources, ConversionMatrix, CHARACTER};
use crate::error::Result;
use crate::modifiers::{
    check_arity, inline_integer, inline_string, keyword, AliasModifier,
    CoalescingConcatModifier, ConcatStyle, DateFormatModifier, ExtractModifier,
    FunctionModifierRegistry, LocateModifier, LocateStyle, Log10Modifier, StrictConcatModifier,
};
use crate::types::DataType;

use super::{Dialect, DialectKind};

static NATIVE_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abs", "acos", "add_months", "ascii", "asin", "atan", "atan2", "ceil", "chr",
        "coalesce", "cos", "decode", "exp", "floor", "initcap", "instr", "last_day", "length",
        "ln", "log", "lower", "lpad", "ltrim", "mod", "months_between", "nullif", "nvl",
        "power", "replace", "round", "rpad", "rtrim", "sign", "sin", "sqrt", "substr", "tan",
        "to_char", "to_date", "to_number", "to_timestamp", "translate", "trim", "trunc",
        "upper",
    ]
    .into_iter()
    .collect()
});

static AGGREGATE_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "count", "sum", "avg", "min", "max", "median", "stddev", "stddev_pop", "stddev_samp",
        "variance", "var_pop", "var_samp",
    ]
    .into_iter()
    .collect()
});

const DATE_FORMATS: [(&str, &str); 8] = [
    ("dayofmonth", "DD"),
    ("dayofweek", "D"),
    ("dayofyear", "DDD"),
    ("quarter", "Q"),
    ("week", "WW"),
    ("hour", "HH24"),
    ("minute", "MI"),
    ("second", "SS"),
];

#[derive(Debug, Clone, Copy)]
pub struct OracleDialect {
    version: Version,
}

impl OracleDialect {
    pub fn new(version: Version) -> Self {
        Self { version }
    }
}

fn substr(args: Vec<Expression>, function: &Function) -> Expression {
    Expression::function("substr", args, function.ty)
}

/// `left(x, n)` as `substr(x, 1, n)`.
fn left(function: &Function) -> Result<Expression> {
    check_arity(function, 2..=2)?;
    let args = vec![
        function.args[0].clone(),
        inline_integer(1),
        function.args[1].clone(),
    ];
    Ok(substr(args, function))
}

/// `right(x, n)` as `substr(x, (-1 * n))`.
fn right(function: &Function) -> Result<Expression> {
    check_arity(function, 2..=2)?;
    let from_end = Expression::function(
        "*",
        vec![inline_integer(-1), function.args[1].clone()],
        DataType::Integer,
    );
    Ok(substr(vec![function.args[0].clone(), from_end], function))
}

fn cot(function: &Function) -> Result<Expression> {
    check_arity(function, 1..=1)?;
    let tan = Expression::function("tan", function.args.clone(), function.ty);
    Ok(Expression::function(
        "/",
        vec![inline_integer(1), tan],
        function.ty,
    ))
}

fn to_char_name(function: &Function, mask: &str) -> Result<Expression> {
    check_arity(function, 1..=1)?;
    let to_char = Expression::function(
        "to_char",
        vec![function.args[0].clone(), inline_string(mask)],
        DataType::String,
    );
    Ok(Expression::function("rtrim", vec![to_char], function.ty))
}

fn monthname(function: &Function) -> Result<Expression> {
    to_char_name(function, "Month")
}

fn dayname(function: &Function) -> Result<Expression> {
    to_char_name(function, "Day")
}

fn now(function: &Function) -> Result<Expression> {
    check_arity(function, 0..=0)?;
    Ok(keyword("sysdate", function.ty))
}

fn curdate(function: &Function) -> Result<Expression> {
    check_arity(function, 0..=0)?;
    Ok(Expression::function(
        "trunc",
        vec![keyword("sysdate", DataType::Timestamp)],
        function.ty,
    ))
}

impl Dialect for OracleDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Oracle
    }

    fn version(&self) -> Version {
        self.version
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            paging: PagingStrategy::Emulated(PseudoColumn::Rownum),
            supports_except: true,
            supports_intersect: true,
            supports_set_all_variants: false,
            supports_null_ordering: true,
            supports_boolean_expressions: false,
            concat_propagates_null: false,
            max_in_criteria_size: Some(1000),
            native_functions: NATIVE_FUNCTIONS.iter().map(|f| f.to_string()).collect(),
            aggregate_functions: AGGREGATE_FUNCTIONS.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn register_modifiers(&self, registry: &mut FunctionModifierRegistry) {
        registry.register("locate", LocateModifier::new("instr", LocateStyle::StringFirst));
        for (name, mask) in DATE_FORMATS {
            registry.register(name, DateFormatModifier::new(mask));
        }
        registry.register("year", ExtractModifier::new("YEAR"));
        registry.register("month", ExtractModifier::new("MONTH"));
        registry.register("log10", Log10Modifier);
        for (name, target) in [
            ("substring", "substr"),
            ("lcase", "lower"),
            ("ucase", "upper"),
            ("ifnull", "nvl"),
            ("log", "ln"),
            ("ceiling", "ceil"),
            ("char", "chr"),
        ] {
            registry.register(name, AliasModifier::new(target));
        }
        registry.register("left", left);
        registry.register("right", right);
        registry.register("cot", cot);
        registry.register("monthname", monthname);
        registry.register("dayname", dayname);
        registry.register("now", now);
        registry.register("curdate", curdate);

        let guard_nulls = !self.capabilities().concat_propagates_null;
        let strict = StrictConcatModifier::new(ConcatStyle::Function("concat"), guard_nulls);
        registry.register("concat", strict.clone());
        registry.register("||", strict);
        registry.register(
            "concat2",
            CoalescingConcatModifier::new(ConcatStyle::Function("concat"), None),
        );
    }

    fn register_conversions(&self, matrix: &mut ConversionMatrix) {
        use DataType::*;

        for target in [Byte, Short, Integer, Long, BigInteger, Float, Double, BigDecimal] {
            matrix.add_from(&CHARACTER, target, "to_number({})");
            matrix.add(Boolean, target, "{}");
        }
        for target in [Byte, Short, Integer, Long, BigInteger] {
            matrix.add_from(&narrowing_sources(target), target, "trunc({})");
        }
        matrix.add_from(&narrowing_sources(Float), Float, "cast({} AS binary_float)");
        matrix.add_from(&narrowing_sources(Double), Double, "cast({} AS binary_double)");

        matrix.add_from(&DataType::NUMERIC, String, "to_char({})");
        matrix.add(Boolean, String, "decode({}, 0, 'false', 1, 'true')");
        matrix.add(Date, String, "to_char({}, 'YYYY-MM-DD')");
        matrix.add(Time, String, "to_char({}, 'HH24:MI:SS')");
        matrix.add(Timestamp, String, "to_char({}, 'YYYY-MM-DD HH24:MI:SS.FF')");
        matrix.add(String, Char, "cast({} AS char(1))");

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

        matrix.add_from(&CHARACTER, Date, "to_date({}, 'YYYY-MM-DD')");
        matrix.add_from(
            &CHARACTER,
            Time,
            "to_date('1970-01-01 ' || {}, 'YYYY-MM-DD HH24:MI:SS')",
        );
        matrix.add_from(
            &CHARACTER,
            Timestamp,
            "to_timestamp({}, 'YYYY-MM-DD HH24:MI:SS.FF')",
        );
        matrix.add(Date, Timestamp, "cast({} AS timestamp)");
        matrix.add(
            Time,
            Timestamp,
            "to_timestamp('1970-01-01 ' || to_char({}, 'HH24:MI:SS'), 'YYYY-MM-DD HH24:MI:SS')",
        );
        matrix.add(Timestamp, Date, "trunc(cast({} AS date))");
        matrix.add(
            Timestamp,
            Time,
            "CASE WHEN {} IS NULL THEN NULL ELSE to_date('1970-01-01 ' || to_char({}, 'HH24:MI:SS'), 'YYYY-MM-DD HH24:MI:SS') END",
        );
    }

    fn set_operator_keyword(&self, op: SetOperator, all: bool) -> Option<&'static str> {
        match (op, all) {
            (SetOperator::Union, false) => Some("UNION"),
            (SetOperator::Union, true) => Some("UNION ALL"),
            (SetOperator::Except, false) => Some("MINUS"),
            (SetOperator::Intersect, false) => Some("INTERSECT"),
            (_, true) => None,
        }
    }

    fn dummy_table(&self) -> Option<&'static str> {
        Some("DUAL")
    }

    fn render_batch(&self, statements: &[String]) -> String {
        let mut sql = String::from("BEGIN ");
        for statement in statements {
            sql.push_str(statement);
            sql.push_str("; ");
        }
        sql.push_str("END;");
        sql
    }

    fn render_date(&self, date: &NaiveDate) -> String {
        format!("{{d'{}'}}", format_date(date))
    }

    /// Oracle has no time type; times are anchored at the epoch date.
    fn render_time(&self, time: &NaiveTime) -> String {
        format!("{{ts'1970-01-01 {}'}}", format_time(time))
    }

    fn render_timestamp(&self, ts: &NaiveDateTime) -> String {
        format!("{{ts'{}'}}", format_timestamp(ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Value;

    fn dialect() -> OracleDialect {
        OracleDialect::new(DialectKind::Oracle.default_version())
    }

    #[test]
    fn temporal_literals_use_escape_syntax() {
        let date = NaiveDate::from_ymd_opt(2002, 12, 31).unwrap();
        let time = NaiveTime::from_hms_opt(13, 59, 59).unwrap();
        let d = dialect();
        assert_eq!(d.render_value(&Value::Date(date)), "{d'2002-12-31'}");
        assert_eq!(
            d.render_value(&Value::Time(time)),
            "{ts'1970-01-01 13:59:59'}"
        );
        assert_eq!(
            d.render_value(&Value::Timestamp(date.and_time(time))),
            "{ts'2002-12-31 13:59:59.0'}"
        );
        assert_eq!(d.render_value(&Value::Boolean(true)), "1");
    }

    #[test]
    fn except_is_minus_and_all_variants_are_missing() {
        let d = dialect();
        assert_eq!(d.set_operator_keyword(SetOperator::Except, false), Some("MINUS"));
        assert_eq!(d.set_operator_keyword(SetOperator::Except, true), None);
        assert_eq!(d.set_operator_keyword(SetOperator::Intersect, true), None);
        assert_eq!(
            d.set_operator_keyword(SetOperator::Union, true),
            Some("UNION ALL")
        );
    }

    #[test]
    fn helper_modifiers_build_native_calls() {
        let x = Expression::column("t", "s", DataType::String);
        let n = Expression::column("t", "n", DataType::Integer);
        let f = Function::new("right", vec![x.clone(), n.clone()], DataType::String);
        assert_eq!(right(&f).unwrap().to_string(), "substr(t.s, (-1 * t.n))");
        let f = Function::new("left", vec![x.clone(), n], DataType::String);
        assert_eq!(left(&f).unwrap().to_string(), "substr(t.s, 1, t.n)");
        let f = Function::new("monthname", vec![x], DataType::String);
        assert_eq!(
            monthname(&f).unwrap().to_string(),
            "rtrim(to_char(t.s, 'Month'))"
        );
        let f = Function::new("curdate", vec![], DataType::Date);
        assert_eq!(curdate(&f).unwrap().to_string(), "trunc(sysdate)");
    }

    #[test]
    fn batches_become_anonymous_blocks() {
        let statements = vec!["DELETE FROM a".to_string(), "DELETE FROM b".to_string()];
        assert_eq!(
            dialect().render_batch(&statements),
            "BEGIN DELETE FROM a; DELETE FROM b; END;"
        );
    }
}
