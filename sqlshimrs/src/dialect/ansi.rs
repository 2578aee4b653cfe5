//! Standard SQL dialect (SQL:2003 / SQL:2008).
//!
//! Always compiled. The version is the standard's year: 2008 and later page
//! with `OFFSET .. FETCH`, earlier ones through `ROW_NUMBER()`.

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::ast::{Expression, FragmentPart, Function};
use crate::capabilities::{Capabilities, PagingStrategy, PseudoColumn, Version};
use crate::conversion::{narrowing_sources, ConversionMatrix, CHARACTER};
use crate::error::Result;
use crate::modifiers::{
    check_arity, AliasModifier, CoalescingConcatModifier, ConcatStyle, FunctionModifierRegistry,
    Log10Modifier, StrictConcatModifier,
};
use crate::types::DataType;

use super::{Dialect, DialectKind};

static NATIVE_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abs", "ceiling", "floor", "round", "mod", "power", "sqrt", "exp", "ln", "log",
        "lower", "upper", "trim", "substring", "char_length", "character_length",
        "octet_length", "position", "coalesce", "nullif", "current_date", "current_time",
        "current_timestamp", "sin", "cos", "tan",
    ]
    .into_iter()
    .collect()
});

static AGGREGATE_FUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "count", "sum", "avg", "min", "max", "every", "any", "some", "stddev_pop",
        "stddev_samp", "var_pop", "var_samp",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy)]
pub struct AnsiDialect {
    version: Version,
}

impl AnsiDialect {
    pub fn new(version: Version) -> Self {
        Self { version }
    }
}

fn position(function: &Function) -> Result<Expression> {
    check_arity(function, 2..=2)?;
    Ok(Expression::fragment(
        vec![
            FragmentPart::sql("position("),
            FragmentPart::Expr(function.args[0].clone()),
            FragmentPart::sql(" IN "),
            FragmentPart::Expr(function.args[1].clone()),
            FragmentPart::sql(")"),
        ],
        function.ty,
    ))
}

impl Dialect for AnsiDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Ansi
    }

    fn version(&self) -> Version {
        self.version
    }

    fn capabilities(&self) -> Capabilities {
        let paging = if self.version >= Version::new(2008, 0, 0) {
            PagingStrategy::OffsetFetch
        } else {
            PagingStrategy::Emulated(PseudoColumn::RowNumber)
        };
        Capabilities {
            paging,
            native_functions: NATIVE_FUNCTIONS.iter().map(|f| f.to_string()).collect(),
            aggregate_functions: AGGREGATE_FUNCTIONS.iter().map(|a| a.to_string()).collect(),
            ..Capabilities::default()
        }
    }

    fn register_modifiers(&self, registry: &mut FunctionModifierRegistry) {
        let guard_nulls = !self.capabilities().concat_propagates_null;
        registry.register(
            "concat",
            StrictConcatModifier::new(ConcatStyle::Operator("||"), guard_nulls),
        );
        registry.register(
            "concat2",
            CoalescingConcatModifier::new(ConcatStyle::Operator("||"), Some("coalesce")),
        );
        registry.register("locate", position);
        registry.register("lcase", AliasModifier::new("lower"));
        registry.register("ucase", AliasModifier::new("upper"));
        registry.register("ifnull", AliasModifier::new("coalesce"));
        registry.register("nvl", AliasModifier::new("coalesce"));
        registry.register("ceil", AliasModifier::new("ceiling"));
        registry.register("log10", Log10Modifier);
    }

    fn register_conversions(&self, matrix: &mut ConversionMatrix) {
        use DataType::*;

        let sql_types = [
            (Byte, "SMALLINT"),
            (Short, "SMALLINT"),
            (Integer, "INTEGER"),
            (Long, "BIGINT"),
            (BigInteger, "NUMERIC(38)"),
            (Float, "REAL"),
            (Double, "DOUBLE PRECISION"),
            (BigDecimal, "DECIMAL(38,19)"),
        ];
        for (target, sql_type) in sql_types {
            let cast = format!("CAST({{}} AS {sql_type})");
            matrix.add_from(&CHARACTER, target, &cast);
            matrix.add_from(&narrowing_sources(target), target, &cast);
            matrix.add(Boolean, target, "CASE WHEN {} THEN 1 WHEN NOT {} THEN 0 END");
        }

        matrix.add_from(&DataType::NUMERIC, String, "CAST({} AS VARCHAR(4000))");
        matrix.add_from(&[Date, Time, Timestamp], String, "CAST({} AS VARCHAR(4000))");
        matrix.add(
            Boolean,
            String,
            "CASE WHEN {} THEN 'true' WHEN NOT {} THEN 'false' END",
        );
        matrix.add(String, Char, "CAST({} AS CHAR(1))");

        matrix.add_from(&CHARACTER, Boolean, "CAST({} AS BOOLEAN)");
        matrix.add_from(
            &DataType::NUMERIC,
            Boolean,
            "CASE WHEN {} = 0 THEN FALSE WHEN {} IS NOT NULL THEN TRUE END",
        );

        matrix.add_from(&CHARACTER, Date, "CAST({} AS DATE)");
        matrix.add_from(&CHARACTER, Time, "CAST({} AS TIME)");
        matrix.add_from(&CHARACTER, Timestamp, "CAST({} AS TIMESTAMP)");
        matrix.add(Date, Timestamp, "CAST({} AS TIMESTAMP)");
        matrix.add(Time, Timestamp, "(DATE '1970-01-01' + {})");
        matrix.add(Timestamp, Date, "CAST({} AS DATE)");
        matrix.add(Timestamp, Time, "CAST({} AS TIME)");
    }

    fn render_boolean(&self, value: bool) -> String {
        if value { "TRUE" } else { "FALSE" }.to_string()
    }
}
