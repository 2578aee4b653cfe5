//! Builders shared by the integration tests.
#![allow(dead_code)]

use sqlshim::ast::{Command, Expression, Select};
use sqlshim::{DataType, DialectKind, Translator, TranslatorConfig};

pub fn translator(kind: DialectKind) -> Translator {
    Translator::for_dialect(kind).expect("translator")
}

pub fn translator_with(kind: DialectKind, config: TranslatorConfig) -> Translator {
    Translator::new(kind, &config).expect("translator")
}

pub fn sql(translator: &Translator, command: impl Into<Command>) -> String {
    translator.translate(&command.into()).expect("translate").sql
}

pub fn col(group: &str, name: &str, ty: DataType) -> Expression {
    Expression::column(group, name, ty)
}

pub fn string_col(group: &str, name: &str) -> Expression {
    col(group, name, DataType::String)
}

pub fn int_col(group: &str, name: &str) -> Expression {
    col(group, name, DataType::Integer)
}

pub fn func(name: &str, args: Vec<Expression>, ty: DataType) -> Expression {
    Expression::function(name, args, ty)
}

pub fn convert(source: Expression, target: &str) -> Expression {
    let ty = target.parse().expect("type name");
    func("convert", vec![source, Expression::string(target)], ty)
}

/// `SELECT expr` with no FROM clause.
pub fn select_expr(expr: Expression) -> Select {
    Select::new([expr])
}

/// `SELECT t.<columns> FROM t`.
pub fn select_from_t(columns: &[&str]) -> Select {
    Select::new(columns.iter().map(|c| int_col("t", c))).from_table("t")
}
