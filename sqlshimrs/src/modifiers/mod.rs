//! Function modifier registry.
//!
//! A modifier rewrites one function call into the expression the target
//! dialect understands. Dialects register their modifiers by lower-cased
//! name when a translator is built; the renderer looks them up for every
//! function it meets.

mod concat;

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::ast::{Expression, FragmentPart, Function, Literal, Value};
use crate::error::{Result, SqlshimError};
use crate::types::DataType;

pub use concat::{CoalescingConcatModifier, ConcatStyle, StrictConcatModifier};

pub trait FunctionModifier: Send + Sync {
    fn modify(&self, function: &Function) -> Result<Expression>;
}

impl<F> FunctionModifier for F
where
    F: Fn(&Function) -> Result<Expression> + Send + Sync,
{
    fn modify(&self, function: &Function) -> Result<Expression> {
        self(function)
    }
}

#[derive(Clone, Default)]
pub struct FunctionModifierRegistry {
    modifiers: HashMap<String, Arc<dyn FunctionModifier>>,
}

impl FunctionModifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `modifier` under `name`, replacing any earlier registration.
    pub fn register<M>(&mut self, name: &str, modifier: M)
    where
        M: FunctionModifier + 'static,
    {
        self.modifiers
            .insert(name.to_ascii_lowercase(), Arc::new(modifier));
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn FunctionModifier>> {
        self.modifiers.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }
}

impl fmt::Debug for FunctionModifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.modifiers.keys().collect();
        names.sort();
        f.debug_struct("FunctionModifierRegistry")
            .field("functions", &names)
            .finish()
    }
}

pub(crate) fn check_arity(function: &Function, expected: RangeInclusive<usize>) -> Result<()> {
    if expected.contains(&function.args.len()) {
        return Ok(());
    }
    let reason = if expected.start() == expected.end() {
        format!(
            "expected {} argument(s), got {}",
            expected.start(),
            function.args.len()
        )
    } else {
        format!(
            "expected {} to {} arguments, got {}",
            expected.start(),
            expected.end(),
            function.args.len()
        )
    };
    Err(SqlshimError::unsupported_function(
        &function.name,
        reason,
        Expression::Function(function.clone()),
    ))
}

pub(crate) fn inline_integer(value: i64) -> Expression {
    Expression::Literal(Literal::inline(Value::Integer(value), DataType::Integer))
}

pub(crate) fn inline_string(value: &str) -> Expression {
    Expression::Literal(Literal::inline(
        Value::String(value.to_string()),
        DataType::String,
    ))
}

/// Raw SQL that takes no arguments, such as `sysdate` or `getdate()`.
pub(crate) fn keyword(sql: &str, ty: DataType) -> Expression {
    Expression::fragment(vec![FragmentPart::sql(sql)], ty)
}

/// Renames the call, keeping arguments and result type.
#[derive(Debug, Clone)]
pub struct AliasModifier {
    target: String,
}

impl AliasModifier {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl FunctionModifier for AliasModifier {
    fn modify(&self, function: &Function) -> Result<Expression> {
        Ok(Expression::Function(function.renamed(&self.target)))
    }
}

/// Binary operator written between its operands, e.g. `mod(a, b)` as `(a % b)`.
#[derive(Debug, Clone)]
pub struct InfixModifier {
    operator: String,
}

impl InfixModifier {
    pub fn new(operator: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
        }
    }
}

impl FunctionModifier for InfixModifier {
    fn modify(&self, function: &Function) -> Result<Expression> {
        check_arity(function, 2..=2)?;
        Ok(Expression::Function(function.renamed(&self.operator)))
    }
}

/// `log10(x)` as `log(10, x)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Log10Modifier;

impl FunctionModifier for Log10Modifier {
    fn modify(&self, function: &Function) -> Result<Expression> {
        check_arity(function, 1..=1)?;
        let args = vec![inline_integer(10), function.args[0].clone()];
        Ok(Expression::function("log", args, function.ty))
    }
}

/// Where the dialect's locate function expects its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStyle {
    /// `instr(string, substring[, start])`.
    StringFirst,
    /// `charindex(substring, string)`, no start index.
    SubstringFirst,
}

/// `locate(substring, string[, start])` onto the dialect's search function.
///
/// A constant start index is folded to `start + 1`; any other start
/// expression is wrapped as `(start + 1)`. A NULL start stays NULL.
#[derive(Debug, Clone)]
pub struct LocateModifier {
    target: String,
    style: LocateStyle,
}

impl LocateModifier {
    pub fn new(target: impl Into<String>, style: LocateStyle) -> Self {
        Self {
            target: target.into(),
            style,
        }
    }
}

impl FunctionModifier for LocateModifier {
    fn modify(&self, function: &Function) -> Result<Expression> {
        let max_args = match self.style {
            LocateStyle::StringFirst => 3,
            LocateStyle::SubstringFirst => 2,
        };
        check_arity(function, 2..=max_args)?;
        let substring = function.args[0].clone();
        let string = function.args[1].clone();
        let mut args = match self.style {
            LocateStyle::StringFirst => vec![string, substring],
            LocateStyle::SubstringFirst => vec![substring, string],
        };
        if let Some(start) = function.args.get(2) {
            args.push(shift_start_index(start));
        }
        Ok(Expression::function(&self.target, args, function.ty))
    }
}

fn shift_start_index(start: &Expression) -> Expression {
    match start.as_literal() {
        Some(literal) if literal.is_null() => start.clone(),
        Some(literal) => match literal.as_integer() {
            Some(value) => inline_integer(value.saturating_add(1)),
            None => increment(start),
        },
        None => increment(start),
    }
}

fn increment(expr: &Expression) -> Expression {
    Expression::function("+", vec![expr.clone(), inline_integer(1)], DataType::Integer)
}

/// Date part through a format mask: `to_number(to_char(x, 'DD'))`.
#[derive(Debug, Clone)]
pub struct DateFormatModifier {
    format: String,
}

impl DateFormatModifier {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl FunctionModifier for DateFormatModifier {
    fn modify(&self, function: &Function) -> Result<Expression> {
        check_arity(function, 1..=1)?;
        let to_char = Expression::function(
            "to_char",
            vec![function.args[0].clone(), inline_string(&self.format)],
            DataType::String,
        );
        Ok(Expression::function("to_number", vec![to_char], function.ty))
    }
}

/// `EXTRACT(YEAR FROM x)`.
#[derive(Debug, Clone)]
pub struct ExtractModifier {
    field: String,
}

impl ExtractModifier {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl FunctionModifier for ExtractModifier {
    fn modify(&self, function: &Function) -> Result<Expression> {
        check_arity(function, 1..=1)?;
        Ok(Expression::fragment(
            vec![
                FragmentPart::sql(format!("EXTRACT({} FROM ", self.field)),
                FragmentPart::Expr(function.args[0].clone()),
                FragmentPart::sql(")"),
            ],
            function.ty,
        ))
    }
}

/// Sybase style date parts: `datepart(dd, x)`, `datename(mm, x)`.
#[derive(Debug, Clone)]
pub struct DatePartModifier {
    function: String,
    part: String,
}

impl DatePartModifier {
    pub fn new(function: impl Into<String>, part: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            part: part.into(),
        }
    }
}

impl FunctionModifier for DatePartModifier {
    fn modify(&self, function: &Function) -> Result<Expression> {
        check_arity(function, 1..=1)?;
        Ok(Expression::fragment(
            vec![
                FragmentPart::sql(format!("{}({}, ", self.function, self.part)),
                FragmentPart::Expr(function.args[0].clone()),
                FragmentPart::sql(")"),
            ],
            function.ty,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Vec<Expression>) -> Function {
        Function::new(name, args, DataType::Integer)
    }

    #[test]
    fn lookup_is_case_insensitive_and_later_registrations_win() {
        let mut registry = FunctionModifierRegistry::new();
        registry.register("NOW", |_: &Function| -> Result<Expression> {
            Ok(keyword("getdate()", DataType::Timestamp))
        });
        registry.register("now", |_: &Function| -> Result<Expression> {
            Ok(keyword("current_bigdatetime()", DataType::Timestamp))
        });

        assert_eq!(registry.len(), 1);
        let modifier = registry.lookup("Now").unwrap();
        let rewritten = modifier
            .modify(&Function::new("now", vec![], DataType::Timestamp))
            .unwrap();
        assert_eq!(rewritten.to_string(), "current_bigdatetime()");
        assert!(registry.lookup("today").is_none());
    }

    #[test]
    fn log10_keeps_result_type_and_prepends_ten() {
        let f = Function::new("log10", vec![Expression::double(5.2)], DataType::Double);
        let rewritten = Log10Modifier.modify(&f).unwrap();
        match rewritten {
            Expression::Function(log) => {
                assert_eq!(log.name, "log");
                assert_eq!(log.ty, DataType::Double);
                assert_eq!(log.args.len(), 2);
                let ten = log.args[0].as_literal().unwrap();
                assert_eq!(ten.as_integer(), Some(10));
                assert!(!ten.bind_eligible);
                assert_eq!(log.args[1], Expression::double(5.2));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn locate_swaps_arguments_and_shifts_start() {
        let modifier = LocateModifier::new("instr", LocateStyle::StringFirst);
        let two = call(
            "locate",
            vec![Expression::string("."), Expression::string("a.b.c")],
        );
        assert_eq!(
            modifier.modify(&two).unwrap().to_string(),
            "instr('a.b.c', '.')"
        );

        let constant = call(
            "locate",
            vec![
                Expression::string("."),
                Expression::string("a.b.c"),
                Expression::integer(2),
            ],
        );
        assert_eq!(
            modifier.modify(&constant).unwrap().to_string(),
            "instr('a.b.c', '.', 3)"
        );

        let column = Expression::column("t", "pos", DataType::Integer);
        let dynamic = call(
            "locate",
            vec![Expression::string("."), Expression::string("a.b.c"), column],
        );
        assert_eq!(
            modifier.modify(&dynamic).unwrap().to_string(),
            "instr('a.b.c', '.', (t.pos + 1))"
        );

        let null_start = call(
            "locate",
            vec![
                Expression::string("."),
                Expression::string("a.b.c"),
                Expression::null(DataType::Integer),
            ],
        );
        assert_eq!(
            modifier.modify(&null_start).unwrap().to_string(),
            "instr('a.b.c', '.', NULL)"
        );
    }

    #[test]
    fn arity_mismatch_names_the_function() {
        let modifier = LocateModifier::new("charindex", LocateStyle::SubstringFirst);
        let f = call(
            "locate",
            vec![
                Expression::string("a"),
                Expression::string("abc"),
                Expression::integer(1),
            ],
        );
        let err = modifier.modify(&f).unwrap_err();
        match err {
            SqlshimError::UnsupportedFunction { name, fragment, .. } => {
                assert_eq!(name, "locate");
                assert_eq!(fragment, "locate('a', 'abc', 1)");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn date_parts_become_format_masks_or_fragments() {
        let x = Expression::column("t", "d", DataType::Date);
        let f = call("dayofmonth", vec![x.clone()]);
        assert_eq!(
            DateFormatModifier::new("DD").modify(&f).unwrap().to_string(),
            "to_number(to_char(t.d, 'DD'))"
        );
        let year = call("year", vec![x.clone()]);
        assert_eq!(
            ExtractModifier::new("YEAR").modify(&year).unwrap().to_string(),
            "EXTRACT(YEAR FROM t.d)"
        );
        assert_eq!(
            DatePartModifier::new("datepart", "dd")
                .modify(&f)
                .unwrap()
                .to_string(),
            "datepart(dd, t.d)"
        );
    }
}
