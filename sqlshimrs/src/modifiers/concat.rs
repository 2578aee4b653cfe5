//! NULL-aware string concatenation.
//!
//! Two contracts are offered. `concat` is strict: the result is NULL as soon
//! as one operand is NULL. `concat2` coalesces: the result is NULL only when
//! every operand is NULL. Dialects whose native concatenation treats NULL as
//! an empty string get a `CASE` guard around the native form.

use crate::ast::{Criteria, Expression, FragmentPart, Function};
use crate::error::Result;

use super::{check_arity, inline_string, FunctionModifier};

/// Native spelling of two-operand concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatStyle {
    /// `concat(a, b)`, nested for more operands.
    Function(&'static str),
    /// `(a op b)`, nested for more operands.
    Operator(&'static str),
}

impl ConcatStyle {
    fn render(&self, operands: Vec<Expression>, function: &Function) -> Expression {
        let mut operands = operands.into_iter();
        let Some(first) = operands.next() else {
            return Expression::null(function.ty);
        };
        operands.fold(first, |acc, next| {
            let parts = match self {
                ConcatStyle::Function(name) => vec![
                    FragmentPart::sql(format!("{name}(")),
                    FragmentPart::Expr(acc),
                    FragmentPart::sql(", "),
                    FragmentPart::Expr(next),
                    FragmentPart::sql(")"),
                ],
                ConcatStyle::Operator(op) => vec![
                    FragmentPart::sql("("),
                    FragmentPart::Expr(acc),
                    FragmentPart::sql(format!(" {op} ")),
                    FragmentPart::Expr(next),
                    FragmentPart::sql(")"),
                ],
            };
            Expression::fragment(parts, function.ty)
        })
    }
}

fn null_checks(operands: &[&Expression]) -> Vec<Criteria> {
    operands
        .iter()
        .map(|operand| Criteria::is_null((*operand).clone()))
        .collect()
}

fn guarded(condition: Criteria, native: Expression, function: &Function) -> Expression {
    Expression::case(
        vec![(condition, Expression::null(function.ty))],
        Some(native),
        function.ty,
    )
}

/// `concat(a, b, ...)`: NULL when any operand is NULL.
#[derive(Debug, Clone)]
pub struct StrictConcatModifier {
    style: ConcatStyle,
    guard_nulls: bool,
}

impl StrictConcatModifier {
    /// `guard_nulls` is set for dialects whose native form does not
    /// propagate NULL by itself.
    pub fn new(style: ConcatStyle, guard_nulls: bool) -> Self {
        Self { style, guard_nulls }
    }
}

impl FunctionModifier for StrictConcatModifier {
    fn modify(&self, function: &Function) -> Result<Expression> {
        check_arity(function, 2..=usize::MAX)?;
        if function.args.iter().any(Expression::is_null_literal) {
            return Ok(Expression::null(function.ty));
        }
        let native = self.style.render(function.args.clone(), function);
        if !self.guard_nulls {
            return Ok(native);
        }
        let nullable: Vec<&Expression> = function
            .args
            .iter()
            .filter(|arg| arg.may_be_null())
            .collect();
        let condition = match nullable.len() {
            0 => return Ok(native),
            1 => Criteria::is_null(nullable[0].clone()),
            _ => Criteria::or(null_checks(&nullable)),
        };
        Ok(guarded(condition, native, function))
    }
}

/// `concat2(a, b, ...)`: NULL only when every operand is NULL.
#[derive(Debug, Clone)]
pub struct CoalescingConcatModifier {
    style: ConcatStyle,
    coalesce: Option<&'static str>,
}

impl CoalescingConcatModifier {
    /// `coalesce` names the function used to turn NULL operands into empty
    /// strings when the native form would otherwise propagate NULL.
    pub fn new(style: ConcatStyle, coalesce: Option<&'static str>) -> Self {
        Self { style, coalesce }
    }
}

impl FunctionModifier for CoalescingConcatModifier {
    fn modify(&self, function: &Function) -> Result<Expression> {
        check_arity(function, 2..=usize::MAX)?;
        let operands: Vec<&Expression> = function
            .args
            .iter()
            .filter(|arg| !arg.is_null_literal())
            .collect();
        match operands.as_slice() {
            [] => return Ok(Expression::null(function.ty)),
            [single] => return Ok((*single).clone()),
            _ => {}
        }

        let nullable: Vec<&Expression> = operands
            .iter()
            .copied()
            .filter(|arg| arg.may_be_null())
            .collect();
        let body = operands
            .iter()
            .map(|operand| match self.coalesce {
                Some(coalesce) if operand.may_be_null() => Expression::function(
                    coalesce,
                    vec![(*operand).clone(), inline_string("")],
                    function.ty,
                ),
                _ => (*operand).clone(),
            })
            .collect();
        let native = self.style.render(body, function);

        if nullable.len() < operands.len() {
            return Ok(native);
        }
        let condition = match nullable.as_slice() {
            [single] => Criteria::is_null((*single).clone()),
            _ => Criteria::and(null_checks(&nullable)),
        };
        Ok(guarded(condition, native, function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    fn concat(name: &str, args: Vec<Expression>) -> Function {
        Function::new(name, args, DataType::String)
    }

    fn col(name: &str) -> Expression {
        Expression::column("t", name, DataType::String)
    }

    #[test]
    fn strict_concat_guards_only_nullable_operands() {
        let oracle = StrictConcatModifier::new(ConcatStyle::Function("concat"), true);
        let f = concat("concat", vec![col("stringnum"), Expression::string("1")]);
        assert_eq!(
            oracle.modify(&f).unwrap().to_string(),
            "CASE WHEN t.stringnum IS NULL THEN NULL ELSE concat(t.stringnum, '1') END"
        );

        let both = concat("concat", vec![col("a"), col("b")]);
        assert_eq!(
            oracle.modify(&both).unwrap().to_string(),
            "CASE WHEN (t.a IS NULL OR t.b IS NULL) THEN NULL ELSE concat(t.a, t.b) END"
        );

        let safe = concat("concat", vec![col("a").not_null(), Expression::string("x")]);
        assert_eq!(oracle.modify(&safe).unwrap().to_string(), "concat(t.a, 'x')");
    }

    #[test]
    fn strict_concat_folds_null_literals() {
        let sybase = StrictConcatModifier::new(ConcatStyle::Operator("+"), true);
        let f = concat(
            "concat",
            vec![col("a"), Expression::null(DataType::String)],
        );
        assert!(sybase.modify(&f).unwrap().is_null_literal());
    }

    #[test]
    fn strict_concat_without_guard_uses_native_form() {
        let ansi = StrictConcatModifier::new(ConcatStyle::Operator("||"), false);
        let f = concat("concat", vec![col("a"), col("b"), col("c")]);
        assert_eq!(ansi.modify(&f).unwrap().to_string(), "((t.a || t.b) || t.c)");
    }

    #[test]
    fn coalescing_concat_joins_checks_with_and() {
        let oracle = CoalescingConcatModifier::new(ConcatStyle::Function("concat"), None);
        let f = concat("concat2", vec![col("a"), col("b")]);
        assert_eq!(
            oracle.modify(&f).unwrap().to_string(),
            "CASE WHEN (t.a IS NULL AND t.b IS NULL) THEN NULL ELSE concat(t.a, t.b) END"
        );

        let with_literal = concat("concat2", vec![col("a"), Expression::string("x")]);
        assert_eq!(
            oracle.modify(&with_literal).unwrap().to_string(),
            "concat(t.a, 'x')"
        );
    }

    #[test]
    fn coalescing_concat_drops_null_literals_and_coalesces() {
        let ansi = CoalescingConcatModifier::new(ConcatStyle::Operator("||"), Some("coalesce"));
        let f = concat(
            "concat2",
            vec![col("a"), Expression::null(DataType::String), col("b")],
        );
        assert_eq!(
            ansi.modify(&f).unwrap().to_string(),
            "CASE WHEN (t.a IS NULL AND t.b IS NULL) THEN NULL ELSE (coalesce(t.a, '') || coalesce(t.b, '')) END"
        );

        let only_null = concat(
            "concat2",
            vec![
                Expression::null(DataType::String),
                Expression::null(DataType::String),
            ],
        );
        assert!(ansi.modify(&only_null).unwrap().is_null_literal());
    }
}
