use crate::ast::{
    is_infix, AggregateFunction, Expression, FragmentPart, Function, Literal, SearchedCase, Value,
};
use crate::conversion::Conversion;
use crate::error::{Result, SqlshimError};
use crate::types::DataType;

use super::{BindValue, SqlRenderer};

impl SqlRenderer<'_> {
    pub(super) fn expr(&mut self, expr: &Expression) -> Result<String> {
        match expr {
            Expression::Literal(literal) => self.literal(literal),
            Expression::Column(column) => Ok(match &column.group {
                Some(group) => format!(
                    "{}.{}",
                    self.quote_path(group),
                    self.dialect().quote_ident(&column.name)
                ),
                None => self.dialect().quote_ident(&column.name),
            }),
            Expression::Function(function) => self.function(function),
            Expression::Aggregate(aggregate) => self.aggregate(aggregate),
            Expression::Case(case) => self.case(case),
            Expression::Subquery(sub) => Ok(format!("({})", self.query(&sub.query)?)),
            Expression::Condition(condition) => self.condition_value(&condition.criteria),
            Expression::Fragment(fragment) => {
                let mut sql = String::new();
                for part in &fragment.parts {
                    match part {
                        FragmentPart::Sql(text) => sql.push_str(text),
                        FragmentPart::Expr(expr) => sql.push_str(&self.expr(expr)?),
                    }
                }
                Ok(sql)
            }
        }
    }

    fn literal(&mut self, literal: &Literal) -> Result<String> {
        if literal.is_null() {
            return Ok("NULL".to_string());
        }
        if let Value::Float(v) = literal.value {
            if !v.is_finite() {
                return Err(SqlshimError::InvalidCommand(format!(
                    "float literal {v} has no SQL form"
                )));
            }
        }
        let value = self.shift_to_database_zone(&literal.value)?;
        if literal.bind_eligible && self.translator.use_bind_variables() {
            let placeholder = self.dialect().placeholder(self.binds.len());
            self.binds.push(BindValue {
                value,
                ty: literal.ty,
            });
            return Ok(placeholder);
        }
        Ok(self.dialect().render_value(&value))
    }

    fn function(&mut self, function: &Function) -> Result<String> {
        let name = function.name.to_ascii_lowercase();
        if name == "convert" || name == "cast" {
            return self.conversion(function);
        }
        let translator = self.translator;
        if let Some(modifier) = translator.modifiers().lookup(&name) {
            tracing::trace!(function = %function.name, "applying function modifier");
            return match modifier.modify(function)? {
                Expression::Function(rewritten) => self.plain_function(&rewritten),
                other => self.expr(&other),
            };
        }
        if is_infix(&name) || translator.capabilities().supports_function(&name) {
            return self.plain_function(function);
        }
        Err(SqlshimError::unsupported_function(
            &function.name,
            format!("not supported by {}", self.dialect().kind()),
            Expression::Function(function.clone()),
        ))
    }

    /// Renders the call as written, without looking up modifiers for it.
    /// Arguments still go through full dispatch.
    fn plain_function(&mut self, function: &Function) -> Result<String> {
        if is_infix(&function.name) {
            if let [left, right] = function.args.as_slice() {
                let left = self.expr(left)?;
                let right = self.expr(right)?;
                return Ok(format!("({left} {} {right})", function.name));
            }
        }
        let args = function
            .args
            .iter()
            .map(|arg| self.expr(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{}({})", function.name, args.join(", ")))
    }

    /// `convert(x, 'type')` and `cast(x, 'type')` through the conversion matrix.
    fn conversion(&mut self, function: &Function) -> Result<String> {
        let fragment = || Expression::Function(function.clone());
        let [source, target] = function.args.as_slice() else {
            return Err(SqlshimError::unsupported_function(
                &function.name,
                format!("expected 2 arguments, got {}", function.args.len()),
                fragment(),
            ));
        };
        let target = match target.as_literal().map(|l| &l.value) {
            Some(Value::String(name)) => name.parse::<DataType>()?,
            _ => {
                return Err(SqlshimError::unsupported_function(
                    &function.name,
                    "target type must be a string literal",
                    fragment(),
                ))
            }
        };
        if source.is_null_literal() {
            return Ok("NULL".to_string());
        }
        let from = source.ty();
        if let Some(Value::Boolean(b)) = source.as_literal().map(|l| &l.value) {
            if target.is_numeric() {
                return Ok(if *b { "1" } else { "0" }.to_string());
            }
        }
        let translator = self.translator;
        let conversion = translator
            .conversions()
            .resolve(from, target)
            .ok_or_else(|| SqlshimError::UnsupportedConversion {
                from,
                to: target,
                fragment: fragment().to_string(),
            })?;
        match conversion {
            Conversion::PassThrough => self.expr(source),
            Conversion::Rule(rule) => {
                tracing::trace!(%from, to = %target, template = rule.template(), "conversion rule");
                let mark = self.bind_mark();
                let rendered = self.expr(source)?;
                self.repeat_binds(mark, rule.placeholder_count().saturating_sub(1));
                Ok(rule.render(&rendered))
            }
        }
    }

    fn aggregate(&mut self, aggregate: &AggregateFunction) -> Result<String> {
        if !self.translator.capabilities().supports_aggregate(&aggregate.name) {
            return Err(SqlshimError::unsupported_function(
                &aggregate.name,
                format!("aggregate not supported by {}", self.dialect().kind()),
                Expression::Aggregate(aggregate.clone()),
            ));
        }
        let name = aggregate.name.to_ascii_uppercase();
        let arg = match &aggregate.arg {
            Some(arg) => self.expr(arg)?,
            None => "*".to_string(),
        };
        let distinct = if aggregate.distinct { "DISTINCT " } else { "" };
        Ok(format!("{name}({distinct}{arg})"))
    }

    fn case(&mut self, case: &SearchedCase) -> Result<String> {
        let mut sql = String::from("CASE");
        for branch in &case.branches {
            let when = self.criteria(&branch.when)?;
            let then = self.expr(&branch.then)?;
            sql.push_str(&format!(" WHEN {when} THEN {then}"));
        }
        if let Some(else_expr) = &case.else_expr {
            sql.push_str(&format!(" ELSE {}", self.expr(else_expr)?));
        }
        sql.push_str(" END");
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    use crate::ast::{Criteria, Expression, Literal, Value};
    use crate::config::TranslatorConfig;
    use crate::dialect::DialectKind;
    use crate::error::SqlshimError;
    use crate::render::SqlRenderer;
    use crate::translator::Translator;
    use crate::types::DataType;

    fn ansi(config: TranslatorConfig) -> Translator {
        Translator::new(DialectKind::Ansi, &config).unwrap()
    }

    fn render(translator: &Translator, expr: &Expression) -> (String, usize) {
        let mut renderer = SqlRenderer::new(translator);
        let sql = renderer.expr(expr).unwrap();
        (sql, renderer.into_bind_values().len())
    }

    #[test]
    fn bindable_literals_become_placeholders() {
        let translator = ansi(TranslatorConfig {
            use_bind_variables: true,
            ..Default::default()
        });
        let expr = Expression::function(
            "+",
            vec![
                Expression::integer(1),
                Expression::Literal(Literal::inline(Value::Integer(2), DataType::Integer)),
            ],
            DataType::Integer,
        );
        assert_eq!(render(&translator, &expr), ("(? + 2)".to_string(), 1));
        assert_eq!(
            render(&translator, &Expression::null(DataType::String)),
            ("NULL".to_string(), 0)
        );
    }

    #[test]
    fn timestamps_shift_into_database_zone() {
        let translator = ansi(TranslatorConfig {
            database_time_zone: Some("-05:00".to_string()),
            ..Default::default()
        });
        let ts = NaiveDate::from_ymd_opt(2002, 12, 31)
            .unwrap()
            .and_hms_opt(13, 59, 59)
            .unwrap();
        let expr = Expression::literal(Value::Timestamp(ts), DataType::Timestamp);
        assert_eq!(
            render(&translator, &expr).0,
            "TIMESTAMP '2002-12-31 08:59:59.0'"
        );
        let time = Expression::literal(
            Value::Time(NaiveTime::from_hms_opt(2, 0, 0).unwrap()),
            DataType::Time,
        );
        assert_eq!(render(&translator, &time).0, "TIME '21:00:00'");
        let date = Expression::literal(
            Value::Date(NaiveDate::from_ymd_opt(2002, 12, 31).unwrap()),
            DataType::Date,
        );
        assert_eq!(render(&translator, &date).0, "DATE '2002-12-31'");
    }

    #[test]
    fn repeated_conversion_source_repeats_its_binds() {
        let translator = ansi(TranslatorConfig {
            use_bind_variables: true,
            ..Default::default()
        });
        let expr = Expression::function(
            "convert",
            vec![Expression::integer(3), Expression::string("boolean")],
            DataType::Boolean,
        );
        assert_eq!(
            render(&translator, &expr),
            (
                "CASE WHEN ? = 0 THEN FALSE WHEN ? IS NOT NULL THEN TRUE END".to_string(),
                2
            )
        );
    }

    #[test]
    fn unknown_functions_are_rejected() {
        let translator = ansi(TranslatorConfig::default());
        let expr = Expression::function("soundex", vec![Expression::string("a")], DataType::String);
        let mut renderer = SqlRenderer::new(&translator);
        let err = renderer.expr(&expr).unwrap_err();
        assert!(err.to_string().contains("soundex"));
    }

    #[test]
    fn unknown_aggregates_are_rejected() {
        let translator = ansi(TranslatorConfig::default());
        let x = Expression::column("t", "x", DataType::Integer);
        let count = Expression::aggregate("count", true, Some(x.clone()), DataType::Long);
        assert_eq!(render(&translator, &count).0, "COUNT(DISTINCT t.x)");

        let median = Expression::aggregate("median", false, Some(x), DataType::Double);
        let err = SqlRenderer::new(&translator).expr(&median).unwrap_err();
        match err {
            SqlshimError::UnsupportedFunction { name, fragment, .. } => {
                assert_eq!(name, "median");
                assert!(fragment.contains("t.x"), "{fragment}");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn non_finite_floats_are_invalid() {
        let translator = ansi(TranslatorConfig::default());
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = SqlRenderer::new(&translator)
                .expr(&Expression::double(v))
                .unwrap_err();
            assert!(matches!(err, SqlshimError::InvalidCommand(_)), "{v}");
        }
        assert_eq!(render(&translator, &Expression::double(2.5)).0, "2.5");
    }

    #[test]
    fn timestamps_that_overflow_the_zone_shift_are_invalid() {
        let translator = ansi(TranslatorConfig {
            database_time_zone: Some("+01:00".to_string()),
            ..Default::default()
        });
        let expr = Expression::literal(Value::Timestamp(NaiveDateTime::MAX), DataType::Timestamp);
        let err = SqlRenderer::new(&translator).expr(&expr).unwrap_err();
        assert!(matches!(err, SqlshimError::InvalidCommand(_)));
    }

    #[test]
    fn decimals_render_as_written() {
        let translator = ansi(TranslatorConfig::default());
        let expr = Expression::decimal("-12.500E3").unwrap();
        assert_eq!(render(&translator, &expr).0, "-12.500E3");
        assert!(Expression::decimal("1; DROP TABLE t").is_err());
    }

    #[test]
    fn searched_case_renders_branches_in_order() {
        let translator = ansi(TranslatorConfig::default());
        let x = Expression::column("t", "x", DataType::Integer);
        let expr = Expression::case(
            vec![(
                Criteria::eq(x.clone(), Expression::integer(1)),
                Expression::string("one"),
            )],
            Some(Expression::string("other")),
            DataType::String,
        );
        assert_eq!(
            render(&translator, &expr).0,
            "CASE WHEN t.x = 1 THEN 'one' ELSE 'other' END"
        );
    }
}
