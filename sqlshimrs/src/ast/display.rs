//! Dialect-neutral text form of the command tree.
//!
//! Used for error fragments and log fields; never sent to a database.

use std::fmt::{self, Display, Formatter, Write};

use super::command::{
    Command, DerivedColumn, InsertSource, QueryExpression, Select, SetOperator, SetQuery,
    SortDirection, SortSpecification, TableReference,
};
use super::criteria::Criteria;
use super::expression::{Expression, FragmentPart};
use super::literal::{
    format_date, format_float, format_time, format_timestamp, quote_string, Literal, Value,
};

fn join<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

pub(crate) fn is_infix(name: &str) -> bool {
    matches!(name, "+" | "-" | "*" | "/" | "%" | "||")
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Null => f.write_str("NULL"),
            Value::String(s) => f.write_str(&quote_string(s)),
            Value::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Float(v) => f.write_str(&format_float(*v)),
            Value::Date(d) => write!(f, "DATE '{}'", format_date(d)),
            Value::Time(t) => write!(f, "TIME '{}'", format_time(t)),
            Value::Timestamp(ts) => write!(f, "TIMESTAMP '{}'", format_timestamp(ts)),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(l) => write!(f, "{l}"),
            Expression::Column(c) => match &c.group {
                Some(group) => write!(f, "{group}.{}", c.name),
                None => f.write_str(&c.name),
            },
            Expression::Function(func) if is_infix(&func.name) && func.args.len() == 2 => {
                write!(f, "({} {} {})", func.args[0], func.name, func.args[1])
            }
            Expression::Function(func) => {
                write!(f, "{}(", func.name)?;
                join(f, &func.args, ", ")?;
                f.write_char(')')
            }
            Expression::Aggregate(agg) => {
                write!(f, "{}(", agg.name.to_ascii_uppercase())?;
                if agg.distinct {
                    f.write_str("DISTINCT ")?;
                }
                match &agg.arg {
                    Some(arg) => write!(f, "{arg}")?,
                    None => f.write_char('*')?,
                }
                f.write_char(')')
            }
            Expression::Case(case) => {
                f.write_str("CASE")?;
                for branch in &case.branches {
                    write!(f, " WHEN {} THEN {}", branch.when, branch.then)?;
                }
                if let Some(else_expr) = &case.else_expr {
                    write!(f, " ELSE {else_expr}")?;
                }
                f.write_str(" END")
            }
            Expression::Subquery(sub) => write!(f, "({})", sub.query),
            Expression::Condition(cond) => write!(f, "{}", cond.criteria),
            Expression::Fragment(frag) => {
                for part in &frag.parts {
                    match part {
                        FragmentPart::Sql(text) => f.write_str(text)?,
                        FragmentPart::Expr(expr) => write!(f, "{expr}")?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl Display for Criteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let not = |negated: &bool| if *negated { "NOT " } else { "" };
        match self {
            Criteria::Compare { left, op, right } => write!(f, "{left} {} {right}", op.as_sql()),
            Criteria::Compound { op, criteria } => {
                f.write_char('(')?;
                join(f, criteria, &format!(" {} ", op.as_sql()))?;
                f.write_char(')')
            }
            Criteria::Not { criteria } => write!(f, "NOT ({criteria})"),
            Criteria::In {
                left,
                values,
                negated,
            } => {
                write!(f, "{left} {}IN (", not(negated))?;
                join(f, values, ", ")?;
                f.write_char(')')
            }
            Criteria::SubqueryIn {
                left,
                query,
                negated,
            } => write!(f, "{left} {}IN ({query})", not(negated)),
            Criteria::Exists { query, negated } => write!(f, "{}EXISTS ({query})", not(negated)),
            Criteria::Like {
                left,
                pattern,
                escape,
                negated,
            } => {
                write!(f, "{left} {}LIKE {pattern}", not(negated))?;
                if let Some(escape) = escape {
                    write!(f, " ESCAPE '{escape}'")?;
                }
                Ok(())
            }
            Criteria::IsNull { expr, negated } => write!(f, "{expr} IS {}NULL", not(negated)),
        }
    }
}

impl Display for DerivedColumn {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} AS {alias}", self.expr),
            None => write!(f, "{}", self.expr),
        }
    }
}

impl Display for TableReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TableReference::Named { name, alias } => match alias {
                Some(alias) => write!(f, "{name} {alias}"),
                None => f.write_str(name),
            },
            TableReference::Derived { query, alias } => write!(f, "({query}) {alias}"),
            TableReference::Join {
                left,
                right,
                join_type,
                condition,
            } => {
                write!(f, "{left} {} {right}", join_type.as_sql())?;
                if let Some(condition) = condition {
                    write!(f, " ON {condition}")?;
                }
                Ok(())
            }
        }
    }
}

impl Display for SortSpecification {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if self.direction == SortDirection::Desc {
            f.write_str(" DESC")?;
        }
        Ok(())
    }
}

fn write_tail(
    f: &mut Formatter<'_>,
    order_by: &[SortSpecification],
    limit: Option<u64>,
    offset: Option<u64>,
) -> fmt::Result {
    if !order_by.is_empty() {
        f.write_str(" ORDER BY ")?;
        join(f, order_by, ", ")?;
    }
    match (offset, limit) {
        (Some(offset), Some(limit)) => write!(f, " LIMIT {offset}, {limit}"),
        (None, Some(limit)) => write!(f, " LIMIT {limit}"),
        (Some(offset), None) => write!(f, " OFFSET {offset}"),
        (None, None) => Ok(()),
    }
}

impl Display for Select {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        join(f, &self.items, ", ")?;
        if !self.from.is_empty() {
            f.write_str(" FROM ")?;
            join(f, &self.from, ", ")?;
        }
        if let Some(criteria) = &self.criteria {
            write!(f, " WHERE {criteria}")?;
        }
        if !self.group_by.is_empty() {
            f.write_str(" GROUP BY ")?;
            join(f, &self.group_by, ", ")?;
        }
        if let Some(having) = &self.having {
            write!(f, " HAVING {having}")?;
        }
        write_tail(f, &self.order_by, self.limit, self.offset)
    }
}

impl Display for SetQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            SetOperator::Union => "UNION",
            SetOperator::Except => "EXCEPT",
            SetOperator::Intersect => "INTERSECT",
        };
        let all = if self.all { " ALL" } else { "" };
        write!(f, "{} {op}{all} {}", self.left, self.right)?;
        write_tail(f, &self.order_by, self.limit, self.offset)
    }
}

impl Display for QueryExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            QueryExpression::Select(select) => write!(f, "{select}"),
            QueryExpression::SetQuery(set) => write!(f, "{set}"),
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::Select(select) => write!(f, "{select}"),
            Command::SetQuery(set) => write!(f, "{set}"),
            Command::Insert(insert) => {
                write!(f, "INSERT INTO {} (", insert.table)?;
                join(f, &insert.columns, ", ")?;
                f.write_str(") ")?;
                match &insert.source {
                    InsertSource::Values { values } => {
                        f.write_str("VALUES (")?;
                        join(f, values, ", ")?;
                        f.write_char(')')
                    }
                    InsertSource::Query { query } => write!(f, "{query}"),
                }
            }
            Command::Update(update) => {
                write!(f, "UPDATE {} SET ", update.table)?;
                for (idx, clause) in update.set.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", clause.column, clause.value)?;
                }
                if let Some(criteria) = &update.criteria {
                    write!(f, " WHERE {criteria}")?;
                }
                Ok(())
            }
            Command::Delete(delete) => {
                write!(f, "DELETE FROM {}", delete.table)?;
                if let Some(criteria) = &delete.criteria {
                    write!(f, " WHERE {criteria}")?;
                }
                Ok(())
            }
            Command::BatchedUpdates(batch) => join(f, &batch.commands, "; "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    #[test]
    fn displays_limit_in_offset_comma_form() {
        let select = Select::new([Expression::column("t", "x", DataType::String)])
            .from_table("t")
            .offset(50)
            .limit(100);
        assert_eq!(select.to_string(), "SELECT t.x FROM t LIMIT 50, 100");
    }

    #[test]
    fn displays_function_calls_with_arguments() {
        let expr = Expression::function(
            "locate",
            vec![Expression::string("."), Expression::string("a.b.c")],
            DataType::Integer,
        );
        assert_eq!(expr.to_string(), "locate('.', 'a.b.c')");
    }
}
