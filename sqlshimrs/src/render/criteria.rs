use crate::ast::{Criteria, Expression, LogicalOp};
use crate::error::{Result, SqlshimError};

use super::SqlRenderer;

fn not_keyword(negated: bool) -> &'static str {
    if negated {
        "NOT "
    } else {
        ""
    }
}

impl SqlRenderer<'_> {
    pub(super) fn criteria(&mut self, criteria: &Criteria) -> Result<String> {
        match criteria {
            Criteria::Compare { left, op, right } => {
                let left = self.expr(left)?;
                let right = self.expr(right)?;
                Ok(format!("{left} {} {right}", op.as_sql()))
            }
            Criteria::Compound { op, criteria } => {
                if criteria.is_empty() {
                    return Err(SqlshimError::InvalidCommand(format!(
                        "{} without operands",
                        op.as_sql()
                    )));
                }
                let mut parts = Vec::with_capacity(criteria.len());
                for child in criteria {
                    let rendered = self.criteria(child)?;
                    parts.push(match child {
                        Criteria::Compound { .. } => format!("({rendered})"),
                        _ => rendered,
                    });
                }
                Ok(parts.join(&format!(" {} ", op.as_sql())))
            }
            Criteria::Not { criteria } => Ok(format!("NOT ({})", self.criteria(criteria)?)),
            Criteria::In {
                left,
                values,
                negated,
            } => self.in_list(left, values, *negated),
            Criteria::SubqueryIn {
                left,
                query,
                negated,
            } => {
                let left = self.expr(left)?;
                let query = self.query(query)?;
                Ok(format!("{left} {}IN ({query})", not_keyword(*negated)))
            }
            Criteria::Exists { query, negated } => Ok(format!(
                "{}EXISTS ({})",
                not_keyword(*negated),
                self.query(query)?
            )),
            Criteria::Like {
                left,
                pattern,
                escape,
                negated,
            } => {
                let left = self.expr(left)?;
                let pattern = self.expr(pattern)?;
                let mut sql = format!("{left} {}LIKE {pattern}", not_keyword(*negated));
                if let Some(escape) = escape {
                    let escape = escape.to_string().replace('\'', "''");
                    sql.push_str(&format!(" ESCAPE '{escape}'"));
                }
                Ok(sql)
            }
            Criteria::IsNull { expr, negated } => Ok(format!(
                "{} IS {}NULL",
                self.expr(expr)?,
                not_keyword(*negated)
            )),
        }
    }

    /// IN lists above the dialect limit are split into OR-ed chunks
    /// (AND-ed `NOT IN` chunks when negated).
    fn in_list(&mut self, left: &Expression, values: &[Expression], negated: bool) -> Result<String> {
        if values.is_empty() {
            return Err(SqlshimError::InvalidCommand(format!(
                "{}IN list for {left} has no values",
                not_keyword(negated)
            )));
        }
        let max = self
            .translator
            .capabilities()
            .max_in_criteria_size
            .filter(|max| *max > 0)
            .unwrap_or(usize::MAX);
        let chunks: Vec<&[Expression]> = if values.len() > max {
            values.chunks(max).collect()
        } else {
            vec![values]
        };
        let mut parts = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let left = self.expr(left)?;
            let items = chunk
                .iter()
                .map(|value| self.expr(value))
                .collect::<Result<Vec<_>>>()?;
            parts.push(format!(
                "{left} {}IN ({})",
                not_keyword(negated),
                items.join(", ")
            ));
        }
        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        let op = if negated { LogicalOp::And } else { LogicalOp::Or };
        Ok(format!("({})", parts.join(&format!(" {} ", op.as_sql()))))
    }

    /// A predicate in value position. Dialects without boolean expressions
    /// get `CASE WHEN p THEN 1 WHEN NOT (p) THEN 0 END`.
    pub(super) fn condition_value(&mut self, criteria: &Criteria) -> Result<String> {
        if self.translator.capabilities().supports_boolean_expressions {
            return self.criteria(criteria);
        }
        let mark = self.bind_mark();
        let predicate = self.criteria(criteria)?;
        self.repeat_binds(mark, 1);
        Ok(format!(
            "CASE WHEN {predicate} THEN 1 WHEN NOT ({predicate}) THEN 0 END"
        ))
    }
}
