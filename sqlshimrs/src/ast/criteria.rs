use serde::{Deserialize, Serialize};

use super::command::QueryExpression;
use super::expression::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Criteria {
    Compare {
        left: Expression,
        op: CompareOp,
        right: Expression,
    },
    Compound {
        op: LogicalOp,
        criteria: Vec<Criteria>,
    },
    Not {
        criteria: Box<Criteria>,
    },
    In {
        left: Expression,
        values: Vec<Expression>,
        #[serde(default)]
        negated: bool,
    },
    SubqueryIn {
        left: Expression,
        query: Box<QueryExpression>,
        #[serde(default)]
        negated: bool,
    },
    Exists {
        query: Box<QueryExpression>,
        #[serde(default)]
        negated: bool,
    },
    Like {
        left: Expression,
        pattern: Expression,
        #[serde(default)]
        escape: Option<char>,
        #[serde(default)]
        negated: bool,
    },
    IsNull {
        expr: Expression,
        #[serde(default)]
        negated: bool,
    },
}

impl Criteria {
    pub fn compare(left: Expression, op: CompareOp, right: Expression) -> Self {
        Criteria::Compare { left, op, right }
    }

    pub fn eq(left: Expression, right: Expression) -> Self {
        Self::compare(left, CompareOp::Eq, right)
    }

    pub fn and(criteria: Vec<Criteria>) -> Self {
        Criteria::Compound {
            op: LogicalOp::And,
            criteria,
        }
    }

    pub fn or(criteria: Vec<Criteria>) -> Self {
        Criteria::Compound {
            op: LogicalOp::Or,
            criteria,
        }
    }

    pub fn not(criteria: Criteria) -> Self {
        Criteria::Not {
            criteria: Box::new(criteria),
        }
    }

    pub fn in_list(left: Expression, values: Vec<Expression>, negated: bool) -> Self {
        Criteria::In {
            left,
            values,
            negated,
        }
    }

    pub fn in_subquery(left: Expression, query: impl Into<QueryExpression>, negated: bool) -> Self {
        Criteria::SubqueryIn {
            left,
            query: Box::new(query.into()),
            negated,
        }
    }

    pub fn exists(query: impl Into<QueryExpression>) -> Self {
        Criteria::Exists {
            query: Box::new(query.into()),
            negated: false,
        }
    }

    pub fn like(left: Expression, pattern: Expression) -> Self {
        Criteria::Like {
            left,
            pattern,
            escape: None,
            negated: false,
        }
    }

    pub fn is_null(expr: Expression) -> Self {
        Criteria::IsNull {
            expr,
            negated: false,
        }
    }

    pub fn is_not_null(expr: Expression) -> Self {
        Criteria::IsNull {
            expr,
            negated: true,
        }
    }

    /// Combines two optional criteria with AND, flattening nested conjunctions.
    pub fn combine(existing: Option<Criteria>, extra: Criteria) -> Criteria {
        match existing {
            None => extra,
            Some(Criteria::Compound {
                op: LogicalOp::And,
                mut criteria,
            }) => {
                criteria.push(extra);
                Criteria::and(criteria)
            }
            Some(other) => Criteria::and(vec![other, extra]),
        }
    }
}
