use serde::{Deserialize, Serialize};

use super::command::QueryExpression;
use super::criteria::Criteria;
use super::literal::{Decimal, Literal, Value};
use crate::error::Result;
use crate::types::DataType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    Literal(Literal),
    Column(ColumnReference),
    Function(Function),
    Aggregate(AggregateFunction),
    Case(SearchedCase),
    Subquery(ScalarSubquery),
    /// A predicate used as a boolean value.
    Condition(Condition),
    /// Dialect-native syntax that is not a plain function call.
    Fragment(Fragment),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnReference {
    /// Qualifying group (table or alias), already in physical form.
    pub group: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: DataType,
    #[serde(default = "nullable_default")]
    pub nullable: bool,
}

fn nullable_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Expression>,
    #[serde(rename = "type")]
    pub ty: DataType,
}

impl Function {
    pub fn new(name: impl Into<String>, args: Vec<Expression>, ty: DataType) -> Self {
        Self {
            name: name.into(),
            args,
            ty,
        }
    }

    /// The same call under another name, keeping arguments and result type.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: self.args.clone(),
            ty: self.ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateFunction {
    pub name: String,
    #[serde(default)]
    pub distinct: bool,
    /// `None` renders as `COUNT(*)`.
    pub arg: Option<Box<Expression>>,
    #[serde(rename = "type")]
    pub ty: DataType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseBranch {
    pub when: Criteria,
    pub then: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchedCase {
    pub branches: Vec<CaseBranch>,
    #[serde(default)]
    pub else_expr: Option<Box<Expression>>,
    #[serde(rename = "type")]
    pub ty: DataType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarSubquery {
    pub query: Box<QueryExpression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub criteria: Box<Criteria>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentPart {
    Sql(String),
    Expr(Expression),
}

impl FragmentPart {
    pub fn sql(text: impl Into<String>) -> Self {
        FragmentPart::Sql(text.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub parts: Vec<FragmentPart>,
    #[serde(rename = "type")]
    pub ty: DataType,
}

impl Expression {
    pub fn literal(value: Value, ty: DataType) -> Self {
        Expression::Literal(Literal::new(value, ty))
    }

    pub fn null(ty: DataType) -> Self {
        Expression::Literal(Literal::null(ty))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::literal(Value::String(s.into()), DataType::String)
    }

    pub fn integer(i: i64) -> Self {
        Self::literal(Value::Integer(i), DataType::Integer)
    }

    /// Exact numeric literal; fails unless `text` is a plain decimal number.
    pub fn decimal(text: &str) -> Result<Self> {
        Ok(Self::literal(
            Value::Decimal(text.parse::<Decimal>()?),
            DataType::BigDecimal,
        ))
    }

    pub fn double(v: f64) -> Self {
        Self::literal(Value::Float(v), DataType::Double)
    }

    pub fn boolean(b: bool) -> Self {
        Self::literal(Value::Boolean(b), DataType::Boolean)
    }

    /// A qualified column reference, nullable unless marked with [`Expression::not_null`].
    pub fn column(group: impl Into<String>, name: impl Into<String>, ty: DataType) -> Self {
        Expression::Column(ColumnReference {
            group: Some(group.into()),
            name: name.into(),
            ty,
            nullable: true,
        })
    }

    pub fn unqualified_column(name: impl Into<String>, ty: DataType) -> Self {
        Expression::Column(ColumnReference {
            group: None,
            name: name.into(),
            ty,
            nullable: true,
        })
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>, ty: DataType) -> Self {
        Expression::Function(Function::new(name, args, ty))
    }

    pub fn aggregate(
        name: impl Into<String>,
        distinct: bool,
        arg: Option<Expression>,
        ty: DataType,
    ) -> Self {
        Expression::Aggregate(AggregateFunction {
            name: name.into(),
            distinct,
            arg: arg.map(Box::new),
            ty,
        })
    }

    pub fn case(
        branches: Vec<(Criteria, Expression)>,
        else_expr: Option<Expression>,
        ty: DataType,
    ) -> Self {
        Expression::Case(SearchedCase {
            branches: branches
                .into_iter()
                .map(|(when, then)| CaseBranch { when, then })
                .collect(),
            else_expr: else_expr.map(Box::new),
            ty,
        })
    }

    pub fn subquery(query: impl Into<QueryExpression>) -> Self {
        Expression::Subquery(ScalarSubquery {
            query: Box::new(query.into()),
        })
    }

    pub fn condition(criteria: Criteria) -> Self {
        Expression::Condition(Condition {
            criteria: Box::new(criteria),
        })
    }

    pub fn fragment(parts: Vec<FragmentPart>, ty: DataType) -> Self {
        Expression::Fragment(Fragment { parts, ty })
    }

    /// Marks a column reference as non-nullable; other expressions are unchanged.
    pub fn not_null(mut self) -> Self {
        if let Expression::Column(col) = &mut self {
            col.nullable = false;
        }
        self
    }

    pub fn ty(&self) -> DataType {
        match self {
            Expression::Literal(l) => l.ty,
            Expression::Column(c) => c.ty,
            Expression::Function(f) => f.ty,
            Expression::Aggregate(a) => a.ty,
            Expression::Case(c) => c.ty,
            Expression::Subquery(s) => s
                .query
                .projected()
                .first()
                .map(|item| item.expr.ty())
                .unwrap_or(DataType::String),
            Expression::Condition(_) => DataType::Boolean,
            Expression::Fragment(f) => f.ty,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Expression::Literal(l) => Some(l),
            _ => None,
        }
    }

    pub fn is_null_literal(&self) -> bool {
        self.as_literal().is_some_and(Literal::is_null)
    }

    /// Conservative nullability: only non-null literals, non-nullable columns
    /// and counts are known to be non-null.
    pub fn may_be_null(&self) -> bool {
        match self {
            Expression::Literal(l) => l.is_null(),
            Expression::Column(c) => c.nullable,
            Expression::Aggregate(a) => !a.name.eq_ignore_ascii_case("count"),
            _ => true,
        }
    }
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Expression::Literal(literal)
    }
}

impl From<Function> for Expression {
    fn from(function: Function) -> Self {
        Expression::Function(function)
    }
}
