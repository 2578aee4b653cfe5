use serde::{Deserialize, Serialize};

use super::criteria::Criteria;
use super::expression::Expression;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    Select(Select),
    SetQuery(SetQuery),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    BatchedUpdates(BatchedUpdates),
}

/// Anything that produces rows: a plain select or a set operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryExpression {
    Select(Select),
    SetQuery(SetQuery),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedColumn {
    pub expr: Expression,
    #[serde(default)]
    pub alias: Option<String>,
}

impl DerivedColumn {
    pub fn new(expr: Expression) -> Self {
        Self { expr, alias: None }
    }

    pub fn aliased(expr: Expression, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }
}

impl From<Expression> for DerivedColumn {
    fn from(expr: Expression) -> Self {
        DerivedColumn::new(expr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::LeftOuter => "LEFT OUTER JOIN",
            JoinType::RightOuter => "RIGHT OUTER JOIN",
            JoinType::FullOuter => "FULL OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableReference {
    Named {
        name: String,
        #[serde(default)]
        alias: Option<String>,
    },
    Derived {
        query: Box<QueryExpression>,
        alias: String,
    },
    Join {
        left: Box<TableReference>,
        right: Box<TableReference>,
        join_type: JoinType,
        #[serde(default)]
        condition: Option<Criteria>,
    },
}

impl TableReference {
    pub fn table(name: impl Into<String>) -> Self {
        TableReference::Named {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        TableReference::Named {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    pub fn derived(query: impl Into<QueryExpression>, alias: impl Into<String>) -> Self {
        TableReference::Derived {
            query: Box::new(query.into()),
            alias: alias.into(),
        }
    }

    pub fn join(
        left: TableReference,
        right: TableReference,
        join_type: JoinType,
        condition: Option<Criteria>,
    ) -> Self {
        TableReference::Join {
            left: Box::new(left),
            right: Box::new(right),
            join_type,
            condition,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullOrdering {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpecification {
    pub expr: Expression,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub null_ordering: Option<NullOrdering>,
}

impl SortSpecification {
    pub fn asc(expr: Expression) -> Self {
        Self {
            expr,
            direction: SortDirection::Asc,
            null_ordering: None,
        }
    }

    pub fn desc(expr: Expression) -> Self {
        Self {
            expr,
            direction: SortDirection::Desc,
            null_ordering: None,
        }
    }

    pub fn nulls(mut self, ordering: NullOrdering) -> Self {
        self.null_ordering = Some(ordering);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Select {
    #[serde(default)]
    pub distinct: bool,
    pub items: Vec<DerivedColumn>,
    #[serde(default)]
    pub from: Vec<TableReference>,
    #[serde(default)]
    pub criteria: Option<Criteria>,
    #[serde(default)]
    pub group_by: Vec<Expression>,
    #[serde(default)]
    pub having: Option<Criteria>,
    #[serde(default)]
    pub order_by: Vec<SortSpecification>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}

impl Select {
    pub fn new<I, D>(items: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DerivedColumn>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn from(mut self, table: TableReference) -> Self {
        self.from.push(table);
        self
    }

    pub fn from_table(self, name: impl Into<String>) -> Self {
        self.from(TableReference::table(name))
    }

    /// Adds a WHERE condition, AND-ed with any existing one.
    pub fn filter(mut self, criteria: Criteria) -> Self {
        self.criteria = Some(Criteria::combine(self.criteria.take(), criteria));
        self
    }

    pub fn group_by(mut self, expr: Expression) -> Self {
        self.group_by.push(expr);
        self
    }

    pub fn having(mut self, criteria: Criteria) -> Self {
        self.having = Some(Criteria::combine(self.having.take(), criteria));
        self
    }

    pub fn order_by(mut self, sort: SortSpecification) -> Self {
        self.order_by.push(sort);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOperator {
    Union,
    Except,
    Intersect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetQuery {
    pub op: SetOperator,
    #[serde(default)]
    pub all: bool,
    pub left: Box<QueryExpression>,
    pub right: Box<QueryExpression>,
    #[serde(default)]
    pub order_by: Vec<SortSpecification>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}

impl SetQuery {
    pub fn new(
        op: SetOperator,
        left: impl Into<QueryExpression>,
        right: impl Into<QueryExpression>,
    ) -> Self {
        Self {
            op,
            all: false,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn all(mut self) -> Self {
        self.all = true;
        self
    }

    pub fn order_by(mut self, sort: SortSpecification) -> Self {
        self.order_by.push(sort);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

impl QueryExpression {
    /// Select list of the left-most branch, which names the result columns.
    pub fn projected(&self) -> &[DerivedColumn] {
        match self {
            QueryExpression::Select(select) => &select.items,
            QueryExpression::SetQuery(set) => set.left.projected(),
        }
    }

    pub fn order_by(&self) -> &[SortSpecification] {
        match self {
            QueryExpression::Select(select) => &select.order_by,
            QueryExpression::SetQuery(set) => &set.order_by,
        }
    }

    pub fn limit_and_offset(&self) -> (Option<u64>, Option<u64>) {
        match self {
            QueryExpression::Select(select) => (select.limit, select.offset),
            QueryExpression::SetQuery(set) => (set.limit, set.offset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsertSource {
    Values { values: Vec<Expression> },
    Query { query: Box<QueryExpression> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub source: InsertSource,
}

impl Insert {
    pub fn values(table: impl Into<String>, columns: Vec<String>, values: Vec<Expression>) -> Self {
        Self {
            table: table.into(),
            columns,
            source: InsertSource::Values { values },
        }
    }

    pub fn query(
        table: impl Into<String>,
        columns: Vec<String>,
        query: impl Into<QueryExpression>,
    ) -> Self {
        Self {
            table: table.into(),
            columns,
            source: InsertSource::Query {
                query: Box::new(query.into()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetClause {
    pub column: String,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub table: String,
    pub set: Vec<SetClause>,
    #[serde(default)]
    pub criteria: Option<Criteria>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delete {
    pub table: String,
    #[serde(default)]
    pub criteria: Option<Criteria>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchedUpdates {
    pub commands: Vec<Command>,
}

impl From<Select> for QueryExpression {
    fn from(select: Select) -> Self {
        QueryExpression::Select(select)
    }
}

impl From<SetQuery> for QueryExpression {
    fn from(set: SetQuery) -> Self {
        QueryExpression::SetQuery(set)
    }
}

impl From<Select> for Command {
    fn from(select: Select) -> Self {
        Command::Select(select)
    }
}

impl From<SetQuery> for Command {
    fn from(set: SetQuery) -> Self {
        Command::SetQuery(set)
    }
}

impl From<QueryExpression> for Command {
    fn from(query: QueryExpression) -> Self {
        match query {
            QueryExpression::Select(select) => Command::Select(select),
            QueryExpression::SetQuery(set) => Command::SetQuery(set),
        }
    }
}

impl From<Insert> for Command {
    fn from(insert: Insert) -> Self {
        Command::Insert(insert)
    }
}

impl From<Update> for Command {
    fn from(update: Update) -> Self {
        Command::Update(update)
    }
}

impl From<Delete> for Command {
    fn from(delete: Delete) -> Self {
        Command::Delete(delete)
    }
}
