//! Vendor-neutral relational command tree.
//!
//! Commands arrive fully resolved: every column carries its physical group and
//! every expression its type. The tree serializes to and from JSON.

mod command;
mod criteria;
mod display;
mod expression;
mod literal;

pub use command::{
    BatchedUpdates, Command, Delete, DerivedColumn, Insert, InsertSource, JoinType, NullOrdering,
    QueryExpression, Select, SetClause, SetOperator, SetQuery, SortDirection, SortSpecification,
    TableReference, Update,
};
pub use criteria::{CompareOp, Criteria, LogicalOp};
pub use expression::{
    AggregateFunction, CaseBranch, ColumnReference, Condition, Expression, Fragment, FragmentPart,
    Function, ScalarSubquery, SearchedCase,
};
pub use literal::{Decimal, Literal, Value};

pub(crate) use display::is_infix;
pub(crate) use literal::{format_date, format_float, format_time, format_timestamp, quote_string};
