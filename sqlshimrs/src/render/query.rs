use crate::ast::{
    BatchedUpdates, Command, Delete, DerivedColumn, Expression, Insert, InsertSource,
    NullOrdering, QueryExpression, Select, SetQuery, SortDirection, SortSpecification,
    TableReference, Update,
};
use crate::capabilities::{PagingStrategy, PseudoColumn};
use crate::error::{Result, SqlshimError};
use crate::paging::{PagingRequest, PagingSynthesizer, VIEW_FOR_LIMIT};

use super::SqlRenderer;

/// Options for rendering one SELECT block.
#[derive(Debug, Default, Clone, Copy)]
struct SelectLayout {
    top: Option<u64>,
    /// Alias every item `c_<i>` so outer queries can address it.
    positional: bool,
    /// Append a `ROW_NUMBER()` item ordered by the select's own ORDER BY.
    row_number: bool,
    skip_order_by: bool,
}

fn positional_alias(idx: usize) -> String {
    format!("c_{idx}")
}

fn positional_aliases(width: usize) -> Vec<String> {
    (0..width).map(positional_alias).collect()
}

/// `None` when the query asks for every row.
fn row_window(limit: Option<u64>, offset: Option<u64>) -> Option<(u64, Option<u64>)> {
    let offset = offset.unwrap_or(0);
    if limit.is_none() && offset == 0 {
        return None;
    }
    Some((offset, limit))
}

/// Position of an ORDER BY key in a select list, by expression or by name.
fn projected_index(items: &[DerivedColumn], key: &Expression) -> Option<usize> {
    if let Some(idx) = items.iter().position(|item| &item.expr == key) {
        return Some(idx);
    }
    let Expression::Column(column) = key else {
        return None;
    };
    if column.group.is_some() {
        return None;
    }
    items.iter().position(|item| {
        let by_alias = item
            .alias
            .as_deref()
            .is_some_and(|alias| alias.eq_ignore_ascii_case(&column.name));
        let by_name = matches!(&item.expr, Expression::Column(c) if c.name.eq_ignore_ascii_case(&column.name));
        by_alias || by_name
    })
}

fn needs_parens(query: &QueryExpression) -> bool {
    match query {
        QueryExpression::SetQuery(_) => true,
        QueryExpression::Select(select) => {
            !select.order_by.is_empty() || row_window(select.limit, select.offset).is_some()
        }
    }
}

impl SqlRenderer<'_> {
    pub(super) fn command(&mut self, command: &Command) -> Result<String> {
        match command {
            Command::Select(select) => self.select(select, false),
            Command::SetQuery(set) => self.set_query(set, false),
            Command::Insert(insert) => self.insert(insert),
            Command::Update(update) => self.update(update),
            Command::Delete(delete) => self.delete(delete),
            Command::BatchedUpdates(batch) => self.batch(batch),
        }
    }

    pub(super) fn query(&mut self, query: &QueryExpression) -> Result<String> {
        self.query_with(query, false)
    }

    fn query_with(&mut self, query: &QueryExpression, positional: bool) -> Result<String> {
        match query {
            QueryExpression::Select(select) => self.select(select, positional),
            QueryExpression::SetQuery(set) => self.set_query(set, positional),
        }
    }

    fn select(&mut self, select: &Select, positional: bool) -> Result<String> {
        if select.items.is_empty() {
            return Err(SqlshimError::InvalidCommand(
                "select list must not be empty".to_string(),
            ));
        }
        let plain = SelectLayout {
            positional,
            ..Default::default()
        };
        let Some((offset, limit)) = row_window(select.limit, select.offset) else {
            return self.select_body(select, plain);
        };
        tracing::trace!(offset, ?limit, paging = ?self.translator.capabilities().paging, "paging select");
        self.check_row_window(offset, || Command::Select(select.clone()))?;
        match self.translator.capabilities().paging {
            PagingStrategy::OffsetFetch => {
                let body = self.select_body(select, plain)?;
                Ok(body + &offset_fetch(offset, limit))
            }
            PagingStrategy::Top => {
                let limit = match limit {
                    Some(limit) if offset == 0 => limit,
                    _ => {
                        return Err(SqlshimError::unsupported_construct(
                            "row offset",
                            Command::Select(select.clone()),
                        ))
                    }
                };
                self.select_body(
                    select,
                    SelectLayout {
                        top: Some(limit),
                        ..plain
                    },
                )
            }
            PagingStrategy::Emulated(PseudoColumn::Rownum) => {
                let body = self.select_body(select, plain)?;
                Ok(self.synthesize(PseudoColumn::Rownum, &body, offset, limit, &select.order_by, &[]))
            }
            PagingStrategy::Emulated(PseudoColumn::RowNumber) if !select.distinct => {
                let body = self.select_body(
                    select,
                    SelectLayout {
                        positional: true,
                        row_number: true,
                        skip_order_by: true,
                        ..plain
                    },
                )?;
                let projection = positional_aliases(select.items.len());
                Ok(self.synthesize(
                    PseudoColumn::RowNumber,
                    &body,
                    offset,
                    limit,
                    &select.order_by,
                    &projection,
                ))
            }
            PagingStrategy::Emulated(PseudoColumn::RowNumber) => {
                // DISTINCT must apply before rows are numbered.
                let inner = self.select_body(
                    select,
                    SelectLayout {
                        positional: true,
                        skip_order_by: true,
                        ..plain
                    },
                )?;
                let order = self.positional_order(&select.items, &select.order_by, || {
                    Command::Select(select.clone())
                })?;
                Ok(self.numbered(&inner, select.items.len(), &order, offset, limit, &select.order_by))
            }
            PagingStrategy::Unsupported => Err(SqlshimError::unsupported_construct(
                format!("row limit for {}", self.dialect().kind()),
                Command::Select(select.clone()),
            )),
        }
    }

    fn select_body(&mut self, select: &Select, layout: SelectLayout) -> Result<String> {
        let mut sql = String::from("SELECT ");
        if select.distinct {
            sql.push_str("DISTINCT ");
        }
        if let Some(top) = layout.top {
            sql.push_str(&format!("TOP {top} "));
        }
        let mut items = Vec::with_capacity(select.items.len() + 1);
        for (idx, item) in select.items.iter().enumerate() {
            let rendered = self.expr(&item.expr)?;
            items.push(if layout.positional {
                format!("{rendered} AS {}", positional_alias(idx))
            } else if let Some(alias) = &item.alias {
                format!("{rendered} AS {}", self.dialect().quote_ident(alias))
            } else {
                rendered
            });
        }
        if layout.row_number {
            let order = self.order_items(&select.order_by)?;
            items.push(PagingSynthesizer::row_number_column(&order));
        }
        sql.push_str(&items.join(", "));

        if !select.from.is_empty() {
            let tables = select
                .from
                .iter()
                .map(|table| self.table_ref(table))
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(" FROM ");
            sql.push_str(&tables.join(", "));
        } else if let Some(dummy) = self.dialect().dummy_table() {
            sql.push_str(" FROM ");
            sql.push_str(dummy);
        }
        if let Some(criteria) = &select.criteria {
            sql.push_str(&format!(" WHERE {}", self.criteria(criteria)?));
        }
        if !select.group_by.is_empty() {
            let groups = select
                .group_by
                .iter()
                .map(|expr| self.expr(expr))
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(&format!(" GROUP BY {}", groups.join(", ")));
        }
        if let Some(having) = &select.having {
            sql.push_str(&format!(" HAVING {}", self.criteria(having)?));
        }
        if !layout.skip_order_by && !select.order_by.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.order_items(&select.order_by)?));
        }
        Ok(sql)
    }

    fn set_query(&mut self, set: &SetQuery, positional: bool) -> Result<String> {
        let keyword = self
            .translator
            .capabilities()
            .supports_set_operator(set.op, set.all)
            .then(|| self.dialect().set_operator_keyword(set.op, set.all))
            .flatten()
            .ok_or_else(|| {
                SqlshimError::unsupported_construct(
                    format!("{:?}{} set operation", set.op, if set.all { " ALL" } else { "" }),
                    Command::SetQuery(set.clone()),
                )
            })?;
        let window = row_window(set.limit, set.offset);
        let paging = self.translator.capabilities().paging;
        let numbered = window.is_some() && paging == PagingStrategy::Emulated(PseudoColumn::RowNumber);
        let positional = positional || numbered || !set.order_by.is_empty();

        let mut body = String::new();
        for (idx, branch) in [&set.left, &set.right].into_iter().enumerate() {
            if idx > 0 {
                body.push_str(&format!(" {keyword} "));
            }
            let rendered = self.query_with(branch, positional)?;
            if needs_parens(branch) {
                body.push_str(&format!("({rendered})"));
            } else {
                body.push_str(&rendered);
            }
        }

        let fragment = || Command::SetQuery(set.clone());
        let width = set.left.projected().len();
        let order = self.positional_order(set.left.projected(), &set.order_by, fragment)?;
        let Some((offset, limit)) = window else {
            return Ok(with_order_by(body, &order));
        };
        self.check_row_window(offset, fragment)?;
        match paging {
            PagingStrategy::OffsetFetch => {
                Ok(with_order_by(body, &order) + &offset_fetch(offset, limit))
            }
            PagingStrategy::Emulated(PseudoColumn::Rownum) => {
                let body = with_order_by(body, &order);
                Ok(self.synthesize(PseudoColumn::Rownum, &body, offset, limit, &set.order_by, &[]))
            }
            PagingStrategy::Emulated(PseudoColumn::RowNumber) => {
                Ok(self.numbered(&body, width, &order, offset, limit, &set.order_by))
            }
            PagingStrategy::Top | PagingStrategy::Unsupported => Err(
                SqlshimError::unsupported_construct("row limit on a set operation", fragment()),
            ),
        }
    }

    /// Fails when the database cannot cut out the requested rows.
    fn check_row_window(&self, offset: u64, fragment: impl Fn() -> Command) -> Result<()> {
        let capabilities = self.translator.capabilities();
        if !capabilities.supports_row_limit() {
            return Err(SqlshimError::unsupported_construct(
                format!("row limit for {}", self.dialect().kind()),
                fragment(),
            ));
        }
        if offset > 0 && !capabilities.supports_row_offset() {
            return Err(SqlshimError::unsupported_construct("row offset", fragment()));
        }
        Ok(())
    }

    /// Rewrites ORDER BY keys to the positional aliases of `items`.
    fn positional_order(
        &self,
        items: &[DerivedColumn],
        sorts: &[SortSpecification],
        fragment: impl Fn() -> Command,
    ) -> Result<String> {
        let mut keys = Vec::with_capacity(sorts.len());
        for sort in sorts {
            let idx = projected_index(items, &sort.expr).ok_or_else(|| {
                SqlshimError::unsupported_construct(
                    format!("ORDER BY {} outside the select list", sort.expr),
                    fragment(),
                )
            })?;
            keys.push(self.sort_item(&positional_alias(idx), sort).0);
        }
        Ok(keys.join(", "))
    }

    /// Numbers the rows of an already rendered query with a middle
    /// `ROW_NUMBER()` layer, then cuts the window out of it.
    fn numbered(
        &self,
        inner: &str,
        width: usize,
        order: &str,
        offset: u64,
        limit: Option<u64>,
        sorts: &[SortSpecification],
    ) -> String {
        let projection = positional_aliases(width);
        let middle = format!(
            "SELECT {}, {} FROM ({inner}) {VIEW_FOR_LIMIT}",
            projection.join(", "),
            PagingSynthesizer::row_number_column(order)
        );
        self.synthesize(PseudoColumn::RowNumber, &middle, offset, limit, sorts, &projection)
    }

    fn synthesize(
        &self,
        pseudo_column: PseudoColumn,
        body: &str,
        offset: u64,
        limit: Option<u64>,
        sorts: &[SortSpecification],
        projection: &[String],
    ) -> String {
        PagingSynthesizer::new(pseudo_column).synthesize(&PagingRequest {
            body,
            offset,
            limit,
            has_order_by: !sorts.is_empty(),
            projection,
        })
    }

    fn order_items(&mut self, sorts: &[SortSpecification]) -> Result<String> {
        let mut items = Vec::with_capacity(sorts.len());
        for sort in sorts {
            let mark = self.bind_mark();
            let key = self.expr(&sort.expr)?;
            let (item, repeats) = self.sort_item(&key, sort);
            self.repeat_binds(mark, repeats);
            items.push(item);
        }
        Ok(items.join(", "))
    }

    /// One ORDER BY entry for an already rendered key, plus how many extra
    /// times the key text was emitted.
    fn sort_item(&self, key: &str, sort: &SortSpecification) -> (String, usize) {
        let direction = match sort.direction {
            SortDirection::Asc => "",
            SortDirection::Desc => " DESC",
        };
        let Some(nulls) = sort.null_ordering else {
            return (format!("{key}{direction}"), 0);
        };
        if self.translator.capabilities().supports_null_ordering {
            let nulls = match nulls {
                NullOrdering::First => "FIRST",
                NullOrdering::Last => "LAST",
            };
            return (format!("{key}{direction} NULLS {nulls}"), 0);
        }
        let (null_rank, value_rank) = match nulls {
            NullOrdering::First => (0, 1),
            NullOrdering::Last => (1, 0),
        };
        (
            format!("CASE WHEN {key} IS NULL THEN {null_rank} ELSE {value_rank} END, {key}{direction}"),
            1,
        )
    }

    fn table_ref(&mut self, table: &TableReference) -> Result<String> {
        match table {
            TableReference::Named { name, alias } => {
                let mut sql = self.quote_path(name);
                if let Some(alias) = alias {
                    sql.push(' ');
                    sql.push_str(&self.dialect().quote_ident(alias));
                }
                Ok(sql)
            }
            TableReference::Derived { query, alias } => Ok(format!(
                "({}) {}",
                self.query(query)?,
                self.dialect().quote_ident(alias)
            )),
            TableReference::Join {
                left,
                right,
                join_type,
                condition,
            } => {
                let left = self.table_ref(left)?;
                let rendered_right = self.table_ref(right)?;
                let right = match right.as_ref() {
                    TableReference::Join { .. } => format!("({rendered_right})"),
                    _ => rendered_right,
                };
                let mut sql = format!("{left} {} {right}", join_type.as_sql());
                if let Some(condition) = condition {
                    sql.push_str(&format!(" ON {}", self.criteria(condition)?));
                }
                Ok(sql)
            }
        }
    }

    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|column| self.dialect().quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn insert(&mut self, insert: &Insert) -> Result<String> {
        let mut sql = format!("INSERT INTO {}", self.quote_path(&insert.table));
        if !insert.columns.is_empty() {
            sql.push_str(&format!(" ({})", self.column_list(&insert.columns)));
        }
        match &insert.source {
            InsertSource::Values { values } => {
                if values.is_empty() {
                    return Err(SqlshimError::InvalidCommand(format!(
                        "insert into {} has no values",
                        insert.table
                    )));
                }
                if !insert.columns.is_empty() && values.len() != insert.columns.len() {
                    return Err(SqlshimError::InvalidCommand(format!(
                        "insert into {} names {} columns but supplies {} values",
                        insert.table,
                        insert.columns.len(),
                        values.len()
                    )));
                }
                let values = values
                    .iter()
                    .map(|value| self.expr(value))
                    .collect::<Result<Vec<_>>>()?;
                sql.push_str(&format!(" VALUES ({})", values.join(", ")));
            }
            InsertSource::Query { query } => {
                sql.push(' ');
                sql.push_str(&self.query(query)?);
            }
        }
        Ok(sql)
    }

    fn update(&mut self, update: &Update) -> Result<String> {
        if update.set.is_empty() {
            return Err(SqlshimError::InvalidCommand(format!(
                "update of {} sets no columns",
                update.table
            )));
        }
        let mut assignments = Vec::with_capacity(update.set.len());
        for clause in &update.set {
            let value = self.expr(&clause.value)?;
            assignments.push(format!(
                "{} = {value}",
                self.dialect().quote_ident(&clause.column)
            ));
        }
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.quote_path(&update.table),
            assignments.join(", ")
        );
        if let Some(criteria) = &update.criteria {
            sql.push_str(&format!(" WHERE {}", self.criteria(criteria)?));
        }
        Ok(sql)
    }

    fn delete(&mut self, delete: &Delete) -> Result<String> {
        let mut sql = format!("DELETE FROM {}", self.quote_path(&delete.table));
        if let Some(criteria) = &delete.criteria {
            sql.push_str(&format!(" WHERE {}", self.criteria(criteria)?));
        }
        Ok(sql)
    }

    fn batch(&mut self, batch: &BatchedUpdates) -> Result<String> {
        if batch.commands.is_empty() {
            return Err(SqlshimError::InvalidCommand("empty batch".to_string()));
        }
        let mut statements = Vec::with_capacity(batch.commands.len());
        for command in &batch.commands {
            if matches!(command, Command::BatchedUpdates(_)) {
                return Err(SqlshimError::InvalidCommand(
                    "batches cannot be nested".to_string(),
                ));
            }
            statements.push(self.command(command)?);
        }
        Ok(self.dialect().render_batch(&statements))
    }
}

fn offset_fetch(offset: u64, limit: Option<u64>) -> String {
    let mut sql = String::new();
    if offset > 0 {
        sql.push_str(&format!(" OFFSET {offset} ROWS"));
    }
    if let Some(limit) = limit {
        sql.push_str(&format!(" FETCH NEXT {limit} ROWS ONLY"));
    }
    sql
}

fn with_order_by(body: String, order: &str) -> String {
    if order.is_empty() {
        body
    } else {
        format!("{body} ORDER BY {order}")
    }
}
