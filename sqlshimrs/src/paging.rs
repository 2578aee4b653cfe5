//! Row-limit emulation through nested subqueries.
//!
//! Dialects without a native LIMIT/OFFSET clause page over a pseudo-column:
//! Oracle's `ROWNUM` or a `ROW_NUMBER()` window. The identifiers
//! `VIEW_FOR_LIMIT` and `ROWNUM_` are part of the generated SQL contract.

use crate::capabilities::PseudoColumn;

pub const VIEW_FOR_LIMIT: &str = "VIEW_FOR_LIMIT";
pub const ROWNUM_ALIAS: &str = "ROWNUM_";

/// A fully rendered query body plus the window to cut out of it.
#[derive(Debug, Clone, Copy)]
pub struct PagingRequest<'a> {
    pub body: &'a str,
    pub offset: u64,
    pub limit: Option<u64>,
    /// The body is ordered; the emulation must keep that order.
    pub has_order_by: bool,
    /// Column aliases the outer query projects (window form only).
    pub projection: &'a [String],
}

#[derive(Debug, Clone, Copy)]
pub struct PagingSynthesizer {
    pseudo_column: PseudoColumn,
}

impl PagingSynthesizer {
    pub fn new(pseudo_column: PseudoColumn) -> Self {
        Self { pseudo_column }
    }

    pub fn pseudo_column(&self) -> PseudoColumn {
        self.pseudo_column
    }

    /// Highest row number kept, `offset + limit` saturated at `u64::MAX`.
    pub fn upper_bound(offset: u64, limit: Option<u64>) -> Option<u64> {
        limit.map(|limit| offset.saturating_add(limit))
    }

    /// Select item numbering the rows of the inner query in window form.
    pub fn row_number_column(order_by: &str) -> String {
        if order_by.is_empty() {
            format!("ROW_NUMBER() OVER () AS {ROWNUM_ALIAS}")
        } else {
            format!("ROW_NUMBER() OVER (ORDER BY {order_by}) AS {ROWNUM_ALIAS}")
        }
    }

    pub fn synthesize(&self, request: &PagingRequest<'_>) -> String {
        match self.pseudo_column {
            PseudoColumn::Rownum => Self::rownum(request),
            PseudoColumn::RowNumber => Self::window(request),
        }
    }

    fn rownum(request: &PagingRequest<'_>) -> String {
        let body = request.body;
        let bound = Self::upper_bound(request.offset, request.limit);
        if request.offset == 0 {
            return match bound {
                Some(bound) => format!("SELECT * FROM ({body}) WHERE ROWNUM <= {bound}"),
                None => body.to_string(),
            };
        }
        let mut inner = format!(
            "SELECT {VIEW_FOR_LIMIT}.*, ROWNUM {ROWNUM_ALIAS} FROM ({body}) {VIEW_FOR_LIMIT}"
        );
        if let Some(bound) = bound {
            inner.push_str(&format!(" WHERE ROWNUM <= {bound}"));
        }
        format!(
            "SELECT * FROM ({inner}) WHERE {ROWNUM_ALIAS} > {}",
            request.offset
        )
    }

    fn window(request: &PagingRequest<'_>) -> String {
        let columns = if request.projection.is_empty() {
            "*".to_string()
        } else {
            request.projection.join(", ")
        };
        let mut sql = format!(
            "SELECT {columns} FROM ({}) {VIEW_FOR_LIMIT} WHERE {ROWNUM_ALIAS} > {}",
            request.body, request.offset
        );
        if let Some(bound) = Self::upper_bound(request.offset, request.limit) {
            sql.push_str(&format!(" AND {ROWNUM_ALIAS} <= {bound}"));
        }
        if request.has_order_by {
            sql.push_str(&format!(" ORDER BY {ROWNUM_ALIAS}"));
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(body: &'a str, offset: u64, limit: Option<u64>) -> PagingRequest<'a> {
        PagingRequest {
            body,
            offset,
            limit,
            has_order_by: false,
            projection: &[],
        }
    }

    #[test]
    fn rownum_with_offset_nests_twice() {
        let paging = PagingSynthesizer::new(PseudoColumn::Rownum);
        assert_eq!(
            paging.synthesize(&request("SELECT t.x FROM t", 50, Some(100))),
            "SELECT * FROM (SELECT VIEW_FOR_LIMIT.*, ROWNUM ROWNUM_ FROM (SELECT t.x FROM t) VIEW_FOR_LIMIT WHERE ROWNUM <= 150) WHERE ROWNUM_ > 50"
        );
    }

    #[test]
    fn rownum_without_offset_nests_once() {
        let paging = PagingSynthesizer::new(PseudoColumn::Rownum);
        assert_eq!(
            paging.synthesize(&request("SELECT t.x FROM t ORDER BY t.x", 0, Some(10))),
            "SELECT * FROM (SELECT t.x FROM t ORDER BY t.x) WHERE ROWNUM <= 10"
        );
    }

    #[test]
    fn rownum_offset_only_has_no_upper_bound() {
        let paging = PagingSynthesizer::new(PseudoColumn::Rownum);
        assert_eq!(
            paging.synthesize(&request("SELECT t.x FROM t", 5, None)),
            "SELECT * FROM (SELECT VIEW_FOR_LIMIT.*, ROWNUM ROWNUM_ FROM (SELECT t.x FROM t) VIEW_FOR_LIMIT) WHERE ROWNUM_ > 5"
        );
    }

    #[test]
    fn window_form_projects_positional_aliases() {
        let paging = PagingSynthesizer::new(PseudoColumn::RowNumber);
        let projection = vec!["c_0".to_string(), "c_1".to_string()];
        let body = format!(
            "SELECT t.a AS c_0, t.b AS c_1, {} FROM t",
            PagingSynthesizer::row_number_column("t.a")
        );
        let sql = paging.synthesize(&PagingRequest {
            body: &body,
            offset: 10,
            limit: Some(5),
            has_order_by: true,
            projection: &projection,
        });
        assert_eq!(
            sql,
            "SELECT c_0, c_1 FROM (SELECT t.a AS c_0, t.b AS c_1, ROW_NUMBER() OVER (ORDER BY t.a) AS ROWNUM_ FROM t) VIEW_FOR_LIMIT WHERE ROWNUM_ > 10 AND ROWNUM_ <= 15 ORDER BY ROWNUM_"
        );
    }

    #[test]
    fn bound_saturates_and_grows_with_limit() {
        assert_eq!(
            PagingSynthesizer::upper_bound(u64::MAX - 1, Some(10)),
            Some(u64::MAX)
        );
        let mut previous = 0;
        for limit in [1, 2, 10, 100, 1_000] {
            let bound = PagingSynthesizer::upper_bound(7, Some(limit)).unwrap();
            assert!(bound >= previous);
            assert_eq!(bound, 7 + limit);
            previous = bound;
        }
    }
}
