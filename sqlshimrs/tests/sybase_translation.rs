//! Sybase ASE translation: TOP paging, emulated predicates and orderings.
#![cfg(feature = "sybase")]

mod common;

use common::*;
use sqlshim::ast::{Criteria, Expression, NullOrdering, Select, SetOperator, SetQuery, SortSpecification};
use sqlshim::{DataType, DialectKind, SqlshimError, TranslatorConfig};

fn sybase() -> sqlshim::Translator {
    translator(DialectKind::Sybase)
}

fn old_sybase() -> sqlshim::Translator {
    translator_with(
        DialectKind::Sybase,
        TranslatorConfig {
            database_version: Some("12.5".to_string()),
            ..Default::default()
        },
    )
}

#[test]
fn limit_becomes_top() {
    let select = select_from_t(&["x"])
        .distinct()
        .order_by(SortSpecification::asc(int_col("t", "x")))
        .limit(10);
    assert_eq!(
        sql(&sybase(), select),
        "SELECT DISTINCT TOP 10 t.x FROM t ORDER BY t.x"
    );
}

#[test]
fn offsets_are_rejected() {
    let select = select_from_t(&["x"]).offset(5).limit(10);
    let err = sybase().translate(&select.into()).unwrap_err();
    match err {
        SqlshimError::UnsupportedConstruct { construct, fragment } => {
            assert_eq!(construct, "row offset");
            assert!(fragment.contains("LIMIT 5, 10"), "{fragment}");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn servers_before_15_0_2_cannot_limit() {
    let select = select_from_t(&["x"]).limit(1);
    let err = old_sybase().translate(&select.into()).unwrap_err();
    assert!(matches!(err, SqlshimError::UnsupportedConstruct { .. }));
    // without a limit the same server is fine
    assert_eq!(sql(&old_sybase(), select_from_t(&["x"])), "SELECT t.x FROM t");
}

#[test]
fn except_and_intersect_are_rejected() {
    for op in [SetOperator::Except, SetOperator::Intersect] {
        let set = SetQuery::new(op, select_from_t(&["a"]), select_from_t(&["b"]));
        let err = sybase().translate(&set.into()).unwrap_err();
        assert!(matches!(err, SqlshimError::UnsupportedConstruct { .. }));
    }
    let union = SetQuery::new(SetOperator::Union, select_from_t(&["a"]), select_from_t(&["b"])).all();
    assert_eq!(
        sql(&sybase(), union),
        "SELECT t.a FROM t UNION ALL SELECT t.b FROM t"
    );
}

#[test]
fn boolean_valued_predicates_become_case() {
    let flag = Expression::condition(Criteria::is_null(string_col("t", "s")));
    let select = Select::new([flag]).from_table("t");
    assert_eq!(
        sql(&sybase(), select),
        "SELECT CASE WHEN t.s IS NULL THEN 1 WHEN NOT (t.s IS NULL) THEN 0 END FROM t"
    );
}

#[test]
fn null_ordering_is_emulated_with_a_leading_key() {
    let select = select_from_t(&["x"])
        .order_by(SortSpecification::asc(int_col("t", "x")).nulls(NullOrdering::First))
        .order_by(SortSpecification::desc(int_col("t", "y")).nulls(NullOrdering::Last));
    assert_eq!(
        sql(&sybase(), select),
        "SELECT t.x FROM t ORDER BY CASE WHEN t.x IS NULL THEN 0 ELSE 1 END, t.x, CASE WHEN t.y IS NULL THEN 1 ELSE 0 END, t.y DESC"
    );
}

#[test]
fn concat_uses_plus_with_a_null_guard() {
    let concat = func(
        "concat",
        vec![string_col("t", "a"), string_col("t", "b")],
        DataType::String,
    );
    let select = Select::new([concat]).from_table("t");
    assert_eq!(
        sql(&sybase(), select),
        "SELECT CASE WHEN t.a IS NULL OR t.b IS NULL THEN NULL ELSE (t.a + t.b) END FROM t"
    );
}

#[test]
fn scalar_functions_are_rewritten() {
    let s = string_col("t", "s");
    let select = Select::new([
        func("mod", vec![int_col("t", "x"), Expression::integer(3)], DataType::Integer),
        func("locate", vec![Expression::string("."), s.clone()], DataType::Integer),
        func("ucase", vec![s.clone()], DataType::String),
        func("dayofmonth", vec![col("t", "d", DataType::Date)], DataType::Integer),
        func("now", vec![], DataType::Timestamp),
    ])
    .from_table("t");
    assert_eq!(
        sql(&sybase(), select),
        "SELECT (t.x % 3), charindex('.', t.s), upper(t.s), datepart(dd, t.d), getdate() FROM t"
    );
}

#[test]
fn locate_with_start_index_is_rejected() {
    let locate = func(
        "locate",
        vec![
            Expression::string("."),
            string_col("t", "s"),
            Expression::integer(1),
        ],
        DataType::Integer,
    );
    let err = sybase()
        .translate(&Select::new([locate]).from_table("t").into())
        .unwrap_err();
    assert!(matches!(err, SqlshimError::UnsupportedFunction { .. }));
}

#[test]
fn conversions_use_convert() {
    let select = Select::new([
        convert(string_col("t", "s"), "integer"),
        convert(int_col("t", "x"), "string"),
    ])
    .from_table("t");
    assert_eq!(
        sql(&sybase(), select),
        "SELECT convert(int, t.s), convert(varchar(40), t.x) FROM t"
    );
}

#[test]
fn no_dummy_table_without_from() {
    let select = select_expr(func("now", vec![], DataType::Timestamp));
    assert_eq!(sql(&sybase(), select), "SELECT getdate()");
}

#[test]
fn in_lists_split_at_250() {
    let values: Vec<Expression> = (0..251).map(Expression::integer).collect();
    let select = select_from_t(&["x"]).filter(Criteria::in_list(int_col("t", "x"), values, true));
    let rendered = sql(&sybase(), select);
    assert!(rendered.ends_with(", 249) AND t.x NOT IN (250))"), "{rendered}");
}

#[test]
fn temporal_conversions() {
    let select = Select::new([
        convert(col("t", "d", DataType::Date), "timestamp"),
        convert(col("t", "tm", DataType::Time), "timestamp"),
        convert(col("t", "ts", DataType::Timestamp), "date"),
        convert(col("t", "ts", DataType::Timestamp), "time"),
        convert(string_col("t", "s"), "date"),
        convert(string_col("t", "s"), "time"),
        convert(string_col("t", "s"), "timestamp"),
    ])
    .from_table("t");
    assert_eq!(
        sql(&sybase(), select.clone()),
        "SELECT convert(datetime, t.d), convert(datetime, '1970-01-01 ' + convert(varchar(8), t.tm, 108)), convert(date, t.ts), convert(time, t.ts), convert(date, t.s, 23), convert(time, t.s, 108), convert(datetime, t.s, 140) FROM t"
    );

    let bigdatetime = translator_with(
        DialectKind::Sybase,
        TranslatorConfig {
            database_version: Some("15.5".to_string()),
            ..Default::default()
        },
    );
    assert_eq!(
        sql(&bigdatetime, select),
        "SELECT convert(bigdatetime, t.d), convert(bigdatetime, '1970-01-01 ' + convert(varchar(8), t.tm, 108)), convert(date, t.ts), convert(time, t.ts), convert(date, t.s, 23), convert(time, t.s, 108), convert(bigdatetime, t.s, 140) FROM t"
    );
}

#[test]
fn aggregates_outside_the_dialect_are_rejected() {
    let median = Expression::aggregate("median", false, Some(int_col("t", "x")), DataType::Double);
    let err = sybase()
        .translate(&Select::new([median]).from_table("t").into())
        .unwrap_err();
    match err {
        SqlshimError::UnsupportedFunction { name, .. } => assert_eq!(name, "median"),
        other => panic!("unexpected error {other}"),
    }

    let count = Expression::aggregate("count_big", false, None, DataType::Long);
    assert_eq!(
        sql(&sybase(), Select::new([count]).from_table("t")),
        "SELECT COUNT_BIG(*) FROM t"
    );
}
