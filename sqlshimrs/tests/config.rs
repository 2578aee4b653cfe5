//! Configuration files drive translator construction.

mod common;

use std::io::Write;

use common::*;
use sqlshim::{DialectKind, PagingStrategy, PseudoColumn, SqlshimConfig, SqlshimError, Translator};

#[test]
fn loads_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[defaults]
dialect = "ansi"
use_bind_variables = true

[datasources.reporting]
database_version = "2003"
use_bind_variables = false
max_in_criteria_size = 2
"#
    )
    .unwrap();

    let cfg = SqlshimConfig::from_file(file.path()).unwrap();
    assert_eq!(cfg.defaults.dialect, DialectKind::Ansi);

    let reporting = cfg.for_datasource("reporting");
    assert_eq!(reporting.dialect, DialectKind::Ansi);
    let translator = Translator::from_config(&reporting).unwrap();
    assert!(!translator.use_bind_variables());
    assert_eq!(
        translator.capabilities().paging,
        PagingStrategy::Emulated(PseudoColumn::RowNumber)
    );

    let select = select_from_t(&["x"]).filter(sqlshim::Criteria::in_list(
        int_col("t", "x"),
        (1..=3).map(sqlshim::Expression::integer).collect(),
        false,
    ));
    assert_eq!(
        sql(&translator, select),
        "SELECT t.x FROM t WHERE (t.x IN (1, 2) OR t.x IN (3))"
    );
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SqlshimConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, SqlshimError::Config(_)));
}

#[test]
fn bad_version_fails_at_construction() {
    let cfg = SqlshimConfig::from_toml(
        r#"
[datasources.broken]
dialect = "ansi"
database_version = "latest"
"#,
    )
    .unwrap();
    let err = Translator::from_config(&cfg.for_datasource("broken")).unwrap_err();
    assert!(matches!(err, SqlshimError::Config(_)));
}

#[cfg(feature = "sybase")]
#[test]
fn datasource_selects_dialect_and_zone() {
    let cfg = SqlshimConfig::from_toml(
        r#"
[datasources.legacy_ase]
dialect = "sybase"
database_version = "15.5"
database_time_zone = "-05:00"
"#,
    )
    .unwrap();
    let translator = Translator::from_config(&cfg.for_datasource("legacy_ase")).unwrap();
    assert_eq!(translator.dialect().kind(), DialectKind::Sybase);
    assert_eq!(translator.database_time_zone().local_minus_utc(), -5 * 3600);

    let ts = chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let expr = sqlshim::Expression::literal(sqlshim::Value::Timestamp(ts), sqlshim::DataType::Timestamp);
    assert_eq!(
        sql(&translator, select_expr(expr)),
        "SELECT CAST('2020-01-01 07:00:00.0' AS BIGDATETIME)"
    );
}
