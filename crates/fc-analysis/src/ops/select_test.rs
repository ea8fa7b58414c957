use super::*;
use crate::expr::{BinOp, Literal};
use crate::frame::{RowTail, RowVar};
use crate::test_utils::*;

fn input() -> FrameType {
    frame(&[
        ("id", int64()),
        ("value", float64()),
        ("label", utf8().to_nullable()),
    ])
}

#[test]
fn test_select_projects_in_order() {
    let out = infer_select(
        &input(),
        &[Expr::col("label"), Expr::col("id")],
        tables(),
    )
    .unwrap();
    assert_eq!(out.names().collect::<Vec<_>>(), vec!["label", "id"]);
    assert_eq!(out.column_type("label"), Some(&utf8().to_nullable()));
}

#[test]
fn test_select_derived_expression() {
    let doubled = Expr::binary(BinOp::Mul, Expr::col("value"), Expr::lit(Literal::Int(2)))
        .alias("doubled");
    let out = infer_select(&input(), &[Expr::col("id"), doubled], tables()).unwrap();
    assert_eq!(out, frame(&[("id", int64()), ("doubled", float64())]));
}

#[test]
fn test_select_duplicate_output_name() {
    let err = infer_select(
        &input(),
        &[Expr::col("id"), Expr::col("value").alias("id")],
        tables(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        TypeError::DuplicateColumn {
            column: "id".to_string()
        }
    );
}

#[test]
fn test_select_unknown_column() {
    let err = infer_select(&input(), &[Expr::col("missing")], tables()).unwrap_err();
    assert_eq!(err.code(), "FT002");
}

#[test]
fn test_with_columns_appends_and_replaces() {
    let out = infer_with_columns(
        &input(),
        &[
            Expr::Cast {
                expr: Box::new(Expr::col("id")),
                to: utf8(),
            }
            .alias("id"),
            Expr::binary(BinOp::Add, Expr::col("value"), Expr::col("value")).alias("twice"),
        ],
        tables(),
    )
    .unwrap();
    assert_eq!(
        out.names().collect::<Vec<_>>(),
        vec!["id", "value", "label", "twice"]
    );
    assert_eq!(out.column_type("id"), Some(&utf8()));
    assert_eq!(out.column_type("twice"), Some(&float64()));
}

#[test]
fn test_with_columns_sees_only_input() {
    let err = infer_with_columns(
        &input(),
        &[
            Expr::col("id").alias("copy"),
            Expr::col("copy").alias("copy2"),
        ],
        tables(),
    )
    .unwrap_err();
    assert_eq!(err.code(), "FT002");
}

#[test]
fn test_with_columns_keeps_open_tail() {
    let open = FrameType::with_rest(
        vec![Column::new("id", int64())],
        RowTail::Open(RowVar("r".to_string())),
    )
    .unwrap();
    let out = infer_with_columns(&open, &[Expr::col("id").alias("id2")], tables()).unwrap();
    assert!(!out.is_closed());

    let selected = infer_select(&open, &[Expr::col("id")], tables()).unwrap();
    assert!(selected.is_closed());
}
