use super::*;
use crate::frame::{RowTail, RowVar};
use crate::test_utils::*;

fn users() -> FrameType {
    frame(&[
        ("user_id", int64()),
        ("name", utf8()),
        ("country", utf8().to_nullable()),
    ])
}

fn orders() -> FrameType {
    frame(&[
        ("order_id", int64()),
        ("user_id", int64()),
        ("amount", float64()),
    ])
}

fn join(kind: JoinKind) -> FrameType {
    infer_join(&users(), &orders(), &[JoinKey::same("user_id")], kind).unwrap()
}

#[test]
fn test_inner_join_keeps_types() {
    let joined = join(JoinKind::Inner);
    assert_eq!(
        joined,
        frame(&[
            ("user_id", int64()),
            ("name", utf8()),
            ("country", utf8().to_nullable()),
            ("order_id", int64()),
            ("amount", float64()),
        ])
    );
    assert_eq!(
        joined.names().collect::<Vec<_>>(),
        vec!["user_id", "name", "country", "order_id", "amount"]
    );
}

#[test]
fn test_left_join_makes_right_nullable() {
    let joined = join(JoinKind::Left);
    assert_eq!(joined.column_type("user_id"), Some(&int64()));
    assert_eq!(joined.column_type("name"), Some(&utf8()));
    assert_eq!(joined.column_type("order_id"), Some(&int64().to_nullable()));
    assert_eq!(joined.column_type("amount"), Some(&float64().to_nullable()));
}

#[test]
fn test_right_join_makes_left_nullable() {
    let joined = join(JoinKind::Right);
    assert_eq!(joined.column_type("user_id"), Some(&int64()));
    assert_eq!(joined.column_type("name"), Some(&utf8().to_nullable()));
    assert_eq!(joined.column_type("order_id"), Some(&int64()));
}

#[test]
fn test_full_join_makes_everything_nullable() {
    let joined = join(JoinKind::Full);
    for col in joined.columns() {
        assert!(col.data_type.is_nullable(), "{} should be nullable", col.name);
    }
}

#[test]
fn test_right_key_type_kept_for_right_join() {
    let left = frame(&[("k", int64().to_nullable())]);
    let right = frame(&[("k", int64()), ("v", utf8())]);
    let joined = infer_join(&left, &right, &[JoinKey::same("k")], JoinKind::Right).unwrap();
    assert_eq!(joined.column_type("k"), Some(&int64()));

    let joined = infer_join(&left, &right, &[JoinKey::same("k")], JoinKind::Inner).unwrap();
    assert_eq!(joined.column_type("k"), Some(&int64().to_nullable()));
}

#[test]
fn test_differently_named_keys_drop_right_key() {
    let left = frame(&[("id", int64()), ("name", utf8())]);
    let right = frame(&[("customer_id", int64()), ("total", float64())]);
    let joined = infer_join(
        &left,
        &right,
        &[JoinKey::pair("id", "customer_id")],
        JoinKind::Inner,
    )
    .unwrap();
    assert_eq!(joined.names().collect::<Vec<_>>(), vec!["id", "name", "total"]);
}

#[test]
fn test_overlapping_non_key_column_is_suffixed() {
    let left = frame(&[("id", int64()), ("name", utf8())]);
    let right = frame(&[("id", int64()), ("name", utf8())]);
    let joined = infer_join(&left, &right, &[JoinKey::same("id")], JoinKind::Left).unwrap();
    assert_eq!(
        joined.column_type(&format!("name{}", JOIN_SUFFIX)),
        Some(&utf8().to_nullable())
    );
    assert_eq!(joined.column_type("name"), Some(&utf8()));
}

#[test]
fn test_suffix_collision_is_duplicate_column() {
    let left = frame(&[("id", int64()), ("v", utf8()), ("v_right", utf8())]);
    let right = frame(&[("id", int64()), ("v", utf8())]);
    let err = infer_join(&left, &right, &[JoinKey::same("id")], JoinKind::Inner).unwrap_err();
    assert_eq!(
        err,
        TypeError::DuplicateColumn {
            column: "v_right".to_string()
        }
    );
}

#[test]
fn test_missing_key_reports_side() {
    let err = infer_join(&users(), &orders(), &[JoinKey::same("name")], JoinKind::Inner)
        .unwrap_err();
    assert_eq!(
        err,
        TypeError::UnknownColumn {
            column: "name".to_string(),
            frame: FrameSide::Right
        }
    );

    let err = infer_join(&users(), &orders(), &[JoinKey::same("order_id")], JoinKind::Inner)
        .unwrap_err();
    assert_eq!(
        err,
        TypeError::UnknownColumn {
            column: "order_id".to_string(),
            frame: FrameSide::Left
        }
    );
}

#[test]
fn test_key_kind_mismatch_for_every_join_kind() {
    let left = frame(&[("id", int64())]);
    let right = frame(&[("id", utf8())]);
    for kind in [JoinKind::Inner, JoinKind::Left, JoinKind::Right, JoinKind::Full] {
        let err = infer_join(&left, &right, &[JoinKey::same("id")], kind).unwrap_err();
        assert_eq!(err.code(), "FT005", "{}", kind);
    }
}

#[test]
fn test_key_nullability_difference_is_allowed() {
    let left = frame(&[("id", int64())]);
    let right = frame(&[("id", int64().to_nullable())]);
    assert!(infer_join(&left, &right, &[JoinKey::same("id")], JoinKind::Inner).is_ok());
}

#[test]
fn test_no_keys_is_invalid() {
    let err = infer_join(&users(), &orders(), &[], JoinKind::Inner).unwrap_err();
    assert_eq!(err.code(), "FT017");
}

#[test]
fn test_open_tail_propagates() {
    let open = FrameType::with_rest(
        vec![Column::new("id", int64())],
        RowTail::Open(RowVar("r".to_string())),
    )
    .unwrap();
    let right = frame(&[("id", int64())]);
    let joined = infer_join(&open, &right, &[JoinKey::same("id")], JoinKind::Inner).unwrap();
    assert!(!joined.is_closed());
}

#[test]
fn test_operation_rejects_wrong_args() {
    let err = Join
        .infer(
            &[users(), orders()],
            &OperationArgs::Exprs(vec![]),
            tables(),
        )
        .unwrap_err();
    assert_eq!(err.code(), "FT017");
}
