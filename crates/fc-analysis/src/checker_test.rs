use super::*;
use crate::test_utils::*;

#[test]
fn test_equal_frames_have_no_errors() {
    let declared = schema("{id: Int64, name: Utf8?}");
    let inferred = schema("{name: Utf8?, id: Int64}");
    assert!(compare(&declared, &inferred).is_empty());
    assert_eq!(check_return(Some(&declared), &inferred), CheckOutcome::Matched);
}

#[test]
fn test_missing_and_extra_columns() {
    let declared = schema("{id: Int64, email: Utf8}");
    let inferred = schema("{id: Int64, name: Utf8}");
    assert_eq!(
        compare(&declared, &inferred),
        vec![
            TypeError::MissingColumn {
                column: "email".to_string(),
                missing_from: SchemaSide::Inferred
            },
            TypeError::MissingColumn {
                column: "name".to_string(),
                missing_from: SchemaSide::Declared
            },
        ]
    );
}

#[test]
fn test_nullability_difference_is_a_mismatch() {
    let declared = schema("{age: Int64}");
    let inferred = schema("{age: Int64?}");
    assert_eq!(
        compare(&declared, &inferred),
        vec![TypeError::ColumnTypeMismatch {
            column: "age".to_string(),
            expected: int64(),
            actual: int64().to_nullable()
        }]
    );
}

#[test]
fn test_compare_is_symmetric_in_error_count() {
    let pairs = [
        ("{a: Int64}", "{a: Int64, b: Utf8}"),
        ("{a: Int64?}", "{a: Int64}"),
        ("{a: Int64, b: Utf8}", "{b: Float64, c: Boolean}"),
        ("{}", "{}"),
    ];
    for (x, y) in pairs {
        let (x, y) = (schema(x), schema(y));
        assert_eq!(compare(&x, &y).len(), compare(&y, &x).len());
        assert_eq!(compare(&x, &y).is_empty(), x == y);
    }
}

#[test]
fn test_unannotated_carries_inferred() {
    let inferred = schema("{id: Int64}");
    assert_eq!(
        check_return(None, &inferred),
        CheckOutcome::Unannotated(inferred.clone())
    );
}

#[test]
fn test_mismatched_outcome() {
    let declared = schema("{id: Int64}");
    let inferred = schema("{id: Utf8}");
    match check_return(Some(&declared), &inferred) {
        CheckOutcome::Mismatched(errors) => assert_eq!(errors.len(), 1),
        other => panic!("expected mismatch, got {:?}", other),
    }
}

#[test]
fn test_assignable_allows_extra_columns_and_subtypes() {
    let expected = schema("{id: Int64, name: Utf8?}");
    let actual = schema("{id: Int64, name: Utf8, extra: Boolean}");
    assert!(check_assignable(&expected, &actual).is_empty());
}

#[test]
fn test_assignable_rejects_nullable_for_non_null() {
    let expected = schema("{value: Float64}");
    let actual = schema("{value: Float64?}");
    let errors = check_assignable(&expected, &actual);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), "FT010");
}

#[test]
fn test_assignable_reports_missing_columns() {
    let expected = schema("{id: Int64, email: Utf8}");
    let actual = schema("{id: Int64}");
    assert_eq!(
        check_assignable(&expected, &actual),
        vec![TypeError::MissingColumn {
            column: "email".to_string(),
            missing_from: SchemaSide::Inferred
        }]
    );
}

#[test]
fn test_row_tail_difference_is_reported() {
    use crate::frame::{Column, RowTail, RowVar};

    let declared = schema("{id: Int64}");
    let inferred = FrameType::with_rest(
        vec![Column::new("id", int64())],
        RowTail::Open(RowVar("r".to_string())),
    )
    .unwrap();
    let errors = compare(&declared, &inferred);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), "FT019");
    assert_eq!(
        errors[0].to_string(),
        "[FT019] Row tail mismatch: declared {id: Int64} but inferred {id: Int64, ..r}"
    );
}
