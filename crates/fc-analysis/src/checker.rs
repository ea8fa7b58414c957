//! Structural comparison of declared and inferred frame types

use crate::error::{SchemaSide, TypeError};
use crate::frame::FrameType;

/// Result of checking one return point
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Declared and inferred types are equal
    Matched,
    /// The types differ; one error per differing column
    Mismatched(Vec<TypeError>),
    /// Nothing was declared; carries the inferred type as information
    Unannotated(FrameType),
}

/// Compare a declared frame type with an inferred one.
///
/// Returns no errors iff the two are equal. Columns are reported in
/// declared order, then inferred-only columns in inferred order.
pub fn compare(declared: &FrameType, inferred: &FrameType) -> Vec<TypeError> {
    let mut errors = Vec::new();

    for col in declared.columns() {
        match inferred.column_type(&col.name) {
            None => errors.push(TypeError::MissingColumn {
                column: col.name.clone(),
                missing_from: SchemaSide::Inferred,
            }),
            Some(actual) if *actual != col.data_type => {
                errors.push(TypeError::ColumnTypeMismatch {
                    column: col.name.clone(),
                    expected: col.data_type.clone(),
                    actual: actual.clone(),
                })
            }
            Some(_) => {}
        }
    }

    for col in inferred.columns() {
        if !declared.contains(&col.name) {
            errors.push(TypeError::MissingColumn {
                column: col.name.clone(),
                missing_from: SchemaSide::Declared,
            });
        }
    }

    if errors.is_empty() && declared.rest() != inferred.rest() {
        errors.push(TypeError::RowTailMismatch {
            declared: declared.clone(),
            inferred: inferred.clone(),
        });
    }

    errors
}

/// Check a return point against an optional declaration
pub fn check_return(declared: Option<&FrameType>, inferred: &FrameType) -> CheckOutcome {
    match declared {
        None => CheckOutcome::Unannotated(inferred.clone()),
        Some(declared) => {
            let errors = compare(declared, inferred);
            if errors.is_empty() {
                CheckOutcome::Matched
            } else {
                CheckOutcome::Mismatched(errors)
            }
        }
    }
}

/// Check that `actual` can be passed where `expected` is required.
///
/// Extra columns in `actual` are allowed; every expected column must be
/// present with a subtype of the expected type.
pub fn check_assignable(expected: &FrameType, actual: &FrameType) -> Vec<TypeError> {
    let mut errors = Vec::new();
    for col in expected.columns() {
        match actual.column_type(&col.name) {
            None => errors.push(TypeError::MissingColumn {
                column: col.name.clone(),
                missing_from: SchemaSide::Inferred,
            }),
            Some(actual_type) if !actual_type.is_subtype_of(&col.data_type) => {
                errors.push(TypeError::ColumnTypeMismatch {
                    column: col.name.clone(),
                    expected: col.data_type.clone(),
                    actual: actual_type.clone(),
                })
            }
            Some(_) => {}
        }
    }
    errors
}

#[cfg(test)]
#[path = "checker_test.rs"]
mod tests;
