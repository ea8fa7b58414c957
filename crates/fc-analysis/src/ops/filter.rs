//! Row filtering: checks the predicate, keeps the schema

use super::{unexpected_args, FrameOperation, Inferred, OperationArgs};
use crate::error::{InferResult, TypeError};
use crate::expr::{infer_expr, Expr};
use crate::frame::FrameType;
use crate::tables::InferenceTables;
use crate::types::TypeKind;

/// The predicate must be Boolean (nullable allowed); the output is the input
pub fn infer_filter(
    input: &FrameType,
    predicate: &Expr,
    tables: &InferenceTables,
) -> InferResult<FrameType> {
    let predicate_type = infer_expr(predicate, input, tables)?;
    if *predicate_type.kind() != TypeKind::Boolean {
        return Err(TypeError::TypeMismatch {
            op: "filter".to_string(),
            left: predicate_type,
            right: None,
        });
    }
    Ok(input.clone())
}

/// `filter` operation
pub struct Filter;

impl FrameOperation for Filter {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn arity(&self) -> usize {
        1
    }

    fn infer(
        &self,
        inputs: &[FrameType],
        args: &OperationArgs,
        tables: &InferenceTables,
    ) -> InferResult<Inferred> {
        match (inputs, args) {
            ([input], OperationArgs::Predicate(predicate)) => {
                infer_filter(input, predicate, tables).map(Inferred::frame)
            }
            _ => Err(unexpected_args(self.name(), args)),
        }
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
