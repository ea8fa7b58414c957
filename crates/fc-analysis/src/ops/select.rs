//! Column selection and derivation

use super::{unexpected_args, FrameOperation, Inferred, OperationArgs};
use crate::error::{InferResult, TypeError};
use crate::expr::{infer_expr, Expr};
use crate::frame::{Column, FrameType};
use crate::tables::InferenceTables;
use std::collections::HashSet;

/// Infer each expression's output column against `input`
fn infer_columns(
    input: &FrameType,
    exprs: &[Expr],
    tables: &InferenceTables,
) -> InferResult<Vec<Column>> {
    let mut seen = HashSet::with_capacity(exprs.len());
    let mut columns = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let name = expr.output_name();
        let data_type = infer_expr(expr, input, tables)?;
        if !seen.insert(name.clone()) {
            return Err(TypeError::DuplicateColumn { column: name });
        }
        columns.push(Column::new(name, data_type));
    }
    Ok(columns)
}

/// Output is exactly the selected expressions, in order
pub fn infer_select(
    input: &FrameType,
    exprs: &[Expr],
    tables: &InferenceTables,
) -> InferResult<FrameType> {
    FrameType::new(infer_columns(input, exprs, tables)?)
}

/// Input columns with derived columns replaced in place or appended.
///
/// Every expression is evaluated against the input frame, not against
/// columns derived earlier in the same call.
pub fn infer_with_columns(
    input: &FrameType,
    exprs: &[Expr],
    tables: &InferenceTables,
) -> InferResult<FrameType> {
    let derived = infer_columns(input, exprs, tables)?;

    let mut columns: Vec<Column> = input.columns().to_vec();
    for col in derived {
        match columns.iter_mut().find(|c| c.name == col.name) {
            Some(existing) => existing.data_type = col.data_type,
            None => columns.push(col),
        }
    }
    FrameType::with_rest(columns, input.rest().clone())
}

/// `select` operation
pub struct Select;

impl FrameOperation for Select {
    fn name(&self) -> &'static str {
        "select"
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
            ([input], OperationArgs::Exprs(exprs)) => {
                infer_select(input, exprs, tables).map(Inferred::frame)
            }
            _ => Err(unexpected_args(self.name(), args)),
        }
    }
}

/// `with_columns` operation
pub struct WithColumns;

impl FrameOperation for WithColumns {
    fn name(&self) -> &'static str {
        "with_columns"
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
            ([input], OperationArgs::Exprs(exprs)) => {
                infer_with_columns(input, exprs, tables).map(Inferred::frame)
            }
            _ => Err(unexpected_args(self.name(), args)),
        }
    }
}

#[cfg(test)]
#[path = "select_test.rs"]
mod tests;
