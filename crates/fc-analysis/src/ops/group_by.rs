//! Group-by/aggregate inference

use super::{unexpected_args, FrameOperation, Inferred, OperationArgs};
use crate::error::{FrameSide, InferResult, TypeError};
use crate::expr::{infer_aggregation, infer_expr, Expr};
use crate::frame::{Column, FrameType};
use crate::tables::InferenceTables;

/// One aggregation: a function applied to an operand, with an optional alias
#[derive(Debug, Clone, PartialEq)]
pub struct AggSpec {
    pub function: String,
    pub operand: Expr,
    pub alias: Option<String>,
}

impl AggSpec {
    pub fn new(function: impl Into<String>, operand: Expr, alias: Option<&str>) -> Self {
        Self {
            function: function.into(),
            operand,
            alias: alias.map(str::to_string),
        }
    }

    /// Name used when no alias is given: `{column}_{function}`, or the
    /// function name alone when the operand references no column
    pub fn default_name(&self) -> String {
        match self.operand.root_column() {
            Some(column) => format!("{}_{}", column, self.function),
            None => self.function.clone(),
        }
    }

    /// Build a spec from an aggregation expression, optionally aliased
    pub fn from_expr(expr: &Expr) -> InferResult<Self> {
        let alias = expr.alias_name();
        match expr.unaliased() {
            Expr::Agg { function, expr } => Ok(Self::new(function.clone(), (**expr).clone(), alias)),
            _ => Err(TypeError::InvalidExpression {
                message: format!(
                    "group_by aggregation '{}' is not an aggregation call",
                    expr.output_name()
                ),
            }),
        }
    }
}

/// Infer the frame type of a group-by followed by aggregations.
///
/// Keys keep their exact input type. Unaliased aggregations get a default
/// name and a `MissingAlias` advisory.
pub fn infer_groupby_agg(
    input: &FrameType,
    keys: &[String],
    aggs: &[AggSpec],
    tables: &InferenceTables,
) -> InferResult<Inferred> {
    let mut columns = Vec::with_capacity(keys.len() + aggs.len());
    let mut advisories = Vec::new();

    for key in keys {
        let col = input
            .find_column(key)
            .ok_or_else(|| TypeError::UnknownColumn {
                column: key.clone(),
                frame: FrameSide::Input,
            })?;
        columns.push(col.clone());
    }

    for agg in aggs {
        let operand = infer_expr(&agg.operand, input, tables)?;
        let data_type = infer_aggregation(&agg.function, &operand, tables)?;
        let name = match &agg.alias {
            Some(alias) => alias.clone(),
            None => {
                let default_name = agg.default_name();
                advisories.push(TypeError::MissingAlias {
                    function: agg.function.clone(),
                    default_name: default_name.clone(),
                });
                default_name
            }
        };
        columns.push(Column::new(name, data_type));
    }

    let frame = FrameType::new(columns)?;
    Ok(Inferred { frame, advisories })
}

/// Single-input group-by/aggregate operation
pub struct GroupBy;

impl FrameOperation for GroupBy {
    fn name(&self) -> &'static str {
        "group_by"
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
            ([input], OperationArgs::GroupBy { keys, aggs }) => {
                infer_groupby_agg(input, keys, aggs, tables)
            }
            _ => Err(unexpected_args(self.name(), args)),
        }
    }
}

#[cfg(test)]
#[path = "group_by_test.rs"]
mod tests;
