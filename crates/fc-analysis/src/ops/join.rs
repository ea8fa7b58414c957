//! Join inference with nullability semantics

use super::{unexpected_args, FrameOperation, Inferred, OperationArgs};
use crate::error::{FrameSide, InferResult, TypeError};
use crate::frame::{Column, FrameType};
use crate::tables::InferenceTables;
use crate::types::DataType;
use std::collections::HashSet;
use std::fmt;

/// Suffix appended to right-side non-key columns whose name is already taken
pub const JOIN_SUFFIX: &str = "_right";

/// Join kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Inner join
    Inner,
    /// Left outer join
    Left,
    /// Right outer join
    Right,
    /// Full outer join
    Full,
}

impl JoinKind {
    fn left_nullable(self) -> bool {
        matches!(self, JoinKind::Right | JoinKind::Full)
    }

    fn right_nullable(self) -> bool {
        matches!(self, JoinKind::Left | JoinKind::Full)
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "inner"),
            JoinKind::Left => write!(f, "left"),
            JoinKind::Right => write!(f, "right"),
            JoinKind::Full => write!(f, "full"),
        }
    }
}

/// A pair of columns matched by a join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKey {
    pub left: String,
    pub right: String,
}

impl JoinKey {
    /// Key with the same column name on both sides
    pub fn same(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            left: name.clone(),
            right: name,
        }
    }

    pub fn pair(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

fn key_type<'a>(frame: &'a FrameType, column: &str, side: FrameSide) -> InferResult<&'a DataType> {
    frame
        .column_type(column)
        .ok_or_else(|| TypeError::UnknownColumn {
            column: column.to_string(),
            frame: side,
        })
}

/// Infer the frame type of a join.
///
/// Keys are validated (existence on each side, then kind equality
/// ignoring nullability) before any output is built. Output columns are
/// the left columns followed by the right non-key columns; right key
/// columns are dropped.
pub fn infer_join(
    left: &FrameType,
    right: &FrameType,
    keys: &[JoinKey],
    kind: JoinKind,
) -> InferResult<FrameType> {
    if keys.is_empty() {
        return Err(TypeError::InvalidExpression {
            message: "join needs at least one key".to_string(),
        });
    }

    let mut key_types = Vec::with_capacity(keys.len());
    for key in keys {
        let left_type = key_type(left, &key.left, FrameSide::Left)?;
        let right_type = key_type(right, &key.right, FrameSide::Right)?;
        key_types.push((key, left_type, right_type));
    }
    for (key, left_type, right_type) in &key_types {
        if !left_type.same_kind(right_type) {
            return Err(TypeError::JoinKeyTypeMismatch {
                left_key: key.left.clone(),
                right_key: key.right.clone(),
                left: (*left_type).clone(),
                right: (*right_type).clone(),
            });
        }
    }

    let right_keys: HashSet<&str> = keys.iter().map(|k| k.right.as_str()).collect();

    let mut columns = Vec::with_capacity(left.len() + right.len());
    for col in left.columns() {
        let data_type = merged_key_type(&col.name, &key_types, kind)
            .unwrap_or_else(|| col.data_type.clone().or_nullable(kind.left_nullable()));
        columns.push(Column::new(col.name.clone(), data_type));
    }

    for col in right.columns() {
        if right_keys.contains(col.name.as_str()) {
            continue;
        }
        let name = if left.contains(&col.name) {
            log::debug!(
                "join: renaming right column '{}' to '{}{}'",
                col.name,
                col.name,
                JOIN_SUFFIX
            );
            format!("{}{}", col.name, JOIN_SUFFIX)
        } else {
            col.name.clone()
        };
        columns.push(Column::new(
            name,
            col.data_type.clone().or_nullable(kind.right_nullable()),
        ));
    }

    FrameType::with_rest(columns, left.rest().union(right.rest()))
}

/// Type of a merged key column: the kept side's key, nullable for full joins.
///
/// Returns `None` when `left_name` is not a left key.
fn merged_key_type(
    left_name: &str,
    key_types: &[(&JoinKey, &DataType, &DataType)],
    kind: JoinKind,
) -> Option<DataType> {
    let mut merged: Option<DataType> = None;
    for (key, left_type, right_type) in key_types {
        if key.left != left_name {
            continue;
        }
        let candidate = match kind {
            JoinKind::Inner | JoinKind::Left => (*left_type).clone(),
            JoinKind::Right => (*right_type).clone(),
            JoinKind::Full => left_type.to_nullable(),
        };
        // A left column used by several key pairs is nullable if any pairing is
        merged = Some(match merged {
            Some(current) => current.or_nullable(candidate.is_nullable()),
            None => candidate,
        });
    }
    merged
}

/// Two-input join operation
pub struct Join;

impl FrameOperation for Join {
    fn name(&self) -> &'static str {
        "join"
    }

    fn arity(&self) -> usize {
        2
    }

    fn infer(
        &self,
        inputs: &[FrameType],
        args: &OperationArgs,
        _tables: &InferenceTables,
    ) -> InferResult<Inferred> {
        match (inputs, args) {
            ([left, right], OperationArgs::Join { keys, kind }) => {
                infer_join(left, right, keys, *kind).map(Inferred::frame)
            }
            _ => Err(unexpected_args(self.name(), args)),
        }
    }
}

#[cfg(test)]
#[path = "join_test.rs"]
mod tests;
