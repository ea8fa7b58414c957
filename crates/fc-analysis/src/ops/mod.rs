//! Frame operations: rules that combine input frame types into a new one
//!
//! Every operation implements [`FrameOperation`] and is registered by name
//! in an [`OperationRegistry`]. The analyzer only ever dispatches through
//! the registry, so new operations plug in here without touching it.

pub mod filter;
pub mod group_by;
pub mod join;
pub mod select;

use crate::error::{InferResult, TypeError};
use crate::expr::Expr;
use crate::frame::FrameType;
use crate::tables::InferenceTables;
use std::collections::HashMap;

pub use group_by::{infer_groupby_agg, AggSpec};
pub use join::{infer_join, JoinKey, JoinKind, JOIN_SUFFIX};
pub use select::{infer_select, infer_with_columns};

/// Output of an operation: the new frame type plus non-fatal advisories
#[derive(Debug, Clone, PartialEq)]
pub struct Inferred {
    pub frame: FrameType,
    pub advisories: Vec<TypeError>,
}

impl Inferred {
    /// Result without advisories
    pub fn frame(frame: FrameType) -> Self {
        Self {
            frame,
            advisories: Vec::new(),
        }
    }
}

/// Parameters of an operation, beyond its input frames
#[derive(Debug, Clone, PartialEq)]
pub enum OperationArgs {
    Join { keys: Vec<JoinKey>, kind: JoinKind },
    GroupBy { keys: Vec<String>, aggs: Vec<AggSpec> },
    Exprs(Vec<Expr>),
    Predicate(Expr),
}

impl OperationArgs {
    fn kind_name(&self) -> &'static str {
        match self {
            OperationArgs::Join { .. } => "join",
            OperationArgs::GroupBy { .. } => "group_by",
            OperationArgs::Exprs(_) => "expressions",
            OperationArgs::Predicate(_) => "predicate",
        }
    }
}

/// A frame type inference rule
pub trait FrameOperation: Send + Sync {
    /// Operation name, used as the registry key
    fn name(&self) -> &'static str;
    /// Number of input frames
    fn arity(&self) -> usize;
    /// Infer the output frame type
    fn infer(
        &self,
        inputs: &[FrameType],
        args: &OperationArgs,
        tables: &InferenceTables,
    ) -> InferResult<Inferred>;
}

/// Error for arguments that do not belong to the operation
pub(crate) fn unexpected_args(operation: &str, args: &OperationArgs) -> TypeError {
    TypeError::InvalidExpression {
        message: format!(
            "operation '{}' does not take {} arguments",
            operation,
            args.kind_name()
        ),
    }
}

/// Operations keyed by name
pub struct OperationRegistry {
    operations: HashMap<&'static str, Box<dyn FrameOperation>>,
}

impl OperationRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            operations: HashMap::new(),
        }
    }

    /// Registry with all built-in operations
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(join::Join));
        registry.register(Box::new(group_by::GroupBy));
        registry.register(Box::new(select::Select));
        registry.register(Box::new(select::WithColumns));
        registry.register(Box::new(filter::Filter));
        registry
    }

    /// Add an operation, replacing any operation with the same name
    pub fn register(&mut self, operation: Box<dyn FrameOperation>) {
        self.operations.insert(operation.name(), operation);
    }

    pub fn get(&self, name: &str) -> Option<&dyn FrameOperation> {
        self.operations.get(name).map(|op| op.as_ref())
    }

    /// Run a registered operation, checking its arity first
    pub fn infer(
        &self,
        name: &str,
        inputs: &[FrameType],
        args: &OperationArgs,
        tables: &InferenceTables,
    ) -> InferResult<Inferred> {
        let operation = self.get(name).ok_or_else(|| TypeError::InvalidExpression {
            message: format!("unknown operation '{}'", name),
        })?;
        if inputs.len() != operation.arity() {
            return Err(TypeError::InvalidExpression {
                message: format!(
                    "operation '{}' takes {} input frame(s), got {}",
                    name,
                    operation.arity(),
                    inputs.len()
                ),
            });
        }
        operation.infer(inputs, args, tables)
    }

    /// Registered operation names, sorted
    pub fn operation_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operations.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
#[path = "ops_test.rs"]
mod tests;
