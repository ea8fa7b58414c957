//! fc-analysis: static frame schema inference for dataframe pipelines
//!
//! This crate provides the column type model, the schema annotation DSL,
//! per-operation inference rules, the declared-vs-inferred checker, and
//! the analyzer that drives them over program documents.

pub mod analyzer;
pub mod checker;
pub mod dsl;
pub(crate) mod error;
pub mod expr;
pub mod frame;
pub(crate) mod lowering;
pub mod ops;
pub mod tables;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use analyzer::{check_program, Analyzer, AnalyzerOptions, FunctionReport};
pub use checker::{check_assignable, check_return, compare, CheckOutcome};
pub use dsl::{parse_schema, parse_type};
pub use error::{Diagnostic, FrameSide, InferResult, OperationError, SchemaSide, Severity, TypeError};
pub use expr::{infer_expr, BinOp, Expr, Literal, UnaryOp};
pub use frame::{Column, FrameType, RowTail, RowVar};
pub use ops::{
    infer_groupby_agg, infer_join, infer_select, infer_with_columns, AggSpec, FrameOperation,
    Inferred, JoinKey, JoinKind, OperationArgs, OperationRegistry, JOIN_SUFFIX,
};
pub use tables::InferenceTables;
pub use types::{DataType, FloatBitWidth, IntBitWidth, StructField, TypeKind};
