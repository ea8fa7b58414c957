//! fc-core - Core library for framecheck
//!
//! This crate provides configuration parsing, the program document model
//! that the analyzer consumes, and the function call graph.

pub mod call_graph;
pub mod config;
pub mod error;
pub mod program;

pub use call_graph::CallGraph;
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use program::{
    AggExpr, AliasExpr, Assign, BinaryExpr, BinaryOperator, CallExpr, CastExpr, ColumnExpr,
    FillNullExpr, FilterExpr, FrameExpr, FunctionDef, GroupByExpr, IfBlock, JoinExpr, JoinHow,
    LiteralValue, ParamDef, Program, ProjectionExpr, Statement, WhenBranch, WhenExpr,
};
