//! Error types for fc-analysis

use crate::frame::FrameType;
use crate::types::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, no action required
    Info,
    /// Advisory that does not fail the function
    Warning,
    /// Fails the function
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Which input frame a column lookup ran against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameSide {
    /// The single input of a unary operation
    Input,
    /// Left side of a join
    Left,
    /// Right side of a join
    Right,
}

impl fmt::Display for FrameSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameSide::Input => write!(f, "input"),
            FrameSide::Left => write!(f, "left"),
            FrameSide::Right => write!(f, "right"),
        }
    }
}

/// Which schema of a comparison a column is missing from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSide {
    /// The annotated schema
    Declared,
    /// The schema computed from the function body
    Inferred,
}

impl fmt::Display for SchemaSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSide::Declared => write!(f, "declared"),
            SchemaSide::Inferred => write!(f, "inferred"),
        }
    }
}

/// Type checking error type
///
/// Codes use the `FT` prefix (Frame Type). `MissingAlias` is an advisory
/// and `InferredSchema` is informational; everything else fails the
/// function it was raised in.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeError {
    /// FT001: Schema text could not be parsed
    #[error("[FT001] Malformed schema at offset {offset} near '{fragment}': {message}")]
    MalformedSchema {
        offset: usize,
        fragment: String,
        message: String,
    },

    /// FT002: Column reference not present in the frame
    #[error("[FT002] Column '{column}' not found in {frame} frame")]
    UnknownColumn { column: String, frame: FrameSide },

    /// FT003: Operator applied to operands it does not accept
    #[error("[FT003] {}", describe_mismatch(.op, .left, .right.as_ref()))]
    TypeMismatch {
        op: String,
        left: DataType,
        right: Option<DataType>,
    },

    /// FT004: Conditional branches of different kinds
    #[error("[FT004] Conditional branches have incompatible types: {first} and {second}")]
    BranchTypeMismatch { first: DataType, second: DataType },

    /// FT005: Join keys of different kinds
    #[error("[FT005] Join key type mismatch: '{left_key}' is {left} but '{right_key}' is {right}")]
    JoinKeyTypeMismatch {
        left_key: String,
        right_key: String,
        left: DataType,
        right: DataType,
    },

    /// FT006: Two columns with the same name in one frame
    #[error("[FT006] Duplicate column '{column}'")]
    DuplicateColumn { column: String },

    /// FT007: Unknown aggregation or operand outside its class
    #[error("[FT007] Invalid aggregation '{function}' on {operand}")]
    InvalidAggregation { function: String, operand: DataType },

    /// FT008: Aggregation without an alias (advisory)
    #[error("[FT008] Aggregation '{function}' has no alias, using default name '{default_name}'")]
    MissingAlias {
        function: String,
        default_name: String,
    },

    /// FT009: Column present in one schema of a comparison only
    #[error("[FT009] Column '{column}' is missing from the {missing_from} schema")]
    MissingColumn {
        column: String,
        missing_from: SchemaSide,
    },

    /// FT010: Column present in both schemas with different types
    #[error("[FT010] Column '{column}' has type {actual}, expected {expected}")]
    ColumnTypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },

    /// FT011: Reference to a variable with no binding
    #[error("[FT011] Unknown variable '{name}'")]
    UnknownVariable { name: String },

    /// FT012: Call to a function not defined in the document
    #[error("[FT012] Unknown function '{name}'")]
    UnknownFunction { name: String },

    /// FT013: Frame value whose schema cannot be determined
    #[error("[FT013] Cannot infer schema of {description}")]
    UninferableExpression { description: String },

    /// FT014: Call argument not compatible with the parameter schema
    #[error("[FT014] Argument '{parameter}' of '{function}' does not match its schema: {detail}")]
    ArgumentMismatch {
        function: String,
        parameter: String,
        detail: Box<TypeError>,
    },

    /// FT015: Inference would recurse through the call graph
    #[error("[FT015] Cannot infer recursive call: {cycle}")]
    RecursiveCall { cycle: String },

    /// FT016: Declared return schema but no return statement
    #[error("[FT016] Function '{function}' declares a return schema but never returns")]
    MissingReturn { function: String },

    /// FT017: Structurally invalid operation or expression
    #[error("[FT017] Invalid expression: {message}")]
    InvalidExpression { message: String },

    /// FT018: Inferred schema of an unannotated return (informational)
    #[error("[FT018] Inferred schema: {schema}")]
    InferredSchema { schema: FrameType },

    /// FT019: Same columns, but one side is open and the other closed
    #[error("[FT019] Row tail mismatch: declared {declared} but inferred {inferred}")]
    RowTailMismatch {
        declared: FrameType,
        inferred: FrameType,
    },
}

fn describe_mismatch(op: &str, left: &DataType, right: Option<&DataType>) -> String {
    match right {
        Some(right) => format!("Cannot apply '{}' to {} and {}", op, left, right),
        None => format!("Cannot apply '{}' to {}", op, left),
    }
}

impl TypeError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            TypeError::MalformedSchema { .. } => "FT001",
            TypeError::UnknownColumn { .. } => "FT002",
            TypeError::TypeMismatch { .. } => "FT003",
            TypeError::BranchTypeMismatch { .. } => "FT004",
            TypeError::JoinKeyTypeMismatch { .. } => "FT005",
            TypeError::DuplicateColumn { .. } => "FT006",
            TypeError::InvalidAggregation { .. } => "FT007",
            TypeError::MissingAlias { .. } => "FT008",
            TypeError::MissingColumn { .. } => "FT009",
            TypeError::ColumnTypeMismatch { .. } => "FT010",
            TypeError::UnknownVariable { .. } => "FT011",
            TypeError::UnknownFunction { .. } => "FT012",
            TypeError::UninferableExpression { .. } => "FT013",
            TypeError::ArgumentMismatch { .. } => "FT014",
            TypeError::RecursiveCall { .. } => "FT015",
            TypeError::MissingReturn { .. } => "FT016",
            TypeError::InvalidExpression { .. } => "FT017",
            TypeError::InferredSchema { .. } => "FT018",
            TypeError::RowTailMismatch { .. } => "FT019",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            TypeError::MissingAlias { .. } => Severity::Warning,
            TypeError::InferredSchema { .. } => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// Column the error refers to, if any
    pub fn column(&self) -> Option<&str> {
        match self {
            TypeError::UnknownColumn { column, .. }
            | TypeError::DuplicateColumn { column }
            | TypeError::MissingColumn { column, .. }
            | TypeError::ColumnTypeMismatch { column, .. } => Some(column),
            TypeError::JoinKeyTypeMismatch { left_key, .. } => Some(left_key),
            TypeError::MissingAlias { default_name, .. } => Some(default_name),
            TypeError::ArgumentMismatch { detail, .. } => detail.column(),
            _ => None,
        }
    }
}

/// Result type alias for TypeError
pub type InferResult<T> = Result<T, TypeError>;

/// A type error placed in context for reporting
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Diagnostic code (e.g. "FT002")
    pub code: &'static str,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Function that produced this diagnostic
    pub function: String,
    /// Operation being inferred when the error was raised (e.g. "join")
    pub operation: Option<String>,
    /// Optional column reference
    pub column: Option<String>,
    /// The underlying error
    pub error: TypeError,
}

impl Diagnostic {
    pub fn new(function: &str, operation: Option<&str>, error: TypeError) -> Self {
        Self {
            code: error.code(),
            severity: error.severity(),
            message: error.to_string(),
            function: function.to_string(),
            operation: operation.map(str::to_string),
            column: error.column().map(str::to_string),
            error,
        }
    }
}

/// An error raised while inferring one operation, tagged with that operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationError {
    pub operation: Option<String>,
    pub error: TypeError,
}

impl OperationError {
    pub fn new(operation: &str, error: TypeError) -> Self {
        Self {
            operation: Some(operation.to_string()),
            error,
        }
    }

    pub fn bare(error: TypeError) -> Self {
        Self {
            operation: None,
            error,
        }
    }
}

impl From<TypeError> for OperationError {
    fn from(error: TypeError) -> Self {
        Self::bare(error)
    }
}
