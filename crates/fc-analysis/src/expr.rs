//! Column expressions and the expression type inferencer

use crate::error::{FrameSide, InferResult, TypeError};
use crate::frame::FrameType;
use crate::tables::InferenceTables;
use crate::types::{DataType, FloatBitWidth, IntBitWidth, TypeKind, MAX_DECIMAL_PRECISION};
use std::fmt;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        };
        write!(f, "{}", s)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    IsNull,
    IsNotNull,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "not"),
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::IsNull => write!(f, "is_null"),
            UnaryOp::IsNotNull => write!(f, "is_not_null"),
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    /// Typed by its context: a branch, a binary operand, a fill or a cast
    Null,
}

impl Literal {
    /// Default type of the literal: Int64, Float64, Utf8 or Boolean.
    /// `Null` has no type of its own.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Literal::Int(_) => Some(DataType::int(IntBitWidth::I64)),
            Literal::Float(_) => Some(DataType::float(FloatBitWidth::F64)),
            Literal::Str(_) => Some(DataType::utf8()),
            Literal::Bool(_) => Some(DataType::boolean()),
            Literal::Null => None,
        }
    }
}

/// One `when(condition).then(value)` arm
#[derive(Debug, Clone, PartialEq)]
pub struct WhenBranch {
    pub condition: Expr,
    pub value: Expr,
}

/// Column expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to an input column
    Column(String),
    /// Constant value
    Literal(Literal),
    /// Binary operation
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation
    UnaryOp { op: UnaryOp, expr: Box<Expr> },
    /// Cast to an explicit target type
    Cast { expr: Box<Expr>, to: DataType },
    /// when/then chain with optional otherwise
    When {
        branches: Vec<WhenBranch>,
        otherwise: Option<Box<Expr>>,
    },
    /// Replace nulls with a fill value
    FillNull { expr: Box<Expr>, fill: Box<Expr> },
    /// Aggregation function applied to an operand
    Agg { function: String, expr: Box<Expr> },
    /// Output name override
    Alias { expr: Box<Expr>, name: String },
}

impl Expr {
    pub fn col(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn lit(literal: Literal) -> Self {
        Expr::Literal(literal)
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn agg(function: impl Into<String>, expr: Expr) -> Self {
        Expr::Agg {
            function: function.into(),
            expr: Box::new(expr),
        }
    }

    pub fn alias(self, name: impl Into<String>) -> Self {
        Expr::Alias {
            expr: Box::new(self),
            name: name.into(),
        }
    }

    /// First column referenced when walking down the left-most operand
    pub fn root_column(&self) -> Option<&str> {
        match self {
            Expr::Column(name) => Some(name),
            Expr::Literal(_) => None,
            Expr::BinaryOp { left, right, .. } => {
                left.root_column().or_else(|| right.root_column())
            }
            Expr::UnaryOp { expr, .. }
            | Expr::Cast { expr, .. }
            | Expr::FillNull { expr, .. }
            | Expr::Agg { expr, .. }
            | Expr::Alias { expr, .. } => expr.root_column(),
            Expr::When {
                branches,
                otherwise,
            } => branches
                .iter()
                .find_map(|b| b.value.root_column())
                .or_else(|| otherwise.as_ref().and_then(|o| o.root_column())),
        }
    }

    /// Explicit alias, if the outermost node is one
    pub fn alias_name(&self) -> Option<&str> {
        match self {
            Expr::Alias { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Output column name: the alias, else the root column, else `literal`
    pub fn output_name(&self) -> String {
        self.alias_name()
            .or_else(|| self.root_column())
            .unwrap_or("literal")
            .to_string()
    }

    /// Strip outer aliases
    pub fn unaliased(&self) -> &Expr {
        match self {
            Expr::Alias { expr, .. } => expr.unaliased(),
            other => other,
        }
    }
}

/// Infer the type of an expression evaluated against `frame`
pub fn infer_expr(expr: &Expr, frame: &FrameType, tables: &InferenceTables) -> InferResult<DataType> {
    match expr {
        Expr::Column(name) => frame
            .column_type(name)
            .cloned()
            .ok_or_else(|| TypeError::UnknownColumn {
                column: name.clone(),
                frame: FrameSide::Input,
            }),
        Expr::Literal(literal) => literal.data_type().ok_or_else(untyped_null),
        Expr::BinaryOp { op, left, right } => {
            let left = infer_operand(left, frame, tables)?;
            let right = infer_operand(right, frame, tables)?;
            match (left, right) {
                (Some(left), Some(right)) => infer_binary(*op, &left, &right, tables),
                // A null operand takes the type of the other side
                (Some(other), None) | (None, Some(other)) => {
                    let other = other.to_nullable();
                    infer_binary(*op, &other, &other, tables)
                }
                (None, None) => Err(untyped_null()),
            }
        }
        Expr::UnaryOp { op, expr } => {
            let operand = infer_expr(expr, frame, tables)?;
            infer_unary(*op, &operand)
        }
        Expr::Cast { expr, to } => match infer_operand(expr, frame, tables)? {
            Some(source) => Ok(to.clone().or_nullable(source.is_nullable())),
            None => Ok(to.to_nullable()),
        },
        Expr::When {
            branches,
            otherwise,
        } => infer_when(branches, otherwise.as_deref(), frame, tables),
        Expr::FillNull { expr, fill } => match infer_operand(expr, frame, tables)? {
            Some(value) => match infer_operand(fill, frame, tables)? {
                Some(fill) => infer_fill_null(&value, &fill, tables),
                None => Ok(value),
            },
            None => infer_expr(fill, frame, tables),
        },
        Expr::Agg { function, expr } => {
            let operand = infer_expr(expr, frame, tables)?;
            infer_aggregation(function, &operand, tables)
        }
        Expr::Alias { expr, .. } => infer_expr(expr, frame, tables),
    }
}

/// Like `infer_expr`, but a bare null literal yields `None`
fn infer_operand(
    expr: &Expr,
    frame: &FrameType,
    tables: &InferenceTables,
) -> InferResult<Option<DataType>> {
    match expr {
        Expr::Literal(Literal::Null) => Ok(None),
        other => infer_expr(other, frame, tables).map(Some),
    }
}

fn untyped_null() -> TypeError {
    TypeError::InvalidExpression {
        message: "null literal has no type here; cast it or pair it with a typed value"
            .to_string(),
    }
}

/// Look up an aggregation signature and apply it to an operand type
pub fn infer_aggregation(
    function: &str,
    operand: &DataType,
    tables: &InferenceTables,
) -> InferResult<DataType> {
    tables
        .aggregations
        .get(function)
        .and_then(|sig| sig.apply(operand))
        .ok_or_else(|| TypeError::InvalidAggregation {
            function: function.to_string(),
            operand: operand.clone(),
        })
}

fn mismatch(op: impl fmt::Display, left: &DataType, right: Option<&DataType>) -> TypeError {
    TypeError::TypeMismatch {
        op: op.to_string(),
        left: left.clone(),
        right: right.cloned(),
    }
}

/// Infer the result type of a binary operator
pub fn infer_binary(
    op: BinOp,
    left: &DataType,
    right: &DataType,
    tables: &InferenceTables,
) -> InferResult<DataType> {
    let nullable = left.is_nullable() || right.is_nullable();

    if op.is_comparison() {
        let comparable = (left.is_numeric() && right.is_numeric()) || left.same_kind(right);
        return if comparable {
            Ok(DataType::boolean().or_nullable(nullable))
        } else {
            Err(mismatch(op, left, Some(right)))
        };
    }

    if op.is_logical() {
        return match (left.kind(), right.kind()) {
            (TypeKind::Boolean, TypeKind::Boolean) => Ok(DataType::boolean().or_nullable(nullable)),
            _ => Err(mismatch(op, left, Some(right))),
        };
    }

    let kind = arithmetic_kind(op, left.kind(), right.kind(), tables)
        .ok_or_else(|| mismatch(op, left, Some(right)))?;
    Ok(DataType::new(kind).or_nullable(nullable))
}

fn arithmetic_kind(
    op: BinOp,
    left: &TypeKind,
    right: &TypeKind,
    tables: &InferenceTables,
) -> Option<TypeKind> {
    use TypeKind::{Date, Datetime, Decimal, Duration, Float, Utf8};

    if op == BinOp::Div && left.is_integer() && right.is_integer() {
        return Some(Float(FloatBitWidth::F64));
    }
    if let Some(kind) = tables.promotion.promote(left, right) {
        return Some(kind.clone());
    }

    match (op, left, right) {
        (
            _,
            Decimal {
                precision: p1,
                scale: s1,
            },
            Decimal {
                precision: p2,
                scale: s2,
            },
        ) => Some(Decimal {
            precision: (*p1).max(*p2).min(MAX_DECIMAL_PRECISION),
            scale: (*s1).max(*s2),
        }),
        (_, d @ Decimal { .. }, other) | (_, other, d @ Decimal { .. }) if other.is_integer() => {
            Some(d.clone())
        }
        (_, Decimal { .. }, Float(_)) | (_, Float(_), Decimal { .. }) => {
            Some(Float(FloatBitWidth::F64))
        }
        (BinOp::Sub, Datetime { .. }, Datetime { .. }) => Some(Duration),
        (BinOp::Add | BinOp::Sub, dt @ Datetime { .. }, Duration) => Some(dt.clone()),
        (BinOp::Add, Duration, dt @ Datetime { .. }) => Some(dt.clone()),
        (BinOp::Sub, Date, Date) => Some(Duration),
        (BinOp::Add | BinOp::Sub, Duration, Duration) => Some(Duration),
        (BinOp::Add, Utf8, Utf8) => Some(Utf8),
        _ => None,
    }
}

fn infer_unary(op: UnaryOp, operand: &DataType) -> InferResult<DataType> {
    match op {
        UnaryOp::IsNull | UnaryOp::IsNotNull => Ok(DataType::boolean()),
        UnaryOp::Not => match operand.kind() {
            TypeKind::Boolean => Ok(operand.clone()),
            _ => Err(mismatch(op, operand, None)),
        },
        UnaryOp::Neg => {
            if operand.is_numeric() || *operand.kind() == TypeKind::Duration {
                Ok(operand.clone())
            } else {
                Err(mismatch(op, operand, None))
            }
        }
    }
}

fn infer_fill_null(
    value: &DataType,
    fill: &DataType,
    tables: &InferenceTables,
) -> InferResult<DataType> {
    let kind = if value.same_kind(fill) {
        value.kind().clone()
    } else {
        tables
            .promotion
            .promote(value.kind(), fill.kind())
            .cloned()
            .ok_or_else(|| mismatch("fill_null", value, Some(fill)))?
    };
    Ok(DataType::new(kind).or_nullable(fill.is_nullable()))
}

fn infer_when(
    branches: &[WhenBranch],
    otherwise: Option<&Expr>,
    frame: &FrameType,
    tables: &InferenceTables,
) -> InferResult<DataType> {
    if branches.is_empty() {
        return Err(TypeError::InvalidExpression {
            message: "when expression needs at least one branch".to_string(),
        });
    }

    let mut result: Option<DataType> = None;
    // Without a default, rows matching no branch are null
    let mut has_null = otherwise.is_none();

    let values = branches.iter().map(|b| (Some(&b.condition), &b.value));
    for (condition, value) in values.chain(otherwise.map(|o| (None, o))) {
        if let Some(condition) = condition {
            let condition = infer_expr(condition, frame, tables)?;
            if *condition.kind() != TypeKind::Boolean {
                return Err(mismatch("when", &condition, None));
            }
        }
        let Some(value) = infer_operand(value, frame, tables)? else {
            has_null = true;
            continue;
        };
        result = Some(match result {
            None => value,
            Some(current) => unify_branches(&current, &value)?,
        });
    }

    let unified = result.ok_or_else(untyped_null)?;
    Ok(if has_null { unified.to_nullable() } else { unified })
}

/// Unify two conditional branch types
pub fn unify_branches(first: &DataType, second: &DataType) -> InferResult<DataType> {
    if first == second {
        Ok(first.clone())
    } else if first.same_kind(second) {
        Ok(first.to_nullable())
    } else {
        Err(TypeError::BranchTypeMismatch {
            first: first.clone(),
            second: second.clone(),
        })
    }
}

#[cfg(test)]
#[path = "expr_test.rs"]
mod tests;
