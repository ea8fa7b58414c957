//! Lowering from program document nodes to the expression IR

use crate::dsl::parse_type;
use crate::error::{InferResult, TypeError};
use crate::expr::{BinOp, Expr, Literal, UnaryOp, WhenBranch};
use crate::ops::{AggSpec, JoinKey, JoinKind};
use fc_core::program::{BinaryOperator, ColumnExpr, JoinExpr, JoinHow, LiteralValue};

/// Lower a document column expression
pub fn lower_expr(node: &ColumnExpr) -> InferResult<Expr> {
    let expr = match node {
        ColumnExpr::Col(name) => Expr::Column(name.clone()),
        ColumnExpr::Lit(value) => Expr::Literal(lower_literal(value)),
        ColumnExpr::Binary(binary) => Expr::binary(
            lower_binop(binary.op),
            lower_expr(&binary.left)?,
            lower_expr(&binary.right)?,
        ),
        ColumnExpr::Not(inner) => unary(UnaryOp::Not, inner)?,
        ColumnExpr::Neg(inner) => unary(UnaryOp::Neg, inner)?,
        ColumnExpr::IsNull(inner) => unary(UnaryOp::IsNull, inner)?,
        ColumnExpr::IsNotNull(inner) => unary(UnaryOp::IsNotNull, inner)?,
        ColumnExpr::Cast(cast) => Expr::Cast {
            expr: Box::new(lower_expr(&cast.expr)?),
            to: parse_type(&cast.to)?,
        },
        ColumnExpr::When(when) => {
            let branches = when
                .branches
                .iter()
                .map(|b| {
                    Ok(WhenBranch {
                        condition: lower_expr(&b.condition)?,
                        value: lower_expr(&b.then)?,
                    })
                })
                .collect::<InferResult<Vec<_>>>()?;
            let otherwise = match &when.otherwise {
                Some(other) => Some(Box::new(lower_expr(other)?)),
                None => None,
            };
            Expr::When {
                branches,
                otherwise,
            }
        }
        ColumnExpr::FillNull(fill) => Expr::FillNull {
            expr: Box::new(lower_expr(&fill.expr)?),
            fill: Box::new(lower_expr(&fill.value)?),
        },
        ColumnExpr::Agg(agg) => Expr::agg(agg.function.clone(), lower_expr(&agg.expr)?),
        ColumnExpr::Alias(alias) => lower_expr(&alias.expr)?.alias(alias.name.clone()),
    };
    Ok(expr)
}

fn unary(op: UnaryOp, inner: &ColumnExpr) -> InferResult<Expr> {
    Ok(Expr::UnaryOp {
        op,
        expr: Box::new(lower_expr(inner)?),
    })
}

fn lower_literal(value: &LiteralValue) -> Literal {
    match value {
        LiteralValue::Bool(b) => Literal::Bool(*b),
        LiteralValue::Int(i) => Literal::Int(*i),
        LiteralValue::Float(f) => Literal::Float(*f),
        LiteralValue::Str(s) => Literal::Str(s.clone()),
        LiteralValue::Null => Literal::Null,
    }
}

fn lower_binop(op: BinaryOperator) -> BinOp {
    match op {
        BinaryOperator::Add => BinOp::Add,
        BinaryOperator::Sub => BinOp::Sub,
        BinaryOperator::Mul => BinOp::Mul,
        BinaryOperator::Div => BinOp::Div,
        BinaryOperator::Mod => BinOp::Mod,
        BinaryOperator::Eq => BinOp::Eq,
        BinaryOperator::Ne => BinOp::NotEq,
        BinaryOperator::Lt => BinOp::Lt,
        BinaryOperator::Le => BinOp::LtEq,
        BinaryOperator::Gt => BinOp::Gt,
        BinaryOperator::Ge => BinOp::GtEq,
        BinaryOperator::And => BinOp::And,
        BinaryOperator::Or => BinOp::Or,
    }
}

/// Lower a list of expressions
pub fn lower_exprs(nodes: &[ColumnExpr]) -> InferResult<Vec<Expr>> {
    nodes.iter().map(lower_expr).collect()
}

/// Lower group_by aggregations; each must be an (optionally aliased) `agg`
pub fn lower_aggs(nodes: &[ColumnExpr]) -> InferResult<Vec<AggSpec>> {
    nodes
        .iter()
        .map(|node| AggSpec::from_expr(&lower_expr(node)?))
        .collect()
}

pub fn lower_join_kind(how: JoinHow) -> JoinKind {
    match how {
        JoinHow::Inner => JoinKind::Inner,
        JoinHow::Left => JoinKind::Left,
        JoinHow::Right => JoinKind::Right,
        JoinHow::Full => JoinKind::Full,
    }
}

/// Key pairs from `on`, or from `left_on`/`right_on` zipped in order
pub fn lower_join_keys(join: &JoinExpr) -> InferResult<Vec<JoinKey>> {
    let has_on = !join.on.is_empty();
    let has_pairs = !join.left_on.is_empty() || !join.right_on.is_empty();

    if has_on && has_pairs {
        return Err(TypeError::InvalidExpression {
            message: "join takes either 'on' or 'left_on'/'right_on', not both".to_string(),
        });
    }
    if has_on {
        return Ok(join.on.iter().map(JoinKey::same).collect());
    }
    if join.left_on.len() != join.right_on.len() {
        return Err(TypeError::InvalidExpression {
            message: format!(
                "join has {} left key(s) but {} right key(s)",
                join.left_on.len(),
                join.right_on.len()
            ),
        });
    }
    Ok(join
        .left_on
        .iter()
        .zip(&join.right_on)
        .map(|(l, r)| JoinKey::pair(l, r))
        .collect())
}

#[cfg(test)]
#[path = "lowering_test.rs"]
mod tests;
