//! Read-only inference tables: numeric promotion and aggregation signatures
//!
//! Both tables are built once per process and shared by reference. Every
//! inference entry point takes `&InferenceTables` explicitly.

use crate::types::{DataType, FloatBitWidth, IntBitWidth, TypeKind, MAX_DECIMAL_PRECISION};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Binary promotion table for the integer and float kinds
#[derive(Debug)]
pub struct PromotionTable {
    entries: HashMap<(TypeKind, TypeKind), TypeKind>,
}

impl PromotionTable {
    /// Build the table for every pair of integer and float kinds
    pub fn standard() -> Self {
        let mut kinds = Vec::new();
        for bits in IntBitWidth::ALL {
            kinds.push(TypeKind::Int(bits));
            kinds.push(TypeKind::UInt(bits));
        }
        for bits in FloatBitWidth::ALL {
            kinds.push(TypeKind::Float(bits));
        }

        let mut entries = HashMap::with_capacity(kinds.len() * kinds.len());
        for left in &kinds {
            for right in &kinds {
                if let Some(result) = promote_pair(left, right) {
                    entries.insert((left.clone(), right.clone()), result);
                }
            }
        }
        Self { entries }
    }

    /// Common kind of two numeric operands, if they promote
    pub fn promote(&self, left: &TypeKind, right: &TypeKind) -> Option<&TypeKind> {
        self.entries.get(&(left.clone(), right.clone()))
    }
}

fn promote_pair(left: &TypeKind, right: &TypeKind) -> Option<TypeKind> {
    use TypeKind::{Float, Int, UInt};
    let kind = match (left, right) {
        (Int(a), Int(b)) => Int(*a.max(b)),
        (UInt(a), UInt(b)) => UInt(*a.max(b)),
        // A signed type wide enough for the unsigned operand, capped at 64 bits
        (Int(s), UInt(u)) | (UInt(u), Int(s)) => Int((*s).max(u.doubled())),
        (Float(a), Float(b)) => Float(*a.max(b)),
        (Int(i), Float(f)) | (UInt(i), Float(f)) | (Float(f), Int(i)) | (Float(f), UInt(i)) => {
            if *i >= IntBitWidth::I32 {
                Float(FloatBitWidth::F64)
            } else {
                Float(*f)
            }
        }
        _ => return None,
    };
    Some(kind)
}

/// Operand class accepted by an aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandClass {
    /// Integer, float or decimal
    Numeric,
    /// Any kind with a total order (not list or struct)
    Orderable,
    /// Any kind
    Any,
}

impl OperandClass {
    pub fn accepts(self, kind: &TypeKind) -> bool {
        match self {
            OperandClass::Numeric => kind.is_numeric(),
            OperandClass::Orderable => kind.is_orderable(),
            OperandClass::Any => true,
        }
    }
}

/// How an aggregation's result type is derived from its operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultRule {
    /// Integers widen to 64 bits, floats are kept, decimals widen precision
    Widened,
    /// Always Float64
    Float64,
    /// Same kind as the operand
    Operand,
    /// Always UInt32
    UInt32,
    /// List of the operand type, element nullability preserved
    ListOf,
}

/// Nullability of an aggregation result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultNullability {
    /// Never null
    NonNull,
    /// Nullable iff the operand is nullable
    Preserve,
}

/// Signature of one aggregation function
#[derive(Debug, Clone, Copy)]
pub struct AggregationSignature {
    pub class: OperandClass,
    pub result: ResultRule,
    pub nullability: ResultNullability,
}

impl AggregationSignature {
    const fn new(class: OperandClass, result: ResultRule, nullability: ResultNullability) -> Self {
        Self {
            class,
            result,
            nullability,
        }
    }

    /// Result type for an operand, or `None` if the operand is outside the class
    pub fn apply(&self, operand: &DataType) -> Option<DataType> {
        if !self.class.accepts(operand.kind()) {
            return None;
        }
        let kind = match self.result {
            ResultRule::Widened => widen(operand.kind()),
            ResultRule::Float64 => TypeKind::Float(FloatBitWidth::F64),
            ResultRule::Operand => operand.kind().clone(),
            ResultRule::UInt32 => TypeKind::UInt(IntBitWidth::I32),
            ResultRule::ListOf => TypeKind::List(Box::new(operand.clone())),
        };
        let nullable = match self.nullability {
            ResultNullability::NonNull => false,
            ResultNullability::Preserve => operand.is_nullable(),
        };
        Some(DataType::new(kind).or_nullable(nullable))
    }
}

fn widen(kind: &TypeKind) -> TypeKind {
    match kind {
        TypeKind::Int(_) => TypeKind::Int(IntBitWidth::I64),
        TypeKind::UInt(_) => TypeKind::UInt(IntBitWidth::I64),
        TypeKind::Decimal { scale, .. } => TypeKind::Decimal {
            precision: MAX_DECIMAL_PRECISION,
            scale: *scale,
        },
        other => other.clone(),
    }
}

/// Aggregation signatures keyed by function name
#[derive(Debug)]
pub struct AggregationTable {
    signatures: HashMap<&'static str, AggregationSignature>,
}

impl AggregationTable {
    pub fn standard() -> Self {
        use OperandClass::*;
        use ResultNullability::*;
        use ResultRule::*;

        let signatures = HashMap::from([
            ("sum", AggregationSignature::new(Numeric, Widened, NonNull)),
            ("mean", AggregationSignature::new(Numeric, Float64, Preserve)),
            ("min", AggregationSignature::new(Orderable, Operand, Preserve)),
            ("max", AggregationSignature::new(Orderable, Operand, Preserve)),
            ("first", AggregationSignature::new(Any, Operand, Preserve)),
            ("last", AggregationSignature::new(Any, Operand, Preserve)),
            ("count", AggregationSignature::new(Any, UInt32, NonNull)),
            ("n_unique", AggregationSignature::new(Any, UInt32, NonNull)),
            ("list", AggregationSignature::new(Any, ListOf, NonNull)),
        ]);
        Self { signatures }
    }

    pub fn get(&self, function: &str) -> Option<&AggregationSignature> {
        self.signatures.get(function)
    }
}

/// Every table an inference rule may consult
#[derive(Debug)]
pub struct InferenceTables {
    pub promotion: PromotionTable,
    pub aggregations: AggregationTable,
}

impl InferenceTables {
    /// Process-wide standard tables
    pub fn standard() -> &'static InferenceTables {
        static TABLES: OnceLock<InferenceTables> = OnceLock::new();
        TABLES.get_or_init(|| InferenceTables {
            promotion: PromotionTable::standard(),
            aggregations: AggregationTable::standard(),
        })
    }
}

#[cfg(test)]
#[path = "tables_test.rs"]
mod tests;
