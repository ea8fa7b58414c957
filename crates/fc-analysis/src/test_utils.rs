//! Shared test utilities for fc-analysis

use crate::dsl::parse_schema;
use crate::frame::{Column, FrameType};
use crate::tables::InferenceTables;
use crate::types::{DataType, FloatBitWidth, IntBitWidth, TypeKind};

/// Shorthand for a non-null `Int64`
pub fn int64() -> DataType {
    DataType::int(IntBitWidth::I64)
}

/// Shorthand for a non-null `Int32`
pub fn int32() -> DataType {
    DataType::int(IntBitWidth::I32)
}

/// Shorthand for a non-null `Float64`
pub fn float64() -> DataType {
    DataType::float(FloatBitWidth::F64)
}

/// Shorthand for a non-null `Utf8`
pub fn utf8() -> DataType {
    DataType::utf8()
}

/// Shorthand for a non-null `Decimal(precision, scale)`
pub fn decimal(precision: u8, scale: u8) -> DataType {
    DataType::new(TypeKind::Decimal { precision, scale })
}

/// Closed frame type from `(name, type)` pairs
pub fn frame(columns: &[(&str, DataType)]) -> FrameType {
    FrameType::new(
        columns
            .iter()
            .map(|(name, data_type)| Column::new(*name, data_type.clone()))
            .collect(),
    )
    .unwrap()
}

/// Frame type from schema text
pub fn schema(text: &str) -> FrameType {
    parse_schema(text).unwrap()
}

/// The process-wide standard tables
pub fn tables() -> &'static InferenceTables {
    InferenceTables::standard()
}
