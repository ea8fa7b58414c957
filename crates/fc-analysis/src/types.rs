//! Column data types and the subtyping relation

use serde::{Serialize, Serializer};
use std::fmt;

/// Highest decimal precision; also the cap when decimals widen
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// Valid bit widths for integer types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntBitWidth {
    /// 8-bit
    I8,
    /// 16-bit
    I16,
    /// 32-bit
    I32,
    /// 64-bit
    I64,
}

impl IntBitWidth {
    /// All widths, narrowest first
    pub const ALL: [IntBitWidth; 4] = [
        IntBitWidth::I8,
        IntBitWidth::I16,
        IntBitWidth::I32,
        IntBitWidth::I64,
    ];

    /// Width in bits
    pub fn bits(self) -> u16 {
        match self {
            IntBitWidth::I8 => 8,
            IntBitWidth::I16 => 16,
            IntBitWidth::I32 => 32,
            IntBitWidth::I64 => 64,
        }
    }

    /// The next wider width, saturating at 64 bits
    pub fn doubled(self) -> IntBitWidth {
        match self {
            IntBitWidth::I8 => IntBitWidth::I16,
            IntBitWidth::I16 => IntBitWidth::I32,
            IntBitWidth::I32 | IntBitWidth::I64 => IntBitWidth::I64,
        }
    }
}

impl fmt::Display for IntBitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// Valid bit widths for floating-point types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FloatBitWidth {
    /// 32-bit
    F32,
    /// 64-bit
    F64,
}

impl FloatBitWidth {
    /// All widths, narrowest first
    pub const ALL: [FloatBitWidth; 2] = [FloatBitWidth::F32, FloatBitWidth::F64];
}

impl fmt::Display for FloatBitWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FloatBitWidth::F32 => write!(f, "32"),
            FloatBitWidth::F64 => write!(f, "64"),
        }
    }
}

/// A named field of a struct type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructField {
    /// Field name
    pub name: String,
    /// Field type
    pub data_type: DataType,
}

impl StructField {
    /// Create a new struct field
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// The underlying kind of a column type, without nullability
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Signed integer
    Int(IntBitWidth),
    /// Unsigned integer
    UInt(IntBitWidth),
    /// Floating point
    Float(FloatBitWidth),
    /// UTF-8 string
    Utf8,
    /// Boolean
    Boolean,
    /// Calendar date
    Date,
    /// Timestamp with an optional time zone tag
    Datetime { time_zone: Option<String> },
    /// Elapsed time
    Duration,
    /// Exact numeric
    Decimal { precision: u8, scale: u8 },
    /// Categorical string
    Categorical,
    /// Enumeration; an empty category list means the value set is unknown
    Enum { categories: Vec<String> },
    /// Homogeneous list
    List(Box<DataType>),
    /// Ordered named fields
    Struct(Vec<StructField>),
}

impl TypeKind {
    /// Returns true for integer, float and decimal kinds
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeKind::Int(_) | TypeKind::UInt(_) | TypeKind::Float(_) | TypeKind::Decimal { .. }
        )
    }

    /// Returns true for signed and unsigned integers
    pub fn is_integer(&self) -> bool {
        matches!(self, TypeKind::Int(_) | TypeKind::UInt(_))
    }

    /// Returns true when values of this kind have a total order
    pub fn is_orderable(&self) -> bool {
        !matches!(self, TypeKind::List(_) | TypeKind::Struct(_))
    }

    /// Returns true for date, datetime and duration
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            TypeKind::Date | TypeKind::Datetime { .. } | TypeKind::Duration
        )
    }
}

/// A column value type: a kind plus a nullability flag.
///
/// Equality is structural and includes the nullability flag at every level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataType {
    kind: TypeKind,
    nullable: bool,
}

impl DataType {
    /// Non-nullable type of the given kind
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: false,
        }
    }

    /// Nullable type of the given kind
    pub fn nullable(kind: TypeKind) -> Self {
        Self {
            kind,
            nullable: true,
        }
    }

    pub fn int(bits: IntBitWidth) -> Self {
        Self::new(TypeKind::Int(bits))
    }

    pub fn uint(bits: IntBitWidth) -> Self {
        Self::new(TypeKind::UInt(bits))
    }

    pub fn float(bits: FloatBitWidth) -> Self {
        Self::new(TypeKind::Float(bits))
    }

    pub fn utf8() -> Self {
        Self::new(TypeKind::Utf8)
    }

    pub fn boolean() -> Self {
        Self::new(TypeKind::Boolean)
    }

    /// Non-nullable list of the given element type
    pub fn list(element: DataType) -> Self {
        Self::new(TypeKind::List(Box::new(element)))
    }

    /// The underlying kind
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Whether the nullable flag is set
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Copy of this type with the nullable flag set to `nullable`
    pub fn with_nullable(&self, nullable: bool) -> Self {
        Self {
            kind: self.kind.clone(),
            nullable,
        }
    }

    /// Copy of this type with the nullable flag set
    pub fn to_nullable(&self) -> Self {
        self.with_nullable(true)
    }

    /// Copy of this type with the nullable flag cleared
    pub fn to_non_null(&self) -> Self {
        self.with_nullable(false)
    }

    /// Consume the type, setting the nullable flag when `nullable` is true
    pub fn or_nullable(mut self, nullable: bool) -> Self {
        self.nullable |= nullable;
        self
    }

    pub fn is_numeric(&self) -> bool {
        self.kind.is_numeric()
    }

    /// Equality ignoring the top-level nullable flag
    pub fn same_kind(&self, other: &DataType) -> bool {
        self.kind == other.kind
    }

    /// Subtyping: `T <: T` and `T <: T?`, never `T? <: T`.
    ///
    /// There is no subtyping between different kinds. List elements and
    /// struct fields are compared recursively; struct fields must agree
    /// in name and order.
    pub fn is_subtype_of(&self, other: &DataType) -> bool {
        if self.nullable && !other.nullable {
            return false;
        }
        match (&self.kind, &other.kind) {
            (TypeKind::List(a), TypeKind::List(b)) => a.is_subtype_of(b),
            (TypeKind::Struct(a), TypeKind::Struct(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(fa, fb)| {
                        fa.name == fb.name && fa.data_type.is_subtype_of(&fb.data_type)
                    })
            }
            (a, b) => a == b,
        }
    }
}

/// Returns true if `name` can be written in schema text without quotes
pub(crate) fn is_bare_word(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_word_char)
}

/// Characters allowed in an unquoted schema word
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '/' | '.')
}

/// Write a name, quoting and escaping it when it is not a bare word
pub(crate) fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if is_bare_word(name) {
        return f.write_str(name);
    }
    f.write_str("\"")?;
    for c in name.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("\"")
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Int(bits) => write!(f, "Int{}", bits),
            TypeKind::UInt(bits) => write!(f, "UInt{}", bits),
            TypeKind::Float(bits) => write!(f, "Float{}", bits),
            TypeKind::Utf8 => write!(f, "Utf8"),
            TypeKind::Boolean => write!(f, "Boolean"),
            TypeKind::Date => write!(f, "Date"),
            TypeKind::Datetime { time_zone: None } => write!(f, "Datetime"),
            TypeKind::Datetime {
                time_zone: Some(tz),
            } => {
                f.write_str("Datetime(")?;
                write_name(f, tz)?;
                f.write_str(")")
            }
            TypeKind::Duration => write!(f, "Duration"),
            TypeKind::Decimal { precision, scale } => {
                write!(f, "Decimal({}, {})", precision, scale)
            }
            TypeKind::Categorical => write!(f, "Categorical"),
            TypeKind::Enum { categories } if categories.is_empty() => write!(f, "Enum"),
            TypeKind::Enum { categories } => {
                f.write_str("Enum(")?;
                for (i, category) in categories.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_name(f, category)?;
                }
                f.write_str(")")
            }
            TypeKind::List(element) => write!(f, "List[{}]", element),
            TypeKind::Struct(fields) => {
                f.write_str("Struct{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_name(f, &field.name)?;
                    write!(f, ": {}", field.data_type)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

/// Serialized as schema text, e.g. `"List[Utf8?]"`
impl Serialize for DataType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
