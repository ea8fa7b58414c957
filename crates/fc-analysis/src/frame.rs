//! Frame types: the statically known schema of a frame at one program point

use crate::error::{InferResult, TypeError};
use crate::types::{write_name, DataType};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Column type
    pub data_type: DataType,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Name of an unknown row remainder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowVar(pub String);

/// Tail of a frame type beyond its known columns.
///
/// Every frame produced today is `Closed`. Rules propagate `Open` so that
/// partially known frames can be introduced without changing the model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowTail {
    /// No columns beyond the known ones
    #[default]
    Closed,
    /// Additional unknown columns, named by a row variable
    Open(RowVar),
}

impl RowTail {
    /// Tail of a frame derived from two inputs: open if either input is open
    pub fn union(&self, other: &RowTail) -> RowTail {
        match (self, other) {
            (RowTail::Open(var), _) | (RowTail::Closed, RowTail::Open(var)) => {
                RowTail::Open(var.clone())
            }
            (RowTail::Closed, RowTail::Closed) => RowTail::Closed,
        }
    }
}

/// Schema of a frame: ordered unique columns plus a row tail.
///
/// Column order is kept for display and output ordering but ignored by
/// equality, which is keyed by column name.
#[derive(Debug, Clone, Default)]
pub struct FrameType {
    columns: Vec<Column>,
    rest: RowTail,
}

impl FrameType {
    /// Closed frame type from columns; fails on a duplicate name
    pub fn new(columns: Vec<Column>) -> InferResult<Self> {
        Self::with_rest(columns, RowTail::Closed)
    }

    /// Frame type with an explicit row tail; fails on a duplicate name
    pub fn with_rest(columns: Vec<Column>, rest: RowTail) -> InferResult<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(TypeError::DuplicateColumn {
                    column: col.name.clone(),
                });
            }
        }
        Ok(Self { columns, rest })
    }

    /// Closed frame type with zero columns
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rest(&self) -> &RowTail {
        &self.rest
    }

    pub fn is_closed(&self) -> bool {
        self.rest == RowTail::Closed
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Type of a column by name
    pub fn column_type(&self, name: &str) -> Option<&DataType> {
        self.find_column(name).map(|c| &c.data_type)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_column(name).is_some()
    }

    /// Column names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

impl PartialEq for FrameType {
    fn eq(&self, other: &Self) -> bool {
        self.rest == other.rest
            && self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .all(|c| other.column_type(&c.name) == Some(&c.data_type))
    }
}

impl Eq for FrameType {}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_name(f, &col.name)?;
            write!(f, ": {}", col.data_type)?;
        }
        if let RowTail::Open(RowVar(var)) = &self.rest {
            if !self.columns.is_empty() {
                f.write_str(", ")?;
            }
            write!(f, "..{}", var)?;
        }
        f.write_str("}")
    }
}

/// Serialized as schema text, e.g. `"{id: Int64, name: Utf8?}"`
impl Serialize for FrameType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
