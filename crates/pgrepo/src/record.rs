//! Record shape contract.
//!
//! A record type declares, at compile time, its table and a descriptor for
//! every column. The filter compiler and the repository only ever look at this
//! table; there is no runtime reflection.
//!
//! The descriptor is usually generated with `#[derive(Record)]`, but can be
//! written by hand:
//!
//! ```ignore
//! impl Record for Example {
//!     const TABLE: &'static str = "examples";
//!     const FIELDS: &'static [FieldDescriptor] = &[
//!         FieldDescriptor::identifier("id"),
//!         FieldDescriptor::timestamp("created_at"),
//!         FieldDescriptor::timestamp("updated_at"),
//!         FieldDescriptor::scalar("flag"),
//!         FieldDescriptor::structured("metadata"),
//!     ];
//!
//!     fn from_row(row: &Row) -> OrmResult<Self> { ... }
//! }
//! ```

use crate::error::OrmResult;
use crate::row::Row;

/// Semantic kind of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// The unique, immutable record id.
    Identifier,
    /// A plain comparable value (bool, number, text, uuid, ...).
    Scalar,
    /// Opaque nested data (json/jsonb). Never usable in a predicate.
    Structured,
    /// Server-maintained timestamp (`created_at`, `updated_at`). Never writable.
    Timestamp,
}

impl FieldKind {
    /// Whether the field may appear in an equality predicate.
    pub fn is_comparable(self) -> bool {
        !matches!(self, FieldKind::Structured)
    }

    /// Whether clients may set the field on create/update.
    pub fn is_writable(self) -> bool {
        matches!(self, FieldKind::Scalar | FieldKind::Structured)
    }
}

/// Static description of one column of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Column name.
    pub name: &'static str,
    pub kind: FieldKind,
    /// `NULL` allowed; nullable fields may be omitted from a create payload.
    pub nullable: bool,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: FieldKind, nullable: bool) -> Self {
        Self {
            name,
            kind,
            nullable,
        }
    }

    pub const fn identifier(name: &'static str) -> Self {
        Self::new(name, FieldKind::Identifier, false)
    }

    pub const fn scalar(name: &'static str) -> Self {
        Self::new(name, FieldKind::Scalar, false)
    }

    pub const fn structured(name: &'static str) -> Self {
        Self::new(name, FieldKind::Structured, false)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp, false)
    }

    /// Mark the field as nullable.
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A typed unit of storage mapped onto a single table.
pub trait Record: Sized + Send {
    /// Table name (unquoted).
    const TABLE: &'static str;

    /// Every column of the table, in declaration order.
    const FIELDS: &'static [FieldDescriptor];

    /// Decode a result row.
    fn from_row(row: &Row) -> OrmResult<Self>;

    /// Look up a field descriptor by column name.
    fn field(name: &str) -> Option<&'static FieldDescriptor> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }

    /// Column holding the record id.
    fn id_column() -> &'static str {
        Self::FIELDS
            .iter()
            .find(|f| f.kind == FieldKind::Identifier)
            .map_or("id", |f| f.name)
    }
}
