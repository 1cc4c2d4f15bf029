//! Structured repository inputs and the fragment builders that compile them.
//!
//! Inputs are typed by the record they apply to:
//!
//! - [`Predicate`]: equality filter, compiled by [`where_clause`]
//! - [`OrderBy`]: sort keys, compiled by [`order_clause`]
//! - [`Pagination`]: limit/offset, compiled by [`pagination_clause`]
//! - [`Update`]: new values, compiled by [`set_clause`]
//! - [`Create`]: a full new record, compiled by [`values_clause`]
//!
//! The builders never fail: every identifier is quoted, every value is bound,
//! and an empty input yields a blank fragment rather than a dangling keyword.
//! Shape problems (unknown fields, a structured field in a predicate, a
//! protected field in a payload) are caught by each input's `check` method,
//! which the repository runs before any SQL is built.

use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::sql::Sql;
use crate::value::Value;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;


/// Insert or replace `field` while keeping first-insertion order.
fn upsert<V>(entries: &mut Vec<(String, V)>, field: &str, value: V) {
    match entries.iter_mut().find(|(name, _)| name == field) {
        Some((_, slot)) => *slot = value,
        None => entries.push((field.to_string(), value)),
    }
}

fn unknown_field<R: Record>(field: &str) -> OrmError {
    OrmError::validation(format!(
        "unknown field '{}' on record '{}'",
        field,
        R::TABLE
    ))
}

/// Common impls that must not require `R: Clone/Debug/Default`.
macro_rules! impl_record_input {
    ($name:ident, $value:ty) => {
        impl<R> $name<R> {
            pub fn new() -> Self {
                Self {
                    entries: Vec::new(),
                    _record: PhantomData,
                }
            }

            pub fn is_empty(&self) -> bool {
                self.entries.is_empty()
            }

            pub fn len(&self) -> usize {
                self.entries.len()
            }

            /// Entries in insertion order.
            pub fn iter(&self) -> impl Iterator<Item = (&str, &$value)> {
                self.entries.iter().map(|(name, v)| (name.as_str(), v))
            }
        }

        impl<R> Default for $name<R> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<R> Clone for $name<R> {
            fn clone(&self) -> Self {
                Self {
                    entries: self.entries.clone(),
                    _record: PhantomData,
                }
            }
        }

        impl<R> fmt::Debug for $name<R> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("entries", &self.entries)
                    .finish()
            }
        }
    };
}

// ==================== Predicate ====================

/// Equality filter over the comparable fields of `R`.
///
/// Unspecified fields are unconstrained; an empty predicate matches every row.
/// Setting a field twice keeps the latest value.
///
/// ```ignore
/// let active = Predicate::<Example>::new().eq("flag", true);
/// ```
pub struct Predicate<R> {
    entries: Vec<(String, Value)>,
    _record: PhantomData<fn() -> R>,
}

impl_record_input!(Predicate, Value);

impl<R> Predicate<R> {
    /// Constrain `field` to equal `value`.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        upsert(&mut self.entries, field, value.into());
        self
    }
}

impl<R: Record> Predicate<R> {
    /// Filter on the record id.
    pub fn id(id: impl Into<Value>) -> Self {
        Self::new().eq(R::id_column(), id)
    }

    /// Every field must exist on `R` and be comparable (not structured).
    pub fn check(&self) -> OrmResult<()> {
        for (field, _) in &self.entries {
            let desc = R::field(field).ok_or_else(|| unknown_field::<R>(field))?;
            if !desc.kind.is_comparable() {
                return Err(OrmError::validation(format!(
                    "field '{}' is structured and cannot be used in a predicate",
                    field
                )));
            }
        }
        Ok(())
    }
}

// ==================== Update ====================

/// New values for the writable fields of `R`.
///
/// The identifier and timestamp fields are never writable.
pub struct Update<R> {
    entries: Vec<(String, Value)>,
    _record: PhantomData<fn() -> R>,
}

impl_record_input!(Update, Value);

impl<R> Update<R> {
    /// Set `field` to `value`.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        upsert(&mut self.entries, field, value.into());
        self
    }

    /// Set a structured field from any `Serialize` value.
    pub fn set_json<T: Serialize + ?Sized>(self, field: &str, value: &T) -> OrmResult<Self> {
        Ok(self.set(field, Value::json(value)?))
    }
}

impl<R: Record> Update<R> {
    /// Every field must exist on `R` and be writable.
    pub fn check(&self) -> OrmResult<()> {
        check_writable::<R>(self.entries.iter().map(|(name, _)| name.as_str()))
    }
}

fn check_writable<'a, R: Record>(fields: impl Iterator<Item = &'a str>) -> OrmResult<()> {
    for field in fields {
        let desc = R::field(field).ok_or_else(|| unknown_field::<R>(field))?;
        if !desc.kind.is_writable() {
            return Err(OrmError::validation(format!(
                "field '{}' is {:?} and is not client-writable",
                field, desc.kind
            )));
        }
    }
    Ok(())
}

// ==================== Create ====================

/// Values for a new `R`: every writable field except nullable ones.
pub struct Create<R> {
    entries: Vec<(String, Value)>,
    _record: PhantomData<fn() -> R>,
}

impl_record_input!(Create, Value);

impl<R> Create<R> {
    /// Set `field` to `value`.
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        upsert(&mut self.entries, field, value.into());
        self
    }

    /// Set a structured field from any `Serialize` value.
    pub fn set_json<T: Serialize + ?Sized>(self, field: &str, value: &T) -> OrmResult<Self> {
        Ok(self.set(field, Value::json(value)?))
    }
}

impl<R: Record> Create<R> {
    /// Fields must be writable, and every required writable field present.
    pub fn check(&self) -> OrmResult<()> {
        check_writable::<R>(self.entries.iter().map(|(name, _)| name.as_str()))?;

        let missing: Vec<&str> = R::FIELDS
            .iter()
            .filter(|f| f.kind.is_writable() && !f.nullable)
            .filter(|f| !self.entries.iter().any(|(name, _)| name == f.name))
            .map(|f| f.name)
            .collect();
        if !missing.is_empty() {
            return Err(OrmError::validation(format!(
                "missing required field(s) for '{}': {}",
                R::TABLE,
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

// ==================== OrderBy ====================

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    fn to_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Sort keys for `list`. The first key added sorts primary.
pub struct OrderBy<R> {
    entries: Vec<(String, SortDir)>,
    _record: PhantomData<fn() -> R>,
}

impl_record_input!(OrderBy, SortDir);

impl<R> OrderBy<R> {
    /// Sort by `field` in direction `dir`.
    pub fn by(mut self, field: &str, dir: SortDir) -> Self {
        upsert(&mut self.entries, field, dir);
        self
    }

    pub fn asc(self, field: &str) -> Self {
        self.by(field, SortDir::Asc)
    }

    pub fn desc(self, field: &str) -> Self {
        self.by(field, SortDir::Desc)
    }
}

impl<R: Record> OrderBy<R> {
    /// Every sort key must be a field of `R`.
    pub fn check(&self) -> OrmResult<()> {
        for (field, _) in &self.entries {
            R::field(field).ok_or_else(|| unknown_field::<R>(field))?;
        }
        Ok(())
    }
}

// ==================== Pagination ====================

/// LIMIT/OFFSET for `list`; either side may be omitted.
///
/// ```ignore
/// let first_five = Pagination::new().limit(5);
/// let third_page = Pagination::page(3, 25)?;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create pagination from a 1-based page number and page size.
    pub fn page(page: u64, per_page: u64) -> OrmResult<Self> {
        if page < 1 {
            return Err(OrmError::validation(format!(
                "page must be >= 1, got {page}"
            )));
        }
        Ok(Self {
            limit: Some(per_page),
            offset: Some((page - 1).saturating_mul(per_page)),
        })
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }
}

// ==================== Fragment builders ====================

fn bind_u64(n: u64) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Append `"col" = $n` items separated by `sep`.
fn push_assignments(sql: &mut Sql, entries: &[(String, Value)], sep: &str) {
    for (i, (field, value)) in entries.iter().enumerate() {
        if i > 0 {
            sql.push(sep);
        }
        sql.push_ident(field).push(" = ").push_bind(value.clone());
    }
}

/// ` WHERE "a" = $1 AND "b" = $2`, or blank for an empty predicate.
pub fn where_clause<R>(predicate: &Predicate<R>) -> Sql {
    let mut sql = Sql::empty();
    if predicate.entries.is_empty() {
        return sql;
    }
    sql.push(" WHERE ");
    push_assignments(&mut sql, &predicate.entries, " AND ");
    sql
}

/// ` ORDER BY "a" ASC, "b" DESC`, or blank when absent or empty.
pub fn order_clause<R>(order: Option<&OrderBy<R>>) -> Sql {
    let mut sql = Sql::empty();
    let Some(order) = order.filter(|o| !o.entries.is_empty()) else {
        return sql;
    };
    sql.push(" ORDER BY ");
    for (i, (field, dir)) in order.entries.iter().enumerate() {
        if i > 0 {
            sql.push(", ");
        }
        sql.push_ident(field).push(" ").push(dir.to_sql());
    }
    sql
}

/// ` LIMIT $n` and/or ` OFFSET $m`, in that order; blank when both absent.
pub fn pagination_clause(pagination: Option<&Pagination>) -> Sql {
    let mut sql = Sql::empty();
    let Some(pagination) = pagination else {
        return sql;
    };
    if let Some(limit) = pagination.limit {
        sql.push(" LIMIT ").push_bind(bind_u64(limit));
    }
    if let Some(offset) = pagination.offset {
        sql.push(" OFFSET ").push_bind(bind_u64(offset));
    }
    sql
}

/// ` SET "a" = $1, "b" = $2`, or blank for an empty update.
pub fn set_clause<R>(update: &Update<R>) -> Sql {
    let mut sql = Sql::empty();
    if update.entries.is_empty() {
        return sql;
    }
    sql.push(" SET ");
    push_assignments(&mut sql, &update.entries, ", ");
    sql
}

/// ` ("a", "b") VALUES ($1, $2)`; columns and values share insertion order.
///
/// An empty payload renders ` DEFAULT VALUES`.
pub fn values_clause<R>(create: &Create<R>) -> Sql {
    let mut sql = Sql::empty();
    if create.entries.is_empty() {
        sql.push(" DEFAULT VALUES");
        return sql;
    }

    sql.push(" (");
    for (i, (field, _)) in create.entries.iter().enumerate() {
        if i > 0 {
            sql.push(", ");
        }
        sql.push_ident(field);
    }
    sql.push(") VALUES (");
    for (i, (_, value)) in create.entries.iter().enumerate() {
        if i > 0 {
            sql.push(", ");
        }
        sql.push_bind(value.clone());
    }
    sql.push(")");
    sql
}
