//! Composable SQL fragments.
//!
//! [`Sql`] stores SQL text and parameter slots separately and only numbers the
//! `$1, $2, ...` placeholders when the fragment is rendered. Fragments built
//! independently can therefore be concatenated in any combination and the
//! placeholders always line up with the parameter list.
//!
//! # Example
//!
//! ```ignore
//! use pgrepo::Sql;
//!
//! let mut filter = Sql::empty();
//! filter.push(" WHERE ").push_ident("flag").push(" = ").push_bind(true);
//!
//! let q = Sql::new("SELECT * FROM ").append(Sql::ident("examples")).append(filter);
//! assert_eq!(q.to_sql(), r#"SELECT * FROM "examples" WHERE "flag" = $1"#);
//! ```

use crate::ident;
use crate::value::Value;
use std::fmt::Write;
use std::ops::Add;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone, PartialEq)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A SQL fragment: ordered text and parameter slots, plus the bound values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Value>,
}

impl Sql {
    /// Create a fragment from literal SQL text.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        let initial_sql: String = initial_sql.into();
        let mut sql = Self::empty();
        sql.push(&initial_sql);
        sql
    }

    /// A fragment of literal SQL text. Same as [`Sql::new`].
    pub fn raw(text: &str) -> Self {
        Self::new(text)
    }

    /// The blank fragment. Renders to an empty string and binds nothing.
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            params: Vec::new(),
        }
    }

    /// A fragment holding a single bound parameter.
    pub fn bind(value: impl Into<Value>) -> Self {
        let mut sql = Self::empty();
        sql.push_bind(value);
        sql
    }

    /// A fragment holding a single quoted identifier.
    pub fn ident(name: &str) -> Self {
        let mut sql = Self::empty();
        sql.push_ident(name);
        sql
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append a table or column name, quoted with [`ident::quote`].
    pub fn push_ident(&mut self, name: &str) -> &mut Self {
        let mut quoted = String::with_capacity(name.len() + 2);
        ident::write_quoted(&mut quoted, name);
        self.push(&quoted)
    }

    /// Append another fragment, consuming it.
    pub fn push_sql(&mut self, other: Sql) -> &mut Self {
        for part in other.parts {
            match part {
                SqlPart::Raw(s) => {
                    self.push(&s);
                }
                SqlPart::Param => self.parts.push(SqlPart::Param),
            }
        }
        self.params.extend(other.params);
        self
    }

    /// Concatenate two fragments into a new one.
    ///
    /// Text and parameters keep their relative order, so placeholder numbers
    /// in the result follow `self` first, then `other`.
    #[must_use]
    pub fn append(mut self, other: Sql) -> Sql {
        self.push_sql(other);
        self
    }

    /// `true` when the fragment binds nothing and contains only whitespace.
    pub fn is_blank(&self) -> bool {
        self.params.is_empty()
            && self.parts.iter().all(|p| match p {
                SqlPart::Raw(s) => s.trim().is_empty(),
                SqlPart::Param => false,
            })
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    let _ = write!(&mut out, "${}", idx);
                }
            }
        }
        out
    }

    /// Bound values, in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Render into the `{ text, params }` pair handed to an executor.
    pub fn into_statement(self) -> Statement {
        Statement {
            text: self.to_sql(),
            params: self.params,
        }
    }
}

impl Add for Sql {
    type Output = Sql;

    fn add(self, rhs: Sql) -> Sql {
        self.append(rhs)
    }
}

/// A finished, parameterized statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text with `$n` placeholders.
    pub text: String,
    /// Values for the placeholders, `params[0]` binds `$1`.
    pub params: Vec<Value>,
}

impl Statement {
    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }
}
