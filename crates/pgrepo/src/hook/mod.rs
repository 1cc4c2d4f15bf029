//! Statement inspection hooks.
//!
//! A [`QueryHook`] sees every finished statement right before it is handed to
//! the executor. Hooks only observe: they receive a shared reference and
//! cannot change or cancel the statement.
//!
//! # Example
//!
//! ```rust,ignore
//! use pgrepo::{Database, QueryContext};
//!
//! let db = Database::new(client).with_hook(|ctx: &QueryContext<'_>| {
//!     println!("QUERY {}", ctx.statement.text);
//! });
//! ```

mod tracing_hook;

#[cfg(test)]
mod tests;

pub use tracing_hook::TracingSqlHook;

use crate::sql::Statement;
use std::fmt;
use std::sync::Arc;

/// The repository operation that produced a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetById,
    List,
    Count,
    Create,
    Update,
    Remove,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::GetById => "get_by_id",
            Operation::List => "list",
            Operation::Count => "count",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Remove => "remove",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a hook gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub operation: Operation,
    /// Unquoted table name.
    pub table: &'a str,
    pub statement: &'a Statement,
}

/// Observes statements before execution.
///
/// Hooks run synchronously on the calling task and must not block.
pub trait QueryHook: Send + Sync {
    fn before_query(&self, ctx: &QueryContext<'_>);
}

impl<F> QueryHook for F
where
    F: Fn(&QueryContext<'_>) + Send + Sync,
{
    fn before_query(&self, ctx: &QueryContext<'_>) {
        self(ctx)
    }
}

/// A hook that does nothing. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl QueryHook for NoopHook {
    fn before_query(&self, _ctx: &QueryContext<'_>) {}
}

/// Runs several hooks in insertion order.
#[derive(Clone, Default)]
pub struct CompositeHook {
    hooks: Vec<Arc<dyn QueryHook>>,
}

impl CompositeHook {
    /// Create an empty composite hook.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Add a hook.
    #[allow(clippy::should_implement_trait)]
    pub fn add<H: QueryHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Add an Arc-wrapped hook.
    pub fn add_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl QueryHook for CompositeHook {
    fn before_query(&self, ctx: &QueryContext<'_>) {
        for hook in &self.hooks {
            hook.before_query(ctx);
        }
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
