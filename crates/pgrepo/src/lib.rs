//! # pgrepo
//!
//! Typed single-table repositories over parameterized PostgreSQL statements.
//!
//! ## Features
//!
//! - **Injection-safe by construction**: identifiers are always double-quoted,
//!   values are always bound as `$n` parameters
//! - **Shape-checked inputs**: predicates, change sets and create payloads are
//!   validated against the record's field descriptors before any SQL is built
//! - **Composable fragments**: [`Sql`] keeps text and parameters apart and
//!   numbers placeholders only at render time
//! - **Pluggable execution**: any [`Executor`] (client, transaction, pool) runs
//!   the finished [`Statement`]
//! - **Statement inspection**: a [`QueryHook`] sees every statement before it
//!   is dispatched; [`TracingSqlHook`] logs through `tracing`
//!
//! ## Repository
//!
//! ```ignore
//! use pgrepo::{Create, Database, Json, OrderBy, Pagination, Predicate, Record, Update};
//!
//! #[derive(Record)]
//! #[orm(table = "examples")]
//! struct Example {
//!     id: String,
//!     created_at: DateTime<Utc>,
//!     updated_at: DateTime<Utc>,
//!     flag: bool,
//!     metadata: Json<serde_json::Value>,
//! }
//!
//! let db = Database::new(pgrepo::create_pool(&url)?).with_hook(pgrepo::TracingSqlHook::new());
//! let examples = db.repository::<Example>();
//!
//! let id = examples
//!     .create(&Create::new().set("flag", true).set_json("metadata", &json!({"note": "hi"}))?)
//!     .await?;
//!
//! let recent = examples
//!     .list(
//!         &Predicate::new().eq("flag", true),
//!         Some(&Pagination::new().limit(10)),
//!         Some(&OrderBy::new().desc("created_at")),
//!     )
//!     .await?;
//!
//! examples.update(&Update::new().set("flag", false), &Predicate::id(&id)).await?;
//! examples.remove(&Predicate::id(&id)).await?;
//! ```

pub mod client;
pub mod error;
pub mod filter;
pub mod hook;
pub mod ident;
pub mod record;
pub mod repository;
pub mod row;
pub mod sql;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::Executor;
pub use error::{OrmError, OrmResult};
pub use filter::{
    Create, OrderBy, Pagination, Predicate, SortDir, Update, order_clause, pagination_clause,
    set_clause, values_clause, where_clause,
};
pub use hook::{CompositeHook, NoopHook, Operation, QueryContext, QueryHook, TracingSqlHook};
pub use ident::{quote, unquote};
pub use record::{FieldDescriptor, FieldKind, Record};
pub use repository::{Database, Repository};
pub use row::Row;
pub use sql::{Sql, Statement};
pub use value::{FromValue, Json, RawValue, Value};

#[cfg(feature = "pool")]
pub use pool::{
    create_pool, create_pool_with_config, create_pool_with_manager_config, create_pool_with_tls,
};

#[cfg(feature = "derive")]
pub use pgrepo_derive::Record;

// Re-export the driver so callers can name client and transaction types.
pub use tokio_postgres;
