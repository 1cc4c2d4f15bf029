//! The database-executor contract.
//!
//! An [`Executor`] runs one finished [`Statement`] and returns its rows. It is
//! the only boundary the repository depends on: pooling, transactions, TLS and
//! the wire protocol all live behind it.
//!
//! Implementations are provided for `tokio_postgres::Client`,
//! `tokio_postgres::Transaction`, and (feature `pool`) the `deadpool-postgres`
//! client and transaction types. Passing a transaction anywhere an executor is
//! expected scopes repository calls to it.

use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::sql::Statement;
use std::future::Future;
use std::sync::Arc;

/// Runs parameterized statements.
pub trait Executor: Send + Sync {
    /// Execute `statement` and return every row it produced.
    ///
    /// Errors from the store (connectivity, constraint violations, syntax)
    /// are returned as-is; no retry happens at this level.
    fn query(&self, statement: &Statement) -> impl Future<Output = OrmResult<Vec<Row>>> + Send;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn query(&self, statement: &Statement) -> impl Future<Output = OrmResult<Vec<Row>>> + Send {
        (**self).query(statement)
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn query(&self, statement: &Statement) -> impl Future<Output = OrmResult<Vec<Row>>> + Send {
        (**self).query(statement)
    }
}

fn decode_rows(rows: Vec<tokio_postgres::Row>) -> OrmResult<Vec<Row>> {
    rows.iter().map(Row::try_from).collect()
}

impl Executor for tokio_postgres::Client {
    async fn query(&self, statement: &Statement) -> OrmResult<Vec<Row>> {
        let params = statement.params_ref();
        let rows = tokio_postgres::Client::query(self, statement.text.as_str(), &params)
            .await
            .map_err(OrmError::from_db_error)?;
        decode_rows(rows)
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    async fn query(&self, statement: &Statement) -> OrmResult<Vec<Row>> {
        let params = statement.params_ref();
        let rows = tokio_postgres::Transaction::query(self, statement.text.as_str(), &params)
            .await
            .map_err(OrmError::from_db_error)?;
        decode_rows(rows)
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Client {
    async fn query(&self, statement: &Statement) -> OrmResult<Vec<Row>> {
        // Delegate to the deref target (ClientWrapper -> tokio_postgres::Client).
        let client: &tokio_postgres::Client = self;
        Executor::query(client, statement).await
    }
}

#[cfg(feature = "pool")]
impl Executor for deadpool_postgres::Transaction<'_> {
    async fn query(&self, statement: &Statement) -> OrmResult<Vec<Row>> {
        let txn: &tokio_postgres::Transaction<'_> = self;
        Executor::query(txn, statement).await
    }
}
