//! Generic single-table repositories.
//!
//! A [`Repository`] is parameterized by a [`Record`] type and a table name. It
//! compiles structured inputs into statements with fixed templates:
//!
//! | operation | statement |
//! |---|---|
//! | `get_by_id` | `SELECT * FROM "t" WHERE "id" = $1 LIMIT 1` |
//! | `list` | `SELECT * FROM "t"` + WHERE + ORDER BY + LIMIT/OFFSET |
//! | `count` | `SELECT COUNT(*) AS "count" FROM "t"` + WHERE |
//! | `create` | `INSERT INTO "t"` + VALUES + `RETURNING "id"` |
//! | `update` | `UPDATE "t"` + SET + WHERE + `RETURNING "id"` |
//! | `remove` | `DELETE FROM "t"` + WHERE + `RETURNING "id"` |
//!
//! Every statement is shown to the configured [`QueryHook`] and then run by the
//! [`Executor`].
//!
//! # Example
//!
//! ```ignore
//! use pgrepo::{Create, Database, Pagination, Predicate, Repository};
//!
//! let db = Database::new(client).with_hook(pgrepo::TracingSqlHook::new());
//! let examples: Repository<Example, _> = db.repository();
//!
//! let id = examples
//!     .create(&Create::new().set("flag", true).set_json("metadata", &meta)?)
//!     .await?;
//! let page = examples
//!     .list(&Predicate::new().eq("flag", true), Some(&Pagination::new().limit(5)), None)
//!     .await?;
//! ```

use crate::client::Executor;
use crate::error::{OrmError, OrmResult};
use crate::filter::{
    Create, OrderBy, Pagination, Predicate, Update, order_clause, pagination_clause, set_clause,
    values_clause, where_clause,
};
use crate::hook::{NoopHook, Operation, QueryContext, QueryHook};
use crate::record::Record;
use crate::row::Row;
use crate::sql::{Sql, Statement};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;


/// An executor plus the hook every statement is shown to.
///
/// Cloning is cheap; both parts are shared.
pub struct Database<E> {
    executor: Arc<E>,
    hook: Arc<dyn QueryHook>,
}

impl<E> Clone for Database<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            hook: Arc::clone(&self.hook),
        }
    }
}

impl<E> fmt::Debug for Database<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl<E: Executor> Database<E> {
    /// Wrap an executor, with no hook installed.
    pub fn new(executor: E) -> Self {
        Self::from_arc(Arc::new(executor))
    }

    /// Wrap an already shared executor.
    pub fn from_arc(executor: Arc<E>) -> Self {
        Self {
            executor,
            hook: Arc::new(NoopHook),
        }
    }

    /// Install the statement inspection hook (replaces any previous one).
    pub fn with_hook<H: QueryHook + 'static>(self, hook: H) -> Self {
        self.with_hook_arc(Arc::new(hook))
    }

    pub fn with_hook_arc(mut self, hook: Arc<dyn QueryHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// A repository for `R` on its declared table.
    pub fn repository<R: Record>(&self) -> Repository<R, E> {
        Repository::new(self.clone())
    }
}

/// CRUD over one table, typed by `R`.
pub struct Repository<R, E> {
    db: Database<E>,
    table: Cow<'static, str>,
    _record: PhantomData<fn() -> R>,
}

impl<R, E> Clone for Repository<R, E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            table: self.table.clone(),
            _record: PhantomData,
        }
    }
}

impl<R, E> fmt::Debug for Repository<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl<R: Record, E: Executor> Repository<R, E> {
    /// Repository on `R::TABLE`.
    pub fn new(db: Database<E>) -> Self {
        Self::with_table(db, R::TABLE)
    }

    /// Repository on an explicit table with `R`'s shape.
    pub fn with_table(db: Database<E>, table: impl Into<Cow<'static, str>>) -> Self {
        Self {
            db,
            table: table.into(),
            _record: PhantomData,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn table_ident(&self) -> Sql {
        Sql::ident(&self.table)
    }

    fn returning_id() -> Sql {
        let mut sql = Sql::new(" RETURNING ");
        sql.push_ident(R::id_column());
        sql
    }

    // ==================== Statement construction ====================

    /// `SELECT * FROM "t" WHERE "id" = $1 LIMIT 1`
    pub fn get_by_id_statement(&self, id: &str) -> Statement {
        let mut filter = Sql::new(" WHERE ");
        filter
            .push_ident(R::id_column())
            .push(" = ")
            .push_bind(id)
            .push(" LIMIT 1");

        Sql::new("SELECT * FROM ")
            .append(self.table_ident())
            .append(filter)
            .into_statement()
    }

    /// `SELECT * FROM "t"` + WHERE + ORDER BY + LIMIT/OFFSET
    pub fn list_statement(
        &self,
        predicate: &Predicate<R>,
        pagination: Option<&Pagination>,
        order: Option<&OrderBy<R>>,
    ) -> OrmResult<Statement> {
        predicate.check()?;
        if let Some(order) = order {
            order.check()?;
        }

        Ok(Sql::new("SELECT * FROM ")
            .append(self.table_ident())
            .append(where_clause(predicate))
            .append(order_clause(order))
            .append(pagination_clause(pagination))
            .into_statement())
    }

    /// `SELECT COUNT(*) AS "count" FROM "t"` + WHERE
    pub fn count_statement(&self, predicate: &Predicate<R>) -> OrmResult<Statement> {
        predicate.check()?;

        Ok(Sql::new(r#"SELECT COUNT(*) AS "count" FROM "#)
            .append(self.table_ident())
            .append(where_clause(predicate))
            .into_statement())
    }

    /// `INSERT INTO "t"` + VALUES + `RETURNING "id"`
    pub fn create_statement(&self, payload: &Create<R>) -> OrmResult<Statement> {
        payload.check()?;

        Ok(Sql::new("INSERT INTO ")
            .append(self.table_ident())
            .append(values_clause(payload))
            .append(Self::returning_id())
            .into_statement())
    }

    /// `UPDATE "t"` + SET + WHERE + `RETURNING "id"`.
    ///
    /// `None` when `changes` is empty: there is nothing to run.
    pub fn update_statement(
        &self,
        changes: &Update<R>,
        predicate: &Predicate<R>,
    ) -> OrmResult<Option<Statement>> {
        changes.check()?;
        predicate.check()?;
        if changes.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            Sql::new("UPDATE ")
                .append(self.table_ident())
                .append(set_clause(changes))
                .append(where_clause(predicate))
                .append(Self::returning_id())
                .into_statement(),
        ))
    }

    /// `DELETE FROM "t"` + WHERE + `RETURNING "id"`
    pub fn remove_statement(&self, predicate: &Predicate<R>) -> OrmResult<Statement> {
        predicate.check()?;

        Ok(Sql::new("DELETE FROM ")
            .append(self.table_ident())
            .append(where_clause(predicate))
            .append(Self::returning_id())
            .into_statement())
    }

    // ==================== Execution ====================

    async fn dispatch(&self, operation: Operation, statement: Statement) -> OrmResult<Vec<Row>> {
        self.db.hook.before_query(&QueryContext {
            operation,
            table: &self.table,
            statement: &statement,
        });
        self.db.executor.query(&statement).await
    }

    fn ids(rows: &[Row]) -> OrmResult<Vec<String>> {
        let column = R::id_column();
        rows.iter().map(|row| row.try_get::<String>(column)).collect()
    }

    /// Fetch one record by id. `Ok(None)` when no row matches.
    pub async fn get_by_id(&self, id: &str) -> OrmResult<Option<R>> {
        let statement = self.get_by_id_statement(id);
        let rows = self.dispatch(Operation::GetById, statement).await?;
        rows.first().map(R::from_row).transpose()
    }

    /// Records matching `predicate`, optionally sorted and paginated.
    pub async fn list(
        &self,
        predicate: &Predicate<R>,
        pagination: Option<&Pagination>,
        order: Option<&OrderBy<R>>,
    ) -> OrmResult<Vec<R>> {
        let statement = self.list_statement(predicate, pagination, order)?;
        let rows = self.dispatch(Operation::List, statement).await?;
        rows.iter().map(R::from_row).collect()
    }

    /// Number of records matching `predicate`.
    ///
    /// The executor must return exactly one summary row; anything else is
    /// reported as [`OrmError::UnexpectedRowCount`].
    pub async fn count(&self, predicate: &Predicate<R>) -> OrmResult<u64> {
        let statement = self.count_statement(predicate)?;
        let rows = self.dispatch(Operation::Count, statement).await?;
        match rows.as_slice() {
            [row] => row.try_get::<u64>("count"),
            _ => Err(OrmError::unexpected_row_count(1, rows.len())),
        }
    }

    /// Insert a record and return its server-generated id.
    pub async fn create(&self, payload: &Create<R>) -> OrmResult<String> {
        let statement = self.create_statement(payload)?;
        let rows = self.dispatch(Operation::Create, statement).await?;
        match rows.as_slice() {
            [row] => row.try_get::<String>(R::id_column()),
            _ => Err(OrmError::unexpected_row_count(1, rows.len())),
        }
    }

    /// Apply `changes` to every record matching `predicate`; returns the ids touched.
    ///
    /// An empty change set is a no-op and is not sent to the executor.
    pub async fn update(
        &self,
        changes: &Update<R>,
        predicate: &Predicate<R>,
    ) -> OrmResult<Vec<String>> {
        let Some(statement) = self.update_statement(changes, predicate)? else {
            tracing::debug!(target: "pgrepo", table = %self.table, "empty update skipped");
            return Ok(Vec::new());
        };
        let rows = self.dispatch(Operation::Update, statement).await?;
        Self::ids(&rows)
    }

    /// Delete every record matching `predicate`; returns the ids deleted.
    ///
    /// An empty predicate deletes the whole table.
    pub async fn remove(&self, predicate: &Predicate<R>) -> OrmResult<Vec<String>> {
        let statement = self.remove_statement(predicate)?;
        let rows = self.dispatch(Operation::Remove, statement).await?;
        Self::ids(&rows)
    }
}
