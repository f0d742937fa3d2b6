//! SQLite executor for sqlc statements.
//!
//! [`Db`] wraps a `sqlx` connection pool and implements
//! [`sqlc_core::Executor`], so the terminal builder operations run against
//! SQLite directly:
//!
//! ```no_run
//! use sqlc_core::field::Int;
//! use sqlc_core::{insert_into, select_all, Table};
//! use sqlc_sqlite::Db;
//!
//! # async fn demo() -> sqlc_sqlite::Result<()> {
//! let db = Db::connect("sqlite::memory:").await?;
//! let books = Table::new("books").with_column("id", sqlc_core::FieldKind::Int);
//! let id = books.column::<Int>("id")?;
//!
//! insert_into(&books).set(&id, 1)?.exec(&db).await?;
//! let rows = select_all().from(&books).query(&db).await?;
//! assert_eq!(rows.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! Rows come back as `sqlx::sqlite::SqliteRow`. [`Db::query_as`],
//! [`Db::query_row_as`] and [`Db::fetch_as`] map them through
//! `sqlx::FromRow` instead.

mod error;

pub use error::{DbError, Result};

use std::future::Future;
use std::sync::Arc;

use sqlc_core::{
    AliasGenerator, AliasSource, Dialect, Executor, InsertReturning, Rendered, Select,
    SelectStage, SqlValue,
};
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteQueryResult, SqliteRow};
use sqlx::{FromRow, Sqlite};
use tracing::debug;

/// A SQLite database that runs rendered statements.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
    aliases: Option<Arc<AliasGenerator>>,
}

impl Db {
    /// Opens a pool for `url`, e.g. `sqlite://books.db` or `sqlite::memory:`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(url).await?;
        debug!(url, "connected to sqlite");
        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            aliases: None,
        }
    }

    /// Names anonymous subqueries from `aliases` instead of the global
    /// generator.
    #[must_use]
    pub fn with_aliases(mut self, aliases: Arc<AliasGenerator>) -> Self {
        self.aliases = Some(aliases);
        self
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs a select and maps every row into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering, the query, or row mapping fails.
    pub async fn query_as<T, S>(&self, select: &Select<S>) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
        S: SelectStage,
    {
        let (sql, params) = self.renderer().render_select(select.node())?.into_parts();
        debug!(sql = %sql, params = params.len(), "fetching rows");
        let query = params
            .into_iter()
            .fold(sqlx::query_as::<_, T>(&sql), bind_param_as);
        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Runs a select and maps the first row, if any, into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering, the query, or row mapping fails.
    pub async fn query_row_as<T, S>(&self, select: &Select<S>) -> Result<Option<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
        S: SelectStage,
    {
        let (sql, params) = self.renderer().render_select(select.node())?.into_parts();
        debug!(sql = %sql, params = params.len(), "fetching optional row");
        let query = params
            .into_iter()
            .fold(sqlx::query_as::<_, T>(&sql), bind_param_as);
        Ok(query.fetch_optional(&self.pool).await?)
    }

    /// Runs an insert and maps its RETURNING row into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert or row mapping fails.
    pub async fn fetch_as<T>(&self, insert: &InsertReturning) -> Result<T>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let (sql, params) = self.renderer().render_insert(insert.node()).into_parts();
        debug!(sql = %sql, params = params.len(), "fetching returned row");
        let query = params
            .into_iter()
            .fold(sqlx::query_as::<_, T>(&sql), bind_param_as);
        Ok(query.fetch_one(&self.pool).await?)
    }
}

impl Executor for Db {
    type Row = SqliteRow;
    type Done = SqliteQueryResult;
    type Error = DbError;

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn aliases(&self) -> &dyn AliasSource {
        match &self.aliases {
            Some(aliases) => &**aliases,
            None => AliasGenerator::global(),
        }
    }

    fn execute(
        &self,
        statement: Rendered,
    ) -> impl Future<Output = Result<SqliteQueryResult>> + Send {
        async move {
            let (sql, params) = statement.into_parts();
            debug!(sql = %sql, params = params.len(), "executing statement");
            let query = params.into_iter().fold(sqlx::query(&sql), bind_param);
            let done = query.execute(&self.pool).await?;
            debug!(rows_affected = done.rows_affected(), "statement executed");
            Ok(done)
        }
    }

    fn fetch_all(
        &self,
        statement: Rendered,
    ) -> impl Future<Output = Result<Vec<SqliteRow>>> + Send {
        async move {
            let (sql, params) = statement.into_parts();
            debug!(sql = %sql, params = params.len(), "fetching rows");
            let query = params.into_iter().fold(sqlx::query(&sql), bind_param);
            Ok(query.fetch_all(&self.pool).await?)
        }
    }

    fn fetch_optional(
        &self,
        statement: Rendered,
    ) -> impl Future<Output = Result<Option<SqliteRow>>> + Send {
        async move {
            let (sql, params) = statement.into_parts();
            debug!(sql = %sql, params = params.len(), "fetching optional row");
            let query = params.into_iter().fold(sqlx::query(&sql), bind_param);
            Ok(query.fetch_optional(&self.pool).await?)
        }
    }

    fn fetch_one(
        &self,
        statement: Rendered,
    ) -> impl Future<Output = Result<SqliteRow>> + Send {
        async move {
            let (sql, params) = statement.into_parts();
            debug!(sql = %sql, params = params.len(), "fetching one row");
            let query = params.into_iter().fold(sqlx::query(&sql), bind_param);
            Ok(query.fetch_one(&self.pool).await?)
        }
    }
}

/// Binds a `SqlValue` parameter to a query.
fn bind_param<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Int64(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Timestamp(ts) => query.bind(ts),
    }
}

/// Binds a `SqlValue` parameter to a `query_as` query.
fn bind_param_as<'q, T>(
    query: QueryAs<'q, Sqlite, T, SqliteArguments<'q>>,
    value: SqlValue,
) -> QueryAs<'q, Sqlite, T, SqliteArguments<'q>>
where
    T: for<'r> FromRow<'r, SqliteRow>,
{
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Int64(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Timestamp(ts) => query.bind(ts),
    }
}
