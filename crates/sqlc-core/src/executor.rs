//! The seam between rendered statements and a database driver.
//!
//! The core never opens connections. Terminal builder operations
//! (`query`, `query_row`, `exec`, `fetch`) render with the executor's
//! dialect and alias source, then hand the [`Rendered`] statement over.

use std::future::Future;

use crate::alias::{AliasGenerator, AliasSource};
use crate::dialect::Dialect;
use crate::error::Error;
use crate::render::{Rendered, Renderer};

/// Runs rendered statements against a database.
pub trait Executor: Sync {
    /// A result row.
    type Row: Send;

    /// Outcome of a statement that returns no rows.
    type Done: Send;

    /// Driver error, able to carry builder and renderer errors too.
    type Error: From<Error> + Send;

    /// Dialect statements are rendered in.
    fn dialect(&self) -> Dialect;

    /// Source of subquery aliases.
    fn aliases(&self) -> &dyn AliasSource {
        AliasGenerator::global()
    }

    /// Returns a renderer configured for this executor.
    fn renderer(&self) -> Renderer<'_> {
        Renderer::new(self.dialect()).with_aliases(self.aliases())
    }

    /// Executes a statement, discarding any rows.
    fn execute(
        &self,
        statement: Rendered,
    ) -> impl Future<Output = Result<Self::Done, Self::Error>> + Send;

    /// Fetches every row.
    fn fetch_all(
        &self,
        statement: Rendered,
    ) -> impl Future<Output = Result<Vec<Self::Row>, Self::Error>> + Send;

    /// Fetches at most one row.
    fn fetch_optional(
        &self,
        statement: Rendered,
    ) -> impl Future<Output = Result<Option<Self::Row>, Self::Error>> + Send;

    /// Fetches exactly one row; no row is a driver error.
    fn fetch_one(
        &self,
        statement: Rendered,
    ) -> impl Future<Output = Result<Self::Row, Self::Error>> + Send;
}
