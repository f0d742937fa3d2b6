//! DELETE builder.

use std::marker::PhantomData;

use crate::condition::Condition;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::executor::Executor;
use crate::render::{Rendered, Renderer};
use crate::schema::Table;
use crate::statement::{DeleteNode, Statement};

// Typestate markers

/// Marker: No WHERE clause yet; runs against every row.
#[derive(Debug)]
pub struct Unfiltered;
/// Marker: WHERE clause has been specified.
#[derive(Debug)]
pub struct Filtered;

/// A DELETE builder.
#[derive(Debug)]
pub struct Delete<S> {
    node: DeleteNode,
    _state: PhantomData<S>,
}

impl Delete<Unfiltered> {
    pub(super) const fn new(table: Table) -> Self {
        Self {
            node: DeleteNode {
                table,
                conditions: Vec::new(),
            },
            _state: PhantomData,
        }
    }

    /// Adds the WHERE clause; conditions are ANDed in the given order.
    #[must_use]
    pub fn where_clause(
        mut self,
        conditions: impl IntoIterator<Item = Condition>,
    ) -> Delete<Filtered> {
        self.node.conditions.extend(conditions);
        Delete {
            node: self.node,
            _state: PhantomData,
        }
    }
}

impl<S: Send + Sync> Delete<S> {
    /// Returns the statement node.
    #[must_use]
    pub const fn node(&self) -> &DeleteNode {
        &self.node
    }

    /// Finishes the builder.
    #[must_use]
    pub fn into_statement(self) -> Statement {
        Statement::Delete(self.node)
    }

    /// Renders for `dialect`.
    #[must_use]
    pub fn render(&self, dialect: Dialect) -> Rendered {
        Renderer::new(dialect).render_delete(&self.node)
    }

    /// Runs the delete.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn exec<E: Executor>(&self, db: &E) -> Result<E::Done, E::Error> {
        let rendered = db.renderer().render_delete(&self.node);
        db.execute(rendered).await
    }
}
