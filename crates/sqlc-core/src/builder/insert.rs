//! INSERT builder.

use std::marker::PhantomData;

use super::{check_assignment, check_owned};
use crate::dialect::Dialect;
use crate::error::{Rejected, Result};
use crate::executor::Executor;
use crate::field::{Column, Field, Kind, ValueFor};
use crate::render::{Rendered, Renderer};
use crate::schema::Table;
use crate::statement::{Assignment, InsertNode, Statement};
use crate::value::{SqlValue, ToSqlValue};

// Typestate markers

/// Marker: No values specified yet.
#[derive(Debug)]
pub struct NoValues;
/// Marker: Values have been specified.
#[derive(Debug)]
pub struct HasValues;

/// An INSERT builder.
///
/// `set` may be called any number of times, once per column. Only
/// `Insert<HasValues>` can be run.
#[derive(Debug)]
pub struct Insert<V> {
    node: InsertNode,
    _state: PhantomData<V>,
}

impl Insert<NoValues> {
    pub(super) const fn new(table: Table) -> Self {
        Self {
            node: InsertNode {
                table,
                bindings: Vec::new(),
                returning: None,
            },
            _state: PhantomData,
        }
    }
}

impl<V> Insert<V> {
    fn bind(mut self, field: &Field, value: SqlValue) -> Result<Insert<HasValues>, Rejected<Self>> {
        if let Err(error) = check_assignment(&self.node.table, &self.node.bindings, field, &value) {
            return Err(Rejected::new(error, self));
        }
        self.node.bindings.push(Assignment {
            field: field.clone(),
            value,
        });
        Ok(Insert {
            node: self.node,
            _state: PhantomData,
        })
    }

    /// Binds `value` to a typed column.
    ///
    /// # Errors
    ///
    /// Rejects columns of another table and columns already set.
    pub fn set<K: Kind, T: ValueFor<K>>(
        self,
        column: &Column<K>,
        value: T,
    ) -> Result<Insert<HasValues>, Rejected<Self>> {
        self.bind(column.field(), value.into_value())
    }

    /// Binds a runtime value to a field, checking its type.
    ///
    /// # Errors
    ///
    /// Rejects values whose type disagrees with the field's kind, columns
    /// of another table and columns already set. The builder is handed
    /// back unchanged.
    pub fn set_value(
        self,
        field: &Field,
        value: impl ToSqlValue,
    ) -> Result<Insert<HasValues>, Rejected<Self>> {
        self.bind(field, value.to_sql_value())
    }
}

impl Insert<HasValues> {
    /// Adds `RETURNING column`.
    ///
    /// Dialects without RETURNING render the insert without it.
    ///
    /// # Errors
    ///
    /// Rejects a field that is not a column of the target table.
    pub fn returning(mut self, field: &Field) -> Result<InsertReturning, Rejected<Self>> {
        if let Err(error) = check_owned(&self.node.table, field, "RETURNING column") {
            return Err(Rejected::new(error, self));
        }
        self.node.returning = Some(field.clone());
        Ok(InsertReturning { node: self.node })
    }

    /// Returns the statement node.
    #[must_use]
    pub const fn node(&self) -> &InsertNode {
        &self.node
    }

    /// Finishes the builder.
    #[must_use]
    pub fn into_statement(self) -> Statement {
        Statement::Insert(self.node)
    }

    /// Renders for `dialect`.
    #[must_use]
    pub fn render(&self, dialect: Dialect) -> Rendered {
        Renderer::new(dialect).render_insert(&self.node)
    }

    /// Runs the insert.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn exec<E: Executor>(&self, db: &E) -> Result<E::Done, E::Error> {
        db.execute(db.renderer().render_insert(&self.node)).await
    }
}

/// An INSERT with a RETURNING column.
#[derive(Debug)]
pub struct InsertReturning {
    node: InsertNode,
}

impl InsertReturning {
    /// Returns the statement node.
    #[must_use]
    pub const fn node(&self) -> &InsertNode {
        &self.node
    }

    /// Finishes the builder.
    #[must_use]
    pub fn into_statement(self) -> Statement {
        Statement::Insert(self.node)
    }

    /// Renders for `dialect`.
    #[must_use]
    pub fn render(&self, dialect: Dialect) -> Rendered {
        Renderer::new(dialect).render_insert(&self.node)
    }

    /// Runs the insert and returns the row holding the RETURNING column.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn fetch<E: Executor>(&self, db: &E) -> Result<E::Row, E::Error> {
        db.fetch_one(db.renderer().render_insert(&self.node)).await
    }

    /// Runs the insert, ignoring the returned row.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn exec<E: Executor>(&self, db: &E) -> Result<E::Done, E::Error> {
        db.execute(db.renderer().render_insert(&self.node)).await
    }
}
