//! UPDATE builder.

use std::marker::PhantomData;

use super::check_assignment;
use crate::condition::Condition;
use crate::dialect::Dialect;
use crate::error::{Rejected, Result};
use crate::executor::Executor;
use crate::field::{Column, Field, Kind, ValueFor};
use crate::render::{Rendered, Renderer};
use crate::schema::Table;
use crate::statement::{Assignment, Statement, UpdateNode};
use crate::value::{SqlValue, ToSqlValue};

// Typestate markers

/// Marker: No SET clause yet.
#[derive(Debug)]
pub struct NoSet;
/// Marker: SET clause has been specified.
#[derive(Debug)]
pub struct HasSet;
/// Marker: WHERE clause has been specified.
#[derive(Debug)]
pub struct Filtered;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::HasSet {}
    impl Sealed for super::Filtered {}
}

/// Stages at which an update can be run.
pub trait Runnable: sealed::Sealed + Send + Sync {}

impl Runnable for HasSet {}
impl Runnable for Filtered {}

/// An UPDATE builder.
#[derive(Debug)]
pub struct Update<S> {
    node: UpdateNode,
    _state: PhantomData<S>,
}

impl<S> Update<S> {
    const fn with_node(node: UpdateNode) -> Self {
        Self {
            node,
            _state: PhantomData,
        }
    }
}

impl Update<NoSet> {
    pub(super) const fn new(table: Table) -> Self {
        Self::with_node(UpdateNode {
            table,
            bindings: Vec::new(),
            conditions: Vec::new(),
        })
    }
}

macro_rules! impl_set {
    ($($stage:ty),+) => {
        $(
            impl Update<$stage> {
                fn bind(
                    mut self,
                    field: &Field,
                    value: SqlValue,
                ) -> Result<Update<HasSet>, Rejected<Self>> {
                    if let Err(error) =
                        check_assignment(&self.node.table, &self.node.bindings, field, &value)
                    {
                        return Err(Rejected::new(error, self));
                    }
                    self.node.bindings.push(Assignment {
                        field: field.clone(),
                        value,
                    });
                    Ok(Update::with_node(self.node))
                }

                /// Assigns `value` to a typed column.
                ///
                /// # Errors
                ///
                /// Rejects columns of another table and columns already set.
                pub fn set<K: Kind, T: ValueFor<K>>(
                    self,
                    column: &Column<K>,
                    value: T,
                ) -> Result<Update<HasSet>, Rejected<Self>> {
                    self.bind(column.field(), value.into_value())
                }

                /// Assigns a runtime value to a field, checking its type.
                ///
                /// # Errors
                ///
                /// Rejects values whose type disagrees with the field's kind,
                /// columns of another table and columns already set.
                pub fn set_value(
                    self,
                    field: &Field,
                    value: impl ToSqlValue,
                ) -> Result<Update<HasSet>, Rejected<Self>> {
                    self.bind(field, value.to_sql_value())
                }
            }
        )+
    };
}

impl_set!(NoSet, HasSet);

impl Update<HasSet> {
    /// Adds the WHERE clause; conditions are ANDed in the given order.
    #[must_use]
    pub fn where_clause(
        mut self,
        conditions: impl IntoIterator<Item = Condition>,
    ) -> Update<Filtered> {
        self.node.conditions.extend(conditions);
        Update::with_node(self.node)
    }
}

impl<S: Runnable> Update<S> {
    /// Returns the statement node.
    #[must_use]
    pub const fn node(&self) -> &UpdateNode {
        &self.node
    }

    /// Finishes the builder.
    #[must_use]
    pub fn into_statement(self) -> Statement {
        Statement::Update(self.node)
    }

    /// Renders for `dialect`.
    #[must_use]
    pub fn render(&self, dialect: Dialect) -> Rendered {
        Renderer::new(dialect).render_update(&self.node)
    }

    /// Runs the update.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn exec<E: Executor>(&self, db: &E) -> Result<E::Done, E::Error> {
        let rendered = db.renderer().render_update(&self.node);
        db.execute(rendered).await
    }
}
