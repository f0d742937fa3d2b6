//! SELECT builder.
//!
//! Stage order: [`SelectFrom`] → [`Select<Sourced>`] (joins, each through
//! [`SelectOn`]) → [`Select<Filtered>`] → [`Select<Grouped>`] →
//! [`Select<Ordered>`]. Every stage after `from` can be rendered or run.

use std::marker::PhantomData;

use super::check_join_scope;
use crate::condition::{Condition, JoinCondition};
use crate::dialect::Dialect;
use crate::error::{Rejected, Result};
use crate::executor::Executor;
use crate::field::Field;
use crate::render::{Rendered, Renderer};
use crate::statement::{
    Join, JoinKind, Order, OrderTerm, SelectNode, Selectable, Statement, Subquery,
};
use crate::value::SqlValue;

// Typestate markers

/// Marker: FROM given, joins may follow.
#[derive(Debug)]
pub struct Sourced;
/// Marker: WHERE given.
#[derive(Debug)]
pub struct Filtered;
/// Marker: GROUP BY given.
#[derive(Debug)]
pub struct Grouped;
/// Marker: ORDER BY given.
#[derive(Debug)]
pub struct Ordered;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Sourced {}
    impl Sealed for super::Filtered {}
    impl Sealed for super::Grouped {}
    impl Sealed for super::Ordered {}
}

/// Stages at which a select is complete.
pub trait SelectStage: sealed::Sealed + Send + Sync {}

impl SelectStage for Sourced {}
impl SelectStage for Filtered {}
impl SelectStage for Grouped {}
impl SelectStage for Ordered {}

/// Stages that still accept GROUP BY.
pub trait Groupable: SelectStage {}

impl Groupable for Sourced {}
impl Groupable for Filtered {}

/// Stages that still accept ORDER BY.
pub trait Orderable: SelectStage {}

impl Orderable for Sourced {}
impl Orderable for Filtered {}
impl Orderable for Grouped {}
impl Orderable for Ordered {}

/// A select waiting for its FROM source.
#[derive(Debug)]
#[must_use = "a select does nothing until it has a source"]
pub struct SelectFrom {
    projection: Vec<Field>,
    count: bool,
}

impl SelectFrom {
    pub(super) const fn new(projection: Vec<Field>, count: bool) -> Self {
        Self { projection, count }
    }

    /// Sets the FROM source: a table or a subquery.
    pub fn from(self, source: impl Into<Selectable>) -> Select<Sourced> {
        Select::with_node(SelectNode::new(self.projection, source.into(), self.count))
    }
}

/// A select with a source.
#[derive(Debug)]
pub struct Select<S> {
    node: SelectNode,
    _stage: PhantomData<S>,
}

impl<S> Select<S> {
    const fn with_node(node: SelectNode) -> Self {
        Self {
            node,
            _stage: PhantomData,
        }
    }

    fn into_stage<T>(self) -> Select<T> {
        Select::with_node(self.node)
    }
}

impl Select<Sourced> {
    /// Starts an inner join against `target`.
    #[must_use]
    pub fn join(self, target: impl Into<Selectable>) -> SelectOn {
        SelectOn::new(self.node, target.into(), JoinKind::Inner)
    }

    /// Starts a left outer join against `target`.
    #[must_use]
    pub fn left_outer_join(self, target: impl Into<Selectable>) -> SelectOn {
        SelectOn::new(self.node, target.into(), JoinKind::LeftOuter)
    }

    /// Adds the WHERE clause; conditions are ANDed in the given order.
    #[must_use]
    pub fn where_clause(
        mut self,
        conditions: impl IntoIterator<Item = Condition>,
    ) -> Select<Filtered> {
        self.node.conditions.extend(conditions);
        self.into_stage()
    }
}

impl<S: Groupable> Select<S> {
    /// Adds the GROUP BY clause.
    #[must_use]
    pub fn group_by(mut self, fields: &[&Field]) -> Select<Grouped> {
        self.node.groups.extend(fields.iter().map(|f| (*f).clone()));
        self.into_stage()
    }
}

impl<S: Orderable> Select<S> {
    fn push_order(mut self, fields: &[&Field], order: Order) -> Select<Ordered> {
        self.node.ordering.extend(fields.iter().map(|f| OrderTerm {
            field: (*f).clone(),
            order,
        }));
        self.into_stage()
    }

    /// Adds ascending ORDER BY terms. May be called again to append.
    #[must_use]
    pub fn order_by(self, fields: &[&Field]) -> Select<Ordered> {
        self.push_order(fields, Order::Asc)
    }

    /// Adds descending ORDER BY terms. May be called again to append.
    #[must_use]
    pub fn order_by_desc(self, fields: &[&Field]) -> Select<Ordered> {
        self.push_order(fields, Order::Desc)
    }
}

impl<S: SelectStage> Select<S> {
    /// Sets the alias used when this select is nested in another query.
    ///
    /// Aliased subqueries render identically every time.
    #[must_use]
    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.node.alias = Some(alias.into());
        self
    }

    /// Returns the statement node built so far.
    #[must_use]
    pub const fn node(&self) -> &SelectNode {
        &self.node
    }

    /// Freezes the select for use as a source of another query.
    #[must_use]
    pub fn into_subquery(self) -> Subquery {
        Subquery::new(self.node)
    }

    /// Finishes the builder.
    #[must_use]
    pub fn into_statement(self) -> Statement {
        Statement::Select(self.node)
    }

    /// Renders for `dialect` with the process-wide alias generator.
    ///
    /// # Errors
    ///
    /// Fails only if an anonymous subquery cannot be named.
    pub fn render(&self, dialect: Dialect) -> Result<Rendered> {
        Renderer::new(dialect).render_select(&self.node)
    }

    /// Renders for `dialect` and splits the result.
    ///
    /// # Errors
    ///
    /// Fails only if an anonymous subquery cannot be named.
    pub fn to_sql(&self, dialect: Dialect) -> Result<(String, Vec<SqlValue>)> {
        self.render(dialect).map(Rendered::into_parts)
    }

    /// Runs the select and returns every row.
    ///
    /// # Errors
    ///
    /// Returns the executor's error, which also carries rendering errors.
    pub async fn query<E: Executor>(&self, db: &E) -> Result<Vec<E::Row>, E::Error> {
        let rendered = db.renderer().render_select(&self.node)?;
        db.fetch_all(rendered).await
    }

    /// Runs the select and returns the first row, if any.
    ///
    /// # Errors
    ///
    /// Returns the executor's error, which also carries rendering errors.
    pub async fn query_row<E: Executor>(&self, db: &E) -> Result<Option<E::Row>, E::Error> {
        let rendered = db.renderer().render_select(&self.node)?;
        db.fetch_optional(rendered).await
    }
}

/// A join waiting for its ON conditions.
#[derive(Debug)]
#[must_use = "a join needs its ON conditions"]
pub struct SelectOn {
    node: SelectNode,
    target: Selectable,
    kind: JoinKind,
}

impl SelectOn {
    const fn new(node: SelectNode, target: Selectable, kind: JoinKind) -> Self {
        Self { node, target, kind }
    }

    /// Completes the join; the conditions are ANDed in order.
    ///
    /// # Errors
    ///
    /// Rejects an empty condition list, a target subquery that is already a
    /// source of this select, and conditions on fields that are neither
    /// from the target nor from a source already in the query.
    pub fn on(
        self,
        conditions: impl IntoIterator<Item = JoinCondition>,
    ) -> Result<Select<Sourced>, Rejected<Self>> {
        let conditions: Vec<_> = conditions.into_iter().collect();
        if let Err(error) = check_join_scope(&self.node, &self.target, &conditions) {
            return Err(Rejected::new(error, self));
        }
        let Self {
            mut node,
            target,
            kind,
        } = self;
        node.joins.push(Join {
            target,
            kind,
            conditions,
        });
        Ok(Select::with_node(node))
    }
}
