//! The statement tree.
//!
//! Nodes are assembled by the staged builder and are read-only once
//! built. The renderer walks them; nothing else looks inside.

use std::sync::Arc;

use crate::condition::{Condition, JoinCondition};
use crate::error::Result;
use crate::field::{Column, Field, Kind, Owner, SubqueryRef};
use crate::schema::Table;
use crate::value::SqlValue;

/// A complete SQL statement.
#[derive(Debug, Clone)]
pub enum Statement {
    /// `SELECT ...`
    Select(SelectNode),
    /// `INSERT INTO ...`
    Insert(InsertNode),
    /// `UPDATE ...`
    Update(UpdateNode),
    /// `DELETE FROM ...`
    Delete(DeleteNode),
}

impl From<SelectNode> for Statement {
    fn from(node: SelectNode) -> Self {
        Self::Select(node)
    }
}

impl From<InsertNode> for Statement {
    fn from(node: InsertNode) -> Self {
        Self::Insert(node)
    }
}

impl From<UpdateNode> for Statement {
    fn from(node: UpdateNode) -> Self {
        Self::Update(node)
    }
}

impl From<DeleteNode> for Statement {
    fn from(node: DeleteNode) -> Self {
        Self::Delete(node)
    }
}

/// Anything usable as a FROM or JOIN target.
#[derive(Debug, Clone)]
pub enum Selectable {
    /// A base table.
    Table(Table),
    /// A nested SELECT.
    Subquery(Subquery),
}

impl Selectable {
    /// Returns the fields this source produces.
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        match self {
            Self::Table(t) => t.fields(),
            Self::Subquery(q) => q.fields(),
        }
    }

    /// Returns true if both sources are the same subquery.
    pub(crate) fn is_same_subquery(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Subquery(a), Self::Subquery(b)) if Arc::ptr_eq(&a.node, &b.node)
        )
    }

        /// Returns true if `field` was taken from this source.
    pub(crate) fn owns(&self, field: &Field) -> bool {
        match self {
            Self::Table(t) => field.is_owned_by_table(t.name()),
            Self::Subquery(q) => field.is_owned_by_subquery(&q.node),
        }
    }
}

impl From<Table> for Selectable {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<&Table> for Selectable {
    fn from(table: &Table) -> Self {
        Self::Table(table.clone())
    }
}

impl From<Subquery> for Selectable {
    fn from(subquery: Subquery) -> Self {
        Self::Subquery(subquery)
    }
}

impl From<&Subquery> for Selectable {
    fn from(subquery: &Subquery) -> Self {
        Self::Subquery(subquery.clone())
    }
}

/// A completed SELECT used as a source of another query.
///
/// Cloning is cheap: clones share the same node, and fields taken from
/// any clone resolve to the same source when rendered.
#[derive(Debug, Clone)]
pub struct Subquery {
    pub(crate) node: Arc<SelectNode>,
}

impl Subquery {
    pub(crate) fn new(node: SelectNode) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    /// Returns the explicit alias, if the select was given one.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.node.alias.as_deref()
    }

    /// Returns the wrapped select.
    #[must_use]
    pub fn node(&self) -> &SelectNode {
        &self.node
    }

    fn owner(&self) -> Owner {
        Owner::Subquery(SubqueryRef {
            node: Arc::downgrade(&self.node),
            alias: self.node.alias.clone(),
        })
    }

    /// Returns the fields this subquery exposes to an enclosing query.
    ///
    /// A `SELECT *` exposes the fields of its own source followed by those
    /// of each join target. A count-only select exposes nothing.
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        let owner = self.owner();
        let exposed = if self.node.count {
            Vec::new()
        } else if self.node.projection.is_empty() {
            let mut fields = self.node.source.fields();
            fields.extend(self.node.joins.iter().flat_map(|j| j.target.fields()));
            fields
        } else {
            self.node.projection.clone()
        };
        exposed.iter().map(|f| f.reowned(owner.clone())).collect()
    }

    /// Looks up an exposed field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Field> {
        self.fields().into_iter().find(|f| f.name() == name)
    }

    /// Returns a typed column of this subquery.
    ///
    /// Like [`Table::column`], a name the subquery does not expose is
    /// allowed, but an exposed one must be asked for with its kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if `name`
    /// is exposed with a kind other than `K`.
    pub fn column<K: Kind>(&self, name: impl Into<String>) -> Result<Column<K>> {
        let name = name.into();
        if let Some(exposed) = self.field(&name) {
            exposed.expect_kind(K::KIND)?;
        }
        Ok(Column::wrap(Field::owned(name, K::KIND, self.owner())))
    }
}

/// Sort direction of an ORDER BY term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Ascending (rendered without a keyword).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// One ORDER BY term.
#[derive(Debug, Clone)]
pub struct OrderTerm {
    pub(crate) field: Field,
    pub(crate) order: Order,
}

impl OrderTerm {
    /// Returns the ordered field.
    #[must_use]
    pub const fn field(&self) -> &Field {
        &self.field
    }

    /// Returns the direction.
    #[must_use]
    pub const fn order(&self) -> Order {
        self.order
    }
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `JOIN`
    Inner,
    /// `LEFT OUTER JOIN`
    LeftOuter,
}

impl JoinKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
        }
    }
}

/// A join against another source; its conditions are ANDed.
#[derive(Debug, Clone)]
pub struct Join {
    pub(crate) target: Selectable,
    pub(crate) kind: JoinKind,
    pub(crate) conditions: Vec<JoinCondition>,
}

impl Join {
    /// Returns the joined source.
    #[must_use]
    pub const fn target(&self) -> &Selectable {
        &self.target
    }

    /// Returns the join kind.
    #[must_use]
    pub const fn kind(&self) -> JoinKind {
        self.kind
    }

    /// Returns the conditions in declaration order.
    #[must_use]
    pub fn conditions(&self) -> &[JoinCondition] {
        &self.conditions
    }
}

/// A SELECT statement.
#[derive(Debug, Clone)]
pub struct SelectNode {
    pub(crate) projection: Vec<Field>,
    pub(crate) source: Selectable,
    pub(crate) joins: Vec<Join>,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) groups: Vec<Field>,
    pub(crate) ordering: Vec<OrderTerm>,
    pub(crate) alias: Option<String>,
    pub(crate) count: bool,
}

impl SelectNode {
    pub(crate) const fn new(projection: Vec<Field>, source: Selectable, count: bool) -> Self {
        Self {
            projection,
            source,
            joins: Vec::new(),
            conditions: Vec::new(),
            groups: Vec::new(),
            ordering: Vec::new(),
            alias: None,
            count,
        }
    }

    /// Returns the projected fields; empty means `*`.
    #[must_use]
    pub fn projection(&self) -> &[Field] {
        &self.projection
    }

    /// Returns the FROM source.
    #[must_use]
    pub const fn source(&self) -> &Selectable {
        &self.source
    }

    /// Returns the joins in declaration order.
    #[must_use]
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Returns the WHERE conditions in declaration order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns the GROUP BY fields.
    #[must_use]
    pub fn groups(&self) -> &[Field] {
        &self.groups
    }

    /// Returns the ORDER BY terms.
    #[must_use]
    pub fn ordering(&self) -> &[OrderTerm] {
        &self.ordering
    }

    /// Returns the explicit alias used when this select is nested.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns true for `SELECT COUNT(*)`.
    #[must_use]
    pub const fn is_count(&self) -> bool {
        self.count
    }

    /// The FROM source followed by each join target.
    pub(crate) fn sources(&self) -> impl Iterator<Item = &Selectable> {
        std::iter::once(&self.source).chain(self.joins.iter().map(|join| &join.target))
    }

        /// Returns true if `field` comes from the FROM source or a join target.
    pub(crate) fn in_scope(&self, field: &Field) -> bool {
        self.source.owns(field) || self.joins.iter().any(|j| j.target.owns(field))
    }
}

/// A column assignment in INSERT or UPDATE.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub(crate) field: Field,
    pub(crate) value: SqlValue,
}

impl Assignment {
    /// Returns the assigned column.
    #[must_use]
    pub const fn field(&self) -> &Field {
        &self.field
    }

    /// Returns the bound value.
    #[must_use]
    pub const fn value(&self) -> &SqlValue {
        &self.value
    }
}

/// An INSERT statement.
#[derive(Debug, Clone)]
pub struct InsertNode {
    pub(crate) table: Table,
    pub(crate) bindings: Vec<Assignment>,
    pub(crate) returning: Option<Field>,
}

impl InsertNode {
    /// Returns the target table.
    #[must_use]
    pub const fn table(&self) -> &Table {
        &self.table
    }

    /// Returns the assignments in `set` order.
    #[must_use]
    pub fn bindings(&self) -> &[Assignment] {
        &self.bindings
    }

    /// Returns the RETURNING field, if any.
    #[must_use]
    pub const fn returning(&self) -> Option<&Field> {
        self.returning.as_ref()
    }
}

/// An UPDATE statement.
#[derive(Debug, Clone)]
pub struct UpdateNode {
    pub(crate) table: Table,
    pub(crate) bindings: Vec<Assignment>,
    pub(crate) conditions: Vec<Condition>,
}

impl UpdateNode {
    /// Returns the target table.
    #[must_use]
    pub const fn table(&self) -> &Table {
        &self.table
    }

    /// Returns the assignments in `set` order.
    #[must_use]
    pub fn bindings(&self) -> &[Assignment] {
        &self.bindings
    }

    /// Returns the WHERE conditions.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

/// A DELETE statement.
#[derive(Debug, Clone)]
pub struct DeleteNode {
    pub(crate) table: Table,
    pub(crate) conditions: Vec<Condition>,
}

impl DeleteNode {
    /// Returns the target table.
    #[must_use]
    pub const fn table(&self) -> &Table {
        &self.table
    }

    /// Returns the WHERE conditions.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}
