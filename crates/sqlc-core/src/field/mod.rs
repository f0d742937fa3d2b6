//! Typed references to columns and derived expressions.
//!
//! A [`Field`] names a column (or a function over another field) and
//! records the source it belongs to. Fields are plain data: comparing a
//! field with a value builds a [`Condition`] and no SQL text is produced
//! until the statement is rendered.

mod column;
pub mod func;
mod kind;

use std::sync::{Arc, Weak};

pub use column::Column;
pub use kind::{Bool, ColumnType, FieldKind, Float, Int, Int64, Kind, Text, Timestamp, ValueFor};

use crate::condition::{Bound, Condition, Predicate};
use crate::error::{Error, Result};
use crate::statement::SelectNode;
use crate::value::{SqlValue, ToSqlValue};

/// A reference to a column or derived expression.
///
/// The kind a field is declared with is fixed for its whole life.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    kind: FieldKind,
    alias: Option<String>,
    owner: Option<Owner>,
    function: Option<Box<FieldFunction>>,
}

impl Field {
    /// Creates a field that belongs to no source.
    ///
    /// Such a field renders unqualified.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            alias: None,
            owner: None,
            function: None,
        }
    }

    pub(crate) fn owned(name: impl Into<String>, kind: FieldKind, owner: Owner) -> Self {
        Self {
            owner: Some(owner),
            ..Self::new(name, kind)
        }
    }

    pub(crate) fn derived(function: FieldFunction, kind: FieldKind) -> Self {
        let label = function.name.to_ascii_lowercase();
        Self {
            function: Some(Box::new(function)),
            ..Self::new(label, kind)
        }
    }

    /// Returns the column name, or the function name for derived fields.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns the field's own qualifier alias, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns the source this field belongs to.
    #[must_use]
    pub const fn owner(&self) -> Option<&Owner> {
        self.owner.as_ref()
    }

    /// Returns the function this field applies, for derived fields.
    #[must_use]
    pub fn as_function(&self) -> Option<&FieldFunction> {
        self.function.as_deref()
    }

    /// Returns a copy qualified by `alias`.
    ///
    /// The alias is used unless the owning source carries its own alias
    /// in the query being rendered.
    #[must_use]
    pub fn aliased(&self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }

    /// Returns a copy of a derived field labelled `label`.
    ///
    /// A nested select exposes derived fields under their label, which
    /// defaults to the lowercased function name. Plain columns keep their
    /// column name and are returned unchanged.
    #[must_use]
    pub fn labelled(&self, label: impl Into<String>) -> Self {
        let mut field = self.clone();
        if field.function.is_some() {
            field.name = label.into();
        }
        field
    }

    /// Checks that `value` may be bound to this field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value's type disagrees with
    /// the declared kind.
    pub fn check(&self, value: &SqlValue) -> Result<()> {
        if self.kind.accepts(value) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                field: self.name.clone(),
                expected: self.kind,
                found: value.kind_name(),
            })
        }
    }

    /// Checks that this field can be read as a column of `kind`.
    pub(crate) fn expect_kind(&self, kind: FieldKind) -> Result<()> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                field: self.name.clone(),
                expected: self.kind,
                found: kind.name(),
            })
        }
    }

    /// Builds a condition comparing this field with a runtime value.
    ///
    /// `Predicate::In` binds the value as a single-element list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the value's type disagrees with
    /// the declared kind.
    pub fn compare(&self, predicate: Predicate, value: impl ToSqlValue) -> Result<Condition> {
        let value = value.to_sql_value();
        self.check(&value)?;
        let bound = match predicate {
            Predicate::In => Bound::Many(vec![value]),
            _ => Bound::One(value),
        };
        Ok(Condition::new(self.clone(), predicate, bound))
    }

    pub(crate) fn is_owned_by_table(&self, table: &str) -> bool {
        matches!(&self.owner, Some(Owner::Table(t)) if t.name == table)
    }

    pub(crate) fn is_owned_by_subquery(&self, node: &Arc<SelectNode>) -> bool {
        matches!(&self.owner, Some(Owner::Subquery(q)) if q.points_to(node))
    }

    /// Re-homes this field onto a subquery that projects it.
    pub(crate) fn reowned(&self, owner: Owner) -> Self {
        Self::owned(self.name.clone(), self.kind, owner)
    }
}

/// A function applied to a child field.
///
/// The child is always a fresh copy owned by this function, so nested
/// functions form a tree and never a cycle.
#[derive(Debug, Clone)]
pub struct FieldFunction {
    child: Field,
    name: &'static str,
    args: Vec<SqlValue>,
}

impl FieldFunction {
    pub(crate) fn new(name: &'static str, child: &Field, args: Vec<SqlValue>) -> Self {
        Self {
            child: child.clone(),
            name,
            args,
        }
    }

    /// Returns the field the function is applied to.
    #[must_use]
    pub const fn child(&self) -> &Field {
        &self.child
    }

    /// Returns the SQL function name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the extra arguments, bound as placeholders after the child.
    #[must_use]
    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }
}

/// Back-reference from a field to the source that produces it.
#[derive(Debug, Clone)]
pub enum Owner {
    /// A base table.
    Table(TableRef),
    /// A nested SELECT used as a source.
    Subquery(SubqueryRef),
}

impl Owner {
    /// Qualifier used when no per-query alias applies: the table's alias
    /// or name, or a subquery's explicit alias.
    #[must_use]
    pub fn default_qualifier(&self) -> Option<&str> {
        match self {
            Self::Table(t) => Some(t.alias.as_deref().unwrap_or(&t.name)),
            Self::Subquery(q) => q.alias.as_deref(),
        }
    }
}

/// Identifies a table (and the alias it was taken under).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
}

impl TableRef {
    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the alias the table was taken under.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

/// Identifies a subquery without keeping it alive.
#[derive(Debug, Clone)]
pub struct SubqueryRef {
    pub(crate) node: Weak<SelectNode>,
    pub(crate) alias: Option<String>,
}

impl SubqueryRef {
    pub(crate) fn points_to(&self, node: &Arc<SelectNode>) -> bool {
        std::ptr::eq(self.node.as_ptr(), Arc::as_ptr(node))
    }

    /// Returns the explicit alias of the subquery, if it has one.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}
