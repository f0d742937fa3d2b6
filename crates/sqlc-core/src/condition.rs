//! Comparison predicates for WHERE and JOIN ... ON clauses.

use std::fmt;

use crate::error::{Error, Result};
use crate::field::Field;
use crate::value::SqlValue;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `IN (...)`
    In,
}

impl Predicate {
    /// Returns the SQL operator.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::In => "IN",
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// The right-hand side of a [`Condition`].
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// A single value, one placeholder.
    One(SqlValue),
    /// A non-empty list, one placeholder per element.
    Many(Vec<SqlValue>),
}

impl Bound {
    /// Returns the values in placeholder order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        match self {
            Self::One(v) => std::slice::from_ref(v),
            Self::Many(vs) => vs,
        }
    }
}

/// A field compared with a bound value.
///
/// Built by the comparison methods on [`Column`](crate::field::Column) or
/// by [`Field::compare`].
#[derive(Debug, Clone)]
pub struct Condition {
    field: Field,
    predicate: Predicate,
    value: Bound,
}

impl Condition {
    pub(crate) const fn new(field: Field, predicate: Predicate, value: Bound) -> Self {
        Self {
            field,
            predicate,
            value,
        }
    }

    /// Returns the compared field.
    #[must_use]
    pub const fn field(&self) -> &Field {
        &self.field
    }

    /// Returns the operator.
    #[must_use]
    pub const fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// Returns the bound right-hand side.
    #[must_use]
    pub const fn bound(&self) -> &Bound {
        &self.value
    }

    /// Returns the bound values in placeholder order.
    #[must_use]
    pub fn values(&self) -> &[SqlValue] {
        self.value.values()
    }
}

/// A comparison between two fields, used to correlate a join.
#[derive(Debug, Clone)]
pub struct JoinCondition {
    lhs: Field,
    predicate: Predicate,
    rhs: Field,
}

impl JoinCondition {
    /// Builds a join predicate from two untyped fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] for `Predicate::In`, and
    /// [`Error::TypeMismatch`] when the two fields have different kinds.
    pub fn new(lhs: &Field, predicate: Predicate, rhs: &Field) -> Result<Self> {
        if predicate == Predicate::In {
            return Err(Error::usage("IN cannot correlate two fields"));
        }
        if lhs.kind() != rhs.kind() {
            return Err(Error::TypeMismatch {
                field: rhs.name().to_owned(),
                expected: lhs.kind(),
                found: rhs.kind().name(),
            });
        }
        Ok(Self::unchecked(lhs.clone(), predicate, rhs.clone()))
    }

    pub(crate) const fn unchecked(lhs: Field, predicate: Predicate, rhs: Field) -> Self {
        Self {
            lhs,
            predicate,
            rhs,
        }
    }

    /// Returns the left-hand field.
    #[must_use]
    pub const fn lhs(&self) -> &Field {
        &self.lhs
    }

    /// Returns the operator.
    #[must_use]
    pub const fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// Returns the right-hand field.
    #[must_use]
    pub const fn rhs(&self) -> &Field {
        &self.rhs
    }
}
