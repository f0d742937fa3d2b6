//! Typed column handles.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use super::kind::{Kind, ValueFor};
use super::Field;
use crate::condition::{Bound, Condition, JoinCondition, Predicate};
use crate::error::{Error, Result};

/// A field whose kind is known at compile time.
///
/// Comparisons and assignments on a `Column<K>` only accept values that
/// implement [`ValueFor<K>`], so a kind mismatch does not compile. The
/// column derefs to its untyped [`Field`].
pub struct Column<K> {
    field: Field,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> Column<K> {
    /// Creates a column that belongs to no source.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::wrap(Field::new(name, K::KIND))
    }

    pub(crate) fn wrap(field: Field) -> Self {
        debug_assert_eq!(field.kind(), K::KIND);
        Self {
            field,
            _kind: PhantomData,
        }
    }

    /// Returns the untyped field.
    #[must_use]
    pub const fn field(&self) -> &Field {
        &self.field
    }

    /// Consumes the column, returning the untyped field.
    #[must_use]
    pub fn into_field(self) -> Field {
        self.field
    }

    /// Returns a copy qualified by `alias`.
    #[must_use]
    pub fn aliased(&self, alias: impl Into<String>) -> Self {
        Self::wrap(self.field.aliased(alias))
    }

    /// Returns a copy of a derived column labelled `label`.
    ///
    /// See [`Field::labelled`].
    #[must_use]
    pub fn labelled(&self, label: impl Into<String>) -> Self {
        Self::wrap(self.field.labelled(label))
    }

        fn compare<V: ValueFor<K>>(&self, predicate: Predicate, value: V) -> Condition {
        Condition::new(
            self.field.clone(),
            predicate,
            Bound::One(value.into_value()),
        )
    }

    /// `column = value`
    #[must_use]
    pub fn eq<V: ValueFor<K>>(&self, value: V) -> Condition {
        self.compare(Predicate::Eq, value)
    }

    /// `column > value`
    #[must_use]
    pub fn gt<V: ValueFor<K>>(&self, value: V) -> Condition {
        self.compare(Predicate::Gt, value)
    }

    /// `column >= value`
    #[must_use]
    pub fn ge<V: ValueFor<K>>(&self, value: V) -> Condition {
        self.compare(Predicate::Ge, value)
    }

    /// `column < value`
    #[must_use]
    pub fn lt<V: ValueFor<K>>(&self, value: V) -> Condition {
        self.compare(Predicate::Lt, value)
    }

    /// `column <= value`
    #[must_use]
    pub fn le<V: ValueFor<K>>(&self, value: V) -> Condition {
        self.compare(Predicate::Le, value)
    }

    /// `column IN (values...)`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Usage`] if `values` is empty.
    pub fn is_in<I, V>(&self, values: I) -> Result<Condition>
    where
        I: IntoIterator<Item = V>,
        V: ValueFor<K>,
    {
        let values: Vec<_> = values.into_iter().map(ValueFor::into_value).collect();
        if values.is_empty() {
            return Err(Error::usage(format!(
                "IN on `{}` needs at least one value",
                self.field.name()
            )));
        }
        Ok(Condition::new(
            self.field.clone(),
            Predicate::In,
            Bound::Many(values),
        ))
    }

    fn correlate(&self, predicate: Predicate, other: &Self) -> JoinCondition {
        JoinCondition::unchecked(self.field.clone(), predicate, other.field.clone())
    }

    /// Join predicate `column = other`.
    #[must_use]
    pub fn eq_col(&self, other: &Self) -> JoinCondition {
        self.correlate(Predicate::Eq, other)
    }

    /// Join predicate `column > other`.
    #[must_use]
    pub fn gt_col(&self, other: &Self) -> JoinCondition {
        self.correlate(Predicate::Gt, other)
    }

    /// Join predicate `column >= other`.
    #[must_use]
    pub fn ge_col(&self, other: &Self) -> JoinCondition {
        self.correlate(Predicate::Ge, other)
    }

    /// Join predicate `column < other`.
    #[must_use]
    pub fn lt_col(&self, other: &Self) -> JoinCondition {
        self.correlate(Predicate::Lt, other)
    }

    /// Join predicate `column <= other`.
    #[must_use]
    pub fn le_col(&self, other: &Self) -> JoinCondition {
        self.correlate(Predicate::Le, other)
    }
}

impl<K> Clone for Column<K> {
    fn clone(&self) -> Self {
        Self {
            field: self.field.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K> fmt::Debug for Column<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Column").field(&self.field).finish()
    }
}

impl<K> Deref for Column<K> {
    type Target = Field;

    fn deref(&self) -> &Field {
        &self.field
    }
}

impl<K> AsRef<Field> for Column<K> {
    fn as_ref(&self) -> &Field {
        &self.field
    }
}

impl<K> From<Column<K>> for Field {
    fn from(column: Column<K>) -> Self {
        column.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, Int, Int64, Text};
    use crate::value::SqlValue;

    #[test]
    fn test_typed_comparison_binds_widened_value() {
        let count = Column::<Int64>::new("count");
        let cond = count.ge(10);
        assert_eq!(cond.predicate(), Predicate::Ge);
        assert_eq!(cond.values(), &[SqlValue::Int64(10)]);
    }

    #[test]
    fn test_is_in_rejects_empty_list() {
        let id = Column::<Int>::new("id");
        let err = id.is_in(Vec::<i32>::new()).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn test_is_in_keeps_value_order() {
        let title = Column::<Text>::new("title");
        let cond = title.is_in(["b", "a"]).unwrap();
        assert_eq!(
            cond.values(),
            &[
                SqlValue::Text(String::from("b")),
                SqlValue::Text(String::from("a"))
            ]
        );
    }

    #[test]
    fn test_column_derefs_to_field() {
        let title = Column::<Text>::new("title");
        assert_eq!(title.kind(), FieldKind::Text);
        assert_eq!(title.name(), "title");
    }
}
