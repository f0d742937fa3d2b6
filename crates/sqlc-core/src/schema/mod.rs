//! Table handles and schema metadata.
//!
//! A [`Table`] names a base table, optionally under an alias, and hands
//! out columns that remember which table they came from. The
//! `#[derive(Table)]` macro in `sqlc-derive` generates typed wrappers
//! around a `Table` and implements [`Schema`] for them.

use crate::error::Result;
use crate::field::{Column, Field, FieldKind, Kind, Owner, TableRef};

/// A base table used as a statement source or target.
///
/// ```rust
/// use sqlc_core::field::{FieldKind, Int, Text};
/// use sqlc_core::Table;
///
/// let books = Table::new("books")
///     .with_column("id", FieldKind::Int)
///     .with_column("title", FieldKind::Text);
/// let b = books.aliased("b");
///
/// assert_eq!(b.fields().len(), 2);
/// let id = b.column::<Int>("id").unwrap();
/// assert_eq!(id.owner().unwrap().default_qualifier(), Some("b"));
/// assert!(b.column::<Text>("id").unwrap_err().is_type_mismatch());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    alias: Option<String>,
    columns: Vec<(String, FieldKind)>,
}

impl Table {
    /// Creates a handle for the table `name` with no declared columns.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            columns: Vec::new(),
        }
    }

    /// Declares a column. Declared columns are what `SELECT *` over this
    /// table exposes to an enclosing query.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.columns.push((name.into(), kind));
        self
    }

    /// Returns a copy of this handle that renders as `name AS alias`.
    ///
    /// Columns taken from the copy are qualified by the alias.
    #[must_use]
    pub fn aliased(&self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the alias, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns a typed column of this table.
    ///
    /// The column does not need to be declared, but a declared column
    /// must be asked for with its declared kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`](crate::Error::TypeMismatch) if `name`
    /// is declared with a kind other than `K`.
    pub fn column<K: Kind>(&self, name: impl Into<String>) -> Result<Column<K>> {
        let name = name.into();
        if let Some(declared) = self.field(&name) {
            declared.expect_kind(K::KIND)?;
        }
        Ok(self.column_unchecked(name))
    }

    /// Returns a typed column without looking at the declared columns.
    ///
    /// Used by `#[derive(Table)]`, whose accessors take their kinds from
    /// the same struct fields that declare the columns.
    #[doc(hidden)]
    #[must_use]
    pub fn column_unchecked<K: Kind>(&self, name: impl Into<String>) -> Column<K> {
        Column::wrap(Field::owned(name, K::KIND, self.owner()))
    }

    /// Looks up a declared column.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Field> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(column, kind)| Field::owned(column.clone(), *kind, self.owner()))
    }

    /// Returns all declared columns in declaration order.
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        self.columns
            .iter()
            .map(|(column, kind)| Field::owned(column.clone(), *kind, self.owner()))
            .collect()
    }

    pub(crate) fn reference(&self) -> TableRef {
        TableRef {
            name: self.name.clone(),
            alias: self.alias.clone(),
        }
    }

    fn owner(&self) -> Owner {
        Owner::Table(self.reference())
    }
}

impl AsRef<Self> for Table {
    fn as_ref(&self) -> &Self {
        self
    }
}

/// Table metadata, implemented by `#[derive(Table)]`.
pub trait Schema {
    /// The row type (the original struct).
    type Row;

    /// The SQL table name.
    const NAME: &'static str;

    /// List of all column names.
    const COLUMNS: &'static [&'static str];

    /// The primary key column name, if any.
    const PRIMARY_KEY: Option<&'static str>;

    /// Returns an untyped handle with every column declared.
    fn table() -> Table;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::field::{Int, Int64, Text};

    #[test]
    fn test_columns_remember_their_table() {
        let books = Table::new("books");
        let title = books.column::<Text>("title").unwrap();
        assert!(title.is_owned_by_table("books"));
        assert!(!title.is_owned_by_table("authors"));
    }

    #[test]
    fn test_field_lookup_only_finds_declared_columns() {
        let books = Table::new("books").with_column("title", FieldKind::Text);
        assert_eq!(books.field("title").unwrap().kind(), FieldKind::Text);
        assert!(books.field("isbn").is_none());
    }

    #[test]
    fn test_aliased_copy_keeps_columns() {
        let books = Table::new("books").with_column("id", FieldKind::Int);
        let b = books.aliased("b");
        assert_eq!(b.name(), "books");
        assert_eq!(b.alias(), Some("b"));
        assert_eq!(b.fields()[0].owner().unwrap().default_qualifier(), Some("b"));
        assert_eq!(books.alias(), None);
    }

    #[test]
    fn test_declared_columns_keep_their_kind() {
        let books = Table::new("books")
            .with_column("id", FieldKind::Int)
            .with_column("pages", FieldKind::Int64);
        assert!(books.column::<Int>("id").is_ok());
        assert!(books.column::<Text>("isbn").is_ok());

        let err = books.column::<Int>("pages").unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                field: String::from("pages"),
                expected: FieldKind::Int64,
                found: "integer",
            }
        );
        assert!(books.column::<Int64>("pages").is_ok());
    }
}
