//! SQL functions over columns.
//!
//! Each function returns a new column wrapping a copy of its argument, so
//! nesting (`upper(&lower(&title))`) builds a tree. Extra arguments are
//! bound as placeholders right after the child column.
//!
//! ```rust
//! use sqlc_core::field::{func, Int64, Text};
//! use sqlc_core::{select, Dialect, Table};
//!
//! let books = Table::new("books");
//! let title = books.column::<Text>("title").unwrap();
//! let short = func::substr(&title, 1, 3);
//!
//! let (sql, params) = select(&[&short])
//!     .from(&books)
//!     .to_sql(Dialect::Sqlite)
//!     .unwrap();
//! assert_eq!(sql, "SELECT SUBSTR(books.title, ?, ?) FROM books");
//! assert_eq!(params.len(), 2);
//! ```

use super::kind::{Float, Int64, Kind, Text, ValueFor};
use super::{Column, Field, FieldFunction};
use crate::value::SqlValue;

fn apply<K: Kind, R: Kind>(
    name: &'static str,
    column: &Column<K>,
    args: Vec<SqlValue>,
) -> Column<R> {
    Column::wrap(Field::derived(
        FieldFunction::new(name, column.field(), args),
        R::KIND,
    ))
}

/// `COUNT(column)`
#[must_use]
pub fn count<K: Kind>(column: &Column<K>) -> Column<Int64> {
    apply("COUNT", column, Vec::new())
}

/// `MAX(column)`
#[must_use]
pub fn max<K: Kind>(column: &Column<K>) -> Column<K> {
    apply("MAX", column, Vec::new())
}

/// `MIN(column)`
#[must_use]
pub fn min<K: Kind>(column: &Column<K>) -> Column<K> {
    apply("MIN", column, Vec::new())
}

/// `SUM(column)`
#[must_use]
pub fn sum<K: Kind>(column: &Column<K>) -> Column<K> {
    apply("SUM", column, Vec::new())
}

/// `AVG(column)`
#[must_use]
pub fn avg<K: Kind>(column: &Column<K>) -> Column<Float> {
    apply("AVG", column, Vec::new())
}

/// `LOWER(column)`
#[must_use]
pub fn lower(column: &Column<Text>) -> Column<Text> {
    apply("LOWER", column, Vec::new())
}

/// `UPPER(column)`
#[must_use]
pub fn upper(column: &Column<Text>) -> Column<Text> {
    apply("UPPER", column, Vec::new())
}

/// `LENGTH(column)`
#[must_use]
pub fn length(column: &Column<Text>) -> Column<Int64> {
    apply("LENGTH", column, Vec::new())
}

/// `SUBSTR(column, start, len)`; `start` is 1-based.
#[must_use]
pub fn substr(column: &Column<Text>, start: i64, len: i64) -> Column<Text> {
    apply(
        "SUBSTR",
        column,
        vec![SqlValue::Int64(start), SqlValue::Int64(len)],
    )
}

/// `COALESCE(column, default)`
#[must_use]
pub fn coalesce<K: Kind, V: ValueFor<K>>(column: &Column<K>, default: V) -> Column<K> {
    apply("COALESCE", column, vec![default.into_value()])
}
