//! Staged statement builders.
//!
//! Each builder is a chain of stage types. A stage only offers the calls
//! that are legal next, and every transition consumes the stage, so no
//! chain can go back to an earlier clause.
//!
//! ```rust
//! use sqlc_core::field::{Int, Text};
//! use sqlc_core::{select, Dialect, Table};
//!
//! let books = Table::new("books");
//! let id = books.column::<Int>("id").unwrap();
//! let title = books.column::<Text>("title").unwrap();
//!
//! let (sql, params) = select(&[&id, &title])
//!     .from(&books)
//!     .where_clause([id.ge(10)])
//!     .order_by(&[&title])
//!     .to_sql(Dialect::Sqlite)
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT books.id, books.title FROM books WHERE books.id >= ? ORDER BY books.title"
//! );
//! assert_eq!(params.len(), 1);
//!
//! // This would NOT compile: WHERE needs a FROM first.
//! // let q = select(&[&id]).where_clause([id.eq(1)]);
//! ```

mod delete;
mod insert;
mod select;
mod update;

pub use delete::{Delete, Filtered as DeleteFiltered, Unfiltered};
pub use insert::{HasValues, Insert, InsertReturning, NoValues};
pub use select::{
    Filtered, Groupable, Grouped, Orderable, Ordered, Select, SelectFrom, SelectOn, SelectStage,
    Sourced,
};
pub use update::{Filtered as UpdateFiltered, HasSet, NoSet, Runnable, Update};

use crate::condition::JoinCondition;
use crate::error::{Error, Result};
use crate::field::Field;
use crate::schema::Table;
use crate::statement::{Assignment, SelectNode, Selectable};
use crate::value::SqlValue;

/// Starts a SELECT of `fields`. An empty slice selects `*`.
#[must_use]
pub fn select(fields: &[&Field]) -> SelectFrom {
    SelectFrom::new(fields.iter().map(|f| (*f).clone()).collect(), false)
}

/// Starts a `SELECT *`.
#[must_use]
pub fn select_all() -> SelectFrom {
    SelectFrom::new(Vec::new(), false)
}

/// Starts a `SELECT COUNT(*)`.
#[must_use]
pub fn select_count() -> SelectFrom {
    SelectFrom::new(Vec::new(), true)
}

/// Starts an INSERT into `table`.
#[must_use]
pub fn insert_into(table: &impl AsRef<Table>) -> Insert<NoValues> {
    Insert::new(table.as_ref().clone())
}

/// Starts an UPDATE of `table`.
#[must_use]
pub fn update(table: &impl AsRef<Table>) -> Update<NoSet> {
    Update::new(table.as_ref().clone())
}

/// Starts a DELETE from `table`.
#[must_use]
pub fn delete_from(table: &impl AsRef<Table>) -> Delete<Unfiltered> {
    Delete::new(table.as_ref().clone())
}

/// Checks that `field` is a column of `table`.
fn check_owned(table: &Table, field: &Field, clause: &str) -> Result<()> {
    if field.is_owned_by_table(table.name()) {
        Ok(())
    } else {
        Err(Error::usage(format!(
            "{clause} `{}` is not a column of `{}`",
            field.name(),
            table.name()
        )))
    }
}

/// Validates one more assignment against the target table and the
/// assignments made so far.
fn check_assignment(
    table: &Table,
    bindings: &[Assignment],
    field: &Field,
    value: &SqlValue,
) -> Result<()> {
    check_owned(table, field, "SET target")?;
    field.check(value)?;
    if bindings.iter().any(|b| b.field.name() == field.name()) {
        return Err(Error::usage(format!("`{}` is already set", field.name())));
    }
    Ok(())
}

/// Checks that both sides of every join condition come from a source the
/// join can see: the FROM source, earlier join targets, or the target.
fn check_join_scope(
    node: &SelectNode,
    target: &Selectable,
    conditions: &[JoinCondition],
) -> Result<()> {
    if conditions.is_empty() {
        return Err(Error::usage("ON needs at least one join condition"));
    }
    // Fields of a subquery resolve to its first occurrence only.
    if node.sources().any(|source| source.is_same_subquery(target)) {
        return Err(Error::usage(
            "a subquery may appear only once per select; join a second subquery instead",
        ));
    }
    for condition in conditions {
        for side in [condition.lhs(), condition.rhs()] {
            if !(node.in_scope(side) || target.owns(side)) {
                return Err(Error::usage(format!(
                    "join condition refers to `{}`, which is not joined here",
                    side.name()
                )));
            }
        }
    }
    Ok(())
}
