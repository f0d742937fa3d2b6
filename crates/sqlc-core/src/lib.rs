//! # sqlc-core
//!
//! A typed SQL statement builder.
//!
//! This crate provides:
//! - Typed column references whose kind is checked when a value is bound
//! - Staged builders for SELECT, INSERT, UPDATE and DELETE that only
//!   offer the clauses legal at each step
//! - A renderer producing SQL text and its placeholder values, in order,
//!   for SQLite, MySQL and PostgreSQL
//!
//! ## Building a statement
//!
//! ```rust
//! use sqlc_core::field::{Int, Text};
//! use sqlc_core::value::SqlValue;
//! use sqlc_core::{select_all, Dialect, Table};
//!
//! let books = Table::new("books");
//! let authors = Table::new("authors").aliased("a");
//! let author_id = books.column::<Int>("author_id").unwrap();
//! let id = authors.column::<Int>("id").unwrap();
//! let name = authors.column::<Text>("name").unwrap();
//!
//! let (sql, params) = select_all()
//!     .from(&books)
//!     .join(&authors)
//!     .on([author_id.eq_col(&id)])
//!     .unwrap()
//!     .where_clause([name.eq("Herbert")])
//!     .to_sql(Dialect::Sqlite)
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM books JOIN authors AS a ON books.author_id = a.id WHERE a.name = ?"
//! );
//! assert_eq!(params, [SqlValue::Text(String::from("Herbert"))]);
//! ```
//!
//! ## Type safety
//!
//! Typed columns only accept values of their kind:
//!
//! ```rust
//! use sqlc_core::field::Int;
//! use sqlc_core::{insert_into, Table};
//!
//! let books = Table::new("books");
//! let id = books.column::<Int>("id").unwrap();
//! let insert = insert_into(&books).set(&id, 1).unwrap();
//!
//! // This would NOT compile:
//! // insert_into(&books).set(&id, "one");
//! ```
//!
//! Untyped fields check at runtime and report
//! [`Error::TypeMismatch`] instead.

pub mod alias;
pub mod builder;
pub mod condition;
pub mod dialect;
mod error;
pub mod executor;
pub mod field;
pub mod render;
pub mod schema;
pub mod statement;
pub mod value;

pub use alias::{AliasGenerator, AliasSource};
pub use builder::*;
pub use condition::{Condition, JoinCondition, Predicate};
pub use dialect::Dialect;
pub use error::{Error, Rejected, Result};
pub use executor::Executor;
pub use field::{Column, Field, FieldKind};
pub use render::{render, Rendered, Renderer};
pub use schema::{Schema, Table};
pub use statement::{Selectable, Statement, Subquery};
pub use value::{SqlValue, ToSqlValue};
