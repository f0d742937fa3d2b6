#![allow(dead_code)]

use sqlc_core::field::{Column, FieldKind, Int, Int64, Text, Timestamp};
use sqlc_core::render::Renderer;
use sqlc_core::{AliasGenerator, Dialect, Rendered, Statement, Table};

/// The `books` table used across the suites.
pub struct Books {
    pub table: Table,
    pub id: Column<Int>,
    pub title: Column<Text>,
    pub author_id: Column<Int>,
    pub pages: Column<Int64>,
    pub published: Column<Timestamp>,
}

impl Books {
    pub fn new() -> Self {
        Self::from_table(
            Table::new("books")
                .with_column("id", FieldKind::Int)
                .with_column("title", FieldKind::Text)
                .with_column("author_id", FieldKind::Int)
                .with_column("pages", FieldKind::Int64)
                .with_column("published", FieldKind::Timestamp),
        )
    }

    pub fn aliased(alias: &str) -> Self {
        Self::from_table(Self::new().table.aliased(alias))
    }

    fn from_table(table: Table) -> Self {
        Self {
            id: table.column("id").unwrap(),
            title: table.column("title").unwrap(),
            author_id: table.column("author_id").unwrap(),
            pages: table.column("pages").unwrap(),
            published: table.column("published").unwrap(),
            table,
        }
    }
}

/// The `authors` table.
pub struct Authors {
    pub table: Table,
    pub id: Column<Int>,
    pub name: Column<Text>,
}

impl Authors {
    pub fn new() -> Self {
        let table = Table::new("authors")
            .with_column("id", FieldKind::Int)
            .with_column("name", FieldKind::Text);
        Self {
            id: table.column("id").unwrap(),
            name: table.column("name").unwrap(),
            table,
        }
    }
}

/// Renders with a private generator so generated aliases are stable.
pub fn render_with(statement: &Statement, dialect: Dialect, prefix: &'static str) -> Rendered {
    let aliases = AliasGenerator::starting_at(prefix, 1);
    Renderer::new(dialect)
        .with_aliases(&aliases)
        .render(statement)
        .unwrap_or_else(|e| panic!("Failed to render: {statement:?}\nError: {e}"))
}

pub fn sql(statement: &Statement) -> String {
    render_with(statement, Dialect::Sqlite, "alias").sql().to_owned()
}

/// Counts `?` placeholders.
pub fn count_placeholders(sql: &str) -> usize {
    sql.matches('?').count()
}
