#![allow(dead_code)]

use sqlc_derive::Table;
use sqlc_sqlite::Db;
use sqlx::sqlite::SqlitePoolOptions;

pub const CREATE_BOOKS_SQL: &str = r"
CREATE TABLE books (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    author INTEGER NOT NULL,
    published TEXT
)
";

/// A row of the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, Table, sqlx::FromRow)]
#[table(name = "books")]
pub struct Book {
    #[column(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: i32,
}

/// Opens a fresh in-memory database holding an empty `books` table.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn create_test_db() -> Db {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    sqlx::query(CREATE_BOOKS_SQL)
        .execute(&pool)
        .await
        .expect("Failed to create books table");
    Db::from_pool(pool)
}

/// Inserts the two books of the sample catalogue.
pub async fn seed(db: &Db) {
    let books = Book::table();
    for (id, title) in [(1, "Defender Of Greatness"), (3, "Destiny Of Silver")] {
        sqlc_core::insert_into(&books)
            .set(&books.title(), title)
            .expect("title is text")
            .set(&books.id(), id)
            .expect("id is an integer")
            .set(&books.author(), 1234)
            .expect("author is an integer")
            .exec(db)
            .await
            .expect("Failed to seed books");
    }
}
