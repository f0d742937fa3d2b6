//! Creates a `books` table, inserts and updates a few rows, then reads them
//! back into structs.
//!
//! ```sh
//! DATABASE_URL=sqlite:///tmp/books.db?mode=rwc cargo run --example books
//! ```
//!
//! Without `DATABASE_URL` the demo runs against an in-memory database.

use sqlc_core::{insert_into, select_all, update};
use sqlc_derive::Table;
use sqlc_sqlite::{Db, Result};
use tracing::info;

#[derive(Debug, Table, sqlx::FromRow)]
#[table(name = "books")]
pub struct Book {
    #[column(primary_key)]
    id: i32,
    title: String,
    author: i32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| String::from("sqlite::memory:"));
    let db = Db::connect(&url).await?;
    info!(%url, "opened database");

    sqlx::query("DROP TABLE IF EXISTS books")
        .execute(db.pool())
        .await?;
    sqlx::query("CREATE TABLE books (id INTEGER PRIMARY KEY, title VARCHAR(255), author INTEGER)")
        .execute(db.pool())
        .await?;

    let books = Book::table();

    insert_into(&books)
        .set(&books.title(), "Defender Of Greatness")?
        .set(&books.id(), 1)?
        .set(&books.author(), 1234)?
        .exec(&db)
        .await?;
    insert_into(&books)
        .set(&books.title(), "Destiny Of Silver")?
        .set(&books.id(), 3)?
        .set(&books.author(), 1234)?
        .exec(&db)
        .await?;

    let done = update(&books)
        .set(&books.id(), 3)?
        .where_clause([books.id().eq(2)])
        .exec(&db)
        .await?;
    info!(rows = done.rows_affected(), "updated books");

    let rows: Vec<Book> = db.query_as(&select_all().from(&books)).await?;
    for book in rows {
        println!("{}: title: {}, author: {}", book.id, book.title, book.author);
    }

    Ok(())
}
