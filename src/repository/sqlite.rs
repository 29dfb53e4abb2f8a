//! SQLite book store

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use super::{BookStore, StorageResult};
use crate::models::{Book, NewBook};

const CREATE_BOOKS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS Books (
        id INTEGER PRIMARY KEY,
        name TEXT,
        author TEXT,
        finished INTEGER
    )
"#;

/// Books kept in a single SQLite table keyed by rowid
#[derive(Clone)]
pub struct SqliteBookStore {
    pool: Pool<Sqlite>,
}

impl SqliteBookStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `url` and make sure the table exists.
    ///
    /// Note that every connection to `sqlite::memory:` gets its own database, so
    /// in-memory use needs `max_connections = 1`.
    pub async fn connect(url: &str, max_connections: u32) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Create the books table if absent
    pub async fn init_schema(&self) -> StorageResult<()> {
        sqlx::query(CREATE_BOOKS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl BookStore for SqliteBookStore {
    async fn list_all(&self) -> StorageResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            "SELECT id, name, author, finished FROM Books ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert(&self, book: &NewBook) -> StorageResult<i64> {
        let result = sqlx::query("INSERT INTO Books (name, author, finished) VALUES (?, ?, ?)")
            .bind(&book.name)
            .bind(&book.author)
            .bind(book.finished)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }
}
