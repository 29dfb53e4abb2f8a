//! Repository layer for book storage
//!
//! Two interchangeable backends implement [`BookStore`]: a SQLite table and a
//! flat JSON document. The backend is chosen once at startup and injected into
//! the services through [`Repository`].

pub mod json_file;
pub mod sqlite;

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    config::{StorageConfig, StorageKind},
    models::{Book, NewBook},
};

pub use json_file::JsonFileBookStore;
pub use sqlite::SqliteBookStore;

/// Failures raised by a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Book file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Book file {} is not a valid book document: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No book id left to assign")]
    IdsExhausted,

    #[error("Failed to encode book document: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable keeper of book records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, ascending by id
    async fn list_all(&self) -> StorageResult<Vec<Book>>;

    /// Persist a book and return the identifier assigned to it
    async fn insert(&self, book: &NewBook) -> StorageResult<i64>;
}

/// Main repository struct holding the configured book store
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
}

impl Repository {
    /// Create a new repository around an already opened store
    pub fn new(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }

    /// Open the backend selected in configuration, bootstrapping its medium
    pub async fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        let books: Arc<dyn BookStore> = match config.backend {
            StorageKind::Sqlite => {
                let store =
                    SqliteBookStore::connect(&config.database_url, config.max_connections).await?;
                tracing::info!("Using SQLite book store at {}", config.database_url);
                Arc::new(store)
            }
            StorageKind::Json => {
                if config.create_if_missing {
                    JsonFileBookStore::bootstrap(&config.json_path).await?;
                }
                let store = JsonFileBookStore::open(&config.json_path).await?;
                tracing::info!("Using JSON book store at {}", config.json_path.display());
                Arc::new(store)
            }
        };

        Ok(Self::new(books))
    }
}
