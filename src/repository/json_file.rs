//! Flat-file JSON book store
//!
//! The whole collection lives in one document of the form `{"books": [...]}`.
//! Every insert re-reads the file, appends and rewrites it. Inserts within one
//! process are serialized by a mutex; writers in other processes sharing the
//! same file are not coordinated and may lose updates.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::Mutex};

use super::{BookStore, StorageError, StorageResult};
use crate::models::{Book, NewBook};

/// On-disk document shape
#[derive(Debug, Default, Serialize, Deserialize)]
struct BookDocument {
    books: Vec<Book>,
}

pub struct JsonFileBookStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileBookStore {
    /// Open an existing book file.
    ///
    /// Fails if the file is absent or does not hold a valid book document.
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        };
        store.load().await?;
        Ok(store)
    }

    /// Write an empty document at `path` unless a file is already there
    pub async fn bootstrap(path: impl AsRef<Path>) -> StorageResult<()> {
        let path = path.as_ref();
        if fs::try_exists(path).await? {
            return Ok(());
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        tracing::info!("Creating empty book file at {}", path.display());
        write_document(path, &BookDocument::default()).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StorageResult<BookDocument> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::Missing(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&content).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}

/// Replace the document through a temporary sibling so readers never see a partial file
async fn write_document(path: &Path, doc: &BookDocument) -> StorageResult<()> {
    let content = serde_json::to_vec_pretty(doc).map_err(StorageError::Encode)?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl BookStore for JsonFileBookStore {
    async fn list_all(&self) -> StorageResult<Vec<Book>> {
        let mut books = self.load().await?.books;
        books.sort_by_key(|b| b.id);
        Ok(books)
    }

    async fn insert(&self, book: &NewBook) -> StorageResult<i64> {
        let _guard = self.write_lock.lock().await;

        let mut doc = self.load().await?;
        let id = doc
            .books
            .iter()
            .map(|b| b.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(StorageError::IdsExhausted)?;
        doc.books.push(book.clone().into_book(id));
        write_document(&self.path, &doc).await?;

        Ok(id)
    }
}
