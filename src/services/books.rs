//! Book catalog service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{Book, NewBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BookService {
    repository: Repository,
}

impl BookService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List every book, ascending by id
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        Ok(self.repository.books.list_all().await?)
    }

    /// Validate and persist a new book, returning it with its assigned id
    pub async fn create_book(&self, name: &str, author: &str, finished: bool) -> AppResult<Book> {
        let book = NewBook::trimmed(name, author, finished);
        book.validate()?;

        let id = self.repository.books.insert(&book).await?;
        tracing::info!("Created book id={} name={:?}", id, book.name);

        Ok(book.into_book(id))
    }
}
