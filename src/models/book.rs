//! Book model

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Book record as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Identifier assigned by the storage backend
    pub id: i64,
    /// Title
    pub name: String,
    pub author: String,
    /// Whether the book has been read to the end
    #[serde(default)]
    pub finished: bool,
}

/// Create book request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewBook {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub author: String,
    #[serde(default)]
    pub finished: bool,
}

impl NewBook {
    /// Build a create request with surrounding whitespace stripped from text fields
    pub fn trimmed(name: &str, author: &str, finished: bool) -> Self {
        Self {
            name: name.trim().to_string(),
            author: author.trim().to_string(),
            finished,
        }
    }

    /// Attach the identifier assigned by storage
    pub fn into_book(self, id: i64) -> Book {
        Book {
            id,
            name: self.name,
            author: self.author,
            finished: self.finished,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("must not be empty"));
        return Err(err);
    }
    Ok(())
}
