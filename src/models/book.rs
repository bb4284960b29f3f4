//! Book (catalog entry) model and related types

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Book genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "book_genre", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Genre {
    Fiction,
    NonFiction,
    Science,
    History,
    Biography,
    Fantasy,
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fiction => "FICTION",
            Genre::NonFiction => "NON_FICTION",
            Genre::Science => "SCIENCE",
            Genre::History => "HISTORY",
            Genre::Biography => "BIOGRAPHY",
            Genre::Fantasy => "FANTASY",
        }
    }
}

impl FromStr for Genre {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FICTION" => Ok(Genre::Fiction),
            "NON_FICTION" => Ok(Genre::NonFiction),
            "SCIENCE" => Ok(Genre::Science),
            "HISTORY" => Ok(Genre::History),
            "BIOGRAPHY" => Ok(Genre::Biography),
            "FANTASY" => Ok(Genre::Fantasy),
            other => Err(AppError::Validation(format!("Unknown genre '{}'", other))),
        }
    }
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Book as stored in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub isbn: String,
    pub description: Option<String>,
    /// Copies currently on the shelf
    pub copies: i32,
    /// Always `copies > 0`
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Requested quantity exceeds the copies on the shelf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientStock {
    pub requested: i32,
    pub available: i32,
}

impl Book {
    /// Build a new book from validated input, deriving `available`
    pub fn new(input: CreateBook, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            author: input.author,
            genre: input.genre,
            isbn: input.isbn,
            description: input.description,
            copies: input.copies,
            available: input.copies > 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Take `quantity` copies off the shelf.
    ///
    /// Leaves the book untouched when fewer than `quantity` copies remain.
    pub fn checkout(&mut self, quantity: i32) -> Result<(), InsufficientStock> {
        let remaining = self.copies - quantity;
        if remaining < 0 {
            return Err(InsufficientStock {
                requested: quantity,
                available: self.copies,
            });
        }
        self.set_copies(remaining);
        Ok(())
    }

    /// Put `quantity` copies back on the shelf
    pub fn restock(&mut self, quantity: i32) {
        self.set_copies(self.copies + quantity);
    }

    fn set_copies(&mut self, copies: i32) {
        self.copies = copies;
        self.available = copies > 0;
    }

    /// Apply a partial update. `available` follows `copies`.
    pub fn apply(&mut self, changes: &UpdateBook, now: DateTime<Utc>) {
        if let Some(ref title) = changes.title {
            self.title = title.clone();
        }
        if let Some(ref author) = changes.author {
            self.author = author.clone();
        }
        if let Some(genre) = changes.genre {
            self.genre = genre;
        }
        if let Some(ref isbn) = changes.isbn {
            self.isbn = isbn.clone();
        }
        if let Some(ref description) = changes.description {
            self.description = Some(description.clone());
        }
        if let Some(copies) = changes.copies {
            self.set_copies(copies);
        }
        self.updated_at = now;
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub genre: Genre,
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Copies must be a non-negative integer"))]
    pub copies: i32,
}

/// Update book request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Author cannot be empty"))]
    pub author: Option<String>,
    pub genre: Option<Genre>,
    #[validate(length(min = 1, message = "ISBN cannot be empty"))]
    pub isbn: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Copies must be a non-negative integer"))]
    pub copies: Option<i32>,
}

/// Sortable book fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Author,
    Genre,
    Isbn,
    Copies,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Parse the `sortBy` query value; unknown fields are not sortable
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "title" => Some(SortField::Title),
            "author" => Some(SortField::Author),
            "genre" => Some(SortField::Genre),
            "isbn" => Some(SortField::Isbn),
            "copies" => Some(SortField::Copies),
            "createdAt" => Some(SortField::CreatedAt),
            "updatedAt" => Some(SortField::UpdatedAt),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Author => "author",
            SortField::Genre => "genre",
            SortField::Isbn => "isbn",
            SortField::Copies => "copies",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    pub fn compare(&self, a: &Book, b: &Book) -> Ordering {
        match self {
            SortField::Title => a.title.cmp(&b.title),
            SortField::Author => a.author.cmp(&b.author),
            // Postgres orders enum values by declaration order
            SortField::Genre => (a.genre as u8).cmp(&(b.genre as u8)),
            SortField::Isbn => a.isbn.cmp(&b.isbn),
            SortField::Copies => a.copies.cmp(&b.copies),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Book list query parameters, as received
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Genre filter
    pub filter: Option<String>,
    /// Field to sort on (title, author, genre, isbn, copies, createdAt, updatedAt)
    pub sort_by: Option<String>,
    /// Sort direction (asc or desc)
    pub sort: Option<String>,
    /// Page size (default: 10)
    pub limit: Option<String>,
    /// Page number (default: 1)
    pub page: Option<String>,
}

/// Resolved book listing request handed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFilter {
    pub genre: Option<Genre>,
    pub sort: Option<(SortField, SortOrder)>,
    pub skip: i64,
    pub limit: i64,
}
