//! Catalog management service

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookQuery, SortField, SortOrder},
        Book, BookFilter, CreateBook, Genre, PageMeta, PageRequest, UpdateBook,
    },
    repository::Repository,
};

/// Default page size for book listings
pub const DEFAULT_BOOK_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new book. ISBNs are unique across the catalog.
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        let created = self.repository.books.create(&book).await?;
        tracing::info!(book_id = %created.id, isbn = %created.isbn, "Book created");
        Ok(created)
    }

    /// List books with optional genre filter, sorting and pagination
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, PageMeta)> {
        let page = PageRequest::from_params(
            query.limit.as_deref(),
            query.page.as_deref(),
            DEFAULT_BOOK_LIMIT,
        );
        let filter = BookFilter {
            genre: query
                .filter
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::parse::<Genre>)
                .transpose()?,
            // Sorting only applies when both the field and the direction are understood
            sort: query
                .sort_by
                .as_deref()
                .and_then(SortField::parse)
                .zip(query.sort.as_deref().and_then(SortOrder::parse)),
            skip: page.skip(),
            limit: page.limit,
        };

        let (books, total) = self.repository.books.list(&filter).await?;
        Ok((books, page.meta(total)))
    }

    /// Get book by ID
    pub async fn get_book(&self, id: Uuid) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::book_not_found(id))
    }

    /// Update an existing book
    pub async fn update_book(&self, id: Uuid, changes: UpdateBook) -> AppResult<Book> {
        self.repository
            .books
            .update(id, &changes)
            .await?
            .ok_or_else(|| AppError::book_not_found(id))
    }

    /// Delete a book. Its borrow history is kept.
    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        if !self.repository.books.delete(id).await? {
            return Err(AppError::book_not_found(id));
        }
        tracing::info!(book_id = %id, "Book deleted");
        Ok(())
    }

    /// Check that the catalog store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.books.ping().await
    }
}
