//! Repository layer for catalog and borrow persistence

pub mod books;
pub mod borrows;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, BookFilter, Borrow, BorrowSummary, CreateBook, UpdateBook},
};

/// Outcome of an indivisible check-and-decrement of a book's copies
#[derive(Debug, Clone, PartialEq)]
pub enum StockAdjustment {
    Adjusted(Book),
    Insufficient { available: i32 },
    Missing,
}

/// Catalog store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Insert a book. ISBN collisions fail with `AppError::Conflict`.
    async fn create(&self, book: &CreateBook) -> AppResult<Book>;

    /// One page of books plus the size of the whole filtered set
    async fn list(&self, filter: &BookFilter) -> AppResult<(Vec<Book>, i64)>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>>;

    /// Partial update; `None` when the book does not exist
    async fn update(&self, id: Uuid, changes: &UpdateBook) -> AppResult<Option<Book>>;

    /// Hard delete; `false` when the book does not exist
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Decrement copies by `quantity` only if enough copies remain, as one
    /// storage operation.
    async fn decrement_copies(&self, id: Uuid, quantity: i32) -> AppResult<StockAdjustment>;

    /// Add `quantity` copies back
    async fn restock(&self, id: Uuid, quantity: i32) -> AppResult<()>;

    async fn ping(&self) -> AppResult<()>;
}

/// Borrow transaction store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowStore: Send + Sync {
    async fn insert(&self, borrow: &Borrow) -> AppResult<Borrow>;

    /// Quantities grouped per existing book, sorted by title, windowed by skip/limit
    async fn summarize(&self, skip: i64, limit: i64) -> AppResult<Vec<BorrowSummary>>;

    /// Number of groups `summarize` would yield without a window
    async fn count_summarized(&self) -> AppResult<i64>;
}

/// Main repository struct holding the stores
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
    pub borrows: Arc<dyn BorrowStore>,
}

impl Repository {
    pub fn new(books: Arc<dyn BookStore>, borrows: Arc<dyn BorrowStore>) -> Self {
        Self { books, borrows }
    }

    /// Create a PostgreSQL-backed repository with the given pool
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self::new(
            Arc::new(books::BooksRepository::new(pool.clone())),
            Arc::new(borrows::BorrowsRepository::new(pool)),
        )
    }

    /// Create a repository backed by a fresh in-process store
    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::default();
        Self::new(Arc::new(store.clone()), Arc::new(store))
    }
}
