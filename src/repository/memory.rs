//! In-process store used for development and tests.
//!
//! Books and borrows live behind one `RwLock`, so every write (including the
//! check-and-decrement of copies) is a single critical section.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::SortOrder, borrow::BorrowedBook, Book, BookFilter, Borrow, BorrowSummary,
        CreateBook, UpdateBook,
    },
};

use super::{BookStore, BorrowStore, StockAdjustment};

#[derive(Default)]
struct Collections {
    books: HashMap<Uuid, Book>,
    borrows: Vec<Borrow>,
}

impl Collections {
    fn isbn_taken(&self, isbn: &str, exclude: Option<Uuid>) -> bool {
        self.books
            .values()
            .any(|b| b.isbn == isbn && Some(b.id) != exclude)
    }

    /// Group, join, sort. Groups whose book is gone are dropped.
    fn grouped_borrows(&self) -> Vec<(Uuid, BorrowSummary, String)> {
        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for borrow in &self.borrows {
            *totals.entry(borrow.book_id).or_default() += i64::from(borrow.quantity);
        }

        let mut groups: Vec<(Uuid, BorrowSummary, String)> = totals
            .into_iter()
            .filter_map(|(book_id, total_quantity)| {
                let book = self.books.get(&book_id)?;
                Some((
                    book_id,
                    BorrowSummary {
                        book: BorrowedBook {
                            title: book.title.clone(),
                            isbn: book.isbn.clone(),
                        },
                        total_quantity,
                    },
                    book.title.clone(),
                ))
            })
            .collect();

        groups.sort_by(|a, b| a.2.cmp(&b.2).then_with(|| a.0.cmp(&b.0)));
        groups
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn window<T>(items: impl Iterator<Item = T>, skip: i64, limit: i64) -> Vec<T> {
    items
        .skip(usize::try_from(skip).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(0))
        .collect()
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn create(&self, input: &CreateBook) -> AppResult<Book> {
        let mut db = self.inner.write().await;
        if db.isbn_taken(&input.isbn, None) {
            return Err(AppError::Conflict {
                field: "isbn".to_string(),
                value: input.isbn.clone(),
            });
        }
        let book = Book::new(input.clone(), Utc::now());
        db.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn list(&self, filter: &BookFilter) -> AppResult<(Vec<Book>, i64)> {
        let db = self.inner.read().await;
        let mut books: Vec<&Book> = db
            .books
            .values()
            .filter(|b| filter.genre.map_or(true, |g| b.genre == g))
            .collect();

        books.sort_by(|a, b| {
            let primary = match filter.sort {
                Some((field, order)) => {
                    let ord = field.compare(a, b);
                    match order {
                        SortOrder::Asc => ord,
                        SortOrder::Desc => ord.reverse(),
                    }
                }
                None => std::cmp::Ordering::Equal,
            };
            primary
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        let total = books.len() as i64;
        let page = window(books.into_iter().cloned(), filter.skip, filter.limit);
        Ok((page, total))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.inner.read().await.books.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, changes: &UpdateBook) -> AppResult<Option<Book>> {
        let mut db = self.inner.write().await;
        if let Some(ref isbn) = changes.isbn {
            if db.isbn_taken(isbn, Some(id)) {
                return Err(AppError::Conflict {
                    field: "isbn".to_string(),
                    value: isbn.clone(),
                });
            }
        }
        let Some(book) = db.books.get_mut(&id) else {
            return Ok(None);
        };
        book.apply(changes, Utc::now());
        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.inner.write().await.books.remove(&id).is_some())
    }

    async fn decrement_copies(&self, id: Uuid, quantity: i32) -> AppResult<StockAdjustment> {
        let mut db = self.inner.write().await;
        let Some(book) = db.books.get_mut(&id) else {
            return Ok(StockAdjustment::Missing);
        };
        match book.checkout(quantity) {
            Ok(()) => {
                book.updated_at = Utc::now();
                Ok(StockAdjustment::Adjusted(book.clone()))
            }
            Err(short) => Ok(StockAdjustment::Insufficient {
                available: short.available,
            }),
        }
    }

    async fn restock(&self, id: Uuid, quantity: i32) -> AppResult<()> {
        let mut db = self.inner.write().await;
        if let Some(book) = db.books.get_mut(&id) {
            book.restock(quantity);
            book.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl BorrowStore for MemoryStore {
    async fn insert(&self, borrow: &Borrow) -> AppResult<Borrow> {
        self.inner.write().await.borrows.push(borrow.clone());
        Ok(borrow.clone())
    }

    async fn summarize(&self, skip: i64, limit: i64) -> AppResult<Vec<BorrowSummary>> {
        let db = self.inner.read().await;
        let groups = db.grouped_borrows();
        Ok(window(groups.into_iter().map(|(_, s, _)| s), skip, limit))
    }

    async fn count_summarized(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.grouped_borrows().len() as i64)
    }
}
