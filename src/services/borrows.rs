//! Borrow workflow and borrow summary

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{Borrow, BorrowSummary, CreateBorrow, PageMeta, PageRequest},
    repository::Repository,
};

use super::inventory::InventoryService;

/// One page of the borrow summary
#[derive(Debug, Clone, PartialEq)]
pub struct BorrowSummaryPage {
    pub items: Vec<BorrowSummary>,
    pub meta: PageMeta,
}

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    inventory: InventoryService,
}

impl BorrowsService {
    pub fn new(repository: Repository, inventory: InventoryService) -> Self {
        Self {
            repository,
            inventory,
        }
    }

    /// Borrow copies of a book.
    ///
    /// Stock is decremented before the borrow record is written. If the write
    /// fails the copies are put back and the write error is returned.
    pub async fn borrow(&self, request: CreateBorrow) -> AppResult<Borrow> {
        let book = self
            .repository
            .books
            .get_by_id(request.book)
            .await?
            .ok_or_else(|| AppError::book_not_found(request.book))?;

        self.inventory.adjust(&book, request.quantity).await?;

        let borrow = Borrow::new(&request, Utc::now());
        match self.repository.borrows.insert(&borrow).await {
            Ok(created) => {
                tracing::info!(
                    borrow_id = %created.id,
                    book_id = %created.book_id,
                    quantity = created.quantity,
                    "Book borrowed"
                );
                Ok(created)
            }
            Err(e) => {
                tracing::warn!(book_id = %book.id, "Borrow insert failed, restocking: {}", e);
                if let Err(restock_err) = self.inventory.restock(&book, request.quantity).await {
                    tracing::error!(
                        book_id = %book.id,
                        quantity = request.quantity,
                        "Restock after failed borrow insert also failed: {}",
                        restock_err
                    );
                }
                Err(e)
            }
        }
    }

    /// Total quantity borrowed per book, sorted by title, one page at a time
    pub async fn summarize(&self, page: PageRequest) -> AppResult<BorrowSummaryPage> {
        let total = self.repository.borrows.count_summarized().await?;
        let items = self
            .repository
            .borrows
            .summarize(page.skip(), page.limit)
            .await?;

        Ok(BorrowSummaryPage {
            items,
            meta: page.meta(total),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::predicate::eq;
    use uuid::Uuid;

    use super::*;
    use crate::{
        models::{borrow::BorrowedBook, Book, CreateBook, Genre},
        repository::{MockBookStore, MockBorrowStore, StockAdjustment},
    };

    fn sample_book(copies: i32) -> Book {
        Book::new(
            CreateBook {
                title: "The Hobbit".into(),
                author: "J.R.R. Tolkien".into(),
                genre: Genre::Fantasy,
                isbn: "9780547928227".into(),
                description: None,
                copies,
            },
            Utc::now(),
        )
    }

    fn request(book: Uuid, quantity: i32) -> CreateBorrow {
        CreateBorrow {
            book,
            quantity,
            due_date: Utc::now(),
        }
    }

    fn service(books: MockBookStore, borrows: MockBorrowStore) -> BorrowsService {
        let repository = Repository::new(Arc::new(books), Arc::new(borrows));
        BorrowsService::new(repository.clone(), InventoryService::new(repository))
    }

    #[tokio::test]
    async fn test_borrow_missing_book_touches_nothing() {
        let mut books = MockBookStore::new();
        books.expect_get_by_id().returning(|_| Ok(None));
        books.expect_decrement_copies().never();
        let mut borrows = MockBorrowStore::new();
        borrows.expect_insert().never();

        let err = service(books, borrows)
            .borrow(request(Uuid::new_v4(), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_borrow_insufficient_stock_creates_no_record() {
        let book = sample_book(2);
        let id = book.id;
        let mut books = MockBookStore::new();
        books
            .expect_get_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(book.clone())));
        books
            .expect_decrement_copies()
            .with(eq(id), eq(5))
            .times(1)
            .returning(|_, _| Ok(StockAdjustment::Insufficient { available: 2 }));
        let mut borrows = MockBorrowStore::new();
        borrows.expect_insert().never();

        let err = service(books, borrows).borrow(request(id, 5)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientStock {
                requested: 5,
                available: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_borrow_records_after_adjustment() {
        let book = sample_book(4);
        let id = book.id;
        let mut adjusted = book.clone();
        adjusted.checkout(3).unwrap();

        let mut books = MockBookStore::new();
        books
            .expect_get_by_id()
            .returning(move |_| Ok(Some(book.clone())));
        books
            .expect_decrement_copies()
            .times(1)
            .returning(move |_, _| Ok(StockAdjustment::Adjusted(adjusted.clone())));
        books.expect_restock().never();
        let mut borrows = MockBorrowStore::new();
        borrows
            .expect_insert()
            .times(1)
            .returning(|b| Ok(b.clone()));

        let created = service(books, borrows).borrow(request(id, 3)).await.unwrap();
        assert_eq!(created.book_id, id);
        assert_eq!(created.quantity, 3);
    }

    #[tokio::test]
    async fn test_failed_insert_restocks() {
        let book = sample_book(4);
        let id = book.id;
        let adjusted = book.clone();

        let mut books = MockBookStore::new();
        books
            .expect_get_by_id()
            .returning(move |_| Ok(Some(book.clone())));
        books
            .expect_decrement_copies()
            .returning(move |_, _| Ok(StockAdjustment::Adjusted(adjusted.clone())));
        books
            .expect_restock()
            .with(eq(id), eq(2))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut borrows = MockBorrowStore::new();
        borrows
            .expect_insert()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let err = service(books, borrows).borrow(request(id, 2)).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_zero_quantity_leaves_stock_untouched() {
        let book = sample_book(4);
        let id = book.id;
        let mut books = MockBookStore::new();
        books
            .expect_get_by_id()
            .returning(move |_| Ok(Some(book.clone())));
        books.expect_decrement_copies().never();
        let mut borrows = MockBorrowStore::new();
        borrows.expect_insert().never();

        let result = service(books, borrows).borrow(request(id, 0)).await;
        tokio_test::assert_err!(&result);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_summarize_uses_window_and_total() {
        let books = MockBookStore::new();
        let mut borrows = MockBorrowStore::new();
        borrows.expect_count_summarized().returning(|| Ok(11));
        borrows
            .expect_summarize()
            .with(eq(10), eq(5))
            .times(1)
            .returning(|_, _| {
                Ok(vec![BorrowSummary {
                    book: BorrowedBook {
                        title: "Zen".into(),
                        isbn: "1".into(),
                    },
                    total_quantity: 2,
                }])
            });

        let page = service(books, borrows)
            .summarize(PageRequest { page: 3, limit: 5 })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(
            page.meta,
            PageMeta {
                total: 11,
                limit: 5,
                page: 3,
                pages: 3
            }
        );
    }
}
