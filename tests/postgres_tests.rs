//! PostgreSQL store tests
//!
//! Each test gets a fresh migrated database from `DATABASE_URL`.
//! Run with: DATABASE_URL=postgres://... cargo test --test postgres_tests -- --ignored

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use bookverse_server::{
    error::AppError,
    models::{
        borrow::{BorrowSummary, BorrowedBook},
        Book, Borrow, CreateBook, CreateBorrow, Genre, UpdateBook,
    },
    repository::{
        books::BooksRepository, borrows::BorrowsRepository, BookStore, BorrowStore,
        StockAdjustment,
    },
};

fn new_book(title: &str, isbn: &str, copies: i32) -> CreateBook {
    CreateBook {
        title: title.to_string(),
        author: "Test Author".to_string(),
        genre: Genre::Fiction,
        isbn: isbn.to_string(),
        description: None,
        copies,
    }
}

async fn record_borrow(borrows: &BorrowsRepository, book: Uuid, quantity: i32) {
    let borrow = Borrow::new(
        &CreateBorrow {
            book,
            quantity,
            due_date: Utc::now(),
        },
        Utc::now(),
    );
    borrows.insert(&borrow).await.expect("Failed to insert borrow");
}

async fn create(books: &BooksRepository, title: &str, isbn: &str, copies: i32) -> Book {
    books
        .create(&new_book(title, isbn, copies))
        .await
        .expect("Failed to create book")
}

fn summary(title: &str, isbn: &str, total_quantity: i64) -> BorrowSummary {
    BorrowSummary {
        book: BorrowedBook {
            title: title.to_string(),
            isbn: isbn.to_string(),
        },
        total_quantity,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires PostgreSQL
async fn test_decrement_outcomes(pool: PgPool) {
    let books = BooksRepository::new(pool);
    let book = create(&books, "Dune", "D-1", 3).await;

    match books.decrement_copies(book.id, 2).await.unwrap() {
        StockAdjustment::Adjusted(updated) => {
            assert_eq!(updated.copies, 1);
            assert!(updated.available);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    assert_eq!(
        books.decrement_copies(book.id, 2).await.unwrap(),
        StockAdjustment::Insufficient { available: 1 }
    );
    let unchanged = books.get_by_id(book.id).await.unwrap().unwrap();
    assert_eq!(unchanged.copies, 1);
    assert!(unchanged.available);

    match books.decrement_copies(book.id, 1).await.unwrap() {
        StockAdjustment::Adjusted(updated) => {
            assert_eq!(updated.copies, 0);
            assert!(!updated.available);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    assert_eq!(
        books.decrement_copies(Uuid::new_v4(), 1).await.unwrap(),
        StockAdjustment::Missing
    );

    books.restock(book.id, 2).await.unwrap();
    let restocked = books.get_by_id(book.id).await.unwrap().unwrap();
    assert_eq!(restocked.copies, 2);
    assert!(restocked.available);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires PostgreSQL
async fn test_concurrent_decrements_never_oversell(pool: PgPool) {
    let books = BooksRepository::new(pool);
    let book = create(&books, "Contested", "C-1", 3).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let books = books.clone();
        handles.push(tokio::spawn(async move {
            books.decrement_copies(book.id, 1).await
        }));
    }

    let mut adjusted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            StockAdjustment::Adjusted(_) => adjusted += 1,
            StockAdjustment::Insufficient { available } => {
                assert_eq!(available, 0);
                rejected += 1;
            }
            StockAdjustment::Missing => panic!("book vanished"),
        }
    }
    assert_eq!(adjusted, 3);
    assert_eq!(rejected, 7);

    let drained = books.get_by_id(book.id).await.unwrap().unwrap();
    assert_eq!(drained.copies, 0);
    assert!(!drained.available);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires PostgreSQL
async fn test_isbn_collisions_are_conflicts(pool: PgPool) {
    let books = BooksRepository::new(pool);
    create(&books, "First", "ISBN-1", 1).await;
    let second = create(&books, "Second", "ISBN-2", 1).await;

    let err = books.create(&new_book("Copy", "ISBN-1", 1)).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Conflict { ref field, ref value } if field == "isbn" && value == "ISBN-1"
    ));

    let err = books
        .update(
            second.id,
            &UpdateBook {
                isbn: Some("ISBN-1".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires PostgreSQL
async fn test_update_recomputes_available(pool: PgPool) {
    let books = BooksRepository::new(pool);
    let book = create(&books, "Emma", "E-1", 2).await;

    let updated = books
        .update(
            book.id,
            &UpdateBook {
                copies: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.copies, 0);
    assert!(!updated.available);
    assert_eq!(updated.title, "Emma");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Requires PostgreSQL
async fn test_summary_sorts_by_title_bytes_and_drops_orphans(pool: PgPool) {
    let books = BooksRepository::new(pool.clone());
    let borrows = BorrowsRepository::new(pool);

    let lower = create(&books, "apple", "A-2", 10).await;
    let upper = create(&books, "Banana", "B-1", 10).await;
    let zebra = create(&books, "Zebra", "Z-1", 10).await;
    let deleted = create(&books, "Gone", "G-1", 10).await;

    record_borrow(&borrows, lower.id, 1).await;
    record_borrow(&borrows, upper.id, 2).await;
    record_borrow(&borrows, upper.id, 3).await;
    record_borrow(&borrows, zebra.id, 4).await;
    record_borrow(&borrows, deleted.id, 5).await;
    record_borrow(&borrows, Uuid::new_v4(), 6).await;
    assert!(books.delete(deleted.id).await.unwrap());

    assert_eq!(borrows.count_summarized().await.unwrap(), 3);
    assert_eq!(
        borrows.summarize(0, 10).await.unwrap(),
        vec![
            summary("Banana", "B-1", 5),
            summary("Zebra", "Z-1", 4),
            summary("apple", "A-2", 1),
        ]
    );
    assert_eq!(
        borrows.summarize(1, 1).await.unwrap(),
        vec![summary("Zebra", "Z-1", 4)]
    );
    assert!(borrows.summarize(3, 5).await.unwrap().is_empty());
}
