//! Books repository for PostgreSQL

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookFilter, CreateBook, UpdateBook},
};

use super::{BookStore, StockAdjustment};

const BOOK_COLUMNS: &str = "id, title, author, genre, isbn, description, copies, available, created_at, updated_at";

/// Map a unique-constraint violation on `isbn` to a conflict
fn map_isbn_conflict(err: sqlx::Error, isbn: &str) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict {
            field: "isbn".to_string(),
            value: isbn.to_string(),
        },
        other => AppError::Database(other),
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn create(&self, input: &CreateBook) -> AppResult<Book> {
        let book = Book::new(input.clone(), Utc::now());

        sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (
                id, title, author, genre, isbn, description, copies, available, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre)
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.copies)
        .bind(book.available)
        .bind(book.created_at)
        .bind(book.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_isbn_conflict(e, &input.isbn))
    }

    async fn list(&self, filter: &BookFilter) -> AppResult<(Vec<Book>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books");
        if let Some(genre) = filter.genre {
            count_query.push(" WHERE genre = ").push_bind(genre);
        }
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM books", BOOK_COLUMNS));
        if let Some(genre) = filter.genre {
            select.push(" WHERE genre = ").push_bind(genre);
        }
        // Sort columns come from a closed enum, never from raw input
        match filter.sort {
            Some((field, order)) => {
                select.push(format!(
                    " ORDER BY {} {}, created_at, id",
                    field.column(),
                    order.keyword()
                ));
            }
            None => {
                select.push(" ORDER BY created_at, id");
            }
        }
        select
            .push(" LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.skip);

        let books = select
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn update(&self, id: Uuid, changes: &UpdateBook) -> AppResult<Option<Book>> {
        let result = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books SET
                title = COALESCE($1, title),
                author = COALESCE($2, author),
                genre = COALESCE($3, genre),
                isbn = COALESCE($4, isbn),
                description = COALESCE($5, description),
                copies = COALESCE($6, copies),
                available = COALESCE($6, copies) > 0,
                updated_at = $7
            WHERE id = $8
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(changes.title.as_deref())
        .bind(changes.author.as_deref())
        .bind(changes.genre)
        .bind(changes.isbn.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.copies)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(book) => Ok(book),
            Err(e) => Err(map_isbn_conflict(
                e,
                changes.isbn.as_deref().unwrap_or_default(),
            )),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn decrement_copies(&self, id: Uuid, quantity: i32) -> AppResult<StockAdjustment> {
        let adjusted = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books SET
                copies = copies - $1,
                available = copies - $1 > 0,
                updated_at = $2
            WHERE id = $3 AND copies >= $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(quantity)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(book) = adjusted {
            return Ok(StockAdjustment::Adjusted(book));
        }

        // No row updated: either the book is gone or stock is short
        let available: Option<i32> = sqlx::query_scalar("SELECT copies FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match available {
            Some(available) => StockAdjustment::Insufficient { available },
            None => StockAdjustment::Missing,
        })
    }

    async fn restock(&self, id: Uuid, quantity: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE books SET
                copies = copies + $1,
                available = copies + $1 > 0,
                updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
