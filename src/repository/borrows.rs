//! Borrows repository for PostgreSQL

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        borrow::{BorrowSummary, BorrowSummaryRow},
        Borrow,
    },
};

use super::BorrowStore;

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowStore for BorrowsRepository {
    async fn insert(&self, borrow: &Borrow) -> AppResult<Borrow> {
        let created = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (id, book_id, quantity, due_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, book_id, quantity, due_date, created_at, updated_at
            "#,
        )
        .bind(borrow.id)
        .bind(borrow.book_id)
        .bind(borrow.quantity)
        .bind(borrow.due_date)
        .bind(borrow.created_at)
        .bind(borrow.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn summarize(&self, skip: i64, limit: i64) -> AppResult<Vec<BorrowSummary>> {
        // Inner join drops groups whose book was deleted
        let rows = sqlx::query_as::<_, BorrowSummaryRow>(
            r#"
            SELECT b.title, b.isbn, SUM(br.quantity)::BIGINT AS total_quantity
            FROM borrows br
            JOIN books b ON b.id = br.book_id
            GROUP BY b.id, b.title, b.isbn
            ORDER BY b.title COLLATE "C", b.id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BorrowSummary::from).collect())
    }

    async fn count_summarized(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT br.book_id)
            FROM borrows br
            JOIN books b ON b.id = br.book_id
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
