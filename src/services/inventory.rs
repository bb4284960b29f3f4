//! Inventory adjustment for borrowing

use crate::{
    error::{AppError, AppResult},
    models::Book,
    repository::{Repository, StockAdjustment},
};

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Take `quantity` copies of `book` off the shelf and return the updated book.
    ///
    /// The stock check and the decrement happen in one store operation, so two
    /// concurrent callers cannot both pass the check against the same copies.
    pub async fn adjust(&self, book: &Book, quantity: i32) -> AppResult<Book> {
        if quantity < 1 {
            return Err(AppError::Validation(
                "Quantity must be a positive integer".to_string(),
            ));
        }

        match self.repository.books.decrement_copies(book.id, quantity).await? {
            StockAdjustment::Adjusted(updated) => {
                tracing::debug!(
                    book_id = %updated.id,
                    copies = updated.copies,
                    "Inventory adjusted"
                );
                Ok(updated)
            }
            StockAdjustment::Insufficient { available } => {
                tracing::info!(
                    book_id = %book.id,
                    requested = quantity,
                    available,
                    "Borrow rejected: insufficient stock"
                );
                Err(AppError::InsufficientStock {
                    requested: quantity,
                    available,
                })
            }
            StockAdjustment::Missing => Err(AppError::book_not_found(book.id)),
        }
    }

    /// Put copies back after a borrow could not be recorded
    pub async fn restock(&self, book: &Book, quantity: i32) -> AppResult<()> {
        self.repository.books.restock(book.id, quantity).await
    }
}
