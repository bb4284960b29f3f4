//! Data models for Book Verse

pub mod book;
pub mod borrow;
pub mod pagination;

// Re-export commonly used types
pub use book::{Book, BookFilter, CreateBook, Genre, UpdateBook};
pub use borrow::{Borrow, BorrowSummary, CreateBorrow};
pub use pagination::{PageMeta, PageRequest};
