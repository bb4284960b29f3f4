//! Borrow endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{borrow::BorrowSummaryQuery, Borrow, BorrowSummary, CreateBorrow, PageRequest},
    AppState,
};

use super::{ApiResponse, ValidatedJson};

/// Default page size for the borrow summary
pub const DEFAULT_SUMMARY_LIMIT: i64 = 5;

/// Borrow copies of a book
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "borrow",
    request_body = CreateBorrow,
    responses(
        (status = 200, description = "Book borrowed", body = Borrow),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Not enough copies available", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_borrow(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateBorrow>,
) -> AppResult<Json<ApiResponse<Borrow>>> {
    let borrow = state.services.borrows.borrow(request).await?;
    Ok(ApiResponse::ok("Book borrowed successfully", borrow))
}

/// Total quantity borrowed per book, sorted by title.
///
/// Borrows of books that have since been deleted are left out.
#[utoipa::path(
    get,
    path = "/borrow",
    tag = "borrow",
    params(BorrowSummaryQuery),
    responses(
        (status = 200, description = "Borrowed books summary", body = Vec<BorrowSummary>)
    )
)]
pub async fn borrow_summary(
    State(state): State<AppState>,
    Query(query): Query<BorrowSummaryQuery>,
) -> AppResult<Json<ApiResponse<Vec<BorrowSummary>>>> {
    let page = PageRequest::from_params(
        query.limit.as_deref(),
        query.page.as_deref(),
        DEFAULT_SUMMARY_LIMIT,
    );
    let summary = state.services.borrows.summarize(page).await?;
    Ok(ApiResponse::page(
        "Borrowed books summary retrieved successfully",
        summary.items,
        summary.meta,
    ))
}
