//! Borrow (loan transaction) model and related types

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Borrow record as stored. Never updated once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrow {
    pub id: Uuid,
    /// Borrowed book id
    #[serde(rename = "book")]
    pub book_id: Uuid,
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Borrow {
    pub fn new(request: &CreateBorrow, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id: request.book,
            quantity: request.quantity,
            due_date: request.due_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Borrow request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrow {
    /// Book id
    pub book: Uuid,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,
    /// RFC 3339 timestamp or YYYY-MM-DD
    #[serde(deserialize_with = "deserialize_due_date")]
    #[schema(value_type = String, example = "2025-07-18")]
    pub due_date: DateTime<Utc>,
}

fn deserialize_due_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_due_date(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("dueDate '{}' is not a valid date", raw))
    })
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC) or a bare date (midnight UTC)
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Book fields shown in the borrow summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BorrowedBook {
    pub title: String,
    pub isbn: String,
}

/// Total quantity borrowed for one book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowSummary {
    pub book: BorrowedBook,
    pub total_quantity: i64,
}

/// Flat row produced by the summary query
#[derive(Debug, FromRow)]
pub struct BorrowSummaryRow {
    pub title: String,
    pub isbn: String,
    pub total_quantity: i64,
}

impl From<BorrowSummaryRow> for BorrowSummary {
    fn from(row: BorrowSummaryRow) -> Self {
        Self {
            book: BorrowedBook {
                title: row.title,
                isbn: row.isbn,
            },
            total_quantity: row.total_quantity,
        }
    }
}

/// Borrow summary query parameters, as received
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BorrowSummaryQuery {
    /// Page size (default: 5)
    pub limit: Option<String>,
    /// Page number (default: 1)
    pub page: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_due_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2025, 7, 18, 0, 0, 0).unwrap();
        assert_eq!(parse_due_date("2025-07-18"), Some(midnight));
        assert_eq!(parse_due_date("2025-07-18T00:00:00Z"), Some(midnight));
        assert_eq!(parse_due_date("2025-07-18T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_due_date("2025-07-18T00:00:00.000"), Some(midnight));
        assert_eq!(parse_due_date("tomorrow"), None);
        assert_eq!(parse_due_date("2025-13-01"), None);
    }

    #[test]
    fn test_create_borrow_deserialize() {
        let id = Uuid::new_v4();
        let request: CreateBorrow = serde_json::from_value(serde_json::json!({
            "book": id,
            "quantity": 2,
            "dueDate": "2025-07-18"
        }))
        .unwrap();
        assert_eq!(request.book, id);
        assert_eq!(request.quantity, 2);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_borrow_rejects_zero_quantity() {
        let request = CreateBorrow {
            book: Uuid::new_v4(),
            quantity: 0,
            due_date: Utc::now(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_borrow_serializes_book_reference() {
        let request = CreateBorrow {
            book: Uuid::new_v4(),
            quantity: 1,
            due_date: Utc::now(),
        };
        let borrow = Borrow::new(&request, Utc::now());
        let json = serde_json::to_value(&borrow).unwrap();
        assert_eq!(json["book"], serde_json::json!(request.book));
        assert!(json.get("dueDate").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
