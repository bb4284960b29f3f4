//! Page/limit handling shared by list endpoints

use serde::Serialize;
use utoipa::ToSchema;

/// Validated page window. Both values are always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub const DEFAULT_PAGE: i64 = 1;

    /// Resolve raw query values, falling back to defaults for anything that
    /// is missing, non-numeric, zero or negative.
    pub fn from_params(limit: Option<&str>, page: Option<&str>, default_limit: i64) -> Self {
        Self {
            page: positive_or(page, Self::DEFAULT_PAGE),
            limit: positive_or(limit, default_limit),
        }
    }

    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            total,
            limit: self.limit,
            page: self.page,
            pages: page_count(total, self.limit),
        }
    }
}

fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// ceil(total / limit)
pub fn page_count(total: i64, limit: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (total - 1) / limit + 1
}

/// Pagination metadata returned alongside list data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    pub total: i64,
    pub limit: i64,
    pub page: i64,
    pub pages: i64,
}
