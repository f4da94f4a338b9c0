//! Pagination defaults and clamps for list endpoints.

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum number of results per page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Clamp a user-provided page size to valid bounds.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1).min(MAX_PAGE_SIZE)
}

/// Clamp a user-provided page number to >= 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// SQL offset for a 1-based page.
pub fn offset(page: i64, limit: i64) -> i64 {
    (page - 1) * limit
}

/// Number of pages needed for `total` rows at `limit` per page.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
