//! Offset pagination for list endpoints.

use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use utoipa::{IntoParams, ToSchema};

/// Page size served when the query string names none.
const DEFAULT_PAGE_SIZE: i64 = 10;

/// Ceiling on the requested page size.
const MAX_PAGE_SIZE: i64 = 100;

/// `skip`/`limit` query parameters shared by the list endpoints.
///
/// Out-of-range values are clamped rather than rejected: a negative skip
/// starts from the beginning, a limit of zero or below serves a single row,
/// and anything past the ceiling serves the ceiling.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct Pagination {
    /// Number of items to skip
    #[param(default = 0, minimum = 0)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub skip: Option<i64>,

    /// Page size
    #[param(default = 10, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}

impl Pagination {
    /// The clamped `(skip, limit)` pair, ready to bind as OFFSET/LIMIT.
    pub fn params(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).max(0);
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        (skip, limit)
    }
}
