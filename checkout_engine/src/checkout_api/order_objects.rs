use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::FulfillmentStatus;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Filters and pagination for order listings. Pages are numbered from 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub account_id: Option<i64>,
    pub status: Option<FulfillmentStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl OrderQueryFilter {
    pub fn with_account_id(mut self, account_id: i64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn with_status(mut self, status: FulfillmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }

    /// True if no row filters are set. Pagination does not count.
    pub fn is_empty(&self) -> bool {
        self.account_id.is_none() && self.status.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(account_id) = &self.account_id {
            write!(f, "account_id: {account_id}. ")?;
        }
        if let Some(status) = &self.status {
            write!(f, "status: {status}. ")?;
        }
        write!(f, "page {} ({} per page)", self.page(), self.limit())
    }
}
