// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use eidiv_domain::EventNumber;
use serde::{Deserialize, Serialize};

/// Operator data retrieved from persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorData {
    pub operator_id: i64,
    /// Always stored uppercase.
    pub login_name: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// Session data retrieved from persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub operator_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    /// RFC 3339 instant after which the session is no longer valid.
    pub expires_at: String,
}

/// Identity of a freshly recorded incident or duty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordedEvent {
    /// Row id of the incident or duty.
    pub id: i64,
    pub number: EventNumber,
}

/// Search parameters of an event list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Case-insensitive text matched against the searchable columns.
    pub query: Option<String>,
    pub year: Option<u16>,
    /// 1-based page number.
    pub page: u32,
}

impl EventFilter {
    pub const PER_PAGE: u32 = 20;

    /// Returns the page number, treating 0 as the first page.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Returns the trimmed search text, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(Self::PER_PAGE)
    }
}

/// One page of a list result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn total_pages(&self) -> i64 {
        let per_page: i64 = i64::from(self.per_page.max(1));
        (self.total + per_page - 1) / per_page
    }
}
