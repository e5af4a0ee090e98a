//! Types for the remote user directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pressroom_core::{Email, UserId};

/// Fixed page size for the admin user table.
pub const PAGE_SIZE: u32 = 10;

/// A row in the external `users` table.
///
/// The directory is distinct from the identity provider's own account
/// records; the two are mirrored at signup and can diverge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: UserId,
    pub email: Email,
    #[serde(default)]
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Insert payload for mirroring a freshly signed-up user.
#[derive(Debug, Clone, Serialize)]
pub struct NewDirectoryUser {
    pub id: UserId,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub metadata: serde_json::Value,
}

/// Active-status filter for the user table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    /// Parse from a query-string value; anything unrecognized means all.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            _ => Self::All,
        }
    }

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// The `is_active` value this filter selects, if any.
    #[must_use]
    pub const fn is_active(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(true),
            Self::Inactive => Some(false),
        }
    }
}

/// Sortable columns of the user table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Email,
    FullName,
    #[default]
    CreatedAt,
}

impl SortField {
    /// Parse from a query-string value; anything unrecognized means creation time.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "email" => Self::Email,
            "full_name" => Self::FullName,
            _ => Self::CreatedAt,
        }
    }

    /// The directory column name.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::FullName => "full_name",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse from a query-string value; anything unrecognized means descending.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }

    /// Query-string / order-clause value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// A user-table query: search, filter, sort, and page.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub search: Option<String>,
    pub status: StatusFilter,
    pub sort: SortField,
    pub order: SortOrder,
    /// 1-based page number.
    pub page: u32,
}

impl UserQuery {
    /// The trimmed search term, if one was given.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Zero-based inclusive row range for this page.
    #[must_use]
    pub const fn range(&self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let from = (page as u64 - 1) * PAGE_SIZE as u64;
        (from, from + PAGE_SIZE as u64 - 1)
    }

    /// The directory order clause, e.g. `created_at.desc`.
    #[must_use]
    pub fn order_clause(&self) -> String {
        format!("{}.{}", self.sort.column(), self.order.as_str())
    }
}

/// One page of directory users plus the exact total count.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<DirectoryUser>,
    pub total: u64,
}

impl UserPage {
    /// Number of pages at the fixed page size.
    #[must_use]
    pub const fn page_count(&self) -> u64 {
        self.total.div_ceil(PAGE_SIZE as u64)
    }
}

/// Aggregate user counts for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
    pub new_this_month: u64,
}
