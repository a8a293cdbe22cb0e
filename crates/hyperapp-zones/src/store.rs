//! Remote data store collaborator
//!
//! The engine never talks to the hosted backend directly; it goes through
//! the [`DataStore`] trait so hosts can plug in their SDK client and tests
//! can plug in an in-memory fake. Rows travel as `serde_json::Value` and the
//! domain types decode themselves out of them.

use async_trait::async_trait;
use serde_json::Value;

/// Table names owned by collaborating services.
pub mod tables {
    /// Community reports (read-only here)
    pub const REPORTS: &str = "reports";
    /// Persisted geofence zones
    pub const GEOFENCES: &str = "geofences";
    /// Per-user monitoring settings
    pub const USER_GEOFENCE_SETTINGS: &str = "user_geofence_settings";
    /// Enter/exit event log (write-only here)
    pub const GEOFENCE_EVENTS: &str = "geofence_events";
}

/// Data store errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Backend not reachable (network failure, host down)
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// Read rejected by the backend
    #[error("query failed on {table}: {message}")]
    QueryFailed {
        /// Table the query targeted
        table: String,
        /// Backend-provided reason
        message: String,
    },

    /// Write rejected by the backend
    #[error("write failed on {table}: {message}")]
    WriteFailed {
        /// Table the write targeted
        table: String,
        /// Backend-provided reason
        message: String,
    },
}

/// Sort direction for [`QueryFilter::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

/// Declarative row filter shared by real store adapters and test fakes.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    /// Column equality constraints (all must match)
    pub eq: Vec<(String, Value)>,
    /// Columns that must be present and non-null
    pub not_null: Vec<String>,
    /// Optional sort column and direction
    pub order_by: Option<(String, SortOrder)>,
    /// Optional row limit, applied after sorting
    pub limit: Option<usize>,
}

impl QueryFilter {
    /// Create an empty filter (matches every row).
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a column to equal a value.
    #[inline]
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.eq.push((column.into(), value.into()));
        self
    }

    /// Require a column to be present and non-null. Applied before any row
    /// limit, so excluded rows never consume limit slots.
    #[inline]
    #[must_use]
    pub fn not_null(mut self, column: impl Into<String>) -> Self {
        self.not_null.push(column.into());
        self
    }

    /// Sort descending by a column.
    #[inline]
    #[must_use]
    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some((column.into(), SortOrder::Desc));
        self
    }

    /// Cap the number of returned rows.
    #[inline]
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Abstract remote data store (hosted backend, Postgres-backed tables).
///
/// Implementations contain their own transport concerns; callers treat every
/// error as transient and degrade rather than crash.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Fetch rows from `table` matching `filter`.
    async fn query(&self, table: &str, filter: QueryFilter) -> Result<Vec<Value>, StoreError>;

    /// Insert a record, returning the stored row.
    async fn insert(&self, table: &str, record: Value) -> Result<Value, StoreError>;

    /// Insert or update a record keyed by its primary column.
    async fn upsert(&self, table: &str, record: Value) -> Result<(), StoreError>;
}
