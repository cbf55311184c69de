//! Query-side port over the persisted audit trail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use identra_core::AppResult;
use identra_domain::{AuditEntry, AuditResult, EventCategoryType, SortDirection};

/// Conjunctive criteria over audit entries; unset members do not filter.
#[derive(Debug, Clone, Default)]
pub struct AuditEntryFilter {
    /// Key of the entity the entry is about.
    pub entity_key: Option<String>,
    /// Event category type.
    pub event_type: Option<EventCategoryType>,
    /// Category (logic/resource name).
    pub category: Option<String>,
    /// Subcategory (operation grouping).
    pub subcategory: Option<String>,
    /// Event names, matched disjunctively among themselves.
    pub events: Vec<String>,
    /// Operation outcome.
    pub result: Option<AuditResult>,
    /// Upper bound on the event date, inclusive.
    pub before: Option<DateTime<Utc>>,
    /// Lower bound on the event date, inclusive.
    pub after: Option<DateTime<Utc>>,
}

/// One ordering criterion.
#[derive(Debug, Clone)]
pub struct SortClause {
    /// Column/property to order by.
    pub property: String,
    /// Direction applied to the property.
    pub direction: SortDirection,
}

/// Zero-based page window.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// Page size.
    pub size: u32,
    /// Zero-based page number.
    pub number: u32,
}

/// Ordering plus optional pagination; the default is unsorted and unpaged.
#[derive(Debug, Clone, Default)]
pub struct Pageable {
    /// Ordering criteria, applied in sequence.
    pub sort: Vec<SortClause>,
    /// Page window; `None` returns everything.
    pub page: Option<PageRequest>,
}

/// Read port over the audit trail.
#[async_trait]
pub trait AuditEntryRepository: Send + Sync {
    /// Counts the entries matching the filter.
    async fn count(&self, filter: &AuditEntryFilter) -> AppResult<i32>;

    /// Returns the entries matching the filter, ordered and paged.
    async fn search(
        &self,
        filter: &AuditEntryFilter,
        pageable: &Pageable,
    ) -> AppResult<Vec<AuditEntry>>;
}
