use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of the subsystem an audit event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventCategoryType {
    /// Business logic layer.
    Logic,
    /// Workflow engine.
    Wf,
    /// REST endpoints.
    Rest,
    /// Scheduled tasks.
    Task,
    /// Outbound propagation.
    Propagation,
    /// Inbound pull.
    Pull,
    /// Outbound push reconciliation.
    Push,
    /// Deployment-defined events.
    Custom,
}

impl EventCategoryType {
    /// Returns the stable wire name, as written into the audit JSON.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logic => "LOGIC",
            Self::Wf => "WF",
            Self::Rest => "REST",
            Self::Task => "TASK",
            Self::Propagation => "PROPAGATION",
            Self::Pull => "PULL",
            Self::Push => "PUSH",
            Self::Custom => "CUSTOM",
        }
    }
}

/// Outcome of the audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditResult {
    /// Operation completed.
    Success,
    /// Operation failed.
    Failure,
}

impl AuditResult {
    /// Returns the stable wire name, as written into the audit JSON.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

/// One append-only audit record, stored verbatim as a JSON document.
///
/// The writer controls the JSON shape; the query engine matches raw
/// substrings of it, so field names here are load-bearing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Originating subsystem category.
    #[serde(rename = "type")]
    pub event_type: EventCategoryType,
    /// Logical category (e.g. the logic class name).
    pub category: Option<String>,
    /// Logical subcategory.
    pub subcategory: Option<String>,
    /// Event name within the category.
    pub event: Option<String>,
    /// Operation outcome.
    pub result: Option<AuditResult>,
    /// Key of the entity the event refers to.
    pub key: Option<String>,
    /// When the event happened.
    #[serde(rename = "eventDate")]
    pub event_date: DateTime<Utc>,
}

/// Direction of one sort clause in a pageable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Returns the SQL keyword for this direction.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
