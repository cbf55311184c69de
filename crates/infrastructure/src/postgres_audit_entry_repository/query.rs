use chrono::{DateTime, Utc};

use identra_application::SortClause;
use identra_domain::{AuditResult, EventCategoryType};

/// Table holding one row per audit event.
pub(super) const AUDIT_ENTRY_TABLE: &str = "audit_entry";
/// Column holding the serialized audit JSON.
pub(super) const AUDIT_ENTRY_MESSAGE_COLUMN: &str = "message";
/// Column holding the event timestamp, duplicated out of the JSON.
pub(super) const AUDIT_ENTRY_EVENT_DATE_COLUMN: &str = "event_date";

/// A positional parameter collected while building the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum QueryParameter {
    /// Boolean criterion.
    Bool(bool),
    /// Timestamp criterion.
    DateTime(DateTime<Utc>),
}

/// Driver-level value a parameter binds as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BindValue {
    /// 32-bit integer.
    Int(i32),
    /// Timestamp.
    DateTime(DateTime<Utc>),
}

impl QueryParameter {
    /// Booleans bind as `1`/`0`; everything else passes through.
    pub(super) fn normalise(self) -> BindValue {
        match self {
            Self::Bool(value) => BindValue::Int(i32::from(value)),
            Self::DateTime(value) => BindValue::DateTime(value),
        }
    }
}

/// Assembles the `WHERE` predicate over the serialized audit message.
///
/// String criteria match raw substrings of the JSON text in the message
/// column, exactly as the writer produced it; only the date bounds bind
/// as positional parameters, numbered in fragment order from `$1`.
pub(super) struct MessageCriteriaBuilder {
    query: String,
    parameters: Vec<QueryParameter>,
}

impl MessageCriteriaBuilder {
    pub(super) fn new() -> Self {
        Self {
            query: String::new(),
            parameters: Vec::new(),
        }
    }

    fn and_if_needed(&self) -> &'static str {
        if self.query.is_empty() { " " } else { " AND " }
    }

    pub(super) fn entity_key(mut self, entity_key: Option<&str>) -> Self {
        if let Some(entity_key) = entity_key {
            let conjunction = self.and_if_needed();
            self.query.push_str(&format!(
                "{conjunction}{AUDIT_ENTRY_MESSAGE_COLUMN} LIKE '%key%{entity_key}%'"
            ));
        }
        self
    }

    pub(super) fn event_type(mut self, event_type: Option<EventCategoryType>) -> Self {
        if let Some(event_type) = event_type {
            let conjunction = self.and_if_needed();
            self.query.push_str(&format!(
                "{conjunction}{AUDIT_ENTRY_MESSAGE_COLUMN} LIKE '%\"type\":\"{}\"%'",
                event_type.as_str()
            ));
        }
        self
    }

    pub(super) fn category(mut self, category: Option<&str>) -> Self {
        if let Some(category) = category.filter(|category| !category.trim().is_empty()) {
            let conjunction = self.and_if_needed();
            self.query.push_str(&format!(
                "{conjunction}{AUDIT_ENTRY_MESSAGE_COLUMN} LIKE '%\"category\":\"{category}\"%'"
            ));
        }
        self
    }

    pub(super) fn subcategory(mut self, subcategory: Option<&str>) -> Self {
        if let Some(subcategory) = subcategory.filter(|subcategory| !subcategory.trim().is_empty())
        {
            let conjunction = self.and_if_needed();
            self.query.push_str(&format!(
                "{conjunction}{AUDIT_ENTRY_MESSAGE_COLUMN} LIKE '%\"subcategory\":\"{subcategory}\"%'"
            ));
        }
        self
    }

    pub(super) fn result(mut self, result: Option<AuditResult>) -> Self {
        if let Some(result) = result {
            let conjunction = self.and_if_needed();
            self.query.push_str(&format!(
                "{conjunction}{AUDIT_ENTRY_MESSAGE_COLUMN} LIKE '%\"result\":\"{}\"%'",
                result.as_str()
            ));
        }
        self
    }

    pub(super) fn events(mut self, events: &[String]) -> Self {
        if !events.is_empty() {
            let chain = events
                .iter()
                .map(|event| {
                    format!("{AUDIT_ENTRY_MESSAGE_COLUMN} LIKE '%\"event\":\"{event}\"%'")
                })
                .collect::<Vec<_>>()
                .join(" OR ");
            let conjunction = self.and_if_needed();
            self.query.push_str(&format!("{conjunction}( {chain} )"));
        }
        self
    }

    pub(super) fn before(mut self, before: Option<DateTime<Utc>>) -> Self {
        if let Some(before) = before {
            self.parameters.push(QueryParameter::DateTime(before));
            let conjunction = self.and_if_needed();
            self.query.push_str(&format!(
                "{conjunction}{AUDIT_ENTRY_EVENT_DATE_COLUMN} <= ${}",
                self.parameters.len()
            ));
        }
        self
    }

    pub(super) fn after(mut self, after: Option<DateTime<Utc>>) -> Self {
        if let Some(after) = after {
            self.parameters.push(QueryParameter::DateTime(after));
            let conjunction = self.and_if_needed();
            self.query.push_str(&format!(
                "{conjunction}{AUDIT_ENTRY_EVENT_DATE_COLUMN} >= ${}",
                self.parameters.len()
            ));
        }
        self
    }

    /// Returns the predicate and its parameters; with no criteria the
    /// predicate degenerates to `" 1=1"`.
    pub(super) fn build(self) -> (String, Vec<QueryParameter>) {
        if self.query.is_empty() {
            (" 1=1".to_owned(), self.parameters)
        } else {
            (self.query, self.parameters)
        }
    }
}

/// Renders the `ORDER BY` clause; unsorted requests fall back to newest
/// first.
pub(super) fn order_by(sort: &[SortClause]) -> String {
    if sort.is_empty() {
        return format!(" ORDER BY {AUDIT_ENTRY_EVENT_DATE_COLUMN} DESC");
    }

    let clauses = sort
        .iter()
        .map(|clause| format!("{} {}", clause.property, clause.direction.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(" ORDER BY {clauses}")
}
