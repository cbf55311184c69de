use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::error;

use identra_application::{AuditEntryFilter, AuditEntryRepository, Pageable};
use identra_core::{AppError, AppResult};
use identra_domain::AuditEntry;

use query::{
    order_by, BindValue, MessageCriteriaBuilder, QueryParameter, AUDIT_ENTRY_MESSAGE_COLUMN,
    AUDIT_ENTRY_TABLE,
};

mod query;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed query engine over the audit trail.
///
/// Entries are stored as serialized JSON in a single message column;
/// criteria compile to raw substring matches over that text, so results
/// follow what the writer serialized, not any re-interpretation of it.
#[derive(Clone)]
pub struct PostgresAuditEntryRepository {
    pool: PgPool,
}

impl PostgresAuditEntryRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn criteria(filter: &AuditEntryFilter) -> (String, Vec<QueryParameter>) {
        MessageCriteriaBuilder::new()
            .entity_key(filter.entity_key.as_deref())
            .event_type(filter.event_type)
            .category(filter.category.as_deref())
            .subcategory(filter.subcategory.as_deref())
            .result(filter.result)
            .events(&filter.events)
            .before(filter.before)
            .after(filter.after)
            .build()
    }

    fn decode_row(row: &PgRow) -> Option<AuditEntry> {
        // text column on fresh deployments, large-object bytes on ones
        // migrated from older schemas
        let message = match row.try_get::<String, _>(0) {
            Ok(message) => message,
            Err(_) => match row
                .try_get::<Vec<u8>, _>(0)
                .map_err(|fetch_error| fetch_error.to_string())
                .and_then(|bytes| String::from_utf8(bytes).map_err(|utf8_error| utf8_error.to_string()))
            {
                Ok(message) => message,
                Err(decode_error) => {
                    error!(error = %decode_error, "unreadable audit entry, skipping");
                    return None;
                }
            },
        };

        match serde_json::from_str(&message) {
            Ok(entry) => Some(entry),
            Err(parse_error) => {
                error!(error = %parse_error, "undecodable audit entry, skipping");
                None
            }
        }
    }
}

#[async_trait]
impl AuditEntryRepository for PostgresAuditEntryRepository {
    async fn count(&self, filter: &AuditEntryFilter) -> AppResult<i32> {
        let (criteria, parameters) = Self::criteria(filter);
        let sql = format!("SELECT COUNT(0) FROM {AUDIT_ENTRY_TABLE} WHERE{criteria}");

        let mut statement = sqlx::query_scalar::<_, i64>(&sql);
        for parameter in parameters {
            statement = match parameter.normalise() {
                BindValue::Int(value) => statement.bind(value),
                BindValue::DateTime(value) => statement.bind(value),
            };
        }

        let total = statement
            .fetch_one(&self.pool)
            .await
            .map_err(|query_error| {
                AppError::Internal(format!("failed to count audit entries: {query_error}"))
            })?;

        // 32-bit result, truncating like the paging layer expects
        Ok(total as i32)
    }

    async fn search(
        &self,
        filter: &AuditEntryFilter,
        pageable: &Pageable,
    ) -> AppResult<Vec<AuditEntry>> {
        let (criteria, parameters) = Self::criteria(filter);
        let mut sql = format!(
            "SELECT {AUDIT_ENTRY_MESSAGE_COLUMN} FROM {AUDIT_ENTRY_TABLE} WHERE{criteria}"
        );
        sql.push_str(&order_by(&pageable.sort));
        if let Some(page) = pageable.page {
            sql.push_str(&format!(
                " LIMIT {} OFFSET {}",
                page.size,
                u64::from(page.size) * u64::from(page.number)
            ));
        }

        let mut statement = sqlx::query(&sql);
        for parameter in parameters {
            statement = match parameter.normalise() {
                BindValue::Int(value) => statement.bind(value),
                BindValue::DateTime(value) => statement.bind(value),
            };
        }

        let rows = statement
            .fetch_all(&self.pool)
            .await
            .map_err(|query_error| {
                AppError::Internal(format!("failed to search audit entries: {query_error}"))
            })?;

        Ok(rows.iter().filter_map(Self::decode_row).collect())
    }
}
