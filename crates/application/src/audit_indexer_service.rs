//! Fire-and-forget forwarding of audit events to an external index.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::error;

use identra_core::{AppResult, Tenant};

/// Write port over the external audit index.
#[async_trait]
pub trait AuditIndexManager: Send + Sync {
    /// Indexes one audit document under the tenant's index.
    async fn index(&self, tenant: &Tenant, timestamp_millis: i64, document: Value)
        -> AppResult<()>;
}

/// Terminal sink forwarding serialized audit events to the index.
///
/// Indexing is strictly best-effort: a malformed message or an index
/// failure is logged and dropped, never surfaced to the emitting flow.
pub struct AuditIndexerSink {
    tenant: Tenant,
    index_manager: Arc<dyn AuditIndexManager>,
}

impl AuditIndexerSink {
    /// Creates a sink bound to one tenant's index.
    #[must_use]
    pub fn new(tenant: Tenant, index_manager: Arc<dyn AuditIndexManager>) -> Self {
        Self {
            tenant,
            index_manager,
        }
    }

    /// Forwards one serialized audit event.
    pub async fn append(&self, timestamp_millis: i64, message: &str) {
        let document: Value = match serde_json::from_str(message) {
            Ok(document) => document,
            Err(parse_error) => {
                error!(tenant = %self.tenant, error = %parse_error, "while parsing audit event");
                return;
            }
        };

        if let Err(index_error) = self
            .index_manager
            .index(&self.tenant, timestamp_millis, document)
            .await
        {
            error!(tenant = %self.tenant, error = %index_error, "while indexing audit event");
        }
    }

    /// [`Self::append`] with the current instant as the event timestamp.
    pub async fn append_now(&self, message: &str) {
        self.append(Utc::now().timestamp_millis(), message).await;
    }
}
