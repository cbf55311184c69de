use async_trait::async_trait;
use serde_json::Value;

use identra_application::AuditIndexManager;
use identra_core::{AppError, AppResult, Tenant};

/// HTTP adapter pushing audit documents into an external search index.
///
/// Each tenant writes to its own index; the index engine itself is a
/// black box behind its document-ingest endpoint.
pub struct HttpAuditIndexer {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpAuditIndexer {
    /// Creates an indexer against the given index engine base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http_client,
            base_url,
        }
    }

    fn ingest_url(&self, tenant: &Tenant) -> String {
        format!(
            "{}/audit-{}/_doc",
            self.base_url,
            tenant.as_str().to_lowercase()
        )
    }

    fn document_with_timestamp(timestamp_millis: i64, document: Value) -> Value {
        match document {
            Value::Object(mut fields) => {
                fields.insert("@timestamp".to_owned(), Value::from(timestamp_millis));
                Value::Object(fields)
            }
            other => other,
        }
    }
}

#[async_trait]
impl AuditIndexManager for HttpAuditIndexer {
    async fn index(
        &self,
        tenant: &Tenant,
        timestamp_millis: i64,
        document: Value,
    ) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.ingest_url(tenant))
            .json(&Self::document_with_timestamp(timestamp_millis, document))
            .send()
            .await
            .map_err(|request_error| {
                AppError::Internal(format!("failed to reach audit index: {request_error}"))
            })?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "audit index rejected document: HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use identra_core::Tenant;

    use super::HttpAuditIndexer;

    #[test]
    fn ingest_url_is_per_tenant_and_lowercase() {
        let indexer = HttpAuditIndexer::new(reqwest::Client::new(), "http://localhost:9200/");
        assert_eq!(
            indexer.ingest_url(&Tenant::master()),
            "http://localhost:9200/audit-master/_doc"
        );
    }

    #[test]
    fn timestamp_is_embedded_into_object_documents() {
        let document = HttpAuditIndexer::document_with_timestamp(
            1_724_544_000_000,
            json!({"type": "LOGIC", "event": "create"}),
        );
        assert_eq!(document["@timestamp"], 1_724_544_000_000_i64);
        assert_eq!(document["event"], "create");
    }

    #[test]
    fn non_object_documents_pass_through() {
        let document = HttpAuditIndexer::document_with_timestamp(0, json!("raw"));
        assert_eq!(document, json!("raw"));
    }
}
