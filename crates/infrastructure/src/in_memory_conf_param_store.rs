use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use identra_application::ConfParamOps;
use identra_core::{AppResult, Tenant};

/// In-memory parameter store for dev setups and tests.
///
/// Keys are unique per tenant; writes are last-write-wins.
#[derive(Default)]
pub struct InMemoryConfParamStore {
    entries: Mutex<BTreeMap<(String, String), Value>>,
}

impl InMemoryConfParamStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfParamOps for InMemoryConfParamStore {
    async fn list(&self, tenant: &Tenant) -> AppResult<BTreeMap<String, Value>> {
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .filter(|((owner, _), _)| owner == tenant.as_str())
            .map(|((_, key), value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn get(&self, tenant: &Tenant, key: &str) -> AppResult<Option<Value>> {
        Ok(self
            .entries
            .lock()
            .await
            .get(&(tenant.as_str().to_owned(), key.to_owned()))
            .cloned())
    }

    async fn set(&self, tenant: &Tenant, key: &str, value: Value) -> AppResult<()> {
        self.entries
            .lock()
            .await
            .insert((tenant.as_str().to_owned(), key.to_owned()), value);
        Ok(())
    }

    async fn remove(&self, tenant: &Tenant, key: &str) -> AppResult<()> {
        self.entries
            .lock()
            .await
            .remove(&(tenant.as_str().to_owned(), key.to_owned()));
        Ok(())
    }
}
