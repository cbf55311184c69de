//! Per-tenant configuration parameters and their first-boot seeding.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, info};

use identra_core::{AppResult, Tenant};

/// Position of the keymaster seeding step among startup loaders.
pub const KEYMASTER_LOADER_ORDER: u32 = 450;

/// Typed access to the per-tenant configuration parameter store.
#[async_trait]
pub trait ConfParamOps: Send + Sync {
    /// Returns every parameter of the tenant.
    async fn list(&self, tenant: &Tenant) -> AppResult<BTreeMap<String, Value>>;

    /// Returns the parameter value, if set.
    async fn get(&self, tenant: &Tenant, key: &str) -> AppResult<Option<Value>>;

    /// Sets the parameter, replacing any previous value.
    async fn set(&self, tenant: &Tenant, key: &str, value: Value) -> AppResult<()>;

    /// Removes the parameter; removing an absent key is not an error.
    async fn remove(&self, tenant: &Tenant, key: &str) -> AppResult<()>;
}

/// Reads a parameter as a typed value, falling back to the default when the
/// parameter is absent or does not decode as `T`.
pub async fn get_param<T: DeserializeOwned>(
    ops: &dyn ConfParamOps,
    tenant: &Tenant,
    key: &str,
    default: Option<T>,
) -> AppResult<Option<T>> {
    match ops.get(tenant, key).await? {
        None => Ok(default),
        Some(value) => match serde_json::from_value(value) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(decode_error) => {
                error!(%tenant, key, error = %decode_error, "unexpected value for conf param");
                Ok(default)
            }
        },
    }
}

/// Supplies the JSON document seeding a tenant's parameter store.
#[async_trait]
pub trait KeymasterContentProvider: Send + Sync {
    /// Returns the seed document for the tenant.
    async fn keymaster_content(&self, tenant: &Tenant) -> AppResult<String>;
}

/// A step run once per tenant at startup, in ascending [`Self::order`].
#[async_trait]
pub trait StartupLoader: Send + Sync {
    /// Position among the loaders.
    fn order(&self) -> u32;

    /// Runs the step. Failures must be contained: a loader logs and moves
    /// on instead of aborting the whole startup sequence.
    async fn load(&self, tenant: &Tenant);
}

/// Seeds a tenant's parameter store on first boot.
///
/// The store is probed first; any content at all means a previous boot (or
/// an operator) already seeded it and the step becomes a no-op. Every error
/// along the way is logged and swallowed.
pub struct KeymasterBootstrap {
    conf_params: Arc<dyn ConfParamOps>,
    content: Arc<dyn KeymasterContentProvider>,
}

impl KeymasterBootstrap {
    /// Creates the bootstrap step from the store and the seed source.
    #[must_use]
    pub fn new(
        conf_params: Arc<dyn ConfParamOps>,
        content: Arc<dyn KeymasterContentProvider>,
    ) -> Self {
        Self {
            conf_params,
            content,
        }
    }
}

#[async_trait]
impl StartupLoader for KeymasterBootstrap {
    fn order(&self) -> u32 {
        KEYMASTER_LOADER_ORDER
    }

    async fn load(&self, tenant: &Tenant) {
        let existing = match self.conf_params.list(tenant).await {
            Ok(existing) => existing,
            Err(probe_error) => {
                error!(%tenant, error = %probe_error, "could not probe conf params, assuming data is in place");
                return;
            }
        };
        if !existing.is_empty() {
            info!(%tenant, "conf params found, leaving as they are");
            return;
        }

        let content = match self.content.keymaster_content(tenant).await {
            Ok(content) => content,
            Err(content_error) => {
                error!(%tenant, error = %content_error, "could not fetch keymaster content");
                return;
            }
        };
        let document: Value = match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(parse_error) => {
                error!(%tenant, error = %parse_error, "invalid keymaster content");
                return;
            }
        };
        let Some(entries) = document.as_object() else {
            error!(%tenant, "keymaster content is not a JSON object");
            return;
        };

        info!(%tenant, "seeding conf params");
        for (key, value) in entries {
            if value.is_null() {
                continue;
            }
            if let Err(set_error) = self.conf_params.set(tenant, key, value.clone()).await {
                error!(%tenant, key, error = %set_error, "could not set conf param");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::sync::Mutex;
    use uuid::Uuid;

    use identra_core::{AppError, AppResult, Tenant};

    use super::{
        get_param, ConfParamOps, KeymasterBootstrap, KeymasterContentProvider, StartupLoader,
        KEYMASTER_LOADER_ORDER,
    };

    #[derive(Default)]
    struct FakeStore {
        entries: Mutex<BTreeMap<(String, String), Value>>,
        fail_list: bool,
    }

    #[async_trait]
    impl ConfParamOps for FakeStore {
        async fn list(&self, tenant: &Tenant) -> AppResult<BTreeMap<String, Value>> {
            if self.fail_list {
                return Err(AppError::Internal("store unavailable".to_owned()));
            }
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

    struct FakeContent(&'static str);

    #[async_trait]
    impl KeymasterContentProvider for FakeContent {
        async fn keymaster_content(&self, _tenant: &Tenant) -> AppResult<String> {
            Ok(self.0.to_owned())
        }
    }

    const CONTENT: &str = r#"{
        "password.cipher.algorithm": "SHA1",
        "jwt.lifetime.minutes": 120,
        "return.password.value": false,
        "authentication.attributes": ["username", "userId"],
        "unset.value": null
    }"#;

    #[tokio::test]
    async fn empty_store_is_seeded_from_content() {
        let store = Arc::new(FakeStore::default());
        let bootstrap = KeymasterBootstrap::new(store.clone(), Arc::new(FakeContent(CONTENT)));
        let tenant = Tenant::master();

        bootstrap.load(&tenant).await;

        assert_eq!(
            get_param::<String>(store.as_ref(), &tenant, "password.cipher.algorithm", None)
                .await
                .unwrap_or_else(|_| unreachable!())
                .as_deref(),
            Some("SHA1")
        );
        assert_eq!(
            get_param::<u64>(store.as_ref(), &tenant, "jwt.lifetime.minutes", None)
                .await
                .unwrap_or_else(|_| unreachable!()),
            Some(120)
        );
        assert_eq!(
            get_param::<bool>(store.as_ref(), &tenant, "return.password.value", None)
                .await
                .unwrap_or_else(|_| unreachable!()),
            Some(false)
        );
        assert_eq!(
            get_param::<Vec<String>>(store.as_ref(), &tenant, "authentication.attributes", None)
                .await
                .unwrap_or_else(|_| unreachable!()),
            Some(vec!["username".to_owned(), "userId".to_owned()])
        );
        // null entries are not seeded
        assert_eq!(store.get(&tenant, "unset.value").await.unwrap_or_else(|_| unreachable!()), None);
    }

    #[tokio::test]
    async fn non_empty_store_is_left_alone() {
        let store = Arc::new(FakeStore::default());
        let tenant = Tenant::master();
        store
            .set(&tenant, "password.cipher.algorithm", json!("BCRYPT"))
            .await
            .unwrap_or_else(|_| unreachable!());
        let bootstrap = KeymasterBootstrap::new(store.clone(), Arc::new(FakeContent(CONTENT)));

        bootstrap.load(&tenant).await;

        assert_eq!(
            store
                .get(&tenant, "password.cipher.algorithm")
                .await
                .unwrap_or_else(|_| unreachable!()),
            Some(json!("BCRYPT"))
        );
        assert_eq!(store.get(&tenant, "jwt.lifetime.minutes").await.unwrap_or_else(|_| unreachable!()), None);
    }

    #[tokio::test]
    async fn unreachable_store_aborts_without_seeding() {
        let store = Arc::new(FakeStore {
            fail_list: true,
            ..FakeStore::default()
        });
        let bootstrap = KeymasterBootstrap::new(store.clone(), Arc::new(FakeContent(CONTENT)));
        let tenant = Tenant::master();

        bootstrap.load(&tenant).await;

        assert!(store.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_content_is_swallowed() {
        let store = Arc::new(FakeStore::default());
        let bootstrap =
            KeymasterBootstrap::new(store.clone(), Arc::new(FakeContent("not json at all")));
        let tenant = Tenant::master();

        bootstrap.load(&tenant).await;

        assert!(store.entries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn set_get_remove_roundtrip_with_default_fallback() {
        let store = FakeStore::default();
        let tenant = Tenant::master();
        let key = Uuid::new_v4().to_string();

        assert_eq!(
            get_param(&store, &tenant, &key, Some("defaultValue".to_owned()))
                .await
                .unwrap_or_else(|_| unreachable!())
                .as_deref(),
            Some("defaultValue")
        );

        store.set(&tenant, &key, json!("testValue")).await.unwrap_or_else(|_| unreachable!());
        assert_eq!(
            get_param(&store, &tenant, &key, Some("defaultValue".to_owned()))
                .await
                .unwrap_or_else(|_| unreachable!())
                .as_deref(),
            Some("testValue")
        );

        store
            .set(&tenant, &key, json!(8.9))
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(
            get_param::<f64>(&store, &tenant, &key, None)
                .await
                .unwrap_or_else(|_| unreachable!()),
            Some(8.9)
        );

        store.remove(&tenant, &key).await.unwrap_or_else(|_| unreachable!());
        assert_eq!(
            get_param::<String>(&store, &tenant, &key, None)
                .await
                .unwrap_or_else(|_| unreachable!()),
            None
        );
    }

    #[tokio::test]
    async fn bootstrap_runs_at_its_assigned_order() {
        let bootstrap = KeymasterBootstrap::new(
            Arc::new(FakeStore::default()),
            Arc::new(FakeContent(CONTENT)),
        );
        assert_eq!(bootstrap.order(), KEYMASTER_LOADER_ORDER);
    }
}
