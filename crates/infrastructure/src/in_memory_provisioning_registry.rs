use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use identra_application::{
    AnyTypeClassRepository, AnyTypeRepository, ConnInstanceRepository, ImplementationRepository,
    PlainSchemaRepository, PolicyRepository, VirSchemaRepository,
};
use identra_core::AppResult;
use identra_domain::{
    AnyType, AnyTypeClass, ConnInstance, Implementation, PlainSchema, PolicyType, VirSchema,
};

/// In-memory implementation of the resource binder's lookup ports, for dev
/// seeding and integration-style tests.
#[derive(Default)]
pub struct InMemoryProvisioningRegistry {
    any_types: Mutex<BTreeMap<String, AnyType>>,
    any_type_classes: Mutex<BTreeMap<String, AnyTypeClass>>,
    conn_instances: Mutex<BTreeMap<String, ConnInstance>>,
    plain_schemas: Mutex<BTreeMap<String, PlainSchema>>,
    vir_schemas: Mutex<BTreeMap<String, VirSchema>>,
    implementations: Mutex<BTreeMap<String, Implementation>>,
    policies: Mutex<BTreeMap<String, PolicyType>>,
}

impl InMemoryProvisioningRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an any type.
    pub async fn register_any_type(&self, any_type: AnyType) {
        self.any_types
            .lock()
            .await
            .insert(any_type.key.clone(), any_type);
    }

    /// Registers an any type class.
    pub async fn register_any_type_class(&self, class: AnyTypeClass) {
        self.any_type_classes
            .lock()
            .await
            .insert(class.key.clone(), class);
    }

    /// Registers a connector instance.
    pub async fn register_conn_instance(&self, conn_instance: ConnInstance) {
        self.conn_instances
            .lock()
            .await
            .insert(conn_instance.key.clone(), conn_instance);
    }

    /// Registers a plain schema.
    pub async fn register_plain_schema(&self, schema: PlainSchema) {
        self.plain_schemas
            .lock()
            .await
            .insert(schema.key.clone(), schema);
    }

    /// Registers a virtual schema.
    pub async fn register_vir_schema(&self, schema: VirSchema) {
        self.vir_schemas
            .lock()
            .await
            .insert(schema.key.clone(), schema);
    }

    /// Registers an implementation.
    pub async fn register_implementation(&self, implementation: Implementation) {
        self.implementations
            .lock()
            .await
            .insert(implementation.key.clone(), implementation);
    }

    /// Registers a policy key under its type.
    pub async fn register_policy(&self, policy_type: PolicyType, key: impl Into<String>) {
        self.policies.lock().await.insert(key.into(), policy_type);
    }
}

#[async_trait]
impl AnyTypeRepository for InMemoryProvisioningRegistry {
    async fn find(&self, key: &str) -> AppResult<Option<AnyType>> {
        Ok(self.any_types.lock().await.get(key).cloned())
    }
}

#[async_trait]
impl AnyTypeClassRepository for InMemoryProvisioningRegistry {
    async fn find(&self, key: &str) -> AppResult<Option<AnyTypeClass>> {
        Ok(self.any_type_classes.lock().await.get(key).cloned())
    }
}

#[async_trait]
impl ConnInstanceRepository for InMemoryProvisioningRegistry {
    async fn find(&self, key: &str) -> AppResult<Option<ConnInstance>> {
        Ok(self.conn_instances.lock().await.get(key).cloned())
    }
}

#[async_trait]
impl PlainSchemaRepository for InMemoryProvisioningRegistry {
    async fn find(&self, key: &str) -> AppResult<Option<PlainSchema>> {
        Ok(self.plain_schemas.lock().await.get(key).cloned())
    }
}

#[async_trait]
impl VirSchemaRepository for InMemoryProvisioningRegistry {
    async fn find(&self, key: &str) -> AppResult<Option<VirSchema>> {
        Ok(self.vir_schemas.lock().await.get(key).cloned())
    }

    async fn find_by_provision(
        &self,
        resource_key: &str,
        any_type: &str,
    ) -> AppResult<Vec<VirSchema>> {
        Ok(self
            .vir_schemas
            .lock()
            .await
            .values()
            .filter(|schema| {
                schema.resource.as_deref() == Some(resource_key)
                    && schema.any_type.as_deref() == Some(any_type)
            })
            .cloned()
            .collect())
    }

    async fn bind(&self, key: &str, resource_key: &str, any_type: &str) -> AppResult<()> {
        if let Some(schema) = self.vir_schemas.lock().await.get_mut(key) {
            schema.resource = Some(resource_key.to_owned());
            schema.any_type = Some(any_type.to_owned());
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.vir_schemas.lock().await.remove(key);
        Ok(())
    }
}

#[async_trait]
impl ImplementationRepository for InMemoryProvisioningRegistry {
    async fn find(&self, key: &str) -> AppResult<Option<Implementation>> {
        Ok(self.implementations.lock().await.get(key).cloned())
    }
}

#[async_trait]
impl PolicyRepository for InMemoryProvisioningRegistry {
    async fn find(&self, policy_type: PolicyType, key: &str) -> AppResult<Option<String>> {
        Ok(self
            .policies
            .lock()
            .await
            .get(key)
            .filter(|registered| **registered == policy_type)
            .map(|_| key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use identra_application::{PolicyRepository, VirSchemaRepository};
    use identra_domain::{PolicyType, VirSchema};

    use super::InMemoryProvisioningRegistry;

    #[tokio::test]
    async fn policy_lookup_is_typed() {
        let registry = InMemoryProvisioningRegistry::new();
        registry
            .register_policy(PolicyType::Password, "password-policy-1")
            .await;

        let found =
            PolicyRepository::find(&registry, PolicyType::Password, "password-policy-1")
                .await
                .unwrap_or_else(|_| unreachable!());
        assert_eq!(found.as_deref(), Some("password-policy-1"));

        let mismatched = PolicyRepository::find(&registry, PolicyType::Pull, "password-policy-1")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(mismatched, None);
    }

    #[tokio::test]
    async fn bind_points_a_schema_at_a_provision() {
        let registry = InMemoryProvisioningRegistry::new();
        registry
            .register_vir_schema(VirSchema {
                key: "virtualReadOnly".to_owned(),
                ext_attr_name: "READONLY".to_owned(),
                resource: None,
                any_type: None,
            })
            .await;

        registry
            .bind("virtualReadOnly", "resource-ldap", "USER")
            .await
            .unwrap_or_else(|_| unreachable!());

        let bound = registry
            .find_by_provision("resource-ldap", "USER")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].key, "virtualReadOnly");

        registry
            .delete("virtualReadOnly")
            .await
            .unwrap_or_else(|_| unreachable!());
        assert!(registry
            .find_by_provision("resource-ldap", "USER")
            .await
            .unwrap_or_else(|_| unreachable!())
            .is_empty());
    }
}
