//! Lookup and side-effect ports consumed by the resource binder.

use async_trait::async_trait;

use identra_core::AppResult;
use identra_domain::{
    AnyType, AnyTypeClass, AnyTypeKind, ConnInstance, Implementation, IntAttrName, PlainSchema,
    PolicyType, VirSchema,
};

/// Lookup port for identity classes.
#[async_trait]
pub trait AnyTypeRepository: Send + Sync {
    /// Returns the any type with the given key, if registered.
    async fn find(&self, key: &str) -> AppResult<Option<AnyType>>;
}

/// Lookup port for schema class bundles.
#[async_trait]
pub trait AnyTypeClassRepository: Send + Sync {
    /// Returns the any type class with the given key, if registered.
    async fn find(&self, key: &str) -> AppResult<Option<AnyTypeClass>>;
}

/// Lookup port for configured connector instances.
#[async_trait]
pub trait ConnInstanceRepository: Send + Sync {
    /// Returns the connector instance with the given key, if registered.
    async fn find(&self, key: &str) -> AppResult<Option<ConnInstance>>;
}

/// Lookup port for stored attribute schemas.
#[async_trait]
pub trait PlainSchemaRepository: Send + Sync {
    /// Returns the plain schema with the given key, if registered.
    async fn find(&self, key: &str) -> AppResult<Option<PlainSchema>>;
}

/// Lookup and reconciliation port for virtual schemas.
///
/// Virtual schemas hold the `(resource, any_type)` back-reference to the
/// provision they are bound to; the binder rebinds or deletes them here
/// instead of owning them in the aggregate.
#[async_trait]
pub trait VirSchemaRepository: Send + Sync {
    /// Returns the virtual schema with the given key, if registered.
    async fn find(&self, key: &str) -> AppResult<Option<VirSchema>>;

    /// Returns every virtual schema bound to the given provision.
    async fn find_by_provision(
        &self,
        resource_key: &str,
        any_type: &str,
    ) -> AppResult<Vec<VirSchema>>;

    /// Points the schema's back-reference at the given provision.
    async fn bind(&self, key: &str, resource_key: &str, any_type: &str) -> AppResult<()>;

    /// Deletes the schema outright.
    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// Lookup port for registered implementations.
#[async_trait]
pub trait ImplementationRepository: Send + Sync {
    /// Returns the implementation with the given key, if registered.
    async fn find(&self, key: &str) -> AppResult<Option<Implementation>>;
}

/// Lookup port for the five policy slots.
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Returns the key of the policy of the given type, if registered.
    async fn find(&self, policy_type: PolicyType, key: &str) -> AppResult<Option<String>>;
}

/// Propagation runtime hook.
#[async_trait]
pub trait PropagationTaskExecutor: Send + Sync {
    /// Drops the cached retry template for a resource.
    ///
    /// Must be safe to call when no retry template is outstanding.
    async fn expire_retry_template(&self, resource_key: &str) -> AppResult<()>;
}

/// Parses internal attribute references against an any type kind.
pub trait IntAttrNameParser: Send + Sync {
    /// Parses the reference; an error means the text is not parseable at all.
    fn parse(&self, int_attr_name: &str, kind: AnyTypeKind) -> AppResult<IntAttrName>;
}

/// Black-box validity check for mapping expressions.
pub trait ExpressionValidator: Send + Sync {
    /// Returns whether the expression text is well formed.
    fn is_expression_valid(&self, expression: &str) -> bool;
}
