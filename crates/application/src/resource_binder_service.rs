//! Bidirectional translation between declarative resource definitions and
//! the persisted [`ExternalResource`] aggregate.

use std::sync::Arc;

use identra_core::AppResult;
use identra_domain::ExternalResource;

use crate::provisioning_ports::{
    AnyTypeClassRepository, AnyTypeRepository, ConnInstanceRepository, ExpressionValidator,
    ImplementationRepository, IntAttrNameParser, PlainSchemaRepository, PolicyRepository,
    PropagationTaskExecutor, VirSchemaRepository,
};

mod definitions;
mod mapping;
mod org_unit;
mod read;
mod update;


pub use definitions::{
    MappingDefinition, OrgUnitDefinition, ProvisionDefinition, ResourceDefinition,
};

/// Application service converging persisted resources onto their
/// declarative definitions, and projecting them back.
///
/// Structural violations found during an update are accumulated and
/// returned as one composite error at the end of the pass; unknown
/// auxiliary references (classes, schemas, implementations) are logged
/// and skipped instead.
#[derive(Clone)]
pub struct ResourceBinderService {
    any_types: Arc<dyn AnyTypeRepository>,
    any_type_classes: Arc<dyn AnyTypeClassRepository>,
    conn_instances: Arc<dyn ConnInstanceRepository>,
    plain_schemas: Arc<dyn PlainSchemaRepository>,
    vir_schemas: Arc<dyn VirSchemaRepository>,
    implementations: Arc<dyn ImplementationRepository>,
    policies: Arc<dyn PolicyRepository>,
    propagation_executor: Arc<dyn PropagationTaskExecutor>,
    int_attr_name_parser: Arc<dyn IntAttrNameParser>,
    expression_validator: Arc<dyn ExpressionValidator>,
}

impl ResourceBinderService {
    /// Creates a new binder from its lookup and side-effect ports.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        any_types: Arc<dyn AnyTypeRepository>,
        any_type_classes: Arc<dyn AnyTypeClassRepository>,
        conn_instances: Arc<dyn ConnInstanceRepository>,
        plain_schemas: Arc<dyn PlainSchemaRepository>,
        vir_schemas: Arc<dyn VirSchemaRepository>,
        implementations: Arc<dyn ImplementationRepository>,
        policies: Arc<dyn PolicyRepository>,
        propagation_executor: Arc<dyn PropagationTaskExecutor>,
        int_attr_name_parser: Arc<dyn IntAttrNameParser>,
        expression_validator: Arc<dyn ExpressionValidator>,
    ) -> Self {
        Self {
            any_types,
            any_type_classes,
            conn_instances,
            plain_schemas,
            vir_schemas,
            implementations,
            policies,
            propagation_executor,
            int_attr_name_parser,
            expression_validator,
        }
    }

    /// Creates a new resource converged onto the given definition.
    pub async fn create(&self, definition: &ResourceDefinition) -> AppResult<ExternalResource> {
        let mut resource = ExternalResource::new();
        self.update(&mut resource, definition).await?;
        Ok(resource)
    }
}
