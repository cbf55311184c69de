//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_indexer_service;
mod audit_ports;
mod credential_guard;
mod jwt_verifier_service;
mod keymaster_bootstrap_service;
mod provisioning_ports;
mod resource_binder_service;

pub use audit_indexer_service::{AuditIndexManager, AuditIndexerSink};
pub use audit_ports::{AuditEntryFilter, AuditEntryRepository, PageRequest, Pageable, SortClause};
pub use credential_guard::CredentialGuard;
pub use jwt_verifier_service::{
    JwsAlgorithm, JwsHeaders, JwsVerificationSignature, JwtVerifier, UserRepository,
};
pub use keymaster_bootstrap_service::{
    ConfParamOps, KeymasterBootstrap, KeymasterContentProvider, StartupLoader, get_param,
    KEYMASTER_LOADER_ORDER,
};
pub use provisioning_ports::{
    AnyTypeClassRepository, AnyTypeRepository, ConnInstanceRepository, ExpressionValidator,
    ImplementationRepository, IntAttrNameParser, PlainSchemaRepository, PolicyRepository,
    PropagationTaskExecutor, VirSchemaRepository,
};
pub use resource_binder_service::{
    MappingDefinition, OrgUnitDefinition, ProvisionDefinition, ResourceBinderService,
    ResourceDefinition,
};
