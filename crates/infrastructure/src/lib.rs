//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_audit_indexer;
mod in_memory_conf_param_store;
mod in_memory_provisioning_registry;
mod postgres_audit_entry_repository;
mod postgres_user_repository;

pub use http_audit_indexer::HttpAuditIndexer;
pub use in_memory_conf_param_store::InMemoryConfParamStore;
pub use in_memory_provisioning_registry::InMemoryProvisioningRegistry;
pub use postgres_audit_entry_repository::PostgresAuditEntryRepository;
pub use postgres_user_repository::PostgresUserRepository;
