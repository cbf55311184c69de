//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod resource;
mod schema;
mod user;

pub use audit::{AuditEntry, AuditResult, EventCategoryType, SortDirection};
pub use resource::{
    ExternalResource, Mapping, MappingItem, MappingPurpose, OrgUnit, Provision, TraceLevel,
    ORG_UNIT_FULLPATH, ORG_UNIT_NAME,
};
pub use schema::{
    AnyType, AnyTypeClass, AnyTypeKind, ConnInstance, Implementation, IntAttrName, PlainSchema,
    PolicyType, SchemaType, VirSchema,
};
pub use user::User;
