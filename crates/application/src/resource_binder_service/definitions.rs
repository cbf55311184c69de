use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use identra_domain::{MappingItem, TraceLevel};

/// Declarative definition of an external resource.
///
/// This is the transfer shape callers submit; the binder converges the
/// persisted aggregate onto it and projects it back on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceDefinition {
    /// Unique resource key.
    pub key: String,
    /// Connector instance key.
    pub connector: Option<String>,
    /// Human-friendly connector name; populated on read, ignored on write.
    pub connector_display_name: Option<String>,
    /// Whether mandatory conditions are enforced on propagation.
    pub enforce_mandatory_condition: bool,
    /// Whether a random password is generated when none is provided.
    pub random_pwd_if_not_provided: bool,
    /// Relative ordering among resources during propagation.
    pub propagation_priority: Option<i32>,
    /// Per-AnyType projections.
    pub provisions: Vec<ProvisionDefinition>,
    /// Realm projection.
    pub org_unit: Option<OrgUnitDefinition>,
    /// Trace detail for create operations.
    pub create_trace_level: TraceLevel,
    /// Trace detail for update operations.
    pub update_trace_level: TraceLevel,
    /// Trace detail for delete operations.
    pub delete_trace_level: TraceLevel,
    /// Trace detail for provisioning operations.
    pub provisioning_trace_level: TraceLevel,
    /// Password policy key.
    pub password_policy: Option<String>,
    /// Account policy key.
    pub account_policy: Option<String>,
    /// Propagation policy key.
    pub propagation_policy: Option<String>,
    /// Pull policy key.
    pub pull_policy: Option<String>,
    /// Push policy key.
    pub push_policy: Option<String>,
    /// Provision sorter implementation key.
    pub provision_sorter: Option<String>,
    /// Connector configuration overrides as opaque `key=value` strings.
    pub conf_override: Vec<String>,
    /// Whether `capabilities_override` replaces connector capabilities.
    pub override_capabilities: bool,
    /// Capability tags replacing the connector's when overriding.
    pub capabilities_override: BTreeSet<String>,
    /// Ordered propagation action implementation keys.
    pub propagation_actions: Vec<String>,
}

impl ResourceDefinition {
    /// Returns the declared provision for the given any type, if present.
    #[must_use]
    pub fn provision(&self, any_type: &str) -> Option<&ProvisionDefinition> {
        self.provisions
            .iter()
            .find(|provision| provision.any_type == any_type)
    }
}

/// Declarative per-AnyType projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvisionDefinition {
    /// The any type this provision projects.
    pub any_type: String,
    /// External object class; required for a valid provision.
    pub object_class: Option<String>,
    /// Auxiliary any type class keys.
    pub aux_classes: Vec<String>,
    /// Whether external matching ignores value case.
    pub ignore_case_match: bool,
    /// Plain schema receiving the generated uid on create.
    pub uid_on_create: Option<String>,
    /// Attribute mapping.
    pub mapping: Option<MappingDefinition>,
    /// Keys of virtual schemas bound to this provision.
    pub vir_schemas: Vec<String>,
    /// Opaque resumption cursor; populated on read, never written back.
    pub sync_token: Option<String>,
}

/// Declarative attribute mapping.
///
/// Unlike the persisted [`identra_domain::Mapping`], the connObjectKey item
/// travels inside `items`, flagged; [`Self::conn_object_key_item`] filters it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MappingDefinition {
    /// Expression computing the external object's DN / link.
    pub conn_object_link: Option<String>,
    /// Every declared item, the connObjectKey one included.
    pub items: Vec<MappingItem>,
    /// Read-side projections of bound virtual schemas; never written back.
    pub linking_items: Vec<MappingItem>,
}

impl MappingDefinition {
    /// Returns the item flagged as connObjectKey, if any.
    #[must_use]
    pub fn conn_object_key_item(&self) -> Option<&MappingItem> {
        self.items.iter().find(|item| item.conn_object_key)
    }
}

/// Declarative realm projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrgUnitDefinition {
    /// External object class; required for a valid org unit.
    pub object_class: Option<String>,
    /// Whether external matching ignores value case.
    pub ignore_case_match: bool,
    /// Expression computing the external object's DN / link; required.
    pub conn_object_link: Option<String>,
    /// Opaque resumption cursor; populated on read, never written back.
    pub sync_token: Option<String>,
    /// Every declared item, the connObjectKey one included.
    pub items: Vec<MappingItem>,
}

impl OrgUnitDefinition {
    /// Returns the item flagged as connObjectKey, if any.
    #[must_use]
    pub fn conn_object_key_item(&self) -> Option<&MappingItem> {
        self.items.iter().find(|item| item.conn_object_key)
    }
}
