use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Internal attribute names allowed for org-unit (realm) mapping items.
pub const ORG_UNIT_NAME: &str = "name";
/// See [`ORG_UNIT_NAME`].
pub const ORG_UNIT_FULLPATH: &str = "fullpath";

/// Whether a mapping rule applies in outbound propagation, inbound pull,
/// both directions, or neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingPurpose {
    /// Outbound only.
    #[default]
    Propagation,
    /// Inbound only.
    Pull,
    /// Both directions.
    Both,
    /// Mapping rule is defined but inactive.
    None,
}

impl MappingPurpose {
    /// Returns the stable wire name for this purpose.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Propagation => "PROPAGATION",
            Self::Pull => "PULL",
            Self::Both => "BOTH",
            Self::None => "NONE",
        }
    }
}

/// Amount of detail retained when tracing propagation operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceLevel {
    /// Nothing is traced.
    None,
    /// Only failures are traced.
    #[default]
    Failures,
    /// A summary line per operation.
    Summary,
    /// Full payloads.
    All,
}

/// The attribute-level binding from an internal attribute to an external one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingItem {
    /// Internal attribute reference, parseable against the owning any type.
    pub int_attr_name: String,
    /// Name of the attribute on the external object.
    pub ext_attr_name: Option<String>,
    /// Direction(s) in which this rule applies.
    pub purpose: MappingPurpose,
    /// Expression deciding whether a value is mandatory; absent means `false`.
    pub mandatory_condition: Option<String>,
    /// Whether this item identifies the external object.
    pub conn_object_key: bool,
    /// Whether this item carries the password attribute.
    pub password: bool,
    /// Optional expression applied on outbound values.
    pub propagation_jexl_transformer: Option<String>,
    /// Optional expression applied on inbound values.
    pub pull_jexl_transformer: Option<String>,
    /// Ordered transformer implementation keys.
    pub transformers: Vec<String>,
}

/// Attribute-level bindings owned by a [`Provision`].
///
/// Holds at most one connObjectKey item, kept apart from the plain items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    /// Expression computing the external object's DN / link.
    pub conn_object_link: Option<String>,
    /// The single item identifying the external object, if any.
    pub conn_object_key_item: Option<MappingItem>,
    /// All other items.
    pub items: Vec<MappingItem>,
}

impl Mapping {
    /// Drops every item, including the connObjectKey one.
    pub fn clear_items(&mut self) {
        self.conn_object_key_item = None;
        self.items.clear();
    }

    /// Returns every item, connObjectKey item first when present.
    pub fn all_items(&self) -> impl Iterator<Item = &MappingItem> {
        self.conn_object_key_item.iter().chain(self.items.iter())
    }
}

/// The per-AnyType projection of an [`ExternalResource`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provision {
    /// The any type this provision projects; unique within the resource.
    pub any_type: String,
    /// External object class; always set on a persisted provision.
    pub object_class: String,
    /// Auxiliary any type class keys extending the allowed schemas.
    pub aux_classes: BTreeSet<String>,
    /// Whether external matching ignores value case.
    pub ignore_case_match: bool,
    /// Plain schema receiving the generated uid on create, if any.
    pub uid_on_create: Option<String>,
    /// Attribute mapping, absent when the provision is declared empty.
    pub mapping: Option<Mapping>,
    /// Opaque resumption cursor owned by the connector layer.
    pub sync_token: Option<String>,
}

/// Analogue of [`Provision`] for organisational realms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    /// External object class.
    pub object_class: String,
    /// Whether external matching ignores value case.
    pub ignore_case_match: bool,
    /// Expression computing the external object's DN / link; required.
    pub conn_object_link: String,
    /// Opaque resumption cursor owned by the connector layer.
    pub sync_token: Option<String>,
    /// The single item identifying the external object, if any.
    pub conn_object_key_item: Option<MappingItem>,
    /// All other items.
    pub items: Vec<MappingItem>,
}

impl OrgUnit {
    /// Drops every item, including the connObjectKey one.
    pub fn clear_items(&mut self) {
        self.conn_object_key_item = None;
        self.items.clear();
    }

    /// Returns every item, connObjectKey item first when present.
    pub fn all_items(&self) -> impl Iterator<Item = &MappingItem> {
        self.conn_object_key_item.iter().chain(self.items.iter())
    }
}

/// An external directory/system a managed identity class is projected onto.
///
/// Aggregate root: provisions and the org unit are owned by value; virtual
/// schemas hold the `(resource, any_type)` back-reference instead of an
/// owning pointer and are reconciled through their repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalResource {
    /// Unique resource key.
    pub key: String,
    /// Connector instance key.
    pub connector: Option<String>,
    /// Whether mandatory conditions are enforced on propagation.
    pub enforce_mandatory_condition: bool,
    /// Whether a random password is generated when none is provided.
    pub random_pwd_if_not_provided: bool,
    /// Relative ordering among resources during propagation.
    pub propagation_priority: Option<i32>,
    /// Per-AnyType projections, unique by any type.
    pub provisions: Vec<Provision>,
    /// Realm projection, mutually independent from provisions.
    pub org_unit: Option<OrgUnit>,
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
    pub conf_override: BTreeSet<String>,
    /// Whether [`Self::capabilities_override`] replaces connector capabilities.
    pub override_capabilities: bool,
    /// Capability tags replacing the connector's when overriding.
    pub capabilities_override: BTreeSet<String>,
    /// Ordered propagation action implementation keys.
    pub propagation_actions: Vec<String>,
}

impl ExternalResource {
    /// Creates an empty resource; state is applied exclusively through the binder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the provision for the given any type, if present.
    #[must_use]
    pub fn provision(&self, any_type: &str) -> Option<&Provision> {
        self.provisions
            .iter()
            .find(|provision| provision.any_type == any_type)
    }

    /// Returns a mutable handle on the provision for the given any type.
    pub fn provision_mut(&mut self, any_type: &str) -> Option<&mut Provision> {
        self.provisions
            .iter_mut()
            .find(|provision| provision.any_type == any_type)
    }
}

#[cfg(test)]
mod tests {
    use super::{ExternalResource, Mapping, MappingItem, MappingPurpose, Provision, TraceLevel};

    #[test]
    fn purpose_serialises_as_wire_name() {
        let encoded = serde_json::to_string(&MappingPurpose::Propagation).unwrap_or_else(|_| unreachable!());
        assert_eq!(encoded, "\"PROPAGATION\"");
    }

    #[test]
    fn trace_level_defaults_to_failures() {
        assert_eq!(TraceLevel::default(), TraceLevel::Failures);
    }

    #[test]
    fn provision_lookup_is_by_any_type() {
        let mut resource = ExternalResource::new();
        resource.provisions.push(Provision {
            any_type: "USER".to_owned(),
            object_class: "__ACCOUNT__".to_owned(),
            ..Provision::default()
        });

        assert!(resource.provision("USER").is_some());
        assert!(resource.provision("GROUP").is_none());
    }

    #[test]
    fn all_items_yields_conn_object_key_item_first() {
        let mapping = Mapping {
            conn_object_key_item: Some(MappingItem {
                int_attr_name: "username".to_owned(),
                conn_object_key: true,
                ..MappingItem::default()
            }),
            items: vec![MappingItem {
                int_attr_name: "email".to_owned(),
                ..MappingItem::default()
            }],
            ..Mapping::default()
        };

        let names: Vec<&str> = mapping
            .all_items()
            .map(|item| item.int_attr_name.as_str())
            .collect();
        assert_eq!(names, ["username", "email"]);
    }
}
