use std::str::FromStr;

use serde::{Deserialize, Serialize};

use identra_core::AppError;

use crate::resource::{MappingItem, MappingPurpose};

/// Taxonomy of identity-bearing entity classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnyTypeKind {
    /// Person-like identities.
    User,
    /// Membership containers.
    Group,
    /// Everything else (printers, services, ...).
    AnyObject,
}

impl AnyTypeKind {
    /// Returns the stable wire name for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Group => "GROUP",
            Self::AnyObject => "ANY_OBJECT",
        }
    }
}

impl FromStr for AnyTypeKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "USER" => Ok(Self::User),
            "GROUP" => Ok(Self::Group),
            "ANY_OBJECT" => Ok(Self::AnyObject),
            _ => Err(AppError::Validation(format!(
                "unknown any type kind '{value}'"
            ))),
        }
    }
}

/// An identity class (user, group, ...) with its attached schema classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnyType {
    /// Unique key.
    pub key: String,
    /// Kind discriminator.
    pub kind: AnyTypeKind,
    /// Keys of the any type classes every instance of this type carries.
    pub classes: Vec<String>,
}

/// A bundle of schemas shared by any types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnyTypeClass {
    /// Unique key.
    pub key: String,
    /// Plain schema keys in this class.
    pub plain_schemas: Vec<String>,
    /// Derived schema keys in this class.
    pub der_schemas: Vec<String>,
    /// Virtual schema keys in this class.
    pub vir_schemas: Vec<String>,
}

/// Schema flavours an internal attribute reference can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    /// Stored attribute.
    Plain,
    /// Expression-computed attribute.
    Derived,
    /// Attribute living on a linked external resource.
    Virtual,
}

/// A stored attribute schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainSchema {
    /// Unique key.
    pub key: String,
}

/// An attribute schema whose values live on a linked external resource.
///
/// Holds the `(resource, any_type)` back-reference; the owning side is the
/// resource aggregate, reached through a repository lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirSchema {
    /// Unique key.
    pub key: String,
    /// Name of the attribute on the external object.
    pub ext_attr_name: String,
    /// Key of the resource this schema is bound to, if any.
    pub resource: Option<String>,
    /// Any type of the provision this schema is bound to, if any.
    pub any_type: Option<String>,
}

impl VirSchema {
    /// Projects this schema as the read-side linking item of its provision.
    #[must_use]
    pub fn linking_item(&self) -> MappingItem {
        MappingItem {
            int_attr_name: self.key.clone(),
            ext_attr_name: Some(self.ext_attr_name.clone()),
            purpose: MappingPurpose::Propagation,
            ..MappingItem::default()
        }
    }
}

/// A registered implementation (transformer, action, sorter, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    /// Unique key.
    pub key: String,
}

/// A configured connector instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnInstance {
    /// Unique key.
    pub key: String,
    /// Human-friendly name shown in read projections.
    pub display_name: Option<String>,
}

/// The five independent policy slots a resource can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyType {
    /// Password generation/validation rules.
    Password,
    /// Account lockout/suspension rules.
    Account,
    /// Outbound retry behaviour.
    Propagation,
    /// Inbound conflict resolution.
    Pull,
    /// Outbound reconciliation behaviour.
    Push,
}

/// Parsed form of an internal attribute reference.
///
/// A reference either points at a fixed field, at a schema of some type, or
/// traverses a related entity (group, any object, user, relationship) or the
/// privileges of an application. At most one traversal is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntAttrName {
    /// Schema flavour, when the reference resolves to a schema.
    pub schema_type: Option<SchemaType>,
    /// Resolved schema key.
    pub schema: Option<String>,
    /// Fixed field name (`username`, `key`, `password`, ...).
    pub field: Option<String>,
    /// Group the reference traverses into.
    pub enclosing_group: Option<String>,
    /// Any object the reference traverses into.
    pub related_any_object: Option<String>,
    /// User the reference traverses into.
    pub related_user: Option<String>,
    /// Relationship type the reference traverses.
    pub relationship_type: Option<String>,
    /// Any type on the far side of the traversed relationship.
    pub relationship_any_type: Option<String>,
    /// Application whose privileges the reference projects.
    pub privileges_of_application: Option<String>,
}

impl IntAttrName {
    /// Shorthand for a reference to a fixed field.
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            field: Some(name.into()),
            ..Self::default()
        }
    }

    /// Shorthand for a reference to a schema of the given type.
    #[must_use]
    pub fn schema(schema_type: SchemaType, key: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type),
            schema: Some(key.into()),
            ..Self::default()
        }
    }

    /// Whether the reference resolved to anything at all.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.schema_type.is_some()
            || self.field.is_some()
            || self.privileges_of_application.is_some()
    }
}
