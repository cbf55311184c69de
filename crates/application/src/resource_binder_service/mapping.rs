use std::collections::BTreeSet;

use tracing::{debug, error};

use identra_core::{AppResult, ErrorKind, ValidationReport};
use identra_domain::{
    AnyType, AnyTypeKind, IntAttrName, Mapping, MappingItem, MappingPurpose, SchemaType,
};

use super::{MappingDefinition, ResourceBinderService};

/// Union of the schema keys reachable through an any type's classes plus
/// the provision's auxiliary classes.
#[derive(Debug, Default)]
pub(super) struct AllowedSchemas {
    pub(super) plain: BTreeSet<String>,
    pub(super) derived: BTreeSet<String>,
    pub(super) virtual_: BTreeSet<String>,
}

impl AllowedSchemas {
    fn contains(&self, schema_type: SchemaType, key: &str) -> bool {
        match schema_type {
            SchemaType::Plain => self.plain.contains(key),
            SchemaType::Derived => self.derived.contains(key),
            SchemaType::Virtual => self.virtual_.contains(key),
        }
    }
}

impl ResourceBinderService {
    pub(super) async fn allowed_schemas(
        &self,
        any_type: &AnyType,
        aux_classes: &BTreeSet<String>,
    ) -> AppResult<AllowedSchemas> {
        let mut allowed = AllowedSchemas::default();
        for class_key in any_type.classes.iter().chain(aux_classes.iter()) {
            if let Some(class) = self.any_type_classes.find(class_key).await? {
                allowed.plain.extend(class.plain_schemas);
                allowed.derived.extend(class.der_schemas);
                allowed.virtual_.extend(class.vir_schemas);
            }
        }

        Ok(allowed)
    }

    /// Builds the persisted mapping from its declarative counterpart,
    /// accumulating every item violation into the report.
    pub(super) async fn populate_mapping(
        &self,
        resource_key: &str,
        mapping_def: &MappingDefinition,
        any_type_kind: AnyTypeKind,
        allowed: &AllowedSchemas,
        report: &mut ValidationReport,
    ) -> AppResult<Mapping> {
        let mut mapping = Mapping {
            conn_object_link: mapping_def.conn_object_link.clone(),
            ..Mapping::default()
        };

        for item_def in &mapping_def.items {
            if item_def.int_attr_name.trim().is_empty() {
                report.push(ErrorKind::RequiredValuesMissing, "intAttrName");
                continue;
            }

            let parsed = match self
                .int_attr_name_parser
                .parse(&item_def.int_attr_name, any_type_kind)
            {
                Ok(parsed) => Some(parsed),
                Err(parse_error) => {
                    error!(
                        int_attr_name = %item_def.int_attr_name,
                        error = %parse_error,
                        "invalid intAttrName"
                    );
                    None
                }
            };
            let Some(int_attr_name) = parsed.filter(IntAttrName::is_resolved) else {
                error!(int_attr_name = %item_def.int_attr_name, "intAttrName not existing");
                report.push(
                    ErrorKind::InvalidMapping,
                    format!("'{}' not existing", item_def.int_attr_name),
                );
                continue;
            };

            // a plain schema reference without an enclosing traversal must
            // point inside the classes attached to this provision
            let allowed_here = match (&int_attr_name.schema_type, &int_attr_name.schema) {
                (Some(schema_type), Some(schema_key))
                    if int_attr_name.enclosing_group.is_none()
                        && int_attr_name.related_any_object.is_none()
                        && int_attr_name.relationship_type.is_none()
                        && int_attr_name.privileges_of_application.is_none() =>
                {
                    allowed.contains(*schema_type, schema_key)
                }
                _ => true,
            };
            if !allowed_here {
                error!(int_attr_name = %item_def.int_attr_name, "intAttrName not allowed");
                report.push(
                    ErrorKind::InvalidMapping,
                    format!("'{}' not allowed", item_def.int_attr_name),
                );
                continue;
            }

            // no mandatory condition implies mandatory condition false
            let condition = item_def.mandatory_condition.as_deref().unwrap_or("false");
            if !self.expression_validator.is_expression_valid(condition) {
                report.push(
                    ErrorKind::InvalidValues,
                    item_def.mandatory_condition.clone().unwrap_or_default(),
                );
            }

            let item = self.build_item(item_def).await?;

            if item.conn_object_key {
                if int_attr_name.schema_type == Some(SchemaType::Virtual) {
                    report.push(
                        ErrorKind::InvalidMapping,
                        "Virtual attributes cannot be set as ConnObjectKey",
                    );
                }
                if int_attr_name.field.as_deref() == Some("password") {
                    report.push(
                        ErrorKind::InvalidMapping,
                        "Password attributes cannot be set as ConnObjectKey",
                    );
                }

                mapping.conn_object_key_item = Some(item.clone());
            } else {
                mapping.items.push(item.clone());
            }

            self.check_purposes(resource_key, &int_attr_name, &item, report)
                .await?;
        }

        Ok(mapping)
    }

    /// Copies the declared item, resolving transformers and skipping the
    /// unknown ones.
    pub(super) async fn build_item(&self, item_def: &MappingItem) -> AppResult<MappingItem> {
        let mut item = MappingItem {
            int_attr_name: item_def.int_attr_name.clone(),
            ext_attr_name: item_def.ext_attr_name.clone(),
            purpose: item_def.purpose,
            mandatory_condition: item_def.mandatory_condition.clone(),
            conn_object_key: item_def.conn_object_key,
            password: item_def.password,
            propagation_jexl_transformer: item_def.propagation_jexl_transformer.clone(),
            pull_jexl_transformer: item_def.pull_jexl_transformer.clone(),
            transformers: Vec::new(),
        };

        for transformer_key in &item_def.transformers {
            match self.implementations.find(transformer_key).await? {
                Some(transformer) => item.transformers.push(transformer.key),
                None => {
                    debug!(implementation = %transformer_key, "invalid transformer specified, ignoring");
                }
            }
        }

        Ok(item)
    }

    async fn check_purposes(
        &self,
        resource_key: &str,
        int_attr_name: &IntAttrName,
        item: &MappingItem,
        report: &mut ValidationReport,
    ) -> AppResult<()> {
        let propagation_only = |target: &str| {
            format!(
                "Only {} allowed when referring to {target}",
                MappingPurpose::Propagation.as_str()
            )
        };

        if int_attr_name.enclosing_group.is_some() && item.purpose != MappingPurpose::Propagation {
            report.push(ErrorKind::InvalidMapping, propagation_only("groups"));
        }
        if int_attr_name.related_any_object.is_some()
            && item.purpose != MappingPurpose::Propagation
        {
            report.push(ErrorKind::InvalidMapping, propagation_only("any objects"));
        }
        if int_attr_name.privileges_of_application.is_some()
            && item.purpose != MappingPurpose::Propagation
        {
            report.push(ErrorKind::InvalidMapping, propagation_only("privileges"));
        }
        if int_attr_name.schema_type == Some(SchemaType::Derived)
            && item.purpose != MappingPurpose::Propagation
        {
            report.push(
                ErrorKind::InvalidMapping,
                format!(
                    "Only {} allowed for derived",
                    MappingPurpose::Propagation.as_str()
                ),
            );
        }
        if int_attr_name.schema_type == Some(SchemaType::Virtual) {
            if item.purpose != MappingPurpose::Propagation {
                report.push(
                    ErrorKind::InvalidMapping,
                    format!(
                        "Only {} allowed for virtual",
                        MappingPurpose::Propagation.as_str()
                    ),
                );
            }

            // a virtual schema already linked to this very resource needs
            // no mapping item of its own
            if let Some(schema) = self.vir_schemas.find(&item.int_attr_name).await?
                && schema.resource.as_deref() == Some(resource_key)
            {
                report.push(
                    ErrorKind::InvalidMapping,
                    "No need to map virtual schema on linking resource",
                );
            }
        }
        if int_attr_name.related_user.is_some() && item.purpose != MappingPurpose::Propagation {
            report.push(ErrorKind::InvalidMapping, propagation_only("users"));
        }
        if (int_attr_name.relationship_type.is_some()
            || int_attr_name.relationship_any_type.is_some())
            && item.purpose != MappingPurpose::Propagation
        {
            report.push(ErrorKind::InvalidMapping, propagation_only("relationships"));
        }

        Ok(())
    }
}
