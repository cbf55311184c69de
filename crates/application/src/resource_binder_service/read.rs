use identra_core::AppResult;
use identra_domain::{ExternalResource, VirSchema};

use super::{
    MappingDefinition, OrgUnitDefinition, ProvisionDefinition, ResourceBinderService,
    ResourceDefinition,
};

impl ResourceBinderService {
    /// Projects the persisted resource back into its declarative shape.
    ///
    /// Inverse of `update` up to the silently skipped references: the
    /// connObjectKey item rejoins the item list (first), and the virtual
    /// schemas bound to each provision come back as keys plus read-only
    /// linking items.
    pub async fn to_definition(
        &self,
        resource: &ExternalResource,
    ) -> AppResult<ResourceDefinition> {
        let mut definition = ResourceDefinition {
            key: resource.key.clone(),
            connector: resource.connector.clone(),
            enforce_mandatory_condition: resource.enforce_mandatory_condition,
            random_pwd_if_not_provided: resource.random_pwd_if_not_provided,
            propagation_priority: resource.propagation_priority,
            create_trace_level: resource.create_trace_level,
            update_trace_level: resource.update_trace_level,
            delete_trace_level: resource.delete_trace_level,
            provisioning_trace_level: resource.provisioning_trace_level,
            password_policy: resource.password_policy.clone(),
            account_policy: resource.account_policy.clone(),
            propagation_policy: resource.propagation_policy.clone(),
            pull_policy: resource.pull_policy.clone(),
            push_policy: resource.push_policy.clone(),
            provision_sorter: resource.provision_sorter.clone(),
            conf_override: resource.conf_override.iter().cloned().collect(),
            override_capabilities: resource.override_capabilities,
            capabilities_override: resource.capabilities_override.clone(),
            propagation_actions: resource.propagation_actions.clone(),
            ..ResourceDefinition::default()
        };

        if let Some(connector_key) = &resource.connector
            && let Some(connector) = self.conn_instances.find(connector_key).await?
        {
            definition.connector_display_name = connector.display_name;
        }

        for provision in &resource.provisions {
            let mut provision_def = ProvisionDefinition {
                any_type: provision.any_type.clone(),
                object_class: Some(provision.object_class.clone()),
                aux_classes: provision.aux_classes.iter().cloned().collect(),
                ignore_case_match: provision.ignore_case_match,
                uid_on_create: provision.uid_on_create.clone(),
                sync_token: provision.sync_token.clone(),
                ..ProvisionDefinition::default()
            };

            let bound_schemas = self
                .vir_schemas
                .find_by_provision(&resource.key, &provision.any_type)
                .await?;
            provision_def.vir_schemas = bound_schemas
                .iter()
                .map(|schema| schema.key.clone())
                .collect();

            if let Some(mapping) = &provision.mapping {
                provision_def.mapping = Some(MappingDefinition {
                    conn_object_link: mapping.conn_object_link.clone(),
                    items: mapping.all_items().cloned().collect(),
                    linking_items: bound_schemas
                        .iter()
                        .map(VirSchema::linking_item)
                        .collect(),
                });
            }

            definition.provisions.push(provision_def);
        }

        if let Some(org_unit) = &resource.org_unit {
            definition.org_unit = Some(OrgUnitDefinition {
                object_class: Some(org_unit.object_class.clone()),
                ignore_case_match: org_unit.ignore_case_match,
                conn_object_link: Some(org_unit.conn_object_link.clone()),
                sync_token: org_unit.sync_token.clone(),
                items: org_unit.all_items().cloned().collect(),
            });
        }

        Ok(definition)
    }
}
