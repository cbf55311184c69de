use std::collections::BTreeSet;

use tracing::{debug, warn};

use identra_core::{AppResult, ErrorKind, ValidationReport};
use identra_domain::{ExternalResource, PolicyType, Provision};

use super::{ResourceBinderService, ResourceDefinition};

impl ResourceBinderService {
    /// Converges the persisted resource onto the declarative definition.
    ///
    /// Anything present in the definition is added or overwritten, anything
    /// absent is removed. Unknown auxiliary references are skipped with a
    /// log line; every structural violation is accumulated and returned as
    /// one composite error once the whole pass is done.
    pub async fn update(
        &self,
        resource: &mut ExternalResource,
        definition: &ResourceDefinition,
    ) -> AppResult<()> {
        let mut report = ValidationReport::new();

        resource.key = definition.key.clone();

        if let Some(connector_key) = &definition.connector {
            match self.conn_instances.find(connector_key).await? {
                Some(connector) => resource.connector = Some(connector.key),
                None => {
                    debug!(connector = %connector_key, "invalid connector instance specified, ignoring");
                }
            }
        }

        resource.enforce_mandatory_condition = definition.enforce_mandatory_condition;
        resource.propagation_priority = definition.propagation_priority;
        resource.random_pwd_if_not_provided = definition.random_pwd_if_not_provided;

        // 1. add or update all (valid) provisions from the definition
        for provision_def in &definition.provisions {
            self.upsert_provision(resource, definition, provision_def, &mut report)
                .await?;
        }

        // 2. remove all provisions not contained in the definition, along
        // with the virtual schemas bound to them
        let removed: Vec<String> = resource
            .provisions
            .iter()
            .filter(|provision| definition.provision(&provision.any_type).is_none())
            .map(|provision| provision.any_type.clone())
            .collect();
        for any_type in &removed {
            for schema in self
                .vir_schemas
                .find_by_provision(&resource.key, any_type)
                .await?
            {
                self.vir_schemas.delete(&schema.key).await?;
            }
        }
        resource
            .provisions
            .retain(|provision| definition.provision(&provision.any_type).is_some());

        // 3. org unit
        match &definition.org_unit {
            None => resource.org_unit = None,
            Some(org_unit_def) => {
                let existing = resource.org_unit.take();
                resource.org_unit = self
                    .populate_org_unit(org_unit_def, existing, &mut report)
                    .await?;
            }
        }

        // 4. trace levels and policy references
        resource.create_trace_level = definition.create_trace_level;
        resource.update_trace_level = definition.update_trace_level;
        resource.delete_trace_level = definition.delete_trace_level;
        resource.provisioning_trace_level = definition.provisioning_trace_level;

        resource.password_policy = self
            .resolve_policy(PolicyType::Password, definition.password_policy.as_deref())
            .await?;
        resource.account_policy = self
            .resolve_policy(PolicyType::Account, definition.account_policy.as_deref())
            .await?;

        if let Some(current) = &resource.propagation_policy
            && definition.propagation_policy.as_deref() != Some(current.as_str())
        {
            self.propagation_executor
                .expire_retry_template(&resource.key)
                .await?;
        }
        resource.propagation_policy = self
            .resolve_policy(
                PolicyType::Propagation,
                definition.propagation_policy.as_deref(),
            )
            .await?;

        resource.pull_policy = self
            .resolve_policy(PolicyType::Pull, definition.pull_policy.as_deref())
            .await?;
        resource.push_policy = self
            .resolve_policy(PolicyType::Push, definition.push_policy.as_deref())
            .await?;

        // 5. provision sorter, conf overrides, capabilities, actions
        match &definition.provision_sorter {
            None => resource.provision_sorter = None,
            Some(sorter_key) => match self.implementations.find(sorter_key).await? {
                Some(implementation) => resource.provision_sorter = Some(implementation.key),
                None => {
                    debug!(implementation = %sorter_key, "invalid provision sorter specified, ignoring");
                }
            },
        }

        resource.conf_override = definition.conf_override.iter().cloned().collect();

        resource.override_capabilities = definition.override_capabilities;
        resource.capabilities_override = definition.capabilities_override.clone();

        for action_key in &definition.propagation_actions {
            match self.implementations.find(action_key).await? {
                Some(implementation) => {
                    if !resource.propagation_actions.contains(&implementation.key) {
                        resource.propagation_actions.push(implementation.key);
                    }
                }
                None => {
                    debug!(implementation = %action_key, "invalid propagation action specified, ignoring");
                }
            }
        }
        resource
            .propagation_actions
            .retain(|action| definition.propagation_actions.contains(action));

        report.into_result()
    }

    async fn resolve_policy(
        &self,
        policy_type: PolicyType,
        key: Option<&str>,
    ) -> AppResult<Option<String>> {
        match key {
            None => Ok(None),
            Some(key) => self.policies.find(policy_type, key).await,
        }
    }

    async fn upsert_provision(
        &self,
        resource: &mut ExternalResource,
        definition: &ResourceDefinition,
        provision_def: &super::ProvisionDefinition,
        report: &mut ValidationReport,
    ) -> AppResult<()> {
        let Some(any_type) = self.any_types.find(&provision_def.any_type).await? else {
            debug!(any_type = %provision_def.any_type, "invalid any type specified, ignoring");
            return Ok(());
        };

        if resource.provision(&any_type.key).is_none() {
            resource.provisions.push(Provision {
                any_type: any_type.key.clone(),
                ..Provision::default()
            });
        }

        let Some(object_class) = &provision_def.object_class else {
            report.push(ErrorKind::InvalidProvision, "Null ObjectClass");
            return Ok(());
        };

        // reconcile auxiliary classes: add all resolvable classes from the
        // definition, then drop whatever the definition no longer lists
        let mut aux_classes: BTreeSet<String> = resource
            .provision(&any_type.key)
            .map(|provision| provision.aux_classes.clone())
            .unwrap_or_default();
        for class_key in &provision_def.aux_classes {
            match self.any_type_classes.find(class_key).await? {
                Some(class) => {
                    aux_classes.insert(class.key);
                }
                None => warn!(any_type_class = %class_key, "ignoring invalid any type class"),
            }
        }
        aux_classes.retain(|class| provision_def.aux_classes.contains(class));

        let uid_on_create = match provision_def
            .uid_on_create
            .as_deref()
            .filter(|key| !key.trim().is_empty())
        {
            None => None,
            Some(schema_key) => match self.plain_schemas.find(schema_key).await? {
                Some(schema) => Some(schema.key),
                None => {
                    warn!(schema = %schema_key, "ignoring invalid schema for uidOnCreate");
                    None
                }
            },
        };

        let mapping = match &provision_def.mapping {
            None => None,
            Some(mapping_def) => {
                let allowed = self.allowed_schemas(&any_type, &aux_classes).await?;
                Some(
                    self.populate_mapping(
                        &definition.key,
                        mapping_def,
                        any_type.kind,
                        &allowed,
                        report,
                    )
                    .await?,
                )
            }
        };

        if let Some(provision) = resource.provision_mut(&any_type.key) {
            provision.object_class = object_class.clone();
            provision.aux_classes = aux_classes;
            provision.ignore_case_match = provision_def.ignore_case_match;
            provision.uid_on_create = uid_on_create;
            provision.mapping = mapping;
        }

        // reconcile virtual schemas: detach them all when the definition
        // lists none, rebind the named ones otherwise
        if provision_def.vir_schemas.is_empty() {
            for schema in self
                .vir_schemas
                .find_by_provision(&resource.key, &any_type.key)
                .await?
            {
                self.vir_schemas.delete(&schema.key).await?;
            }
        } else {
            for schema_key in &provision_def.vir_schemas {
                match self.vir_schemas.find(schema_key).await? {
                    Some(schema) => {
                        self.vir_schemas
                            .bind(&schema.key, &resource.key, &any_type.key)
                            .await?;
                    }
                    None => {
                        debug!(vir_schema = %schema_key, "invalid virtual schema specified, ignoring");
                    }
                }
            }
        }

        Ok(())
    }
}
