use identra_core::{AppResult, ErrorKind, ValidationReport};
use identra_domain::{OrgUnit, ORG_UNIT_FULLPATH, ORG_UNIT_NAME};

use super::{OrgUnitDefinition, ResourceBinderService};

impl ResourceBinderService {
    /// Builds the realm projection from its declarative counterpart.
    ///
    /// Returns `None` when the definition is structurally unusable; the
    /// violation still lands in the report.
    pub(super) async fn populate_org_unit(
        &self,
        org_unit_def: &OrgUnitDefinition,
        existing: Option<OrgUnit>,
        report: &mut ValidationReport,
    ) -> AppResult<Option<OrgUnit>> {
        let Some(object_class) = &org_unit_def.object_class else {
            report.push(ErrorKind::InvalidOrgUnit, "Null ObjectClass");
            return Ok(None);
        };
        let Some(conn_object_link) = &org_unit_def.conn_object_link else {
            report.push(ErrorKind::InvalidOrgUnit, "Null connObjectLink");
            return Ok(None);
        };

        let mut org_unit = OrgUnit {
            object_class: object_class.clone(),
            ignore_case_match: org_unit_def.ignore_case_match,
            conn_object_link: conn_object_link.clone(),
            // the cursor is runtime state, the definition never carries it
            sync_token: existing.and_then(|previous| previous.sync_token),
            conn_object_key_item: None,
            items: Vec::new(),
        };

        for item_def in &org_unit_def.items {
            if item_def.int_attr_name.trim().is_empty() {
                report.push(ErrorKind::RequiredValuesMissing, "intAttrName");
                continue;
            }
            if item_def.int_attr_name != ORG_UNIT_NAME
                && item_def.int_attr_name != ORG_UNIT_FULLPATH
            {
                report.push(
                    ErrorKind::InvalidMapping,
                    format!(
                        "Only '{ORG_UNIT_NAME}' and '{ORG_UNIT_FULLPATH}' are supported for Realms"
                    ),
                );
                continue;
            }

            let condition = item_def.mandatory_condition.as_deref().unwrap_or("false");
            if !self.expression_validator.is_expression_valid(condition) {
                report.push(
                    ErrorKind::InvalidValues,
                    item_def.mandatory_condition.clone().unwrap_or_default(),
                );
            }

            let item = self.build_item(item_def).await?;
            if item.conn_object_key {
                org_unit.conn_object_key_item = Some(item);
            } else {
                org_unit.items.push(item);
            }
        }

        Ok(Some(org_unit))
    }
}
