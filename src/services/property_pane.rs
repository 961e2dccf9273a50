use std::sync::{Arc, RwLock};

use serde_json::{json, Value};

use crate::model::properties::{DropdownOption, WebPartProperties, GROUP_ID_PATH, SET_NAMES_PATH};
use crate::services::taxonomy::TaxonomyService;

const PANE_DESCRIPTION: &str = "Configure your side navigation";
const BASIC_GROUP_NAME: &str = "Basic";
const SELECT_SET_TEXT: &str = "Select Set";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOptions {
    pub group_id: String,
    pub options: Vec<DropdownOption>,
}

/// Options shown in the property pane at one point in time. Never mutated;
/// every reload produces a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaneSnapshot {
    pub group_options: Vec<DropdownOption>,
    pub set_options: Option<SetOptions>,
}

#[derive(Default)]
pub struct PropertyPaneResolver {
    current: RwLock<Arc<PaneSnapshot>>,
}

impl PropertyPaneResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<PaneSnapshot> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace(&self, next: PaneSnapshot) {
        let next = Arc::new(next);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    pub async fn initialize(&self, service: &dyn TaxonomyService) {
        let group_options = load_group_options(service).await;
        let mut next = (*self.snapshot()).clone();
        next.group_options = group_options;
        self.replace(next);
    }

    /// Loads whatever the pane is missing for the current selection.
    pub async fn configuration_start(&self, service: &dyn TaxonomyService, selected_group_id: &str) {
        let current = self.snapshot();
        let mut next = (*current).clone();
        let mut changed = false;

        if current.group_options.is_empty() {
            next.group_options = load_group_options(service).await;
            changed = true;
        }

        let stale_sets = match &current.set_options {
            Some(sets) => sets.group_id != selected_group_id,
            None => true,
        };
        if !selected_group_id.is_empty() && stale_sets {
            next.set_options = Some(load_set_options(service, selected_group_id).await);
            changed = true;
        }

        if changed {
            self.replace(next);
        }
    }

    /// Reacts to a pane edit. Only a non-empty group selection triggers a reload.
    pub async fn field_changed(&self, service: &dyn TaxonomyService, property_path: &str, new_value: &Value) {
        if property_path != GROUP_ID_PATH {
            return;
        }
        let group_id = match new_value.as_str() {
            Some(v) if !v.is_empty() => v,
            _ => return,
        };

        let set_options = load_set_options(service, group_id).await;
        let mut next = (*self.snapshot()).clone();
        next.set_options = Some(set_options);
        self.replace(next);
    }

    /// Pane description in the shape the host's property pane consumes.
    pub fn configuration(&self, props: &WebPartProperties) -> Value {
        let snapshot = self.snapshot();
        let set_options = snapshot
            .set_options
            .as_ref()
            .map(|s| s.options.clone())
            .unwrap_or_default();

        json!({
            "pages": [{
                "header": { "description": PANE_DESCRIPTION },
                "groups": [{
                    "groupName": BASIC_GROUP_NAME,
                    "groupFields": [
                        {
                            "type": "dropdown",
                            "targetProperty": GROUP_ID_PATH,
                            "label": "Select Term Store Group",
                            "options": snapshot.group_options,
                            "selectedKey": props.selected_group_id,
                        },
                        {
                            "type": "multiSelect",
                            "targetProperty": SET_NAMES_PATH,
                            "key": SET_NAMES_PATH,
                            "label": "Select Term Sets",
                            "options": set_options,
                            "selectedKeys": props.selected_set_names,
                        }
                    ]
                }]
            }]
        })
    }
}

async fn load_group_options(service: &dyn TaxonomyService) -> Vec<DropdownOption> {
    match service.list_groups().await {
        Ok(groups) => groups
            .into_iter()
            .map(|g| DropdownOption::new(g.id, g.name))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load term store groups");
            Vec::new()
        }
    }
}

async fn load_set_options(service: &dyn TaxonomyService, group_id: &str) -> SetOptions {
    let mut options = vec![DropdownOption::new("", SELECT_SET_TEXT)];

    match service.list_group_sets(group_id).await {
        Ok(sets) => options.extend(sets.iter().map(|s| {
            let name = s.display_name();
            DropdownOption::new(name.clone(), name)
        })),
        Err(e) => tracing::warn!(group_id, error = %e, "failed to load term sets"),
    }

    SetOptions {
        group_id: group_id.to_string(),
        options,
    }
}
