use serde::{Deserialize, Serialize};

pub const GROUP_ID_PATH: &str = "selectedGroupId";
pub const SET_NAMES_PATH: &str = "selectedJciTkbBrowseMenus";

/// Properties the host persists for the browse menu web part.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebPartProperties {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub selected_group_id: String,

    #[serde(default, rename = "selectedJciTkbBrowseMenus")]
    pub selected_set_names: Vec<String>,
}

impl WebPartProperties {
    /// Applies a single property-pane edit. Returns true when the value changed.
    pub fn apply_field(&mut self, property_path: &str, new_value: &serde_json::Value) -> bool {
        match property_path {
            GROUP_ID_PATH => {
                let v = new_value.as_str().unwrap_or("").to_string();
                if v == self.selected_group_id {
                    return false;
                }
                self.selected_group_id = v;
                true
            }
            SET_NAMES_PATH => {
                let v: Vec<String> = new_value
                    .as_array()
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|s| s.as_str())
                            .map(|s| s.to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                if v == self.selected_set_names {
                    return false;
                }
                self.selected_set_names = v;
                true
            }
            "description" => {
                let v = new_value.as_str().unwrap_or("").to_string();
                if v == self.description {
                    return false;
                }
                self.description = v;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub key: String,
    pub text: String,
}

impl DropdownOption {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}
