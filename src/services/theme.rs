use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SemanticColors {
    #[serde(default)]
    pub body_text: Option<String>,

    #[serde(default)]
    pub link: Option<String>,

    #[serde(default)]
    pub link_hovered: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default)]
    pub semantic_colors: Option<SemanticColors>,
}

/// CSS custom properties to set on the web part's root element. A `null`
/// value tells the host to remove the property.
pub fn css_variables(theme: Option<&Theme>) -> Map<String, Value> {
    let mut vars = Map::new();

    let colors = match theme.and_then(|t| t.semantic_colors.as_ref()) {
        Some(c) => c,
        None => return vars,
    };

    let entries = [
        ("--bodyText", &colors.body_text),
        ("--link", &colors.link),
        ("--linkHovered", &colors.link_hovered),
    ];

    for (name, color) in entries {
        let value = match color.as_deref() {
            Some(c) if !c.is_empty() => Value::String(c.to_string()),
            _ => Value::Null,
        };
        vars.insert(name.to_string(), value);
    }

    vars
}
