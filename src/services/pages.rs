use std::collections::HashSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

pub const STYLESHEETS: [&str; 2] = [
    "https://cdn.jsdelivr.net/npm/bootstrap@5.0.2/dist/css/bootstrap.min.css",
    "https://maxcdn.bootstrapcdn.com/font-awesome/4.6.3/css/font-awesome.min.css",
];

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PagesProps {
    #[serde(default)]
    pub selected_view_id: String,

    #[serde(default)]
    pub feedback_page_url: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PagesRender {
    /// Stylesheets the host still has to inject.
    pub load_css: Vec<String>,
    pub props: PagesProps,
}

/// Tracks which CDN stylesheets were already handed to the host this session.
#[derive(Default)]
pub struct PagesBrowser {
    loaded: Mutex<HashSet<String>>,
}

impl PagesBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self, props: PagesProps) -> PagesRender {
        let mut loaded = match self.loaded.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let load_css = STYLESHEETS
            .iter()
            .filter(|url| loaded.insert(url.to_string()))
            .map(|url| url.to_string())
            .collect();

        PagesRender { load_css, props }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheets_are_requested_once() {
        let pages = PagesBrowser::new();
        let props = PagesProps {
            selected_view_id: "view-1".into(),
            feedback_page_url: "https://contoso.sharepoint.com/sites/kb/feedback".into(),
        };

        let first = pages.render(props.clone());
        assert_eq!(first.load_css, STYLESHEETS.to_vec());
        assert_eq!(first.props, props);

        let second = pages.render(props);
        assert!(second.load_css.is_empty());
    }
}
