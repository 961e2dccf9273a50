use std::time::Duration;

use crate::error::{Result, TaxonomyError};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    pub site_url: Option<String>,
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_url: None,
            access_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Reads `TKB_*` variables, after loading a `.env` file if one exists.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let timeout_secs = std::env::var("TKB_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            site_url: non_empty(std::env::var("TKB_SITE_URL").ok()),
            access_token: non_empty(std::env::var("TKB_ACCESS_TOKEN").ok()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Overrides from the host's `init` payload win over the environment.
    pub fn merge_init(&mut self, site_url: Option<&str>, access_token: Option<&str>) {
        if let Some(url) = non_empty(site_url.map(str::to_string)) {
            self.site_url = Some(url);
        }
        if let Some(token) = non_empty(access_token.map(str::to_string)) {
            self.access_token = Some(token);
        }
    }

    pub fn require_site_url(&self) -> Result<String> {
        self.site_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .ok_or_else(|| TaxonomyError::Config("site url is not configured".into()))
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
