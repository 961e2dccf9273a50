//! Term store REST access.
//!
//! `TaxonomyService` is the seam the tree builder and the property pane talk
//! to; `HttpTaxonomyClient` is the production implementation over the
//! SharePoint `_api/v2.1` term store endpoints.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::Settings;
use crate::error::{Result, TaxonomyError};

const BODY_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TermGroup {
    pub id: String,

    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct LocalizedName {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "languageTag")]
    pub language_tag: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TermSetRecord {
    pub id: String,

    #[serde(default, rename = "localizedNames")]
    pub localized_names: Vec<LocalizedName>,
}

impl TermSetRecord {
    pub fn display_name(&self) -> String {
        first_name(&self.localized_names)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TermRecord {
    pub id: String,

    #[serde(default, rename = "childrenCount")]
    pub children_count: u32,

    #[serde(default)]
    pub labels: Vec<LocalizedName>,
}

impl TermRecord {
    pub fn display_name(&self) -> String {
        first_name(&self.labels)
    }
}

fn first_name(names: &[LocalizedName]) -> String {
    names.first().map(|n| n.name.clone()).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ODataList<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[async_trait]
pub trait TaxonomyService: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<TermGroup>>;

    async fn list_group_sets(&self, group_id: &str) -> Result<Vec<TermSetRecord>>;

    /// Sets in the group whose localized name equals `name` (server-side filter).
    async fn find_sets_by_name(&self, group_id: &str, name: &str) -> Result<Vec<TermSetRecord>>;

    /// Top-level terms of a set when `parent_term_id` is `None`, otherwise the
    /// immediate children of that term.
    async fn list_terms(&self, set_id: &str, parent_term_id: Option<&str>)
        -> Result<Vec<TermRecord>>;
}

pub struct HttpTaxonomyClient {
    http: Client,
    site_url: String,
    access_token: Option<String>,
}

impl HttpTaxonomyClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let site_url = settings.require_site_url()?;
        let http = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            http,
            site_url,
            access_token: settings.access_token.clone(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        tracing::debug!(%url, "term store request");

        let mut req = self.http.get(&url).header(ACCEPT, "application/json");
        if let Some(token) = &self.access_token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status();

        // Read as text first so a bad payload can still be reported.
        let text = response.text().await?;

        if !status.is_success() {
            return Err(TaxonomyError::Status {
                status,
                url,
                body: text.trim().chars().take(BODY_SNIPPET_CHARS).collect(),
            });
        }

        serde_json::from_str(&text).map_err(|source| TaxonomyError::Decode { url, source })
    }
}

#[async_trait]
impl TaxonomyService for HttpTaxonomyClient {
    async fn list_groups(&self) -> Result<Vec<TermGroup>> {
        let list: ODataList<TermGroup> = self.get(groups_url(&self.site_url)).await?;
        Ok(list.value)
    }

    async fn list_group_sets(&self, group_id: &str) -> Result<Vec<TermSetRecord>> {
        let url = group_sets_url(&self.site_url, group_id)?;
        let list: ODataList<TermSetRecord> = self.get(url).await?;
        Ok(list.value)
    }

    async fn find_sets_by_name(&self, group_id: &str, name: &str) -> Result<Vec<TermSetRecord>> {
        let url = sets_by_name_url(&self.site_url, group_id, name)?;
        let list: ODataList<TermSetRecord> = self.get(url).await?;
        Ok(list.value)
    }

    async fn list_terms(
        &self,
        set_id: &str,
        parent_term_id: Option<&str>,
    ) -> Result<Vec<TermRecord>> {
        let url = terms_url(&self.site_url, set_id, parent_term_id)?;
        let list: ODataList<TermRecord> = self.get(url).await?;
        Ok(list.value)
    }
}

fn id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9A-Za-z][0-9A-Za-z\-]{0,63}$").expect("valid id pattern"))
}

/// Ids end up inside URL paths and OData key literals, so only plain
/// GUID-like tokens are accepted.
pub fn validate_id(id: &str) -> Result<&str> {
    if id_pattern().is_match(id) {
        Ok(id)
    } else {
        Err(TaxonomyError::InvalidId(id.to_string()))
    }
}

/// Quotes a value as an OData string literal body and percent-encodes it.
pub fn odata_literal(value: &str) -> String {
    urlencoding::encode(&value.replace('\'', "''")).into_owned()
}

pub fn groups_url(site_url: &str) -> String {
    format!("{site_url}/_api/v2.1/termstore/groups")
}

pub fn group_sets_url(site_url: &str, group_id: &str) -> Result<String> {
    let group_id = validate_id(group_id)?;
    Ok(format!("{site_url}/_api/v2.1/termstore/groups/{group_id}/sets"))
}

pub fn sets_by_name_url(site_url: &str, group_id: &str, name: &str) -> Result<String> {
    let group_id = validate_id(group_id)?;
    Ok(format!(
        "{site_url}/_api/v2.1/termStore/termgroups('{group_id}')/termsets?$filter=localizedNames/any(n:n/name eq '{}')&$select=id,localizedNames",
        odata_literal(name)
    ))
}

pub fn terms_url(site_url: &str, set_id: &str, parent_term_id: Option<&str>) -> Result<String> {
    let set_id = validate_id(set_id)?;
    match parent_term_id {
        Some(term_id) => {
            let term_id = validate_id(term_id)?;
            Ok(format!(
                "{site_url}/_api/v2.1/termStore/termSets('{set_id}')/terms('{term_id}')/getlegacychildren"
            ))
        }
        None => Ok(format!(
            "{site_url}/_api/v2.1/termStore/termSets('{set_id}')/getlegacychildren"
        )),
    }
}
