//! Per-process web part session: the state the host's lifecycle callbacks act on.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::Settings;
use crate::model::properties::WebPartProperties;
use crate::model::term::{find_term, TermSet};
use crate::render::{self, MenuView};
use crate::services::fingerprint;
use crate::services::pages::PagesBrowser;
use crate::services::property_pane::PropertyPaneResolver;
use crate::services::selection::{CategorySelected, SelectionHandler};
use crate::services::taxonomy::{HttpTaxonomyClient, TaxonomyService};
use crate::services::term_tree;
use crate::services::theme::{self, Theme};

#[derive(Default)]
struct MenuState {
    properties: WebPartProperties,
    forest: Vec<TermSet>,
    fingerprint: Option<String>,
    selected_term_id: Option<String>,
    built: bool,
}

impl MenuState {
    fn view(&self) -> MenuView {
        if self.built {
            render::project(&self.forest, self.selected_term_id.as_deref())
        } else {
            render::loading()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenderOutcome {
    /// False when the build finished after the session moved on.
    pub applied: bool,
    pub view: MenuView,
}

#[derive(Debug, Serialize)]
pub struct ClickOutcome {
    pub view: MenuView,
    pub event: Option<CategorySelected>,
}

pub struct WebPartHost {
    settings: RwLock<Settings>,
    service: RwLock<Option<Arc<dyn TaxonomyService>>>,
    state: Mutex<MenuState>,
    generation: AtomicU64,
    pane: PropertyPaneResolver,
    selection: SelectionHandler,
    pages: PagesBrowser,
}

impl WebPartHost {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            service: RwLock::new(None),
            state: Mutex::new(MenuState::default()),
            generation: AtomicU64::new(0),
            pane: PropertyPaneResolver::new(),
            selection: SelectionHandler::new(),
            pages: PagesBrowser::new(),
        }
    }

    pub fn with_service(settings: Settings, service: Arc<dyn TaxonomyService>) -> Self {
        let host = Self::new(settings);
        host.set_service(service);
        host
    }

    fn set_service(&self, service: Arc<dyn TaxonomyService>) {
        match self.service.write() {
            Ok(mut guard) => *guard = Some(service),
            Err(poisoned) => *poisoned.into_inner() = Some(service),
        }
    }

    fn service(&self) -> Result<Arc<dyn TaxonomyService>, String> {
        let guard = match self.service.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .clone()
            .ok_or_else(|| "web part is not initialized".to_string())
    }

    fn state(&self) -> MutexGuard<'_, MenuState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<CategorySelected> {
        self.selection.subscribe()
    }

    pub fn properties(&self) -> WebPartProperties {
        self.state().properties.clone()
    }

    /// Connects to the term store and preloads the group dropdown.
    pub async fn init(&self, site_url: Option<&str>, access_token: Option<&str>) -> Result<(), String> {
        let settings = {
            let mut guard = match self.settings.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.merge_init(site_url, access_token);
            guard.clone()
        };

        let client = HttpTaxonomyClient::new(&settings).map_err(|e| e.to_string())?;
        self.set_service(Arc::new(client));

        self.initialize_pane().await
    }

    pub async fn initialize_pane(&self) -> Result<(), String> {
        let service = self.service()?;
        self.pane.initialize(service.as_ref()).await;
        Ok(())
    }

    /// Replaces all properties. Changing the forest inputs invalidates any
    /// build in flight.
    pub fn set_properties(&self, properties: WebPartProperties) {
        let mut st = self.state();
        let inputs_changed = st.properties.selected_group_id != properties.selected_group_id
            || st.properties.selected_set_names != properties.selected_set_names;
        st.properties = properties;
        if inputs_changed {
            self.bump_generation();
        }
    }

    pub async fn render(&self) -> Result<RenderOutcome, String> {
        let (properties, generation, reusable) = {
            let st = self.state();
            let fp = fingerprint::forest_inputs(
                &st.properties.selected_group_id,
                &st.properties.selected_set_names,
            );
            let reusable = st.built && st.fingerprint.as_deref() == Some(fp.as_str());
            (st.properties.clone(), self.generation.load(Ordering::SeqCst), reusable)
        };

        if reusable {
            return Ok(RenderOutcome {
                applied: true,
                view: self.view(),
            });
        }

        let forest = if properties.selected_set_names.is_empty() {
            Vec::new()
        } else {
            let service = self.service()?;
            term_tree::build_forest(
                service.as_ref(),
                &properties.selected_group_id,
                &properties.selected_set_names,
            )
            .await
        };

        let mut st = self.state();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding forest built for a previous session state");
            return Ok(RenderOutcome {
                applied: false,
                view: st.view(),
            });
        }

        st.fingerprint = Some(fingerprint::forest_inputs(
            &properties.selected_group_id,
            &properties.selected_set_names,
        ));
        st.forest = forest;
        st.built = true;

        Ok(RenderOutcome {
            applied: true,
            view: st.view(),
        })
    }

    pub fn view(&self) -> MenuView {
        self.state().view()
    }

    pub fn dispose(&self) {
        let mut st = self.state();
        self.bump_generation();
        st.forest.clear();
        st.fingerprint = None;
        st.selected_term_id = None;
        st.built = false;
    }

    pub fn click(&self, term_id: &str) -> Result<ClickOutcome, String> {
        let mut st = self.state();
        let term = find_term(&st.forest, term_id)
            .cloned()
            .ok_or_else(|| format!("unknown term: {term_id}"))?;

        st.selected_term_id = Some(term.id.clone());
        let event = self.selection.click(&term);

        Ok(ClickOutcome {
            view: st.view(),
            event,
        })
    }

    pub fn theme_changed(&self, theme: Option<&Theme>) -> Map<String, Value> {
        theme::css_variables(theme)
    }

    pub async fn pane_start(&self) -> Result<Value, String> {
        let service = self.service()?;
        let group_id = self.state().properties.selected_group_id.clone();
        self.pane.configuration_start(service.as_ref(), &group_id).await;
        Ok(self.pane_config())
    }

    pub async fn pane_field_changed(&self, property_path: &str, new_value: &Value) -> Result<Value, String> {
        {
            let mut st = self.state();
            let before = fingerprint::forest_inputs(
                &st.properties.selected_group_id,
                &st.properties.selected_set_names,
            );
            st.properties.apply_field(property_path, new_value);
            let after = fingerprint::forest_inputs(
                &st.properties.selected_group_id,
                &st.properties.selected_set_names,
            );
            if before != after {
                self.bump_generation();
            }
        }

        // The host may already have stored the new value, so the resolver
        // reloads regardless of whether the property changed here.
        let service = self.service()?;
        self.pane
            .field_changed(service.as_ref(), property_path, new_value)
            .await;

        Ok(self.pane_config())
    }

    pub fn pane_config(&self) -> Value {
        let properties = self.properties();
        self.pane.configuration(&properties)
    }

    pub fn pages(&self) -> &PagesBrowser {
        &self.pages
    }
}
