//! In-memory term store used by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{Result, TaxonomyError};
use crate::services::taxonomy::{
    LocalizedName, TaxonomyService, TermGroup, TermRecord, TermSetRecord,
};

type TermKey = (String, Option<String>);

#[derive(Default)]
struct State {
    groups: Vec<TermGroup>,
    sets: HashMap<String, Vec<TermSetRecord>>,
    terms: HashMap<TermKey, Vec<TermRecord>>,
    failing_terms: HashSet<TermKey>,
    failing_names: HashSet<(String, String)>,
    failing_groups: bool,
    failing_group_sets: HashSet<String>,
    term_calls: HashMap<TermKey, usize>,
    name_calls: usize,
    group_calls: usize,
    terms_in_flight: usize,
    max_terms_in_flight: usize,
    group_set_calls: usize,
}

#[derive(Default)]
pub struct FakeTaxonomy {
    state: Mutex<State>,
    gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

fn unavailable(what: &str) -> TaxonomyError {
    TaxonomyError::Config(format!("simulated failure: {what}"))
}

fn label(name: &str) -> LocalizedName {
    LocalizedName {
        name: name.to_string(),
        language_tag: Some("en-US".into()),
    }
}

impl FakeTaxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&self, id: &str, name: &str) {
        self.state.lock().unwrap().groups.push(TermGroup {
            id: id.into(),
            name: name.into(),
        });
    }

    pub fn add_set(&self, group_id: &str, set_id: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .sets
            .entry(group_id.into())
            .or_default()
            .push(TermSetRecord {
                id: set_id.into(),
                localized_names: vec![label(name)],
            });
    }

    /// Each entry is `(id, name, children_count)`.
    pub fn add_terms(&self, set_id: &str, parent: Option<&str>, terms: &[(&str, &str, u32)]) {
        let records = terms.iter().map(|(id, name, count)| TermRecord {
            id: id.to_string(),
            children_count: *count,
            labels: vec![label(name)],
        });

        self.state
            .lock()
            .unwrap()
            .terms
            .entry((set_id.into(), parent.map(str::to_string)))
            .or_default()
            .extend(records);
    }

    pub fn add_unlabelled_term(&self, set_id: &str, parent: Option<&str>, id: &str) {
        self.state
            .lock()
            .unwrap()
            .terms
            .entry((set_id.into(), parent.map(str::to_string)))
            .or_default()
            .push(TermRecord {
                id: id.into(),
                children_count: 0,
                labels: Vec::new(),
            });
    }

    pub fn fail_terms(&self, set_id: &str, parent: Option<&str>) {
        self.state
            .lock()
            .unwrap()
            .failing_terms
            .insert((set_id.into(), parent.map(str::to_string)));
    }

    pub fn fail_name(&self, group_id: &str, name: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_names
            .insert((group_id.into(), name.into()));
    }

    pub fn fail_groups(&self) {
        self.state.lock().unwrap().failing_groups = true;
    }

    pub fn fail_group_sets(&self, group_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_group_sets
            .insert(group_id.into());
    }

    /// Makes every term request wait until `release` is notified, signalling
    /// `entered` first. Returns `(entered, release)`.
    pub fn hold_term_requests(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some((entered.clone(), release.clone()));
        (entered, release)
    }

    pub fn term_calls_for(&self, set_id: &str, parent: Option<&str>) -> usize {
        self.state
            .lock()
            .unwrap()
            .term_calls
            .get(&(set_id.to_string(), parent.map(str::to_string)))
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of term requests that were outstanding at once.
    pub fn max_terms_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_terms_in_flight
    }

    pub fn name_calls(&self) -> usize {
        self.state.lock().unwrap().name_calls
    }

    pub fn group_calls(&self) -> usize {
        self.state.lock().unwrap().group_calls
    }

    pub fn group_set_calls(&self) -> usize {
        self.state.lock().unwrap().group_set_calls
    }
}

#[async_trait]
impl TaxonomyService for FakeTaxonomy {
    async fn list_groups(&self) -> Result<Vec<TermGroup>> {
        let mut state = self.state.lock().unwrap();
        state.group_calls += 1;
        if state.failing_groups {
            return Err(unavailable("groups"));
        }
        Ok(state.groups.clone())
    }

    async fn list_group_sets(&self, group_id: &str) -> Result<Vec<TermSetRecord>> {
        let mut state = self.state.lock().unwrap();
        state.group_set_calls += 1;
        if state.failing_group_sets.contains(group_id) {
            return Err(unavailable("group sets"));
        }
        Ok(state.sets.get(group_id).cloned().unwrap_or_default())
    }

    async fn find_sets_by_name(&self, group_id: &str, name: &str) -> Result<Vec<TermSetRecord>> {
        let mut state = self.state.lock().unwrap();
        state.name_calls += 1;
        if state
            .failing_names
            .contains(&(group_id.to_string(), name.to_string()))
        {
            return Err(unavailable("set lookup"));
        }

        let matches = state
            .sets
            .get(group_id)
            .map(|sets| {
                sets.iter()
                    .filter(|s| s.localized_names.iter().any(|n| n.name == name))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(matches)
    }

    async fn list_terms(
        &self,
        set_id: &str,
        parent_term_id: Option<&str>,
    ) -> Result<Vec<TermRecord>> {
        {
            let mut state = self.state.lock().unwrap();
            state.terms_in_flight += 1;
            state.max_terms_in_flight = state.max_terms_in_flight.max(state.terms_in_flight);
        }

        // Give sibling requests a chance to start before this one answers.
        tokio::task::yield_now().await;

        let gate = self.gate.lock().unwrap().clone();
        if let Some((entered, release)) = gate {
            entered.notify_one();
            release.notified().await;
        }

        let key = (set_id.to_string(), parent_term_id.map(str::to_string));
        let mut state = self.state.lock().unwrap();
        state.terms_in_flight -= 1;
        *state.term_calls.entry(key.clone()).or_default() += 1;

        if state.failing_terms.contains(&key) {
            return Err(unavailable("terms"));
        }
        Ok(state.terms.get(&key).cloned().unwrap_or_default())
    }
}
