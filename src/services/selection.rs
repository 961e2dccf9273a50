use serde::Serialize;
use tokio::sync::broadcast;

use crate::model::term::Term;

/// Event name page listeners subscribe to; the spelling is part of the contract.
pub const CATEGORY_EVENT: &str = "catagorySelected";

const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategorySelected {
    pub event: &'static str,
    pub detail: String,
}

impl CategorySelected {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            event: CATEGORY_EVENT,
            detail: detail.into(),
        }
    }
}

pub struct SelectionHandler {
    tx: broadcast::Sender<CategorySelected>,
}

impl Default for SelectionHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionHandler {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CategorySelected> {
        self.tx.subscribe()
    }

    /// Handles a click. Only top-level terms publish a category; the
    /// returned event is `None` otherwise.
    pub fn click(&self, term: &Term) -> Option<CategorySelected> {
        if term.hierarchy_level != 1 {
            return None;
        }

        let event = CategorySelected::new(term.category());

        // No receivers is not an error: nothing on the page is listening yet.
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(term_id = %term.id, "category selected with no listeners");
        }

        Some(event)
    }
}
