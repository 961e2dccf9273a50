//! View model handed to the host for the browse menu tree.

use serde::Serialize;

use crate::model::term::{Term, TermSet};

pub const HEADER_TEXT: &str = "Knowledge Bases";
pub const LOADING_TEXT: &str = "Loading term sets...";

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Branch,
    Leaf,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TreeItem {
    pub id: String,
    pub name: String,
    pub item_type: ItemType,
    pub hierarchy_level: u8,
    pub selected: bool,
    pub children: Vec<TreeItem>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MenuView {
    Loading {
        text: &'static str,
    },
    Ready {
        header: &'static str,
        items: Vec<TreeItem>,
    },
}

pub fn loading() -> MenuView {
    MenuView::Loading { text: LOADING_TEXT }
}

/// Flattens all term sets into one list of root items, in forest order.
pub fn project(forest: &[TermSet], selected_term_id: Option<&str>) -> MenuView {
    let items = forest
        .iter()
        .flat_map(|set| set.terms.iter())
        .map(|t| item(t, selected_term_id))
        .collect();

    MenuView::Ready {
        header: HEADER_TEXT,
        items,
    }
}

fn item(term: &Term, selected_term_id: Option<&str>) -> TreeItem {
    TreeItem {
        id: term.id.clone(),
        name: term.name.clone(),
        item_type: if term.has_children() {
            ItemType::Branch
        } else {
            ItemType::Leaf
        },
        hierarchy_level: term.hierarchy_level,
        selected: selected_term_id == Some(term.id.as_str()),
        children: term
            .children
            .iter()
            .map(|c| item(c, selected_term_id))
            .collect(),
    }
}
