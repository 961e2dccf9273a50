pub mod fingerprint;
pub mod pages;
pub mod property_pane;
pub mod selection;
pub mod taxonomy;
pub mod term_tree;
pub mod theme;

#[cfg(test)]
pub mod fake;
