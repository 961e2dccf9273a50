use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Term {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Display level: 1 for top-level terms, 2 for anything nested below them.
    pub hierarchy_level: u8,

    /// True 1-based depth inside the term set.
    pub depth: u32,

    pub set_id: String,

    #[serde(default)]
    pub main_parent_id: Option<String>,

    #[serde(default)]
    pub parent_name: Option<String>,

    #[serde(default)]
    pub children: Vec<Term>,
}

impl Term {
    pub fn hierarchy_level_for(depth: u32) -> u8 {
        if depth <= 1 {
            1
        } else {
            2
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Label broadcast when this term is picked as a category.
    pub fn category(&self) -> &str {
        match self.parent_name.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => &self.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TermSet {
    pub set_id: String,

    #[serde(default)]
    pub set_name: String,

    #[serde(default)]
    pub terms: Vec<Term>,
}

/// Depth-first lookup across a whole forest.
pub fn find_term<'a>(forest: &'a [TermSet], term_id: &str) -> Option<&'a Term> {
    fn walk<'a>(terms: &'a [Term], term_id: &str) -> Option<&'a Term> {
        for t in terms {
            if t.id == term_id {
                return Some(t);
            }
            if let Some(found) = walk(&t.children, term_id) {
                return Some(found);
            }
        }
        None
    }

    forest.iter().find_map(|set| walk(&set.terms, term_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(id: &str, name: &str, depth: u32, children: Vec<Term>) -> Term {
        Term {
            id: id.into(),
            name: name.into(),
            hierarchy_level: Term::hierarchy_level_for(depth),
            depth,
            set_id: "set".into(),
            main_parent_id: None,
            parent_name: None,
            children,
        }
    }

    #[test]
    fn level_collapses_below_the_roots() {
        assert_eq!(Term::hierarchy_level_for(1), 1);
        assert_eq!(Term::hierarchy_level_for(2), 2);
        assert_eq!(Term::hierarchy_level_for(7), 2);
    }

    #[test]
    fn category_prefers_non_empty_parent_name() {
        let mut t = term("1", "Pumps", 1, vec![]);
        assert_eq!(t.category(), "Pumps");

        t.parent_name = Some(String::new());
        assert_eq!(t.category(), "Pumps");

        t.parent_name = Some("Fluids".into());
        assert_eq!(t.category(), "Fluids");
    }

    #[test]
    fn find_term_searches_nested_children() {
        let forest = vec![TermSet {
            set_id: "set".into(),
            set_name: "Set".into(),
            terms: vec![term("a", "A", 1, vec![term("b", "B", 2, vec![term("c", "C", 3, vec![])])])],
        }];

        assert_eq!(find_term(&forest, "c").map(|t| t.name.as_str()), Some("C"));
        assert!(find_term(&forest, "missing").is_none());
    }

    #[test]
    fn serializes_with_pascal_case_fields() {
        let v = serde_json::to_value(term("a", "A", 1, vec![])).unwrap();
        assert_eq!(v["Id"], "a");
        assert_eq!(v["HierarchyLevel"], 1);
        assert!(v["Children"].as_array().unwrap().is_empty());
    }
}
