//! FILENAME: core/catalog/src/dimension.rs
//! Dimensions and their categories.
//!
//! Categories are stored in canonical index order: `categories()[i].index == i`.
//! This order is what flat addressing and chronological sorting rely on.
//! The display order is a separate permutation that the presentation layer
//! may change (newest-first time axes, codelist-author ordering).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One coded value within a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub label: String,
    /// Canonical 0-based position used for flat addressing.
    pub index: usize,
}

/// Reference to a codelist that can govern a dimension. Only the id and
/// label are known until the codelist is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodelistRef {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

impl CodelistRef {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        CodelistRef { id: id.into(), label: label.into() }
    }
}

/// An axis of the statistical cube.
#[derive(Debug, Clone)]
pub struct Dimension {
    pub code: String,
    pub label: String,
    /// Whether the dimension may be omitted from a query.
    pub eliminable: bool,
    pub codelists: Vec<CodelistRef>,

    /// Categories in canonical index order.
    categories: Vec<Category>,

    /// Display order as positions into `categories`.
    display_order: Vec<usize>,

    /// Category code -> canonical index.
    lookup: FxHashMap<String, usize>,
}

impl Dimension {
    /// Creates a dimension from `(code, label)` pairs given in canonical order.
    /// Indices are assigned densely from 0.
    pub fn new(
        code: impl Into<String>,
        label: impl Into<String>,
        categories: Vec<(String, String)>,
        eliminable: bool,
        codelists: Vec<CodelistRef>,
    ) -> Self {
        let categories: Vec<Category> = categories
            .into_iter()
            .enumerate()
            .map(|(index, (code, label))| Category { code, label, index })
            .collect();
        let lookup = categories
            .iter()
            .map(|c| (c.code.clone(), c.index))
            .collect();
        let display_order = (0..categories.len()).collect();

        Dimension {
            code: code.into(),
            label: label.into(),
            eliminable,
            codelists,
            categories,
            display_order,
            lookup,
        }
    }

    /// Categories in canonical index order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, code: &str) -> Option<&Category> {
        self.lookup.get(code).map(|&i| &self.categories[i])
    }

    pub fn index_of(&self, code: &str) -> Option<usize> {
        self.lookup.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.lookup.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories in the order the interactive view lists them.
    pub fn display_categories(&self) -> impl Iterator<Item = &Category> + '_ {
        self.display_order.iter().map(move |&i| &self.categories[i])
    }

    pub fn display_codes(&self) -> Vec<&str> {
        self.display_categories().map(|c| c.code.as_str()).collect()
    }

    /// Lists the categories newest (highest index) first.
    pub fn reverse_display(&mut self) {
        self.display_order = (0..self.categories.len()).rev().collect();
    }

    /// Reorders the display so that `codes` come first, in the given order.
    /// Categories not mentioned follow in canonical order. Unknown codes and
    /// repeats are ignored. Canonical indices are never touched.
    pub fn set_display_order<S: AsRef<str>>(&mut self, codes: &[S]) {
        let mut placed = vec![false; self.categories.len()];
        let mut order = Vec::with_capacity(self.categories.len());

        for code in codes {
            if let Some(&i) = self.lookup.get(code.as_ref()) {
                if !placed[i] {
                    placed[i] = true;
                    order.push(i);
                }
            }
        }
        order.extend((0..self.categories.len()).filter(|&i| !placed[i]));
        self.display_order = order;
    }

    pub fn is_time(&self) -> bool {
        is_time_dimension(&self.code)
    }

    pub fn has_codelist(&self, id: &str) -> bool {
        self.codelists.iter().any(|c| c.id == id)
    }
}

/// Heuristic used by the service's tables: the time dimension is "Tid" or
/// contains "tid" (case-insensitive).
pub fn is_time_dimension(code: &str) -> bool {
    code.to_ascii_lowercase().contains("tid")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn years() -> Dimension {
        Dimension::new(
            "Tid",
            "year",
            vec![
                ("2020".to_string(), "2020".to_string()),
                ("2021".to_string(), "2021".to_string()),
                ("2022".to_string(), "2022".to_string()),
            ],
            false,
            Vec::new(),
        )
    }

    #[test]
    fn test_indices_are_dense_and_canonical() {
        let dim = years();
        assert_eq!(dim.index_of("2022"), Some(2));
        assert_eq!(dim.categories()[1].code, "2021");
        assert!(dim.category("1999").is_none());
    }

    #[test]
    fn test_reverse_display_keeps_indices() {
        let mut dim = years();
        dim.reverse_display();
        assert_eq!(dim.display_codes(), vec!["2022", "2021", "2020"]);
        assert_eq!(dim.index_of("2020"), Some(0));
    }

    #[test]
    fn test_set_display_order_appends_unmentioned() {
        let mut dim = years();
        dim.set_display_order(&["2021", "nope", "2021"]);
        assert_eq!(dim.display_codes(), vec!["2021", "2020", "2022"]);
    }

    #[test]
    fn test_time_heuristic() {
        assert!(is_time_dimension("Tid"));
        assert!(is_time_dimension("TID"));
        assert!(is_time_dimension("Manadstid"));
        assert!(!is_time_dimension("Region"));
    }
}
