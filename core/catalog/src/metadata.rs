//! FILENAME: core/catalog/src/metadata.rs
//! Table Metadata - The serializable input from the metadata service.
//!
//! These structures mirror the JSON-stat-like document the service returns
//! for a table. They are read-only snapshots: the catalog is built from them
//! once per table load and the raw document is not consulted afterwards.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::dimension::CodelistRef;
use crate::error::CatalogError;

// ============================================================================
// TABLE LEVEL
// ============================================================================

/// Metadata for a whole table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table title.
    #[serde(default)]
    pub label: Option<String>,

    /// Dimension codes in storage (addressing) order.
    pub id: Vec<String>,

    /// Category count per dimension, parallel to `id`. Informational only.
    #[serde(default)]
    pub size: Vec<usize>,

    /// Per-dimension metadata keyed by dimension code.
    pub dimension: BTreeMap<String, DimensionMetadata>,

    #[serde(default)]
    pub extension: Option<TableExtension>,
}

impl TableMetadata {
    /// Parses a metadata document.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Table-level extension block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableExtension {
    #[serde(default)]
    pub px: Option<PxExtension>,
}

/// Display-placement hint. Used for display ordering only, never addressing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PxExtension {
    #[serde(default)]
    pub heading: Vec<String>,
    #[serde(default)]
    pub stub: Vec<String>,
}

// ============================================================================
// DIMENSION LEVEL
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionMetadata {
    #[serde(default)]
    pub label: Option<String>,

    pub category: CategoryMetadata,

    #[serde(default)]
    pub extension: Option<DimensionExtension>,
}

/// Dimension-level extension block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimensionExtension {
    /// Whether the dimension may be left out of a query.
    #[serde(default)]
    pub elimination: bool,

    /// Alternate groupings available for this dimension.
    #[serde(default)]
    pub codelists: Vec<CodelistRef>,
}

/// Category block of a dimension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryMetadata {
    /// Canonical ordering of category codes.
    #[serde(default)]
    pub index: Option<CategoryIndex>,

    /// Code -> label.
    #[serde(default)]
    pub label: BTreeMap<String, String>,
}

/// JSON-stat allows the category index either as `{code: ordinal}` or as an
/// ordered array of codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryIndex {
    Map(BTreeMap<String, usize>),
    List(Vec<String>),
}

impl CategoryMetadata {
    /// Returns `(code, ordinal)` pairs sorted by ordinal.
    ///
    /// Without an index, a single labelled category is accepted with ordinal 0;
    /// more than one is ambiguous because label maps carry no order.
    pub fn ordered_codes(&self, dimension: &str) -> Result<Vec<(String, usize)>, CatalogError> {
        let mut pairs: Vec<(String, usize)> = match &self.index {
            Some(CategoryIndex::Map(map)) => {
                map.iter().map(|(code, &ordinal)| (code.clone(), ordinal)).collect()
            }
            Some(CategoryIndex::List(codes)) => codes
                .iter()
                .enumerate()
                .map(|(ordinal, code)| (code.clone(), ordinal))
                .collect(),
            None => {
                if self.label.len() > 1 {
                    return Err(CatalogError::MissingCategoryIndex(dimension.to_string()));
                }
                self.label.keys().map(|code| (code.clone(), 0)).collect()
            }
        };

        pairs.sort_by_key(|(_, ordinal)| *ordinal);

        for window in pairs.windows(2) {
            if window[0].1 == window[1].1 {
                return Err(CatalogError::DuplicateCategoryIndex {
                    dimension: dimension.to_string(),
                    index: window[0].1,
                });
            }
        }
        if let Some(CategoryIndex::List(codes)) = &self.index {
            let mut seen = std::collections::HashSet::new();
            for code in codes {
                if !seen.insert(code.as_str()) {
                    return Err(CatalogError::DuplicateCategoryCode {
                        dimension: dimension.to_string(),
                        code: code.clone(),
                    });
                }
            }
        }

        Ok(pairs)
    }

    /// Looks up a category label, falling back to the code itself.
    pub fn label_for(&self, code: &str) -> String {
        self.label.get(code).cloned().unwrap_or_else(|| code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_as_map_is_sorted_by_ordinal() {
        let category: CategoryMetadata = serde_json::from_str(
            r#"{"index": {"2021": 1, "2020": 0, "2022": 2}, "label": {"2020": "2020"}}"#,
        )
        .unwrap();
        let codes = category.ordered_codes("Tid").unwrap();
        let codes: Vec<&str> = codes.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(codes, vec!["2020", "2021", "2022"]);
    }

    #[test]
    fn test_index_as_list() {
        let category: CategoryMetadata =
            serde_json::from_str(r#"{"index": ["1", "2"]}"#).unwrap();
        let codes = category.ordered_codes("Kon").unwrap();
        assert_eq!(codes, vec![("1".to_string(), 0), ("2".to_string(), 1)]);
        assert_eq!(category.label_for("1"), "1");
    }

    #[test]
    fn test_duplicate_ordinal_is_rejected() {
        let category: CategoryMetadata =
            serde_json::from_str(r#"{"index": {"a": 0, "b": 0}}"#).unwrap();
        assert!(matches!(
            category.ordered_codes("X"),
            Err(CatalogError::DuplicateCategoryIndex { index: 0, .. })
        ));
    }

    #[test]
    fn test_missing_index_with_single_label() {
        let category: CategoryMetadata =
            serde_json::from_str(r#"{"label": {"BE0101N1": "Population"}}"#).unwrap();
        let codes = category.ordered_codes("ContentsCode").unwrap();
        assert_eq!(codes, vec![("BE0101N1".to_string(), 0)]);
    }

    #[test]
    fn test_missing_index_with_several_labels_is_ambiguous() {
        let category: CategoryMetadata =
            serde_json::from_str(r#"{"label": {"a": "A", "b": "B"}}"#).unwrap();
        assert!(matches!(
            category.ordered_codes("X"),
            Err(CatalogError::MissingCategoryIndex(_))
        ));
    }
}
