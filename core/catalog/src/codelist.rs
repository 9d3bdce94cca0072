//! FILENAME: core/catalog/src/codelist.rs
//! Codelists - alternate groupings of a dimension's categories.
//!
//! A codelist is fetched by id only when the user picks it. Resolution
//! turns the raw resource into entries whose value maps are guaranteed to be
//! non-empty subsets of the dimension's base categories, infers whether the
//! list filters or aggregates, and computes the effective elimination flag.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use crate::dimension::{CodelistRef, Dimension};
use crate::error::FetchError;
use crate::{log_debug, log_warn};

// ============================================================================
// RAW RESOURCE
// ============================================================================

/// A codelist as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodelistResource {
    pub id: String,

    #[serde(default)]
    pub label: String,

    /// Whether the codelist makes its dimension eliminable.
    #[serde(default)]
    pub elimination: bool,

    #[serde(default)]
    pub values: Vec<CodelistValue>,
}

impl CodelistResource {
    pub fn from_json_str(json: &str) -> Result<Self, FetchError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One raw entry. Both `code` and `valueMap` may be missing in the wild.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodelistValue {
    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default, rename = "valueMap")]
    pub value_map: Option<Vec<String>>,
}

/// Something that can fetch codelists by id (network, cache, fixtures).
pub trait CodelistSource {
    fn fetch_codelist(&self, id: &str) -> Result<CodelistResource, FetchError>;
}

// ============================================================================
// RESOLVED CODELIST
// ============================================================================

/// Whether entries map one-to-one onto base categories or summarize several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodelistKind {
    /// Every entry's value map is `[entry.code]` (`vs_` style).
    Filter,
    /// At least one entry stands for other or several base codes (`agg_` style).
    Aggregation,
}

/// A validated codelist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodelistEntry {
    pub code: String,
    pub label: String,
    /// Base category codes this entry represents. Never empty.
    pub value_map: Vec<String>,
}

/// A codelist resolved against its dimension.
#[derive(Debug, Clone)]
pub struct ResolvedCodelist {
    pub id: String,
    pub label: String,
    pub kind: CodelistKind,

    /// `dimension.eliminable || codelist.elimination`.
    pub eliminable: bool,

    /// Union of all value maps, in base index order.
    pub original_codes: Vec<String>,

    /// Number of raw entries dropped as malformed.
    pub skipped_entries: usize,

    entries: Vec<CodelistEntry>,
    lookup: FxHashMap<String, usize>,
}

impl ResolvedCodelist {
    /// Entries in codelist order.
    pub fn entries(&self) -> &[CodelistEntry] {
        &self.entries
    }

    pub fn entry(&self, code: &str) -> Option<&CodelistEntry> {
        self.lookup.get(code).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.lookup.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True cardinality of the dimension while this codelist is active.
    pub fn original_count(&self) -> usize {
        self.original_codes.len()
    }

    pub fn entry_codes(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.code.as_str()).collect()
    }
}

/// Resolves a fetched codelist against its dimension.
///
/// Entries without a code are skipped. A missing value map means the entry
/// stands for itself. Value-map codes that are not base categories are
/// dropped; an entry left with nothing is skipped. Duplicate entry codes keep
/// the first occurrence.
pub fn resolve_codelist(dimension: &Dimension, resource: CodelistResource) -> ResolvedCodelist {
    let mut entries: Vec<CodelistEntry> = Vec::with_capacity(resource.values.len());
    let mut lookup: FxHashMap<String, usize> = FxHashMap::default();
    let mut skipped = 0usize;

    for value in resource.values {
        let code = match value.code {
            Some(code) if !code.is_empty() => code,
            _ => {
                log_warn!("CODELIST", "{}: skipping entry without code", resource.id);
                skipped += 1;
                continue;
            }
        };
        if lookup.contains_key(&code) {
            log_warn!("CODELIST", "{}: duplicate entry '{}' ignored", resource.id, code);
            skipped += 1;
            continue;
        }

        let raw_map = value.value_map.unwrap_or_else(|| vec![code.clone()]);
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut value_map = Vec::with_capacity(raw_map.len());
        for base in &raw_map {
            if !dimension.contains(base) {
                log_warn!(
                    "CODELIST",
                    "{}: entry '{}' maps to unknown category '{}'",
                    resource.id,
                    code,
                    base
                );
                continue;
            }
            if seen.insert(base.as_str()) {
                value_map.push(base.clone());
            }
        }
        if value_map.is_empty() {
            log_warn!("CODELIST", "{}: entry '{}' has no usable value map", resource.id, code);
            skipped += 1;
            continue;
        }

        let label = value.label.unwrap_or_else(|| code.clone());
        lookup.insert(code.clone(), entries.len());
        entries.push(CodelistEntry { code, label, value_map });
    }

    let kind = if entries
        .iter()
        .all(|e| e.value_map.len() == 1 && e.value_map[0] == e.code)
    {
        CodelistKind::Filter
    } else {
        CodelistKind::Aggregation
    };

    let mut covered = vec![false; dimension.len()];
    for entry in &entries {
        for base in &entry.value_map {
            if let Some(i) = dimension.index_of(base) {
                covered[i] = true;
            }
        }
    }
    let original_codes: Vec<String> = dimension
        .categories()
        .iter()
        .filter(|c| covered[c.index])
        .map(|c| c.code.clone())
        .collect();

    let eliminable = dimension.eliminable || resource.elimination;

    log_debug!(
        "CODELIST",
        "resolved {} for {}: {} entries, {} base codes, kind={:?}, skipped={}",
        resource.id,
        dimension.code,
        entries.len(),
        original_codes.len(),
        kind,
        skipped
    );

    ResolvedCodelist {
        id: resource.id,
        label: resource.label,
        kind,
        eliminable,
        original_codes,
        skipped_entries: skipped,
        entries,
        lookup,
    }
}

// ============================================================================
// PRESENTATION ORDER
// ============================================================================

fn codelist_rank(id: &str) -> u8 {
    if id.starts_with("vs_") {
        0
    } else if id.starts_with("agg_") {
        2
    } else {
        1
    }
}

/// Sorts codelist references for presentation: `vs_` first, unprefixed
/// next, `agg_` last. Stable within each group.
pub fn sort_codelist_refs(refs: &mut [CodelistRef]) {
    refs.sort_by_key(|r| codelist_rank(&r.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> Dimension {
        Dimension::new(
            "Region",
            "region",
            vec![
                ("01".to_string(), "Stockholm".to_string()),
                ("03".to_string(), "Uppsala".to_string()),
                ("04".to_string(), "Sodermanland".to_string()),
            ],
            false,
            vec![CodelistRef::new("agg_lan", "Counties")],
        )
    }

    /// An empty `map` means the raw entry has no value map at all.
    fn value(code: Option<&str>, map: &[&str]) -> CodelistValue {
        CodelistValue {
            code: code.map(str::to_string),
            label: None,
            value_map: if map.is_empty() {
                None
            } else {
                Some(map.iter().map(|s| s.to_string()).collect())
            },
        }
    }

    #[test]
    fn test_filter_codelist_is_detected() {
        let resource = CodelistResource {
            id: "vs_two".to_string(),
            label: "Two".to_string(),
            elimination: false,
            values: vec![value(Some("01"), &["01"]), value(Some("03"), &[])],
        };
        let resolved = resolve_codelist(&region(), resource);
        assert_eq!(resolved.kind, CodelistKind::Filter);
        assert_eq!(resolved.original_codes, vec!["01", "03"]);
        assert_eq!(resolved.entry("03").unwrap().value_map, vec!["03"]);
    }

    #[test]
    fn test_aggregation_codelist_and_original_codes_order() {
        let resource = CodelistResource {
            id: "agg_lan".to_string(),
            label: String::new(),
            elimination: false,
            values: vec![
                value(Some("east"), &["04", "01"]),
                value(Some("north"), &["03"]),
            ],
        };
        let resolved = resolve_codelist(&region(), resource);
        assert_eq!(resolved.kind, CodelistKind::Aggregation);
        assert_eq!(resolved.original_codes, vec!["01", "03", "04"]);
        assert_eq!(resolved.original_count(), 3);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let resource = CodelistResource {
            id: "agg_bad".to_string(),
            label: String::new(),
            elimination: false,
            values: vec![
                value(None, &["01"]),
                value(Some("ghost"), &["99"]),
                value(Some("ok"), &["01", "99", "01"]),
                value(Some("ok"), &["03"]),
            ],
        };
        let resolved = resolve_codelist(&region(), resource);
        assert_eq!(resolved.skipped_entries, 3);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.entry("ok").unwrap().value_map, vec!["01"]);
    }

    #[test]
    fn test_elimination_only_loosens() {
        let mut dim = region();
        let loosen = CodelistResource {
            id: "vs_x".to_string(),
            label: String::new(),
            elimination: true,
            values: vec![value(Some("01"), &[])],
        };
        assert!(resolve_codelist(&dim, loosen).eliminable);

        dim.eliminable = true;
        let strict = CodelistResource {
            id: "vs_y".to_string(),
            label: String::new(),
            elimination: false,
            values: vec![value(Some("01"), &[])],
        };
        assert!(resolve_codelist(&dim, strict).eliminable);
    }

    #[test]
    fn test_codelist_presentation_order() {
        let mut refs = vec![
            CodelistRef::new("agg_a", ""),
            CodelistRef::new("plain", ""),
            CodelistRef::new("vs_b", ""),
            CodelistRef::new("agg_b", ""),
            CodelistRef::new("vs_a", ""),
        ];
        sort_codelist_refs(&mut refs);
        let ids: Vec<&str> = refs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["vs_b", "vs_a", "plain", "agg_a", "agg_b"]);
    }

    #[test]
    fn test_resource_from_json() {
        let resource = CodelistResource::from_json_str(
            r#"{"id":"agg_lan","label":"Counties","elimination":true,
                "values":[{"code":"east","label":"East","valueMap":["01","04"]}]}"#,
        )
        .unwrap();
        assert!(resource.elimination);
        assert_eq!(resource.values[0].value_map.as_ref().unwrap().len(), 2);
    }
}
