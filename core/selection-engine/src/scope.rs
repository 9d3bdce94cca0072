//! FILENAME: core/selection-engine/src/scope.rs
//! The category list currently governing a dimension.
//!
//! Explicit selection codes are interpreted relative to the scope: base
//! category codes when no codelist is active, codelist entry codes otherwise.

use std::collections::BTreeSet;
use rustc_hash::FxHashSet;
use catalog::{Dimension, ResolvedCodelist};

#[derive(Debug, Clone, Copy)]
pub enum DimensionScope<'a> {
    Base(&'a Dimension),
    Codelist {
        dimension: &'a Dimension,
        codelist: &'a ResolvedCodelist,
    },
}

impl<'a> DimensionScope<'a> {
    pub fn new(dimension: &'a Dimension, codelist: Option<&'a ResolvedCodelist>) -> Self {
        match codelist {
            Some(codelist) => DimensionScope::Codelist { dimension, codelist },
            None => DimensionScope::Base(dimension),
        }
    }

    pub fn dimension(&self) -> &'a Dimension {
        match *self {
            DimensionScope::Base(dimension) => dimension,
            DimensionScope::Codelist { dimension, .. } => dimension,
        }
    }

    pub fn code(&self) -> &'a str {
        &self.dimension().code
    }

    pub fn codelist(&self) -> Option<&'a ResolvedCodelist> {
        match *self {
            DimensionScope::Base(_) => None,
            DimensionScope::Codelist { codelist, .. } => Some(codelist),
        }
    }

    /// Selectable codes in the order the view lists them.
    pub fn display_codes(&self) -> Vec<&'a str> {
        match *self {
            DimensionScope::Base(dimension) => dimension.display_codes(),
            DimensionScope::Codelist { codelist, .. } => codelist.entry_codes(),
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        match *self {
            DimensionScope::Base(dimension) => dimension.contains(code),
            DimensionScope::Codelist { codelist, .. } => codelist.contains(code),
        }
    }

    /// Effective elimination flag.
    pub fn eliminable(&self) -> bool {
        match *self {
            DimensionScope::Base(dimension) => dimension.eliminable,
            DimensionScope::Codelist { codelist, .. } => codelist.eliminable,
        }
    }

    /// Number of distinct base categories reachable in this scope.
    pub fn true_max_count(&self) -> usize {
        match *self {
            DimensionScope::Base(dimension) => dimension.len(),
            DimensionScope::Codelist { codelist, .. } => codelist.original_count(),
        }
    }

    /// How many base cells one selected code accounts for.
    pub fn weight(&self, code: &str) -> usize {
        match *self {
            DimensionScope::Base(dimension) => usize::from(dimension.contains(code)),
            DimensionScope::Codelist { codelist, .. } => {
                codelist.entry(code).map_or(0, |e| e.value_map.len())
            }
        }
    }

    /// Expands selected codes into base category codes, de-duplicated.
    /// Output follows display order (codelist entry order when a codelist is
    /// active); `chronological` time dimensions are re-sorted by index.
    pub fn expand(&self, selected: &BTreeSet<String>, chronological: bool) -> Vec<String> {
        let mut codes: Vec<String> = match *self {
            DimensionScope::Base(dimension) => dimension
                .display_categories()
                .filter(|c| selected.contains(&c.code))
                .map(|c| c.code.clone())
                .collect(),
            DimensionScope::Codelist { codelist, .. } => {
                let mut seen: FxHashSet<&str> = FxHashSet::default();
                let mut out = Vec::new();
                for entry in codelist.entries().iter().filter(|e| selected.contains(&e.code)) {
                    for base in &entry.value_map {
                        if seen.insert(base.as_str()) {
                            out.push(base.clone());
                        }
                    }
                }
                out
            }
        };

        let dimension = self.dimension();
        if chronological && dimension.is_time() {
            codes.sort_by_key(|code| dimension.index_of(code).unwrap_or(usize::MAX));
        }
        codes
    }
}
