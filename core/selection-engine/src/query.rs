//! FILENAME: core/selection-engine/src/query.rs
//! Query construction and validation.
//!
//! A query maps each included dimension to explicit base codes, the wildcard
//! or a top-N request. Dimensions that are effectively eliminable and select
//! nothing are left out so the service aggregates over them. Serialization
//! to the legacy `string[] | "*" | "top(N)"` forms happens only here, at the
//! boundary.

use std::fmt;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use catalog::CodelistKind;
use crate::error::ValidationIssue;
use crate::scope::DimensionScope;
use crate::selection::Selection;

// ============================================================================
// QUERY VALUES
// ============================================================================

/// Resolved value for one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Codes(Vec<String>),
    Wildcard,
    Top(usize),
}

impl QueryValue {
    pub fn is_empty(&self) -> bool {
        match self {
            QueryValue::Codes(codes) => codes.is_empty(),
            QueryValue::Wildcard => false,
            QueryValue::Top(n) => *n == 0,
        }
    }

    /// The value as a code list for transports that only accept lists.
    pub fn value_codes(&self) -> Vec<String> {
        match self {
            QueryValue::Codes(codes) => codes.clone(),
            QueryValue::Wildcard => vec!["*".to_string()],
            QueryValue::Top(n) => vec![format!("top({})", n)],
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Codes(codes) => write!(f, "{}", codes.join(",")),
            QueryValue::Wildcard => write!(f, "*"),
            QueryValue::Top(n) => write!(f, "top({})", n),
        }
    }
}

impl Serialize for QueryValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QueryValue::Codes(codes) => {
                let mut seq = serializer.serialize_seq(Some(codes.len()))?;
                for code in codes {
                    seq.serialize_element(code)?;
                }
                seq.end()
            }
            QueryValue::Wildcard => serializer.serialize_str("*"),
            QueryValue::Top(n) => serializer.serialize_str(&format!("top({})", n)),
        }
    }
}

// ============================================================================
// QUERY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryEntry {
    pub dimension: String,
    pub value: QueryValue,
    /// Active filter codelist. Aggregation codelists are expanded to base
    /// codes and therefore not named.
    pub codelist: Option<String>,
}

/// Dimension code -> resolved value, in storage order. Absent keys mean
/// "aggregate over this dimension".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    entries: Vec<QueryEntry>,
}

impl Query {
    pub fn entries(&self) -> &[QueryEntry] {
        &self.entries
    }

    pub fn get(&self, dimension: &str) -> Option<&QueryValue> {
        self.entries
            .iter()
            .find(|e| e.dimension == dimension)
            .map(|e| &e.value)
    }

    pub fn contains(&self, dimension: &str) -> bool {
        self.get(dimension).is_some()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.dimension.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializes as the legacy query object: `{dim: [..] | "*" | "top(N)"}`.
impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.dimension, &entry.value)?;
        }
        map.end()
    }
}

// ============================================================================
// BUILDING
// ============================================================================

/// Resolves one dimension's selection. `None` means the dimension is
/// omitted from the query.
pub fn resolve_selection(
    scope: &DimensionScope<'_>,
    selection: &Selection,
    chronological: bool,
) -> Option<QueryValue> {
    let value = match selection {
        Selection::All => match scope.codelist() {
            // "*" would mean every base category, not every codelist entry
            Some(codelist) => QueryValue::Codes(codelist.original_codes.clone()),
            None => QueryValue::Wildcard,
        },
        Selection::TopN(0) => QueryValue::Codes(Vec::new()),
        Selection::TopN(n) => QueryValue::Top(*n),
        Selection::Explicit(codes) => QueryValue::Codes(scope.expand(codes, chronological)),
    };

    if value.is_empty() && scope.eliminable() {
        None
    } else {
        Some(value)
    }
}

/// Builds the query from every dimension's scope and selection.
pub fn build_query<'a, I>(selections: I, chronological: bool) -> Query
where
    I: IntoIterator<Item = (DimensionScope<'a>, &'a Selection)>,
{
    let entries = selections
        .into_iter()
        .filter_map(|(scope, selection)| {
            let value = resolve_selection(&scope, selection, chronological)?;
            let codelist = scope
                .codelist()
                .filter(|c| c.kind == CodelistKind::Filter)
                .map(|c| c.id.clone());
            Some(QueryEntry {
                dimension: scope.code().to_string(),
                value,
                codelist,
            })
        })
        .collect();
    Query { entries }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Checks that every effectively mandatory dimension resolves to something.
/// Returns the problems found; empty means valid.
pub fn validate_query<'a, I>(query: &Query, scopes: I) -> Vec<ValidationIssue>
where
    I: IntoIterator<Item = DimensionScope<'a>>,
{
    scopes
        .into_iter()
        .filter(|scope| !scope.eliminable())
        .filter_map(|scope| {
            let dimension = scope.code().to_string();
            if scope.dimension().is_empty() {
                return Some(ValidationIssue::NoCategories { dimension });
            }
            match query.get(&dimension) {
                Some(value) if !value.is_empty() => None,
                _ => Some(ValidationIssue::MandatoryUnselected { dimension }),
            }
        })
        .collect()
}
