//! FILENAME: core/selection-engine/src/wire.rs
//! Transport forms of a query.
//!
//! The transport collaborator decides between a GET query string and a JSON
//! POST body; both are produced here from the same `Query` so that the two
//! never disagree about which dimensions are included.

use serde::{Deserialize, Serialize};
use crate::query::Query;

/// `{selection: [...], placement?: {stub, heading}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostBody {
    pub selection: Vec<VariableSelection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSelection {
    pub variable_code: String,
    pub value_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codelist: Option<String>,
}

/// Requested server-side placement: `stub` = rows, `heading` = columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub stub: Vec<String>,
    pub heading: Vec<String>,
}

impl Placement {
    pub fn new(stub: Vec<String>, heading: Vec<String>) -> Self {
        Placement { stub, heading }
    }
}

impl Query {
    pub fn to_post_body(&self, placement: Option<Placement>) -> PostBody {
        PostBody {
            selection: self
                .entries()
                .iter()
                .map(|entry| VariableSelection {
                    variable_code: entry.dimension.clone(),
                    value_codes: entry.value.value_codes(),
                    codelist: entry.codelist.clone(),
                })
                .collect(),
            placement,
        }
    }

    /// `valueCodes[Dim]=a,b` and `codelist[Dim]=id` pairs, unencoded.
    pub fn to_get_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.len());
        for entry in self.entries() {
            params.push((
                format!("valueCodes[{}]", entry.dimension),
                entry.value.to_string(),
            ));
            if let Some(codelist) = &entry.codelist {
                params.push((format!("codelist[{}]", entry.dimension), codelist.clone()));
            }
        }
        params
    }

    /// The legacy query object as JSON.
    pub fn to_legacy_json(&self) -> serde_json::Value {
        // Only strings and string lists are written, which cannot fail
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
