//! FILENAME: core/selection-engine/src/error.rs

use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use catalog::{CatalogError, FetchError};

/// Why a query cannot be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssue {
    /// A mandatory dimension resolves to nothing.
    MandatoryUnselected { dimension: String },
    /// A mandatory dimension has no categories at all.
    NoCategories { dimension: String },
}

impl ValidationIssue {
    pub fn dimension(&self) -> &str {
        match self {
            ValidationIssue::MandatoryUnselected { dimension }
            | ValidationIssue::NoCategories { dimension } => dimension,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MandatoryUnselected { dimension } => {
                write!(f, "'{}' is mandatory and nothing is selected", dimension)
            }
            ValidationIssue::NoCategories { dimension } => {
                write!(f, "'{}' is mandatory but has no categories", dimension)
            }
        }
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Selection is not valid: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("Selection of {cells} cells exceeds the limit of {limit}")]
    OverHardLimit { cells: u64, limit: u64 },

    #[error("Could not resolve codelist '{codelist}' for '{dimension}': {source}")]
    CodelistResolution {
        dimension: String,
        codelist: String,
        #[source]
        source: FetchError,
    },

    #[error("A codelist fetch for '{0}' is already in progress")]
    CodelistPending(String),

    #[error("No codelist fetch is in progress for '{0}'")]
    NoPendingCodelist(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid configuration JSON: {0}")]
    ConfigJson(#[from] serde_json::Error),
}
