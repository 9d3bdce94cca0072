//! FILENAME: core/catalog/src/error.rs

use thiserror::Error;

/// Errors raised while building or querying a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dimension '{0}' is listed in the table id but has no metadata")]
    MissingDimension(String),

    #[error("Dimension '{0}' is declared more than once")]
    DuplicateDimension(String),

    #[error("Dimension '{dimension}' has duplicate category index {index}")]
    DuplicateCategoryIndex { dimension: String, index: usize },

    #[error("Dimension '{dimension}' has duplicate category code '{code}'")]
    DuplicateCategoryCode { dimension: String, code: String },

    #[error("Dimension '{0}' has several categories but no category index")]
    MissingCategoryIndex(String),

    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("Dimension '{dimension}' has no codelist '{codelist}'")]
    UnknownCodelist { dimension: String, codelist: String },
}

/// Errors reported by a `CodelistSource` while fetching a codelist.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid codelist JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Codelist not found: {0}")]
    NotFound(String),
}
