//! FILENAME: core/catalog/src/lib.rs
//! Dimension & Codelist Catalog.
//!
//! This crate holds the metadata side of a statistical table: which
//! dimensions exist, which categories each dimension has (in canonical
//! index order), whether a dimension may be eliminated from a query, and
//! which alternate groupings (codelists) can govern it.
//!
//! Layers:
//! - `metadata`: Serializable JSON-stat-like input (what the service SENDS)
//! - `dimension`: Dimension/Category types with lookup and display order
//! - `codelist`: Codelist resources and their resolution against a dimension
//! - `catalog`: The loaded, read-only map of dimensions for one table

#[doc(hidden)]
pub use log as __log;

pub mod logging;
pub mod error;
pub mod metadata;
pub mod dimension;
pub mod codelist;
pub mod catalog;

pub use error::{CatalogError, FetchError};
pub use metadata::{
    CategoryIndex, CategoryMetadata, DimensionExtension, DimensionMetadata, PxExtension,
    TableExtension, TableMetadata,
};
pub use dimension::{is_time_dimension, Category, CodelistRef, Dimension};
pub use codelist::{
    resolve_codelist, sort_codelist_refs, CodelistEntry, CodelistKind, CodelistResource,
    CodelistSource, CodelistValue, ResolvedCodelist,
};
pub use catalog::{Catalog, DisplayHint};
