//! FILENAME: core/selection-engine/src/lib.rs
//! Selection subsystem: per-dimension selection state, query building,
//! validation and cardinality estimation.
//!
//! Everything here is a pure function of catalog + selection state, except
//! `session`, which owns that state for one loaded table and recomputes the
//! derived query and estimate after every mutation.
//!
//! Layers:
//! - `scope`: The category list currently governing a dimension
//! - `selection`: Selection variants and the pure action reducer
//! - `query`: Query object construction and validation
//! - `cardinality`: Selected-cell and maximum-cell estimation
//! - `wire`: Transport forms of a query (legacy map, POST body, GET params)
//! - `session`: The owned context tying it all together

pub mod config;
pub mod error;
pub mod scope;
pub mod selection;
pub mod query;
pub mod cardinality;
pub mod wire;
pub mod session;

pub use config::{EstimatorConfig, SessionConfig, DEFAULT_HARD_LIMIT, DEFAULT_WARN_THRESHOLD};
pub use error::{SelectionError, ValidationIssue};
pub use scope::DimensionScope;
pub use selection::{apply_selection_action, Selection, SelectionAction};
pub use query::{build_query, resolve_selection, validate_query, Query, QueryEntry, QueryValue};
pub use cardinality::{estimate_cardinality, CardinalityEstimate, DimensionCount};
pub use wire::{Placement, PostBody, VariableSelection};
pub use session::TableSession;
