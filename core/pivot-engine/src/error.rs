//! FILENAME: core/pivot-engine/src/error.rs

use thiserror::Error;
use catalog::CatalogError;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Dimension '{0}' is not placed in rows or columns")]
    MissingDimension(String),

    #[error("Dimension '{0}' is placed more than once")]
    DuplicateDimension(String),

    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("Layout has neither row nor column dimensions")]
    EmptyLayout,

    #[error("Cube declares {ids} dimensions but {sizes} sizes")]
    DimensionCountMismatch { ids: usize, sizes: usize },

    #[error("Cube shape holds {expected} cells but {actual} values were given")]
    ValueCountMismatch { expected: usize, actual: usize },

    #[error("Cube shape is too large to address")]
    ShapeOverflow,

    #[error("Expected {expected} indices, got {actual}")]
    IndexArity { expected: usize, actual: usize },

    #[error("Index {index} is out of range for '{dimension}' of size {size}")]
    IndexOutOfRange {
        dimension: String,
        index: usize,
        size: usize,
    },

    #[error("Offset {offset} is outside a cube of {len} cells")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error("Axis '{dimension}' lists {actual} categories but the cube has {expected}")]
    AxisMismatch {
        dimension: String,
        expected: usize,
        actual: usize,
    },

    #[error("Reordering of {0} must be a permutation of its dimensions")]
    InvalidReorder(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Invalid cube JSON: {0}")]
    Json(#[from] serde_json::Error),
}
