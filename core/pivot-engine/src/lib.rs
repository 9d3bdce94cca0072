//! FILENAME: core/pivot-engine/src/lib.rs
//! Cube layout subsystem.
//!
//! Takes the flat value array of a fetched table and presents it under an
//! interactive row/column layout. Depends on `catalog` only for category
//! metadata, axis labels and time detection.
//!
//! Layers:
//! - `cube`: Flat values, sizes and strides (WHAT was fetched)
//! - `definition`: Serializable row/column placement (what the user WANTS)
//! - `engine`: Offset arithmetic per layout (HOW we look values up)
//! - `view`: Renderable output for the frontend (WHAT we display)

pub mod error;
pub mod cube;
pub mod definition;
pub mod engine;
pub mod view;

pub use error::LayoutError;
pub use cube::{
    compute_strides, AxisCategory, AxisDimension, CubeAxes, CubeDimensionInput, CubeInput,
    DataCube, IndexVec,
};
pub use definition::{Axis, LayoutPreset, LayoutSpec};
pub use engine::{build_combinations, calculate_view, get_value, AxisCombination, CubeLayout};
pub use view::{HeaderCell, PivotRowDescriptor, PivotView};
