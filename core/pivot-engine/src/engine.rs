//! FILENAME: core/pivot-engine/src/engine.rs
//! Layout Engine - maps row/column positions of a layout onto cube offsets.
//!
//! Algorithm:
//! 1. Validate that the layout partitions the cube's dimensions
//! 2. Enumerate the Cartesian product of row dimensions and of column
//!    dimensions (category index order, last dimension fastest)
//! 3. Precompute each combination's partial offset from the cube strides
//! 4. A cell's offset is its row partial plus its column partial
//!
//! Steps 2-3 are redone on every pivot operation; the cube is never copied.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use catalog::{log_debug, log_info};
use crate::cube::{AxisDimension, CubeAxes, DataCube, IndexVec};
use crate::definition::{Axis, LayoutPreset, LayoutSpec};
use crate::error::LayoutError;
use crate::view::{HeaderCell, PivotRowDescriptor, PivotView};

// ============================================================================
// COMBINATIONS
// ============================================================================

/// One row or column of a layout: a category for each dimension on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisCombination {
    pub codes: Vec<String>,
    pub indices: IndexVec,
}

/// Cartesian product of the categories of `dimensions`, last dimension
/// varying fastest. No dimensions yield a single empty combination.
pub fn build_combinations<S: AsRef<str>>(
    dimensions: &[S],
    axes: &CubeAxes,
) -> Result<Vec<AxisCombination>, LayoutError> {
    let mut dims: Vec<&AxisDimension> = Vec::with_capacity(dimensions.len());
    for code in dimensions {
        let axis = axes
            .dimension(code.as_ref())
            .ok_or_else(|| LayoutError::UnknownDimension(code.as_ref().to_string()))?;
        dims.push(axis);
    }

    let total = dims
        .iter()
        .try_fold(1usize, |acc, axis| acc.checked_mul(axis.len()))
        .ok_or(LayoutError::ShapeOverflow)?;

    let mut combinations = Vec::with_capacity(total);
    let mut indices = IndexVec::from_elem(0, dims.len());
    for _ in 0..total {
        combinations.push(AxisCombination {
            codes: dims
                .iter()
                .zip(&indices)
                .map(|(axis, &i)| axis.categories[i].code.clone())
                .collect(),
            indices: indices.clone(),
        });

        for level in (0..dims.len()).rev() {
            indices[level] += 1;
            if indices[level] < dims[level].len() {
                break;
            }
            indices[level] = 0;
        }
    }
    Ok(combinations)
}

/// Value under `layout` at the given row and column combination.
pub fn get_value(
    cube: &DataCube,
    layout: &LayoutSpec,
    row: &AxisCombination,
    column: &AxisCombination,
) -> Result<Option<f64>, LayoutError> {
    layout.validate(cube.dimensions())?;
    for (dims, combination) in [(&layout.rows, row), (&layout.columns, column)] {
        if dims.len() != combination.indices.len() {
            return Err(LayoutError::IndexArity {
                expected: dims.len(),
                actual: combination.indices.len(),
            });
        }
    }

    let mut indices = IndexVec::from_elem(0, cube.dimensions().len());
    let placed = layout
        .rows
        .iter()
        .zip(&row.indices)
        .chain(layout.columns.iter().zip(&column.indices));
    for (code, &index) in placed {
        let pos = cube
            .position(code)
            .ok_or_else(|| LayoutError::UnknownDimension(code.clone()))?;
        indices[pos] = index;
    }
    cube.value_at(&indices)
}

fn partial_offsets(
    strides: &FxHashMap<&str, usize>,
    dimensions: &[String],
    combinations: &[AxisCombination],
) -> Vec<usize> {
    combinations
        .iter()
        .map(|combination| {
            dimensions
                .iter()
                .zip(&combination.indices)
                .map(|(code, &i)| i * strides.get(code.as_str()).copied().unwrap_or(0))
                .sum()
        })
        .collect()
}

// ============================================================================
// CUBE LAYOUT
// ============================================================================

/// Combinations and offsets for one side of the layout.
#[derive(Debug, Clone)]
struct Side {
    combinations: Vec<AxisCombination>,
    offsets: Vec<usize>,
}

/// A cube under a validated layout.
#[derive(Debug, Clone)]
pub struct CubeLayout<'a> {
    cube: &'a DataCube,
    axes: &'a CubeAxes,
    spec: LayoutSpec,
    rows: Side,
    columns: Side,
}

impl<'a> CubeLayout<'a> {
    pub fn new(cube: &'a DataCube, axes: &'a CubeAxes, spec: LayoutSpec) -> Result<Self, LayoutError> {
        axes.check(cube)?;
        let (rows, columns) = Self::arrange(cube, axes, &spec)?;
        log_debug!(
            "LAYOUT",
            "layout {:?} x {:?}: {} rows, {} columns",
            spec.rows,
            spec.columns,
            rows.combinations.len(),
            columns.combinations.len()
        );
        Ok(CubeLayout {
            cube,
            axes,
            spec,
            rows,
            columns,
        })
    }

    fn arrange(cube: &DataCube, axes: &CubeAxes, spec: &LayoutSpec) -> Result<(Side, Side), LayoutError> {
        spec.validate(cube.dimensions())?;
        let strides: FxHashMap<&str, usize> = cube
            .dimensions()
            .iter()
            .map(String::as_str)
            .zip(cube.strides().iter().copied())
            .collect();

        let side = |dims: &[String]| -> Result<Side, LayoutError> {
            let combinations = build_combinations(dims, axes)?;
            let offsets = partial_offsets(&strides, dims, &combinations);
            Ok(Side { combinations, offsets })
        };
        Ok((side(&spec.rows)?, side(&spec.columns)?))
    }

    pub fn spec(&self) -> &LayoutSpec {
        &self.spec
    }

    pub fn cube(&self) -> &DataCube {
        self.cube
    }

    pub fn row_count(&self) -> usize {
        self.rows.combinations.len()
    }

    pub fn col_count(&self) -> usize {
        self.columns.combinations.len()
    }

    pub fn rows(&self) -> &[AxisCombination] {
        &self.rows.combinations
    }

    pub fn columns(&self) -> &[AxisCombination] {
        &self.columns.combinations
    }

    /// Value at a data position; `None` when missing or out of range.
    pub fn value(&self, row: usize, col: usize) -> Option<f64> {
        let offset = self.rows.offsets.get(row)? + self.columns.offsets.get(col)?;
        self.cube.value_at_offset(offset)
    }

    // ========================================================================
    // PIVOT OPERATIONS
    // ========================================================================

    /// Switches to `spec`. On error the current layout is kept.
    pub fn set_spec(&mut self, spec: LayoutSpec) -> Result<(), LayoutError> {
        let (rows, columns) = Self::arrange(self.cube, self.axes, &spec)?;
        self.spec = spec;
        self.rows = rows;
        self.columns = columns;
        Ok(())
    }

    pub fn transpose(&mut self) {
        self.spec.transpose();
        std::mem::swap(&mut self.rows, &mut self.columns);
    }

    pub fn move_to_rows(&mut self, dimension: &str, position: Option<usize>) -> Result<(), LayoutError> {
        let mut next = self.spec.clone();
        next.move_to_rows(dimension, position)?;
        self.set_spec(next)
    }

    pub fn move_to_columns(&mut self, dimension: &str, position: Option<usize>) -> Result<(), LayoutError> {
        let mut next = self.spec.clone();
        next.move_to_columns(dimension, position)?;
        self.set_spec(next)
    }

    pub fn reorder<S: AsRef<str>>(&mut self, axis: Axis, order: &[S]) -> Result<(), LayoutError> {
        let mut next = self.spec.clone();
        next.reorder(axis, order)?;
        self.set_spec(next)
    }

    pub fn apply_preset(&mut self, preset: LayoutPreset) -> Result<(), LayoutError> {
        let next = preset.apply(&self.spec, self.cube.dimensions());
        self.set_spec(next)
    }

    // ========================================================================
    // VIEW
    // ========================================================================

    pub fn to_view(&self) -> PivotView {
        let row_axes: Vec<Option<&AxisDimension>> =
            self.spec.rows.iter().map(|d| self.axes.dimension(d)).collect();
        let col_axes: Vec<Option<&AxisDimension>> =
            self.spec.columns.iter().map(|d| self.axes.dimension(d)).collect();

        let mut column_headers = Vec::with_capacity(col_axes.len());
        for (level, axis) in col_axes.iter().enumerate() {
            let mut cells: Vec<HeaderCell> = Vec::new();
            let mut previous: Option<&[usize]> = None;
            for combination in &self.columns.combinations {
                let prefix = &combination.indices[..=level];
                if previous == Some(prefix) {
                    if let Some(cell) = cells.last_mut() {
                        cell.span += 1;
                    }
                } else {
                    cells.push(HeaderCell {
                        code: combination.codes[level].clone(),
                        label: category_label(*axis, combination.indices[level]),
                        span: 1,
                    });
                }
                previous = Some(prefix);
            }
            column_headers.push(cells);
        }

        let mut rows = Vec::with_capacity(self.row_count());
        let mut previous: Option<&AxisCombination> = None;
        for (view_row, combination) in self.rows.combinations.iter().enumerate() {
            let labels = row_axes
                .iter()
                .zip(&combination.indices)
                .map(|(axis, &i)| category_label(*axis, i))
                .collect();
            let group_start = (0..combination.indices.len())
                .map(|level| {
                    previous.map_or(true, |prev| {
                        prev.indices[..=level] != combination.indices[..=level]
                    })
                })
                .collect();
            rows.push(PivotRowDescriptor {
                view_row,
                codes: combination.codes.clone(),
                labels,
                group_start,
            });
            previous = Some(combination);
        }

        let cells = (0..self.row_count())
            .map(|r| (0..self.col_count()).map(|c| self.value(r, c)).collect())
            .collect();

        PivotView {
            row_dimensions: self.spec.rows.clone(),
            column_dimensions: self.spec.columns.clone(),
            column_headers,
            rows,
            cells,
            row_count: self.row_count(),
            col_count: self.col_count(),
        }
    }
}

fn category_label(axis: Option<&AxisDimension>, index: usize) -> String {
    axis.and_then(|a| a.categories.get(index))
        .map_or_else(String::new, |c| c.label.clone())
}

/// Validates `spec` against the cube and renders the view.
pub fn calculate_view(
    cube: &DataCube,
    axes: &CubeAxes,
    spec: &LayoutSpec,
) -> Result<PivotView, LayoutError> {
    let layout = CubeLayout::new(cube, axes, spec.clone())?;
    let view = layout.to_view();
    log_info!(
        "LAYOUT",
        "calculated view: {} rows x {} columns",
        view.row_count,
        view.col_count
    );
    Ok(view)
}
