//! FILENAME: core/pivot-engine/src/view.rs
//! Pivot View - renderable output of a cube under a layout.
//!
//! This is what a host renders: stacked column header rows with spans, one
//! descriptor per data row carrying its stub labels, and the value matrix
//! indexed as `cells[row][col]`.

use serde::{Deserialize, Serialize};

/// One merged cell in a column header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCell {
    pub code: String,
    pub label: String,
    /// Number of data columns covered.
    pub span: usize,
}

/// Describes a data row of the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotRowDescriptor {
    /// Index of this row in the view.
    pub view_row: usize,

    /// Category code per row dimension, outermost first.
    pub codes: Vec<String>,

    /// Category label per row dimension.
    pub labels: Vec<String>,

    /// Per row dimension: whether the label starts a new group here, as
    /// opposed to repeating the row above.
    pub group_start: Vec<bool>,
}

/// The complete rendered view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotView {
    pub row_dimensions: Vec<String>,
    pub column_dimensions: Vec<String>,

    /// One header row per column dimension, outermost first.
    pub column_headers: Vec<Vec<HeaderCell>>,

    /// Metadata for each data row.
    pub rows: Vec<PivotRowDescriptor>,

    /// Values, `None` for missing observations.
    pub cells: Vec<Vec<Option<f64>>>,

    /// Total number of data rows.
    pub row_count: usize,

    /// Total number of data columns.
    pub col_count: usize,
}

impl PivotView {
    /// Value at a data position; `None` when missing or out of range.
    pub fn get_cell(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn row(&self, row: usize) -> Option<&PivotRowDescriptor> {
        self.rows.get(row)
    }

    /// Number of header rows above the data area.
    pub fn header_row_count(&self) -> usize {
        self.column_headers.len()
    }

    /// Number of label columns left of the data area.
    pub fn row_label_col_count(&self) -> usize {
        self.row_dimensions.len()
    }
}
