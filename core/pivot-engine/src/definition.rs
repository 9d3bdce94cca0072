//! FILENAME: core/pivot-engine/src/definition.rs
//! Layout Definition - which dimensions go in rows and which in columns.
//!
//! A `LayoutSpec` is a serializable snapshot of user intent. It holds only
//! dimension codes; the cube it is applied to never changes when the user
//! pivots. Every operation here keeps the partition intact: a dimension
//! that is moved is removed from wherever it was before being inserted.

use serde::{Deserialize, Serialize};
use rustc_hash::FxHashSet;
use catalog::{is_time_dimension, DisplayHint};
use crate::error::LayoutError;

/// Row or column side of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Rows,
    Columns,
}

impl Axis {
    fn name(self) -> &'static str {
        match self {
            Axis::Rows => "rows",
            Axis::Columns => "columns",
        }
    }
}

// ============================================================================
// LAYOUT SPEC
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSpec {
    /// Row dimensions, outermost first.
    #[serde(default)]
    pub rows: Vec<String>,

    /// Column dimensions, outermost first.
    #[serde(default)]
    pub columns: Vec<String>,
}

impl LayoutSpec {
    pub fn new<R, C>(rows: R, columns: C) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        LayoutSpec {
            rows: rows.into_iter().map(Into::into).collect(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Server-suggested placement, if it is a valid layout for `dimensions`.
    pub fn from_display_hint<S: AsRef<str>>(hint: &DisplayHint, dimensions: &[S]) -> Option<Self> {
        if hint.is_empty() {
            return None;
        }
        let spec = LayoutSpec {
            rows: hint.stub.clone(),
            columns: hint.heading.clone(),
        };
        spec.validate(dimensions).ok().map(|_| spec)
    }

    /// Checks that rows and columns partition `dimensions` exactly.
    pub fn validate<S: AsRef<str>>(&self, dimensions: &[S]) -> Result<(), LayoutError> {
        if self.rows.is_empty() && self.columns.is_empty() {
            return Err(LayoutError::EmptyLayout);
        }

        let known: FxHashSet<&str> = dimensions.iter().map(AsRef::as_ref).collect();
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for code in self.rows.iter().chain(&self.columns) {
            if !known.contains(code.as_str()) {
                return Err(LayoutError::UnknownDimension(code.clone()));
            }
            if !seen.insert(code.as_str()) {
                return Err(LayoutError::DuplicateDimension(code.clone()));
            }
        }
        for code in dimensions {
            if !seen.contains(code.as_ref()) {
                return Err(LayoutError::MissingDimension(code.as_ref().to_string()));
            }
        }
        Ok(())
    }

    pub fn axis(&self, axis: Axis) -> &[String] {
        match axis {
            Axis::Rows => &self.rows,
            Axis::Columns => &self.columns,
        }
    }

    /// Side on which `dimension` is placed.
    pub fn axis_of(&self, dimension: &str) -> Option<Axis> {
        if self.rows.iter().any(|d| d == dimension) {
            Some(Axis::Rows)
        } else if self.columns.iter().any(|d| d == dimension) {
            Some(Axis::Columns)
        } else {
            None
        }
    }

    pub fn transpose(&mut self) {
        std::mem::swap(&mut self.rows, &mut self.columns);
    }

    pub fn transposed(&self) -> Self {
        LayoutSpec {
            rows: self.columns.clone(),
            columns: self.rows.clone(),
        }
    }

    /// Moves `dimension` to rows at `position` (clamped; `None` appends).
    pub fn move_to_rows(&mut self, dimension: &str, position: Option<usize>) -> Result<(), LayoutError> {
        self.move_to(Axis::Rows, dimension, position)
    }

    /// Moves `dimension` to columns at `position` (clamped; `None` appends).
    pub fn move_to_columns(&mut self, dimension: &str, position: Option<usize>) -> Result<(), LayoutError> {
        self.move_to(Axis::Columns, dimension, position)
    }

    pub fn move_to(
        &mut self,
        axis: Axis,
        dimension: &str,
        position: Option<usize>,
    ) -> Result<(), LayoutError> {
        if self.axis_of(dimension).is_none() {
            return Err(LayoutError::UnknownDimension(dimension.to_string()));
        }
        self.rows.retain(|d| d != dimension);
        self.columns.retain(|d| d != dimension);

        let target = match axis {
            Axis::Rows => &mut self.rows,
            Axis::Columns => &mut self.columns,
        };
        let at = position.map_or(target.len(), |p| p.min(target.len()));
        target.insert(at, dimension.to_string());
        Ok(())
    }

    /// Replaces the nesting order of one side. `order` must be a permutation
    /// of that side's dimensions.
    pub fn reorder<S: AsRef<str>>(&mut self, axis: Axis, order: &[S]) -> Result<(), LayoutError> {
        let current = self.axis(axis);
        let mut sorted_current: Vec<&str> = current.iter().map(String::as_str).collect();
        let mut sorted_order: Vec<&str> = order.iter().map(AsRef::as_ref).collect();
        sorted_current.sort_unstable();
        sorted_order.sort_unstable();
        if sorted_current != sorted_order {
            return Err(LayoutError::InvalidReorder(axis.name().to_string()));
        }

        let reordered = order.iter().map(|s| s.as_ref().to_string()).collect();
        match axis {
            Axis::Rows => self.rows = reordered,
            Axis::Columns => self.columns = reordered,
        }
        Ok(())
    }
}

// ============================================================================
// PRESETS
// ============================================================================

/// One-click layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutPreset {
    /// Time alone in rows and everything else in columns; without a time
    /// dimension the last dimension goes to columns and the rest to rows.
    Default,
    /// Swap rows and columns of the current layout.
    Transpose,
    AllRows,
    AllColumns,
}

impl LayoutPreset {
    /// Layout for `dimensions` (in cube order) given the current layout.
    pub fn apply<S: AsRef<str>>(self, current: &LayoutSpec, dimensions: &[S]) -> LayoutSpec {
        let codes: Vec<String> = dimensions.iter().map(|s| s.as_ref().to_string()).collect();
        match self {
            LayoutPreset::Default => default_layout(codes),
            LayoutPreset::Transpose => current.transposed(),
            LayoutPreset::AllRows => LayoutSpec {
                rows: codes,
                columns: Vec::new(),
            },
            LayoutPreset::AllColumns => LayoutSpec {
                rows: Vec::new(),
                columns: codes,
            },
        }
    }
}

fn default_layout(mut codes: Vec<String>) -> LayoutSpec {
    if let Some(pos) = codes.iter().position(|c| is_time_dimension(c)) {
        let time = codes.remove(pos);
        return LayoutSpec {
            rows: vec![time],
            columns: codes,
        };
    }
    let columns = codes.pop().into_iter().collect();
    LayoutSpec {
        rows: codes,
        columns,
    }
}
