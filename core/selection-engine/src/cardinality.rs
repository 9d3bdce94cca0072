//! FILENAME: core/selection-engine/src/cardinality.rs
//! Cardinality Estimator - how many cells a query would return.
//!
//! Computed from selection state alone, before anything is fetched. The
//! maximum per dimension is always the true category count (codelist
//! `original_codes` when one is active), never a truncated display count.

use serde::{Deserialize, Serialize};
use crate::config::EstimatorConfig;
use crate::scope::DimensionScope;
use crate::selection::Selection;

/// Counts for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionCount {
    pub dimension: String,
    pub selected: u64,
    pub true_max: u64,
    /// Effective elimination flag.
    pub eliminable: bool,
    /// Whether the dimension takes part in the query (and in the products).
    pub included: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardinalityEstimate {
    pub dimensions: Vec<DimensionCount>,
    /// Product of selected counts; 0 when a mandatory dimension selects nothing.
    pub total_selected_cells: u64,
    /// Product of true maxima over the included dimensions.
    pub total_max_cells: u64,
    pub valid: bool,
    pub over_hard_limit: bool,
    pub over_warn_threshold: bool,
}

impl Default for CardinalityEstimate {
    fn default() -> Self {
        CardinalityEstimate {
            dimensions: Vec::new(),
            total_selected_cells: 1,
            total_max_cells: 1,
            valid: true,
            over_hard_limit: false,
            over_warn_threshold: false,
        }
    }
}

impl CardinalityEstimate {
    pub fn dimension(&self, code: &str) -> Option<&DimensionCount> {
        self.dimensions.iter().find(|d| d.dimension == code)
    }

    /// Whether a fetch may be issued on cell-count grounds.
    pub fn allows_fetch(&self) -> bool {
        self.valid && !self.over_hard_limit
    }
}

/// Number of base cells `selection` accounts for in `scope`.
pub fn selected_count(scope: &DimensionScope<'_>, selection: &Selection) -> u64 {
    let max = scope.true_max_count() as u64;
    match selection {
        Selection::All => max,
        Selection::TopN(n) => (*n as u64).min(max),
        Selection::Explicit(codes) => codes.iter().map(|c| scope.weight(c) as u64).sum(),
    }
}

pub fn estimate_cardinality<'a, I>(selections: I, config: &EstimatorConfig) -> CardinalityEstimate
where
    I: IntoIterator<Item = (DimensionScope<'a>, &'a Selection)>,
{
    let mut dimensions = Vec::new();
    let mut total_selected: u64 = 1;
    let mut total_max: u64 = 1;
    let mut valid = true;

    for (scope, selection) in selections {
        let selected = selected_count(&scope, selection);
        let true_max = scope.true_max_count() as u64;
        let eliminable = scope.eliminable();
        let included = selected > 0 || !eliminable;

        if included {
            if selected == 0 {
                valid = false;
            }
            total_selected = total_selected.saturating_mul(selected);
            total_max = total_max.saturating_mul(true_max);
        }

        dimensions.push(DimensionCount {
            dimension: scope.code().to_string(),
            selected,
            true_max,
            eliminable,
            included,
        });
    }

    if !valid {
        total_selected = 0;
    }

    CardinalityEstimate {
        dimensions,
        total_selected_cells: total_selected,
        total_max_cells: total_max,
        valid,
        over_hard_limit: valid && total_selected > config.hard_limit,
        over_warn_threshold: valid && total_selected > config.warn_threshold,
    }
}
