//! FILENAME: core/selection-engine/src/selection.rs
//! Selection state and the pure reducer that mutates it.
//!
//! The presentation layer turns clicks into `SelectionAction`s; this module
//! never sees UI events. Any interaction with individual items (toggle,
//! range, clear) leaves `All`/`TopN` mode and continues in `Explicit` mode.

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use catalog::log_debug;
use crate::scope::DimensionScope;

/// What is selected for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// These codes of the active scope.
    Explicit(BTreeSet<String>),
    /// Every category of the active scope.
    All,
    /// The `n` categories with the highest index.
    TopN(usize),
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Explicit(BTreeSet::new())
    }
}

impl Selection {
    pub fn explicit<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Explicit(codes.into_iter().map(Into::into).collect())
    }

    /// True for `Explicit(∅)` and the degenerate `TopN(0)`.
    pub fn is_empty(&self) -> bool {
        match self {
            Selection::Explicit(codes) => codes.is_empty(),
            Selection::All => false,
            Selection::TopN(n) => *n == 0,
        }
    }

    pub fn explicit_codes(&self) -> Option<&BTreeSet<String>> {
        match self {
            Selection::Explicit(codes) => Some(codes),
            _ => None,
        }
    }

    fn into_explicit(self) -> BTreeSet<String> {
        match self {
            Selection::Explicit(codes) => codes,
            Selection::All | Selection::TopN(_) => BTreeSet::new(),
        }
    }
}

/// A discrete user operation on one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionAction {
    SelectExplicit(Vec<String>),
    SelectAll,
    SelectTopN(usize),
    Toggle(String),
    /// Inclusive range of display positions.
    SelectRange { from: usize, to: usize },
    Clear,
}

/// Applies `action` to `state` within `scope` and returns the new state.
///
/// Codes unknown to the scope are ignored. `SelectTopN(0)` selects nothing.
/// Range bounds may come in either order and are clamped to the list.
pub fn apply_selection_action(
    state: &Selection,
    action: &SelectionAction,
    scope: &DimensionScope<'_>,
) -> Selection {
    match action {
        SelectionAction::SelectExplicit(codes) => {
            let (known, unknown): (Vec<&String>, Vec<&String>) =
                codes.iter().partition(|c| scope.contains(c));
            if !unknown.is_empty() {
                log_debug!(
                    "SELECTION",
                    "{}: ignoring unknown codes {:?}",
                    scope.code(),
                    unknown
                );
            }
            Selection::Explicit(known.into_iter().cloned().collect())
        }
        SelectionAction::SelectAll => Selection::All,
        SelectionAction::SelectTopN(0) => Selection::default(),
        SelectionAction::SelectTopN(n) => Selection::TopN(*n),
        SelectionAction::Toggle(code) => {
            let mut codes = state.clone().into_explicit();
            if !scope.contains(code) {
                log_debug!("SELECTION", "{}: ignoring unknown code {}", scope.code(), code);
                return Selection::Explicit(codes);
            }
            if !codes.remove(code) {
                codes.insert(code.clone());
            }
            Selection::Explicit(codes)
        }
        SelectionAction::SelectRange { from, to } => {
            let mut codes = state.clone().into_explicit();
            let display = scope.display_codes();
            if display.is_empty() {
                return Selection::Explicit(codes);
            }
            let last = display.len() - 1;
            let (lo, hi) = if from <= to { (*from, *to) } else { (*to, *from) };
            let (lo, hi) = (lo.min(last), hi.min(last));
            codes.extend(display[lo..=hi].iter().map(|c| c.to_string()));
            Selection::Explicit(codes)
        }
        SelectionAction::Clear => Selection::default(),
    }
}
