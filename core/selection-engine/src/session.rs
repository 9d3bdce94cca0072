//! FILENAME: core/selection-engine/src/session.rs
//! TableSession - the owned context for one loaded table.
//!
//! Holds the catalog, one selection per dimension, the active codelists and
//! the in-flight codelist fetches. Every mutation goes through the session
//! and is followed by a synchronous recomputation of the derived query,
//! validation issues and cardinality estimate, so readers always see values
//! consistent with the current state.
//!
//! Codelist switching is split into `begin_codelist_switch` and
//! `complete_codelist_switch` so that a host can await the fetch in between.
//! While a switch is pending the dimension refuses a second one.

use rustc_hash::FxHashMap;
use catalog::{
    resolve_codelist, sort_codelist_refs, Catalog, CatalogError, CodelistResource,
    CodelistSource, FetchError, ResolvedCodelist, TableMetadata,
};
use catalog::{log_debug, log_enter, log_exit, log_info, log_warn};
use crate::cardinality::{estimate_cardinality, CardinalityEstimate};
use crate::config::SessionConfig;
use crate::error::{SelectionError, ValidationIssue};
use crate::query::{build_query, validate_query, Query};
use crate::scope::DimensionScope;
use crate::selection::{apply_selection_action, Selection, SelectionAction};

/// Values derived from the session state, recomputed after each mutation.
#[derive(Debug, Clone, Default)]
struct Derived {
    query: Query,
    issues: Vec<ValidationIssue>,
    estimate: CardinalityEstimate,
}

#[derive(Debug)]
pub struct TableSession {
    catalog: Catalog,
    config: SessionConfig,
    selections: FxHashMap<String, Selection>,
    codelists: FxHashMap<String, ResolvedCodelist>,
    /// Dimension code -> codelist id being fetched.
    pending: FxHashMap<String, String>,
    generation: u64,
    derived: Derived,
}

impl TableSession {
    pub fn new(catalog: Catalog, config: SessionConfig) -> Self {
        let mut session = TableSession {
            catalog: Catalog::default(),
            config,
            selections: FxHashMap::default(),
            codelists: FxHashMap::default(),
            pending: FxHashMap::default(),
            generation: 0,
            derived: Derived::default(),
        };
        session.reset_table(catalog);
        session
    }

    pub fn load(meta: &TableMetadata, config: SessionConfig) -> Result<Self, SelectionError> {
        config.validate()?;
        let catalog = Catalog::from_metadata(meta)?;
        Ok(Self::new(catalog, config))
    }

    pub fn load_json(json: &str, config: SessionConfig) -> Result<Self, SelectionError> {
        let meta = TableMetadata::from_json_str(json)?;
        Self::load(&meta, config)
    }

    /// Replaces the table. All selections, codelists and pending fetches are
    /// discarded.
    pub fn reset_table(&mut self, mut catalog: Catalog) {
        if self.config.time_newest_first {
            catalog.reverse_time_display();
        }
        self.selections = catalog
            .codes()
            .iter()
            .map(|code| (code.clone(), Selection::default()))
            .collect();
        self.codelists.clear();
        self.pending.clear();
        self.catalog = catalog;
        log_info!(
            "SELECTION",
            "session reset: {} dimensions",
            self.catalog.len()
        );
        self.refresh();
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn selection(&self, dimension: &str) -> Option<&Selection> {
        self.selections.get(dimension)
    }

    pub fn active_codelist(&self, dimension: &str) -> Option<&ResolvedCodelist> {
        self.codelists.get(dimension)
    }

    pub fn is_pending(&self, dimension: &str) -> bool {
        self.pending.contains_key(dimension)
    }

    /// Incremented by every mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn scope(&self, dimension: &str) -> Result<DimensionScope<'_>, SelectionError> {
        let dim = self.catalog.require(dimension)?;
        Ok(DimensionScope::new(dim, self.codelists.get(dimension)))
    }

    /// Scopes of all dimensions in storage order.
    pub fn scopes(&self) -> impl Iterator<Item = DimensionScope<'_>> + '_ {
        self.catalog
            .dimensions()
            .map(move |dim| DimensionScope::new(dim, self.codelists.get(&dim.code)))
    }

    /// Scope and selection of all dimensions in storage order.
    pub fn scoped_selections(&self) -> impl Iterator<Item = (DimensionScope<'_>, &Selection)> + '_ {
        self.scopes().filter_map(move |scope| {
            self.selections
                .get(scope.code())
                .map(|selection| (scope, selection))
        })
    }

    pub fn query(&self) -> &Query {
        &self.derived.query
    }

    pub fn validation_issues(&self) -> &[ValidationIssue] {
        &self.derived.issues
    }

    pub fn estimate(&self) -> &CardinalityEstimate {
        &self.derived.estimate
    }

    pub fn is_valid(&self) -> bool {
        self.derived.issues.is_empty() && self.derived.estimate.allows_fetch()
    }

    /// The query to send, or why it must not be sent.
    pub fn fetch_gate(&self) -> Result<Query, SelectionError> {
        log_enter!("QUERY", "fetch_gate", "generation={}", self.generation);

        if !self.derived.issues.is_empty() {
            log_exit!("QUERY", "fetch_gate", "invalid: {} issues", self.derived.issues.len());
            return Err(SelectionError::Validation(self.derived.issues.clone()));
        }
        let estimate = &self.derived.estimate;
        if estimate.over_hard_limit {
            log_exit!("QUERY", "fetch_gate", "over limit: {}", estimate.total_selected_cells);
            return Err(SelectionError::OverHardLimit {
                cells: estimate.total_selected_cells,
                limit: self.config.estimator.hard_limit,
            });
        }

        log_exit!("QUERY", "fetch_gate", "ok: {} cells", estimate.total_selected_cells);
        Ok(self.derived.query.clone())
    }

    // ========================================================================
    // SELECTION MUTATIONS
    // ========================================================================

    pub fn apply(&mut self, dimension: &str, action: &SelectionAction) -> Result<(), SelectionError> {
        let next = {
            let scope = self.scope(dimension)?;
            let current = self
                .selections
                .get(dimension)
                .cloned()
                .unwrap_or_default();
            apply_selection_action(&current, action, &scope)
        };
        log_debug!("SELECTION", "{} {:?} -> {:?}", dimension, action, next);
        self.selections.insert(dimension.to_string(), next);
        self.refresh();
        Ok(())
    }

    pub fn select_explicit<I, S>(&mut self, dimension: &str, codes: I) -> Result<(), SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes = codes.into_iter().map(Into::into).collect();
        self.apply(dimension, &SelectionAction::SelectExplicit(codes))
    }

    pub fn select_all(&mut self, dimension: &str) -> Result<(), SelectionError> {
        self.apply(dimension, &SelectionAction::SelectAll)
    }

    pub fn select_top_n(&mut self, dimension: &str, n: usize) -> Result<(), SelectionError> {
        self.apply(dimension, &SelectionAction::SelectTopN(n))
    }

    pub fn toggle(&mut self, dimension: &str, code: &str) -> Result<(), SelectionError> {
        self.apply(dimension, &SelectionAction::Toggle(code.to_string()))
    }

    pub fn select_range(&mut self, dimension: &str, from: usize, to: usize) -> Result<(), SelectionError> {
        self.apply(dimension, &SelectionAction::SelectRange { from, to })
    }

    pub fn clear(&mut self, dimension: &str) -> Result<(), SelectionError> {
        self.apply(dimension, &SelectionAction::Clear)
    }

    // ========================================================================
    // CODELISTS
    // ========================================================================

    /// Marks `dimension` as fetching codelist `codelist_id`.
    pub fn begin_codelist_switch(
        &mut self,
        dimension: &str,
        codelist_id: &str,
    ) -> Result<(), SelectionError> {
        let dim = self.catalog.require(dimension)?;
        if !dim.has_codelist(codelist_id) {
            return Err(CatalogError::UnknownCodelist {
                dimension: dimension.to_string(),
                codelist: codelist_id.to_string(),
            }
            .into());
        }
        if self.pending.contains_key(dimension) {
            return Err(SelectionError::CodelistPending(dimension.to_string()));
        }

        self.pending.insert(dimension.to_string(), codelist_id.to_string());
        log_debug!("CODELIST", "{}: fetching {}", dimension, codelist_id);
        Ok(())
    }

    /// Applies the outcome of a fetch started with `begin_codelist_switch`.
    ///
    /// On success the codelist becomes active and the selection resets to
    /// `Explicit(∅)`. On failure the dimension falls back to its base
    /// categories and original elimination flag; the selection is reset only
    /// if it referred to a previously active codelist. Other dimensions are
    /// never touched.
    pub fn complete_codelist_switch(
        &mut self,
        dimension: &str,
        result: Result<CodelistResource, FetchError>,
    ) -> Result<(), SelectionError> {
        let codelist_id = self
            .pending
            .remove(dimension)
            .ok_or_else(|| SelectionError::NoPendingCodelist(dimension.to_string()))?;

        match result {
            Ok(resource) => {
                let dim = self.catalog.require(dimension)?;
                let resolved = resolve_codelist(dim, resource);
                if resolved.skipped_entries > 0 {
                    log_warn!(
                        "CODELIST",
                        "{}: {} malformed entries skipped in {}",
                        dimension,
                        resolved.skipped_entries,
                        resolved.id
                    );
                }
                log_info!(
                    "CODELIST",
                    "{}: activated {} ({} entries)",
                    dimension,
                    resolved.id,
                    resolved.len()
                );
                self.codelists.insert(dimension.to_string(), resolved);
                self.selections.insert(dimension.to_string(), Selection::default());
                self.refresh();
                Ok(())
            }
            Err(source) => {
                log_warn!(
                    "CODELIST",
                    "{}: failed to resolve {}: {}",
                    dimension,
                    codelist_id,
                    source
                );
                if self.codelists.remove(dimension).is_some() {
                    self.selections.insert(dimension.to_string(), Selection::default());
                }
                self.refresh();
                Err(SelectionError::CodelistResolution {
                    dimension: dimension.to_string(),
                    codelist: codelist_id,
                    source,
                })
            }
        }
    }

    /// Fetches and activates a codelist in one step.
    pub fn switch_codelist(
        &mut self,
        dimension: &str,
        codelist_id: &str,
        source: &dyn CodelistSource,
    ) -> Result<(), SelectionError> {
        self.begin_codelist_switch(dimension, codelist_id)?;
        let result = source.fetch_codelist(codelist_id);
        self.complete_codelist_switch(dimension, result)
    }

    /// Returns `dimension` to its base categories.
    pub fn clear_codelist(&mut self, dimension: &str) -> Result<(), SelectionError> {
        self.catalog.require(dimension)?;
        if self.pending.contains_key(dimension) {
            return Err(SelectionError::CodelistPending(dimension.to_string()));
        }
        if self.codelists.remove(dimension).is_some() {
            self.selections.insert(dimension.to_string(), Selection::default());
            self.refresh();
        }
        Ok(())
    }

    /// For every dimension with codelists, orders the base categories like
    /// the first codelist (in presentation order) groups them. Failures are
    /// returned and leave that dimension's display order unchanged.
    pub fn preload_first_codelist_ordering(
        &mut self,
        source: &dyn CodelistSource,
    ) -> Vec<SelectionError> {
        let targets: Vec<(String, String)> = self
            .catalog
            .dimensions()
            .filter_map(|dim| {
                let mut refs = dim.codelists.clone();
                sort_codelist_refs(&mut refs);
                refs.into_iter().next().map(|first| (dim.code.clone(), first.id))
            })
            .collect();

        let mut failures = Vec::new();
        for (dimension, codelist_id) in targets {
            let resource = match source.fetch_codelist(&codelist_id) {
                Ok(resource) => resource,
                Err(err) => {
                    log_warn!("CODELIST", "{}: preload of {} failed: {}", dimension, codelist_id, err);
                    failures.push(SelectionError::CodelistResolution {
                        dimension,
                        codelist: codelist_id,
                        source: err,
                    });
                    continue;
                }
            };
            let resolved = match self.catalog.dimension(&dimension) {
                Some(dim) => resolve_codelist(dim, resource),
                None => continue,
            };
            if let Err(e) = self.catalog.preload_ordering(&dimension, &resolved) {
                failures.push(e.into());
            }
        }

        self.refresh();
        failures
    }

    // ========================================================================
    // DERIVED VALUES
    // ========================================================================

    fn refresh(&mut self) {
        let chronological = self.config.sort_time_chronologically;
        let query = build_query(self.scoped_selections(), chronological);
        let issues = validate_query(&query, self.scopes());
        let estimate = estimate_cardinality(self.scoped_selections(), &self.config.estimator);

        self.generation += 1;
        self.derived = Derived { query, issues, estimate };
    }
}
