//! FILENAME: tests/test_codelists.rs
//! Integration tests for codelist switching, fallback and preloading.

mod common;

use catalog::{CodelistKind, FetchError};
use common::{FixtureSource, OfflineSource, TestHarness};
use selection_engine::{QueryValue, Selection, SelectionError};

fn codes(values: &[&str]) -> QueryValue {
    QueryValue::Codes(values.iter().map(|s| s.to_string()).collect())
}

// ============================================================================
// AGGREGATION CODELISTS
// ============================================================================

#[test]
fn test_aggregation_entries_expand_to_base_codes() {
    let mut harness = TestHarness::with_minimal_valid_selection();
    let session = &mut harness.session;
    session
        .switch_codelist("Region", "agg_RegionLan", &FixtureSource::new())
        .unwrap();

    let codelist = session.active_codelist("Region").unwrap();
    assert_eq!(codelist.kind, CodelistKind::Aggregation);
    assert_eq!(codelist.skipped_entries, 1);
    assert_eq!(codelist.original_codes, vec!["01", "03", "04", "05"]);

    session.select_explicit("Region", ["east"]).unwrap();
    assert_eq!(session.query().get("Region"), Some(&codes(&["03", "04", "05"])));
    assert_eq!(session.query().entries()[0].codelist, None);
    assert_eq!(session.estimate().total_selected_cells, 6);

    session.select_all("Region").unwrap();
    assert_eq!(
        session.query().get("Region"),
        Some(&codes(&["01", "03", "04", "05"]))
    );
    assert_eq!(session.estimate().total_selected_cells, 8);
}

#[test]
fn test_switch_resets_selection() {
    let mut harness = TestHarness::with_minimal_valid_selection();
    let session = &mut harness.session;
    session.select_explicit("Region", ["01", "03"]).unwrap();
    session
        .switch_codelist("Region", "agg_RegionLan", &FixtureSource::new())
        .unwrap();
    assert_eq!(session.selection("Region"), Some(&Selection::default()));
    assert!(!session.query().contains("Region"));
}

// ============================================================================
// FILTER CODELISTS
// ============================================================================

#[test]
fn test_filter_codelist_is_named_and_idempotent() {
    let mut harness = TestHarness::with_minimal_valid_selection();
    let session = &mut harness.session;
    session
        .switch_codelist("Region", "vs_RegionLan", &FixtureSource::new())
        .unwrap();
    assert_eq!(
        session.active_codelist("Region").unwrap().kind,
        CodelistKind::Filter
    );

    session.select_explicit("Region", ["01", "05"]).unwrap();
    let entry = &session.query().entries()[0];
    assert_eq!(entry.dimension, "Region");
    // Entry order of the codelist
    assert_eq!(entry.value, codes(&["05", "01"]));
    assert_eq!(entry.codelist.as_deref(), Some("vs_RegionLan"));
}

// ============================================================================
// FAILURE FALLBACK
// ============================================================================

#[test]
fn test_failed_fetch_falls_back_to_base_categories() {
    let mut harness = TestHarness::with_minimal_valid_selection();
    let session = &mut harness.session;
    session
        .switch_codelist("Region", "agg_RegionLan", &FixtureSource::new())
        .unwrap();
    session.select_explicit("Region", ["sthlm"]).unwrap();
    let kon_before = session.selection("Kon").cloned();

    let err = session
        .switch_codelist("Region", "vs_RegionLan", &OfflineSource)
        .unwrap_err();
    match err {
        SelectionError::CodelistResolution { dimension, codelist, source } => {
            assert_eq!(dimension, "Region");
            assert_eq!(codelist, "vs_RegionLan");
            assert!(matches!(source, FetchError::Transport(_)));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(session.active_codelist("Region").is_none());
    assert!(!session.is_pending("Region"));
    assert_eq!(session.selection("Region"), Some(&Selection::default()));
    assert_eq!(session.selection("Kon").cloned(), kon_before);
    assert_eq!(session.scope("Region").unwrap().true_max_count(), 5);
    assert!(session.fetch_gate().is_ok());
}

#[test]
fn test_missing_codelist_resource() {
    let mut harness = TestHarness::new();
    let err = harness
        .session
        .switch_codelist("Region", "vs_RegionLan", &FixtureSource::empty())
        .unwrap_err();
    assert!(err.to_string().contains("vs_RegionLan"));
}

#[test]
fn test_split_switch_lets_host_await_the_fetch() {
    let mut harness = TestHarness::with_minimal_valid_selection();
    let session = &mut harness.session;
    session.begin_codelist_switch("Region", "vs_RegionLan").unwrap();
    assert!(matches!(
        session.clear_codelist("Region"),
        Err(SelectionError::CodelistPending(_))
    ));

    // Other dimensions stay editable while the fetch is in flight
    session.select_all("Tid").unwrap();

    let resource = catalog::CodelistResource::from_json_str(common::VS_REGION_LAN).unwrap();
    session.complete_codelist_switch("Region", Ok(resource)).unwrap();
    assert_eq!(session.selection("Tid"), Some(&Selection::All));
    assert!(session.active_codelist("Region").is_some());
}

// ============================================================================
// PRELOADED ORDERING
// ============================================================================

#[test]
fn test_preload_orders_by_first_codelist() {
    let mut harness = TestHarness::new();
    let failures = harness
        .session
        .preload_first_codelist_ordering(&FixtureSource::new());
    assert!(failures.is_empty());

    // vs_ lists sort before agg_ lists
    let display = harness.session.scope("Region").unwrap().display_codes();
    assert_eq!(display, vec!["05", "01", "03", "00", "04"]);
    assert!(harness.session.active_codelist("Region").is_none());
}

#[test]
fn test_preload_failure_keeps_original_order() {
    let mut harness = TestHarness::new();
    let failures = harness.session.preload_first_codelist_ordering(&OfflineSource);
    assert_eq!(failures.len(), 1);

    let display = harness.session.scope("Region").unwrap().display_codes();
    assert_eq!(display, vec!["00", "01", "03", "04", "05"]);
}
