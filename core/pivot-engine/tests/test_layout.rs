//! FILENAME: tests/test_layout.rs
//! Integration tests: fetched cube + catalog axes under interactive layouts.

mod common;

use std::collections::BTreeMap;
use common::CubeFixture;
use pivot_engine::{calculate_view, CubeAxes, CubeLayout, LayoutError, LayoutPreset, LayoutSpec};

#[test]
fn test_display_hint_layout() {
    let fx = CubeFixture::new();
    let spec = LayoutSpec::from_display_hint(fx.catalog.display_hint(), fx.cube.dimensions())
        .expect("hint fits the cube");
    let view = calculate_view(&fx.cube, &fx.axes, &spec).unwrap();

    assert_eq!(view.row_dimensions, vec!["Region", "Kon"]);
    assert_eq!(view.row_count, 4);
    assert_eq!(view.col_count, 2);
    assert_eq!(view.rows[0].labels, vec!["Stockholm county", "men"]);
    assert_eq!(view.column_headers[0][1].code, "2023");

    // Uppsala county, women
    assert_eq!(view.get_cell(3, 0), None);
    assert_eq!(view.get_cell(3, 1), Some(211.0));
}

#[test]
fn test_default_preset_puts_time_in_rows() {
    let fx = CubeFixture::new();
    let spec = LayoutPreset::Default.apply(&LayoutSpec::default(), fx.cube.dimensions());
    assert_eq!(spec, LayoutSpec::new(["Tid"], ["Region", "Kon"]));

    let view = calculate_view(&fx.cube, &fx.axes, &spec).unwrap();
    assert_eq!(view.row_count, 2);
    assert_eq!(view.col_count, 4);
    let spans: Vec<usize> = view.column_headers[0].iter().map(|h| h.span).collect();
    assert_eq!(spans, vec![2, 2]);
    assert_eq!(view.get_cell(0, 0), Some(100.0));
    assert_eq!(view.get_cell(1, 3), Some(211.0));
}

#[test]
fn test_interactive_pivoting_never_touches_the_cube() {
    let fx = CubeFixture::new();
    let before = fx.cube.clone();
    let mut layout =
        CubeLayout::new(&fx.cube, &fx.axes, LayoutSpec::new(["Region", "Kon"], ["Tid"])).unwrap();

    layout.move_to_columns("Kon", Some(0)).unwrap();
    assert_eq!(layout.spec(), &LayoutSpec::new(["Region"], ["Kon", "Tid"]));
    // Uppsala county, men, 2023
    assert_eq!(layout.value(1, 1), Some(201.0));

    layout.apply_preset(LayoutPreset::Transpose).unwrap();
    assert_eq!(layout.value(1, 1), Some(201.0));
    layout.transpose();
    assert_eq!(layout.spec(), &LayoutSpec::new(["Region"], ["Kon", "Tid"]));

    assert!(matches!(
        layout.move_to_rows("ContentsCode", None),
        Err(LayoutError::UnknownDimension(_))
    ));
    assert_eq!(layout.cube(), &before);
}

#[test]
fn test_axes_must_match_fetched_shape() {
    let fx = CubeFixture::new();
    let err = CubeAxes::from_catalog(&fx.catalog, &fx.cube, &BTreeMap::new()).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::AxisMismatch { expected: 2, actual: 3, .. }
    ));
}
