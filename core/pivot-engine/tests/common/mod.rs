//! FILENAME: tests/common/mod.rs
//! Fixtures for pivot-engine integration tests.

#![allow(dead_code)]

use catalog::{Catalog, TableMetadata};
use pivot_engine::{CubeAxes, CubeInput, DataCube};

/// Metadata of the table the cube fixture was fetched from.
pub const POPULATION_METADATA: &str = r#"{
    "label": "Population by region, sex and year",
    "id": ["Region", "Kon", "Tid"],
    "size": [3, 2, 3],
    "dimension": {
        "Region": {
            "label": "region",
            "category": {
                "index": {"00": 0, "01": 1, "03": 2},
                "label": {"00": "Sweden", "01": "Stockholm county", "03": "Uppsala county"}
            },
            "extension": {"elimination": true}
        },
        "Kon": {
            "label": "sex",
            "category": {"index": ["1", "2"], "label": {"1": "men", "2": "women"}}
        },
        "Tid": {
            "label": "year",
            "category": {"index": ["2021", "2022", "2023"]}
        }
    },
    "extension": {"px": {"heading": ["Tid"], "stub": ["Region", "Kon"]}}
}"#;

/// Result of querying Region=[01,03], Kon=*, Tid=top(2).
pub const POPULATION_CUBE: &str = r#"{
    "label": "Population by region, sex and year",
    "id": ["Region", "Kon", "Tid"],
    "size": [2, 2, 2],
    "value": [100, 101, 110, 111, 200, 201, null, 211]
}"#;

pub struct CubeFixture {
    pub catalog: Catalog,
    pub cube: DataCube,
    pub axes: CubeAxes,
}

impl CubeFixture {
    pub fn new() -> Self {
        let meta = TableMetadata::from_json_str(POPULATION_METADATA).expect("metadata");
        let catalog = Catalog::from_metadata(&meta).expect("catalog");
        let input = CubeInput::from_json_str(POPULATION_CUBE).expect("cube input");
        let cube = DataCube::from_input(&input).expect("cube");

        let mut selected = std::collections::BTreeMap::new();
        selected.insert("Region".to_string(), vec!["01".to_string(), "03".to_string()]);
        selected.insert("Tid".to_string(), vec!["2022".to_string(), "2023".to_string()]);
        let axes = CubeAxes::from_catalog(&catalog, &cube, &selected).expect("axes");

        CubeFixture { catalog, cube, axes }
    }
}
