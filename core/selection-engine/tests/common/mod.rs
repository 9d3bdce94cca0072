//! FILENAME: tests/common/mod.rs
//! Fixtures for selection-engine integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use catalog::{CodelistResource, CodelistSource, FetchError};
use selection_engine::{SessionConfig, TableSession};

/// Population table: Region (eliminable, two codelists) x Kon x ContentsCode x Tid.
pub const POPULATION_METADATA: &str = r#"{
    "label": "Population by region, sex and year",
    "id": ["Region", "Kon", "ContentsCode", "Tid"],
    "size": [5, 2, 1, 5],
    "dimension": {
        "Region": {
            "label": "region",
            "category": {
                "index": {"00": 0, "01": 1, "03": 2, "04": 3, "05": 4},
                "label": {
                    "00": "Sweden", "01": "Stockholm county", "03": "Uppsala county",
                    "04": "Sodermanland county", "05": "Ostergotland county"
                }
            },
            "extension": {
                "elimination": true,
                "codelists": [
                    {"id": "agg_RegionLan", "label": "Counties, aggregated"},
                    {"id": "vs_RegionLan", "label": "Counties"}
                ]
            }
        },
        "Kon": {
            "label": "sex",
            "category": {"index": {"1": 0, "2": 1}, "label": {"1": "men", "2": "women"}},
            "extension": {"elimination": false}
        },
        "ContentsCode": {
            "label": "observations",
            "category": {"label": {"BE0101N1": "Population"}}
        },
        "Tid": {
            "label": "year",
            "category": {"index": ["2019", "2020", "2021", "2022", "2023"]},
            "extension": {"codelists": []}
        }
    },
    "extension": {"px": {"heading": ["ContentsCode", "Tid"], "stub": ["Region", "Kon"]}}
}"#;

pub const AGG_REGION_LAN: &str = r#"{
    "id": "agg_RegionLan",
    "label": "Counties, aggregated",
    "elimination": false,
    "values": [
        {"code": "east", "label": "East Middle Sweden", "valueMap": ["03", "04", "05"]},
        {"code": "sthlm", "label": "Stockholm", "valueMap": ["01"]},
        {"label": "broken entry without code", "valueMap": ["00"]}
    ]
}"#;

pub const VS_REGION_LAN: &str = r#"{
    "id": "vs_RegionLan",
    "label": "Counties",
    "elimination": true,
    "values": [
        {"code": "05", "label": "Ostergotland county", "valueMap": ["05"]},
        {"code": "01", "label": "Stockholm county"},
        {"code": "03", "label": "Uppsala county", "valueMap": ["03"]}
    ]
}"#;

/// Serves codelists from in-memory JSON; unknown ids are `NotFound`.
pub struct FixtureSource {
    resources: HashMap<String, String>,
}

impl FixtureSource {
    pub fn new() -> Self {
        let mut resources = HashMap::new();
        resources.insert("agg_RegionLan".to_string(), AGG_REGION_LAN.to_string());
        resources.insert("vs_RegionLan".to_string(), VS_REGION_LAN.to_string());
        FixtureSource { resources }
    }

    pub fn empty() -> Self {
        FixtureSource { resources: HashMap::new() }
    }
}

impl CodelistSource for FixtureSource {
    fn fetch_codelist(&self, id: &str) -> Result<CodelistResource, FetchError> {
        let json = self
            .resources
            .get(id)
            .ok_or_else(|| FetchError::NotFound(id.to_string()))?;
        CodelistResource::from_json_str(json)
    }
}

/// Always fails, as a dropped connection would.
pub struct OfflineSource;

impl CodelistSource for OfflineSource {
    fn fetch_codelist(&self, _id: &str) -> Result<CodelistResource, FetchError> {
        Err(FetchError::Transport("connection reset".to_string()))
    }
}

/// Test harness owning a session over the population table.
pub struct TestHarness {
    pub session: TableSession,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        TestHarness {
            session: TableSession::load_json(POPULATION_METADATA, config)
                .expect("fixture metadata should load"),
        }
    }

    /// Harness with every mandatory dimension already satisfied.
    pub fn with_minimal_valid_selection() -> Self {
        let mut harness = Self::new();
        harness.session.select_all("Kon").unwrap();
        harness.session.select_all("ContentsCode").unwrap();
        harness.session.select_top_n("Tid", 1).unwrap();
        harness
    }
}
