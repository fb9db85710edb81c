//! Multi-level fetch behavior: concurrency fan-out, null semantics, the
//! NL00/NL01 national fallback, and error degradation.

mod common;

use std::sync::Arc;

use common::{amsterdam_full, amsterdam_municipality_only, row_for, status_error, ScriptedOdata};
use wijkdata::{DataSource, SourceClient};

const BASE: &str = "https://dataderden.cbs.nl/ODataApi/odata/47018NED/TypedDataSet";

fn safety_client(fetcher: Arc<ScriptedOdata>) -> SourceClient {
    SourceClient::for_dataset(DataSource::Safety, "47018NED", BASE, fetcher)
}

#[tokio::test]
async fn empty_levels_come_back_as_none() {
    // District has no rows; everything else answers.
    let fetcher = Arc::new(ScriptedOdata::new(|_, code, _| {
        if code.starts_with("WK") {
            Ok(vec![])
        } else {
            Ok(vec![row_for(code)])
        }
    }));
    let client = safety_client(Arc::clone(&fetcher));

    let response = client.fetch_multi_level(&amsterdam_full(), "2023JJ00").await;

    assert!(response.district.is_none());
    let municipality = response.municipality.expect("municipality row present");
    assert_eq!(municipality.level.code, "GM0363");
    assert_eq!(municipality.level.name, "Amsterdam");
    assert!(response.national.is_some());
    assert!(response.neighborhood.is_some());
}

#[tokio::test]
async fn absent_codes_are_skipped_without_network_calls() {
    let fetcher = Arc::new(ScriptedOdata::always_one_row());
    let client = safety_client(Arc::clone(&fetcher));

    let response = client
        .fetch_multi_level(&amsterdam_municipality_only(), "2023JJ00")
        .await;

    assert!(response.district.is_none());
    assert!(response.neighborhood.is_none());
    let codes: Vec<String> = fetcher.calls().into_iter().map(|c| c.code).collect();
    assert_eq!(codes.len(), 2);
    assert!(codes.contains(&"NL00".to_string()));
    assert!(codes.contains(&"GM0363".to_string()));
}

#[tokio::test]
async fn health_national_falls_back_to_nl01() {
    let fetcher = Arc::new(ScriptedOdata::new(|_, code, _| match code {
        "NL00" => Ok(vec![]),
        other => Ok(vec![row_for(other)]),
    }));
    let client = SourceClient::for_dataset(
        DataSource::Health,
        "50120NED",
        "https://dataderden.cbs.nl/ODataApi/odata/50120NED/TypedDataSet",
        fetcher.clone(),
    );

    let response = client.fetch_multi_level(&amsterdam_full(), "2022JJ00").await;

    let national = response.national.expect("fallback row present");
    assert_eq!(national.level.code, "NL01");

    let codes: Vec<String> = fetcher.calls().into_iter().map(|c| c.code).collect();
    assert!(codes.contains(&"NL00".to_string()), "NL00 tried first");
    assert!(codes.contains(&"NL01".to_string()), "NL01 tried second");
}

#[tokio::test]
async fn non_health_sources_never_try_nl01() {
    let fetcher = Arc::new(ScriptedOdata::new(|_, code, _| {
        if code == "NL00" {
            Ok(vec![])
        } else {
            Ok(vec![row_for(code)])
        }
    }));
    let client = safety_client(Arc::clone(&fetcher));

    let response = client.fetch_multi_level(&amsterdam_full(), "2023JJ00").await;

    assert!(response.national.is_none());
    let codes: Vec<String> = fetcher.calls().into_iter().map(|c| c.code).collect();
    assert!(!codes.contains(&"NL01".to_string()));
}

#[tokio::test]
async fn failed_level_degrades_without_aborting_siblings() {
    let fetcher = Arc::new(ScriptedOdata::new(|_, code, _| {
        if code.starts_with("BU") {
            Err(status_error())
        } else {
            Ok(vec![row_for(code)])
        }
    }));
    let client = safety_client(Arc::clone(&fetcher));

    let response = client.fetch_multi_level(&amsterdam_full(), "2023JJ00").await;

    // The failing neighborhood lookup is indistinguishable from "no data".
    assert!(response.neighborhood.is_none());
    assert!(response.national.is_some());
    assert!(response.municipality.is_some());
    assert!(response.district.is_some());
}

#[tokio::test]
async fn fetch_by_code_takes_first_row_and_swallows_errors() {
    let fetcher = Arc::new(ScriptedOdata::new(|_, code, _| match code {
        "GM0363" => Ok(vec![row_for("first"), row_for("second")]),
        _ => Err(status_error()),
    }));
    let client = safety_client(Arc::clone(&fetcher));

    let row = client.fetch_by_code("GM0363", "2023JJ00").await;
    assert_eq!(row["WijkenEnBuurten"], "first");

    let failed = client.fetch_by_code("GM9999", "2023JJ00").await;
    assert!(failed.is_empty());
}
