//! End-to-end scans of the bundled fixture.

use std::path::PathBuf;

use flightclues::detect::{DetectorConfig, LeadingAnomalyTable};
use flightclues::{DetectorCategory, RecordSet, ScanEngine};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/flights.json")
}

fn load() -> RecordSet {
    RecordSet::load(fixture()).unwrap()
}

#[test]
fn test_fixture_token() {
    let records = load();
    assert_eq!(records.len(), 9);
    assert_eq!(records.skipped_entries(), 1);

    let analysis = ScanEngine::new().scan(&records);
    assert_eq!(analysis.token.as_str(), "SHADOW");
    assert_eq!(analysis.records_scanned, 9);
    assert_eq!(analysis.unscheduled_records, 1);
}

#[test]
fn test_fixture_provenance() {
    let analysis = ScanEngine::new().scan(&load());
    let ids: Vec<&str> = analysis.findings.iter().map(|f| f.record_id()).collect();
    assert_eq!(ids, vec!["102", "103", "104", "105", "106", "107"]);

    let categories: Vec<DetectorCategory> = analysis
        .findings
        .iter()
        .map(|f| f.rule().category())
        .collect();
    assert_eq!(
        categories,
        vec![
            DetectorCategory::Iata,
            DetectorCategory::Price,
            DetectorCategory::Country,
            DetectorCategory::Duration,
            DetectorCategory::Airline,
            DetectorCategory::Iata,
        ]
    );
    assert_eq!(analysis.findings[0].source_label(), "IATA length > 3 (MEXS)");
}

#[test]
fn test_same_timestamp_uses_category_precedence() {
    let analysis = ScanEngine::new().scan(&load());
    let same_time: Vec<char> = analysis
        .findings
        .iter()
        .filter(|f| f.timestamp_key().to_string() == "2024-03-04 07:30:00")
        .map(|f| f.character())
        .collect();
    assert_eq!(same_time, vec!['D', 'O']);
}

#[test]
fn test_scan_is_deterministic() {
    let engine = ScanEngine::new();
    let first = engine.scan(&load());
    let second = engine.scan(&load());
    assert_eq!(first, second);
}

#[test]
fn test_benign_marker_toggle() {
    let config = DetectorConfig {
        benign_markers_enabled: false,
        ..DetectorConfig::default()
    };
    let analysis = ScanEngine::with_config(config).scan(&load());
    assert_eq!(analysis.token.as_str(), "SHADOWA");
}

#[test]
fn test_custom_leading_anomaly() {
    let mut table = LeadingAnomalyTable::builtin();
    table.insert("Peru", 'P');
    let config = DetectorConfig {
        leading_anomalies: table,
        ..DetectorConfig::default()
    };
    let analysis = ScanEngine::with_config(config).scan(&load());
    assert_eq!(analysis.token.as_str(), "SPHADOW");
}

#[test]
fn test_missing_store_is_fatal() {
    let err = RecordSet::load("/nonexistent/flights_db.json").unwrap_err();
    assert!(err.is_input_missing());
}

#[test]
fn test_malformed_store_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flights_db.json");
    std::fs::write(&path, r#"{"items": []}"#).unwrap();

    let err = RecordSet::load(&path).unwrap_err();
    assert!(matches!(err, flightclues::Error::InputFormat { .. }));
}
