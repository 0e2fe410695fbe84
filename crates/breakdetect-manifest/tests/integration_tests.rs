//! Integration tests for manifest parsing

use breakdetect_components::Gauge;
use breakdetect_manifest::{from_path, from_str, Manifest, ManifestError};
use breakdetect_sim::ExecutionMode;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_complete_manifest() {
    let toml = r#"
        [simulation]
        simulations = 5000
        cycles_per_mttf = 4.0
        start_cycle = 2
        mode = "pooled"
        workers = 6
        seed = 42
        output = "alt-run.csv"

        [analysis]
        tolerance = 0.5

        [[parts]]
        mttf = 15.0
        resistance = 1000.0
        length = 18.0
        gauge = 22
        shape = 0.8
        scale = 1.2
        name = "Kevlar Strand 33"

        [[parts]]
        mttf = 20.0
        resistance = 2200.0
        gauge = "3/0"
    "#;

    let manifest: Manifest = from_str(toml).unwrap();
    assert!(manifest.validate().is_ok());

    assert_eq!(manifest.simulation.simulations, 5000);
    assert_eq!(manifest.simulation.mode, ExecutionMode::Pooled);
    assert_eq!(manifest.simulation.workers, Some(6));
    assert_eq!(manifest.analysis.tolerance, 0.5);
    assert_eq!(manifest.cycle_ceiling(), 80);

    let first = &manifest.parts[0];
    assert_eq!(first.gauge, Some(Gauge::Awg(22)));
    assert_eq!(first.shape, Some(0.8));
    assert_eq!(first.display_name(), "Kevlar Strand 33");

    let second = &manifest.parts[1];
    assert_eq!(second.gauge, Some(Gauge::Aught(3)));
    assert_eq!(second.length, None);
    assert_eq!(second.display_name(), "2200");
}

#[test]
fn test_minimal_manifest_uses_defaults() {
    let toml = r#"
        [[parts]]
        mttf = 15.0
        resistance = 1000.0
    "#;

    let manifest: Manifest = from_str(toml).unwrap();
    assert_eq!(manifest.simulation.simulations, 1000);
    assert_eq!(manifest.simulation.mode, ExecutionMode::Sequential);
    assert_eq!(manifest.simulation.output.to_str(), Some("results.csv"));
    assert_eq!(manifest.analysis.tolerance, 0.0);
    assert_eq!(manifest.cycle_ceiling(), 45);
}

#[test]
fn test_bad_gauge_rejected_at_parse() {
    let toml = r#"
        [[parts]]
        mttf = 15.0
        resistance = 1000.0
        gauge = "fat"
    "#;

    assert!(from_str(toml).is_err());
}

#[test]
fn test_unknown_mode_rejected() {
    let toml = r#"
        [simulation]
        mode = "distributed"
    "#;

    assert!(from_str(toml).is_err());
}

#[test]
fn test_written_default_reloads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("breakdetect.toml");
    let manifest = Manifest::default_network();
    fs::write(&path, manifest.to_toml_string().unwrap()).unwrap();

    let loaded = from_path(&path).unwrap();
    assert_eq!(loaded, manifest);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_part_name_with_comma_fails_validation() {
    let toml = r#"
        [[parts]]
        mttf = 15.0
        resistance = 1000.0
        name = "a,b"

        [[parts]]
        mttf = 15.0
        resistance = 2000.0
        name = "c"
    "#;

    let manifest: Manifest = from_str(toml).unwrap();
    let err = manifest.validate().unwrap_err();
    assert!(matches!(err, ManifestError::Validation(_)));
    assert!(err.to_string().contains("a,b"));
}
