//! Tests for loading and validating rubric JSON documents.

use std::io::Write;

use gavel::rubric::{Phase, Rubric};

const SAMPLE_RUBRIC: &str = r#"{
  "rubric_items": [
    {
      "title": "Is a real project",
      "criteria": "The repository is genuine research work, not a class exercise.",
      "range": { "min": 0, "max": 10 },
      "values": [0, 10],
      "critical": true
    },
    {
      "title": "Abstract",
      "criteria": "The abstract summarizes the question, data, and findings.",
      "range": { "min": 0, "max": 20 },
      "values": [0, 5, 10, 15, 20]
    },
    {
      "title": "Model",
      "criteria": "The model is appropriate for the data and clearly described.",
      "range": { "min": 0, "max": 30 }
    },
    {
      "title": "Citations",
      "criteria": "All data sources and software are cited.",
      "range": { "min": 0, "max": 10 }
    }
  ]
}"#;

#[test]
fn loads_rubric_from_json_document() {
    let rubric = Rubric::from_json_str(SAMPLE_RUBRIC).unwrap();

    assert_eq!(rubric.items().len(), 4);
    assert_eq!(rubric.max_possible(), 70.0);

    let critical = rubric.item("Is a real project").unwrap();
    assert!(critical.critical);
    assert_eq!(critical.values.as_deref(), Some(&[0.0, 10.0][..]));

    // `critical` and `values` both default when absent.
    let model = rubric.item("Model").unwrap();
    assert!(!model.critical);
    assert!(model.values.is_none());
}

#[test]
fn loaded_items_route_to_their_phases() {
    let rubric = Rubric::from_json_str(SAMPLE_RUBRIC).unwrap();

    assert_eq!(rubric.items_in_phase(Phase::Critical).len(), 1);
    assert_eq!(rubric.items_in_phase(Phase::Document).len(), 1);
    assert_eq!(rubric.items_in_phase(Phase::Technical).len(), 1);
    assert_eq!(rubric.items_in_phase(Phase::Remaining).len(), 1);
}

#[test]
fn loads_rubric_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE_RUBRIC.as_bytes()).unwrap();

    let rubric = Rubric::from_path(file.path()).unwrap();
    assert_eq!(rubric.items().len(), 4);
}

#[test]
fn missing_file_is_an_error() {
    assert!(Rubric::from_path(std::path::Path::new("does/not/exist.json")).is_err());
}

#[test]
fn malformed_json_is_an_error() {
    assert!(Rubric::from_json_str("{\"rubric_items\": [").is_err());
    assert!(Rubric::from_json_str("{}").is_err());
    assert!(Rubric::from_json_str("{\"rubric_items\": []}").is_err());
}
