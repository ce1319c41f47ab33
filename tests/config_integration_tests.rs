//! Integration tests for config loading from fixture files.

use std::fs;
use std::path::Path;

/// Read the sample config file content.
fn read_sample_config() -> String {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    fs::read_to_string(config_path).expect("Failed to read sample config file")
}

fn movie_index_section() -> toml::Value {
    let value: toml::Value = toml::from_str(&read_sample_config()).expect("should parse");
    value
        .get("movie_index")
        .cloned()
        .expect("should have movie_index section")
}

#[test]
fn sample_config_file_exists() {
    let config_path = Path::new("tests/fixtures/sample_config.toml");
    assert!(config_path.exists(), "Sample config file should exist");
}

#[test]
fn sample_config_is_valid_toml() {
    let config_content = read_sample_config();
    let result: Result<toml::Value, _> = toml::from_str(&config_content);
    assert!(result.is_ok(), "Sample config should be valid TOML: {:?}", result.err());
}

#[test]
fn movie_index_section_has_expected_structure() {
    let section = movie_index_section();

    for key in [
        "movies_dir",
        "torrents_dir",
        "output_dir",
        "csv_filename",
        "markdown_filename",
        "skip_hidden",
        "ignore_dirs",
        "log_file",
        "max_depth",
        "verbose",
        "dryrun",
    ] {
        assert!(section.get(key).is_some(), "[movie_index] should have {key}");
    }
}

#[test]
fn config_values_have_correct_types() {
    let section = movie_index_section();

    assert!(section.get("movies_dir").is_some_and(toml::Value::is_str));
    assert!(section.get("csv_filename").is_some_and(toml::Value::is_str));
    assert!(section.get("skip_hidden").is_some_and(toml::Value::is_bool));
    assert!(section.get("verbose").is_some_and(toml::Value::is_bool));
    assert!(section.get("max_depth").is_some_and(toml::Value::is_integer));
    assert!(section.get("ignore_dirs").is_some_and(toml::Value::is_array));
}

#[test]
fn default_output_names_match_sample() {
    let section = movie_index_section();
    assert_eq!(section.get("csv_filename").and_then(toml::Value::as_str), Some("movies.csv"));
    assert_eq!(section.get("markdown_filename").and_then(toml::Value::as_str), Some("MOVIES.md"));
    assert_eq!(
        section.get("max_depth").and_then(toml::Value::as_integer),
        Some(movie_index::bencode::DEFAULT_MAX_DEPTH as i64)
    );
}

