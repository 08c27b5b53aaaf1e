use std::path::PathBuf;

use gitlab_copy::{Config, ConfigError, RangeError, RunMode};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn load_full_config_from_fixture() {
    let config = Config::load(&fixture("full.yml")).unwrap();

    assert_eq!(config.source.server_url, "https://gitlab.mydomain.com/api/v4");
    assert_eq!(
        config.destination.server_url,
        "https://gitlab.myotherdomain.com/api/v4"
    );
    assert_eq!(config.source.name, "group/source");
    assert_eq!(config.destination.name, "group/destination");
    assert!(config.source.move_issues);
    assert!(config.source.auto_close_issues);
    assert!(config.source.link_to_target_issue);
    assert_eq!(config.source.link_to_target_issue_text, "Moved to {{Link}}");
    assert_eq!(config.destination.users.len(), 2);
    assert_eq!(
        config.destination.users.get("alice").map(String::as_str),
        Some("alicetoken")
    );
    assert_eq!(config.mode(), RunMode::Issues);

    for iid in [5, 8, 9, 10, 12] {
        assert!(config.source.matches(iid), "{iid} should match");
    }
    for iid in [1, 6, 7, 11, 13] {
        assert!(!config.source.matches(iid), "{iid} should not match");
    }
}

#[test]
fn labels_only_takes_precedence() {
    let config = Config::load(&fixture("labels-only.yml")).unwrap();

    assert_eq!(config.mode(), RunMode::LabelsOnly);
}

#[test]
fn missing_token_is_rejected() {
    let result = Config::load(&fixture("missing-token.yml"));

    assert!(matches!(
        result,
        Err(ConfigError::ValidationError { ref message }) if message.contains("destination")
    ));
}

#[test]
fn reversed_range_is_rejected() {
    let result = Config::load(&fixture("bad-range.yml"));

    assert!(matches!(
        result,
        Err(ConfigError::Range(RangeError::InvalidFormat { ref token, .. })) if token == "10-4"
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let result = Config::load(&fixture("does-not-exist.yml"));

    assert!(matches!(result, Err(ConfigError::IoError { .. })));
}
