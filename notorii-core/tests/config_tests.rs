//! Config error-message, init, and env-override integration tests.

use assert_fs::prelude::*;
use notorii_core::{
    config::{self, Config},
    ConfigError,
};
use predicates::prelude::predicate;
use rstest::rstest;

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".notorii/config.yaml")
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"), "got: {err}");
}

#[test]
fn load_wrong_type_yaml_returns_parse_error() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".notorii/config.yaml")
        .write_str("- this is a list, not a mapping\n")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Init
// ---------------------------------------------------------------------------

#[test]
fn init_writes_default_config() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    config::init_at(home.path(), false).expect("init");

    home.child(".notorii/config.yaml")
        .assert(predicate::str::contains("base_url: https://api.notion.com"));
    home.child(".notorii/config.yaml")
        .assert(predicate::str::contains("token_env: TORII_API_KEY"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut custom = Config::default();
    custom.schedule.interval_secs = 60;
    config::save_at(home.path(), &custom).expect("save");

    let err = config::init_at(home.path(), false).unwrap_err();
    assert!(matches!(err, ConfigError::AlreadyExists { .. }), "got: {err}");
    assert!(err.to_string().contains("--force"));
    assert_eq!(config::load_at(home.path()).unwrap().schedule.interval_secs, 60);

    config::init_at(home.path(), true).expect("forced init");
    assert_eq!(
        config::load_at(home.path()).unwrap().schedule.interval_secs,
        3600
    );
}

// ---------------------------------------------------------------------------
// 3. Env overrides
// ---------------------------------------------------------------------------

#[rstest]
#[case("NOTION_DATABASE_ID", "db-42", "db-42", "http://localhost:9000")]
#[case("TORII_URL", "https://torii.example", "", "https://torii.example")]
#[case("UNRELATED", "x", "", "http://localhost:9000")]
fn env_overrides_apply_per_key(
    #[case] key: &str,
    #[case] value: &str,
    #[case] expected_db: &str,
    #[case] expected_torii: &str,
) {
    let mut config = Config::default();
    config.apply_env_overrides(|k| (k == key).then(|| value.to_string()));
    assert_eq!(config.notion.database_id.unwrap_or_default(), expected_db);
    assert_eq!(config.torii.base_url, expected_torii);
}
