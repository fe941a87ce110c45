use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use custsync_cli::commands::{config, migrate, sync};
use serde_json::Value;
use tempfile::TempDir;

const COMPANY_PAYLOAD: &str = r#"{
    "externalId": "12345",
    "name": "Acme Inc.",
    "companyNumber": "470813-8895",
    "postalAddress": {"street": "123 main st", "city": "Helsingborg", "postalCode": "SE-123 45"},
    "preferredStore": "Nordstan",
    "shoppingLists": [{"name": "weekly", "items": ["lipstick", "blusher"]}]
}"#;

const PERSON_PAYLOAD: &str = r#"{
    "externalId": "12345",
    "name": "Joe Bloggs",
    "bonusPointsBalance": 2233
}"#;

#[test]
fn migrate_succeeds_against_an_in_memory_database() {
    with_env(
        &[("CUSTSYNC_DATABASE_URL", "sqlite::memory:"), ("CUSTSYNC_DATABASE_MAX_CONNECTIONS", "1")],
        || {
            let result = migrate::run();
            assert_eq!(result.exit_code, 0, "expected successful migrate run");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "migrate");
            assert_eq!(payload["status"], "ok");
        },
    );
}

#[test]
fn migrate_reports_config_validation_failures() {
    with_env(&[("CUSTSYNC_DATABASE_URL", "postgres://nope")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn sync_creates_then_updates_the_same_record() {
    let dir = TempDir::new().expect("tempdir");
    let db_url = format!("sqlite://{}/custsync.db?mode=rwc", dir.path().display());
    let file = dir.path().join("customer.json");
    fs::write(&file, COMPANY_PAYLOAD).expect("write payload");

    with_env(
        &[("CUSTSYNC_DATABASE_URL", &db_url), ("CUSTSYNC_DATABASE_MAX_CONNECTIONS", "1")],
        || {
            let first = sync::run(&file);
            assert_eq!(first.exit_code, 0, "first sync should succeed: {}", first.output);
            let payload = parse_payload(&first.output);
            assert_eq!(payload["status"], "ok");
            assert_eq!(payload["details"]["created"], true);
            assert_eq!(payload["details"]["external_id"], "12345");

            let second = sync::run(&file);
            assert_eq!(second.exit_code, 0, "second sync should succeed: {}", second.output);
            let payload = parse_payload(&second.output);
            assert_eq!(payload["details"]["created"], false);
        },
    );
}

#[test]
fn sync_reports_a_conflict_for_a_reclassified_identity() {
    let dir = TempDir::new().expect("tempdir");
    let db_url = format!("sqlite://{}/custsync.db?mode=rwc", dir.path().display());
    let company_file = dir.path().join("company.json");
    let person_file = dir.path().join("person.json");
    fs::write(&company_file, COMPANY_PAYLOAD).expect("write company payload");
    fs::write(&person_file, PERSON_PAYLOAD).expect("write person payload");

    with_env(
        &[("CUSTSYNC_DATABASE_URL", &db_url), ("CUSTSYNC_DATABASE_MAX_CONNECTIONS", "1")],
        || {
            let first = sync::run(&company_file);
            assert_eq!(first.exit_code, 0, "company sync should succeed: {}", first.output);

            let second = sync::run(&person_file);
            assert_eq!(second.exit_code, 7, "expected conflict exit code: {}", second.output);
            let payload = parse_payload(&second.output);
            assert_eq!(payload["status"], "error");
            assert_eq!(payload["error_class"], "conflict");
        },
    );
}

#[test]
fn sync_rejects_an_unparseable_payload() {
    let dir = TempDir::new().expect("tempdir");
    let file = dir.path().join("broken.json");
    fs::write(&file, "{ not json").expect("write payload");

    with_env(&[("CUSTSYNC_DATABASE_URL", "sqlite::memory:")], || {
        let result = sync::run(&file);
        assert_eq!(result.exit_code, 6, "expected input failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "input_parse");
    });
}

#[test]
fn config_attributes_env_overrides() {
    with_env(&[("CUSTSYNC_DATABASE_URL", "sqlite::memory:")], || {
        let output = config::run();
        assert!(output.contains("database.url = sqlite::memory:"));
        assert!(output.contains("env (CUSTSYNC_DATABASE_URL)"));
        assert!(output.contains("logging.level = info (source: default)"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "CUSTSYNC_DATABASE_URL",
        "CUSTSYNC_DATABASE_MAX_CONNECTIONS",
        "CUSTSYNC_DATABASE_TIMEOUT_SECS",
        "CUSTSYNC_LOG_LEVEL",
        "CUSTSYNC_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}
