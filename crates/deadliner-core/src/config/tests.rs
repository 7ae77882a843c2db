use super::*;
use std::io::Write;

#[test]
fn test_reminder_config_default() {
    let rc = ReminderConfig::default();
    assert!(rc.enabled);
    assert_eq!(rc.poll_interval_secs, 15);
    assert_eq!(rc.batch_size, 32);
    assert_eq!(rc.timezone, "America/Adak");
    assert_eq!(rc.language, "Russian");
    assert_eq!(rc.fire_tolerance_secs, 60);
    assert!(rc.clear_handle_on_failure);
    assert!(rc.requeue_interrupted);
    assert_eq!(rc.job_retention_hours, 168);
}

#[test]
fn test_reminder_config_from_toml() {
    let toml_str = r#"
        poll_interval_secs = 5
        timezone = "Europe/Moscow"
        clear_handle_on_failure = false
        job_retention_hours = 24
    "#;
    let rc: ReminderConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(rc.poll_interval_secs, 5);
    assert_eq!(rc.timezone, "Europe/Moscow");
    assert!(!rc.clear_handle_on_failure);
    assert_eq!(rc.job_retention_hours, 24);
    // Unspecified fields keep their defaults.
    assert_eq!(rc.language, "Russian");
    assert!(rc.enabled);
}

#[test]
fn test_empty_config_uses_defaults() {
    let cfg: Config = toml::from_str("").unwrap();
    assert_eq!(cfg.deadliner.log_level, "info");
    assert_eq!(cfg.store.db_path, "~/.deadliner/data/deadliner.db");
    assert!(!cfg.telegram.enabled);
    assert_eq!(cfg.reminders.poll_interval_secs, 15);
}

#[test]
fn test_invalid_timezone_rejected() {
    let rc = ReminderConfig {
        timezone: "Mars/Olympus".to_string(),
        ..Default::default()
    };
    let err = rc.tz().unwrap_err();
    assert!(matches!(err, DeadlinerError::Config(_)));
}

#[test]
fn test_load_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let cfg = load(path.to_str().unwrap()).unwrap();
    assert_eq!(cfg.reminders.timezone, "America/Adak");
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[store]
db_path = "/tmp/deadliner-test.db"

[telegram]
enabled = true
bot_token = "123:abc"

[reminders]
language = "English"
timezone = "UTC"
"#
    )
    .unwrap();
    let cfg = load(file.path().to_str().unwrap()).unwrap();
    assert_eq!(cfg.store.db_path, "/tmp/deadliner-test.db");
    assert!(cfg.telegram.enabled);
    assert_eq!(cfg.telegram.bot_token, "123:abc");
    assert_eq!(cfg.reminders.language, "English");
    assert_eq!(cfg.reminders.tz().unwrap(), chrono_tz::UTC);
}

#[test]
fn test_load_rejects_bad_timezone() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[reminders]\ntimezone = \"Nowhere/Special\"").unwrap();
    assert!(load(file.path().to_str().unwrap()).is_err());
}

#[test]
fn test_load_rejects_malformed_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[reminders\npoll_interval_secs = ").unwrap();
    let err = load(file.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("failed to parse config"));
}

#[test]
fn test_shellexpand_leaves_absolute_paths() {
    assert_eq!(shellexpand("/var/lib/deadliner"), "/var/lib/deadliner");
}
