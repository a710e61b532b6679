use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use taskal::calendar::WeekStart;
use taskal::config::{config_path, Config};
use taskal::error::Error;
use taskal::models::DEFAULT_CATEGORY;

// Tests share the TASKAL_CONFIG variable, so they run one at a time
static TEST_MUTEX: Mutex<()> = Mutex::new(());

fn with_config_file<F>(contents: Option<&str>, f: F)
where
    F: FnOnce(PathBuf),
{
    let _guard = TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    if let Some(c) = contents {
        fs::write(&path, c).unwrap();
    }

    env::set_var("TASKAL_CONFIG", &path);
    f(path);
    env::remove_var("TASKAL_CONFIG");
}

#[test]
fn test_missing_file_gives_defaults() {
    with_config_file(None, |path| {
        assert_eq!(config_path(), path);
        let config = Config::load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_category, DEFAULT_CATEGORY);
        assert_eq!(config.week_start, WeekStart::Sunday);
        assert!(config.notifications);
    });
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    with_config_file(Some(r#"{ "week_start": "monday", "notifications": false }"#), |_| {
        let config = Config::load().unwrap();
        assert_eq!(config.week_start, WeekStart::Monday);
        assert!(!config.notifications);
        assert_eq!(config.log_level, "info");
        assert!(config.categories.contains(&DEFAULT_CATEGORY.to_string()));
    });
}

#[test]
fn test_log_dir_override() {
    with_config_file(Some(r#"{ "log_dir": "/tmp/taskal-logs" }"#), |_| {
        let config = Config::load().unwrap();
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/taskal-logs"));
    });
}

#[test]
fn test_malformed_file_is_an_error() {
    with_config_file(Some("{ not json"), |path| {
        match Config::load() {
            Err(Error::ConfigParse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected a parse error, got {:?}", other),
        }
    });
}
