use std::fs;

use taskal::logging::{init, init_or_report};

#[test]
fn test_unwritable_log_dir_does_not_stop_startup() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the log directory should be
    let blocker = dir.path().join("taskal");
    fs::write(&blocker, b"not a directory").unwrap();

    assert!(init("info", &blocker).is_err());
    assert_eq!(init_or_report("info", &blocker), None);
}
