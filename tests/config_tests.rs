use rfichaje::config::Config;
use rfichaje::config::migrate::{migrate_config_file, missing_keys};
use std::env;
use std::fs;
use std::path::PathBuf;

fn temp_conf(name: &str, content: &str) -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("{}_rfichaje.conf", name));
    fs::write(&path, content).expect("write temp config");
    path
}

#[test]
fn test_old_config_gets_defaults() {
    let path = temp_conf("cfg_old", "database: /tmp/old.sqlite\n");

    let missing = missing_keys(&path).expect("missing keys");
    assert_eq!(
        missing,
        vec!["utc_offset", "action_window_minutes", "clock_in_eligibility_minutes"]
    );

    assert!(migrate_config_file(&path).expect("migrate"));
    assert!(!migrate_config_file(&path).expect("second migrate"));

    let cfg: Config =
        serde_yaml::from_str(&fs::read_to_string(&path).expect("read")).expect("parse");
    assert_eq!(cfg.database, "/tmp/old.sqlite");
    assert_eq!(cfg.action_window_minutes, 30);
    assert_eq!(cfg.clock_in_eligibility_minutes, 15);
    assert_eq!(cfg.utc_offset, "+01:00");

    fs::remove_file(&path).ok();
}

#[test]
fn test_offset_parsing() {
    let mut cfg: Config = serde_yaml::from_str("database: x.sqlite\nutc_offset: \"-03:00\"\n")
        .expect("parse");
    assert_eq!(cfg.offset().expect("offset").local_minus_utc(), -3 * 3600);

    cfg.utc_offset = "Madrid".into();
    assert!(cfg.offset().is_err());
}
