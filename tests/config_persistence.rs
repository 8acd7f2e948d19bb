mod common;

use std::collections::BTreeMap;
use std::fs;

use common::temp_dir;
use w3_intake::{
    config::{ConfigManager, IntakeConfig},
    errors::IntakeError,
    profiles,
};

#[test]
fn missing_file_yields_defaults() {
    let manager = ConfigManager::with_base_dir(temp_dir());
    let config = manager.load().unwrap();
    assert_eq!(config, IntakeConfig::default());
    assert_eq!(config.profile, profiles::DEFAULT_PROFILE);
    assert_eq!(config.timeout().as_secs(), 20);
}

#[test]
fn saved_config_loads_back() {
    let base = temp_dir().join("nested");
    let manager = ConfigManager::with_base_dir(base.clone());
    let config = IntakeConfig {
        profile: "discovery".into(),
        endpoint: Some("https://project.supabase.co/rest/v1/companies".into()),
        timeout_secs: 5,
        headers: BTreeMap::from([("apikey".to_string(), "anon".to_string())]),
    };

    manager.save(&config).unwrap();

    assert!(base.join("config.json").exists());
    assert!(!base.join("config.json.tmp").exists());
    assert_eq!(manager.load().unwrap(), config);
}

#[test]
fn partial_file_fills_in_defaults() {
    let path = temp_dir().join("intake.json");
    fs::write(&path, r#"{"profile":"speed-to-lead","endpoint":"https://hooks.test/call"}"#).unwrap();

    let config = ConfigManager::with_path(path).load().unwrap();
    assert_eq!(config.profile, "speed-to-lead");
    assert_eq!(config.timeout_secs, 20);
    assert!(config.headers.is_empty());

    let profile = profiles::find(&config.profile).unwrap();
    assert_eq!(
        config.resolve_endpoint(&profile).unwrap().as_str(),
        "https://hooks.test/call"
    );
}

#[test]
fn corrupt_file_is_a_config_error() {
    let path = temp_dir().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = ConfigManager::with_path(path.clone()).load().unwrap_err();
    match err {
        IntakeError::Config(message) => assert!(message.contains("broken.json")),
        other => panic!("expected config error, got {other:?}"),
    }
}
