use starbase::config::{NodeConfig, TargetBase};
use starbase::error::ConfigError;

fn valid_target(name: &str) -> TargetBase {
    TargetBase {
        name: name.into(),
        base_url: format!("http://{name}.example"),
        enabled: true,
        services: None,
    }
}

#[test]
fn default_config_round_trips() {
    let config = NodeConfig::default();
    let encoded = config.to_toml().expect("serialize");
    let decoded = NodeConfig::from_toml(&encoded).expect("parse");
    assert_eq!(config, decoded);
}

#[test]
fn first_load_persists_defaults_and_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("base.toml");

    let first = NodeConfig::load(&path).expect("first load");
    assert!(path.exists(), "config file should be created");

    let second = NodeConfig::load(&path).expect("second load");
    assert_eq!(first, second, "loads should be idempotent");
}

#[test]
fn malformed_existing_file_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("base.toml");
    std::fs::write(&path, "this is not toml {{{").expect("write");

    match NodeConfig::load(&path) {
        Err(ConfigError::Parse(_)) => {}
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn empty_base_name_is_rejected() {
    let mut config = NodeConfig::default();
    config.base_info.name = "   ".into();
    match config.validate() {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "base_info.name"),
        other => panic!("expected invalid field, got {other:?}"),
    }
}

#[test]
fn unschedulable_interval_is_rejected() {
    let mut config = NodeConfig::default();
    config.bootstrap.announcement_interval = 90;
    match config.validate() {
        Err(ConfigError::Invalid { field, .. }) => {
            assert_eq!(field, "bootstrap.announcement_interval")
        }
        other => panic!("expected invalid field, got {other:?}"),
    }
}

#[test]
fn disabled_intervals_are_valid() {
    let mut config = NodeConfig::default();
    config.bootstrap.announcement_interval = 0;
    config.bootstrap.retry_interval = -5;
    config.validate().expect("disabled intervals are fine");
}

#[test]
fn duplicate_target_names_are_rejected() {
    let mut config = NodeConfig::default();
    config.networking.announce_to_base = vec![valid_target("twin"), valid_target("twin")];
    match config.validate() {
        Err(ConfigError::Invalid { field, reason }) => {
            assert_eq!(field, "networking.announce_to_base.name");
            assert!(reason.contains("twin"), "reason should name the duplicate");
        }
        other => panic!("expected invalid field, got {other:?}"),
    }
}

#[test]
fn non_http_target_url_is_rejected() {
    let mut config = NodeConfig::default();
    let mut target = valid_target("odd");
    target.base_url = "ftp://odd.example".into();
    config.networking.announce_to_base = vec![target];
    assert!(config.validate().is_err());
}

#[test]
fn enabled_targets_filters_disabled() {
    let mut config = NodeConfig::default();
    let mut disabled = valid_target("off");
    disabled.enabled = false;
    config.networking.announce_to_base = vec![valid_target("on"), disabled];

    let enabled: Vec<_> = config.enabled_targets().collect();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].name, "on");
}
