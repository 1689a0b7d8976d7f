use starbase::config::NodeConfig;
use starbase::topology::{resolve_enabled, resolve_url, service_offset};

#[test]
fn resolves_known_services_from_base_and_offset() {
    assert_eq!(
        resolve_url("bdo", 5000, 100, "localhost").as_deref(),
        Some("http://localhost:5103")
    );
    assert_eq!(
        resolve_url("fount", 5000, 100, "localhost").as_deref(),
        Some("http://localhost:5106")
    );
}

#[test]
fn unknown_service_resolves_to_none() {
    assert_eq!(service_offset("warpdrive"), None);
    assert_eq!(resolve_url("warpdrive", 5000, 100, "localhost"), None);
}

#[test]
fn out_of_range_port_is_skipped() {
    // hedy sits far below the contiguous block; a low base port pushes the
    // computed port below 1.
    assert_eq!(resolve_url("hedy", 500, 0, "localhost"), None);
}

#[test]
fn resolve_enabled_skips_unknown_names() {
    let mut config = NodeConfig::default();
    config.services.enabled = vec!["bdo".into(), "warpdrive".into(), "fount".into()];
    config.services.ports.base_port = 5000;
    config.services.ports.port_offset = 100;

    let resolved = resolve_enabled(&config, "localhost");
    assert_eq!(resolved.len(), 2);
    assert_eq!(
        resolved.get("bdo").map(String::as_str),
        Some("http://localhost:5103")
    );
    assert_eq!(
        resolved.get("fount").map(String::as_str),
        Some("http://localhost:5106")
    );
    assert!(!resolved.contains_key("warpdrive"));
}

#[test]
fn resolve_enabled_ignores_services_not_enabled() {
    let mut config = NodeConfig::default();
    config.services.enabled = vec!["bdo".into()];
    let resolved = resolve_enabled(&config, "localhost");
    assert_eq!(resolved.len(), 1);
    assert!(!resolved.contains_key("fount"));
}
