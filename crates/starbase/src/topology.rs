use std::collections::BTreeMap;

use log::warn;

use crate::config::NodeConfig;

/// Per-service port offsets relative to `base_port + port_offset`. This is
/// operator lore shipped with the binary, not runtime state. A few services
/// sit far outside the contiguous block.
const SERVICE_PORT_OFFSETS: &[(&str, i32)] = &[
    ("julia", 0),
    ("continuebee", 1),
    ("pref", 2),
    ("bdo", 3),
    ("joan", 4),
    ("aretha", 5),
    ("fount", 6),
    ("addie", 7),
    ("sanora", 9),
    ("dolores", 10),
    ("covenant", 11),
    ("minnie", 2800),
    ("hedy", -1200),
];

pub fn service_offset(service: &str) -> Option<i32> {
    SERVICE_PORT_OFFSETS
        .iter()
        .find(|(name, _)| *name == service)
        .map(|(_, offset)| *offset)
}

/// Externally reachable URL for one service, or `None` when the service is
/// unknown or its computed port falls outside 1..=65535.
pub fn resolve_url(
    service: &str,
    base_port: u16,
    port_offset: u16,
    hostname: &str,
) -> Option<String> {
    let offset = service_offset(service)?;
    let port = i64::from(base_port) + i64::from(port_offset) + i64::from(offset);
    if !(1..=65535).contains(&port) {
        warn!("service `{service}` resolves to port {port}, outside the valid range; skipping");
        return None;
    }
    Some(format!("http://{hostname}:{port}"))
}

/// Resolve every service that is both enabled and known to the offset
/// table, in enabled-list order. Unknown names are skipped silently; the
/// enabled list is operator-curated.
pub fn resolve_enabled(config: &NodeConfig, hostname: &str) -> BTreeMap<String, String> {
    let ports = &config.services.ports;
    let mut resolved = BTreeMap::new();
    for service in &config.services.enabled {
        if let Some(url) = resolve_url(service, ports.base_port, ports.port_offset, hostname) {
            resolved.insert(service.clone(), url);
        }
    }
    resolved
}
