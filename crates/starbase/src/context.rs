use std::collections::BTreeMap;

use crate::announce::Announcement;
use crate::config::NodeConfig;
use crate::error::AnnouncementError;
use crate::identity::KeyPair;
use crate::topology;
use crate::utils::now_i64;

/// Everything a component needs from startup state: validated config, the
/// process signing identity, and the advertised hostname. Built once in
/// main and shared by `Arc`; nothing here mutates after construction.
pub struct BaseContext {
    pub config: NodeConfig,
    pub key_pair: KeyPair,
    pub hostname: String,
}

impl BaseContext {
    pub fn new(config: NodeConfig, key_pair: KeyPair, hostname: impl Into<String>) -> Self {
        Self {
            config,
            key_pair,
            hostname: hostname.into(),
        }
    }

    /// Externally advertised URLs for every enabled, known service.
    pub fn resolved_services(&self) -> BTreeMap<String, String> {
        topology::resolve_enabled(&self.config, &self.hostname)
    }

    /// A freshly timestamped, freshly signed announcement describing this
    /// base.
    pub fn build_announcement(&self) -> Result<Announcement, AnnouncementError> {
        Announcement::build(
            &self.config,
            &self.key_pair,
            self.resolved_services(),
            now_i64(),
        )
    }
}
