use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schedule;

/// Node configuration. Loaded and validated once at startup, then held
/// immutable inside the [`crate::context::BaseContext`] for the lifetime of
/// every scheduling cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub base_info: BaseInfo,
    pub networking: NetworkingConfig,
    pub services: ServicesConfig,
    pub bootstrap: BootstrapConfig,
}

/// The identity a base advertises about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseInfo {
    pub name: String,
    pub description: String,
    pub star_system_number: u32,
    pub contact_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkingConfig {
    pub listen_for_announcements: bool,
    #[serde(default)]
    pub announce_to_base: Vec<TargetBase>,
}

/// A peer base configured to receive this node's announcements. The
/// optional `services` map overrides the default announce endpoint (`bdo`)
/// for that peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetBase {
    pub name: String,
    pub base_url: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub enabled: Vec<String>,
    pub ports: PortsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortsConfig {
    pub base_port: u16,
    pub port_offset: u16,
}

/// Scheduling knobs, in minutes. A value of zero or below disables the
/// corresponding task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub auto_announce: bool,
    pub announcement_interval: i64,
    pub retry_failed_announcements: bool,
    pub retry_interval: i64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            base_info: BaseInfo {
                name: "New Base".into(),
                description: "A newly bootstrapped base".into(),
                star_system_number: 1,
                contact_info: String::new(),
            },
            networking: NetworkingConfig {
                listen_for_announcements: true,
                announce_to_base: Vec::new(),
            },
            services: ServicesConfig {
                enabled: vec![
                    "bdo".into(),
                    "fount".into(),
                    "pref".into(),
                    "joan".into(),
                    "addie".into(),
                ],
                ports: PortsConfig {
                    base_port: 5000,
                    port_offset: 0,
                },
            },
            bootstrap: BootstrapConfig {
                auto_announce: true,
                announcement_interval: 120,
                retry_failed_announcements: true,
                retry_interval: 15,
            },
        }
    }
}

impl NodeConfig {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load the configuration from `path`. A missing file is populated from
    /// the bundled default and persisted, so subsequent loads are
    /// idempotent. An existing but malformed or invalid file is fatal; it
    /// never falls back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let config = Self::from_toml(&raw)?;
                config.validate()?;
                Ok(config)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                std::fs::write(path, config.to_toml()?)?;
                Ok(config)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Must pass before any other component consumes the config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_info.name.trim().is_empty() {
            return Err(invalid("base_info.name", "must not be empty"));
        }
        if self.services.ports.base_port == 0 {
            return Err(invalid("services.ports.base_port", "must not be zero"));
        }

        let mut seen = HashSet::new();
        for target in &self.networking.announce_to_base {
            if target.name.trim().is_empty() {
                return Err(invalid(
                    "networking.announce_to_base.name",
                    "target names must not be empty",
                ));
            }
            if !seen.insert(target.name.clone()) {
                return Err(invalid(
                    "networking.announce_to_base.name",
                    format!("duplicate target name `{}`", target.name),
                ));
            }
            if !is_http_url(&target.base_url) {
                return Err(invalid(
                    "networking.announce_to_base.base_url",
                    format!("`{}` is not an http(s) url", target.base_url),
                ));
            }
            if let Some(services) = &target.services {
                for (service, url) in services {
                    if !is_http_url(url) {
                        return Err(invalid(
                            "networking.announce_to_base.services",
                            format!("`{service}` override `{url}` is not an http(s) url"),
                        ));
                    }
                }
            }
        }

        check_interval(
            "bootstrap.announcement_interval",
            self.bootstrap.announcement_interval,
        )?;
        check_interval("bootstrap.retry_interval", self.bootstrap.retry_interval)?;

        Ok(())
    }

    /// Targets that broadcast ticks actually contact, in configuration
    /// order.
    pub fn enabled_targets(&self) -> impl Iterator<Item = &TargetBase> {
        self.networking
            .announce_to_base
            .iter()
            .filter(|target| target.enabled)
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        reason: reason.into(),
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

// Interval values above 59 that are not whole hours cannot be mapped onto
// the day/hour/minute schedule rules; they are rejected here instead of
// producing an out-of-range schedule later.
fn check_interval(field: &str, minutes: i64) -> Result<(), ConfigError> {
    if minutes > 0 && !schedule::is_schedulable(minutes) {
        return Err(invalid(
            field,
            format!("{minutes} minutes cannot be scheduled; use a value below 60 or a multiple of 60"),
        ));
    }
    Ok(())
}
