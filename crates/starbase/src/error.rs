use std::io;

use thiserror::Error;

/// Configuration errors. The only error class allowed to terminate the
/// process, and only at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to persist config: {0}")]
    Persist(#[from] toml::ser::Error),

    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

/// Inbound and outbound announcement codec errors. Structural problems are
/// reported before any signature work is attempted.
#[derive(Debug, Error)]
pub enum AnnouncementError {
    #[error("malformed announcement: {0}")]
    Structural(String),

    #[error("invalid signature")]
    Signature,

    #[error("failed to encode announcement: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outbound delivery failures. Recoverable: the broadcast loop records them
/// for bounded retry instead of propagating them.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to `{target}` failed: {source}")]
    Transport {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("`{target}` responded {status}: {body}")]
    Rejected {
        target: String,
        status: u16,
        body: String,
    },
}

/// Durable announcement store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("announcement store io error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Error surfaced by one scheduled tick. Caught and logged at the tick
/// boundary; never terminates the scheduler.
#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    Announcement(#[from] AnnouncementError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
