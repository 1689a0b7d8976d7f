use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::{BaseInfo, NodeConfig};
use crate::error::AnnouncementError;
use crate::identity::{self, KeyPair};

/// A signed, timestamped description of a base: who it is and which service
/// URLs it advertises. The signature covers `timestamp`, `base_info`, and
/// `services` only; `public_key` and `signature` are excluded from the
/// signed content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub timestamp: i64,
    pub base_info: BaseInfo,
    pub services: BTreeMap<String, String>,
    pub public_key: String,
    pub signature: String,
}

// Field order is fixed by this struct and `services` keys sort
// lexicographically, so the JSON serialization is canonical.
#[derive(Serialize)]
struct SignedContent<'a> {
    timestamp: i64,
    base_info: &'a BaseInfo,
    services: &'a BTreeMap<String, String>,
}

/// The exact bytes the announcement signature covers.
pub fn canonical_payload(
    timestamp: i64,
    base_info: &BaseInfo,
    services: &BTreeMap<String, String>,
) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&SignedContent {
        timestamp,
        base_info,
        services,
    })
}

impl Announcement {
    /// Build and sign an announcement for this base.
    pub fn build(
        config: &NodeConfig,
        key_pair: &KeyPair,
        services: BTreeMap<String, String>,
        now: i64,
    ) -> Result<Self, AnnouncementError> {
        let payload = canonical_payload(now, &config.base_info, &services)?;
        Ok(Self {
            timestamp: now,
            base_info: config.base_info.clone(),
            services,
            public_key: key_pair.public_key(),
            signature: key_pair.sign(&payload),
        })
    }

    /// Structural validation of an inbound payload: presence and types of
    /// every required field, checked before any signature work so malformed
    /// payloads fail fast with a distinct error kind.
    pub fn from_value(raw: &JsonValue) -> Result<Self, AnnouncementError> {
        let object = raw
            .as_object()
            .ok_or_else(|| structural("announcement must be a JSON object"))?;

        for field in ["timestamp", "base_info", "services", "public_key", "signature"] {
            if !object.contains_key(field) {
                return Err(structural(format!("missing field `{field}`")));
            }
        }

        serde_json::from_value(raw.clone()).map_err(|err| structural(err.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, AnnouncementError> {
        let value: JsonValue = serde_json::from_str(raw)
            .map_err(|err| structural(format!("body is not valid JSON: {err}")))?;
        Self::from_value(&value)
    }

    /// Cryptographic validation: recompute the canonical payload from the
    /// received fields and check the signature against the sender's key.
    pub fn verify(&self) -> Result<(), AnnouncementError> {
        let payload = canonical_payload(self.timestamp, &self.base_info, &self.services)?;
        if identity::verify(&self.signature, &payload, &self.public_key) {
            Ok(())
        } else {
            Err(AnnouncementError::Signature)
        }
    }
}

fn structural(reason: impl Into<String>) -> AnnouncementError {
    AnnouncementError::Structural(reason.into())
}
