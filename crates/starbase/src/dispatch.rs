use std::time::Duration;

use log::{info, warn};
use reqwest::Client;

use crate::announce::Announcement;
use crate::config::TargetBase;
use crate::context::BaseContext;
use crate::error::{DeliveryError, TickError};
use crate::retry::FailedAnnouncementStore;

/// Per-target delivery timeout.
pub const ANNOUNCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends one signed announcement to one target base over HTTP.
pub struct AnnouncementDispatcher {
    client: Client,
}

impl AnnouncementDispatcher {
    pub fn new() -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(ANNOUNCE_TIMEOUT)
            .build()
            .map_err(DeliveryError::Client)?;
        Ok(Self { client })
    }

    /// The URL a target accepts announcements on: its `bdo` service
    /// override when present, its base URL otherwise.
    pub fn announce_endpoint(target: &TargetBase) -> &str {
        target
            .services
            .as_ref()
            .and_then(|services| services.get("bdo"))
            .map(String::as_str)
            .unwrap_or(&target.base_url)
    }

    /// POST the announcement to one target. Any non-success status is a
    /// delivery failure carrying the status and response body.
    pub async fn send(
        &self,
        announcement: &Announcement,
        target: &TargetBase,
    ) -> Result<(), DeliveryError> {
        let endpoint = Self::announce_endpoint(target);
        let response = self
            .client
            .post(endpoint)
            .json(announcement)
            .send()
            .await
            .map_err(|source| DeliveryError::Transport {
                target: target.name.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            target: target.name.clone(),
            status: status.as_u16(),
            body,
        })
    }
}

/// One broadcast tick: announce to every enabled target, sequentially, in
/// configuration order. Disabled targets are neither attempted nor
/// recorded. A failed target is appended to the retry store and the loop
/// moves on to the remaining targets.
pub async fn broadcast_once(
    ctx: &BaseContext,
    dispatcher: &AnnouncementDispatcher,
    store: &FailedAnnouncementStore,
) -> Result<(), TickError> {
    let announcement = ctx.build_announcement()?;
    let mut delivered = 0usize;
    let mut failed = 0usize;

    for target in ctx.config.enabled_targets() {
        match dispatcher.send(&announcement, target).await {
            Ok(()) => {
                delivered += 1;
                info!("announced to `{}`", target.name);
            }
            Err(err) => {
                failed += 1;
                warn!("announcement to `{}` failed: {err}", target.name);
                if let Err(store_err) = store.append(target, &err.to_string()).await {
                    warn!(
                        "could not record failed announcement for `{}`: {store_err}",
                        target.name
                    );
                }
            }
        }
    }

    info!("broadcast complete: {delivered} delivered, {failed} failed");
    Ok(())
}
