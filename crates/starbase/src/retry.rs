use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use crate::config::TargetBase;
use crate::context::BaseContext;
use crate::dispatch::AnnouncementDispatcher;
use crate::error::{StoreError, TickError};
use crate::utils::{now_millis, sanitize_name};

/// A record is dropped after this many failed retry attempts.
pub const MAX_RETRIES: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedAnnouncementRecord {
    pub target_base: TargetBase,
    pub error: String,
    pub timestamp: i64,
    pub retry_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_retry: Option<i64>,
}

/// What became of a record after a failed retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Pending,
    Dropped,
}

/// Durable, file-backed queue of announcements that failed delivery. One
/// JSON file per record, named by creation time and target name.
///
/// Two independent schedules touch this directory: broadcast ticks append
/// new failures while retry ticks rewrite and delete records. Every
/// filesystem mutation holds the store lock so those accesses never
/// interleave on a record.
pub struct FailedAnnouncementStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FailedAnnouncementStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create a durable record for a fresh delivery failure. The record is
    /// on disk before this returns.
    pub async fn append(&self, target: &TargetBase, error: &str) -> Result<String, StoreError> {
        let _guard = self.lock.lock().await;
        fs::create_dir_all(&self.dir).await?;

        let name = sanitize_name(&target.name);
        let mut stamp = now_millis();
        let mut id = format!("{stamp}-{name}.json");
        while fs::try_exists(self.dir.join(&id)).await? {
            stamp += 1;
            id = format!("{stamp}-{name}.json");
        }

        let record = FailedAnnouncementRecord {
            target_base: target.clone(),
            error: error.to_string(),
            timestamp: stamp,
            retry_count: 0,
            last_retry: None,
        };
        self.write_record(&id, &record).await?;
        debug!("recorded failed announcement `{id}`");
        Ok(id)
    }

    /// All stored records in creation order. Corrupt files are skipped with
    /// a warning; the sweep must never crash on one bad record.
    pub async fn list_pending(
        &self,
    ) -> Result<Vec<(String, FailedAnnouncementRecord)>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if !file_name.ends_with(".json") {
                continue;
            }
            let raw = fs::read(entry.path()).await?;
            match serde_json::from_slice(&raw) {
                Ok(record) => records.push((file_name, record)),
                Err(err) => {
                    warn!("skipping corrupt failed-announcement record `{file_name}`: {err}")
                }
            }
        }
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }

    /// A successful retry removes the record for good.
    pub async fn record_success(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        fs::remove_file(self.dir.join(id)).await?;
        Ok(())
    }

    /// A failed retry evolves the record: bump the counter and re-persist,
    /// or drop the record once the retry budget is spent. A dropped record
    /// is never retried again.
    pub async fn record_failure(
        &self,
        id: &str,
        mut record: FailedAnnouncementRecord,
    ) -> Result<RetryDisposition, StoreError> {
        let _guard = self.lock.lock().await;
        record.retry_count += 1;
        record.last_retry = Some(now_millis());

        if record.retry_count >= MAX_RETRIES {
            fs::remove_file(self.dir.join(id)).await?;
            warn!(
                "dropping announcement to `{}` after {} failed attempts",
                record.target_base.name, record.retry_count
            );
            return Ok(RetryDisposition::Dropped);
        }

        self.write_record(id, &record).await?;
        Ok(RetryDisposition::Pending)
    }

    async fn write_record(
        &self,
        id: &str,
        record: &FailedAnnouncementRecord,
    ) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec_pretty(record)?;
        fs::write(self.dir.join(id), encoded).await?;
        Ok(())
    }
}

/// One retry tick: drain the store and re-attempt every pending record.
/// The announcement is rebuilt with a fresh timestamp and signature rather
/// than replaying the originally failed bytes.
pub async fn retry_sweep(
    ctx: &BaseContext,
    dispatcher: &AnnouncementDispatcher,
    store: &FailedAnnouncementStore,
) -> Result<(), TickError> {
    let pending = store.list_pending().await?;
    if pending.is_empty() {
        return Ok(());
    }

    let announcement = ctx.build_announcement()?;
    info!("retrying {} failed announcement(s)", pending.len());

    for (id, record) in pending {
        match dispatcher.send(&announcement, &record.target_base).await {
            Ok(()) => {
                info!("retry to `{}` succeeded", record.target_base.name);
                store.record_success(&id).await?;
            }
            Err(err) => {
                debug!("retry to `{}` failed: {err}", record.target_base.name);
                store.record_failure(&id, record).await?;
            }
        }
    }
    Ok(())
}
