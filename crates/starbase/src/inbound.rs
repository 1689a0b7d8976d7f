use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;

use crate::announce::Announcement;
use crate::error::StoreError;
use crate::utils::{now_millis, sanitize_name};

/// An inbound announcement that passed structural and signature checks,
/// annotated with when it arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedAnnouncement {
    pub received_at: i64,
    pub announcement: Announcement,
}

/// Append-only archive of verified announcements received from peers. One
/// file per announcement, named by receipt time and sender name.
pub struct AcceptedAnnouncementStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl AcceptedAnnouncementStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a verified inbound announcement. Returns the receipt
    /// timestamp echoed back to the sender.
    pub async fn append(&self, announcement: &Announcement) -> Result<i64, StoreError> {
        let _guard = self.lock.lock().await;
        fs::create_dir_all(&self.dir).await?;

        let sender = sanitize_name(&announcement.base_info.name);
        let mut stamp = now_millis();
        let mut path = self.dir.join(format!("{stamp}-{sender}.json"));
        while fs::try_exists(&path).await? {
            stamp += 1;
            path = self.dir.join(format!("{stamp}-{sender}.json"));
        }

        let accepted = AcceptedAnnouncement {
            received_at: stamp,
            announcement: announcement.clone(),
        };
        fs::write(&path, serde_json::to_vec_pretty(&accepted)?).await?;
        Ok(stamp)
    }

    /// Number of announcements accepted so far.
    pub async fn count(&self) -> Result<usize, StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        let mut count = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name().to_string_lossy().ends_with(".json") {
                count += 1;
            }
        }
        Ok(count)
    }
}
