pub mod announce;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod identity;
pub mod inbound;
pub mod retry;
pub mod schedule;
pub mod topology;

pub use crate::announce::Announcement;
pub use crate::config::{NodeConfig, TargetBase};
pub use crate::context::BaseContext;
pub use crate::dispatch::{broadcast_once, AnnouncementDispatcher};
pub use crate::identity::KeyPair;
pub use crate::inbound::AcceptedAnnouncementStore;
pub use crate::retry::{retry_sweep, FailedAnnouncementStore};
pub use crate::schedule::{derive_interval, spawn_periodic, Interval};

pub mod utils;
