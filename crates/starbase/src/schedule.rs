use std::fmt;
use std::future::Future;

use log::{error, info};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// A derived schedule for a periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Minutes(u64),
    Hours(u64),
    Days(u64),
}

/// Whether `minutes` can be mapped onto the day/hour/minute schedule rules.
/// Values above 59 must be whole hours (whole days are whole hours too).
pub fn is_schedulable(minutes: i64) -> bool {
    minutes > 0 && (minutes < 60 || minutes % 60 == 0)
}

/// Map a minutes value onto a schedule: whole days first, then whole hours,
/// then raw minutes. `None` when the value is zero or negative, which
/// disables the task entirely.
pub fn derive_interval(minutes: i64) -> Option<Interval> {
    if minutes <= 0 {
        return None;
    }
    let minutes = minutes as u64;
    if minutes % 1440 == 0 {
        Some(Interval::Days(minutes / 1440))
    } else if minutes % 60 == 0 {
        Some(Interval::Hours(minutes / 60))
    } else {
        Some(Interval::Minutes(minutes))
    }
}

impl Interval {
    pub fn period(&self) -> Duration {
        match self {
            Interval::Minutes(minutes) => Duration::from_secs(minutes * 60),
            Interval::Hours(hours) => Duration::from_secs(hours * 3600),
            Interval::Days(days) => Duration::from_secs(days * 86400),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Minutes(1) => write!(f, "every 1 minute"),
            Interval::Minutes(minutes) => write!(f, "every {minutes} minutes"),
            Interval::Hours(1) => write!(f, "every 1 hour"),
            Interval::Hours(hours) => write!(f, "every {hours} hours"),
            Interval::Days(1) => write!(f, "every 1 day"),
            Interval::Days(days) => write!(f, "every {days} days"),
        }
    }
}

/// Spawn a named periodic task. Ticks run inline and sequentially: a tick
/// that outruns its interval delays the next tick instead of stacking an
/// overlapping run, and missed ticks are skipped rather than bursted. A
/// tick error is logged and the schedule continues; cancellation stops the
/// task after the in-flight tick completes.
pub fn spawn_periodic<T, F, E>(
    name: &'static str,
    schedule: Interval,
    shutdown: CancellationToken,
    mut tick: T,
) -> JoinHandle<()>
where
    T: FnMut() -> F + Send + 'static,
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(schedule.period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("scheduled task `{name}` {schedule}");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("task `{name}` shutting down");
                    break;
                }
                // First tick is immediate, so the task runs once at startup.
                _ = ticker.tick() => {
                    if let Err(err) = tick().await {
                        error!("task `{name}` tick failed: {err}");
                    }
                }
            }
        }
    })
}
