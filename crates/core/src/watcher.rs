use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::RoomShare;

/// Shortest polling interval accepted by [`RolloverWatcher::spawn`].
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// An engine shared between user commands and the background watcher.
/// The mutex serialises them: a rollover evaluation never interleaves with a command.
pub type SharedRoomShare = Arc<Mutex<RoomShare>>;

/// Wrap an engine for use with [`RolloverWatcher`].
pub fn shared(engine: RoomShare) -> SharedRoomShare {
    Arc::new(Mutex::new(engine))
}

/// Background task that re-checks month rollover and pending settlement on a
/// fixed interval, since there is no wake-on-date-change signal to listen to.
///
/// Dropping the watcher stops the task.
#[derive(Debug)]
pub struct RolloverWatcher {
    handle: Option<JoinHandle<()>>,
}

impl RolloverWatcher {
    /// Start polling every `every`, never faster than [`MIN_POLL_INTERVAL`].
    /// Must be called from within a tokio runtime.
    pub fn spawn(engine: SharedRoomShare, every: Duration) -> Self {
        let every = every.max(MIN_POLL_INTERVAL);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let outcome = engine.lock().await.tick();
                if outcome.changed_state() {
                    debug!(?outcome, "rollover watcher applied a transition");
                }
            }
        });
        info!(interval_ms = every.as_millis() as u64, "rollover watcher started");
        Self {
            handle: Some(handle),
        }
    }

    /// Start polling at the interval configured in the engine's settings.
    pub async fn spawn_from_settings(engine: SharedRoomShare) -> Self {
        let secs = engine.lock().await.settings().poll_interval_secs.max(1);
        Self::spawn(engine, Duration::from_secs(secs))
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the task and wait until it has exited.
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
            info!("rollover watcher stopped");
        }
    }
}

impl Drop for RolloverWatcher {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
