//! Background expiry of idle sessions.
//!
//! The sweeper wakes every `interval` and removes sessions whose last
//! activity is older than `retention`, using the registry's own clock.

use std::time::Duration;

use tokio::{sync::oneshot, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::session::SessionRegistry;

/// Shortest accepted sweep period; a zero interval is raised to this.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

pub struct SessionSweeper {
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionSweeper {
    /// Spawn the sweep loop on the current tokio runtime.
    pub fn start(registry: SessionRegistry, interval: Duration, retention: Duration) -> Self {
        if interval < MIN_SWEEP_INTERVAL {
            warn!(?interval, minimum = ?MIN_SWEEP_INTERVAL, "Sweep interval too short, raising it");
        }
        let interval = interval.max(MIN_SWEEP_INTERVAL);
        let (tx, mut rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval_timer.tick().await; // Consume the first tick immediately

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = registry.sweep_expired(retention);
                        if removed > 0 {
                            info!(
                                removed,
                                active_sessions = registry.len(),
                                "Cleaned up idle sessions"
                            );
                        }
                    }
                    _ = &mut rx => {
                        debug!("Session sweeper stopped");
                        break;
                    }
                }
            }
        });

        debug!(?interval, ?retention, "Session sweeper started");
        Self {
            cancel: Some(tx),
            task: Some(task),
        }
    }

    /// Stop the loop and wait for the task to finish.
    pub async fn stop(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SessionSweeper {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
