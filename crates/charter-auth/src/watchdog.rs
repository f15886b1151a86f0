//! Idle watchdog: the single timer task behind the idle guard.
//!
//! One task owns the warning deadline, the expiry deadline and the
//! per-second countdown. `reset` aborts that task before spawning the
//! next one, so a stale timer can never fire after activity.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use crate::idle::IdlePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleEvent {
    /// Countdown refresh, at least once per second.
    Tick { remaining: Duration },
    /// The warning window was entered.
    Warning { remaining: Duration },
    /// The idle budget is spent; the session must end.
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogTimings {
    pub timeout: Duration,
    pub warning_before: Duration,
    pub tick: Duration,
}

impl WatchdogTimings {
    pub fn from_policy(policy: &IdlePolicy) -> Self {
        Self {
            timeout: policy.timeout.to_std().unwrap_or_default(),
            warning_before: policy.warning_before.to_std().unwrap_or_default(),
            tick: Duration::from_secs(1),
        }
    }
}

pub struct IdleWatchdog {
    timings: WatchdogTimings,
    events: mpsc::UnboundedSender<IdleEvent>,
    task: Option<JoinHandle<()>>,
}

impl IdleWatchdog {
    pub fn new(timings: WatchdogTimings) -> (Self, mpsc::UnboundedReceiver<IdleEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                timings,
                events,
                task: None,
            },
            rx,
        )
    }

    /// Arm the timers with `already_idle` of the budget spent, as when
    /// a persisted session is restored. Replaces any running task.
    pub fn start(&mut self, already_idle: Duration) {
        self.stop();
        let timings = self.timings;
        let events = self.events.clone();
        self.task = Some(tokio::spawn(run(timings, already_idle, events)));
    }

    /// Activity: restart with the full budget.
    pub fn reset(&mut self) {
        self.start(Duration::ZERO);
    }

    /// Logout: cancel everything immediately.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for IdleWatchdog {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    timings: WatchdogTimings,
    already_idle: Duration,
    events: mpsc::UnboundedSender<IdleEvent>,
) {
    let now = Instant::now();
    let deadline = now + timings.timeout.saturating_sub(already_idle);
    let warn_at = now
        + timings
            .timeout
            .saturating_sub(timings.warning_before)
            .saturating_sub(already_idle);

    let mut ticker = time::interval(timings.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut warned = false;

    loop {
        let event = tokio::select! {
            biased;
            _ = time::sleep_until(deadline) => IdleEvent::Expired,
            _ = time::sleep_until(warn_at), if !warned => {
                warned = true;
                IdleEvent::Warning {
                    remaining: deadline.saturating_duration_since(Instant::now()),
                }
            }
            _ = ticker.tick() => IdleEvent::Tick {
                remaining: deadline.saturating_duration_since(Instant::now()),
            },
        };

        let expired = event == IdleEvent::Expired;
        if events.send(event).is_err() || expired {
            break;
        }
    }
    debug!("Idle watchdog finished");
}
