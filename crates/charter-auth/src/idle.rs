//! Idle-timeout arithmetic.
//!
//! Pure functions of the last recorded activity and the current time,
//! so a reload can reconstruct the remaining budget from a persisted
//! timestamp.

use chrono::{DateTime, Duration, Utc};

use crate::config::AuthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdlePolicy {
    pub timeout: Duration,
    /// Lead time of the warning before `timeout`.
    pub warning_before: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleStatus {
    Active { remaining: Duration },
    /// Inside the warning window; activity still rescues the session.
    Warning { remaining: Duration },
    Expired,
}

impl Default for IdlePolicy {
    fn default() -> Self {
        Self::from_config(&AuthConfig::default())
    }
}

impl IdlePolicy {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            timeout: Duration::seconds(config.idle_timeout_secs as i64),
            warning_before: Duration::seconds(config.idle_warning_secs as i64),
        }
    }

    /// Idle time after which the warning fires.
    pub fn warn_after(&self) -> Duration {
        (self.timeout - self.warning_before).max(Duration::zero())
    }

    /// Budget left, never negative. Activity stamped in the future
    /// (clock skew) counts as just now.
    pub fn remaining(&self, last_activity: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        let idle = (now - last_activity).max(Duration::zero());
        (self.timeout - idle).max(Duration::zero())
    }

    pub fn status(&self, last_activity: DateTime<Utc>, now: DateTime<Utc>) -> IdleStatus {
        let remaining = self.remaining(last_activity, now);
        if remaining <= Duration::zero() {
            IdleStatus::Expired
        } else if remaining <= self.warning_before {
            IdleStatus::Warning { remaining }
        } else {
            IdleStatus::Active { remaining }
        }
    }
}
