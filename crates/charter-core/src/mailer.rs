//! Outbound email abstraction.
//!
//! Delivery is best effort: callers log failures and carry on.

use serde::{Deserialize, Serialize};

use crate::error::CharterResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

pub trait Mailer: Send + Sync {
    fn send(&self, email: OutgoingEmail) -> impl Future<Output = CharterResult<()>> + Send;

    /// `false` for development mailers that only write to the log, so the
    /// recipient never sees the message.
    fn delivers(&self) -> bool {
        true
    }
}
