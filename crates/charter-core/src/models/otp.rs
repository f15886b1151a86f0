//! One-time code (OTP) challenge model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a one-time code was issued for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OtpKind {
    /// Second factor for an account that already has a password.
    Login,
    /// Forgotten password; a new one must be set after verification.
    PasswordReset,
    /// Account without a password yet (new registration or
    /// passwordless sign-up).
    FirstLogin,
}

impl OtpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpKind::Login => "login",
            OtpKind::PasswordReset => "password_reset",
            OtpKind::FirstLogin => "first_login",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "login" => Some(OtpKind::Login),
            "password_reset" => Some(OtpKind::PasswordReset),
            "first_login" => Some(OtpKind::FirstLogin),
            _ => None,
        }
    }

    /// Whether a verified code of this kind must be followed by
    /// establishing a (new) password rather than entering the
    /// existing one.
    pub fn requires_new_password(&self) -> bool {
        matches!(self, OtpKind::PasswordReset | OtpKind::FirstLogin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub code: String,
    pub kind: OtpKind,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// A challenge can be redeemed once, strictly before it expires.
    pub fn is_redeemable_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && now < self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOtpChallenge {
    pub user_id: Option<Uuid>,
    pub email: String,
    pub code: String,
    pub kind: OtpKind,
    pub expires_at: DateTime<Utc>,
}
