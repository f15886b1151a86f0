//! Authentication configuration.

use serde::Deserialize;

/// Configuration for the authentication service and idle guard.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Optional pepper prepended to passwords before Argon2id hashing
    /// and verification.
    pub pepper: Option<String>,
    /// Minimum password length for policy enforcement.
    pub min_password_length: usize,
    /// One-time code lifetime in seconds (default: 600 = 10 minutes).
    pub otp_lifetime_secs: u64,
    /// Return issued codes to the caller so a development UI can show
    /// them when no email is delivered.
    pub expose_dev_codes: bool,
    /// Idle budget in seconds before the session ends (default: 1200).
    pub idle_timeout_secs: u64,
    /// How long before the idle timeout the warning fires
    /// (default: 120).
    pub idle_warning_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 6,
            otp_lifetime_secs: 600,
            expose_dev_codes: false,
            idle_timeout_secs: 1200,
            idle_warning_secs: 120,
        }
    }
}
