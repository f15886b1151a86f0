//! One-time code emails and the mailers that deliver them.

use charter_core::error::{CharterError, CharterResult};
use charter_core::mailer::{Mailer, OutgoingEmail};
use charter_core::models::otp::OtpKind;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailProvider {
    /// Log outgoing mail instead of sending it.
    Log,
    Resend,
}

/// Configuration for outbound email.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub provider: MailProvider,
    /// Resend API key; required when `provider` is `resend`.
    pub api_key: Option<String>,
    pub api_url: String,
    /// `From:` header, e.g. `Global Cruiser <noreply@globalcruiser.com>`.
    pub from: String,
    /// Brand name used in subjects and the email body.
    pub brand: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::Log,
            api_key: None,
            api_url: "https://api.resend.com/emails".into(),
            from: "Global Cruiser <noreply@globalcruiser.com>".into(),
            brand: "Global Cruiser".into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail provider is not configured: {0}")]
    NotConfigured(String),

    #[error("request failed: {0}")]
    Http(String),

    #[error("provider rejected the message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

impl From<MailError> for CharterError {
    fn from(err: MailError) -> Self {
        CharterError::Delivery(err.to_string())
    }
}

/// Subject and HTML body for a one-time code.
pub fn otp_email(brand: &str, to: &str, code: &str, kind: OtpKind) -> OutgoingEmail {
    let reset = kind == OtpKind::PasswordReset;
    let subject = if reset {
        format!("Password Reset Code - {brand}")
    } else {
        format!("Verification Code - {brand}")
    };
    let (heading, purpose) = if reset {
        ("Reset Your Password", "reset your password")
    } else {
        ("Verify Your Email", "complete your sign-in")
    };

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="color: #1e40af; text-align: center;">{brand}</h1>
  <div style="background: #f8fafc; padding: 30px; border-radius: 10px; text-align: center;">
    <h2 style="color: #374151;">{heading}</h2>
    <p style="color: #6b7280;">Use the verification code below to {purpose}:</p>
    <span style="font-size: 32px; font-weight: bold; letter-spacing: 5px; color: #1e40af;">{code}</span>
  </div>
  <p style="color: #6b7280; font-size: 14px; text-align: center;">
    This code will expire in 10 minutes.<br>
    If you didn't request this code, please ignore this email.
  </p>
</div>"#
    );

    OutgoingEmail {
        to: to.to_string(),
        subject,
        html,
    }
}

#[derive(Debug, Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

/// Sends through the Resend HTTP API.
#[derive(Debug, Clone)]
pub struct ResendMailer {
    client: Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| MailError::NotConfigured("missing Resend API key".into()))?;
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MailError::Http(e.to_string()))?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            from: config.from.clone(),
        })
    }

    async fn post(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let payload = ResendPayload {
            from: &self.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!(to = %email.to, "Email accepted by Resend");
        Ok(())
    }
}

impl Mailer for ResendMailer {
    async fn send(&self, email: OutgoingEmail) -> CharterResult<()> {
        Ok(self.post(&email).await?)
    }
}

/// Development mailer: records the message in the log only.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> CharterResult<()> {
        info!(to = %email.to, subject = %email.subject, "Email not sent (log mailer)");
        Ok(())
    }

    fn delivers(&self) -> bool {
        false
    }
}

/// The mailer selected by [`MailConfig::provider`].
#[derive(Debug, Clone)]
pub enum ConfiguredMailer {
    Resend(ResendMailer),
    Log(LogMailer),
}

impl ConfiguredMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        match config.provider {
            MailProvider::Resend => Ok(Self::Resend(ResendMailer::new(config)?)),
            MailProvider::Log => Ok(Self::Log(LogMailer)),
        }
    }
}

impl Mailer for ConfiguredMailer {
    async fn send(&self, email: OutgoingEmail) -> CharterResult<()> {
        match self {
            Self::Resend(m) => m.send(email).await,
            Self::Log(m) => m.send(email).await,
        }
    }

    fn delivers(&self) -> bool {
        match self {
            Self::Resend(m) => m.delivers(),
            Self::Log(m) => m.delivers(),
        }
    }
}
