//! Authentication service: one-time codes, registration and
//! password sign-in.

use charter_core::error::{CharterError, CharterResult};
use charter_core::mailer::Mailer;
use charter_core::models::otp::{CreateOtpChallenge, OtpKind};
use charter_core::models::role::Role;
use charter_core::models::session::Session;
use charter_core::models::user::{CreateUser, UpdateUser, User};
use charter_core::repository::{OtpRepository, UserRepository};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::mail;
use crate::otp;
use crate::password;

/// A code that has been stored (and, best effort, emailed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedOtp {
    pub email: String,
    pub kind: OtpKind,
    pub expires_at: DateTime<Utc>,
    /// The code itself, when [`AuthConfig::expose_dev_codes`] is set or
    /// the mailer only logs.
    pub dev_code: Option<String>,
}

/// Where the sign-in flow goes after the email is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRoute {
    /// The account has a password; ask for it.
    PasswordRequired,
    /// The account has no password yet; a `first_login` code was sent.
    CodeSent(IssuedOtp),
}

/// Input for the registration step.
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

/// Proof that a code was redeemed. Only [`AuthService::verify_otp`]
/// creates one.
#[derive(Debug, Clone)]
pub struct VerifiedOtp {
    user: User,
    kind: OtpKind,
}

impl VerifiedOtp {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn kind(&self) -> OtpKind {
        self.kind
    }

    /// `first_login` and `password_reset` continue to set-password;
    /// `login` continues to the password step.
    pub fn requires_new_password(&self) -> bool {
        self.kind.requires_new_password()
    }
}

/// Authentication service.
///
/// Generic over repository and mailer implementations so that the
/// auth layer has no dependency on the database crate.
pub struct AuthService<U: UserRepository, O: OtpRepository, M: Mailer> {
    user_repo: U,
    otp_repo: O,
    mailer: M,
    config: AuthConfig,
    brand: String,
}

impl<U: UserRepository, O: OtpRepository, M: Mailer> AuthService<U, O, M> {
    pub fn new(user_repo: U, otp_repo: O, mailer: M, config: AuthConfig) -> Self {
        Self {
            user_repo,
            otp_repo,
            mailer,
            config,
            brand: "Global Cruiser".into(),
        }
    }

    /// Brand name used in outgoing email.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Decide the next sign-in step from the stored account.
    ///
    /// Unknown emails get a fresh unverified account and a
    /// `first_login` code.
    pub async fn begin_login(&self, email: &str) -> CharterResult<LoginRoute> {
        let email = normalize_email(email)?;
        match self.user_repo.find_by_email(&email).await? {
            Some(user) if user.has_password() => Ok(LoginRoute::PasswordRequired),
            Some(user) => {
                let issued = self.issue(&email, Some(&user), OtpKind::FirstLogin).await?;
                Ok(LoginRoute::CodeSent(issued))
            }
            None => {
                let user = self.create_account(&email, None, None, None).await?;
                let issued = self.issue(&email, Some(&user), OtpKind::FirstLogin).await?;
                Ok(LoginRoute::CodeSent(issued))
            }
        }
    }

    /// "Email me a code". Accounts without a password receive a
    /// `first_login` code instead; unknown emails get an account.
    pub async fn request_login_code(&self, email: &str) -> CharterResult<IssuedOtp> {
        let email = normalize_email(email)?;
        let user = match self.user_repo.find_by_email(&email).await? {
            Some(user) => user,
            None => self.create_account(&email, None, None, None).await?,
        };
        let kind = if user.has_password() {
            OtpKind::Login
        } else {
            OtpKind::FirstLogin
        };
        self.issue(&email, Some(&user), kind).await
    }

    /// Create an unverified account and send a `first_login` code. The
    /// password is checked here and established at set-password.
    pub async fn register(&self, input: RegisterInput) -> CharterResult<IssuedOtp> {
        let first_name = input.first_name.trim();
        let last_name = input.last_name.trim();
        if first_name.is_empty() || last_name.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("please fill all required fields".into()).into());
        }
        let email = normalize_email(&input.email)?;
        password::validate_new_password(
            &input.password,
            &input.confirm_password,
            self.config.min_password_length,
        )?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::AccountExists.into());
        }

        let phone = input
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let user = self
            .create_account(
                &email,
                Some(first_name.to_string()),
                Some(last_name.to_string()),
                phone,
            )
            .await?;
        info!(user_id = %user.id, "Account registered");

        self.issue(&email, Some(&user), OtpKind::FirstLogin).await
    }

    /// Send a `password_reset` code. Returns `None` for an unknown
    /// email; callers must not reveal the difference.
    pub async fn request_password_reset(&self, email: &str) -> CharterResult<Option<IssuedOtp>> {
        let email = normalize_email(email)?;
        match self.user_repo.find_by_email(&email).await? {
            Some(user) => Ok(Some(
                self.issue(&email, Some(&user), OtpKind::PasswordReset).await?,
            )),
            None => {
                info!("Password reset requested for unknown email");
                Ok(None)
            }
        }
    }

    /// Redeem a code: the most recent unused, unexpired match for
    /// `(email, code)` is marked used. Of two concurrent redemptions
    /// only one succeeds.
    pub async fn verify_otp(&self, email: &str, code: &str) -> CharterResult<VerifiedOtp> {
        let code = code.trim();
        if !otp::is_well_formed(code) {
            return Err(AuthError::Validation("please enter a valid 6-digit code".into()).into());
        }
        let email = normalize_email(email)?;

        let challenge = self
            .otp_repo
            .find_latest_valid(&email, code, Utc::now())
            .await?
            .ok_or(AuthError::InvalidCode)?;
        if !self.otp_repo.mark_used(challenge.id).await? {
            warn!(kind = challenge.kind.as_str(), "One-time code already redeemed");
            return Err(AuthError::InvalidCode.into());
        }

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCode)?;

        info!(user_id = %user.id, kind = challenge.kind.as_str(), "One-time code verified");
        Ok(VerifiedOtp {
            user,
            kind: challenge.kind,
        })
    }

    /// Establish a password after a `first_login` or `password_reset`
    /// code. The account is marked verified.
    pub async fn set_password(
        &self,
        verified: &VerifiedOtp,
        new_password: &str,
        confirmation: &str,
    ) -> CharterResult<Session> {
        if !verified.requires_new_password() {
            return Err(AuthError::Validation(
                "this code does not allow setting a password".into(),
            )
            .into());
        }
        password::validate_new_password(
            new_password,
            confirmation,
            self.config.min_password_length,
        )?;

        let hash = password::hash_password(new_password, self.config.pepper.as_deref())?;
        let user = self
            .user_repo
            .update(
                verified.user.id,
                UpdateUser {
                    password_hash: Some(hash),
                    is_verified: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        info!(user_id = %user.id, kind = verified.kind.as_str(), "Password established");
        Ok(Session::for_user(&user))
    }

    /// Check the password against the stored hash.
    pub async fn login_with_password(&self, email: &str, password: &str) -> CharterResult<Session> {
        let user = self.authenticate(email, password).await?;
        info!(user_id = %user.id, "Signed in with password");
        Ok(Session::for_user(&user))
    }

    /// Password sign-in that only admits administrators.
    pub async fn login_admin(&self, email: &str, password: &str) -> CharterResult<Session> {
        let user = self.authenticate(email, password).await?;
        if user.role != Role::Admin {
            warn!(user_id = %user.id, "Admin sign-in refused for non-admin account");
            return Err(AuthError::AdminRequired.into());
        }
        info!(user_id = %user.id, "Admin signed in");
        Ok(Session::for_user(&user))
    }

    async fn authenticate(&self, email: &str, password: &str) -> CharterResult<User> {
        if password.is_empty() {
            return Err(AuthError::Validation("please enter your password".into()).into());
        }
        let email = normalize_email(email)?;
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let Some(hash) = user.password_hash.as_deref().filter(|h| !h.is_empty()) else {
            return Err(AuthError::InvalidCredentials.into());
        };

        let valid = password::verify_password(password, hash, self.config.pepper.as_deref())
            .map_err(|e| CharterError::Crypto(e.to_string()))?;
        if !valid {
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(user)
    }

    async fn create_account(
        &self,
        email: &str,
        first_name: Option<String>,
        last_name: Option<String>,
        phone: Option<String>,
    ) -> CharterResult<User> {
        self.user_repo
            .create(CreateUser {
                email: email.to_string(),
                role: Role::User,
                first_name,
                last_name,
                phone,
                password_hash: None,
            })
            .await
    }

    async fn issue(
        &self,
        email: &str,
        user: Option<&User>,
        kind: OtpKind,
    ) -> CharterResult<IssuedOtp> {
        let code = otp::generate_code();
        let expires_at = Utc::now() + Duration::seconds(self.config.otp_lifetime_secs as i64);

        self.otp_repo
            .create(CreateOtpChallenge {
                user_id: user.map(|u| u.id),
                email: email.to_string(),
                code: code.clone(),
                kind,
                expires_at,
            })
            .await?;

        let message = mail::otp_email(&self.brand, email, &code, kind);
        match self.mailer.send(message).await {
            Ok(()) if self.mailer.delivers() => info!(kind = kind.as_str(), "One-time code sent"),
            Ok(()) => warn!(
                email,
                code = %code,
                kind = kind.as_str(),
                "One-time code not emailed (log mailer), code logged for development"
            ),
            Err(e) => warn!(
                email,
                code = %code,
                kind = kind.as_str(),
                error = %e,
                "One-time code email failed, code logged for development"
            ),
        }

        let dev_code = (self.config.expose_dev_codes || !self.mailer.delivers()).then_some(code);
        Ok(IssuedOtp {
            email: email.to_string(),
            kind,
            expires_at,
            dev_code,
        })
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AuthError::Validation("please enter your email".into()));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthError::Validation("please enter a valid email".into())),
    }
}
