//! Sign-in step flow.
//!
//! `AuthFlow` tracks which form the visitor is on and what the previous
//! steps established (email, pending code kind, redeemed code). Every
//! transition goes through [`AuthService`]; a failed call leaves the flow
//! on the step it was on.

use std::fmt;

use charter_core::error::CharterResult;
use charter_core::mailer::Mailer;
use charter_core::models::otp::OtpKind;
use charter_core::models::session::Session;
use charter_core::repository::{OtpRepository, UserRepository};
use serde::Serialize;
use tracing::debug;

use crate::access::{self, Route};
use crate::error::AuthError;
use crate::otp;
use crate::service::{AuthService, IssuedOtp, LoginRoute, RegisterInput, VerifiedOtp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthStep {
    Login,
    Register,
    ForgotPassword,
    Otp,
    Password,
    SetPassword,
}

impl AuthStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthStep::Login => "login",
            AuthStep::Register => "register",
            AuthStep::ForgotPassword => "forgot-password",
            AuthStep::Otp => "otp",
            AuthStep::Password => "password",
            AuthStep::SetPassword => "set-password",
        }
    }
}

impl fmt::Display for AuthStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub session: Session,
    pub landing: Route,
}

impl SignedIn {
    fn new(session: Session) -> Self {
        let landing = access::landing_route(session.role);
        Self { session, landing }
    }
}

#[derive(Debug, Clone)]
pub struct AuthFlow {
    step: AuthStep,
    email: Option<String>,
    pending_kind: Option<OtpKind>,
    verified: Option<VerifiedOtp>,
    last_issued: Option<IssuedOtp>,
}

impl Default for AuthFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthFlow {
    pub fn new() -> Self {
        Self {
            step: AuthStep::Login,
            email: None,
            pending_kind: None,
            verified: None,
            last_issued: None,
        }
    }

    pub fn step(&self) -> AuthStep {
        self.step
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Kind of the code the `otp` step is waiting for.
    pub fn pending_kind(&self) -> Option<OtpKind> {
        self.pending_kind
    }

    /// The most recently issued code. `None` after a reset request for
    /// an unknown email.
    pub fn last_issued(&self) -> Option<&IssuedOtp> {
        self.last_issued.as_ref()
    }

    pub fn go_to_register(&mut self) -> Result<AuthStep, AuthError> {
        self.require_step(AuthStep::Login)?;
        Ok(self.move_to(AuthStep::Register))
    }

    /// Also offered from the password form.
    pub fn go_to_forgot_password(&mut self) -> Result<AuthStep, AuthError> {
        if self.step != AuthStep::Password {
            self.require_step(AuthStep::Login)?;
        }
        Ok(self.move_to(AuthStep::ForgotPassword))
    }

    /// Return to the email form, dropping everything collected so far.
    pub fn back(&mut self) -> AuthStep {
        *self = Self::new();
        self.step
    }

    /// Email entered on the login form: ask for the password, or send a
    /// `first_login` code when the account has none.
    pub async fn submit_email<U, O, M>(
        &mut self,
        service: &AuthService<U, O, M>,
        email: &str,
    ) -> CharterResult<AuthStep>
    where
        U: UserRepository,
        O: OtpRepository,
        M: Mailer,
    {
        self.require_step(AuthStep::Login)?;
        match service.begin_login(email).await? {
            LoginRoute::PasswordRequired => {
                self.email = Some(normalized(email));
                Ok(self.move_to(AuthStep::Password))
            }
            LoginRoute::CodeSent(issued) => Ok(self.await_code(issued)),
        }
    }

    /// "Email me a code" from the login form.
    pub async fn request_code<U, O, M>(
        &mut self,
        service: &AuthService<U, O, M>,
        email: &str,
    ) -> CharterResult<AuthStep>
    where
        U: UserRepository,
        O: OtpRepository,
        M: Mailer,
    {
        self.require_step(AuthStep::Login)?;
        let issued = service.request_login_code(email).await?;
        Ok(self.await_code(issued))
    }

    pub async fn submit_registration<U, O, M>(
        &mut self,
        service: &AuthService<U, O, M>,
        input: RegisterInput,
    ) -> CharterResult<AuthStep>
    where
        U: UserRepository,
        O: OtpRepository,
        M: Mailer,
    {
        self.require_step(AuthStep::Register)?;
        let issued = service.register(input).await?;
        Ok(self.await_code(issued))
    }

    /// Advances to `otp` whether or not the email has an account.
    pub async fn submit_reset_request<U, O, M>(
        &mut self,
        service: &AuthService<U, O, M>,
        email: &str,
    ) -> CharterResult<AuthStep>
    where
        U: UserRepository,
        O: OtpRepository,
        M: Mailer,
    {
        self.require_step(AuthStep::ForgotPassword)?;
        let issued = service.request_password_reset(email).await?;
        self.email = Some(normalized(email));
        self.pending_kind = Some(OtpKind::PasswordReset);
        self.last_issued = issued;
        Ok(self.move_to(AuthStep::Otp))
    }

    /// Send a fresh code of the pending kind.
    pub async fn resend<U, O, M>(
        &mut self,
        service: &AuthService<U, O, M>,
    ) -> CharterResult<AuthStep>
    where
        U: UserRepository,
        O: OtpRepository,
        M: Mailer,
    {
        self.require_step(AuthStep::Otp)?;
        let (Some(email), Some(kind)) = (self.email.clone(), self.pending_kind) else {
            return Err(out_of_step(AuthStep::Login, self.step).into());
        };

        let issued = match kind {
            OtpKind::PasswordReset => service.request_password_reset(&email).await?,
            OtpKind::Login | OtpKind::FirstLogin => Some(service.request_login_code(&email).await?),
        };
        if let Some(issued) = &issued {
            self.pending_kind = Some(issued.kind);
        }
        self.last_issued = issued;
        debug!(kind = kind.as_str(), "One-time code resent");
        Ok(self.step)
    }

    /// Redeem the code. A `login` code leads to the password form; the
    /// other kinds lead to set-password.
    pub async fn submit_code<U, O, M>(
        &mut self,
        service: &AuthService<U, O, M>,
        code: &str,
    ) -> CharterResult<AuthStep>
    where
        U: UserRepository,
        O: OtpRepository,
        M: Mailer,
    {
        self.require_step(AuthStep::Otp)?;
        let code = code.trim();
        if !otp::is_well_formed(code) {
            return Err(AuthError::Validation("please enter a valid 6-digit code".into()).into());
        }
        let Some(email) = self.email.clone() else {
            return Err(out_of_step(AuthStep::Login, self.step).into());
        };

        let verified = service.verify_otp(&email, code).await?;
        if verified.requires_new_password() {
            self.verified = Some(verified);
            Ok(self.move_to(AuthStep::SetPassword))
        } else {
            self.verified = None;
            Ok(self.move_to(AuthStep::Password))
        }
    }

    pub async fn submit_password<U, O, M>(
        &mut self,
        service: &AuthService<U, O, M>,
        password: &str,
    ) -> CharterResult<SignedIn>
    where
        U: UserRepository,
        O: OtpRepository,
        M: Mailer,
    {
        self.require_step(AuthStep::Password)?;
        let Some(email) = self.email.clone() else {
            return Err(out_of_step(AuthStep::Login, self.step).into());
        };
        let session = service.login_with_password(&email, password).await?;
        self.back();
        Ok(SignedIn::new(session))
    }

    pub async fn submit_new_password<U, O, M>(
        &mut self,
        service: &AuthService<U, O, M>,
        password: &str,
        confirmation: &str,
    ) -> CharterResult<SignedIn>
    where
        U: UserRepository,
        O: OtpRepository,
        M: Mailer,
    {
        self.require_step(AuthStep::SetPassword)?;
        let Some(verified) = self.verified.as_ref() else {
            return Err(out_of_step(AuthStep::Otp, self.step).into());
        };
        let session = service.set_password(verified, password, confirmation).await?;
        self.back();
        Ok(SignedIn::new(session))
    }

    fn await_code(&mut self, issued: IssuedOtp) -> AuthStep {
        self.email = Some(issued.email.clone());
        self.pending_kind = Some(issued.kind);
        self.last_issued = Some(issued);
        self.move_to(AuthStep::Otp)
    }

    fn move_to(&mut self, step: AuthStep) -> AuthStep {
        debug!(from = %self.step, to = %step, "Auth step changed");
        self.step = step;
        step
    }

    fn require_step(&self, expected: AuthStep) -> Result<(), AuthError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(out_of_step(expected, self.step))
        }
    }
}

fn out_of_step(expected: AuthStep, actual: AuthStep) -> AuthError {
    AuthError::OutOfStep { expected, actual }
}

fn normalized(email: &str) -> String {
    email.trim().to_lowercase()
}
