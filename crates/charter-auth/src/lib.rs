//! Charter Auth: email one-time codes, password sign-in, the sign-in
//! step flow, the idle-timeout guard and the role gate.

pub mod access;
pub mod config;
pub mod error;
pub mod flow;
pub mod idle;
pub mod mail;
pub mod otp;
pub mod password;
pub mod service;
pub mod session;
pub mod store;
pub mod watchdog;

pub use access::{Access, Area, Route, authorize, landing_route};
pub use config::AuthConfig;
pub use error::AuthError;
pub use flow::{AuthFlow, AuthStep, SignedIn};
pub use idle::{IdlePolicy, IdleStatus};
pub use mail::{ConfiguredMailer, LogMailer, MailConfig, MailError, MailProvider, ResendMailer};
pub use service::{AuthService, IssuedOtp, LoginRoute, RegisterInput, VerifiedOtp};
pub use session::{Restored, SessionManager};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, StoreError, StoredSession};
pub use watchdog::{IdleEvent, IdleWatchdog, WatchdogTimings};
