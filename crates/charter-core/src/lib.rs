//! Charter Core: domain models, error types and the data-access
//! traits shared by the booking, auth and database crates.

pub mod error;
pub mod mailer;
pub mod models;
pub mod repository;
