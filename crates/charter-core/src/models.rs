//! Domain models for the charter booking core.
//!
//! These are the types shared across all crates: the fleet and its
//! offers, reservations, user accounts, one-time codes and the
//! client-side session.

pub mod offer;
pub mod otp;
pub mod reservation;
pub mod role;
pub mod session;
pub mod user;
pub mod yacht;
