//! Role gate for the application's areas.

use charter_core::models::role::Role;
use charter_core::models::session::Session;
use serde::Serialize;

/// Parts of the site with distinct access rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    /// Home, fleet, yacht pages, gallery, contact.
    Public,
    /// The customer's bookings and dashboard.
    Account,
    /// The back-office.
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    SignIn,
    Fleet,
    Admin,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SignIn => "/auth",
            Route::Fleet => "/yachts",
            Route::Admin => "/admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
    Redirect(Route),
}

/// Anonymous visitors are sent to sign in wherever a session is
/// needed; signed-in customers are denied the admin area.
pub fn authorize(session: Option<&Session>, area: Area) -> Access {
    match (area, session) {
        (Area::Public, _) => Access::Allow,
        (_, None) => Access::Redirect(Route::SignIn),
        (Area::Account, Some(_)) => Access::Allow,
        (Area::Admin, Some(s)) if s.role.is_admin() => Access::Allow,
        (Area::Admin, Some(_)) => Access::Deny,
    }
}

/// Where a freshly signed-in account lands.
pub fn landing_route(role: Role) -> Route {
    match role {
        Role::Admin => Route::Admin,
        Role::User => Route::Fleet,
    }
}
