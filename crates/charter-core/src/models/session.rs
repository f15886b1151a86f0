//! Client-side session model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;
use super::user::User;

/// The authenticated identity cached by the client between requests
/// and across reloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub is_verified: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            is_verified: user.is_verified,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}
