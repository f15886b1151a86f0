//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// Argon2id PHC string. `None` until the account has established
    /// a password through a `first_login` or `password_reset` code.
    pub password_hash: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_password(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// First and last name joined, falling back to the email address.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// Already-hashed password, if one is known at creation time.
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub password_hash: Option<String>,
    pub is_verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>, hash: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "guest@example.com".into(),
            role: Role::User,
            first_name: first.map(Into::into),
            last_name: last.map(Into::into),
            phone: None,
            password_hash: hash.map(Into::into),
            is_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn display_name_prefers_names() {
        assert_eq!(user(Some("Ada"), Some("Lovelace"), None).display_name(), "Ada Lovelace");
        assert_eq!(user(Some("Ada"), None, None).display_name(), "Ada");
        assert_eq!(user(None, None, None).display_name(), "guest@example.com");
    }

    #[test]
    fn empty_hash_is_not_a_password() {
        assert!(!user(None, None, None).has_password());
        assert!(!user(None, None, Some("")).has_password());
        assert!(user(None, None, Some("$argon2id$v=19$...")).has_password());
    }
}
