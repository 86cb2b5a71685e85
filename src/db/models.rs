//! # Database Models
//!
//! Structs mapped from database rows.

use serde::{Deserialize, Serialize};

/// Helpdesk user account
///
/// Absent optional fields are left out of the JSON form, so a user passed
/// through [`User::without_password`] never serializes a `password` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    pub username: String,

    pub email: String,

    /// Password hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Token presented by API clients in the `accesstoken` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// TOTP secret; present when the user has enabled two-factor login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totp_key: Option<String>,

    /// Soft-delete flag. Deleted users keep their row but can't sign in.
    pub deleted: bool,
}

impl User {
    /// Whether a second factor is configured: a TOTP secret is present,
    /// even an empty one.
    pub fn has_second_factor(&self) -> bool {
        self.totp_key.is_some()
    }

    /// The same user with the password hash removed.
    pub fn without_password(self) -> Self {
        User {
            password: None,
            ..self
        }
    }
}

#[cfg(test)]
pub(crate) fn test_user(id: i64) -> User {
    User {
        id,
        username: format!("user{id}"),
        email: format!("user{id}@example.com"),
        password: Some("$argon2id$v=19$hash".to_string()),
        access_token: None,
        totp_key: None,
        deleted: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_factor_follows_key_presence() {
        let mut user = test_user(1);
        assert!(!user.has_second_factor());

        user.totp_key = Some(String::new());
        assert!(user.has_second_factor());

        user.totp_key = Some("JBSWY3DPEHPK3PXP".to_string());
        assert!(user.has_second_factor());
    }

    #[test]
    fn sanitized_user_serializes_without_password() {
        let json = serde_json::to_value(test_user(1).without_password()).unwrap();

        assert!(json.get("password").is_none());
        assert!(json.get("totp_key").is_none());
        assert_eq!(json["id"], 1);
        assert_eq!(json["deleted"], false);
    }
}
