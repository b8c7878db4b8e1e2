//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use teakspice_core::{Email, UserId};

/// A shop user.
///
/// Carries no password material; the hash lives in its own table and is only
/// read during login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Login key, unique across users.
    pub email: Email,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A partial profile change. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
}

impl ProfileUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_json_has_no_secret_fields() {
        let user = User {
            id: UserId::new(1),
            name: "Ada".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            phone: "555-0100".to_string(),
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
            updated_at: DateTime::from_timestamp(0, 0).unwrap(),
        };

        let json = serde_json::to_value(&user).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();

        assert!(keys.iter().all(|k| !k.to_lowercase().contains("password")));
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["createdAt"], "1970-01-01T00:00:00Z");
    }

    #[test]
    fn test_empty_update() {
        assert!(ProfileUpdate::default().is_empty());
        assert!(
            !ProfileUpdate {
                phone: Some("1".to_string()),
                ..ProfileUpdate::default()
            }
            .is_empty()
        );
    }
}
