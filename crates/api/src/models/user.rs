//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use dairy_farm_core::{Email, PersonName, Phone, UserId, UserRole};

/// A registered user (domain type). Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    /// User's email address (trimmed, case preserved).
    pub email: Email,
    pub phone: String,
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: Email,
    pub phone: Phone,
    pub password_hash: String,
}

/// Validated partial profile update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
    pub email: Option<Email>,
    pub phone: Option<Phone>,
    pub password_hash: Option<String>,
}

impl ProfileChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.password_hash.is_none()
    }
}

/// Public view of a user returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.as_str().to_owned(),
            phone: user.phone.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Owner summary embedded in order responses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.as_str().to_owned(),
            phone: user.phone.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId::generate(),
            first_name: "Asha".to_owned(),
            last_name: "Patel".to_owned(),
            email: Email::parse("asha@example.com").unwrap(),
            phone: "9876543210".to_owned(),
            role: UserRole::Buyer,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_response_is_camel_case_without_hash() {
        let json = serde_json::to_value(UserResponse::from(&user())).unwrap();
        assert_eq!(json["firstName"], "Asha");
        assert_eq!(json["lastName"], "Patel");
        assert_eq!(json["role"], "buyer");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_summary_fields() {
        let json = serde_json::to_value(UserSummary::from(&user())).unwrap();
        let keys: Vec<&str> = json
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 5);
        for key in ["id", "firstName", "lastName", "email", "phone"] {
            assert!(keys.contains(&key), "{key}");
        }
    }

    #[test]
    fn test_empty_changes() {
        assert!(ProfileChanges::default().is_empty());
        let changes = ProfileChanges {
            phone: Some(Phone::parse("9876543210").unwrap()),
            ..ProfileChanges::default()
        };
        assert!(!changes.is_empty());
    }
}
