//! Accounts and activity history.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

use super::credential::Role;
use super::ebook::Ebook;
use super::email::Email;
use super::id::{ActivityId, UserId};
use super::timestamp::Timestamp;

/// The signed-in account as reported by `GET /users/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// One entry of `GET /users/me/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: ActivityId,
    /// What happened, e.g. `download`.
    pub action: String,
    pub timestamp: Timestamp,
    pub ebook: Ebook,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
}

fn serialize_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_serializes_password() {
        let registration = Registration {
            name: "Budi".to_owned(),
            email: Email::parse("budi@example.com").unwrap(),
            password: SecretString::from("correct-horse"),
        };
        let json = serde_json::to_value(&registration).unwrap();
        assert_eq!(json["email"], "budi@example.com");
        assert_eq!(json["password"], "correct-horse");
    }

    #[test]
    fn test_registration_debug_hides_password() {
        let registration = Registration {
            name: "Budi".to_owned(),
            email: Email::parse("budi@example.com").unwrap(),
            password: SecretString::from("correct-horse"),
        };
        assert!(!format!("{registration:?}").contains("correct-horse"));
    }

    #[test]
    fn test_history_entry_from_backend_json() {
        let json = r#"{
            "id": 1,
            "action": "download",
            "timestamp": "2025-05-05T12:00:00",
            "ebook": {"id": 4, "title": "Laskar Pelangi", "author": "Andrea Hirata"}
        }"#;
        let entry: ActivityLog = serde_json::from_str(json).unwrap();
        assert_eq!(entry.action, "download");
        assert_eq!(entry.ebook.title, "Laskar Pelangi");
    }
}
