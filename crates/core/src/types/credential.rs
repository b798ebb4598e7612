//! Bearer credentials and the identity decoded from them.
//!
//! The backend issues a JWT on login. The client never verifies the signature
//! (it does not hold the key); it only reads the claims to learn who is signed
//! in and with which role. The backend re-validates the token on every call.

use core::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// An opaque bearer token proving a successful prior authentication.
///
/// The raw value never appears in `Debug` output.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Access the raw token, e.g. to build an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

/// Role classification carried by an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Ordinary reader.
    #[default]
    User,
    /// Catalog administrator.
    Admin,
}

impl Role {
    /// Returns `true` for the elevated classification.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Anything other than "admin" is an ordinary user: an unknown role must never
// grant access to elevated views.
impl From<String> for Role {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

/// Claims decoded from a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Subject claim (the account email).
    pub subject: String,
    /// Role classification.
    pub role: Role,
    /// Expiry, if the token carries one.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    /// Returns `true` if this identity holds the elevated role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_elevated()
    }

    /// Returns `true` if the expiry has passed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// Reasons a credential cannot be decoded into an [`Identity`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Not three dot-separated segments.
    #[error("credential is not a three-part token")]
    Malformed,
    /// Payload segment is not base64url.
    #[error("credential payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    /// Payload is not the expected JSON claims object.
    #[error("credential claims are invalid: {0}")]
    Claims(#[from] serde_json::Error),
    /// Subject claim is empty.
    #[error("credential has no subject")]
    MissingSubject,
    /// `exp` is outside the representable range.
    #[error("credential expiry {0} is out of range")]
    InvalidExpiry(i64),
}

#[derive(Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Decode a credential into the identity it carries.
///
/// Purely local: reads the JWT payload without contacting the backend and
/// without verifying the signature.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the token is not a well-formed JWT with a
/// non-empty `sub` claim.
pub fn decode_identity(credential: &Credential) -> Result<Identity, DecodeError> {
    let mut segments = credential.expose().split('.');
    let payload = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(_header), Some(payload), Some(_signature), None) if !payload.is_empty() => payload,
        _ => return Err(DecodeError::Malformed),
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: Claims = serde_json::from_slice(&bytes)?;

    if claims.sub.trim().is_empty() {
        return Err(DecodeError::MissingSubject);
    }

    let expires_at = claims
        .exp
        .map(|exp| DateTime::from_timestamp(exp, 0).ok_or(DecodeError::InvalidExpiry(exp)))
        .transpose()?;

    Ok(Identity {
        subject: claims.sub,
        role: claims.role.map(Role::from).unwrap_or_default(),
        expires_at,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn token_with(claims: &serde_json::Value) -> Credential {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        Credential::new(format!("{header}.{payload}.c2lnbmF0dXJl"))
    }

    #[test]
    fn test_decodes_admin_identity() {
        let credential = token_with(&serde_json::json!({
            "sub": "admin@libris.test",
            "role": "admin",
            "exp": 1_900_000_000
        }));

        let identity = decode_identity(&credential).unwrap();
        assert_eq!(identity.subject, "admin@libris.test");
        assert!(identity.is_admin());
        assert_eq!(identity.expires_at.unwrap().timestamp(), 1_900_000_000);
    }

    #[test]
    fn test_missing_role_is_ordinary_user() {
        let credential = token_with(&serde_json::json!({ "sub": "reader@libris.test" }));
        let identity = decode_identity(&credential).unwrap();
        assert_eq!(identity.role, Role::User);
        assert!(identity.expires_at.is_none());
    }

    #[test]
    fn test_unknown_role_is_not_elevated() {
        let credential = token_with(&serde_json::json!({ "sub": "x@y.z", "role": "librarian" }));
        assert!(!decode_identity(&credential).unwrap().is_admin());
    }

    #[test]
    fn test_rejects_wrong_segment_count() {
        assert!(matches!(
            decode_identity(&Credential::new("not-a-token")),
            Err(DecodeError::Malformed)
        ));
        assert!(matches!(
            decode_identity(&Credential::new("a.b.c.d")),
            Err(DecodeError::Malformed)
        ));
    }

    #[test]
    fn test_rejects_garbage_payload() {
        assert!(matches!(
            decode_identity(&Credential::new("aGVhZGVy.!!!.sig")),
            Err(DecodeError::Base64(_))
        ));

        let not_json = URL_SAFE_NO_PAD.encode("plain text");
        assert!(matches!(
            decode_identity(&Credential::new(format!("h.{not_json}.s"))),
            Err(DecodeError::Claims(_))
        ));
    }

    #[test]
    fn test_rejects_empty_subject() {
        let credential = token_with(&serde_json::json!({ "sub": "  " }));
        assert!(matches!(
            decode_identity(&credential),
            Err(DecodeError::MissingSubject)
        ));
    }

    #[test]
    fn test_expiry_check() {
        let credential = token_with(&serde_json::json!({ "sub": "a@b.c", "exp": 100 }));
        let identity = decode_identity(&credential).unwrap();
        let now = DateTime::from_timestamp(200, 0).unwrap();
        assert!(identity.is_expired_at(now));
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("super-secret-token");
        assert!(!format!("{credential:?}").contains("super-secret-token"));
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        let role: Role = serde_json::from_str(r#""user""#).unwrap();
        assert_eq!(role, Role::User);
    }
}
