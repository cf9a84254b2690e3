//! Identity, sessions, and credential persistence.
//!
//! Authentication lives with an external identity provider; this module
//! wraps its REST surface and keeps the resulting session as an explicit
//! value that callers hand to whatever needs to make an authenticated
//! call. Nothing here is ambient or global.

mod identity;
mod store;

pub use identity::IdentityClient;
pub use store::SessionStore;

use crate::config::NetworkConfig;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Email shape accepted at registration and sign-in.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// An authenticated user session.
///
/// Obtained from [`IdentityClient`] sign-in/sign-up/refresh and passed
/// explicitly into every authenticated backend call.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Identity provider user id; also the profile document id.
    pub uid: String,
    pub email: String,
    /// Short-lived bearer token for backend calls.
    pub id_token: String,
    /// Long-lived token used to mint fresh id tokens.
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// The Authorization header value for backend requests.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.id_token)
    }

    /// Whether the id token is expired (or close enough that a request
    /// sent now could die in flight).
    pub fn is_expired(&self) -> bool {
        let skew = chrono::Duration::from_std(NetworkConfig::TOKEN_EXPIRY_SKEW)
            .unwrap_or_else(|_| chrono::Duration::zero());
        Utc::now() + skew >= self.expires_at
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("id_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Registration form values, validated client-side before any network call.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub gender: String,
    pub dob: String,
}

impl Registration {
    /// Apply the registration form rules: username, password, gender and
    /// date of birth must be present, and the email must look like one.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::HeartviewError;

        if self.username.trim().is_empty() {
            return Err(HeartviewError::validation("username", "Username is required."));
        }
        if !EMAIL_PATTERN.is_match(&self.email) {
            return Err(HeartviewError::validation(
                "email",
                "Please enter a valid email address.",
            ));
        }
        if self.password.trim().is_empty() {
            return Err(HeartviewError::validation("password", "Password is required."));
        }
        if self.gender.is_empty() {
            return Err(HeartviewError::validation("gender", "Gender is required."));
        }
        if self.dob.is_empty() {
            return Err(HeartviewError::validation(
                "dob",
                "Date of Birth is required.",
            ));
        }
        Ok(())
    }
}

/// Whether a string passes the sign-in/registration email check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session(expires_at: DateTime<Utc>) -> Session {
        Session {
            uid: "uid-1".into(),
            email: "user@example.com".into(),
            id_token: "id-token".into(),
            refresh_token: "refresh-token".into(),
            expires_at,
        }
    }

    fn sample_registration() -> Registration {
        Registration {
            username: "pat".into(),
            email: "pat@example.com".into(),
            password: "hunter22".into(),
            gender: "F".into(),
            dob: "1990-04-01".into(),
        }
    }

    #[test]
    fn test_bearer_header_format() {
        let session = sample_session(Utc::now() + chrono::Duration::hours(1));
        assert_eq!(session.bearer_header(), "Bearer id-token");
    }

    #[test]
    fn test_is_expired_applies_skew() {
        let fresh = sample_session(Utc::now() + chrono::Duration::hours(1));
        assert!(!fresh.is_expired());

        let stale = sample_session(Utc::now() - chrono::Duration::minutes(1));
        assert!(stale.is_expired());

        // Inside the skew window counts as expired even though the
        // nominal expiry is still ahead.
        let dying = sample_session(Utc::now() + chrono::Duration::seconds(10));
        assert!(dying.is_expired());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let session = sample_session(Utc::now());
        let rendered = format!("{:?}", session);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("id-token"));
        assert!(!rendered.contains("refresh-token"));
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("user@nodot"));
    }

    #[test]
    fn test_registration_validation_accepts_complete_form() {
        assert!(sample_registration().validate().is_ok());
    }

    #[test]
    fn test_registration_validation_names_offending_field() {
        let mut reg = sample_registration();
        reg.username = "  ".into();
        let err = reg.validate().unwrap_err();
        assert!(err.to_string().contains("username"));

        let mut reg = sample_registration();
        reg.email = "bad-email".into();
        let err = reg.validate().unwrap_err();
        assert!(err.to_string().contains("email"));

        let mut reg = sample_registration();
        reg.dob = "".into();
        let err = reg.validate().unwrap_err();
        assert!(err.to_string().contains("dob"));
    }
}
