//! User profile documents in the cloud document store.
//!
//! Profiles live at `users/{uid}` in the identity project's document
//! database, addressed through its REST API with the session's id token.
//! Every field is a plain string; `createdAt` carries an ISO-8601
//! timestamp. A missing document is normal for accounts that predate
//! profiles, so reads fall back to "N/A" instead of failing.

use crate::auth::Session;
use crate::config::{NetworkConfig, Settings};
use crate::error::{HeartviewError, Result};
use chrono::{SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Shown for any profile field that has no stored value.
const MISSING: &str = "N/A";

/// A user profile document.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub gender: String,
    pub dob: String,
    pub created_at: String,
}

impl UserProfile {
    /// Fresh profile for a newly registered account, stamped now.
    pub fn new_registration(username: &str, email: &str, gender: &str, dob: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            gender: gender.to_string(),
            dob: dob.to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    fn missing_for(session: &Session) -> Self {
        Self {
            username: MISSING.to_string(),
            email: non_empty_or_missing(&session.email),
            gender: MISSING.to_string(),
            dob: MISSING.to_string(),
            created_at: MISSING.to_string(),
        }
    }

    fn from_document(document: &DocumentBody, session: &Session) -> Self {
        let field = |name: &str| -> Option<String> {
            document
                .fields
                .get(name)
                .and_then(|v| v.string_value.clone())
                .filter(|s| !s.is_empty())
        };
        Self {
            username: field("username").unwrap_or_else(|| MISSING.to_string()),
            email: field("email").unwrap_or_else(|| non_empty_or_missing(&session.email)),
            gender: field("gender").unwrap_or_else(|| MISSING.to_string()),
            dob: field("dob").unwrap_or_else(|| MISSING.to_string()),
            created_at: field("createdAt").unwrap_or_else(|| MISSING.to_string()),
        }
    }
}

fn non_empty_or_missing(value: &str) -> String {
    if value.is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}

/// Document envelope used by the store's REST API.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DocumentBody {
    #[serde(default)]
    fields: BTreeMap<String, FieldValue>,
}

impl DocumentBody {
    fn from_profile(profile: &UserProfile) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("username".to_string(), string_field(&profile.username));
        fields.insert("email".to_string(), string_field(&profile.email));
        fields.insert("gender".to_string(), string_field(&profile.gender));
        fields.insert("dob".to_string(), string_field(&profile.dob));
        fields.insert("createdAt".to_string(), string_field(&profile.created_at));
        Self { fields }
    }
}

/// One typed value in a document. Only string values are used here;
/// anything else reads back as absent.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FieldValue {
    #[serde(
        rename = "stringValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    string_value: Option<String>,
}

fn string_field(value: &str) -> FieldValue {
    FieldValue {
        string_value: Some(value.to_string()),
    }
}

/// Client for profile reads and writes.
pub struct ProfileClient {
    client: Client,
    firestore_base: String,
    project_id: String,
}

impl ProfileClient {
    /// Create a client for the configured document store.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(NetworkConfig::REQUEST_TIMEOUT)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| HeartviewError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            firestore_base: settings.firestore_base.clone(),
            project_id: settings.project_id.clone(),
        })
    }

    fn document_url(&self, uid: &str) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/users/{}",
            self.firestore_base,
            self.project_id,
            urlencoding::encode(uid)
        )
    }

    /// Fetch the signed-in user's profile.
    ///
    /// A missing document comes back as all "N/A" with the email taken
    /// from the session rather than as an error.
    pub async fn fetch_profile(&self, session: &Session) -> Result<UserProfile> {
        let response = self
            .client
            .get(self.document_url(&session.uid))
            .header("Authorization", session.bearer_header())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("No profile document for uid {}", session.uid);
            return Ok(UserProfile::missing_for(session));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(HeartviewError::SessionExpired);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(HeartviewError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        let document: DocumentBody = response.json().await.map_err(|e| HeartviewError::Json {
            message: format!("Failed to parse profile document: {}", e),
            source: None,
        })?;
        Ok(UserProfile::from_document(&document, session))
    }

    /// Create or overwrite the whole profile document.
    pub async fn create_profile(&self, session: &Session, profile: &UserProfile) -> Result<()> {
        let body = DocumentBody::from_profile(profile);
        let response = self
            .client
            .patch(self.document_url(&session.uid))
            .header("Authorization", session.bearer_header())
            .json(&body)
            .send()
            .await?;
        self.check_write(response, "profile create").await?;
        info!("Stored profile for {}", profile.email);
        Ok(())
    }

    /// Rewrite only the username field, leaving the rest untouched.
    pub async fn update_username(&self, session: &Session, username: &str) -> Result<()> {
        let url = format!(
            "{}?updateMask.fieldPaths=username",
            self.document_url(&session.uid)
        );
        let mut fields = BTreeMap::new();
        fields.insert("username".to_string(), string_field(username));
        let body = DocumentBody { fields };

        let response = self
            .client
            .patch(url)
            .header("Authorization", session.bearer_header())
            .json(&body)
            .send()
            .await?;
        self.check_write(response, "username update").await?;
        info!("Username updated");
        Ok(())
    }

    async fn check_write(&self, response: reqwest::Response, op: &str) -> Result<()> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(HeartviewError::SessionExpired);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Document {} failed with {}", op, status);
            return Err(HeartviewError::Backend {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        Session {
            uid: "uid-7".into(),
            email: "user@example.com".into(),
            id_token: "id".into(),
            refresh_token: "refresh".into(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
        }
    }

    #[test]
    fn test_document_body_wraps_string_values() {
        let profile = UserProfile::new_registration("pat", "pat@example.com", "F", "1990-04-02");
        let json = serde_json::to_value(DocumentBody::from_profile(&profile)).unwrap();
        assert_eq!(json["fields"]["username"]["stringValue"], "pat");
        assert_eq!(json["fields"]["gender"]["stringValue"], "F");
        assert!(json["fields"]["createdAt"]["stringValue"]
            .as_str()
            .unwrap()
            .ends_with('Z'));
    }

    #[test]
    fn test_from_document_applies_missing_fallbacks() {
        let json = serde_json::json!({
            "name": "projects/p/databases/(default)/documents/users/uid-7",
            "fields": {
                "username": { "stringValue": "pat" },
                "dob": { "stringValue": "" }
            }
        });
        let document: DocumentBody = serde_json::from_value(json).unwrap();
        let profile = UserProfile::from_document(&document, &sample_session());
        assert_eq!(profile.username, "pat");
        assert_eq!(profile.email, "user@example.com");
        assert_eq!(profile.gender, "N/A");
        assert_eq!(profile.dob, "N/A");
    }

    #[test]
    fn test_missing_document_uses_session_email() {
        let profile = UserProfile::missing_for(&sample_session());
        assert_eq!(profile.username, "N/A");
        assert_eq!(profile.email, "user@example.com");
    }

    #[test]
    fn test_non_string_values_read_as_absent() {
        let json = serde_json::json!({
            "fields": {
                "username": { "integerValue": "42" }
            }
        });
        let document: DocumentBody = serde_json::from_value(json).unwrap();
        let profile = UserProfile::from_document(&document, &sample_session());
        assert_eq!(profile.username, "N/A");
    }

    #[test]
    fn test_document_url_shape() {
        let client = ProfileClient::new(&Settings::new("key", "heartview-dev")).unwrap();
        assert_eq!(
            client.document_url("uid-7"),
            "https://firestore.googleapis.com/v1/projects/heartview-dev/databases/(default)/documents/users/uid-7"
        );
    }
}
