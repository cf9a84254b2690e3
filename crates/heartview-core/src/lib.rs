//! Client library for the Heartview heart-disease prediction service.
//!
//! The library talks to three collaborators: the prediction backend
//! (scoring and per-account history), an external identity provider
//! (sign-in, registration, password reset), and the identity project's
//! document store (user profiles). Sessions are explicit values;
//! every authenticated call takes one, and [`HeartviewClient`] keeps
//! the active session in a slot it refreshes when the token goes stale.
//!
//! Records fetched from the backend are filtered locally with
//! [`Query`] and [`filter_records`]; see the [`filter`] module for the
//! matching rules the history view relies on.
//!
//! # Example
//!
//! ```rust,ignore
//! use heartview_client::{HeartviewClient, Query, Settings};
//!
//! # async fn run() -> heartview_client::Result<()> {
//! let client = HeartviewClient::new(Settings::new("api-key", "heartview-prod"))?;
//! client.login("user@example.com", "secret").await?;
//!
//! let records = client.history().await?;
//! let query = Query::new(">150").with_column_label("Chol");
//! for record in heartview_client::filter_records(&records, &query) {
//!     println!("{} {}", record.id, record.rendered_prediction());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod history;
pub mod persist;
pub mod predict;
pub mod profile;
pub mod records;
pub mod selection;

pub use auth::{is_valid_email, IdentityClient, Registration, Session, SessionStore};
pub use config::Settings;
pub use error::{HeartviewError, Result};
pub use filter::{filter_records, ColumnSelector, MatchMode, Query, RangeTerm};
pub use history::{BatchDeleteOutcome, HistoryClient};
pub use predict::{
    sanitize_numeric_input, FeatureVector, PredictionClient, PredictionInput, PredictionOutcome,
};
pub use profile::{ProfileClient, UserProfile};
pub use records::{Column, ColumnKind, PredictionRecord};
pub use selection::RecordSelection;

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// High-level client tying the collaborators together.
///
/// Owns one HTTP client per collaborator, the on-disk session store,
/// and the in-memory session slot. Cheap to share behind an `Arc`.
pub struct HeartviewClient {
    identity: IdentityClient,
    history: HistoryClient,
    predictions: PredictionClient,
    profiles: ProfileClient,
    store: SessionStore,
    session: Arc<RwLock<Option<Session>>>,
}

impl HeartviewClient {
    /// Build a client with the default session store location.
    pub fn new(settings: Settings) -> Result<Self> {
        let store = SessionStore::new()?;
        Self::with_store(settings, store)
    }

    /// Build a client with an explicit session store.
    pub fn with_store(settings: Settings, store: SessionStore) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            identity: IdentityClient::new(&settings)?,
            history: HistoryClient::new(&settings)?,
            predictions: PredictionClient::new(&settings)?,
            profiles: ProfileClient::new(&settings)?,
            store,
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Build a client from `HEARTVIEW_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(Settings::from_env()?)
    }

    /// Sign in and persist the session for later runs.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.identity.sign_in(email, password).await?;
        self.store.save(&session)?;
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Drop the in-memory session and delete the saved one.
    pub async fn logout(&self) -> Result<()> {
        *self.session.write().await = None;
        self.store.clear()
    }

    /// The active session, refreshed when its token is stale.
    ///
    /// Resolution order: the in-memory slot, then the saved session
    /// file, then a `HEARTVIEW_REFRESH_TOKEN` from the environment.
    /// Sessions minted from the environment stay in memory only.
    pub async fn current_session(&self) -> Result<Session> {
        // Clone out of the slot before refreshing; refresh_into_slot
        // takes the write lock on the same slot.
        let slot = self.session.read().await.clone();
        if let Some(session) = slot {
            if !session.is_expired() {
                return Ok(session);
            }
            debug!("In-memory session expired, refreshing");
            return self
                .refresh_into_slot(session.refresh_token, session.email, true)
                .await;
        }

        if let Some(saved) = self.store.load()? {
            if !saved.is_expired() {
                *self.session.write().await = Some(saved.clone());
                return Ok(saved);
            }
            debug!("Saved session expired, refreshing");
            return self
                .refresh_into_slot(saved.refresh_token, saved.email, true)
                .await;
        }

        if let Some(token) = SessionStore::env_refresh_token() {
            debug!("Minting session from environment refresh token");
            return self.refresh_into_slot(token, String::new(), false).await;
        }

        Err(HeartviewError::NotSignedIn)
    }

    async fn refresh_into_slot(
        &self,
        refresh_token: String,
        email: String,
        persist: bool,
    ) -> Result<Session> {
        let session = self.identity.refresh(&refresh_token, &email).await?;
        if persist {
            self.store.save(&session)?;
        }
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Create an account, store its profile, and send the verification
    /// email.
    ///
    /// The fresh session is returned but not persisted; users sign in
    /// normally after verifying their address.
    pub async fn register(&self, registration: &Registration) -> Result<Session> {
        registration.validate()?;
        let session = self
            .identity
            .sign_up(&registration.email, &registration.password)
            .await?;
        let profile = UserProfile::new_registration(
            &registration.username,
            &registration.email,
            &registration.gender,
            &registration.dob,
        );
        self.profiles.create_profile(&session, &profile).await?;
        self.identity.send_verify_email(&session).await?;
        Ok(session)
    }

    /// Fetch the prediction history in backend order.
    pub async fn history(&self) -> Result<Vec<PredictionRecord>> {
        let session = self.current_session().await?;
        self.history.fetch_history(&session).await
    }

    /// Fetch the history and keep only records matching the query.
    pub async fn search_history(&self, query: &Query) -> Result<Vec<PredictionRecord>> {
        let records = self.history().await?;
        Ok(filter_records(&records, query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Delete the given records, one request per id.
    pub async fn delete_records(&self, ids: &[String]) -> Result<BatchDeleteOutcome> {
        let session = self.current_session().await?;
        Ok(self.history.delete_records(&session, ids).await)
    }

    /// Validate form input and submit it for scoring.
    pub async fn predict(&self, input: &PredictionInput) -> Result<PredictionOutcome> {
        let features = input.validate()?;
        let session = self.current_session().await?;
        self.predictions.submit(&session, &features).await
    }

    /// Start the forgot-password flow.
    ///
    /// Checks with the backend that an account exists for the address
    /// before asking the provider to send the reset email.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        if email.is_empty() {
            return Err(HeartviewError::validation(
                "email",
                "Please enter an email address.",
            ));
        }
        if !self.predictions.check_user_exists(email).await? {
            return Err(HeartviewError::validation(
                "email",
                "No account found with this email.",
            ));
        }
        self.identity.send_password_reset(email).await
    }

    /// Validate an emailed reset code. Returns the account email the
    /// code was issued for.
    pub async fn verify_reset_code(&self, code: &str) -> Result<String> {
        self.identity.verify_reset_code(code).await
    }

    /// Complete the reset with the emailed code and a new password.
    pub async fn confirm_password_reset(&self, code: &str, new_password: &str) -> Result<()> {
        self.identity.confirm_password_reset(code, new_password).await
    }

    /// The signed-in user's profile.
    pub async fn profile(&self) -> Result<UserProfile> {
        let session = self.current_session().await?;
        self.profiles.fetch_profile(&session).await
    }

    /// Change the profile's username.
    pub async fn set_username(&self, username: &str) -> Result<()> {
        let trimmed = username.trim();
        if trimmed.is_empty() {
            return Err(HeartviewError::validation(
                "username",
                "Username is required.",
            ));
        }
        let session = self.current_session().await?;
        self.profiles.update_username(&session, trimmed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_session_is_not_signed_in() {
        std::env::remove_var("HEARTVIEW_REFRESH_TOKEN");
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_path(dir.path().join("session.json"));
        let client =
            HeartviewClient::with_store(Settings::new("key", "heartview-dev"), store).unwrap();

        let err = client.current_session().await.unwrap_err();
        assert!(matches!(err, HeartviewError::NotSignedIn));
    }

    #[tokio::test]
    async fn test_reset_requires_an_email() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_path(dir.path().join("session.json"));
        let client =
            HeartviewClient::with_store(Settings::new("key", "heartview-dev"), store).unwrap();

        let err = client.request_password_reset("").await.unwrap_err();
        assert!(err.to_string().contains("Please enter an email address."));
    }

    #[tokio::test]
    async fn test_set_username_rejects_blank() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_path(dir.path().join("session.json"));
        let client =
            HeartviewClient::with_store(Settings::new("key", "heartview-dev"), store).unwrap();

        let err = client.set_username("   ").await.unwrap_err();
        assert!(matches!(err, HeartviewError::Validation { .. }));
    }
}
