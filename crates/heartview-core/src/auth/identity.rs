//! REST client for the external identity provider.
//!
//! Wraps the provider's account endpoints (password sign-in, sign-up,
//! out-of-band reset/verification codes) and its token refresh service.
//! Provider error codes are mapped onto the wording the views show.

use super::Session;
use crate::config::{NetworkConfig, Settings};
use crate::error::{HeartviewError, Result};
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Client for the identity provider's REST API.
pub struct IdentityClient {
    client: Client,
    identity_base: String,
    token_base: String,
    api_key: String,
}

/// Credentials body for password sign-in and sign-up.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

/// Successful response from the account endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    refresh_token: String,
    /// Lifetime in seconds, as a decimal string.
    expires_in: String,
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Successful response from the token refresh service (snake_case wire).
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ResetCodeResponse {
    email: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

impl IdentityClient {
    /// Create a client for the configured identity project.
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
            identity_base: settings.identity_base.clone(),
            token_base: settings.token_base.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    fn accounts_url(&self, op: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.identity_base, op, self.api_key
        )
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let body = PasswordCredentials {
            email,
            password,
            return_secure_token: true,
        };
        let response = self
            .client
            .post(self.accounts_url("signInWithPassword"))
            .json(&body)
            .send()
            .await?;
        let token: TokenResponse = self.handle_response(response, "sign-in").await?;
        let session = session_from_token(token, email);
        info!("Signed in as {}", session.email);
        Ok(session)
    }

    /// Create a new account with email and password.
    ///
    /// Callers validate the full registration form first; this only
    /// creates the credential pair and returns the fresh session.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let body = PasswordCredentials {
            email,
            password,
            return_secure_token: true,
        };
        let response = self
            .client
            .post(self.accounts_url("signUp"))
            .json(&body)
            .send()
            .await?;
        let token: TokenResponse = self.handle_response(response, "sign-up").await?;
        let session = session_from_token(token, email);
        info!("Registered account for {}", session.email);
        Ok(session)
    }

    /// Email the user a password reset code.
    pub async fn send_password_reset(&self, email: &str) -> Result<()> {
        let body = serde_json::json!({
            "requestType": "PASSWORD_RESET",
            "email": email,
        });
        let response = self
            .client
            .post(self.accounts_url("sendOobCode"))
            .json(&body)
            .send()
            .await?;
        self.handle_response::<serde_json::Value>(response, "password reset email")
            .await?;
        info!("Password reset email requested");
        Ok(())
    }

    /// Email the signed-in user a verification link.
    pub async fn send_verify_email(&self, session: &Session) -> Result<()> {
        let body = serde_json::json!({
            "requestType": "VERIFY_EMAIL",
            "idToken": session.id_token,
        });
        let response = self
            .client
            .post(self.accounts_url("sendOobCode"))
            .json(&body)
            .send()
            .await?;
        self.handle_response::<serde_json::Value>(response, "verification email")
            .await?;
        Ok(())
    }

    /// Check a reset code from the emailed link. Returns the account
    /// email the code belongs to.
    pub async fn verify_reset_code(&self, code: &str) -> Result<String> {
        let body = serde_json::json!({ "oobCode": code });
        let response = self
            .client
            .post(self.accounts_url("resetPassword"))
            .json(&body)
            .send()
            .await?;
        let parsed: ResetCodeResponse = self.handle_response(response, "reset code check").await?;
        Ok(parsed.email)
    }

    /// Consume a reset code and set the new password.
    pub async fn confirm_password_reset(&self, code: &str, new_password: &str) -> Result<()> {
        let body = serde_json::json!({
            "oobCode": code,
            "newPassword": new_password,
        });
        let response = self
            .client
            .post(self.accounts_url("resetPassword"))
            .json(&body)
            .send()
            .await?;
        self.handle_response::<serde_json::Value>(response, "password reset")
            .await?;
        info!("Password reset confirmed");
        Ok(())
    }

    /// Mint a fresh session from a refresh token.
    ///
    /// The refresh service does not echo the account email, so callers
    /// pass whatever they knew; an empty hint is fine for env-provided
    /// tokens.
    pub async fn refresh(&self, refresh_token: &str, email_hint: &str) -> Result<Session> {
        let url = format!("{}/v1/token?key={}", self.token_base, self.api_key);
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let response = self.client.post(url).form(&form).send().await?;
        let refreshed: RefreshResponse = match self.handle_response(response, "refresh").await {
            Ok(r) => r,
            // Any provider rejection of a refresh token means the session
            // is gone; surface that directly.
            Err(HeartviewError::Auth { code, .. }) => {
                warn!("Token refresh rejected ({:?})", code);
                return Err(HeartviewError::SessionExpired);
            }
            Err(e) => return Err(e),
        };

        debug!("Refreshed session for uid {}", refreshed.user_id);
        Ok(Session {
            uid: refreshed.user_id,
            email: email_hint.to_string(),
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: Utc::now() + expiry_duration(&refreshed.expires_in),
        })
    }

    /// Decode a success body, or map the provider's error envelope onto
    /// our error type.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        op: &str,
    ) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| HeartviewError::Json {
                message: format!("Failed to parse {} response: {}", op, e),
                source: None,
            });
        }

        let code = response
            .json::<ProviderErrorBody>()
            .await
            .ok()
            .map(|body| provider_code(&body.error.message));
        warn!("Identity {} failed with {} ({:?})", op, status, code);
        Err(HeartviewError::Auth {
            message: friendly_auth_message(code.as_deref()),
            code,
        })
    }
}

fn session_from_token(token: TokenResponse, fallback_email: &str) -> Session {
    let email = token
        .email
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| fallback_email.to_string());
    Session {
        uid: token.local_id,
        email,
        id_token: token.id_token,
        refresh_token: token.refresh_token,
        expires_at: Utc::now() + expiry_duration(&token.expires_in),
    }
}

fn expiry_duration(expires_in: &str) -> chrono::Duration {
    let secs = expires_in.trim().parse::<i64>().unwrap_or(3600);
    chrono::Duration::seconds(secs)
}

/// First token of the provider's error message, e.g.
/// "WEAK_PASSWORD : Password should be at least 6 characters".
fn provider_code(message: &str) -> String {
    message
        .split_whitespace()
        .next()
        .unwrap_or("UNKNOWN")
        .to_string()
}

/// The wording the views show for each provider rejection.
fn friendly_auth_message(code: Option<&str>) -> String {
    match code {
        Some(
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL"
            | "USER_DISABLED",
        ) => "Invalid credentials. Please try again.".to_string(),
        Some("EMAIL_EXISTS" | "WEAK_PASSWORD") => {
            "Registration failed. Please try again.".to_string()
        }
        Some("EXPIRED_OOB_CODE" | "INVALID_OOB_CODE") => {
            "Invalid or expired reset link.".to_string()
        }
        Some(other) => format!("Authentication failed ({})", other),
        None => "An error occurred. Please try again.".to_string(),
    }
}
