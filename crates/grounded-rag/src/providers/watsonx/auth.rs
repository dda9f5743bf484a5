//! IBM Cloud IAM authentication
//!
//! Exchanges an API key for a short-lived bearer token and caches it.

use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// Refresh this long before the token actually expires
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Failure to obtain an access token
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token exchange failed ({status}): {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// IAM authentication manager
pub struct IamAuth {
    api_key: String,
    iam_url: String,
    client: reqwest::Client,
    token: RwLock<Option<CachedToken>>,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

impl IamAuth {
    /// Create from an API key
    pub fn new(api_key: impl Into<String>, iam_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::config("IAM API key is empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            iam_url: iam_url.into(),
            client,
            token: RwLock::new(None),
        })
    }

    /// Create from the API key stored in environment variable `env_var`
    pub fn from_env(env_var: &str, iam_url: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var(env_var).map_err(|_| {
            Error::config(format!("Environment variable {} is not set", env_var))
        })?;
        Self::new(api_key, iam_url)
    }

    /// Get a valid access token (refreshing if needed)
    pub async fn get_token(&self) -> std::result::Result<String, AuthError> {
        {
            let token = self.token.read().await;
            if let Some(ref cached) = *token {
                if cached.expires_at > Instant::now() + EXPIRY_MARGIN {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let response = self.refresh_token().await?;

        let mut token = self.token.write().await;
        *token = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(response.expires_in),
        });

        Ok(response.access_token)
    }

    /// Exchange the API key for a new token
    async fn refresh_token(&self) -> std::result::Result<TokenResponse, AuthError> {
        tracing::debug!("Requesting IAM token from {}", self.iam_url);

        let response = self
            .client
            .post(&self.iam_url)
            .form(&[
                ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected { status, body });
        }

        Ok(response.json().await?)
    }
}
