// Client for the session/credentials collaborator
// Platform access tokens are brokered by a separate service; this engine
// only resolves the token for a shop when it needs to call the platform.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by the session provider
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session for shop {0}")]
    Unauthenticated(String),

    #[error("session store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("session store returned {status}")]
    Remote { status: u16 },
}

/// Resolves platform credentials for a shop
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn access_token(&self, shop: &str) -> Result<String, SessionError>;
}

/// HTTP implementation backed by the session store service
#[derive(Clone)]
pub struct HttpSessionStore {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SessionEnvelope {
    access_token: String,
}

impl HttpSessionStore {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }
}

#[async_trait]
impl SessionProvider for HttpSessionStore {
    async fn access_token(&self, shop: &str) -> Result<String, SessionError> {
        let url = format!("{}/sessions/{}", self.base_url, shop);
        let response = self.http.get(&url).send().await?;

        match response.status().as_u16() {
            404 => Err(SessionError::Unauthenticated(shop.to_string())),
            status if !response.status().is_success() => Err(SessionError::Remote { status }),
            _ => Ok(response.json::<SessionEnvelope>().await?.access_token),
        }
    }
}
