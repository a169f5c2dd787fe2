use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub client_id: String,
    pub client_name: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

/// In-memory registry of issued bearer tokens. Tokens are opaque UUIDs;
/// a restart invalidates them all, clients simply request a new one.
#[derive(Clone, Debug)]
pub struct TokenRegistry {
    tokens: Arc<RwLock<HashMap<String, IssuedToken>>>,
    ttl: chrono::Duration,
}

#[derive(Debug)]
struct IssuedToken {
    client_id: String,
    expires_at: DateTime<Utc>,
}

impl TokenRegistry {
    pub fn new(ttl: Duration) -> Self {
        TokenRegistry {
            tokens: Arc::new(RwLock::new(HashMap::new())),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::hours(24)),
        }
    }

    pub async fn issue(&self, request: &TokenRequest) -> TokenResponse {
        let access_token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + self.ttl;

        self.tokens.write().await.insert(
            access_token.clone(),
            IssuedToken {
                client_id: request.client_id.clone(),
                expires_at,
            },
        );

        info!("🔑 Issued a token to client '{}' ({})", request.client_id, request.client_name);
        TokenResponse {
            access_token,
            token_type: "bearer",
            expires_at,
        }
    }

    pub async fn is_valid(&self, token: &str) -> bool {
        self.tokens.read().await.get(token).is_some_and(|issued| issued.expires_at > Utc::now())
    }

    /// Client id the token was issued to, for audit logging.
    pub async fn client_id(&self, token: &str) -> Option<String> {
        self.tokens.read().await.get(token).map(|issued| issued.client_id.clone())
    }
}
