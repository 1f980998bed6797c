//! OAuth client-credentials token source for Cribl.Cloud.
use std::{
    fmt,
    time::{Duration, Instant},
};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use super::{parse_endpoint, read_token_payload, send_failure, ApiPlane};
use crate::{
    lib::errors::AuthError,
    session::{client::BearerToken, config::CloudCredentials},
};

/// Tokens are refreshed this long before they expire.
pub const REFRESH_LEEWAY: Duration = Duration::from_secs(60);

/// Base URL for `plane`.
///
/// Control: `https://{workspace}-{org}.{domain}/api/v1`.
/// Management: `https://gateway.{domain}`.
pub fn cloud_base_url(credentials: &CloudCredentials, plane: ApiPlane) -> Result<Url, AuthError> {
    let raw = match plane {
        ApiPlane::Control => format!(
            "https://{}-{}.{}/api/v1",
            credentials.workspace_name, credentials.org_id, credentials.domain
        ),
        ApiPlane::Management => format!("https://gateway.{}", credentials.domain),
    };
    parse_endpoint(raw)
}

#[derive(Clone)]
pub struct OAuthClientConfig {
    pub token_url: Url,
    pub audience: String,
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthClientConfig {
    pub fn new(
        token_url: Url,
        audience: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            token_url,
            audience: audience.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// `https://login.{domain}/oauth/token` with audience `https://api.{domain}`.
    pub fn for_cloud(credentials: &CloudCredentials) -> Result<Self, AuthError> {
        let token_url = parse_endpoint(format!("https://login.{}/oauth/token", credentials.domain))?;
        Ok(Self::new(
            token_url,
            format!("https://api.{}", credentials.domain),
            credentials.client_id.clone(),
            credentials.client_secret.clone(),
        ))
    }
}

impl fmt::Debug for OAuthClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClientConfig")
            .field("token_url", &self.token_url.as_str())
            .field("audience", &self.audience)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    token_type: Option<String>,
}

struct CachedToken {
    token: BearerToken,
    /// `None` when the server did not say how long the token lives.
    refresh_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        self.refresh_at.map_or(true, |refresh_at| now < refresh_at)
    }
}

/// Fetches a client-credentials token on first use and reuses it until it nears expiry.
pub struct OAuthTokenSource {
    http: Client,
    config: OAuthClientConfig,
    cached: Mutex<Option<CachedToken>>,
}

impl OAuthTokenSource {
    pub fn new(http: Client, config: OAuthClientConfig) -> Self {
        Self {
            http,
            config,
            cached: Mutex::new(None),
        }
    }

    /// Current token, fetching a new one when none is cached or it is about to expire.
    pub async fn bearer(&self) -> Result<BearerToken, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.is_fresh(Instant::now()) {
                return Ok(entry.token.clone());
            }
            debug!(target: "cribl_session::auth", "Cached OAuth token is expiring; refreshing");
        }

        let entry = self.fetch().await?;
        let token = entry.token.clone();
        *cached = Some(entry);
        Ok(token)
    }

    async fn fetch(&self) -> Result<CachedToken, AuthError> {
        let url = &self.config.token_url;
        debug!(
            target: "cribl_session::auth",
            token_url = %url,
            audience = %self.config.audience,
            client_id = %self.config.client_id,
            "Requesting OAuth client-credentials token"
        );

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("audience", self.config.audience.as_str()),
        ];
        let requested_at = Instant::now();
        let response = self
            .http
            .post(url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|source| send_failure(url, source))?;
        let payload: TokenResponse = read_token_payload(response, url).await?;

        if let Some(token_type) = payload.token_type.as_deref() {
            if !token_type.eq_ignore_ascii_case("bearer") {
                return Err(AuthError::InvalidResponse {
                    url: url.to_string(),
                    message: format!("unsupported token type `{token_type}`"),
                });
            }
        }
        let access_token = payload
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::InvalidResponse {
                url: url.to_string(),
                message: "no access_token in token response".to_string(),
            })?;
        let token = BearerToken::from_token(&access_token).map_err(|err| {
            AuthError::InvalidResponse {
                url: url.to_string(),
                message: err.to_string(),
            }
        })?;

        let refresh_at = payload.expires_in.map(|seconds| {
            requested_at + Duration::from_secs(seconds).saturating_sub(REFRESH_LEEWAY)
        });
        info!(
            target: "cribl_session::auth",
            expires_in = payload.expires_in,
            "Obtained OAuth access token"
        );

        Ok(CachedToken { token, refresh_at })
    }
}

impl fmt::Debug for OAuthTokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokenSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
