//! The authenticated session handed to the API layer.
use std::fmt;

use reqwest::{
    header::{HeaderValue, InvalidHeaderValue, AUTHORIZATION},
    Client,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{auth::oauth::OAuthTokenSource, transport::TlsPolicy};
use crate::lib::{
    errors::{ApiError, AuthError},
    tls::is_certificate_error,
};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Opaque bearer token. Held in memory only; `Debug` never shows it.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    header: HeaderValue,
}

impl BearerToken {
    /// Fails when the token has characters not allowed in an HTTP header.
    pub fn from_token(token: &str) -> Result<Self, InvalidHeaderValue> {
        let mut header = HeaderValue::from_str(&format!("Bearer {token}"))?;
        header.set_sensitive(true);
        Ok(Self { header })
    }

    pub fn header_value(&self) -> HeaderValue {
        self.header.clone()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Produces the `Authorization` header for each request.
pub enum AuthHeaderProvider {
    /// Token obtained once up front (on-prem exchange).
    Static(BearerToken),
    /// Token fetched on first use and cached (cloud client credentials).
    OAuth(OAuthTokenSource),
}

impl AuthHeaderProvider {
    pub async fn header(&self) -> Result<HeaderValue, AuthError> {
        match self {
            AuthHeaderProvider::Static(token) => Ok(token.header_value()),
            AuthHeaderProvider::OAuth(source) => Ok(source.bearer().await?.header_value()),
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            AuthHeaderProvider::Static(_) => "static_bearer",
            AuthHeaderProvider::OAuth(_) => "oauth_client_credentials",
        }
    }
}

impl fmt::Debug for AuthHeaderProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthHeaderProvider")
            .field(&self.kind())
            .finish()
    }
}

/// Base URL, auth header provider, and TLS policy for one run.
#[derive(Debug)]
pub struct Session {
    base_url: Url,
    http: Client,
    auth: AuthHeaderProvider,
    tls_policy: TlsPolicy,
}

impl Session {
    pub fn new(base_url: Url, http: Client, auth: AuthHeaderProvider, tls_policy: TlsPolicy) -> Self {
        Self {
            base_url,
            http,
            auth,
            tls_policy,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn tls_policy(&self) -> TlsPolicy {
        self.tls_policy
    }

    pub fn auth(&self) -> &AuthHeaderProvider {
        &self.auth
    }

    /// Append percent-encoded path segments to the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        join_segments(&self.base_url, segments).ok_or_else(|| ApiError::InvalidEndpoint {
            base: self.base_url.to_string(),
        })
    }

    /// Authenticated `GET` decoding a JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let header = self.auth.header().await?;
        debug!(
            target: "cribl_session::api",
            url = %url,
            auth = self.auth.kind(),
            "Sending GET request"
        );

        let response = self
            .http
            .get(url.clone())
            .header(AUTHORIZATION, header)
            .send()
            .await
            .map_err(|source| request_failure(&url, source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body: truncate_body(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ApiError::Decode {
                url: url.to_string(),
                source,
            })
    }
}

pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}

pub(crate) fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

fn request_failure(url: &Url, source: reqwest::Error) -> ApiError {
    let url = url.to_string();
    if is_certificate_error(&source) {
        ApiError::Certificate { url, source }
    } else {
        ApiError::Network { url, source }
    }
}
