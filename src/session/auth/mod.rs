//! Authentication strategies, each producing a [`Session`].
use reqwest::Response;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    lib::{
        errors::{AuthError, ConfigError},
        telemetry,
        tls::is_certificate_error,
    },
    session::{
        client::{truncate_body, AuthHeaderProvider, Session},
        config::{CloudCredentials, Credentials, OnPremCredentials},
        transport::{build_http_client, TlsPolicy},
    },
};

pub mod bearer;
pub mod oauth;

pub use bearer::{ExchangeState, TokenExchange};
pub use oauth::{cloud_base_url, OAuthClientConfig, OAuthTokenSource};

/// Which API a session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiPlane {
    /// Worker groups; cloud workspace URL or on-prem leader.
    Control,
    /// Workspaces; cloud gateway only.
    Management,
}

/// Authentication strategy selected by the deployment discriminant.
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    OAuthClientCredentials {
        credentials: CloudCredentials,
        plane: ApiPlane,
    },
    BearerTokenExchange(OnPremCredentials),
}

impl AuthStrategy {
    /// Pair credentials with the plane being called.
    pub fn select(credentials: Credentials, plane: ApiPlane) -> Result<Self, ConfigError> {
        match (credentials, plane) {
            (Credentials::Cloud(credentials), plane) => {
                Ok(AuthStrategy::OAuthClientCredentials { credentials, plane })
            }
            (Credentials::OnPrem(credentials), ApiPlane::Control) => {
                Ok(AuthStrategy::BearerTokenExchange(credentials))
            }
            (Credentials::OnPrem(_), ApiPlane::Management) => Err(ConfigError::UnsupportedPlane),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            AuthStrategy::OAuthClientCredentials { .. } => "oauth_client_credentials",
            AuthStrategy::BearerTokenExchange(_) => "bearer_token_exchange",
        }
    }

    pub fn tls_policy(&self) -> TlsPolicy {
        match self {
            AuthStrategy::OAuthClientCredentials { .. } => TlsPolicy::Verify,
            AuthStrategy::BearerTokenExchange(credentials) => credentials.tls_policy(),
        }
    }

    /// Base URL the session will target.
    pub fn base_url(&self) -> Result<Url, AuthError> {
        match self {
            AuthStrategy::OAuthClientCredentials { credentials, plane } => {
                cloud_base_url(credentials, *plane)
            }
            AuthStrategy::BearerTokenExchange(credentials) => Ok(credentials.api_base_url.clone()),
        }
    }

    /// Organization whose workspaces the management plane lists.
    pub fn organization_id(&self) -> Option<&str> {
        match self {
            AuthStrategy::OAuthClientCredentials { credentials, .. } => {
                Some(credentials.org_id.as_str())
            }
            AuthStrategy::BearerTokenExchange(_) => None,
        }
    }

    /// Build the authenticated session.
    ///
    /// The on-prem exchange calls the token endpoint exactly once; any failure
    /// aborts without producing a session. The cloud flow defers the token
    /// request to the first API call.
    pub async fn establish(&self) -> Result<Session, AuthError> {
        let session = match self {
            AuthStrategy::OAuthClientCredentials { credentials, plane } => {
                establish_oauth(credentials, *plane)?
            }
            AuthStrategy::BearerTokenExchange(credentials) => establish_bearer(credentials).await?,
        };

        telemetry::emit_session_ready(
            self.name(),
            session.base_url(),
            session.tls_policy().is_insecure(),
        );
        Ok(session)
    }
}

fn establish_oauth(credentials: &CloudCredentials, plane: ApiPlane) -> Result<Session, AuthError> {
    let base_url = cloud_base_url(credentials, plane)?;
    let config = OAuthClientConfig::for_cloud(credentials)?;
    let http = build_http_client(TlsPolicy::Verify, &base_url)?;
    let tokens = OAuthTokenSource::new(http.clone(), config);

    Ok(Session::new(
        base_url,
        http,
        AuthHeaderProvider::OAuth(tokens),
        TlsPolicy::Verify,
    ))
}

async fn establish_bearer(credentials: &OnPremCredentials) -> Result<Session, AuthError> {
    let policy = credentials.tls_policy();
    let http = build_http_client(policy, &credentials.server_url)?;

    let mut exchange = TokenExchange::new(http.clone(), &credentials.api_base_url)?;
    let token = exchange
        .request_token(&credentials.username, &credentials.password)
        .await?;

    Ok(Session::new(
        credentials.api_base_url.clone(),
        http,
        AuthHeaderProvider::Static(token),
        policy,
    ))
}

pub(crate) fn parse_endpoint(raw: String) -> Result<Url, AuthError> {
    Url::parse(&raw).map_err(|source| AuthError::InvalidEndpoint { url: raw, source })
}

pub(crate) fn send_failure(url: &Url, source: reqwest::Error) -> AuthError {
    let url = url.to_string();
    if is_certificate_error(&source) {
        AuthError::Certificate { url, source }
    } else {
        AuthError::Transport { url, source }
    }
}

/// Non-2xx is a rejection; an undecodable body is an invalid response.
pub(crate) async fn read_token_payload<T: DeserializeOwned>(
    response: Response,
    url: &Url,
) -> Result<T, AuthError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Rejected {
            url: url.to_string(),
            status,
            body: truncate_body(&body),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|err| AuthError::InvalidResponse {
            url: url.to_string(),
            message: err.to_string(),
        })
}
