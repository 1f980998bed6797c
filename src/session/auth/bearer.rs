//! Username/password exchange for an on-prem bearer token.
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use super::{read_token_payload, send_failure};
use crate::{
    lib::errors::AuthError,
    session::client::{join_segments, BearerToken},
};

/// Unauthenticated -> TokenRequested -> Authenticated. A failure leaves the
/// exchange in `TokenRequested` and no session is built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Unauthenticated,
    TokenRequested,
    Authenticated,
}

impl ExchangeState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ExchangeState::Unauthenticated => "unauthenticated",
            ExchangeState::TokenRequested => "token_requested",
            ExchangeState::Authenticated => "authenticated",
        }
    }
}

#[derive(Serialize)]
struct LoginInfo<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthToken {
    token: Option<String>,
    #[serde(default)]
    force_password_change: bool,
}

/// One-shot login against `{api_base_url}/auth/login`.
#[derive(Debug)]
pub struct TokenExchange {
    http: Client,
    login_url: Url,
    state: ExchangeState,
}

impl TokenExchange {
    pub fn new(http: Client, api_base_url: &Url) -> Result<Self, AuthError> {
        let login_url = join_segments(api_base_url, &["auth", "login"]).ok_or_else(|| {
            AuthError::InvalidEndpoint {
                url: api_base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            }
        })?;
        Ok(Self {
            http,
            login_url,
            state: ExchangeState::Unauthenticated,
        })
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn login_url(&self) -> &Url {
        &self.login_url
    }

    /// Post the credentials and return the issued token.
    pub async fn request_token(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<BearerToken, AuthError> {
        self.transition(ExchangeState::TokenRequested);

        let url = &self.login_url;
        let response = self
            .http
            .post(url.clone())
            .json(&LoginInfo { username, password })
            .send()
            .await
            .map_err(|source| send_failure(url, source))?;
        let payload: AuthToken = read_token_payload(response, url).await?;

        let token = payload
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::InvalidResponse {
                url: url.to_string(),
                message: "No token received from authentication".to_string(),
            })?;
        let token = BearerToken::from_token(&token).map_err(|err| AuthError::InvalidResponse {
            url: url.to_string(),
            message: err.to_string(),
        })?;

        if payload.force_password_change {
            warn!(
                target: "cribl_session::auth",
                username,
                "Leader requires a password change for this user"
            );
        }
        self.transition(ExchangeState::Authenticated);
        info!(target: "cribl_session::auth", username, "Authenticated with on-prem leader");
        Ok(token)
    }

    fn transition(&mut self, next: ExchangeState) {
        debug!(
            target: "cribl_session::auth",
            from = self.state.as_str(),
            to = next.as_str(),
            "Token exchange state change"
        );
        self.state = next;
    }
}
