use std::fmt;

use url::Url;

use crate::{lib::errors::ConfigError, session::transport::TlsPolicy};

use super::{FieldCheck, RawCriblEnv, PASSWORD_ENV, SERVER_URL_ENV, USERNAME_ENV};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:19000";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";

/// Username/password credentials for a self-hosted leader.
#[derive(Clone, PartialEq, Eq)]
pub struct OnPremCredentials {
    pub server_url: Url,
    /// `{server_url}/api/v1`.
    pub api_base_url: Url,
    pub username: String,
    pub password: String,
    pub insecure_tls: bool,
}

impl OnPremCredentials {
    /// Verification is skipped only for `https` targets with the opt-in set.
    pub fn tls_policy(&self) -> TlsPolicy {
        if self.server_url.scheme() == "https" && self.insecure_tls {
            TlsPolicy::InsecureAcceptSelfSigned
        } else {
            TlsPolicy::Verify
        }
    }
}

impl fmt::Debug for OnPremCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnPremCredentials")
            .field("server_url", &self.server_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("insecure_tls", &self.insecure_tls)
            .finish()
    }
}

/// Every field has a default; only placeholder and malformed values fail.
pub fn resolve_onprem_credentials(raw: &RawCriblEnv) -> Result<OnPremCredentials, ConfigError> {
    let mut check = FieldCheck::default();
    let server_url =
        check.with_default(SERVER_URL_ENV, raw.server_url.as_ref(), DEFAULT_SERVER_URL);
    let username = check.with_default(USERNAME_ENV, raw.username.as_ref(), DEFAULT_USERNAME);
    let password = check.with_default(PASSWORD_ENV, raw.password.as_ref(), DEFAULT_PASSWORD);
    check.finish()?;

    let (server_url, api_base_url) = parse_server_url(&server_url)?;
    Ok(OnPremCredentials {
        server_url,
        api_base_url,
        username,
        password,
        insecure_tls: parse_insecure_tls(raw.insecure_tls.as_deref()),
    })
}

/// Unset means insecure; only a case-insensitive `false` turns verification on.
pub fn parse_insecure_tls(raw: Option<&str>) -> bool {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => true,
        Some(value) => !value.eq_ignore_ascii_case("false"),
    }
}

fn parse_server_url(value: &str) -> Result<(Url, Url), ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    let invalid = |message: String| ConfigError::InvalidField {
        var: SERVER_URL_ENV,
        message,
    };

    let server_url = Url::parse(trimmed).map_err(|err| invalid(format!("{err}: `{value}`")))?;
    if !matches!(server_url.scheme(), "http" | "https") || server_url.host_str().is_none() {
        return Err(invalid(format!(
            "expected an http:// or https:// URL, got `{value}`"
        )));
    }
    let api_base_url = Url::parse(&format!("{trimmed}/api/v1"))
        .map_err(|err| invalid(format!("{err}: `{value}`")))?;

    Ok((server_url, api_base_url))
}
