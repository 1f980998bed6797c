//! HTTP client construction per TLS policy.
use reqwest::Client;
use url::Url;

use crate::lib::{errors::AuthError, telemetry};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Whether the server certificate is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    Verify,
    /// Accept any certificate, including self-signed ones. Opt-in only.
    InsecureAcceptSelfSigned,
}

impl TlsPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TlsPolicy::Verify => "verify",
            TlsPolicy::InsecureAcceptSelfSigned => "insecure_accept_self_signed",
        }
    }

    pub const fn is_insecure(&self) -> bool {
        matches!(self, TlsPolicy::InsecureAcceptSelfSigned)
    }
}

/// Build the HTTP client for `target`. The insecure policy is always logged at `warn`.
pub fn build_http_client(policy: TlsPolicy, target: &Url) -> Result<Client, AuthError> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if policy.is_insecure() {
        telemetry::warn_insecure_tls(target);
        builder = builder.danger_accept_invalid_certs(true);
    }
    builder
        .build()
        .map_err(|source| AuthError::ClientBuild { source })
}
