use std::{io, path::PathBuf};

use config::ConfigError as ConfigLoaderError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while resolving credentials from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the `CRIBL_*` environment.
    #[error("Failed to read CRIBL_* environment variables: {source}")]
    EnvRead {
        #[source]
        source: ConfigLoaderError,
    },
    /// An explicitly requested dotenv file could not be loaded.
    #[error("Failed to load env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
    /// Required variables are unset or blank.
    #[error("Missing credentials: {}", .vars.join(", "))]
    MissingCredentials { vars: Vec<&'static str> },
    /// Required variables still carry the `your-` placeholder.
    #[error("Placeholder credentials are still set: {}", .vars.join(", "))]
    PlaceholderCredentials { vars: Vec<&'static str> },
    /// Variable is present but cannot be used.
    #[error("Environment variable {var} is invalid: {message}")]
    InvalidField { var: &'static str, message: String },
    /// The management plane was requested for an on-prem deployment.
    #[error("Workspaces are served by the cloud management plane; on-prem deployments have no management plane")]
    UnsupportedPlane,
}

/// Failures while turning credentials into an authenticated session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server certificate was rejected by the TLS stack.
    #[error("TLS certificate verification failed for {url}: {source}")]
    Certificate {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The token endpoint answered with a non-success status.
    #[error("Token endpoint {url} rejected the credentials (status {status}): {body}")]
    Rejected {
        url: String,
        status: StatusCode,
        body: String,
    },
    /// The token endpoint could not be reached.
    #[error("Token endpoint {url} is unreachable: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The token endpoint answered but no usable token came back.
    #[error("Token endpoint {url} returned an unusable response: {message}")]
    InvalidResponse { url: String, message: String },
    #[error("Failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid endpoint URL {url}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failures of an authenticated API call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("TLS certificate verification failed for {url}: {source}")]
    Certificate {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Cannot build a request URL on top of {base}")]
    InvalidEndpoint { base: String },
    /// OAuth tokens are fetched lazily, so a request can fail on authentication.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Top-level failure of one run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Authentication failed: {0}")]
    Authentication(#[source] AuthError),
    #[error("Network error: {0}")]
    Network(#[source] ApiError),
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl From<AuthError> for SessionError {
    fn from(value: AuthError) -> Self {
        SessionError::Authentication(value)
    }
}

impl From<ApiError> for SessionError {
    fn from(value: ApiError) -> Self {
        match value {
            ApiError::Auth(auth) => SessionError::Authentication(auth),
            other => SessionError::Network(other),
        }
    }
}

impl SessionError {
    /// True when the failure was a rejected server certificate.
    pub fn is_certificate_failure(&self) -> bool {
        matches!(
            self,
            SessionError::Authentication(AuthError::Certificate { .. })
                | SessionError::Network(ApiError::Certificate { .. })
        )
    }

    /// Pick the printed diagnostic for this failure class.
    pub fn descriptor(&self) -> &'static DiagnosticDescriptor {
        if self.is_certificate_failure() {
            return &TLS_CERTIFICATE_REJECTED_ERROR;
        }
        match self {
            SessionError::Config(ConfigError::MissingCredentials { .. }) => {
                &MISSING_CREDENTIALS_ERROR
            }
            SessionError::Config(ConfigError::PlaceholderCredentials { .. }) => {
                &PLACEHOLDER_CREDENTIALS_ERROR
            }
            SessionError::Config(_) => &INVALID_CONFIGURATION_ERROR,
            SessionError::Authentication(_) => &AUTHENTICATION_FAILED_ERROR,
            SessionError::Network(_) => &NETWORK_FAILURE_ERROR,
            SessionError::Output(_) => &OUTPUT_FAILURE_ERROR,
        }
    }

    /// Build the human-readable diagnostic printed at the end of a failed run.
    pub fn diagnostic(&self) -> Diagnostic {
        let descriptor = self.descriptor();
        match self {
            SessionError::Config(
                ConfigError::MissingCredentials { vars }
                | ConfigError::PlaceholderCredentials { vars },
            ) => Diagnostic {
                descriptor,
                headline: descriptor.message.to_string(),
                details: vars.iter().map(|var| var.to_string()).collect(),
            },
            other => Diagnostic {
                descriptor,
                headline: format!("Error: {other}"),
                details: Vec::new(),
            },
        }
    }
}

/// Static metadata describing how a failure class is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticDescriptor {
    /// Stable error code, used in logs.
    pub code: &'static str,
    /// User-facing message.
    pub message: &'static str,
    /// Recommended remediation, one printed line per entry.
    pub remediation: &'static [&'static str],
}

impl DiagnosticDescriptor {
    pub const fn new(
        code: &'static str,
        message: &'static str,
        remediation: &'static [&'static str],
    ) -> Self {
        Self {
            code,
            message,
            remediation,
        }
    }
}

/// A rendered-ready diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub descriptor: &'static DiagnosticDescriptor,
    pub headline: String,
    pub details: Vec<String>,
}

impl Diagnostic {
    pub fn code(&self) -> &'static str {
        self.descriptor.code
    }

    pub fn render(&self) -> String {
        let mut out = self.headline.clone();
        out.push('\n');
        for detail in &self.details {
            out.push_str("   ");
            out.push_str(detail);
            out.push('\n');
        }
        if let Some((first, rest)) = self.descriptor.remediation.split_first() {
            out.push_str("\nTip: ");
            out.push_str(first);
            out.push('\n');
            for line in rest {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

/// Reported when required cloud credentials are unset.
pub const MISSING_CREDENTIALS_ERROR: DiagnosticDescriptor = DiagnosticDescriptor::new(
    "MISSING_CREDENTIALS",
    "Missing credentials! Set these environment variables:",
    &["Copy .env.example to .env and fill in your values"],
);

/// Reported when credentials still carry `your-` placeholder values.
pub const PLACEHOLDER_CREDENTIALS_ERROR: DiagnosticDescriptor = DiagnosticDescriptor::new(
    "PLACEHOLDER_CREDENTIALS",
    "Placeholder credentials detected! Replace these environment variables:",
    &["Copy .env.example to .env and fill in your values"],
);

pub const INVALID_CONFIGURATION_ERROR: DiagnosticDescriptor = DiagnosticDescriptor::new(
    "INVALID_CONFIGURATION",
    "Invalid configuration",
    &[],
);

pub const AUTHENTICATION_FAILED_ERROR: DiagnosticDescriptor = DiagnosticDescriptor::new(
    "AUTHENTICATION_FAILED",
    "Authentication failed",
    &[],
);

/// Reported when the server certificate is not trusted.
pub const TLS_CERTIFICATE_REJECTED_ERROR: DiagnosticDescriptor = DiagnosticDescriptor::new(
    "TLS_CERTIFICATE_REJECTED",
    "TLS certificate verification failed",
    &[
        "If you're using a self-signed certificate, set:",
        "   CRIBL_INSECURE_TLS=true",
        "   (Only use this in development/testing environments!)",
    ],
);

pub const NETWORK_FAILURE_ERROR: DiagnosticDescriptor =
    DiagnosticDescriptor::new("NETWORK_FAILURE", "Request failed", &[]);

pub const OUTPUT_FAILURE_ERROR: DiagnosticDescriptor =
    DiagnosticDescriptor::new("OUTPUT_FAILURE", "Failed to write output", &[]);
