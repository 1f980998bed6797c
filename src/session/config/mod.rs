//! Resolve credentials from `CRIBL_*` environment variables.
use clap::ValueEnum;
use serde::Deserialize;

use crate::lib::errors::ConfigError;

pub mod cloud;
pub mod onprem;
pub mod telemetry;

pub use cloud::{resolve_cloud_credentials, CloudCredentials, DEFAULT_DOMAIN, DEFAULT_WORKSPACE};
pub use onprem::{
    parse_insecure_tls, resolve_onprem_credentials, OnPremCredentials, DEFAULT_PASSWORD,
    DEFAULT_SERVER_URL, DEFAULT_USERNAME,
};

pub const ENV_PREFIX: &str = "CRIBL";
pub const ORG_ID_ENV: &str = "CRIBL_ORG_ID";
pub const CLIENT_ID_ENV: &str = "CRIBL_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "CRIBL_CLIENT_SECRET";
pub const WORKSPACE_NAME_ENV: &str = "CRIBL_WORKSPACE_NAME";
pub const DOMAIN_ENV: &str = "CRIBL_DOMAIN";
pub const SERVER_URL_ENV: &str = "CRIBL_SERVER_URL";
pub const USERNAME_ENV: &str = "CRIBL_USERNAME";
pub const PASSWORD_ENV: &str = "CRIBL_PASSWORD";
pub const INSECURE_TLS_ENV: &str = "CRIBL_INSECURE_TLS";
pub const DEPLOYMENT_ENV: &str = "CRIBL_DEPLOYMENT";

/// Values starting with this prefix were copied from `.env.example` unchanged.
pub const PLACEHOLDER_PREFIX: &str = "your-";

/// Where `CRIBL_*` variables are read from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The process environment.
    #[default]
    Process,
    /// An explicit variable map (full names, e.g. `CRIBL_ORG_ID`).
    Map(config::Map<String, String>),
}

impl EnvSource {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Map(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Deployment discriminant selecting the credential variant and auth strategy.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DeploymentMode {
    Cloud,
    #[value(name = "on-prem", alias = "onprem")]
    OnPrem,
}

impl DeploymentMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeploymentMode::Cloud => "cloud",
            DeploymentMode::OnPrem => "on-prem",
        }
    }

    /// Parse the `CRIBL_DEPLOYMENT` value.
    pub fn parse_env(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cloud" => Ok(DeploymentMode::Cloud),
            "on-prem" | "onprem" => Ok(DeploymentMode::OnPrem),
            other => Err(ConfigError::InvalidField {
                var: DEPLOYMENT_ENV,
                message: format!("expected `cloud` or `on-prem`, got `{other}`"),
            }),
        }
    }
}

/// `CRIBL_*` variables as read, before validation. Blank values are `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCriblEnv {
    pub org_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub workspace_name: Option<String>,
    pub domain: Option<String>,
    pub server_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub insecure_tls: Option<String>,
    pub deployment: Option<String>,
}

impl RawCriblEnv {
    /// Read every `CRIBL_*` variable from `source`.
    pub fn load(source: EnvSource) -> Result<Self, ConfigError> {
        let mut environment = config::Environment::with_prefix(ENV_PREFIX).ignore_empty(true);
        if let EnvSource::Map(map) = source {
            environment = environment.source(Some(map));
        }

        let document = config::Config::builder()
            .add_source(environment)
            .build()
            .map_err(|source| ConfigError::EnvRead { source })?;
        let raw: RawCriblEnv = document
            .try_deserialize()
            .map_err(|source| ConfigError::EnvRead { source })?;

        let raw = raw.normalized();
        telemetry::log_env_loaded(&raw);
        Ok(raw)
    }

    fn normalized(self) -> Self {
        Self {
            org_id: non_blank(self.org_id),
            client_id: non_blank(self.client_id),
            client_secret: non_blank(self.client_secret),
            workspace_name: non_blank(self.workspace_name),
            domain: non_blank(self.domain),
            server_url: non_blank(self.server_url),
            username: non_blank(self.username),
            password: non_blank(self.password),
            insecure_tls: non_blank(self.insecure_tls),
            deployment: non_blank(self.deployment),
        }
    }
}

/// Exactly one credential variant is active per session.
#[derive(Debug, Clone)]
pub enum Credentials {
    Cloud(CloudCredentials),
    OnPrem(OnPremCredentials),
}

impl Credentials {
    /// Validate the variant selected by `deployment`. No network call happens here.
    pub fn resolve(raw: &RawCriblEnv, deployment: DeploymentMode) -> Result<Self, ConfigError> {
        let credentials = match deployment {
            DeploymentMode::Cloud => Credentials::Cloud(resolve_cloud_credentials(raw)?),
            DeploymentMode::OnPrem => Credentials::OnPrem(resolve_onprem_credentials(raw)?),
        };
        telemetry::log_resolved(&credentials);
        Ok(credentials)
    }

    pub fn deployment(&self) -> DeploymentMode {
        match self {
            Credentials::Cloud(_) => DeploymentMode::Cloud,
            Credentials::OnPrem(_) => DeploymentMode::OnPrem,
        }
    }
}

pub fn is_placeholder(value: &str) -> bool {
    value.trim_start().starts_with(PLACEHOLDER_PREFIX)
}

/// Collects every missing or placeholder variable so they are reported together.
#[derive(Debug, Default)]
pub(crate) struct FieldCheck {
    missing: Vec<&'static str>,
    placeholder: Vec<&'static str>,
}

impl FieldCheck {
    pub(crate) fn required(&mut self, var: &'static str, value: Option<&String>) -> String {
        match value {
            None => {
                self.missing.push(var);
                String::new()
            }
            Some(value) => self.accept(var, value),
        }
    }

    pub(crate) fn with_default(
        &mut self,
        var: &'static str,
        value: Option<&String>,
        default: &str,
    ) -> String {
        match value {
            None => default.to_string(),
            Some(value) => self.accept(var, value),
        }
    }

    pub(crate) fn finish(self) -> Result<(), ConfigError> {
        if !self.missing.is_empty() {
            return Err(ConfigError::MissingCredentials { vars: self.missing });
        }
        if !self.placeholder.is_empty() {
            return Err(ConfigError::PlaceholderCredentials {
                vars: self.placeholder,
            });
        }
        Ok(())
    }

    /// Values are kept exactly as given; secrets may carry significant whitespace.
    fn accept(&mut self, var: &'static str, value: &str) -> String {
        if is_placeholder(value) {
            self.placeholder.push(var);
        }
        value.to_string()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
