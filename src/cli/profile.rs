//! RunProfile and deployment/env-file resolution.
use std::path::{Path, PathBuf};

use crate::{
    lib::errors::ConfigError,
    session::config::{DeploymentMode, EnvSource, RawCriblEnv},
};

use super::ListCommand;

const DEFAULT_ENV_FILE: &str = ".env";

/// Where a resolved setting came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    Cli,
    Env,
    Default,
}

impl SettingSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SettingSource::Cli => "cli",
            SettingSource::Env => "env",
            SettingSource::Default => "default",
        }
    }
}

/// Resolved run profile.
#[derive(Debug, Clone)]
pub struct RunProfile {
    pub command: ListCommand,
    pub deployment_override: Option<DeploymentMode>,
    pub env_file: Option<PathBuf>,
    pub strict_exit: bool,
}

/// Resolve the deployment in the order: CLI flag → `CRIBL_DEPLOYMENT` → cloud.
pub fn resolve_deployment(
    override_mode: Option<DeploymentMode>,
    raw: &RawCriblEnv,
) -> Result<(DeploymentMode, SettingSource), ConfigError> {
    if let Some(mode) = override_mode {
        return Ok((mode, SettingSource::Cli));
    }
    match raw.deployment.as_deref() {
        Some(value) => Ok((DeploymentMode::parse_env(value)?, SettingSource::Env)),
        None => Ok((DeploymentMode::Cloud, SettingSource::Default)),
    }
}

/// Seed `source` from a dotenv file. Variables already set are never overridden.
///
/// With no explicit path the process environment picks up `./.env` when it
/// exists; an explicit path must exist.
pub fn prepare_env_source(
    source: EnvSource,
    env_file: Option<&Path>,
) -> Result<EnvSource, ConfigError> {
    match source {
        EnvSource::Process => {
            match env_file {
                Some(path) => {
                    dotenvy::from_path(path).map_err(|source| env_file_error(path, source))?;
                }
                None => match dotenvy::dotenv() {
                    Ok(_) => {}
                    Err(err) if err.not_found() => {}
                    Err(err) => return Err(env_file_error(Path::new(DEFAULT_ENV_FILE), err)),
                },
            }
            Ok(EnvSource::Process)
        }
        EnvSource::Map(mut vars) => {
            if let Some(path) = env_file {
                let entries =
                    dotenvy::from_path_iter(path).map_err(|source| env_file_error(path, source))?;
                for entry in entries {
                    let (key, value) = entry.map_err(|source| env_file_error(path, source))?;
                    vars.entry(key).or_insert(value);
                }
            }
            Ok(EnvSource::Map(vars))
        }
    }
}

fn env_file_error(path: &Path, source: dotenvy::Error) -> ConfigError {
    ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    }
}
