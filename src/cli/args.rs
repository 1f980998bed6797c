//! CLI argument definitions and `RunProfile` construction.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::RunProfile;
use crate::{
    api::Product,
    session::{ApiPlane, DeploymentMode},
};

/// Which listing to run.
#[derive(Debug, Clone, Subcommand, PartialEq, Eq)]
pub enum ListCommand {
    /// List worker groups from the control plane (cloud or on-prem).
    WorkerGroups(WorkerGroupsArgs),
    /// List workspaces from the cloud management plane.
    Workspaces,
}

impl ListCommand {
    pub const fn name(&self) -> &'static str {
        match self {
            ListCommand::WorkerGroups(_) => "worker-groups",
            ListCommand::Workspaces => "workspaces",
        }
    }

    pub const fn plane(&self) -> ApiPlane {
        match self {
            ListCommand::WorkerGroups(_) => ApiPlane::Control,
            ListCommand::Workspaces => ApiPlane::Management,
        }
    }
}

/// Arguments for `worker-groups`.
#[derive(Debug, Clone, Args, PartialEq, Eq)]
pub struct WorkerGroupsArgs {
    #[arg(long, value_enum, default_value_t = Product::Stream)]
    pub product: Product,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "List Cribl worker groups and workspaces",
    after_help = "Credentials are read from CRIBL_* environment variables and an optional .env file."
)]
pub struct RunArgs {
    /// Deployment to authenticate against (overrides CRIBL_DEPLOYMENT).
    #[arg(long, value_enum, global = true)]
    pub deployment: Option<DeploymentMode>,
    /// Load variables from this dotenv file instead of `./.env`.
    #[arg(long = "env-file", global = true)]
    pub env_file: Option<PathBuf>,
    /// Exit with status 1 when the run fails.
    #[arg(long, global = true, default_value_t = false)]
    pub strict_exit: bool,
    #[command(subcommand)]
    pub command: ListCommand,
}

impl RunArgs {
    pub fn into_profile(self) -> RunProfile {
        RunProfile {
            command: self.command,
            deployment_override: self.deployment,
            env_file: self.env_file,
            strict_exit: self.strict_exit,
        }
    }
}
