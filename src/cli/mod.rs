//! Command-line surface.
pub mod args;
pub mod profile;

pub use args::{ListCommand, RunArgs, WorkerGroupsArgs};
pub use profile::{prepare_env_source, resolve_deployment, RunProfile, SettingSource};
