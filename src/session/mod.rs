//! Credential resolution and authenticated-session bootstrap.
pub mod auth;
pub mod client;
pub mod config;
pub mod runtime;
pub mod transport;

pub use auth::{ApiPlane, AuthStrategy};
pub use client::{AuthHeaderProvider, BearerToken, Session};
pub use config::{Credentials, DeploymentMode, EnvSource, RawCriblEnv};
pub use transport::TlsPolicy;
