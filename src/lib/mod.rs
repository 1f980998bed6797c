//! Shared library modules providing error types, TLS failure classification, and telemetry initialization.

pub mod errors;
pub mod telemetry;
pub mod tls;
